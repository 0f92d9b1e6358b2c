use reqwest::Client;
use serde::Deserialize;

use rmx_core::{Error, Result};

const DEFAULT_API_URL: &str = "https://api.stripe.com";

#[derive(Debug, Clone, Deserialize)]
pub struct CustomerDetails {
    #[serde(default)]
    pub email: Option<String>,
}

/// The slice of a checkout session this service cares about.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub payment_status: String,
    #[serde(default)]
    pub customer_details: Option<CustomerDetails>,
}

impl CheckoutSession {
    pub fn is_paid(&self) -> bool {
        self.payment_status == "paid"
    }

    pub fn customer_email(&self) -> Option<&str> {
        self.customer_details
            .as_ref()
            .and_then(|details| details.email.as_deref())
    }
}

/// Retrieves checkout sessions from the payment provider. Payment logic
/// itself lives entirely on the provider's side; this only asks "did this
/// session get paid".
#[derive(Debug, Clone)]
pub struct PaymentClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl PaymentClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_API_URL)
    }

    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn retrieve_session(&self, session_id: &str) -> Result<CheckoutSession> {
        let url = format!("{}/v1/checkout/sessions/{}", self.base_url, session_id);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("payment session lookup failed: {}", e);
                Error::Payment("Failed to verify payment session".to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::error!("payment provider returned {}: {}", status, detail);
            return Err(Error::Payment("Failed to verify payment session".to_string()));
        }

        Ok(response.json::<CheckoutSession>().await?)
    }
}
