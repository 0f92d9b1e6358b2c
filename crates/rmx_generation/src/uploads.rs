use chrono::Utc;
use reqwest::Client;
use serde::Serialize;

/// Result of pushing a file to object storage. Failures are data, not
/// errors: callers render the reason instead of aborting the request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UploadOutcome {
    fn ok(url: String) -> Self {
        Self {
            success: true,
            url: Some(url),
            error: None,
        }
    }

    fn failed(reason: &str) -> Self {
        Self {
            success: false,
            url: None,
            error: Some(reason.to_string()),
        }
    }
}

/// Client for an S3-compatible object store reachable over plain HTTP PUT.
/// Objects land under `{endpoint}/{bucket}/{key}` and are assumed publicly
/// readable, so the upload URL doubles as the serving URL.
#[derive(Debug, Clone)]
pub struct ObjectStorage {
    client: Client,
    endpoint: String,
    bucket: String,
}

impl ObjectStorage {
    pub fn new(endpoint: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            bucket: bucket.into(),
        }
    }

    /// Timestamped object key with whitespace collapsed out of the name.
    fn object_key(file_name: &str) -> String {
        let sanitized: String = file_name
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-");
        let name = if sanitized.is_empty() {
            "upload.bin".to_string()
        } else {
            sanitized
        };
        format!("{}_{}", Utc::now().format("%Y%m%d_%H%M%S"), name)
    }

    pub async fn upload(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> UploadOutcome {
        let key = Self::object_key(file_name);
        let url = format!("{}/{}/{}", self.endpoint, self.bucket, key);
        tracing::info!("⬆️  uploading {} ({} bytes)", key, bytes.len());

        let response = self
            .client
            .put(&url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => UploadOutcome::ok(url),
            Ok(response) => {
                let status = response.status();
                let detail = response.text().await.unwrap_or_default();
                tracing::error!("upload rejected with {}: {}", status, detail);
                UploadOutcome::failed("Failed to upload file")
            }
            Err(e) => {
                tracing::error!("upload failed: {}", e);
                UploadOutcome::failed("Failed to upload file")
            }
        }
    }
}
