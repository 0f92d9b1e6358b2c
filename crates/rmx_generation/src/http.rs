use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use rmx_core::{
    Concept, Error, GenerationBackend, GenerationOutcome, GenerationRequest, Media, Result,
    ScrapedContent, Style,
};

#[derive(Serialize)]
struct GenerateBody<'a> {
    user_id: i64,
    link: &'a str,
    style: &'a str,
}

#[derive(Deserialize)]
struct GenerateReply {
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    article_id: Option<String>,
    #[serde(default)]
    media_id: Option<String>,
    #[serde(default)]
    media_url: Option<String>,
}

#[derive(Serialize)]
struct ScrapeBody<'a> {
    url: &'a str,
}

#[derive(Serialize)]
struct ConceptsBody<'a> {
    style: &'a str,
    title: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ConceptsReply {
    concepts: Vec<Concept>,
}

#[derive(Serialize)]
struct RenderBody<'a> {
    prompt: &'a str,
}

#[derive(Deserialize)]
struct RenderReply {
    image_url: String,
}

#[derive(Deserialize)]
struct MediaReply {
    media: Vec<Media>,
}

#[derive(Serialize)]
struct SocialPostBody<'a> {
    user_id: i64,
    media_id: &'a str,
    text: &'a str,
}

/// Thin pass-through to the real generation service. Shapes the request,
/// forwards it, and turns any failure into a generic user-readable message;
/// the original detail only reaches the logs.
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Collapse a transport or status failure into `user_message`, keeping
    /// the detail for diagnostics only.
    async fn check(response: reqwest::Response, user_message: &str) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let detail = response.text().await.unwrap_or_default();
        tracing::error!("backend returned {}: {}", status, detail);
        Err(Error::Generation(user_message.to_string()))
    }
}

#[async_trait]
impl GenerationBackend for HttpBackend {
    fn name(&self) -> &str {
        "http"
    }

    async fn scrape(&self, url: &str) -> Result<ScrapedContent> {
        let response = self
            .client
            .post(self.endpoint("/scrape"))
            .json(&ScrapeBody { url })
            .send()
            .await
            .map_err(|e| {
                tracing::error!("scrape request failed: {}", e);
                Error::Scraping("Failed to scrape URL. Please check the URL and try again.".to_string())
            })?;

        let response =
            Self::check(response, "Failed to scrape URL. Please check the URL and try again.")
                .await?;
        Ok(response.json::<ScrapedContent>().await?)
    }

    async fn synthesize(&self, style: Style, scraped: &ScrapedContent) -> Result<Vec<Concept>> {
        let response = self
            .client
            .post(self.endpoint("/concepts"))
            .json(&ConceptsBody {
                style: style.as_str(),
                title: &scraped.title,
                content: &scraped.content,
            })
            .send()
            .await
            .map_err(|e| {
                tracing::error!("concept request failed: {}", e);
                Error::Generation("Failed to generate concepts. Please try again.".to_string())
            })?;

        let response =
            Self::check(response, "Failed to generate concepts. Please try again.").await?;
        Ok(response.json::<ConceptsReply>().await?.concepts)
    }

    async fn render_image(&self, prompt: &str) -> Result<String> {
        let response = self
            .client
            .post(self.endpoint("/generate-image"))
            .json(&RenderBody { prompt })
            .send()
            .await
            .map_err(|e| {
                tracing::error!("image request failed: {}", e);
                Error::Generation("Failed to generate image. Please try again.".to_string())
            })?;

        let response =
            Self::check(response, "Failed to generate image. Please try again.").await?;
        Ok(response.json::<RenderReply>().await?.image_url)
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationOutcome> {
        let response = self
            .client
            .post(self.endpoint("/generate"))
            .json(&GenerateBody {
                user_id: request.user_id,
                link: &request.link,
                style: request.style.as_str(),
            })
            .send()
            .await
            .map_err(|e| {
                tracing::error!("generate request failed: {}", e);
                Error::Generation("Failed to connect to the generation service.".to_string())
            })?;

        let response =
            Self::check(response, "Failed to connect to the generation service.").await?;
        let reply = response.json::<GenerateReply>().await?;

        // A 200 with success=false still carries the backend's reason.
        if !reply.success {
            let reason = reply
                .error
                .unwrap_or_else(|| "Generation service returned failure".to_string());
            tracing::error!("generate rejected: {}", reason);
            return Err(Error::Generation(reason));
        }

        match (reply.article_id, reply.media_id, reply.media_url) {
            (Some(article_id), Some(media_id), Some(media_url)) => Ok(GenerationOutcome {
                article_id,
                media_id,
                media_url,
                article_text: None,
            }),
            _ => Err(Error::Generation(
                "Generation service returned an incomplete result".to_string(),
            )),
        }
    }

    async fn list_media(&self, _user_id: i64, search: Option<&str>) -> Result<Vec<Media>> {
        let mut builder = self.client.get(self.endpoint("/media"));
        if let Some(search) = search {
            builder = builder.query(&[("search", search)]);
        }
        let response = builder.send().await.map_err(|e| {
            tracing::error!("media listing failed: {}", e);
            Error::Generation("Failed to load media.".to_string())
        })?;

        let response = Self::check(response, "Failed to load media.").await?;
        Ok(response.json::<MediaReply>().await?.media)
    }

    async fn delete_media(&self, _user_id: i64, media_id: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.endpoint(&format!("/media/{}", media_id)))
            .send()
            .await
            .map_err(|e| {
                tracing::error!("media deletion failed: {}", e);
                Error::Generation("Failed to delete media.".to_string())
            })?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::NotFound(format!("Media {}", media_id)));
        }
        Self::check(response, "Failed to delete media.").await?;
        Ok(())
    }

    async fn post_social(&self, user_id: i64, media_id: &str, text: &str) -> Result<()> {
        let response = self
            .client
            .post(self.endpoint("/x_post"))
            .json(&SocialPostBody {
                user_id,
                media_id,
                text,
            })
            .send()
            .await
            .map_err(|e| {
                tracing::error!("social post relay failed: {}", e);
                Error::Generation("Failed to share the post. Please try again.".to_string())
            })?;

        Self::check(response, "Failed to share the post. Please try again.").await?;
        Ok(())
    }
}
