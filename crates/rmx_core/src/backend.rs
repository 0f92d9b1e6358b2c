use async_trait::async_trait;
use crate::types::{Concept, GenerationOutcome, GenerationRequest, Media, ScrapedContent, Style};
use crate::Result;

/// Interface to the generation service. There are two interchangeable
/// implementations: an in-process mock and a thin HTTP pass-through,
/// selected by configuration.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Human-readable backend name for logs
    fn name(&self) -> &str;

    /// Extract content from a URL
    async fn scrape(&self, url: &str) -> Result<ScrapedContent>;

    /// Derive candidate concepts from scraped content
    async fn synthesize(&self, style: Style, scraped: &ScrapedContent) -> Result<Vec<Concept>>;

    /// Render a single image for a prompt, returning its URL
    async fn render_image(&self, prompt: &str) -> Result<String>;

    /// Run the full pipeline server-side
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationOutcome>;

    /// List generated media for a user, optionally filtered
    async fn list_media(&self, user_id: i64, search: Option<&str>) -> Result<Vec<Media>>;

    /// Delete a single media item by its backend identifier
    async fn delete_media(&self, user_id: i64, media_id: &str) -> Result<()>;

    /// Relay a social post for a generated media item
    async fn post_social(&self, user_id: i64, media_id: &str, text: &str) -> Result<()>;
}
