use async_trait::async_trait;
use crate::types::{Article, Media, Persona};
use crate::Result;

/// Data access over the relational store. Every query takes the caller's
/// identity explicitly; there is no ambient session lookup. Media ownership
/// follows the parent article's `user_id`.
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn create_article(&self, user_id: i64, text: &str, source: &str) -> Result<Article>;

    /// Fetch one article; `NotFound` when absent or owned by someone else
    async fn get_article(&self, user_id: i64, article_id: i64) -> Result<Article>;

    /// All of a user's articles, newest first
    async fn list_articles(&self, user_id: i64) -> Result<Vec<Article>>;

    async fn store_media(
        &self,
        article_id: i64,
        prompt: &str,
        style: &str,
        media_type: &str,
        media_url: &str,
    ) -> Result<Media>;

    /// A user's media, newest first. `search` filters prompt and style by
    /// case-insensitive substring.
    async fn list_media(&self, user_id: i64, search: Option<&str>) -> Result<Vec<Media>>;

    async fn media_for_article(&self, user_id: i64, article_id: i64) -> Result<Vec<Media>>;

    /// Delete exactly one media item; `NotFound` when absent
    async fn delete_media(&self, user_id: i64, media_id: i64) -> Result<()>;

    async fn create_persona(
        &self,
        user_id: i64,
        name: &str,
        description: &str,
        image_url: &str,
    ) -> Result<Persona>;

    async fn list_personas(&self, user_id: i64) -> Result<Vec<Persona>>;
}
