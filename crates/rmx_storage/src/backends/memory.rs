use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use rmx_core::{Article, Error, Media, MediaStore, Persona, Result};

#[derive(Default)]
struct State {
    articles: Vec<Article>,
    media: Vec<Media>,
    personas: Vec<Persona>,
    next_id: i64,
}

impl State {
    fn alloc(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn owner_of(&self, media: &Media) -> Option<i64> {
        self.articles
            .iter()
            .find(|article| article.id == media.article_id)
            .map(|article| article.user_id)
    }
}

/// Default store: everything lives in process memory. Useful for tests and
/// for running the whole stack without a database.
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State::default()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn matches_search(media: &Media, needle: &str) -> bool {
    media.prompt.to_lowercase().contains(needle) || media.style.to_lowercase().contains(needle)
}

#[async_trait]
impl MediaStore for MemoryStore {
    async fn create_article(&self, user_id: i64, text: &str, source: &str) -> Result<Article> {
        let mut state = self.state.write().await;
        let article = Article {
            id: state.alloc(),
            text: text.to_string(),
            source: source.to_string(),
            date_created: Utc::now(),
            user_id,
        };
        state.articles.push(article.clone());
        Ok(article)
    }

    async fn get_article(&self, user_id: i64, article_id: i64) -> Result<Article> {
        let state = self.state.read().await;
        state
            .articles
            .iter()
            .find(|article| article.id == article_id && article.user_id == user_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Article {}", article_id)))
    }

    async fn list_articles(&self, user_id: i64) -> Result<Vec<Article>> {
        let state = self.state.read().await;
        let mut articles: Vec<Article> = state
            .articles
            .iter()
            .filter(|article| article.user_id == user_id)
            .cloned()
            .collect();
        articles.sort_by(|a, b| b.date_created.cmp(&a.date_created).then(b.id.cmp(&a.id)));
        Ok(articles)
    }

    async fn store_media(
        &self,
        article_id: i64,
        prompt: &str,
        style: &str,
        media_type: &str,
        media_url: &str,
    ) -> Result<Media> {
        let mut state = self.state.write().await;
        if !state.articles.iter().any(|article| article.id == article_id) {
            return Err(Error::NotFound(format!("Article {}", article_id)));
        }
        let media = Media {
            id: state.alloc(),
            media_url: media_url.to_string(),
            media_type: media_type.to_string(),
            prompt: prompt.to_string(),
            style: style.to_string(),
            date_created: Utc::now(),
            article_id,
        };
        state.media.push(media.clone());
        Ok(media)
    }

    async fn list_media(&self, user_id: i64, search: Option<&str>) -> Result<Vec<Media>> {
        let state = self.state.read().await;
        let needle = search.map(str::to_lowercase);
        let mut media: Vec<Media> = state
            .media
            .iter()
            .filter(|item| state.owner_of(item) == Some(user_id))
            .filter(|item| needle.as_deref().map_or(true, |n| matches_search(item, n)))
            .cloned()
            .collect();
        media.sort_by(|a, b| b.date_created.cmp(&a.date_created).then(b.id.cmp(&a.id)));
        Ok(media)
    }

    async fn media_for_article(&self, user_id: i64, article_id: i64) -> Result<Vec<Media>> {
        // Also verifies ownership.
        self.get_article(user_id, article_id).await?;
        let state = self.state.read().await;
        let mut media: Vec<Media> = state
            .media
            .iter()
            .filter(|item| item.article_id == article_id)
            .cloned()
            .collect();
        media.sort_by(|a, b| b.date_created.cmp(&a.date_created).then(b.id.cmp(&a.id)));
        Ok(media)
    }

    async fn delete_media(&self, user_id: i64, media_id: i64) -> Result<()> {
        let mut state = self.state.write().await;
        let position = state
            .media
            .iter()
            .position(|item| item.id == media_id && state.owner_of(item) == Some(user_id))
            .ok_or_else(|| Error::NotFound(format!("Media {}", media_id)))?;
        state.media.remove(position);
        Ok(())
    }

    async fn create_persona(
        &self,
        user_id: i64,
        name: &str,
        description: &str,
        image_url: &str,
    ) -> Result<Persona> {
        let mut state = self.state.write().await;
        let persona = Persona {
            id: state.alloc(),
            name: name.to_string(),
            description: description.to_string(),
            image_url: image_url.to_string(),
            user_id,
            date_created: Utc::now(),
        };
        state.personas.push(persona.clone());
        Ok(persona)
    }

    async fn list_personas(&self, user_id: i64) -> Result<Vec<Persona>> {
        let state = self.state.read().await;
        let mut personas: Vec<Persona> = state
            .personas
            .iter()
            .filter(|persona| persona.user_id == user_id)
            .cloned()
            .collect();
        personas.sort_by(|a, b| b.date_created.cmp(&a.date_created).then(b.id.cmp(&a.id)));
        Ok(personas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_articles_are_scoped_to_their_owner() {
        let store = MemoryStore::new();
        let mine = store.create_article(1, "text", "https://a.example").await.unwrap();
        store.create_article(2, "other", "https://b.example").await.unwrap();

        assert_eq!(store.list_articles(1).await.unwrap(), vec![mine.clone()]);
        assert!(store.get_article(2, mine.id).await.is_err());
    }

    #[tokio::test]
    async fn test_media_ownership_follows_article() {
        let store = MemoryStore::new();
        let article = store.create_article(1, "t", "https://a.example").await.unwrap();
        let media = store
            .store_media(article.id, "a prompt", "meme", "image", "https://img.example/1")
            .await
            .unwrap();

        assert_eq!(store.list_media(1, None).await.unwrap().len(), 1);
        assert!(store.list_media(2, None).await.unwrap().is_empty());
        assert!(store.delete_media(2, media.id).await.is_err());
        store.delete_media(1, media.id).await.unwrap();
        assert!(store.delete_media(1, media.id).await.is_err());
    }

    #[tokio::test]
    async fn test_media_search_is_case_insensitive_substring() {
        let store = MemoryStore::new();
        let article = store.create_article(1, "t", "https://a.example").await.unwrap();
        store
            .store_media(article.id, "A Dramatic Reveal", "meme", "image", "u1")
            .await
            .unwrap();
        store
            .store_media(article.id, "quiet diagram", "simplify", "image", "u2")
            .await
            .unwrap();

        let hits = store.list_media(1, Some("dramatic")).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].prompt, "A Dramatic Reveal");

        let by_style = store.list_media(1, Some("SIMPLIFY")).await.unwrap();
        assert_eq!(by_style.len(), 1);

        assert!(store.list_media(1, Some("nothing")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_media_requires_existing_article() {
        let store = MemoryStore::new();
        assert!(store
            .store_media(99, "p", "meme", "image", "u")
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_media_for_article_checks_ownership() {
        let store = MemoryStore::new();
        let article = store.create_article(1, "t", "https://a.example").await.unwrap();
        store
            .store_media(article.id, "p", "meme", "image", "u")
            .await
            .unwrap();

        assert_eq!(store.media_for_article(1, article.id).await.unwrap().len(), 1);
        assert!(store.media_for_article(2, article.id).await.is_err());
    }

    #[tokio::test]
    async fn test_personas_round_trip() {
        let store = MemoryStore::new();
        let persona = store
            .create_persona(1, "Noir", "high contrast", "https://img.example/noir.png")
            .await
            .unwrap();
        assert_eq!(store.list_personas(1).await.unwrap(), vec![persona]);
        assert!(store.list_personas(2).await.unwrap().is_empty());
    }
}
