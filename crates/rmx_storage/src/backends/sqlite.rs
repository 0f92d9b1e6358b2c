use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;

use rmx_core::{Article, Error, Media, MediaStore, Persona, Result};

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS articles (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        text TEXT NOT NULL,
        source TEXT NOT NULL,
        date_created TEXT NOT NULL,
        user_id INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS media (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        media_url TEXT NOT NULL,
        media_type TEXT NOT NULL,
        prompt TEXT NOT NULL,
        style TEXT NOT NULL,
        date_created TEXT NOT NULL,
        article_id INTEGER NOT NULL REFERENCES articles(id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS personas (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        description TEXT NOT NULL,
        image_url TEXT NOT NULL,
        user_id INTEGER NOT NULL,
        date_created TEXT NOT NULL
    )
    "#,
    // Add future migrations here
];

pub struct SqliteStore {
    pool: SqlitePool,
    db_path: PathBuf,
}

impl SqliteStore {
    pub async fn connect(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let pool = SqlitePool::connect(&format!("sqlite:{}?mode=rwc", db_path.display()))
            .await
            .map_err(|e| Error::Database(format!("Failed to connect to database: {}", e)))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| Error::Database(format!("Failed to run migration {}: {}", i, e)))?;
        }

        Ok(Self { pool, db_path })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

fn parse_date(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|date| date.with_timezone(&Utc))
        .map_err(|e| Error::Database(format!("Failed to parse date: {}", e)))
}

fn row_to_article(row: &SqliteRow) -> Result<Article> {
    Ok(Article {
        id: row.get("id"),
        text: row.get("text"),
        source: row.get("source"),
        date_created: parse_date(&row.get::<String, _>("date_created"))?,
        user_id: row.get("user_id"),
    })
}

fn row_to_media(row: &SqliteRow) -> Result<Media> {
    Ok(Media {
        id: row.get("id"),
        media_url: row.get("media_url"),
        media_type: row.get("media_type"),
        prompt: row.get("prompt"),
        style: row.get("style"),
        date_created: parse_date(&row.get::<String, _>("date_created"))?,
        article_id: row.get("article_id"),
    })
}

fn row_to_persona(row: &SqliteRow) -> Result<Persona> {
    Ok(Persona {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        image_url: row.get("image_url"),
        user_id: row.get("user_id"),
        date_created: parse_date(&row.get::<String, _>("date_created"))?,
    })
}

#[async_trait]
impl MediaStore for SqliteStore {
    async fn create_article(&self, user_id: i64, text: &str, source: &str) -> Result<Article> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO articles (text, source, date_created, user_id)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(text)
        .bind(source)
        .bind(now.to_rfc3339())
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Database(format!("Failed to store article: {}", e)))?;

        Ok(Article {
            id: result.last_insert_rowid(),
            text: text.to_string(),
            source: source.to_string(),
            date_created: now,
            user_id,
        })
    }

    async fn get_article(&self, user_id: i64, article_id: i64) -> Result<Article> {
        let row = sqlx::query("SELECT * FROM articles WHERE id = ? AND user_id = ?")
            .bind(article_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::Database(format!("Failed to fetch article: {}", e)))?
            .ok_or_else(|| Error::NotFound(format!("Article {}", article_id)))?;

        row_to_article(&row)
    }

    async fn list_articles(&self, user_id: i64) -> Result<Vec<Article>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM articles
            WHERE user_id = ?
            ORDER BY date_created DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::Database(format!("Failed to list articles: {}", e)))?;

        rows.iter().map(row_to_article).collect()
    }

    async fn store_media(
        &self,
        article_id: i64,
        prompt: &str,
        style: &str,
        media_type: &str,
        media_url: &str,
    ) -> Result<Media> {
        let exists = sqlx::query("SELECT id FROM articles WHERE id = ?")
            .bind(article_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::Database(format!("Failed to check article: {}", e)))?;
        if exists.is_none() {
            return Err(Error::NotFound(format!("Article {}", article_id)));
        }

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO media (media_url, media_type, prompt, style, date_created, article_id)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(media_url)
        .bind(media_type)
        .bind(prompt)
        .bind(style)
        .bind(now.to_rfc3339())
        .bind(article_id)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Database(format!("Failed to store media: {}", e)))?;

        Ok(Media {
            id: result.last_insert_rowid(),
            media_url: media_url.to_string(),
            media_type: media_type.to_string(),
            prompt: prompt.to_string(),
            style: style.to_string(),
            date_created: now,
            article_id,
        })
    }

    async fn list_media(&self, user_id: i64, search: Option<&str>) -> Result<Vec<Media>> {
        let rows = match search {
            Some(search) => {
                let pattern = format!("%{}%", search.to_lowercase());
                sqlx::query(
                    r#"
                    SELECT media.* FROM media
                    INNER JOIN articles ON articles.id = media.article_id
                    WHERE articles.user_id = ?
                      AND (LOWER(media.prompt) LIKE ? OR LOWER(media.style) LIKE ?)
                    ORDER BY media.date_created DESC, media.id DESC
                    "#,
                )
                .bind(user_id)
                .bind(&pattern)
                .bind(&pattern)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(
                    r#"
                    SELECT media.* FROM media
                    INNER JOIN articles ON articles.id = media.article_id
                    WHERE articles.user_id = ?
                    ORDER BY media.date_created DESC, media.id DESC
                    "#,
                )
                .bind(user_id)
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| Error::Database(format!("Failed to list media: {}", e)))?;

        rows.iter().map(row_to_media).collect()
    }

    async fn media_for_article(&self, user_id: i64, article_id: i64) -> Result<Vec<Media>> {
        // Also verifies ownership.
        self.get_article(user_id, article_id).await?;

        let rows = sqlx::query(
            r#"
            SELECT * FROM media
            WHERE article_id = ?
            ORDER BY date_created DESC, id DESC
            "#,
        )
        .bind(article_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::Database(format!("Failed to list media: {}", e)))?;

        rows.iter().map(row_to_media).collect()
    }

    async fn delete_media(&self, user_id: i64, media_id: i64) -> Result<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM media
            WHERE id = ?
              AND article_id IN (SELECT id FROM articles WHERE user_id = ?)
            "#,
        )
        .bind(media_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Database(format!("Failed to delete media: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Media {}", media_id)));
        }
        Ok(())
    }

    async fn create_persona(
        &self,
        user_id: i64,
        name: &str,
        description: &str,
        image_url: &str,
    ) -> Result<Persona> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO personas (name, description, image_url, user_id, date_created)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(image_url)
        .bind(user_id)
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Database(format!("Failed to store persona: {}", e)))?;

        Ok(Persona {
            id: result.last_insert_rowid(),
            name: name.to_string(),
            description: description.to_string(),
            image_url: image_url.to_string(),
            user_id,
            date_created: now,
        })
    }

    async fn list_personas(&self, user_id: i64) -> Result<Vec<Persona>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM personas
            WHERE user_id = ?
            ORDER BY date_created DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::Database(format!("Failed to list personas: {}", e)))?;

        rows.iter().map(row_to_persona).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn store() -> (tempfile::TempDir, SqliteStore) {
        let dir = tempdir().unwrap();
        let store = SqliteStore::connect(dir.path().join("test.db")).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_article_round_trip() {
        let (_dir, store) = store().await;
        let created = store
            .create_article(1, "body text", "https://a.example/post")
            .await
            .unwrap();

        let fetched = store.get_article(1, created.id).await.unwrap();
        assert_eq!(fetched.text, "body text");
        assert_eq!(fetched.source, "https://a.example/post");
        assert!(store.get_article(2, created.id).await.is_err());
    }

    #[tokio::test]
    async fn test_media_listing_and_search() {
        let (_dir, store) = store().await;
        let article = store.create_article(1, "t", "https://a.example").await.unwrap();
        store
            .store_media(article.id, "A Dramatic Reveal", "meme", "image", "u1")
            .await
            .unwrap();
        store
            .store_media(article.id, "quiet diagram", "simplify", "image", "u2")
            .await
            .unwrap();

        assert_eq!(store.list_media(1, None).await.unwrap().len(), 2);
        assert_eq!(store.list_media(1, Some("DRAMATIC")).await.unwrap().len(), 1);
        assert_eq!(store.list_media(1, Some("simplify")).await.unwrap().len(), 1);
        assert!(store.list_media(2, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_media_is_ownership_checked() {
        let (_dir, store) = store().await;
        let article = store.create_article(1, "t", "https://a.example").await.unwrap();
        let media = store
            .store_media(article.id, "p", "meme", "image", "u")
            .await
            .unwrap();

        assert!(store.delete_media(2, media.id).await.is_err());
        store.delete_media(1, media.id).await.unwrap();
        assert!(store.delete_media(1, media.id).await.is_err());
    }

    #[tokio::test]
    async fn test_store_media_requires_article() {
        let (_dir, store) = store().await;
        assert!(store.store_media(42, "p", "meme", "image", "u").await.is_err());
    }

    #[tokio::test]
    async fn test_personas_round_trip() {
        let (_dir, store) = store().await;
        let persona = store
            .create_persona(1, "Noir", "high contrast", "https://img.example/noir.png")
            .await
            .unwrap();
        let listed = store.list_personas(1).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, persona.id);
        assert_eq!(listed[0].name, "Noir");
    }
}
