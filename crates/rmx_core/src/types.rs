use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Transformation applied to source content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    Meme,
    Comic,
    Simplify,
}

impl Style {
    pub const ALL: [Style; 3] = [Style::Meme, Style::Comic, Style::Simplify];

    pub fn as_str(&self) -> &'static str {
        match self {
            Style::Meme => "meme",
            Style::Comic => "comic",
            Style::Simplify => "simplify",
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Style {
    type Err = crate::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "meme" => Ok(Style::Meme),
            "comic" => Ok(Style::Comic),
            "simplify" => Ok(Style::Simplify),
            other => Err(crate::Error::Validation(format!(
                "Invalid style: {}. Must be one of: meme, comic, simplify",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub text: String,
    pub source: String,
    pub date_created: DateTime<Utc>,
    pub user_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Media {
    pub id: i64,
    pub media_url: String,
    pub media_type: String,
    pub prompt: String,
    pub style: String,
    pub date_created: DateTime<Utc>,
    pub article_id: i64,
}

/// Content extracted from a URL. Lives for a single request cycle; nothing
/// here is persisted by this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedContent {
    pub title: String,
    pub content: String,
    pub markdown: String,
    pub url: String,
    pub word_count: usize,
    pub estimated_read_time: usize,
}

/// One candidate idea derived from scraped content. `visual` holds the
/// rendered image URL once it is known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Concept {
    pub title: String,
    pub description: String,
    pub prompt: String,
    pub visual: String,
    pub tone: String,
}

/// Reusable named style template with an associated image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub user_id: i64,
    pub date_created: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub user_id: i64,
    pub link: String,
    pub style: Style,
}

/// What the backend reports after a full server-side generation run.
/// Identifiers are opaque backend-assigned strings. `article_text` is only
/// populated by backends that can share the scraped text in-process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationOutcome {
    pub article_id: String,
    pub media_id: String,
    pub media_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub article_text: Option<String>,
}
