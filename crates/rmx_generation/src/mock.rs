use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use url::Url;

use rmx_core::{
    Article, Concept, Error, GenerationBackend, GenerationOutcome, GenerationRequest, Media,
    Result, ScrapedContent, Style,
};

const PLACEHOLDER_COLORS: [&str; 4] = ["6366f1", "8b5cf6", "ec4899", "3b82f6"];
const WORDS_PER_MINUTE: usize = 200;

/// In-process stand-in for the generation service. Returns canned data after
/// a simulated delay so the whole pipeline can be exercised without the real
/// backend. Generated artifacts are kept in a small registry so the media
/// listing and deletion calls behave like the real thing.
pub struct MockBackend {
    delay: Duration,
    registry: RwLock<Registry>,
}

#[derive(Default)]
struct Registry {
    articles: Vec<Article>,
    media: Vec<Media>,
    next_id: i64,
}

impl Registry {
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

impl MockBackend {
    pub fn new() -> Self {
        Self::with_delay(Duration::from_millis(300))
    }

    /// Zero-delay variant for tests.
    pub fn instant() -> Self {
        Self::with_delay(Duration::ZERO)
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            registry: RwLock::new(Registry::default()),
        }
    }

    async fn simulate_latency(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }

    fn placeholder_image(prompt: &str) -> String {
        let hash: usize = prompt.bytes().map(usize::from).sum();
        let color = PLACEHOLDER_COLORS[hash % PLACEHOLDER_COLORS.len()];
        let text: String = prompt.chars().take(30).collect();
        format!(
            "https://placehold.co/600x400/{}/ffffff?text={}",
            color,
            urlencoding::encode(&text)
        )
    }

    fn concepts_for(style: Style) -> Vec<Concept> {
        let raw: [(&str, &str, &str, &str); 3] = match style {
            Style::Meme => [
                (
                    "The Lab's New Intern",
                    "When the machine joins the team and never takes a coffee break",
                    "A tired researcher next to a glowing robot cheerfully crunching data, image macro framing, relatable humor",
                    "Humorous",
                ),
                (
                    "Before & After",
                    "From drowning in spreadsheets to watching the graphs draw themselves",
                    "Split panel: left shows a desk buried in paper, right shows the same desk spotless with tidy charts on screen, macro style",
                    "Relatable",
                ),
                (
                    "Pattern Found",
                    "That moment the model spots what everyone missed",
                    "A researcher doing a double take at a monitor highlighting an unexpected trend line, reaction-image framing",
                    "Exciting",
                ),
            ],
            Style::Comic => [
                (
                    "Chapter 1: The Deluge",
                    "Our hero is buried under data until an unlikely ally shows up",
                    "Comic panel of a scientist swamped by stacks of printouts as a helpful machine arrives, vibrant comic book style",
                    "Narrative",
                ),
                (
                    "Chapter 2: The Partnership",
                    "Human intuition and machine patience find a working rhythm",
                    "Comic panel of scientist and machine working side by side, a lightbulb moment mid-frame, collaborative scene",
                    "Inspiring",
                ),
                (
                    "Chapter 3: Breakthrough",
                    "Together they surface the discovery neither could reach alone",
                    "Dramatic comic panel of the pair celebrating in front of a holographic visualization, epic style",
                    "Triumphant",
                ),
            ],
            Style::Simplify => [
                (
                    "What It Does",
                    "Think of it as a tireless pattern finder working through the pile",
                    "Clean minimal illustration of an assistant sorting puzzle pieces of data into a clear picture, educational style",
                    "Educational",
                ),
                (
                    "Why It Matters",
                    "The tedious parts get handled so people can do the thinking",
                    "Infographic-style drawing pairing a brain for creativity with circuitry for computation, simple and clear",
                    "Explanatory",
                ),
                (
                    "Where It Shows Up",
                    "From new medicines to weather forecasts, the same trick accelerates the work",
                    "Three simple icons joined by connecting lines: a medicine bottle, a weather cloud, a strand of DNA, clean design",
                    "Practical",
                ),
            ],
        };

        raw.into_iter()
            .map(|(title, description, prompt, tone)| Concept {
                title: title.to_string(),
                description: description.to_string(),
                prompt: prompt.to_string(),
                visual: String::new(),
                tone: tone.to_string(),
            })
            .collect()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn scrape(&self, url: &str) -> Result<ScrapedContent> {
        tracing::debug!("mock scrape for {}", url);
        self.simulate_latency().await;

        let host = Url::parse(url)
            .ok()
            .and_then(|parsed| parsed.host_str().map(str::to_string))
            .ok_or_else(|| Error::InvalidUrl(url.to_string()))?;

        let title = format!("Article from {}", host);
        let content = format!(
            "This is stand-in article content extracted from {}. It reads like a \
             short report: a few paragraphs of prose, a couple of section \
             headings, and one memorable claim worth turning into a picture.",
            url
        );
        let markdown = format!("# {}\n\n{}", title, content);
        let word_count = content.split_whitespace().count();
        let estimated_read_time = (word_count + WORDS_PER_MINUTE - 1) / WORDS_PER_MINUTE;

        Ok(ScrapedContent {
            title,
            content,
            markdown,
            url: url.to_string(),
            word_count,
            estimated_read_time,
        })
    }

    async fn synthesize(&self, style: Style, scraped: &ScrapedContent) -> Result<Vec<Concept>> {
        tracing::debug!(
            "mock synthesis for {} ({} words, ~{} min read)",
            scraped.title,
            scraped.word_count,
            scraped.estimated_read_time
        );
        self.simulate_latency().await;
        Ok(Self::concepts_for(style))
    }

    async fn render_image(&self, prompt: &str) -> Result<String> {
        self.simulate_latency().await;
        Ok(Self::placeholder_image(prompt))
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationOutcome> {
        let scraped = self.scrape(&request.link).await?;
        let concepts = self.synthesize(request.style, &scraped).await?;
        let lead = concepts
            .first()
            .ok_or_else(|| Error::Generation("No concepts produced".to_string()))?;
        let media_url = self.render_image(&lead.prompt).await?;

        let mut registry = self.registry.write().await;
        let article_id = registry.alloc();
        registry.articles.push(Article {
            id: article_id,
            text: scraped.markdown.clone(),
            source: request.link.clone(),
            date_created: Utc::now(),
            user_id: request.user_id,
        });
        let media_id = registry.alloc();
        registry.media.push(Media {
            id: media_id,
            media_url: media_url.clone(),
            media_type: "image".to_string(),
            prompt: lead.prompt.clone(),
            style: request.style.to_string(),
            date_created: Utc::now(),
            article_id,
        });

        Ok(GenerationOutcome {
            article_id: article_id.to_string(),
            media_id: media_id.to_string(),
            media_url,
            article_text: Some(scraped.markdown),
        })
    }

    async fn list_media(&self, user_id: i64, search: Option<&str>) -> Result<Vec<Media>> {
        let registry = self.registry.read().await;
        let needle = search.map(str::to_lowercase);
        let mut media: Vec<Media> = registry
            .media
            .iter()
            .filter(|item| registry.owner_of(item) == Some(user_id))
            .filter(|item| match &needle {
                Some(needle) => {
                    item.prompt.to_lowercase().contains(needle)
                        || item.style.to_lowercase().contains(needle)
                }
                None => true,
            })
            .cloned()
            .collect();
        media.sort_by(|a, b| b.date_created.cmp(&a.date_created).then(b.id.cmp(&a.id)));
        Ok(media)
    }

    async fn delete_media(&self, user_id: i64, media_id: &str) -> Result<()> {
        let id: i64 = media_id
            .parse()
            .map_err(|_| Error::NotFound(format!("Media {}", media_id)))?;

        let mut registry = self.registry.write().await;
        let position = registry
            .media
            .iter()
            .position(|item| item.id == id && registry.owner_of(item) == Some(user_id))
            .ok_or_else(|| Error::NotFound(format!("Media {}", media_id)))?;
        registry.media.remove(position);
        Ok(())
    }

    async fn post_social(&self, user_id: i64, media_id: &str, text: &str) -> Result<()> {
        let id: i64 = media_id
            .parse()
            .map_err(|_| Error::NotFound(format!("Media {}", media_id)))?;

        let registry = self.registry.read().await;
        let owned = registry
            .media
            .iter()
            .any(|item| item.id == id && registry.owner_of(item) == Some(user_id));
        if !owned {
            return Err(Error::NotFound(format!("Media {}", media_id)));
        }

        tracing::info!("📣 mock social post for media {}: {}", media_id, text);
        Ok(())
    }
}
