//! In-memory content source
//!
//! Seedable stand-in for the database-backed domain services. The mutation
//! helpers play the part of admin write handlers.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};

use super::{ContentSource, SourceError};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewsItem {
    pub id: String,
    pub title: String,
    pub category: String,
    pub summary: String,
    pub published_at: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PollOption {
    pub label: String,
    pub votes: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Poll {
    pub id: String,
    pub question: String,
    pub options: Vec<PollOption>,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Card {
    pub id: String,
    pub title: String,
    pub image_url: String,
}

#[derive(Debug, Default)]
struct ContentData {
    /// Newest first
    news: Vec<NewsItem>,
    polls: Vec<Poll>,
    cards: Vec<Card>,
    app_config: Value,
    radio_config: Value,
}

/// Thread-safe in-memory content.
#[derive(Debug, Default)]
pub struct InMemoryContent {
    data: RwLock<ContentData>,
    computations: AtomicU64,
    unavailable: AtomicBool,
}

impl InMemoryContent {
    /// Creates an empty source with `null` configs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a source with a small demo station.
    pub fn seeded() -> Self {
        let source = Self::new();
        for (id, title, category) in [
            ("3", "Summer festival line-up announced", "events"),
            ("2", "New evening show starts Monday", "shows"),
            ("1", "Studio renovation complete", "station"),
        ] {
            source.push_news(NewsItem {
                id: id.to_string(),
                title: title.to_string(),
                category: category.to_string(),
                summary: format!("{}.", title),
                published_at: format!("2024-06-0{}T08:00:00Z", id),
            });
        }
        source.upsert_poll(Poll {
            id: "5".to_string(),
            question: "Which morning segment do you enjoy most?".to_string(),
            options: vec![
                PollOption { label: "Traffic".to_string(), votes: 12 },
                PollOption { label: "Weather".to_string(), votes: 30 },
            ],
            active: true,
        });
        source.set_cards(vec![Card {
            id: "c1".to_string(),
            title: "Listen live".to_string(),
            image_url: "/media/cards/live.jpg".to_string(),
        }]);
        source.set_app_config(json!({"min_version": "2.1.0", "features": {"polls": true}}));
        source.set_radio_config(json!({
            "station": "Station FM",
            "stream_url": "https://stream.example.org/live.mp3",
        }));
        source
    }

    fn read(&self) -> RwLockReadGuard<'_, ContentData> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ContentData> {
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Counts a computation and fails if the source is marked unavailable.
    fn begin(&self) -> Result<(), SourceError> {
        self.computations.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(SourceError::Unavailable("content database offline".to_string()));
        }
        Ok(())
    }

    /// Number of payload computations performed so far.
    pub fn computations(&self) -> u64 {
        self.computations.load(Ordering::SeqCst)
    }

    /// Makes every subsequent computation fail until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Adds an article in front of the list.
    pub fn push_news(&self, item: NewsItem) {
        self.write().news.insert(0, item);
    }

    /// Replaces the article with the same id, or adds it in front.
    pub fn upsert_news(&self, item: NewsItem) {
        let mut data = self.write();
        match data.news.iter_mut().find(|n| n.id == item.id) {
            Some(existing) => *existing = item,
            None => data.news.insert(0, item),
        }
    }

    pub fn upsert_poll(&self, poll: Poll) {
        let mut data = self.write();
        match data.polls.iter_mut().find(|p| p.id == poll.id) {
            Some(existing) => *existing = poll,
            None => data.polls.push(poll),
        }
    }

    /// Overwrites the vote count of one option. Returns false if nothing matched.
    pub fn set_poll_votes(&self, poll_id: &str, label: &str, votes: u64) -> bool {
        let mut data = self.write();
        let option = data
            .polls
            .iter_mut()
            .filter(|p| p.id == poll_id)
            .flat_map(|p| p.options.iter_mut())
            .find(|o| o.label == label);

        match option {
            Some(option) => {
                option.votes = votes;
                true
            }
            None => false,
        }
    }

    pub fn set_cards(&self, cards: Vec<Card>) {
        self.write().cards = cards;
    }

    pub fn set_app_config(&self, config: Value) {
        self.write().app_config = config;
    }

    pub fn set_radio_config(&self, config: Value) {
        self.write().radio_config = config;
    }
}

#[async_trait]
impl ContentSource for InMemoryContent {
    async fn news_page(&self, page: u32, limit: u32, category: &str) -> Result<Value, SourceError> {
        self.begin()?;
        let data = self.read();

        let matching: Vec<&NewsItem> = data
            .news
            .iter()
            .filter(|n| category == "all" || n.category == category)
            .collect();
        let offset = (page.saturating_sub(1) as usize).saturating_mul(limit as usize);
        let items: Vec<&NewsItem> = matching.iter().skip(offset).take(limit as usize).copied().collect();

        Ok(json!({
            "items": items,
            "page": page,
            "limit": limit,
            "category": category,
            "total": matching.len(),
        }))
    }

    async fn news_detail(&self, id: &str) -> Result<Value, SourceError> {
        self.begin()?;
        let data = self.read();
        let item = data
            .news
            .iter()
            .find(|n| n.id == id)
            .ok_or_else(|| SourceError::NotFound(format!("news {}", id)))?;
        serde_json::to_value(item).map_err(|e| SourceError::Unavailable(e.to_string()))
    }

    async fn cards(&self) -> Result<Value, SourceError> {
        self.begin()?;
        Ok(json!({ "cards": self.read().cards }))
    }

    async fn app_config(&self) -> Result<Value, SourceError> {
        self.begin()?;
        Ok(self.read().app_config.clone())
    }

    async fn active_polls(&self) -> Result<Value, SourceError> {
        self.begin()?;
        let data = self.read();
        let active: Vec<&Poll> = data.polls.iter().filter(|p| p.active).collect();
        Ok(json!({ "polls": active }))
    }

    async fn radio_config(&self) -> Result<Value, SourceError> {
        self.begin()?;
        Ok(self.read().radio_config.clone())
    }
}
