use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// What a watch item follows on TikTok.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatchItemType {
    Creator,
    Hashtag,
}

impl WatchItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WatchItemType::Creator => "creator",
            WatchItemType::Hashtag => "hashtag",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WatchlistRow {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    pub niche: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WatchItemRow {
    pub id: Uuid,
    pub watchlist_id: Uuid,
    pub item_type: String,
    pub handle: Option<String>,
    pub hashtag: Option<String>,
    pub source: String,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}
