use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

/// Social platforms Reelscope discovers from and generates for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Youtube,
    Instagram,
    Tiktok,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Youtube, Platform::Instagram, Platform::Tiktok];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Youtube => "youtube",
            Platform::Instagram => "instagram",
            Platform::Tiktok => "tiktok",
        }
    }

    /// Human-facing name used in prompts.
    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Youtube => "YouTube",
            Platform::Instagram => "Instagram",
            Platform::Tiktok => "TikTok",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| "Invalid platform. Must be one of: youtube, instagram, tiktok".to_string())
    }
}

/// Platform metrics stored in `content_references.metrics`.
/// `engagement_rate` is a percentage; `duration` is in seconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContentMetrics {
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    #[serde(alias = "engagement_rate")]
    pub engagement_rate: f64,
    pub duration: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ReferenceRow {
    pub id: String,
    pub platform: String,
    pub url: String,
    pub title: String,
    pub creator: String,
    pub metrics: Value,
    pub transcript: Option<String>,
    pub viral_score: Option<f64>,
    pub thumbnail_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
