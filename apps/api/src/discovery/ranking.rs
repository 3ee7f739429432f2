//! Turns already-fetched platform candidates into scored, ranked references.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::discovery::scoring::{calculate_viral_score, engagement_rate, parse_iso8601_duration};
use crate::models::reference::{ContentMetrics, Platform};

/// Only the strongest candidates of a discovery batch are kept.
pub const MAX_DISCOVERY_RESULTS: usize = 20;

/// Duration as reported by the platform: plain seconds or an ISO-8601 string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CandidateDuration {
    Seconds(f64),
    Iso8601(String),
}

impl CandidateDuration {
    pub fn seconds(&self) -> f64 {
        match self {
            CandidateDuration::Seconds(s) => s.max(0.0),
            CandidateDuration::Iso8601(s) => parse_iso8601_duration(s) as f64,
        }
    }
}

/// One raw search hit from a platform client.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoveryCandidate {
    pub platform: Platform,
    pub external_id: String,
    pub url: Option<String>,
    pub title: String,
    pub creator: String,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub comments: u64,
    pub duration: Option<CandidateDuration>,
    pub thumbnail_url: Option<String>,
    pub transcript: Option<String>,
}

/// A candidate with derived metrics and score, ready to upsert.
#[derive(Debug, Clone, Serialize)]
pub struct RankedReference {
    pub id: String,
    pub platform: Platform,
    pub url: String,
    pub title: String,
    pub creator: String,
    pub metrics: ContentMetrics,
    pub viral_score: f64,
    pub thumbnail_url: Option<String>,
    pub transcript: Option<String>,
}

/// Canonical URL for a candidate when the platform client omitted one.
/// TikTok URLs embed the creator handle, so they cannot be derived.
fn default_url(platform: Platform, external_id: &str) -> Option<String> {
    match platform {
        Platform::Youtube => Some(format!("https://www.youtube.com/shorts/{external_id}")),
        Platform::Instagram => Some(format!("https://www.instagram.com/reel/{external_id}/")),
        Platform::Tiktok => None,
    }
}

fn score_candidate(candidate: DiscoveryCandidate) -> Option<RankedReference> {
    let url = candidate
        .url
        .filter(|u| !u.trim().is_empty())
        .or_else(|| default_url(candidate.platform, &candidate.external_id));

    let Some(url) = url else {
        warn!(
            "Skipping {} candidate {} without a URL",
            candidate.platform, candidate.external_id
        );
        return None;
    };

    let metrics = ContentMetrics {
        views: candidate.views,
        likes: candidate.likes,
        comments: candidate.comments,
        engagement_rate: engagement_rate(candidate.views, candidate.likes, candidate.comments),
        duration: candidate
            .duration
            .as_ref()
            .map(CandidateDuration::seconds)
            .unwrap_or(0.0),
    };
    let viral_score = calculate_viral_score(&metrics);

    Some(RankedReference {
        id: candidate.external_id,
        platform: candidate.platform,
        url,
        title: candidate.title,
        creator: candidate.creator,
        metrics,
        viral_score,
        thumbnail_url: candidate.thumbnail_url,
        transcript: candidate.transcript.filter(|t| !t.trim().is_empty()),
    })
}

/// Scores every candidate, orders by viral score (highest first), drops
/// duplicate URLs keeping the best-scoring copy, and keeps the top
/// `MAX_DISCOVERY_RESULTS`.
pub fn rank_candidates(candidates: Vec<DiscoveryCandidate>) -> Vec<RankedReference> {
    let mut ranked: Vec<RankedReference> =
        candidates.into_iter().filter_map(score_candidate).collect();

    ranked.sort_by(|a, b| b.viral_score.total_cmp(&a.viral_score));

    let mut seen = HashSet::new();
    ranked.retain(|r| seen.insert(r.url.clone()));
    ranked.truncate(MAX_DISCOVERY_RESULTS);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn candidate(id: &str, platform: Platform, views: u64) -> DiscoveryCandidate {
        DiscoveryCandidate {
            platform,
            external_id: id.to_string(),
            url: None,
            title: format!("Video {id}"),
            creator: "creator".to_string(),
            views,
            likes: views / 20,
            comments: views / 100,
            duration: Some(CandidateDuration::Seconds(40.0)),
            thumbnail_url: None,
            transcript: None,
        }
    }

    #[test]
    fn test_ranked_highest_score_first() {
        let ranked = rank_candidates(vec![
            candidate("a", Platform::Youtube, 100),
            candidate("b", Platform::Youtube, 1_000_000),
            candidate("c", Platform::Youtube, 10_000),
        ]);
        let ids: Vec<_> = ranked.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_truncates_to_top_twenty() {
        let candidates = (0..30)
            .map(|i| candidate(&format!("v{i}"), Platform::Youtube, 1_000 * (i + 1)))
            .collect();
        let ranked = rank_candidates(candidates);
        assert_eq!(ranked.len(), MAX_DISCOVERY_RESULTS);
        assert_eq!(ranked[0].id, "v29");
    }

    #[test]
    fn test_youtube_url_derived_from_id() {
        let ranked = rank_candidates(vec![candidate("abc123", Platform::Youtube, 10)]);
        assert_eq!(ranked[0].url, "https://www.youtube.com/shorts/abc123");
    }

    #[test]
    fn test_tiktok_without_url_is_skipped() {
        let ranked = rank_candidates(vec![candidate("7301", Platform::Tiktok, 10)]);
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_duplicate_urls_keep_best_copy() {
        let mut low = candidate("dup", Platform::Youtube, 10);
        low.title = "low".to_string();
        let mut high = candidate("dup", Platform::Youtube, 10_000);
        high.title = "high".to_string();
        let ranked = rank_candidates(vec![low, high]);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].title, "high");
    }

    #[test]
    fn test_metrics_derived_from_raw_counts() {
        let ranked = rank_candidates(vec![candidate("m", Platform::Youtube, 1_000)]);
        let m = &ranked[0].metrics;
        // (50 + 10) / 1000 * 100
        assert!((m.engagement_rate - 6.0).abs() < 1e-9);
        assert_eq!(m.duration, 40.0);
        assert_eq!(ranked[0].viral_score, calculate_viral_score(m));
    }

    #[test]
    fn test_candidate_duration_accepts_iso_and_seconds() {
        let iso: DiscoveryCandidate = serde_json::from_value(json!({
            "platform": "youtube", "external_id": "x", "title": "t", "creator": "c",
            "duration": "PT1M5S"
        }))
        .unwrap();
        assert_eq!(iso.duration.unwrap().seconds(), 65.0);

        let secs: DiscoveryCandidate = serde_json::from_value(json!({
            "platform": "instagram", "external_id": "y", "title": "t", "creator": "c",
            "duration": 28
        }))
        .unwrap();
        assert_eq!(secs.duration.unwrap().seconds(), 28.0);
        assert_eq!(secs.views, 0);
    }

    #[test]
    fn test_blank_transcript_dropped() {
        let mut c = candidate("t", Platform::Youtube, 10);
        c.transcript = Some("   ".to_string());
        assert!(rank_candidates(vec![c])[0].transcript.is_none());
    }
}
