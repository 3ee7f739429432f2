//! Viral score and the metric derivations that feed it.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::reference::ContentMetrics;

/// Short-form sweet spot: anything in this window gets the full duration score.
const OPTIMAL_DURATION_SECS: (f64, f64) = (30.0, 60.0);
const DURATION_CENTER_SECS: f64 = 45.0;
const DURATION_PENALTY_PER_SEC: f64 = 0.2;
const MAX_DURATION_SCORE: f64 = 10.0;
const MAX_VIRAL_SCORE: f64 = 100.0;

static ISO_DURATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"PT(?:([0-9]+)H)?(?:([0-9]+)M)?(?:([0-9]+)S)?").expect("valid duration regex")
});

/// Scores a reference 0–100 from reach, engagement and length.
///
/// - views contribute `log10(views + 1) * 10`
/// - engagement rate (percent) contributes `rate / 100 * 20`
/// - duration contributes 10 inside 30–60s, decaying by 0.2/s away from 45s
///
/// The sum is capped at 100 and rounded to two decimals.
pub fn calculate_viral_score(metrics: &ContentMetrics) -> f64 {
    let view_score = ((metrics.views as f64) + 1.0).log10() * 10.0;
    let engagement_score = metrics.engagement_rate / 100.0 * 20.0;
    let total = (view_score + engagement_score + duration_score(metrics.duration))
        .min(MAX_VIRAL_SCORE);
    (total * 100.0).round() / 100.0
}

fn duration_score(duration: f64) -> f64 {
    let (lo, hi) = OPTIMAL_DURATION_SECS;
    if (lo..=hi).contains(&duration) {
        MAX_DURATION_SCORE
    } else {
        (MAX_DURATION_SCORE - (DURATION_CENTER_SECS - duration).abs() * DURATION_PENALTY_PER_SEC)
            .max(0.0)
    }
}

/// Likes plus comments as a percentage of views. Zero views means zero engagement.
pub fn engagement_rate(views: u64, likes: u64, comments: u64) -> f64 {
    if views == 0 {
        return 0.0;
    }
    (likes as f64 + comments as f64) / views as f64 * 100.0
}

/// Parses ISO-8601 `PT#H#M#S` durations into seconds. Unparseable input is 0.
pub fn parse_iso8601_duration(duration: &str) -> u64 {
    let Some(caps) = ISO_DURATION.captures(duration) else {
        return 0;
    };
    let part = |i: usize| -> u64 {
        caps.get(i)
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .unwrap_or(0)
    };
    part(1)
        .saturating_mul(3600)
        .saturating_add(part(2).saturating_mul(60))
        .saturating_add(part(3))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(views: u64, engagement_rate: f64, duration: f64) -> ContentMetrics {
        ContentMetrics {
            views,
            likes: 0,
            comments: 0,
            engagement_rate,
            duration,
        }
    }

    #[test]
    fn test_zero_metrics_score_only_duration_penalty() {
        // log10(1) = 0, no engagement, duration 0 → 10 - 45*0.2 = 1.0
        assert_eq!(calculate_viral_score(&metrics(0, 0.0, 0.0)), 1.0);
    }

    #[test]
    fn test_optimal_duration_gets_full_bonus() {
        // 9999 views → log10(10000)*10 = 40; 5% → 1.0; 45s → 10
        assert_eq!(calculate_viral_score(&metrics(9_999, 5.0, 45.0)), 51.0);
    }

    #[test]
    fn test_duration_window_edges_inclusive() {
        assert_eq!(duration_score(30.0), 10.0);
        assert_eq!(duration_score(60.0), 10.0);
        // 61s: 10 - 16*0.2 = 6.8
        assert!((duration_score(61.0) - 6.8).abs() < 1e-9);
    }

    #[test]
    fn test_long_videos_floor_at_zero_duration_score() {
        assert_eq!(duration_score(600.0), 0.0);
    }

    #[test]
    fn test_score_capped_at_100() {
        let score = calculate_viral_score(&metrics(u64::MAX / 2, 400.0, 45.0));
        assert_eq!(score, 100.0);
    }

    #[test]
    fn test_score_rounded_to_two_decimals() {
        let score = calculate_viral_score(&metrics(123_456, 3.33, 22.0));
        assert_eq!((score * 100.0).round() / 100.0, score);
    }

    #[test]
    fn test_engagement_rate_zero_views() {
        assert_eq!(engagement_rate(0, 10, 5), 0.0);
    }

    #[test]
    fn test_engagement_rate_percentage() {
        assert!((engagement_rate(1_000, 40, 10) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_duration_full() {
        assert_eq!(parse_iso8601_duration("PT1H2M3S"), 3723);
    }

    #[test]
    fn test_parse_duration_partial_components() {
        assert_eq!(parse_iso8601_duration("PT45S"), 45);
        assert_eq!(parse_iso8601_duration("PT2M"), 120);
    }

    #[test]
    fn test_parse_duration_garbage_is_zero() {
        assert_eq!(parse_iso8601_duration("forty seconds"), 0);
        assert_eq!(parse_iso8601_duration(""), 0);
    }

    #[test]
    fn test_engagement_rate_survives_counter_overflow() {
        let rate = engagement_rate(1_000, u64::MAX, 1);
        assert!(rate.is_finite());
        assert!(rate > 1e15);
    }

    #[test]
    fn test_parse_duration_saturates_huge_hours() {
        assert_eq!(parse_iso8601_duration("PT5124095576030432H"), u64::MAX);
    }

    #[test]
    fn test_parse_duration_ignores_non_ascii_digits() {
        assert_eq!(parse_iso8601_duration("PT\u{0663}M"), 0);
    }
}
