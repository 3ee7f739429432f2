//! Transcript analysis: heuristics first, then an LLM refinement merged on top.
//!
//! Flow: heuristics → LLM refine (JSON) → shallow merge (LLM keys win) → clamp scores.
//! Any refinement failure degrades to the heuristic result; analysis itself never fails.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::analysis::heuristics::{detect_hooks, heuristic_reasons, segment_structure};
use crate::analysis::prompts::{ANALYSIS_PROMPT_TEMPLATE, ANALYSIS_SYSTEM};
use crate::llm_client::{extract_json_candidate, ChatCompleter};

/// Shortest transcript worth analyzing, in characters.
pub const MIN_TRANSCRIPT_CHARS: usize = 20;

const DEFAULT_HOOK_CLARITY: f64 = 0.7;
const DEFAULT_PACING: f64 = 0.6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hook {
    #[serde(rename = "type")]
    pub hook_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub name: String,
    /// Seconds from the start of the video.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    pub stages: Vec<Stage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reasons {
    pub bullets: Vec<String>,
    #[serde(default)]
    pub evidence: Vec<String>,
}

/// Both scores live in `0..=1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hook_clarity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pacing: Option<f64>,
}

impl Scores {
    fn clamped(self) -> Self {
        Self {
            hook_clarity: self.hook_clarity.map(|s| s.clamp(0.0, 1.0)),
            pacing: self.pacing.map(|s| s.clamp(0.0, 1.0)),
        }
    }
}

/// Why a reference performed well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub hooks: Vec<Hook>,
    pub structure: Structure,
    pub reasons: Reasons,
    pub scores: Scores,
}

/// The deterministic baseline the LLM refines.
pub fn heuristic_analysis(transcript: &str) -> Analysis {
    Analysis {
        hooks: detect_hooks(transcript),
        structure: segment_structure(transcript),
        reasons: heuristic_reasons(transcript),
        scores: Scores {
            hook_clarity: Some(DEFAULT_HOOK_CLARITY),
            pacing: Some(DEFAULT_PACING),
        },
    }
}

/// Overlays every non-null top-level key of `refined` onto `base`.
/// Fails when `refined` is not an object or the result no longer has the
/// `Analysis` shape.
pub fn merge_refinement(base: &Analysis, refined: Value) -> Result<Analysis, String> {
    let Value::Object(refined) = refined else {
        return Err("refinement is not a JSON object".to_string());
    };

    let mut merged: Map<String, Value> = match serde_json::to_value(base) {
        Ok(Value::Object(map)) => map,
        Ok(_) => return Err("base analysis did not serialize to an object".to_string()),
        Err(e) => return Err(e.to_string()),
    };

    for (key, value) in refined {
        if !value.is_null() {
            merged.insert(key, value);
        }
    }

    let mut analysis: Analysis =
        serde_json::from_value(Value::Object(merged)).map_err(|e| e.to_string())?;
    analysis.scores = analysis.scores.clamped();
    Ok(analysis)
}

/// Analyzes a transcript, preferring the LLM's labels wherever it supplies them.
pub async fn analyze_transcript(llm: &dyn ChatCompleter, transcript: &str) -> Analysis {
    let base = heuristic_analysis(transcript);
    let prompt = ANALYSIS_PROMPT_TEMPLATE.replace("{transcript}", transcript);

    let raw = match llm.chat_json(ANALYSIS_SYSTEM, &prompt).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Analysis refinement call failed, using heuristics: {e}");
            return base;
        }
    };

    let refined = match serde_json::from_str::<Value>(extract_json_candidate(&raw)) {
        Ok(v) => v,
        Err(e) => {
            warn!("Analysis refinement was not valid JSON, using heuristics: {e}");
            return base;
        }
    };

    match merge_refinement(&base, refined) {
        Ok(analysis) => {
            debug!("Merged LLM refinement over heuristic analysis");
            analysis
        }
        Err(e) => {
            warn!("Analysis refinement did not fit the schema, using heuristics: {e}");
            base
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::ScriptedCompleter;
    use serde_json::json;

    const TRANSCRIPT: &str = "Stop scrolling. You need to hear this. \
        3 ways to save 500 dollars a month. Link in bio for the full guide.";

    #[test]
    fn test_heuristic_defaults() {
        let a = heuristic_analysis(TRANSCRIPT);
        assert_eq!(a.scores.hook_clarity, Some(0.7));
        assert_eq!(a.scores.pacing, Some(0.6));
        assert_eq!(a.hooks[0].hook_type, "Pattern interrupt");
        assert_eq!(a.structure.stages.last().unwrap().name, "CTA");
    }

    #[test]
    fn test_merge_prefers_refined_keys() {
        let base = heuristic_analysis(TRANSCRIPT);
        let merged = merge_refinement(
            &base,
            json!({"hooks": [{"type": "shock", "line": "Stop scrolling."}]}),
        )
        .unwrap();
        assert_eq!(merged.hooks[0].hook_type, "shock");
        // untouched keys come from the heuristics
        assert_eq!(merged.structure, base.structure);
        assert_eq!(merged.reasons, base.reasons);
    }

    #[test]
    fn test_merge_replaces_whole_key_not_fields() {
        let base = heuristic_analysis(TRANSCRIPT);
        let merged = merge_refinement(&base, json!({"scores": {"pacing": 0.9}})).unwrap();
        assert_eq!(merged.scores.pacing, Some(0.9));
        assert_eq!(merged.scores.hook_clarity, None);
    }

    #[test]
    fn test_merge_clamps_scores() {
        let base = heuristic_analysis(TRANSCRIPT);
        let merged =
            merge_refinement(&base, json!({"scores": {"hook_clarity": 8, "pacing": -1}})).unwrap();
        assert_eq!(merged.scores.hook_clarity, Some(1.0));
        assert_eq!(merged.scores.pacing, Some(0.0));
    }

    #[test]
    fn test_merge_ignores_nulls_and_unknown_keys() {
        let base = heuristic_analysis(TRANSCRIPT);
        let merged =
            merge_refinement(&base, json!({"structure": null, "vibe": "immaculate"})).unwrap();
        assert_eq!(merged, base);
    }

    #[test]
    fn test_merge_rejects_wrong_shape() {
        let base = heuristic_analysis(TRANSCRIPT);
        assert!(merge_refinement(&base, json!({"hooks": "a strong hook"})).is_err());
        assert!(merge_refinement(&base, json!(["not", "an", "object"])).is_err());
    }

    #[tokio::test]
    async fn test_analyze_merges_llm_reply() {
        let llm = ScriptedCompleter::replying(
            r#"```json
            {"reasons": {"bullets": ["Money hook", "Clear CTA"], "evidence": ["save 500 dollars"]},
             "scores": {"hook_clarity": 0.9, "pacing": 0.8}}
            ```"#,
        );
        let analysis = analyze_transcript(&llm, TRANSCRIPT).await;
        assert_eq!(analysis.reasons.bullets, vec!["Money hook", "Clear CTA"]);
        assert_eq!(analysis.scores.hook_clarity, Some(0.9));
        assert_eq!(analysis.hooks[0].hook_type, "Pattern interrupt");

        let prompt = llm.last_user_prompt().unwrap();
        assert!(prompt.starts_with("Transcript:\nStop scrolling."));
    }

    #[tokio::test]
    async fn test_analyze_falls_back_on_llm_error() {
        let llm = ScriptedCompleter::failing(500);
        let analysis = analyze_transcript(&llm, TRANSCRIPT).await;
        assert_eq!(analysis, heuristic_analysis(TRANSCRIPT));
    }

    #[tokio::test]
    async fn test_analyze_falls_back_on_garbage() {
        let llm = ScriptedCompleter::replying("I cannot label this video.");
        let analysis = analyze_transcript(&llm, TRANSCRIPT).await;
        assert_eq!(analysis, heuristic_analysis(TRANSCRIPT));
    }
}
