//! Pack generation: prompt assembly and the JSON contract with the model.
//!
//! The model replies with snake_case keys; the validated `GenerationOutput`
//! is stored camelCase as a pack's `contents`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::generation::prompts::{generation_system, platform_hints, GENERATION_PROMPT_TEMPLATE};
use crate::llm_client::{extract_json_candidate, ChatCompleter, LlmError};
use crate::models::analysis::AnalysisRow;
use crate::models::offer::Offer;
use crate::models::reference::Platform;

/// How much transcript stands in for a missing analysis.
const WHY_IT_WORKED_TRANSCRIPT_CHARS: usize = 200;
const WHY_IT_WORKED_FALLBACK: &str = "Strong hook and engaging content";

/// Fields the model must return, checked in this order.
pub const REQUIRED_FIELDS: &[&str] = &[
    "script",
    "script_variants",
    "captions",
    "hashtags",
    "beats",
    "beat_sheet",
    "broll",
    "thumbnail_brief",
    "subtitles",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beat {
    pub t: f64,
    pub beat: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BeatType {
    Hook,
    Setup,
    Proof,
    Payoff,
    Cta,
    Transition,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetBeat {
    pub t: f64,
    pub beat: String,
    #[serde(rename = "type")]
    pub beat_type: BeatType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrollCue {
    pub t: f64,
    pub cue: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shot_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
}

/// A generated content pack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOutput {
    pub script: String,
    pub script_variants: Vec<String>,
    pub captions: String,
    pub hashtags: Vec<String>,
    pub beats: Vec<Beat>,
    pub beat_sheet: Vec<SheetBeat>,
    pub broll: Vec<BrollCue>,
    pub thumbnail_brief: String,
    /// SRT.
    pub subtitles: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vo_script: Option<String>,
}

/// The model's reply shape.
#[derive(Debug, Deserialize)]
struct RawGeneration {
    script: String,
    script_variants: Vec<String>,
    captions: String,
    hashtags: Vec<String>,
    beats: Vec<Beat>,
    beat_sheet: Vec<SheetBeat>,
    broll: Vec<BrollCue>,
    thumbnail_brief: String,
    subtitles: String,
    #[serde(default)]
    vo_script: Option<String>,
}

impl From<RawGeneration> for GenerationOutput {
    fn from(raw: RawGeneration) -> Self {
        Self {
            script: raw.script,
            script_variants: raw.script_variants,
            captions: raw.captions,
            hashtags: raw.hashtags,
            beats: raw.beats,
            beat_sheet: raw.beat_sheet,
            broll: raw.broll,
            thumbnail_brief: raw.thumbnail_brief,
            subtitles: raw.subtitles,
            vo_script: raw.vo_script.filter(|s| !s.trim().is_empty()),
        }
    }
}

/// Checks the reply against the contract. Absent, null or blank-string
/// required fields fail with `Missing required field: <name>`; wrongly typed
/// fields fail as parse errors.
pub fn validate_generation(value: Value) -> Result<GenerationOutput, LlmError> {
    if !value.is_object() {
        return Err(LlmError::MalformedResponse(
            "generation reply is not a JSON object".to_string(),
        ));
    }

    for field in REQUIRED_FIELDS {
        let present = match value.get(*field) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(_) => true,
        };
        if !present {
            return Err(LlmError::MalformedResponse(format!(
                "Missing required field: {field}"
            )));
        }
    }

    let raw: RawGeneration = serde_json::from_value(value)?;
    Ok(raw.into())
}

/// The pattern the pack should imitate: analysis reasons, else the opening
/// of the transcript, else a generic line.
pub fn why_it_worked(analysis: Option<&AnalysisRow>, transcript: Option<&str>) -> String {
    if let Some(reasons) = analysis
        .map(|a| &a.why_worked)
        .filter(|reasons| !reasons.is_empty())
    {
        return reasons.join("; ");
    }

    transcript
        .map(|t| t.chars().take(WHY_IT_WORKED_TRANSCRIPT_CHARS).collect::<String>())
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| WHY_IT_WORKED_FALLBACK.to_string())
}

/// Fills the generation template for one platform, reference and offer.
pub fn build_generation_prompt(
    platform: Platform,
    reference_title: &str,
    why_it_worked: &str,
    offer: &Offer,
) -> String {
    GENERATION_PROMPT_TEMPLATE
        .replace("{platform_upper}", &platform.as_str().to_uppercase())
        .replace("{platform_hints}", platform_hints(platform))
        .replace("{platform}", platform.as_str())
        .replace("{title}", reference_title)
        .replace("{why_it_worked}", why_it_worked)
        .replace("{problem}", &offer.problem)
        .replace("{promise}", &offer.promise)
        .replace("{proof}", &offer.proof)
        .replace("{pitch}", &offer.pitch)
}

/// Asks the model for a pack and validates the reply.
pub async fn generate_content(
    llm: &dyn ChatCompleter,
    platform: Platform,
    reference_title: &str,
    why_it_worked: &str,
    offer: &Offer,
) -> Result<GenerationOutput, LlmError> {
    let prompt = build_generation_prompt(platform, reference_title, why_it_worked, offer);
    let raw = llm.chat_json(&generation_system(), &prompt).await?;
    let value: Value = serde_json::from_str(extract_json_candidate(&raw))?;
    let output = validate_generation(value)?;

    info!(
        "Generated {} pack: {} variants, {} hashtags, {} beats",
        platform,
        output.script_variants.len(),
        output.hashtags.len(),
        output.beat_sheet.len()
    );

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::ScriptedCompleter;
    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;

    fn offer() -> Offer {
        Offer {
            problem: "Meal prep takes hours".to_string(),
            promise: "Dinner in 15 minutes".to_string(),
            proof: "12k students".to_string(),
            pitch: "Join the 7-day challenge".to_string(),
        }
    }

    fn valid_reply() -> Value {
        json!({
            "script": "[TEXT: 15-minute dinners] Stop wasting Sundays...",
            "script_variants": ["Your Sunday is gone?", "15 minutes. That's it."],
            "captions": "Dinner solved. Link in bio.",
            "hashtags": ["#mealprep", "#quickdinner"],
            "beats": [{"t": 0, "beat": "hook"}, {"t": 3.5, "beat": "setup"}],
            "beat_sheet": [
                {"t": 0, "beat": "Pattern interrupt", "type": "hook"},
                {"t": 12, "beat": "Swipe", "type": "montage"}
            ],
            "broll": [{"t": 2, "cue": "chopping onions", "shot_type": "overhead"}],
            "thumbnail_brief": "Close-up of a plate, bold 15 MIN text",
            "subtitles": "1\n00:00:00,000 --> 00:00:02,000\nStop wasting Sundays\n"
        })
    }

    fn analysis_row(why_worked: Vec<&str>) -> AnalysisRow {
        AnalysisRow {
            id: Uuid::new_v4(),
            reference_id: "yt123".to_string(),
            hooks: json!([]),
            structure: json!({}),
            reasons: json!({}),
            scores: json!({}),
            why_worked: why_worked.into_iter().map(String::from).collect(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_valid_reply_maps_to_camel_case_output() {
        let output = validate_generation(valid_reply()).unwrap();
        assert_eq!(output.script_variants.len(), 2);
        assert_eq!(output.beat_sheet[0].beat_type, BeatType::Hook);
        assert_eq!(output.broll[0].shot_type.as_deref(), Some("overhead"));
        assert!(output.vo_script.is_none());

        let stored = serde_json::to_value(&output).unwrap();
        assert!(stored.get("scriptVariants").is_some());
        assert!(stored.get("thumbnailBrief").is_some());
        assert!(stored.get("voScript").is_none());
    }

    #[test]
    fn test_unknown_beat_type_is_tolerated() {
        let output = validate_generation(valid_reply()).unwrap();
        assert_eq!(output.beat_sheet[1].beat_type, BeatType::Other);
    }

    #[test]
    fn test_missing_field_is_named() {
        let mut reply = valid_reply();
        reply.as_object_mut().unwrap().remove("beat_sheet");
        let err = validate_generation(reply).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Malformed LLM response: Missing required field: beat_sheet"
        );
    }

    #[test]
    fn test_blank_string_counts_as_missing() {
        let mut reply = valid_reply();
        reply["captions"] = json!("   ");
        let err = validate_generation(reply).unwrap_err();
        assert!(err.to_string().contains("Missing required field: captions"));
    }

    #[test]
    fn test_first_missing_field_reported_in_order() {
        let mut reply = valid_reply();
        reply["subtitles"] = Value::Null;
        reply.as_object_mut().unwrap().remove("script");
        let err = validate_generation(reply).unwrap_err();
        assert!(err.to_string().ends_with("Missing required field: script"));
    }

    #[test]
    fn test_empty_arrays_satisfy_presence() {
        let mut reply = valid_reply();
        reply["script_variants"] = json!([]);
        assert!(validate_generation(reply).is_ok());
    }

    #[test]
    fn test_wrong_type_is_parse_error() {
        let mut reply = valid_reply();
        reply["hashtags"] = json!("#one #two");
        assert!(matches!(validate_generation(reply), Err(LlmError::Parse(_))));
    }

    #[test]
    fn test_why_it_worked_prefers_analysis() {
        let analysis = analysis_row(vec!["Direct address", "Numbers up front"]);
        assert_eq!(
            why_it_worked(Some(&analysis), Some("transcript")),
            "Direct address; Numbers up front"
        );
    }

    #[test]
    fn test_why_it_worked_falls_back_to_transcript_then_default() {
        let empty = analysis_row(vec![]);
        let long = "x".repeat(500);
        assert_eq!(why_it_worked(Some(&empty), Some(&long)).len(), 200);
        assert_eq!(why_it_worked(None, Some("  ")), WHY_IT_WORKED_FALLBACK);
        assert_eq!(why_it_worked(None, None), WHY_IT_WORKED_FALLBACK);
    }

    #[test]
    fn test_prompt_carries_platform_hints_and_offer() {
        let prompt = build_generation_prompt(
            Platform::Tiktok,
            "How I meal prep",
            "Direct address",
            &offer(),
        );
        assert!(prompt.starts_with("CREATE TIKTOK CONTENT PACK\nPlatform: tiktok"));
        assert!(prompt.contains("Pattern interrupt in first 2s"));
        assert!(prompt.contains("Pitch: Join the 7-day challenge"));
        assert!(!prompt.contains("{platform"));
    }

    #[test]
    fn test_each_platform_gets_its_own_hints() {
        let yt = build_generation_prompt(Platform::Youtube, "t", "w", &offer());
        let ig = build_generation_prompt(Platform::Instagram, "t", "w", &offer());
        assert!(yt.contains("YouTube Shorts"));
        assert!(ig.contains("Instagram Reels"));
        assert!(!ig.contains("YouTube Shorts"));
    }

    #[tokio::test]
    async fn test_generate_content_validates_reply() {
        let llm = ScriptedCompleter::replying(&valid_reply().to_string());
        let output = generate_content(&llm, Platform::Youtube, "t", "w", &offer())
            .await
            .unwrap();
        assert_eq!(output.hashtags, vec!["#mealprep", "#quickdinner"]);
        let (system, _) = llm.prompts.lock().unwrap()[0].clone();
        assert!(system.contains("strictly valid JSON"));
    }

    #[tokio::test]
    async fn test_generate_content_rejects_incomplete_reply() {
        let llm = ScriptedCompleter::replying(r#"{"script": "only a script"}"#);
        let err = generate_content(&llm, Platform::Youtube, "t", "w", &offer())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("script_variants"));
    }
}
