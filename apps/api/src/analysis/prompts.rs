// Prompt constants for transcript analysis.

pub const ANALYSIS_SYSTEM: &str =
    "You label short-form videos. Output STRICT JSON with keys hooks, structure, reasons, scores.";

/// Replace `{transcript}` before sending.
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"Transcript:
{transcript}

Return JSON: { hooks:[{type,line?}], structure:{stages:[{name,t?}]}, reasons:{bullets:[...] , evidence:[...]}, scores:{hook_clarity:0..1,pacing:0..1} }"#;
