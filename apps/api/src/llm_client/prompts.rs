// Shared prompt constants.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting fragments.

/// Suffix appended to every system prompt that expects a JSON object back.
pub const JSON_ONLY_SUFFIX: &str = "You MUST output strictly valid JSON. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

pub const HEALTH_CHECK_SYSTEM: &str = "You are a helpful assistant.";

pub const HEALTH_CHECK_PROMPT: &str = r#"Respond with {"status": "ok"}"#;
