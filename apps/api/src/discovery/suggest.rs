//! LLM-backed creator and hashtag suggestions for a niche.

use serde::Serialize;
use serde_json::Value;

use crate::discovery::prompts::{SUGGEST_PROMPT_TEMPLATE, SUGGEST_SYSTEM_TEMPLATE};
use crate::errors::AppError;
use crate::llm_client::{call_json, ChatCompleter, LlmError};
use crate::models::reference::Platform;

#[derive(Debug, Clone, Serialize)]
pub struct NicheSuggestions {
    pub niche: String,
    pub platform: Platform,
    pub creators: Vec<String>,
    pub hashtags: Vec<String>,
}

/// Strips a leading `#` and lowercases. Blank tags normalize to `None`.
pub fn normalize_hashtag(tag: &str) -> Option<String> {
    let tag = tag.trim();
    let tag = tag.strip_prefix('#').unwrap_or(tag).trim();
    if tag.is_empty() {
        None
    } else {
        Some(tag.to_lowercase())
    }
}

/// Reads `field` as an array, keeping its string items. A missing or
/// non-array field makes the whole response malformed.
fn string_array(value: &Value, field: &str) -> Result<Vec<String>, LlmError> {
    value
        .get(field)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .ok_or_else(|| LlmError::MalformedResponse(format!("'{field}' must be an array")))
}

fn parse_suggestions(value: &Value) -> Result<(Vec<String>, Vec<String>), LlmError> {
    let creators = string_array(value, "creators")?;
    let mut hashtags: Vec<String> = Vec::new();
    for tag in string_array(value, "hashtags")? {
        if let Some(tag) = normalize_hashtag(&tag) {
            if !hashtags.contains(&tag) {
                hashtags.push(tag);
            }
        }
    }
    Ok((creators, hashtags))
}

pub async fn suggest_for_niche(
    llm: &dyn ChatCompleter,
    niche: &str,
    platform: Platform,
) -> Result<NicheSuggestions, AppError> {
    let system = SUGGEST_SYSTEM_TEMPLATE.replace("{platform}", platform.display_name());
    let prompt = SUGGEST_PROMPT_TEMPLATE
        .replace("{niche}", niche)
        .replace("{platform}", platform.display_name());

    let raw: Value = call_json(llm, &system, &prompt)
        .await
        .map_err(|e| AppError::Llm(format!("Suggestion failed: {e}")))?;

    let (creators, hashtags) = parse_suggestions(&raw)
        .map_err(|e| AppError::Llm(format!("Suggestion failed: {e}")))?;

    Ok(NicheSuggestions {
        niche: niche.to_string(),
        platform,
        creators,
        hashtags,
    })
}
