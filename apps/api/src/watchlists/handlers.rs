//! Axum route handlers for TikTok watchlists.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::discovery::suggest::normalize_hashtag;
use crate::errors::AppError;
use crate::models::watchlist::WatchItemType;
use crate::routes::params::{non_blank, parse_uuid, AppJson};
use crate::state::AppState;
use crate::watchlists::store::{create_watchlist, NewWatchItem};

const DEFAULT_SOURCE: &str = "manual";

#[derive(Debug, Deserialize)]
pub struct CreateWatchlistRequest {
    #[serde(default, alias = "projectId")]
    pub project_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub niche: Option<String>,
    /// Kept loose so a non-array gets its own message.
    #[serde(default)]
    pub items: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct WatchItemInput {
    #[serde(default, rename = "type")]
    item_type: Option<String>,
    #[serde(default)]
    handle: Option<String>,
    #[serde(default)]
    hashtag: Option<String>,
    #[serde(default)]
    source: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistCreatedResponse {
    pub success: bool,
    pub watchlist_id: Uuid,
    pub message: String,
}

#[derive(Debug, PartialEq)]
struct ValidWatchlist<'a> {
    project_id: Uuid,
    name: &'a str,
    niche: &'a str,
    items: Vec<NewWatchItem>,
}

fn validate_item(index: usize, raw: &Value) -> Result<NewWatchItem, AppError> {
    let invalid = |what: &str| AppError::Validation(format!("items[{index}] {what}"));

    let input: WatchItemInput =
        serde_json::from_value(raw.clone()).map_err(|_| invalid("must be an object"))?;
    let source = non_blank(&input.source).unwrap_or(DEFAULT_SOURCE).to_string();

    match non_blank(&input.item_type) {
        Some("creator") => {
            let handle = non_blank(&input.handle)
                .map(|h| h.trim_start_matches('@').trim())
                .filter(|h| !h.is_empty())
                .ok_or_else(|| invalid("needs a handle"))?;
            Ok(NewWatchItem {
                item_type: WatchItemType::Creator,
                handle: Some(handle.to_string()),
                hashtag: None,
                source,
            })
        }
        Some("hashtag") => {
            let hashtag = input
                .hashtag
                .as_deref()
                .and_then(normalize_hashtag)
                .ok_or_else(|| invalid("needs a hashtag"))?;
            Ok(NewWatchItem {
                item_type: WatchItemType::Hashtag,
                handle: None,
                hashtag: Some(hashtag),
                source,
            })
        }
        _ => Err(invalid("type must be creator or hashtag")),
    }
}

fn validate_watchlist(request: &CreateWatchlistRequest) -> Result<ValidWatchlist<'_>, AppError> {
    let (Some(project_id), Some(name), Some(niche)) = (
        non_blank(&request.project_id),
        non_blank(&request.name),
        non_blank(&request.niche),
    ) else {
        return Err(AppError::Validation(
            "projectId, name, and niche are required".to_string(),
        ));
    };

    let items = match &request.items {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(raw)) => raw
            .iter()
            .enumerate()
            .map(|(i, item)| validate_item(i, item))
            .collect::<Result<Vec<_>, AppError>>()?,
        Some(_) => return Err(AppError::Validation("items must be an array".to_string())),
    };

    Ok(ValidWatchlist {
        project_id: parse_uuid("projectId", project_id)?,
        name,
        niche,
        items,
    })
}

/// POST /api/tiktok/watchlists
///
/// Creates a watchlist together with its items; a failed item leaves no
/// watchlist behind.
pub async fn handle_create_watchlist(
    State(state): State<AppState>,
    AppJson(request): AppJson<CreateWatchlistRequest>,
) -> Result<Json<WatchlistCreatedResponse>, AppError> {
    let valid = validate_watchlist(&request)?;

    let (watchlist, items) = create_watchlist(
        &state.db,
        valid.project_id,
        valid.name,
        valid.niche,
        &valid.items,
    )
    .await?;

    info!(
        "Created watchlist {} '{}' for niche '{}' ({} items)",
        watchlist.id,
        watchlist.name,
        watchlist.niche,
        items.len()
    );

    Ok(Json(WatchlistCreatedResponse {
        success: true,
        watchlist_id: watchlist.id,
        message: "Watchlist created successfully".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(body: Value) -> CreateWatchlistRequest {
        serde_json::from_value(body).unwrap()
    }

    fn project() -> String {
        "6f1c1f0e-3c1a-4c4e-9a57-0c7d3c1b2a11".to_string()
    }

    #[test]
    fn test_items_default_to_empty() {
        let req = request(json!({"projectId": project(), "name": "Gym", "niche": "fitness"}));
        let valid = validate_watchlist(&req).unwrap();
        assert_eq!(valid.name, "Gym");
        assert!(valid.items.is_empty());
    }

    #[test]
    fn test_required_fields_named_together() {
        let err = validate_watchlist(&request(json!({"name": "Gym"}))).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: projectId, name, and niche are required"
        );
    }

    #[test]
    fn test_items_must_be_an_array() {
        let req = request(json!({
            "projectId": project(),
            "name": "Gym",
            "niche": "fitness",
            "items": {"type": "creator", "handle": "lifter"}
        }));
        let err = validate_watchlist(&req).unwrap_err();
        assert_eq!(err.to_string(), "Validation error: items must be an array");
    }

    #[test]
    fn test_items_normalized_with_manual_source() {
        let req = request(json!({
            "projectId": project(),
            "name": "Gym",
            "niche": "fitness",
            "items": [
                {"type": "creator", "handle": "@lifter"},
                {"type": "hashtag", "hashtag": "#GymTok", "source": "suggested"}
            ]
        }));
        let valid = validate_watchlist(&req).unwrap();
        assert_eq!(
            valid.items,
            vec![
                NewWatchItem {
                    item_type: WatchItemType::Creator,
                    handle: Some("lifter".to_string()),
                    hashtag: None,
                    source: "manual".to_string(),
                },
                NewWatchItem {
                    item_type: WatchItemType::Hashtag,
                    handle: None,
                    hashtag: Some("gymtok".to_string()),
                    source: "suggested".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_bad_item_is_reported_by_index() {
        let req = request(json!({
            "projectId": project(),
            "name": "Gym",
            "niche": "fitness",
            "items": [
                {"type": "creator", "handle": "lifter"},
                {"type": "sound", "handle": "x"}
            ]
        }));
        let err = validate_watchlist(&req).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: items[1] type must be creator or hashtag"
        );
    }

    #[test]
    fn test_creator_without_handle_rejected() {
        let req = request(json!({
            "projectId": project(),
            "name": "Gym",
            "niche": "fitness",
            "items": [{"type": "creator", "handle": "@"}]
        }));
        assert!(validate_watchlist(&req).is_err());
    }
}
