//! Axum route handlers for generated packs.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::generation::pipeline::{run_generation, PackTarget};
use crate::models::pack::PackRow;
use crate::models::reference::Platform;
use crate::offers::store::get_offer_profile;
use crate::packs::store::{
    delete_pack, duplicate_pack, get_pack, insert_pack, list_packs, update_pack, NewPack,
};
use crate::references::store::get_reference;
use crate::routes::params::{non_blank, parse_uuid, require_uuid, AppJson, AppQuery};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListPacksQuery {
    #[serde(default, alias = "projectId")]
    pub project_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePackRequest {
    #[serde(default, alias = "projectId")]
    pub project_id: Option<String>,
    #[serde(default, alias = "referenceId")]
    pub reference_id: Option<String>,
    #[serde(default, alias = "offerId")]
    pub offer_id: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub contents: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PatchPackRequest {
    #[serde(default)]
    pub contents: Option<Value>,
    #[serde(default)]
    pub platform: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PacksResponse {
    pub packs: Vec<PackRow>,
}

#[derive(Debug, Serialize)]
pub struct PackResponse {
    pub success: bool,
    pub pack: PackRow,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub success: bool,
}

fn pack_not_found() -> AppError {
    AppError::NotFound("Pack not found".to_string())
}

/// A patch with at least one usable field.
#[derive(Debug, PartialEq)]
struct PackPatch {
    contents: Option<Value>,
    platform: Option<Platform>,
}

fn validate_patch(request: PatchPackRequest) -> Result<PackPatch, AppError> {
    let contents = request.contents.filter(|c| !c.is_null());
    let platform = non_blank(&request.platform)
        .map(str::parse::<Platform>)
        .transpose()
        .map_err(AppError::Validation)?;

    if contents.is_none() && platform.is_none() {
        return Err(AppError::Validation("No update data provided".to_string()));
    }
    Ok(PackPatch { contents, platform })
}

/// GET /api/packs?projectId=
pub async fn handle_list_packs(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ListPacksQuery>,
) -> Result<Json<PacksResponse>, AppError> {
    let project_id = require_uuid("projectId", &query.project_id)?;
    let packs = list_packs(&state.db, project_id).await?;
    Ok(Json(PacksResponse { packs }))
}

/// POST /api/packs
///
/// Stores hand-authored or edited contents as a pack.
pub async fn handle_create_pack(
    State(state): State<AppState>,
    AppJson(request): AppJson<CreatePackRequest>,
) -> Result<Json<PackResponse>, AppError> {
    let required =
        || AppError::Validation("project_id, platform, and contents are required".to_string());

    let project_id = non_blank(&request.project_id).ok_or_else(required)?;
    let project_id = parse_uuid("project_id", project_id)?;
    let platform: Platform = non_blank(&request.platform)
        .ok_or_else(required)?
        .parse()
        .map_err(AppError::Validation)?;
    let contents = request
        .contents
        .as_ref()
        .filter(|c| !c.is_null())
        .ok_or_else(required)?;
    let offer_id = non_blank(&request.offer_id)
        .map(|id| parse_uuid("offer_id", id))
        .transpose()?;

    let pack = insert_pack(
        &state.db,
        NewPack {
            project_id,
            reference_id: non_blank(&request.reference_id),
            offer_id,
            platform,
            contents,
        },
    )
    .await?;

    info!("Created pack {} for project {}", pack.id, project_id);

    Ok(Json(PackResponse {
        success: true,
        pack,
    }))
}

/// GET /api/packs/:id
pub async fn handle_get_pack(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PackResponse>, AppError> {
    let id = parse_uuid("Pack ID", &id)?;
    let pack = get_pack(&state.db, id).await?.ok_or_else(pack_not_found)?;
    Ok(Json(PackResponse {
        success: true,
        pack,
    }))
}

/// PATCH /api/packs/:id
pub async fn handle_patch_pack(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(request): AppJson<PatchPackRequest>,
) -> Result<Json<PackResponse>, AppError> {
    let id = parse_uuid("Pack ID", &id)?;
    let patch = validate_patch(request)?;

    let pack = update_pack(&state.db, id, patch.contents.as_ref(), patch.platform)
        .await?
        .ok_or_else(pack_not_found)?;

    Ok(Json(PackResponse {
        success: true,
        pack,
    }))
}

/// DELETE /api/packs/:id
pub async fn handle_delete_pack(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, AppError> {
    let id = parse_uuid("Pack ID", &id)?;
    if !delete_pack(&state.db, id).await? {
        return Err(pack_not_found());
    }
    info!("Deleted pack {id}");
    Ok(Json(DeletedResponse { success: true }))
}

/// POST /api/packs/:id/duplicate
pub async fn handle_duplicate_pack(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PackResponse>, AppError> {
    let id = parse_uuid("Pack ID", &id)?;
    let pack = duplicate_pack(&state.db, id)
        .await?
        .ok_or_else(pack_not_found)?;

    info!("Duplicated pack {id} into {}", pack.id);

    Ok(Json(PackResponse {
        success: true,
        pack,
    }))
}

/// POST /api/packs/:id/regenerate
///
/// Re-runs generation from the pack's reference, platform and offer profile
/// and overwrites its contents. The run is tracked as a generation job.
pub async fn handle_regenerate_pack(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PackResponse>, AppError> {
    let id = parse_uuid("Pack ID", &id)?;
    let pack = get_pack(&state.db, id).await?.ok_or_else(pack_not_found)?;

    let reference_id = pack.reference_id.as_deref().ok_or_else(|| {
        AppError::Validation("Pack has no reference to regenerate from".to_string())
    })?;
    let offer_id = pack.offer_id.ok_or_else(|| {
        AppError::Validation("Pack has no offer profile to regenerate from".to_string())
    })?;
    let platform: Platform = pack.platform.parse().map_err(AppError::Validation)?;

    let reference = get_reference(&state.db, reference_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Reference not found".to_string()))?;
    let offer = get_offer_profile(&state.db, offer_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Offer profile not found".to_string()))?
        .offer();

    let run = run_generation(
        &state.db,
        state.llm.as_ref(),
        &reference,
        platform,
        &offer,
        PackTarget::Overwrite(pack.id),
    )
    .await?;

    info!("Regenerated pack {} via job {}", run.pack.id, run.job.id);

    Ok(Json(PackResponse {
        success: true,
        pack: run.pack,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn patch(body: Value) -> Result<PackPatch, AppError> {
        validate_patch(serde_json::from_value(body).unwrap())
    }

    #[test]
    fn test_empty_patch_rejected() {
        let err = patch(json!({})).unwrap_err();
        assert_eq!(err.to_string(), "Validation error: No update data provided");
        assert!(patch(json!({"contents": null, "platform": "  "})).is_err());
    }

    #[test]
    fn test_patch_parses_platform() {
        let p = patch(json!({"platform": "tiktok"})).unwrap();
        assert_eq!(
            p,
            PackPatch {
                contents: None,
                platform: Some(Platform::Tiktok)
            }
        );
    }

    #[test]
    fn test_patch_rejects_unknown_platform() {
        assert!(matches!(
            patch(json!({"platform": "vine"})),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_patch_keeps_contents() {
        let p = patch(json!({"contents": {"script": "new"}})).unwrap();
        assert_eq!(p.contents, Some(json!({"script": "new"})));
        assert!(p.platform.is_none());
    }
}
