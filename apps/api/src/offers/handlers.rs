//! Axum route handlers for offer profiles.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::offer::OfferProfileRow;
use crate::offers::store::{
    delete_offer_profile, insert_offer_profile, list_offer_profiles, update_offer_profile,
    NewOfferProfile, OfferProfileChanges,
};
use crate::routes::params::{non_blank, require_uuid, AppJson, AppQuery};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProjectQuery {
    #[serde(default, alias = "projectId")]
    pub project_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct IdQuery {
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateOfferRequest {
    #[serde(default, alias = "projectId")]
    pub project_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub problem: Option<String>,
    #[serde(default)]
    pub promise: Option<String>,
    #[serde(default)]
    pub proof: Option<String>,
    #[serde(default)]
    pub pitch: Option<String>,
    #[serde(default, alias = "brandVoice")]
    pub brand_voice: Option<String>,
    #[serde(default)]
    pub constraints: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOfferRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub problem: Option<String>,
    #[serde(default)]
    pub promise: Option<String>,
    #[serde(default)]
    pub proof: Option<String>,
    #[serde(default)]
    pub pitch: Option<String>,
    #[serde(default, alias = "brandVoice")]
    pub brand_voice: Option<String>,
    #[serde(default)]
    pub constraints: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct ProfilesResponse {
    pub success: bool,
    pub profiles: Vec<OfferProfileRow>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub success: bool,
    pub profile: OfferProfileRow,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

/// A create request with every required field checked.
struct ValidOffer<'a> {
    project_id: Uuid,
    name: &'a str,
    problem: &'a str,
    promise: &'a str,
    proof: &'a str,
    pitch: &'a str,
}

fn validate_create(request: &CreateOfferRequest) -> Result<ValidOffer<'_>, AppError> {
    let required = || {
        AppError::Validation(
            "Project ID, name, problem, promise, proof, and pitch are required".to_string(),
        )
    };

    let project_id = require_uuid("projectId", &request.project_id)?;
    Ok(ValidOffer {
        project_id,
        name: non_blank(&request.name).ok_or_else(required)?,
        problem: non_blank(&request.problem).ok_or_else(required)?,
        promise: non_blank(&request.promise).ok_or_else(required)?,
        proof: non_blank(&request.proof).ok_or_else(required)?,
        pitch: non_blank(&request.pitch).ok_or_else(required)?,
    })
}

/// GET /api/offers?projectId=
pub async fn handle_list_offers(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ProjectQuery>,
) -> Result<Json<ProfilesResponse>, AppError> {
    let project_id = require_uuid("projectId", &query.project_id)?;
    let profiles = list_offer_profiles(&state.db, project_id).await?;

    Ok(Json(ProfilesResponse {
        success: true,
        profiles,
    }))
}

/// POST /api/offers
pub async fn handle_create_offer(
    State(state): State<AppState>,
    AppJson(request): AppJson<CreateOfferRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    let valid = validate_create(&request)?;

    let profile = insert_offer_profile(
        &state.db,
        NewOfferProfile {
            project_id: valid.project_id,
            name: valid.name,
            problem: valid.problem,
            promise: valid.promise,
            proof: valid.proof,
            pitch: valid.pitch,
            brand_voice: non_blank(&request.brand_voice),
            constraints: request.constraints.as_ref().filter(|c| !c.is_null()),
        },
    )
    .await?;

    info!("Created offer profile {} ({})", profile.id, profile.name);

    Ok(Json(ProfileResponse {
        success: true,
        profile,
    }))
}

/// PUT /api/offers
///
/// Fields left out of the body keep their stored values.
pub async fn handle_update_offer(
    State(state): State<AppState>,
    AppJson(request): AppJson<UpdateOfferRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    let id = require_uuid("Profile ID", &request.id)?;

    let changes = OfferProfileChanges {
        name: non_blank(&request.name),
        problem: non_blank(&request.problem),
        promise: non_blank(&request.promise),
        proof: non_blank(&request.proof),
        pitch: non_blank(&request.pitch),
        brand_voice: non_blank(&request.brand_voice),
        constraints: request.constraints.as_ref().filter(|c| !c.is_null()),
    };

    let profile = update_offer_profile(&state.db, id, changes)
        .await?
        .ok_or_else(|| AppError::NotFound("Offer profile not found".to_string()))?;

    Ok(Json(ProfileResponse {
        success: true,
        profile,
    }))
}

/// DELETE /api/offers?id=
pub async fn handle_delete_offer(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<IdQuery>,
) -> Result<Json<DeleteResponse>, AppError> {
    let id = require_uuid("Profile ID", &query.id)?;

    if !delete_offer_profile(&state.db, id).await? {
        return Err(AppError::NotFound("Offer profile not found".to_string()));
    }

    info!("Deleted offer profile {id}");

    Ok(Json(DeleteResponse {
        success: true,
        message: "Profile deleted successfully".to_string(),
    }))
}
