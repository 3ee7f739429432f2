//! Axum route handlers for the Generation API.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::generator::GenerationOutput;
use crate::generation::jobs::get_job;
use crate::generation::pipeline::{run_generation, PackTarget};
use crate::models::job::GenerationJobRow;
use crate::models::offer::Offer;
use crate::models::reference::Platform;
use crate::offers::store::get_offer_profile;
use crate::references::store::get_reference;
use crate::routes::params::{non_blank, parse_uuid, AppJson};
use crate::state::AppState;

/// An offer supplied inline with the request; every field may be absent.
#[derive(Debug, Default, Deserialize)]
pub struct OfferInput {
    #[serde(default)]
    pub problem: Option<String>,
    #[serde(default)]
    pub promise: Option<String>,
    #[serde(default)]
    pub proof: Option<String>,
    #[serde(default)]
    pub pitch: Option<String>,
}

impl OfferInput {
    fn into_offer(self) -> Result<Offer, AppError> {
        let offer = Offer {
            problem: self.problem.unwrap_or_default(),
            promise: self.promise.unwrap_or_default(),
            proof: self.proof.unwrap_or_default(),
            pitch: self.pitch.unwrap_or_default(),
        };
        let missing = offer.missing_fields();
        if missing.is_empty() {
            Ok(offer)
        } else {
            Err(AppError::Validation(format!(
                "Offer is missing: {}",
                missing.join(", ")
            )))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default, alias = "referenceId")]
    pub reference_id: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default, alias = "projectId")]
    pub project_id: Option<String>,
    #[serde(default, alias = "offerId")]
    pub offer_id: Option<String>,
    #[serde(default)]
    pub offer: Option<OfferInput>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub success: bool,
    pub job_id: Uuid,
    pub pack_id: Uuid,
    pub outputs: GenerationOutput,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct JobResponse {
    pub success: bool,
    pub job: GenerationJobRow,
}

/// The checked identifiers of a generate request.
#[derive(Debug, PartialEq)]
struct GenerateTarget {
    reference_id: String,
    platform: Platform,
    project_id: Uuid,
    offer_id: Option<Uuid>,
}

fn validate_generate(request: &GenerateRequest) -> Result<GenerateTarget, AppError> {
    let (Some(reference_id), Some(platform), Some(project_id)) = (
        non_blank(&request.reference_id),
        non_blank(&request.platform),
        non_blank(&request.project_id),
    ) else {
        return Err(AppError::Validation(
            "Reference ID, platform, and project ID are required".to_string(),
        ));
    };

    Ok(GenerateTarget {
        reference_id: reference_id.to_string(),
        platform: platform.parse::<Platform>().map_err(AppError::Validation)?,
        project_id: parse_uuid("projectId", project_id)?,
        offer_id: non_blank(&request.offer_id)
            .map(|id| parse_uuid("offerId", id))
            .transpose()?,
    })
}

/// The offer a generation runs against and the profile it came from, if any.
#[derive(Debug, PartialEq)]
struct ResolvedOffer {
    offer: Offer,
    offer_id: Option<Uuid>,
}

/// A stored profile wins over an inline offer. A profile that does not exist
/// falls back to the inline offer and is only an error without one.
fn choose_offer(
    requested: Option<Uuid>,
    profile: Option<Offer>,
    inline: Option<OfferInput>,
) -> Result<ResolvedOffer, AppError> {
    match (requested, profile, inline) {
        (Some(id), Some(offer), _) => Ok(ResolvedOffer {
            offer,
            offer_id: Some(id),
        }),
        (Some(_), None, None) => Err(AppError::NotFound("Offer profile not found".to_string())),
        (Some(id), None, Some(inline)) => {
            warn!("Offer profile {id} not found, falling back to the inline offer");
            Ok(ResolvedOffer {
                offer: inline.into_offer()?,
                offer_id: None,
            })
        }
        (None, _, Some(inline)) => Ok(ResolvedOffer {
            offer: inline.into_offer()?,
            offer_id: None,
        }),
        (None, _, None) => Err(AppError::Validation(
            "An offer or offer ID is required".to_string(),
        )),
    }
}

async fn resolve_offer(
    pool: &PgPool,
    offer_id: Option<Uuid>,
    inline: Option<OfferInput>,
) -> Result<ResolvedOffer, AppError> {
    let profile = match offer_id {
        Some(id) => get_offer_profile(pool, id).await?.map(|p| p.offer()),
        None => None,
    };
    choose_offer(offer_id, profile, inline)
}

/// POST /api/generate
///
/// Runs a tracked generation for one reference and stores the result as a
/// new pack in the project.
pub async fn handle_generate(
    State(state): State<AppState>,
    AppJson(request): AppJson<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    let target = validate_generate(&request)?;

    let reference = get_reference(&state.db, &target.reference_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Reference not found".to_string()))?;

    let resolved = resolve_offer(&state.db, target.offer_id, request.offer).await?;

    let run = run_generation(
        &state.db,
        state.llm.as_ref(),
        &reference,
        target.platform,
        &resolved.offer,
        PackTarget::Insert {
            project_id: target.project_id,
            offer_id: resolved.offer_id,
        },
    )
    .await?;

    Ok(Json(GenerateResponse {
        success: true,
        job_id: run.job.id,
        pack_id: run.pack.id,
        outputs: run.output,
        message: "Content generation completed successfully".to_string(),
    }))
}

/// GET /api/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JobResponse>, AppError> {
    let id = parse_uuid("Job ID", &id)?;
    let job = get_job(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Generation job {id} not found")))?;

    Ok(Json(JobResponse { success: true, job }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(body: serde_json::Value) -> GenerateRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_validate_accepts_camel_case() {
        let project = Uuid::new_v4();
        let offer = Uuid::new_v4();
        let target = validate_generate(&request(json!({
            "referenceId": "yt_abc",
            "platform": "instagram",
            "projectId": project.to_string(),
            "offerId": offer.to_string()
        })))
        .unwrap();
        assert_eq!(
            target,
            GenerateTarget {
                reference_id: "yt_abc".to_string(),
                platform: Platform::Instagram,
                project_id: project,
                offer_id: Some(offer),
            }
        );
    }

    #[test]
    fn test_validate_requires_core_ids() {
        let err = validate_generate(&request(json!({"platform": "youtube"}))).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: Reference ID, platform, and project ID are required"
        );
    }

    #[test]
    fn test_validate_rejects_unknown_platform() {
        let err = validate_generate(&request(json!({
            "reference_id": "yt_abc",
            "platform": "twitter",
            "project_id": Uuid::new_v4().to_string()
        })))
        .unwrap_err();
        assert!(err.to_string().contains("Must be one of: youtube, instagram, tiktok"));
    }

    #[test]
    fn test_inline_offer_needs_every_field() {
        let input: OfferInput = serde_json::from_value(json!({
            "problem": "No time",
            "promise": "Fast dinners"
        }))
        .unwrap();
        let err = input.into_offer().unwrap_err();
        assert_eq!(err.to_string(), "Validation error: Offer is missing: proof, pitch");
    }

    #[test]
    fn test_complete_inline_offer_passes() {
        let input: OfferInput = serde_json::from_value(json!({
            "problem": "No time",
            "promise": "Fast dinners",
            "proof": "12k students",
            "pitch": "Join"
        }))
        .unwrap();
        assert_eq!(input.into_offer().unwrap().proof, "12k students");
    }

    fn full_inline() -> OfferInput {
        serde_json::from_value(json!({
            "problem": "No time",
            "promise": "Fast dinners",
            "proof": "12k students",
            "pitch": "Join"
        }))
        .unwrap()
    }

    fn stored_offer() -> Offer {
        Offer {
            problem: "Stored problem".to_string(),
            promise: "Stored promise".to_string(),
            proof: "Stored proof".to_string(),
            pitch: "Stored pitch".to_string(),
        }
    }

    #[test]
    fn test_stored_profile_wins_over_inline() {
        let id = Uuid::new_v4();
        let resolved = choose_offer(Some(id), Some(stored_offer()), Some(full_inline())).unwrap();
        assert_eq!(resolved.offer, stored_offer());
        assert_eq!(resolved.offer_id, Some(id));
    }

    #[test]
    fn test_missing_profile_falls_back_to_inline() {
        let resolved = choose_offer(Some(Uuid::new_v4()), None, Some(full_inline())).unwrap();
        assert_eq!(resolved.offer.problem, "No time");
        assert_eq!(resolved.offer_id, None);
    }

    #[test]
    fn test_missing_profile_without_inline_is_not_found() {
        let err = choose_offer(Some(Uuid::new_v4()), None, None).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_no_offer_at_all_is_a_validation_error() {
        let err = choose_offer(None, None, None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: An offer or offer ID is required"
        );
    }
}
