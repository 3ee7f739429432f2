//! Axum route handlers for the Analysis API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analysis::analyzer::{analyze_transcript, MIN_TRANSCRIPT_CHARS};
use crate::analysis::store::{get_analysis_for_reference, insert_analysis};
use crate::errors::AppError;
use crate::models::analysis::AnalysisRow;
use crate::references::store::get_reference;
use crate::routes::params::AppJson;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default, alias = "referenceId")]
    pub reference_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub analysis: AnalysisRow,
    pub message: String,
}

/// Returns the untouched transcript when its trimmed text is long enough to
/// analyze. Line breaks at the edges still matter to hook detection.
fn usable_transcript(transcript: Option<&str>) -> Result<&str, AppError> {
    match transcript {
        Some(t) if t.trim().chars().count() >= MIN_TRANSCRIPT_CHARS => Ok(t),
        _ => Err(AppError::Validation("Transcript missing".to_string())),
    }
}

/// POST /api/analyze
///
/// Analyzes a stored reference's transcript. An existing analysis is returned
/// as-is rather than recomputed.
pub async fn handle_analyze(
    State(state): State<AppState>,
    AppJson(request): AppJson<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let reference_id = request
        .reference_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Reference ID is required".to_string()))?;

    let reference = get_reference(&state.db, &reference_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Reference not found".to_string()))?;

    if let Some(existing) = get_analysis_for_reference(&state.db, &reference_id).await? {
        return Ok(Json(AnalyzeResponse {
            success: true,
            analysis: existing,
            message: "Analysis already exists".to_string(),
        }));
    }

    let transcript = usable_transcript(reference.transcript.as_deref())?;

    let analysis = analyze_transcript(state.llm.as_ref(), transcript).await;
    let saved = insert_analysis(&state.db, &reference_id, &analysis).await?;

    info!(
        "Analyzed reference {} ({} reasons)",
        reference_id,
        analysis.reasons.bullets.len()
    );

    Ok(Json(AnalyzeResponse {
        success: true,
        analysis: saved,
        message: "Analysis completed successfully".to_string(),
    }))
}
