//! Axum route handlers for the Discovery API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::discovery::ranking::{rank_candidates, DiscoveryCandidate};
use crate::discovery::suggest::{suggest_for_niche, NicheSuggestions};
use crate::errors::AppError;
use crate::models::reference::{Platform, ReferenceRow};
use crate::references::store::upsert_ranked;
use crate::routes::params::{non_blank, AppJson};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    #[serde(default)]
    pub candidates: Vec<DiscoveryCandidate>,
}

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub success: bool,
    pub count: usize,
    pub references: Vec<ReferenceRow>,
}

#[derive(Debug, Deserialize)]
pub struct SuggestRequest {
    #[serde(default)]
    pub niche: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SuggestResponse {
    pub success: bool,
    pub suggestions: NicheSuggestions,
}

/// POST /api/discover/ingest
///
/// Scores and ranks a batch of fetched candidates and upserts the top ones
/// by URL. Returns the stored rows in rank order.
pub async fn handle_ingest(
    State(state): State<AppState>,
    AppJson(request): AppJson<IngestRequest>,
) -> Result<Json<IngestResponse>, AppError> {
    if request.candidates.is_empty() {
        return Err(AppError::Validation("No candidates provided".to_string()));
    }

    let submitted = request.candidates.len();
    let ranked = rank_candidates(request.candidates);

    let mut references = Vec::with_capacity(ranked.len());
    for candidate in &ranked {
        references.push(upsert_ranked(&state.db, candidate).await?);
    }

    info!(
        "Ingested {} of {} discovery candidates",
        references.len(),
        submitted
    );

    Ok(Json(IngestResponse {
        success: true,
        count: references.len(),
        references,
    }))
}

/// Platform for suggestions; TikTok when unspecified.
fn suggestion_platform(raw: &Option<String>) -> Result<Platform, AppError> {
    non_blank(raw)
        .map(str::parse::<Platform>)
        .transpose()
        .map_err(AppError::Validation)
        .map(|p| p.unwrap_or(Platform::Tiktok))
}

/// POST /api/discover/suggest
pub async fn handle_suggest(
    State(state): State<AppState>,
    AppJson(request): AppJson<SuggestRequest>,
) -> Result<Json<SuggestResponse>, AppError> {
    let niche = non_blank(&request.niche)
        .ok_or_else(|| AppError::Validation("Niche is required".to_string()))?;
    let platform = suggestion_platform(&request.platform)?;

    let suggestions = suggest_for_niche(state.llm.as_ref(), niche, platform).await?;

    info!(
        "Suggested {} creators and {} hashtags for '{}' on {}",
        suggestions.creators.len(),
        suggestions.hashtags.len(),
        niche,
        platform
    );

    Ok(Json(SuggestResponse {
        success: true,
        suggestions,
    }))
}
