//! Axum route handlers for stored references.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::analysis::store::get_analysis_for_reference;
use crate::discovery::scoring::{calculate_viral_score, engagement_rate};
use crate::errors::AppError;
use crate::models::analysis::AnalysisRow;
use crate::models::reference::{ContentMetrics, Platform, ReferenceRow};
use crate::references::store::{
    count_references, get_reference, insert_reference, list_references, NewReference,
};
use crate::routes::params::{non_blank, AppJson, AppQuery};
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 100;

#[derive(Debug, Default, Deserialize)]
pub struct ListReferencesQuery {
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
    #[serde(default)]
    pub offset: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateReferenceRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub creator: Option<String>,
    #[serde(default)]
    pub metrics: Option<ContentMetrics>,
    #[serde(default)]
    pub transcript: Option<String>,
    #[serde(default, alias = "viralScore")]
    pub viral_score: Option<f64>,
    #[serde(default, alias = "thumbnailUrl")]
    pub thumbnail_url: Option<String>,
}

/// A reference row with its latest analysis, if one exists.
#[derive(Debug, Serialize)]
pub struct ReferenceWithAnalysis {
    #[serde(flatten)]
    pub reference: ReferenceRow,
    pub analysis: Option<AnalysisRow>,
}

#[derive(Debug, Serialize)]
pub struct ReferenceListResponse {
    pub success: bool,
    pub references: Vec<ReferenceWithAnalysis>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Serialize)]
pub struct ReferenceResponse {
    pub success: bool,
    pub reference: ReferenceWithAnalysis,
}

#[derive(Debug, Serialize)]
pub struct CreatedReferenceResponse {
    pub success: bool,
    pub reference: ReferenceRow,
    pub message: String,
}

#[derive(Debug, PartialEq)]
struct Page {
    platform: Option<Platform>,
    limit: i64,
    offset: i64,
}

fn parse_page(query: &ListReferencesQuery) -> Result<Page, AppError> {
    let number = |field: &str, raw: &Option<String>, default: i64| -> Result<i64, AppError> {
        non_blank(raw)
            .map(|v| {
                v.parse::<i64>()
                    .map_err(|_| AppError::Validation(format!("{field} must be an integer")))
            })
            .transpose()
            .map(|v| v.unwrap_or(default))
    };

    Ok(Page {
        platform: non_blank(&query.platform)
            .map(str::parse::<Platform>)
            .transpose()
            .map_err(AppError::Validation)?,
        limit: number("limit", &query.limit, DEFAULT_LIMIT)?.clamp(1, MAX_LIMIT),
        offset: number("offset", &query.offset, 0)?.max(0),
    })
}

async fn with_analysis(
    pool: &PgPool,
    reference: ReferenceRow,
) -> Result<ReferenceWithAnalysis, sqlx::Error> {
    let analysis = get_analysis_for_reference(pool, &reference.id).await?;
    Ok(ReferenceWithAnalysis {
        reference,
        analysis,
    })
}

/// Fills in engagement when the caller left it at zero.
fn complete_metrics(mut metrics: ContentMetrics) -> ContentMetrics {
    if metrics.engagement_rate == 0.0 && metrics.views > 0 {
        metrics.engagement_rate = engagement_rate(metrics.views, metrics.likes, metrics.comments);
    }
    metrics
}

/// GET /api/references?platform=&limit=&offset=
///
/// Highest viral score first, each row enriched with its analysis.
pub async fn handle_list_references(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ListReferencesQuery>,
) -> Result<Json<ReferenceListResponse>, AppError> {
    let page = parse_page(&query)?;

    let rows = list_references(&state.db, page.platform, page.limit, page.offset).await?;
    let total = count_references(&state.db, page.platform).await?;

    let mut references = Vec::with_capacity(rows.len());
    for row in rows {
        references.push(with_analysis(&state.db, row).await?);
    }

    Ok(Json(ReferenceListResponse {
        success: true,
        references,
        total,
        limit: page.limit,
        offset: page.offset,
    }))
}

/// GET /api/references/:id
pub async fn handle_get_reference(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ReferenceResponse>, AppError> {
    let reference = get_reference(&state.db, &id)
        .await?
        .ok_or_else(|| AppError::NotFound("Reference not found".to_string()))?;

    Ok(Json(ReferenceResponse {
        success: true,
        reference: with_analysis(&state.db, reference).await?,
    }))
}

/// POST /api/references
pub async fn handle_create_reference(
    State(state): State<AppState>,
    AppJson(request): AppJson<CreateReferenceRequest>,
) -> Result<Json<CreatedReferenceResponse>, AppError> {
    let required = |field: &str| AppError::Validation(format!("{field} is required"));

    let platform = non_blank(&request.platform).ok_or_else(|| required("platform"))?;
    let url = non_blank(&request.url).ok_or_else(|| required("url"))?;
    let title = non_blank(&request.title).ok_or_else(|| required("title"))?;
    let creator = non_blank(&request.creator).ok_or_else(|| required("creator"))?;
    let metrics = request.metrics.clone().ok_or_else(|| required("metrics"))?;
    let platform: Platform = platform.parse().map_err(AppError::Validation)?;

    let metrics = complete_metrics(metrics);
    let viral_score = request
        .viral_score
        .unwrap_or_else(|| calculate_viral_score(&metrics));
    let id = non_blank(&request.id)
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let reference = insert_reference(
        &state.db,
        NewReference {
            id: &id,
            platform,
            url,
            title,
            creator,
            metrics: &metrics,
            transcript: non_blank(&request.transcript),
            viral_score,
            thumbnail_url: non_blank(&request.thumbnail_url),
        },
    )
    .await?;

    info!(
        "Created {} reference {} (viral score {:.2})",
        platform, reference.id, viral_score
    );

    Ok(Json(CreatedReferenceResponse {
        success: true,
        reference,
        message: "Reference created successfully".to_string(),
    }))
}
