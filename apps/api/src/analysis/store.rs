use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::analysis::analyzer::Analysis;
use crate::models::analysis::AnalysisRow;

pub async fn get_analysis_for_reference(
    pool: &PgPool,
    reference_id: &str,
) -> Result<Option<AnalysisRow>, sqlx::Error> {
    sqlx::query_as::<_, AnalysisRow>(
        "SELECT * FROM analyses WHERE reference_id = $1 ORDER BY created_at DESC LIMIT 1",
    )
    .bind(reference_id)
    .fetch_optional(pool)
    .await
}

/// Persists an analysis. `why_worked` mirrors the reason bullets.
pub async fn insert_analysis(
    pool: &PgPool,
    reference_id: &str,
    analysis: &Analysis,
) -> Result<AnalysisRow, sqlx::Error> {
    sqlx::query_as::<_, AnalysisRow>(
        r#"
        INSERT INTO analyses (id, reference_id, hooks, structure, reasons, scores, why_worked)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(reference_id)
    .bind(Json(&analysis.hooks))
    .bind(Json(&analysis.structure))
    .bind(Json(&analysis.reasons))
    .bind(Json(&analysis.scores))
    .bind(&analysis.reasons.bullets)
    .fetch_one(pool)
    .await
}
