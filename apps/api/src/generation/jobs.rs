//! Generation job persistence.
//!
//! Every transition is a single conditional UPDATE: the row only moves when
//! its current status is a legal source for the target, so a job can never
//! leave a terminal state.

use serde_json::Value;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::models::job::{GenerationJobRow, JobStatus};

const ALL_STATUSES: [JobStatus; 4] = [
    JobStatus::Pending,
    JobStatus::Processing,
    JobStatus::Completed,
    JobStatus::Failed,
];

/// States a job may move into `next` from.
fn legal_sources(next: JobStatus) -> Vec<String> {
    ALL_STATUSES
        .iter()
        .filter(|s| s.can_transition_to(next))
        .map(|s| s.as_str().to_string())
        .collect()
}

pub async fn create_job(
    pool: &PgPool,
    reference_id: &str,
    offer: &Value,
) -> Result<GenerationJobRow, sqlx::Error> {
    sqlx::query_as::<_, GenerationJobRow>(
        r#"
        INSERT INTO generation_jobs (id, reference_id, offer, status)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(reference_id)
    .bind(offer)
    .bind(JobStatus::Pending.as_str())
    .fetch_one(pool)
    .await
}

pub async fn get_job(pool: &PgPool, id: Uuid) -> Result<Option<GenerationJobRow>, sqlx::Error> {
    sqlx::query_as::<_, GenerationJobRow>("SELECT * FROM generation_jobs WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Returns `None` when the job is missing or not in a legal source state.
async fn transition(
    pool: &PgPool,
    id: Uuid,
    next: JobStatus,
    outputs: Option<&Value>,
    pack_id: Option<Uuid>,
    error_message: Option<&str>,
) -> Result<Option<GenerationJobRow>, sqlx::Error> {
    debug!("Generation job {id} -> {next}");
    sqlx::query_as::<_, GenerationJobRow>(
        r#"
        UPDATE generation_jobs SET
            status = $2,
            outputs = COALESCE($3, outputs),
            pack_id = COALESCE($4, pack_id),
            error_message = COALESCE($5, error_message),
            updated_at = NOW()
        WHERE id = $1 AND status = ANY($6)
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(next.as_str())
    .bind(outputs)
    .bind(pack_id)
    .bind(error_message)
    .bind(legal_sources(next))
    .fetch_optional(pool)
    .await
}

pub async fn mark_processing(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<GenerationJobRow>, sqlx::Error> {
    transition(pool, id, JobStatus::Processing, None, None, None).await
}

pub async fn mark_completed(
    pool: &PgPool,
    id: Uuid,
    outputs: &Value,
    pack_id: Uuid,
) -> Result<Option<GenerationJobRow>, sqlx::Error> {
    transition(pool, id, JobStatus::Completed, Some(outputs), Some(pack_id), None).await
}

pub async fn mark_failed(
    pool: &PgPool,
    id: Uuid,
    error_message: &str,
) -> Result<Option<GenerationJobRow>, sqlx::Error> {
    transition(pool, id, JobStatus::Failed, None, None, Some(error_message)).await
}
