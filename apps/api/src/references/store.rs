use sqlx::types::Json;
use sqlx::PgPool;

use crate::discovery::ranking::RankedReference;
use crate::models::reference::{ContentMetrics, Platform, ReferenceRow};

/// Parameters for inserting a single reference.
pub struct NewReference<'a> {
    pub id: &'a str,
    pub platform: Platform,
    pub url: &'a str,
    pub title: &'a str,
    pub creator: &'a str,
    pub metrics: &'a ContentMetrics,
    pub transcript: Option<&'a str>,
    pub viral_score: f64,
    pub thumbnail_url: Option<&'a str>,
}

pub async fn get_reference(pool: &PgPool, id: &str) -> Result<Option<ReferenceRow>, sqlx::Error> {
    sqlx::query_as::<_, ReferenceRow>("SELECT * FROM content_references WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Highest viral score first; unscored references sort last.
pub async fn list_references(
    pool: &PgPool,
    platform: Option<Platform>,
    limit: i64,
    offset: i64,
) -> Result<Vec<ReferenceRow>, sqlx::Error> {
    sqlx::query_as::<_, ReferenceRow>(
        r#"
        SELECT * FROM content_references
        WHERE ($1::text IS NULL OR platform = $1)
        ORDER BY viral_score DESC NULLS LAST, created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(platform.map(|p| p.as_str()))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn count_references(
    pool: &PgPool,
    platform: Option<Platform>,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM content_references WHERE ($1::text IS NULL OR platform = $1)",
    )
    .bind(platform.map(|p| p.as_str()))
    .fetch_one(pool)
    .await
}

pub async fn insert_reference(
    pool: &PgPool,
    new: NewReference<'_>,
) -> Result<ReferenceRow, sqlx::Error> {
    sqlx::query_as::<_, ReferenceRow>(
        r#"
        INSERT INTO content_references
            (id, platform, url, title, creator, metrics, transcript, viral_score, thumbnail_url)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(new.id)
    .bind(new.platform.as_str())
    .bind(new.url)
    .bind(new.title)
    .bind(new.creator)
    .bind(Json(new.metrics))
    .bind(new.transcript)
    .bind(new.viral_score)
    .bind(new.thumbnail_url)
    .fetch_one(pool)
    .await
}

/// Inserts or refreshes a discovered reference keyed on its URL.
/// An existing transcript survives a refresh that carries none.
pub async fn upsert_ranked(
    pool: &PgPool,
    ranked: &RankedReference,
) -> Result<ReferenceRow, sqlx::Error> {
    sqlx::query_as::<_, ReferenceRow>(
        r#"
        INSERT INTO content_references
            (id, platform, url, title, creator, metrics, transcript, viral_score, thumbnail_url)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ON CONFLICT (url) DO UPDATE SET
            title = EXCLUDED.title,
            creator = EXCLUDED.creator,
            metrics = EXCLUDED.metrics,
            transcript = COALESCE(EXCLUDED.transcript, content_references.transcript),
            viral_score = EXCLUDED.viral_score,
            thumbnail_url = EXCLUDED.thumbnail_url,
            updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(&ranked.id)
    .bind(ranked.platform.as_str())
    .bind(&ranked.url)
    .bind(&ranked.title)
    .bind(&ranked.creator)
    .bind(Json(&ranked.metrics))
    .bind(ranked.transcript.as_deref())
    .bind(ranked.viral_score)
    .bind(ranked.thumbnail_url.as_deref())
    .fetch_one(pool)
    .await
}
