use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::pack::PackRow;
use crate::models::reference::Platform;

/// Parameters for inserting a pack.
pub struct NewPack<'a> {
    pub project_id: Uuid,
    pub reference_id: Option<&'a str>,
    pub offer_id: Option<Uuid>,
    pub platform: Platform,
    pub contents: &'a Value,
}

pub async fn insert_pack(pool: &PgPool, new: NewPack<'_>) -> Result<PackRow, sqlx::Error> {
    sqlx::query_as::<_, PackRow>(
        r#"
        INSERT INTO packs (id, project_id, reference_id, offer_id, platform, contents)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(new.project_id)
    .bind(new.reference_id)
    .bind(new.offer_id)
    .bind(new.platform.as_str())
    .bind(new.contents)
    .fetch_one(pool)
    .await
}

pub async fn get_pack(pool: &PgPool, id: Uuid) -> Result<Option<PackRow>, sqlx::Error> {
    sqlx::query_as::<_, PackRow>("SELECT * FROM packs WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Newest first.
pub async fn list_packs(pool: &PgPool, project_id: Uuid) -> Result<Vec<PackRow>, sqlx::Error> {
    sqlx::query_as::<_, PackRow>(
        "SELECT * FROM packs WHERE project_id = $1 ORDER BY created_at DESC",
    )
    .bind(project_id)
    .fetch_all(pool)
    .await
}

/// Applies whichever of `contents` / `platform` is present.
pub async fn update_pack(
    pool: &PgPool,
    id: Uuid,
    contents: Option<&Value>,
    platform: Option<Platform>,
) -> Result<Option<PackRow>, sqlx::Error> {
    sqlx::query_as::<_, PackRow>(
        r#"
        UPDATE packs SET
            contents = COALESCE($2, contents),
            platform = COALESCE($3, platform),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(contents)
    .bind(platform.map(|p| p.as_str()))
    .fetch_optional(pool)
    .await
}

/// Returns whether a row was deleted.
pub async fn delete_pack(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM packs WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Copies a pack into a new row with a fresh id and timestamps.
pub async fn duplicate_pack(pool: &PgPool, id: Uuid) -> Result<Option<PackRow>, sqlx::Error> {
    sqlx::query_as::<_, PackRow>(
        r#"
        INSERT INTO packs (id, project_id, reference_id, offer_id, platform, contents)
        SELECT $1, project_id, reference_id, offer_id, platform, contents
        FROM packs
        WHERE id = $2
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(id)
    .fetch_optional(pool)
    .await
}
