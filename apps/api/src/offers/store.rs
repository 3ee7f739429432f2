use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::offer::OfferProfileRow;

/// Parameters for inserting an offer profile.
pub struct NewOfferProfile<'a> {
    pub project_id: Uuid,
    pub name: &'a str,
    pub problem: &'a str,
    pub promise: &'a str,
    pub proof: &'a str,
    pub pitch: &'a str,
    pub brand_voice: Option<&'a str>,
    pub constraints: Option<&'a Value>,
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Default)]
pub struct OfferProfileChanges<'a> {
    pub name: Option<&'a str>,
    pub problem: Option<&'a str>,
    pub promise: Option<&'a str>,
    pub proof: Option<&'a str>,
    pub pitch: Option<&'a str>,
    pub brand_voice: Option<&'a str>,
    pub constraints: Option<&'a Value>,
}

/// Newest first.
pub async fn list_offer_profiles(
    pool: &PgPool,
    project_id: Uuid,
) -> Result<Vec<OfferProfileRow>, sqlx::Error> {
    sqlx::query_as::<_, OfferProfileRow>(
        "SELECT * FROM offer_profiles WHERE project_id = $1 ORDER BY created_at DESC",
    )
    .bind(project_id)
    .fetch_all(pool)
    .await
}

pub async fn get_offer_profile(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<OfferProfileRow>, sqlx::Error> {
    sqlx::query_as::<_, OfferProfileRow>("SELECT * FROM offer_profiles WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn insert_offer_profile(
    pool: &PgPool,
    new: NewOfferProfile<'_>,
) -> Result<OfferProfileRow, sqlx::Error> {
    sqlx::query_as::<_, OfferProfileRow>(
        r#"
        INSERT INTO offer_profiles
            (id, project_id, name, problem, promise, proof, pitch, brand_voice, constraints)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(new.project_id)
    .bind(new.name)
    .bind(new.problem)
    .bind(new.promise)
    .bind(new.proof)
    .bind(new.pitch)
    .bind(new.brand_voice)
    .bind(new.constraints)
    .fetch_one(pool)
    .await
}

pub async fn update_offer_profile(
    pool: &PgPool,
    id: Uuid,
    changes: OfferProfileChanges<'_>,
) -> Result<Option<OfferProfileRow>, sqlx::Error> {
    sqlx::query_as::<_, OfferProfileRow>(
        r#"
        UPDATE offer_profiles SET
            name = COALESCE($2, name),
            problem = COALESCE($3, problem),
            promise = COALESCE($4, promise),
            proof = COALESCE($5, proof),
            pitch = COALESCE($6, pitch),
            brand_voice = COALESCE($7, brand_voice),
            constraints = COALESCE($8, constraints),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(changes.name)
    .bind(changes.problem)
    .bind(changes.promise)
    .bind(changes.proof)
    .bind(changes.pitch)
    .bind(changes.brand_voice)
    .bind(changes.constraints)
    .fetch_optional(pool)
    .await
}

/// Returns whether a row was deleted.
pub async fn delete_offer_profile(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM offer_profiles WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
