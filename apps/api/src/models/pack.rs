use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PackRow {
    pub id: Uuid,
    pub project_id: Uuid,
    pub reference_id: Option<String>,
    pub offer_id: Option<Uuid>,
    pub platform: String,
    pub contents: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
