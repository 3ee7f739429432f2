use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// What a generated pack sells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub problem: String,
    pub promise: String,
    pub proof: String,
    pub pitch: String,
}

impl Offer {
    /// Names of the fields left blank, in declaration order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("problem", &self.problem),
            ("promise", &self.promise),
            ("proof", &self.proof),
            ("pitch", &self.pitch),
        ]
        .into_iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OfferProfileRow {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    pub problem: String,
    pub promise: String,
    pub proof: String,
    pub pitch: String,
    pub brand_voice: Option<String>,
    pub constraints: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OfferProfileRow {
    pub fn offer(&self) -> Offer {
        Offer {
            problem: self.problem.clone(),
            promise: self.promise.clone(),
            proof: self.proof.clone(),
            pitch: self.pitch.clone(),
        }
    }
}
