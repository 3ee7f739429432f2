//! The tracked generation run shared by `/api/generate` and pack regeneration.
//!
//! Flow: create job (pending) → processing → generate → write pack → completed.
//! A failure after the job exists marks it failed with the error text.

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

use crate::analysis::store::get_analysis_for_reference;
use crate::errors::AppError;
use crate::generation::generator::{generate_content, why_it_worked, GenerationOutput};
use crate::generation::jobs;
use crate::llm_client::ChatCompleter;
use crate::models::analysis::AnalysisRow;
use crate::models::job::GenerationJobRow;
use crate::models::offer::Offer;
use crate::models::pack::PackRow;
use crate::models::reference::{Platform, ReferenceRow};
use crate::packs::store::{insert_pack, update_pack, NewPack};

/// Where the generated contents land.
#[derive(Debug, Clone, Copy)]
pub enum PackTarget {
    /// A new pack in `project_id`.
    Insert {
        project_id: Uuid,
        offer_id: Option<Uuid>,
    },
    /// Replace the contents of an existing pack.
    Overwrite(Uuid),
}

#[derive(Debug)]
pub struct GenerationRun {
    pub job: GenerationJobRow,
    pub pack: PackRow,
    pub output: GenerationOutput,
}

/// The rows a generation run reads and writes. `PgPool` is the only
/// production implementation.
#[async_trait]
pub trait GenerationStore: Send + Sync {
    async fn latest_analysis(&self, reference_id: &str)
        -> Result<Option<AnalysisRow>, sqlx::Error>;

    async fn create_job(
        &self,
        reference_id: &str,
        offer: &Value,
    ) -> Result<GenerationJobRow, sqlx::Error>;

    async fn mark_processing(&self, id: Uuid) -> Result<Option<GenerationJobRow>, sqlx::Error>;

    async fn mark_completed(
        &self,
        id: Uuid,
        outputs: &Value,
        pack_id: Uuid,
    ) -> Result<Option<GenerationJobRow>, sqlx::Error>;

    async fn mark_failed(
        &self,
        id: Uuid,
        error_message: &str,
    ) -> Result<Option<GenerationJobRow>, sqlx::Error>;

    async fn insert_pack(&self, new: NewPack<'_>) -> Result<PackRow, sqlx::Error>;

    /// `None` when the pack no longer exists.
    async fn overwrite_pack(
        &self,
        id: Uuid,
        contents: &Value,
    ) -> Result<Option<PackRow>, sqlx::Error>;
}

#[async_trait]
impl GenerationStore for PgPool {
    async fn latest_analysis(
        &self,
        reference_id: &str,
    ) -> Result<Option<AnalysisRow>, sqlx::Error> {
        get_analysis_for_reference(self, reference_id).await
    }

    async fn create_job(
        &self,
        reference_id: &str,
        offer: &Value,
    ) -> Result<GenerationJobRow, sqlx::Error> {
        jobs::create_job(self, reference_id, offer).await
    }

    async fn mark_processing(&self, id: Uuid) -> Result<Option<GenerationJobRow>, sqlx::Error> {
        jobs::mark_processing(self, id).await
    }

    async fn mark_completed(
        &self,
        id: Uuid,
        outputs: &Value,
        pack_id: Uuid,
    ) -> Result<Option<GenerationJobRow>, sqlx::Error> {
        jobs::mark_completed(self, id, outputs, pack_id).await
    }

    async fn mark_failed(
        &self,
        id: Uuid,
        error_message: &str,
    ) -> Result<Option<GenerationJobRow>, sqlx::Error> {
        jobs::mark_failed(self, id, error_message).await
    }

    async fn insert_pack(&self, new: NewPack<'_>) -> Result<PackRow, sqlx::Error> {
        insert_pack(self, new).await
    }

    async fn overwrite_pack(
        &self,
        id: Uuid,
        contents: &Value,
    ) -> Result<Option<PackRow>, sqlx::Error> {
        update_pack(self, id, Some(contents), None).await
    }
}

pub async fn run_generation(
    store: &dyn GenerationStore,
    llm: &dyn ChatCompleter,
    reference: &ReferenceRow,
    platform: Platform,
    offer: &Offer,
    target: PackTarget,
) -> Result<GenerationRun, AppError> {
    let analysis = store.latest_analysis(&reference.id).await?;
    let why = why_it_worked(analysis.as_ref(), reference.transcript.as_deref());

    let offer_json = serde_json::to_value(offer).context("Failed to encode offer")?;
    let job = store.create_job(&reference.id, &offer_json).await?;
    store
        .mark_processing(job.id)
        .await?
        .ok_or_else(|| anyhow!("Generation job {} left pending", job.id))?;

    info!(
        "Generation job {} started: reference={}, platform={}",
        job.id, reference.id, platform
    );

    let (output, contents, pack) =
        match generate_and_store(store, llm, reference, platform, offer, &why, target).await {
            Ok(done) => done,
            Err(e) => {
                let message = e.to_string();
                error!("Generation job {} failed: {message}", job.id);
                store.mark_failed(job.id, &message).await?;
                return Err(AppError::Llm(format!("Content generation failed: {message}")));
            }
        };

    let job = store
        .mark_completed(job.id, &contents, pack.id)
        .await?
        .ok_or_else(|| anyhow!("Generation job {} could not complete", job.id))?;

    info!("Generation job {} completed: pack={}", job.id, pack.id);

    Ok(GenerationRun { job, pack, output })
}

async fn generate_and_store(
    store: &dyn GenerationStore,
    llm: &dyn ChatCompleter,
    reference: &ReferenceRow,
    platform: Platform,
    offer: &Offer,
    why: &str,
    target: PackTarget,
) -> anyhow::Result<(GenerationOutput, Value, PackRow)> {
    let output = generate_content(llm, platform, &reference.title, why, offer).await?;
    let contents = serde_json::to_value(&output)?;

    let pack = match target {
        PackTarget::Insert {
            project_id,
            offer_id,
        } => {
            store
                .insert_pack(NewPack {
                    project_id,
                    reference_id: Some(&reference.id),
                    offer_id,
                    platform,
                    contents: &contents,
                })
                .await?
        }
        PackTarget::Overwrite(pack_id) => store
            .overwrite_pack(pack_id, &contents)
            .await?
            .ok_or_else(|| anyhow!("Pack {pack_id} disappeared during regeneration"))?,
    };

    Ok((output, contents, pack))
}
