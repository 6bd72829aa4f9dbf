//! Batch archiver: the end-to-end entry point
//!
//! Resolves a staging directory, stages every artifact, packs them into one
//! encrypted archive and removes the staging directory on every exit path.

use crate::archive::ArchivedEntry;
use crate::batch::{ArtifactSource, Batch};
use crate::cleanup::CleanupReport;
use crate::config::ArchiveConfig;
use crate::error::{VidsealError, VidsealResult};
use crate::logger::{LogLevel, LOGGER};
use crate::naming;
use crate::pipeline::stages::{ArchiveStage, CleanupStage, StageArtifactsStage};
use crate::pipeline::{Pipeline, PipelineContext, StageResult};
use crate::staging::{StagingProbe, StagingResolver, StagingStrategy, SystemProbe};
use crate::vidseal_log;
use crate::writer::{ArtifactWriter, MediaEncoder, PassthroughEncoder};
use chrono::Local;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

const PIPELINE_NAME: &str = "vidseal-batch";

/// What one successful run produced
#[derive(Clone, Serialize)]
pub struct ArchiveReport {
    pub archive_path: PathBuf,
    pub archive_size: u64,
    pub entries: Vec<ArchivedEntry>,
    /// Set only when the passphrase was generated for this run
    pub passphrase: Option<String>,
    pub staging_strategy: StagingStrategy,
    pub staging_path: PathBuf,
    pub cleanup: Option<CleanupReport>,
    /// Cleanup failure, reported instead of failing the run
    pub cleanup_error: Option<String>,
    pub stage_results: Vec<StageResult>,
    pub total_duration: Duration,
}

// Manual impl keeps a generated passphrase out of debug output
impl fmt::Debug for ArchiveReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchiveReport")
            .field("archive_path", &self.archive_path)
            .field("archive_size", &self.archive_size)
            .field("entries", &self.entries)
            .field("passphrase", &self.passphrase.as_ref().map(|_| "<redacted>"))
            .field("staging_strategy", &self.staging_strategy)
            .field("staging_path", &self.staging_path)
            .field("cleanup", &self.cleanup)
            .field("cleanup_error", &self.cleanup_error)
            .field("stage_results", &self.stage_results)
            .field("total_duration", &self.total_duration)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub enum ArchiveOutcome {
    Archived(ArchiveReport),
    /// Not the primary process; nothing was written
    Skipped,
}

impl ArchiveOutcome {
    pub fn report(&self) -> Option<&ArchiveReport> {
        match self {
            ArchiveOutcome::Archived(report) => Some(report),
            ArchiveOutcome::Skipped => None,
        }
    }

    pub fn into_report(self) -> Option<ArchiveReport> {
        match self {
            ArchiveOutcome::Archived(report) => Some(report),
            ArchiveOutcome::Skipped => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, ArchiveOutcome::Skipped)
    }
}

pub struct BatchArchiver {
    config: ArchiveConfig,
    encoder: Arc<dyn MediaEncoder>,
    probe: Arc<dyn StagingProbe>,
}

impl BatchArchiver {
    pub fn new(config: ArchiveConfig) -> Self {
        Self {
            config,
            encoder: Arc::new(PassthroughEncoder),
            probe: Arc::new(SystemProbe),
        }
    }

    pub fn with_encoder(mut self, encoder: Arc<dyn MediaEncoder>) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn with_probe(mut self, probe: Arc<dyn StagingProbe>) -> Self {
        self.probe = probe;
        self
    }

    pub fn config(&self) -> &ArchiveConfig {
        &self.config
    }

    /// Stage and archive `batch`, returning once staging has been removed
    ///
    /// Succeeds only if every artifact was archived. On failure nothing is
    /// left at the output path and the error of the failing step is returned.
    pub fn archive_batch(&self, batch: Batch) -> VidsealResult<ArchiveOutcome> {
        self.config.validate()?;

        if !self.config.primary_process {
            vidseal_log!(
                LogLevel::Info,
                "archiver",
                "Not the primary process, skipping archive of {} artifact(s)",
                batch.len()
            );
            return Ok(ArchiveOutcome::Skipped);
        }

        let passphrase = self.config.passphrase.resolve()?;
        let generated = self.config.passphrase.is_generated();

        fs::create_dir_all(&self.config.output_dir).map_err(|e| {
            VidsealError::archive_write(self.config.output_dir.display().to_string(), e)
        })?;
        let archive_path = naming::archive_path(
            &self.config.output_dir,
            &Local::now(),
            &self.config.suite_name,
        );

        let staging = StagingResolver::new(self.config.staging.clone())
            .with_probe(Arc::clone(&self.probe))
            .resolve()?;

        let session_id = Uuid::new_v4().to_string();
        vidseal_log!(
            LogLevel::Info,
            "archiver",
            "Archiving {} artifact(s) ({} bytes) to {} via {} staging (session: {})",
            batch.len(),
            batch.total_bytes(),
            archive_path.display(),
            staging.strategy().label(),
            session_id
        );

        let mut context = PipelineContext::new(session_id, batch, archive_path, passphrase);
        context.attach_staging(staging);

        let result = self.pipeline().execute(&mut context)?;

        let archive = context
            .take_archive()
            .ok_or_else(|| VidsealError::PipelineError("Archive was not produced".to_string()))?;
        for entry in &archive.entries {
            LOGGER.log_with_context(
                LogLevel::Debug,
                &format!("Archived entry {}", entry.name),
                "archiver",
                entry_log_context(entry),
            );
        }

        let staging_strategy = context
            .staging_strategy()
            .cloned()
            .ok_or_else(|| VidsealError::PipelineError("Staging was not attached".to_string()))?;
        let staging_path = context
            .staging_path()
            .map(|p| p.to_path_buf())
            .unwrap_or_default();

        Ok(ArchiveOutcome::Archived(ArchiveReport {
            archive_path: archive.path,
            archive_size: archive.size,
            entries: archive.entries,
            passphrase: generated.then(|| context.passphrase().to_string()),
            staging_strategy,
            staging_path,
            cleanup: context.cleanup_report().cloned(),
            cleanup_error: result.warnings.first().cloned(),
            stage_results: result.stage_results,
            total_duration: result.total_duration,
        }))
    }

    /// Pull a batch from `source` and archive it
    pub fn archive_from_source(&self, source: &dyn ArtifactSource) -> VidsealResult<ArchiveOutcome> {
        vidseal_log!(
            LogLevel::Debug,
            "archiver",
            "Producing batch from source '{}'",
            source.name()
        );
        let batch = source.produce()?;
        self.archive_batch(batch)
    }

    /// Run `archive_batch` on the blocking thread pool
    pub async fn archive_batch_async(self: Arc<Self>, batch: Batch) -> VidsealResult<ArchiveOutcome> {
        tokio::task::spawn_blocking(move || self.archive_batch(batch)).await?
    }

    fn pipeline(&self) -> Pipeline {
        let writer = ArtifactWriter::from_config(&self.config, Arc::clone(&self.encoder));

        Pipeline::builder(PIPELINE_NAME)
            .add_stage(StageArtifactsStage::new(writer))
            .add_stage(ArchiveStage::new(self.config.compression))
            .finally(CleanupStage::new())
            .build()
    }
}

/// Structured fields recorded for each archived entry
fn entry_log_context(entry: &ArchivedEntry) -> HashMap<String, serde_json::Value> {
    let mut context = HashMap::new();
    context.insert("entry".to_string(), serde_json::json!(entry.name));
    context.insert("size".to_string(), serde_json::json!(entry.size));
    context.insert(
        "digest".to_string(),
        serde_json::json!(format!("{}:{}", entry.hash.algorithm, entry.hash.value)),
    );
    context
}
