use crate::archive::EncryptedArchive;
use crate::batch::Batch;
use crate::cleanup::CleanupReport;
use crate::error::{VidsealError, VidsealResult};
use crate::staging::{StagingDirectory, StagingStrategy};
use crate::writer::StagedFile;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Pipeline context that holds the state passed between stages
///
/// Owns the batch, the staging directory (until the cleanup stage releases
/// it), the staged files waiting to be archived, and the finished archive.
pub struct PipelineContext {
    /// Session ID for this pipeline execution
    session_id: String,

    batch: Batch,

    /// Number of entries the archive must end up with
    expected_entries: usize,

    staging: Option<StagingDirectory>,

    /// Kept after the staging directory is released, for reporting
    staging_path: Option<PathBuf>,
    staging_strategy: Option<StagingStrategy>,

    staged_files: Vec<StagedFile>,

    archive_path: PathBuf,
    passphrase: String,
    archive: Option<EncryptedArchive>,

    cleanup_report: Option<CleanupReport>,

    /// Metadata about the pipeline execution
    metadata: HashMap<String, String>,
}

impl PipelineContext {
    pub fn new(
        session_id: impl Into<String>,
        batch: Batch,
        archive_path: impl Into<PathBuf>,
        passphrase: impl Into<String>,
    ) -> Self {
        let expected_entries = batch.len();
        Self {
            session_id: session_id.into(),
            batch,
            expected_entries,
            staging: None,
            staging_path: None,
            staging_strategy: None,
            staged_files: Vec::new(),
            archive_path: archive_path.into(),
            passphrase: passphrase.into(),
            archive: None,
            cleanup_report: None,
            metadata: HashMap::new(),
        }
    }

    /// Get the session ID
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn batch(&self) -> &Batch {
        &self.batch
    }

    /// Move the batch out, freeing its payloads once they are staged
    pub fn take_batch(&mut self) -> Batch {
        std::mem::take(&mut self.batch)
    }

    pub fn expected_entries(&self) -> usize {
        self.expected_entries
    }

    pub fn attach_staging(&mut self, staging: StagingDirectory) {
        self.staging_path = Some(staging.path().to_path_buf());
        self.staging_strategy = Some(staging.strategy().clone());
        self.staging = Some(staging);
    }

    /// Get the staging directory or return an error if it was never attached
    pub fn staging(&self) -> VidsealResult<&StagingDirectory> {
        self.staging.as_ref().ok_or_else(|| {
            VidsealError::PipelineError("No staging directory attached".to_string())
        })
    }

    pub fn take_staging(&mut self) -> Option<StagingDirectory> {
        self.staging.take()
    }

    pub fn staging_path(&self) -> Option<&Path> {
        self.staging_path.as_deref()
    }

    pub fn staging_strategy(&self) -> Option<&StagingStrategy> {
        self.staging_strategy.as_ref()
    }

    pub fn add_staged_file(&mut self, staged: StagedFile) {
        self.staged_files.push(staged);
    }

    pub fn staged_files(&self) -> &[StagedFile] {
        &self.staged_files
    }

    pub fn take_staged_files(&mut self) -> Vec<StagedFile> {
        std::mem::take(&mut self.staged_files)
    }

    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    pub fn passphrase(&self) -> &str {
        &self.passphrase
    }

    pub fn set_archive(&mut self, archive: EncryptedArchive) {
        self.archive = Some(archive);
    }

    pub fn archive(&self) -> Option<&EncryptedArchive> {
        self.archive.as_ref()
    }

    pub fn take_archive(&mut self) -> Option<EncryptedArchive> {
        self.archive.take()
    }

    pub fn set_cleanup_report(&mut self, report: CleanupReport) {
        self.cleanup_report = Some(report);
    }

    pub fn cleanup_report(&self) -> Option<&CleanupReport> {
        self.cleanup_report.as_ref()
    }

    /// Set metadata
    pub fn set_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata.insert(key.into(), value.into());
    }

    /// Get metadata
    pub fn get_metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(|s| s.as_str())
    }

    /// Get all metadata
    pub fn metadata(&self) -> &HashMap<String, String> {
        &self.metadata
    }
}

// Manual impl keeps the passphrase out of debug output
impl fmt::Debug for PipelineContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineContext")
            .field("session_id", &self.session_id)
            .field("batch_len", &self.batch.len())
            .field("expected_entries", &self.expected_entries)
            .field("staging_path", &self.staging_path)
            .field("staged_files", &self.staged_files.len())
            .field("archive_path", &self.archive_path)
            .field("archived", &self.archive.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::Artifact;

    fn context() -> PipelineContext {
        let batch = Batch::new(vec![
            Artifact::new(b"a".to_vec(), 1, "a"),
            Artifact::new(b"b".to_vec(), 2, "b"),
        ]);
        PipelineContext::new("session-123", batch, "/out/x.zip", "pass-1234")
    }

    #[test]
    fn test_context_creation() {
        let context = context();
        assert_eq!(context.session_id(), "session-123");
        assert_eq!(context.expected_entries(), 2);
        assert_eq!(context.archive_path(), Path::new("/out/x.zip"));
        assert!(context.archive().is_none());
    }

    #[test]
    fn test_take_batch_keeps_expected_count() {
        let mut context = context();
        let batch = context.take_batch();

        assert_eq!(batch.len(), 2);
        assert!(context.batch().is_empty());
        assert_eq!(context.expected_entries(), 2);
    }

    #[test]
    fn test_missing_staging() {
        let context = context();
        assert!(context.staging().is_err());
        assert!(context.staging_path().is_none());
    }

    #[test]
    fn test_staged_files() {
        let mut context = context();
        context.add_staged_file(StagedFile {
            path: PathBuf::from("/dev/shm/vidseal-x/seed1_a.mp4"),
            file_name: "seed1_a.mp4".to_string(),
            size: 1,
            seed: 1,
            label: "a".to_string(),
        });

        assert_eq!(context.staged_files().len(), 1);
        assert_eq!(context.take_staged_files().len(), 1);
        assert!(context.staged_files().is_empty());
    }

    #[test]
    fn test_metadata() {
        let mut context = context();
        context.set_metadata("pipeline_name", "vidseal-batch");

        assert_eq!(context.get_metadata("pipeline_name"), Some("vidseal-batch"));
        assert_eq!(context.metadata().len(), 1);
    }

    #[test]
    fn test_debug_hides_passphrase() {
        let rendered = format!("{:?}", context());
        assert!(!rendered.contains("pass-1234"));
    }
}
