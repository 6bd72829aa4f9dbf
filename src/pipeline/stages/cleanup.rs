use crate::error::VidsealResult;
use crate::logger::LogLevel;
use crate::pipeline::{PipelineContext, PipelineStage};
use crate::vidseal_log;

/// Stage that removes the staging directory
///
/// Registered as a finalizer, so it also runs when staging or archiving
/// failed. Running it without an attached staging directory is a no-op.
///
/// # Context Requirements
/// - Staging directory (optional)
///
/// # Context Outputs
/// - Cleanup report
/// - Staging directory detached
pub struct CleanupStage;

impl CleanupStage {
    /// Create a new cleanup stage
    pub fn new() -> Self {
        Self
    }
}

impl Default for CleanupStage {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStage for CleanupStage {
    fn execute(&self, context: &mut PipelineContext) -> VidsealResult<()> {
        let Some(staging) = context.take_staging() else {
            vidseal_log!(
                LogLevel::Info,
                "pipeline::cleanup",
                "No staging directory to clean up (session: {})",
                context.session_id()
            );
            return Ok(());
        };

        let path = staging.path().to_path_buf();
        let report = staging.release()?;

        vidseal_log!(
            LogLevel::Info,
            "pipeline::cleanup",
            "Removed staging directory {} ({} leftover file(s)) (session: {})",
            path.display(),
            report.files_removed,
            context.session_id()
        );

        context.set_cleanup_report(report);
        Ok(())
    }

    fn name(&self) -> &str {
        "Cleanup Staging"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::Batch;
    use crate::config::StagingSettings;
    use crate::staging::{StagingProbe, StagingResolver};
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use tempfile::TempDir;

    struct TempProbe(PathBuf);

    impl StagingProbe for TempProbe {
        fn is_usable(&self, _root: &Path) -> bool {
            false
        }

        fn fallback_root(&self) -> PathBuf {
            self.0.clone()
        }
    }

    #[test]
    fn test_removes_staging_with_leftovers() {
        let root = TempDir::new().unwrap();
        let staging = StagingResolver::new(StagingSettings::default())
            .with_probe(Arc::new(TempProbe(root.path().to_path_buf())))
            .resolve()
            .unwrap();
        fs::write(staging.join("seed1_left.mp4"), b"left over").unwrap();
        let path = staging.path().to_path_buf();

        let mut context =
            PipelineContext::new("session-1", Batch::default(), "/tmp/unused.zip", "pass-1234");
        context.attach_staging(staging);

        CleanupStage::new().execute(&mut context).unwrap();

        assert!(!path.exists());
        assert_eq!(context.cleanup_report().unwrap().files_removed, 1);
        assert!(context.staging().is_err());
        assert_eq!(context.staging_path(), Some(path.as_path()));
    }

    #[test]
    fn test_no_staging_is_noop() {
        let mut context =
            PipelineContext::new("session-1", Batch::default(), "/tmp/unused.zip", "pass-1234");

        CleanupStage::new().execute(&mut context).unwrap();
        CleanupStage::new().execute(&mut context).unwrap();

        assert!(context.cleanup_report().is_none());
    }
}
