use super::probe::StagingStrategy;
use crate::cleanup::{self, CleanupReport};
use crate::error::VidsealResult;
use crate::logger::LogLevel;
use crate::vidseal_log;
use std::path::{Path, PathBuf};

/// Uniquely named scratch directory owned by one pipeline run
///
/// The directory is swept exactly once: either through `release()` or, if the
/// run unwinds or returns early, when the value is dropped.
#[derive(Debug)]
pub struct StagingDirectory {
    path: PathBuf,
    token: String,
    strategy: StagingStrategy,
    released: bool,
}

impl StagingDirectory {
    pub(crate) fn new(path: PathBuf, token: String, strategy: StagingStrategy) -> Self {
        Self {
            path,
            token,
            strategy,
            released: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Uniqueness token embedded in the directory name
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn strategy(&self) -> &StagingStrategy {
        &self.strategy
    }

    /// Path of a file inside the directory
    pub fn join(&self, file_name: &str) -> PathBuf {
        self.path.join(file_name)
    }

    /// Remove everything that is left and the directory itself
    pub fn release(mut self) -> VidsealResult<CleanupReport> {
        self.released = true;
        cleanup::sweep(&self.path)
    }
}

impl Drop for StagingDirectory {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        match cleanup::sweep(&self.path) {
            Ok(report) => vidseal_log!(
                LogLevel::Warn,
                "staging",
                "Staging directory {} swept on drop ({} file(s) removed)",
                self.path.display(),
                report.files_removed
            ),
            Err(e) => vidseal_log!(
                LogLevel::Error,
                "staging",
                "Failed to sweep staging directory {} on drop: {}",
                self.path.display(),
                e
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn staging_in(root: &Path) -> StagingDirectory {
        let path = root.join("vidseal-test");
        fs::create_dir(&path).unwrap();
        StagingDirectory::new(
            path,
            "test".to_string(),
            StagingStrategy::GenericTemp(root.to_path_buf()),
        )
    }

    #[test]
    fn test_release_removes_directory() {
        let root = TempDir::new().unwrap();
        let staging = staging_in(root.path());
        let path = staging.path().to_path_buf();
        fs::write(staging.join("seed1_a.mp4"), b"frames").unwrap();

        let report = staging.release().unwrap();
        assert_eq!(report.files_removed, 1);
        assert!(!path.exists());
    }

    #[test]
    fn test_drop_removes_directory() {
        let root = TempDir::new().unwrap();
        let path = {
            let staging = staging_in(root.path());
            fs::write(staging.join("seed2_b.mp4"), b"frames").unwrap();
            staging.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn test_drop_during_panic_removes_directory() {
        let root = TempDir::new().unwrap();
        let path = root.path().join("vidseal-test");

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let staging = staging_in(root.path());
            fs::write(staging.join("seed3_c.mp4"), b"frames").unwrap();
            panic!("encoder crashed");
        }));

        assert!(outcome.is_err());
        assert!(!path.exists());
    }
}
