use std::path::PathBuf;
use thiserror::Error;

/// Boxed lower-level failure carried by archive errors (I/O or ZIP library)
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Central error type for the vidseal pipeline
#[derive(Error, Debug)]
pub enum VidsealError {
    // ============================================================================
    // Staging Errors
    // ============================================================================
    #[error("No usable staging location (last attempt: {}): {source}", .root.display())]
    StagingUnavailable {
        root: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write artifact seed {seed} to '{file_name}': {source}")]
    ArtifactWrite {
        seed: u64,
        file_name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Duplicate archive entry name in batch: {0}")]
    DuplicateEntry(String),

    // ============================================================================
    // Archive Errors
    // ============================================================================
    #[error("Failed to write archive entry '{entry}': {source}")]
    ArchiveWrite {
        entry: String,
        #[source]
        source: BoxedSource,
    },

    #[error("Failed to read archive: {0}")]
    ArchiveRead(String),

    #[error("Passphrase validation failed: {0}")]
    InvalidPassphrase(String),

    // ============================================================================
    // Cleanup Errors
    // ============================================================================
    #[error("Cleanup of {} left {remaining} item(s) behind: {source}", .path.display())]
    Cleanup {
        path: PathBuf,
        remaining: usize,
        #[source]
        source: std::io::Error,
    },

    // ============================================================================
    // Pipeline / Configuration Errors
    // ============================================================================
    #[error("Pipeline error: {0}")]
    PipelineError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Builder pattern validation error
    #[error("Builder error: {0}")]
    BuilderError(String),

    // ============================================================================
    // Generic/System Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Blocking task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl VidsealError {
    /// Wrap a lower-level failure as an archive write error for `entry`
    pub fn archive_write(
        entry: impl Into<String>,
        source: impl Into<BoxedSource>,
    ) -> Self {
        VidsealError::ArchiveWrite {
            entry: entry.into(),
            source: source.into(),
        }
    }

    /// Cleanup failures are reported, never treated as a failed batch
    pub fn is_fatal(&self) -> bool {
        !matches!(self, VidsealError::Cleanup { .. })
    }
}

// Automatic conversion from zip::result::ZipError (reading side only)
impl From<zip::result::ZipError> for VidsealError {
    fn from(err: zip::result::ZipError) -> Self {
        VidsealError::ArchiveRead(format!("ZIP error: {}", err))
    }
}

// Helper type alias for Results
pub type VidsealResult<T> = Result<T, VidsealError>;
