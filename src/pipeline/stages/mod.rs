//! Pipeline stages for the staging-and-archival run
//!
//! 1. StageArtifactsStage - Write every artifact into the staging directory
//! 2. ArchiveStage - Pack staged files into the encrypted archive
//! 3. CleanupStage - Sweep the staging directory (runs as a finalizer)

pub mod archive;
pub mod cleanup;
pub mod stage_artifacts;

// Re-export stages
pub use archive::ArchiveStage;
pub use cleanup::CleanupStage;
pub use stage_artifacts::StageArtifactsStage;
