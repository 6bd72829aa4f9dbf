//! Pipeline pattern implementation for the staging-and-archival run
//!
//! A run is a sequence of stages sharing a `PipelineContext`: artifacts are
//! staged, packed into the encrypted archive, and the staging directory is
//! swept by a finalizer that runs whatever happened before it.
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use vidseal::pipeline::stages::{ArchiveStage, CleanupStage, StageArtifactsStage};
//! use vidseal::pipeline::{Pipeline, PipelineContext};
//! use vidseal::writer::{ArtifactWriter, PassthroughEncoder};
//! use vidseal::{Artifact, Batch, Compression, StagingResolver, StagingSettings};
//!
//! # fn main() -> vidseal::VidsealResult<()> {
//! let writer = ArtifactWriter::new(Arc::new(PassthroughEncoder), 24, 100, "mp4");
//! let pipeline = Pipeline::builder("my-pipeline")
//!     .add_stage(StageArtifactsStage::new(writer))
//!     .add_stage(ArchiveStage::new(Compression::default()))
//!     .finally(CleanupStage::new())
//!     .build();
//!
//! let batch = Batch::new(vec![Artifact::new(b"...".to_vec(), 42, "a cat")]);
//! let mut context = PipelineContext::new("session-123", batch, "out.zip", "passphrase");
//! context.attach_staging(StagingResolver::new(StagingSettings::default()).resolve()?);
//! let result = pipeline.execute(&mut context)?;
//! println!("{} stages in {:?}", result.executed_stages(), result.total_duration);
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod core;
pub mod executor;
pub mod stages;

// Re-export main types
pub use context::PipelineContext;
pub use core::{PipelineResult, PipelineStage, StageResult};
pub use executor::{Pipeline, PipelineBuilder};
