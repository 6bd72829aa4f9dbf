//! Stage generated media artifacts and seal them into one encrypted archive
//!
//! A batch of in-memory artifacts is written to a private staging directory
//! (RAM-backed when `/dev/shm` is usable), packed into a Zstandard-compressed,
//! AES-256 encrypted ZIP, and the staging directory is removed on every exit
//! path.
//!
//! ```no_run
//! use vidseal::{Artifact, ArchiveConfigBuilder, Batch, BatchArchiver, Passphrase};
//!
//! # fn main() -> vidseal::VidsealResult<()> {
//! let config = ArchiveConfigBuilder::new()
//!     .output_dir("./results")
//!     .suite_name("smoke")
//!     .passphrase(Passphrase::fixed("correct horse"))
//!     .build()?;
//!
//! let batch = Batch::new(vec![Artifact::new(std::fs::read("cat.mp4")?, 42, "a cat")]);
//! let outcome = BatchArchiver::new(config).archive_batch(batch)?;
//! if let Some(report) = outcome.report() {
//!     println!("wrote {}", report.archive_path.display());
//! }
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod archiver;
pub mod batch;
pub mod cleanup;
pub mod config;
pub mod config_builder;
pub mod error;
pub mod hash;
pub mod logger;
pub mod naming;
pub mod passphrase;
pub mod pipeline;
pub mod staging;
pub mod writer;

// Used by `vidseal_log!` so callers need no direct `log` dependency
#[doc(hidden)]
pub use log;

pub use archive::{ArchivedEntry, EncryptedArchive, EncryptedArchiveBuilder, EntryInfo};
pub use archiver::{ArchiveOutcome, ArchiveReport, BatchArchiver};
pub use batch::{Artifact, ArtifactSource, Batch, VecSource};
pub use cleanup::{sweep, CleanupReport};
pub use config::{ArchiveConfig, Compression, StagingSettings};
pub use config_builder::ArchiveConfigBuilder;
pub use error::{VidsealError, VidsealResult};
pub use hash::HashInfo;
pub use logger::{LogLevel, LOGGER};
pub use passphrase::Passphrase;
pub use staging::{StagingDirectory, StagingProbe, StagingResolver, StagingStrategy, SystemProbe};
pub use writer::{ArtifactWriter, MediaEncoder, PassthroughEncoder, StagedFile};
