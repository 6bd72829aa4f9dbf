//! Staging area selection and ownership
//!
//! Staged media goes to a RAM-backed mount when one is usable, otherwise to
//! the system temporary directory. Every run gets its own directory, named
//! with a random token, and the directory is removed when the run ends.

pub mod directory;
pub mod probe;
pub mod resolver;

pub use directory::StagingDirectory;
pub use probe::{select_strategy, StagingProbe, StagingStrategy, SystemProbe};
pub use resolver::StagingResolver;
