use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Filesystem checks the resolver depends on
///
/// Swapped for a fake in tests to simulate a missing or read-only RAM mount.
pub trait StagingProbe: Send + Sync {
    /// Whether staging directories can be created under `root`
    fn is_usable(&self, root: &Path) -> bool;

    /// Generic temporary area used when the RAM mount is not usable
    fn fallback_root(&self) -> PathBuf;
}

/// Probe backed by the real filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProbe;

impl StagingProbe for SystemProbe {
    fn is_usable(&self, root: &Path) -> bool {
        match fs::metadata(root) {
            Ok(metadata) => metadata.is_dir() && !metadata.permissions().readonly(),
            Err(_) => false,
        }
    }

    fn fallback_root(&self) -> PathBuf {
        std::env::temp_dir()
    }
}

/// Which kind of location a staging directory lives in
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "root", rename_all = "snake_case")]
pub enum StagingStrategy {
    RamBacked(PathBuf),
    GenericTemp(PathBuf),
}

impl StagingStrategy {
    pub fn root(&self) -> &Path {
        match self {
            StagingStrategy::RamBacked(root) | StagingStrategy::GenericTemp(root) => root,
        }
    }

    pub fn is_ram_backed(&self) -> bool {
        matches!(self, StagingStrategy::RamBacked(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            StagingStrategy::RamBacked(_) => "ram-backed",
            StagingStrategy::GenericTemp(_) => "generic-temp",
        }
    }
}

/// Prefer the RAM mount when the probe accepts it
pub fn select_strategy(probe: &dyn StagingProbe, ram_root: &Path) -> StagingStrategy {
    if probe.is_usable(ram_root) {
        StagingStrategy::RamBacked(ram_root.to_path_buf())
    } else {
        StagingStrategy::GenericTemp(probe.fallback_root())
    }
}
