use crate::error::{VidsealError, VidsealResult};
use crate::passphrase::Passphrase;
use serde::{Deserialize, Serialize};
use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

/// Default volatile-memory mount probed for staging
pub const DEFAULT_RAM_ROOT: &str = "/dev/shm";

/// Prefix of every staging directory name (a unique token follows)
pub const DEFAULT_DIR_PREFIX: &str = "vidseal-";

/// Compression applied to every archive entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum Compression {
    Zstd { level: i64 },
    Deflated { level: i64 },
}

impl Compression {
    pub fn method(&self) -> zip::CompressionMethod {
        match self {
            Compression::Zstd { .. } => zip::CompressionMethod::Zstd,
            Compression::Deflated { .. } => zip::CompressionMethod::Deflated,
        }
    }

    pub fn level(&self) -> i64 {
        match self {
            Compression::Zstd { level } | Compression::Deflated { level } => *level,
        }
    }

    fn level_range(&self) -> RangeInclusive<i64> {
        match self {
            Compression::Zstd { .. } => 1..=22,
            Compression::Deflated { .. } => 0..=9,
        }
    }

    pub fn validate(&self) -> VidsealResult<()> {
        let range = self.level_range();
        if !range.contains(&self.level()) {
            return Err(VidsealError::ConfigError(format!(
                "Compression level {} out of range {}..={}",
                self.level(),
                range.start(),
                range.end()
            )));
        }
        Ok(())
    }
}

impl Default for Compression {
    fn default() -> Self {
        Compression::Zstd { level: 10 }
    }
}

/// Where staging directories are created
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StagingSettings {
    /// RAM-backed mount tried first
    pub ram_root: PathBuf,

    /// Fixed prefix of the staging directory name
    pub dir_prefix: String,
}

impl Default for StagingSettings {
    fn default() -> Self {
        Self {
            ram_root: PathBuf::from(DEFAULT_RAM_ROOT),
            dir_prefix: DEFAULT_DIR_PREFIX.to_string(),
        }
    }
}

/// Configuration for one archival run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Directory receiving `{timestamp}_{suite_name}_videos.zip`
    pub output_dir: PathBuf,

    /// Name embedded in the archive filename
    pub suite_name: String,

    /// Archive passphrase (fixed or generated per run)
    pub passphrase: Passphrase,

    /// Frame rate handed to the media encoder
    pub frame_rate: u32,

    pub compression: Compression,

    /// Labels are cut to this many characters before sanitizing
    pub label_max_chars: usize,

    /// Media file extension of staged files and archive entries
    pub extension: String,

    /// Only the primary process of a multi-process job writes an archive
    pub primary_process: bool,

    pub staging: StagingSettings,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./results"),
            suite_name: "vidseal".to_string(),
            passphrase: Passphrase::Generated,
            frame_rate: 24,
            compression: Compression::default(),
            label_max_chars: 100,
            extension: "mp4".to_string(),
            primary_process: true,
            staging: StagingSettings::default(),
        }
    }
}

impl ArchiveConfig {
    /// Load configuration from a JSON file; missing fields take defaults
    pub fn load<P: AsRef<Path>>(path: P) -> VidsealResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            VidsealError::ConfigError(format!(
                "Failed to read config {}: {}",
                path.display(),
                e
            ))
        })?;
        let config: ArchiveConfig = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> VidsealResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> VidsealResult<()> {
        if self.suite_name.trim().is_empty() {
            return Err(VidsealError::ConfigError(
                "suite_name cannot be empty".to_string(),
            ));
        }
        if self.suite_name.contains(['/', '\\']) {
            return Err(VidsealError::ConfigError(format!(
                "suite_name must not contain path separators: {}",
                self.suite_name
            )));
        }
        if self.frame_rate == 0 {
            return Err(VidsealError::ConfigError(
                "frame_rate must be greater than zero".to_string(),
            ));
        }
        if self.label_max_chars == 0 {
            return Err(VidsealError::ConfigError(
                "label_max_chars must be greater than zero".to_string(),
            ));
        }
        if self.extension.is_empty() || !self.extension.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(VidsealError::ConfigError(format!(
                "extension must be non-empty ASCII alphanumeric: '{}'",
                self.extension
            )));
        }
        if self.staging.dir_prefix.contains(['/', '\\']) {
            return Err(VidsealError::ConfigError(format!(
                "staging prefix must not contain path separators: {}",
                self.staging.dir_prefix
            )));
        }
        if let Passphrase::Fixed(value) = &self.passphrase {
            crate::passphrase::validate_passphrase(value)?;
        }
        self.compression.validate()
    }
}
