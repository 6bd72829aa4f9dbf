use crate::config::{ArchiveConfig, Compression, StagingSettings};
use crate::error::{VidsealError, VidsealResult};
use crate::passphrase::Passphrase;
use std::path::PathBuf;

/// Builder for constructing ArchiveConfig instances with a fluent API
///
/// # Example
/// ```
/// use vidseal::{ArchiveConfigBuilder, Passphrase};
///
/// let config = ArchiveConfigBuilder::new()
///     .output_dir("./results")
///     .suite_name("hunyuan")
///     .passphrase(Passphrase::fixed("correct horse"))
///     .frame_rate(24)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Default)]
pub struct ArchiveConfigBuilder {
    output_dir: Option<PathBuf>,
    suite_name: Option<String>,
    passphrase: Option<Passphrase>,
    frame_rate: Option<u32>,
    compression: Option<Compression>,
    label_max_chars: Option<usize>,
    extension: Option<String>,
    primary_process: Option<bool>,
    staging: Option<StagingSettings>,
}

impl ArchiveConfigBuilder {
    /// Create a new builder; unset fields fall back to `ArchiveConfig::default()`
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn suite_name(mut self, name: impl Into<String>) -> Self {
        self.suite_name = Some(name.into());
        self
    }

    pub fn passphrase(mut self, passphrase: Passphrase) -> Self {
        self.passphrase = Some(passphrase);
        self
    }

    pub fn frame_rate(mut self, fps: u32) -> Self {
        self.frame_rate = Some(fps);
        self
    }

    pub fn compression(mut self, compression: Compression) -> Self {
        self.compression = Some(compression);
        self
    }

    pub fn label_max_chars(mut self, max: usize) -> Self {
        self.label_max_chars = Some(max);
        self
    }

    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into());
        self
    }

    /// Whether this process is the one that writes the archive
    pub fn primary_process(mut self, primary: bool) -> Self {
        self.primary_process = Some(primary);
        self
    }

    pub fn staging(mut self, staging: StagingSettings) -> Self {
        self.staging = Some(staging);
        self
    }

    /// Override only the RAM-backed mount to probe
    pub fn ram_root(mut self, root: impl Into<PathBuf>) -> Self {
        let mut staging = self.staging.take().unwrap_or_default();
        staging.ram_root = root.into();
        self.staging = Some(staging);
        self
    }

    /// Build the ArchiveConfig instance
    ///
    /// # Errors
    /// Returns `VidsealError::BuilderError` if any field is invalid
    pub fn build(self) -> VidsealResult<ArchiveConfig> {
        let defaults = ArchiveConfig::default();

        let config = ArchiveConfig {
            output_dir: self.output_dir.unwrap_or(defaults.output_dir),
            suite_name: self.suite_name.unwrap_or(defaults.suite_name),
            passphrase: self.passphrase.unwrap_or(defaults.passphrase),
            frame_rate: self.frame_rate.unwrap_or(defaults.frame_rate),
            compression: self.compression.unwrap_or(defaults.compression),
            label_max_chars: self.label_max_chars.unwrap_or(defaults.label_max_chars),
            extension: self.extension.unwrap_or(defaults.extension),
            primary_process: self.primary_process.unwrap_or(defaults.primary_process),
            staging: self.staging.unwrap_or(defaults.staging),
        };

        config
            .validate()
            .map_err(|e| VidsealError::BuilderError(e.to_string()))?;

        Ok(config)
    }
}
