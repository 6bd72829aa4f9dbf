//! Artifact writer: materializes in-memory artifacts as staged files

use crate::batch::{Artifact, Batch};
use crate::config::ArchiveConfig;
use crate::error::{VidsealError, VidsealResult};
use crate::naming;
use crate::staging::StagingDirectory;
use serde::Serialize;
use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

/// Container/codec collaborator that turns an artifact into media bytes
///
/// The writer only requires that `encode` writes the complete representation
/// to `out`; flushing and syncing the file is handled by the writer.
pub trait MediaEncoder: Send + Sync {
    fn encode(&self, artifact: &Artifact, frame_rate: u32, out: &mut dyn Write) -> io::Result<()>;

    fn name(&self) -> &str {
        "encoder"
    }
}

/// Encoder for artifacts whose payload is already an encoded container
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughEncoder;

impl MediaEncoder for PassthroughEncoder {
    fn encode(&self, artifact: &Artifact, _frame_rate: u32, out: &mut dyn Write) -> io::Result<()> {
        out.write_all(&artifact.media)
    }

    fn name(&self) -> &str {
        "passthrough"
    }
}

/// One artifact written to the staging directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StagedFile {
    pub path: PathBuf,
    pub file_name: String,
    pub size: u64,
    pub seed: u64,
    pub label: String,
}

pub struct ArtifactWriter {
    encoder: Arc<dyn MediaEncoder>,
    frame_rate: u32,
    label_max_chars: usize,
    extension: String,
}

impl ArtifactWriter {
    pub fn new(
        encoder: Arc<dyn MediaEncoder>,
        frame_rate: u32,
        label_max_chars: usize,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            encoder,
            frame_rate,
            label_max_chars,
            extension: extension.into(),
        }
    }

    pub fn from_config(config: &ArchiveConfig, encoder: Arc<dyn MediaEncoder>) -> Self {
        Self::new(
            encoder,
            config.frame_rate,
            config.label_max_chars,
            config.extension.clone(),
        )
    }

    pub fn encoder_name(&self) -> &str {
        self.encoder.name()
    }

    pub fn file_name_for(&self, artifact: &Artifact) -> String {
        naming::entry_file_name(
            artifact.seed,
            &artifact.label,
            self.label_max_chars,
            &self.extension,
        )
    }

    /// File names for the whole batch, in batch order
    ///
    /// # Errors
    /// `DuplicateEntry` if two artifacts map to the same name.
    pub fn plan(&self, batch: &Batch) -> VidsealResult<Vec<String>> {
        let mut seen = HashSet::with_capacity(batch.len());
        let mut names = Vec::with_capacity(batch.len());

        for artifact in batch.artifacts() {
            let name = self.file_name_for(artifact);
            if !seen.insert(name.clone()) {
                return Err(VidsealError::DuplicateEntry(name));
            }
            names.push(name);
        }

        Ok(names)
    }

    /// Encode `artifact` into a new file inside `staging`
    ///
    /// The file is flushed and synced before this returns. On failure a
    /// partial file may remain in `staging`; the staging sweep removes it.
    pub fn write(&self, staging: &StagingDirectory, artifact: &Artifact) -> VidsealResult<StagedFile> {
        let file_name = self.file_name_for(artifact);
        let path = staging.join(&file_name);

        let size = self
            .write_file(&path, artifact)
            .map_err(|source| VidsealError::ArtifactWrite {
                seed: artifact.seed,
                file_name: file_name.clone(),
                source,
            })?;

        Ok(StagedFile {
            path,
            file_name,
            size,
            seed: artifact.seed,
            label: artifact.label.clone(),
        })
    }

    fn write_file(&self, path: &std::path::Path, artifact: &Artifact) -> io::Result<u64> {
        let file = OpenOptions::new().write(true).create_new(true).open(path)?;
        let mut writer = BufWriter::new(file);

        self.encoder.encode(artifact, self.frame_rate, &mut writer)?;
        writer.flush()?;

        let file = writer.into_inner().map_err(io::IntoInnerError::into_error)?;
        file.sync_all()?;
        Ok(file.metadata()?.len())
    }
}
