//! Batch data model and the artifact source seam
//!
//! The generator that produces media is outside this crate. It hands over an
//! ordered list of in-memory artifacts, each tagged with the seed and the
//! descriptive label (usually the prompt) it was produced from.

use crate::error::VidsealResult;
use std::fmt;

/// One generated media output
#[derive(Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Encoded media payload (or raw frames understood by the encoder)
    pub media: Vec<u8>,
    pub seed: u64,
    pub label: String,
}

impl Artifact {
    pub fn new(media: impl Into<Vec<u8>>, seed: u64, label: impl Into<String>) -> Self {
        Self {
            media: media.into(),
            seed,
            label: label.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.media.len()
    }

    pub fn is_empty(&self) -> bool {
        self.media.is_empty()
    }
}

// Media payloads can be hundreds of megabytes; print the size instead
impl fmt::Debug for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Artifact")
            .field("seed", &self.seed)
            .field("label", &self.label)
            .field("media_len", &self.media.len())
            .finish()
    }
}

/// Ordered artifacts from one sampling invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    artifacts: Vec<Artifact>,
}

impl Batch {
    pub fn new(artifacts: Vec<Artifact>) -> Self {
        Self { artifacts }
    }

    pub fn push(&mut self, artifact: Artifact) {
        self.artifacts.push(artifact);
    }

    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Total payload size in bytes
    pub fn total_bytes(&self) -> u64 {
        self.artifacts.iter().map(|a| a.media.len() as u64).sum()
    }

    pub fn into_artifacts(self) -> Vec<Artifact> {
        self.artifacts
    }
}

impl FromIterator<Artifact> for Batch {
    fn from_iter<I: IntoIterator<Item = Artifact>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Producer of a batch (the upstream generator)
///
/// Implementations can wrap a model, a directory of renders, or a test fixture.
pub trait ArtifactSource: Send + Sync {
    /// Produce the batch for the current invocation
    fn produce(&self) -> VidsealResult<Batch>;

    /// Short name used in log lines
    fn name(&self) -> &str {
        "artifact-source"
    }
}

/// Source backed by a batch that is already in memory
#[derive(Debug, Clone, Default)]
pub struct VecSource {
    batch: Batch,
}

impl VecSource {
    pub fn new(batch: Batch) -> Self {
        Self { batch }
    }
}

impl ArtifactSource for VecSource {
    fn produce(&self) -> VidsealResult<Batch> {
        Ok(self.batch.clone())
    }

    fn name(&self) -> &str {
        "in-memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_collects_in_order() {
        let batch: Batch = vec![
            Artifact::new(b"aaa".to_vec(), 42, "a cat"),
            Artifact::new(b"bb".to_vec(), 7, "a/dog"),
        ]
        .into_iter()
        .collect();

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.artifacts()[0].seed, 42);
        assert_eq!(batch.artifacts()[1].label, "a/dog");
        assert_eq!(batch.total_bytes(), 5);
    }

    #[test]
    fn test_artifact_debug_hides_payload() {
        let artifact = Artifact::new(vec![0u8; 1024], 1, "x");
        let rendered = format!("{:?}", artifact);
        assert!(rendered.contains("media_len: 1024"));
    }

    #[test]
    fn test_vec_source_produces_batch() {
        let source = VecSource::new(Batch::new(vec![Artifact::new(b"z".to_vec(), 3, "z")]));
        let batch = source.produce().unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(source.name(), "in-memory");
    }
}
