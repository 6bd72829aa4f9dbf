use crate::error::{VidsealError, VidsealResult};
use crate::logger::LogLevel;
use crate::pipeline::{PipelineContext, PipelineStage};
use crate::vidseal_log;
use crate::writer::ArtifactWriter;

/// Stage that writes every artifact of the batch into the staging directory
///
/// # Context Requirements
/// - Staging directory attached
/// - Batch with the artifacts to stage
///
/// # Context Outputs
/// - One staged file per artifact, in batch order
/// - Batch is consumed
pub struct StageArtifactsStage {
    writer: ArtifactWriter,
}

impl StageArtifactsStage {
    pub fn new(writer: ArtifactWriter) -> Self {
        Self { writer }
    }
}

impl PipelineStage for StageArtifactsStage {
    fn execute(&self, context: &mut PipelineContext) -> VidsealResult<()> {
        let batch = context.take_batch();
        let total = batch.len();

        vidseal_log!(
            LogLevel::Info,
            "pipeline::stage",
            "Staging {} artifact(s) with {} encoder (session: {})",
            total,
            self.writer.encoder_name(),
            context.session_id()
        );

        for (index, artifact) in batch.into_artifacts().into_iter().enumerate() {
            let staged = self.writer.write(context.staging()?, &artifact)?;

            vidseal_log!(
                LogLevel::Debug,
                "pipeline::stage",
                "Staged {}/{}: {} ({} bytes)",
                index + 1,
                total,
                staged.file_name,
                staged.size
            );
            context.add_staged_file(staged);
        }

        context.set_metadata("staged_files", total.to_string());
        Ok(())
    }

    fn name(&self) -> &str {
        "Stage Artifacts"
    }

    fn should_skip(&self, context: &PipelineContext) -> bool {
        context.batch().is_empty()
    }

    fn pre_execute(&self, context: &PipelineContext) -> VidsealResult<()> {
        let staging = context.staging()?;
        if !staging.path().is_dir() {
            return Err(VidsealError::PipelineError(format!(
                "Staging directory missing: {}",
                staging.path().display()
            )));
        }

        // Reject name collisions before anything is written
        self.writer.plan(context.batch())?;
        Ok(())
    }

    fn post_execute(&self, context: &PipelineContext) -> VidsealResult<()> {
        if context.staged_files().len() != context.expected_entries() {
            return Err(VidsealError::PipelineError(format!(
                "Staged {} file(s), expected {}",
                context.staged_files().len(),
                context.expected_entries()
            )));
        }

        if let Some(missing) = context.staged_files().iter().find(|f| !f.path.is_file()) {
            return Err(VidsealError::PipelineError(format!(
                "Staged file missing: {}",
                missing.path.display()
            )));
        }

        Ok(())
    }
}
