use crate::archive::EncryptedArchiveBuilder;
use crate::config::Compression;
use crate::error::{VidsealError, VidsealResult};
use crate::logger::LogLevel;
use crate::pipeline::{PipelineContext, PipelineStage};
use crate::vidseal_log;

/// Stage that packs the staged files into the encrypted archive
///
/// Each staged file is deleted as soon as its entry has been written, so the
/// staging area never holds more than the files still waiting.
///
/// # Context Requirements
/// - Staged files (may be empty)
/// - Archive path and passphrase
///
/// # Context Outputs
/// - The finished archive
pub struct ArchiveStage {
    compression: Compression,
}

impl ArchiveStage {
    pub fn new(compression: Compression) -> Self {
        Self { compression }
    }
}

impl PipelineStage for ArchiveStage {
    fn execute(&self, context: &mut PipelineContext) -> VidsealResult<()> {
        let staged_files = context.take_staged_files();

        vidseal_log!(
            LogLevel::Info,
            "pipeline::archive",
            "Archiving {} staged file(s) into {} (session: {})",
            staged_files.len(),
            context.archive_path().display(),
            context.session_id()
        );

        let mut builder = EncryptedArchiveBuilder::create(
            context.archive_path(),
            context.passphrase(),
            self.compression,
        )?;

        for staged in &staged_files {
            builder.add_staged_file(staged)?;
        }

        let archive = builder.finish()?;
        context.set_metadata("archive_size", archive.size.to_string());
        context.set_archive(archive);
        Ok(())
    }

    fn name(&self) -> &str {
        "Build Encrypted Archive"
    }

    fn pre_execute(&self, context: &PipelineContext) -> VidsealResult<()> {
        if context.archive_path().exists() {
            return Err(VidsealError::archive_write(
                context.archive_path().display().to_string(),
                "output file already exists",
            ));
        }
        Ok(())
    }

    fn post_execute(&self, context: &PipelineContext) -> VidsealResult<()> {
        let archive = context
            .archive()
            .ok_or_else(|| VidsealError::PipelineError("Archive was not produced".to_string()))?;

        if archive.entries.len() != context.expected_entries() {
            return Err(VidsealError::PipelineError(format!(
                "Archive has {} entries, expected {}",
                archive.entries.len(),
                context.expected_entries()
            )));
        }

        if !archive.path.is_file() {
            return Err(VidsealError::PipelineError(format!(
                "Archive file missing: {}",
                archive.path.display()
            )));
        }

        Ok(())
    }
}
