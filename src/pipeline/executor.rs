use super::context::PipelineContext;
use super::core::{PipelineResult, PipelineStage, StageResult};
use crate::error::{VidsealError, VidsealResult};
use crate::logger::LogLevel;
use crate::vidseal_log;
use std::time::Instant;

/// Pipeline executor that runs stages sequentially
///
/// Regular stages stop at the first failure. Finalizer stages run after them
/// no matter how the regular stages ended; a failing finalizer is recorded as
/// a warning and never replaces the error of the stage that failed first.
///
/// # Example
/// ```no_run
/// use vidseal::pipeline::stages::{ArchiveStage, CleanupStage};
/// use vidseal::pipeline::Pipeline;
/// use vidseal::Compression;
///
/// let pipeline = Pipeline::builder("my-pipeline")
///     .add_stage(ArchiveStage::new(Compression::default()))
///     .finally(CleanupStage::new())
///     .build();
/// assert_eq!(pipeline.stage_count(), 2);
/// ```
pub struct Pipeline {
    name: String,
    stages: Vec<Box<dyn PipelineStage>>,
    finalizers: Vec<Box<dyn PipelineStage>>,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder(name: impl Into<String>) -> PipelineBuilder {
        PipelineBuilder::new(name)
    }

    /// Get the pipeline name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of stages, finalizers included
    pub fn stage_count(&self) -> usize {
        self.stages.len() + self.finalizers.len()
    }

    /// Execute the pipeline
    ///
    /// Returns the error of the first failing stage, after the finalizers have
    /// run. Stages can be skipped based on their `should_skip()` method.
    pub fn execute(&self, context: &mut PipelineContext) -> VidsealResult<PipelineResult> {
        vidseal_log!(
            LogLevel::Info,
            "pipeline",
            "Starting pipeline '{}' with {} stages (session: {})",
            self.name,
            self.stage_count(),
            context.session_id()
        );

        let pipeline_start = Instant::now();
        let mut stage_results = Vec::new();
        let mut warnings = Vec::new();
        let total = self.stage_count();

        // Store pipeline name in context metadata
        context.set_metadata("pipeline_name", self.name.as_str());

        let mut failure: Option<VidsealError> = None;
        for (index, stage) in self.stages.iter().enumerate() {
            if let Err(e) = self.run_stage(stage.as_ref(), index, total, context, &mut stage_results) {
                failure = Some(e);
                break;
            }
        }

        for (offset, stage) in self.finalizers.iter().enumerate() {
            let index = self.stages.len() + offset;
            if let Err(e) = self.run_stage(stage.as_ref(), index, total, context, &mut stage_results) {
                warnings.push(format!("{}: {}", stage.name(), e));
            }
        }

        let total_duration = pipeline_start.elapsed();

        if let Some(e) = failure {
            vidseal_log!(
                LogLevel::Error,
                "pipeline",
                "Pipeline '{}' failed after {:.2}s: {} (session: {})",
                self.name,
                total_duration.as_secs_f64(),
                e,
                context.session_id()
            );
            return Err(e);
        }

        vidseal_log!(
            LogLevel::Info,
            "pipeline",
            "Pipeline '{}' completed in {:.2}s with {} warning(s) (session: {})",
            self.name,
            total_duration.as_secs_f64(),
            warnings.len(),
            context.session_id()
        );

        Ok(PipelineResult::new(
            &self.name,
            stage_results,
            total_duration,
            warnings,
        ))
    }

    /// Run one stage with its hooks, recording its result
    fn run_stage(
        &self,
        stage: &dyn PipelineStage,
        index: usize,
        total: usize,
        context: &mut PipelineContext,
        stage_results: &mut Vec<StageResult>,
    ) -> VidsealResult<()> {
        let stage_name = stage.name();

        if stage.should_skip(context) {
            vidseal_log!(
                LogLevel::Info,
                "pipeline",
                "Skipping stage {}/{}: {} (session: {})",
                index + 1,
                total,
                stage_name,
                context.session_id()
            );
            stage_results.push(StageResult::skipped(stage_name));
            return Ok(());
        }

        vidseal_log!(
            LogLevel::Info,
            "pipeline",
            "Executing stage {}/{}: {} (session: {})",
            index + 1,
            total,
            stage_name,
            context.session_id()
        );

        let stage_start = Instant::now();
        let outcome = run_hooks(stage, context);
        let duration = stage_start.elapsed();

        match outcome {
            Ok(()) => {
                vidseal_log!(
                    LogLevel::Info,
                    "pipeline",
                    "Stage '{}' completed successfully in {:.2}s (session: {})",
                    stage_name,
                    duration.as_secs_f64(),
                    context.session_id()
                );
                stage_results.push(StageResult::success(stage_name, duration));
                Ok(())
            }
            Err((phase, e)) => {
                let error_msg = format!("{}: {}", phase, e);
                vidseal_log!(
                    LogLevel::Error,
                    "pipeline",
                    "Stage '{}' failed: {} (session: {})",
                    stage_name,
                    error_msg,
                    context.session_id()
                );
                stage_results.push(StageResult::failure(stage_name, error_msg, duration));
                Err(e)
            }
        }
    }
}

/// Pre-execute, execute and post-execute, tagging an error with its phase
fn run_hooks(
    stage: &dyn PipelineStage,
    context: &mut PipelineContext,
) -> Result<(), (&'static str, VidsealError)> {
    stage
        .pre_execute(context)
        .map_err(|e| ("Pre-execute failed", e))?;
    stage.execute(context).map_err(|e| ("Execute failed", e))?;
    stage
        .post_execute(context)
        .map_err(|e| ("Post-execute failed", e))
}

/// Builder for constructing pipelines
pub struct PipelineBuilder {
    name: String,
    stages: Vec<Box<dyn PipelineStage>>,
    finalizers: Vec<Box<dyn PipelineStage>>,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stages: Vec::new(),
            finalizers: Vec::new(),
        }
    }

    /// Add a stage to the pipeline
    pub fn add_stage<S: PipelineStage + 'static>(mut self, stage: S) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Add a boxed stage to the pipeline
    pub fn add_boxed_stage(mut self, stage: Box<dyn PipelineStage>) -> Self {
        self.stages.push(stage);
        self
    }

    /// Add a stage that runs even when an earlier stage failed
    pub fn finally<S: PipelineStage + 'static>(mut self, stage: S) -> Self {
        self.finalizers.push(Box::new(stage));
        self
    }

    /// Build the pipeline
    pub fn build(self) -> Pipeline {
        Pipeline {
            name: self.name,
            stages: self.stages,
            finalizers: self.finalizers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::Batch;

    // Test stage that succeeds
    struct SuccessStage {
        name: String,
    }

    impl SuccessStage {
        fn new(name: impl Into<String>) -> Self {
            Self { name: name.into() }
        }
    }

    impl PipelineStage for SuccessStage {
        fn execute(&self, context: &mut PipelineContext) -> VidsealResult<()> {
            context.set_metadata(self.name.as_str(), "executed");
            Ok(())
        }

        fn name(&self) -> &str {
            &self.name
        }
    }

    // Test stage that fails
    struct FailStage {
        name: String,
    }

    impl FailStage {
        fn new(name: impl Into<String>) -> Self {
            Self { name: name.into() }
        }
    }

    impl PipelineStage for FailStage {
        fn execute(&self, _context: &mut PipelineContext) -> VidsealResult<()> {
            Err(VidsealError::PipelineError(format!("{} failed", self.name)))
        }

        fn name(&self) -> &str {
            &self.name
        }
    }

    // Test stage that can be skipped
    struct SkippableStage {
        name: String,
    }

    impl SkippableStage {
        fn new(name: impl Into<String>) -> Self {
            Self { name: name.into() }
        }
    }

    impl PipelineStage for SkippableStage {
        fn execute(&self, context: &mut PipelineContext) -> VidsealResult<()> {
            context.set_metadata(self.name.as_str(), "executed");
            Ok(())
        }

        fn name(&self) -> &str {
            &self.name
        }

        fn should_skip(&self, context: &PipelineContext) -> bool {
            context.get_metadata("skip_optional") == Some("true")
        }
    }

    fn context() -> PipelineContext {
        PipelineContext::new("session-123", Batch::default(), "/tmp/out.zip", "pass-1234")
    }

    #[test]
    fn test_pipeline_success() {
        let pipeline = Pipeline::builder("test-pipeline")
            .add_stage(SuccessStage::new("stage1"))
            .add_stage(SuccessStage::new("stage2"))
            .build();

        let mut context = context();
        let result = pipeline.execute(&mut context).unwrap();

        assert_eq!(result.stage_results.len(), 2);
        assert_eq!(result.executed_stages(), 2);
        assert!(result.warnings.is_empty());
        assert_eq!(context.get_metadata("stage1"), Some("executed"));
        assert_eq!(context.get_metadata("stage2"), Some("executed"));
        assert_eq!(context.get_metadata("pipeline_name"), Some("test-pipeline"));
    }

    #[test]
    fn test_pipeline_failure() {
        let pipeline = Pipeline::builder("test-pipeline")
            .add_stage(SuccessStage::new("stage1"))
            .add_stage(FailStage::new("stage2"))
            .add_stage(SuccessStage::new("stage3"))
            .build();

        let mut context = context();
        let result = pipeline.execute(&mut context);

        assert!(matches!(result, Err(VidsealError::PipelineError(ref m)) if m == "stage2 failed"));
        assert_eq!(context.get_metadata("stage1"), Some("executed"));
        assert!(context.get_metadata("stage3").is_none()); // Stage 3 never executed
    }

    #[test]
    fn test_pipeline_with_skipped_stage() {
        let pipeline = Pipeline::builder("test-pipeline")
            .add_stage(SuccessStage::new("stage1"))
            .add_stage(SkippableStage::new("stage2"))
            .add_stage(SuccessStage::new("stage3"))
            .build();

        let mut context = context();
        context.set_metadata("skip_optional", "true");
        let result = pipeline.execute(&mut context).unwrap();

        assert_eq!(result.stage_results.len(), 3);
        assert_eq!(result.executed_stages(), 2);
        assert_eq!(result.skipped_stages(), 1);
        assert!(context.get_metadata("stage2").is_none()); // Skipped
        assert_eq!(context.get_metadata("stage3"), Some("executed"));
    }

    #[test]
    fn test_finalizer_runs_after_failure() {
        let pipeline = Pipeline::builder("test-pipeline")
            .add_stage(FailStage::new("stage1"))
            .finally(SuccessStage::new("finalizer"))
            .build();

        let mut context = context();
        let result = pipeline.execute(&mut context);

        assert!(result.is_err());
        assert_eq!(context.get_metadata("finalizer"), Some("executed"));
    }

    #[test]
    fn test_finalizer_failure_does_not_replace_primary_error() {
        let pipeline = Pipeline::builder("test-pipeline")
            .add_stage(FailStage::new("primary"))
            .finally(FailStage::new("cleanup"))
            .build();

        let result = pipeline.execute(&mut context());

        assert!(matches!(result, Err(VidsealError::PipelineError(ref m)) if m == "primary failed"));
    }

    #[test]
    fn test_finalizer_failure_is_a_warning() {
        let pipeline = Pipeline::builder("test-pipeline")
            .add_stage(SuccessStage::new("stage1"))
            .finally(FailStage::new("cleanup"))
            .build();

        let result = pipeline.execute(&mut context()).unwrap();

        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("cleanup failed"));
        assert_eq!(result.failed_stage().unwrap().stage_name, "cleanup");
    }
}
