use crate::error::VidsealResult;
use serde::Serialize;
use std::time::Duration;

use super::context::PipelineContext;

/// A single stage in a pipeline
///
/// Each stage performs one step of the staging-and-archival run on the shared
/// context. Stages are executed sequentially by the pipeline executor.
///
/// # Example
/// ```
/// use vidseal::error::VidsealResult;
/// use vidseal::pipeline::{PipelineContext, PipelineStage};
///
/// struct CountStage;
///
/// impl PipelineStage for CountStage {
///     fn execute(&self, context: &mut PipelineContext) -> VidsealResult<()> {
///         let count = context.expected_entries();
///         context.set_metadata("artifact_count", count.to_string());
///         Ok(())
///     }
///
///     fn name(&self) -> &str {
///         "Count Artifacts"
///     }
/// }
/// ```
pub trait PipelineStage: Send + Sync {
    /// Execute this stage
    ///
    /// If the stage fails, it should return an error which will stop the pipeline.
    fn execute(&self, context: &mut PipelineContext) -> VidsealResult<()>;

    /// Get stage name for logging and progress tracking
    fn name(&self) -> &str;

    /// Check if this stage should be skipped based on context
    fn should_skip(&self, _context: &PipelineContext) -> bool {
        false
    }

    /// Called before execute() - useful for validation
    fn pre_execute(&self, _context: &PipelineContext) -> VidsealResult<()> {
        Ok(())
    }

    /// Called after execute() - useful for verifying outputs
    fn post_execute(&self, _context: &PipelineContext) -> VidsealResult<()> {
        Ok(())
    }
}

/// Result of a pipeline stage execution
#[derive(Debug, Clone, Serialize)]
pub struct StageResult {
    pub stage_name: String,
    pub success: bool,
    pub error: Option<String>,
    pub duration: Duration,
    pub skipped: bool,
}

impl StageResult {
    /// Create a successful stage result
    pub fn success(stage_name: impl Into<String>, duration: Duration) -> Self {
        Self {
            stage_name: stage_name.into(),
            success: true,
            error: None,
            duration,
            skipped: false,
        }
    }

    /// Create a failed stage result
    pub fn failure(
        stage_name: impl Into<String>,
        error: impl Into<String>,
        duration: Duration,
    ) -> Self {
        Self {
            stage_name: stage_name.into(),
            success: false,
            error: Some(error.into()),
            duration,
            skipped: false,
        }
    }

    /// Create a skipped stage result
    pub fn skipped(stage_name: impl Into<String>) -> Self {
        Self {
            stage_name: stage_name.into(),
            success: true,
            error: None,
            duration: Duration::from_secs(0),
            skipped: true,
        }
    }
}

/// Result of a successful pipeline execution
///
/// Finalizer failures do not fail the pipeline; they are kept in `warnings`.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub pipeline_name: String,
    pub stage_results: Vec<StageResult>,
    pub total_duration: Duration,
    pub warnings: Vec<String>,
}

impl PipelineResult {
    pub fn new(
        pipeline_name: impl Into<String>,
        stage_results: Vec<StageResult>,
        total_duration: Duration,
        warnings: Vec<String>,
    ) -> Self {
        Self {
            pipeline_name: pipeline_name.into(),
            stage_results,
            total_duration,
            warnings,
        }
    }

    /// Get the number of stages that were executed (not skipped)
    pub fn executed_stages(&self) -> usize {
        self.stage_results.iter().filter(|r| !r.skipped).count()
    }

    /// Get the number of stages that were skipped
    pub fn skipped_stages(&self) -> usize {
        self.stage_results.iter().filter(|r| r.skipped).count()
    }

    /// First stage that reported a failure (only finalizers can, on success)
    pub fn failed_stage(&self) -> Option<&StageResult> {
        self.stage_results.iter().find(|r| !r.success)
    }
}
