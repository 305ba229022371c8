use async_trait::async_trait;
use tracing::info;

use crate::error::ActionsResult;

/// An externally implemented run-loop component whose lifecycle the
/// [`PipelineSupervisor`](crate::supervisor::PipelineSupervisor) owns.
///
/// A pipeline pulls envelopes from a source, applies transformers, and
/// dispatches to actions; none of that is modeled here. The supervisor only
/// relies on the contract below:
///
/// - [`run`](Pipeline::run) resolves only once the pipeline has stopped or hit
///   an unrecoverable failure.
/// - [`stop`](Pipeline::stop) is a cooperative request, safe to invoke from a
///   task other than the one driving `run`, and idempotent. The
///   [`stop channel`](crate::concurrency::stop) primitive satisfies these
///   requirements.
/// - [`stats`](Pipeline::stats) may be called at any time.
#[async_trait]
pub trait Pipeline: Send + Sync + 'static {
    /// The pipeline's name, used as the supervisor's binding key.
    fn name(&self) -> &str;

    /// Drives the pipeline to completion.
    async fn run(&self) -> ActionsResult<()>;

    /// Requests a cooperative stop and releases resources.
    async fn stop(&self) -> ActionsResult<()>;

    /// Returns a snapshot of the pipeline's processing statistics.
    fn stats(&self) -> PipelineStats;
}

/// Summary of a pipeline's processing counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Envelopes fully processed by every action.
    pub success_count: u64,
    /// Envelopes whose processing failed.
    pub failure_count: u64,
    /// Envelopes dropped by a transformer before reaching any action.
    pub filtered_count: u64,
}

impl PipelineStats {
    /// Logs a structured summary of these statistics for the named pipeline.
    pub fn pretty_print_summary(&self, name: &str) {
        info!(
            pipeline = name,
            success = self.success_count,
            failed = self.failure_count,
            filtered = self.filtered_count,
            "pipeline statistics"
        );
    }
}
