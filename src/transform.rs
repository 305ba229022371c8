use async_trait::async_trait;

use crate::error::ActionsResult;
use crate::event::EventEnvelope;

/// Rewrites, enriches, or filters envelopes on their way through a pipeline.
#[async_trait]
pub trait Transformer: Send + Sync {
    /// Transforms one envelope.
    ///
    /// Returning `None` drops the envelope from the remainder of the pipeline.
    /// The transformer owns the envelope for the duration of the call and may
    /// freely mutate its `meta`. Failures are not suppressed: they propagate up
    /// through the pipeline's run loop.
    async fn transform(&self, envelope: EventEnvelope) -> ActionsResult<Option<EventEnvelope>>;
}
