use async_trait::async_trait;

use crate::error::ActionsResult;
use crate::event::EventEnvelope;

/// Terminal side-effecting consumer at the end of a pipeline.
#[async_trait]
pub trait Action: Send + Sync {
    /// Processes one envelope.
    async fn act(&self, envelope: &EventEnvelope) -> ActionsResult<()>;

    /// Releases resources held by the action.
    async fn close(&self) -> ActionsResult<()>;
}
