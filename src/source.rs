use async_trait::async_trait;

use crate::error::ActionsResult;
use crate::event::EventEnvelope;

/// Produces the lazy, potentially unbounded sequence of envelopes a pipeline
/// consumes.
///
/// Receivers are `&self` because [`close`](EventSource::close) must be callable
/// while a [`poll`](EventSource::poll) is in progress to support cooperative
/// shutdown; implementations use interior mutability for their cursor and
/// connection state.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Pulls the next envelope, or `None` once the source is exhausted or
    /// closed.
    async fn poll(&self) -> ActionsResult<Option<EventEnvelope>>;

    /// Signals that an envelope was fully processed downstream, for
    /// at-least-once redelivery semantics upstream.
    async fn ack(&self, envelope: &EventEnvelope) -> ActionsResult<()>;

    /// Releases resources. Idempotent, and safe to call concurrently with an
    /// in-progress poll.
    async fn close(&self) -> ActionsResult<()>;
}
