use std::any::Any;
use std::fmt;

use crate::error::ActionsResult;

/// A type-tagged, serializable structured payload exchanged through a pipeline.
///
/// Implementations must round-trip through the canonical JSON text form: for
/// any event produced by an [`EventFactory::parse`] call or by programmatic
/// construction, [`Event::to_json`] is total and parsing its output yields a
/// field-equal event.
pub trait Event: fmt::Debug + Send + Sync + 'static {
    /// Serializes this event to its canonical UTF-8 JSON text form.
    fn to_json(&self) -> ActionsResult<String>;

    /// Returns this event as [`Any`] to allow downcasting to the concrete kind.
    fn as_any(&self) -> &dyn Any;

    /// Mutable variant of [`Event::as_any`].
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl dyn Event {
    /// Attempts to downcast this event to a concrete kind.
    pub fn downcast_ref<T: Event>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Mutable variant of [`downcast_ref`](Self::downcast_ref).
    pub fn downcast_mut<T: Event>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}

/// Constructs events of one concrete kind from their canonical JSON text form.
///
/// One factory is registered per type name in the
/// [`EventTypeRegistry`](crate::event::EventTypeRegistry), enabling
/// polymorphic parsing keyed by the envelope's type tag.
pub trait EventFactory: fmt::Debug + Send + Sync {
    /// Parses the canonical JSON text form into an event.
    ///
    /// Parsing is strict for the fields the schema declares: unknown fields
    /// and missing required fields fail with
    /// [`ErrorKind::MalformedEventPayload`](crate::error::ErrorKind::MalformedEventPayload).
    fn parse(&self, json: &str) -> ActionsResult<Box<dyn Event>>;
}
