use serde_json::Value;
use std::collections::HashMap;

use crate::event::base::Event;

/// Transport wrapper carrying one event through a pipeline pass.
///
/// Couples the event payload with the type name it was registered under and a
/// mutable metadata side-channel. `meta` starts empty for every freshly
/// constructed envelope, is free for transformers to write and downstream
/// actions to read, and is never serialized or persisted with the event.
#[derive(Debug)]
pub struct EventEnvelope {
    /// Type name under which the payload's factory is registered.
    pub event_type: String,
    /// The event payload.
    pub event: Box<dyn Event>,
    /// Ephemeral metadata scoped to a single pass through a pipeline.
    pub meta: HashMap<String, Value>,
}

impl EventEnvelope {
    /// Creates an envelope with empty metadata.
    pub fn new(event_type: impl Into<String>, event: Box<dyn Event>) -> Self {
        Self {
            event_type: event_type.into(),
            event,
            meta: HashMap::new(),
        }
    }
}
