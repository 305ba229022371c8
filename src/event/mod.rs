//! Polymorphic event model exchanged between pipeline stages.
//!
//! Events are type-tagged, JSON-serializable records. Concrete kinds implement
//! [`Event`], are constructed and parsed through an [`EventFactory`], and are
//! looked up by their stable type name in the [`EventTypeRegistry`].

mod base;
mod change_log;
mod entity_change;
mod envelope;
mod registry;

pub use base::{Event, EventFactory};
pub use change_log::{
    AuditStamp, ChangeLogRecord, METADATA_CHANGE_LOG_EVENT_V1_TYPE, MetadataChangeLogEvent,
    MetadataChangeLogEventFactory,
};
pub use entity_change::{
    ENTITY_CHANGE_EVENT_V1_TYPE, EntityChangeEvent, EntityChangeEventFactory, EntityChangeRecord,
};
pub use envelope::EventEnvelope;
pub use registry::EventTypeRegistry;
