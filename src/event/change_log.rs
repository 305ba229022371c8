use serde::{Deserialize, Serialize};
use std::any::Any;
use std::ops::{Deref, DerefMut};

use crate::actions_error;
use crate::error::{ActionsError, ActionsResult, ErrorKind};
use crate::event::base::{Event, EventFactory};

/// Stable type name for the change-log event, version 1.
///
/// Each type name can be considered a separate stream of events.
pub const METADATA_CHANGE_LOG_EVENT_V1_TYPE: &str = "MetadataChangeLogEvent_v1";

/// Who performed a change and when, in epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditStamp {
    pub time: i64,
    pub actor: String,
}

/// Structured record carried by a change-log event.
///
/// This is the canonical strict schema: every field here is validated on parse
/// and emitted on serialize, in camelCase on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ChangeLogRecord {
    pub entity_type: String,
    pub change_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_urn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_aspect_value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_metadata: Option<serde_json::Value>,
    pub created: AuditStamp,
}

/// An event representing a single low-level change-log entry.
///
/// Thin wrapper over [`ChangeLogRecord`] that adds the [`Event`] capability.
/// Record fields are reachable directly through `Deref`.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataChangeLogEvent(ChangeLogRecord);

impl MetadataChangeLogEvent {
    /// Adopts an existing record as an event.
    ///
    /// The record is moved in, not copied. Ownership transfer replaces the
    /// shared-field-store aliasing of earlier designs: after adoption the event
    /// holds the only live reference, so mutation cannot be observed through a
    /// stale handle.
    pub fn from_record(record: ChangeLogRecord) -> Self {
        Self(record)
    }

    /// Parses the canonical JSON text form, rejecting unknown and missing fields.
    pub fn from_json(json: &str) -> ActionsResult<Self> {
        let record = serde_json::from_str::<ChangeLogRecord>(json)?;
        Ok(Self(record))
    }

    /// Returns the underlying record.
    pub fn record(&self) -> &ChangeLogRecord {
        &self.0
    }
}

impl Deref for MetadataChangeLogEvent {
    type Target = ChangeLogRecord;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for MetadataChangeLogEvent {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl Event for MetadataChangeLogEvent {
    fn to_json(&self) -> ActionsResult<String> {
        let json = serde_json::to_string(&self.0).map_err(|err| {
            actions_error!(
                ErrorKind::SerializationError,
                "Failed to serialize change-log event",
                err
            )
        })?;

        Ok(json)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Factory for [`MetadataChangeLogEvent`].
#[derive(Debug, Default)]
pub struct MetadataChangeLogEventFactory;

impl EventFactory for MetadataChangeLogEventFactory {
    fn parse(&self, json: &str) -> ActionsResult<Box<dyn Event>> {
        let event = MetadataChangeLogEvent::from_json(json)?;
        Ok(Box::new(event))
    }
}
