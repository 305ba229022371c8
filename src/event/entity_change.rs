use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::any::Any;
use std::ops::{Deref, DerefMut};

use crate::actions_error;
use crate::error::{ActionsError, ActionsResult, ErrorKind};
use crate::event::base::{Event, EventFactory};
use crate::event::change_log::AuditStamp;

/// Stable type name for the entity-change event, version 1.
pub const ENTITY_CHANGE_EVENT_V1_TYPE: &str = "EntityChangeEvent_v1";

/// Wire key of the free-form parameters sub-structure.
const PARAMETERS_KEY: &str = "parameters";

/// Structured record carried by an entity-change event.
///
/// The typed fields form the canonical strict schema. `parameters` is a
/// free-form sub-map the strict schema cannot model: it is kept out of the
/// derived serializer entirely and spliced in and out of the JSON object by
/// hand (see [`EntityChangeEvent`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EntityChangeRecord {
    pub entity_type: String,
    pub entity_urn: String,
    pub category: String,
    pub operation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifier: Option<String>,
    pub audit_stamp: AuditStamp,
    pub version: i64,
    /// Untyped parameters, defaulting to an empty map when absent on the wire.
    #[serde(skip)]
    pub parameters: Map<String, Value>,
}

/// An event representing a high-level change to an entity.
///
/// Thin wrapper over [`EntityChangeRecord`] that adds the [`Event`]
/// capability. Record fields are reachable directly through `Deref`.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityChangeEvent(EntityChangeRecord);

impl EntityChangeEvent {
    /// Adopts an existing record as an event.
    ///
    /// The record is moved in, not copied. Ownership transfer replaces the
    /// shared-field-store aliasing of earlier designs: after adoption the event
    /// holds the only live reference to the record, `parameters` included.
    pub fn from_record(record: EntityChangeRecord) -> Self {
        Self(record)
    }

    /// Parses the canonical JSON text form.
    ///
    /// The `parameters` key is pulled out of the object before the strict
    /// parse, since the derived schema has no typed slot for it. Everything
    /// else is validated strictly.
    pub fn from_json(json: &str) -> ActionsResult<Self> {
        let mut value = serde_json::from_str::<Value>(json)?;

        let Some(object) = value.as_object_mut() else {
            return Err(actions_error!(
                ErrorKind::MalformedEventPayload,
                "Entity-change event payload must be a JSON object"
            ));
        };

        let parameters = match object.remove(PARAMETERS_KEY) {
            None => Map::new(),
            Some(Value::Object(map)) => map,
            Some(other) => {
                return Err(actions_error!(
                    ErrorKind::MalformedEventPayload,
                    "Entity-change parameters must be a JSON object",
                    other
                ));
            }
        };

        let mut record = serde_json::from_value::<EntityChangeRecord>(value)?;
        record.parameters = parameters;

        Ok(Self(record))
    }

    /// Serializes to the canonical JSON text form.
    ///
    /// Runs the strict serializer first and then inserts the live `parameters`
    /// value into the resulting object, because the derived serializer cannot
    /// type this field and would otherwise drop it.
    fn as_json_value(&self) -> ActionsResult<Value> {
        let mut value = serde_json::to_value(&self.0).map_err(|err| {
            actions_error!(
                ErrorKind::SerializationError,
                "Failed to serialize entity-change event",
                err
            )
        })?;

        let Some(object) = value.as_object_mut() else {
            return Err(actions_error!(
                ErrorKind::SerializationError,
                "Entity-change event did not serialize to a JSON object"
            ));
        };
        object.insert(
            PARAMETERS_KEY.to_string(),
            Value::Object(self.0.parameters.clone()),
        );

        Ok(value)
    }

    /// Returns the underlying record.
    pub fn record(&self) -> &EntityChangeRecord {
        &self.0
    }
}

impl Deref for EntityChangeEvent {
    type Target = EntityChangeRecord;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for EntityChangeEvent {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl Event for EntityChangeEvent {
    fn to_json(&self) -> ActionsResult<String> {
        let value = self.as_json_value()?;
        let json = serde_json::to_string(&value).map_err(|err| {
            actions_error!(
                ErrorKind::SerializationError,
                "Failed to serialize entity-change event",
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

/// Factory for [`EntityChangeEvent`].
#[derive(Debug, Default)]
pub struct EntityChangeEventFactory;

impl EventFactory for EntityChangeEventFactory {
    fn parse(&self, json: &str) -> ActionsResult<Box<dyn Event>> {
        let event = EntityChangeEvent::from_json(json)?;
        Ok(Box::new(event))
    }
}
