use std::collections::HashMap;
use std::sync::Arc;

use crate::actions_error;
use crate::error::{ActionsError, ActionsResult, ErrorKind};
use crate::event::base::{Event, EventFactory};
use crate::event::change_log::{METADATA_CHANGE_LOG_EVENT_V1_TYPE, MetadataChangeLogEventFactory};
use crate::event::entity_change::{ENTITY_CHANGE_EVENT_V1_TYPE, EntityChangeEventFactory};

/// Name-keyed catalog of event factories enabling polymorphic parse.
///
/// The registry is populated at process initialization (built-in kinds plus
/// plugin registrations) and read for the rest of the process lifetime; there
/// is no removal path. Registration takes `&mut self`, so the usual pattern is
/// to build the registry mutably at startup and then share it read-only, e.g.
/// behind an [`Arc`].
#[derive(Default)]
pub struct EventTypeRegistry {
    factories: HashMap<String, Arc<dyn EventFactory>>,
}

impl std::fmt::Debug for EventTypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventTypeRegistry")
            .field("types", &self.type_names())
            .finish()
    }
}

impl EventTypeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Creates a registry with the built-in event kinds already registered.
    ///
    /// The built-ins are the change-log event
    /// ([`METADATA_CHANGE_LOG_EVENT_V1_TYPE`]) and the entity-change event
    /// ([`ENTITY_CHANGE_EVENT_V1_TYPE`]).
    pub fn with_default_types() -> Self {
        let factories: HashMap<String, Arc<dyn EventFactory>> = HashMap::from([
            (
                METADATA_CHANGE_LOG_EVENT_V1_TYPE.to_string(),
                Arc::new(MetadataChangeLogEventFactory) as Arc<dyn EventFactory>,
            ),
            (
                ENTITY_CHANGE_EVENT_V1_TYPE.to_string(),
                Arc::new(EntityChangeEventFactory) as Arc<dyn EventFactory>,
            ),
        ]);

        Self { factories }
    }

    /// Binds a type name to a factory.
    ///
    /// Rebinding an existing name is rejected with
    /// [`ErrorKind::DuplicateEventType`]: a type name identifies one schema for
    /// the registry's lifetime, and a silent overwrite would reroute every
    /// envelope carrying that tag.
    pub fn register(
        &mut self,
        type_name: impl Into<String>,
        factory: Arc<dyn EventFactory>,
    ) -> ActionsResult<()> {
        let type_name = type_name.into();
        if self.factories.contains_key(&type_name) {
            return Err(actions_error!(
                ErrorKind::DuplicateEventType,
                "Event type is already registered",
                type_name
            ));
        }

        self.factories.insert(type_name, factory);

        Ok(())
    }

    /// Returns the factory bound to a type name.
    pub fn get(&self, type_name: &str) -> ActionsResult<Arc<dyn EventFactory>> {
        let Some(factory) = self.factories.get(type_name) else {
            return Err(actions_error!(
                ErrorKind::UnknownEventType,
                "Event type is not registered",
                type_name
            ));
        };

        Ok(factory.clone())
    }

    /// Parses an event of the given type from its canonical JSON text form.
    pub fn parse_event(&self, type_name: &str, json: &str) -> ActionsResult<Box<dyn Event>> {
        self.get(type_name)?.parse(json)
    }

    /// Returns the currently registered type names.
    pub fn type_names(&self) -> Vec<&str> {
        self.factories.keys().map(|name| name.as_str()).collect()
    }
}
