use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use super::EventStrategy;
use crate::domain::{
    errors::{EventError, EventResult},
    models::EventType,
};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("more than one strategy registered for event type {0}")]
    DuplicateStrategy(EventType),
}

/// Maps each event type to its strategy. Built once at startup.
#[derive(Clone)]
pub struct EventStrategyRegistry {
    strategies: HashMap<EventType, Arc<dyn EventStrategy>>,
}

impl EventStrategyRegistry {
    pub fn new(strategies: Vec<Arc<dyn EventStrategy>>) -> Result<Self, RegistryError> {
        let mut map = HashMap::with_capacity(strategies.len());
        for strategy in strategies {
            let event_type = strategy.event_type();
            if map.insert(event_type, strategy).is_some() {
                return Err(RegistryError::DuplicateStrategy(event_type));
            }
        }
        Ok(Self { strategies: map })
    }

    pub fn get(&self, event_type: EventType) -> EventResult<&Arc<dyn EventStrategy>> {
        self.strategies
            .get(&event_type)
            .ok_or(EventError::UnsupportedEventType { event_type })
    }

    /// Registered types in a stable order
    pub fn registered_types(&self) -> Vec<EventType> {
        let mut types: Vec<EventType> = self.strategies.keys().copied().collect();
        types.sort();
        types
    }
}
