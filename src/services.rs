//! Ambient service context for context-aware converters
//!
//! The markup loader fills this container once per document load (resource
//! catalogs, asset resolvers, and similar lookups) and hands it to every
//! conversion request. Conversion only ever reads from it.

use std::any::{Any, TypeId};
use std::collections::HashMap;

/// Container for services injected into conversions
#[derive(Default)]
pub struct ServiceContext {
    services: HashMap<TypeId, Box<dyn Any>>,
}

impl ServiceContext {
    /// Create an empty service context
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a service, replacing any previous service of the same type
    pub fn insert<T: Any>(&mut self, service: T) {
        self.services.insert(TypeId::of::<T>(), Box::new(service));
    }

    /// Look up a service by type
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.services
            .get(&TypeId::of::<T>())
            .and_then(|service| service.downcast_ref::<T>())
    }
}
