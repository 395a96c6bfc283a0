use crate::error::{Result as ServerErrorResult, ServerError};

use std::any::{Any, TypeId};
use std::collections::HashMap;

/// The dependency container seam. The real container belongs to the
/// embedding host; this runner only needs name and type lookups from it.
pub trait Registry {
    fn by_name(&self, name: &str) -> Option<&dyn Any>;
    fn by_type(&self, type_id: TypeId) -> Option<&dyn Any>;
}

/// How a collaborator is obtained from the container: handed over directly,
/// looked up by registration name, or looked up by its type.
pub enum Resolver<T> {
    Direct(T),
    Named(String),
    ByType,
}

impl<T: Clone + 'static> Resolver<T> {
    pub fn resolve(&self, registry: &dyn Registry) -> ServerErrorResult<T> {
        match self {
            Resolver::Direct(value) => Ok(value.clone()),
            Resolver::Named(name) => registry
                .by_name(name)
                .and_then(|entry| entry.downcast_ref::<T>())
                .cloned()
                .ok_or_else(|| {
                    ServerError::resolve(format!(
                        "no entry named '{name}' of type {}",
                        std::any::type_name::<T>()
                    ))
                }),
            Resolver::ByType => registry
                .by_type(TypeId::of::<T>())
                .and_then(|entry| entry.downcast_ref::<T>())
                .cloned()
                .ok_or_else(|| {
                    ServerError::resolve(format!("no entry of type {}", std::any::type_name::<T>()))
                }),
        }
    }
}

/// Name- and type-keyed container for hosts that do not bring their own
/// (and for tests).
#[derive(Default)]
pub struct TypeMapRegistry {
    by_name: HashMap<String, Box<dyn Any + Send + Sync>>,
    by_type: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl TypeMapRegistry {
    /// Register `value` under both `name` and its concrete type.
    pub fn insert<T: Any + Send + Sync + Clone>(&mut self, name: &str, value: T) {
        self.by_name
            .insert(String::from(name), Box::new(value.clone()));
        self.by_type.insert(TypeId::of::<T>(), Box::new(value));
    }
}

impl Registry for TypeMapRegistry {
    fn by_name(&self, name: &str) -> Option<&dyn Any> {
        self.by_name
            .get(name)
            .map(|entry| entry.as_ref() as &dyn Any)
    }

    fn by_type(&self, type_id: TypeId) -> Option<&dyn Any> {
        self.by_type
            .get(&type_id)
            .map(|entry| entry.as_ref() as &dyn Any)
    }
}
