//! # Component Type Registry
//!
//! Automatic registration of event-capable component types using compile-time
//! collection.
//!
//! The `#[event_methods]` macro adds each type to the registry, which the editor
//! queries to offer components and methods by name.

use std::collections::HashMap;
use std::sync::OnceLock;

use linkme::distributed_slice;
use tracing::warn;

use crate::method::{Introspect, MethodInfo, TypeInfo};

/// Global registry of all event-capable component types
///
/// Populated by `#[event_methods]` through linkme's distributed slice. Every
/// annotated impl block contributes its `type_info` accessor at link time.
#[distributed_slice]
pub static EVENT_TYPES: [fn() -> &'static TypeInfo] = [..];

/// Get all registered component types
pub fn registered_types() -> impl Iterator<Item = &'static TypeInfo> {
    EVENT_TYPES.iter().map(|type_info| type_info())
}

fn index() -> &'static HashMap<&'static str, &'static TypeInfo> {
    static INDEX: OnceLock<HashMap<&'static str, &'static TypeInfo>> = OnceLock::new();
    INDEX.get_or_init(|| {
        let mut index = HashMap::new();
        for info in registered_types() {
            if index.contains_key(info.name) {
                warn!(type_name = info.name, "duplicate event type name, keeping the first registration");
                continue;
            }
            index.insert(info.name, info);
        }
        index
    })
}

/// Get a component type by name
pub fn type_info_by_name(name: &str) -> Option<&'static TypeInfo> {
    index().get(name).copied()
}

/// Get the method table of a known type
pub fn type_info_of<T: Introspect>() -> &'static TypeInfo {
    T::type_info()
}

/// Resolve a method on a registered type, with the same rules as invocation
pub fn resolve_method(type_name: &str, method: &str) -> Option<&'static MethodInfo> {
    type_info_by_name(type_name)?.resolve(method)
}
