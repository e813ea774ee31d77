//! # Method Tables
//!
//! Runtime description of the methods a component type exposes to custom
//! events. Tables are generated by `#[event_methods]` and live in statics, so a
//! type's table is built once and shared by every lookup.

use std::any::Any;
use std::fmt;

use crate::argument::{DeclaredType, Value};
use crate::error::InvocationError;

/// Name prefixes of property accessors, which are never offered as event targets.
pub const ACCESSOR_PREFIXES: [&str; 2] = ["get_", "set_"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamInfo {
    pub name: &'static str,
    /// The parameter type as written in source.
    pub type_name: &'static str,
    pub ty: DeclaredType,
}

/// Type-erased call into a concrete method. Receives the component and one
/// decoded value per declared parameter.
pub type Invoker = fn(&mut dyn Any, Vec<Value>) -> Result<(), InvocationError>;

#[derive(Clone, Copy)]
pub struct MethodInfo {
    pub name: &'static str,
    pub visibility: Visibility,
    pub params: &'static [ParamInfo],
    pub return_type: Option<&'static str>,
    /// Doc comment lines of the method, for editor tooltips.
    pub docs: &'static [&'static str],
    pub invoke: Invoker,
}

impl MethodInfo {
    pub fn is_accessor(&self) -> bool {
        ACCESSOR_PREFIXES
            .iter()
            .any(|prefix| self.name.starts_with(prefix))
    }

    /// Whether the method may be the target of a custom event.
    pub fn is_invocable(&self) -> bool {
        !self.is_accessor()
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// `name(a: i32, b: f32)` style signature for logs and menus.
    pub fn signature(&self) -> String {
        let params = self
            .params
            .iter()
            .map(|p| format!("{}: {}", p.name, p.type_name))
            .collect::<Vec<_>>()
            .join(", ");
        match self.return_type {
            Some(ret) => format!("{}({}) -> {}", self.name, params, ret),
            None => format!("{}({})", self.name, params),
        }
    }

    /// Parameters whose type the editor cannot provide a value for, with their
    /// positions.
    pub fn unsupported_params(&self) -> impl Iterator<Item = (usize, &'static ParamInfo)> {
        self.params
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.ty.is_supported())
    }
}

impl fmt::Debug for MethodInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodInfo")
            .field("name", &self.name)
            .field("visibility", &self.visibility)
            .field("params", &self.params)
            .field("return_type", &self.return_type)
            .finish_non_exhaustive()
    }
}

/// Method table of one component type.
#[derive(Debug)]
pub struct TypeInfo {
    pub name: &'static str,
    /// Every recorded method, in declaration order.
    pub methods: &'static [MethodInfo],
}

impl TypeInfo {
    /// Methods that may be bound to an event, in declaration order.
    pub fn invocable_methods(&self) -> impl Iterator<Item = &'static MethodInfo> {
        self.methods.iter().filter(|m| m.is_invocable())
    }

    /// Find the method an event named `name` calls.
    ///
    /// The first invocable method with that name wins. Parameter signatures are
    /// not compared, so same-named candidates are not disambiguated.
    pub fn resolve(&self, name: &str) -> Option<&'static MethodInfo> {
        self.invocable_methods().find(|m| m.name == name)
    }
}

/// Implemented by `#[event_methods]`.
pub trait Introspect: Any + Sized {
    fn type_info() -> &'static TypeInfo;
}

/// A scene component whose methods can be called by custom events.
pub trait Component: Any {
    fn type_info(&self) -> &'static TypeInfo;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Introspect> Component for T {
    fn type_info(&self) -> &'static TypeInfo {
        T::type_info()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
