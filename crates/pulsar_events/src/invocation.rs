//! # Bound Invocation
//!
//! One persisted (component, method name, arguments) record and the logic that
//! turns it into a call.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::argument::{Argument, ArgumentSlot, Value};
use crate::error::{DecodeError, InvocationError};
use crate::method::MethodInfo;
use crate::scene::{ComponentHandle, ObjectId, Scene};

/// Why an entry was skipped without calling anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    MissingComponent,
    MissingMethodName,
    /// The handle no longer points at a live component.
    ComponentNotFound(ComponentHandle),
    MethodNotFound {
        type_name: &'static str,
        method: String,
    },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingComponent => write!(f, "missing target component"),
            Self::MissingMethodName => write!(f, "missing method name"),
            Self::ComponentNotFound(handle) => write!(f, "no component at {handle}"),
            Self::MethodNotFound { type_name, method } => {
                write!(f, "method `{method}` not found on `{type_name}`")
            }
        }
    }
}

/// A parameter that received its type's default because the editor cannot
/// store a value for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnsupportedParam {
    pub index: usize,
    pub name: &'static str,
    pub type_name: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvokeOutcome {
    /// The method ran. `unsupported` lists parameters that were defaulted.
    Invoked { unsupported: Vec<UnsupportedParam> },
    Skipped(SkipReason),
}

impl InvokeOutcome {
    pub fn is_invoked(&self) -> bool {
        matches!(self, Self::Invoked { .. })
    }

    pub fn unsupported(&self) -> &[UnsupportedParam] {
        match self {
            Self::Invoked { unsupported } => unsupported,
            Self::Skipped(_) => &[],
        }
    }
}

/// A single custom event entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundInvocation {
    #[serde(default)]
    pub target_object: Option<ObjectId>,
    #[serde(default)]
    pub target_component: Option<ComponentHandle>,
    #[serde(default)]
    pub method_name: String,
    /// One slot per parameter of the method, by position.
    #[serde(default)]
    pub parameters: Vec<ArgumentSlot>,
}

impl BoundInvocation {
    pub fn new(component: ComponentHandle, method_name: impl Into<String>) -> Self {
        Self {
            target_object: Some(component.object),
            target_component: Some(component),
            method_name: method_name.into(),
            parameters: Vec::new(),
        }
    }

    /// Append a slot holding `arg`.
    pub fn with_argument<A: Argument>(mut self, arg: A) -> Self {
        self.parameters.push(ArgumentSlot::store(arg));
        self
    }

    pub fn with_slot(mut self, slot: ArgumentSlot) -> Self {
        self.parameters.push(slot);
        self
    }

    /// Resolve the method and call it.
    ///
    /// Missing configuration, a dangling component handle and an unknown method
    /// are logged and reported as [`InvokeOutcome::Skipped`]. Parameters of
    /// unsupported types are defaulted and listed in [`InvokeOutcome::Invoked`].
    /// Enum parse failures and errors returned by the method itself are
    /// propagated.
    pub fn invoke(&self, scene: &mut dyn Scene) -> Result<InvokeOutcome, InvocationError> {
        let Some(handle) = self.target_component else {
            warn!("custom event: missing target component");
            return Ok(InvokeOutcome::Skipped(SkipReason::MissingComponent));
        };
        if self.method_name.is_empty() {
            warn!(component = %handle, "custom event: missing method name");
            return Ok(InvokeOutcome::Skipped(SkipReason::MissingMethodName));
        }

        let Some(component) = scene.component_mut(&handle) else {
            warn!(component = %handle, method = %self.method_name, "custom event: target component not found");
            return Ok(InvokeOutcome::Skipped(SkipReason::ComponentNotFound(handle)));
        };

        let type_info = component.type_info();
        let Some(method) = type_info.resolve(&self.method_name) else {
            warn!(
                method = %self.method_name,
                type_name = type_info.name,
                "custom event: method not found"
            );
            return Ok(InvokeOutcome::Skipped(SkipReason::MethodNotFound {
                type_name: type_info.name,
                method: self.method_name.clone(),
            }));
        };

        let args = self.build_arguments(method)?;
        (method.invoke)(component.as_any_mut(), args)?;

        debug!(type_name = type_info.name, method = method.name, "custom event invoked");
        let unsupported = method
            .unsupported_params()
            .map(|(index, param)| UnsupportedParam {
                index,
                name: param.name,
                type_name: param.ty.display_name(),
            })
            .collect();
        Ok(InvokeOutcome::Invoked { unsupported })
    }

    /// Decode one value per declared parameter of `method`.
    ///
    /// Missing slots and unsupported parameter types yield [`Value::Absent`], so
    /// the parameter receives its type's default. An invalid enum member fails.
    pub fn build_arguments(&self, method: &MethodInfo) -> Result<Vec<Value>, InvocationError> {
        method
            .params
            .iter()
            .enumerate()
            .map(|(index, param)| {
                let Some(slot) = self.parameters.get(index) else {
                    debug!(method = method.name, param = param.name, "no stored argument, using default");
                    return Ok(Value::Absent);
                };
                if slot.is_stale_for(&param.ty) {
                    debug!(
                        method = method.name,
                        param = param.name,
                        stored = slot.value.kind_name(),
                        expected = param.ty.display_name(),
                        "stale argument ignored"
                    );
                }
                match slot.decode(&param.ty) {
                    Ok(value) => Ok(value),
                    Err(DecodeError::UnsupportedType { type_name }) => {
                        warn!(
                            method = method.name,
                            param = param.name,
                            type_name,
                            "unsupported parameter type, passing default"
                        );
                        Ok(Value::Absent)
                    }
                    Err(source) => Err(InvocationError::Decode {
                        method: method.name.to_string(),
                        index,
                        source,
                    }),
                }
            })
            .collect()
    }
}
