//! # Event Editing
//!
//! The data side of the custom event inspector: which components and methods
//! can be picked, and which field edits each parameter of the chosen method.
//! Rendering is left to the host UI.

use crate::argument::{ArgumentSlot, DeclaredType, SlotValue};
use crate::invocation::BoundInvocation;
use crate::method::{MethodInfo, TypeInfo};
use crate::scene::{ComponentHandle, ObjectId, Scene};

/// A component that can be chosen as an event target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentChoice {
    pub handle: ComponentHandle,
    pub type_name: &'static str,
}

/// Components on `object`, in attachment order.
pub fn available_components(scene: &dyn Scene, object: ObjectId) -> Vec<ComponentChoice> {
    scene
        .components_on(object)
        .into_iter()
        .filter_map(|handle| {
            let info = scene.component_type(&handle)?;
            Some(ComponentChoice {
                handle,
                type_name: info.name,
            })
        })
        .collect()
}

/// Methods offered in the method popup, in declaration order.
pub fn method_choices(type_info: &'static TypeInfo) -> Vec<&'static MethodInfo> {
    type_info.invocable_methods().collect()
}

/// Bind `invocation` to the method called `name`.
///
/// The parameter list is resized to the method's arity. Existing slots are
/// kept, new ones start empty for their declared type. Returns the selected
/// method, or `None` if `type_info` has no such method.
pub fn select_method(
    invocation: &mut BoundInvocation,
    type_info: &'static TypeInfo,
    name: &str,
) -> Option<&'static MethodInfo> {
    let method = type_info.resolve(name)?;
    invocation.method_name = method.name.to_string();

    let params = method.params;
    if invocation.parameters.len() > params.len() {
        invocation.parameters.truncate(params.len());
    }
    for param in &params[invocation.parameters.len()..] {
        invocation.parameters.push(ArgumentSlot::for_type(&param.ty));
    }
    Some(method)
}

/// Field used to edit one parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldEditor {
    IntField,
    FloatField,
    Toggle,
    TextField,
    EnumPopup {
        members: &'static [&'static str],
        /// Index of the stored member, `None` when the stored text names none.
        selected: Option<usize>,
    },
    ObjectField {
        type_name: &'static str,
    },
    /// No field, the parameter always receives its type's default.
    Unsupported,
}

impl FieldEditor {
    pub fn for_type(declared: &DeclaredType, slot: &ArgumentSlot) -> Self {
        match declared {
            DeclaredType::Int => Self::IntField,
            DeclaredType::Float => Self::FloatField,
            DeclaredType::Bool => Self::Toggle,
            DeclaredType::Text => Self::TextField,
            DeclaredType::Enum(info) => Self::EnumPopup {
                members: info.members,
                selected: match &slot.value {
                    SlotValue::Text(text) => info.position(text),
                    _ => None,
                },
            },
            DeclaredType::Object { type_name } => Self::ObjectField {
                type_name: *type_name,
            },
            DeclaredType::Unsupported { .. } => Self::Unsupported,
        }
    }
}

/// One row of the parameter editor.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterField {
    /// `"name (Type)"`, with the type as written in the method signature
    pub label: String,
    pub editor: FieldEditor,
    /// The slot the field edits. Stale and missing slots show as empty.
    pub slot: ArgumentSlot,
}

/// Build the parameter rows for `method` from the slots of `invocation`.
pub fn parameter_fields(invocation: &BoundInvocation, method: &MethodInfo) -> Vec<ParameterField> {
    method
        .params
        .iter()
        .enumerate()
        .map(|(index, param)| {
            let slot = match invocation.parameters.get(index) {
                Some(slot) if !slot.is_stale_for(&param.ty) => slot.clone(),
                _ => ArgumentSlot::for_type(&param.ty),
            };
            ParameterField {
                label: format!("{} ({})", param.name, param.type_name),
                editor: FieldEditor::for_type(&param.ty, &slot),
                slot,
            }
        })
        .collect()
}
