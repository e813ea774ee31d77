//! # Argument Model
//!
//! How a method parameter's value is stored between editing and invocation.
//!
//! - [`DeclaredType`] is what a method table says a parameter is.
//! - [`ArgumentSlot`] is the persisted, editor-written cell. Its [`SlotValue`] is a
//!   tagged union, so the editor records which representation it wrote.
//! - [`Value`] is the decoded, invocation-ready form handed to a method invoker.
//! - [`Argument`] links a Rust parameter type to all three.
//!
//! A slot holding a representation other than the one the parameter declares is
//! stale: decoding ignores it and uses the declared type's empty value. Enum
//! members are the exception, an unknown member name is always an error.

use serde::{Deserialize, Serialize};

use crate::error::{ArgumentMismatch, DecodeError};
use crate::scene::ObjectRef;

/// Member names of an enum usable as an event argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumInfo {
    pub name: &'static str,
    pub members: &'static [&'static str],
}

impl EnumInfo {
    pub fn position(&self, member: &str) -> Option<usize> {
        self.members.iter().position(|m| *m == member)
    }
}

/// Parameter type as seen by the binding layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclaredType {
    Int,
    Float,
    Bool,
    Text,
    /// A handle to an externally owned object.
    Object { type_name: &'static str },
    Enum(&'static EnumInfo),
    /// Anything the editor cannot provide a value for.
    Unsupported { type_name: &'static str },
}

impl DeclaredType {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Text => "string",
            Self::Object { type_name } | Self::Unsupported { type_name } => *type_name,
            Self::Enum(info) => info.name,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported { .. })
    }

    /// The value a freshly created slot for this type holds.
    pub fn empty_slot(&self) -> SlotValue {
        match self {
            Self::Int => SlotValue::Int(0),
            Self::Float => SlotValue::Float(0.0),
            Self::Bool => SlotValue::Bool(false),
            Self::Text => SlotValue::Text(String::new()),
            Self::Object { .. } => SlotValue::Object(None),
            Self::Enum(info) => SlotValue::Text(
                info.members
                    .first()
                    .map(|m| m.to_string())
                    .unwrap_or_default(),
            ),
            Self::Unsupported { .. } => SlotValue::Empty,
        }
    }
}

/// Persisted representation of one argument.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SlotValue {
    #[default]
    Empty,
    Int(i32),
    Float(f32),
    Bool(bool),
    /// Plain text, or an enum member name.
    Text(String),
    Object(Option<ObjectRef>),
}

impl SlotValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Bool(_) => "bool",
            Self::Text(_) => "text",
            Self::Object(_) => "object",
        }
    }

    /// Whether this representation is the one `declared` reads.
    pub fn matches(&self, declared: &DeclaredType) -> bool {
        matches!(
            (declared, self),
            (DeclaredType::Int, Self::Int(_))
                | (DeclaredType::Float, Self::Float(_))
                | (DeclaredType::Bool, Self::Bool(_))
                | (DeclaredType::Text, Self::Text(_))
                | (DeclaredType::Enum(_), Self::Text(_))
                | (DeclaredType::Object { .. }, Self::Object(_))
                | (DeclaredType::Unsupported { .. }, Self::Empty)
        )
    }
}

/// One editor-written argument cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArgumentSlot {
    /// Type label shown by the editor when the slot was written. Never read by decoding.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub type_name: String,
    #[serde(default)]
    pub value: SlotValue,
}

impl ArgumentSlot {
    pub fn new(value: SlotValue) -> Self {
        Self {
            type_name: String::new(),
            value,
        }
    }

    /// A slot holding `arg`, labelled with its declared type.
    pub fn store<A: Argument>(arg: A) -> Self {
        Self {
            type_name: A::DECLARED.display_name().to_string(),
            value: arg.into_slot(),
        }
    }

    /// An empty slot for a parameter of type `declared`.
    pub fn for_type(declared: &DeclaredType) -> Self {
        Self {
            type_name: declared.display_name().to_string(),
            value: declared.empty_slot(),
        }
    }

    /// Overwrite the slot with `arg`.
    pub fn set<A: Argument>(&mut self, arg: A) {
        *self = Self::store(arg);
    }

    /// Whether the stored representation is not the one `declared` reads.
    pub fn is_stale_for(&self, declared: &DeclaredType) -> bool {
        !self.value.matches(declared)
    }

    /// Read the slot as a value of `declared`.
    ///
    /// Only the representation matching `declared` is consulted. Any other one is
    /// ignored and the type's empty value returned instead, except for enums
    /// where the stored text must name a member.
    pub fn decode(&self, declared: &DeclaredType) -> Result<Value, DecodeError> {
        let value = match (declared, &self.value) {
            (DeclaredType::Int, SlotValue::Int(v)) => Value::Int(*v),
            (DeclaredType::Int, _) => Value::Int(0),
            (DeclaredType::Float, SlotValue::Float(v)) => Value::Float(*v),
            (DeclaredType::Float, _) => Value::Float(0.0),
            (DeclaredType::Bool, SlotValue::Bool(v)) => Value::Bool(*v),
            (DeclaredType::Bool, _) => Value::Bool(false),
            (DeclaredType::Text, SlotValue::Text(v)) => Value::Text(v.clone()),
            (DeclaredType::Text, _) => Value::Text(String::new()),
            (DeclaredType::Object { .. }, SlotValue::Object(v)) => Value::Object(*v),
            (DeclaredType::Object { .. }, _) => Value::Object(None),
            (DeclaredType::Enum(info), stored) => {
                let text = match stored {
                    SlotValue::Text(text) => text.as_str(),
                    _ => "",
                };
                match info.position(text) {
                    Some(index) => Value::Enum {
                        index,
                        name: info.members[index],
                    },
                    None => {
                        return Err(DecodeError::EnumParse {
                            enum_name: info.name,
                            text: text.to_string(),
                        })
                    }
                }
            }
            (DeclaredType::Unsupported { type_name }, _) => {
                return Err(DecodeError::UnsupportedType {
                    type_name: *type_name,
                })
            }
        };
        Ok(value)
    }
}

impl From<SlotValue> for ArgumentSlot {
    fn from(value: SlotValue) -> Self {
        Self::new(value)
    }
}

/// A decoded argument, ready to be passed to a method invoker.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i32),
    Float(f32),
    Bool(bool),
    Text(String),
    Enum { index: usize, name: &'static str },
    Object(Option<ObjectRef>),
    /// No value available, the parameter receives its type's default.
    Absent,
}

impl Value {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Bool(_) => "bool",
            Self::Text(_) => "text",
            Self::Enum { .. } => "enum",
            Self::Object(_) => "object",
            Self::Absent => "absent",
        }
    }
}

/// A Rust type that can be a parameter of an event method.
///
/// Implemented here for `i32`, `f32`, `bool`, `String` and `Option<H>` for every
/// [`ObjectHandle`] `H`. Derive it with `#[derive(EventEnum)]` for unit-only
/// enums, or with `#[derive(OpaqueArgument)]` for `Default` types the editor
/// cannot edit.
pub trait Argument: Sized {
    const DECLARED: DeclaredType;

    /// Convert a decoded value. [`Value::Absent`] yields the type's default.
    fn from_value(value: Value) -> Result<Self, ArgumentMismatch>;

    /// The slot representation that decodes back to `self`.
    fn into_slot(self) -> SlotValue;
}

macro_rules! primitive_argument {
    ($ty:ty, $variant:ident, $declared:expr, $label:literal) => {
        impl Argument for $ty {
            const DECLARED: DeclaredType = $declared;

            fn from_value(value: Value) -> Result<Self, ArgumentMismatch> {
                match value {
                    Value::$variant(v) => Ok(v),
                    Value::Absent => Ok(<$ty>::default()),
                    other => Err(ArgumentMismatch {
                        expected: $label,
                        found: other.kind_name(),
                    }),
                }
            }

            fn into_slot(self) -> SlotValue {
                SlotValue::$variant(self)
            }
        }
    };
}

primitive_argument!(i32, Int, DeclaredType::Int, "int");
primitive_argument!(f32, Float, DeclaredType::Float, "float");
primitive_argument!(bool, Bool, DeclaredType::Bool, "bool");
primitive_argument!(String, Text, DeclaredType::Text, "text");

/// A typed reference to an externally owned object, such as an asset.
///
/// The type name is what the editor's object field accepts. Derive it with
/// `#[derive(ObjectHandle)]` on a newtype over [`ObjectRef`]:
///
/// ```ignore
/// #[derive(Debug, Clone, Copy, PartialEq, Eq, ObjectHandle)]
/// pub struct AudioClip(pub ObjectRef);
/// ```
pub trait ObjectHandle: Sized {
    const TYPE_NAME: &'static str;

    fn from_ref(object: ObjectRef) -> Self;

    fn object_ref(&self) -> ObjectRef;
}

impl ObjectHandle for ObjectRef {
    const TYPE_NAME: &'static str = "ObjectRef";

    fn from_ref(object: ObjectRef) -> Self {
        object
    }

    fn object_ref(&self) -> ObjectRef {
        *self
    }
}

impl<H: ObjectHandle> Argument for Option<H> {
    const DECLARED: DeclaredType = DeclaredType::Object {
        type_name: H::TYPE_NAME,
    };

    fn from_value(value: Value) -> Result<Self, ArgumentMismatch> {
        match value {
            Value::Object(object) => Ok(object.map(H::from_ref)),
            Value::Absent => Ok(None),
            other => Err(ArgumentMismatch {
                expected: H::TYPE_NAME,
                found: other.kind_name(),
            }),
        }
    }

    fn into_slot(self) -> SlotValue {
        SlotValue::Object(self.as_ref().map(H::object_ref))
    }
}

/// An enum whose members can be chosen by name in the editor.
pub trait EventEnum: Sized + 'static {
    const INFO: &'static EnumInfo;

    fn from_index(index: usize) -> Option<Self>;

    fn index(&self) -> usize;

    fn member_name(&self) -> &'static str {
        Self::INFO.members.get(self.index()).copied().unwrap_or_default()
    }

    /// Parse a member name, failing loudly on anything else.
    fn parse_member(text: &str) -> Result<Self, DecodeError> {
        Self::INFO
            .position(text)
            .and_then(Self::from_index)
            .ok_or_else(|| DecodeError::EnumParse {
                enum_name: Self::INFO.name,
                text: text.to_string(),
            })
    }
}

#[doc(hidden)]
pub fn enum_from_value<E: EventEnum>(value: Value) -> Result<E, ArgumentMismatch> {
    let index = match value {
        Value::Enum { index, .. } => index,
        Value::Absent => 0,
        other => {
            return Err(ArgumentMismatch {
                expected: E::INFO.name,
                found: other.kind_name(),
            })
        }
    };
    E::from_index(index).ok_or(ArgumentMismatch {
        expected: E::INFO.name,
        found: "out of range member",
    })
}

#[doc(hidden)]
pub fn enum_into_slot<E: EventEnum>(member: &E) -> SlotValue {
    SlotValue::Text(member.member_name().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::ObjectId;

    static DIRECTION: EnumInfo = EnumInfo {
        name: "Direction",
        members: &["North", "East", "South", "West"],
    };

    #[test]
    fn test_decode_reads_matching_representation() {
        assert_eq!(
            ArgumentSlot::new(SlotValue::Int(7)).decode(&DeclaredType::Int),
            Ok(Value::Int(7))
        );
        assert_eq!(
            ArgumentSlot::new(SlotValue::Float(1.5)).decode(&DeclaredType::Float),
            Ok(Value::Float(1.5))
        );
        assert_eq!(
            ArgumentSlot::new(SlotValue::Bool(true)).decode(&DeclaredType::Bool),
            Ok(Value::Bool(true))
        );
        assert_eq!(
            ArgumentSlot::new(SlotValue::Text("hello".into())).decode(&DeclaredType::Text),
            Ok(Value::Text("hello".into()))
        );
    }

    #[test]
    fn test_stale_representation_is_ignored() {
        let slot = ArgumentSlot::new(SlotValue::Float(3.25));
        assert!(slot.is_stale_for(&DeclaredType::Int));
        assert_eq!(slot.decode(&DeclaredType::Int), Ok(Value::Int(0)));
        assert_eq!(slot.decode(&DeclaredType::Bool), Ok(Value::Bool(false)));
        assert_eq!(
            slot.decode(&DeclaredType::Object { type_name: "ObjectRef" }),
            Ok(Value::Object(None))
        );
        // the stored value survives for a later matching decode
        assert_eq!(slot.decode(&DeclaredType::Float), Ok(Value::Float(3.25)));
    }

    #[test]
    fn test_enum_member_decodes_to_index() {
        let slot = ArgumentSlot::new(SlotValue::Text("South".into()));
        assert_eq!(
            slot.decode(&DeclaredType::Enum(&DIRECTION)),
            Ok(Value::Enum {
                index: 2,
                name: "South"
            })
        );
    }

    #[test]
    fn test_invalid_enum_member_fails() {
        let slot = ArgumentSlot::new(SlotValue::Text("Up".into()));
        assert_eq!(
            slot.decode(&DeclaredType::Enum(&DIRECTION)),
            Err(DecodeError::EnumParse {
                enum_name: "Direction",
                text: "Up".into()
            })
        );

        // a slot that never held text has no member name either
        let empty = ArgumentSlot::default();
        assert!(matches!(
            empty.decode(&DeclaredType::Enum(&DIRECTION)),
            Err(DecodeError::EnumParse { .. })
        ));
    }

    #[test]
    fn test_unsupported_type_is_reported() {
        let slot = ArgumentSlot::new(SlotValue::Int(4));
        assert_eq!(
            slot.decode(&DeclaredType::Unsupported { type_name: "Vec3" }),
            Err(DecodeError::UnsupportedType { type_name: "Vec3" })
        );
    }

    #[test]
    fn test_object_reference_keeps_identity() {
        let target = ObjectRef::from(ObjectId(42));
        let slot = ArgumentSlot::store(Some(target));
        assert_eq!(slot.type_name, "ObjectRef");
        let decoded = slot.decode(&<Option<ObjectRef>>::DECLARED).unwrap();
        assert_eq!(<Option<ObjectRef>>::from_value(decoded).unwrap(), Some(target));
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, crate::ObjectHandle)]
    struct Texture(ObjectRef);

    #[test]
    fn test_typed_handle_declares_its_type() {
        assert_eq!(
            <Option<Texture>>::DECLARED,
            DeclaredType::Object { type_name: "Texture" }
        );

        let texture = Texture(ObjectRef(ObjectId(5)));
        let slot = ArgumentSlot::store(Some(texture));
        assert_eq!(slot.type_name, "Texture");
        assert_eq!(slot.value, SlotValue::Object(Some(ObjectRef(ObjectId(5)))));

        let decoded = slot.decode(&<Option<Texture>>::DECLARED).unwrap();
        assert_eq!(<Option<Texture>>::from_value(decoded), Ok(Some(texture)));
        assert_eq!(<Option<Texture>>::from_value(Value::Absent), Ok(None));
    }

    #[test]
    fn test_absent_value_yields_defaults() {
        assert_eq!(i32::from_value(Value::Absent), Ok(0));
        assert_eq!(f32::from_value(Value::Absent), Ok(0.0));
        assert_eq!(bool::from_value(Value::Absent), Ok(false));
        assert_eq!(String::from_value(Value::Absent), Ok(String::new()));
        assert_eq!(<Option<ObjectRef>>::from_value(Value::Absent), Ok(None));
    }

    #[test]
    fn test_mismatched_value_is_rejected() {
        assert_eq!(
            i32::from_value(Value::Bool(true)),
            Err(ArgumentMismatch {
                expected: "int",
                found: "bool"
            })
        );
    }

    #[test]
    fn test_empty_slot_per_type() {
        assert_eq!(DeclaredType::Int.empty_slot(), SlotValue::Int(0));
        assert_eq!(
            DeclaredType::Enum(&DIRECTION).empty_slot(),
            SlotValue::Text("North".into())
        );
        assert_eq!(
            DeclaredType::Unsupported { type_name: "Vec3" }.empty_slot(),
            SlotValue::Empty
        );
    }

    #[test]
    fn test_slot_serialization_carries_discriminant() {
        let slot = ArgumentSlot::store(7_i32);
        let json = serde_json::to_value(&slot).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "type_name": "int", "value": { "kind": "int", "value": 7 } })
        );

        let back: ArgumentSlot = serde_json::from_value(json).unwrap();
        assert_eq!(back, slot);
    }
}
