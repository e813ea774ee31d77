//! # Pulsar Custom Events
//!
//! Designer-editable event lists for Pulsar components.
//!
//! An [`EventSet`] holds an ordered list of [`BoundInvocation`]s. Each one names a
//! component in the scene, a method on that component and one [`ArgumentSlot`] per
//! method parameter. Firing the set resolves every method by name through the
//! component's method table and calls it with its decoded arguments.
//!
//! Method tables are produced at compile time by `#[event_methods]` and collected
//! in a global registry, so the editor can list components, methods and parameter
//! types without knowing about them ahead of time.
//!
//! ```ignore
//! use pulsar_events::{event_methods, BoundInvocation, EventSet, SceneGraph};
//!
//! #[derive(Default)]
//! struct Door { open: bool }
//!
//! #[event_methods]
//! impl Door {
//!     pub fn open(&mut self, speed: f32) { self.open = true; }
//! }
//!
//! let mut scene = SceneGraph::new();
//! let object = scene.spawn("Door");
//! let door = scene.attach(object, Door::default()).unwrap();
//!
//! let mut events = EventSet::new();
//! events.add_event(BoundInvocation::new(door, "open").with_argument(2.5_f32));
//! events.invoke(&mut scene)?;
//! ```

extern crate self as pulsar_events;

pub mod argument;
pub mod config;
pub mod editing;
pub mod error;
pub mod event_set;
pub mod invocation;
pub mod invoker;
pub mod logging;
pub mod method;
pub mod registry;
pub mod scene;

pub use argument::{
    Argument, ArgumentSlot, DeclaredType, EnumInfo, EventEnum, ObjectHandle, SlotValue, Value,
};
pub use config::{EventsConfig, LoggingConfig};
pub use error::{ArgumentMismatch, ConfigError, DecodeError, InvocationError};
pub use event_set::{EventSet, FailurePolicy, InvocationReport};
pub use invocation::{BoundInvocation, InvokeOutcome, SkipReason, UnsupportedParam};
pub use invoker::{AudioClip, EventInvoker, Material, MeshFilter};
pub use method::{Component, Introspect, MethodInfo, ParamInfo, TypeInfo, Visibility, ACCESSOR_PREFIXES};
pub use registry::{registered_types, resolve_method, type_info_by_name, type_info_of};
pub use scene::{ComponentHandle, ComponentId, ObjectId, ObjectRef, Scene, SceneGraph};

pub use pulsar_events_macros::{event_methods, EventEnum, ObjectHandle, OpaqueArgument};

#[doc(hidden)]
pub mod __private {
    pub use linkme;
}
