//! # Event Invoker Component
//!
//! A component that carries a custom event list and fires it on request. It is
//! itself introspectable, and exposes two sample methods that are handy to wire
//! up while testing an event list in the editor.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::InvocationError;
use crate::event_set::{EventSet, FailurePolicy, InvocationReport};
use crate::scene::{ComponentHandle, ObjectRef, Scene};
use crate::{event_methods, ObjectHandle};

/// Handle to an audio asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ObjectHandle)]
pub struct AudioClip(pub ObjectRef);

/// Handle to a mesh component on another object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ObjectHandle)]
pub struct MeshFilter(pub ObjectRef);

/// Handle to a material asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ObjectHandle)]
pub struct Material(pub ObjectRef);

fn describe<H: ObjectHandle>(handle: Option<H>) -> String {
    handle.map_or_else(|| "null".to_string(), |h| h.object_ref().to_string())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventInvoker {
    /// Custom events work like the engine's single-argument events, but the
    /// bound methods may take any number of parameters.
    #[serde(default)]
    pub events: Option<EventSet>,
    #[serde(default)]
    pub failure_policy: FailurePolicy,
    #[serde(skip)]
    last_message: Option<String>,
}

impl EventInvoker {
    pub fn new(events: EventSet) -> Self {
        Self {
            events: Some(events),
            ..Self::default()
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Fire the attached events, if any.
    pub fn invoke_custom_events(
        &self,
        scene: &mut dyn Scene,
    ) -> Result<InvocationReport, InvocationError> {
        match &self.events {
            Some(events) => events.invoke_with_policy(scene, self.failure_policy),
            None => Ok(InvocationReport::default()),
        }
    }

    /// Line logged by the last sample method call.
    pub fn last_message(&self) -> Option<&str> {
        self.last_message.as_deref()
    }
}

#[event_methods]
impl EventInvoker {
    /// Example with int, float, and bool parameters.
    pub fn test_method_one(&mut self, number: i32, speed: f32, is_active: bool) {
        let message =
            format!("[TestMethodOne] number={number}, speed={speed}, isActive={is_active}");
        info!("{message}");
        self.last_message = Some(message);
    }

    /// Example with object reference parameters.
    pub fn test_method_two(
        &mut self,
        audio: Option<AudioClip>,
        mesh: Option<MeshFilter>,
        material: Option<Material>,
    ) {
        let message = format!(
            "[TestMethodTwo] Audio={}, Mesh={}, Material={}",
            describe(audio),
            describe(mesh),
            describe(material)
        );
        info!("{message}");
        self.last_message = Some(message);
    }
}

/// Fire the events of the [`EventInvoker`] behind `handle`.
///
/// The invoker's list is copied out first so its entries may target the invoker
/// itself. Returns `None` when `handle` does not point at an invoker.
pub fn fire(
    scene: &mut dyn Scene,
    handle: &ComponentHandle,
) -> Option<Result<InvocationReport, InvocationError>> {
    let invoker = scene
        .component(handle)?
        .as_any()
        .downcast_ref::<EventInvoker>()?
        .clone();
    Some(invoker.invoke_custom_events(scene))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invocation::BoundInvocation;
    use crate::method::Introspect;
    use crate::scene::{ObjectId, SceneGraph};

    #[test]
    fn test_invoker_without_events_does_nothing() {
        let mut scene = SceneGraph::new();
        let report = EventInvoker::default()
            .invoke_custom_events(&mut scene)
            .unwrap();
        assert_eq!(report.invoked, 0);
    }

    #[test]
    fn test_fire_targets_invoker_itself() {
        let mut scene = SceneGraph::new();
        let object = scene.spawn("Invoker");
        let handle = scene.attach(object, EventInvoker::default()).unwrap();

        let mut events = EventSet::new();
        events.add_event(
            BoundInvocation::new(handle, "test_method_one")
                .with_argument(7_i32)
                .with_argument(1.5_f32)
                .with_argument(true),
        );
        scene.get_mut::<EventInvoker>(&handle).unwrap().events = Some(events);

        let report = fire(&mut scene, &handle).unwrap().unwrap();
        assert_eq!(report.invoked, 1);
        assert_eq!(
            scene.get::<EventInvoker>(&handle).unwrap().last_message(),
            Some("[TestMethodOne] number=7, speed=1.5, isActive=true")
        );
    }

    #[test]
    fn test_method_two_prints_null_for_missing_objects() {
        let mut scene = SceneGraph::new();
        let object = scene.spawn("Invoker");
        let handle = scene.attach(object, EventInvoker::default()).unwrap();

        let events: EventSet = [BoundInvocation::new(handle, "test_method_two")
            .with_argument(Some(AudioClip(ObjectRef(ObjectId(9)))))]
        .into_iter()
        .collect();
        events.invoke(&mut scene).unwrap();

        assert_eq!(
            scene.get::<EventInvoker>(&handle).unwrap().last_message(),
            Some("[TestMethodTwo] Audio=#9, Mesh=null, Material=null")
        );
    }

    #[test]
    fn test_method_two_declares_handle_types() {
        let method = EventInvoker::type_info()
            .resolve("test_method_two")
            .unwrap();
        let declared: Vec<_> = method.params.iter().map(|p| p.ty.display_name()).collect();
        assert_eq!(declared, vec!["AudioClip", "MeshFilter", "Material"]);
    }

    #[test]
    fn test_typed_handles_survive_persistence() {
        let mut scene = SceneGraph::new();
        let object = scene.spawn("Invoker");
        let handle = scene.attach(object, EventInvoker::default()).unwrap();

        let events: EventSet = [BoundInvocation::new(handle, "test_method_two")
            .with_argument(Some(AudioClip(ObjectRef(ObjectId(3)))))
            .with_argument(Some(MeshFilter(ObjectRef(ObjectId(4)))))
            .with_argument(Some(Material(ObjectRef(ObjectId(5)))))]
        .into_iter()
        .collect();
        let reloaded = EventSet::from_json(&events.to_json().unwrap()).unwrap();
        assert_eq!(reloaded.events()[0].parameters[1].type_name, "MeshFilter");

        reloaded.invoke(&mut scene).unwrap();
        assert_eq!(
            scene.get::<EventInvoker>(&handle).unwrap().last_message(),
            Some("[TestMethodTwo] Audio=#3, Mesh=#4, Material=#5")
        );
    }

    #[test]
    fn test_fire_on_other_component_returns_none() {
        let mut scene = SceneGraph::new();
        let object = scene.spawn("Empty");
        let missing = ComponentHandle {
            object,
            component: crate::scene::ComponentId(999),
        };
        assert!(fire(&mut scene, &missing).is_none());
    }
}
