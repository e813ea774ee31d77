//! # Scene Boundary
//!
//! Objects and components are owned by the host. The event system only keeps
//! opaque handles to them and reaches a component through [`Scene`], the host's
//! "get component C on object O" capability. A handle whose target is gone simply
//! resolves to nothing.
//!
//! [`SceneGraph`] is a small in-memory host used by tools and tests.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::method::{Component, TypeInfo};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(pub u64);

/// Weak reference to one component attached to an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentHandle {
    pub object: ObjectId,
    pub component: ComponentId,
}

impl fmt::Display for ComponentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "object {} / component {}", self.object.0, self.component.0)
    }
}

/// Externally owned object passed as an event argument (an asset, another
/// scene object). Compared by identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectRef(pub ObjectId);

impl From<ObjectId> for ObjectRef {
    fn from(id: ObjectId) -> Self {
        Self(id)
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0 .0)
    }
}

/// Host capability used to reach components behind handles.
pub trait Scene {
    fn component(&self, handle: &ComponentHandle) -> Option<&dyn Component>;

    fn component_mut(&mut self, handle: &ComponentHandle) -> Option<&mut dyn Component>;

    /// Handles of every component attached to `object`, in attachment order.
    fn components_on(&self, object: ObjectId) -> Vec<ComponentHandle>;

    /// Runtime type of the component behind `handle`.
    fn component_type(&self, handle: &ComponentHandle) -> Option<&'static TypeInfo> {
        self.component(handle).map(|component| component.type_info())
    }

    /// First component on `object` whose runtime type is called `type_name`.
    fn find_component(&self, object: ObjectId, type_name: &str) -> Option<ComponentHandle> {
        self.components_on(object).into_iter().find(|handle| {
            self.component_type(handle)
                .is_some_and(|info| info.name == type_name)
        })
    }
}

pub struct SceneObject {
    pub id: ObjectId,
    pub name: String,
    components: Vec<(ComponentId, Box<dyn Component>)>,
}

impl fmt::Debug for SceneObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneObject")
            .field("id", &self.id)
            .field("name", &self.name)
            .field(
                "components",
                &self
                    .components
                    .iter()
                    .map(|(id, c)| (id.0, c.type_info().name))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// In-memory scene: a flat list of objects, each with its components.
#[derive(Debug, Default)]
pub struct SceneGraph {
    objects: Vec<SceneObject>,
    next_id: u64,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn spawn(&mut self, name: impl Into<String>) -> ObjectId {
        let id = ObjectId(self.allocate());
        self.objects.push(SceneObject {
            id,
            name: name.into(),
            components: Vec::new(),
        });
        id
    }

    /// Removes an object with all its components. Handles into it go dangling.
    pub fn despawn(&mut self, object: ObjectId) -> bool {
        let before = self.objects.len();
        self.objects.retain(|o| o.id != object);
        self.objects.len() != before
    }

    pub fn attach<C: Component>(&mut self, object: ObjectId, component: C) -> Option<ComponentHandle> {
        let id = ComponentId(self.allocate());
        let target = self.objects.iter_mut().find(|o| o.id == object)?;
        target.components.push((id, Box::new(component)));
        Some(ComponentHandle {
            object,
            component: id,
        })
    }

    pub fn detach(&mut self, handle: &ComponentHandle) -> Option<Box<dyn Component>> {
        let object = self.object_mut(handle.object)?;
        let index = object
            .components
            .iter()
            .position(|(id, _)| *id == handle.component)?;
        Some(object.components.remove(index).1)
    }

    pub fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    fn object_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    pub fn objects(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.iter()
    }

    /// Typed access to a component.
    pub fn get<T: Component>(&self, handle: &ComponentHandle) -> Option<&T> {
        self.component(handle)?.as_any().downcast_ref::<T>()
    }

    pub fn get_mut<T: Component>(&mut self, handle: &ComponentHandle) -> Option<&mut T> {
        self.component_mut(handle)?.as_any_mut().downcast_mut::<T>()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl Scene for SceneGraph {
    fn component(&self, handle: &ComponentHandle) -> Option<&dyn Component> {
        self.object(handle.object)?
            .components
            .iter()
            .find(|(id, _)| *id == handle.component)
            .map(|(_, component)| component.as_ref())
    }

    fn component_mut(&mut self, handle: &ComponentHandle) -> Option<&mut dyn Component> {
        let (_, component) = self
            .object_mut(handle.object)?
            .components
            .iter_mut()
            .find(|(id, _)| *id == handle.component)?;
        Some(component.as_mut())
    }

    fn components_on(&self, object: ObjectId) -> Vec<ComponentHandle> {
        self.object(object)
            .map(|o| {
                o.components
                    .iter()
                    .map(|(id, _)| ComponentHandle {
                        object,
                        component: *id,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}
