//! # Components — Typed Data Attached to Entities
//!
//! A component is any `'static + Send + Sync` type that implements
//! [`Component`]. Each entity holds at most one component of each type.
//!
//! ## Type Tokens
//!
//! Components are keyed by [`TypeId`], resolved at compile time. A
//! [`ComponentType`] pairs that id with the type's name so systems can declare
//! their requirements as plain data and logs stay readable:
//!
//! ```ignore
//! let required = [ComponentType::of::<VoxelIndicator>(), ComponentType::of::<Transform>()];
//! ```

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

use super::entity::EntityId;

/// Upcast helper so boxed trait objects can be downcast to their concrete type.
///
/// Implemented automatically for every sized `'static` type.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// Per-entity data.
///
/// The lifecycle hooks run when the component is stored on an entity and when
/// it is taken off again (replaced, removed, or the entity is destroyed).
pub trait Component: AsAny + Send + Sync {
    /// Called after the component is attached to `entity`.
    fn on_attach(&mut self, _entity: EntityId) {}

    /// Called before the component is detached from its entity.
    fn on_detach(&mut self) {}
}

/// Compile-time token identifying a component type.
///
/// Equality and hashing only look at the [`TypeId`]; the name is for humans.
#[derive(Clone, Copy)]
pub struct ComponentType {
    id: TypeId,
    name: &'static str,
}

impl ComponentType {
    /// Token for component type `T`.
    pub fn of<T: Component>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(self) -> TypeId {
        self.id
    }

    /// Fully-qualified type name.
    pub fn name(self) -> &'static str {
        self.name
    }

    /// Type name without its module path (`voxie::math::Transform` → `Transform`).
    pub fn short_name(self) -> &'static str {
        short_type_name(self.name)
    }
}

impl PartialEq for ComponentType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ComponentType {}

impl Hash for ComponentType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentType({})", self.short_name())
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Strip the module path from a type name, keeping generic arguments intact.
pub(crate) fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    match base.rfind("::") {
        Some(pos) => &full[pos + 2..],
        None => full,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Health(u32);
    impl Component for Health {}

    struct Armor;
    impl Component for Armor {}

    #[test]
    fn tokens_compare_by_type() {
        assert_eq!(ComponentType::of::<Health>(), ComponentType::of::<Health>());
        assert_ne!(ComponentType::of::<Health>(), ComponentType::of::<Armor>());
    }

    #[test]
    fn short_name_drops_module_path() {
        assert_eq!(ComponentType::of::<Health>().short_name(), "Health");
        assert_eq!(short_type_name("a::b::Foo<c::Bar>"), "Foo<c::Bar>");
        assert_eq!(short_type_name("Plain"), "Plain");
    }

    #[test]
    fn boxed_component_downcasts() {
        let boxed: Box<dyn Component> = Box::new(Health(7));
        assert!((*boxed).as_any().downcast_ref::<Health>().is_some());
        assert!((*boxed).as_any().downcast_ref::<Armor>().is_none());
        let any = boxed.into_any();
        assert_eq!(any.downcast::<Health>().map(|h| h.0).ok(), Some(7));
    }
}
