//! # Entity — Identity Plus a Bag of Components
//!
//! An [`Entity`] pairs an [`EntityId`] with the components attached to it,
//! keyed by component type. At most one component of each type is stored;
//! inserting a second one replaces the first.
//!
//! ## Ids
//!
//! Ids are plain strictly increasing integers handed out by an
//! [`IdAllocator`]. Each [`World`](super::World) owns its own allocator, so
//! two worlds (or two tests) never share a counter. Ids are never recycled:
//! a stale id simply fails to resolve.
//!
//! ```text
//! IdAllocator { next: 4 }   ← ids 1, 2, 3 already handed out
//! allocate() → EntityId(4), next = 5
//! ```
//!
//! ## Active Flag
//!
//! [`Entity::destroy`] detaches every component and clears `active`. The
//! entity stays registered until the world's next update sweep removes it.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::component::{Component, ComponentType, short_type_name};

/// A lightweight handle to an entity in a [`World`](super::World).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub(crate) u64);

impl EntityId {
    /// Returns the raw id.
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out strictly increasing entity ids.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    /// Allocator whose first id is `1`.
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Allocator whose first id is `first`.
    pub fn starting_at(first: u64) -> Self {
        Self { next: first }
    }

    /// Allocate the next id.
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        id
    }

    /// The id the next call to [`allocate`](Self::allocate) will return.
    pub fn peek(&self) -> EntityId {
        EntityId(self.next)
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// A stored component together with its type token.
struct Slot {
    ty: ComponentType,
    component: Box<dyn Component>,
}

/// An identity owning at most one component of each type.
pub struct Entity {
    id: EntityId,
    active: bool,
    components: HashMap<TypeId, Slot>,
}

impl Entity {
    /// A detached, active entity with no components.
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            active: true,
            components: HashMap::new(),
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    /// `false` once [`destroy`](Self::destroy) has been called.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Store a component, replacing any existing component of the same type.
    ///
    /// This does not notify any world. Outside the crate, components reach a
    /// registered entity through [`World::add_component`](super::World::add_component)
    /// or [`Entities::add_component`](super::Entities::add_component).
    pub(crate) fn insert<T: Component>(&mut self, component: T) -> &mut Self {
        let mut component: Box<dyn Component> = Box::new(component);
        component.on_attach(self.id);
        let slot = Slot {
            ty: ComponentType::of::<T>(),
            component,
        };
        if let Some(mut old) = self.components.insert(TypeId::of::<T>(), slot) {
            old.component.on_detach();
        }
        self
    }

    /// Shared reference to the component of type `T`, if present.
    pub fn get<T: Component>(&self) -> Option<&T> {
        self.components
            .get(&TypeId::of::<T>())
            .and_then(|slot| (*slot.component).as_any().downcast_ref::<T>())
    }

    /// Mutable reference to the component of type `T`, if present.
    pub fn get_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.components
            .get_mut(&TypeId::of::<T>())
            .and_then(|slot| (*slot.component).as_any_mut().downcast_mut::<T>())
    }

    pub fn has<T: Component>(&self) -> bool {
        self.components.contains_key(&TypeId::of::<T>())
    }

    /// Check for a component by type token.
    pub fn has_type(&self, ty: ComponentType) -> bool {
        self.components.contains_key(&ty.id())
    }

    /// Take the component of type `T` off this entity.
    pub fn remove<T: Component>(&mut self) -> Option<T> {
        let mut slot = self.components.remove(&TypeId::of::<T>())?;
        slot.component.on_detach();
        slot.component.into_any().downcast::<T>().ok().map(|b| *b)
    }

    /// Type tokens of all attached components (unordered).
    pub fn component_types(&self) -> impl Iterator<Item = ComponentType> + '_ {
        self.components.values().map(|slot| slot.ty)
    }

    /// Short names of all attached components, sorted for stable output.
    pub fn component_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self
            .components
            .values()
            .map(|slot| short_type_name(slot.ty.name()))
            .collect();
        names.sort_unstable();
        names
    }

    /// Number of attached components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Detach every component and mark the entity inactive.
    pub fn destroy(&mut self) {
        for (_, mut slot) in self.components.drain() {
            slot.component.on_detach();
        }
        self.active = false;
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("active", &self.active)
            .field("components", &self.component_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Position {
        x: f32,
        y: f32,
    }
    impl Component for Position {}

    /// Records its attach/detach history.
    #[derive(Default)]
    struct Tracked {
        owner: Option<EntityId>,
        detached: bool,
    }
    impl Component for Tracked {
        fn on_attach(&mut self, entity: EntityId) {
            self.owner = Some(entity);
        }
        fn on_detach(&mut self) {
            self.owner = None;
            self.detached = true;
        }
    }

    #[test]
    fn allocate_sequential() {
        let mut alloc = IdAllocator::new();
        assert_eq!(alloc.allocate(), EntityId(1));
        assert_eq!(alloc.allocate(), EntityId(2));
        assert_eq!(alloc.peek(), EntityId(3));
    }

    #[test]
    fn allocators_are_independent() {
        let mut a = IdAllocator::new();
        let mut b = IdAllocator::starting_at(100);
        a.allocate();
        a.allocate();
        assert_eq!(b.allocate(), EntityId(100));
        assert_eq!(a.allocate(), EntityId(3));
    }

    #[test]
    fn insert_get_has_remove() {
        let mut entity = Entity::new(EntityId(1));
        entity.insert(Position { x: 1.0, y: 2.0 });

        assert!(entity.has::<Position>());
        assert!(entity.has_type(ComponentType::of::<Position>()));
        assert_eq!(entity.get::<Position>(), Some(&Position { x: 1.0, y: 2.0 }));

        entity.get_mut::<Position>().unwrap().x = 5.0;
        assert_eq!(entity.remove::<Position>(), Some(Position { x: 5.0, y: 2.0 }));
        assert!(!entity.has::<Position>());
        assert_eq!(entity.remove::<Position>(), None);
    }

    #[test]
    fn insert_replaces_same_type() {
        let mut entity = Entity::new(EntityId(1));
        entity
            .insert(Position { x: 1.0, y: 1.0 })
            .insert(Position { x: 9.0, y: 9.0 });
        assert_eq!(entity.len(), 1);
        assert_eq!(entity.get::<Position>().unwrap().x, 9.0);
    }

    #[test]
    fn attach_hook_sees_owner() {
        let mut entity = Entity::new(EntityId(42));
        entity.insert(Tracked::default());
        assert_eq!(entity.get::<Tracked>().unwrap().owner, Some(EntityId(42)));

        let removed = entity.remove::<Tracked>().unwrap();
        assert!(removed.detached);
        assert_eq!(removed.owner, None);
    }

    #[test]
    fn destroy_clears_and_deactivates() {
        let mut entity = Entity::new(EntityId(1));
        entity.insert(Position { x: 0.0, y: 0.0 }).insert(Tracked::default());
        entity.destroy();
        assert!(!entity.is_active());
        assert!(entity.is_empty());
        assert!(entity.get::<Position>().is_none());
    }

    #[test]
    fn component_names_are_short_and_sorted() {
        let mut entity = Entity::new(EntityId(1));
        entity.insert(Tracked::default()).insert(Position { x: 0.0, y: 0.0 });
        assert_eq!(entity.component_names(), vec!["Position", "Tracked"]);
    }
}
