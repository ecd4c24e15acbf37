//! # World — The Central Container
//!
//! The [`World`] owns every entity and every system. It is the single source
//! of truth for the simulation and the only place membership is decided.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │ World                                                │
//! │                                                      │
//! │  allocator: IdAllocator   strictly increasing ids    │
//! │                                                      │
//! │  entities: Entities                                  │
//! │    BTreeMap<EntityId, Entity>  (ascending id order)  │
//! │                                                      │
//! │  schedule: Schedule                                  │
//! │    [(name, Box<dyn System>)]  (registration order)   │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! ## Membership Routing
//!
//! - `create_entity` offers the new entity to every system.
//! - `add_component` re-checks every system for that entity. A system that
//!   now matches gains it; nothing is dropped on addition.
//! - [`Entities::add_component`] (the path systems use mid-frame) queues the
//!   id. The schedule offers queued ids to every system after the system that
//!   queued them returns, so later systems in the same frame already see them.
//! - `remove_entity` and the update sweep drop the entity everywhere.
//! - `remove_component` does **not** re-check. Call
//!   [`World::refresh_membership`] if a system must lose the entity.
//!
//! ## Frame
//!
//! [`World::update`] first sweeps entities whose `active` flag was cleared,
//! then runs systems in registration order. Systems receive only
//! [`Entities`], which is a separate field from the schedule, so they can
//! mutate components while the world iterates systems.

use std::collections::BTreeMap;

use super::component::{Component, ComponentType};
use super::entity::{Entity, EntityId, IdAllocator};
use super::system::{Schedule, System};

/// The entity registry, ordered by id.
///
/// This is what systems see during [`System::update`].
#[derive(Default)]
pub struct Entities {
    map: BTreeMap<EntityId, Entity>,
    /// Entities that gained a component since the schedule last looked.
    added: Vec<EntityId>,
}

impl Entities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.map.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.map.get_mut(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.map.contains_key(&id)
    }

    /// Shorthand for `get(id)?.get::<T>()`.
    pub fn component<T: Component>(&self, id: EntityId) -> Option<&T> {
        self.map.get(&id)?.get::<T>()
    }

    /// Shorthand for `get_mut(id)?.get_mut::<T>()`.
    pub fn component_mut<T: Component>(&mut self, id: EntityId) -> Option<&mut T> {
        self.map.get_mut(&id)?.get_mut::<T>()
    }

    /// Add (or replace) a component from inside a system.
    ///
    /// The entity joins matching systems as soon as the running system
    /// returns. Returns `false` if the id is unknown or the entity was
    /// destroyed.
    pub fn add_component<T: Component>(&mut self, id: EntityId, component: T) -> bool {
        match self.map.get_mut(&id) {
            Some(entity) if entity.is_active() => {
                entity.insert(component);
                if !self.added.contains(&id) {
                    self.added.push(id);
                }
                true
            }
            _ => false,
        }
    }

    /// Drain the ids queued by [`add_component`](Self::add_component).
    pub(crate) fn take_added(&mut self) -> Vec<EntityId> {
        std::mem::take(&mut self.added)
    }

    /// Mark an entity for removal at the next sweep.
    ///
    /// Components are detached immediately. Returns `false` if the id is
    /// unknown or the entity was already destroyed.
    pub fn destroy(&mut self, id: EntityId) -> bool {
        match self.map.get_mut(&id) {
            Some(entity) if entity.is_active() => {
                entity.destroy();
                log::debug!("entity {id} destroyed, removal deferred to next sweep");
                true
            }
            _ => false,
        }
    }

    /// Number of registered entities, including destroyed ones awaiting the sweep.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Registered entities in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.map.values()
    }

    pub fn ids(&self) -> Vec<EntityId> {
        self.map.keys().copied().collect()
    }

    fn insert(&mut self, entity: Entity) {
        self.map.insert(entity.id(), entity);
    }

    fn remove(&mut self, id: EntityId) -> Option<Entity> {
        self.map.remove(&id)
    }

    /// Remove every inactive entity, returning their ids.
    fn sweep(&mut self) -> Vec<EntityId> {
        let dead: Vec<EntityId> = self
            .map
            .values()
            .filter(|e| !e.is_active())
            .map(Entity::id)
            .collect();
        for id in &dead {
            self.map.remove(id);
        }
        dead
    }
}

/// Owns all entities and systems and runs the per-frame update.
pub struct World {
    allocator: IdAllocator,
    entities: Entities,
    schedule: Schedule,
}

impl World {
    pub fn new() -> Self {
        Self::with_allocator(IdAllocator::new())
    }

    /// A world drawing ids from the given allocator.
    pub fn with_allocator(allocator: IdAllocator) -> Self {
        Self {
            allocator,
            entities: Entities::new(),
            schedule: Schedule::new(),
        }
    }

    // ── Entities ─────────────────────────────────────────────────────

    /// Create an empty entity and offer it to every system.
    pub fn create_entity(&mut self) -> EntityId {
        let id = self.allocator.allocate();
        let entity = Entity::new(id);
        self.schedule.offer(&entity);
        self.entities.insert(entity);
        log::debug!("entity {id} created");
        id
    }

    /// Create an entity and return a handle for adding components.
    pub fn spawn(&mut self) -> EntityWorldMut<'_> {
        let id = self.create_entity();
        EntityWorldMut { world: self, id }
    }

    /// Handle to an existing entity, or `None` if the id is unknown.
    pub fn entity_mut(&mut self, id: EntityId) -> Option<EntityWorldMut<'_>> {
        if self.entities.contains(id) {
            Some(EntityWorldMut { world: self, id })
        } else {
            None
        }
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn entities(&self) -> &Entities {
        &self.entities
    }

    /// Mutable access to the registry. Components added through
    /// [`Entities::add_component`] are routed at the start of the next update.
    pub fn entities_mut(&mut self) -> &mut Entities {
        &mut self.entities
    }

    /// Number of registered entities, including destroyed ones awaiting the sweep.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// `true` if the entity is registered and not destroyed.
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.entities.get(id).is_some_and(Entity::is_active)
    }

    /// Add (or replace) a component and let systems pick the entity up.
    ///
    /// Returns `false` if the id is unknown or the entity was destroyed and
    /// is waiting for the sweep.
    pub fn add_component<T: Component>(&mut self, id: EntityId, component: T) -> bool {
        let Some(entity) = self.entities.get_mut(id).filter(|e| e.is_active()) else {
            return false;
        };
        entity.insert(component);
        self.schedule.offer(entity);
        true
    }

    /// Remove a component. Membership is not re-evaluated.
    ///
    /// Returns `false` if the id is unknown or the component was absent.
    pub fn remove_component<T: Component>(&mut self, id: EntityId) -> bool {
        self.entities
            .get_mut(id)
            .and_then(Entity::remove::<T>)
            .is_some()
    }

    pub fn get<T: Component>(&self, id: EntityId) -> Option<&T> {
        self.entities.component::<T>(id)
    }

    pub fn get_mut<T: Component>(&mut self, id: EntityId) -> Option<&mut T> {
        self.entities.component_mut::<T>(id)
    }

    /// Re-evaluate every system's membership for `id` in both directions.
    pub fn refresh_membership(&mut self, id: EntityId) {
        let entity = self.entities.get(id);
        for ns in self.schedule.iter_mut() {
            let wanted = entity.is_some_and(|e| ns.system.matches(e));
            let present = ns.system.contains(id);
            if wanted && !present {
                ns.system.add_entity(id);
                log::debug!("entity {id} joined system `{}`", ns.name);
            } else if !wanted && present {
                ns.system.remove_entity(id);
                log::debug!("entity {id} left system `{}`", ns.name);
            }
        }
    }

    /// Mark an entity for removal at the next update sweep.
    pub fn destroy_entity(&mut self, id: EntityId) -> bool {
        self.entities.destroy(id)
    }

    /// Remove an entity immediately: systems drop it, its components are
    /// detached, and it leaves the registry.
    ///
    /// Returns `false` if the id is unknown.
    pub fn remove_entity(&mut self, id: EntityId) -> bool {
        let Some(mut entity) = self.entities.remove(id) else {
            return false;
        };
        drop_everywhere(&mut self.schedule, id);
        entity.destroy();
        log::debug!("entity {id} removed");
        true
    }

    /// Ids of active entities that carry every type in `types`.
    pub fn entities_with(&self, types: &[ComponentType]) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|e| e.is_active() && types.iter().all(|&ty| e.has_type(ty)))
            .map(Entity::id)
            .collect()
    }

    // ── Systems ──────────────────────────────────────────────────────

    /// Register a system under `name` and back-fill it with every matching
    /// entity. An existing system with the same name is replaced in place.
    pub fn add_system<S: System>(&mut self, name: impl Into<String>, mut system: S) {
        let name = name.into();
        for entity in self.entities.iter() {
            if !system.contains(entity.id()) && system.matches(entity) {
                system.add_entity(entity.id());
            }
        }
        if self.schedule.insert(name.clone(), Box::new(system)).is_some() {
            log::debug!("system `{name}` replaced");
        } else {
            log::debug!("system `{name}` registered");
        }
    }

    /// Unregister a system. Returns `false` if no system had that name.
    pub fn remove_system(&mut self, name: &str) -> bool {
        self.schedule.remove(name).is_some()
    }

    pub fn has_system(&self, name: &str) -> bool {
        self.schedule.get(name).is_some()
    }

    /// Typed access to a registered system.
    ///
    /// Returns `None` if the name is unknown or the system is not an `S`.
    pub fn system<S: System>(&self, name: &str) -> Option<&S> {
        self.schedule.get(name)?.as_any().downcast_ref::<S>()
    }

    pub fn system_mut<S: System>(&mut self, name: &str) -> Option<&mut S> {
        self.schedule.get_mut(name)?.as_any_mut().downcast_mut::<S>()
    }

    /// System names in run order.
    pub fn system_names(&self) -> Vec<&str> {
        self.schedule.names()
    }

    pub fn system_count(&self) -> usize {
        self.schedule.len()
    }

    /// Per-system timings from the most recent update.
    #[cfg(feature = "diagnostics")]
    pub fn system_timings(&self) -> &[super::system::SystemTiming] {
        &self.schedule.timings
    }

    // ── Frame ────────────────────────────────────────────────────────

    /// Advance one frame: sweep destroyed entities, then run every system in
    /// registration order.
    pub fn update(&mut self, delta_secs: f32) {
        for id in self.entities.sweep() {
            drop_everywhere(&mut self.schedule, id);
            log::trace!("entity {id} swept");
        }
        self.schedule.run(&mut self.entities, delta_secs);
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

fn drop_everywhere(schedule: &mut Schedule, id: EntityId) {
    for ns in schedule.iter_mut() {
        if ns.system.contains(id) {
            ns.system.remove_entity(id);
        }
    }
}

/// A mutable handle to one entity that routes component additions through
/// the [`World`], so systems see them.
pub struct EntityWorldMut<'w> {
    world: &'w mut World,
    id: EntityId,
}

impl<'w> EntityWorldMut<'w> {
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Add (or replace) a component. Chains.
    pub fn insert<T: Component>(&mut self, component: T) -> &mut Self {
        self.world.add_component(self.id, component);
        self
    }

    pub fn get<T: Component>(&self) -> Option<&T> {
        self.world.get::<T>(self.id)
    }

    pub fn get_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.world.get_mut::<T>(self.id)
    }

    pub fn has<T: Component>(&self) -> bool {
        self.world.entity(self.id).is_some_and(Entity::has::<T>)
    }

    /// Remove a component without re-evaluating membership.
    pub fn remove<T: Component>(&mut self) -> bool {
        self.world.remove_component::<T>(self.id)
    }

    /// Mark the entity for removal at the next sweep.
    pub fn destroy(self) -> bool {
        self.world.destroy_entity(self.id)
    }
}
