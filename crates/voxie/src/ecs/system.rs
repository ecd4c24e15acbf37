//! # System — Logic Subscribed to a Component Set
//!
//! A system declares the component types it needs. The
//! [`World`](super::World) keeps a *membership set* per system: every entity
//! that is active and carries all required types. Once per frame the system's
//! [`update`](System::update) runs and can walk its members.
//!
//! ## Plug-in Contract
//!
//! Anything implementing these four calls can be registered:
//!
//! - `required_components()` — the filter
//! - `add_entity(id)` / `remove_entity(id)` — membership changes pushed by the world
//! - `update(entities, delta_secs)` — per-frame work
//!
//! [`Membership`] does the set bookkeeping so most systems only forward to it.
//!
//! ## Schedule
//!
//! Systems are kept in registration order and run sequentially. Registering a
//! second system under an existing name replaces the first one in place.

use std::collections::BTreeSet;

use super::component::{AsAny, ComponentType};
use super::entity::{Entity, EntityId};
use super::world::Entities;

/// Per-frame logic operating on entities that match a component filter.
pub trait System: AsAny {
    /// Component types an entity must carry to be a member.
    fn required_components(&self) -> &[ComponentType];

    /// Called by the world when `entity` starts matching.
    fn add_entity(&mut self, entity: EntityId);

    /// Called by the world when `entity` leaves (removed or swept).
    fn remove_entity(&mut self, entity: EntityId);

    /// Whether `entity` is currently a member.
    fn contains(&self, entity: EntityId) -> bool;

    /// Per-frame work. `delta_secs` is the time since the previous frame.
    fn update(&mut self, entities: &mut Entities, delta_secs: f32);

    /// Whether `entity` satisfies this system's filter.
    fn matches(&self, entity: &Entity) -> bool {
        entity.is_active()
            && self
                .required_components()
                .iter()
                .all(|&ty| entity.has_type(ty))
    }
}

/// Ordered set of member entities.
#[derive(Debug, Clone, Default)]
pub struct Membership {
    entities: BTreeSet<EntityId>,
}

impl Membership {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the entity was not already a member.
    pub fn insert(&mut self, entity: EntityId) -> bool {
        self.entities.insert(entity)
    }

    /// Returns `true` if the entity was a member.
    pub fn remove(&mut self, entity: EntityId) -> bool {
        self.entities.remove(&entity)
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.entities.contains(&entity)
    }

    /// Members in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.iter().copied()
    }

    /// Snapshot of the members, for loops that need `&mut self` in the body.
    pub fn to_vec(&self) -> Vec<EntityId> {
        self.entities.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// A system registered under a name.
pub(crate) struct NamedSystem {
    pub name: String,
    pub system: Box<dyn System>,
}

/// Per-system timing recorded during a single frame.
#[cfg(feature = "diagnostics")]
#[derive(Debug, Clone)]
pub struct SystemTiming {
    pub name: String,
    pub duration_us: f64,
}

/// The ordered list of registered systems.
#[derive(Default)]
pub(crate) struct Schedule {
    systems: Vec<NamedSystem>,
    /// Per-system timings from the most recent `run()` call.
    #[cfg(feature = "diagnostics")]
    pub timings: Vec<SystemTiming>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert at the end, or replace in place if the name is taken.
    ///
    /// Returns the replaced system, if any.
    pub fn insert(&mut self, name: String, system: Box<dyn System>) -> Option<Box<dyn System>> {
        if let Some(slot) = self.systems.iter_mut().find(|ns| ns.name == name) {
            return Some(std::mem::replace(&mut slot.system, system));
        }
        self.systems.push(NamedSystem { name, system });
        None
    }

    pub fn remove(&mut self, name: &str) -> Option<Box<dyn System>> {
        let pos = self.systems.iter().position(|ns| ns.name == name)?;
        Some(self.systems.remove(pos).system)
    }

    pub fn get(&self, name: &str) -> Option<&dyn System> {
        self.systems
            .iter()
            .find(|ns| ns.name == name)
            .map(|ns| ns.system.as_ref())
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut (dyn System + 'static)> {
        self.systems
            .iter_mut()
            .find(|ns| ns.name == name)
            .map(|ns| ns.system.as_mut())
    }

    pub fn names(&self) -> Vec<&str> {
        self.systems.iter().map(|ns| ns.name.as_str()).collect()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut NamedSystem> {
        self.systems.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    /// Add `entity` to every system that matches and does not have it yet.
    pub fn offer(&mut self, entity: &Entity) {
        for ns in &mut self.systems {
            if !ns.system.contains(entity.id()) && ns.system.matches(entity) {
                ns.system.add_entity(entity.id());
                log::debug!("entity {} joined system `{}`", entity.id(), ns.name);
            }
        }
    }

    /// Offer every entity that gained a component through
    /// [`Entities::add_component`] since the last call.
    fn offer_added(&mut self, entities: &mut Entities) {
        for id in entities.take_added() {
            if let Some(entity) = entities.get(id) {
                self.offer(entity);
            }
        }
    }

    /// Run all systems in registration order.
    ///
    /// Components added by a system are routed before the next one runs.
    pub fn run(&mut self, entities: &mut Entities, delta_secs: f32) {
        self.offer_added(entities);
        #[cfg(feature = "diagnostics")]
        self.timings.clear();
        for i in 0..self.systems.len() {
            #[cfg(feature = "diagnostics")]
            let start = std::time::Instant::now();
            self.systems[i].system.update(entities, delta_secs);
            #[cfg(feature = "diagnostics")]
            self.timings.push(SystemTiming {
                name: self.systems[i].name.clone(),
                duration_us: start.elapsed().as_secs_f64() * 1_000_000.0,
            });
            self.offer_added(entities);
        }
    }
}
