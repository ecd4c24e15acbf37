//! # Observer-Style Entity Component System
//!
//! A deliberately small ECS. Unlike archetype designs (hecs, bevy_ecs) this one
//! stores components directly on each entity and lets systems *subscribe* to a
//! set of required component types. The [`World`] keeps every system's
//! membership up to date as entities are created and components are added.
//!
//! ## Module Overview
//!
//! - [`entity`] — Entity ids, the id allocator and the per-entity component bag
//! - [`component`] — The [`Component`] trait and compile-time type tokens
//! - [`system`] — The [`System`] trait, membership bookkeeping and the schedule
//! - [`world`] — Central container (entities + systems + per-frame update)
//!
//! ## Entity Lifecycle
//!
//! ```text
//! unborn ──create_entity──► active ──destroy──► inactive ──update sweep──► removed
//! ```
//!
//! Destroying and removing are decoupled by up to one frame: a destroyed
//! entity keeps its id registered until the next [`World::update`].

pub mod component;
pub mod entity;
pub mod system;
pub mod world;

pub use component::{AsAny, Component, ComponentType};
pub use entity::{Entity, EntityId, IdAllocator};
pub use system::{Membership, System};
pub use world::{Entities, EntityWorldMut, World};
