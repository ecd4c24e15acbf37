//! # Voxie — ECS Runtime and Voxel Indicators
//!
//! A small entity-component-system runtime and, built on top of it, an
//! animated voxel "indicator": a 3D grid of cells that fades patterns in and
//! out to show what an agent is doing (idle, thinking, responding, ...).
//!
//! Start with `use voxie::prelude::*`, create a [`World`](ecs::World), attach a
//! [`VoxelIndicator`](voxel::VoxelIndicator) and a
//! [`Transform`](math::Transform) to an entity, register the
//! [`VoxelIndicatorRenderSystem`](render::VoxelIndicatorRenderSystem) and drive
//! everything with a [`Runner`](runner::Runner).

pub mod config;
pub mod ecs;
pub mod math;
pub mod prelude;
pub mod render;
pub mod runner;
pub mod time;
pub mod voxel;

#[cfg(feature = "diagnostics")]
pub mod diag;
