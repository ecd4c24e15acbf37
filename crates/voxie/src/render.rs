//! # Voxel Indicator Rendering
//!
//! [`VoxelIndicatorRenderSystem`] is the bridge between indicators and
//! whatever draws them. Every frame it ticks each indicator and, when
//! something changed, rebuilds that entity's *batch*: a flat list of
//! [`VoxelInstance`]s in world space, ready to upload as an instance buffer.
//!
//! ```text
//!   VoxelIndicator ──update(dt)──► changed? ──yes──► rebuild batch
//!        + Transform                  │                   │
//!                                     no                  ▼
//!                                     └──► keep batch   Vec<VoxelInstance>
//!                                                       (#[repr(C)], Pod)
//! ```
//!
//! The system holds no GPU handles. A renderer reads [`batch`] or
//! [`batch_bytes`] and owns its own buffers. When an entity leaves the system
//! its batch is dropped.
//!
//! [`batch`]: VoxelIndicatorRenderSystem::batch
//! [`batch_bytes`]: VoxelIndicatorRenderSystem::batch_bytes

use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};

use crate::ecs::{ComponentType, Entities, EntityId, Membership, System};
use crate::math::{Transform, Vec3};
use crate::voxel::{Voxel, VoxelIndicator};

// ── Instance ────────────────────────────────────────────────────────────

/// One drawable voxel, laid out for a GPU instance buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct VoxelInstance {
    /// World-space center.
    pub position: [f32; 3],
    /// World-space edge length.
    pub scale: f32,
    /// Linear RGB in \[0, 1\], alpha is the effective brightness.
    pub color: [f32; 4],
}

impl VoxelInstance {
    fn from_voxel(voxel: &Voxel, position: Vec3, edge: f32) -> Self {
        let [r, g, b] = voxel.color.map(|c| f32::from(c) / 255.0);
        Self {
            position: position.to_array(),
            scale: edge * voxel.effective_scale(),
            color: [r, g, b, voxel.effective_brightness()],
        }
    }
}

/// Build the world-space instances of every drawable voxel of `indicator`.
pub fn build_instances(indicator: &VoxelIndicator, transform: &Transform) -> Vec<VoxelInstance> {
    let grid = indicator.grid();
    // Non-uniform scales use the largest axis.
    let edge = indicator.voxel_size() * transform.scale.max_element();
    grid.voxels()
        .iter()
        .enumerate()
        .filter(|(_, voxel)| voxel.is_drawable())
        .filter_map(|(index, voxel)| {
            let coords = grid.coords(index)?;
            let local = grid.local_position(coords, indicator.spacing());
            Some(VoxelInstance::from_voxel(voxel, transform.transform_point(local), edge))
        })
        .collect()
}

// ── System ──────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct Batch {
    instances: Vec<VoxelInstance>,
    transform: Option<Transform>,
    rebuilds: u64,
}

/// System: ticks every [`VoxelIndicator`] and keeps its instance batch current.
///
/// Requires [`VoxelIndicator`] and [`Transform`].
pub struct VoxelIndicatorRenderSystem {
    required: [ComponentType; 2],
    members: Membership,
    batches: HashMap<EntityId, Batch>,
}

impl VoxelIndicatorRenderSystem {
    pub fn new() -> Self {
        Self {
            required: [
                ComponentType::of::<VoxelIndicator>(),
                ComponentType::of::<Transform>(),
            ],
            members: Membership::new(),
            batches: HashMap::new(),
        }
    }

    /// Current instances for `entity`, or `None` if it isn't a member or
    /// hasn't been drawn yet.
    pub fn batch(&self, entity: EntityId) -> Option<&[VoxelInstance]> {
        self.batches.get(&entity).map(|b| b.instances.as_slice())
    }

    /// The batch as raw bytes for a buffer upload.
    pub fn batch_bytes(&self, entity: EntityId) -> Option<&[u8]> {
        self.batch(entity).map(bytemuck::cast_slice)
    }

    /// How many times `entity`'s batch has been rebuilt.
    pub fn rebuild_count(&self, entity: EntityId) -> u64 {
        self.batches.get(&entity).map_or(0, |b| b.rebuilds)
    }

    /// Number of live batches.
    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }

    /// Total instances across all batches.
    pub fn instance_count(&self) -> usize {
        self.batches.values().map(|b| b.instances.len()).sum()
    }
}

impl Default for VoxelIndicatorRenderSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for VoxelIndicatorRenderSystem {
    fn required_components(&self) -> &[ComponentType] {
        &self.required
    }

    fn add_entity(&mut self, entity: EntityId) {
        if self.members.insert(entity) {
            self.batches.insert(entity, Batch::default());
        }
    }

    fn remove_entity(&mut self, entity: EntityId) {
        self.members.remove(entity);
        if let Some(batch) = self.batches.remove(&entity) {
            log::debug!(
                "voxel render: disposed batch of {entity} ({} instances)",
                batch.instances.len()
            );
        }
    }

    fn contains(&self, entity: EntityId) -> bool {
        self.members.contains(entity)
    }

    fn update(&mut self, entities: &mut Entities, delta_secs: f32) {
        for id in self.members.iter() {
            let Some(entity) = entities.get_mut(id) else {
                continue;
            };
            let Some(transform) = entity.get::<Transform>().copied() else {
                continue;
            };
            let Some(indicator) = entity.get_mut::<VoxelIndicator>() else {
                continue;
            };

            let changed = indicator.update(delta_secs);
            let batch = self.batches.entry(id).or_default();
            if changed || batch.transform != Some(transform) {
                batch.instances = build_instances(indicator, &transform);
                batch.transform = Some(transform);
                batch.rebuilds += 1;
                log::trace!("voxel render: {id} -> {} instances", batch.instances.len());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::World;
    use crate::time::ManualClock;
    use crate::voxel::{GridSize, IndicatorState, Pattern};

    const SYSTEM: &str = "voxel_render";

    fn setup() -> (World, ManualClock, EntityId) {
        let clock = ManualClock::new();
        let mut world = World::new();
        world.add_system(SYSTEM, VoxelIndicatorRenderSystem::new());
        let id = world
            .spawn()
            .insert(VoxelIndicator::with_clock(GridSize::new(8, 8, 1), clock.shared()))
            .insert(Transform::from_xyz(10.0, 0.0, 0.0))
            .id();
        (world, clock, id)
    }

    fn render(world: &World) -> &VoxelIndicatorRenderSystem {
        world.system::<VoxelIndicatorRenderSystem>(SYSTEM).unwrap()
    }

    fn frame(world: &mut World, clock: &ManualClock) {
        clock.advance(20.0);
        world.update(0.02);
    }

    #[test]
    fn instance_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<VoxelInstance>(), 32);
        let instance = VoxelInstance::zeroed();
        assert_eq!(bytemuck::bytes_of(&instance).len(), 32);
    }

    #[test]
    fn requires_indicator_and_transform() {
        let clock = ManualClock::new();
        let mut world = World::new();
        world.add_system(SYSTEM, VoxelIndicatorRenderSystem::new());
        let bare = world
            .spawn()
            .insert(VoxelIndicator::with_clock(GridSize::default(), clock.shared()))
            .id();
        assert!(!render(&world).contains(bare));

        world.add_component(bare, Transform::IDENTITY);
        assert!(render(&world).contains(bare));
    }

    #[test]
    fn empty_indicator_builds_empty_batch() {
        let (mut world, clock, id) = setup();
        frame(&mut world, &clock);
        assert_eq!(render(&world).batch(id), Some(&[][..]));
        assert_eq!(render(&world).rebuild_count(id), 1);

        // Nothing animating and the transform is unchanged.
        frame(&mut world, &clock);
        assert_eq!(render(&world).rebuild_count(id), 1);
    }

    #[test]
    fn batch_follows_pattern_and_transform() {
        let (mut world, clock, id) = setup();
        world.get_mut::<VoxelIndicator>(id).unwrap().create_pattern(Pattern::Thinking);
        for _ in 0..30 {
            frame(&mut world, &clock);
        }

        let batch = render(&world).batch(id).unwrap();
        assert_eq!(batch.len(), 3);
        for instance in batch {
            assert!(instance.position[0] > 9.0 && instance.position[0] < 11.0);
            assert_eq!(instance.color[2], 1.0);
        }
        assert_eq!(render(&world).batch_bytes(id).unwrap().len(), 3 * 32);

        world.get_mut::<Transform>(id).unwrap().translation.x = -10.0;
        frame(&mut world, &clock);
        let batch = render(&world).batch(id).unwrap();
        assert!(batch.iter().all(|i| i.position[0] < -9.0));
    }

    #[test]
    fn state_change_reaches_the_batch() {
        let (mut world, clock, id) = setup();
        world.get_mut::<VoxelIndicator>(id).unwrap().set_state(IndicatorState::Error);
        for _ in 0..60 {
            frame(&mut world, &clock);
        }
        assert_eq!(
            world.get::<VoxelIndicator>(id).unwrap().state(),
            IndicatorState::Error
        );
        assert_eq!(render(&world).batch(id).unwrap().len(), 12);
    }

    #[test]
    fn removing_entity_disposes_batch() {
        let (mut world, clock, id) = setup();
        frame(&mut world, &clock);
        assert_eq!(render(&world).batch_count(), 1);

        world.remove_entity(id);
        assert_eq!(render(&world).batch_count(), 0);
        assert!(render(&world).batch(id).is_none());
    }

    #[test]
    fn destroyed_entity_is_disposed_on_sweep() {
        let (mut world, clock, id) = setup();
        frame(&mut world, &clock);
        world.destroy_entity(id);
        frame(&mut world, &clock);
        assert_eq!(render(&world).batch_count(), 0);
        assert_eq!(render(&world).instance_count(), 0);
    }
}
