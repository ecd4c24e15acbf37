//! Convenience re-exports — `use voxie::prelude::*` for the common items.

pub use crate::config::{ConfigError, IndicatorConfig};
pub use crate::ecs::{
    Component, ComponentType, Entities, Entity, EntityId, IdAllocator, Membership, System, World,
};
pub use crate::math::{Mat4, Quat, Transform, UVec3, Vec3, Vec4};
pub use crate::render::{VoxelIndicatorRenderSystem, VoxelInstance};
pub use crate::runner::{FrameScheduler, IntervalScheduler, ManualScheduler, Runner, StopHandle};
pub use crate::time::{Clock, ManualClock, SystemClock, Time};
pub use crate::voxel::{
    AnimationKind, AppearOptions, AppearStyle, DisappearOptions, GridSize, IndicatorState,
    Pattern, Transition, Voxel, VoxelIndicator,
};
#[cfg(feature = "diagnostics")]
pub use crate::diag::{DiagSender, init_logger};
