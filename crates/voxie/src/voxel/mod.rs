//! # Voxel Indicators
//!
//! A voxel indicator is a small 3D grid of cells (8×8×1 by default) that
//! shows what an agent is doing by fading simple patterns in and out.
//!
//! ```text
//!   VoxelIndicator (Component)
//!   ├── VoxelGrid        flat Vec<Voxel>, index = z·w·h + y·w + x
//!   ├── VoxelAnimator    rate-limited appear / disappear / pulse
//!   ├── IndicatorState   idle, thinking, responding, error, ...
//!   ├── Transition       Settled | Settling { target, token, due_ms }
//!   └── Arc<dyn Clock>   millisecond time source
//! ```
//!
//! ## Modules
//!
//! - [`grid`]: dimensions, per-voxel data, index/coordinate math
//! - [`animation`]: scheduling and advancing voxel animations, easing
//! - [`pattern`]: named shapes (smiley, thinking dots, check mark, ...)
//! - [`state`]: indicator states and the settle transition
//! - [`indicator`]: the component tying it all together
//!
//! ## Comparison
//!
//! | | Voxie | Typical sprite animation |
//! |---|---|---|
//! | Unit | one grid cell | whole sprite |
//! | Timing | absolute clock, per-cell delay | accumulated frame deltas |
//! | State change | fade out, settle, redraw | swap clip |

pub mod animation;
pub mod grid;
pub mod indicator;
pub mod pattern;
pub mod state;

pub use animation::{
    APPEAR_DURATION_MS, AppearOptions, DISAPPEAR_DURATION_MS, DisappearOptions, EaseFunction,
    VoxelAnimator,
};
pub use grid::{AnimationKind, AppearStyle, GridSize, Voxel, VoxelGrid};
pub use indicator::VoxelIndicator;
pub use pattern::Pattern;
pub use state::{IndicatorState, SETTLE_DELAY_MS, Transition};
