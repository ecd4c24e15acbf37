//! Named voxel patterns.
//!
//! Each pattern is a fixed set of points on the middle Z slice of an 8×8 face,
//! a color, and how the points animate in. Points outside a smaller grid are
//! dropped. [`Pattern::Idle`] instead fills the whole grid dimly and sweeps in
//! as a diagonal wave.
//!
//! ```text
//!  smiley        thinking      notification  error         success
//!  y=7 ........  ........      ...#....      ........      ........
//!      ........  ........      ...#....      .#....#.      .......#
//!      ..#..#..  ........      ...#....      ..#..#..      ......#.
//!      ........  ..#.#.#.      ...#....      ...##...      .#...#..
//!      ........  ........      ...#....      ...##...      ..#.#...
//!      ..#..#..  ........      ........      ..#..#..      ...#....
//!      ...##...  ........      ...#....      .#....#.      ........
//!  y=0 ........  ........      ........      ........      ........
//! ```

use serde::{Deserialize, Serialize};

use super::animation::{AppearOptions, animate_appear, animate_appear_wave};
use super::grid::{AppearStyle, VoxelGrid};

/// Brightness of the idle fill.
pub const IDLE_BRIGHTNESS: f32 = 0.35;

const SMILEY: &[(i32, i32)] = &[(2, 5), (5, 5), (2, 2), (3, 1), (4, 1), (5, 2)];
const THINKING: &[(i32, i32)] = &[(2, 4), (4, 4), (6, 4)];
const NOTIFICATION: &[(i32, i32)] = &[(3, 7), (3, 6), (3, 5), (3, 4), (3, 3), (3, 1)];
const ERROR: &[(i32, i32)] = &[
    (1, 1),
    (2, 2),
    (3, 3),
    (4, 4),
    (5, 5),
    (6, 6),
    (1, 6),
    (2, 5),
    (3, 4),
    (4, 3),
    (5, 2),
    (6, 1),
];
const SUCCESS: &[(i32, i32)] = &[(1, 4), (2, 3), (3, 2), (4, 3), (5, 4), (6, 5), (7, 6)];

/// The shapes an indicator can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pattern {
    Smiley,
    Thinking,
    Notification,
    Error,
    Success,
    #[default]
    Idle,
}

impl Pattern {
    pub const ALL: [Pattern; 6] = [
        Pattern::Smiley,
        Pattern::Thinking,
        Pattern::Notification,
        Pattern::Error,
        Pattern::Success,
        Pattern::Idle,
    ];

    /// Parse a pattern name. Unknown names fall back to [`Pattern::Idle`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "smiley" => Self::Smiley,
            "thinking" => Self::Thinking,
            "notification" => Self::Notification,
            "error" => Self::Error,
            "success" => Self::Success,
            _ => Self::Idle,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Smiley => "smiley",
            Self::Thinking => "thinking",
            Self::Notification => "notification",
            Self::Error => "error",
            Self::Success => "success",
            Self::Idle => "idle",
        }
    }

    pub fn color(self) -> [i32; 3] {
        match self {
            Self::Smiley => [255, 210, 0],
            Self::Thinking => [80, 160, 255],
            Self::Notification => [255, 170, 0],
            Self::Error => [255, 40, 40],
            Self::Success => [40, 220, 90],
            Self::Idle => [60, 130, 255],
        }
    }

    /// Face points on an 8×8 grid. Empty for [`Pattern::Idle`], which fills
    /// the whole grid.
    pub fn points(self) -> &'static [(i32, i32)] {
        match self {
            Self::Smiley => SMILEY,
            Self::Thinking => THINKING,
            Self::Notification => NOTIFICATION,
            Self::Error => ERROR,
            Self::Success => SUCCESS,
            Self::Idle => &[],
        }
    }

    /// How the points animate in. `None` for the wave-animated idle fill.
    pub fn appear_options(self) -> Option<AppearOptions> {
        let (sequence_delay_ms, style) = match self {
            Self::Smiley => (100.0, AppearStyle::Bounce),
            Self::Thinking => (150.0, AppearStyle::Fade),
            Self::Notification => (80.0, AppearStyle::Bounce),
            Self::Error => (40.0, AppearStyle::Scale),
            Self::Success => (60.0, AppearStyle::Bounce),
            Self::Idle => return None,
        };
        Some(AppearOptions {
            base_delay_ms: 0.0,
            sequence_delay_ms,
            style,
        })
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Clear `grid`, draw `pattern` on it and schedule its appear animation.
/// Returns the indices that will appear, in animation order.
pub fn draw_pattern(grid: &mut VoxelGrid, pattern: Pattern, now_ms: f64) -> Vec<usize> {
    grid.clear();
    let color = pattern.color();

    let Some(options) = pattern.appear_options() else {
        let indices: Vec<usize> = (0..grid.len()).collect();
        for &index in &indices {
            if let Some(c) = grid.coords(index) {
                grid.set(c.x as i32, c.y as i32, c.z as i32, color, IDLE_BRIGHTNESS);
            }
        }
        animate_appear_wave(grid, &indices, now_ms);
        return indices;
    };

    let z = (grid.size().depth / 2) as i32;
    let indices: Vec<usize> = pattern
        .points()
        .iter()
        .filter_map(|&(x, y)| grid.set(x, y, z, color, 1.0))
        .collect();
    animate_appear(grid, &indices, options, now_ms);
    indices
}
