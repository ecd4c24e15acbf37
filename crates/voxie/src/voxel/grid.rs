//! The voxel grid: dimensions, per-voxel state and index math.
//!
//! Voxels are stored in one flat `Vec`, row-major with X fastest:
//!
//! ```text
//! index = z * (width * height) + y * width + x
//!
//!   y
//!   ▲   ┌────┬────┬────┐
//!   │   │ 6  │ 7  │ 8  │   3×3×1 grid, z = 0
//!   │   ├────┼────┼────┤
//!   │   │ 3  │ 4  │ 5  │
//!   │   ├────┼────┼────┤
//!   │   │ 0  │ 1  │ 2  │
//!   │   └────┴────┴────┘
//!   └──────────────────► x
//! ```
//!
//! Coordinates are signed at the API boundary so callers can pass anything;
//! out-of-range coordinates resolve to `None` and writes to them are ignored.

use serde::{Deserialize, Serialize};

use crate::math::{UVec3, Vec3};

/// Which animation a voxel is currently running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationKind {
    #[default]
    None,
    Appear,
    Disappear,
    Pulse,
}

/// How an appearing voxel grows in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppearStyle {
    /// Overshoots its size slightly, then settles.
    #[default]
    Bounce,
    /// Full size, brightness ramps up.
    Fade,
    /// Grows smoothly from nothing.
    Scale,
}

impl AppearStyle {
    /// Parse a style name. Unknown names fall back to [`AppearStyle::Bounce`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "fade" => Self::Fade,
            "scale" => Self::Scale,
            _ => Self::Bounce,
        }
    }
}

/// Grid dimensions in voxels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSize {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
}

impl GridSize {
    pub const fn new(width: u32, height: u32, depth: u32) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    /// Total number of voxels.
    pub fn voxel_count(&self) -> usize {
        self.width as usize * self.height as usize * self.depth as usize
    }

    /// Whether the signed coordinate lies inside the grid.
    pub fn contains(&self, x: i32, y: i32, z: i32) -> bool {
        x >= 0
            && y >= 0
            && z >= 0
            && (x as u32) < self.width
            && (y as u32) < self.height
            && (z as u32) < self.depth
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Self::new(8, 8, 1)
    }
}

/// State of one grid cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Voxel {
    pub color: [u8; 3],
    /// 0.0 – 1.0
    pub brightness: f32,
    /// Whether the voxel is currently shown.
    pub visible: bool,
    /// Whether the voxel should end up shown.
    pub target_visible: bool,
    /// Pulse phase in radians, wraps at 2π.
    pub phase: f32,
    pub appear_progress: f32,
    pub disappear_progress: f32,
    pub appear_delay_ms: f64,
    pub disappear_delay_ms: f64,
    /// Clock time at which the current appear/disappear starts moving.
    pub start_ms: f64,
    pub is_animating: bool,
    pub animation: AnimationKind,
    pub style: AppearStyle,
}

impl Voxel {
    /// Hidden, black, not animating.
    pub const CLEARED: Self = Self {
        color: [0, 0, 0],
        brightness: 0.0,
        visible: false,
        target_visible: false,
        phase: 0.0,
        appear_progress: 0.0,
        disappear_progress: 0.0,
        appear_delay_ms: 0.0,
        disappear_delay_ms: 0.0,
        start_ms: 0.0,
        is_animating: false,
        animation: AnimationKind::None,
        style: AppearStyle::Bounce,
    };

    /// Whether a renderer should draw this voxel this frame.
    pub fn is_drawable(&self) -> bool {
        match self.animation {
            AnimationKind::Appear => self.appear_progress > 0.0,
            AnimationKind::Disappear => true,
            AnimationKind::Pulse | AnimationKind::None => self.visible,
        }
    }
}

impl Default for Voxel {
    fn default() -> Self {
        Self::CLEARED
    }
}

/// A fixed-size 3D grid of voxels.
#[derive(Debug, Clone)]
pub struct VoxelGrid {
    size: GridSize,
    voxels: Vec<Voxel>,
}

impl VoxelGrid {
    /// A grid of `size` with every voxel cleared.
    pub fn new(size: GridSize) -> Self {
        Self {
            size,
            voxels: vec![Voxel::CLEARED; size.voxel_count()],
        }
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    pub fn len(&self) -> usize {
        self.voxels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }

    /// All voxels in index order.
    pub fn voxels(&self) -> &[Voxel] {
        &self.voxels
    }

    pub(crate) fn voxels_mut(&mut self) -> &mut [Voxel] {
        &mut self.voxels
    }

    pub fn voxel(&self, index: usize) -> Option<&Voxel> {
        self.voxels.get(index)
    }

    pub(crate) fn voxel_mut(&mut self, index: usize) -> Option<&mut Voxel> {
        self.voxels.get_mut(index)
    }

    /// Reset every voxel to the hidden, non-animating state.
    pub fn clear(&mut self) {
        self.voxels.fill(Voxel::CLEARED);
    }

    /// Flat index of `(x, y, z)`, or `None` if out of bounds.
    pub fn index(&self, x: i32, y: i32, z: i32) -> Option<usize> {
        if !self.size.contains(x, y, z) {
            return None;
        }
        let (w, h) = (self.size.width as usize, self.size.height as usize);
        Some(z as usize * w * h + y as usize * w + x as usize)
    }

    /// Coordinates of a flat index, or `None` if out of bounds.
    pub fn coords(&self, index: usize) -> Option<UVec3> {
        if index >= self.voxels.len() {
            return None;
        }
        let (w, h) = (self.size.width as usize, self.size.height as usize);
        let z = index / (w * h);
        let rem = index % (w * h);
        Some(UVec3::new((rem % w) as u32, (rem / w) as u32, z as u32))
    }

    pub fn get(&self, x: i32, y: i32, z: i32) -> Option<&Voxel> {
        self.index(x, y, z).map(|i| &self.voxels[i])
    }

    /// Color and light a voxel and mark it as wanted.
    ///
    /// Channels clamp to 0–255 and brightness to 0–1. Out-of-range
    /// coordinates are ignored. Returns the index written, if any.
    pub fn set(&mut self, x: i32, y: i32, z: i32, rgb: [i32; 3], brightness: f32) -> Option<usize> {
        let index = self.index(x, y, z)?;
        let voxel = &mut self.voxels[index];
        voxel.color = rgb.map(|c| c.clamp(0, 255) as u8);
        voxel.brightness = if brightness.is_nan() {
            0.0
        } else {
            brightness.clamp(0.0, 1.0)
        };
        voxel.target_visible = true;
        Some(index)
    }

    /// Number of voxels currently shown.
    pub fn visible_count(&self) -> usize {
        self.voxels.iter().filter(|v| v.visible).count()
    }

    /// Local-space center of a voxel, with the whole grid centered on the origin.
    pub fn local_position(&self, coords: UVec3, spacing: f32) -> Vec3 {
        let extent = Vec3::new(
            self.size.width as f32,
            self.size.height as f32,
            self.size.depth as f32,
        );
        let offset = (extent - Vec3::ONE) * 0.5;
        (coords.as_vec3() - offset) * spacing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_coords_round_trip() {
        let grid = VoxelGrid::new(GridSize::new(4, 3, 5));
        for z in 0..5 {
            for y in 0..3 {
                for x in 0..4 {
                    let index = grid.index(x, y, z).unwrap();
                    assert_eq!(
                        grid.coords(index),
                        Some(UVec3::new(x as u32, y as u32, z as u32))
                    );
                }
            }
        }
        assert_eq!(grid.index(1, 2, 3), Some(3 * 12 + 2 * 4 + 1));
    }

    #[test]
    fn out_of_bounds_is_none_and_ignored() {
        let mut grid = VoxelGrid::new(GridSize::new(2, 2, 1));
        for (x, y, z) in [(-1, 0, 0), (2, 0, 0), (0, 2, 0), (0, 0, 1), (0, -5, 0)] {
            assert!(grid.get(x, y, z).is_none());
            assert!(grid.set(x, y, z, [255, 255, 255], 1.0).is_none());
        }
        assert!(grid.voxels().iter().all(|v| *v == Voxel::CLEARED));
        assert_eq!(grid.coords(4), None);
    }

    #[test]
    fn set_clamps_color_and_brightness() {
        let mut grid = VoxelGrid::new(GridSize::new(8, 8, 1));
        grid.set(1, 1, 0, [300, -10, 999], 5.0);
        let voxel = grid.get(1, 1, 0).unwrap();
        assert_eq!(voxel.color, [255, 0, 255]);
        assert_eq!(voxel.brightness, 1.0);
        assert!(voxel.target_visible);
        assert!(!voxel.visible);
        assert!(!voxel.is_animating);

        grid.set(2, 2, 0, [1, 2, 3], f32::NAN);
        assert_eq!(grid.get(2, 2, 0).unwrap().brightness, 0.0);
    }

    #[test]
    fn clear_resets_everything() {
        let mut grid = VoxelGrid::new(GridSize::new(3, 3, 2));
        grid.set(0, 0, 0, [10, 20, 30], 0.5);
        grid.voxels_mut()[5].visible = true;
        grid.voxels_mut()[5].animation = AnimationKind::Pulse;
        grid.voxels_mut()[5].is_animating = true;

        grid.clear();
        for v in grid.voxels() {
            assert!(!v.visible && !v.target_visible && !v.is_animating);
            assert_eq!(v.brightness, 0.0);
            assert_eq!(v.animation, AnimationKind::None);
        }
    }

    #[test]
    fn local_position_is_centered() {
        let grid = VoxelGrid::new(GridSize::new(3, 3, 1));
        assert_eq!(grid.local_position(UVec3::new(1, 1, 0), 2.0), Vec3::ZERO);
        assert_eq!(
            grid.local_position(UVec3::new(0, 2, 0), 2.0),
            Vec3::new(-2.0, 2.0, 0.0)
        );
    }

    #[test]
    fn appear_style_names() {
        assert_eq!(AppearStyle::from_name("fade"), AppearStyle::Fade);
        assert_eq!(AppearStyle::from_name(" Scale "), AppearStyle::Scale);
        assert_eq!(AppearStyle::from_name("bounce"), AppearStyle::Bounce);
        assert_eq!(AppearStyle::from_name("wobble"), AppearStyle::Bounce);
    }
}
