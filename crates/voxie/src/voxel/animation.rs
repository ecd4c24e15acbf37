//! # Voxel Animation
//!
//! Every voxel runs its own tiny state machine, driven by a millisecond clock:
//!
//! ```text
//!            animate_appear            progress ≥ 1
//!   None ───────────────────► Appear ───────────────► Pulse ──┐
//!    ▲                                                  │     │ phase += dt·speed
//!    │        progress ≥ 1                              │     └─(wraps at 2π)
//!    └───────────────────── Disappear ◄─────────────────┘
//!                                 animate_all_disappear
//! ```
//!
//! Scheduling functions ([`animate_appear`], [`animate_appear_wave`],
//! [`animate_all_disappear`]) only stamp each voxel with a delay and a start
//! time. Nothing moves until [`VoxelAnimator::advance`] runs.
//!
//! A voxel with delay `d` scheduled at clock time `t` starts moving at
//! `t + d`, and its progress is `(now - start) / duration`, clamped to
//! \[0, 1\]. Because progress is computed from absolute time rather than
//! accumulated deltas, a dropped frame never slows an animation down.
//!
//! ## Rate limiting
//!
//! [`VoxelAnimator::should_tick`] admits at most `update_rate` ticks per second.
//! A call arriving sooner than `1000 / update_rate` ms after the last admitted
//! tick is rejected and changes nothing. Rejected calls don't move the window.
//!
//! ## Visual envelope
//!
//! [`Voxel::effective_scale`] and [`Voxel::effective_brightness`] turn the raw
//! animation state into what a renderer should draw, using [`EaseFunction`]
//! curves. The raw `brightness` field is never modified by animation.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use super::grid::{AnimationKind, AppearStyle, Voxel, VoxelGrid};

/// Time for one voxel to fully appear.
pub const APPEAR_DURATION_MS: f64 = 300.0;
/// Time for one voxel to fully disappear.
pub const DISAPPEAR_DURATION_MS: f64 = 200.0;
/// Delay per diagonal step of a wave appear.
pub const WAVE_STEP_MS: f64 = 50.0;
/// Default stagger between voxels of a sequential appear.
pub const APPEAR_SEQUENCE_DELAY_MS: f64 = 50.0;
/// Default stagger between voxels of a disappear.
pub const DISAPPEAR_SEQUENCE_DELAY_MS: f64 = 30.0;
/// Default animation rate.
pub const DEFAULT_UPDATE_RATE: f32 = 60.0;

// ── Easing ────────────────────────────────────────────────────────────

/// Easing curves for the visual envelope.
///
/// Each variant maps `t` in \[0, 1\] to an eased value in roughly \[0, 1\].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EaseFunction {
    Linear,
    QuadIn,
    CubicOut,
    SineInOut,
    /// Overshoots to about 1.1 before settling at 1.
    BackOut,
}

impl EaseFunction {
    /// Evaluate the easing function at `t` (clamped to \[0, 1\]).
    pub fn sample(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::QuadIn => t * t,
            Self::CubicOut => 1.0 - (1.0 - t).powi(3),
            Self::SineInOut => -(PI * t).cos() / 2.0 + 0.5,
            Self::BackOut => {
                const C1: f32 = 1.70158;
                const C3: f32 = C1 + 1.0;
                1.0 + C3 * (t - 1.0).powi(3) + C1 * (t - 1.0).powi(2)
            }
        }
    }
}

// ── Scheduling ────────────────────────────────────────────────────────

/// Options for [`animate_appear`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppearOptions {
    pub base_delay_ms: f64,
    /// Extra delay per position in the index list.
    pub sequence_delay_ms: f64,
    pub style: AppearStyle,
}

impl Default for AppearOptions {
    fn default() -> Self {
        Self {
            base_delay_ms: 0.0,
            sequence_delay_ms: APPEAR_SEQUENCE_DELAY_MS,
            style: AppearStyle::Bounce,
        }
    }
}

/// Options for [`animate_all_disappear`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisappearOptions {
    pub base_delay_ms: f64,
    pub sequence_delay_ms: f64,
}

impl Default for DisappearOptions {
    fn default() -> Self {
        Self {
            base_delay_ms: 0.0,
            sequence_delay_ms: DISAPPEAR_SEQUENCE_DELAY_MS,
        }
    }
}

fn begin_appear(voxel: &mut Voxel, delay_ms: f64, now_ms: f64, style: AppearStyle) {
    voxel.appear_delay_ms = delay_ms;
    voxel.start_ms = now_ms + delay_ms;
    voxel.appear_progress = 0.0;
    voxel.is_animating = true;
    voxel.animation = AnimationKind::Appear;
    voxel.style = style;
}

/// Schedule the voxels at `indices` to appear one after another.
///
/// The delay of each voxel is `base + i * sequence`, where `i` is its position
/// in `indices`. Out-of-range indices are skipped but keep their position, so
/// the voxels after them are not pulled earlier.
pub fn animate_appear(grid: &mut VoxelGrid, indices: &[usize], options: AppearOptions, now_ms: f64) {
    for (i, &index) in indices.iter().enumerate() {
        let Some(voxel) = grid.voxel_mut(index) else {
            log::trace!("appear: skipping out-of-range voxel {index}");
            continue;
        };
        let delay = options.base_delay_ms + i as f64 * options.sequence_delay_ms;
        begin_appear(voxel, delay, now_ms, options.style);
    }
}

/// Schedule the voxels at `indices` to appear as a diagonal wave.
///
/// The delay depends only on the voxel's position: `(x + y) * 50` ms.
pub fn animate_appear_wave(grid: &mut VoxelGrid, indices: &[usize], now_ms: f64) {
    for &index in indices {
        let Some(coords) = grid.coords(index) else {
            continue;
        };
        let delay = f64::from(coords.x + coords.y) * WAVE_STEP_MS;
        if let Some(voxel) = grid.voxel_mut(index) {
            begin_appear(voxel, delay, now_ms, AppearStyle::Bounce);
        }
    }
}

/// Schedule every shown or wanted voxel to disappear, staggered in index
/// order. Returns how many voxels were scheduled.
///
/// Progress always restarts at 0. A voxel caught halfway through an earlier
/// disappear (say a second `set_state` lands during the fade) jumps back to
/// full scale and brightness, then fades again from its new delay. Renderers
/// see that as a one-frame pop.
pub fn animate_all_disappear(grid: &mut VoxelGrid, options: DisappearOptions, now_ms: f64) -> usize {
    let mut slot = 0usize;
    for voxel in grid.voxels_mut() {
        if !(voxel.visible || voxel.target_visible) {
            continue;
        }
        let delay = options.base_delay_ms + slot as f64 * options.sequence_delay_ms;
        voxel.disappear_delay_ms = delay;
        voxel.start_ms = now_ms + delay;
        voxel.disappear_progress = 0.0;
        voxel.is_animating = true;
        voxel.animation = AnimationKind::Disappear;
        voxel.target_visible = false;
        slot += 1;
    }
    slot
}

// ── Animator ──────────────────────────────────────────────────────────

/// Advances voxel animations at a bounded rate.
#[derive(Debug, Clone)]
pub struct VoxelAnimator {
    update_rate: f32,
    appear_duration_ms: f64,
    disappear_duration_ms: f64,
    /// Radians per second.
    pulse_speed: f32,
    last_tick_ms: Option<f64>,
}

impl VoxelAnimator {
    pub fn new() -> Self {
        Self {
            update_rate: DEFAULT_UPDATE_RATE,
            appear_duration_ms: APPEAR_DURATION_MS,
            disappear_duration_ms: DISAPPEAR_DURATION_MS,
            pulse_speed: 1.0,
            last_tick_ms: None,
        }
    }

    /// Non-positive rates fall back to the default.
    pub fn with_update_rate(mut self, hz: f32) -> Self {
        self.update_rate = if hz > 0.0 { hz } else { DEFAULT_UPDATE_RATE };
        self
    }

    pub fn with_durations(mut self, appear_ms: f64, disappear_ms: f64) -> Self {
        self.appear_duration_ms = appear_ms;
        self.disappear_duration_ms = disappear_ms;
        self
    }

    pub fn with_pulse_speed(mut self, radians_per_sec: f32) -> Self {
        self.pulse_speed = radians_per_sec;
        self
    }

    pub fn update_rate(&self) -> f32 {
        self.update_rate
    }

    /// Minimum spacing between two admitted ticks.
    pub fn min_interval_ms(&self) -> f64 {
        1000.0 / f64::from(self.update_rate)
    }

    /// Admit or reject a tick at `now_ms`. The first tick is always admitted.
    pub fn should_tick(&mut self, now_ms: f64) -> bool {
        if let Some(last) = self.last_tick_ms {
            if now_ms - last < self.min_interval_ms() {
                return false;
            }
        }
        self.last_tick_ms = Some(now_ms);
        true
    }

    /// Move every animating voxel forward to `now_ms`. Returns whether any
    /// voxel changed.
    pub fn advance(&self, grid: &mut VoxelGrid, now_ms: f64, delta_secs: f32) -> bool {
        let mut changed = false;
        for voxel in grid.voxels_mut() {
            changed |= match voxel.animation {
                AnimationKind::Appear if voxel.is_animating => {
                    self.advance_appear(voxel, now_ms)
                }
                AnimationKind::Disappear if voxel.is_animating => {
                    self.advance_disappear(voxel, now_ms)
                }
                AnimationKind::Pulse => {
                    voxel.phase = (voxel.phase + delta_secs * self.pulse_speed).rem_euclid(TAU);
                    true
                }
                _ => false,
            };
        }
        changed
    }

    fn advance_appear(&self, voxel: &mut Voxel, now_ms: f64) -> bool {
        if now_ms < voxel.start_ms {
            return false;
        }
        let progress = progress(now_ms, voxel.start_ms, self.appear_duration_ms);
        let changed = progress != voxel.appear_progress;
        voxel.appear_progress = progress;
        if progress >= 1.0 {
            voxel.visible = true;
            voxel.is_animating = false;
            voxel.animation = AnimationKind::Pulse;
            voxel.phase = 0.0;
            return true;
        }
        changed
    }

    fn advance_disappear(&self, voxel: &mut Voxel, now_ms: f64) -> bool {
        if now_ms < voxel.start_ms {
            return false;
        }
        let progress = progress(now_ms, voxel.start_ms, self.disappear_duration_ms);
        let changed = progress != voxel.disappear_progress;
        voxel.disappear_progress = progress;
        if progress >= 1.0 {
            voxel.visible = false;
            voxel.is_animating = false;
            voxel.animation = AnimationKind::None;
            return true;
        }
        changed
    }
}

impl Default for VoxelAnimator {
    fn default() -> Self {
        Self::new()
    }
}

fn progress(now_ms: f64, start_ms: f64, duration_ms: f64) -> f32 {
    if duration_ms <= 0.0 {
        return 1.0;
    }
    ((now_ms - start_ms) / duration_ms).clamp(0.0, 1.0) as f32
}

// ── Visual envelope ───────────────────────────────────────────────────

impl Voxel {
    /// Size multiplier a renderer should apply, roughly 0 – 1.1.
    pub fn effective_scale(&self) -> f32 {
        match self.animation {
            AnimationKind::Appear => appear_scale(self.style, self.appear_progress),
            AnimationKind::Disappear => {
                let from = if self.visible {
                    1.0
                } else {
                    appear_scale(self.style, self.appear_progress)
                };
                from * (1.0 - EaseFunction::QuadIn.sample(self.disappear_progress))
            }
            AnimationKind::Pulse => 1.0,
            AnimationKind::None => {
                if self.visible {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    /// Brightness a renderer should apply, in \[0, 1\].
    pub fn effective_brightness(&self) -> f32 {
        let base = self.brightness;
        match self.animation {
            AnimationKind::Appear => match self.style {
                AppearStyle::Fade => base * EaseFunction::SineInOut.sample(self.appear_progress),
                AppearStyle::Bounce | AppearStyle::Scale => base,
            },
            AnimationKind::Disappear => {
                base * (1.0 - EaseFunction::Linear.sample(self.disappear_progress))
            }
            // Breathes between 70% and 100%.
            AnimationKind::Pulse => base * (0.85 + 0.15 * (self.phase - FRAC_PI_2).sin()),
            AnimationKind::None => {
                if self.visible {
                    base
                } else {
                    0.0
                }
            }
        }
    }
}

fn appear_scale(style: AppearStyle, progress: f32) -> f32 {
    match style {
        AppearStyle::Bounce => EaseFunction::BackOut.sample(progress),
        AppearStyle::Scale => EaseFunction::CubicOut.sample(progress),
        AppearStyle::Fade => {
            if progress > 0.0 {
                1.0
            } else {
                0.0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::grid::GridSize;

    fn grid() -> VoxelGrid {
        VoxelGrid::new(GridSize::new(8, 8, 1))
    }

    #[test]
    fn ease_endpoints() {
        for ease in [
            EaseFunction::Linear,
            EaseFunction::QuadIn,
            EaseFunction::CubicOut,
            EaseFunction::SineInOut,
            EaseFunction::BackOut,
        ] {
            assert!(ease.sample(0.0).abs() < 1e-5, "{ease:?}");
            assert!((ease.sample(1.0) - 1.0).abs() < 1e-5, "{ease:?}");
        }
        assert!(EaseFunction::BackOut.sample(0.7) > 1.0);
    }

    #[test]
    fn sequential_delays_follow_list_position() {
        let mut g = grid();
        animate_appear(&mut g, &[10, 999, 3], AppearOptions::default(), 1000.0);

        let a = g.voxel(10).unwrap();
        assert_eq!(a.appear_delay_ms, 0.0);
        assert_eq!(a.start_ms, 1000.0);
        assert_eq!(a.animation, AnimationKind::Appear);
        assert!(a.is_animating);

        // 999 is skipped but still occupies slot 1.
        assert_eq!(g.voxel(3).unwrap().appear_delay_ms, 100.0);
    }

    #[test]
    fn wave_delay_depends_on_position_only() {
        let mut g = grid();
        let far = g.index(3, 3, 0).unwrap();
        let near = g.index(0, 0, 0).unwrap();
        animate_appear_wave(&mut g, &[far, near], 0.0);

        let near_delay = g.voxel(near).unwrap().appear_delay_ms;
        let far_delay = g.voxel(far).unwrap().appear_delay_ms;
        assert_eq!(near_delay, 0.0);
        assert_eq!(far_delay, 300.0);
        assert!(far_delay > near_delay);
    }

    #[test]
    fn appear_runs_to_pulse_in_300ms() {
        let mut g = grid();
        let animator = VoxelAnimator::new();
        animate_appear(&mut g, &[0], AppearOptions::default(), 0.0);

        assert!(animator.advance(&mut g, 150.0, 0.15));
        let v = g.voxel(0).unwrap();
        assert!((v.appear_progress - 0.5).abs() < 1e-6);
        assert!(!v.visible);

        assert!(animator.advance(&mut g, 300.0, 0.15));
        let v = g.voxel(0).unwrap();
        assert!(v.visible);
        assert!(!v.is_animating);
        assert_eq!(v.animation, AnimationKind::Pulse);
        assert_eq!(v.appear_progress, 1.0);
    }

    #[test]
    fn delayed_appear_waits() {
        let mut g = grid();
        let animator = VoxelAnimator::new();
        animate_appear(
            &mut g,
            &[0],
            AppearOptions { base_delay_ms: 200.0, ..Default::default() },
            0.0,
        );
        assert!(!animator.advance(&mut g, 199.0, 0.1));
        assert_eq!(g.voxel(0).unwrap().appear_progress, 0.0);
        animator.advance(&mut g, 350.0, 0.1);
        assert!((g.voxel(0).unwrap().appear_progress - 0.5).abs() < 1e-6);
    }

    #[test]
    fn disappear_only_touches_shown_or_wanted_voxels() {
        let mut g = grid();
        g.set(0, 0, 0, [255, 0, 0], 1.0);
        g.voxels_mut()[5].visible = true;
        g.voxels_mut()[9].visible = true;

        let scheduled = animate_all_disappear(&mut g, DisappearOptions::default(), 100.0);
        assert_eq!(scheduled, 3);

        let delays: Vec<f64> = [0, 5, 9]
            .iter()
            .map(|&i| g.voxel(i).unwrap().disappear_delay_ms)
            .collect();
        assert_eq!(delays, vec![0.0, 30.0, 60.0]);
        assert!(g.voxels().iter().all(|v| !v.target_visible));
        assert_eq!(g.voxel(1).unwrap().animation, AnimationKind::None);
    }

    #[test]
    fn disappear_completes_after_200ms() {
        let mut g = grid();
        let animator = VoxelAnimator::new();
        g.voxels_mut()[0].visible = true;
        g.voxels_mut()[0].animation = AnimationKind::Pulse;
        animate_all_disappear(&mut g, DisappearOptions::default(), 0.0);

        animator.advance(&mut g, 100.0, 0.1);
        assert!(g.voxel(0).unwrap().visible);
        animator.advance(&mut g, 200.0, 0.1);
        let v = g.voxel(0).unwrap();
        assert!(!v.visible);
        assert!(!v.is_animating);
        assert_eq!(v.animation, AnimationKind::None);
    }

    #[test]
    fn restarted_disappear_begins_from_full_scale() {
        let mut g = grid();
        let animator = VoxelAnimator::new();
        g.voxels_mut()[0].visible = true;
        g.voxels_mut()[0].animation = AnimationKind::Pulse;
        animate_all_disappear(&mut g, DisappearOptions::default(), 0.0);

        animator.advance(&mut g, 100.0, 0.1);
        let halfway = g.voxel(0).unwrap();
        assert!((halfway.disappear_progress - 0.5).abs() < 1e-6);
        assert!(halfway.effective_scale() < 1.0);

        assert_eq!(animate_all_disappear(&mut g, DisappearOptions::default(), 100.0), 1);
        let restarted = g.voxel(0).unwrap();
        assert_eq!(restarted.disappear_progress, 0.0);
        assert_eq!(restarted.start_ms, 100.0);
        assert_eq!(restarted.effective_scale(), 1.0);

        animator.advance(&mut g, 300.0, 0.1);
        assert!(!g.voxel(0).unwrap().visible);
    }

    #[test]
    fn pulse_phase_wraps() {
        let mut g = grid();
        let animator = VoxelAnimator::new().with_pulse_speed(TAU);
        g.voxels_mut()[0].animation = AnimationKind::Pulse;
        g.voxels_mut()[0].phase = 0.0;

        assert!(animator.advance(&mut g, 0.0, 1.25));
        let phase = g.voxel(0).unwrap().phase;
        assert!((phase - TAU * 0.25).abs() < 1e-4, "{phase}");
        assert!((0.0..TAU).contains(&phase));
    }

    #[test]
    fn idle_grid_reports_no_change() {
        let mut g = grid();
        assert!(!VoxelAnimator::new().advance(&mut g, 1000.0, 0.016));
    }

    #[test]
    fn rate_limit_rejects_early_ticks() {
        let mut animator = VoxelAnimator::new().with_update_rate(10.0);
        assert!(animator.should_tick(0.0));
        assert!(!animator.should_tick(50.0));
        assert!(!animator.should_tick(99.0));
        assert!(animator.should_tick(100.0));
        assert!(!animator.should_tick(150.0));
        assert_eq!(VoxelAnimator::new().with_update_rate(-1.0).update_rate(), 60.0);
    }

    #[test]
    fn envelope_follows_animation() {
        let mut v = Voxel {
            brightness: 0.8,
            animation: AnimationKind::Appear,
            style: AppearStyle::Fade,
            appear_progress: 0.0,
            ..Voxel::CLEARED
        };
        assert_eq!(v.effective_scale(), 0.0);
        assert_eq!(v.effective_brightness(), 0.0);

        v.appear_progress = 1.0;
        assert_eq!(v.effective_scale(), 1.0);
        assert!((v.effective_brightness() - 0.8).abs() < 1e-6);

        v.animation = AnimationKind::Pulse;
        v.visible = true;
        v.phase = 0.0;
        assert!((v.effective_brightness() - 0.8 * 0.7).abs() < 1e-5);

        v.animation = AnimationKind::Disappear;
        v.disappear_progress = 1.0;
        assert_eq!(v.effective_scale(), 0.0);
        assert_eq!(v.effective_brightness(), 0.0);
    }
}
