//! The [`VoxelIndicator`] component.
//!
//! Ties a [`VoxelGrid`] to a [`VoxelAnimator`], a [`Clock`] and the
//! state/settle machine from [`state`](super::state). Every operation is
//! infallible: bad coordinates are ignored, unknown names fall back to idle.
//!
//! ```text
//! set_state(thinking)                      update() at t+500
//!        │                                        │
//!        ▼                                        ▼
//!   all voxels fade out ── 500 ms settle ──► state = thinking
//!                                            draw thinking pattern
//!                                            dots fade in one by one
//! ```

use std::fmt;
use std::sync::Arc;

use crate::config::IndicatorConfig;
use crate::ecs::{Component, EntityId};
use crate::math::{UVec3, Vec3};
use crate::time::{Clock, SystemClock};

use super::animation::{
    AppearOptions, DisappearOptions, VoxelAnimator, animate_all_disappear, animate_appear,
    animate_appear_wave,
};
use super::grid::{GridSize, Voxel, VoxelGrid};
use super::pattern::{Pattern, draw_pattern};
use super::state::{IndicatorState, Transition};

/// Component: an animated voxel grid showing an [`IndicatorState`].
pub struct VoxelIndicator {
    grid: VoxelGrid,
    animator: VoxelAnimator,
    state: IndicatorState,
    transition: Transition,
    next_token: u64,
    state_change_ms: f64,
    settle_delay_ms: f64,
    voxel_size: f32,
    spacing: f32,
    clock: Arc<dyn Clock>,
    entity: Option<EntityId>,
}

impl VoxelIndicator {
    /// A cleared indicator driven by the system clock.
    pub fn new(size: GridSize) -> Self {
        Self::with_clock(size, Arc::new(SystemClock::new()))
    }

    /// A cleared indicator driven by `clock`.
    pub fn with_clock(size: GridSize, clock: Arc<dyn Clock>) -> Self {
        let config = IndicatorConfig {
            size,
            ..IndicatorConfig::default()
        };
        Self::from_config(&config, clock)
    }

    /// A cleared indicator with every tunable taken from `config`.
    ///
    /// The config is assumed valid; see [`IndicatorConfig::validate`].
    pub fn from_config(config: &IndicatorConfig, clock: Arc<dyn Clock>) -> Self {
        let animator = VoxelAnimator::new()
            .with_update_rate(config.update_rate)
            .with_durations(config.appear_duration_ms, config.disappear_duration_ms)
            .with_pulse_speed(config.pulse_speed);
        let state_change_ms = clock.now_ms();
        Self {
            grid: VoxelGrid::new(config.size),
            animator,
            state: IndicatorState::Idle,
            transition: Transition::Settled,
            next_token: 0,
            state_change_ms,
            settle_delay_ms: config.settle_delay_ms,
            voxel_size: config.voxel_size,
            spacing: config.spacing(),
            clock,
            entity: None,
        }
    }

    // ── Grid access ──────────────────────────────────────────────────

    pub fn grid(&self) -> &VoxelGrid {
        &self.grid
    }

    pub fn size(&self) -> GridSize {
        self.grid.size()
    }

    pub fn clear(&mut self) {
        self.grid.clear();
    }

    /// Color a voxel and mark it wanted. See [`VoxelGrid::set`].
    #[allow(clippy::too_many_arguments)]
    pub fn set_voxel(&mut self, x: i32, y: i32, z: i32, r: i32, g: i32, b: i32, brightness: f32) {
        self.grid.set(x, y, z, [r, g, b], brightness);
    }

    /// [`set_voxel`](Self::set_voxel) at full brightness.
    pub fn set_voxel_rgb(&mut self, x: i32, y: i32, z: i32, r: i32, g: i32, b: i32) {
        self.set_voxel(x, y, z, r, g, b, 1.0);
    }

    pub fn get_voxel(&self, x: i32, y: i32, z: i32) -> Option<&Voxel> {
        self.grid.get(x, y, z)
    }

    pub fn voxel_index(&self, x: i32, y: i32, z: i32) -> Option<usize> {
        self.grid.index(x, y, z)
    }

    pub fn voxel_coords(&self, index: usize) -> Option<UVec3> {
        self.grid.coords(index)
    }

    /// Local-space center of the voxel at `(x, y, z)`, grid centered on the
    /// origin. `None` if out of bounds.
    pub fn voxel_world_position(&self, x: i32, y: i32, z: i32) -> Option<Vec3> {
        let index = self.grid.index(x, y, z)?;
        let coords = self.grid.coords(index)?;
        Some(self.grid.local_position(coords, self.spacing))
    }

    /// Edge length of one voxel in local units.
    pub fn voxel_size(&self) -> f32 {
        self.voxel_size
    }

    /// Distance between neighboring voxel centers.
    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    /// Every voxel, in index order, for a renderer to draw.
    pub fn render_data(&self) -> &[Voxel] {
        self.grid.voxels()
    }

    pub fn visible_count(&self) -> usize {
        self.grid.visible_count()
    }

    // ── Animation ────────────────────────────────────────────────────

    /// Schedule `indices` to appear in list order, starting now.
    pub fn animate_voxels_appear(&mut self, indices: &[usize], options: AppearOptions) {
        let now = self.clock.now_ms();
        animate_appear(&mut self.grid, indices, options, now);
    }

    /// Schedule `indices` to appear as a diagonal wave, starting now.
    pub fn animate_voxels_appear_wave(&mut self, indices: &[usize]) {
        let now = self.clock.now_ms();
        animate_appear_wave(&mut self.grid, indices, now);
    }

    /// Fade out everything shown or wanted, starting now. Returns how many
    /// voxels were scheduled.
    pub fn animate_all_disappear(&mut self, options: DisappearOptions) -> usize {
        let now = self.clock.now_ms();
        animate_all_disappear(&mut self.grid, options, now)
    }

    /// Clear the grid and draw `pattern`, starting its appear animation now.
    pub fn create_pattern(&mut self, pattern: Pattern) {
        let now = self.clock.now_ms();
        let indices = draw_pattern(&mut self.grid, pattern, now);
        log::debug!("indicator: drew {pattern} ({} voxels)", indices.len());
    }

    /// [`create_pattern`](Self::create_pattern) by name; unknown names draw idle.
    pub fn create_pattern_named(&mut self, name: &str) {
        self.create_pattern(Pattern::from_name(name));
    }

    // ── State ────────────────────────────────────────────────────────

    pub fn state(&self) -> IndicatorState {
        self.state
    }

    /// The state waiting to commit, if a transition is in flight.
    pub fn pending_state(&self) -> Option<IndicatorState> {
        self.transition.target()
    }

    pub fn transition(&self) -> Transition {
        self.transition
    }

    /// Clock time of the last committed state change.
    pub fn state_change_ms(&self) -> f64 {
        self.state_change_ms
    }

    /// The entity this indicator is attached to.
    pub fn entity(&self) -> Option<EntityId> {
        self.entity
    }

    /// Request a state change.
    ///
    /// Requesting the state already shown (or already pending) does nothing
    /// and returns `false`. Otherwise every voxel starts fading out and
    /// `state` commits once the settle delay has passed, on the next
    /// admitted [`update`](Self::update). A request made while another is
    /// settling replaces it and restarts the delay.
    pub fn set_state(&mut self, state: IndicatorState) -> bool {
        let effective = self.transition.target().unwrap_or(self.state);
        if state == effective {
            return false;
        }

        let now = self.clock.now_ms();
        let fading = animate_all_disappear(&mut self.grid, DisappearOptions::default(), now);
        if let Some(superseded) = self.transition.target() {
            log::debug!("indicator: {superseded} superseded by {state}");
        }
        self.next_token += 1;
        self.transition = Transition::Settling {
            target: state,
            token: self.next_token,
            due_ms: now + self.settle_delay_ms,
        };
        log::debug!(
            "indicator: {} -> {state} (fading {fading} voxels, token {})",
            self.state,
            self.next_token
        );
        true
    }

    /// [`set_state`](Self::set_state) by name; unknown names mean idle.
    pub fn set_state_named(&mut self, name: &str) -> bool {
        self.set_state(IndicatorState::from_name(name))
    }

    fn commit(&mut self, state: IndicatorState, now_ms: f64) {
        self.transition = Transition::Settled;
        self.state = state;
        self.state_change_ms = now_ms;
        log::info!("indicator state: {state}");
        self.create_pattern(state.pattern());
    }

    /// Advance animations. Returns whether anything changed.
    ///
    /// Calls closer together than `1000 / update_rate` ms are ignored and
    /// return `false`. An admitted call first commits a due state change,
    /// then moves every voxel forward to the current clock time.
    pub fn update(&mut self, delta_secs: f32) -> bool {
        let now = self.clock.now_ms();
        if !self.animator.should_tick(now) {
            return false;
        }
        let mut changed = false;
        if let Some(target) = self.transition.due(now) {
            self.commit(target, now);
            changed = true;
        }
        changed |= self.animator.advance(&mut self.grid, now, delta_secs);
        changed
    }
}

impl Component for VoxelIndicator {
    fn on_attach(&mut self, entity: EntityId) {
        self.entity = Some(entity);
    }

    fn on_detach(&mut self) {
        self.entity = None;
    }
}

impl fmt::Debug for VoxelIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VoxelIndicator")
            .field("size", &self.grid.size())
            .field("state", &self.state)
            .field("transition", &self.transition)
            .field("visible", &self.grid.visible_count())
            .field("entity", &self.entity)
            .finish()
    }
}

impl Default for VoxelIndicator {
    fn default() -> Self {
        Self::new(GridSize::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::World;
    use crate::time::ManualClock;
    use crate::voxel::grid::AnimationKind;

    /// 50 Hz, safely under the default 60 Hz limit.
    const FRAME: f64 = 20.0;

    fn indicator(clock: &ManualClock) -> VoxelIndicator {
        VoxelIndicator::with_clock(GridSize::new(8, 8, 1), clock.shared())
    }

    /// Tick once per frame until `until_ms`.
    fn run_until(ind: &mut VoxelIndicator, clock: &ManualClock, until_ms: f64) {
        while clock.now_ms() < until_ms {
            clock.advance(FRAME);
            ind.update(FRAME as f32 / 1000.0);
        }
    }

    #[test]
    fn starts_cleared_and_idle() {
        let clock = ManualClock::at(42.0);
        let ind = indicator(&clock);
        assert_eq!(ind.render_data().len(), 64);
        assert!(ind.render_data().iter().all(|v| *v == Voxel::CLEARED));
        assert_eq!(ind.state(), IndicatorState::Idle);
        assert_eq!(ind.pending_state(), None);
        assert_eq!(ind.state_change_ms(), 42.0);
    }

    #[test]
    fn bounds_and_clamping() {
        let clock = ManualClock::new();
        let mut ind = indicator(&clock);
        ind.set_voxel(3, 4, 0, 300, -10, 999, 5.0);
        let v = ind.get_voxel(3, 4, 0).unwrap();
        assert_eq!(v.color, [255, 0, 255]);
        assert_eq!(v.brightness, 1.0);

        ind.set_voxel_rgb(8, 0, 0, 1, 1, 1);
        ind.set_voxel_rgb(0, 0, -1, 1, 1, 1);
        assert!(ind.get_voxel(8, 0, 0).is_none());
        assert_eq!(ind.render_data().iter().filter(|v| v.target_visible).count(), 1);

        ind.clear();
        assert!(ind.render_data().iter().all(|v| *v == Voxel::CLEARED));
    }

    #[test]
    fn index_round_trip() {
        let clock = ManualClock::new();
        let ind = VoxelIndicator::with_clock(GridSize::new(5, 3, 4), clock.shared());
        for z in 0..4 {
            for y in 0..3 {
                for x in 0..5 {
                    let i = ind.voxel_index(x, y, z).unwrap();
                    assert_eq!(ind.voxel_coords(i), Some(UVec3::new(x as u32, y as u32, z as u32)));
                }
            }
        }
    }

    #[test]
    fn world_position_uses_spacing() {
        let clock = ManualClock::new();
        let config = IndicatorConfig {
            size: GridSize::new(3, 3, 1),
            voxel_size: 1.0,
            gap: 0.5,
            ..Default::default()
        };
        let ind = VoxelIndicator::from_config(&config, clock.shared());
        assert_eq!(ind.voxel_world_position(2, 1, 0), Some(Vec3::new(1.5, 0.0, 0.0)));
        assert_eq!(ind.voxel_world_position(3, 0, 0), None);
    }

    #[test]
    fn appear_completes_after_300ms() {
        let clock = ManualClock::new();
        let mut ind = indicator(&clock);
        ind.set_voxel_rgb(0, 0, 0, 255, 255, 255);
        ind.animate_voxels_appear(&[0], AppearOptions::default());

        run_until(&mut ind, &clock, 300.0);
        let v = ind.get_voxel(0, 0, 0).unwrap();
        assert!(v.visible);
        assert_eq!(v.animation, AnimationKind::Pulse);
        assert!(!v.is_animating);
    }

    #[test]
    fn rate_limited_update_changes_nothing() {
        let clock = ManualClock::new();
        let mut ind = indicator(&clock);
        ind.create_pattern(Pattern::Smiley);

        assert!(!ind.update(0.0));
        clock.advance(100.0);
        assert!(ind.update(0.1));

        let before: Vec<Voxel> = ind.render_data().to_vec();
        clock.advance(5.0);
        assert!(!ind.update(0.005));
        assert_eq!(ind.render_data(), before.as_slice());
    }

    #[test]
    fn smiley_end_to_end() {
        let clock = ManualClock::new();
        let mut ind = indicator(&clock);
        ind.create_pattern_named("smiley");

        let expected = [(2, 5), (5, 5), (2, 2), (3, 1), (4, 1), (5, 2)];
        let wanted = ind.render_data().iter().filter(|v| v.target_visible).count();
        assert_eq!(wanted, 6);

        let mut last_delay = -1.0;
        for (x, y) in expected {
            let v = ind.get_voxel(x, y, 0).unwrap();
            assert!(v.target_visible);
            assert!(v.appear_delay_ms > last_delay);
            last_delay = v.appear_delay_ms;
        }
        assert_eq!(last_delay, 500.0);

        // Last dot starts at 500 ms and needs 300 ms more.
        run_until(&mut ind, &clock, 800.0);
        assert_eq!(ind.visible_count(), 6);
    }

    #[test]
    fn wave_orders_by_diagonal() {
        let clock = ManualClock::new();
        let mut ind = indicator(&clock);
        let a = ind.voxel_index(0, 0, 0).unwrap();
        let b = ind.voxel_index(3, 3, 0).unwrap();
        ind.animate_voxels_appear_wave(&[b, a]);
        let da = ind.get_voxel(0, 0, 0).unwrap().appear_delay_ms;
        let db = ind.get_voxel(3, 3, 0).unwrap().appear_delay_ms;
        assert!(db > da);
    }

    #[test]
    fn set_state_settles_after_delay() {
        let clock = ManualClock::new();
        let mut ind = indicator(&clock);
        ind.create_pattern(Pattern::Idle);
        run_until(&mut ind, &clock, 1100.0);
        assert_eq!(ind.visible_count(), 64);

        let started = clock.now_ms();
        assert!(ind.set_state(IndicatorState::Thinking));
        assert_eq!(ind.state(), IndicatorState::Idle);
        assert_eq!(ind.pending_state(), Some(IndicatorState::Thinking));
        assert!(
            ind.render_data()
                .iter()
                .all(|v| v.animation == AnimationKind::Disappear && !v.target_visible)
        );

        run_until(&mut ind, &clock, started + 480.0);
        assert_eq!(ind.state(), IndicatorState::Idle);

        run_until(&mut ind, &clock, started + 520.0);
        assert_eq!(ind.state(), IndicatorState::Thinking);
        assert_eq!(ind.pending_state(), None);
        assert!(ind.state_change_ms() >= started + 500.0);
        assert_eq!(ind.render_data().iter().filter(|v| v.target_visible).count(), 3);
    }

    #[test]
    fn same_state_is_noop() {
        let clock = ManualClock::new();
        let mut ind = indicator(&clock);
        assert!(!ind.set_state(IndicatorState::Idle));
        assert!(!ind.set_state_named("nonsense"));
        assert_eq!(ind.transition(), Transition::Settled);

        assert!(ind.set_state_named("error"));
        assert!(!ind.set_state(IndicatorState::Error));
    }

    #[test]
    fn newer_request_supersedes_pending_one() {
        let clock = ManualClock::new();
        let mut ind = indicator(&clock);
        assert!(ind.set_state(IndicatorState::Thinking));
        let Transition::Settling { token: first, .. } = ind.transition() else {
            panic!("expected settling");
        };

        clock.set(300.0);
        assert!(ind.set_state(IndicatorState::Error));
        let Transition::Settling { token: second, due_ms, .. } = ind.transition() else {
            panic!("expected settling");
        };
        assert!(second > first);
        assert_eq!(due_ms, 800.0);

        // The first request's deadline passes without a commit.
        run_until(&mut ind, &clock, 600.0);
        assert_eq!(ind.state(), IndicatorState::Idle);
        assert_eq!(ind.pending_state(), Some(IndicatorState::Error));

        run_until(&mut ind, &clock, 820.0);
        assert_eq!(ind.state(), IndicatorState::Error);
        assert_eq!(ind.pending_state(), None);
    }

    #[test]
    fn returning_to_current_state_while_settling_redraws_it() {
        let clock = ManualClock::new();
        let mut ind = indicator(&clock);
        ind.set_state(IndicatorState::Success);
        clock.set(100.0);
        assert!(ind.set_state(IndicatorState::Idle));
        run_until(&mut ind, &clock, 700.0);
        assert_eq!(ind.state(), IndicatorState::Idle);
        assert_eq!(ind.render_data().iter().filter(|v| v.target_visible).count(), 64);
    }

    #[test]
    fn attach_records_entity() {
        let clock = ManualClock::new();
        let mut world = World::new();
        let id = world.create_entity();
        world.add_component(id, indicator(&clock));
        assert_eq!(world.get::<VoxelIndicator>(id).unwrap().entity(), Some(id));

        let detached = world
            .entities_mut()
            .get_mut(id)
            .unwrap()
            .remove::<VoxelIndicator>()
            .unwrap();
        assert_eq!(detached.entity(), None);
    }
}
