//! The driving loop.
//!
//! A host normally schedules "call me again at the next display refresh". That
//! primitive is abstracted as a [`FrameScheduler`], which blocks until the next
//! frame and returns its timestamp. The [`Runner`] turns successive timestamps
//! into delta seconds and calls [`World::update`] once per frame.
//!
//! ```text
//! start() ──► loop {
//!               ts = scheduler.next_frame()   (None → stop)
//!               dt = ts - previous_ts         (0 on the first frame)
//!               world.update(dt)
//!             } until stop()
//! ```
//!
//! [`IntervalScheduler`] paces frames in real time; [`ManualScheduler`] replays
//! a fixed list of timestamps so loops can be tested without a display.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::ecs::World;
use crate::time::Time;

/// Source of frame callbacks.
pub trait FrameScheduler {
    /// Wait for the next frame and return its timestamp, or `None` when no
    /// more frames will be produced.
    fn next_frame(&mut self) -> Option<Duration>;
}

/// Real-time scheduler that paces frames at a fixed refresh rate.
pub struct IntervalScheduler {
    origin: Instant,
    interval: Duration,
    next_deadline: Instant,
}

impl IntervalScheduler {
    /// Scheduler producing `refresh_hz` frames per second. Non-positive rates
    /// fall back to 60 Hz.
    pub fn new(refresh_hz: f32) -> Self {
        let hz = if refresh_hz > 0.0 { refresh_hz } else { 60.0 };
        let origin = Instant::now();
        Self {
            origin,
            interval: Duration::from_secs_f32(1.0 / hz),
            next_deadline: origin,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl FrameScheduler for IntervalScheduler {
    fn next_frame(&mut self) -> Option<Duration> {
        let now = Instant::now();
        if now < self.next_deadline {
            std::thread::sleep(self.next_deadline - now);
            self.next_deadline += self.interval;
        } else {
            // Fell behind; don't try to catch up with a burst of frames.
            self.next_deadline = now + self.interval;
        }
        Some(self.origin.elapsed())
    }
}

/// Scheduler that replays a queue of timestamps.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    frames: VecDeque<Duration>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames at the given millisecond timestamps.
    pub fn from_millis(timestamps: impl IntoIterator<Item = u64>) -> Self {
        Self {
            frames: timestamps.into_iter().map(Duration::from_millis).collect(),
        }
    }

    /// `count` frames spaced `interval` apart, starting at zero.
    pub fn evenly_spaced(count: usize, interval: Duration) -> Self {
        Self {
            frames: (0..count).map(|i| interval * i as u32).collect(),
        }
    }

    pub fn push(&mut self, timestamp: Duration) {
        self.frames.push_back(timestamp);
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl FrameScheduler for ManualScheduler {
    fn next_frame(&mut self) -> Option<Duration> {
        self.frames.pop_front()
    }
}

/// Cloneable handle that stops a running [`Runner`], e.g. from inside a system.
#[derive(Debug, Clone)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(false, Ordering::Relaxed);
    }

    pub fn is_running(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Drives a [`World`] from a [`FrameScheduler`].
pub struct Runner {
    running: Arc<AtomicBool>,
    time: Time,
}

impl Runner {
    pub fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(false)),
            time: Time::new(),
        }
    }

    /// Begin scheduling. The next frame has a delta of zero.
    pub fn start(&mut self) {
        if !self.is_running() {
            self.time.reset();
            self.running.store(true, Ordering::Relaxed);
            log::debug!("runner started");
        }
    }

    /// Halt the loop after the current frame.
    pub fn stop(&mut self) {
        if self.is_running() {
            self.running.store(false, Ordering::Relaxed);
            log::debug!("runner stopped after {} frames", self.time.frame_count());
        }
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle(self.running.clone())
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Frame timing of the most recent frame.
    pub fn time(&self) -> &Time {
        &self.time
    }

    /// Run one loop iteration at `timestamp`. Returns the delta in seconds.
    pub fn step(&mut self, world: &mut World, timestamp: Duration) -> f32 {
        let delta_secs = self.time.advance(timestamp);
        log::trace!("frame {} dt={delta_secs:.4}s", self.time.frame_count());
        world.update(delta_secs);
        delta_secs
    }

    /// Loop until stopped or the scheduler runs dry. Returns the number of
    /// frames run by this call.
    ///
    /// Does nothing unless [`start`](Self::start) was called first.
    pub fn run(&mut self, world: &mut World, scheduler: &mut impl FrameScheduler) -> u64 {
        self.run_with(world, scheduler, |_, _| {})
    }

    /// Like [`run`](Self::run), calling `after_frame` once after every
    /// [`World::update`].
    pub fn run_with(
        &mut self,
        world: &mut World,
        scheduler: &mut impl FrameScheduler,
        mut after_frame: impl FnMut(&mut World, &Time),
    ) -> u64 {
        if !self.is_running() {
            log::warn!("Runner::run called before start(); nothing to do");
            return 0;
        }
        let mut frames = 0;
        while self.is_running() {
            let Some(timestamp) = scheduler.next_frame() else {
                self.stop();
                break;
            };
            self.step(world, timestamp);
            after_frame(world, &self.time);
            frames += 1;
        }
        frames
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{ComponentType, Entities, EntityId, System};

    /// Records the deltas it receives and stops the runner after `limit` frames.
    struct DeltaLog {
        deltas: Vec<f32>,
        stop: Option<(StopHandle, usize)>,
    }

    impl System for DeltaLog {
        fn required_components(&self) -> &[ComponentType] {
            &[]
        }
        fn add_entity(&mut self, _entity: EntityId) {}
        fn remove_entity(&mut self, _entity: EntityId) {}
        fn contains(&self, _entity: EntityId) -> bool {
            false
        }
        fn update(&mut self, _entities: &mut Entities, delta_secs: f32) {
            self.deltas.push(delta_secs);
            if let Some((handle, limit)) = &self.stop {
                if self.deltas.len() >= *limit {
                    handle.stop();
                }
            }
        }
    }

    fn deltas(world: &World) -> Vec<f32> {
        world.system::<DeltaLog>("log").unwrap().deltas.clone()
    }

    #[test]
    fn run_feeds_deltas_in_seconds() {
        let mut world = World::new();
        world.add_system("log", DeltaLog { deltas: Vec::new(), stop: None });
        let mut scheduler = ManualScheduler::from_millis([1000, 1016, 1048, 1100]);
        let mut runner = Runner::new();

        runner.start();
        assert_eq!(runner.run(&mut world, &mut scheduler), 4);
        assert!(!runner.is_running());

        let got = deltas(&world);
        let want = [0.0, 0.016, 0.032, 0.052];
        assert_eq!(got.len(), want.len());
        for (g, w) in got.iter().zip(want) {
            assert!((g - w).abs() < 1e-5, "{g} vs {w}");
        }
        assert_eq!(runner.time().frame_count(), 4);
    }

    #[test]
    fn run_without_start_does_nothing() {
        let mut world = World::new();
        let mut scheduler = ManualScheduler::from_millis([0, 16]);
        let mut runner = Runner::new();
        assert_eq!(runner.run(&mut world, &mut scheduler), 0);
        assert_eq!(scheduler.remaining(), 2);
    }

    #[test]
    fn stop_handle_halts_loop_from_a_system() {
        let mut world = World::new();
        let mut runner = Runner::new();
        world.add_system(
            "log",
            DeltaLog {
                deltas: Vec::new(),
                stop: Some((runner.stop_handle(), 3)),
            },
        );
        let mut scheduler = ManualScheduler::evenly_spaced(10, Duration::from_millis(16));

        runner.start();
        assert_eq!(runner.run(&mut world, &mut scheduler), 3);
        assert_eq!(scheduler.remaining(), 7);
    }

    #[test]
    fn restart_resets_first_delta() {
        let mut world = World::new();
        world.add_system("log", DeltaLog { deltas: Vec::new(), stop: None });
        let mut runner = Runner::new();

        runner.start();
        runner.run(&mut world, &mut ManualScheduler::from_millis([0, 100]));
        runner.start();
        runner.run(&mut world, &mut ManualScheduler::from_millis([5000]));

        let got = deltas(&world);
        assert_eq!(got.len(), 3);
        assert_eq!(got[2], 0.0);
    }

    #[test]
    fn run_with_sees_each_frame() {
        let mut world = World::new();
        let mut runner = Runner::new();
        let mut frames_seen = Vec::new();

        runner.start();
        let ran = runner.run_with(
            &mut world,
            &mut ManualScheduler::from_millis([0, 20, 40]),
            |_, time| frames_seen.push(time.frame_count()),
        );
        assert_eq!(ran, 3);
        assert_eq!(frames_seen, vec![1, 2, 3]);
    }

    #[test]
    fn interval_scheduler_timestamps_increase() {
        let mut scheduler = IntervalScheduler::new(1000.0);
        let a = scheduler.next_frame().unwrap();
        let b = scheduler.next_frame().unwrap();
        assert!(b > a);
        assert_eq!(IntervalScheduler::new(0.0).interval(), Duration::from_secs_f32(1.0 / 60.0));
    }
}
