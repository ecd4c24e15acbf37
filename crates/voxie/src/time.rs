//! Clocks and frame timing.
//!
//! Two separate notions of time live here:
//!
//! - A [`Clock`] is a monotonic millisecond source. Voxel indicators read it to
//!   schedule appear/disappear animations and the settle delay. Production code
//!   uses [`SystemClock`]; tests inject a [`ManualClock`] and move it by hand.
//! - [`Time`] tracks frame deltas for the [`Runner`](crate::runner::Runner):
//!   delta, elapsed, frame count and FPS.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// A monotonic millisecond clock.
pub trait Clock: Send + Sync {
    /// Milliseconds since an arbitrary, fixed origin.
    fn now_ms(&self) -> f64;
}

/// Wall-clock time measured from construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_bits: Arc<AtomicU64>,
}

impl ManualClock {
    /// A clock reading 0 ms.
    pub fn new() -> Self {
        Self::default()
    }

    /// A clock reading `ms`.
    pub fn at(ms: f64) -> Self {
        let clock = Self::new();
        clock.set(ms);
        clock
    }

    pub fn set(&self, ms: f64) {
        self.now_bits.store(ms.to_bits(), Ordering::Relaxed);
    }

    pub fn advance(&self, ms: f64) {
        self.set(self.now_ms() + ms);
    }

    /// Wrap a clone in an `Arc<dyn Clock>` for injection.
    pub fn shared(&self) -> Arc<dyn Clock> {
        Arc::new(self.clone())
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        f64::from_bits(self.now_bits.load(Ordering::Relaxed))
    }
}

/// Frame timing, updated by the runner once per frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct Time {
    /// Timestamp of the previous frame, `None` before the first frame.
    last_frame: Option<Duration>,
    /// Duration of the previous frame.
    delta: Duration,
    /// Sum of all deltas since the runner started.
    elapsed: Duration,
    /// Frame counter.
    frame_count: u64,
}

impl Time {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a frame at `timestamp` and return the delta in seconds.
    ///
    /// The first frame after a reset has a delta of zero. Timestamps that go
    /// backwards also produce zero.
    pub(crate) fn advance(&mut self, timestamp: Duration) -> f32 {
        self.delta = match self.last_frame {
            Some(last) => timestamp.saturating_sub(last),
            None => Duration::ZERO,
        };
        self.last_frame = Some(timestamp);
        self.elapsed += self.delta;
        self.frame_count += 1;
        self.delta.as_secs_f32()
    }

    /// Forget the previous timestamp so the next frame starts fresh.
    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// [`delta`](Self::delta) as seconds, the unit systems receive.
    pub fn delta_secs(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Instantaneous frame rate, 0 until two frames have run.
    pub fn fps(&self) -> f32 {
        match self.delta_secs() {
            secs if secs > 0.0 => secs.recip(),
            _ => 0.0,
        }
    }
}
