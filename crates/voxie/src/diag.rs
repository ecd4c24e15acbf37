//! Diagnostics sender: ships live indicator snapshots to `voxie-telemetry`
//! over UDP.
//!
//! Enabled by the `diagnostics` feature flag. Create a [`DiagSender`] and call
//! [`DiagSender::send`] once per frame (for example from
//! [`Runner::run_with`](crate::runner::Runner::run_with)). Sends are throttled
//! to 10 Hz; each one serializes a JSON [`DiagSnapshot`] and fires it at
//! `127.0.0.1:9100`. Nothing waits for the receiver. A failed send is
//! counted and warned about once, then the sender keeps going.
//!
//! ## Datagram Budget
//!
//! A snapshot must fit one datagram of at most [`MAX_DATAGRAM_BYTES`]. When
//! it does not, [`encode_snapshot`] sheds detail until it does:
//!
//! ```text
//! 1. drop the captured log lines
//! 2. drop the voxel list of the largest indicator (voxels_omitted = true)
//! 3. repeat 2 until it fits or no voxel list is left
//! ```
//!
//! [`init_logger`] installs a logger that writes to stderr via env_logger
//! *and* captures records into a ring buffer. Captured records ride along
//! with the next snapshot.

use std::collections::VecDeque;
use std::net::{ToSocketAddrs, UdpSocket};
use std::sync::{Mutex, OnceLock};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ecs::World;
use crate::time::Time;
use crate::voxel::{AnimationKind, VoxelIndicator};

/// Where `voxie-telemetry` listens by default.
pub const DEFAULT_TARGET: &str = "127.0.0.1:9100";

/// Minimum spacing between two snapshots.
pub const SEND_INTERVAL: Duration = Duration::from_millis(100);

/// Captured log records shipped per snapshot.
const LOGS_PER_SNAPSHOT: usize = 50;

/// Largest datagram the sender emits. Below both the UDP payload limit
/// (65,507 bytes) and the 64 KiB receive buffer of `voxie-telemetry`.
pub const MAX_DATAGRAM_BYTES: usize = 60_000;

/// Errors from setting up the diagnostics socket.
#[derive(Error, Debug)]
pub enum DiagError {
    #[error("failed to open diagnostics socket: {0}")]
    Socket(#[from] std::io::Error),
}

// ── Snapshot types (wire format) ────────────────────────────────────────

/// One datagram. `voxie-telemetry` mirrors these types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagSnapshot {
    pub fps: f32,
    pub delta_ms: f32,
    pub frame_count: u64,
    pub elapsed_secs: f32,
    pub entity_count: usize,
    pub system_timings: Vec<SystemTimingSnapshot>,
    pub indicators: Vec<IndicatorSnapshot>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub logs: Vec<LogEntrySnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemTimingSnapshot {
    pub name: String,
    pub duration_us: f64,
}

/// One indicator. Only drawable voxels are listed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub entity: u64,
    pub state: String,
    pub pending_state: Option<String>,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub visible_count: usize,
    pub voxels: Vec<VoxelSnapshot>,
    /// Set when `voxels` was emptied to fit the datagram budget.
    #[serde(default)]
    pub voxels_omitted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoxelSnapshot {
    pub index: usize,
    pub color: [u8; 3],
    /// Effective brightness, after animation.
    pub brightness: f32,
    /// Effective scale, after animation.
    pub scale: f32,
    pub animation: AnimationKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntrySnapshot {
    pub level: String,
    pub target: String,
    pub message: String,
    pub timestamp_secs: f32,
}

/// Collect a snapshot of `world` without logs.
pub fn build_snapshot(world: &World, time: &Time) -> DiagSnapshot {
    let indicators = world
        .entities()
        .iter()
        .filter(|entity| entity.is_active())
        .filter_map(|entity| {
            let indicator = entity.get::<VoxelIndicator>()?;
            Some(indicator_snapshot(entity.id().raw(), indicator))
        })
        .collect();

    DiagSnapshot {
        fps: time.fps(),
        delta_ms: time.delta_secs() * 1000.0,
        frame_count: time.frame_count(),
        elapsed_secs: time.elapsed_secs(),
        entity_count: world.entity_count(),
        system_timings: world
            .system_timings()
            .iter()
            .map(|t| SystemTimingSnapshot {
                name: t.name.clone(),
                duration_us: t.duration_us,
            })
            .collect(),
        indicators,
        logs: Vec::new(),
    }
}

fn indicator_snapshot(entity: u64, indicator: &VoxelIndicator) -> IndicatorSnapshot {
    let size = indicator.size();
    let voxels = indicator
        .render_data()
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_drawable())
        .map(|(index, v)| VoxelSnapshot {
            index,
            color: v.color,
            brightness: v.effective_brightness(),
            scale: v.effective_scale(),
            animation: v.animation,
        })
        .collect();
    IndicatorSnapshot {
        entity,
        state: indicator.state().name().to_string(),
        pending_state: indicator.pending_state().map(|s| s.name().to_string()),
        width: size.width,
        height: size.height,
        depth: size.depth,
        visible_count: indicator.visible_count(),
        voxels,
        voxels_omitted: false,
    }
}

/// Serialize `snapshot` into at most `limit` bytes, trimming it in place
/// when needed.
///
/// Returns `None` if even the trimmed snapshot does not fit.
pub fn encode_snapshot(snapshot: &mut DiagSnapshot, limit: usize) -> Option<Vec<u8>> {
    loop {
        let json = serde_json::to_vec(snapshot).ok()?;
        if json.len() <= limit {
            return Some(json);
        }
        if !snapshot.logs.is_empty() {
            snapshot.logs.clear();
            continue;
        }
        let largest = snapshot
            .indicators
            .iter_mut()
            .filter(|ind| !ind.voxels.is_empty())
            .max_by_key(|ind| ind.voxels.len())?;
        largest.voxels.clear();
        largest.voxels_omitted = true;
    }
}

// ── DiagSender ───────────────────────────────────────────────────────────

/// Owns the outbound UDP socket and the throttle.
pub struct DiagSender {
    socket: UdpSocket,
    /// `None` until the first send, so the first frame always goes out.
    last_send: Option<Instant>,
    max_datagram: usize,
    sent: u64,
    failed: u64,
}

impl DiagSender {
    /// Sender aimed at [`DEFAULT_TARGET`].
    pub fn new() -> Result<Self, DiagError> {
        Self::with_target(DEFAULT_TARGET)
    }

    /// Sender aimed at `target`. Binds an ephemeral local port.
    pub fn with_target(target: impl ToSocketAddrs) -> Result<Self, DiagError> {
        let socket = UdpSocket::bind("127.0.0.1:0")?;
        socket.connect(target)?;
        socket.set_nonblocking(true)?;
        Ok(Self {
            socket,
            last_send: None,
            max_datagram: MAX_DATAGRAM_BYTES,
            sent: 0,
            failed: 0,
        })
    }

    /// Override the datagram budget (default [`MAX_DATAGRAM_BYTES`]).
    pub fn with_max_datagram(mut self, bytes: usize) -> Self {
        self.max_datagram = bytes;
        self
    }

    /// Number of snapshots the socket accepted.
    pub fn sent(&self) -> u64 {
        self.sent
    }

    /// Number of snapshots that could not be encoded or sent.
    pub fn failed(&self) -> u64 {
        self.failed
    }

    /// Send a snapshot if at least [`SEND_INTERVAL`] passed since the last
    /// one. Returns `true` only if the socket accepted the datagram.
    pub fn send(&mut self, world: &World, time: &Time) -> bool {
        let now = Instant::now();
        if self
            .last_send
            .is_some_and(|last| now.duration_since(last) < SEND_INTERVAL)
        {
            return false;
        }
        self.last_send = Some(now);

        let mut snapshot = build_snapshot(world, time);
        snapshot.logs = drain_captured_logs(LOGS_PER_SNAPSHOT);

        let limit = self.max_datagram;
        let Some(json) = encode_snapshot(&mut snapshot, limit) else {
            self.record_failure(format_args!("snapshot does not fit in {limit} bytes"));
            return false;
        };
        match self.socket.send(&json) {
            Ok(_) => {
                self.sent += 1;
                true
            }
            Err(e) => {
                self.record_failure(format_args!("send failed: {e}"));
                false
            }
        }
    }

    fn record_failure(&mut self, reason: std::fmt::Arguments<'_>) {
        if self.failed == 0 {
            log::warn!("diagnostics: {reason}; further failures are not logged");
        }
        self.failed += 1;
    }
}

// ── Log Capture ──────────────────────────────────────────────────────────

const LOG_RING_CAPACITY: usize = 500;

static LOG_RING: Mutex<VecDeque<LogEntrySnapshot>> = Mutex::new(VecDeque::new());
static LOG_START: OnceLock<Instant> = OnceLock::new();

fn capture(record: &log::Record) {
    let timestamp_secs = LOG_START
        .get()
        .map_or(0.0, |start| start.elapsed().as_secs_f32());
    let entry = LogEntrySnapshot {
        level: record.level().to_string(),
        target: record.target().to_string(),
        message: record.args().to_string(),
        timestamp_secs,
    };
    if let Ok(mut ring) = LOG_RING.lock() {
        if ring.len() >= LOG_RING_CAPACITY {
            ring.pop_front();
        }
        ring.push_back(entry);
    }
}

/// Drain up to `max` captured records, oldest first.
pub fn drain_captured_logs(max: usize) -> Vec<LogEntrySnapshot> {
    let Ok(mut ring) = LOG_RING.lock() else {
        return Vec::new();
    };
    let n = ring.len().min(max);
    ring.drain(..n).collect()
}

/// A logger that captures records to the ring buffer AND delegates to
/// env_logger for stderr output.
struct DiagLogger {
    inner: env_logger::Logger,
}

impl log::Log for DiagLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.inner.enabled(metadata) || metadata.level() <= log::Level::Info
    }

    fn log(&self, record: &log::Record) {
        if self.inner.enabled(record.metadata()) {
            self.inner.log(record);
        }
        if record.level() <= log::Level::Info || self.inner.enabled(record.metadata()) {
            capture(record);
        }
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

static DIAG_LOGGER: OnceLock<DiagLogger> = OnceLock::new();

/// Install the capturing logger. stderr output follows `RUST_LOG`; info and
/// above are always captured.
///
/// Call this early (before any log messages) to capture everything.
pub fn init_logger() {
    LOG_START.get_or_init(Instant::now);

    let inner = env_logger::Builder::new().parse_default_env().build();
    let max_level = inner.filter();
    let logger = DIAG_LOGGER.get_or_init(|| DiagLogger { inner });

    if log::set_logger(logger).is_err() {
        eprintln!("[voxie] Warning: a logger is already set. Log capture disabled.");
        return;
    }
    log::set_max_level(max_level.max(log::LevelFilter::Info));
}
