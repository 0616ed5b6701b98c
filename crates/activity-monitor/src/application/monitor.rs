//! ActivityMonitor: the monitor loop state machine.
//!
//! ```text
//! Initializing ──start()──► Running ──shutdown flag──► Draining ──► Terminated
//! ```
//!
//! Each Running cycle:
//!
//! 1. Waits (bounded by the poll timeout) for any device handle to become
//!    readable.
//! 2. Drains every ready handle one 24-byte record at a time until a
//!    would-block or short read.
//! 3. Applies the counting policy to each record, touching the activity
//!    files immediately for qualifying events.
//! 4. Publishes the counters if a publish interval has passed, whether or not
//!    anything was read.
//!
//! # Architecture
//!
//! The monitor depends only on the [`InputDevices`] and [`StateSink`] traits.
//! The infrastructure layer supplies the `poll(2)`-backed device registry and
//! the state-file writer; tests supply scripted fakes.  The monitor owns the
//! counters outright, so there is no shared mutable state to lock.

use std::collections::HashSet;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use activity_core::{apply, decode, ActivitySignal, CounterState, DeviceClass, EVENT_SIZE};
use tracing::{debug, info};

use crate::application::errors::{report, PublishError, RecoverableError};

/// Index of an open handle inside an [`InputDevices`] implementation.
pub type HandleId = usize;

/// A handle reported ready by [`InputDevices::poll_ready`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadyHandle {
    pub id: HandleId,
    pub class: DeviceClass,
}

/// The set of open device handles, as seen by the monitor.
pub trait InputDevices {
    /// Waits at most `timeout` and returns the handles that can be read
    /// without blocking (or that have a pending error).  An empty vector means
    /// the wait timed out.
    fn poll_ready(&mut self, timeout: Duration) -> io::Result<Vec<ReadyHandle>>;

    /// Reads from handle `id` into `buf`, with `read(2)` semantics: `Ok(n)`
    /// with `n < buf.len()` is a short read, `ErrorKind::WouldBlock` means
    /// nothing is available right now.
    fn read(&mut self, id: HandleId, buf: &mut [u8]) -> io::Result<usize>;

    /// Device path of handle `id`, for diagnostics.
    fn path(&self, id: HandleId) -> Option<&Path>;

    /// Releases every handle.  Must not fail; close errors are swallowed.
    fn close_all(&mut self);
}

/// Destination for the published counters and activity signal.
#[cfg_attr(test, mockall::automock)]
pub trait StateSink {
    /// Writes all four values.
    fn publish(
        &mut self,
        counters: &CounterState,
        activity: &ActivitySignal,
    ) -> Result<(), PublishError>;

    /// Writes the last-activity timestamp and resets the idle marker to zero.
    fn touch_activity(&mut self, now_millis: u64) -> Result<(), PublishError>;
}

/// Timing knobs for the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorSettings {
    /// Minimum time between counter publishes.
    pub publish_interval: Duration,
    /// Upper bound on a single readiness wait.
    pub poll_timeout: Duration,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            publish_interval: Duration::from_secs(1),
            poll_timeout: Duration::from_secs(1),
        }
    }
}

/// Lifecycle state of the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Initializing,
    Running,
    Draining,
    Terminated,
}

/// What happened during one Running cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Handles the readiness wait reported.
    pub ready_handles: usize,
    /// Complete records decoded.
    pub records: usize,
    /// Records that changed a counter or touched activity.
    pub qualifying: usize,
    /// Reads that failed with something other than would-block.
    pub read_failures: usize,
    /// Reads that returned zero bytes (end of file, e.g. a hung-up FIFO).
    pub eof_reads: usize,
    /// Whether the counters were published at the end of the cycle.
    pub published: bool,
}

/// The monitor loop.  Owns the device handles, the counters, and the sink.
pub struct ActivityMonitor<D, S> {
    devices: D,
    sink: S,
    settings: MonitorSettings,
    counters: CounterState,
    activity: ActivitySignal,
    state: MonitorState,
    last_publish: Instant,
    /// Handles whose last read failed; further failures are logged quietly.
    failing: HashSet<HandleId>,
    buf: [u8; EVENT_SIZE],
}

impl<D: InputDevices, S: StateSink> ActivityMonitor<D, S> {
    /// Creates a monitor in the `Initializing` state.
    pub fn new(devices: D, sink: S, settings: MonitorSettings) -> Self {
        Self {
            devices,
            sink,
            settings,
            counters: CounterState::new(),
            activity: ActivitySignal::default(),
            state: MonitorState::Initializing,
            last_publish: Instant::now(),
            failing: HashSet::new(),
            buf: [0u8; EVENT_SIZE],
        }
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    pub fn counters(&self) -> CounterState {
        self.counters
    }

    pub fn activity(&self) -> ActivitySignal {
        self.activity
    }

    /// Zeroes the counters, publishes them with a fresh activity touch, and
    /// enters `Running`.
    pub fn start(&mut self) {
        self.counters = CounterState::new();
        let now = epoch_millis();
        self.activity = ActivitySignal::touched_at(now);
        self.publish();
        self.touch(now);
        self.state = MonitorState::Running;
        info!("monitoring input events");
    }

    /// Runs cycles until `running` is cleared, then shuts down.
    pub fn run(&mut self, running: &AtomicBool) {
        if self.state == MonitorState::Initializing {
            self.start();
        }
        while running.load(Ordering::Relaxed) {
            self.run_cycle();
        }
        info!("stopping input monitor");
        self.shutdown();
    }

    /// Runs one wait/drain/publish cycle.
    pub fn run_cycle(&mut self) -> CycleReport {
        if self.state == MonitorState::Initializing {
            self.start();
        }
        let mut cycle = CycleReport::default();
        if self.state != MonitorState::Running {
            return cycle;
        }

        let ready = match self.devices.poll_ready(self.settings.poll_timeout) {
            Ok(ready) => ready,
            Err(e) => {
                report(&RecoverableError::PollFailed(e));
                std::thread::sleep(self.settings.poll_timeout);
                Vec::new()
            }
        };
        cycle.ready_handles = ready.len();

        for handle in ready {
            self.drain(handle, &mut cycle);
        }

        // A hung-up device stays "ready" forever; don't let it spin the loop.
        if cycle.read_failures + cycle.eof_reads > 0 && cycle.records == 0 {
            std::thread::sleep(self.settings.poll_timeout);
        }

        if self.last_publish.elapsed() >= self.settings.publish_interval {
            self.publish();
            cycle.published = true;
        }
        cycle
    }

    /// Draining then Terminated: one last publish, then every handle is closed.
    pub fn shutdown(&mut self) {
        if self.state == MonitorState::Terminated {
            return;
        }
        self.state = MonitorState::Draining;
        self.publish();
        self.devices.close_all();
        self.state = MonitorState::Terminated;
        debug!(
            keyboard = self.counters.keyboard_count,
            pointer = self.counters.pointer_count,
            "monitor terminated"
        );
    }

    /// Consumes the monitor, returning the device set and the sink.
    pub fn into_parts(self) -> (D, S) {
        (self.devices, self.sink)
    }

    fn drain(&mut self, handle: ReadyHandle, cycle: &mut CycleReport) {
        loop {
            match self.devices.read(handle.id, &mut self.buf) {
                Ok(n) if n == EVENT_SIZE => {
                    self.failing.remove(&handle.id);
                    let event = decode(&self.buf);
                    cycle.records += 1;

                    let delta = apply(handle.class, &event);
                    if delta.is_qualifying() {
                        self.counters.accumulate(delta);
                        self.touch(epoch_millis());
                        cycle.qualifying += 1;
                    }
                }
                Ok(0) => {
                    cycle.eof_reads += 1;
                    break;
                }
                // Short read: no complete record available.
                Ok(_) => break,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    self.failing.remove(&handle.id);
                    break;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(source) => {
                    cycle.read_failures += 1;
                    let err = RecoverableError::ReadFailed {
                        path: self
                            .devices
                            .path(handle.id)
                            .map(Path::to_path_buf)
                            .unwrap_or_default(),
                        source,
                    };
                    if self.failing.insert(handle.id) {
                        report(&err);
                    } else {
                        debug!("{err}");
                    }
                    break;
                }
            }
        }
    }

    fn touch(&mut self, now_millis: u64) {
        self.activity = ActivitySignal::touched_at(now_millis);
        if let Err(e) = self.sink.touch_activity(now_millis) {
            report(&RecoverableError::from(e));
        }
    }

    fn publish(&mut self) {
        if let Err(e) = self.sink.publish(&self.counters, &self.activity) {
            report(&RecoverableError::from(e));
        }
        self.last_publish = Instant::now();
    }
}

/// Milliseconds since the Unix epoch from the wall clock.
pub fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

// ── Tests ─────────────────────────────────────────────────────────────────────
