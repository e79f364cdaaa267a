//! Shared-memory run monitoring counters.
//!
//! One `RunInfo` segment exists per producer process. The owner resets the
//! counters at begin-of-run, increments them while the run is taken, and
//! raises the readiness flag once its setup is complete. Monitor processes
//! attach read-only and take snapshots; they must not base control
//! decisions on the values, only display them.

use crate::arena::ShmArena;
use crate::error::{RingError, RingResult};
use crate::platform::current_pid;
use daq::consts::CACHE_LINE_SIZE;
use static_assertions::const_assert_eq;
use std::path::Path;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use tracing::info;

/// Magic value identifying a run-info segment: `"DAQRNFO\0"`.
pub const RUNINFO_MAGIC: u64 = u64::from_le_bytes(*b"DAQRNFO\0");

/// Fixed shared layout: one cache line of counters.
#[repr(C, align(64))]
struct RunInfoLayout {
    magic: u64,
    exp: AtomicU32,
    run: AtomicU32,
    input_count: AtomicU64,
    input_bytes: AtomicU64,
    output_count: AtomicU64,
    output_bytes: AtomicU64,
    ready: AtomicU32,
    writer_pid: AtomicU32,
}

const_assert_eq!(std::mem::size_of::<RunInfoLayout>(), CACHE_LINE_SIZE);
const_assert_eq!(std::mem::align_of::<RunInfoLayout>(), CACHE_LINE_SIZE);

fn segment_file_name(name: &str) -> String {
    format!("daq_{name}.run")
}

/// A point-in-time copy of the run-info fields.
///
/// Fields are read individually without locking; the snapshot may mix
/// values from two adjacent updates. That is fine for monitoring and the
/// reason these values must never drive control decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunInfoSnapshot {
    /// Experiment number.
    pub exp: u32,
    /// Run number.
    pub run: u32,
    /// Records received from upstream.
    pub input_count: u64,
    /// Bytes received from upstream.
    pub input_bytes: u64,
    /// Records delivered downstream.
    pub output_count: u64,
    /// Bytes delivered downstream.
    pub output_bytes: u64,
    /// Whether the producer finished its setup.
    pub ready: bool,
}

/// Owning handle to a run-info segment.
///
/// Created once per producer process at startup; the segment is unlinked
/// when this handle drops (producer exit).
pub struct RunInfo {
    arena: ShmArena,
}

impl RunInfo {
    /// Create the run-info segment for this producer process.
    pub fn create(dir: &Path, name: &str) -> RingResult<Self> {
        let mut arena = ShmArena::create(
            dir,
            name,
            &segment_file_name(name),
            std::mem::size_of::<RunInfoLayout>(),
            0,
        )?;

        unsafe {
            std::ptr::write(
                arena.header_ptr_mut() as *mut RunInfoLayout,
                RunInfoLayout {
                    magic: RUNINFO_MAGIC,
                    exp: AtomicU32::new(0),
                    run: AtomicU32::new(0),
                    input_count: AtomicU64::new(0),
                    input_bytes: AtomicU64::new(0),
                    output_count: AtomicU64::new(0),
                    output_bytes: AtomicU64::new(0),
                    ready: AtomicU32::new(0),
                    writer_pid: AtomicU32::new(current_pid()),
                },
            );
        }

        info!(segment = name, "run-info segment created");
        Ok(Self { arena })
    }

    fn layout(&self) -> &RunInfoLayout {
        unsafe { &*(self.arena.header_ptr() as *const RunInfoLayout) }
    }

    /// Segment name.
    pub fn name(&self) -> &str {
        self.arena.name()
    }

    /// Begin-of-run: store the run identity and reset all counters.
    ///
    /// This is the only point where counters decrease; it never happens
    /// mid-run.
    pub fn begin_run(&mut self, exp: u32, run: u32) {
        let layout = self.layout();
        layout.exp.store(exp, Ordering::Release);
        layout.run.store(run, Ordering::Release);
        layout.input_count.store(0, Ordering::Release);
        layout.input_bytes.store(0, Ordering::Release);
        layout.output_count.store(0, Ordering::Release);
        layout.output_bytes.store(0, Ordering::Release);
        info!(segment = self.arena.name(), exp, run, "run counters reset");
    }

    /// Raise the readiness flag once producer setup is complete.
    ///
    /// Consumers must not rely on the counters before observing this flag.
    pub fn report_ready(&mut self) {
        self.layout().ready.store(1, Ordering::Release);
    }

    /// Add received records.
    pub fn add_input_count(&self, n: u64) {
        self.layout().input_count.fetch_add(n, Ordering::Relaxed);
    }

    /// Add received bytes.
    pub fn add_input_bytes(&self, n: u64) {
        self.layout().input_bytes.fetch_add(n, Ordering::Relaxed);
    }

    /// Add delivered records.
    pub fn add_output_count(&self, n: u64) {
        self.layout().output_count.fetch_add(n, Ordering::Relaxed);
    }

    /// Add delivered bytes.
    pub fn add_output_bytes(&self, n: u64) {
        self.layout().output_bytes.fetch_add(n, Ordering::Relaxed);
    }

    /// Current values as seen by the owner.
    pub fn snapshot(&self) -> RunInfoSnapshot {
        snapshot_of(self.layout())
    }
}

/// Read-only monitor handle to another process's run-info segment.
pub struct RunInfoReader {
    arena: ShmArena,
}

impl RunInfoReader {
    /// Attach to an existing run-info segment.
    pub fn attach(dir: &Path, name: &str) -> RingResult<Self> {
        let arena = ShmArena::attach(
            dir,
            name,
            &segment_file_name(name),
            std::mem::size_of::<RunInfoLayout>(),
        )?;

        let layout = unsafe { &*(arena.header_ptr() as *const RunInfoLayout) };
        if layout.magic != RUNINFO_MAGIC {
            return Err(RingError::BadSegment {
                name: name.to_string(),
            });
        }

        Ok(Self { arena })
    }

    fn layout(&self) -> &RunInfoLayout {
        unsafe { &*(self.arena.header_ptr() as *const RunInfoLayout) }
    }

    /// Whether the producer has reported readiness.
    pub fn is_ready(&self) -> bool {
        self.layout().ready.load(Ordering::Acquire) != 0
    }

    /// Take a monitoring snapshot of all fields.
    pub fn snapshot(&self) -> RunInfoSnapshot {
        snapshot_of(self.layout())
    }
}

fn snapshot_of(layout: &RunInfoLayout) -> RunInfoSnapshot {
    RunInfoSnapshot {
        exp: layout.exp.load(Ordering::Acquire),
        run: layout.run.load(Ordering::Acquire),
        input_count: layout.input_count.load(Ordering::Relaxed),
        input_bytes: layout.input_bytes.load(Ordering::Relaxed),
        output_count: layout.output_count.load(Ordering::Relaxed),
        output_bytes: layout.output_bytes.load(Ordering::Relaxed),
        ready: layout.ready.load(Ordering::Acquire) != 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_and_reset_only_at_begin_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut info = RunInfo::create(dir.path(), "ro01").unwrap();

        info.begin_run(12, 3400);
        info.add_input_count(3);
        info.add_input_bytes(1024);
        info.add_output_count(2);
        info.add_output_bytes(768);

        let snap = info.snapshot();
        assert_eq!(snap.exp, 12);
        assert_eq!(snap.run, 3400);
        assert_eq!(snap.input_count, 3);
        assert_eq!(snap.input_bytes, 1024);
        assert_eq!(snap.output_count, 2);
        assert_eq!(snap.output_bytes, 768);

        info.begin_run(12, 3401);
        let snap = info.snapshot();
        assert_eq!(snap.run, 3401);
        assert_eq!(snap.input_count, 0);
        assert_eq!(snap.output_bytes, 0);
    }

    #[test]
    fn monitor_observes_readiness_and_counters() {
        let dir = tempfile::tempdir().unwrap();
        let mut info = RunInfo::create(dir.path(), "ro02").unwrap();
        let reader = RunInfoReader::attach(dir.path(), "ro02").unwrap();

        assert!(!reader.is_ready());
        info.begin_run(1, 1);
        info.report_ready();
        assert!(reader.is_ready());

        let mut last = 0;
        for step in 1..=10 {
            info.add_output_count(step);
            let seen = reader.snapshot().output_count;
            // Monotonically non-decreasing from the monitor's view.
            assert!(seen >= last);
            last = seen;
        }
        assert_eq!(last, (1..=10u64).sum::<u64>());
    }

    #[test]
    fn segment_removed_on_producer_exit() {
        let dir = tempfile::tempdir().unwrap();
        {
            let _info = RunInfo::create(dir.path(), "ro03").unwrap();
            assert!(dir.path().join("daq_ro03.run").exists());
        }
        assert!(!dir.path().join("daq_ro03.run").exists());
    }

    #[test]
    fn attach_requires_valid_magic() {
        let dir = tempfile::tempdir().unwrap();
        let _arena = ShmArena::create(dir.path(), "bad", "daq_bad.run", 64, 0).unwrap();
        assert!(matches!(
            RunInfoReader::attach(dir.path(), "bad"),
            Err(RingError::BadSegment { .. })
        ));
    }
}
