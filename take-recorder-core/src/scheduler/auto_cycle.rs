use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::models::error::RecorderError;
use crate::models::state::{CyclePhase, SchedulerState};
use crate::models::status::StatusEvent;
use crate::session::recording::RecordingSession;
use crate::traits::control_inputs::ControlInputs;
use crate::traits::status_sink::StatusSink;

/// Default countdown tick.
pub const DEFAULT_TICK: Duration = Duration::from_secs(1);

/// Cancellation is checked this many times per tick.
const SLICES_PER_TICK: u32 = 10;

/// Parsed auto-mode timing, in ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleTiming {
    pub wait_secs: u64,
    pub record_secs: u64,
}

impl CycleTiming {
    /// Parse the raw wait/record inputs. Both must be positive whole numbers.
    pub fn parse(wait: &str, record: &str) -> Result<Self, RecorderError> {
        Ok(Self {
            wait_secs: parse_seconds("wait time", wait)?,
            record_secs: parse_seconds("record time", record)?,
        })
    }
}

fn parse_seconds(label: &str, text: &str) -> Result<u64, RecorderError> {
    match text.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(RecorderError::InvalidSchedule(format!(
            "{} must be a positive whole number of seconds, got {:?}",
            label, text
        ))),
    }
}

/// State shared between the scheduler handle and its loop thread.
struct SchedulerShared {
    state: Mutex<SchedulerState>,
    cancel: AtomicBool,
    completed_cycles: AtomicU64,
}

/// Repeats wait → record → save cycles on a background thread until disabled.
///
/// The loop holds only a `Weak` reference to the session: it drives the
/// session but never keeps it alive. Timing and tags are read from
/// `ControlInputs` at the start of every cycle and at every stop.
pub struct AutoCycleScheduler {
    session: Weak<RecordingSession>,
    inputs: Arc<dyn ControlInputs>,
    sink: Arc<dyn StatusSink>,
    tick: Duration,
    shared: Arc<SchedulerShared>,
    handle: Mutex<Option<thread::JoinHandle<()>>>,
}

impl AutoCycleScheduler {
    /// Scheduler that reports through the session's status sink.
    pub fn new(session: &Arc<RecordingSession>, inputs: Arc<dyn ControlInputs>) -> Self {
        Self {
            session: Arc::downgrade(session),
            sink: session.status_sink(),
            inputs,
            tick: DEFAULT_TICK,
            shared: Arc::new(SchedulerShared {
                state: Mutex::new(SchedulerState::Stopped),
                cancel: AtomicBool::new(false),
                completed_cycles: AtomicU64::new(0),
            }),
            handle: Mutex::new(None),
        }
    }

    /// Use `tick` as the length of one countdown second.
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    pub fn state(&self) -> SchedulerState {
        *self.shared.state.lock()
    }

    pub fn is_running(&self) -> bool {
        self.state().is_running()
    }

    /// Number of cycles that ran their record countdown to the end.
    pub fn completed_cycles(&self) -> u64 {
        self.shared.completed_cycles.load(Ordering::SeqCst)
    }

    /// Start auto mode. Transitions: stopped → running.
    ///
    /// A no-op while already running. If a previous loop is still winding
    /// down after `disable()`, waits for it first.
    pub fn enable(&self) -> Result<(), RecorderError> {
        let mut handle = self.handle.lock();

        if self.shared.cancel.load(Ordering::SeqCst) {
            if let Some(previous) = handle.take() {
                let _ = previous.join();
            }
        }

        {
            let mut state = self.shared.state.lock();
            if state.is_running() {
                return Ok(());
            }
            *state = SchedulerState::Running;
        }
        self.shared.cancel.store(false, Ordering::SeqCst);

        if let Some(finished) = handle.take() {
            let _ = finished.join();
        }

        let worker = CycleWorker {
            session: self.session.clone(),
            inputs: Arc::clone(&self.inputs),
            sink: Arc::clone(&self.sink),
            tick: self.tick,
            shared: Arc::clone(&self.shared),
        };

        log::info!("Auto mode enabled (tick {:?})", self.tick);
        self.sink.on_scheduler_state_changed(SchedulerState::Running);
        self.sink.on_status(&StatusEvent::info("Auto mode started"));

        let spawned = thread::Builder::new()
            .name("auto-cycle".into())
            .spawn(move || worker.run());

        match spawned {
            Ok(join) => {
                *handle = Some(join);
                Ok(())
            }
            Err(e) => {
                *self.shared.state.lock() = SchedulerState::Stopped;
                self.sink.on_scheduler_state_changed(SchedulerState::Stopped);
                Err(RecorderError::ConfigurationFailed(format!(
                    "failed to spawn auto-cycle thread: {}",
                    e
                )))
            }
        }
    }

    /// Ask the loop to stop. Returns immediately.
    ///
    /// A take the loop is recording at that moment is discarded, even if its
    /// countdown has already run out. The loop notices within a fraction of
    /// a tick and starts no new cycle.
    pub fn disable(&self) {
        if !self.is_running() {
            return;
        }
        log::info!("Auto mode disable requested");
        self.shared.cancel.store(true, Ordering::SeqCst);

        // Manual toggles are refused while auto mode runs, so a take in
        // progress belongs to the loop.
        if let Some(session) = self.session.upgrade() {
            if !session.state().is_idle() {
                session.discard();
            }
        }
    }

    /// `disable()` and wait for the loop thread to exit.
    pub fn shutdown(&self) {
        self.disable();
        if let Some(handle) = self.handle.lock().take() {
            if handle.join().is_err() {
                log::error!("Auto-cycle thread panicked");
            }
        }
    }

    /// Poll until the scheduler reports `Stopped` or `timeout` passes.
    pub fn wait_stopped(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.is_running() {
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(Duration::from_millis(2));
        }
        true
    }
}

impl Drop for AutoCycleScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// The loop body, moved onto the `auto-cycle` thread.
struct CycleWorker {
    session: Weak<RecordingSession>,
    inputs: Arc<dyn ControlInputs>,
    sink: Arc<dyn StatusSink>,
    tick: Duration,
    shared: Arc<SchedulerShared>,
}

impl CycleWorker {
    fn run(self) {
        while !self.cancelled() {
            if !self.run_cycle() {
                break;
            }
            self.shared.completed_cycles.fetch_add(1, Ordering::SeqCst);
        }

        *self.shared.state.lock() = SchedulerState::Stopped;
        log::info!("Auto mode stopped");
        self.sink.on_scheduler_state_changed(SchedulerState::Stopped);
        self.sink.on_status(&StatusEvent::info("Auto mode stopped"));
    }

    /// One wait → record → save cycle. Returns false when the loop must end.
    fn run_cycle(&self) -> bool {
        let timing = match CycleTiming::parse(&self.inputs.wait_seconds(), &self.inputs.record_seconds()) {
            Ok(timing) => timing,
            Err(e) => {
                log::error!("Auto mode stopped: {}", e);
                self.sink.on_status(&StatusEvent::error(e.to_string()));
                return false;
            }
        };

        if !self.countdown(CyclePhase::Waiting, timing.wait_secs) {
            return false;
        }

        let Some(session) = self.session.upgrade() else {
            log::warn!("Recording session dropped; auto mode exiting");
            return false;
        };

        // The session reports its own start failures.
        if session.start(&self.inputs.device_id()).is_err() {
            return false;
        }

        let completed = self.countdown(CyclePhase::Recording, timing.record_secs);
        let tags = self.inputs.tags();
        // Cut off by disable(): not a deliberate take.
        let cut_off = !completed || self.cancelled();
        if cut_off {
            session.discard();
        }
        session.stop(&tags);

        !cut_off
    }

    /// Count down from `secs` to 1, one tick each. False if cancelled.
    fn countdown(&self, phase: CyclePhase, secs: u64) -> bool {
        for remaining in (1..=secs).rev() {
            if self.cancelled() {
                return false;
            }
            self.sink.on_countdown(phase, remaining);
            self.sink
                .on_status(&StatusEvent::info(format!("{}: {}s", phase, remaining)));
            if !self.sleep_tick() {
                return false;
            }
        }
        !self.cancelled()
    }

    fn sleep_tick(&self) -> bool {
        let slice = (self.tick / SLICES_PER_TICK).max(Duration::from_millis(1));
        let deadline = Instant::now() + self.tick;
        loop {
            if self.cancelled() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            thread::sleep(slice.min(deadline - now));
        }
    }

    fn cancelled(&self) -> bool {
        self.shared.cancel.load(Ordering::SeqCst)
    }
}
