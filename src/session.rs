//! # session
//!
//! A running board. The 555 and the counters live in shared state; a
//! background "motor" thread burns real time in the 555 and clocks the
//! counters once per full period, while whoever owns the `Session` (the UI)
//! reads snapshots and pushes buttons from its own thread.
//!
//!   STOPPED <-- shutdown -- IDLE <-- power --> ACTIVE
//!                 ^                              |
//!                 `---------- shutdown ----------'
//!
//! * IDLE: running, unpowered. The motor naps for `PARK_INTERVAL` at a time
//!   and touches nothing.
//! * ACTIVE: running, powered. HIGH half, LOW half, then lamps and digits
//!   step together under the board lock. With the digits switched to the
//!   external clock only the lamps step; the digits wait for `pulse`.
//! * STOPPED: terminal. The motor notices within one nap (or one slice of a
//!   555 half-cycle, which is no longer) and exits; `shutdown` joins it.
//!
//! Cutting the power mid half-cycle abandons it: the 555 output freezes at
//! whatever level it had and nothing is clocked.
//!
//! The lock covers the counters only. The 555's level and its derived
//! timings are read without it.
use crate::board::{Board, CounterSnapshot};
use crate::config::BoardConfig;
use crate::error::BoardError;
use crate::timer::TimingSource;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// how long the motor sleeps between looks at the flags when it has
/// nothing to clock
pub const PARK_INTERVAL: Duration = Duration::from_millis(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Stopped,
    Idle,
    Active,
}

/// where the digit chain's clock comes from: the 555, or the external clock
/// input (driven by `Session::pulse`). The lamps always run off the 555.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockSource {
    Internal,
    External,
}

struct Shared {
    timer: TimingSource,
    board: Mutex<Board>,
    running: AtomicBool,
    powered: AtomicBool,
    external: AtomicBool,
    cycles: AtomicU64,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Board> {
        // every mutation under the lock is total, so a panicking holder
        // can't have left the board half-updated
        self.board.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn live(&self) -> bool {
        self.running.load(Ordering::Acquire) && self.powered.load(Ordering::Acquire)
    }

    /// one full 555 period has gone by
    fn timer_edge(&self) {
        let mut board = self.lock();
        if self.external.load(Ordering::Acquire) {
            board.clock_lamps();
        } else {
            board.clock();
        }
        self.cycles.fetch_add(1, Ordering::Release);
    }

    fn external_edge(&self) {
        let mut board = self.lock();
        board.clock_digits();
        self.cycles.fetch_add(1, Ordering::Release);
    }
}

pub struct Session {
    shared: Arc<Shared>,
    motor: Mutex<Option<JoinHandle<()>>>,
}

impl Session {
    /// build the chips and start the motor, unpowered. Nothing is spawned
    /// if the configuration is bad.
    pub fn start(config: &BoardConfig) -> Result<Session, BoardError> {
        config.validate()?;
        let timer = TimingSource::new(config.r1, config.r2, config.c)?;
        let board = Board::new(config.ring_span, config.digits)?;
        info!(
            ring_span = config.ring_span,
            digits = config.digits,
            frequency_hz = timer.frequency(),
            period_s = timer.period(),
            "board assembled"
        );

        let shared = Arc::new(Shared {
            timer,
            board: Mutex::new(board),
            running: AtomicBool::new(true),
            powered: AtomicBool::new(false),
            external: AtomicBool::new(false),
            cycles: AtomicU64::new(0),
        });
        let motor = {
            let shared = Arc::clone(&shared);
            thread::spawn(move || run(&shared))
        };
        Ok(Session {
            shared,
            motor: Mutex::new(Some(motor)),
        })
    }

    /// all counters at one instant; waits at most one board step for the lock
    pub fn snapshot(&self) -> CounterSnapshot {
        self.shared.lock().snapshot()
    }

    /// as `snapshot`, but never waits: `None` if the motor holds the lock
    /// right now
    pub fn try_snapshot(&self) -> Option<CounterSnapshot> {
        match self.shared.board.try_lock() {
            Ok(board) => Some(board.snapshot()),
            Err(TryLockError::Poisoned(p)) => Some(p.into_inner().snapshot()),
            Err(TryLockError::WouldBlock) => None,
        }
    }

    pub fn clock_level(&self) -> bool {
        self.shared.timer.is_high()
    }

    pub fn frequency_hz(&self) -> f64 {
        self.shared.timer.frequency()
    }

    pub fn period_seconds(&self) -> f64 {
        self.shared.timer.period()
    }

    /// clock edges the counters have taken since start, from the 555 or the
    /// external input; reset doesn't clear it
    pub fn cycles(&self) -> u64 {
        self.shared.cycles.load(Ordering::Acquire)
    }

    pub fn state(&self) -> LoopState {
        if !self.is_running() {
            LoopState::Stopped
        } else if self.is_powered() {
            LoopState::Active
        } else {
            LoopState::Idle
        }
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    pub fn is_powered(&self) -> bool {
        self.shared.powered.load(Ordering::Acquire)
    }

    pub fn clock_source(&self) -> ClockSource {
        if self.shared.external.load(Ordering::Acquire) {
            ClockSource::External
        } else {
            ClockSource::Internal
        }
    }

    pub fn toggle_power(&self) {
        if self.ignored("toggle_power") {
            return;
        }
        let was = self.shared.powered.fetch_xor(true, Ordering::AcqRel);
        info!(powered = !was, "power switched");
    }

    /// the reset button: lamps back to the top, digits to zero
    pub fn reset(&self) {
        if self.ignored("reset") {
            return;
        }
        self.shared.lock().reset();
        debug!("board reset");
    }

    /// the "reset display" button: digits only
    pub fn reset_digits(&self) {
        if self.ignored("reset_digits") {
            return;
        }
        self.shared.lock().reset_digits();
        debug!("display reset");
    }

    pub fn toggle_clock_source(&self) {
        if self.ignored("toggle_clock_source") {
            return;
        }
        let was_external = self.shared.external.fetch_xor(true, Ordering::AcqRel);
        let now = if was_external {
            ClockSource::Internal
        } else {
            ClockSource::External
        };
        info!(source = ?now, "clock source switched");
    }

    /// one edge on the external clock input, which only reaches the digit
    /// chain. Only does anything while the board is powered and switched to
    /// the external clock; says whether the digits stepped.
    pub fn pulse(&self) -> bool {
        if self.ignored("pulse") {
            return false;
        }
        if !self.is_powered() || self.clock_source() != ClockSource::External {
            debug!("external pulse with nothing listening");
            return false;
        }
        self.shared.external_edge();
        true
    }

    /// stop the motor and wait for it. Safe to call again; later calls
    /// have nothing left to do.
    pub fn shutdown(&self) {
        self.shared.running.store(false, Ordering::Release);
        let handle = self
            .motor
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                error!("motor thread panicked");
            }
            info!(cycles = self.cycles(), "session shut down");
        }
    }

    /// true once the motor thread has exited
    pub fn is_finished(&self) -> bool {
        self.motor
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map_or(true, |h| h.is_finished())
    }

    fn ignored(&self, command: &str) -> bool {
        if self.is_running() {
            false
        } else {
            warn!(command, "command after shutdown ignored");
            true
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// the motor: runs until `running` drops
fn run(shared: &Shared) {
    debug!("motor started");
    while shared.running.load(Ordering::Acquire) {
        if !shared.live() {
            thread::sleep(PARK_INTERVAL);
            continue;
        }

        // HIGH then LOW is one period, and one period is one clock edge
        let live = || shared.live();
        let finished = shared.timer.advance_half_cycle_while(live, PARK_INTERVAL)
            && shared.timer.advance_half_cycle_while(live, PARK_INTERVAL);

        // power cut or shutdown part way through: the edge never came
        if finished && shared.live() {
            shared.timer_edge();
        }
    }
    debug!("motor stopped");
}
