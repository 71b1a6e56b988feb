//! # applejuice
//!
//! Simulator for the Apple Juice learning board: an NE555 in astable mode
//! clocking a CD4017 lamp chaser and a chain of CD4026 seven-segment
//! counters.
//!
//! ## Design
//!
//! * chips are plain structs behind a small `Chip` trait; no chip knows
//!   about threads
//! * the 555 really sleeps for t_high / t_low, so the lamps move at the
//!   speed the real board would
//! * one background thread (the motor) owns the clocking; the front panel
//!   runs on the caller's thread and only reads snapshots and presses
//!   buttons
//! * abstract display and input so the panel can be a full-screen TUI, a
//!   line printer, or a test stub
//!
//! Model
//!
//! Session
//!  |-- TimingSource (555)                 -- lock-free level + timings
//!  |-- Mutex<Board>
//!  |    |-- RingCounter (4017)
//!  |    `-- CounterChain (4026 x N)       -- lead digit first
//!  `-- motor thread
//!       |-- while running:
//!       |     if !powered: nap, continue
//!       |     HIGH half-cycle; LOW half-cycle
//!       |     lock; ring.advance(); chain ripple; unlock
//!       `-- exits within one nap of shutdown
pub mod board;
pub mod chip;
pub mod config;
pub mod decade;
pub mod display;
pub mod error;
pub mod input;
pub mod panel;
pub mod ring;
pub mod session;
pub mod timer;

pub use board::{Board, CounterSnapshot, DigitState};
pub use config::BoardConfig;
pub use error::BoardError;
pub use session::{ClockSource, LoopState, Session};
