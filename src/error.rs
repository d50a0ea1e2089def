//! Scheduler error taxonomy.
//!
//! Recoverable conditions are returned as values, never panicked; see
//! `fatal` for the handful of conditions that genuinely cannot return.

use core::fmt;

/// Value-returning errors from the scheduler's public API.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SchedError {
    /// A null function pointer, null stack pointer, undersized stack, or
    /// out-of-range task id was passed to a scheduler entry point.
    InvalidArgument,
    /// The task table is full.
    NoSlot,
    /// `sched_start` was called without an idle task at tid 0.
    NotReady,
}

impl fmt::Display for SchedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            SchedError::InvalidArgument => "invalid argument",
            SchedError::NoSlot => "task table full",
            SchedError::NotReady => "idle task (tid 0) not created",
        };
        f.write_str(msg)
    }
}

/// Result alias used throughout the scheduler's public API.
pub type SchedResult<T> = Result<T, SchedError>;

/// Log a diagnostic and halt the hart. Used for conditions §7 of the
/// scheduler's design classifies as fatal: an unrecognised trap cause, or a
/// precondition violation with no caller to report an error to.
pub fn fatal(msg: &str) -> ! {
    log::error!("fatal: {}", msg);
    crate::arch::riscv32::halt()
}
