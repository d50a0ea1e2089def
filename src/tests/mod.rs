//! In-firmware scenario test harness (§8, §10 of the design): a set of
//! scheduler tasks that reproduce the concrete scenarios the design
//! specifies and report PASS/FAIL lines through the logger. Gated behind
//! the `scenario-tests` Cargo feature so a production image doesn't carry
//! it (see `spawn_demo_tasks` in `main.rs` for what a production image
//! spawns instead).
//!
//! `sched_init` runs once per boot, so the policy-specific scenarios can't
//! run side by side in a single image: the priority-preemption scenario
//! needs policy PREEMPT, the rotation scenario needs RR. `test-preempt`
//! and `test-rr` pick which of those two builds this image is; with
//! neither set, the image boots under HYBRID and runs the hybrid-slicing
//! scenario instead. The three policy-agnostic scenarios (sleep accuracy,
//! event delivery, task exit) run in every build.

mod event_delivery;

#[cfg(feature = "test-rr")]
mod round_robin;
#[cfg(not(any(feature = "test-preempt", feature = "test-rr")))]
mod hybrid_slicing;

/// The policy this image's `sched_init` call should use, matching
/// whichever policy-specific scenario was compiled in.
pub const POLICY: crate::config::Policy = crate::config::TEST_POLICY;

/// Spawn every scenario's tasks. Called once from `board_main` in place of
/// `spawn_demo_tasks` when the `scenario-tests` feature is enabled.
pub fn spawn_all() {
    sleep_accuracy::spawn();
    event_delivery::spawn();
    task_exit::spawn();

    #[cfg(feature = "test-preempt")]
    priority_preemption::spawn();
    #[cfg(feature = "test-rr")]
    round_robin::spawn();
    #[cfg(not(any(feature = "test-preempt", feature = "test-rr")))]
    hybrid_slicing::spawn();
}
