//! Compile-time configuration for the scheduler and the firmware around it.
//!
//! Collected in one place so call sites never hardcode these values inline,
//! matching the reference kernel's convention of a single configuration
//! surface rather than constants scattered across modules.

/// Maximum number of task slots. Capped at 32 so a single `u32` ready mask
/// can index every task id.
pub const MAX_TASKS: usize = 16;

/// Minimum stack size, in 32-bit words, `task_create` will accept. Must hold
/// a full `TrapFrame` plus a small safety margin.
pub const MIN_STACK_WORDS: usize = 64;

/// Number of distinct priority levels. Priority 0 is highest.
pub const MAX_PRIO: usize = 8;

/// Default CLINT reload interval, in `mtime` cycles, between scheduler
/// ticks. The QEMU `virt` machine's CLINT runs `mtime` at 10 MHz, so this
/// is a 10 ms tick.
pub const DEFAULT_TICK_CYCLES: u64 = 100_000;

/// The hart this firmware is built to run on. `sched_init` checks `mhartid`
/// against this and refuses to run on any other hart (see DESIGN.md).
pub const BOOT_HART: usize = 0;

/// CLINT base address on the QEMU `virt` machine.
pub const CLINT_BASE: usize = 0x0200_0000;

/// 16550 UART base address on the QEMU `virt` machine.
pub const UART0_BASE: usize = 0x1000_0000;

/// Scheduling policy selectable at `sched_init` time.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Policy {
    /// Strict round-robin: all tasks run at priority 0 regardless of the
    /// priority they were created with.
    RoundRobin,
    /// Strict priority: the highest-priority ready task always runs;
    /// ties within a priority break by ascending tid.
    Preempt,
    /// Priority-ordered, round-robin within the winning priority level.
    Hybrid,
}

/// Policy the `scenario-tests` harness boots under. `sched_init` runs once
/// per image, so the policy-specific scenarios (priority preemption needs
/// PREEMPT, rotation needs RR) are picked by Cargo feature rather than run
/// side by side; see `src/tests/mod.rs`.
#[cfg(feature = "test-preempt")]
pub const TEST_POLICY: Policy = Policy::Preempt;
#[cfg(all(feature = "test-rr", not(feature = "test-preempt")))]
pub const TEST_POLICY: Policy = Policy::RoundRobin;
#[cfg(all(
    feature = "scenario-tests",
    not(feature = "test-preempt"),
    not(feature = "test-rr")
))]
pub const TEST_POLICY: Policy = Policy::Hybrid;
