//! The scheduler core: task table, ready-set bitmaps, the policy engine,
//! sleep/wake bookkeeping, and event delivery.
//!
//! Everything here is plain data and pure logic; the only things it takes
//! from the outside world are the `arch` module's trap-frame handle and
//! interrupt-disable primitives, both used from `core.rs`. That separation
//! is what lets [`core::pick_next`] be exercised by ordinary host-side
//! unit tests with no hardware underneath it.

pub mod bootstrap;
pub mod core;
pub mod trap;

use lazy_static::lazy_static;
use spin::Mutex;

use crate::arch::riscv32::frame::FrameRef;
use crate::config::{MAX_PRIO, MAX_TASKS, Policy};

/// A task's position in its lifecycle (§3 of the design). `sched_on_trap`
/// and the task-facing calls in `core.rs` are the only code that moves a
/// task between states.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TaskState {
    Unused,
    Ready,
    Running,
    Sleep,
    Wait,
    Zombie,
}

/// A task's saved state and scheduling metadata. One slot per tid, fixed
/// capacity, never heap-allocated.
#[derive(Debug, Copy, Clone)]
pub struct Task {
    pub state: TaskState,
    /// Where this task's last trap frame lives, inside its own stack.
    /// `None` exactly when `state == Unused`.
    pub saved_frame: Option<FrameRef>,
    pub entry: usize,
    pub arg: u32,
    pub priority: usize,
    pub slice_reload: u32,
    pub slice_left: u32,
    pub wake_tick: u32,
    pub pending_events: u32,
    pub wait_mask: u32,
}

impl Task {
    const fn empty() -> Task {
        Task {
            state: TaskState::Unused,
            saved_frame: None,
            entry: 0,
            arg: 0,
            priority: 0,
            slice_reload: 0,
            slice_left: 0,
            wake_tick: 0,
            pending_events: 0,
            wait_mask: 0,
        }
    }
}

/// Everything the scheduler needs to decide what runs next, collected into
/// one object constructed once by `sched_init` (§9 of the design: the
/// reference's process-wide mutable state becomes a single owned value
/// here, guarded by the interrupt-disabled critical section, the only
/// concurrency primitive a single hart needs).
pub struct SchedState {
    pub tasks: [Task; MAX_TASKS],
    pub current_tid: Option<usize>,
    pub ticks: u32,
    pub ready: [u32; MAX_PRIO],
    pub rr_cursor: [usize; MAX_PRIO],
    pub policy: Policy,
    pub tick_cycles: u64,
    /// The hart `sched_init` was called on. Every entry point debug-asserts
    /// the calling hart still matches; multi-hart use is refused outright
    /// rather than silently mis-scheduled (§9, "concurrent task_create
    /// during scheduling").
    pub boot_hart: usize,
    initialized: bool,
}

impl SchedState {
    const fn new() -> SchedState {
        SchedState {
            tasks: [Task::empty(); MAX_TASKS],
            current_tid: None,
            ticks: 0,
            ready: [0; MAX_PRIO],
            rr_cursor: [0; MAX_PRIO],
            policy: Policy::RoundRobin,
            tick_cycles: 0,
            boot_hart: 0,
            initialized: false,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn mark_initialized(&mut self) {
        self.initialized = true;
    }

    /// Effective priority of a task under the active policy: RR forces
    /// every task to priority 0 regardless of the priority it was created
    /// with (§3, invariant 7).
    pub fn effective_priority(&self, tid: usize) -> usize {
        match self.policy {
            Policy::RoundRobin => 0,
            Policy::Preempt | Policy::Hybrid => self.tasks[tid].priority,
        }
    }

    pub fn set_ready(&mut self, tid: usize) {
        let prio = self.effective_priority(tid);
        self.tasks[tid].state = TaskState::Ready;
        self.ready[prio] |= 1 << tid;
    }

    pub fn clear_ready_bit(&mut self, tid: usize) {
        let prio = self.effective_priority(tid);
        self.ready[prio] &= !(1 << tid);
    }
}

lazy_static! {
    /// The single scheduler instance. `try_lock` is used everywhere instead
    /// of `lock`: this firmware has one hart and scheduler code only ever
    /// runs with interrupts already disabled, so contention here means a
    /// reentrant call, which is a bug worth panicking on rather than
    /// deadlocking on.
    pub static ref SCHED: Mutex<SchedState> = Mutex::new(SchedState::new());
}
