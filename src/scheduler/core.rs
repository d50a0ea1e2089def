//! Public scheduler API: task table management, the trap-driven decision
//! function, and the voluntary-suspension primitives tasks call on
//! themselves.

use riscv::register::mhartid;

use crate::arch::riscv32::frame::FrameRef;
use crate::arch::riscv32::{self};
use crate::config::{MAX_PRIO, MAX_TASKS, MIN_STACK_WORDS, Policy};
use crate::error::{SchedError, SchedResult};

use super::bootstrap::init_task_frame;
use super::{SCHED, SchedState, TaskState};

fn lock() -> spin::MutexGuard<'static, SchedState> {
    SCHED
        .try_lock()
        .expect("scheduler state already locked: reentrant call from trap context?")
}

fn assert_hart(state: &SchedState) {
    debug_assert_eq!(
        mhartid::read(),
        state.boot_hart,
        "scheduler entry point called from a hart other than the one sched_init ran on"
    );
}

/// Zero all task state, record the policy and tick interval, and install
/// the trap vector. Must be called exactly once before any other
/// scheduler operation, and only from `config::BOOT_HART`; multi-hart boot
/// is out of scope (see DESIGN.md).
pub fn sched_init(policy: Policy, tick_cycles: u64) {
    assert_eq!(
        mhartid::read(),
        crate::config::BOOT_HART,
        "sched_init called from a hart other than the boot hart"
    );

    let mut state = lock();
    assert!(!state.is_initialized(), "sched_init called more than once");
    *state = SchedState::new();
    state.policy = policy;
    state.tick_cycles = tick_cycles;
    state.boot_hart = crate::config::BOOT_HART;
    state.mark_initialized();
    drop(state);
    riscv32::install_trap_vector();
}

/// Allocate an UNUSED slot, synthesize an initial trap frame on `stack`,
/// and mark it READY. `stack` becomes exclusively owned by the task for
/// its entire lifetime.
pub fn task_create(
    entry: extern "C" fn(u32),
    arg: u32,
    priority: usize,
    stack: &'static mut [u32],
    slice_ticks: u32,
) -> SchedResult<usize> {
    if stack.len() < MIN_STACK_WORDS {
        return Err(SchedError::InvalidArgument);
    }

    let token = riscv32::irq_disable();
    let mut state = lock();
    assert_hart(&state);

    let tid = match state.tasks.iter().position(|t| t.state == TaskState::Unused) {
        Some(tid) => tid,
        None => {
            drop(state);
            riscv32::irq_restore(token);
            return Err(SchedError::NoSlot);
        }
    };

    let frame = unsafe { init_task_frame(stack, entry as usize, arg) };
    let prio = priority.min(MAX_PRIO - 1);

    let task = &mut state.tasks[tid];
    task.entry = entry as usize;
    task.arg = arg;
    task.priority = prio;
    task.slice_reload = slice_ticks;
    task.slice_left = slice_ticks;
    task.saved_frame = Some(frame);

    state.set_ready(tid);
    drop(state);
    riscv32::irq_restore(token);
    Ok(tid)
}

/// Requires tid 0 (idle) to exist. Programs the timer, picks the first
/// runnable task, and hands control to it. Returns only on failure; on
/// success it diverges into the first task and never comes back.
pub fn sched_start() -> SchedError {
    let token = riscv32::irq_disable();
    let mut state = lock();
    assert_hart(&state);

    if state.tasks[0].state == TaskState::Unused {
        drop(state);
        riscv32::irq_restore(token);
        return SchedError::NotReady;
    }

    let tick_cycles = state.tick_cycles;
    let tid = pick_next(&mut state);
    state.clear_ready_bit(tid);
    state.tasks[tid].state = TaskState::Running;
    state.current_tid = Some(tid);
    let frame = state.tasks[tid]
        .saved_frame
        .expect("sched_start: chosen task has no saved frame");
    drop(state);

    crate::platform::timer::timer_init(tick_cycles);
    riscv32::enable_timer_interrupt();
    riscv32::start_first(frame)
}

/// The pivot: decide whether to keep running the current task or switch,
/// given the just-saved trap frame and why the trap happened. See §4.1 for
/// the algorithm this implements step for step.
pub fn sched_on_trap(frame: FrameRef, from_timer: bool, force_resched: bool) -> FrameRef {
    let mut state = lock();
    assert_hart(&state);

    if let Some(cur) = state.current_tid {
        state.tasks[cur].saved_frame = Some(frame);
    }

    let mut need_resched = force_resched;

    if from_timer {
        state.ticks = state.ticks.wrapping_add(1);
        let now = state.ticks;

        for tid in 0..MAX_TASKS {
            if state.tasks[tid].state == TaskState::Sleep && tick_reached(now, state.tasks[tid].wake_tick) {
                state.set_ready(tid);
            }
        }

        if let Some(cur) = state.current_tid {
            match state.policy {
                Policy::RoundRobin | Policy::Hybrid => {
                    let reload = state.tasks[cur].slice_reload;
                    let slice_expired_resched = |state: &mut SchedState| -> bool {
                        let prio = state.effective_priority(cur);
                        state.ready[prio] & !(1 << cur) != 0
                    };

                    if reload != 0 {
                        state.tasks[cur].slice_left = state.tasks[cur].slice_left.saturating_sub(1);
                        if state.tasks[cur].slice_left == 0 {
                            state.tasks[cur].slice_left = reload;
                            need_resched |= slice_expired_resched(&mut state);
                        }
                    } else if matches!(state.policy, Policy::RoundRobin) {
                        // §9 decision: under RR, slice_reload == 0 means
                        // "every tick is a rotation point", not "no slice".
                        need_resched |= slice_expired_resched(&mut state);
                    }
                }
                Policy::Preempt => {
                    let cur_prio = state.tasks[cur].priority;
                    for p in 0..cur_prio {
                        if state.ready[p] != 0 {
                            need_resched = true;
                            break;
                        }
                    }
                }
            }
        }
    }

    if !need_resched {
        return match state.current_tid {
            Some(cur) => state.tasks[cur]
                .saved_frame
                .expect("sched_on_trap: current task has no saved frame"),
            None => frame,
        };
    }

    if let Some(cur) = state.current_tid {
        if state.tasks[cur].state == TaskState::Running {
            state.set_ready(cur);
        }
    }

    let next = pick_next(&mut state);
    state.clear_ready_bit(next);
    state.tasks[next].state = TaskState::Running;
    state.current_tid = Some(next);
    state.tasks[next]
        .saved_frame
        .expect("sched_on_trap: pick_next chose a task with no saved frame")
}

/// `(now - wake_tick)` compared as signed so the 32-bit tick counter can
/// wrap without breaking sleep-wake ordering, as long as no task sleeps
/// longer than 2^31 ticks.
fn tick_reached(now: u32, wake_tick: u32) -> bool {
    (now.wrapping_sub(wake_tick) as i32) >= 0
}

/// Select the next tid to run under the active policy. Pure function of
/// `ready`/`rr_cursor`/`policy`: no I/O, no interrupt state, which is what
/// makes it unit-testable on the host (see the `tests` module below).
pub fn pick_next(state: &mut SchedState) -> usize {
    if state.ready.iter().all(|&mask| mask == 0) {
        return 0;
    }

    match state.policy {
        Policy::RoundRobin => rotate(&mut state.rr_cursor[0], state.ready[0]),
        Policy::Preempt => {
            for p in 0..MAX_PRIO {
                if state.ready[p] != 0 {
                    return state.ready[p].trailing_zeros() as usize;
                }
            }
            unreachable!("pick_next: non-empty check found nothing")
        }
        Policy::Hybrid => {
            for p in 0..MAX_PRIO {
                if state.ready[p] != 0 {
                    return rotate(&mut state.rr_cursor[p], state.ready[p]);
                }
            }
            unreachable!("pick_next: non-empty check found nothing")
        }
    }
}

/// Scan `mask` starting just past `*cursor`, wrapping around, and return
/// the first set bit; update `*cursor` to that tid.
fn rotate(cursor: &mut usize, mask: u32) -> usize {
    let start = (*cursor + 1) % MAX_TASKS;
    for i in 0..MAX_TASKS {
        let tid = (start + i) % MAX_TASKS;
        if mask & (1 << tid) != 0 {
            *cursor = tid;
            return tid;
        }
    }
    unreachable!("rotate: mask was non-empty but no bit found")
}

/// Voluntarily give up the CPU. The only legal way to do so from task
/// context outside of sleeping or waiting.
pub fn task_yield() {
    riscv32::raise_resched();
}

/// Sleep for `dt` ticks from now.
pub fn task_sleep_ticks(dt: u32) {
    let token = riscv32::irq_disable();
    {
        let mut state = lock();
        if let Some(cur) = state.current_tid {
            let wake = state.ticks.wrapping_add(dt);
            state.tasks[cur].wake_tick = wake;
            state.tasks[cur].state = TaskState::Sleep;
            state.clear_ready_bit(cur);
        }
    }
    riscv32::irq_restore(token);
    riscv32::raise_resched();
}

/// Sleep until the absolute tick value `abs`.
pub fn task_sleep_until(abs: u32) {
    let token = riscv32::irq_disable();
    {
        let mut state = lock();
        if let Some(cur) = state.current_tid {
            state.tasks[cur].wake_tick = abs;
            state.tasks[cur].state = TaskState::Sleep;
            state.clear_ready_bit(cur);
        }
    }
    riscv32::irq_restore(token);
    riscv32::raise_resched();
}

/// Block until any bit in `mask` is pending, or return immediately if one
/// already is.
pub fn task_wait_events(mask: u32) {
    let token = riscv32::irq_disable();
    let mut blocked = false;
    {
        let mut state = lock();
        if let Some(cur) = state.current_tid {
            if state.tasks[cur].pending_events & mask != 0 {
                state.tasks[cur].pending_events &= !mask;
            } else {
                state.tasks[cur].wait_mask = mask;
                state.tasks[cur].state = TaskState::Wait;
                state.clear_ready_bit(cur);
                blocked = true;
            }
        }
    }
    riscv32::irq_restore(token);

    if !blocked {
        return;
    }

    riscv32::raise_resched();

    let token = riscv32::irq_disable();
    {
        let mut state = lock();
        if let Some(cur) = state.current_tid {
            state.tasks[cur].pending_events &= !mask;
            state.tasks[cur].wait_mask = 0;
        }
    }
    riscv32::irq_restore(token);
}

/// OR `mask` into `tid`'s pending events, waking it if it was WAIT-ing on
/// any of those bits. Safe from any context, including interrupt context.
/// A no-op for out-of-range tids.
pub fn task_set_events(tid: usize, mask: u32) {
    if tid >= MAX_TASKS {
        return;
    }
    let token = riscv32::irq_disable();
    let mut state = lock();
    state.tasks[tid].pending_events |= mask;
    if state.tasks[tid].state == TaskState::Wait && state.tasks[tid].wait_mask & state.tasks[tid].pending_events != 0 {
        state.set_ready(tid);
    }
    drop(state);
    riscv32::irq_restore(token);
}

/// Current tick counter value.
pub fn sched_ticks() -> u32 {
    let token = riscv32::irq_disable();
    let ticks = lock().ticks;
    riscv32::irq_restore(token);
    ticks
}

/// Tid of the currently running task, or `None` before `sched_start`.
pub fn sched_current_tid() -> Option<usize> {
    let token = riscv32::irq_disable();
    let tid = lock().current_tid;
    riscv32::irq_restore(token);
    tid
}

/// Mark the current task ZOMBIE. Called only from
/// [`super::bootstrap::task_exit_trampoline`], the return address every
/// task's initial frame carries.
pub(crate) fn task_exit() {
    let token = riscv32::irq_disable();
    let mut state = lock();
    if let Some(cur) = state.current_tid {
        state.tasks[cur].state = TaskState::Zombie;
        state.clear_ready_bit(cur);
    }
    drop(state);
    riscv32::irq_restore(token);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with_policy(policy: Policy) -> SchedState {
        let mut state = SchedState::new();
        state.policy = policy;
        state
    }

    #[test]
    fn round_robin_rotates_through_ready_tasks() {
        let mut state = state_with_policy(Policy::RoundRobin);
        state.ready[0] = (1 << 1) | (1 << 2) | (1 << 3);
        assert_eq!(pick_next(&mut state), 1);
        assert_eq!(pick_next(&mut state), 2);
        assert_eq!(pick_next(&mut state), 3);
        assert_eq!(pick_next(&mut state), 1);
    }

    #[test]
    fn preempt_picks_lowest_tid_at_highest_ready_priority() {
        let mut state = state_with_policy(Policy::Preempt);
        state.ready[3] = (1 << 4) | (1 << 6);
        state.ready[1] = 1 << 9;
        assert_eq!(pick_next(&mut state), 9);
    }

    #[test]
    fn preempt_breaks_ties_by_ascending_tid_with_no_cursor_update() {
        let mut state = state_with_policy(Policy::Preempt);
        state.ready[2] = (1 << 5) | (1 << 1);
        assert_eq!(pick_next(&mut state), 1);
        assert_eq!(pick_next(&mut state), 1);
    }

    #[test]
    fn hybrid_rotates_within_the_winning_priority() {
        let mut state = state_with_policy(Policy::Hybrid);
        state.ready[0] = (1 << 2) | (1 << 3);
        assert_eq!(pick_next(&mut state), 2);
        assert_eq!(pick_next(&mut state), 3);
        assert_eq!(pick_next(&mut state), 2);
    }

    #[test]
    fn idle_is_the_fallback_when_nothing_is_ready() {
        let mut state = state_with_policy(Policy::Hybrid);
        assert_eq!(pick_next(&mut state), 0);
    }

    #[test]
    fn tick_wraparound_compares_signed() {
        assert!(tick_reached(10, 10));
        assert!(tick_reached(11, 10));
        assert!(!tick_reached(9, 10));

        // wake_tick close to the u32 boundary: `now` wrapping past it must
        // still read as "reached", not as a huge unsigned gap.
        let wake = u32::MAX - 1;
        assert!(tick_reached(u32::MAX, wake));
        assert!(tick_reached(wake.wrapping_add(2), wake));
        assert!(!tick_reached(wake.wrapping_sub(1), wake));
    }
}
