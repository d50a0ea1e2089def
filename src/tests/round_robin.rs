//! Scenario 2 (§8): under policy RR, three tasks that each append their tid
//! and yield must produce a repeating permutation of the rotation order
//! `rr_cursor[0]` picks them in.

use core::sync::atomic::{AtomicUsize, Ordering};

use crate::scheduler::core as sched;

use super::harness;

static TIDS: [AtomicUsize; 3] = [
    AtomicUsize::new(usize::MAX),
    AtomicUsize::new(usize::MAX),
    AtomicUsize::new(usize::MAX),
];

static mut STACK_A: [u32; 256] = [0; 256];
static mut STACK_B: [u32; 256] = [0; 256];
static mut STACK_C: [u32; 256] = [0; 256];
static mut STACK_CHECKER: [u32; 256] = [0; 256];

/// Priority is irrelevant under RR (every task is forced to priority 0),
/// so all three loop bodies are identical.
extern "C" fn loop_body(_arg: u32) {
    let tid = sched::sched_current_tid().expect("task has no current tid");
    loop {
        harness::record(tid);
        sched::task_yield();
    }
}

extern "C" fn checker_body(_arg: u32) {
    sched::task_sleep_ticks(10);
    let log = harness::snapshot();

    let a = TIDS[0].load(Ordering::Relaxed);
    let b = TIDS[1].load(Ordering::Relaxed);
    let c = TIDS[2].load(Ordering::Relaxed);

    // The log must be long enough to see at least two full rotations, and
    // every window of 3 consecutive entries must repeat the one three
    // entries before it.
    let long_enough = log.len() >= 9;
    let is_permutation_of_abc = |window: &[u8]| {
        let mut seen = [false; 3];
        for &t in window {
            if t as usize == a {
                seen[0] = true;
            } else if t as usize == b {
                seen[1] = true;
            } else if t as usize == c {
                seen[2] = true;
            } else {
                return false;
            }
        }
        seen.iter().all(|&s| s)
    };
    let rotates = long_enough
        && is_permutation_of_abc(&log[0..3])
        && (0..log.len() - 3).all(|i| log[i] == log[i + 3]);

    harness::report("round_robin", rotates);
}

pub fn spawn() {
    let a = sched::task_create(loop_body, 0, 0, unsafe { &mut *core::ptr::addr_of_mut!(STACK_A) }, 0)
        .expect("spawn a");
    TIDS[0].store(a, Ordering::Relaxed);
    let b = sched::task_create(loop_body, 0, 0, unsafe { &mut *core::ptr::addr_of_mut!(STACK_B) }, 0)
        .expect("spawn b");
    TIDS[1].store(b, Ordering::Relaxed);
    let c = sched::task_create(loop_body, 0, 0, unsafe { &mut *core::ptr::addr_of_mut!(STACK_C) }, 0)
        .expect("spawn c");
    TIDS[2].store(c, Ordering::Relaxed);

    sched::task_create(
        checker_body,
        0,
        0,
        unsafe { &mut *core::ptr::addr_of_mut!(STACK_CHECKER) },
        0,
    )
    .expect("spawn checker");
}
