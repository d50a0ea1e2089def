//! Scenario 3 (§8): under policy HYBRID, two equal-priority tasks with a
//! 5-tick slice should split the CPU roughly evenly via round-robin within
//! their priority level, and a lower-priority (higher-numbered) task must
//! not run at all while either of them is ready.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::scheduler::core as sched;

use super::harness;

const PRIO_AB: usize = 3;
const PRIO_C: usize = 5;
const SLICE: u32 = 5;
const RUN_TICKS: u32 = 100;

static RUN_A: AtomicU32 = AtomicU32::new(0);
static RUN_B: AtomicU32 = AtomicU32::new(0);
static RUN_C: AtomicU32 = AtomicU32::new(0);

static mut STACK_A: [u32; 256] = [0; 256];
static mut STACK_B: [u32; 256] = [0; 256];
static mut STACK_C: [u32; 256] = [0; 256];
static mut STACK_CHECKER: [u32; 256] = [0; 256];

/// Busy-loops forever, counting iterations. Each task never yields or
/// sleeps, so the only thing that takes it off the CPU is its own slice
/// expiring; the iteration count it accumulates is a proxy for the ticks
/// of CPU time it actually received, which is what the scenario checks.
fn busy_loop(counter: &'static AtomicU32) -> ! {
    loop {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

extern "C" fn a_body(_arg: u32) {
    busy_loop(&RUN_A)
}

extern "C" fn b_body(_arg: u32) {
    busy_loop(&RUN_B)
}

extern "C" fn c_body(_arg: u32) {
    busy_loop(&RUN_C)
}

extern "C" fn checker_body(_arg: u32) {
    sched::task_sleep_ticks(RUN_TICKS);

    let a = RUN_A.load(Ordering::Relaxed);
    let b = RUN_B.load(Ordering::Relaxed);
    let c = RUN_C.load(Ordering::Relaxed);

    // A and B should each have gotten roughly half the CPU; allow a
    // generous tolerance since "iterations" only approximates ticks.
    let total = a as u64 + b as u64;
    let balanced = total > 0 && {
        let min = a.min(b) as u64;
        let max = a.max(b) as u64;
        min * 3 >= max // min is at least a third of max: no starvation
    };
    let c_starved = c == 0;

    harness::report("hybrid_slicing", balanced && c_starved);
}

pub fn spawn() {
    sched::task_create(a_body, 0, PRIO_AB, unsafe { &mut *core::ptr::addr_of_mut!(STACK_A) }, SLICE)
        .expect("spawn a");
    sched::task_create(b_body, 0, PRIO_AB, unsafe { &mut *core::ptr::addr_of_mut!(STACK_B) }, SLICE)
        .expect("spawn b");
    sched::task_create(c_body, 0, PRIO_C, unsafe { &mut *core::ptr::addr_of_mut!(STACK_C) }, SLICE)
        .expect("spawn c");

    sched::task_create(
        checker_body,
        0,
        0,
        unsafe { &mut *core::ptr::addr_of_mut!(STACK_CHECKER) },
        0,
    )
    .expect("spawn checker");
}
