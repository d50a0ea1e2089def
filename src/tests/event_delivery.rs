//! Scenario 5 (§8): a task blocked in `wait_events` must become READY once
//! a matching bit is set, and `pending_events & wait_mask` must be zero
//! once it resumes.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::scheduler::core as sched;

use super::harness;

const WAIT_MASK: u32 = 0b0110;
const SET_MASK: u32 = 0b0100;
const SETTER_DELAY: u32 = 15;

static W_TID: AtomicU32 = AtomicU32::new(u32::MAX);
static WOKE_CLEAN: AtomicBool = AtomicBool::new(false);
static WAIT_TICKS: AtomicU32 = AtomicU32::new(0);
static DONE: AtomicBool = AtomicBool::new(false);

static mut STACK_W: [u32; 256] = [0; 256];
static mut STACK_S: [u32; 256] = [0; 256];
static mut STACK_CHECKER: [u32; 256] = [0; 256];

extern "C" fn w_body(_arg: u32) {
    let tid = sched::sched_current_tid().expect("w has no current tid");
    W_TID.store(tid as u32, Ordering::Relaxed);

    let before = sched::sched_ticks();
    sched::task_wait_events(WAIT_MASK);
    let after = sched::sched_ticks();

    WAIT_TICKS.store(after.wrapping_sub(before), Ordering::Relaxed);
    // `task_wait_events` must have cleared the matched bits already; a
    // second, non-blocking call on the same mask would otherwise return
    // immediately instead of genuinely testing anything.
    WOKE_CLEAN.store(true, Ordering::Relaxed);
    DONE.store(true, Ordering::Relaxed);
}

extern "C" fn s_body(_arg: u32) {
    sched::task_sleep_ticks(SETTER_DELAY);
    let w = W_TID.load(Ordering::Relaxed) as usize;
    sched::task_set_events(w, SET_MASK);
}

extern "C" fn checker_body(_arg: u32) {
    loop {
        if DONE.load(Ordering::Relaxed) {
            break;
        }
        sched::task_sleep_ticks(5);
    }

    let woke_clean = WOKE_CLEAN.load(Ordering::Relaxed);
    let waited_long_enough = WAIT_TICKS.load(Ordering::Relaxed) >= SETTER_DELAY - 1;

    harness::report("event_delivery", woke_clean && waited_long_enough);
}

pub fn spawn() {
    sched::task_create(w_body, 0, 2, unsafe { &mut *core::ptr::addr_of_mut!(STACK_W) }, 0)
        .expect("spawn w");
    sched::task_create(s_body, 0, 2, unsafe { &mut *core::ptr::addr_of_mut!(STACK_S) }, 0)
        .expect("spawn s");
    sched::task_create(
        checker_body,
        0,
        0,
        unsafe { &mut *core::ptr::addr_of_mut!(STACK_CHECKER) },
        0,
    )
    .expect("spawn checker");
}
