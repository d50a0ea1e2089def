//! Demo task set for a production boot image (no `scenario-tests`
//! feature): a couple of simple tasks that exercise the scheduler's
//! primitives, standing in for the sample RX/CTLE application workloads
//! the design explicitly leaves out of scope. Illustrative only.

use crate::scheduler::core as sched;

const HEARTBEAT_PRIO: usize = 2;
const WATCHER_PRIO: usize = 1;
const WAKE_EVENT: u32 = 0b1;

static mut STACK_HEARTBEAT: [u32; 256] = [0; 256];
static mut STACK_WATCHER: [u32; 256] = [0; 256];

/// Logs the tick count once a second and pokes the watcher task awake.
extern "C" fn heartbeat_body(_arg: u32) {
    let watcher = WATCHER_TID.load(core::sync::atomic::Ordering::Relaxed);
    loop {
        sched::task_sleep_ticks(100);
        log::info!("heartbeat: tick {}", sched::sched_ticks());
        if watcher != usize::MAX {
            sched::task_set_events(watcher, WAKE_EVENT);
        }
    }
}

/// Blocks on the heartbeat's wake event and logs each time it fires.
extern "C" fn watcher_body(_arg: u32) {
    loop {
        sched::task_wait_events(WAKE_EVENT);
        log::info!("watcher: woken at tick {}", sched::sched_ticks());
    }
}

static WATCHER_TID: core::sync::atomic::AtomicUsize =
    core::sync::atomic::AtomicUsize::new(usize::MAX);

pub fn spawn_demo_tasks() {
    let watcher = sched::task_create(
        watcher_body,
        0,
        WATCHER_PRIO,
        unsafe { &mut *core::ptr::addr_of_mut!(STACK_WATCHER) },
        0,
    )
    .expect("spawn watcher");
    WATCHER_TID.store(watcher, core::sync::atomic::Ordering::Relaxed);

    sched::task_create(
        heartbeat_body,
        0,
        HEARTBEAT_PRIO,
        unsafe { &mut *core::ptr::addr_of_mut!(STACK_HEARTBEAT) },
        10,
    )
    .expect("spawn heartbeat");
}
