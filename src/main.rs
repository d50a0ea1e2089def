//! Firmware entry point for the QEMU `virt` machine, single RV32IMAC hart.
//!
//! `_start` (in `arch::riscv32::boot`) sets up a stack and jumps to
//! `rust_main`, which calls [`board_main`]. From here on the scheduler
//! owns control: `board_main` installs the logger, calls `sched_init`,
//! creates the idle task plus either the scenario test harness or the
//! production demo task set, and finally calls `sched_start`, which never
//! returns.

#![no_std]
#![no_main]

mod arch;
mod config;
mod error;
mod platform;
mod scheduler;
mod utils;

#[cfg(not(feature = "scenario-tests"))]
mod demo;
#[cfg(feature = "scenario-tests")]
mod tests;

use core::panic::PanicInfo;

use scheduler::core as sched;

/// Minimum-size stack for the idle task: it never does anything but `wfi`
/// in a loop, so it needs no more than `MIN_STACK_WORDS`.
static mut IDLE_STACK: [u32; config::MIN_STACK_WORDS] = [0; config::MIN_STACK_WORDS];

/// Tid 0, the idle task (§3, invariant 6): always created before
/// `sched_start`, never blocks, and is `pick_next`'s fallback when no
/// other task is ready.
extern "C" fn idle_body(_arg: u32) {
    arch::riscv32::halt()
}

/// Called from `rust_main` in `arch::riscv32::boot` once `.bss` is zeroed
/// and a stack is live. Never returns.
#[unsafe(no_mangle)]
pub extern "C" fn board_main() -> ! {
    utils::logger::init();
    log::info!("rvsched booting on QEMU virt (RV32IMAC, hart {})", riscv::register::mhartid::read());

    #[cfg(feature = "scenario-tests")]
    let policy = tests::POLICY;
    #[cfg(not(feature = "scenario-tests"))]
    let policy = config::Policy::Hybrid;

    sched::sched_init(policy, config::DEFAULT_TICK_CYCLES);
    log::info!("scheduler initialized: policy={:?} tick_cycles={}", policy, config::DEFAULT_TICK_CYCLES);

    sched::task_create(
        idle_body,
        0,
        config::MAX_PRIO - 1,
        unsafe { &mut *core::ptr::addr_of_mut!(IDLE_STACK) },
        0,
    )
    .expect("idle task (tid 0) must always be creatable");

    #[cfg(feature = "scenario-tests")]
    tests::spawn_all();
    #[cfg(not(feature = "scenario-tests"))]
    demo::spawn_demo_tasks();

    let err = sched::sched_start();
    log::error!("sched_start failed: {}", err);
    error::fatal("sched_start: no idle task at tid 0")
}

#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    if let Some(location) = info.location() {
        log::error!("PANIC at {}:{}: {}", location.file(), location.line(), info.message());
    } else {
        log::error!("PANIC: {}", info.message());
    }
    arch::riscv32::halt()
}
