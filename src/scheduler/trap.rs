//! Trap dispatcher: the single entry point `trap_entry` (in
//! `arch::riscv32::boot`) calls with a pointer to the just-saved trap
//! frame. Classifies the cause and either hands off to the scheduler core
//! or treats it as fatal.

use crate::arch::riscv32::frame::{FrameRef, TrapFrame};
use crate::arch::riscv32::{self, TrapCause};
use crate::error::fatal;

use super::core::sched_on_trap;

/// Called directly from the assembly in `boot.rs`. Never called from Rust.
#[unsafe(no_mangle)]
extern "C" fn rust_trap_dispatch(frame_ptr: *mut TrapFrame) -> *mut TrapFrame {
    let frame = unsafe { FrameRef::new(frame_ptr) };

    let resumed = match riscv32::classify_cause(frame.cause()) {
        TrapCause::Timer => {
            crate::platform::timer::timer_ack_and_set_next(timer_reload_cycles());
            sched_on_trap(frame, true, false)
        }
        TrapCause::Reschedule => {
            riscv32::advance_past_ecall(frame);
            sched_on_trap(frame, false, true)
        }
        TrapCause::Unrecognized => {
            log::error!(
                "unrecognised trap: mcause={:#x} mepc={:#x} mtval={:#x}",
                frame.cause(),
                frame.pc(),
                frame.tval(),
            );
            fatal("unrecognised trap cause")
        }
    };

    resumed.as_ptr()
}

fn timer_reload_cycles() -> u64 {
    super::SCHED
        .try_lock()
        .expect("rust_trap_dispatch: scheduler state locked")
        .tick_cycles
}
