//! RISC-V (RV32IMAC, QEMU `virt`) architecture shim.
//!
//! This is the only module the scheduler core talks to for anything
//! hardware-specific: disabling/restoring interrupts, handing control to the
//! first task, installing the trap vector, and issuing the `ecall` a task
//! uses to ask for a voluntary reschedule. Everything here is grounded in
//! the M-mode CSR set; there is no S-mode or U-mode in this design, so
//! `mstatus.MPP` is always machine mode.

pub mod boot;
pub mod frame;

use frame::{FrameRef, MSTATUS_MIE, TrapFrame};
use riscv::register::{mcause, mepc, mie, mstatus, mtval, mtvec};

/// Opaque token recording whether interrupts were enabled before a
/// `irq_disable` call, so `irq_restore` can put things back exactly as they
/// were rather than unconditionally re-enabling. Nesting-safe.
#[derive(Debug, Clone, Copy)]
pub struct IrqToken(bool);

/// Disable machine-mode interrupts and return a token capturing the prior
/// state. Pairs with [`irq_restore`].
#[inline]
pub fn irq_disable() -> IrqToken {
    let was_enabled = mstatus::read().mie();
    unsafe { mstatus::clear_mie() };
    IrqToken(was_enabled)
}

/// Restore the interrupt-enable state captured by a prior [`irq_disable`].
/// A nested `irq_disable`/`irq_restore` pair that runs entirely inside an
/// outer one is a no-op here, since the outer token still remembers
/// "disabled" from before the outer call.
#[inline]
pub fn irq_restore(token: IrqToken) {
    if token.0 {
        unsafe { mstatus::set_mie() };
    }
}

/// Report whether machine-mode interrupts are currently enabled.
#[inline]
pub fn irq_enabled() -> bool {
    mstatus::read().mie()
}

/// Ask for a synchronous reschedule via `ecall` from machine mode. Traps
/// to `trap_entry` with `mcause` set to the machine-mode environment-call
/// exception code; the trap dispatcher advances `mepc` past it before
/// resuming whichever task `sched_on_trap` picks.
#[inline]
pub fn raise_resched() {
    unsafe { core::arch::asm!("ecall") };
}

/// Install the trap vector in direct mode: every trap, interrupt or
/// exception, lands at the single `trap_entry` symbol in `boot.rs`.
pub fn install_trap_vector() {
    unsafe { mtvec::write(boot::trap_entry as usize, mtvec::TrapMode::Direct) };
}

/// Enable the machine-mode timer interrupt line (`mie.MTIE`). Does not
/// touch `mstatus.MIE`; the caller decides when interrupts go live globally.
pub fn enable_timer_interrupt() {
    unsafe { mie::set_mtimer() };
}

/// Hand control to the very first task and never return. `frame` must be a
/// fully synthesized frame (see `scheduler::bootstrap`) living on that
/// task's own stack.
pub fn start_first(frame: FrameRef) -> ! {
    unsafe { boot::start_first(frame.as_ptr()) }
}

/// Classified trap cause, as seen by the scheduler's trap dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrapCause {
    /// Machine timer interrupt (CLINT `mtimecmp` reached).
    Timer,
    /// `ecall` from machine mode: a task's voluntary reschedule request.
    Reschedule,
    /// Anything else: an exception or interrupt this scheduler doesn't
    /// model, handled as fatal per §7 of the design.
    Unrecognized,
}

/// RISC-V `mcause` interrupt bit (bit 31 on RV32): set for interrupts,
/// clear for synchronous exceptions.
const MCAUSE_INTERRUPT_BIT: u32 = 1 << 31;
/// Exception code for a machine-timer interrupt.
const MCAUSE_CODE_MACHINE_TIMER: u32 = 7;
/// Exception code for an `ecall` taken from machine mode.
const MCAUSE_CODE_ECALL_FROM_M: u32 = 11;

/// Classify a raw `mcause` value into the three causes the scheduler cares
/// about.
pub fn classify_cause(raw: u32) -> TrapCause {
    let is_interrupt = raw & MCAUSE_INTERRUPT_BIT != 0;
    let code = raw & !MCAUSE_INTERRUPT_BIT;
    match (is_interrupt, code) {
        (true, MCAUSE_CODE_MACHINE_TIMER) => TrapCause::Timer,
        (false, MCAUSE_CODE_ECALL_FROM_M) => TrapCause::Reschedule,
        _ => TrapCause::Unrecognized,
    }
}

/// Advance a frame's saved `mepc` past the `ecall` instruction that
/// produced it. `ecall` is always 4 bytes (RV32IMAC has no compressed
/// `ecall`), so this is a fixed `+4`.
pub fn advance_past_ecall(frame: FrameRef) {
    frame.set_pc(frame.pc().wrapping_add(4));
}

/// Read the live `mcause`/`mepc`/`mtval` directly from the CSRs. Used only
/// by the panic handler and other non-trap-path diagnostics; the trap
/// dispatcher itself reads these out of the banked `TrapFrame` instead.
pub fn current_cause_raw() -> u32 {
    mcause::read().bits() as u32
}

pub fn current_epc_raw() -> u32 {
    mepc::read() as u32
}

pub fn current_tval_raw() -> u32 {
    mtval::read() as u32
}

/// Synthesize the initial register image for a brand-new task, ready to be
/// handed to [`start_first`] or returned from `sched_on_trap` the first
/// time that task runs.
///
/// # Safety
/// `frame_ptr` must point to space for a `TrapFrame` carved out of the
/// task's own stack, 16-byte aligned, and otherwise unused.
pub unsafe fn init_frame(
    frame_ptr: *mut TrapFrame,
    entry: usize,
    arg: u32,
    stack_top: usize,
    epilogue: usize,
) -> FrameRef {
    unsafe {
        frame_ptr.write(TrapFrame {
            sp: stack_top as u32,
            ra: epilogue as u32,
            a0: arg,
            mepc: entry as u32,
            mstatus: (mstatus::read().bits() as u32 & !MSTATUS_MIE)
                | frame::MSTATUS_MPIE
                | frame::MSTATUS_MPP_MACHINE,
            ..Default::default()
        });
        FrameRef::new(frame_ptr)
    }
}

/// Park the hart forever. Used for fatal conditions and the idle task's
/// fallback path; real idle work goes through `wfi` so QEMU can retire
/// cycles efficiently between ticks.
pub fn halt() -> ! {
    loop {
        unsafe { core::arch::asm!("wfi") };
    }
}
