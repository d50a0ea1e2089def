//! The trap frame: the complete saved register image of a task at the
//! moment it was interrupted.
//!
//! The scheduler core treats this as an opaque handle except for three
//! fields (§6 of the design): the program counter, the first-argument
//! register, and the interrupt-enable bits. Field order here is load-bearing
//! — `trap_entry`/`trap_exit` in `boot.rs` bank and unbank registers at the
//! word offsets this layout defines, in lockstep with the `FRAME_WORDS`
//! constant below.

use core::ptr::NonNull;

/// Number of 32-bit words in a `TrapFrame`, padded to keep the struct
/// 16-byte aligned.
pub const FRAME_WORDS: usize = 36;

/// The banked register image of one suspended task.
///
/// Field order matches the offsets `trap_entry`/`trap_exit` bank against in
/// `boot.rs`: `ra` first, `mtval` last, one padding word to round the frame
/// up to 16 bytes. `x0` is hardwired to zero on RISC-V and is never banked.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
pub struct TrapFrame {
    pub ra: u32,
    pub gp: u32,
    pub tp: u32,
    pub t0: u32,
    pub t1: u32,
    pub t2: u32,
    pub s0: u32,
    pub s1: u32,
    pub a0: u32,
    pub a1: u32,
    pub a2: u32,
    pub a3: u32,
    pub a4: u32,
    pub a5: u32,
    pub a6: u32,
    pub a7: u32,
    pub s2: u32,
    pub s3: u32,
    pub s4: u32,
    pub s5: u32,
    pub s6: u32,
    pub s7: u32,
    pub s8: u32,
    pub s9: u32,
    pub s10: u32,
    pub s11: u32,
    pub t3: u32,
    pub t4: u32,
    pub t5: u32,
    pub t6: u32,
    /// The task's own stack pointer at the moment of the trap. Redundant
    /// with the frame's own address (the frame lives on that same stack)
    /// but kept so the layout is a complete register bank.
    pub sp: u32,
    pub mepc: u32,
    pub mstatus: u32,
    pub mcause: u32,
    pub mtval: u32,
    _pad: u32,
}

const _: () = assert!(core::mem::size_of::<TrapFrame>() == FRAME_WORDS * 4);
const _: () = assert!(core::mem::size_of::<TrapFrame>() % 16 == 0);

/// `mstatus.MIE`, the global machine-mode interrupt enable bit.
pub const MSTATUS_MIE: u32 = 1 << 3;
/// `mstatus.MPIE`, the interrupt-enable bit saved across a trap.
pub const MSTATUS_MPIE: u32 = 1 << 7;
/// `mstatus.MPP` field (bits 11-12): the privilege mode `mret` returns to.
/// This firmware runs every task in machine mode, so `MPP` is always `11`.
pub const MSTATUS_MPP_MACHINE: u32 = 0b11 << 11;

/// A non-owning, non-forgeable handle naming "the saved execution state of
/// exactly one task at exactly one suspension point" (§9 of the design).
/// The scheduler core stores and returns this; it never dereferences it
/// except through the three accessor fields the contract exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRef(NonNull<TrapFrame>);

impl FrameRef {
    /// # Safety
    /// `ptr` must point to a live, 16-byte-aligned `TrapFrame` for as long
    /// as the returned handle is used.
    pub unsafe fn new(ptr: *mut TrapFrame) -> Self {
        Self(NonNull::new(ptr).expect("null trap frame pointer"))
    }

    pub fn as_ptr(self) -> *mut TrapFrame {
        self.0.as_ptr()
    }

    pub fn pc(self) -> u32 {
        unsafe { (*self.0.as_ptr()).mepc }
    }

    pub fn set_pc(self, pc: u32) {
        unsafe { (*self.0.as_ptr()).mepc = pc };
    }

    pub fn first_arg(self) -> u32 {
        unsafe { (*self.0.as_ptr()).a0 }
    }

    pub fn set_first_arg(self, value: u32) {
        unsafe { (*self.0.as_ptr()).a0 = value };
    }

    pub fn interrupts_enabled_on_resume(self) -> bool {
        unsafe { (*self.0.as_ptr()).mstatus & MSTATUS_MPIE != 0 }
    }

    pub fn set_interrupts_enabled_on_resume(self, enabled: bool) {
        unsafe {
            let status = &mut (*self.0.as_ptr()).mstatus;
            if enabled {
                *status |= MSTATUS_MPIE;
            } else {
                *status &= !MSTATUS_MPIE;
            }
        }
    }

    pub fn cause(self) -> u32 {
        unsafe { (*self.0.as_ptr()).mcause }
    }

    pub fn tval(self) -> u32 {
        unsafe { (*self.0.as_ptr()).mtval }
    }
}

unsafe impl Send for FrameRef {}
