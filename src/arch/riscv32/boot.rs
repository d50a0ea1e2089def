//! Boot entry and trap entry/exit assembly.
//!
//! This is the one place in the crate that is deliberately NOT idiomatic
//! Rust: register banking has to happen before there is a valid Rust stack
//! frame to bank into. The shape mirrors a typical `riscv-rt` trap
//! handler — allocate frame space on the interrupted task's own stack,
//! bank every GPR plus the CSRs the trap dispatcher needs, call into Rust
//! with a pointer to that frame, then unbank whatever frame Rust returns
//! (which may belong to a different task).
//!
//! Word offsets here must stay in lockstep with `frame::TrapFrame`'s field
//! order; `frame::FRAME_WORDS` exists so a frame-size edit here and in Rust
//! can't silently drift apart (any mismatch trips `frame.rs`'s const
//! assertions at build time).

use core::arch::global_asm;

#[unsafe(no_mangle)]
pub extern "C" fn rust_main() -> ! {
    crate::board_main()
}

// Entry point. Loaded directly at the RAM base by QEMU's `-kernel` loader,
// so there is no ROM->RAM data copy the way a flash-resident target needs.
global_asm!(
    ".section .init, \"ax\"
    .global _start
_start:
    /* Disable all interrupts until the trap vector and stack are live. */
    csrw    mie, zero

    la      sp, __estack
    andi    sp, sp, -16

    la      t0, trap_entry
    csrw    mtvec, t0

    /* Zero .bss. */
    la      t0, __sbss
    la      t1, __ebss
1:
    bgeu    t0, t1, 2f
    sw      zero, 0(t0)
    addi    t0, t0, 4
    j       1b
2:
    call    rust_main

3:
    wfi
    j       3b
    "
);

// Trap entry point, installed into `mtvec` (direct mode) by `_start` and
// left untouched afterward: the scheduler never needs a different vector.
global_asm!(
    ".section .text, \"ax\"
    .global trap_entry
    .global trap_exit
    .p2align 2
trap_entry:
    addi    sp, sp, -144

    sw      ra,  (0*4)(sp)
    sw      gp,  (1*4)(sp)
    sw      tp,  (2*4)(sp)
    sw      t0,  (3*4)(sp)
    sw      t1,  (4*4)(sp)
    sw      t2,  (5*4)(sp)
    sw      s0,  (6*4)(sp)
    sw      s1,  (7*4)(sp)
    sw      a0,  (8*4)(sp)
    sw      a1,  (9*4)(sp)
    sw      a2,  (10*4)(sp)
    sw      a3,  (11*4)(sp)
    sw      a4,  (12*4)(sp)
    sw      a5,  (13*4)(sp)
    sw      a6,  (14*4)(sp)
    sw      a7,  (15*4)(sp)
    sw      s2,  (16*4)(sp)
    sw      s3,  (17*4)(sp)
    sw      s4,  (18*4)(sp)
    sw      s5,  (19*4)(sp)
    sw      s6,  (20*4)(sp)
    sw      s7,  (21*4)(sp)
    sw      s8,  (22*4)(sp)
    sw      s9,  (23*4)(sp)
    sw      s10, (24*4)(sp)
    sw      s11, (25*4)(sp)
    sw      t3,  (26*4)(sp)
    sw      t4,  (27*4)(sp)
    sw      t5,  (28*4)(sp)
    sw      t6,  (29*4)(sp)

    /* Record the interrupted sp (current sp + the frame we just pushed). */
    addi    t0, sp, 144
    sw      t0,  (30*4)(sp)

    csrr    t0, mepc
    sw      t0,  (31*4)(sp)
    csrr    t0, mstatus
    sw      t0,  (32*4)(sp)
    csrr    t0, mcause
    sw      t0,  (33*4)(sp)
    csrr    t0, mtval
    sw      t0,  (34*4)(sp)

    mv      a0, sp
    call    rust_trap_dispatch
    mv      sp, a0

    .global start_first
start_first:
    /* Entry point for handing control to the very first task: a0 holds
     * the frame pointer to restore. Load it into sp so the shared
     * unbanking path below, which reads the frame off sp, finds it. */
    mv      sp, a0

trap_exit:
    lw      t0, (31*4)(sp)
    csrw    mepc, t0
    lw      t0, (32*4)(sp)
    csrw    mstatus, t0

    lw      ra,  (0*4)(sp)
    lw      gp,  (1*4)(sp)
    lw      tp,  (2*4)(sp)
    lw      t1,  (4*4)(sp)
    lw      t2,  (5*4)(sp)
    lw      s0,  (6*4)(sp)
    lw      s1,  (7*4)(sp)
    lw      a0,  (8*4)(sp)
    lw      a1,  (9*4)(sp)
    lw      a2,  (10*4)(sp)
    lw      a3,  (11*4)(sp)
    lw      a4,  (12*4)(sp)
    lw      a5,  (13*4)(sp)
    lw      a6,  (14*4)(sp)
    lw      a7,  (15*4)(sp)
    lw      s2,  (16*4)(sp)
    lw      s3,  (17*4)(sp)
    lw      s4,  (18*4)(sp)
    lw      s5,  (19*4)(sp)
    lw      s6,  (20*4)(sp)
    lw      s7,  (21*4)(sp)
    lw      s8,  (22*4)(sp)
    lw      s9,  (23*4)(sp)
    lw      s10, (24*4)(sp)
    lw      s11, (25*4)(sp)
    lw      t3,  (26*4)(sp)
    lw      t4,  (27*4)(sp)
    lw      t5,  (28*4)(sp)
    lw      t6,  (29*4)(sp)
    lw      t0,  (3*4)(sp)
    lw      sp,  (30*4)(sp)

    mret
    "
);

unsafe extern "C" {
    /// `fn(frame_ptr: *mut TrapFrame) -> !`. Switches `sp` to `frame_ptr`
    /// and falls into the shared unbanking path; never returns.
    pub fn start_first(frame_ptr: *mut super::frame::TrapFrame) -> !;

    /// The installed trap vector target. Never called directly from Rust;
    /// its address is what `mod.rs` writes into `mtvec`.
    pub fn trap_entry();
}
