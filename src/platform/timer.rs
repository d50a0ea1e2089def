//! CLINT (Core-Local Interruptor) timer driver.
//!
//! The CLINT exposes a free-running 64-bit `mtime` counter and, per hart, a
//! 64-bit `mtimecmp` compare register: when `mtime >= mtimecmp`, the hart's
//! machine-timer interrupt line goes high. Both are memory-mapped as pairs
//! of 32-bit words since this is a 32-bit target.

use riscv::register::mhartid;
use volatile::Volatile;

use crate::config::CLINT_BASE;

const MTIME_OFFSET: usize = 0xbff8;
const MTIMECMP_OFFSET: usize = 0x4000;

fn mtime_lo() -> Volatile<&'static mut u32> {
    Volatile::new(unsafe { &mut *((CLINT_BASE + MTIME_OFFSET) as *mut u32) })
}

fn mtime_hi() -> Volatile<&'static mut u32> {
    Volatile::new(unsafe { &mut *((CLINT_BASE + MTIME_OFFSET + 4) as *mut u32) })
}

fn mtimecmp_lo(hart: usize) -> Volatile<&'static mut u32> {
    Volatile::new(unsafe { &mut *((CLINT_BASE + MTIMECMP_OFFSET + 8 * hart) as *mut u32) })
}

fn mtimecmp_hi(hart: usize) -> Volatile<&'static mut u32> {
    Volatile::new(unsafe { &mut *((CLINT_BASE + MTIMECMP_OFFSET + 8 * hart + 4) as *mut u32) })
}

/// Read the free-running 64-bit cycle counter. Reads `hi` twice around `lo`
/// since nothing prevents `mtime` from rolling over between the two 32-bit
/// reads a 32-bit core has to make.
pub fn mtime_get() -> u64 {
    loop {
        let hi1 = mtime_hi().read();
        let lo = mtime_lo().read();
        let hi2 = mtime_hi().read();
        if hi1 == hi2 {
            return ((hi1 as u64) << 32) | lo as u64;
        }
    }
}

/// Set `mtimecmp` for the given hart to an absolute `mtime` value.
///
/// Written high-word-first-to-max, then low, then high: a naive low-then-high
/// write can let `mtimecmp` briefly equal the old (smaller) high word
/// combined with the new low word, firing a spurious interrupt if `mtime`
/// happens to land in that window.
fn mtimecmp_set(hart: usize, value: u64) {
    mtimecmp_lo(hart).write(0xffff_ffff);
    mtimecmp_hi(hart).write(0xffff_ffff);
    mtimecmp_lo(hart).write(value as u32);
    mtimecmp_hi(hart).write((value >> 32) as u32);
}

/// Arm the timer for the first tick, `cycles` `mtime` ticks from now, on the
/// calling hart.
pub fn timer_init(cycles: u64) {
    let hart = mhartid::read();
    let now = mtime_get();
    mtimecmp_set(hart, now + cycles);
}

/// Acknowledge the interrupt that just fired (there is no explicit ack
/// register; rearming `mtimecmp` past the current `mtime` clears the
/// pending condition) and schedule the next one `cycles` ticks out.
pub fn timer_ack_and_set_next(cycles: u64) {
    let hart = mhartid::read();
    let now = mtime_get();
    mtimecmp_set(hart, now + cycles);
}
