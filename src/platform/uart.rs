//! 16550-compatible UART driver, as wired up on the QEMU `virt` machine.
//!
//! TX is polled-blocking (spin on THRE before writing THR); RX is
//! polled-nonblocking (check DR once, return immediately either way). QEMU's
//! model comes up ready for TX with no baud-rate programming needed.

use bitflags::bitflags;
use volatile::Volatile;

use crate::config::UART0_BASE;

const REG_RHR: usize = 0x00;
const REG_THR: usize = 0x00;
const REG_LSR: usize = 0x05;

bitflags! {
    /// Line status flags
    struct LineStsFlags: u8 {
        const INPUT_FULL = 1;
        // 1 to 4 unknown
        const OUTPUT_EMPTY = 1 << 5;
        // 6 and 7 unknown
    }
}

fn reg(offset: usize) -> Volatile<&'static mut u8> {
    Volatile::new(unsafe { &mut *((UART0_BASE + offset) as *mut u8) })
}

fn line_status() -> LineStsFlags {
    LineStsFlags::from_bits_truncate(reg(REG_LSR).read())
}

/// Write one byte, spinning until the transmit holding register is empty.
pub fn putc(byte: u8) {
    while !line_status().contains(LineStsFlags::OUTPUT_EMPTY) {}
    reg(REG_THR).write(byte);
}

/// Write a string, translating `\n` to `\r\n` for a plain serial terminal.
pub fn puts(s: &str) {
    for b in s.bytes() {
        if b == b'\n' {
            putc(b'\r');
        }
        putc(b);
    }
}

/// Poll for one received byte without blocking.
pub fn getc_nonblocking() -> Option<u8> {
    if line_status().contains(LineStsFlags::INPUT_FULL) {
        Some(reg(REG_RHR).read())
    } else {
        None
    }
}
