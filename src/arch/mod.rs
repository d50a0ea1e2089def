#[cfg(target_arch = "riscv32")]
#[macro_use]
pub mod riscv32;
