//! Architecture-specific bring-up.
//!
//! The crate targets a single architecture (i386 protected mode); this
//! module exists so the rest of the kernel calls `arch::init()` /
//! `arch::halt()` without naming the architecture directly, mirroring how
//! multi-arch kernels gate on `target_arch`.

pub mod x86;

pub use x86::{halt, hlt, interrupts_enable, interrupts_enabled};

/// Runs the fixed bring-up order: descriptor tables, PIC, PIT, then loads
/// the IDT so exceptions and IRQs are deliverable once interrupts are
/// enabled later by the caller.
pub fn init() {
    x86::gdt::init();
    x86::idt::init();
    x86::pic::init();
    x86::pit::init(crate::config::PIT_FREQUENCY_HZ);
}
