//! Kestrel kernel core: CPU bring-up, memory management, scheduling, and
//! the syscall boundary for a 32-bit protected-mode i386 kernel.
//!
//! The library crate exists so integration tests and the bring-up
//! binary share one implementation; `kestrel-kernel` (`src/main.rs`) is
//! the thin entry point that calls into it.

#![no_std]
#![cfg_attr(test, no_main)]
#![cfg_attr(test, feature(custom_test_frameworks))]
#![cfg_attr(test, test_runner(crate::test_runner))]
#![cfg_attr(test, reexport_test_harness_main = "test_main")]
#![cfg_attr(not(test), feature(alloc_error_handler))]

extern crate alloc;

pub mod arch;
pub mod config;
pub mod error;
pub mod irq;
pub mod klog;
pub mod mm;
pub mod process;
pub mod sched;
pub mod sync;
pub mod syscall;
pub mod test_framework;
pub mod timer;
mod intrinsics;

pub use test_framework::{exit_qemu, test_panic_handler, QemuExitCode, Testable};
#[cfg(test)]
pub use test_framework::test_runner;

/// Runs the fixed boot sequence shared by the real entry point and every
/// integration test binary: descriptor tables, PIC/PIT, heap, paging,
/// then interrupts on.
///
/// # Safety
/// Must run exactly once, as the first thing any entry point does.
pub unsafe fn kernel_init() {
    arch::init();
    arch::x86::serial::init();
    klog::init();
    // SAFETY: forwarded; caller guarantees this runs once at bring-up.
    unsafe { mm::init() };
    process::init();
    sched::init();
}

// `arch::x86::boot`'s `_start` stub always calls `kernel_main` by that
// fixed name. The production binary (`src/main.rs`) provides it when
// linked as `kestrel-kernel`; test builds of this library provide their
// own here, since `main.rs` is never part of a `cargo test --lib` build.
#[cfg(test)]
#[unsafe(no_mangle)]
pub extern "C" fn kernel_main(_multiboot_magic: u32, _multiboot_info: u32) -> ! {
    // SAFETY: the very first thing this test binary's entry point does.
    unsafe { kernel_init() };
    test_main();
    arch::x86::io::halt_forever();
}

#[cfg(test)]
#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    test_framework::test_panic_handler(info)
}

/// Heap allocation failure is unrecoverable in a kernel with no swap
/// and no OOM killer to defer to.
#[cfg(not(test))]
#[alloc_error_handler]
fn alloc_error_handler(layout: core::alloc::Layout) -> ! {
    panic!("allocation error: {layout:?}");
}
