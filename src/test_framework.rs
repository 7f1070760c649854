//! `no_std` test harness: serial-reported results and a QEMU exit code,
//! since there is no host process to return an exit status from.
//!
//! Test functions are plain `Fn()` that panic on failure via the usual
//! `assert!`/`assert_eq!` macros, exactly as under the standard `#[test]`
//! harness; a panicking test is caught by [`test_panic_handler`], which
//! reports it over serial and exits QEMU with a failing status.

use core::panic::PanicInfo;

use crate::serial_println;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum QemuExitCode {
    Success = 0x10,
    Failed = 0x11,
}

pub trait Testable {
    fn run(&self);
}

impl<T> Testable for T
where
    T: Fn(),
{
    fn run(&self) {
        serial_println!("{}...", core::any::type_name::<T>());
        self();
    }
}

#[cfg(test)]
pub fn test_runner(tests: &[&dyn Testable]) -> ! {
    serial_println!("Running {} tests", tests.len());
    for test in tests {
        test.run();
    }
    serial_println!("\nTest Results: {} passed", tests.len());
    exit_qemu(QemuExitCode::Success);
}

pub fn test_panic_handler(info: &PanicInfo) -> ! {
    serial_println!("[failed]\n");
    serial_println!("Error: {info}\n");
    exit_qemu(QemuExitCode::Failed);
}

/// Writes `exit_code` to QEMU's isa-debug-exit port (0xf4), which halts
/// the virtual machine with status `(exit_code << 1) | 1`.
pub fn exit_qemu(exit_code: QemuExitCode) -> ! {
    // SAFETY: port 0xf4 is only meaningful under QEMU's isa-debug-exit
    // device, present because `build.rs` passes `-device isa-debug-exit`
    // for test binaries; writing to it halts the VM before returning.
    unsafe { crate::arch::x86::io::outb(0xf4, exit_code as u32 as u8) };
    crate::arch::x86::io::halt_forever();
}
