//! Boots the kernel far enough to exercise bring-up end to end: the
//! descriptor tables load, the PIT starts ticking, and the heap can
//! actually hand out memory.

#![no_std]
#![no_main]

extern crate alloc;

use core::panic::PanicInfo;

use alloc::vec::Vec;
use kestrel_kernel::{exit_qemu, serial_println, test_panic_handler, QemuExitCode};

#[unsafe(no_mangle)]
extern "C" fn kernel_main(_multiboot_magic: u32, _multiboot_info: u32) -> ! {
    // SAFETY: the only thing this test binary's entry point does before
    // running checks.
    unsafe { kestrel_kernel::kernel_init() };

    serial_println!("boot: descriptor tables and heap came up");
    check_heap_allocates();
    check_timer_ticks();

    serial_println!("boot: all checks passed");
    exit_qemu(QemuExitCode::Success)
}

fn check_heap_allocates() {
    let mut v: Vec<u32> = Vec::new();
    for i in 0..64 {
        v.push(i);
    }
    assert_eq!(v.iter().sum::<u32>(), (0..64).sum());
    serial_println!("boot: heap allocation ok");
}

fn check_timer_ticks() {
    let start = kestrel_kernel::timer::ticks();
    kestrel_kernel::timer::sleep_ticks(2);
    assert!(kestrel_kernel::timer::ticks() >= start + 2);
    serial_println!("boot: timer ticks ok");
}

#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    test_panic_handler(info)
}
