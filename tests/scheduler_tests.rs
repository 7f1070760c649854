//! Exercises one real context switch end to end: a process built with
//! [`kestrel_kernel::arch::x86::context::build_initial_stack`] actually
//! becomes the running process when handed to the scheduler.
//!
//! A switch is one-directional (it lands in the new process's entry
//! point and never returns to the caller), so the assertions live in
//! that entry point rather than back in `kernel_main`.

#![no_std]
#![no_main]

use core::panic::PanicInfo;

use kestrel_kernel::arch::x86::context::build_initial_stack;
use kestrel_kernel::process::{self, ProcessState};
use kestrel_kernel::{exit_qemu, sched, serial_println, test_panic_handler, QemuExitCode};

static mut TARGET_PID: process::Pid = 0;

#[unsafe(no_mangle)]
extern "C" fn kernel_main(_multiboot_magic: u32, _multiboot_info: u32) -> ! {
    // SAFETY: the only thing this test binary's entry point does before
    // running checks.
    unsafe { kestrel_kernel::kernel_init() };

    let target = process::create(None).expect("process table has room");
    assert_eq!(process::state(target), Some(ProcessState::New));
    serial_println!("scheduler_tests: freshly created process starts New");

    let stack_top = process::kernel_stack_top(target).expect("new process has a kernel stack");
    // SAFETY: `stack_top` is `target`'s freshly-allocated, exclusively
    // owned kernel stack; nothing has run on it yet.
    let esp = unsafe { build_initial_stack(stack_top, switched_in as usize as u32) };
    process::set_kernel_esp(target, esp);
    sched::enqueue(target);
    assert_eq!(process::state(target), Some(ProcessState::Ready));

    // SAFETY: `TARGET_PID` is written once, here, strictly before the
    // only read of it (in `switched_in`, reachable only after the
    // `schedule()` call below hands off to that process).
    unsafe { TARGET_PID = target };

    sched::schedule();
    unreachable!("schedule() switches stacks and never returns to its caller");
}

/// Lands here once the scheduler switches to `target` for the first
/// time. Control may reach this point after either `schedule()` call
/// above, depending on ready-queue order, so it only asserts that
/// whichever process landed here really is the one the scheduler
/// thinks is running.
extern "C" fn switched_in() -> ! {
    // SAFETY: read-after-write-before-switch, see the write site.
    let target = unsafe { TARGET_PID };
    let running = process::current();
    assert_eq!(running, Some(target));
    assert_eq!(process::state(target), Some(ProcessState::Running));
    serial_println!("scheduler_tests: context switch landed in the expected process");
    exit_qemu(QemuExitCode::Success)
}

#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    test_panic_handler(info)
}
