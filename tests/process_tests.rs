//! Process table lifecycle: creation, parent/child bookkeeping, the
//! zombie-on-exit rule, and PID reuse after an explicit reap.

#![no_std]
#![no_main]

extern crate alloc;

use core::panic::PanicInfo;

use kestrel_kernel::config::MAX_PROCESSES;
use kestrel_kernel::process::{self, ProcessState};
use kestrel_kernel::{exit_qemu, serial_println, test_panic_handler, QemuExitCode};

#[unsafe(no_mangle)]
extern "C" fn kernel_main(_multiboot_magic: u32, _multiboot_info: u32) -> ! {
    // SAFETY: the only thing this test binary's entry point does before
    // running checks.
    unsafe { kestrel_kernel::kernel_init() };

    check_exit_is_zombie_not_destroyed();
    check_destroy_frees_the_pid_for_reuse();
    check_child_is_recorded_under_parent();

    serial_println!("process_tests: all checks passed");
    exit_qemu(QemuExitCode::Success)
}

/// `exit` must only flip state to `Zombie`; the slot has to survive
/// until a separate `destroy`, since the real syscall path calls `exit`
/// while still executing on the exiting process's own kernel stack.
fn check_exit_is_zombie_not_destroyed() {
    let pid = process::create(None).expect("process table has room");
    process::exit(pid, 7);
    assert_eq!(process::state(pid), Some(ProcessState::Zombie));
    assert!(
        process::kernel_stack_top(pid).is_some(),
        "zombie's kernel stack must still be allocated"
    );
    process::destroy(pid);
    assert_eq!(process::state(pid), None);
    serial_println!("process_tests: exit marks Zombie without destroying the slot");
}

fn check_destroy_frees_the_pid_for_reuse() {
    let first = process::create(None).expect("process table has room");
    process::exit(first, 0);
    process::destroy(first);
    assert_eq!(process::state(first), None);

    // `destroy` must make the slot available again; a fresh `create`
    // scanning from the rolling PID cursor should eventually land back
    // on it rather than treating it as permanently retired.
    let mut reused = false;
    let mut spawned = alloc::vec::Vec::new();
    for _ in 0..MAX_PROCESSES {
        let pid = process::create(None).expect("process table has room");
        if pid == first {
            reused = true;
            spawned.push(pid);
            break;
        }
        spawned.push(pid);
    }
    assert!(reused, "pid {first} was never handed out again after destroy");
    for pid in spawned {
        process::exit(pid, 0);
        process::destroy(pid);
    }
    serial_println!("process_tests: destroyed pid is eligible for reuse");
}

fn check_child_is_recorded_under_parent() {
    let parent = process::create(None).expect("process table has room");
    let child = process::create(Some(parent)).expect("process table has room");
    let children: alloc::vec::Vec<_> = process::process_list()
        .into_iter()
        .map(|(pid, _)| pid)
        .collect();
    assert!(children.contains(&child));
    assert!(children.contains(&parent));

    process::exit(child, 0);
    process::destroy(child);
    process::exit(parent, 0);
    process::destroy(parent);
    serial_println!("process_tests: child pid observable through the process list");
}

#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    test_panic_handler(info)
}
