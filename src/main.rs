//! Kernel entry point: reached from `arch::x86::boot`'s `_start` once the
//! Multiboot loader has handed off in 32-bit protected mode with paging
//! disabled.

#![no_std]
#![no_main]

extern crate alloc;

use core::panic::PanicInfo;

use kestrel_kernel::arch::x86::usermode::DemoProgram;
use kestrel_kernel::config::{USER_REGION_BASE, USER_REGION_STRIDE, USER_STACK_OFFSET};
use kestrel_kernel::{arch, println};

const MULTIBOOT_BOOTLOADER_MAGIC: u32 = 0x2BAD_B002;

#[unsafe(no_mangle)]
extern "C" fn kernel_main(multiboot_magic: u32, _multiboot_info: u32) -> ! {
    // SAFETY: this is the first and only call, made once at boot before
    // anything else touches descriptor tables, the heap, or paging.
    unsafe { kestrel_kernel::kernel_init() };

    println!("kestrel kernel starting (build {})", &env!("GIT_HASH")[..12]);
    if multiboot_magic != MULTIBOOT_BOOTLOADER_MAGIC {
        log::warn!("unexpected multiboot magic {multiboot_magic:#x}");
    }

    spawn_demo_process(1, DemoProgram::Hello);
    spawn_demo_process(2, DemoProgram::Spin);

    arch::interrupts_enable();
    loop {
        kestrel_kernel::sched::yield_now();
        arch::hlt();
    }
}

/// Materializes a built-in demo program into process `pid`'s user
/// region and enqueues it on the scheduler. `pid` is used directly as
/// the window index since bring-up only ever creates a couple of these.
fn spawn_demo_process(pid: u32, program: DemoProgram) {
    use kestrel_kernel::process;

    let created = process::create(None).expect("process table has room at bring-up");
    let region_base = USER_REGION_BASE + pid as usize * USER_REGION_STRIDE;
    let code_ptr = region_base as *mut u8;
    // SAFETY: each demo process gets its own non-overlapping window in
    // the identity-mapped low-memory region, reserved for exactly this
    // purpose and executable under the kernel's single shared directory.
    unsafe { program.copy_to(code_ptr) };

    let user_stack_top = (region_base + USER_STACK_OFFSET) as u32;
    let kernel_stack_top =
        process::kernel_stack_top(created).expect("just-created process has a kernel stack");

    // SAFETY: `kernel_stack_top` is the fresh, exclusively-owned top of
    // `created`'s kernel stack; nothing has run on it yet.
    let iret_frame_esp = unsafe {
        arch::x86::usermode::build_iret_frame(kernel_stack_top, region_base as u32, user_stack_top)
    };

    // SAFETY: `iret_frame_esp` sits inside the same reserved stack and
    // leaves room below it for the context-switch frame `schedule`
    // expects the first switch to find.
    let initial_esp = unsafe {
        arch::x86::context::build_initial_stack(iret_frame_esp, entry_trampoline as usize as u32)
    };
    process::set_kernel_esp(created, initial_esp);
    kestrel_kernel::sched::enqueue(created);
}

/// The "return address" every freshly-built process stack lands on:
/// drops straight to ring 3 via `iretd`, using whatever frame
/// `build_iret_frame` already wrote just above the current stack
/// pointer.
#[unsafe(no_mangle)]
extern "C" fn entry_trampoline() -> ! {
    // SAFETY: reached only via the synthetic initial stack built in
    // `spawn_demo_process`, which guarantees a valid iret frame sits
    // immediately above the current stack pointer.
    unsafe {
        core::arch::asm!("iretd", options(noreturn));
    }
}

#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    println!("\n*** KERNEL PANIC: {info} ***");
    arch::halt();
}
