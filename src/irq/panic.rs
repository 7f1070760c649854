//! CPU exception reporting: a full register dump and a fatal halt. An
//! i386 kernel has nowhere to recover to once the CPU itself has
//! signaled a fault it did not expect.

use crate::arch::x86::interrupts::InterruptFrame;
use crate::arch::x86::io;
use crate::arch::x86::vga::{console_clear, console_set_color, Color, ColorCode};
use crate::mm::paging;

/// Number of stack words dumped below the register set (spec.md §4.11).
const PANIC_STACK_WORDS: u32 = 8;

const EXCEPTION_NAMES: [&str; 32] = [
    "Divide-by-zero",
    "Debug",
    "Non-maskable Interrupt",
    "Breakpoint",
    "Overflow",
    "Bound Range Exceeded",
    "Invalid Opcode",
    "Device Not Available",
    "Double Fault",
    "Coprocessor Segment Overrun",
    "Invalid TSS",
    "Segment Not Present",
    "Stack-Segment Fault",
    "General Protection Fault",
    "Page Fault",
    "Reserved",
    "x87 Floating-Point Exception",
    "Alignment Check",
    "Machine Check",
    "SIMD Floating-Point Exception",
    "Virtualization Exception",
    "Control Protection Exception",
    "Reserved",
    "Reserved",
    "Reserved",
    "Reserved",
    "Reserved",
    "Reserved",
    "Hypervisor Injection Exception",
    "VMM Communication Exception",
    "Security Exception",
    "Reserved",
];

fn exception_name(vector: u32) -> &'static str {
    EXCEPTION_NAMES
        .get(vector as usize)
        .copied()
        .unwrap_or("Unknown")
}

/// Dumps the full trap frame and halts. Called for every unhandled
/// exception (vectors 0-31).
pub fn handle_exception(frame: &InterruptFrame) -> ! {
    console_clear();
    console_set_color(ColorCode::new(Color::White, Color::Red).byte());

    let name = exception_name(frame.int_no);
    crate::println!("\n*** KERNEL PANIC: {name} (vector {}) ***", frame.int_no);
    crate::println!(
        "eip={:#010x} cs={:#06x} eflags={:#010x} esp={:#010x} ds={:#06x} ss={:#06x}",
        frame.eip, frame.cs, frame.eflags, frame.useresp, frame.ds, frame.ss
    );
    crate::println!(
        "eax={:#010x} ebx={:#010x} ecx={:#010x} edx={:#010x}",
        frame.eax, frame.ebx, frame.ecx, frame.edx
    );
    crate::println!(
        "esi={:#010x} edi={:#010x} ebp={:#010x} err_code={:#010x}",
        frame.esi, frame.edi, frame.ebp, frame.err_code
    );

    if frame.int_no == 14 {
        let fault_addr = io::read_cr2();
        let info = paging::decode_page_fault(frame.err_code, fault_addr);
        crate::println!(
            "page fault at {:#010x}: present={} write={} user={}",
            info.faulting_address, info.present, info.write, info.user
        );
    }

    dump_stack_words(frame.esp_at_pusha);
    io::halt_forever();
}

/// Prints the topmost [`PANIC_STACK_WORDS`] words above `esp`.
fn dump_stack_words(esp: u32) {
    crate::println!("stack:");
    for i in 0..PANIC_STACK_WORDS {
        let addr = esp + i * 4;
        // SAFETY: the kernel's single shared page directory identity-maps
        // all of low memory for the entire uptime, so any kernel-stack
        // address is readable; a fault severe enough to have corrupted
        // the stack itself has already made this diagnostic best-effort.
        let word = unsafe { core::ptr::read_volatile(addr as *const u32) };
        crate::println!("  [esp+{:#04x}] = {word:#010x}", i * 4);
    }
}

/// Programmatic panic entry for bring-up assertions that want the same
/// fatal-halt reporting as a CPU exception, without actually faulting.
/// Distinct from `handle_exception`: there is no trap frame to dump,
/// just a message.
pub fn kernel_panic(msg: &str) -> ! {
    crate::println!("\n*** KERNEL PANIC: {msg} ***");
    io::halt_forever();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_case]
    fn exception_names_cover_defined_vectors() {
        assert_eq!(exception_name(0), "Divide-by-zero");
        assert_eq!(exception_name(14), "Page Fault");
        assert_eq!(exception_name(13), "General Protection Fault");
    }

    #[test_case]
    fn out_of_range_vector_is_unknown() {
        assert_eq!(exception_name(200), "Unknown");
    }
}
