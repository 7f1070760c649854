//! The canonical interrupt entry frame and the low-level assembly stubs
//! that build it, shared by every exception, IRQ, and the syscall gate.
//!
//! Layout matches a `pusha` group followed by `int_no`/`err_code` and the
//! CPU-pushed trap frame; declaration order top-to-bottom mirrors memory
//! low-to-high address order (closest to the current stack pointer first).

use core::arch::global_asm;

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct InterruptFrame {
    pub ds: u32,
    pub edi: u32,
    pub esi: u32,
    pub ebp: u32,
    /// Value ESP held at the point `pusha` executed; not restored on
    /// return (the CPU re-derives the real stack pointer from `useresp`).
    pub esp_at_pusha: u32,
    pub ebx: u32,
    pub edx: u32,
    pub ecx: u32,
    pub eax: u32,
    pub int_no: u32,
    pub err_code: u32,
    pub eip: u32,
    pub cs: u32,
    pub eflags: u32,
    pub useresp: u32,
    pub ss: u32,
}

macro_rules! declare_stub {
    ($($name:ident),* $(,)?) => {
        unsafe extern "C" { $(pub fn $name();)* }
    };
}

declare_stub!(
    isr0, isr1, isr2, isr3, isr4, isr5, isr6, isr7, isr8, isr9, isr10, isr11, isr12, isr13,
    isr14, isr15, isr16, isr17, isr18, isr19, isr20, isr21, isr22, isr23, isr24, isr25, isr26,
    isr27, isr28, isr29, isr30, isr31, irq0, irq1, irq2, irq3, irq4, irq5, irq6, irq7, irq8, irq9,
    irq10, irq11, irq12, irq13, irq14, irq15, isr128,
);

/// Addresses of `isr0..isr31`, in order, for filling the exception gates.
pub fn exception_stub_addrs() -> [usize; 32] {
    [
        isr0 as usize,
        isr1 as usize,
        isr2 as usize,
        isr3 as usize,
        isr4 as usize,
        isr5 as usize,
        isr6 as usize,
        isr7 as usize,
        isr8 as usize,
        isr9 as usize,
        isr10 as usize,
        isr11 as usize,
        isr12 as usize,
        isr13 as usize,
        isr14 as usize,
        isr15 as usize,
        isr16 as usize,
        isr17 as usize,
        isr18 as usize,
        isr19 as usize,
        isr20 as usize,
        isr21 as usize,
        isr22 as usize,
        isr23 as usize,
        isr24 as usize,
        isr25 as usize,
        isr26 as usize,
        isr27 as usize,
        isr28 as usize,
        isr29 as usize,
        isr30 as usize,
        isr31 as usize,
    ]
}

/// Addresses of `irq0..irq15`, in order, for filling the hardware-IRQ
/// gates (vectors 0x20-0x2F).
pub fn irq_stub_addrs() -> [usize; 16] {
    [
        irq0 as usize,
        irq1 as usize,
        irq2 as usize,
        irq3 as usize,
        irq4 as usize,
        irq5 as usize,
        irq6 as usize,
        irq7 as usize,
        irq8 as usize,
        irq9 as usize,
        irq10 as usize,
        irq11 as usize,
        irq12 as usize,
        irq13 as usize,
        irq14 as usize,
        irq15 as usize,
    ]
}

/// Address of the syscall gate stub (vector 0x80).
pub fn syscall_stub_addr() -> usize {
    isr128 as usize
}

global_asm!(
    r#"
.macro isr_noerr num
.global isr\num
isr\num:
    push 0
    push \num
    jmp interrupt_common_stub
.endm

.macro isr_err num
.global isr\num
isr\num:
    push \num
    jmp interrupt_common_stub
.endm

.irp n,0,1,2,3,4,5,6,7,9,15,16,18,19,20,21,22,23,24,25,26,27,28,29,30,31
    isr_noerr \n
.endr
.irp n,8,10,11,12,13,14,17
    isr_err \n
.endr

.macro irq_stub num, vector
.global irq\num
irq\num:
    push 0
    push \vector
    jmp interrupt_common_stub
.endm

irq_stub 0,32
irq_stub 1,33
irq_stub 2,34
irq_stub 3,35
irq_stub 4,36
irq_stub 5,37
irq_stub 6,38
irq_stub 7,39
irq_stub 8,40
irq_stub 9,41
irq_stub 10,42
irq_stub 11,43
irq_stub 12,44
irq_stub 13,45
irq_stub 14,46
irq_stub 15,47

.global isr128
isr128:
    push 0
    push 0x80
    jmp interrupt_common_stub

interrupt_common_stub:
    push ds
    pushad
    mov ax, 0x10
    mov ds, ax
    mov es, ax
    mov fs, ax
    mov gs, ax
    push esp
    call interrupt_dispatch
    add esp, 4
    popad
    pop ds
    add esp, 8
    iretd
"#
);

#[unsafe(no_mangle)]
extern "C" fn interrupt_dispatch(frame: *mut InterruptFrame) {
    // SAFETY: `frame` points at the stack-resident InterruptFrame just
    // built by `interrupt_common_stub`, valid for the duration of this
    // call.
    let frame = unsafe { &mut *frame };
    match frame.int_no {
        0..=31 => crate::irq::panic::handle_exception(frame),
        0x20..=0x2f => crate::irq::dispatch_hardware(frame),
        0x80 => crate::syscall::dispatch(frame),
        other => {
            log::warn!("unexpected interrupt vector {other:#x}");
        }
    }
}
