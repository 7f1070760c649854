//! Ring-3 entry trampoline: builds the `iret` frame that drops a process
//! from ring 0 to ring 3, and carries two tiny demo user-mode programs used
//! by bring-up to exercise the syscall gate end to end.

use core::arch::{asm, global_asm};

use super::gdt::{SEL_USER_CODE, SEL_USER_DATA};

/// `eflags` value installed for every new user-mode process: interrupt
/// flag set, reserved bit 1 set, nothing else.
pub const USER_EFLAGS: u32 = 0x202;

/// Current Code Segment's requested privilege level (CPL).
pub fn current_privilege_level() -> u8 {
    let cs: u16;
    // SAFETY: reading CS has no side effects.
    unsafe {
        asm!("mov {0:x}, cs", out(reg) cs, options(nomem, nostack, preserves_flags));
    }
    (cs & 0x3) as u8
}

/// Writes an `iret` frame, top-down, at `kernel_stack_top`: SS, user ESP,
/// EFLAGS, CS, EIP — in that push order, so EIP ends up closest to the
/// resulting stack pointer (popped first by `iret`). Returns the new
/// (lower) stack pointer the frame now occupies.
///
/// # Safety
/// `kernel_stack_top` must be a 4-byte-aligned address with at least five
/// `u32` words of valid, exclusively-owned stack memory below it.
pub unsafe fn build_iret_frame(kernel_stack_top: u32, user_eip: u32, user_esp: u32) -> u32 {
    let mut sp = kernel_stack_top;
    let mut push = |value: u32| {
        sp -= 4;
        // SAFETY: caller guarantees `kernel_stack_top` has room for five
        // words below it; each push stays within that range.
        unsafe { core::ptr::write(sp as *mut u32, value) };
    };
    push(SEL_USER_DATA as u32); // SS
    push(user_esp); // user ESP
    push(USER_EFLAGS); // EFLAGS
    push(SEL_USER_CODE as u32); // CS
    push(user_eip); // EIP
    sp
}

// Two trivial position-independent user-mode programs, assembled directly
// into the kernel image and copied byte-for-byte into a process's user
// code region at creation time (the same technique used to materialize
// hand-assembled demo processes without an ELF loader).
global_asm!(
    r#"
.global user_program_spin
user_program_spin:
    mov eax, 4      # SYS_YIELD
    int 0x80
    jmp user_program_spin
user_program_spin_end:

.global user_program_hello
user_program_hello:
    mov eax, 2      # SYS_WRITE
    mov ebx, 1      # fd = stdout
    lea ecx, [hello_msg]
    mov edx, 3
    int 0x80
    mov eax, 1      # SYS_EXIT
    mov ebx, 0
    int 0x80
hello_msg:
    .ascii "hi\n"
user_program_hello_end:
"#
);

unsafe extern "C" {
    fn user_program_spin();
    fn user_program_spin_end();
    fn user_program_hello();
    fn user_program_hello_end();
}

/// A built-in demo user program identified by name, copyable into a
/// process's user code region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoProgram {
    /// Repeatedly yields the CPU; never exits on its own.
    Spin,
    /// Writes "hi\n" to the console via `write(1, ..)` then exits.
    Hello,
}

impl DemoProgram {
    fn span(self) -> (usize, usize) {
        match self {
            DemoProgram::Spin => (
                user_program_spin as usize,
                user_program_spin_end as usize,
            ),
            DemoProgram::Hello => (
                user_program_hello as usize,
                user_program_hello_end as usize,
            ),
        }
    }

    /// Byte length of this program's machine code.
    pub fn len(self) -> usize {
        let (start, end) = self.span();
        end - start
    }

    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    /// Copies this program's machine code to `dest`.
    ///
    /// # Safety
    /// `dest` must point to at least `self.len()` bytes of valid,
    /// exclusively-owned, executable memory.
    pub unsafe fn copy_to(self, dest: *mut u8) {
        let (start, len) = (self.span().0, self.len());
        // SAFETY: `start` is the address of a function embedded in this
        // binary's text section and `len` is the exact span between its
        // start and end labels; `dest` validity is the caller's
        // responsibility per this function's safety doc.
        unsafe {
            core::ptr::copy_nonoverlapping(start as *const u8, dest, len);
        }
    }
}
