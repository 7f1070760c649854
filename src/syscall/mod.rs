//! `int 0x80` syscall dispatch. Number in `eax`, up to three arguments in
//! `ebx`/`ecx`/`edx`, return value written back into `eax`.

use crate::arch::x86::interrupts::InterruptFrame;
use crate::process;

const SYS_EXIT: u32 = 1;
const SYS_WRITE: u32 = 2;
const SYS_READ: u32 = 3;
const SYS_YIELD: u32 = 4;

const ENOSYS: i32 = -1;

pub fn dispatch(frame: &mut InterruptFrame) {
    let result = match frame.eax {
        SYS_EXIT => sys_exit(frame.ebx as i32),
        SYS_WRITE => sys_write(frame.ebx, frame.ecx, frame.edx),
        SYS_READ => sys_read(frame.ebx, frame.ecx, frame.edx),
        SYS_YIELD => sys_yield(),
        other => {
            log::warn!("unknown syscall number {other}");
            ENOSYS
        }
    };
    frame.eax = result as u32;
}

/// Terminates the calling process and switches to whatever runs next.
/// Never returns to the caller: the process that invoked this syscall
/// is never scheduled again.
fn sys_exit(code: i32) -> i32 {
    if let Some(pid) = process::current() {
        process::exit(pid, code);
        crate::sched::schedule();
    }
    0
}

/// Writes up to `len` bytes from `buf` to the console if `fd` is stdout
/// or stderr. A NUL byte stops output early but the syscall still
/// reports the full requested length, matching the write(2) contract of
/// "this many bytes were accepted" rather than "this many were visibly
/// printed".
fn sys_write(fd: u32, buf: u32, len: u32) -> i32 {
    if buf == 0 || len == 0 {
        return 0;
    }
    if fd != 1 && fd != 2 {
        return ENOSYS;
    }
    // SAFETY: the kernel's single shared page directory identity-maps
    // every process's memory, so a user-supplied pointer is dereferenceable
    // kernel-side; out-of-range pointers are this bring-up kernel's
    // accepted risk (see the syscall module's Non-goals).
    let bytes = unsafe { core::slice::from_raw_parts(buf as *const u8, len as usize) };
    for &byte in bytes {
        if byte == 0 {
            break;
        }
        crate::arch::x86::vga::console_put_byte(byte);
    }
    len as i32
}

/// Always reports failure: no input device is wired up to stdin yet.
fn sys_read(_fd: u32, _buf: u32, _len: u32) -> i32 {
    ENOSYS
}

fn sys_yield() -> i32 {
    crate::sched::yield_now();
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_case]
    fn write_with_null_buffer_is_a_no_op() {
        assert_eq!(sys_write(1, 0, 10), 0);
    }

    #[test_case]
    fn write_with_zero_length_is_a_no_op() {
        assert_eq!(sys_write(1, 0x1000, 0), 0);
    }

    #[test_case]
    fn write_to_bad_fd_fails() {
        assert_eq!(sys_write(7, 0x1000, 4), ENOSYS);
    }

    #[test_case]
    fn read_is_always_unimplemented() {
        assert_eq!(sys_read(0, 0, 0), ENOSYS);
    }
}
