//! Boot-time tunables.
//!
//! A kernel has no runtime configuration file; these are the constants
//! spec-level text leaves as named values rather than hardcoding them at
//! each call site.

/// PIT frequency the kernel programs at bring-up.
pub const PIT_FREQUENCY_HZ: u32 = 100;

/// Ticks granted to a process when it starts running.
pub const DEFAULT_QUANTUM_TICKS: u32 = 10;

/// Start of the fixed kernel heap region.
pub const HEAP_START: usize = 0x0020_0000;

/// Size of the fixed kernel heap region (4 MiB).
pub const HEAP_SIZE: usize = 4 * 1024 * 1024;

/// Fixed capacity of the process table.
pub const MAX_PROCESSES: usize = 256;

/// Maximum recorded children per process.
pub const MAX_CHILDREN: usize = 16;

/// Size of a kernel-mode stack allocated per process.
pub const KERNEL_STACK_SIZE: usize = 4096;

/// Fixed capacity of a PCB's stored name.
pub const MAX_NAME_LEN: usize = 16;

/// Size of a user-mode stack allocated per process.
pub const USER_STACK_SIZE: usize = 4096;

/// Base of the per-process user code/stack region; process `pid` gets the
/// window `[USER_REGION_BASE + pid * USER_REGION_STRIDE, .. + USER_REGION_STRIDE)`.
pub const USER_REGION_BASE: usize = 0x0040_0000;

/// Size of the window reserved per process in the user code/stack region.
pub const USER_REGION_STRIDE: usize = 0x0010_0000;

/// Offset within a process's user region where its stack begins.
pub const USER_STACK_OFFSET: usize = 0x0008_0000;

/// Size of the per-process user stack within its region.
pub const USER_STACK_WINDOW: usize = 0x0000_4000;
