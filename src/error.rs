//! Kernel-wide error type.
//!
//! Subsystems that can fail without panicking (heap exhaustion, process
//! table exhaustion, paging lookups) report through `KernelError` rather
//! than string literals, so callers can match on a stable set of variants.

use core::fmt;

pub type KernelResult<T> = Result<T, KernelError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "kernel errors must be handled, not silently discarded"]
pub enum KernelError {
    /// A fixed-capacity resource has no room left.
    ResourceExhausted { resource: &'static str },
    /// A subsystem was used before its `init()` ran.
    NotInitialized { subsystem: &'static str },
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelError::ResourceExhausted { resource } => {
                write!(f, "{resource} exhausted")
            }
            KernelError::NotInitialized { subsystem } => {
                write!(f, "{subsystem} not initialized")
            }
        }
    }
}
