//! Physical/virtual memory management: the kernel heap and paging.

pub mod heap;
pub mod paging;

pub use heap::{kcalloc, krealloc, stats as heap_stats, HeapStats};
pub use paging::{PhysAddr, VirtAddr};

/// Brings up the heap and identity-maps the first 4 MiB of physical
/// memory before paging is turned on.
///
/// # Safety
/// Must run exactly once, before interrupts are enabled, with no other
/// code touching `HEAP_START..HEAP_START+HEAP_SIZE` or the page tables.
pub unsafe fn init() {
    heap::init();
    // SAFETY: forwarded to `paging::init`/`paging::enable`, same caller
    // obligation. The identity map covers every physical page touched
    // during bring-up, so turning the paging bit on here is transparent
    // to code that has not yet been taught about virtual addresses.
    unsafe {
        paging::init();
        paging::enable();
    }
}
