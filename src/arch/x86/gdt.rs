//! Global Descriptor Table and Task State Segment.
//!
//! Six fixed entries: null, ring-0 code, ring-0 data, ring-3 code,
//! ring-3 data, TSS. Selectors are the byte offsets into the table, so
//! entry order fixes the selector values used everywhere else in the
//! kernel (`SEL_KERNEL_CODE` etc.).

use core::arch::asm;
use core::mem::size_of;

use lazy_static::lazy_static;
use spin::Mutex;

/// Selector for the ring-0 code segment.
pub const SEL_KERNEL_CODE: u16 = 0x08;
/// Selector for the ring-0 data segment.
pub const SEL_KERNEL_DATA: u16 = 0x10;
/// Selector for the ring-3 code segment (RPL 3 already folded in).
pub const SEL_USER_CODE: u16 = 0x1B;
/// Selector for the ring-3 data segment (RPL 3 already folded in).
pub const SEL_USER_DATA: u16 = 0x23;
/// Selector for the TSS descriptor.
pub const SEL_TSS: u16 = 0x28;

const GDT_ENTRIES: usize = 6;

const ACCESS_PRESENT: u8 = 1 << 7;
const ACCESS_RING3: u8 = 3 << 5;
const ACCESS_SYSTEM: u8 = 1 << 4; // code/data, not a system descriptor
const ACCESS_EXECUTABLE: u8 = 1 << 3;
const ACCESS_RW: u8 = 1 << 1;
const ACCESS_TSS_TYPE: u8 = 0x9; // 32-bit TSS (available)

const GRAN_4K: u8 = 1 << 7;
const GRAN_32BIT: u8 = 1 << 6;

#[repr(C, packed)]
#[derive(Clone, Copy)]
struct GdtEntry {
    limit_low: u16,
    base_low: u16,
    base_mid: u8,
    access: u8,
    granularity: u8,
    base_high: u8,
}

impl GdtEntry {
    const fn null() -> Self {
        GdtEntry {
            limit_low: 0,
            base_low: 0,
            base_mid: 0,
            access: 0,
            granularity: 0,
            base_high: 0,
        }
    }

    fn new(base: u32, limit: u32, access: u8, granularity: u8) -> Self {
        GdtEntry {
            limit_low: (limit & 0xFFFF) as u16,
            base_low: (base & 0xFFFF) as u16,
            base_mid: ((base >> 16) & 0xFF) as u8,
            access,
            granularity: (granularity & 0xF0) | (((limit >> 16) & 0x0F) as u8),
            base_high: ((base >> 24) & 0xFF) as u8,
        }
    }
}

#[repr(C, packed)]
struct GdtPointer {
    limit: u16,
    base: u32,
}

#[repr(C, packed)]
#[derive(Clone, Copy)]
pub struct Tss {
    pub prev_tss: u32,
    pub esp0: u32,
    pub ss0: u32,
    pub esp1: u32,
    pub ss1: u32,
    pub esp2: u32,
    pub ss2: u32,
    pub cr3: u32,
    pub eip: u32,
    pub eflags: u32,
    pub eax: u32,
    pub ecx: u32,
    pub edx: u32,
    pub ebx: u32,
    pub esp: u32,
    pub ebp: u32,
    pub esi: u32,
    pub edi: u32,
    pub es: u32,
    pub cs: u32,
    pub ss: u32,
    pub ds: u32,
    pub fs: u32,
    pub gs: u32,
    pub ldt: u32,
    pub trap: u16,
    pub iomap_base: u16,
}

impl Tss {
    const fn new() -> Self {
        // SAFETY-relevant invariant lives in `init`: iomap_base is set to
        // size_of::<Tss>() so no I/O permission bitmap is consulted.
        Tss {
            prev_tss: 0,
            esp0: 0,
            ss0: 0,
            esp1: 0,
            ss1: 0,
            esp2: 0,
            ss2: 0,
            cr3: 0,
            eip: 0,
            eflags: 0,
            eax: 0,
            ecx: 0,
            edx: 0,
            ebx: 0,
            esp: 0,
            ebp: 0,
            esi: 0,
            edi: 0,
            es: 0,
            cs: 0,
            ss: 0,
            ds: 0,
            fs: 0,
            gs: 0,
            ldt: 0,
            trap: 0,
            iomap_base: 0,
        }
    }
}

lazy_static! {
    pub static ref TSS: Mutex<Tss> = Mutex::new(Tss::new());
}

static mut GDT: [GdtEntry; GDT_ENTRIES] = [GdtEntry::null(); GDT_ENTRIES];

/// Builds the six-entry GDT, installs the TSS descriptor, loads both the
/// GDT register and the task register, and reloads every segment
/// register so subsequent code runs with known selectors.
pub fn init() {
    let code_access =
        ACCESS_PRESENT | ACCESS_SYSTEM | ACCESS_EXECUTABLE | ACCESS_RW;
    let data_access = ACCESS_PRESENT | ACCESS_SYSTEM | ACCESS_RW;
    let gran = GRAN_4K | GRAN_32BIT;

    // SAFETY: single-threaded bring-up, no interrupts delivered yet; the
    // static is only ever touched from this function and `set_kernel_stack`
    // does not mutate the GDT itself.
    unsafe {
        let gdt = &mut *core::ptr::addr_of_mut!(GDT);
        gdt[0] = GdtEntry::null();
        gdt[1] = GdtEntry::new(0, 0xFFFFF, code_access, gran);
        gdt[2] = GdtEntry::new(0, 0xFFFFF, data_access, gran);
        gdt[3] = GdtEntry::new(0, 0xFFFFF, code_access | ACCESS_RING3, gran);
        gdt[4] = GdtEntry::new(0, 0xFFFFF, data_access | ACCESS_RING3, gran);
    }

    {
        let mut tss = TSS.lock();
        tss.ss0 = SEL_KERNEL_DATA as u32;
        tss.iomap_base = size_of::<Tss>() as u16;
        let tss_base = &*tss as *const Tss as u32;
        let tss_limit = (size_of::<Tss>() - 1) as u32;
        // SAFETY: see above; entries 0..=4 were just written, entry 5 is
        // ours to fill.
        unsafe {
            let gdt = &mut *core::ptr::addr_of_mut!(GDT);
            gdt[5] = GdtEntry::new(
                tss_base,
                tss_limit,
                ACCESS_PRESENT | ACCESS_TSS_TYPE,
                0,
            );
        }
    }

    let ptr = GdtPointer {
        limit: (size_of::<[GdtEntry; GDT_ENTRIES]>() - 1) as u16,
        // SAFETY: reading the address of a static is always sound.
        base: unsafe { core::ptr::addr_of!(GDT) as u32 },
    };

    // SAFETY: `ptr` describes the GDT built above; reloading segment
    // registers with the selectors we just installed is the documented
    // way to make a new GDT take effect. The far jump reloads CS via a
    // retf-style trick by pushing a return address under the new CS.
    unsafe {
        asm!(
            "lgdt [{ptr}]",
            "mov ax, {kdata:x}",
            "mov ds, ax",
            "mov es, ax",
            "mov fs, ax",
            "mov gs, ax",
            "mov ss, ax",
            "push {kcode:e}",
            "lea eax, [2f]",
            "push eax",
            "retf",
            "2:",
            "mov ax, {tss:x}",
            "ltr ax",
            ptr = in(reg) &ptr,
            kdata = in(reg) SEL_KERNEL_DATA,
            kcode = in(reg) SEL_KERNEL_CODE as u32,
            tss = in(reg) SEL_TSS,
            out("eax") _,
            options(nostack),
        );
    }
}

/// Updates only `esp0`; must be called on every context switch before the
/// incoming process can trap back into ring 0.
pub fn set_kernel_stack(stack_top: u32) {
    TSS.lock().esp0 = stack_top;
}

/// Current ring-0 stack pointer published in the TSS.
pub fn kernel_stack() -> u32 {
    TSS.lock().esp0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_case]
    fn selectors_match_fixed_layout() {
        assert_eq!(SEL_KERNEL_CODE, 0x08);
        assert_eq!(SEL_KERNEL_DATA, 0x10);
        assert_eq!(SEL_USER_CODE, 0x1B);
        assert_eq!(SEL_USER_DATA, 0x23);
        assert_eq!(SEL_TSS, 0x28);
    }

    #[test_case]
    fn tss_size_is_stable() {
        assert_eq!(size_of::<Tss>(), 104);
    }
}
