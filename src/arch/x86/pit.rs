//! Programmable Interval Timer (8253/8254), channel 0 in rate-generator
//! mode driving IRQ0. Separate from `crate::timer`, which layers the
//! scheduler tick and sleep primitives on top of this hardware driver.

use core::sync::atomic::{AtomicU32, Ordering};

use super::io::outb;
use super::pic;

const CHANNEL0: u16 = 0x40;
const COMMAND: u16 = 0x43;
const BASE_FREQUENCY_HZ: u32 = 1_193_182;

const SELECT_CH0: u8 = 0 << 6;
const ACCESS_LOHI: u8 = 3 << 4;
const MODE2_RATE_GENERATOR: u8 = 2 << 1;

static EFFECTIVE_FREQUENCY_HZ: AtomicU32 = AtomicU32::new(0);
static TICKS: AtomicU32 = AtomicU32::new(0);

/// Computes `divisor = 1_193_182 / hz`, clamps to `[1, 65535]`, programs
/// channel 0 in rate-generator mode with that divisor, and unmasks IRQ0.
pub fn init(hz: u32) {
    let hz = hz.max(1);
    let divisor = (BASE_FREQUENCY_HZ / hz).clamp(1, 65535);
    EFFECTIVE_FREQUENCY_HZ.store(BASE_FREQUENCY_HZ / divisor, Ordering::Relaxed);

    let command = SELECT_CH0 | ACCESS_LOHI | MODE2_RATE_GENERATOR;
    // SAFETY: documented PIT programming sequence; low byte then high byte
    // to the channel-0 data port after selecting it via the command port.
    unsafe {
        outb(COMMAND, command);
        outb(CHANNEL0, (divisor & 0xFF) as u8);
        outb(CHANNEL0, ((divisor >> 8) & 0xFF) as u8);
    }
    pic::enable_irq(0);
}

/// Effective tick frequency actually achieved after divisor rounding.
pub fn frequency_hz() -> u32 {
    EFFECTIVE_FREQUENCY_HZ.load(Ordering::Relaxed)
}

/// Called from the IRQ0 handler: bumps the monotonic tick counter.
pub fn on_irq() -> u32 {
    TICKS.fetch_add(1, Ordering::SeqCst) + 1
}

/// Monotonic tick count since `init`.
pub fn ticks() -> u32 {
    TICKS.load(Ordering::SeqCst)
}
