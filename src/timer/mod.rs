//! Tick counting and busy-wait delays built on the PIT.

use crate::arch::x86::{io, pit};

/// Total ticks since the timer was programmed.
pub fn ticks() -> u32 {
    pit::ticks()
}

/// Configured tick rate in Hz.
pub fn frequency_hz() -> u32 {
    pit::frequency_hz()
}

/// Busy-waits (halting between ticks to save power) for `count` ticks.
pub fn sleep_ticks(count: u32) {
    let target = ticks().wrapping_add(count);
    while ticks() < target {
        io::hlt();
    }
}

/// Busy-waits for approximately `ms` milliseconds, rounding up to the
/// nearest whole tick.
pub fn sleep_ms(ms: u32) {
    let hz = frequency_hz().max(1);
    let ticks_needed = (ms.saturating_mul(hz) + 999) / 1000;
    sleep_ticks(ticks_needed.max(1));
}

/// Invoked from the IRQ0 handler on every timer interrupt.
pub fn on_tick() -> u32 {
    let t = pit::on_irq();
    crate::sched::on_tick();
    t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_case]
    fn sleep_ms_rounds_up_to_a_whole_tick() {
        assert_eq!((1u32.saturating_mul(100) + 999) / 1000, 1);
        assert_eq!((0u32.saturating_mul(100) + 999) / 1000, 0);
    }
}
