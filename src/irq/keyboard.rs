//! Minimal IRQ1 handler: drains the one pending scancode from the
//! keyboard controller's output buffer so the controller can raise the
//! next interrupt. Nothing decodes the scancode yet; this exists so the
//! IRQ is acknowledged rather than firing forever.

use crate::arch::x86::io;

const DATA_PORT: u16 = 0x60;

pub fn on_irq() {
    // SAFETY: 0x60 is the standard PS/2 controller data port; reading it
    // after IRQ1 fires is always defined and required to clear the IRQ.
    let _scancode = unsafe { io::inb(DATA_PORT) };
}
