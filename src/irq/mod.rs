//! Routing for CPU exceptions (vectors 0-31) and hardware IRQs
//! (vectors 32-47).

pub mod keyboard;
pub mod panic;

use crate::arch::x86::interrupts::InterruptFrame;
use crate::arch::x86::pic;

/// Routes a hardware interrupt (vector 32-47) to its handler and sends
/// the PIC end-of-interrupt.
pub fn dispatch_hardware(frame: &mut InterruptFrame) {
    let irq = (frame.int_no - 0x20) as u8;
    match irq {
        0 => {
            crate::timer::on_tick();
        }
        1 => keyboard::on_irq(),
        other => {
            log::warn!("unhandled IRQ {other}");
        }
    }
    pic::send_eoi(irq);
}
