//! Wires the `log` facade to the kernel's own output: everything at
//! `Info` and above goes to the VGA console, everything at `Debug` and
//! above also goes out the serial port. This module only owns *where*
//! records land, not how they're formatted — that's `log::Record`'s job.

use log::{Level, LevelFilter, Log, Metadata, Record};

struct KernelLogger;

static LOGGER: KernelLogger = KernelLogger;

impl Log for KernelLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Debug
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        crate::serial_println!("[{}] {}", record.level(), record.args());
        if record.level() <= Level::Info {
            crate::println!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

/// Installs the kernel logger as the `log` crate's global sink.
///
/// # Safety
/// Must run before any code calls into the `log` macros, and only once.
pub fn init() {
    log::set_logger(&LOGGER)
        .map(|()| log::set_max_level(LevelFilter::Debug))
        .expect("logger must not be installed twice");
}
