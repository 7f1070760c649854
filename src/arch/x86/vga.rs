//! VGA text-mode console: the diagnostics byte-sink boundary collaborator.
//!
//! Only `console_put_byte`/`console_clear`/`console_set_color` and the
//! `fmt::Write` impl used by the `print!`/`println!` macros are load-bearing
//! for the rest of the kernel; scrolling/cursor bookkeeping are internal.

use core::fmt;
use core::ptr::{read_volatile, write_volatile};

use lazy_static::lazy_static;
use spin::Mutex;

const VGA_WIDTH: usize = 80;
const VGA_HEIGHT: usize = 25;
const VGA_ADDRESS: usize = 0xb8000;

#[allow(dead_code)]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Black = 0,
    Blue = 1,
    Green = 2,
    Cyan = 3,
    Red = 4,
    Magenta = 5,
    Brown = 6,
    LightGray = 7,
    DarkGray = 8,
    LightBlue = 9,
    LightGreen = 10,
    LightCyan = 11,
    LightRed = 12,
    Pink = 13,
    Yellow = 14,
    White = 15,
}

#[repr(transparent)]
#[derive(Clone, Copy)]
pub struct ColorCode(u8);

impl ColorCode {
    pub const fn new(foreground: Color, background: Color) -> ColorCode {
        ColorCode((background as u8) << 4 | (foreground as u8))
    }

    pub const fn byte(self) -> u8 {
        self.0
    }
}

#[repr(C)]
#[derive(Clone, Copy)]
struct ScreenChar {
    ascii_character: u8,
    color_code: u8,
}

#[repr(transparent)]
struct Buffer {
    chars: [[ScreenChar; VGA_WIDTH]; VGA_HEIGHT],
}

pub struct Writer {
    column: usize,
    row: usize,
    color_code: ColorCode,
    buffer: &'static mut Buffer,
}

impl Writer {
    fn write_byte(&mut self, byte: u8) {
        match byte {
            b'\n' => self.new_line(),
            byte => {
                if self.column >= VGA_WIDTH {
                    self.new_line();
                }
                let row = self.row;
                let col = self.column;
                let entry = ScreenChar {
                    ascii_character: byte,
                    color_code: self.color_code.byte(),
                };
                // SAFETY: row < VGA_HEIGHT and col < VGA_WIDTH, and the VGA
                // text buffer is a well-known fixed physical address that
                // remains identity-mapped for the kernel's entire uptime.
                unsafe {
                    write_volatile(&mut self.buffer.chars[row][col], entry);
                }
                self.column += 1;
            }
        }
    }

    fn new_line(&mut self) {
        if self.row + 1 < VGA_HEIGHT {
            self.row += 1;
        } else {
            for row in 1..VGA_HEIGHT {
                for col in 0..VGA_WIDTH {
                    // SAFETY: indices are within the fixed buffer bounds.
                    let character = unsafe { read_volatile(&self.buffer.chars[row][col]) };
                    unsafe {
                        write_volatile(&mut self.buffer.chars[row - 1][col], character);
                    }
                }
            }
            self.clear_row(VGA_HEIGHT - 1);
        }
        self.column = 0;
    }

    fn clear_row(&mut self, row: usize) {
        let blank = ScreenChar {
            ascii_character: b' ',
            color_code: self.color_code.byte(),
        };
        for col in 0..VGA_WIDTH {
            // SAFETY: row/col within the fixed buffer bounds.
            unsafe {
                write_volatile(&mut self.buffer.chars[row][col], blank);
            }
        }
    }

    pub fn clear(&mut self) {
        for row in 0..VGA_HEIGHT {
            self.clear_row(row);
        }
        self.column = 0;
        self.row = 0;
    }

    pub fn set_color(&mut self, attribute: u8) {
        // attribute already packs foreground nibble | background nibble << 4
        self.color_code = ColorCode(attribute);
    }

    pub fn write_string(&mut self, s: &str) {
        for byte in s.bytes() {
            match byte {
                0x20..=0x7e | b'\n' => self.write_byte(byte),
                _ => self.write_byte(0xfe),
            }
        }
    }
}

impl fmt::Write for Writer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write_string(s);
        Ok(())
    }
}

lazy_static! {
    pub static ref WRITER: Mutex<Writer> = Mutex::new(Writer {
        column: 0,
        row: 0,
        color_code: ColorCode::new(Color::LightGray, Color::Black),
        // SAFETY: 0xb8000 is the well-known VGA text-mode buffer physical
        // address, identity-mapped and valid for the kernel's entire
        // uptime; access is serialized through this Mutex.
        buffer: unsafe { &mut *(VGA_ADDRESS as *mut Buffer) },
    });
}

/// Writes one raw byte to the console at the current cursor position.
pub fn console_put_byte(byte: u8) {
    WRITER.lock().write_byte(byte);
}

/// Clears the screen and resets the cursor to the top-left corner.
pub fn console_clear() {
    WRITER.lock().clear();
}

/// Sets the VGA attribute byte (foreground nibble | background nibble << 4)
/// used for subsequent writes.
pub fn console_set_color(attribute: u8) {
    WRITER.lock().set_color(attribute);
}

#[doc(hidden)]
pub fn _print(args: fmt::Arguments) {
    use fmt::Write;
    WRITER.lock().write_fmt(args).unwrap();
}

#[macro_export]
macro_rules! print {
    ($($arg:tt)*) => ($crate::arch::x86::vga::_print(format_args!($($arg)*)));
}

#[macro_export]
macro_rules! println {
    () => ($crate::print!("\n"));
    ($($arg:tt)*) => ($crate::print!("{}\n", format_args!($($arg)*)));
}
