//! A headless CHIP-8 interpreter core.
//!
//! [`Chip8`] owns the whole machine: memory, registers, call stack, timers,
//! framebuffer and keypad. Drive it one instruction at a time with
//! [`Chip8::step`], by wall time with [`Chip8::advance`], or hand it a
//! [`Host`] and let [`Chip8::run`] pace it.

pub mod clock;
pub mod config;
pub mod cpu;
pub mod display;
pub mod error;
pub mod host;
pub mod keypad;
pub mod memory;
pub mod opcode;
pub mod stack;
pub mod timers;

#[cfg(feature = "sdl")]
pub mod sdl;

pub use config::{Config, Quirks, UnknownPolicy};
pub use cpu::{Chip8, Registers, StepOutcome};
pub use display::Display;
pub use error::{Chip8Error, Result};
pub use host::{Control, HeadlessHost, Host};
pub use keypad::Keypad;
pub use opcode::{decode, Opcode};
