use crate::error::{Chip8Error, Result};
use log::debug;

pub const MEMORY_SIZE: usize = 4096;
pub const PROGRAM_START: u16 = 0x200;
pub const FONT_BASE: u16 = 0x50;
pub const GLYPH_HEIGHT: u16 = 5;

pub const FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// Flat 4K address space. The font table sits in the reserved area below
/// `PROGRAM_START`, the program image from `PROGRAM_START` upward.
pub struct Memory {
    bytes: Box<[u8; MEMORY_SIZE]>,
    font_base: u16,
}

impl Memory {
    // Creates memory with the font at the conventional 0x50
    pub fn new() -> Memory {
        let mut memory = Memory {
            bytes: Box::new([0; MEMORY_SIZE]),
            font_base: FONT_BASE,
        };
        memory.load_font();
        memory
    }

    // Creates memory with the font at `font_base`, which must leave the whole table below 0x200
    pub fn with_font_base(font_base: u16) -> Result<Memory> {
        if font_base as usize + FONT.len() > PROGRAM_START as usize {
            return Err(Chip8Error::FontPlacement { base: font_base });
        }

        let mut memory = Memory {
            bytes: Box::new([0; MEMORY_SIZE]),
            font_base,
        };
        memory.load_font();
        Ok(memory)
    }

    // Only ever called from the constructors
    fn load_font(&mut self) {
        let base = self.font_base as usize;
        self.bytes[base..base + FONT.len()].copy_from_slice(&FONT);
        debug!("font table loaded at {:#06X}", self.font_base);
    }

    // Address of the glyph for the low nibble of `digit`
    pub fn glyph_address(&self, digit: u8) -> u16 {
        self.font_base + (digit & 0x0F) as u16 * GLYPH_HEIGHT
    }

    // Copies a program image to 0x200
    pub fn load_program(&mut self, program: &[u8]) -> Result<()> {
        let start = PROGRAM_START as usize;
        let max_size = MEMORY_SIZE - start;
        if program.len() > max_size {
            return Err(Chip8Error::ProgramTooLarge {
                size: program.len(),
                max_size,
            });
        }

        self.bytes[start..start + program.len()].copy_from_slice(program);
        debug!("loaded {} byte program at {:#06X}", program.len(), PROGRAM_START);
        Ok(())
    }

    pub fn read_byte(&self, address: usize) -> Result<u8> {
        self.bytes
            .get(address)
            .copied()
            .ok_or(Chip8Error::OutOfBounds { address })
    }

    pub fn write_byte(&mut self, address: usize, value: u8) -> Result<()> {
        let byte = self
            .bytes
            .get_mut(address)
            .ok_or(Chip8Error::OutOfBounds { address })?;
        *byte = value;
        Ok(())
    }

    // Big-endian instruction word at `address`
    pub fn read_word(&self, address: usize) -> Result<u16> {
        let high = self.read_byte(address)?;
        let low = self.read_byte(address + 1)?;
        Ok((high as u16) << 8 | low as u16)
    }

    // Borrows `len` bytes starting at `address`, used for sprite rows
    pub fn slice(&self, address: usize, len: usize) -> Result<&[u8]> {
        let end = address + len;
        if end > MEMORY_SIZE {
            return Err(Chip8Error::OutOfBounds {
                address: address.max(MEMORY_SIZE),
            });
        }
        Ok(&self.bytes[address..end])
    }
}

impl Default for Memory {
    fn default() -> Self {
        Memory::new()
    }
}
