use crate::error::{Chip8Error, Result};

pub const KEY_COUNT: usize = 16;

/// The hex keypad latch. The host sets and clears keys; the interpreter reads
/// them and consumes press edges while it waits for a key.
#[derive(Debug, Default, Clone)]
pub struct Keypad {
    keys: [bool; KEY_COUNT],
    last_press: Option<u8>,
}

impl Keypad {
    pub fn new() -> Keypad {
        Keypad::default()
    }

    // Records a key transition; a released-to-pressed change latches the key as the last press
    pub fn set_key(&mut self, code: u8, pressed: bool) -> Result<()> {
        let slot = self
            .keys
            .get_mut(code as usize)
            .ok_or(Chip8Error::InvalidKey(code))?;

        if pressed && !*slot {
            self.last_press = Some(code);
        }
        *slot = pressed;
        Ok(())
    }

    pub fn is_pressed(&self, code: u8) -> Result<bool> {
        self.keys
            .get(code as usize)
            .copied()
            .ok_or(Chip8Error::InvalidKey(code))
    }

    pub fn release_all(&mut self) {
        self.keys = [false; KEY_COUNT];
    }

    // Takes the latched press edge, if any
    pub(crate) fn take_press(&mut self) -> Option<u8> {
        self.last_press.take()
    }
}
