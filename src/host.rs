use crate::display::Display;
use crate::keypad::Keypad;
use log::warn;
use std::time::Duration;

// Sound timer values below this are valid but too short to hear
pub const MIN_AUDIBLE_SOUND: u8 = 2;

pub fn is_audible(sound_timer: u8) -> bool {
    sound_timer >= MIN_AUDIBLE_SOUND
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// The outside world as seen by `Chip8::run`: input comes in through `pump`,
/// frames and the sound timer go out through `present` and `sound`.
pub trait Host {
    // Applies pending input to the keypad; `Control::Quit` ends the run
    fn pump(&mut self, keypad: &mut Keypad) -> Control;

    fn present(&mut self, display: &Display);

    fn sound(&mut self, sound_timer: u8);
}

/// A scripted host with no window, for tests and the headless CLI.
#[derive(Debug, Default)]
pub struct HeadlessHost {
    pumps: usize,
    quit_after: Option<usize>,
    pace: Option<Duration>,
    // (pump index, key): pressed on that pump, released on the next
    presses: Vec<(usize, u8)>,
    held: Option<u8>,
    frames: usize,
    last_frame: Option<Display>,
    last_sound: u8,
    audible_updates: usize,
}

impl HeadlessHost {
    pub fn new() -> HeadlessHost {
        HeadlessHost::default()
    }

    pub fn quit_after(mut self, pumps: usize) -> HeadlessHost {
        self.quit_after = Some(pumps);
        self
    }

    // Sleeps this long in every pump, like a host waiting on vsync
    pub fn pace(mut self, interval: Duration) -> HeadlessHost {
        self.pace = Some(interval);
        self
    }

    pub fn press_at(mut self, pump: usize, key: u8) -> HeadlessHost {
        self.presses.push((pump, key));
        self
    }

    pub fn pumps(&self) -> usize {
        self.pumps
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn last_frame(&self) -> Option<&Display> {
        self.last_frame.as_ref()
    }

    pub fn last_sound(&self) -> u8 {
        self.last_sound
    }

    pub fn audible_updates(&self) -> usize {
        self.audible_updates
    }
}

impl Host for HeadlessHost {
    fn pump(&mut self, keypad: &mut Keypad) -> Control {
        let pump = self.pumps;
        self.pumps += 1;
        if let Some(interval) = self.pace {
            std::thread::sleep(interval);
        }

        if let Some(key) = self.held.take() {
            if let Err(err) = keypad.set_key(key, false) {
                warn!("scripted release failed: {}", err);
            }
        }
        for &(at, key) in &self.presses {
            if at == pump {
                if let Err(err) = keypad.set_key(key, true) {
                    warn!("scripted press failed: {}", err);
                } else {
                    self.held = Some(key);
                }
            }
        }

        match self.quit_after {
            Some(limit) if pump >= limit => Control::Quit,
            _ => Control::Continue,
        }
    }

    fn present(&mut self, display: &Display) {
        self.frames += 1;
        self.last_frame = Some(display.clone());
    }

    fn sound(&mut self, sound_timer: u8) {
        self.last_sound = sound_timer;
        if is_audible(sound_timer) {
            self.audible_updates += 1;
        }
    }
}
