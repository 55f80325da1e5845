use crate::error::{Chip8Error, Result};
use crate::memory::FONT_BASE;
use std::time::Duration;

pub const DEFAULT_CLOCK_HZ: u32 = 700;
// Fastest rate whose cycle period is still at least one nanosecond
pub const MAX_CLOCK_HZ: u32 = 1_000_000_000;

/// Behaviour switches for instructions whose semantics differ between
/// historical interpreters. All off gives the modern behaviour.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Quirks {
    // 8XY6/8XYE: shift VY into VX instead of shifting VX in place (COSMAC VIP)
    pub shift_uses_vy: bool,
    // FX55/FX65: leave I pointing past the last register touched (COSMAC VIP)
    pub load_store_bumps_index: bool,
    // BNNN: add VX instead of V0 (SUPER-CHIP)
    pub jump_uses_vx: bool,
    // FX1E: set VF when I runs past 0xFFF (Amiga interpreter)
    pub index_overflow_flag: bool,
}

/// What a run does when it meets a word the decoder does not recognise.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum UnknownPolicy {
    #[default]
    Halt,
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub clock_hz: u32,
    pub font_base: u16,
    pub seed: Option<u64>,
    pub on_unknown: UnknownPolicy,
    pub quirks: Quirks,
}

impl Config {
    // Rejects clock rates the scheduler cannot represent
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_CLOCK_HZ).contains(&self.clock_hz) {
            return Err(Chip8Error::ClockRate { hz: self.clock_hz });
        }
        Ok(())
    }

    // Time between two instruction steps
    pub fn cycle_period(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / self.clock_hz.max(1) as u64)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            clock_hz: DEFAULT_CLOCK_HZ,
            font_base: FONT_BASE,
            seed: None,
            on_unknown: UnknownPolicy::Halt,
            quirks: Quirks::default(),
        }
    }
}
