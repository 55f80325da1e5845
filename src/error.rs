use thiserror::Error;

pub type Result<T> = std::result::Result<T, Chip8Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Chip8Error {
    #[error("memory access out of bounds at {address:#06X}")]
    OutOfBounds { address: usize },

    #[error("program is too large ({size} bytes), at most {max_size} bytes fit")]
    ProgramTooLarge { size: usize, max_size: usize },

    #[error("stack overflow: more than {depth} nested calls")]
    StackOverflow { depth: usize },

    #[error("stack underflow: return with an empty call stack")]
    StackUnderflow,

    #[error("unknown instruction {0:#06X}")]
    UnknownInstruction(u16),

    #[error("key code {0:#04X} is outside the 0x0-0xF keypad")]
    InvalidKey(u8),

    #[error("font table at {base:#06X} would overlap the program area")]
    FontPlacement { base: u16 },

    #[error("clock rate of {hz} Hz is outside 1..={} Hz", crate::config::MAX_CLOCK_HZ)]
    ClockRate { hz: u32 },
}
