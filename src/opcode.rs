/// A decoded instruction word. `x` and `y` are register indices, `nn` an
/// immediate byte, `nnn` a 12-bit address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    /// 0NNN: machine code routine on the original hardware, ignored here
    Sys(u16),
    /// 00E0
    Clear,
    /// 00EE
    Return,
    /// 1NNN
    Jump(u16),
    /// 2NNN
    Call(u16),
    /// 3XNN
    SkipEqImm { x: usize, nn: u8 },
    /// 4XNN
    SkipNeImm { x: usize, nn: u8 },
    /// 5XY0
    SkipEqReg { x: usize, y: usize },
    /// 6XNN
    LoadImm { x: usize, nn: u8 },
    /// 7XNN
    AddImm { x: usize, nn: u8 },
    /// 8XY0
    Move { x: usize, y: usize },
    /// 8XY1
    Or { x: usize, y: usize },
    /// 8XY2
    And { x: usize, y: usize },
    /// 8XY3
    Xor { x: usize, y: usize },
    /// 8XY4
    AddReg { x: usize, y: usize },
    /// 8XY5
    Sub { x: usize, y: usize },
    /// 8XY6
    ShiftRight { x: usize, y: usize },
    /// 8XY7
    SubReverse { x: usize, y: usize },
    /// 8XYE
    ShiftLeft { x: usize, y: usize },
    /// 9XY0
    SkipNeReg { x: usize, y: usize },
    /// ANNN
    LoadIndex(u16),
    /// BNNN
    JumpOffset { x: usize, nnn: u16 },
    /// CXNN
    Random { x: usize, nn: u8 },
    /// DXYN
    Draw { x: usize, y: usize, n: u8 },
    /// EX9E
    SkipKey { x: usize },
    /// EXA1
    SkipNotKey { x: usize },
    /// FX07
    LoadDelay { x: usize },
    /// FX0A
    WaitKey { x: usize },
    /// FX15
    SetDelay { x: usize },
    /// FX18
    SetSound { x: usize },
    /// FX1E
    AddIndex { x: usize },
    /// FX29
    LoadGlyph { x: usize },
    /// FX33
    StoreBcd { x: usize },
    /// FX55
    StoreRegs { x: usize },
    /// FX65
    LoadRegs { x: usize },
    /// Anything else, kept verbatim
    Unknown(u16),
}

impl Opcode {
    pub fn is_unknown(&self) -> bool {
        matches!(self, Opcode::Unknown(_))
    }
}

// Decodes an instruction word. Never fails; unmatched patterns become `Opcode::Unknown`.
pub fn decode(word: u16) -> Opcode {
    let op = word & 0xF000;
    let x = ((word & 0x0F00) >> 8) as usize;
    let y = ((word & 0x00F0) >> 4) as usize;
    let n = (word & 0x000F) as u8;
    let nn = (word & 0x00FF) as u8;
    let nnn = word & 0x0FFF;

    match op {
        0x0000 => match nnn {
            0x0E0 => Opcode::Clear,
            0x0EE => Opcode::Return,
            0x000 => Opcode::Unknown(word),
            _ => Opcode::Sys(nnn),
        },
        0x1000 => Opcode::Jump(nnn),
        0x2000 => Opcode::Call(nnn),
        0x3000 => Opcode::SkipEqImm { x, nn },
        0x4000 => Opcode::SkipNeImm { x, nn },
        0x5000 if n == 0 => Opcode::SkipEqReg { x, y },
        0x6000 => Opcode::LoadImm { x, nn },
        0x7000 => Opcode::AddImm { x, nn },
        0x8000 => match n {
            0x0 => Opcode::Move { x, y },
            0x1 => Opcode::Or { x, y },
            0x2 => Opcode::And { x, y },
            0x3 => Opcode::Xor { x, y },
            0x4 => Opcode::AddReg { x, y },
            0x5 => Opcode::Sub { x, y },
            0x6 => Opcode::ShiftRight { x, y },
            0x7 => Opcode::SubReverse { x, y },
            0xE => Opcode::ShiftLeft { x, y },
            _ => Opcode::Unknown(word),
        },
        0x9000 if n == 0 => Opcode::SkipNeReg { x, y },
        0xA000 => Opcode::LoadIndex(nnn),
        0xB000 => Opcode::JumpOffset { x, nnn },
        0xC000 => Opcode::Random { x, nn },
        0xD000 => Opcode::Draw { x, y, n },
        0xE000 => match nn {
            0x9E => Opcode::SkipKey { x },
            0xA1 => Opcode::SkipNotKey { x },
            _ => Opcode::Unknown(word),
        },
        0xF000 => match nn {
            0x07 => Opcode::LoadDelay { x },
            0x0A => Opcode::WaitKey { x },
            0x15 => Opcode::SetDelay { x },
            0x18 => Opcode::SetSound { x },
            0x1E => Opcode::AddIndex { x },
            0x29 => Opcode::LoadGlyph { x },
            0x33 => Opcode::StoreBcd { x },
            0x55 => Opcode::StoreRegs { x },
            0x65 => Opcode::LoadRegs { x },
            _ => Opcode::Unknown(word),
        },
        _ => Opcode::Unknown(word),
    }
}
