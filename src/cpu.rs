use crate::clock::{Clock, Event};
use crate::config::{Config, Quirks, UnknownPolicy};
use crate::display::Display;
use crate::error::{Chip8Error, Result};
use crate::host::{Control, Host};
use crate::keypad::Keypad;
use crate::memory::{Memory, PROGRAM_START};
use crate::opcode::{decode, Opcode};
use crate::stack::Stack;
use crate::timers::Timers;
use log::{debug, info, trace, warn};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

use std::time::{Duration, Instant};

const VF: usize = 0xF;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registers {
    pub v: [u8; 16],
    pub i: u16,
    pub pc: u16,
}

impl Default for Registers {
    fn default() -> Self {
        Registers {
            v: [0; 16],
            i: 0,
            pc: PROGRAM_START,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Running,
    AwaitingKey { x: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Executed(Opcode),
    Waiting,
}

pub struct Chip8 {
    registers: Registers,
    timers: Timers,
    stack: Stack,
    memory: Memory,
    display: Display,
    keypad: Keypad,
    quirks: Quirks,
    on_unknown: UnknownPolicy,
    rng: Box<dyn RngCore>,
    clock: Clock,
    state: State,
    redraw: bool,
}

impl Chip8 {
    // Creates a new Chip8 instance, seeding the RNG from the config or from entropy
    pub fn new(config: &Config) -> Result<Chip8> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Chip8::with_rng(config, rng)
    }

    // Creates a new Chip8 instance drawing CXNN bytes from `rng`
    pub fn with_rng(config: &Config, rng: impl RngCore + 'static) -> Result<Chip8> {
        config.validate()?;
        let memory = Memory::with_font_base(config.font_base)?;
        debug!(
            "chip8 at {} Hz, font at {:#06X}, {:?}",
            config.clock_hz, config.font_base, config.quirks
        );

        Ok(Chip8 {
            registers: Registers::default(),
            timers: Timers::new(),
            stack: Stack::new(),
            memory,
            display: Display::new(),
            keypad: Keypad::new(),
            quirks: config.quirks,
            on_unknown: config.on_unknown,
            rng: Box::new(rng),
            clock: Clock::new(config.cycle_period()),
            state: State::Running,
            redraw: false,
        })
    }

    pub fn load_program(&mut self, program: &[u8]) -> Result<()> {
        self.memory.load_program(program)
    }

    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    pub fn registers_mut(&mut self) -> &mut Registers {
        &mut self.registers
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    pub fn keypad_mut(&mut self) -> &mut Keypad {
        &mut self.keypad
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.depth()
    }

    pub fn is_waiting(&self) -> bool {
        matches!(self.state, State::AwaitingKey { .. })
    }

    // True once after every draw or clear
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.redraw)
    }

    // One 60 Hz timer tick
    pub fn tick(&mut self) {
        self.timers.tick();
    }

    // Fetch two bytes from memory (an instruction is two bytes)
    fn fetch(&mut self) -> Result<u16> {
        let word = self.memory.read_word(self.registers.pc as usize)?;
        self.registers.pc = self.registers.pc.wrapping_add(2);
        Ok(word)
    }

    // Runs one step: either resolves a pending key wait or fetches, decodes and executes
    pub fn step(&mut self) -> Result<StepOutcome> {
        if let State::AwaitingKey { x } = self.state {
            return Ok(match self.keypad.take_press() {
                Some(key) => {
                    trace!("key {:X} released the wait into V{:X}", key, x);
                    self.registers.v[x] = key;
                    self.state = State::Running;
                    StepOutcome::Executed(Opcode::WaitKey { x })
                }
                None => StepOutcome::Waiting,
            });
        }

        let pc = self.registers.pc;
        let word = self.fetch()?;
        let opcode = decode(word);
        trace!("{:#06X}: {:04X} {:?}", pc, word, opcode);
        self.execute(opcode)?;
        Ok(StepOutcome::Executed(opcode))
    }

    // Steps once, applying the unknown-instruction policy
    fn step_with_policy(&mut self) -> Result<()> {
        match self.step() {
            Err(Chip8Error::UnknownInstruction(word)) if self.on_unknown == UnknownPolicy::Skip => {
                warn!(
                    "skipping unknown instruction {:#06X} at {:#06X}",
                    word,
                    self.registers.pc.wrapping_sub(2)
                );
                Ok(())
            }
            result => result.map(|_| ()),
        }
    }

    // Feeds `elapsed` wall time to the scheduler and runs every step and tick now due
    pub fn advance(&mut self, elapsed: Duration) -> Result<()> {
        self.clock.advance(elapsed);
        while let Some(event) = self.clock.next_event() {
            match event {
                Event::Step => self.step_with_policy()?,
                Event::Tick => self.tick(),
            }
        }
        Ok(())
    }

    // Runs against a host until it asks to quit or an error halts the program
    pub fn run(&mut self, host: &mut impl Host) -> Result<()> {
        let mut last = Instant::now();

        loop {
            if host.pump(&mut self.keypad) == Control::Quit {
                info!("host requested shutdown at {:#06X}", self.registers.pc);
                return Ok(());
            }

            let now = Instant::now();
            let result = self.advance(now - last);
            last = now;

            if self.take_redraw() {
                host.present(&self.display);
            }
            host.sound(self.timers.sound());

            if let Err(err) = result {
                info!("run halted: {}", err);
                return Err(err);
            }

            // Avoid busy-waiting
            std::thread::yield_now();
        }
    }

    // The low 12 bits of I, as used for every memory access
    fn index(&self) -> usize {
        (self.registers.i & 0x0FFF) as usize
    }

    fn skip_if(&mut self, condition: bool) {
        if condition {
            self.registers.pc = self.registers.pc.wrapping_add(2);
        }
    }

    // Executes a decoded Opcode
    fn execute(&mut self, opcode: Opcode) -> Result<()> {
        let v = &mut self.registers.v;

        match opcode {
            Opcode::Sys(_) => {}
            Opcode::Clear => {
                self.display.clear();
                self.redraw = true;
            }
            Opcode::Return => self.registers.pc = self.stack.pop()?,
            Opcode::Jump(nnn) => self.registers.pc = nnn,
            Opcode::Call(nnn) => {
                self.stack.push(self.registers.pc)?;
                self.registers.pc = nnn;
            }

            Opcode::SkipEqImm { x, nn } => {
                let equal = v[x] == nn;
                self.skip_if(equal);
            }
            Opcode::SkipNeImm { x, nn } => {
                let differ = v[x] != nn;
                self.skip_if(differ);
            }
            Opcode::SkipEqReg { x, y } => {
                let equal = v[x] == v[y];
                self.skip_if(equal);
            }
            Opcode::SkipNeReg { x, y } => {
                let differ = v[x] != v[y];
                self.skip_if(differ);
            }

            Opcode::LoadImm { x, nn } => v[x] = nn,
            Opcode::AddImm { x, nn } => v[x] = v[x].wrapping_add(nn),

            Opcode::Move { x, y } => v[x] = v[y],
            Opcode::Or { x, y } => v[x] |= v[y],
            Opcode::And { x, y } => v[x] &= v[y],
            Opcode::Xor { x, y } => v[x] ^= v[y],

            // The flag is written last so it wins when X is F
            Opcode::AddReg { x, y } => {
                let (sum, carry) = v[x].overflowing_add(v[y]);
                v[x] = sum;
                v[VF] = carry as u8;
            }
            Opcode::Sub { x, y } => {
                let (difference, borrow) = v[x].overflowing_sub(v[y]);
                v[x] = difference;
                v[VF] = !borrow as u8;
            }
            Opcode::SubReverse { x, y } => {
                let (difference, borrow) = v[y].overflowing_sub(v[x]);
                v[x] = difference;
                v[VF] = !borrow as u8;
            }
            Opcode::ShiftRight { x, y } => {
                let source = if self.quirks.shift_uses_vy { v[y] } else { v[x] };
                v[x] = source >> 1;
                v[VF] = source & 1;
            }
            Opcode::ShiftLeft { x, y } => {
                let source = if self.quirks.shift_uses_vy { v[y] } else { v[x] };
                v[x] = source << 1;
                v[VF] = source >> 7;
            }

            Opcode::LoadIndex(nnn) => self.registers.i = nnn,
            Opcode::JumpOffset { x, nnn } => {
                let offset = if self.quirks.jump_uses_vx { v[x] } else { v[0] };
                self.registers.pc = nnn + offset as u16;
            }
            Opcode::Random { x, nn } => v[x] = self.rng.gen::<u8>() & nn,
            Opcode::Draw { x, y, n } => self.draw_sprite(x, y, n)?,

            Opcode::SkipKey { x } => {
                let pressed = self.keypad.is_pressed(v[x] & 0x0F)?;
                self.skip_if(pressed);
            }
            Opcode::SkipNotKey { x } => {
                let pressed = self.keypad.is_pressed(v[x] & 0x0F)?;
                self.skip_if(!pressed);
            }

            Opcode::LoadDelay { x } => v[x] = self.timers.delay(),
            Opcode::WaitKey { x } => {
                // only a press that happens after the wait begins counts
                self.keypad.take_press();
                self.state = State::AwaitingKey { x };
            }
            Opcode::SetDelay { x } => self.timers.set_delay(v[x]),
            Opcode::SetSound { x } => self.timers.set_sound(v[x]),

            Opcode::AddIndex { x } => {
                let sum = self.registers.i.wrapping_add(v[x] as u16);
                if self.quirks.index_overflow_flag {
                    v[VF] = (sum > 0x0FFF) as u8;
                }
                self.registers.i = sum;
            }
            Opcode::LoadGlyph { x } => self.registers.i = self.memory.glyph_address(v[x]),

            Opcode::StoreBcd { x } => {
                let value = v[x];
                let base = self.index();
                self.memory.write_byte(base, value / 100)?;
                self.memory.write_byte(base + 1, (value / 10) % 10)?;
                self.memory.write_byte(base + 2, value % 10)?;
            }
            Opcode::StoreRegs { x } => {
                let base = self.index();
                for r in 0..=x {
                    self.memory.write_byte(base + r, self.registers.v[r])?;
                }
                self.bump_index(x);
            }
            Opcode::LoadRegs { x } => {
                let base = self.index();
                for r in 0..=x {
                    self.registers.v[r] = self.memory.read_byte(base + r)?;
                }
                self.bump_index(x);
            }

            Opcode::Unknown(word) => return Err(Chip8Error::UnknownInstruction(word)),
        }

        Ok(())
    }

    fn bump_index(&mut self, x: usize) {
        if self.quirks.load_store_bumps_index {
            self.registers.i = self.registers.i.wrapping_add(x as u16 + 1);
        }
    }

    // DXYN implementation
    fn draw_sprite(&mut self, x: usize, y: usize, n: u8) -> Result<()> {
        let sprite = self.memory.slice(self.index(), n as usize)?;
        let collision = self
            .display
            .draw_sprite(self.registers.v[x], self.registers.v[y], sprite);
        self.registers.v[VF] = collision as u8;
        self.redraw = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{FONT, FONT_BASE};
    use rand::rngs::mock::StepRng;

    fn chip8(program: &[u8]) -> Chip8 {
        chip8_with(program, Config::default())
    }

    fn chip8_with(program: &[u8], config: Config) -> Chip8 {
        let mut cpu = Chip8::with_rng(&config, StepRng::new(0xAB, 0)).unwrap();
        cpu.load_program(program).unwrap();
        cpu
    }

    fn run(cpu: &mut Chip8, steps: usize) {
        for _ in 0..steps {
            cpu.step().unwrap();
        }
    }

    #[test]
    fn starts_at_program_start() {
        let cpu = chip8(&[]);
        assert_eq!(cpu.registers().pc, 0x200);
        assert_eq!(cpu.registers().i, 0);
        assert_eq!(cpu.registers().v, [0; 16]);
    }

    #[test]
    fn pc_advances_before_execute() {
        // 2NNN pushes the address of the following instruction
        let mut cpu = chip8(&[0x22, 0x04, 0x00, 0xE0, 0x00, 0xEE]);
        run(&mut cpu, 1);
        assert_eq!(cpu.registers().pc, 0x204);
        run(&mut cpu, 1);
        assert_eq!(cpu.registers().pc, 0x202);
        assert_eq!(cpu.stack_depth(), 0);
    }

    #[test]
    fn jump_and_jump_with_offset() {
        let mut cpu = chip8(&[0x12, 0x06, 0, 0, 0, 0, 0x60, 0x04, 0xB3, 0x00]);
        run(&mut cpu, 1);
        assert_eq!(cpu.registers().pc, 0x206);
        run(&mut cpu, 2);
        assert_eq!(cpu.registers().pc, 0x304);
    }

    #[test]
    fn jump_with_offset_quirk_uses_vx() {
        let config = Config {
            quirks: Quirks {
                jump_uses_vx: true,
                ..Quirks::default()
            },
            ..Config::default()
        };
        let mut cpu = chip8_with(&[0x60, 0x01, 0x63, 0x10, 0xB3, 0x00], config);
        run(&mut cpu, 3);
        assert_eq!(cpu.registers().pc, 0x310);
    }

    #[test]
    fn return_on_empty_stack_underflows() {
        let mut cpu = chip8(&[0x00, 0xEE]);
        assert_eq!(cpu.step(), Err(Chip8Error::StackUnderflow));
    }

    #[test]
    fn thirteenth_nested_call_overflows() {
        // 0x200: 2200 calls itself forever
        let mut cpu = chip8(&[0x22, 0x00]);
        run(&mut cpu, 12);
        assert_eq!(cpu.stack_depth(), 12);
        assert_eq!(cpu.step(), Err(Chip8Error::StackOverflow { depth: 12 }));
    }

    #[test]
    fn skips() {
        let program = [
            0x60, 0x05, // V0 = 5
            0x61, 0x05, // V1 = 5
            0x30, 0x05, // skip: V0 == 5
            0x00, 0x00, //
            0x40, 0x05, // no skip
            0x50, 0x10, // skip: V0 == V1
            0x00, 0x00, //
            0x90, 0x10, // no skip
            0x41, 0x06, // skip: V1 != 6
            0x00, 0x00, //
        ];
        let mut cpu = chip8(&program);
        run(&mut cpu, 3);
        assert_eq!(cpu.registers().pc, 0x208);
        run(&mut cpu, 1);
        assert_eq!(cpu.registers().pc, 0x20A);
        run(&mut cpu, 1);
        assert_eq!(cpu.registers().pc, 0x20E);
        run(&mut cpu, 1);
        assert_eq!(cpu.registers().pc, 0x210);
        run(&mut cpu, 1);
        assert_eq!(cpu.registers().pc, 0x214);
    }

    #[test]
    fn add_with_carry_sets_flag() {
        let mut cpu = chip8(&[0x60, 0xFF, 0x61, 0x01, 0x80, 0x14]);
        run(&mut cpu, 3);
        assert_eq!(cpu.registers().v[0], 0x00);
        assert_eq!(cpu.registers().v[0xF], 1);
    }

    #[test]
    fn add_without_carry_leaves_flag_alone() {
        let mut cpu = chip8(&[0x6F, 0x07, 0x60, 0xFF, 0x70, 0x01]);
        run(&mut cpu, 3);
        assert_eq!(cpu.registers().v[0], 0x00);
        assert_eq!(cpu.registers().v[0xF], 0x07);
    }

    #[test]
    fn add_clears_flag_without_carry() {
        let mut cpu = chip8(&[0x6F, 0x01, 0x60, 0x10, 0x61, 0x20, 0x80, 0x14]);
        run(&mut cpu, 4);
        assert_eq!(cpu.registers().v[0], 0x30);
        assert_eq!(cpu.registers().v[0xF], 0);
    }

    #[test]
    fn subtraction_flags_are_inverted_borrow() {
        let mut cpu = chip8(&[]);
        cpu.memory_mut()
            .load_program(&[0x80, 0x15, 0x82, 0x37])
            .unwrap();
        cpu.registers_mut().v[0] = 5;
        cpu.registers_mut().v[1] = 3;
        cpu.registers_mut().v[2] = 5;
        cpu.registers_mut().v[3] = 3;
        run(&mut cpu, 1);
        assert_eq!(cpu.registers().v[0], 2);
        assert_eq!(cpu.registers().v[0xF], 1);
        run(&mut cpu, 1);
        assert_eq!(cpu.registers().v[2], 0xFE);
        assert_eq!(cpu.registers().v[0xF], 0);
    }

    #[test]
    fn equal_operands_do_not_borrow() {
        let mut cpu = chip8(&[0x60, 0x09, 0x61, 0x09, 0x80, 0x15]);
        run(&mut cpu, 3);
        assert_eq!(cpu.registers().v[0], 0);
        assert_eq!(cpu.registers().v[0xF], 1);
    }

    #[test]
    fn flag_wins_when_vf_is_the_destination() {
        // 0xFF + 0x03 leaves 0x02 in VF before the carry overwrites it
        let mut cpu = chip8(&[0x6F, 0xFF, 0x61, 0x03, 0x8F, 0x14]);
        run(&mut cpu, 3);
        assert_eq!(cpu.registers().v[0xF], 1);
    }

    #[test]
    fn bitwise_ops_leave_flag_alone() {
        let mut cpu = chip8(&[
            0x6F, 0x42, 0x60, 0b1100, 0x61, 0b1010, 0x62, 0b1100, 0x63, 0b1100, 0x80, 0x11, 0x82,
            0x12, 0x83, 0x13,
        ]);
        run(&mut cpu, 8);
        let v = cpu.registers().v;
        assert_eq!(v[0], 0b1110);
        assert_eq!(v[2], 0b1000);
        assert_eq!(v[3], 0b0110);
        assert_eq!(v[0xF], 0x42);
    }

    #[test]
    fn shifts_move_the_lost_bit_into_vf() {
        let mut cpu = chip8(&[0x60, 0x81, 0x80, 0x06, 0x61, 0x81, 0x81, 0x0E]);
        run(&mut cpu, 2);
        assert_eq!(cpu.registers().v[0], 0x40);
        assert_eq!(cpu.registers().v[0xF], 1);
        run(&mut cpu, 2);
        assert_eq!(cpu.registers().v[1], 0x02);
        assert_eq!(cpu.registers().v[0xF], 1);
    }

    #[test]
    fn shift_quirk_reads_vy() {
        let config = Config {
            quirks: Quirks {
                shift_uses_vy: true,
                ..Quirks::default()
            },
            ..Config::default()
        };
        let mut cpu = chip8_with(&[0x61, 0x04, 0x80, 0x16], config);
        run(&mut cpu, 2);
        assert_eq!(cpu.registers().v[0], 0x02);
        assert_eq!(cpu.registers().v[0xF], 0);
    }

    #[test]
    fn random_is_masked() {
        // StepRng yields 0xAB for every byte
        let mut cpu = chip8(&[0xC0, 0x0F, 0xC1, 0xFF]);
        run(&mut cpu, 2);
        assert_eq!(cpu.registers().v[0], 0x0B);
        assert_eq!(cpu.registers().v[1], 0xAB);
    }

    #[test]
    fn seeded_machines_agree() {
        let config = Config {
            seed: Some(42),
            ..Config::default()
        };
        let program = [0xC0, 0xFF, 0xC1, 0xFF, 0xC2, 0xFF];
        let mut a = Chip8::new(&config).unwrap();
        let mut b = Chip8::new(&config).unwrap();
        a.load_program(&program).unwrap();
        b.load_program(&program).unwrap();
        run(&mut a, 3);
        run(&mut b, 3);
        assert_eq!(a.registers().v, b.registers().v);
    }

    #[test]
    fn draws_font_glyph() {
        let mut cpu = chip8(&[0xA0, 0x50, 0xD0, 0x15]);
        run(&mut cpu, 2);
        assert_eq!(cpu.registers().v[0xF], 0);
        for (row, &byte) in FONT[..5].iter().enumerate() {
            assert_eq!(cpu.display().rows()[row] >> 56, byte as u64);
        }
        assert!(cpu.take_redraw());
        assert!(!cpu.take_redraw());
    }

    #[test]
    fn redrawing_sets_collision_and_cancels() {
        let mut cpu = chip8(&[0xA0, 0x50, 0xD0, 0x15, 0xD0, 0x15]);
        run(&mut cpu, 3);
        assert_eq!(cpu.registers().v[0xF], 1);
        assert!(cpu.display().is_blank());
    }

    #[test]
    fn draw_reading_past_memory_fails() {
        let mut cpu = chip8(&[0xAF, 0xFE, 0xD0, 0x15]);
        run(&mut cpu, 1);
        assert!(matches!(cpu.step(), Err(Chip8Error::OutOfBounds { .. })));
    }

    #[test]
    fn clear_screen() {
        let mut cpu = chip8(&[0xA0, 0x50, 0xD0, 0x15, 0x00, 0xE0]);
        run(&mut cpu, 3);
        assert!(cpu.display().is_blank());
    }

    #[test]
    fn key_skips() {
        let mut cpu = chip8(&[0x60, 0x07, 0xE0, 0x9E, 0x00, 0x00, 0xE0, 0xA1, 0x00, 0x00]);
        cpu.keypad_mut().set_key(7, true).unwrap();
        run(&mut cpu, 2);
        assert_eq!(cpu.registers().pc, 0x206);
        run(&mut cpu, 1);
        assert_eq!(cpu.registers().pc, 0x208);
    }

    #[test]
    fn key_skip_uses_low_nibble_of_vx() {
        let mut cpu = chip8(&[0x60, 0x17, 0xE0, 0x9E]);
        cpu.keypad_mut().set_key(7, true).unwrap();
        run(&mut cpu, 2);
        assert_eq!(cpu.registers().pc, 0x206);
    }

    #[test]
    fn wait_key_suspends_until_a_press() {
        let mut cpu = chip8(&[0xF3, 0x0A, 0x60, 0x01]);
        cpu.keypad_mut().set_key(2, true).unwrap();

        // a key already down before the wait does not count
        assert_eq!(cpu.step(), Ok(StepOutcome::Executed(Opcode::WaitKey { x: 3 })));
        assert!(cpu.is_waiting());
        assert_eq!(cpu.step(), Ok(StepOutcome::Waiting));
        assert_eq!(cpu.registers().pc, 0x202);

        cpu.keypad_mut().set_key(9, true).unwrap();
        assert_eq!(cpu.step(), Ok(StepOutcome::Executed(Opcode::WaitKey { x: 3 })));
        assert!(!cpu.is_waiting());
        assert_eq!(cpu.registers().v[3], 9);

        run(&mut cpu, 1);
        assert_eq!(cpu.registers().v[0], 1);
    }

    #[test]
    fn timers_are_read_and_set() {
        let mut cpu = chip8(&[0x60, 0x05, 0xF0, 0x15, 0xF0, 0x18, 0xF1, 0x07]);
        run(&mut cpu, 3);
        assert_eq!(cpu.timers().delay(), 5);
        assert_eq!(cpu.timers().sound(), 5);
        cpu.tick();
        run(&mut cpu, 1);
        assert_eq!(cpu.registers().v[1], 4);
    }

    #[test]
    fn sound_below_two_is_stored_as_is() {
        let mut cpu = chip8(&[0x60, 0x01, 0xF0, 0x18]);
        run(&mut cpu, 2);
        assert_eq!(cpu.timers().sound(), 1);
    }

    #[test]
    fn add_to_index() {
        let mut cpu = chip8(&[0xA1, 0x00, 0x60, 0x20, 0xF0, 0x1E]);
        run(&mut cpu, 3);
        assert_eq!(cpu.registers().i, 0x120);
        assert_eq!(cpu.registers().v[0xF], 0);
    }

    #[test]
    fn index_overflow_quirk_sets_flag() {
        let config = Config {
            quirks: Quirks {
                index_overflow_flag: true,
                ..Quirks::default()
            },
            ..Config::default()
        };
        let mut cpu = chip8_with(&[0xAF, 0xFF, 0x60, 0x01, 0xF0, 0x1E], config);
        run(&mut cpu, 3);
        assert_eq!(cpu.registers().i, 0x1000);
        assert_eq!(cpu.registers().v[0xF], 1);
    }

    #[test]
    fn glyph_address() {
        let mut cpu = chip8(&[0x60, 0x0A, 0xF0, 0x29]);
        run(&mut cpu, 2);
        assert_eq!(cpu.registers().i, FONT_BASE + 50);
    }

    #[test]
    fn glyph_address_follows_font_base() {
        let config = Config {
            font_base: 0x000,
            ..Config::default()
        };
        let mut cpu = chip8_with(&[0x60, 0x02, 0xF0, 0x29], config);
        run(&mut cpu, 2);
        assert_eq!(cpu.registers().i, 10);
        assert_eq!(cpu.memory().read_byte(10).unwrap(), 0xF0);
    }

    #[test]
    fn bcd() {
        let mut cpu = chip8(&[0x60, 0xFE, 0xA3, 0x00, 0xF0, 0x33]);
        run(&mut cpu, 3);
        let memory = cpu.memory();
        assert_eq!(memory.read_byte(0x300).unwrap(), 2);
        assert_eq!(memory.read_byte(0x301).unwrap(), 5);
        assert_eq!(memory.read_byte(0x302).unwrap(), 4);
        assert_eq!(cpu.registers().i, 0x300);
    }

    #[test]
    fn store_and_load_registers_keep_index() {
        let mut cpu = chip8(&[
            0x60, 0x11, 0x61, 0x22, 0x62, 0x33, 0xA4, 0x00, 0xF1, 0x55, 0x60, 0x00, 0x61, 0x00,
            0xF2, 0x65,
        ]);
        run(&mut cpu, 5);
        assert_eq!(cpu.memory().read_byte(0x400).unwrap(), 0x11);
        assert_eq!(cpu.memory().read_byte(0x401).unwrap(), 0x22);
        assert_eq!(cpu.memory().read_byte(0x402).unwrap(), 0x00);
        assert_eq!(cpu.registers().i, 0x400);

        run(&mut cpu, 3);
        assert_eq!(&cpu.registers().v[..3], &[0x11, 0x22, 0x00]);
        assert_eq!(cpu.registers().i, 0x400);
    }

    #[test]
    fn load_store_quirk_bumps_index() {
        let config = Config {
            quirks: Quirks {
                load_store_bumps_index: true,
                ..Quirks::default()
            },
            ..Config::default()
        };
        let mut cpu = chip8_with(&[0xA4, 0x00, 0xF2, 0x55], config);
        run(&mut cpu, 2);
        assert_eq!(cpu.registers().i, 0x403);
    }

    #[test]
    fn store_past_memory_fails() {
        let mut cpu = chip8(&[0xAF, 0xFF, 0xF1, 0x55]);
        run(&mut cpu, 1);
        assert_eq!(
            cpu.step(),
            Err(Chip8Error::OutOfBounds { address: 0x1000 })
        );
    }

    #[test]
    fn sys_is_ignored() {
        let mut cpu = chip8(&[0x03, 0x00, 0x60, 0x01]);
        run(&mut cpu, 2);
        assert_eq!(cpu.registers().v[0], 1);
    }

    #[test]
    fn unknown_instruction_is_reported_past_the_word() {
        let mut cpu = chip8(&[0x80, 0x1F, 0x60, 0x01]);
        assert_eq!(cpu.step(), Err(Chip8Error::UnknownInstruction(0x801F)));
        assert_eq!(cpu.registers().pc, 0x202);
    }

    #[test]
    fn halt_policy_stops_the_run() {
        let mut cpu = chip8(&[0x60, 0x01, 0xFF, 0xFF, 0x61, 0x01]);
        let period = Config::default().cycle_period();
        assert_eq!(
            cpu.advance(period * 3),
            Err(Chip8Error::UnknownInstruction(0xFFFF))
        );
        assert_eq!(cpu.registers().v[1], 0);
    }

    #[test]
    fn skip_policy_continues_the_run() {
        let config = Config {
            on_unknown: UnknownPolicy::Skip,
            ..Config::default()
        };
        let period = config.cycle_period();
        let mut cpu = chip8_with(&[0x60, 0x01, 0xFF, 0xFF, 0x61, 0x01], config);
        cpu.advance(period * 3).unwrap();
        assert_eq!(cpu.registers().v[1], 1);
    }

    #[test]
    fn fetch_past_memory_fails() {
        let mut cpu = chip8(&[0x1F, 0xFF]);
        run(&mut cpu, 1);
        assert!(matches!(cpu.step(), Err(Chip8Error::OutOfBounds { .. })));
    }

    #[test]
    fn timers_tick_at_60hz_not_per_instruction() {
        // 1200: jump to self
        let mut cpu = chip8(&[0x60, 0xFF, 0xF0, 0x15, 0x12, 0x04]);
        for _ in 0..10 {
            cpu.advance(Duration::from_millis(100)).unwrap();
        }
        // 255 - 60 ticks in one second
        assert_eq!(cpu.timers().delay(), 195);
    }

    #[test]
    fn timers_keep_running_while_waiting_for_a_key() {
        let mut cpu = chip8(&[0x60, 0x0A, 0xF0, 0x15, 0xF1, 0x0A]);
        cpu.advance(Duration::from_millis(10)).unwrap();
        assert!(cpu.is_waiting());
        cpu.advance(Duration::from_millis(200)).unwrap();
        assert_eq!(cpu.timers().delay(), 0);
        assert!(cpu.is_waiting());
    }
}
