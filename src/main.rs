use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, LevelFilter};
use simple_logger::SimpleLogger;

use c8vm::config::DEFAULT_CLOCK_HZ;
use c8vm::{Chip8, Config, Quirks, UnknownPolicy};

/// Runs a CHIP-8 program.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Program image, loaded verbatim at 0x200
    rom: PathBuf,

    /// Instructions per second
    #[arg(long, default_value_t = DEFAULT_CLOCK_HZ)]
    hz: u32,

    /// Seed for the CXNN random source
    #[arg(long)]
    seed: Option<u64>,

    /// Keep running past unknown instructions instead of halting
    #[arg(long)]
    skip_unknown: bool,

    /// 8XY6/8XYE shift VY into VX
    #[arg(long)]
    shift_vy: bool,

    /// FX55/FX65 advance I past the registers
    #[arg(long)]
    bump_index: bool,

    /// BNNN jumps to NNN + VX
    #[arg(long)]
    jump_vx: bool,

    /// FX1E sets VF when I passes 0xFFF
    #[arg(long)]
    index_flag: bool,

    /// Run without a window and print the final screen
    #[arg(long)]
    headless: bool,

    /// Instruction steps to run in headless mode
    #[arg(long, default_value_t = 1000)]
    steps: u32,

    /// Window pixels per CHIP-8 pixel
    #[arg(long, default_value_t = 16)]
    #[cfg_attr(not(feature = "sdl"), allow(dead_code))]
    scale: u32,

    /// More logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn config(&self) -> Config {
        Config {
            clock_hz: self.hz,
            seed: self.seed,
            on_unknown: if self.skip_unknown {
                UnknownPolicy::Skip
            } else {
                UnknownPolicy::Halt
            },
            quirks: Quirks {
                shift_uses_vy: self.shift_vy,
                load_store_bumps_index: self.bump_index,
                jump_uses_vx: self.jump_vx,
                index_overflow_flag: self.index_flag,
            },
            ..Config::default()
        }
    }

    fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    SimpleLogger::new()
        .with_level(args.log_level())
        .init()
        .context("failed to start logger")?;

    let program = fs::read(&args.rom)
        .with_context(|| format!("failed to read {}", args.rom.display()))?;
    let config = args.config();

    let mut cpu = Chip8::new(&config).context("invalid configuration")?;
    cpu.load_program(&program)
        .with_context(|| format!("failed to load {}", args.rom.display()))?;
    info!("loaded {} ({} bytes)", args.rom.display(), program.len());

    if args.headless {
        run_headless(&mut cpu, &config, args.steps)
    } else {
        run_windowed(&mut cpu, &args)
    }
}

// Simulated time, one cycle period per step, then dump the machine
fn run_headless(cpu: &mut Chip8, config: &Config, steps: u32) -> Result<()> {
    let period = config.cycle_period();
    for _ in 0..steps {
        cpu.advance(period)?;
    }

    print!("{}", cpu.display());
    let registers = cpu.registers();
    for (n, value) in registers.v.iter().enumerate() {
        print!("V{:X}={:02X} ", n, value);
    }
    println!();
    println!(
        "I={:03X} PC={:03X} DT={:02X} ST={:02X}{}",
        registers.i,
        registers.pc,
        cpu.timers().delay(),
        cpu.timers().sound(),
        if cpu.is_waiting() { " (waiting for key)" } else { "" }
    );
    Ok(())
}

#[cfg(feature = "sdl")]
fn run_windowed(cpu: &mut Chip8, args: &Args) -> Result<()> {
    use c8vm::sdl::SdlHost;

    let title = format!("c8vm - {}", args.rom.display());
    let mut host = SdlHost::new(&title, args.scale).map_err(anyhow::Error::msg)?;
    cpu.run(&mut host)?;
    Ok(())
}

#[cfg(not(feature = "sdl"))]
fn run_windowed(_cpu: &mut Chip8, _args: &Args) -> Result<()> {
    anyhow::bail!("built without the `sdl` feature; rebuild with --features sdl or pass --headless")
}
