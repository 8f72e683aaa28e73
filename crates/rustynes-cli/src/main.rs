//! Headless CLI front-end for the RustyNES core.
//!
//! Loads an iNES ROM, runs the emulator for a bounded number of frames with
//! no window or audio output, and reports load/fatal errors with a
//! non-zero exit code. Exists to exercise [`rustynes_core::Console`]
//! end-to-end without pulling in a presentation layer.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};
use rustynes_core::Console;

/// Run a headless NES session for a fixed number of frames.
#[derive(Parser, Debug)]
#[command(name = "rustynes", version, about)]
struct Args {
    /// Path to an iNES (.nes) ROM image.
    rom: PathBuf,

    /// Number of frames to run before exiting cleanly.
    #[arg(short = 'f', long, default_value_t = 60)]
    frames: u32,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = match args.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), String> {
    let rom_bytes = std::fs::read(&args.rom)
        .map_err(|e| format!("failed to read ROM '{}': {e}", args.rom.display()))?;

    let mut console = Console::new(&rom_bytes).map_err(|e| format!("failed to load ROM: {e}"))?;
    console.power_on();

    info!(
        "loaded '{}', running {} frame(s)",
        args.rom.display(),
        args.frames
    );

    for frame in 0..args.frames {
        console
            .step_frame()
            .map_err(|e| format!("fatal error at frame {frame}: {e}"))?;
        info!(
            "frame {frame}: {} CPU cycles total",
            console.total_cycles()
        );
    }

    Ok(())
}
