//! RustyNES Core - NES Emulation Integration Layer.
//!
//! This crate provides the high-level NES emulation API, integrating the
//! CPU, PPU, cartridge mapper, and controller input into a runnable console.
//!
//! # Architecture
//!
//! The core crate connects all NES components through a central bus:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Console                              │
//! │  ┌─────┐                                                    │
//! │  │ CPU │ ───────────────┐                                   │
//! │  │6502 │                ▼                                  │
//! │  └─────┘   ┌─────────────────────────────────────────────┐  │
//! │            │                  NesBus                     │  │
//! │            │  ┌─────┐ ┌─────┐ ┌────────┐ ┌─────────────┐ │  │
//! │            │  │ RAM │ │ PPU │ │ Mapper │ │ Controllers │ │  │
//! │            │  │ 2KB │ │     │ │        │ │             │ │  │
//! │            │  └─────┘ └─────┘ └────────┘ └─────────────┘ │  │
//! │            └─────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Ownership flows one way: the `Console` owns the `Cpu` and the `NesBus`;
//! the bus owns the `Ppu`, the cartridge `Mapper` and both controllers. The
//! bus never reaches back into the CPU directly - OAM DMA is performed
//! synchronously inside the bus's `$4014` write handler and its stall-cycle
//! cost is banked there for the console to fold into that step's PPU
//! catch-up.
//!
//! # Usage
//!
//! ```no_run
//! use rustynes_core::{Button, Console};
//!
//! let rom_data = std::fs::read("game.nes").expect("failed to read ROM");
//! let mut console = Console::new(&rom_data).expect("failed to create console");
//!
//! console.power_on();
//! console.set_button_1(Button::Start, true);
//!
//! loop {
//!     console.step_frame().expect("CPU jammed");
//!     let _framebuffer = console.framebuffer(); // 256x240 indexed pixels
//!     break; // (real loops keep going until the window closes)
//! }
//! ```

mod bus;
mod console;
pub mod input;
pub mod palette;

pub use bus::NesBus;
pub use console::{Console, ConsoleError, timing};
pub use input::{Button, Controller};

pub use rustynes_cpu::{Cpu, CpuError};
pub use rustynes_mappers::{Mapper, Mirroring, Rom, RomError, RomHeader, create_mapper};
pub use rustynes_ppu::Ppu;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// NES screen dimensions.
pub mod screen {
    /// Screen width in pixels.
    pub const WIDTH: u32 = 256;
    /// Screen height in pixels.
    pub const HEIGHT: u32 = 240;
    /// Total pixels per frame.
    pub const PIXELS: u32 = WIDTH * HEIGHT;
    /// Bytes per frame (one palette index per pixel).
    pub const FRAMEBUFFER_SIZE: usize = PIXELS as usize;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_constants() {
        assert_eq!(screen::WIDTH, 256);
        assert_eq!(screen::HEIGHT, 240);
        assert_eq!(screen::PIXELS, 61_440);
        assert_eq!(screen::FRAMEBUFFER_SIZE, 61_440);
    }

    #[test]
    fn test_timing_constants() {
        assert_eq!(timing::MASTER_CLOCK_NTSC, 21_477_272);
        assert_eq!(timing::CPU_CLOCK_NTSC, 1_789_772);
        assert_eq!(timing::PPU_CLOCK_NTSC, 5_369_318);
        assert_eq!(timing::CPU_CYCLES_PER_FRAME, 29_780);
    }

    #[test]
    fn test_palette_module() {
        assert_eq!(palette::NES_PALETTE.len(), 64);
        assert_eq!(palette::palette_to_rgb(0x20), [0xFF, 0xFF, 0xFF]);
        assert_eq!(palette::palette_to_rgb(0x0D), [0x00, 0x00, 0x00]);
    }

    fn minimal_rom() -> Vec<u8> {
        let mut rom = vec![0u8; 16 + 32768 + 8192];
        rom[0..4].copy_from_slice(b"NES\x1a");
        rom[4] = 2;
        rom[5] = 1;
        rom[6] = 0x01;
        rom[16 + 0x7FFC] = 0x00;
        rom[16 + 0x7FFD] = 0x80;
        rom[16] = 0x4C; // JMP $8000
        rom[17] = 0x00;
        rom[18] = 0x80;
        rom
    }

    #[test]
    fn test_console_step_accumulates_cycles() {
        let rom_data = minimal_rom();
        let mut console = Console::new(&rom_data).unwrap();
        console.power_on();

        let mut total_cycles = console.total_cycles();
        for _ in 0..10 {
            total_cycles += u64::from(console.step().unwrap());
        }

        assert!(total_cycles > 0);
        assert_eq!(console.total_cycles(), total_cycles);
    }

    #[test]
    fn test_button_press_reaches_controller() {
        let rom_data = minimal_rom();
        let mut console = Console::new(&rom_data).unwrap();
        console.power_on();
        console.set_button_1(Button::A, true);
        // Strobe and read via the public memory map.
        assert_eq!(console.peek_memory(0x4016), 0); // peek has no side effects
    }
}
