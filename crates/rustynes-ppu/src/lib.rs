//! NES 2C02 PPU (Picture Processing Unit) emulation.
//!
//! This crate provides the NES PPU's register-shadow semantics, memory
//! mirroring, and background/sprite renderer producing a 256x240 indexed
//! framebuffer.
//!
//! # Overview
//!
//! The PPU operates at 3x the CPU clock rate and generates a 256x240 pixel
//! image. It consists of several subsystems:
//!
//! - **Registers**: Control, Mask, Status, OAM Address, Scroll, Address, Data
//! - **Background rendering**: Nametables, pattern tables, attribute tables
//! - **Sprite rendering**: OAM, sprite evaluation, sprite 0 hit detection
//! - **Palette**: 32-byte palette RAM with mirroring
//!
//! # Timing
//!
//! NTSC timing (the primary target):
//! - Master clock: 21.477272 MHz
//! - PPU clock: 5.369318 MHz (master / 4)
//! - 341 dots per scanline
//! - 262 scanlines per frame
//! - 89,341-89,342 dots per frame (odd frame skip)
//!
//! # Usage
//!
//! ```
//! use rustynes_ppu::{Ppu, Mirroring};
//!
//! let mut ppu = Ppu::new(Mirroring::Horizontal);
//!
//! // Step the PPU once per dot, supplying a CHR reader for pattern-table
//! // fetches (normally backed by the cartridge mapper).
//! let (frame_complete, nmi) = ppu.step_with_chr(|_addr| 0);
//! if nmi {
//!     // Latch NMI onto the CPU for its next instruction boundary.
//! }
//! let _ = frame_complete;
//!
//! // Access registers from the CPU side.
//! ppu.write_register(0x2000, 0x80, |_, _| {}); // Enable NMI
//! let _status = ppu.read_register(0x2002, |_| 0);
//! ```

mod background;
mod oam;
mod ppu;
mod registers;
mod scroll;
mod sprites;
mod timing;
mod vram;

pub use oam::{Sprite, SpriteAttributes};
pub use ppu::{FRAME_HEIGHT, FRAME_SIZE, FRAME_WIDTH, Ppu};
pub use registers::{PpuCtrl, PpuMask, PpuStatus};
pub use vram::Mirroring;
