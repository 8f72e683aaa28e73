//! The top-level emulation driver.
//!
//! [`Console`] owns the CPU and the bus and coordinates their stepping: each
//! call to [`Console::step`] runs one CPU instruction, then catches the PPU
//! up by three dots per CPU cycle consumed (including any banked OAM-DMA
//! stall), and finally latches any NMI/IRQ the PPU or mapper raised for the
//! CPU's next instruction.

use rustynes_cpu::{Bus as _, Cpu, CpuError};
use rustynes_mappers::{Rom, RomError, create_mapper};

use crate::bus::NesBus;
use crate::input::Button;

/// NES emulation timing constants.
pub mod timing {
    /// Master clock frequency (NTSC).
    pub const MASTER_CLOCK_NTSC: u32 = 21_477_272;
    /// CPU clock frequency (NTSC).
    pub const CPU_CLOCK_NTSC: u32 = MASTER_CLOCK_NTSC / 12;
    /// PPU clock frequency (NTSC).
    pub const PPU_CLOCK_NTSC: u32 = MASTER_CLOCK_NTSC / 4;
    /// CPU cycles per frame (NTSC), for informational/throttling use only;
    /// `Console::step_frame` itself stops on the PPU's own frame-complete
    /// signal rather than this fixed budget.
    pub const CPU_CYCLES_PER_FRAME: u32 = 29_780;
    /// PPU dots per scanline.
    pub const PPU_DOTS_PER_SCANLINE: u16 = 341;
    /// Total scanlines (including vblank).
    pub const PPU_SCANLINES: u16 = 262;
    /// Target frame rate (NTSC).
    pub const FRAME_RATE_NTSC: f64 = 60.0988;
}

/// Errors that can occur while constructing or running a [`Console`].
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    /// The ROM image could not be parsed or used an unsupported mapper.
    #[error("ROM error: {0}")]
    Rom(#[from] RomError),
    /// The CPU hit an unrecoverable condition (a JAM/KIL halt opcode).
    #[error("CPU error: {0}")]
    Cpu(#[from] CpuError),
}

/// A complete, runnable NES: CPU, PPU, cartridge mapper and controllers.
pub struct Console {
    cpu: Cpu,
    bus: NesBus,
    total_cycles: u64,
}

impl Console {
    /// Parse `rom_bytes` as an iNES 1.0 image and build a console around it.
    ///
    /// The console is constructed but not powered on; call [`Self::power_on`]
    /// to run the RESET sequence before stepping.
    pub fn new(rom_bytes: &[u8]) -> Result<Self, ConsoleError> {
        let rom = Rom::load(rom_bytes)?;
        let mapper = create_mapper(&rom)?;
        let bus = NesBus::new(mapper);
        Ok(Self {
            cpu: Cpu::new(),
            bus,
            total_cycles: 0,
        })
    }

    /// Run the CPU's RESET sequence, loading PC from the reset vector.
    pub fn power_on(&mut self) {
        self.cpu.reset(&mut self.bus);
        self.total_cycles = self.cpu.cycles;
    }

    /// Reset the console: RAM, PPU and controller latches are cleared and
    /// the CPU re-enters its RESET sequence. The cartridge is untouched.
    pub fn reset(&mut self) {
        self.bus.reset();
        self.cpu.reset(&mut self.bus);
        self.total_cycles = self.cpu.cycles;
    }

    /// Execute one CPU instruction (including any banked DMA stall) and
    /// catch the PPU up accordingly.
    ///
    /// Returns the number of CPU cycles this step consumed, or a
    /// [`ConsoleError::Cpu`] if the instruction just executed was a JAM/KIL
    /// opcode — the CPU is now halted and further `step` calls would spin
    /// without making progress.
    pub fn step(&mut self) -> Result<u32, ConsoleError> {
        let (cycles, _frame_complete) = self.step_internal();
        self.check_fatal()?;
        Ok(cycles)
    }

    /// Run instructions until a full PPU frame has been produced.
    ///
    /// Stops early with a [`ConsoleError::Cpu`] if the CPU jams mid-frame.
    pub fn step_frame(&mut self) -> Result<(), ConsoleError> {
        loop {
            let (_, frame_complete) = self.step_internal();
            self.check_fatal()?;
            if frame_complete {
                return Ok(());
            }
        }
    }

    /// `Err` if the CPU has halted on a JAM/KIL opcode, naming the opcode
    /// and its address for diagnostics.
    fn check_fatal(&self) -> Result<(), ConsoleError> {
        match self.cpu.jam_info() {
            Some((opcode, pc)) => Err(CpuError::Jammed(opcode, pc).into()),
            None => Ok(()),
        }
    }

    fn step_internal(&mut self) -> (u32, bool) {
        let cycles = u32::from(self.cpu.step(&mut self.bus));
        let dma_stall = u32::from(self.bus.take_dma_stall());
        let total = cycles + dma_stall;

        let mut frame_complete = false;
        for _ in 0..total {
            for _ in 0..3 {
                frame_complete |= self.bus.tick_ppu();
            }
        }
        self.bus.advance_cpu_cycles(u64::from(total));
        self.total_cycles += u64::from(total);

        if self.bus.take_nmi() {
            self.cpu.trigger_nmi();
        }
        self.cpu.set_irq(self.bus.mapper_irq_pending());

        (total, frame_complete)
    }

    /// The current 256x240 indexed framebuffer (one NES palette index,
    /// 0-63, per pixel, row-major).
    #[must_use]
    pub fn framebuffer(&self) -> &[u8] {
        self.bus.ppu().frame_buffer()
    }

    /// Total CPU cycles executed since construction (or the last reset).
    #[must_use]
    pub const fn total_cycles(&self) -> u64 {
        self.total_cycles
    }

    /// Read memory without side effects, for debuggers/disassemblers.
    #[must_use]
    pub fn peek_memory(&self, addr: u16) -> u8 {
        self.bus.peek(addr)
    }

    /// Set a button's state on controller 1.
    pub fn set_button_1(&mut self, button: Button, pressed: bool) {
        self.bus.controller1_mut().set_button(button, pressed);
    }

    /// Set a button's state on controller 2.
    pub fn set_button_2(&mut self, button: Button, pressed: bool) {
        self.bus.controller2_mut().set_button(button, pressed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustynes_mappers::Mirroring;

    fn minimal_rom() -> Vec<u8> {
        let mut rom = vec![0u8; 16 + 32768 + 8192];
        rom[0..4].copy_from_slice(b"NES\x1a");
        rom[4] = 2; // 32KB PRG-ROM
        rom[5] = 1; // 8KB CHR-ROM
        rom[6] = 0x01; // mapper 0, vertical mirroring

        // Reset vector -> $8000, infinite JMP loop.
        rom[16 + 0x7FFC] = 0x00;
        rom[16 + 0x7FFD] = 0x80;
        rom[16] = 0x4C; // JMP absolute
        rom[17] = 0x00;
        rom[18] = 0x80;

        rom
    }

    #[test]
    fn test_console_from_rom() {
        let rom_data = minimal_rom();
        let console = Console::new(&rom_data).unwrap();
        assert_eq!(console.total_cycles(), 0);
        let _ = Mirroring::Vertical;
    }

    #[test]
    fn test_power_on_reads_reset_vector() {
        let rom_data = minimal_rom();
        let mut console = Console::new(&rom_data).unwrap();
        console.power_on();
        assert_eq!(console.cpu.pc, 0x8000);
        assert_eq!(console.total_cycles(), 7);
    }

    #[test]
    fn test_step_runs_jmp_loop() {
        let rom_data = minimal_rom();
        let mut console = Console::new(&rom_data).unwrap();
        console.power_on();

        let cycles = console.step().unwrap();
        assert_eq!(cycles, 3); // JMP absolute takes 3 cycles
        assert_eq!(console.cpu.pc, 0x8000);
    }

    #[test]
    fn test_step_frame_completes() {
        let rom_data = minimal_rom();
        let mut console = Console::new(&rom_data).unwrap();
        console.power_on();
        console.step_frame().unwrap();
        assert_eq!(console.framebuffer().len(), 256 * 240);
    }

    #[test]
    fn test_reset_reloads_vector() {
        let rom_data = minimal_rom();
        let mut console = Console::new(&rom_data).unwrap();
        console.power_on();
        console.step().unwrap();
        console.reset();
        assert_eq!(console.cpu.pc, 0x8000);
    }

    #[test]
    fn test_unsupported_mapper_rejected() {
        let mut rom_data = minimal_rom();
        rom_data[6] = 0x10; // mapper 1 (MMC1), not implemented
        let result = Console::new(&rom_data);
        assert!(result.is_err());
    }

    #[test]
    fn test_jam_opcode_reported_as_fatal() {
        let mut rom_data = minimal_rom();
        rom_data[16] = 0x02; // JAM, in place of the JMP loop
        let mut console = Console::new(&rom_data).unwrap();
        console.power_on();

        let err = console.step().unwrap_err();
        assert!(matches!(err, ConsoleError::Cpu(CpuError::Jammed(0x02, 0x8000))));

        // The CPU stays halted; further steps keep reporting the same jam
        // rather than spinning or silently making progress.
        let err = console.step().unwrap_err();
        assert!(matches!(err, ConsoleError::Cpu(CpuError::Jammed(0x02, 0x8000))));
    }
}
