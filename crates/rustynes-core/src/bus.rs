//! System bus wiring the CPU to RAM, the PPU, the cartridge mapper, and the
//! controllers.
//!
//! The bus owns everything the CPU's [`rustynes_cpu::Bus`] trait needs to
//! reach, and mediates OAM DMA: the 256-byte copy happens synchronously
//! inside the `$4014` write handler, and the 513/514-cycle stall it costs is
//! banked here for [`crate::console::Console`] to fold into that step's PPU
//! catch-up.

use rustynes_mappers::Mapper;
use rustynes_ppu::Ppu;

use crate::input::Controller;

fn convert_mirroring(mirroring: rustynes_mappers::Mirroring) -> rustynes_ppu::Mirroring {
    match mirroring {
        rustynes_mappers::Mirroring::Horizontal => rustynes_ppu::Mirroring::Horizontal,
        rustynes_mappers::Mirroring::Vertical => rustynes_ppu::Mirroring::Vertical,
        rustynes_mappers::Mirroring::SingleScreenLower => {
            rustynes_ppu::Mirroring::SingleScreenLower
        }
        rustynes_mappers::Mirroring::SingleScreenUpper => {
            rustynes_ppu::Mirroring::SingleScreenUpper
        }
        rustynes_mappers::Mirroring::FourScreen => rustynes_ppu::Mirroring::FourScreen,
    }
}

/// Memory bus connecting the CPU to the rest of the console.
///
/// # Memory Map
///
/// | Range           | Device                                   |
/// |------------------|------------------------------------------|
/// | `$0000`-`$1FFF`  | 2KB internal RAM, mirrored every `$0800`  |
/// | `$2000`-`$3FFF`  | PPU registers, mirrored every 8 bytes      |
/// | `$4000`-`$4013`  | APU registers (unimplemented, stubbed)     |
/// | `$4014`          | OAM DMA trigger                            |
/// | `$4015`          | APU status (unimplemented, stubbed)        |
/// | `$4016`          | Controller 1 data / strobe (both pads)     |
/// | `$4017`          | Controller 2 data / APU frame counter stub |
/// | `$4018`-`$401F`  | Unused / CPU test registers                |
/// | `$4020`-`$FFFF`  | Cartridge space (mapper)                   |
pub struct NesBus {
    ram: [u8; 0x0800],
    ppu: Ppu,
    mapper: Box<dyn Mapper>,
    controller1: Controller,
    controller2: Controller,
    cpu_cycles: u64,
    pending_dma_stall: u16,
    nmi_pending: bool,
    last_bus_value: u8,
}

impl NesBus {
    /// Construct a bus around the given cartridge mapper.
    #[must_use]
    pub fn new(mapper: Box<dyn Mapper>) -> Self {
        let mirroring = convert_mirroring(mapper.mirroring());
        Self {
            ram: [0; 0x0800],
            ppu: Ppu::new(mirroring),
            mapper,
            controller1: Controller::new(),
            controller2: Controller::new(),
            cpu_cycles: 0,
            pending_dma_stall: 0,
            nmi_pending: false,
            last_bus_value: 0,
        }
    }

    /// Read access to the PPU, for framebuffer/debug queries.
    #[must_use]
    pub fn ppu(&self) -> &Ppu {
        &self.ppu
    }

    /// Mutable access to controller 1.
    pub fn controller1_mut(&mut self) -> &mut Controller {
        &mut self.controller1
    }

    /// Mutable access to controller 2.
    pub fn controller2_mut(&mut self) -> &mut Controller {
        &mut self.controller2
    }

    /// Advance the PPU by one dot, feeding it the mapper's CHR memory.
    ///
    /// Returns `true` if this dot completed a frame.
    pub fn tick_ppu(&mut self) -> bool {
        let Self { ppu, mapper, .. } = self;
        let (frame_complete, nmi) = ppu.step_with_chr(|addr| mapper.read_chr(addr));
        if nmi {
            self.nmi_pending = true;
        }
        frame_complete
    }

    /// Take and clear the NMI latch raised by the PPU entering VBlank.
    pub fn take_nmi(&mut self) -> bool {
        std::mem::take(&mut self.nmi_pending)
    }

    /// Record that the CPU consumed `n` cycles (for DMA parity and mapper
    /// clocking).
    pub fn advance_cpu_cycles(&mut self, n: u64) {
        self.cpu_cycles = self.cpu_cycles.wrapping_add(n);
        for _ in 0..n {
            self.mapper.clock(1);
        }
    }

    /// Take and clear the DMA stall banked by a `$4014` write, in CPU
    /// cycles.
    pub fn take_dma_stall(&mut self) -> u16 {
        std::mem::take(&mut self.pending_dma_stall)
    }

    /// Whether the mapper has an IRQ asserted (never true for NROM, kept as
    /// a hook for future bank-switching mappers).
    #[must_use]
    pub fn mapper_irq_pending(&self) -> bool {
        self.mapper.irq_pending()
    }

    /// Reset RAM, controllers, and PPU latches. The mapper and cartridge
    /// contents are untouched.
    pub fn reset(&mut self) {
        self.ram = [0; 0x0800];
        self.ppu.reset();
        self.controller1.reset();
        self.controller2.reset();
        self.pending_dma_stall = 0;
        self.nmi_pending = false;
        self.last_bus_value = 0;
    }

    fn oam_dma(&mut self, page: u8) {
        let base = u16::from(page) << 8;
        let mut data = [0u8; 256];
        for (i, slot) in data.iter_mut().enumerate() {
            *slot = self.read(base.wrapping_add(i as u16));
        }
        self.ppu.oam_dma(&data);

        // Odd CPU cycle counts add an extra alignment cycle.
        let stall = if self.cpu_cycles % 2 == 1 { 514 } else { 513 };
        self.pending_dma_stall = self.pending_dma_stall.saturating_add(stall);
    }
}

impl rustynes_cpu::Bus for NesBus {
    fn read(&mut self, addr: u16) -> u8 {
        let value = match addr {
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize],
            0x2000..=0x3FFF => {
                let Self { ppu, mapper, .. } = self;
                ppu.read_register(addr, |a| mapper.read_chr(a))
            }
            0x4015 => 0, // APU status: not emulated, stub read.
            0x4016 => self.controller1.read(),
            0x4017 => self.controller2.read(),
            0x4000..=0x4017 => 0, // Other APU registers: stub.
            0x4018..=0x401F => 0, // CPU test mode registers: unused.
            0x4020..=0x5FFF => self.last_bus_value, // Unmapped cartridge space: open bus.
            0x6000..=0x7FFF => 0, // No PRG-RAM on NROM.
            _ => self.mapper.read_prg(addr),
        };
        self.last_bus_value = value;
        value
    }

    fn write(&mut self, addr: u16, value: u8) {
        self.last_bus_value = value;
        match addr {
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize] = value,
            0x2000..=0x3FFF => {
                let Self { ppu, mapper, .. } = self;
                ppu.write_register(addr, value, |a, v| mapper.write_chr(a, v));
            }
            0x4014 => self.oam_dma(value),
            0x4016 => {
                self.controller1.write_strobe(value);
                self.controller2.write_strobe(value);
            }
            0x4000..=0x4017 => {} // Other APU registers: ignored (stub).
            0x4018..=0x401F => {} // CPU test mode registers: ignored.
            0x4020..=0x7FFF => {} // No PRG-RAM on NROM: ignored.
            _ => self.mapper.write_prg(addr, value),
        }
    }

    fn peek(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1FFF => self.ram[(addr & 0x07FF) as usize],
            0x2000..=0x3FFF => self.last_bus_value, // PPU reads have side effects; approximate.
            0x4000..=0x7FFF => self.last_bus_value,
            _ => self.mapper.read_prg(addr),
        }
    }
}
