//! PPU timing and register integration tests, self-contained (no external
//! test ROM fixtures).

use rustynes_ppu::{Mirroring, Ppu};

fn no_chr(_addr: u16) -> u8 {
    0
}

#[test]
fn frame_completes_after_one_full_scanline_sweep() {
    let mut ppu = Ppu::new(Mirroring::Horizontal);
    let mut frames = 0;
    // One NTSC frame is 341 dots * 262 scanlines.
    for _ in 0..(341u32 * 262) {
        let (frame_done, _nmi) = ppu.step_with_chr(no_chr);
        if frame_done {
            frames += 1;
        }
    }
    assert_eq!(frames, 1);
}

#[test]
fn vblank_nmi_fires_once_per_frame_when_enabled() {
    let mut ppu = Ppu::new(Mirroring::Vertical);
    // Enable NMI-on-vblank via PPUCTRL ($2000), bit 7.
    ppu.write_register(0x2000, 0x80, |_, _| {});

    let mut nmi_count = 0;
    for _ in 0..(341u32 * 262) {
        let (_frame_done, nmi) = ppu.step_with_chr(no_chr);
        if nmi {
            nmi_count += 1;
        }
    }
    assert_eq!(nmi_count, 1);
}

#[test]
fn oam_dma_copies_into_sprite_memory() {
    let mut ppu = Ppu::new(Mirroring::Horizontal);
    let mut data = [0u8; 256];
    data[0] = 0x10; // sprite 0 Y
    data[1] = 0x42; // sprite 0 tile
    ppu.oam_dma(&data);

    ppu.write_register(0x2003, 0x00, |_, _| {});
    let y = ppu.read_register(0x2004, no_chr);
    assert_eq!(y, 0x10);
}

#[test]
fn ppu_register_mirroring_every_eight_bytes() {
    let mut ppu = Ppu::new(Mirroring::Horizontal);
    // $2000 and $2008 both address PPUCTRL.
    ppu.write_register(0x2000, 0x00, |_, _| {});
    ppu.write_register(0x2008, 0x80, |_, _| {});
    // No direct getter for PPUCTRL; indirectly confirm via NMI behavior
    // (enabled by the second write reaching the same register).
    let mut nmi_seen = false;
    for _ in 0..(341u32 * 262) {
        let (_frame_done, nmi) = ppu.step_with_chr(no_chr);
        nmi_seen |= nmi;
    }
    assert!(nmi_seen);
}

#[test]
fn reset_clears_frame_buffer_and_scroll_state() {
    let mut ppu = Ppu::new(Mirroring::Horizontal);
    ppu.write_register(0x2006, 0x21, |_, _| {});
    ppu.write_register(0x2006, 0x00, |_, _| {});
    assert_eq!(ppu.vram_addr(), 0x2100);

    ppu.reset();
    assert!(ppu.frame_buffer().iter().all(|&b| b == 0));
}

#[test]
fn scroll_register_write_updates_coarse_and_fine_x() {
    let mut ppu = Ppu::new(Mirroring::Horizontal);
    // PPUSCROLL: first write is X (coarse in bits 3-7, fine in bits 0-2).
    ppu.write_register(0x2005, 0b0001_0011, |_, _| {}); // coarse_x=2, fine_x=3
    assert_eq!(ppu.fine_x(), 3);
}
