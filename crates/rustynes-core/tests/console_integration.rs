//! End-to-end `Console` integration tests against synthetic NROM images.
//!
//! These build small iNES images in-memory rather than depending on
//! external test ROM fixtures, so the suite is fully self-contained.

use rustynes_core::{Button, Console};

/// Build a minimal 32KB PRG / 8KB CHR NROM image with a given reset vector
/// program. `program` is written starting at CPU address `$8000`.
fn build_rom(program: &[u8]) -> Vec<u8> {
    let mut rom = vec![0u8; 16 + 32768 + 8192];
    rom[0..4].copy_from_slice(b"NES\x1a");
    rom[4] = 2; // 32KB PRG-ROM
    rom[5] = 1; // 8KB CHR-ROM
    rom[6] = 0x01; // mapper 0, vertical mirroring

    rom[16 + 0x7FFC] = 0x00; // reset vector low
    rom[16 + 0x7FFD] = 0x80; // reset vector high

    for (i, &byte) in program.iter().enumerate() {
        rom[16 + i] = byte;
    }
    rom
}

#[test]
fn loads_and_powers_on() {
    let rom = build_rom(&[0x4C, 0x00, 0x80]); // JMP $8000
    let mut console = Console::new(&rom).unwrap();
    console.power_on();
    assert_eq!(console.peek_memory(0xFFFC), 0x00);
    assert_eq!(console.peek_memory(0xFFFD), 0x80);
}

#[test]
fn runs_a_small_program() {
    // LDA #$42; STA $0010; LDX #$05; loop: DEX; BNE loop; JMP $8000
    let program = [
        0xA9, 0x42, // LDA #$42
        0x85, 0x10, // STA $10
        0xA2, 0x05, // LDX #$05
        0xCA, // DEX
        0xD0, 0xFD, // BNE loop
        0x4C, 0x00, 0x80, // JMP $8000
    ];
    let rom = build_rom(&program);
    let mut console = Console::new(&rom).unwrap();
    console.power_on();

    for _ in 0..3 {
        console.step().unwrap();
    }
    assert_eq!(console.peek_memory(0x0010), 0x42);
}

#[test]
fn step_frame_produces_full_framebuffer() {
    let rom = build_rom(&[0x4C, 0x00, 0x80]);
    let mut console = Console::new(&rom).unwrap();
    console.power_on();
    console.step_frame().unwrap();
    let fb = console.framebuffer();
    assert_eq!(fb.len(), 256 * 240);
}

#[test]
fn multiple_frames_keep_advancing_cycles() {
    let rom = build_rom(&[0x4C, 0x00, 0x80]);
    let mut console = Console::new(&rom).unwrap();
    console.power_on();

    console.step_frame().unwrap();
    let after_one = console.total_cycles();
    console.step_frame().unwrap();
    let after_two = console.total_cycles();

    assert!(after_two > after_one);
}

#[test]
fn controller_button_state_is_tracked_independently() {
    // Strobe both pads, then shift the first four bits (A, B, Select,
    // Start) of each controller into zero page, masking off the open-bus
    // bits the shift register leaves in bits 1-7 of the raw read.
    let program = [
        0xA9, 0x01, // LDA #$01
        0x8D, 0x16, 0x40, // STA $4016 (strobe high)
        0xA9, 0x00, // LDA #$00
        0x8D, 0x16, 0x40, // STA $4016 (strobe low, latch)
        0xAD, 0x16, 0x40, // LDA $4016   ; ctrl1 A
        0x29, 0x01, // AND #$01
        0x85, 0x10, // STA $10
        0xAD, 0x16, 0x40, // LDA $4016   ; ctrl1 B
        0x29, 0x01, // AND #$01
        0x85, 0x11, // STA $11
        0xAD, 0x16, 0x40, // LDA $4016   ; ctrl1 Select
        0x29, 0x01, // AND #$01
        0x85, 0x12, // STA $12
        0xAD, 0x16, 0x40, // LDA $4016   ; ctrl1 Start
        0x29, 0x01, // AND #$01
        0x85, 0x13, // STA $13
        0xAD, 0x17, 0x40, // LDA $4017   ; ctrl2 A
        0x29, 0x01, // AND #$01
        0x85, 0x14, // STA $14
        0xAD, 0x17, 0x40, // LDA $4017   ; ctrl2 B
        0x29, 0x01, // AND #$01
        0x85, 0x15, // STA $15
        0xAD, 0x17, 0x40, // LDA $4017   ; ctrl2 Select
        0x29, 0x01, // AND #$01
        0x85, 0x16, // STA $16
        0xAD, 0x17, 0x40, // LDA $4017   ; ctrl2 Start
        0x29, 0x01, // AND #$01
        0x85, 0x17, // STA $17
        0x4C, 0x00, 0x80, // JMP $8000
    ];
    let rom = build_rom(&program);
    let mut console = Console::new(&rom).unwrap();
    console.power_on();

    console.set_button_1(Button::A, true);
    console.set_button_2(Button::Start, true);

    for _ in 0..28 {
        console.step().unwrap();
    }

    // Controller 1 only saw A pressed.
    assert_eq!(console.peek_memory(0x0010), 1); // A
    assert_eq!(console.peek_memory(0x0011), 0); // B
    assert_eq!(console.peek_memory(0x0012), 0); // Select
    assert_eq!(console.peek_memory(0x0013), 0); // Start

    // Controller 2 only saw Start pressed.
    assert_eq!(console.peek_memory(0x0014), 0); // A
    assert_eq!(console.peek_memory(0x0015), 0); // B
    assert_eq!(console.peek_memory(0x0016), 0); // Select
    assert_eq!(console.peek_memory(0x0017), 1); // Start
}

#[test]
fn reset_reloads_reset_vector_and_clears_ram() {
    let program = [0xA9, 0x42, 0x85, 0x10, 0x4C, 0x00, 0x80];
    let rom = build_rom(&program);
    let mut console = Console::new(&rom).unwrap();
    console.power_on();
    console.step().unwrap();
    console.step().unwrap();
    assert_eq!(console.peek_memory(0x0010), 0x42);

    console.reset();
    assert_eq!(console.peek_memory(0x0010), 0x00);
}

#[test]
fn jam_opcode_halts_the_cpu_and_reports_fatal() {
    let rom = build_rom(&[0x02]); // JAM
    let mut console = Console::new(&rom).unwrap();
    console.power_on();

    assert!(console.step().is_err());
    // The CPU doesn't move past the JAM; stepping again reports the same
    // halt instead of silently resuming.
    assert!(console.step().is_err());
}

#[test]
fn rejects_nes2_format_images() {
    let mut rom = build_rom(&[0x4C, 0x00, 0x80]);
    rom[7] = 0x08; // byte 7 bits 2-3 = 0b10 marks NES 2.0
    assert!(Console::new(&rom).is_err());
}

#[test]
fn rejects_unsupported_mapper() {
    let mut rom = build_rom(&[0x4C, 0x00, 0x80]);
    rom[6] = 0x10; // mapper 1 (MMC1) nibble, not implemented
    assert!(Console::new(&rom).is_err());
}

#[test]
fn rejects_truncated_header() {
    let rom = vec![0x4E, 0x45, 0x53, 0x1A]; // magic only, no body
    assert!(Console::new(&rom).is_err());
}
