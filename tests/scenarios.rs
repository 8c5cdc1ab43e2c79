//! End-to-end scenarios: sources go through the assembler, the images
//! through the emulator, and the final state is checked against the
//! semantics both programs are supposed to share.

use emu::cpu::Armv8;
use emu::snapshot;
use pretty_assertions::assert_eq;

fn run_source(source: &str) -> Armv8 {
    let image = asm::assemble(source).expect("source should assemble");
    let mut cpu = Armv8::new(&image).expect("image should fit in memory");
    cpu.run();
    cpu
}

fn dump(cpu: &Armv8) -> String {
    let mut out = Vec::new();
    snapshot::write_state(cpu, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn adds_two_constants() {
    let cpu = run_source("movz x0, #5\nmovz x1, #7\nadd x2, x0, x1\nhalt\n");
    assert_eq!(cpu.registers.read(2), 0xC);
    assert!(dump(&cpu).contains("X02 = 000000000000000c\n"));
}

#[test]
fn subs_of_equal_values_sets_zero_and_carry() {
    let cpu = run_source("movz x0, #10\nsubs x1, x0, #10\nhalt\n");
    assert_eq!(cpu.registers.read(1), 0);
    assert!(dump(&cpu).contains("PSTATE : -ZC-\n"));
}

#[test]
fn movk_patches_one_field() {
    let cpu = run_source("movz x0, #0xFFFF\nmovk x0, #0x1234, lsl #16\nhalt\n");
    assert_eq!(cpu.registers.read(0), 0x1234_FFFF);
}

#[test]
fn conditional_loop_counts_to_three() {
    let cpu = run_source(
        "movz x0, #1\n\
         loop:\n\
         adds x0, x0, #1\n\
         cmp x0, #3\n\
         b.lt loop\n\
         halt\n",
    );
    assert_eq!(cpu.registers.read(0), 3);
}

#[test]
fn store_then_load_through_memory() {
    let cpu = run_source(
        "movz x0, #0x1000\n\
         movz x1, #0xABCD\n\
         str x1, [x0]\n\
         ldr x2, [x0]\n\
         halt\n",
    );
    assert_eq!(cpu.registers.read(2), 0xABCD);
    assert_eq!(cpu.memory.read_word(0x1000), 0xABCD);
    assert!(dump(&cpu).contains("0x00001000: 0x0000abcd\n"));
}

#[test]
fn int_directive_standalone() {
    let image = asm::assemble(".int 0xDEADBEEF\n").unwrap();
    assert_eq!(image, vec![0xEF, 0xBE, 0xAD, 0xDE]);
}

#[test]
fn dump_reports_the_halt_address() {
    let cpu = run_source("movz x0, #1\nmovz x1, #2\nhalt\n");
    assert!(dump(&cpu).contains("PC = 0000000000000008\n"));
}

#[test]
fn assembled_words_match_hand_encodings() {
    let image = asm::assemble(
        "movz x0, #5\n\
         add x2, x0, x1\n\
         ldr x1, [x2, #-8]!\n\
         str x1, [x2], #16\n\
         madd x2, x0, x1, x3\n\
         br x3\n\
         halt\n",
    )
    .unwrap();

    let words: Vec<u32> = image
        .chunks_exact(4)
        .map(|chunk| u32::from_le_bytes(chunk.try_into().unwrap()))
        .collect();
    assert_eq!(
        words,
        vec![
            0xD280_00A0,
            0x8B01_0002,
            0xF85F_8C41,
            0xF841_0441,
            0x9B01_0C02,
            0xD61F_0060,
            0x8A00_0000,
        ]
    );
}

#[test]
fn hand_encoded_words_execute_like_their_source() {
    // The same program, once through the assembler and once as raw
    // words, must leave identical register and memory state.
    let source = "movz x0, #0x100\n\
                  movz x1, #77\n\
                  str x1, [x0]\n\
                  ldr x2, [x0]\n\
                  adds x3, x2, #1\n\
                  halt\n";
    let assembled = asm::assemble(source).unwrap();

    let hand_encoded: Vec<u8> = [
        0xD280_2000_u32, // movz x0, #0x100
        0xD280_09A1,     // movz x1, #77
        0xF900_0001,     // str x1, [x0]
        0xF940_0002,     // ldr x2, [x0]
        0xB100_0443,     // adds x3, x2, #1
        0x8A00_0000,     // halt
    ]
    .iter()
    .flat_map(|word| word.to_le_bytes())
    .collect();
    assert_eq!(assembled, hand_encoded);

    let mut via_assembler = Armv8::new(&assembled).unwrap();
    via_assembler.run();
    let mut via_words = Armv8::new(&hand_encoded).unwrap();
    via_words.run();

    assert_eq!(dump(&via_assembler), dump(&via_words));
    assert_eq!(via_assembler.registers.read(3), 78);
}

#[test]
fn zero_register_destination_keeps_state_but_flags_move() {
    let cpu = run_source(
        "movz x0, #9\n\
         cmp x0, #9\n\
         add xzr, x0, x0\n\
         halt\n",
    );
    assert_eq!(cpu.registers.read(31), 0);
    assert_eq!(cpu.registers.read(0), 9);
    assert!(dump(&cpu).contains("PSTATE : -ZC-\n"));
}

#[test]
fn thirty_two_bit_writes_clear_the_upper_half() {
    let cpu = run_source(
        "movn x0, #0\n\
         add w0, w0, #1\n\
         halt\n",
    );
    // x0 was all ones; the 32-bit add wraps to zero and clears the top.
    assert_eq!(cpu.registers.read(0), 0);
}

#[test]
fn little_endian_store_layout() {
    let cpu = run_source(
        "movz x0, #0x100\n\
         movz x1, #0x0708\n\
         movk x1, #0x0506, lsl #16\n\
         movk x1, #0x0304, lsl #32\n\
         movk x1, #0x0102, lsl #48\n\
         str x1, [x0]\n\
         halt\n",
    );
    assert_eq!(cpu.memory.read_word(0x100), 0x0506_0708);
    assert_eq!(cpu.memory.read_word(0x104), 0x0102_0304);
    let dump = dump(&cpu);
    assert!(dump.contains("0x00000100: 0x05060708\n"));
    assert!(dump.contains("0x00000104: 0x01020304\n"));
}

#[test]
fn backward_and_forward_branches_land_exactly() {
    let cpu = run_source(
        "movz x0, #1\n\
         b over\n\
         movz x0, #2\n\
         over:\n\
         movz x1, #3\n\
         halt\n",
    );
    assert_eq!(cpu.registers.read(0), 1);
    assert_eq!(cpu.registers.read(1), 3);
}

#[test]
fn register_branch_jumps_to_a_computed_address() {
    let cpu = run_source(
        "movz x0, #12\n\
         br x0\n\
         movz x1, #1\n\
         movz x2, #2\n\
         halt\n",
    );
    // The branch lands on `movz x2, #2` at address 12 and skips x1.
    assert_eq!(cpu.registers.read(1), 0);
    assert_eq!(cpu.registers.read(2), 2);
}

#[test]
fn load_literal_reads_a_pooled_constant() {
    let cpu = run_source(
        "ldr x0, value\n\
         halt\n\
         value:\n\
         .int 0x12345678\n\
         .int 0\n",
    );
    assert_eq!(cpu.registers.read(0), 0x1234_5678);
}
