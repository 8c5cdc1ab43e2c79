//! Instruction decoding: from a raw 32-bit word to a typed
//! [`Instruction`] with all fields extracted.
//!
//! The top-level dispatch reads `op0` (bits [28:25]):
//!
//! ```text
//! op0        family
//! ─────────  ──────────────────────────────────────────────
//! 1000 1001  data-processing immediate (arithmetic / wide move)
//! 0101       data-processing register (logical / arithmetic)
//! 1101       multiply
//! 0110 0111  loads and stores
//! 1100       loads and stores (load literal when bit 31 = 0)
//! 1010 1011  branches
//! ```
//!
//! The reserved word `0x8A000000` (HALT) is recognised before family
//! dispatch. Any word that matches no family decodes to
//! [`Instruction::Unknown`]; the executor skips those, which keeps runs
//! over arbitrary inputs deterministic.

use crate::bitwise::{Bits, sign_extend};
use crate::cpu::condition::Condition;
use crate::cpu::flags::{
    ArithmeticKind, LoadStoreKind, LogicalKind, MultiplyKind, OperandWidth, ShiftKind, WideMoveKind,
};

/// The reserved instruction word that terminates emulation. It is also
/// the natural encoding of `and x0, x0, x0`.
pub const HALT: u32 = 0x8A00_0000;

/// How a load or store computes its effective address.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AddressingMode {
    /// `Xn + imm12 * scale`, no write-back.
    UnsignedOffset { imm12: u32 },
    /// `Xn + Xm`, no write-back.
    RegisterOffset { rm: u32 },
    /// `Xn + simm9`, written back to `Xn` before the transfer.
    PreIndex { simm9: i64 },
    /// `Xn`, then `Xn + simm9` written back after the transfer.
    PostIndex { simm9: i64 },
}

/// A decoded instruction, one variant per encoding family.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Instruction {
    Halt,
    ArithmeticImmediate {
        width: OperandWidth,
        kind: ArithmeticKind,
        /// The `sh` bit: the immediate is shifted left by 12.
        shifted: bool,
        imm12: u32,
        rn: u32,
        rd: u32,
    },
    WideMove {
        width: OperandWidth,
        kind: WideMoveKind,
        hw: u32,
        imm16: u32,
        rd: u32,
    },
    ArithmeticRegister {
        width: OperandWidth,
        kind: ArithmeticKind,
        shift: ShiftKind,
        amount: u32,
        rm: u32,
        rn: u32,
        rd: u32,
    },
    LogicalRegister {
        width: OperandWidth,
        kind: LogicalKind,
        shift: ShiftKind,
        amount: u32,
        rm: u32,
        rn: u32,
        rd: u32,
    },
    Multiply {
        width: OperandWidth,
        kind: MultiplyKind,
        rm: u32,
        ra: u32,
        rn: u32,
        rd: u32,
    },
    LoadStoreRegister {
        width: OperandWidth,
        kind: LoadStoreKind,
        mode: AddressingMode,
        rn: u32,
        rt: u32,
    },
    /// Always a load, from `PC + simm19 * 4`.
    LoadLiteral {
        width: OperandWidth,
        simm19: i64,
        rt: u32,
    },
    Branch { simm26: i64 },
    BranchRegister { rn: u32 },
    BranchConditional { simm19: i64, cond: Condition },
    Unknown(u32),
}

impl From<u32> for Instruction {
    fn from(word: u32) -> Self {
        if word == HALT {
            return Self::Halt;
        }
        match word.get_bits(25..=28) {
            0x8 | 0x9 => decode_dp_immediate(word),
            0x5 => decode_dp_register(word),
            0xD => decode_multiply(word),
            0x6 | 0x7 | 0xC => decode_load_store(word),
            0xA | 0xB => decode_branch(word),
            _ => Self::Unknown(word),
        }
    }
}

fn decode_dp_immediate(word: u32) -> Instruction {
    let width = OperandWidth::from(word.get_bit(31));
    let opc = word.get_bits(29..=30) as u32;
    let rd = word.get_bits(0..=4) as u32;

    // opi, bits [25:23]
    match word.get_bits(23..=25) {
        0b010 => Instruction::ArithmeticImmediate {
            width,
            kind: ArithmeticKind::from(opc),
            shifted: word.get_bit(22),
            imm12: word.get_bits(10..=21) as u32,
            rn: word.get_bits(5..=9) as u32,
            rd,
        },
        0b101 => {
            let Some(kind) = WideMoveKind::from_opc(opc) else {
                return Instruction::Unknown(word);
            };
            Instruction::WideMove {
                width,
                kind,
                hw: word.get_bits(21..=22) as u32,
                imm16: word.get_bits(5..=20) as u32,
                rd,
            }
        }
        _ => Instruction::Unknown(word),
    }
}

fn decode_dp_register(word: u32) -> Instruction {
    let width = OperandWidth::from(word.get_bit(31));
    let opc = word.get_bits(29..=30) as u32;
    let shift = ShiftKind::from(word.get_bits(22..=23) as u32);
    let amount = word.get_bits(10..=15) as u32;
    let rm = word.get_bits(16..=20) as u32;
    let rn = word.get_bits(5..=9) as u32;
    let rd = word.get_bits(0..=4) as u32;

    if word.get_bit(24) {
        Instruction::ArithmeticRegister {
            width,
            kind: ArithmeticKind::from(opc),
            shift,
            amount,
            rm,
            rn,
            rd,
        }
    } else {
        Instruction::LogicalRegister {
            width,
            kind: LogicalKind::from_bits(opc, word.get_bit(21)),
            shift,
            amount,
            rm,
            rn,
            rd,
        }
    }
}

fn decode_multiply(word: u32) -> Instruction {
    if word.get_bits(21..=30) != 0b00_1101_1000 {
        return Instruction::Unknown(word);
    }
    Instruction::Multiply {
        width: OperandWidth::from(word.get_bit(31)),
        kind: MultiplyKind::from(word.get_bit(15)),
        rm: word.get_bits(16..=20) as u32,
        ra: word.get_bits(10..=14) as u32,
        rn: word.get_bits(5..=9) as u32,
        rd: word.get_bits(0..=4) as u32,
    }
}

fn decode_load_store(word: u32) -> Instruction {
    let rt = word.get_bits(0..=4) as u32;
    let width = OperandWidth::from(word.get_bit(30));

    // Bit 31 separates the PC-relative literal form from the
    // register-indexed forms.
    if word.is_bit_off(31) {
        if word.get_bits(24..=29) != 0b011000 {
            return Instruction::Unknown(word);
        }
        return Instruction::LoadLiteral {
            width,
            simm19: sign_extend(word.get_bits(5..=23), 19),
            rt,
        };
    }

    let kind = LoadStoreKind::from(word.get_bit(22));
    let rn = word.get_bits(5..=9) as u32;
    let mode = if word.get_bit(24) {
        AddressingMode::UnsignedOffset {
            imm12: word.get_bits(10..=21) as u32,
        }
    } else if word.get_bit(21) {
        AddressingMode::RegisterOffset {
            rm: word.get_bits(16..=20) as u32,
        }
    } else {
        let simm9 = sign_extend(word.get_bits(12..=20), 9);
        if word.get_bit(11) {
            AddressingMode::PreIndex { simm9 }
        } else {
            AddressingMode::PostIndex { simm9 }
        }
    };

    Instruction::LoadStoreRegister {
        width,
        kind,
        mode,
        rn,
        rt,
    }
}

fn decode_branch(word: u32) -> Instruction {
    match word.get_bits(26..=31) {
        0b000101 => Instruction::Branch {
            simm26: sign_extend(word.get_bits(0..=25), 26),
        },
        0b110101 => Instruction::BranchRegister {
            rn: word.get_bits(5..=9) as u32,
        },
        _ if word.get_bits(24..=31) == 0b0101_0100 => Instruction::BranchConditional {
            simm19: sign_extend(word.get_bits(5..=23), 19),
            cond: Condition::from(word.get_bits(0..=3) as u8),
        },
        _ => Instruction::Unknown(word),
    }
}

/// Spells a register operand the way the assembler dialect does.
fn reg_name(width: OperandWidth, reg: u32) -> String {
    let prefix = match width {
        OperandWidth::Word => 'w',
        OperandWidth::Doubleword => 'x',
    };
    if reg == 31 {
        format!("{prefix}zr")
    } else {
        format!("{prefix}{reg}")
    }
}

/// Renders assembly-like text for the execution trace.
impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::Halt => f.write_str("halt"),
            Self::ArithmeticImmediate {
                width,
                kind,
                shifted,
                imm12,
                rn,
                rd,
            } => {
                write!(
                    f,
                    "{kind} {}, {}, #{imm12}",
                    reg_name(width, rd),
                    reg_name(width, rn)
                )?;
                if shifted {
                    f.write_str(", lsl #12")?;
                }
                Ok(())
            }
            Self::WideMove {
                width,
                kind,
                hw,
                imm16,
                rd,
            } => {
                write!(f, "{kind} {}, #{imm16}", reg_name(width, rd))?;
                if hw != 0 {
                    write!(f, ", lsl #{}", hw * 16)?;
                }
                Ok(())
            }
            Self::ArithmeticRegister {
                width,
                kind,
                shift,
                amount,
                rm,
                rn,
                rd,
            } => {
                write!(
                    f,
                    "{kind} {}, {}, {}",
                    reg_name(width, rd),
                    reg_name(width, rn),
                    reg_name(width, rm)
                )?;
                if amount != 0 {
                    write!(f, ", {shift} #{amount}")?;
                }
                Ok(())
            }
            Self::LogicalRegister {
                width,
                kind,
                shift,
                amount,
                rm,
                rn,
                rd,
            } => {
                write!(
                    f,
                    "{kind} {}, {}, {}",
                    reg_name(width, rd),
                    reg_name(width, rn),
                    reg_name(width, rm)
                )?;
                if amount != 0 {
                    write!(f, ", {shift} #{amount}")?;
                }
                Ok(())
            }
            Self::Multiply {
                width,
                kind,
                rm,
                ra,
                rn,
                rd,
            } => write!(
                f,
                "{kind} {}, {}, {}, {}",
                reg_name(width, rd),
                reg_name(width, rn),
                reg_name(width, rm),
                reg_name(width, ra)
            ),
            Self::LoadStoreRegister {
                width,
                kind,
                mode,
                rn,
                rt,
            } => {
                let rt = reg_name(width, rt);
                let rn = reg_name(OperandWidth::Doubleword, rn);
                match mode {
                    AddressingMode::UnsignedOffset { imm12 } => {
                        let offset = u64::from(imm12) * width.transfer_size();
                        if offset == 0 {
                            write!(f, "{kind} {rt}, [{rn}]")
                        } else {
                            write!(f, "{kind} {rt}, [{rn}, #{offset}]")
                        }
                    }
                    AddressingMode::RegisterOffset { rm } => {
                        write!(f, "{kind} {rt}, [{rn}, {}]", reg_name(OperandWidth::Doubleword, rm))
                    }
                    AddressingMode::PreIndex { simm9 } => {
                        write!(f, "{kind} {rt}, [{rn}, #{simm9}]!")
                    }
                    AddressingMode::PostIndex { simm9 } => {
                        write!(f, "{kind} {rt}, [{rn}], #{simm9}")
                    }
                }
            }
            Self::LoadLiteral { width, simm19, rt } => {
                write!(f, "ldr {}, #{simm19}", reg_name(width, rt))
            }
            Self::Branch { simm26 } => write!(f, "b #{simm26}"),
            Self::BranchRegister { rn } => {
                write!(f, "br {}", reg_name(OperandWidth::Doubleword, rn))
            }
            Self::BranchConditional { simm19, cond } => write!(f, "b.{cond} #{simm19}"),
            Self::Unknown(word) => write!(f, "unknown 0x{word:08x}"),
        }
    }
}
