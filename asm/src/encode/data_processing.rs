//! Encoders for the data-processing families: arithmetic (immediate and
//! shifted-register), logical, wide move and multiply.

use crate::encode::{expect_operands, register_operand};
use crate::error::AsmError;
use crate::lexer::Statement;
use crate::operand::{Register, ShiftKind, parse_immediate, parse_shift};

fn sf(registers: &[Register]) -> u32 {
    u32::from(registers.iter().any(|register| register.is_doubleword()))
}

fn shift_suffix(statement: &Statement, index: usize) -> Result<Option<(ShiftKind, i64)>, AsmError> {
    let Some(operand) = statement.operands.get(index) else {
        return Ok(None);
    };
    parse_shift(operand)
        .map(Some)
        .ok_or_else(|| AsmError::UnknownShift {
            line: statement.line,
            shift: operand.clone(),
        })
}

/// `add` / `adds` / `sub` / `subs`, both operand forms.
pub(super) fn arithmetic(statement: &Statement) -> Result<u32, AsmError> {
    expect_operands(statement, 3, 4)?;
    let rd = register_operand(statement, 0)?;
    let rn = register_operand(statement, 1)?;
    let opc = match statement.mnemonic.as_str() {
        "add" => 0,
        "adds" => 1,
        "sub" => 2,
        "subs" => 3,
        _ => unreachable!(),
    };

    let operand = &statement.operands[2];
    if operand.starts_with('#') {
        let value = parse_immediate(operand).ok_or_else(|| AsmError::BadOperand {
            line: statement.line,
            operand: operand.clone(),
        })?;
        if !(0..=0xFFF).contains(&value) {
            return Err(AsmError::ImmediateRange {
                line: statement.line,
                value,
                field: "imm12",
            });
        }
        let sh = match shift_suffix(statement, 3)? {
            None | Some((ShiftKind::Lsl, 0)) => 0,
            Some((ShiftKind::Lsl, 12)) => 1,
            Some((ShiftKind::Lsl, amount)) => {
                return Err(AsmError::ImmediateRange {
                    line: statement.line,
                    value: amount,
                    field: "an arithmetic immediate shift (0 or 12)",
                });
            }
            Some(_) => {
                return Err(AsmError::UnknownShift {
                    line: statement.line,
                    shift: statement.operands[3].clone(),
                });
            }
        };
        let sf = sf(&[rd, rn]);
        Ok((sf << 31)
            | (opc << 29)
            | (0b100 << 26)
            | (0b010 << 23)
            | (sh << 22)
            | ((value as u32) << 10)
            | (rn.index << 5)
            | rd.index)
    } else {
        let rm = register_operand(statement, 2)?;
        let sf = sf(&[rd, rn, rm]);
        let (shift, amount) = shifted_register(statement, sf, /* allow_ror */ false)?;
        Ok((sf << 31)
            | (opc << 29)
            | (0b0101 << 25)
            | (1 << 24)
            | (shift << 22)
            | (rm.index << 16)
            | (amount << 10)
            | (rn.index << 5)
            | rd.index)
    }
}

/// `and` / `bic` / `orr` / `orn` / `eor` / `eon` / `ands` / `bics`.
/// This family only takes a register second operand.
pub(super) fn logical(statement: &Statement) -> Result<u32, AsmError> {
    expect_operands(statement, 3, 4)?;
    let rd = register_operand(statement, 0)?;
    let rn = register_operand(statement, 1)?;
    let rm = register_operand(statement, 2)?;
    let (opc, negated) = match statement.mnemonic.as_str() {
        "and" => (0, 0),
        "bic" => (0, 1),
        "orr" => (1, 0),
        "orn" => (1, 1),
        "eor" => (2, 0),
        "eon" => (2, 1),
        "ands" => (3, 0),
        "bics" => (3, 1),
        _ => unreachable!(),
    };
    let sf = sf(&[rd, rn, rm]);
    let (shift, amount) = shifted_register(statement, sf, /* allow_ror */ true)?;
    Ok((sf << 31)
        | (opc << 29)
        | (0b0101 << 25)
        | (shift << 22)
        | (negated << 21)
        | (rm.index << 16)
        | (amount << 10)
        | (rn.index << 5)
        | rd.index)
}

fn shifted_register(
    statement: &Statement,
    sf: u32,
    allow_ror: bool,
) -> Result<(u32, u32), AsmError> {
    match shift_suffix(statement, 3)? {
        None => Ok((0, 0)),
        Some((kind, amount)) => {
            if kind == ShiftKind::Ror && !allow_ror {
                return Err(AsmError::UnknownShift {
                    line: statement.line,
                    shift: statement.operands[3].clone(),
                });
            }
            let width_bits = if sf == 1 { 64 } else { 32 };
            if !(0..width_bits).contains(&amount) {
                return Err(AsmError::ImmediateRange {
                    line: statement.line,
                    value: amount,
                    field: "a register shift amount",
                });
            }
            Ok((kind.code(), amount as u32))
        }
    }
}

/// `movn` / `movz` / `movk`.
pub(super) fn wide_move(statement: &Statement) -> Result<u32, AsmError> {
    expect_operands(statement, 2, 3)?;
    let rd = register_operand(statement, 0)?;
    let opc: u32 = match statement.mnemonic.as_str() {
        "movn" => 0b00,
        "movz" => 0b10,
        "movk" => 0b11,
        _ => unreachable!(),
    };

    let operand = &statement.operands[1];
    let value = parse_immediate(operand).ok_or_else(|| AsmError::BadOperand {
        line: statement.line,
        operand: operand.clone(),
    })?;
    if !(0..=0xFFFF).contains(&value) {
        return Err(AsmError::ImmediateRange {
            line: statement.line,
            value,
            field: "imm16",
        });
    }

    let sf = sf(&[rd]);
    let hw = match shift_suffix(statement, 2)? {
        None => 0,
        Some((ShiftKind::Lsl, amount)) => {
            let positions = if sf == 1 { 4 } else { 2 };
            if amount % 16 != 0 || !(0..16 * positions).contains(&amount) {
                return Err(AsmError::ImmediateRange {
                    line: statement.line,
                    value: amount,
                    field: "a wide-move shift (a multiple of 16 inside the width)",
                });
            }
            (amount / 16) as u32
        }
        Some(_) => {
            return Err(AsmError::UnknownShift {
                line: statement.line,
                shift: statement.operands[2].clone(),
            });
        }
    };

    Ok((sf << 31)
        | (opc << 29)
        | (0b100 << 26)
        | (0b101 << 23)
        | (hw << 21)
        | ((value as u32) << 5)
        | rd.index)
}

/// `madd` / `msub`.
pub(super) fn multiply(statement: &Statement) -> Result<u32, AsmError> {
    expect_operands(statement, 4, 4)?;
    let rd = register_operand(statement, 0)?;
    let rn = register_operand(statement, 1)?;
    let rm = register_operand(statement, 2)?;
    let ra = register_operand(statement, 3)?;
    let x = u32::from(statement.mnemonic == "msub");
    let sf = sf(&[rd, rn, rm, ra]);
    Ok((sf << 31)
        | (0b0011011000 << 21)
        | (rm.index << 16)
        | (x << 15)
        | (ra.index << 10)
        | (rn.index << 5)
        | rd.index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn statement(mnemonic: &str, operands: &[&str]) -> Statement {
        Statement {
            line: 7,
            address: 0,
            mnemonic: mnemonic.to_string(),
            operands: operands.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn arithmetic_immediate_words() {
        // Cross-checked against a reference AArch64 assembler.
        assert_eq!(
            arithmetic(&statement("add", &["x2", "x1", "#10"])),
            Ok(0x9100_2822)
        );
        assert_eq!(
            arithmetic(&statement("subs", &["x1", "x0", "#10"])),
            Ok(0xF100_2801)
        );
        assert_eq!(
            arithmetic(&statement("add", &["w0", "w1", "#1", "lsl #12"])),
            Ok(0x1140_0420)
        );
    }

    #[test]
    fn arithmetic_register_words() {
        assert_eq!(
            arithmetic(&statement("add", &["x2", "x0", "x1"])),
            Ok(0x8B01_0002)
        );
        assert_eq!(
            arithmetic(&statement("add", &["x2", "x0", "x1", "lsr #3"])),
            Ok(0x8B41_0C02)
        );
        assert_eq!(
            arithmetic(&statement("sub", &["w2", "w0", "w1"])),
            Ok(0x4B01_0002)
        );
    }

    #[test]
    fn arithmetic_immediate_out_of_range() {
        assert!(matches!(
            arithmetic(&statement("add", &["x0", "x0", "#4096"])),
            Err(AsmError::ImmediateRange { line: 7, .. })
        ));
        assert!(matches!(
            arithmetic(&statement("add", &["x0", "x0", "#-1"])),
            Err(AsmError::ImmediateRange { .. })
        ));
    }

    #[test]
    fn arithmetic_rejects_ror() {
        assert!(matches!(
            arithmetic(&statement("add", &["x0", "x0", "x1", "ror #2"])),
            Err(AsmError::UnknownShift { .. })
        ));
    }

    #[test]
    fn logical_words() {
        assert_eq!(logical(&statement("and", &["x0", "x0", "x0"])), Ok(0x8A00_0000));
        assert_eq!(logical(&statement("orr", &["x0", "x1", "x2"])), Ok(0xAA02_0020));
        assert_eq!(
            logical(&statement("bic", &["x3", "x4", "x5", "ror #7"])),
            Ok(0x8AE5_1C83)
        );
        assert_eq!(logical(&statement("ands", &["w1", "w2", "w3"])), Ok(0x6A03_0041));
    }

    #[test]
    fn wide_move_words() {
        assert_eq!(wide_move(&statement("movz", &["x0", "#5"])), Ok(0xD280_00A0));
        assert_eq!(
            wide_move(&statement("movk", &["x0", "#0x1234", "lsl #16"])),
            Ok(0xF2A2_4680)
        );
        assert_eq!(wide_move(&statement("movn", &["w1", "#0"])), Ok(0x1280_0001));
    }

    #[test]
    fn wide_move_shift_limits() {
        assert!(matches!(
            wide_move(&statement("movz", &["x0", "#1", "lsl #8"])),
            Err(AsmError::ImmediateRange { .. })
        ));
        // lsl #32 exists only in 64-bit mode.
        assert!(matches!(
            wide_move(&statement("movz", &["w0", "#1", "lsl #32"])),
            Err(AsmError::ImmediateRange { .. })
        ));
        assert_eq!(
            wide_move(&statement("movz", &["x0", "#1", "lsl #32"])),
            Ok(0xD2C0_0020)
        );
    }

    #[test]
    fn multiply_words() {
        assert_eq!(
            multiply(&statement("madd", &["x2", "x0", "x1", "x3"])),
            Ok(0x9B01_0C02)
        );
        assert_eq!(
            multiply(&statement("msub", &["w2", "w0", "w1", "w3"])),
            Ok(0x1B01_8C02)
        );
    }
}
