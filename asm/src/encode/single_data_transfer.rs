//! Encoders for `ldr` / `str` in all addressing modes, plus the
//! PC-relative literal form a label (or bare offset) target selects.

use crate::encode::{expect_operands, register_operand, resolve_word_offset};
use crate::error::AsmError;
use crate::lexer::Statement;
use crate::operand::{AddressOperand, parse_address};
use crate::symbols::SymbolTable;

pub(super) fn load_store(statement: &Statement, symbols: &SymbolTable) -> Result<u32, AsmError> {
    expect_operands(statement, 2, 3)?;
    let rt = register_operand(statement, 0)?;
    let load = u32::from(statement.mnemonic == "ldr");
    // Only the transfer register votes: the base is always an xN.
    let sf = u32::from(rt.is_doubleword());

    if statement.operands[1].starts_with('[') {
        let address = parse_address(&statement.operands[1..]).ok_or_else(|| {
            AsmError::BadOperand {
                line: statement.line,
                operand: statement.operands[1..].join(", "),
            }
        })?;
        return register_addressed(statement, address, sf, load, rt.index);
    }

    // A label or numeric target is a load literal; there is no literal
    // form for stores.
    if load == 0 {
        return Err(AsmError::BadOperand {
            line: statement.line,
            operand: statement.operands[1].clone(),
        });
    }
    let offset = resolve_word_offset(&statement.operands[1], statement, symbols)?;
    if !(-(1 << 18)..1 << 18).contains(&offset) {
        return Err(AsmError::ImmediateRange {
            line: statement.line,
            value: offset,
            field: "simm19",
        });
    }
    Ok((sf << 30) | (0b011000 << 24) | (((offset as u32) & 0x7FFFF) << 5) | rt.index)
}

fn register_addressed(
    statement: &Statement,
    address: AddressOperand,
    sf: u32,
    load: u32,
    rt: u32,
) -> Result<u32, AsmError> {
    let common = (1 << 31) | (sf << 30) | (0b11100 << 25) | (load << 22);
    match address {
        AddressOperand::Offset { base, imm } => {
            let scale = if sf == 1 { 8 } else { 4 };
            let scaled = imm / scale;
            if imm % scale != 0 || !(0..=0xFFF).contains(&scaled) {
                return Err(AsmError::ImmediateRange {
                    line: statement.line,
                    value: imm,
                    field: "a scaled unsigned offset",
                });
            }
            Ok(common | (1 << 24) | ((scaled as u32) << 10) | (base << 5) | rt)
        }
        AddressOperand::PreIndex { base, simm } => {
            Ok(common | simm9(statement, simm)? | (1 << 11) | (1 << 10) | (base << 5) | rt)
        }
        AddressOperand::PostIndex { base, simm } => {
            Ok(common | simm9(statement, simm)? | (1 << 10) | (base << 5) | rt)
        }
        AddressOperand::RegisterOffset { base, rm } => {
            Ok(common | (1 << 21) | (rm << 16) | (0b011010 << 10) | (base << 5) | rt)
        }
    }
}

fn simm9(statement: &Statement, simm: i64) -> Result<u32, AsmError> {
    if !(-256..=255).contains(&simm) {
        return Err(AsmError::ImmediateRange {
            line: statement.line,
            value: simm,
            field: "simm9",
        });
    }
    Ok(((simm as u32) & 0x1FF) << 12)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn statement(mnemonic: &str, operands: &[&str]) -> Statement {
        Statement {
            line: 3,
            address: 8,
            mnemonic: mnemonic.to_string(),
            operands: operands.iter().map(ToString::to_string).collect(),
        }
    }

    fn encode(mnemonic: &str, operands: &[&str]) -> Result<u32, AsmError> {
        load_store(&statement(mnemonic, operands), &SymbolTable::default())
    }

    #[test]
    fn unsigned_offset_words() {
        // Cross-checked against a reference AArch64 assembler.
        assert_eq!(encode("ldr", &["x2", "[x0]"]), Ok(0xF940_0002));
        assert_eq!(encode("ldr", &["x2", "[x0, #16]"]), Ok(0xF940_0802));
        assert_eq!(encode("str", &["x1", "[x0]"]), Ok(0xF900_0001));
        assert_eq!(encode("ldr", &["w3", "[x1, #8]"]), Ok(0xB940_0823));
    }

    #[test]
    fn unsigned_offset_must_scale() {
        assert!(matches!(
            encode("ldr", &["x2", "[x0, #12]"]),
            Err(AsmError::ImmediateRange { .. })
        ));
        assert_eq!(encode("ldr", &["w2", "[x0, #12]"]), Ok(0xB940_0C02));
    }

    #[test]
    fn indexed_words() {
        assert_eq!(encode("ldr", &["x1", "[x2, #-8]!"]), Ok(0xF85F_8C41));
        assert_eq!(encode("ldr", &["x1", "[x2]", "#16"]), Ok(0xF841_0441));
        assert_eq!(encode("str", &["x1", "[x2]", "#-16"]), Ok(0xF81F_0441));
    }

    #[test]
    fn register_offset_word() {
        assert_eq!(encode("ldr", &["x1", "[x2, x3]"]), Ok(0xF863_6841));
    }

    #[test]
    fn simm9_range() {
        assert!(matches!(
            encode("ldr", &["x1", "[x2, #256]!"]),
            Err(AsmError::ImmediateRange { .. })
        ));
        assert!(matches!(
            encode("ldr", &["x1", "[x2]", "#-257"]),
            Err(AsmError::ImmediateRange { .. })
        ));
    }

    #[test]
    fn literal_load_from_label() {
        let mut symbols = SymbolTable::default();
        symbols.define("value".to_string(), 0x10);
        // The statement sits at address 8, so the label is 2 words ahead.
        let word = load_store(&statement("ldr", &["x5", "value"]), &symbols).unwrap();
        assert_eq!(word, (1 << 30) | (0b011000 << 24) | (2 << 5) | 5);
    }

    #[test]
    fn literal_load_from_numeric_offset() {
        assert_eq!(encode("ldr", &["x5", "#0"]), Ok(0x5800_0005));
    }

    #[test]
    fn undefined_label() {
        assert_eq!(
            encode("ldr", &["x5", "nowhere"]),
            Err(AsmError::UndefinedLabel {
                line: 3,
                label: "nowhere".to_string(),
            })
        );
    }

    #[test]
    fn stores_have_no_literal_form() {
        assert!(matches!(
            encode("str", &["x5", "#0"]),
            Err(AsmError::BadOperand { .. })
        ));
    }
}
