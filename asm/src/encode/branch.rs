//! Encoders for the branch family: `b`, `br` and `b.<cond>`.

use crate::encode::{expect_operands, register_operand, resolve_word_offset};
use crate::error::AsmError;
use crate::lexer::Statement;
use crate::symbols::SymbolTable;

/// `b <target>`.
pub(super) fn unconditional(statement: &Statement, symbols: &SymbolTable) -> Result<u32, AsmError> {
    expect_operands(statement, 1, 1)?;
    let offset = resolve_word_offset(&statement.operands[0], statement, symbols)?;
    if !((-(1 << 25))..(1 << 25)).contains(&offset) {
        return Err(AsmError::ImmediateRange {
            line: statement.line,
            value: offset,
            field: "simm26",
        });
    }
    Ok((0b000101 << 26) | ((offset as u32) & 0x3FF_FFFF))
}

/// `br Xn`.
pub(super) fn register(statement: &Statement) -> Result<u32, AsmError> {
    expect_operands(statement, 1, 1)?;
    let rn = register_operand(statement, 0)?;
    Ok((0b1101011000011111000000 << 10) | (rn.index << 5))
}

/// `b.<cond> <target>`.
pub(super) fn conditional(statement: &Statement, symbols: &SymbolTable) -> Result<u32, AsmError> {
    expect_operands(statement, 1, 1)?;
    let suffix = &statement.mnemonic["b.".len()..];
    let code = condition_code(suffix).ok_or_else(|| AsmError::UnknownMnemonic {
        line: statement.line,
        mnemonic: statement.mnemonic.clone(),
    })?;
    let offset = resolve_word_offset(&statement.operands[0], statement, symbols)?;
    if !((-(1 << 18))..(1 << 18)).contains(&offset) {
        return Err(AsmError::ImmediateRange {
            line: statement.line,
            value: offset,
            field: "simm19",
        });
    }
    Ok((0b01010100 << 24) | (((offset as u32) & 0x7FFFF) << 5) | code)
}

fn condition_code(suffix: &str) -> Option<u32> {
    let code = match suffix {
        "eq" => 0x0,
        "ne" => 0x1,
        "cs" | "hs" => 0x2,
        "cc" | "lo" => 0x3,
        "mi" => 0x4,
        "pl" => 0x5,
        "vs" => 0x6,
        "vc" => 0x7,
        "hi" => 0x8,
        "ls" => 0x9,
        "ge" => 0xA,
        "lt" => 0xB,
        "gt" => 0xC,
        "le" => 0xD,
        "al" => 0xE,
        _ => return None,
    };
    Some(code)
}
