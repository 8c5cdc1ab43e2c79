//! Pass 2: turning one statement into one 32-bit instruction word.
//!
//! The mnemonic picks a family encoder; alias mnemonics are rewritten
//! to their canonical form first, as a plain pre-normalisation step, so
//! every family encoder only ever sees canonical spellings.

use tracing::debug;

use crate::error::AsmError;
use crate::lexer::Statement;
use crate::operand::parse_immediate;
use crate::symbols::SymbolTable;

pub mod branch;
pub mod data_processing;
pub mod single_data_transfer;

pub fn encode_statement(statement: &Statement, symbols: &SymbolTable) -> Result<u32, AsmError> {
    let statement = normalize_aliases(statement);
    let word = match statement.mnemonic.as_str() {
        "add" | "adds" | "sub" | "subs" => data_processing::arithmetic(&statement)?,
        "and" | "bic" | "orr" | "orn" | "eor" | "eon" | "ands" | "bics" => {
            data_processing::logical(&statement)?
        }
        "movn" | "movz" | "movk" => data_processing::wide_move(&statement)?,
        "madd" | "msub" => data_processing::multiply(&statement)?,
        "ldr" | "str" => single_data_transfer::load_store(&statement, symbols)?,
        "b" => branch::unconditional(&statement, symbols)?,
        "br" => branch::register(&statement)?,
        ".int" => int_directive(&statement)?,
        mnemonic if mnemonic.starts_with("b.") => branch::conditional(&statement, symbols)?,
        mnemonic => {
            return Err(AsmError::UnknownMnemonic {
                line: statement.line,
                mnemonic: mnemonic.to_string(),
            });
        }
    };
    debug!(
        "0x{:08x}: {} {} -> 0x{word:08x}",
        statement.address,
        statement.mnemonic,
        statement.operands.join(", ")
    );
    Ok(word)
}

/// Rewrites alias mnemonics to canonical ones. The inserted zero
/// register abstains from the width vote, so the rewritten instruction
/// inherits its width from the operands the programmer named.
///
/// `halt` rewrites to `and x0, x0, x0`, whose natural encoding is the
/// reserved word `0x8A000000`.
fn normalize_aliases(statement: &Statement) -> Statement {
    let mut statement = statement.clone();
    let zr = || "xzr".to_string();
    match statement.mnemonic.as_str() {
        // cmp a, b  ->  subs zr, a, b
        "cmp" => {
            statement.mnemonic = "subs".to_string();
            statement.operands.insert(0, zr());
        }
        // cmn a, b  ->  adds zr, a, b
        "cmn" => {
            statement.mnemonic = "adds".to_string();
            statement.operands.insert(0, zr());
        }
        // tst a, b  ->  ands zr, a, b
        "tst" => {
            statement.mnemonic = "ands".to_string();
            statement.operands.insert(0, zr());
        }
        // neg a, b  ->  sub a, zr, b
        "neg" => {
            statement.mnemonic = "sub".to_string();
            statement.operands.insert(1, zr());
        }
        // negs a, b  ->  subs a, zr, b
        "negs" => {
            statement.mnemonic = "subs".to_string();
            statement.operands.insert(1, zr());
        }
        // mov rd, rm  ->  orr rd, zr, rm
        "mov" => {
            statement.mnemonic = "orr".to_string();
            statement.operands.insert(1, zr());
        }
        // mvn rd, rm  ->  orn rd, zr, rm
        "mvn" => {
            statement.mnemonic = "orn".to_string();
            statement.operands.insert(1, zr());
        }
        // mul rd, rn, rm  ->  madd rd, rn, rm, zr
        "mul" => {
            statement.mnemonic = "madd".to_string();
            statement.operands.push(zr());
        }
        // mneg rd, rn, rm  ->  msub rd, rn, rm, zr
        "mneg" => {
            statement.mnemonic = "msub".to_string();
            statement.operands.push(zr());
        }
        "halt" => {
            statement.mnemonic = "and".to_string();
            statement.operands = vec!["x0".to_string(); 3];
        }
        _ => {}
    }
    statement
}

fn int_directive(statement: &Statement) -> Result<u32, AsmError> {
    expect_operands(statement, 1, 1)?;
    let operand = &statement.operands[0];
    let value = parse_immediate(operand).ok_or_else(|| AsmError::BadOperand {
        line: statement.line,
        operand: operand.clone(),
    })?;
    if value < i64::from(i32::MIN) || value > i64::from(u32::MAX) {
        return Err(AsmError::ImmediateRange {
            line: statement.line,
            value,
            field: "a 32-bit word",
        });
    }
    Ok(value as u32)
}

/// A branch target or load-literal position: a label resolved through
/// the symbol table, or a numeric operand used directly. Either way the
/// result is a signed offset in instruction words from this statement.
pub(crate) fn resolve_word_offset(
    operand: &str,
    statement: &Statement,
    symbols: &SymbolTable,
) -> Result<i64, AsmError> {
    let named_label = !operand.starts_with('#')
        && !operand.starts_with('-')
        && !operand.starts_with(|c: char| c.is_ascii_digit());
    if named_label {
        let target = symbols.lookup(operand).ok_or_else(|| AsmError::UndefinedLabel {
            line: statement.line,
            label: operand.to_string(),
        })?;
        Ok((i64::from(target) - i64::from(statement.address)) / 4)
    } else {
        parse_immediate(operand).ok_or_else(|| AsmError::BadOperand {
            line: statement.line,
            operand: operand.to_string(),
        })
    }
}

pub(crate) fn expect_operands(
    statement: &Statement,
    minimum: usize,
    maximum: usize,
) -> Result<(), AsmError> {
    let found = statement.operands.len();
    if (minimum..=maximum).contains(&found) {
        Ok(())
    } else {
        Err(AsmError::OperandCount {
            line: statement.line,
            expected: minimum,
            found,
        })
    }
}

pub(crate) fn register_operand(
    statement: &Statement,
    index: usize,
) -> Result<crate::operand::Register, AsmError> {
    let operand = &statement.operands[index];
    crate::operand::parse_register(operand).ok_or_else(|| AsmError::BadOperand {
        line: statement.line,
        operand: operand.clone(),
    })
}
