//! The two-pass driver.
//!
//! Pass 1 walks the source once, recording label definitions in the
//! symbol table and giving every statement its instruction address (the
//! line cursor advances 4 bytes per statement; labels and blank lines
//! do not advance it). Pass 2 encodes each statement, with every label
//! already known, and emits the words little-endian.

use tracing::debug;

use crate::encode::encode_statement;
use crate::error::AsmError;
use crate::lexer::{Statement, parse_line};
use crate::symbols::SymbolTable;

/// Assembles a whole source text into a binary image.
pub fn assemble(source: &str) -> Result<Vec<u8>, AsmError> {
    let (symbols, statements) = collect(source)?;
    debug!("pass 1 found {} statements", statements.len());

    let mut image = Vec::with_capacity(statements.len() * 4);
    for statement in &statements {
        let word = encode_statement(statement, &symbols)?;
        image.extend_from_slice(&word.to_le_bytes());
    }
    Ok(image)
}

/// Pass 1: the symbol table and the addressed statement list.
fn collect(source: &str) -> Result<(SymbolTable, Vec<Statement>), AsmError> {
    let mut symbols = SymbolTable::default();
    let mut statements = Vec::new();
    let mut address = 0_u32;

    for (index, text) in source.lines().enumerate() {
        let line = index + 1;
        let parsed = parse_line(text);
        for label in parsed.labels {
            if !symbols.define(label.clone(), address) {
                return Err(AsmError::DuplicateLabel { line, label });
            }
        }
        if let Some((mnemonic, operands)) = parsed.statement {
            statements.push(Statement {
                line,
                address,
                mnemonic,
                operands,
            });
            address += 4;
        }
    }
    Ok((symbols, statements))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn words(image: &[u8]) -> Vec<u32> {
        image
            .chunks_exact(4)
            .map(|chunk| u32::from_le_bytes(chunk.try_into().unwrap()))
            .collect()
    }

    #[test]
    fn int_directive_emits_little_endian() {
        let image = assemble(".int 0xDEADBEEF").unwrap();
        assert_eq!(image, vec![0xEF, 0xBE, 0xAD, 0xDE]);
    }

    #[test]
    fn labels_do_not_advance_the_address() {
        let image = assemble(
            "start:\n\
             \n\
             movz x0, #1\n\
             loop:\n\
             adds x0, x0, #1\n\
             b loop\n",
        )
        .unwrap();

        let words = words(&image);
        assert_eq!(words.len(), 3);
        // The branch sits at address 8 and loop at 4: one word behind.
        assert_eq!(words[2], (0b000101 << 26) | (0x3FF_FFFF & -1_i32 as u32));
    }

    #[test]
    fn forward_references_resolve() {
        let image = assemble("b end\nmovz x0, #1\nend: halt\n").unwrap();
        let words = words(&image);
        assert_eq!(words[0], 0x1400_0002);
        assert_eq!(words[2], 0x8A00_0000);
    }

    #[test]
    fn label_sharing_a_line_with_its_statement() {
        let image = assemble("movz x0, #1\nloop: adds x0, x0, #1\nb loop\n").unwrap();
        let words = words(&image);
        assert_eq!(words.len(), 3);
        assert_eq!(words[2], (0b000101 << 26) | (0x3FF_FFFF & -1_i32 as u32));
    }

    #[test]
    fn duplicate_label_is_an_error() {
        assert_eq!(
            assemble("loop:\nmovz x0, #1\nloop:\nhalt\n"),
            Err(AsmError::DuplicateLabel {
                line: 3,
                label: "loop".to_string(),
            })
        );
    }

    #[test]
    fn error_carries_the_source_line() {
        assert_eq!(
            assemble("movz x0, #1\n\nbogus x0\n"),
            Err(AsmError::UnknownMnemonic {
                line: 3,
                mnemonic: "bogus".to_string(),
            })
        );
    }

    #[test]
    fn scenario_sum_program() {
        // movz x0, #5 ; movz x1, #7 ; add x2, x0, x1 ; halt
        let image = assemble("movz x0, #5\nmovz x1, #7\nadd x2, x0, x1\nhalt\n").unwrap();
        assert_eq!(
            words(&image),
            vec![0xD280_00A0, 0xD280_00E1, 0x8B01_0002, 0x8A00_0000]
        );
    }
}
