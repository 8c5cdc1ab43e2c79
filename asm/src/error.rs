use thiserror::Error;

/// Everything that can make a source line unassemblable. Each variant
/// carries the 1-based source line it was found on; the driver stops at
/// the first error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AsmError {
    #[error("line {line}: unknown mnemonic `{mnemonic}`")]
    UnknownMnemonic { line: usize, mnemonic: String },

    #[error("line {line}: expected {expected} operands, found {found}")]
    OperandCount {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: bad operand `{operand}`")]
    BadOperand { line: usize, operand: String },

    #[error("line {line}: unknown shift `{shift}`")]
    UnknownShift { line: usize, shift: String },

    #[error("line {line}: {value} does not fit {field}")]
    ImmediateRange {
        line: usize,
        value: i64,
        field: &'static str,
    },

    #[error("line {line}: undefined label `{label}`")]
    UndefinedLabel { line: usize, label: String },

    #[error("line {line}: duplicate label `{label}`")]
    DuplicateLabel { line: usize, label: String },
}
