//! Operand grammar: registers, immediates, shift suffixes and the
//! bracketed addressing modes.

/// Register width named by an operand prefix: `wN` = 32-bit, `xN` = 64-bit.
///
/// The width of an instruction is the width of its widest named
/// register operand.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OperandWidth {
    Word,
    Doubleword,
}

/// A parsed register operand.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Register {
    pub index: u32,
    /// `None` for `xzr`/`wzr`: the zero register abstains from the
    /// width vote, which keeps alias rewrites width-neutral.
    pub width: Option<OperandWidth>,
}

impl Register {
    #[must_use]
    pub fn is_doubleword(self) -> bool {
        self.width == Some(OperandWidth::Doubleword)
    }
}

/// `xN` / `wN` with N in 0..=30, or `xzr` / `wzr` for index 31.
#[must_use]
pub fn parse_register(text: &str) -> Option<Register> {
    if text == "xzr" || text == "wzr" {
        return Some(Register {
            index: 31,
            width: None,
        });
    }
    let (width, digits) = if let Some(rest) = text.strip_prefix('x') {
        (OperandWidth::Doubleword, rest)
    } else if let Some(rest) = text.strip_prefix('w') {
        (OperandWidth::Word, rest)
    } else {
        return None;
    };
    let index: u32 = digits.parse().ok()?;
    (index <= 30).then_some(Register {
        index,
        width: Some(width),
    })
}

/// `#N`, `N`, `#0xN`, with an optional leading minus in either radix.
/// The `#` is optional so directive values and shift amounts share the
/// same grammar.
#[must_use]
pub fn parse_immediate(text: &str) -> Option<i64> {
    let text = text.strip_prefix('#').unwrap_or(text);
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let magnitude = if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).ok()?
    } else {
        digits.parse::<i64>().ok()?
    };
    Some(if negative { -magnitude } else { magnitude })
}

/// A shift operator in a suffix operand.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ShiftKind {
    Lsl,
    Lsr,
    Asr,
    Ror,
}

impl ShiftKind {
    /// The two-bit field value of this operator.
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Self::Lsl => 0,
            Self::Lsr => 1,
            Self::Asr => 2,
            Self::Ror => 3,
        }
    }
}

/// A suffix operand such as `lsl #12` or `ror #3`.
#[must_use]
pub fn parse_shift(text: &str) -> Option<(ShiftKind, i64)> {
    let mut parts = text.split_whitespace();
    let kind = match parts.next()? {
        "lsl" => ShiftKind::Lsl,
        "lsr" => ShiftKind::Lsr,
        "asr" => ShiftKind::Asr,
        "ror" => ShiftKind::Ror,
        _ => return None,
    };
    let amount = parse_immediate(parts.next()?)?;
    parts.next().is_none().then_some((kind, amount))
}

/// An address operand in one of the four load/store forms.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AddressOperand {
    /// `[Xn]` or `[Xn, #imm]`: base plus unsigned scaled offset.
    Offset { base: u32, imm: i64 },
    /// `[Xn, #imm]!`: write-back before the transfer.
    PreIndex { base: u32, simm: i64 },
    /// `[Xn], #imm`: write-back after the transfer.
    PostIndex { base: u32, simm: i64 },
    /// `[Xn, Xm]`.
    RegisterOffset { base: u32, rm: u32 },
}

/// Parses the one or two operands that follow `Rt` in a load or store.
/// The bracket-and-optional-`!` shape selects the addressing mode.
#[must_use]
pub fn parse_address(operands: &[String]) -> Option<AddressOperand> {
    let first = operands.first()?;

    if let Some(inner) = first.strip_prefix('[').and_then(|rest| rest.strip_suffix("]!")) {
        if operands.len() != 1 {
            return None;
        }
        let (base, simm) = base_and_offset(inner)?;
        return Some(AddressOperand::PreIndex { base, simm });
    }

    let inner = first.strip_prefix('[')?.strip_suffix(']')?;
    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    match (parts.as_slice(), operands.len()) {
        ([base], 1) => Some(AddressOperand::Offset {
            base: parse_register(base)?.index,
            imm: 0,
        }),
        ([base], 2) => Some(AddressOperand::PostIndex {
            base: parse_register(base)?.index,
            simm: parse_immediate(&operands[1])?,
        }),
        ([base, second], 1) => {
            let base = parse_register(base)?.index;
            if let Some(register) = parse_register(second) {
                Some(AddressOperand::RegisterOffset {
                    base,
                    rm: register.index,
                })
            } else {
                Some(AddressOperand::Offset {
                    base,
                    imm: parse_immediate(second)?,
                })
            }
        }
        _ => None,
    }
}

fn base_and_offset(inner: &str) -> Option<(u32, i64)> {
    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    match parts.as_slice() {
        [base] => Some((parse_register(base)?.index, 0)),
        [base, imm] => Some((parse_register(base)?.index, parse_immediate(imm)?)),
        _ => None,
    }
}
