//! Source-line splitting.
//!
//! A line is zero or more `label:` definitions followed by an optional
//! statement (mnemonic plus operands). Operands are comma-separated,
//! but commas inside an address operand (`[x0, #8]`) do not split, so
//! splitting runs at bracket depth 0 only. A shift suffix such as
//! `lsl #2` arrives as one operand with its interior space intact.

/// A statement placed at its instruction address, ready for encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// 1-based source line, for error reporting.
    pub line: usize,
    /// Byte offset of the encoded word from the start of the image.
    pub address: u32,
    pub mnemonic: String,
    pub operands: Vec<String>,
}

/// What one source line contained.
#[derive(Debug, PartialEq, Eq)]
pub struct ParsedLine {
    pub labels: Vec<String>,
    pub statement: Option<(String, Vec<String>)>,
}

#[must_use]
pub fn parse_line(text: &str) -> ParsedLine {
    let mut rest = text.trim();
    let mut labels = Vec::new();

    while let Some(token) = rest.split_whitespace().next() {
        let Some(label) = token.strip_suffix(':') else {
            break;
        };
        labels.push(label.to_string());
        rest = rest[token.len()..].trim_start();
    }

    let statement = rest.split_whitespace().next().map(|mnemonic| {
        let operands = split_operands(rest[mnemonic.len()..].trim_start());
        (mnemonic.to_string(), operands)
    });

    ParsedLine { labels, statement }
}

/// Splits on commas outside square brackets.
fn split_operands(text: &str) -> Vec<String> {
    let mut operands = Vec::new();
    let mut depth = 0_usize;
    let mut current = String::new();

    for character in text.chars() {
        match character {
            '[' => {
                depth += 1;
                current.push(character);
            }
            ']' => {
                depth = depth.saturating_sub(1);
                current.push(character);
            }
            ',' if depth == 0 => {
                operands.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(character),
        }
    }
    if !current.trim().is_empty() {
        operands.push(current.trim().to_string());
    }
    operands
}
