//! Hex frame encoding.

use crate::error::InputError;

/// Drop a trailing `#` comment.
pub fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

/// Decode one line of hex text into frame bytes.
///
/// Whitespace between digits is ignored, so `"05 00 00 00 01"` and
/// `"0500000001"` decode alike. Comments must already be stripped.
/// `line` is the 1-based line number used in errors.
pub fn decode_hex_line(text: &str, line: usize) -> Result<Vec<u8>, InputError> {
    let mut bytes = Vec::with_capacity(text.len() / 2);
    let mut high: Option<u8> = None;
    let mut digits = 0;

    for (index, c) in text.char_indices() {
        if c.is_whitespace() {
            continue;
        }
        let value = hex_digit(c).ok_or(InputError::InvalidHexDigit {
            line,
            column: index + 1,
            found: c,
        })?;
        digits += 1;
        match high.take() {
            Some(h) => bytes.push((h << 4) | value),
            None => high = Some(value),
        }
    }

    if high.is_some() {
        return Err(InputError::OddLength { line, digits });
    }
    Ok(bytes)
}

/// Encode bytes as lowercase hex, without separators.
pub fn encode_hex(data: &[u8]) -> String {
    const DIGITS: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(data.len() * 2);
    for &b in data {
        out.push(char::from(DIGITS[usize::from(b >> 4)]));
        out.push(char::from(DIGITS[usize::from(b & 0x0f)]));
    }
    out
}

/// Convert a hex character to its value.
fn hex_digit(c: char) -> Option<u8> {
    c.to_digit(16).map(|d| d as u8)
}
