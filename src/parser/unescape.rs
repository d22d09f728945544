//! Escape decoding for string and template literals

use std::iter::Peekable;
use std::str::CharIndices;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EscapeError {
    #[error("malformed escape sequence at offset {0}")]
    Malformed(usize),
}

/// Decode the raw body of a quoted string literal
pub fn decode_string(raw: &str) -> Result<String, EscapeError> {
    decode(raw, false)
}

/// Cook the raw text of a template literal segment
///
/// Line terminators are normalized to `\n` before escapes are decoded.
pub fn cook_template(raw: &str) -> Result<String, EscapeError> {
    let normalized = raw.replace("\r\n", "\n").replace('\r', "\n");
    decode(&normalized, true)
}

fn decode(raw: &str, template: bool) -> Result<String, EscapeError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        let malformed = EscapeError::Malformed(offset);
        let Some((_, escaped)) = chars.next() else {
            return Err(malformed);
        };

        match escaped {
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            // line continuation
            '\n' | '\u{2028}' | '\u{2029}' => {}
            '\r' => {
                if let Some((_, '\n')) = chars.peek() {
                    chars.next();
                }
            }
            'x' => {
                let code = read_hex(&mut chars, 2).ok_or(malformed.clone())?;
                out.push(char::from_u32(code).ok_or(malformed)?);
            }
            'u' => {
                let code = read_unicode_escape(&mut chars).ok_or(malformed.clone())?;
                out.push(char::from_u32(code).ok_or(malformed)?);
            }
            digit @ '0'..='7' => {
                let next_is_digit = matches!(chars.peek(), Some((_, '0'..='9')));
                if digit == '0' && !next_is_digit {
                    out.push('\0');
                } else if template {
                    return Err(malformed);
                } else {
                    out.push(read_legacy_octal(digit, &mut chars));
                }
            }
            '8' | '9' if template => return Err(malformed),
            other => out.push(other),
        }
    }

    Ok(out)
}

fn read_hex(chars: &mut Peekable<CharIndices<'_>>, len: usize) -> Option<u32> {
    let mut value = 0;
    for _ in 0..len {
        let (_, c) = chars.next()?;
        value = value * 16 + c.to_digit(16)?;
    }
    Some(value)
}

/// Read the part of a `\u` escape after the `u`, joining surrogate pairs
fn read_unicode_escape(chars: &mut Peekable<CharIndices<'_>>) -> Option<u32> {
    let code = read_code_unit(chars)?;
    if !(0xD800..=0xDBFF).contains(&code) {
        return Some(code);
    }

    let mut lookahead = chars.clone();
    if let (Some((_, '\\')), Some((_, 'u'))) = (lookahead.next(), lookahead.next()) {
        if let Some(low) = read_code_unit(&mut lookahead) {
            if (0xDC00..=0xDFFF).contains(&low) {
                *chars = lookahead;
                return Some(0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00));
            }
        }
    }
    Some(code)
}

fn read_code_unit(chars: &mut Peekable<CharIndices<'_>>) -> Option<u32> {
    if let Some((_, '{')) = chars.peek() {
        chars.next();
        let mut value: u32 = 0;
        let mut digits = 0;
        loop {
            let (_, c) = chars.next()?;
            if c == '}' {
                break;
            }
            value = value.checked_mul(16)?.checked_add(c.to_digit(16)?)?;
            digits += 1;
        }
        if digits == 0 || value > 0x10FFFF {
            return None;
        }
        Some(value)
    } else {
        read_hex(chars, 4)
    }
}

fn read_legacy_octal(first: char, chars: &mut Peekable<CharIndices<'_>>) -> char {
    let mut value = first as u32 - '0' as u32;
    let max_len = if first <= '3' { 3 } else { 2 };
    let mut len = 1;
    while len < max_len {
        match chars.peek() {
            Some(&(_, c @ '0'..='7')) => {
                value = value * 8 + (c as u32 - '0' as u32);
                chars.next();
                len += 1;
            }
            _ => break,
        }
    }
    char::from(value as u8)
}
