//! Literal text to runtime value conversion
//!
//! The tokenizer validates the *shape* of number and string literals; this
//! module turns their text into [`Value`]s when constant nodes are built.
//! Underscore separators are stripped before conversion, matching the
//! tokenizer's guarantee that they only appear between digits.

use crate::runtime::{ParseError, Value};

/// Convert a validated number token's text into a value.
///
/// `0x`/`0o`/`0b` select the radix; a `j`/`J` suffix makes an imaginary
/// constant; a fraction or exponent makes a float. Integers that do not fit
/// an `i64` fall back to the nearest float.
pub(crate) fn parse_number(text: &str) -> Result<Value, ParseError> {
    let cleaned: String = text.chars().filter(|&c| c != '_').collect();
    let s = cleaned.as_str();
    if s.is_empty() {
        return Err(ParseError::value(format!("invalid number literal '{}'", text)));
    }

    if let Some(body) = s.strip_suffix(['j', 'J']) {
        let imag = parse_float_text(body, text)?;
        return Ok(Value::Complex { real: 0.0, imag });
    }

    if let Some(digits) = strip_prefix_ci(s, "0x") {
        return Ok(int_from_radix(digits, 16));
    }
    if let Some(digits) = strip_prefix_ci(s, "0o") {
        return Ok(int_from_radix(digits, 8));
    }
    if let Some(digits) = strip_prefix_ci(s, "0b") {
        return Ok(int_from_radix(digits, 2));
    }

    if s.contains(['.', 'e', 'E']) {
        return Ok(Value::Float(parse_float_text(s, text)?));
    }

    match s.parse::<i64>() {
        Ok(n) => Ok(Value::Int(n)),
        // Out of range for i64: approximate, like a float literal.
        Err(_) => Ok(Value::Float(parse_float_text(s, text)?)),
    }
}

fn strip_prefix_ci<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    if s.len() >= 2 && s[..2].eq_ignore_ascii_case(prefix) {
        Some(&s[2..])
    } else {
        None
    }
}

fn parse_float_text(body: &str, original: &str) -> Result<f64, ParseError> {
    body.parse::<f64>()
        .map_err(|_| ParseError::value(format!("invalid number literal '{}'", original)))
}

fn int_from_radix(digits: &str, radix: u32) -> Value {
    match i64::from_str_radix(digits, radix) {
        Ok(n) => Value::Int(n),
        Err(_) => {
            let approx = digits.chars().fold(0f64, |acc, d| {
                acc * radix as f64 + d.to_digit(radix).unwrap_or(0) as f64
            });
            Value::Float(approx)
        }
    }
}

struct StringPiece {
    is_bytes: bool,
    is_unicode: bool,
    text: String,
}

/// Concatenate adjacent string literal tokens into one constant.
///
/// Returns the value and the constant-kind tag (`"u"` when the first piece
/// carried an explicit unicode prefix). Mixing bytes and non-bytes pieces is
/// a syntax error, reported against `line`.
pub(crate) fn concat_strings(
    texts: &[String],
    line: usize,
) -> Result<(Value, Option<String>), ParseError> {
    debug_assert!(!texts.is_empty());
    let mut pieces = Vec::with_capacity(texts.len());
    for t in texts {
        pieces.push(parse_string_literal(t, line)?);
    }
    let bytes_mode = pieces.first().map(|p| p.is_bytes).unwrap_or(false);
    if pieces.iter().any(|p| p.is_bytes != bytes_mode) {
        return Err(ParseError::syntax(
            "cannot mix bytes and nonbytes literals",
            line,
        ));
    }
    let kind = if pieces.first().is_some_and(|p| p.is_unicode) {
        Some("u".to_string())
    } else {
        None
    };
    if bytes_mode {
        let mut out = Vec::new();
        for p in &pieces {
            out.extend_from_slice(p.text.as_bytes());
        }
        Ok((Value::Bytes(out), kind))
    } else {
        let mut out = String::new();
        for p in &pieces {
            out.push_str(&p.text);
        }
        Ok((Value::Str(out), kind))
    }
}

/// Split one string token into its prefix flags and decoded body.
fn parse_string_literal(text: &str, line: usize) -> Result<StringPiece, ParseError> {
    let bytes = text.as_bytes();
    let mut idx = 0;
    let (mut is_bytes, mut is_raw, mut is_unicode) = (false, false, false);
    while idx < bytes.len() {
        match bytes[idx] {
            b'b' | b'B' => is_bytes = true,
            b'r' | b'R' => is_raw = true,
            b'u' | b'U' => is_unicode = true,
            b'f' | b'F' => {}
            b'\'' | b'"' => break,
            _ => {
                return Err(ParseError::syntax("invalid string literal", line));
            }
        }
        idx += 1;
    }
    if idx >= bytes.len() {
        return Err(ParseError::syntax("invalid string literal", line));
    }
    let quote = bytes[idx];
    let rest = &text[idx..];
    let triple = [quote, quote, quote];
    let body = if rest.len() >= 6 && rest.as_bytes().starts_with(&triple) {
        &rest[3..rest.len() - 3]
    } else if rest.len() >= 2 {
        &rest[1..rest.len() - 1]
    } else {
        return Err(ParseError::syntax("invalid string literal", line));
    };
    let decoded = if is_raw {
        body.to_string()
    } else {
        decode_escapes(body)
    };
    Ok(StringPiece {
        is_bytes,
        is_unicode,
        text: decoded,
    })
}

/// Process backslash escapes. Unknown escapes are kept verbatim, backslash
/// included; an escaped newline disappears.
fn decode_escapes(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            None => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            Some('0') => out.push('\0'),
            Some('\n') => {}
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number_radixes() {
        assert_eq!(parse_number("0x_1F").unwrap(), Value::Int(31));
        assert_eq!(parse_number("0o17").unwrap(), Value::Int(15));
        assert_eq!(parse_number("0b101").unwrap(), Value::Int(5));
        assert_eq!(parse_number("1_000").unwrap(), Value::Int(1000));
    }

    #[test]
    fn test_parse_number_floats() {
        assert_eq!(parse_number("1e10").unwrap(), Value::Float(1e10));
        assert_eq!(parse_number("3.14").unwrap(), Value::Float(3.14));
        assert_eq!(parse_number(".5").unwrap(), Value::Float(0.5));
        assert_eq!(parse_number("10.").unwrap(), Value::Float(10.0));
    }

    #[test]
    fn test_parse_number_imaginary() {
        assert_eq!(
            parse_number("1j").unwrap(),
            Value::Complex {
                real: 0.0,
                imag: 1.0
            }
        );
        assert_eq!(
            parse_number("2.5J").unwrap(),
            Value::Complex {
                real: 0.0,
                imag: 2.5
            }
        );
    }

    #[test]
    fn test_parse_number_overflow_falls_back() {
        match parse_number("99999999999999999999999999").unwrap() {
            Value::Float(x) => assert!(x > 9.9e24),
            other => panic!("expected float fallback, got {:?}", other),
        }
    }

    #[test]
    fn test_concat_plain_strings() {
        let texts = vec!["'abc'".to_string(), "\"def\"".to_string()];
        let (value, kind) = concat_strings(&texts, 1).unwrap();
        assert_eq!(value, Value::Str("abcdef".to_string()));
        assert_eq!(kind, None);
    }

    #[test]
    fn test_empty_string() {
        let texts = vec!["''".to_string()];
        let (value, _) = concat_strings(&texts, 1).unwrap();
        assert_eq!(value, Value::Str(String::new()));
    }

    #[test]
    fn test_triple_quoted_body() {
        let texts = vec!["'''a\nb'''".to_string()];
        let (value, _) = concat_strings(&texts, 1).unwrap();
        assert_eq!(value, Value::Str("a\nb".to_string()));
    }

    #[test]
    fn test_escapes() {
        let texts = vec![r"'a\n\t\\\'b'".to_string()];
        let (value, _) = concat_strings(&texts, 1).unwrap();
        assert_eq!(value, Value::Str("a\n\t\\'b".to_string()));
    }

    #[test]
    fn test_raw_strings_keep_backslashes() {
        let texts = vec![r"r'a\nb'".to_string()];
        let (value, _) = concat_strings(&texts, 1).unwrap();
        assert_eq!(value, Value::Str(r"a\nb".to_string()));
    }

    #[test]
    fn test_bytes_literal() {
        let texts = vec!["b'ab'".to_string()];
        let (value, _) = concat_strings(&texts, 1).unwrap();
        assert_eq!(value, Value::Bytes(b"ab".to_vec()));
    }

    #[test]
    fn test_mixed_bytes_rejected() {
        let texts = vec!["b'ab'".to_string(), "'cd'".to_string()];
        let err = concat_strings(&texts, 3).unwrap_err();
        assert_eq!(
            err,
            ParseError::syntax("cannot mix bytes and nonbytes literals", 3)
        );
    }

    #[test]
    fn test_unicode_prefix_sets_kind() {
        let texts = vec!["u'ab'".to_string()];
        let (_, kind) = concat_strings(&texts, 1).unwrap();
        assert_eq!(kind, Some("u".to_string()));
    }
}
