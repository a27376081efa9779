//! XML Entity Handling
//!
//! Reading:
//! - Built-in entities: &lt; &gt; &amp; &quot; &apos;
//! - Numeric character references: &#65; &#x41; (0 to 255 only)
//!
//! Writing:
//! - `encode_text` escapes the five special characters
//!
//! Reference bodies are passed without the surrounding `&` and `;`.

use super::codepoint::CodePoint;
use super::scanner::Scanner;
use super::text::UnicodeText;
use memchr::{memchr2, memchr3};
use std::borrow::Cow;

/// Largest value a numeric character reference may carry
pub const MAX_CHAR_REFERENCE: CodePoint = 0xFF;

/// Longest reference body the reader looks ahead for: `#` plus six decimal
/// digits, or `#x` plus five hex digits
pub const MAX_REFERENCE_LEN: usize = 7;

pub const BAD_ENTITY: &str = "bad entity reference";
pub const BAD_CHAR_REFERENCE: &str = "bad character reference";

/// Resolve a reference body to the code point it stands for
pub fn decode_reference(body: &[u16]) -> Result<CodePoint, &'static str> {
    match body.first() {
        Some(&u) if u == b'#' as u16 => decode_numeric(&body[1..]),
        Some(_) => decode_named(body).ok_or(BAD_ENTITY),
        None => Err(BAD_ENTITY),
    }
}

/// Consume the reference whose `&` is under the cursor.
///
/// The terminating `;` must follow within `MAX_REFERENCE_LEN` units. On
/// failure the cursor is left on the `&`.
pub fn read_reference(scanner: &mut Scanner) -> Result<CodePoint, &'static str> {
    let units = scanner.text().as_units();
    let start = scanner.position() + 1;
    let numeric = units.get(start) == Some(&(b'#' as u16));
    let limit = (start + MAX_REFERENCE_LEN + 1).min(units.len());

    let body_len = units
        .get(start..limit)
        .and_then(|window| window.iter().position(|&u| u == b';' as u16));
    match body_len {
        Some(len) => {
            let cp = decode_reference(&units[start..start + len])?;
            scanner.advance_to(start + len + 1);
            Ok(cp)
        }
        None if numeric => Err(BAD_CHAR_REFERENCE),
        None => Err(BAD_ENTITY),
    }
}

fn decode_named(body: &[u16]) -> Option<CodePoint> {
    const NAMED: [(&[u8], char); 5] = [
        (b"lt", '<'),
        (b"gt", '>'),
        (b"amp", '&'),
        (b"quot", '"'),
        (b"apos", '\''),
    ];
    NAMED
        .iter()
        .find(|(name, _)| {
            name.len() == body.len() && name.iter().zip(body).all(|(&b, &u)| u == b as u16)
        })
        .map(|&(_, c)| c as CodePoint)
}

/// Decimal, or hexadecimal after a lowercase `x`
fn decode_numeric(digits: &[u16]) -> Result<CodePoint, &'static str> {
    let (radix, digits) = match digits.first() {
        Some(&u) if u == b'x' as u16 => (16, &digits[1..]),
        _ => (10, digits),
    };
    if digits.is_empty() {
        return Err(BAD_CHAR_REFERENCE);
    }

    let mut value: CodePoint = 0;
    for &unit in digits {
        let digit = char::from_u32(unit as u32)
            .and_then(|c| c.to_digit(radix))
            .ok_or(BAD_CHAR_REFERENCE)?;
        value = value * radix + digit;
        if value > MAX_CHAR_REFERENCE {
            return Err(BAD_CHAR_REFERENCE);
        }
    }
    Ok(value)
}

/// Encode text for XML output (escape special characters)
pub fn encode_text(input: &str) -> Cow<'_, str> {
    // Fast path: check if any escaping needed
    let bytes = input.as_bytes();
    if memchr3(b'<', b'>', b'&', bytes).is_none() && memchr2(b'"', b'\'', bytes).is_none()
    {
        return Cow::Borrowed(input);
    }

    let mut result = String::with_capacity(input.len() + 16);
    for c in input.chars() {
        match c {
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '&' => result.push_str("&amp;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&apos;"),
            _ => result.push(c),
        }
    }
    Cow::Owned(result)
}

/// Append `text` to `out` with the special characters escaped
pub fn escape_into(out: &mut UnicodeText, text: &UnicodeText) {
    let utf8 = text.to_string();
    out.push_str(&encode_text(&utf8));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn units(s: &str) -> Vec<u16> {
        s.encode_utf16().collect()
    }

    #[test]
    fn test_named_entities() {
        assert_eq!(decode_reference(&units("lt")), Ok(u32::from('<')));
        assert_eq!(decode_reference(&units("gt")), Ok(u32::from('>')));
        assert_eq!(decode_reference(&units("amp")), Ok(u32::from('&')));
        assert_eq!(decode_reference(&units("quot")), Ok(u32::from('"')));
        assert_eq!(decode_reference(&units("apos")), Ok(u32::from('\'')));
    }

    #[test]
    fn test_unknown_entity() {
        assert_eq!(decode_reference(&units("nbsp")), Err(BAD_ENTITY));
        assert_eq!(decode_reference(&units("")), Err(BAD_ENTITY));
        assert_eq!(decode_reference(&units("LT")), Err(BAD_ENTITY));
    }

    #[test]
    fn test_numeric_decimal() {
        assert_eq!(decode_reference(&units("#65")), Ok(65));
        assert_eq!(decode_reference(&units("#255")), Ok(255));
        assert_eq!(decode_reference(&units("#000065")), Ok(65));
    }

    #[test]
    fn test_numeric_control_range() {
        // anything up to 255 is accepted, control characters included
        assert_eq!(decode_reference(&units("#0")), Ok(0));
        assert_eq!(decode_reference(&units("#1")), Ok(1));
        assert_eq!(decode_reference(&units("#x1F")), Ok(0x1F));
    }

    #[test]
    fn test_numeric_hex() {
        assert_eq!(decode_reference(&units("#x42")), Ok(0x42));
        assert_eq!(decode_reference(&units("#xe9")), Ok(0xE9));
        assert_eq!(decode_reference(&units("#xFF")), Ok(0xFF));
    }

    #[test]
    fn test_numeric_out_of_range() {
        assert_eq!(decode_reference(&units("#256")), Err(BAD_CHAR_REFERENCE));
        assert_eq!(decode_reference(&units("#x100")), Err(BAD_CHAR_REFERENCE));
    }

    #[test]
    fn test_numeric_malformed() {
        assert_eq!(decode_reference(&units("#")), Err(BAD_CHAR_REFERENCE));
        assert_eq!(decode_reference(&units("#x")), Err(BAD_CHAR_REFERENCE));
        assert_eq!(decode_reference(&units("#X41")), Err(BAD_CHAR_REFERENCE));
        assert_eq!(decode_reference(&units("#6a")), Err(BAD_CHAR_REFERENCE));
    }

    #[test]
    fn test_read_reference_advances() {
        let mut scanner = Scanner::new(UnicodeText::from("&amp;rest"));
        assert_eq!(read_reference(&mut scanner), Ok(u32::from('&')));
        assert!(scanner.starts_with("rest"));
    }

    #[test]
    fn test_read_reference_window() {
        let mut scanner = Scanner::new(UnicodeText::from("&#000065;x"));
        assert_eq!(read_reference(&mut scanner), Ok(65));
        assert!(scanner.starts_with("x"));

        let mut scanner = Scanner::new(UnicodeText::from("&#x000FF;"));
        assert_eq!(read_reference(&mut scanner), Ok(0xFF));

        let mut scanner = Scanner::new(UnicodeText::from("&#0000065;"));
        assert_eq!(read_reference(&mut scanner), Err(BAD_CHAR_REFERENCE));
    }

    #[test]
    fn test_read_reference_missing_semicolon() {
        let mut scanner = Scanner::new(UnicodeText::from("&#65 and more"));
        assert_eq!(read_reference(&mut scanner), Err(BAD_CHAR_REFERENCE));
        assert_eq!(scanner.position(), 0);

        let mut scanner = Scanner::new(UnicodeText::from("&amp"));
        assert_eq!(read_reference(&mut scanner), Err(BAD_ENTITY));

        let mut scanner = Scanner::new(UnicodeText::from("&"));
        assert_eq!(read_reference(&mut scanner), Err(BAD_ENTITY));
    }

    #[test]
    fn test_encode_text() {
        let input = "<hello> & \"world\"";
        let result = encode_text(input);
        assert_eq!(result.as_ref(), "&lt;hello&gt; &amp; &quot;world&quot;");
        assert!(matches!(encode_text("plain"), Cow::Borrowed(_)));
        assert_eq!(encode_text("it's"), "it&apos;s");
    }

    #[test]
    fn test_escape_into() {
        let mut out = UnicodeText::from("v=");
        escape_into(&mut out, &UnicodeText::from("a<b"));
        assert_eq!(out, "v=a&lt;b");
    }
}
