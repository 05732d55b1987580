//! Escape decoding shared by names, strings and URLs.
//!
//! All functions take the [`Cursor`] positioned just after the `\`, which the
//! caller has already checked is not followed by a newline.

use crate::cursor::Cursor;

/// U+FFFD, substituted for NUL, surrogates and out-of-range code points.
pub(crate) const REPLACEMENT_CHAR: char = '\u{FFFD}';

/// LF, CR and FF.
#[inline]
pub(crate) fn is_newline(b: u8) -> bool {
    matches!(b, b'\n' | b'\r' | b'\x0C')
}

/// `\` followed by anything but a newline starts an escape.
///
/// A `\` at EOF still starts one (it decodes to U+FFFD).
#[inline]
pub(crate) fn is_valid_escape(first: u8, second: u8) -> bool {
    first == b'\\' && !is_newline(second)
}

/// Value of an ASCII hex digit.
#[inline]
pub(crate) fn hex_value(b: u8) -> Option<u32> {
    match b {
        b'0'..=b'9' => Some(u32::from(b - b'0')),
        b'a'..=b'f' => Some(u32::from(b - b'a') + 10),
        b'A'..=b'F' => Some(u32::from(b - b'A') + 10),
        _ => None,
    }
}

/// Consume up to `max` hex digits. Returns `(value, digit_count)`.
pub(crate) fn consume_hex_digits(cursor: &mut Cursor<'_>, max: u32) -> (u32, u32) {
    let mut value = 0;
    let mut digits = 0;
    while digits < max && !cursor.is_eof() {
        let Some(digit) = hex_value(cursor.current()) else {
            break;
        };
        value = value * 16 + digit;
        digits += 1;
        cursor.advance();
    }
    (value, digits)
}

/// Decode one escape and return the character it stands for.
///
/// - 1-6 hex digits, plus one optional whitespace separator (CR LF counts
///   as one); zero, surrogates and values above U+10FFFF become U+FFFD.
/// - NUL is consumed and becomes U+FFFD.
/// - EOF consumes nothing and yields U+FFFD.
/// - Anything else is consumed and returned literally.
pub(crate) fn consume_escape(cursor: &mut Cursor<'_>) -> char {
    if cursor.is_eof() {
        return REPLACEMENT_CHAR;
    }
    match cursor.current() {
        b'0'..=b'9' | b'a'..=b'f' | b'A'..=b'F' => {
            let (value, _) = consume_hex_digits(cursor, 6);
            match cursor.current() {
                b' ' | b'\t' | b'\n' | b'\x0C' => cursor.advance(),
                b'\r' => {
                    cursor.advance();
                    if cursor.current() == b'\n' {
                        cursor.advance();
                    }
                }
                _ => {}
            }
            if value == 0 {
                REPLACEMENT_CHAR
            } else {
                // `from_u32` rejects surrogates and values above U+10FFFF.
                char::from_u32(value).unwrap_or(REPLACEMENT_CHAR)
            }
        }
        0 => {
            cursor.advance();
            REPLACEMENT_CHAR
        }
        _ => {
            let c = cursor.current_char();
            cursor.advance_char();
            c
        }
    }
}
