//! Hand-written CSS Syntax tokenizer producing [`Token`] values.
//!
//! The tokenizer operates on a sentinel-terminated [`Cursor`] and decodes
//! token values as it goes. Text payloads borrow from the source whenever the
//! value is a verbatim slice, so the common case allocates nothing.
//!
//! # Design
//!
//! Main dispatch looks at the current byte and at most three bytes of
//! lookahead. Each arm calls a focused method that advances the cursor and
//! returns the token. Malformed input is encoded as `BadString` / `BadUrl`
//! tokens; there is no error path. Once the input is exhausted every call
//! returns `Token::EOF`.

use std::borrow::Cow;

use crate::cursor::Cursor;
use crate::escape::{
    consume_escape, consume_hex_digits, hex_value, is_newline, is_valid_escape, REPLACEMENT_CHAR,
};
use crate::location::{LineCache, SourceLocation, SourcePosition};
use crate::source_buffer::SourceBuffer;
use crate::token::{NumericValue, Token};

/// State of `var()` detection, driven by the caller through
/// [`Tokenizer::arm_var_functions`] and [`Tokenizer::check_var_functions`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum VarFunctions {
    /// Nobody is asking.
    Idle,
    /// The caller wants to know whether the next scan contains `var(`.
    Armed,
    /// A `var(` function token was produced while armed.
    Triggered,
}

/// CSS Syntax tokenizer over one [`SourceBuffer`].
///
/// Produces one token per [`next_token()`](Self::next_token) call.
#[derive(Clone, Debug)]
pub struct Tokenizer<'a> {
    cursor: Cursor<'a>,
    var_functions: VarFunctions,
    lines: LineCache,
}

impl<'a> Tokenizer<'a> {
    /// Create a tokenizer at the start of `source`; the first line is line 1.
    pub fn new(source: &'a SourceBuffer) -> Self {
        Self::with_first_line_number(source, 1)
    }

    /// Create a tokenizer whose first line is reported as `first_line`.
    ///
    /// Useful when the stylesheet is embedded in a larger document, such as
    /// a `<style>` element.
    pub fn with_first_line_number(source: &'a SourceBuffer, first_line: u32) -> Self {
        Self {
            cursor: source.cursor(),
            var_functions: VarFunctions::Idle,
            lines: LineCache::new(first_line),
        }
    }

    /// Produce the next token.
    ///
    /// Returns `Token::EOF` when the source is exhausted.
    /// Subsequent calls after EOF continue to return `Token::EOF`.
    pub fn next_token(&mut self) -> Token<'a> {
        if self.cursor.is_eof() {
            return Token::EOF;
        }
        match self.cursor.current() {
            b' ' | b'\t' | b'\n' | b'\r' | b'\x0C' => self.whitespace(),
            b'"' => self.quoted_string(b'"'),
            b'\'' => self.quoted_string(b'\''),
            b'#' => self.hash(),
            b'$' => self.match_or_delim(Token::SuffixMatch),
            b'*' => self.match_or_delim(Token::SubstringMatch),
            b'^' => self.match_or_delim(Token::PrefixMatch),
            b'~' => self.match_or_delim(Token::IncludeMatch),
            b'|' => self.pipe(),
            b'+' => self.plus(),
            b'-' => self.minus(),
            b'.' => self.dot(),
            b'/' => self.slash_or_comment(),
            b'0'..=b'9' => self.numeric(),
            b':' => self.single(Token::Colon),
            b';' => self.single(Token::Semicolon),
            b',' => self.single(Token::Comma),
            b'<' => self.less(),
            b'@' => self.at(),
            b'u' | b'U' => self.unicode_range_or_ident(),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' | 0 => self.ident_like(),
            b'\\' if is_valid_escape(b'\\', self.cursor.peek()) => self.ident_like(),
            b'(' => self.single(Token::ParenthesisBlock),
            b')' => self.single(Token::CloseParenthesis),
            b'[' => self.single(Token::SquareBracketBlock),
            b']' => self.single(Token::CloseSquareBracket),
            b'{' => self.single(Token::CurlyBracketBlock),
            b'}' => self.single(Token::CloseCurlyBracket),
            _ => self.delim(),
        }
    }

    // ─── Position & Location ────────────────────────────────────────

    /// The current position, for use with [`reset()`](Self::reset) and
    /// [`slice_from()`](Self::slice_from).
    #[inline]
    pub fn position(&self) -> SourcePosition {
        SourcePosition(self.cursor.pos())
    }

    /// Move back (or forward) to a position previously obtained from
    /// [`position()`](Self::position) on this tokenizer.
    pub fn reset(&mut self, position: SourcePosition) {
        self.cursor.set_pos(position.0);
    }

    /// Returns `true` once every byte of the input has been consumed.
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.cursor.is_eof()
    }

    /// Source text from `start` to the current position.
    pub fn slice_from(&self, start: SourcePosition) -> &'a str {
        self.cursor.slice_from(start.0)
    }

    /// Source text between two positions.
    pub fn slice(&self, start: SourcePosition, end: SourcePosition) -> &'a str {
        self.cursor.slice(start.0, end.0)
    }

    /// Line and column of the current position.
    pub fn current_source_location(&self) -> SourceLocation {
        self.source_location(self.position())
    }

    /// Line and column of `position`.
    ///
    /// The answer does not depend on the order of queries.
    pub fn source_location(&self, position: SourcePosition) -> SourceLocation {
        self.lines.locate(self.cursor.source_bytes(), position.0)
    }

    /// The full text of the line containing the current position, without
    /// its terminator.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "line bounds are within the source, whose length fits in u32"
    )]
    pub fn current_source_line(&self) -> &'a str {
        let bytes = self.cursor.source_bytes();
        let pos = self.cursor.pos() as usize;
        let start = memchr::memrchr3(b'\n', b'\r', b'\x0C', &bytes[..pos]).map_or(0, |i| i + 1);
        let end = memchr::memchr3(b'\n', b'\r', b'\x0C', &bytes[pos..])
            .map_or(bytes.len(), |i| pos + i);
        self.cursor.slice(start as u32, end as u32)
    }

    // ─── var() Detection ────────────────────────────────────────────

    /// Start watching for `var(` function tokens.
    ///
    /// Call before scanning a value, then [`check_var_functions()`]
    /// right after it.
    ///
    /// [`check_var_functions()`]: Self::check_var_functions
    pub fn arm_var_functions(&mut self) {
        self.var_functions = VarFunctions::Armed;
    }

    /// Returns whether a `var(` was seen since the last arm, and disarms.
    pub fn check_var_functions(&mut self) -> bool {
        let seen = self.var_functions == VarFunctions::Triggered;
        self.var_functions = VarFunctions::Idle;
        seen
    }

    // ─── Simple Tokens ──────────────────────────────────────────────

    /// Single-byte token: advance one byte and emit `token`.
    fn single(&mut self, token: Token<'a>) -> Token<'a> {
        self.cursor.advance();
        token
    }

    fn whitespace(&mut self) -> Token<'a> {
        self.cursor.eat_whitespace();
        Token::Whitespace
    }

    /// Any other character, ASCII or not, as a `Delim`.
    fn delim(&mut self) -> Token<'a> {
        let c = self.cursor.current_char();
        self.cursor.advance_char();
        Token::Delim(c)
    }

    /// `$=`, `*=`, `^=` and `~=`, or the first character as a `Delim`.
    fn match_or_delim(&mut self, matched: Token<'a>) -> Token<'a> {
        if self.cursor.peek() == b'=' {
            self.cursor.advance_n(2);
            matched
        } else {
            self.delim()
        }
    }

    fn pipe(&mut self) -> Token<'a> {
        match self.cursor.peek() {
            b'=' => {
                self.cursor.advance_n(2);
                Token::DashMatch
            }
            b'|' => {
                self.cursor.advance_n(2);
                Token::Column
            }
            _ => self.delim(),
        }
    }

    fn plus(&mut self) -> Token<'a> {
        if self.starts_number() {
            self.numeric()
        } else {
            self.delim()
        }
    }

    fn minus(&mut self) -> Token<'a> {
        if self.starts_number() {
            self.numeric()
        } else if self.cursor.starts_with(b"-->") {
            self.cursor.advance_n(3);
            Token::CDC
        } else if self.starts_identifier() {
            self.ident_like()
        } else {
            self.delim()
        }
    }

    fn dot(&mut self) -> Token<'a> {
        if self.cursor.peek().is_ascii_digit() {
            self.numeric()
        } else {
            self.delim()
        }
    }

    fn less(&mut self) -> Token<'a> {
        if self.cursor.starts_with(b"<!--") {
            self.cursor.advance_n(4);
            Token::CDO
        } else {
            self.delim()
        }
    }

    // ─── Comments ───────────────────────────────────────────────────

    fn slash_or_comment(&mut self) -> Token<'a> {
        if self.cursor.peek() == b'*' {
            self.cursor.advance_n(2);
            // Unterminated comments run to EOF.
            self.cursor.eat_comment_body();
            Token::Comment
        } else {
            self.delim()
        }
    }

    // ─── Identifiers ────────────────────────────────────────────────

    /// Would the input at the current position start an identifier?
    fn starts_identifier(&self) -> bool {
        let c = &self.cursor;
        let within = |n: u32| c.pos() + n < c.source_len();
        match c.current() {
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => true,
            0 => within(0),
            b'\\' => is_valid_escape(b'\\', c.peek()),
            b'-' => match c.peek() {
                b'a'..=b'z' | b'A'..=b'Z' | b'_' | b'-' => true,
                0 => within(1),
                b'\\' => is_valid_escape(b'\\', c.peek2()),
                _ => false,
            },
            _ => false,
        }
    }

    /// Is the current byte an escape or an interior NUL inside a name?
    fn at_name_special(&self) -> bool {
        match self.cursor.current() {
            b'\\' => is_valid_escape(b'\\', self.cursor.peek()),
            0 => !self.cursor.is_eof(),
            _ => false,
        }
    }

    /// Consume a name: name bytes verbatim, escapes decoded, NUL replaced.
    fn consume_name(&mut self) -> Cow<'a, str> {
        let start = self.cursor.pos();
        self.cursor.eat_while(is_name_byte);
        if !self.at_name_special() {
            return Cow::Borrowed(self.cursor.slice_from(start));
        }

        let mut value = String::from(self.cursor.slice_from(start));
        while self.at_name_special() {
            let escaped = self.cursor.current() == b'\\';
            self.cursor.advance();
            if escaped {
                value.push(consume_escape(&mut self.cursor));
            } else {
                value.push(REPLACEMENT_CHAR);
            }
            let run = self.cursor.pos();
            self.cursor.eat_while(is_name_byte);
            value.push_str(self.cursor.slice_from(run));
        }
        Cow::Owned(value)
    }

    /// Identifier, function, or `url(` token.
    fn ident_like(&mut self) -> Token<'a> {
        let name = self.consume_name();
        if self.cursor.current() != b'(' {
            return Token::Ident(name);
        }
        self.cursor.advance(); // consume '('
        if name.eq_ignore_ascii_case("url") {
            return self.url(name);
        }
        if self.var_functions == VarFunctions::Armed && name.eq_ignore_ascii_case("var") {
            self.var_functions = VarFunctions::Triggered;
        }
        Token::Function(name)
    }

    fn hash(&mut self) -> Token<'a> {
        self.cursor.advance(); // consume '#'
        if self.starts_identifier() {
            Token::IDHash(self.consume_name())
        } else if is_name_byte(self.cursor.current()) || self.at_name_special() {
            Token::Hash(self.consume_name())
        } else {
            Token::Delim('#')
        }
    }

    fn at(&mut self) -> Token<'a> {
        self.cursor.advance(); // consume '@'
        if self.starts_identifier() {
            Token::AtKeyword(self.consume_name())
        } else {
            Token::Delim('@')
        }
    }

    // ─── Numeric Literals ───────────────────────────────────────────

    /// `+` or `-` followed by a digit, or by `.` and a digit.
    fn starts_number(&self) -> bool {
        let next = self.cursor.peek();
        next.is_ascii_digit() || (next == b'.' && self.cursor.peek2().is_ascii_digit())
    }

    /// Consume `[+-]?\d*(\.\d+)?([eE][+-]?\d+)?` and classify what follows.
    ///
    /// Called only when at least one digit is guaranteed.
    fn numeric(&mut self) -> Token<'a> {
        let (has_sign, sign) = match self.cursor.current() {
            b'-' => (true, -1.0),
            b'+' => (true, 1.0),
            _ => (false, 1.0),
        };
        if has_sign {
            self.cursor.advance();
        }

        let mut integral_part: f64 = 0.0;
        while let Some(digit) = decimal_value(self.cursor.current()) {
            integral_part = integral_part * 10.0 + digit;
            self.cursor.advance();
        }

        let mut is_integer = true;

        let mut fractional_part: f64 = 0.0;
        if self.cursor.current() == b'.' && self.cursor.peek().is_ascii_digit() {
            is_integer = false;
            self.cursor.advance(); // consume '.'
            let mut factor = 0.1;
            while let Some(digit) = decimal_value(self.cursor.current()) {
                fractional_part += digit * factor;
                factor *= 0.1;
                self.cursor.advance();
            }
        }

        let mut value = sign * (integral_part + fractional_part);

        if matches!(self.cursor.current(), b'e' | b'E') && self.starts_exponent() {
            is_integer = false;
            self.cursor.advance(); // consume 'e'
            let exponent_sign = match self.cursor.current() {
                b'-' => -1.0,
                _ => 1.0,
            };
            if matches!(self.cursor.current(), b'+' | b'-') {
                self.cursor.advance();
            }
            let mut exponent: f64 = 0.0;
            while let Some(digit) = decimal_value(self.cursor.current()) {
                exponent = exponent * 10.0 + digit;
                self.cursor.advance();
            }
            value *= f64::powf(10.0, exponent_sign * exponent);
        }

        let numeric = NumericValue {
            value,
            int_value: is_integer.then(|| saturate_to_i32(value)),
            has_sign,
        };

        if self.cursor.current() == b'%' {
            self.cursor.advance();
            Token::Percentage(numeric)
        } else if self.starts_identifier() {
            // The unit is left for the next call, which yields it as an Ident.
            Token::Dimension(numeric)
        } else {
            Token::Number(numeric)
        }
    }

    /// After `e`/`E`: a digit, or a sign then a digit.
    fn starts_exponent(&self) -> bool {
        match self.cursor.peek() {
            b'0'..=b'9' => true,
            b'+' | b'-' => self.cursor.peek2().is_ascii_digit(),
            _ => false,
        }
    }

    // ─── Strings ────────────────────────────────────────────────────

    /// Quoted string opened by `quote`.
    ///
    /// The run before the first backslash is taken verbatim (interior NUL
    /// included); after it, NUL becomes U+FFFD.
    fn quoted_string(&mut self, quote: u8) -> Token<'a> {
        self.cursor.advance(); // consume opening quote
        let start = self.cursor.pos();
        match self.cursor.skip_to_string_delim(quote) {
            b'\\' => {}
            b'\n' | b'\r' | b'\x0C' => return Token::BadString,
            b if b == quote => {
                let value = self.cursor.slice_from(start);
                self.cursor.advance(); // consume closing quote
                return Token::QuotedString(Cow::Borrowed(value));
            }
            _ => return Token::QuotedString(Cow::Borrowed(self.cursor.slice_from(start))),
        }

        let mut value = String::from(self.cursor.slice_from(start));
        while !self.cursor.is_eof() {
            match self.cursor.current() {
                b if b == quote => {
                    self.cursor.advance();
                    break;
                }
                // Not consumed: the newline is the next token.
                b'\n' | b'\r' | b'\x0C' => return Token::BadString,
                b'\\' => {
                    self.cursor.advance();
                    if self.cursor.is_eof() {
                        // Escaped EOF contributes nothing.
                    } else if is_newline(self.cursor.current()) {
                        self.eat_newline();
                    } else {
                        value.push(consume_escape(&mut self.cursor));
                    }
                }
                0 => {
                    self.cursor.advance();
                    value.push(REPLACEMENT_CHAR);
                }
                _ => {
                    let run = self.cursor.pos();
                    self.cursor.eat_while(|b| {
                        b != quote && !matches!(b, b'\\' | b'\n' | b'\r' | b'\x0C' | 0)
                    });
                    value.push_str(self.cursor.slice_from(run));
                }
            }
        }
        Token::QuotedString(Cow::Owned(value))
    }

    /// Consume one newline; CR LF counts as one.
    fn eat_newline(&mut self) {
        let was_cr = self.cursor.current() == b'\r';
        self.cursor.advance();
        if was_cr && self.cursor.current() == b'\n' {
            self.cursor.advance();
        }
    }

    // ─── URLs ───────────────────────────────────────────────────────

    /// After `url(`. A quoted argument turns this into an ordinary function.
    fn url(&mut self, name: Cow<'a, str>) -> Token<'a> {
        let after_paren = self.cursor.pos();
        self.cursor.eat_whitespace();
        if self.cursor.is_eof() {
            return Token::UnquotedUrl(Cow::Borrowed(""));
        }
        match self.cursor.current() {
            b'"' | b'\'' => {
                // Leave the whitespace and the quote for the following tokens.
                self.cursor.set_pos(after_paren);
                Token::Function(name)
            }
            b')' => {
                self.cursor.advance();
                Token::UnquotedUrl(Cow::Borrowed(""))
            }
            _ => self.unquoted_url(),
        }
    }

    fn unquoted_url(&mut self) -> Token<'a> {
        let start = self.cursor.pos();
        // `None` while the value is still a verbatim slice of the source.
        let mut decoded: Option<String> = None;
        loop {
            let run = self.cursor.pos();
            self.cursor.eat_while(is_plain_url_byte);
            if let Some(value) = decoded.as_mut() {
                value.push_str(self.cursor.slice_from(run));
            }
            if self.cursor.is_eof() {
                return Token::UnquotedUrl(self.url_value(start, decoded));
            }
            match self.cursor.current() {
                b' ' | b'\t' | b'\n' | b'\r' | b'\x0C' => {
                    let value = self.url_value(start, decoded);
                    return self.url_end(value);
                }
                b')' => {
                    let value = self.url_value(start, decoded);
                    self.cursor.advance();
                    return Token::UnquotedUrl(value);
                }
                b'\\' if is_valid_escape(b'\\', self.cursor.peek()) => {
                    let value =
                        decoded.get_or_insert_with(|| self.cursor.slice_from(start).to_owned());
                    self.cursor.advance();
                    value.push(consume_escape(&mut self.cursor));
                }
                0 => {
                    let value =
                        decoded.get_or_insert_with(|| self.cursor.slice_from(start).to_owned());
                    self.cursor.advance();
                    value.push(REPLACEMENT_CHAR);
                }
                // Control characters, quotes, `(`, or `\` before a newline.
                _ => {
                    self.cursor.advance();
                    return self.bad_url();
                }
            }
        }
    }

    /// The URL text accumulated from `start` to the current position.
    fn url_value(&self, start: u32, decoded: Option<String>) -> Cow<'a, str> {
        match decoded {
            Some(value) => Cow::Owned(value),
            None => Cow::Borrowed(self.cursor.slice_from(start)),
        }
    }

    /// Whitespace after the URL: only more whitespace and `)` may follow.
    fn url_end(&mut self, value: Cow<'a, str>) -> Token<'a> {
        self.cursor.eat_whitespace();
        if self.cursor.is_eof() {
            return Token::UnquotedUrl(value);
        }
        if self.cursor.current() == b')' {
            self.cursor.advance();
            return Token::UnquotedUrl(value);
        }
        self.bad_url()
    }

    /// Discard input through the closing `)` or EOF.
    ///
    /// `\` escapes exactly the next character, so `\)` does not end recovery.
    fn bad_url(&mut self) -> Token<'a> {
        while !self.cursor.is_eof() {
            match self.cursor.current() {
                b')' => {
                    self.cursor.advance();
                    break;
                }
                b'\\' => {
                    self.cursor.advance();
                    if !self.cursor.is_eof() {
                        self.cursor.advance_char();
                    }
                }
                _ => self.cursor.advance_char(),
            }
        }
        Token::BadUrl
    }

    // ─── Unicode Ranges ─────────────────────────────────────────────

    fn unicode_range_or_ident(&mut self) -> Token<'a> {
        let after_plus = self.cursor.peek2();
        if self.cursor.peek() == b'+' && (hex_value(after_plus).is_some() || after_plus == b'?') {
            self.unicode_range()
        } else {
            self.ident_like()
        }
    }

    /// After `u+`: hex digits, `?` wildcards, or an explicit `-` end.
    ///
    /// Bounds are reported as written; they are not clamped to U+10FFFF.
    fn unicode_range(&mut self) -> Token<'a> {
        self.cursor.advance_n(2); // consume 'u+'
        let (value, digits) = consume_hex_digits(&mut self.cursor, 6);

        let mut wildcards = 0;
        while digits + wildcards < 6 && self.cursor.current() == b'?' {
            wildcards += 1;
            self.cursor.advance();
        }
        if wildcards > 0 {
            let shift = 4 * wildcards;
            return Token::UnicodeRange {
                start: value << shift,
                end: ((value + 1) << shift) - 1,
            };
        }

        let end = if self.cursor.current() == b'-' && hex_value(self.cursor.peek()).is_some() {
            self.cursor.advance(); // consume '-'
            consume_hex_digits(&mut self.cursor, 6).0
        } else {
            value
        };
        Token::UnicodeRange { start: value, end }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    /// Yields tokens up to, but not including, `Token::EOF`.
    fn next(&mut self) -> Option<Token<'a>> {
        match self.next_token() {
            Token::EOF => None,
            token => Some(token),
        }
    }
}

/// 256-byte lookup table for name code points.
/// `true` for a-z, A-Z, 0-9, `_`, `-`, and every non-ASCII byte.
/// The sentinel byte (0x00) maps to `false`, naturally terminating loops.
#[allow(
    clippy::cast_possible_truncation,
    reason = "loop counter i is 0..=255, always fits in u8"
)]
static IS_NAME_BYTE_TABLE: [bool; 256] = {
    let mut table = [false; 256];
    let mut i = 0u16;
    while i < 256 {
        table[i as usize] = matches!(
            i as u8,
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_' | b'-' | 0x80..=0xFF
        );
        i += 1;
    }
    table
};

/// Returns `true` if `b` continues a name verbatim.
#[inline]
fn is_name_byte(b: u8) -> bool {
    IS_NAME_BYTE_TABLE[b as usize]
}

/// Bytes copied verbatim into an unquoted URL.
///
/// Excludes whitespace, `)`, `\`, NUL, and everything that makes the URL bad.
#[inline]
fn is_plain_url_byte(b: u8) -> bool {
    !matches!(
        b,
        0x00..=0x08
            | b'\t'
            | b'\n'
            | 0x0B
            | b'\x0C'
            | b'\r'
            | 0x0E..=0x1F
            | b' '
            | 0x7F
            | b'"'
            | b'\''
            | b'('
            | b')'
            | b'\\'
    )
}

#[inline]
fn decimal_value(b: u8) -> Option<f64> {
    b.is_ascii_digit().then(|| f64::from(b - b'0'))
}

/// Float-to-int `as` casts saturate at the `i32` bounds.
#[allow(
    clippy::cast_possible_truncation,
    reason = "saturation to i32::MIN..=i32::MAX is the intended result"
)]
#[inline]
fn saturate_to_i32(value: f64) -> i32 {
    value as i32
}

/// Convenience function: tokenize a stylesheet and collect all tokens.
///
/// Returns every token except the final `EOF`, detached from the source.
/// For streaming access, construct a `SourceBuffer` + `Tokenizer` directly.
pub fn tokenize(source: &str) -> Vec<Token<'static>> {
    let buf = SourceBuffer::new(source);
    Tokenizer::new(&buf).map(Token::into_owned).collect()
}

#[cfg(test)]
mod tests;
