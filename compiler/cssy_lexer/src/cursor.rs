//! Byte cursor over a sentinel-terminated stylesheet buffer.
//!
//! The cursor advances through the buffer byte-by-byte. EOF is detected
//! when the current byte equals the sentinel (`0x00`) and the position
//! has reached the source length. Lookahead reads (`peek`, `peek2`,
//! `peek_at`) rely on the zero padding instead of explicit bounds checks.
//!
//! # Interior NUL
//!
//! A NUL at `pos < source_len` is stylesheet content (the tokenizer turns it
//! into U+FFFD where CSS requires); a NUL at `pos >= source_len` is the
//! sentinel.

/// Returns the earliest (minimum) of two optional positions.
///
/// Combines results from separate `memchr` calls when more bytes are needed
/// than `memchr3` can search for at once.
fn earliest_of(a: Option<usize>, b: Option<usize>) -> Option<usize> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.min(y)),
        (Some(x), None) | (None, Some(x)) => Some(x),
        (None, None) => None,
    }
}

/// Byte cursor over a sentinel-terminated buffer.
///
/// Created via [`SourceBuffer::cursor()`](crate::SourceBuffer::cursor).
/// The cursor is [`Copy`], so saving and restoring it is a plain assignment.
///
/// # Invariant
///
/// `text` is the padded buffer: `text[source_len]` is `'\0'` and at least
/// `MAX_LOOKAHEAD` further zero bytes follow it.
#[derive(Clone, Copy, Debug)]
pub struct Cursor<'a> {
    /// Sentinel-terminated buffer (source + sentinel + padding).
    text: &'a str,
    /// Current read position (byte index into `text`).
    pos: u32,
    /// Length of actual source content (excludes sentinel and padding).
    source_len: u32,
}

/// Size assertion: Cursor should be <= 24 bytes on 64-bit platforms.
/// &str = 16 (fat pointer), u32 = 4, u32 = 4 => 24 bytes.
const _: () = assert!(std::mem::size_of::<Cursor<'static>>() <= 24);

impl<'a> Cursor<'a> {
    /// Create a new cursor at position 0.
    ///
    /// # Contract
    ///
    /// `text.as_bytes()[source_len]` must be `0x00`, followed by zero padding.
    /// This is guaranteed by `SourceBuffer::new()`.
    pub(crate) fn new(text: &'a str, source_len: u32) -> Self {
        debug_assert!(
            (source_len as usize) < text.len(),
            "sentinel must be within buffer bounds"
        );
        debug_assert!(
            text.as_bytes()[source_len as usize] == 0,
            "sentinel byte must be 0x00"
        );
        Self {
            text,
            pos: 0,
            source_len,
        }
    }

    /// Returns the byte at the current position (`0x00` at EOF).
    #[inline]
    pub fn current(&self) -> u8 {
        self.text.as_bytes()[self.pos as usize]
    }

    /// Returns the byte one position ahead of current.
    #[inline]
    pub fn peek(&self) -> u8 {
        self.peek_at(1)
    }

    /// Returns the byte two positions ahead of current.
    #[inline]
    pub fn peek2(&self) -> u8 {
        self.peek_at(2)
    }

    /// Returns the byte `n` positions ahead of current.
    ///
    /// Reads past the sentinel yield `0x00` (padding) for `n` up to the
    /// lookahead window; anything further away also yields `0x00`.
    #[inline]
    pub fn peek_at(&self, n: u32) -> u8 {
        self.text
            .as_bytes()
            .get((self.pos + n) as usize)
            .copied()
            .unwrap_or(0)
    }

    /// Returns `true` if the source continues with `needle` at the current position.
    #[inline]
    pub fn starts_with(&self, needle: &[u8]) -> bool {
        self.text.as_bytes()[self.pos as usize..self.source_len as usize].starts_with(needle)
    }

    /// Advance the cursor by one byte.
    #[inline]
    pub fn advance(&mut self) {
        self.pos += 1;
    }

    /// Advance the cursor by `n` bytes.
    #[inline]
    pub fn advance_n(&mut self, n: u32) {
        self.pos += n;
    }

    /// Returns `true` if the cursor has reached EOF.
    ///
    /// Only the position decides: a `0x00` byte before the source length
    /// is an interior NUL, not EOF.
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.source_len
    }

    /// Current byte offset in the source.
    #[inline]
    pub fn pos(&self) -> u32 {
        self.pos
    }

    /// Move the cursor to `pos`.
    ///
    /// `pos` must be a character boundary within the source, which holds
    /// for any position previously reported by this cursor.
    #[inline]
    pub fn set_pos(&mut self, pos: u32) {
        debug_assert!(
            pos <= self.source_len,
            "cursor position {pos} out of bounds (max {})",
            self.source_len
        );
        self.pos = pos.min(self.source_len);
    }

    /// Length of the source content (excludes sentinel and padding).
    #[inline]
    pub fn source_len(&self) -> u32 {
        self.source_len
    }

    /// Source bytes from the start up to (excluding) the sentinel.
    #[inline]
    pub fn source_bytes(&self) -> &'a [u8] {
        &self.text.as_bytes()[..self.source_len as usize]
    }

    /// Extract a source substring as `&str`.
    ///
    /// # Contract
    ///
    /// `start..end` must fall within the source content and on character
    /// boundaries. Token boundaries reported by the tokenizer always do.
    pub fn slice(&self, start: u32, end: u32) -> &'a str {
        debug_assert!(
            end <= self.source_len,
            "slice end {end} exceeds source length {}",
            self.source_len
        );
        debug_assert!(start <= end, "slice start {start} exceeds end {end}");
        &self.text[start as usize..end as usize]
    }

    /// Extract a source substring from `start` to the current position.
    pub fn slice_from(&self, start: u32) -> &'a str {
        self.slice(start, self.pos)
    }

    /// Returns the character at the current position.
    ///
    /// At EOF this is the sentinel, `'\0'`.
    #[inline]
    pub fn current_char(&self) -> char {
        self.text[self.pos as usize..].chars().next().unwrap_or('\0')
    }

    /// Advance while `pred` returns `true` for the current byte.
    ///
    /// # Contract
    ///
    /// `pred(0)` must return `false`, so the sentinel terminates the loop.
    #[inline]
    pub fn eat_while(&mut self, pred: impl Fn(u8) -> bool) {
        while pred(self.current()) {
            self.pos += 1;
        }
    }

    /// Returns the number of bytes in the UTF-8 character starting with `byte`.
    ///
    /// - `0xC0..=0xDF`: 2 bytes
    /// - `0xE0..=0xEF`: 3 bytes
    /// - `0xF0..=0xF7`: 4 bytes
    /// - Everything else (ASCII, continuation, invalid): 1 byte
    #[inline]
    pub fn utf8_char_width(byte: u8) -> u32 {
        match byte {
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => 1,
        }
    }

    /// Advance the cursor past one full UTF-8 character.
    #[inline]
    pub fn advance_char(&mut self) {
        let width = Self::utf8_char_width(self.current());
        self.advance_n(width);
    }

    /// Advance past a run of CSS whitespace (space, tab, LF, CR, FF).
    ///
    /// The sentinel is not whitespace, so the loop stops at EOF.
    #[inline]
    pub fn eat_whitespace(&mut self) {
        self.eat_while(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'\x0C'));
    }

    /// Advance past the `*/` that closes a comment, or to EOF.
    ///
    /// Must be called with the opening `/*` already consumed.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "remaining.len() <= source_len which fits in u32"
    )]
    pub fn eat_comment_body(&mut self) {
        let remaining = &self.text.as_bytes()[self.pos as usize..self.source_len as usize];
        self.pos = match memchr::memmem::find(remaining, b"*/") {
            Some(offset) => self.pos + offset as u32 + 2,
            None => self.source_len,
        };
    }

    /// Advance past ordinary string content to the next interesting byte.
    /// Returns the byte found, or 0 for EOF.
    ///
    /// "Interesting" bytes for a string opened with `quote`: the quote
    /// itself, `\`, and the newlines LF, CR, FF. Interior NUL is ordinary
    /// content here.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "remaining.len() <= source_len which fits in u32"
    )]
    pub fn skip_to_string_delim(&mut self, quote: u8) -> u8 {
        let remaining = &self.text.as_bytes()[self.pos as usize..self.source_len as usize];
        let primary = memchr::memchr3(quote, b'\\', b'\n', remaining);
        let secondary = memchr::memchr2(b'\r', b'\x0C', remaining);

        if let Some(off) = earliest_of(primary, secondary) {
            self.pos += off as u32;
            self.current()
        } else {
            self.pos = self.source_len;
            0
        }
    }
}
