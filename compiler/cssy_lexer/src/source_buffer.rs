//! Sentinel-terminated source buffer for bounds-check-free lookahead.
//!
//! The buffer guarantees a `0x00` sentinel byte after the stylesheet text,
//! followed by zero padding up to the next 64-byte boundary. The tokenizer
//! needs up to [`MAX_LOOKAHEAD`] bytes of lookahead (`<!--` is the longest
//! fixed prefix), so the padding always covers at least that many bytes past
//! the sentinel and `peek_at()` never reads outside the allocation.
//!
//! # Interior NUL
//!
//! CSS gives U+0000 a meaning (it is replaced by U+FFFD inside names, strings
//! and URLs), so NUL bytes are not rejected here. The cursor tells an interior
//! NUL apart from the sentinel by comparing the position with the source length.

use crate::Cursor;

/// Cache line size in bytes, used for buffer alignment padding.
const CACHE_LINE: usize = 64;

/// Largest number of bytes the tokenizer looks past the current byte.
pub(crate) const MAX_LOOKAHEAD: usize = 3;

/// Sentinel-terminated, cache-line padded copy of a stylesheet.
///
/// # Layout
///
/// ```text
/// [source_bytes..., 0x00, padding_zeros...]
///  ^                ^     ^
///  0                |     rounded up to 64-byte boundary
///              source_len (sentinel)
/// ```
///
/// The buffer is stored as a `String`: NUL is valid UTF-8, so the padded
/// buffer stays a `str` and source slices never need re-validation.
#[derive(Clone, Debug)]
pub struct SourceBuffer {
    /// Owned buffer: `[source..., '\0' sentinel, '\0' padding...]`.
    buf: String,
    /// Length of the actual source content (excludes sentinel and padding).
    source_len: u32,
}

impl SourceBuffer {
    /// Create a new sentinel-terminated buffer from stylesheet text.
    ///
    /// # File Size
    ///
    /// Sources larger than `u32::MAX` bytes (~4 GiB) are accepted but the
    /// `source_len` field saturates at `u32::MAX`; the tail is never tokenized.
    pub fn new(source: &str) -> Self {
        let source_len = source.len();

        // Round up to the next 64-byte boundary, keeping room for the sentinel
        // plus the lookahead window.
        let padded_len = (source_len + 1 + MAX_LOOKAHEAD + CACHE_LINE - 1) & !(CACHE_LINE - 1);

        let mut buf = String::with_capacity(padded_len);
        buf.push_str(source);
        buf.extend(std::iter::repeat_n('\0', padded_len - source_len));

        Self {
            buf,
            source_len: u32::try_from(source_len).unwrap_or(u32::MAX),
        }
    }

    /// Returns the stylesheet text (without sentinel or padding).
    pub fn as_str(&self) -> &str {
        &self.buf[..self.source_len as usize]
    }

    /// Returns the source bytes (without sentinel or padding).
    pub fn as_bytes(&self) -> &[u8] {
        self.as_str().as_bytes()
    }

    /// Returns the full buffer including sentinel and cache-line padding.
    ///
    /// The byte at index [`len()`](Self::len) is the sentinel (`0x00`).
    pub fn as_sentinel_bytes(&self) -> &[u8] {
        self.buf.as_bytes()
    }

    /// Create a [`Cursor`] positioned at byte 0.
    pub fn cursor(&self) -> Cursor<'_> {
        Cursor::new(&self.buf, self.source_len)
    }

    /// Length of the source content in bytes (excludes sentinel and padding).
    pub fn len(&self) -> u32 {
        self.source_len
    }

    /// Returns `true` if the source content is empty.
    pub fn is_empty(&self) -> bool {
        self.source_len == 0
    }
}

impl From<&str> for SourceBuffer {
    fn from(source: &str) -> Self {
        Self::new(source)
    }
}
