//! Source positions and line/column lookup.
//!
//! Locations are computed on demand from byte offsets. [`LineCache`] keeps the
//! last computed line breakpoint so that the usual pattern (queries at
//! increasing offsets while tokenizing) scans each byte once. A query before
//! the breakpoint rescans from the start of the input; results never depend on
//! query order.

use std::cell::Cell;
use std::fmt;

/// A byte offset into the tokenizer's input.
///
/// Obtained from [`Tokenizer::position()`](crate::Tokenizer::position) and only
/// meaningful for the tokenizer that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourcePosition(pub(crate) u32);

impl SourcePosition {
    /// The byte offset from the start of the input.
    #[inline]
    pub fn offset(self) -> u32 {
        self.0
    }
}

/// A 1-based line and column.
///
/// The column is the byte offset within the line plus one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The line containing `offset` and the offset where that line starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Breakpoint {
    offset: u32,
    line: u32,
    line_start: u32,
}

/// Memo of the most recent line breakpoint.
#[derive(Clone, Debug)]
pub(crate) struct LineCache {
    first_line: u32,
    memo: Cell<Breakpoint>,
}

impl LineCache {
    pub(crate) fn new(first_line: u32) -> Self {
        Self {
            first_line,
            memo: Cell::new(Breakpoint {
                offset: 0,
                line: first_line,
                line_start: 0,
            }),
        }
    }

    /// Line and column of `offset` within `source`.
    ///
    /// Offsets past the end of `source` are clamped to it.
    pub(crate) fn locate(&self, source: &[u8], offset: u32) -> SourceLocation {
        let offset = offset.min(u32::try_from(source.len()).unwrap_or(u32::MAX));
        let mut from = self.memo.get();
        if offset < from.offset {
            from = Breakpoint {
                offset: 0,
                line: self.first_line,
                line_start: 0,
            };
        }
        let bp = scan_lines(source, from, offset);
        self.memo.set(bp);
        SourceLocation {
            line: bp.line,
            column: offset - bp.line_start + 1,
        }
    }
}

/// Advance `bp` over `source[bp.offset..offset]`, counting line terminators.
///
/// LF, CR and FF each end a line; the LF of a CR LF pair only moves the line
/// start, so a breakpoint that lands between CR and LF gives the same answer
/// as a scan from the beginning.
#[allow(
    clippy::cast_possible_truncation,
    reason = "offsets are bounded by source length, which fits in u32"
)]
fn scan_lines(source: &[u8], mut bp: Breakpoint, offset: u32) -> Breakpoint {
    let end = offset as usize;
    let mut from = bp.offset as usize;
    while let Some(i) = memchr::memchr3(b'\n', b'\r', b'\x0C', &source[from..end]) {
        let at = from + i;
        let crlf_tail = source[at] == b'\n' && at > 0 && source[at - 1] == b'\r';
        if !crlf_tail {
            bp.line = bp.line.saturating_add(1);
        }
        bp.line_start = (at + 1) as u32;
        from = at + 1;
    }
    bp.offset = offset;
    bp
}
