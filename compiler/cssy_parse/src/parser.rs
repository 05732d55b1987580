//! Block-aware token parser.
//!
//! Wraps a [`Tokenizer`] and enforces the nesting discipline of CSS blocks:
//! when a block-opening token is returned, the next pull skips the whole
//! block unless the caller calls [`Parser::enter_block`] first.

use std::borrow::Cow;

use cssy_lexer::{BlockType, SourceBuffer, SourceLocation, SourcePosition, Token, Tokenizer};
use smallvec::{smallvec, SmallVec};
use tracing::trace;

use crate::error::{ParseError, ParseResult};

/// Nesting depth kept inline while skipping a block.
const INLINE_BLOCK_DEPTH: usize = 16;

/// Pull parser over one stylesheet.
///
/// Produces tokens in three flavours: raw, comments filtered, or whitespace
/// and comments filtered. Block contents are skipped unless entered.
#[derive(Clone, Debug)]
pub struct Parser<'a> {
    pub(crate) tokenizer: Tokenizer<'a>,
    /// Block opened by the last returned token and not yet entered.
    pub(crate) pending_block: Option<BlockType>,
}

impl<'a> Parser<'a> {
    /// Create a parser at the start of `source`.
    pub fn new(source: &'a SourceBuffer) -> Self {
        Self::from_tokenizer(Tokenizer::new(source))
    }

    /// Create a parser over an already configured tokenizer.
    pub fn from_tokenizer(tokenizer: Tokenizer<'a>) -> Self {
        Self {
            tokenizer,
            pending_block: None,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Token Pulls
    // ─────────────────────────────────────────────────────────────────────────

    /// The next token, whitespace and comments included.
    pub fn next_including_whitespace_and_comments(&mut self) -> Token<'a> {
        self.skip_pending_block();
        self.pull()
    }

    /// The next token that is not a comment.
    pub fn next_including_whitespace(&mut self) -> Token<'a> {
        loop {
            let token = self.next_including_whitespace_and_comments();
            if !matches!(token, Token::Comment) {
                return token;
            }
        }
    }

    /// The next token that is neither whitespace nor a comment.
    ///
    /// Returns `Token::EOF` at the end of input, repeatedly.
    #[allow(
        clippy::should_implement_trait,
        reason = "EOF is a token here, not the end of an iterator"
    )]
    pub fn next(&mut self) -> Token<'a> {
        loop {
            let token = self.next_including_whitespace_and_comments();
            if !token.is_trivia() {
                return token;
            }
        }
    }

    /// Like [`next()`](Self::next), also returning where the token starts.
    pub(crate) fn next_located(&mut self) -> (Token<'a>, SourceLocation) {
        loop {
            self.skip_pending_block();
            let start = self.tokenizer.position();
            let token = self.pull();
            if !token.is_trivia() {
                return (token, self.tokenizer.source_location(start));
            }
        }
    }

    /// Read one token and record the block it opens.
    fn pull(&mut self) -> Token<'a> {
        let token = self.tokenizer.next_token();
        self.pending_block = BlockType::opening(&token);
        trace!(
            pos = self.tokenizer.position().offset(),
            kind = token.display_name(),
            parse_error = token.is_parse_error(),
            "next token"
        );
        token
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Blocks
    // ─────────────────────────────────────────────────────────────────────────

    /// The block opened by the last returned token, if it has not been
    /// entered or skipped yet.
    #[inline]
    pub fn pending_block(&self) -> Option<BlockType> {
        self.pending_block
    }

    /// Enter the pending block instead of skipping it.
    ///
    /// Subsequent pulls return the block's contents, then its closer, as
    /// ordinary tokens. Returns `None` if no block is pending.
    pub fn enter_block(&mut self) -> Option<BlockType> {
        self.pending_block.take()
    }

    /// Discard the rest of the pending block, through its matching closer.
    ///
    /// A closer only ends a block of its own kind; any other closer is
    /// content. EOF ends every open block.
    fn skip_pending_block(&mut self) {
        let Some(block) = self.pending_block.take() else {
            return;
        };
        trace!(?block, pos = self.tokenizer.position().offset(), "skip block");
        let mut open: SmallVec<[BlockType; INLINE_BLOCK_DEPTH]> = smallvec![block];
        while let Some(&innermost) = open.last() {
            let token = self.tokenizer.next_token();
            if matches!(token, Token::EOF) {
                break;
            }
            if let Some(nested) = BlockType::opening(&token) {
                open.push(nested);
            } else if token == innermost.closer() {
                open.pop();
            } else if let Some(other) = BlockType::closing(&token) {
                trace!(?other, ?innermost, "mismatched closer kept as content");
            }
        }
        trace!(pos = self.tokenizer.position().offset(), "skip block done");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Expectations
    // ─────────────────────────────────────────────────────────────────────────

    /// Consume an identifier and return its value.
    pub fn expect_ident(&mut self) -> ParseResult<Cow<'a, str>> {
        match self.next_located() {
            (Token::Ident(name), _) => Ok(name),
            (found, location) => Err(ParseError::unexpected("identifier", found, location)),
        }
    }

    /// Consume an identifier equal to `name`, ignoring ASCII case.
    pub fn expect_ident_matching(&mut self, name: &str) -> ParseResult<()> {
        match self.next_located() {
            (Token::Ident(ident), _) if ident.eq_ignore_ascii_case(name) => Ok(()),
            (found, location) => Err(ParseError::unexpected(format!("`{name}`"), found, location)),
        }
    }

    /// Consume a `:`.
    pub fn expect_colon(&mut self) -> ParseResult<()> {
        self.expect_token(&Token::Colon)
    }

    /// Consume a `;`.
    pub fn expect_semicolon(&mut self) -> ParseResult<()> {
        self.expect_token(&Token::Semicolon)
    }

    /// Consume a `,`.
    pub fn expect_comma(&mut self) -> ParseResult<()> {
        self.expect_token(&Token::Comma)
    }

    /// Consume the delimiter `c`.
    pub fn expect_delim(&mut self, c: char) -> ParseResult<()> {
        match self.next_located() {
            (Token::Delim(found), _) if found == c => Ok(()),
            (found, location) => Err(ParseError::unexpected(format!("`{c}`"), found, location)),
        }
    }

    /// Succeed if only whitespace and comments remain.
    ///
    /// The position is left unchanged either way.
    pub fn expect_exhausted(&mut self) -> ParseResult<()> {
        self.look_ahead(|p| match p.next_located() {
            (Token::EOF, _) => Ok(()),
            (found, location) => Err(ParseError::not_exhausted(found, location)),
        })
    }

    /// Returns `true` if only whitespace and comments remain.
    pub fn is_exhausted(&mut self) -> bool {
        self.look_ahead(|p| matches!(p.next(), Token::EOF))
    }

    /// Consume a token equal to `expected` (a payload-free kind).
    fn expect_token(&mut self, expected: &Token<'static>) -> ParseResult<()> {
        match self.next_located() {
            (found, _) if found == *expected => Ok(()),
            (found, location) => Err(ParseError::unexpected(
                expected.display_name(),
                found,
                location,
            )),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Tokenizer Pass-through
    // ─────────────────────────────────────────────────────────────────────────

    /// The current position of the underlying tokenizer.
    #[inline]
    pub fn position(&self) -> SourcePosition {
        self.tokenizer.position()
    }

    /// Line and column of the current position.
    pub fn current_source_location(&self) -> SourceLocation {
        self.tokenizer.current_source_location()
    }

    /// Line and column of `position`.
    pub fn source_location(&self, position: SourcePosition) -> SourceLocation {
        self.tokenizer.source_location(position)
    }

    /// The text of the line containing the current position.
    pub fn current_source_line(&self) -> &'a str {
        self.tokenizer.current_source_line()
    }

    /// Source text from `start` to the current position.
    pub fn slice_from(&self, start: SourcePosition) -> &'a str {
        self.tokenizer.slice_from(start)
    }

    /// Start watching for `var(` functions; see
    /// [`Tokenizer::arm_var_functions`].
    pub fn arm_var_functions(&mut self) {
        self.tokenizer.arm_var_functions();
    }

    /// Returns whether a `var(` was seen since arming, and disarms.
    pub fn check_var_functions(&mut self) -> bool {
        self.tokenizer.check_var_functions()
    }
}
