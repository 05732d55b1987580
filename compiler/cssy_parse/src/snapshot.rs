//! Parser snapshots for speculative parsing.
//!
//! A [`ParserState`] captures everything needed to rewind a [`Parser`]: the
//! tokenizer position and the pending block. Restoring a state replays the
//! same tokens, including the skip of a block that was pending at capture.
//!
//! # When to Use Each Approach
//!
//! - [`Parser::try_parse`]: attempt a parse and roll back automatically when
//!   the closure returns `Err`.
//! - [`Parser::look_ahead`]: run a closure and always roll back.
//! - [`Parser::state`] / [`Parser::reset`]: manual control, for example to
//!   try several alternatives from the same point.
//!
//! The var-function flag of the tokenizer is not part of the state.

use cssy_lexer::{BlockType, SourcePosition};
use tracing::debug;

use crate::Parser;

/// A lightweight snapshot of parser state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParserState {
    pub(crate) position: SourcePosition,
    pub(crate) pending_block: Option<BlockType>,
}

/// Size assertion: a state is a position plus one small enum.
const _: () = assert!(std::mem::size_of::<ParserState>() <= 8);

impl ParserState {
    /// The tokenizer position captured by this state.
    #[inline]
    pub fn position(&self) -> SourcePosition {
        self.position
    }
}

impl Parser<'_> {
    /// Capture the current state.
    #[inline]
    pub fn state(&self) -> ParserState {
        ParserState {
            position: self.tokenizer.position(),
            pending_block: self.pending_block,
        }
    }

    /// Restore a state captured from this parser.
    pub fn reset(&mut self, state: &ParserState) {
        self.tokenizer.reset(state.position);
        self.pending_block = state.pending_block;
    }

    /// Run `parse`, rewinding to the starting state if it fails.
    pub fn try_parse<T, E>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, E>,
    ) -> Result<T, E> {
        let start = self.state();
        let result = parse(self);
        if result.is_err() {
            debug!(
                from = self.tokenizer.position().offset(),
                to = start.position.offset(),
                "try_parse rollback"
            );
            self.reset(&start);
        }
        result
    }

    /// Run `probe` and rewind to the starting state afterwards.
    pub fn look_ahead<T>(&mut self, probe: impl FnOnce(&mut Self) -> T) -> T {
        let start = self.state();
        let result = probe(self);
        self.reset(&start);
        result
    }
}
