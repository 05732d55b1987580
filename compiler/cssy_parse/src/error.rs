//! Parse error types.
//!
//! The tokenizer never fails; only the parser's `expect_*` helpers do. Each
//! error carries the location of the offending token so callers can report
//! it without re-scanning.

use std::borrow::Cow;

use cssy_lexer::{SourceLocation, Token};

/// Result of an `expect_*` helper.
pub type ParseResult<T> = Result<T, ParseError>;

/// A token the caller did not expect.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ParseError {
    /// A token was found, but not the one required.
    #[error("{location}: expected {expected}, found {}", .found.display_name())]
    UnexpectedToken {
        expected: Cow<'static, str>,
        found: Token<'static>,
        location: SourceLocation,
    },

    /// The input ended where a token was required.
    #[error("{location}: expected {expected}, found end of input")]
    EndOfInput {
        expected: Cow<'static, str>,
        location: SourceLocation,
    },

    /// Input remained where the caller required the end.
    #[error("{location}: expected end of input, found {}", .found.display_name())]
    NotExhausted {
        found: Token<'static>,
        location: SourceLocation,
    },
}

impl ParseError {
    /// Error for `found` appearing where `expected` was required.
    ///
    /// An EOF token becomes [`ParseError::EndOfInput`].
    pub fn unexpected(
        expected: impl Into<Cow<'static, str>>,
        found: Token<'_>,
        location: SourceLocation,
    ) -> Self {
        let expected = expected.into();
        match found {
            Token::EOF => Self::EndOfInput { expected, location },
            found => Self::UnexpectedToken {
                expected,
                found: found.into_owned(),
                location,
            },
        }
    }

    /// Error for input left over at `location`.
    pub fn not_exhausted(found: Token<'_>, location: SourceLocation) -> Self {
        Self::NotExhausted {
            found: found.into_owned(),
            location,
        }
    }

    /// Where the offending token starts.
    pub fn location(&self) -> SourceLocation {
        match self {
            Self::UnexpectedToken { location, .. }
            | Self::EndOfInput { location, .. }
            | Self::NotExhausted { location, .. } => *location,
        }
    }
}
