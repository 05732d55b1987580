//! Block-aware parser cursor for CSS.
//!
//! [`Parser`] pulls tokens from a [`cssy_lexer::Tokenizer`], optionally
//! filtering whitespace and comments, and skips the contents of any block the
//! caller does not explicitly enter. It is the layer higher-level CSS grammars
//! (rules, declarations, selectors) are written against.
//!
//! ```
//! use cssy_parse::{Parser, SourceBuffer, Token};
//!
//! let buf = SourceBuffer::new("a { color: red } b");
//! let mut parser = Parser::new(&buf);
//! assert!(parser.expect_ident().is_ok());
//! assert_eq!(parser.next(), Token::CurlyBracketBlock);
//! // Not entered: the whole block is skipped.
//! assert!(matches!(parser.next(), Token::Ident(name) if name == "b"));
//! ```

mod error;
mod parser;
mod snapshot;

pub use error::{ParseError, ParseResult};
pub use parser::Parser;
pub use snapshot::ParserState;

pub use cssy_lexer::{
    BlockType, NumericValue, SourceBuffer, SourceLocation, SourcePosition, Token, Tokenizer,
};
