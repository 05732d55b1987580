//! CSS Syntax tokenizer for cssy.
//!
//! Turns a stylesheet into a lazy stream of [`Token`]s following the CSS
//! Syntax Level 3 tokenization rules. Tokenization is total: malformed input
//! becomes `BadString` / `BadUrl` tokens and never fails.
//!
//! # Usage
//!
//! ```
//! use cssy_lexer::{SourceBuffer, Token, Tokenizer};
//!
//! let buf = SourceBuffer::new("a { color: red }");
//! let mut tokenizer = Tokenizer::new(&buf);
//! assert!(matches!(tokenizer.next_token(), Token::Ident(name) if name == "a"));
//! ```
//!
//! This crate has no cssy dependencies; the block-aware [`Parser`] lives in
//! `cssy_parse`.
//!
//! [`Parser`]: https://docs.rs/cssy_parse

mod cursor;
mod escape;
mod location;
mod source_buffer;
mod token;
mod tokenizer;

pub use cursor::Cursor;
pub use location::{SourceLocation, SourcePosition};
pub use source_buffer::SourceBuffer;
pub use token::{BlockType, NumericValue, Token};
pub use tokenizer::{tokenize, Tokenizer};
