//! Token types produced by the [`Tokenizer`](crate::Tokenizer).
//!
//! Text payloads borrow from the source buffer when the token's value is a
//! verbatim slice of it, and own a decoded copy when escapes or NUL
//! substitution changed the text.

use std::borrow::Cow;

/// Numeric payload shared by `Number`, `Percentage` and `Dimension`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NumericValue {
    /// The value, accumulated digit by digit in `f64`.
    pub value: f64,
    /// The value saturated to `i32`, present iff the literal had neither a
    /// fractional part nor an exponent.
    pub int_value: Option<i32>,
    /// Whether the literal started with `+` or `-`.
    pub has_sign: bool,
}

impl NumericValue {
    /// Returns `true` if no fractional part and no exponent were consumed.
    #[inline]
    pub fn is_integer(&self) -> bool {
        self.int_value.is_some()
    }
}

/// One of the pieces a stylesheet is broken into.
#[allow(
    clippy::upper_case_acronyms,
    reason = "CDO, CDC and EOF are the names CSS Syntax uses"
)]
#[derive(Clone, Debug, PartialEq)]
pub enum Token<'a> {
    /// `<ident-token>`
    Ident(Cow<'a, str>),
    /// `<at-keyword-token>`; the value does not include the `@`.
    AtKeyword(Cow<'a, str>),
    /// `<hash-token>` with the "unrestricted" type flag; no `#` in the value.
    Hash(Cow<'a, str>),
    /// `<hash-token>` whose value is a valid identifier (usable as an ID selector).
    IDHash(Cow<'a, str>),
    /// `<string-token>`; the value does not include the quotes.
    QuotedString(Cow<'a, str>),
    /// `<url-token>`; the value does not include `url(` and `)`.
    ///
    /// `url( "..." )` is a `Function` token followed by a `QuotedString`.
    UnquotedUrl(Cow<'a, str>),
    /// `<function-token>`; the value does not include the `(`.
    Function(Cow<'a, str>),
    /// `<delim-token>`
    Delim(char),
    /// `<number-token>`
    Number(NumericValue),
    /// `<percentage-token>`; the value is not divided by 100.
    Percentage(NumericValue),
    /// `<dimension-token>` without its unit.
    ///
    /// The unit is produced by the following `next_token()` call as an `Ident`.
    Dimension(NumericValue),
    /// `<unicode-range-token>`: inclusive `start..=end`, not clamped to U+10FFFF.
    UnicodeRange { start: u32, end: u32 },
    /// A run of whitespace.
    Whitespace,
    /// `/* ... */`
    Comment,
    /// `:`
    Colon,
    /// `;`
    Semicolon,
    /// `,`
    Comma,
    /// `~=`
    IncludeMatch,
    /// `|=`
    DashMatch,
    /// `^=`
    PrefixMatch,
    /// `$=`
    SuffixMatch,
    /// `*=`
    SubstringMatch,
    /// `||`
    Column,
    /// `<!--`
    CDO,
    /// `-->`
    CDC,
    /// `(`
    ParenthesisBlock,
    /// `[`
    SquareBracketBlock,
    /// `{`
    CurlyBracketBlock,
    /// A `url(` that could not be tokenized as an `UnquotedUrl`.
    BadUrl,
    /// A string interrupted by an unescaped newline.
    BadString,
    /// `)`
    CloseParenthesis,
    /// `]`
    CloseSquareBracket,
    /// `}`
    CloseCurlyBracket,
    /// End of input. Returned again on every call once reached.
    EOF,
}

impl Token<'_> {
    /// Returns `true` for tokens that always indicate a parse error in CSS
    /// Syntax: `BadUrl`, `BadString`, and unmatched closers.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Token::BadUrl
                | Token::BadString
                | Token::CloseParenthesis
                | Token::CloseSquareBracket
                | Token::CloseCurlyBracket
        )
    }

    /// Returns `true` for `Whitespace` and `Comment`.
    pub fn is_trivia(&self) -> bool {
        matches!(self, Token::Whitespace | Token::Comment)
    }

    /// Short human-readable description, used in error messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            Token::Ident(_) => "identifier",
            Token::AtKeyword(_) => "at-keyword",
            Token::Hash(_) | Token::IDHash(_) => "hash",
            Token::QuotedString(_) => "string",
            Token::UnquotedUrl(_) => "url",
            Token::Function(_) => "function",
            Token::Delim(_) => "delimiter",
            Token::Number(_) => "number",
            Token::Percentage(_) => "percentage",
            Token::Dimension(_) => "dimension",
            Token::UnicodeRange { .. } => "unicode-range",
            Token::Whitespace => "whitespace",
            Token::Comment => "comment",
            Token::Colon => "`:`",
            Token::Semicolon => "`;`",
            Token::Comma => "`,`",
            Token::IncludeMatch => "`~=`",
            Token::DashMatch => "`|=`",
            Token::PrefixMatch => "`^=`",
            Token::SuffixMatch => "`$=`",
            Token::SubstringMatch => "`*=`",
            Token::Column => "`||`",
            Token::CDO => "`<!--`",
            Token::CDC => "`-->`",
            Token::ParenthesisBlock => "`(`",
            Token::SquareBracketBlock => "`[`",
            Token::CurlyBracketBlock => "`{`",
            Token::BadUrl => "bad url",
            Token::BadString => "bad string",
            Token::CloseParenthesis => "`)`",
            Token::CloseSquareBracket => "`]`",
            Token::CloseCurlyBracket => "`}`",
            Token::EOF => "end of input",
        }
    }

    /// Detach the token from the source buffer.
    pub fn into_owned(self) -> Token<'static> {
        fn own(text: Cow<'_, str>) -> Cow<'static, str> {
            Cow::Owned(text.into_owned())
        }
        match self {
            Token::Ident(s) => Token::Ident(own(s)),
            Token::AtKeyword(s) => Token::AtKeyword(own(s)),
            Token::Hash(s) => Token::Hash(own(s)),
            Token::IDHash(s) => Token::IDHash(own(s)),
            Token::QuotedString(s) => Token::QuotedString(own(s)),
            Token::UnquotedUrl(s) => Token::UnquotedUrl(own(s)),
            Token::Function(s) => Token::Function(own(s)),
            Token::Delim(c) => Token::Delim(c),
            Token::Number(n) => Token::Number(n),
            Token::Percentage(n) => Token::Percentage(n),
            Token::Dimension(n) => Token::Dimension(n),
            Token::UnicodeRange { start, end } => Token::UnicodeRange { start, end },
            Token::Whitespace => Token::Whitespace,
            Token::Comment => Token::Comment,
            Token::Colon => Token::Colon,
            Token::Semicolon => Token::Semicolon,
            Token::Comma => Token::Comma,
            Token::IncludeMatch => Token::IncludeMatch,
            Token::DashMatch => Token::DashMatch,
            Token::PrefixMatch => Token::PrefixMatch,
            Token::SuffixMatch => Token::SuffixMatch,
            Token::SubstringMatch => Token::SubstringMatch,
            Token::Column => Token::Column,
            Token::CDO => Token::CDO,
            Token::CDC => Token::CDC,
            Token::ParenthesisBlock => Token::ParenthesisBlock,
            Token::SquareBracketBlock => Token::SquareBracketBlock,
            Token::CurlyBracketBlock => Token::CurlyBracketBlock,
            Token::BadUrl => Token::BadUrl,
            Token::BadString => Token::BadString,
            Token::CloseParenthesis => Token::CloseParenthesis,
            Token::CloseSquareBracket => Token::CloseSquareBracket,
            Token::CloseCurlyBracket => Token::CloseCurlyBracket,
            Token::EOF => Token::EOF,
        }
    }
}

/// The three kinds of nested block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockType {
    /// `(` ... `)`, also opened by `Function` tokens.
    Parenthesis,
    /// `[` ... `]`
    SquareBracket,
    /// `{` ... `}`
    CurlyBracket,
}

impl BlockType {
    /// The block a token opens, if any.
    ///
    /// `Function` opens a parenthesis block: its arguments run to the
    /// matching `)`.
    pub fn opening(token: &Token<'_>) -> Option<BlockType> {
        match token {
            Token::Function(_) | Token::ParenthesisBlock => Some(BlockType::Parenthesis),
            Token::SquareBracketBlock => Some(BlockType::SquareBracket),
            Token::CurlyBracketBlock => Some(BlockType::CurlyBracket),
            _ => None,
        }
    }

    /// The block a token closes, if any.
    pub fn closing(token: &Token<'_>) -> Option<BlockType> {
        match token {
            Token::CloseParenthesis => Some(BlockType::Parenthesis),
            Token::CloseSquareBracket => Some(BlockType::SquareBracket),
            Token::CloseCurlyBracket => Some(BlockType::CurlyBracket),
            _ => None,
        }
    }

    /// The closing token for this block type.
    pub fn closer(self) -> Token<'static> {
        match self {
            BlockType::Parenthesis => Token::CloseParenthesis,
            BlockType::SquareBracket => Token::CloseSquareBracket,
            BlockType::CurlyBracket => Token::CloseCurlyBracket,
        }
    }
}
