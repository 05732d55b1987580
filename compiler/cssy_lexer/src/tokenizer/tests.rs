use std::borrow::Cow;

use pretty_assertions::assert_eq;

use super::*;

/// Helper: tokenize a source string and collect all tokens (excluding EOF).
fn lex(source: &str) -> Vec<Token<'static>> {
    tokenize(source)
}

fn ident(name: &str) -> Token<'_> {
    Token::Ident(Cow::Borrowed(name))
}

fn string(value: &str) -> Token<'_> {
    Token::QuotedString(Cow::Borrowed(value))
}

fn url(value: &str) -> Token<'_> {
    Token::UnquotedUrl(Cow::Borrowed(value))
}

fn function(name: &str) -> Token<'_> {
    Token::Function(Cow::Borrowed(name))
}

fn number(value: f64, int_value: Option<i32>, has_sign: bool) -> NumericValue {
    NumericValue {
        value,
        int_value,
        has_sign,
    }
}

/// Helper: the first token of `source`, or `EOF`.
fn first(source: &str) -> Token<'static> {
    lex(source).into_iter().next().unwrap_or(Token::EOF)
}

// ─── Whitespace & Punctuation ──────────────────────────────────

#[test]
fn empty_input_is_eof() {
    assert!(lex("").is_empty());
}

#[test]
fn whitespace_run_is_one_token() {
    assert_eq!(lex(" \t\n\r\x0C  a"), vec![Token::Whitespace, ident("a")]);
}

#[test]
fn ident_then_colon() {
    assert_eq!(lex("foo:"), vec![ident("foo"), Token::Colon]);
}

#[test]
fn fixed_punctuators() {
    assert_eq!(
        lex(":;,()[]{}"),
        vec![
            Token::Colon,
            Token::Semicolon,
            Token::Comma,
            Token::ParenthesisBlock,
            Token::CloseParenthesis,
            Token::SquareBracketBlock,
            Token::CloseSquareBracket,
            Token::CurlyBracketBlock,
            Token::CloseCurlyBracket,
        ]
    );
}

#[test]
fn match_operators() {
    assert_eq!(
        lex("~=|=^=$=*=||"),
        vec![
            Token::IncludeMatch,
            Token::DashMatch,
            Token::PrefixMatch,
            Token::SuffixMatch,
            Token::SubstringMatch,
            Token::Column,
        ]
    );
}

#[test]
fn lone_operator_characters_are_delims() {
    assert_eq!(
        lex("~|^$*"),
        vec![
            Token::Delim('~'),
            Token::Delim('|'),
            Token::Delim('^'),
            Token::Delim('$'),
            Token::Delim('*'),
        ]
    );
}

#[test]
fn cdo_and_cdc() {
    assert_eq!(
        lex("<!-- -->"),
        vec![Token::CDO, Token::Whitespace, Token::CDC]
    );
    assert_eq!(lex("<!-"), vec![Token::Delim('<'), Token::Delim('!'), Token::Delim('-')]);
}

#[test]
fn non_ascii_is_a_single_delim() {
    assert_eq!(lex("\u{E9}"), vec![Token::Delim('\u{E9}')]);
    assert_eq!(lex("\u{1F600}a"), vec![Token::Delim('\u{1F600}'), ident("a")]);
}

// ─── Comments ──────────────────────────────────────────────────

#[test]
fn comment_then_ident() {
    assert_eq!(lex("/* x */a"), vec![Token::Comment, ident("a")]);
}

#[test]
fn unterminated_comment_runs_to_eof() {
    assert_eq!(lex("/* x"), vec![Token::Comment]);
}

#[test]
fn lone_slash_is_delim() {
    assert_eq!(lex("/a"), vec![Token::Delim('/'), ident("a")]);
}

// ─── Numbers ───────────────────────────────────────────────────

#[test]
fn integer_number() {
    assert_eq!(first("42"), Token::Number(number(42.0, Some(42), false)));
}

#[test]
fn fractional_number_is_not_integer() {
    assert_eq!(first("2.50"), Token::Number(number(2.5, None, false)));
}

#[test]
fn exponent_forces_non_integer() {
    assert_eq!(first("2e2"), Token::Number(number(200.0, None, false)));
}

#[test]
fn signed_numbers() {
    assert_eq!(first("-7"), Token::Number(number(-7.0, Some(-7), true)));
    assert_eq!(first("+.5"), Token::Number(number(0.5, None, true)));
}

#[test]
fn trailing_dot_is_not_a_decimal_point() {
    assert_eq!(
        lex("1."),
        vec![Token::Number(number(1.0, Some(1), false)), Token::Delim('.')]
    );
}

#[test]
fn leading_dot_number() {
    assert_eq!(first(".5"), Token::Number(number(0.5, None, false)));
}

#[test]
fn integer_value_saturates() {
    assert_eq!(
        first("99999999999"),
        Token::Number(number(99_999_999_999.0, Some(i32::MAX), false))
    );
    assert_eq!(
        first("-99999999999"),
        Token::Number(number(-99_999_999_999.0, Some(i32::MIN), true))
    );
}

#[test]
fn percentage() {
    assert_eq!(lex("10%"), vec![Token::Percentage(number(10.0, Some(10), false))]);
}

#[test]
fn dimension_leaves_unit_for_next_call() {
    assert_eq!(
        lex("10px"),
        vec![Token::Dimension(number(10.0, Some(10), false)), ident("px")]
    );
}

#[test]
fn exponent_without_digits_is_a_unit() {
    assert_eq!(
        lex("1em"),
        vec![Token::Dimension(number(1.0, Some(1), false)), ident("em")]
    );
    assert_eq!(
        lex("1e+x"),
        vec![
            Token::Dimension(number(1.0, Some(1), false)),
            ident("e"),
            Token::Delim('+'),
            ident("x"),
        ]
    );
}

#[test]
fn sign_without_digit_is_delim() {
    assert_eq!(lex("+a"), vec![Token::Delim('+'), ident("a")]);
    assert_eq!(lex("- "), vec![Token::Delim('-'), Token::Whitespace]);
}

// ─── Identifiers ───────────────────────────────────────────────

#[test]
fn identifier_starts() {
    assert_eq!(lex("_x"), vec![ident("_x")]);
    assert_eq!(lex("-foo"), vec![ident("-foo")]);
    assert_eq!(lex("--"), vec![ident("--")]);
    assert_eq!(lex("--x"), vec![ident("--x")]);
}

#[test]
fn identifier_continues_through_non_ascii() {
    assert_eq!(lex("a\u{E9}b c"), vec![ident("a\u{E9}b"), Token::Whitespace, ident("c")]);
}

#[test]
fn identifier_escapes_are_decoded() {
    assert_eq!(lex("\\41 b"), vec![ident("Ab")]);
    assert_eq!(lex("a\\.b"), vec![ident("a.b")]);
}

#[test]
fn identifier_nul_is_replaced() {
    assert_eq!(lex("a\0b"), vec![ident("a\u{FFFD}b")]);
    assert_eq!(lex("\0"), vec![ident("\u{FFFD}")]);
}

#[test]
fn backslash_at_eof_is_replacement() {
    assert_eq!(lex("a\\"), vec![ident("a\u{FFFD}")]);
}

#[test]
fn backslash_before_newline_is_delim() {
    assert_eq!(lex("\\\n"), vec![Token::Delim('\\'), Token::Whitespace]);
    assert_eq!(lex("a\\\n"), vec![ident("a"), Token::Delim('\\'), Token::Whitespace]);
}

#[test]
fn plain_identifier_borrows_source() {
    assert!(matches!(lex("color").as_slice(), [Token::Ident(Cow::Owned(_))]));
    let buf = SourceBuffer::new("color");
    let mut tokenizer = Tokenizer::new(&buf);
    assert!(matches!(tokenizer.next_token(), Token::Ident(Cow::Borrowed("color"))));
}

#[test]
fn functions() {
    assert_eq!(
        lex("rgb(1)"),
        vec![
            function("rgb"),
            Token::Number(number(1.0, Some(1), false)),
            Token::CloseParenthesis,
        ]
    );
}

#[test]
fn at_keywords() {
    assert_eq!(
        lex("@media"),
        vec![Token::AtKeyword(Cow::Borrowed("media"))]
    );
    assert_eq!(lex("@-x"), vec![Token::AtKeyword(Cow::Borrowed("-x"))]);
    assert_eq!(lex("@ "), vec![Token::Delim('@'), Token::Whitespace]);
}

// ─── Hashes ────────────────────────────────────────────────────

#[test]
fn hash_classification() {
    assert_eq!(lex("#red0"), vec![Token::IDHash(Cow::Borrowed("red0"))]);
    assert_eq!(lex("#0red"), vec![Token::Hash(Cow::Borrowed("0red"))]);
    assert_eq!(
        lex("#.red"),
        vec![Token::Delim('#'), Token::Delim('.'), ident("red")]
    );
}

#[test]
fn hash_with_dash_and_digit() {
    assert_eq!(lex("#-1"), vec![Token::Hash(Cow::Borrowed("-1"))]);
    assert_eq!(lex("#-a"), vec![Token::IDHash(Cow::Borrowed("-a"))]);
}

#[test]
fn hash_at_eof_is_delim() {
    assert_eq!(lex("#"), vec![Token::Delim('#')]);
}

// ─── Strings ───────────────────────────────────────────────────

#[test]
fn quoted_strings() {
    assert_eq!(lex("'abc'"), vec![string("abc")]);
    assert_eq!(lex("\"a'b\""), vec![string("a'b")]);
}

#[test]
fn string_escapes() {
    assert_eq!(lex(r#""a\"b""#), vec![string("a\"b")]);
    assert_eq!(lex(r"'\41 x'"), vec![string("Ax")]);
}

#[test]
fn escaped_newline_is_dropped() {
    assert_eq!(lex("'a\\\nb'"), vec![string("ab")]);
    assert_eq!(lex("'a\\\r\nb'"), vec![string("ab")]);
}

#[test]
fn unterminated_string_at_eof() {
    assert_eq!(lex("'abc"), vec![string("abc")]);
    assert_eq!(lex("'a\\"), vec![string("a")]);
}

#[test]
fn newline_in_string_is_bad_string() {
    assert_eq!(
        lex("'ab\ncd'"),
        vec![Token::BadString, Token::Whitespace, ident("cd"), string("")]
    );
}

#[test]
fn string_nul_kept_before_first_escape() {
    assert_eq!(lex("'a\0b'"), vec![string("a\0b")]);
    assert_eq!(lex("'\\41\0'"), vec![string("A\u{FFFD}")]);
}

// ─── URLs ──────────────────────────────────────────────────────

#[test]
fn unquoted_urls() {
    assert_eq!(lex("url(abc)"), vec![url("abc")]);
    assert_eq!(lex("url( abc )"), vec![url("abc")]);
    assert_eq!(lex("URL(x)"), vec![url("x")]);
}

#[test]
fn empty_urls() {
    assert_eq!(lex("url()"), vec![url("")]);
    assert_eq!(lex("url(  )"), vec![url("")]);
    assert_eq!(lex("url("), vec![url("")]);
}

#[test]
fn url_escapes() {
    assert_eq!(lex(r"url(a\29)"), vec![url("a)")]);
    assert_eq!(lex("url(a\0)"), vec![url("a\u{FFFD}")]);
}

#[test]
fn unterminated_url_at_eof() {
    assert_eq!(lex("url(abc"), vec![url("abc")]);
    assert_eq!(lex("url(abc  "), vec![url("abc")]);
}

#[test]
fn bad_urls() {
    assert_eq!(lex("url(abc')"), vec![Token::BadUrl]);
    assert_eq!(lex("url(a b)"), vec![Token::BadUrl]);
    assert_eq!(lex("url(a(b)"), vec![Token::BadUrl]);
    assert_eq!(lex("url(a\\\nb)"), vec![Token::BadUrl]);
}

#[test]
fn control_bytes_make_bad_urls() {
    let controls = (0x01u8..=0x08).chain([0x0B]).chain(0x0E..=0x1F).chain([0x7F]);
    for byte in controls {
        let source = format!("url(a{}b) x", char::from(byte));
        assert_eq!(
            lex(&source),
            vec![Token::BadUrl, Token::Whitespace, ident("x")],
            "control byte {byte:#04x}"
        );
    }
}

#[test]
fn form_feed_ends_url_as_whitespace() {
    assert_eq!(lex("url(a\x0C)"), vec![url("a")]);
}

#[test]
fn bad_url_recovery_skips_escaped_paren() {
    assert_eq!(
        lex(r"url(a b\)) x"),
        vec![Token::BadUrl, Token::Whitespace, ident("x")]
    );
}

#[test]
fn quoted_url_is_a_function() {
    assert_eq!(
        lex("url('a')"),
        vec![function("url"), string("a"), Token::CloseParenthesis]
    );
    assert_eq!(
        lex("url(  \"a\")"),
        vec![
            function("url"),
            Token::Whitespace,
            string("a"),
            Token::CloseParenthesis,
        ]
    );
}

#[test]
fn quoted_url_resumes_after_paren() {
    let buf = SourceBuffer::new("url(  'a')");
    let mut tokenizer = Tokenizer::new(&buf);
    assert_eq!(tokenizer.next_token(), function("url"));
    assert_eq!(tokenizer.position().offset(), 4);
}

// ─── Unicode Ranges ────────────────────────────────────────────

#[test]
fn unicode_range_wildcards() {
    assert_eq!(lex("u+10?"), vec![Token::UnicodeRange { start: 256, end: 271 }]);
    assert_eq!(
        lex("U+??????"),
        vec![Token::UnicodeRange {
            start: 0,
            end: 0x00FF_FFFF
        }]
    );
}

#[test]
fn unicode_range_explicit_end() {
    assert_eq!(lex("u+1-a"), vec![Token::UnicodeRange { start: 1, end: 10 }]);
    assert_eq!(
        lex("u+0-10FFFF"),
        vec![Token::UnicodeRange {
            start: 0,
            end: 0x0010_FFFF
        }]
    );
}

#[test]
fn unicode_range_is_not_clamped() {
    assert_eq!(
        lex("u+110000"),
        vec![Token::UnicodeRange {
            start: 0x0011_0000,
            end: 0x0011_0000
        }]
    );
}

#[test]
fn u_plus_without_digits_is_ident() {
    assert_eq!(lex("u+"), vec![ident("u"), Token::Delim('+')]);
    assert_eq!(lex("u+x"), vec![ident("u"), Token::Delim('+'), ident("x")]);
}

// ─── var() Detection ───────────────────────────────────────────

#[test]
fn var_function_seen_while_armed() {
    let buf = SourceBuffer::new("calc(var(--x) + 1)");
    let mut tokenizer = Tokenizer::new(&buf);
    tokenizer.arm_var_functions();
    while tokenizer.next_token() != Token::EOF {}
    assert!(tokenizer.check_var_functions());
    assert!(!tokenizer.check_var_functions());
}

#[test]
fn var_function_match_is_case_insensitive() {
    let buf = SourceBuffer::new("VAR(--x)");
    let mut tokenizer = Tokenizer::new(&buf);
    tokenizer.arm_var_functions();
    tokenizer.next_token();
    assert!(tokenizer.check_var_functions());
}

#[test]
fn var_function_ignored_when_not_armed() {
    let buf = SourceBuffer::new("var(--x)");
    let mut tokenizer = Tokenizer::new(&buf);
    tokenizer.next_token();
    assert!(!tokenizer.check_var_functions());
}

#[test]
fn armed_without_var_reports_false() {
    let buf = SourceBuffer::new("calc(1px)");
    let mut tokenizer = Tokenizer::new(&buf);
    tokenizer.arm_var_functions();
    while tokenizer.next_token() != Token::EOF {}
    assert!(!tokenizer.check_var_functions());
}

// ─── Positions & Locations ─────────────────────────────────────

#[test]
fn eof_repeats() {
    let buf = SourceBuffer::new("a");
    let mut tokenizer = Tokenizer::new(&buf);
    assert_eq!(tokenizer.next_token(), ident("a"));
    assert!(tokenizer.is_eof());
    for _ in 0..3 {
        assert_eq!(tokenizer.next_token(), Token::EOF);
    }
}

#[test]
fn reset_replays_tokens() {
    let buf = SourceBuffer::new("a b");
    let mut tokenizer = Tokenizer::new(&buf);
    tokenizer.next_token();
    let saved = tokenizer.position();
    assert_eq!(tokenizer.next_token(), Token::Whitespace);
    assert_eq!(tokenizer.next_token(), ident("b"));
    tokenizer.reset(saved);
    assert_eq!(tokenizer.next_token(), Token::Whitespace);
}

#[test]
fn slices_cover_token_text() {
    let buf = SourceBuffer::new("foo: bar");
    let mut tokenizer = Tokenizer::new(&buf);
    let start = tokenizer.position();
    tokenizer.next_token();
    tokenizer.next_token();
    assert_eq!(tokenizer.slice_from(start), "foo:");
    assert_eq!(tokenizer.slice(start, tokenizer.position()), "foo:");
}

#[test]
fn source_locations() {
    let buf = SourceBuffer::new("a\nbc");
    let mut tokenizer = Tokenizer::new(&buf);
    assert_eq!(tokenizer.current_source_location(), SourceLocation { line: 1, column: 1 });
    tokenizer.next_token();
    tokenizer.next_token();
    assert_eq!(tokenizer.current_source_location(), SourceLocation { line: 2, column: 1 });
    tokenizer.next_token();
    assert_eq!(tokenizer.current_source_location(), SourceLocation { line: 2, column: 3 });
}

#[test]
fn first_line_number_offsets_lines() {
    let buf = SourceBuffer::new("a\nb");
    let mut tokenizer = Tokenizer::with_first_line_number(&buf, 7);
    tokenizer.next_token();
    tokenizer.next_token();
    assert_eq!(tokenizer.current_source_location(), SourceLocation { line: 8, column: 1 });
}

#[test]
fn current_source_line_excludes_terminators() {
    let buf = SourceBuffer::new("a {\n  color: red;\n}");
    let mut tokenizer = Tokenizer::new(&buf);
    assert_eq!(tokenizer.current_source_line(), "a {");
    while tokenizer.next_token() != ident("color") {}
    assert_eq!(tokenizer.current_source_line(), "  color: red;");
}

#[test]
fn iterator_stops_before_eof() {
    let buf = SourceBuffer::new("a b");
    let tokens: Vec<_> = Tokenizer::new(&buf).collect();
    assert_eq!(tokens, vec![ident("a"), Token::Whitespace, ident("b")]);
}

// ─── Property Tests ────────────────────────────────────────────

mod proptest_tokenizer {
    use std::mem::discriminant;

    use super::*;
    use proptest::prelude::*;

    /// CSS-flavoured input: every character class the dispatcher cares about.
    const CSS_ALPHABET: &str =
        r#"[a-zA-Z0-9uU \t\n\r#@.+*/:;,(){}\[\]'"%<>!~|^$?\\\x00é-]{0,40}"#;

    /// Tokens whose source span does not re-lex to the same kind on its own.
    fn relexes_to_itself(token: &Token<'_>) -> bool {
        match token {
            Token::Whitespace | Token::Comment | Token::Dimension(_) | Token::BadString => false,
            Token::Delim(c) => *c != '\\',
            Token::Function(name) => !name.eq_ignore_ascii_case("url"),
            _ => true,
        }
    }

    proptest! {
        #[test]
        fn eof_is_sticky(source in CSS_ALPHABET) {
            let buf = SourceBuffer::new(&source);
            let mut tokenizer = Tokenizer::new(&buf);
            while tokenizer.next_token() != Token::EOF {}
            for _ in 0..3 {
                prop_assert_eq!(tokenizer.next_token(), Token::EOF);
            }
        }

        #[test]
        fn every_token_advances(source in CSS_ALPHABET) {
            let buf = SourceBuffer::new(&source);
            let mut tokenizer = Tokenizer::new(&buf);
            loop {
                let before = tokenizer.position();
                if tokenizer.next_token() == Token::EOF {
                    break;
                }
                prop_assert!(tokenizer.position() > before);
            }
            prop_assert_eq!(tokenizer.position().offset() as usize, source.len());
        }

        #[test]
        fn spans_relex_to_the_same_kind(source in CSS_ALPHABET) {
            let buf = SourceBuffer::new(&source);
            let mut tokenizer = Tokenizer::new(&buf);
            loop {
                let start = tokenizer.position();
                let token = tokenizer.next_token();
                if token == Token::EOF {
                    break;
                }
                if !relexes_to_itself(&token) {
                    continue;
                }
                let span = tokenizer.slice_from(start);
                let relexed = first(span);
                prop_assert_eq!(
                    discriminant(&relexed),
                    discriminant(&token),
                    "{:?} from {:?} re-lexed as {:?}",
                    token,
                    span,
                    relexed
                );
            }
        }
    }
}
