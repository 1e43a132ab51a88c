//! Lexer for the Java subset.
//!
//! This module implements the lexer using the logos library. It converts
//! source code into a stream of tokens with line and column information.

use crate::token::{Span, Token};
use logos::Logos;
use std::fmt;

/// Logos-based token enum for lexing.
///
/// This enum is used internally by logos for efficient tokenization.
/// It's converted to our main Token enum after lexing.
#[derive(Logos, Debug, Clone, PartialEq)]
enum LogosToken {
    // Whitespace (skip)
    #[regex(r"[ \t\r\n\f]+", logos::skip)]
    Whitespace,

    #[regex(r"//[^\n]*", logos::skip)]
    LineComment,

    #[token("/*", lex_block_comment)]
    BlockComment,

    // Keywords (must come before identifiers)
    #[token("package")]
    Package,
    #[token("import")]
    Import,
    #[token("class")]
    Class,
    #[token("interface")]
    Interface,
    #[token("enum")]
    Enum,
    #[token("extends")]
    Extends,
    #[token("implements")]
    Implements,
    #[token("throws")]
    Throws,
    #[token("public")]
    Public,
    #[token("private")]
    Private,
    #[token("protected")]
    Protected,
    #[token("static")]
    Static,
    #[token("final")]
    Final,
    #[token("abstract")]
    Abstract,
    #[token("native")]
    Native,
    #[token("synchronized")]
    Synchronized,
    #[token("transient")]
    Transient,
    #[token("volatile")]
    Volatile,
    #[token("strictfp")]
    Strictfp,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("do")]
    Do,
    #[token("for")]
    For,
    #[token("return")]
    Return,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("switch")]
    Switch,
    #[token("case")]
    Case,
    #[token("default")]
    Default,
    #[token("try")]
    Try,
    #[token("catch")]
    Catch,
    #[token("finally")]
    Finally,
    #[token("throw")]
    Throw,
    #[token("new")]
    New,
    #[token("this")]
    This,
    #[token("super")]
    Super,
    #[token("instanceof")]
    Instanceof,
    #[token("void")]
    Void,
    #[token("boolean")]
    Boolean,
    #[token("byte")]
    Byte,
    #[token("char")]
    Char,
    #[token("short")]
    Short,
    #[token("int")]
    Int,
    #[token("long")]
    Long,
    #[token("float")]
    Float,
    #[token("double")]
    Double,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,

    // Literals
    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$]*", |lex| lex.slice().to_string())]
    Identifier(String),

    #[regex(r"0[xX][0-9a-fA-F_]+", parse_hex)]
    #[regex(r"[0-9][0-9_]*", parse_int)]
    IntLiteral(i64),

    #[regex(r"0[xX][0-9a-fA-F_]+[lL]", parse_hex_long)]
    #[regex(r"[0-9][0-9_]*[lL]", parse_long)]
    LongLiteral(i128),

    #[regex(r"[0-9][0-9_]*(\.[0-9][0-9_]*)?([eE][+-]?[0-9]+)?[fF]", parse_suffixed_float)]
    FloatLiteral(f64),

    #[regex(r"[0-9][0-9_]*\.[0-9][0-9_]*([eE][+-]?[0-9]+)?", parse_float)]
    #[regex(r"[0-9][0-9_]*[eE][+-]?[0-9]+", parse_float)]
    #[regex(r"[0-9][0-9_]*(\.[0-9][0-9_]*)?([eE][+-]?[0-9]+)?[dD]", parse_suffixed_float)]
    DoubleLiteral(f64),

    #[regex(r"'([^'\\\n]|\\[^\n]|\\u[0-9a-fA-F]{4})'", parse_char)]
    CharLiteral(char),

    #[regex(r#""([^"\\\n]|\\[^\n])*""#, parse_string)]
    StringLiteral(String),

    // Operators (longest first)
    #[token(">>>=")]
    GreaterGreaterGreaterEqual,
    #[token(">>>")]
    GreaterGreaterGreater,
    #[token("<<=")]
    LessLessEqual,
    #[token(">>=")]
    GreaterGreaterEqual,
    #[token("...")]
    DotDotDot,
    #[token("==")]
    EqualEqual,
    #[token("!=")]
    BangEqual,
    #[token("<=")]
    LessEqual,
    #[token(">=")]
    GreaterEqual,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,
    #[token("<<")]
    LessLess,
    #[token(">>")]
    GreaterGreater,
    #[token("+=")]
    PlusEqual,
    #[token("-=")]
    MinusEqual,
    #[token("*=")]
    StarEqual,
    #[token("/=")]
    SlashEqual,
    #[token("%=")]
    PercentEqual,
    #[token("&=")]
    AmpEqual,
    #[token("|=")]
    PipeEqual,
    #[token("^=")]
    CaretEqual,
    #[token("->")]
    Arrow,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("!")]
    Bang,
    #[token("~")]
    Tilde,
    #[token("<")]
    Less,
    #[token(">")]
    Greater,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("=")]
    Equal,
    #[token("?")]
    Question,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token("@")]
    At,
    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("{")]
    LeftBrace,
    #[token("}")]
    RightBrace,
    #[token("[")]
    LeftBracket,
    #[token("]")]
    RightBracket,
}

// Helper parsing functions

fn lex_block_comment(lex: &mut logos::Lexer<LogosToken>) -> logos::Skip {
    // We've already consumed "/*", now find "*/"
    let remainder = lex.remainder();
    match remainder.find("*/") {
        Some(end) => lex.bump(end + 2),
        // Unterminated comment - consume to end
        None => lex.bump(remainder.len()),
    }
    logos::Skip
}

fn digits(text: &str) -> String {
    text.chars()
        .filter(|c| *c != '_' && !matches!(c, 'l' | 'L'))
        .collect()
}

fn parse_hex(lex: &mut logos::Lexer<LogosToken>) -> Option<i64> {
    let s = lex.slice()[2..].replace('_', "");
    // Hex int literals may use all 32 bits
    u32::from_str_radix(&s, 16).ok().map(|n| n as i32 as i64)
}

fn parse_hex_long(lex: &mut logos::Lexer<LogosToken>) -> Option<i128> {
    let s = lex.slice();
    let hex = s[2..s.len() - 1].replace('_', "");
    u64::from_str_radix(&hex, 16).ok().map(|n| n as i64 as i128)
}

fn parse_int(lex: &mut logos::Lexer<LogosToken>) -> Option<i64> {
    let n: i64 = digits(lex.slice()).parse().ok()?;
    // 2147483648 is only valid as the operand of unary minus
    if n > i32::MAX as i64 + 1 {
        return None;
    }
    Some(n)
}

fn parse_long(lex: &mut logos::Lexer<LogosToken>) -> Option<i128> {
    let n: i128 = digits(lex.slice()).parse().ok()?;
    // 9223372036854775808L is only valid as the operand of unary minus
    if n > i64::MAX as i128 + 1 {
        return None;
    }
    Some(n)
}

fn parse_float(lex: &mut logos::Lexer<LogosToken>) -> Option<f64> {
    lex.slice().replace('_', "").parse().ok()
}

fn parse_suffixed_float(lex: &mut logos::Lexer<LogosToken>) -> Option<f64> {
    let s = lex.slice().replace('_', "");
    s[..s.len() - 1].parse().ok()
}

fn parse_char(lex: &mut logos::Lexer<LogosToken>) -> Option<char> {
    let s = lex.slice();
    let inner = unescape(&s[1..s.len() - 1])?;
    let mut chars = inner.chars();
    let c = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    Some(c)
}

fn parse_string(lex: &mut logos::Lexer<LogosToken>) -> Option<String> {
    let s = lex.slice();
    unescape(&s[1..s.len() - 1])
}

/// Resolve Java escape sequences. Returns `None` on an invalid escape.
fn unescape(s: &str) -> Option<String> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next()? {
            'n' => result.push('\n'),
            'r' => result.push('\r'),
            't' => result.push('\t'),
            'b' => result.push('\u{8}'),
            'f' => result.push('\u{c}'),
            '\\' => result.push('\\'),
            '"' => result.push('"'),
            '\'' => result.push('\''),
            'u' => {
                let hex: String = (0..4).filter_map(|_| chars.next()).collect();
                if hex.len() != 4 {
                    return None;
                }
                let code = u32::from_str_radix(&hex, 16).ok()?;
                result.push(char::from_u32(code)?);
            }
            d @ '0'..='7' => {
                // Octal escape, up to three digits
                let mut value = d.to_digit(8)?;
                for _ in 0..2 {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(digit) if value * 8 + digit <= 0o377 => {
                            value = value * 8 + digit;
                            chars.next();
                        }
                        _ => break,
                    }
                }
                result.push(char::from_u32(value)?);
            }
            _ => return None,
        }
    }

    Some(result)
}

/// Lexer error types.
#[derive(Debug, Clone, PartialEq)]
pub enum LexError {
    /// A character that starts no token
    UnexpectedCharacter {
        /// The offending character
        char: char,
        /// Location
        span: Span,
    },
    /// A numeric literal out of range or malformed
    InvalidNumber {
        /// Literal text
        text: String,
        /// Location
        span: Span,
    },
    /// A character or string literal with a bad escape
    InvalidEscape {
        /// Literal text
        text: String,
        /// Location
        span: Span,
    },
}

impl LexError {
    /// Location of the error.
    pub fn span(&self) -> Span {
        match self {
            LexError::UnexpectedCharacter { span, .. }
            | LexError::InvalidNumber { span, .. }
            | LexError::InvalidEscape { span, .. } => *span,
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexError::UnexpectedCharacter { char, span } => {
                write!(f, "Unexpected character '{}' at {}:{}", char, span.line, span.column)
            }
            LexError::InvalidNumber { text, span } => {
                write!(f, "Invalid number '{}' at {}:{}", text, span.line, span.column)
            }
            LexError::InvalidEscape { text, span } => {
                write!(f, "Invalid escape in {} at {}:{}", text, span.line, span.column)
            }
        }
    }
}

impl std::error::Error for LexError {}

/// Main lexer structure.
pub struct Lexer<'a> {
    source: &'a str,
    /// Byte offset of the start of every line
    line_starts: Vec<usize>,
}

impl<'a> Lexer<'a> {
    /// Create a lexer over `source`.
    pub fn new(source: &'a str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { source, line_starts }
    }

    /// Tokenize the whole input.
    ///
    /// The token list always ends with [`Token::Eof`]. All lexical errors are
    /// collected before returning.
    pub fn tokenize(self) -> Result<Vec<(Token, Span)>, Vec<LexError>> {
        let mut tokens = Vec::new();
        let mut errors = Vec::new();
        let mut lexer = LogosToken::lexer(self.source);

        while let Some(result) = lexer.next() {
            let span = self.span_at(lexer.span());
            match result {
                Ok(token) => tokens.push((convert_token(token), span)),
                Err(()) => errors.push(self.classify_error(span)),
            }
        }

        let eof = self.span_at(self.source.len()..self.source.len());
        tokens.push((Token::Eof, eof));

        if errors.is_empty() {
            Ok(tokens)
        } else {
            Err(errors)
        }
    }

    fn span_at(&self, range: std::ops::Range<usize>) -> Span {
        let line = match self.line_starts.binary_search(&range.start) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let column = self.source[self.line_starts[line]..range.start].chars().count() + 1;
        Span::new(range.start, range.end, line as u32 + 1, column as u32)
    }

    fn classify_error(&self, span: Span) -> LexError {
        let text = span.slice(self.source);
        let first = text.chars().next().unwrap_or('\0');
        if first.is_ascii_digit() {
            LexError::InvalidNumber {
                text: text.to_string(),
                span,
            }
        } else if first == '\'' || first == '"' {
            LexError::InvalidEscape {
                text: text.to_string(),
                span,
            }
        } else {
            LexError::UnexpectedCharacter { char: first, span }
        }
    }
}

fn convert_token(token: LogosToken) -> Token {
    match token {
        LogosToken::Package => Token::Package,
        LogosToken::Import => Token::Import,
        LogosToken::Class => Token::Class,
        LogosToken::Interface => Token::Interface,
        LogosToken::Enum => Token::Enum,
        LogosToken::Extends => Token::Extends,
        LogosToken::Implements => Token::Implements,
        LogosToken::Throws => Token::Throws,
        LogosToken::Public => Token::Public,
        LogosToken::Private => Token::Private,
        LogosToken::Protected => Token::Protected,
        LogosToken::Static => Token::Static,
        LogosToken::Final => Token::Final,
        LogosToken::Abstract => Token::Abstract,
        LogosToken::Native => Token::Native,
        LogosToken::Synchronized => Token::Synchronized,
        LogosToken::Transient => Token::Transient,
        LogosToken::Volatile => Token::Volatile,
        LogosToken::Strictfp => Token::Strictfp,
        LogosToken::If => Token::If,
        LogosToken::Else => Token::Else,
        LogosToken::While => Token::While,
        LogosToken::Do => Token::Do,
        LogosToken::For => Token::For,
        LogosToken::Return => Token::Return,
        LogosToken::Break => Token::Break,
        LogosToken::Continue => Token::Continue,
        LogosToken::Switch => Token::Switch,
        LogosToken::Case => Token::Case,
        LogosToken::Default => Token::Default,
        LogosToken::Try => Token::Try,
        LogosToken::Catch => Token::Catch,
        LogosToken::Finally => Token::Finally,
        LogosToken::Throw => Token::Throw,
        LogosToken::New => Token::New,
        LogosToken::This => Token::This,
        LogosToken::Super => Token::Super,
        LogosToken::Instanceof => Token::Instanceof,
        LogosToken::Void => Token::Void,
        LogosToken::Boolean => Token::Boolean,
        LogosToken::Byte => Token::Byte,
        LogosToken::Char => Token::Char,
        LogosToken::Short => Token::Short,
        LogosToken::Int => Token::Int,
        LogosToken::Long => Token::Long,
        LogosToken::Float => Token::Float,
        LogosToken::Double => Token::Double,
        LogosToken::True => Token::True,
        LogosToken::False => Token::False,
        LogosToken::Null => Token::Null,
        LogosToken::Identifier(s) => Token::Identifier(s),
        LogosToken::IntLiteral(n) => Token::IntLiteral(n),
        LogosToken::LongLiteral(n) => Token::LongLiteral(n),
        LogosToken::FloatLiteral(n) => Token::FloatLiteral(n),
        LogosToken::DoubleLiteral(n) => Token::DoubleLiteral(n),
        LogosToken::CharLiteral(c) => Token::CharLiteral(c),
        LogosToken::StringLiteral(s) => Token::StringLiteral(s),
        LogosToken::GreaterGreaterGreaterEqual => Token::GreaterGreaterGreaterEqual,
        LogosToken::GreaterGreaterGreater => Token::GreaterGreaterGreater,
        LogosToken::LessLessEqual => Token::LessLessEqual,
        LogosToken::GreaterGreaterEqual => Token::GreaterGreaterEqual,
        LogosToken::DotDotDot => Token::DotDotDot,
        LogosToken::EqualEqual => Token::EqualEqual,
        LogosToken::BangEqual => Token::BangEqual,
        LogosToken::LessEqual => Token::LessEqual,
        LogosToken::GreaterEqual => Token::GreaterEqual,
        LogosToken::AmpAmp => Token::AmpAmp,
        LogosToken::PipePipe => Token::PipePipe,
        LogosToken::PlusPlus => Token::PlusPlus,
        LogosToken::MinusMinus => Token::MinusMinus,
        LogosToken::LessLess => Token::LessLess,
        LogosToken::GreaterGreater => Token::GreaterGreater,
        LogosToken::PlusEqual => Token::PlusEqual,
        LogosToken::MinusEqual => Token::MinusEqual,
        LogosToken::StarEqual => Token::StarEqual,
        LogosToken::SlashEqual => Token::SlashEqual,
        LogosToken::PercentEqual => Token::PercentEqual,
        LogosToken::AmpEqual => Token::AmpEqual,
        LogosToken::PipeEqual => Token::PipeEqual,
        LogosToken::CaretEqual => Token::CaretEqual,
        LogosToken::Arrow => Token::Arrow,
        LogosToken::Plus => Token::Plus,
        LogosToken::Minus => Token::Minus,
        LogosToken::Star => Token::Star,
        LogosToken::Slash => Token::Slash,
        LogosToken::Percent => Token::Percent,
        LogosToken::Bang => Token::Bang,
        LogosToken::Tilde => Token::Tilde,
        LogosToken::Less => Token::Less,
        LogosToken::Greater => Token::Greater,
        LogosToken::Amp => Token::Amp,
        LogosToken::Pipe => Token::Pipe,
        LogosToken::Caret => Token::Caret,
        LogosToken::Equal => Token::Equal,
        LogosToken::Question => Token::Question,
        LogosToken::Colon => Token::Colon,
        LogosToken::Dot => Token::Dot,
        LogosToken::Comma => Token::Comma,
        LogosToken::Semicolon => Token::Semicolon,
        LogosToken::At => Token::At,
        LogosToken::LeftParen => Token::LeftParen,
        LogosToken::RightParen => Token::RightParen,
        LogosToken::LeftBrace => Token::LeftBrace,
        LogosToken::RightBrace => Token::RightBrace,
        LogosToken::LeftBracket => Token::LeftBracket,
        LogosToken::RightBracket => Token::RightBracket,
        // Skipped by logos, never produced
        LogosToken::Whitespace | LogosToken::LineComment | LogosToken::BlockComment => Token::Eof,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<Token> {
        Lexer::new(source)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|(tok, _)| tok)
            .collect()
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_eq!(
            lex("public class Foo extends Bar"),
            vec![
                Token::Public,
                Token::Class,
                Token::Identifier("Foo".to_string()),
                Token::Extends,
                Token::Identifier("Bar".to_string()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_numeric_literals() {
        assert_eq!(
            lex("42 7L 1.5 2.5f 3d 0x1F 1e3"),
            vec![
                Token::IntLiteral(42),
                Token::LongLiteral(7),
                Token::DoubleLiteral(1.5),
                Token::FloatLiteral(2.5),
                Token::DoubleLiteral(3.0),
                Token::IntLiteral(31),
                Token::DoubleLiteral(1000.0),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_hex_literals_use_every_bit() {
        assert_eq!(
            lex("0x80000000 0x8000000000000000L 9223372036854775808L"),
            vec![
                Token::IntLiteral(-2147483648),
                Token::LongLiteral(i64::MIN as i128),
                Token::LongLiteral(9223372036854775808),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_char_and_string_escapes() {
        assert_eq!(
            lex(r#"'a' '\n' 'A' "say \"hi\"\t""#),
            vec![
                Token::CharLiteral('a'),
                Token::CharLiteral('\n'),
                Token::CharLiteral('A'),
                Token::StringLiteral("say \"hi\"\t".to_string()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            lex("a /* block\n comment */ b // line\n c /** doc */"),
            vec![
                Token::Identifier("a".to_string()),
                Token::Identifier("b".to_string()),
                Token::Identifier("c".to_string()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_shift_operators_use_longest_match() {
        assert_eq!(
            lex("a >>>= b >> c"),
            vec![
                Token::Identifier("a".to_string()),
                Token::GreaterGreaterGreaterEqual,
                Token::Identifier("b".to_string()),
                Token::GreaterGreater,
                Token::Identifier("c".to_string()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_spans_track_lines_and_columns() {
        let tokens = Lexer::new("class A {\n  int x;\n}").tokenize().unwrap();
        let (tok, span) = &tokens[4];
        assert_eq!(*tok, Token::Identifier("x".to_string()));
        assert_eq!((span.line, span.column), (2, 7));
    }

    #[test]
    fn test_unexpected_character() {
        let errors = Lexer::new("int # x").tokenize().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], LexError::UnexpectedCharacter { char: '#', .. }));
    }
}
