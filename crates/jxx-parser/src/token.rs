//! Token definitions for the Java subset.
//!
//! This module defines all tokens that can appear in translated sources,
//! including keywords, operators, literals, and special tokens.

use std::fmt;

/// A token of the Java subset.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Declarations
    Package,
    Import,
    Class,
    Interface,
    Enum,
    Extends,
    Implements,
    Throws,

    // Modifiers
    Public,
    Private,
    Protected,
    Static,
    Final,
    Abstract,
    Native,
    Synchronized,
    Transient,
    Volatile,
    Strictfp,

    // Control flow
    If,
    Else,
    While,
    Do,
    For,
    Return,
    Break,
    Continue,
    Switch,
    Case,
    Default,

    // Exceptions (recognized so they can be rejected with a clear message)
    Try,
    Catch,
    Finally,
    Throw,

    // Objects
    New,
    This,
    Super,
    Instanceof,

    // Primitive type keywords
    Void,
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,

    // Literals
    True,
    False,
    Null,
    IntLiteral(i64),
    LongLiteral(i128),
    FloatLiteral(f64),
    DoubleLiteral(f64),
    CharLiteral(char),
    StringLiteral(String),
    Identifier(String),

    // Arithmetic
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    PlusPlus,
    MinusMinus,

    // Logical and bitwise
    Bang,
    Tilde,
    Amp,
    Pipe,
    Caret,
    AmpAmp,
    PipePipe,
    LessLess,
    GreaterGreater,
    GreaterGreaterGreater,

    // Comparison
    EqualEqual,
    BangEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,

    // Assignment
    Equal,
    PlusEqual,
    MinusEqual,
    StarEqual,
    SlashEqual,
    PercentEqual,
    AmpEqual,
    PipeEqual,
    CaretEqual,
    LessLessEqual,
    GreaterGreaterEqual,
    GreaterGreaterGreaterEqual,

    // Punctuation
    Question,
    Colon,
    Arrow,
    Dot,
    DotDotDot,
    Comma,
    Semicolon,
    At,
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,

    /// End of input
    Eof,
}

impl Token {
    /// True for the keywords naming a primitive type (including `void`).
    pub fn is_primitive_type(&self) -> bool {
        matches!(
            self,
            Token::Void
                | Token::Boolean
                | Token::Byte
                | Token::Char
                | Token::Short
                | Token::Int
                | Token::Long
                | Token::Float
                | Token::Double
        )
    }

    /// True for declaration modifiers.
    pub fn is_modifier(&self) -> bool {
        matches!(
            self,
            Token::Public
                | Token::Private
                | Token::Protected
                | Token::Static
                | Token::Final
                | Token::Abstract
                | Token::Native
                | Token::Synchronized
                | Token::Transient
                | Token::Volatile
                | Token::Strictfp
        )
    }

    /// True for tokens carrying a literal value.
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            Token::True
                | Token::False
                | Token::Null
                | Token::IntLiteral(_)
                | Token::LongLiteral(_)
                | Token::FloatLiteral(_)
                | Token::DoubleLiteral(_)
                | Token::CharLiteral(_)
                | Token::StringLiteral(_)
        )
    }
}

/// Source location of a token or syntax node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Byte offset of the first character
    pub start: usize,
    /// Byte offset one past the last character
    pub end: usize,
    /// 1-based line of `start`
    pub line: u32,
    /// 1-based column of `start`
    pub column: u32,
}

impl Span {
    /// Create a span.
    pub fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// True for zero-width spans.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The source text covered by this span.
    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }

    /// Smallest span covering both `self` and `other`.
    pub fn merge(&self, other: &Span) -> Span {
        let (line, column) = if self.start <= other.start {
            (self.line, self.column)
        } else {
            (other.line, other.column)
        };
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            line,
            column,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Package => write!(f, "package"),
            Token::Import => write!(f, "import"),
            Token::Class => write!(f, "class"),
            Token::Interface => write!(f, "interface"),
            Token::Enum => write!(f, "enum"),
            Token::Extends => write!(f, "extends"),
            Token::Implements => write!(f, "implements"),
            Token::Throws => write!(f, "throws"),
            Token::Public => write!(f, "public"),
            Token::Private => write!(f, "private"),
            Token::Protected => write!(f, "protected"),
            Token::Static => write!(f, "static"),
            Token::Final => write!(f, "final"),
            Token::Abstract => write!(f, "abstract"),
            Token::Native => write!(f, "native"),
            Token::Synchronized => write!(f, "synchronized"),
            Token::Transient => write!(f, "transient"),
            Token::Volatile => write!(f, "volatile"),
            Token::Strictfp => write!(f, "strictfp"),
            Token::If => write!(f, "if"),
            Token::Else => write!(f, "else"),
            Token::While => write!(f, "while"),
            Token::Do => write!(f, "do"),
            Token::For => write!(f, "for"),
            Token::Return => write!(f, "return"),
            Token::Break => write!(f, "break"),
            Token::Continue => write!(f, "continue"),
            Token::Switch => write!(f, "switch"),
            Token::Case => write!(f, "case"),
            Token::Default => write!(f, "default"),
            Token::Try => write!(f, "try"),
            Token::Catch => write!(f, "catch"),
            Token::Finally => write!(f, "finally"),
            Token::Throw => write!(f, "throw"),
            Token::New => write!(f, "new"),
            Token::This => write!(f, "this"),
            Token::Super => write!(f, "super"),
            Token::Instanceof => write!(f, "instanceof"),
            Token::Void => write!(f, "void"),
            Token::Boolean => write!(f, "boolean"),
            Token::Byte => write!(f, "byte"),
            Token::Char => write!(f, "char"),
            Token::Short => write!(f, "short"),
            Token::Int => write!(f, "int"),
            Token::Long => write!(f, "long"),
            Token::Float => write!(f, "float"),
            Token::Double => write!(f, "double"),
            Token::True => write!(f, "true"),
            Token::False => write!(f, "false"),
            Token::Null => write!(f, "null"),
            Token::IntLiteral(n) => write!(f, "{}", n),
            Token::LongLiteral(n) => write!(f, "{}L", n),
            Token::FloatLiteral(n) => write!(f, "{}f", n),
            Token::DoubleLiteral(n) => write!(f, "{}", n),
            Token::CharLiteral(c) => write!(f, "'{}'", c.escape_default()),
            Token::StringLiteral(s) => write!(f, "\"{}\"", s.escape_default()),
            Token::Identifier(name) => write!(f, "{}", name),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Percent => write!(f, "%"),
            Token::PlusPlus => write!(f, "++"),
            Token::MinusMinus => write!(f, "--"),
            Token::Bang => write!(f, "!"),
            Token::Tilde => write!(f, "~"),
            Token::Amp => write!(f, "&"),
            Token::Pipe => write!(f, "|"),
            Token::Caret => write!(f, "^"),
            Token::AmpAmp => write!(f, "&&"),
            Token::PipePipe => write!(f, "||"),
            Token::LessLess => write!(f, "<<"),
            Token::GreaterGreater => write!(f, ">>"),
            Token::GreaterGreaterGreater => write!(f, ">>>"),
            Token::EqualEqual => write!(f, "=="),
            Token::BangEqual => write!(f, "!="),
            Token::Less => write!(f, "<"),
            Token::LessEqual => write!(f, "<="),
            Token::Greater => write!(f, ">"),
            Token::GreaterEqual => write!(f, ">="),
            Token::Equal => write!(f, "="),
            Token::PlusEqual => write!(f, "+="),
            Token::MinusEqual => write!(f, "-="),
            Token::StarEqual => write!(f, "*="),
            Token::SlashEqual => write!(f, "/="),
            Token::PercentEqual => write!(f, "%="),
            Token::AmpEqual => write!(f, "&="),
            Token::PipeEqual => write!(f, "|="),
            Token::CaretEqual => write!(f, "^="),
            Token::LessLessEqual => write!(f, "<<="),
            Token::GreaterGreaterEqual => write!(f, ">>="),
            Token::GreaterGreaterGreaterEqual => write!(f, ">>>="),
            Token::Question => write!(f, "?"),
            Token::Colon => write!(f, ":"),
            Token::Arrow => write!(f, "->"),
            Token::Dot => write!(f, "."),
            Token::DotDotDot => write!(f, "..."),
            Token::Comma => write!(f, ","),
            Token::Semicolon => write!(f, ";"),
            Token::At => write!(f, "@"),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::LeftBrace => write!(f, "{{"),
            Token::RightBrace => write!(f, "}}"),
            Token::LeftBracket => write!(f, "["),
            Token::RightBracket => write!(f, "]"),
            Token::Eof => write!(f, "end of file"),
        }
    }
}
