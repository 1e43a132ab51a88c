//! Parse error types and error reporting

use crate::lexer::LexError;
use crate::token::{Span, Token};
use std::fmt;

/// A parse error with location and contextual information.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    /// The kind of error that occurred
    pub kind: ParseErrorKind,

    /// Source location of the error
    pub span: Span,

    /// Human-readable error message
    pub message: String,
}

/// The kind of parse error.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    /// Unexpected token found
    UnexpectedToken {
        /// Tokens that would have been accepted
        expected: Vec<Token>,
        /// Token actually found
        found: Token,
    },

    /// Unexpected end of file
    UnexpectedEof {
        /// Tokens that would have been accepted
        expected: Vec<Token>,
    },

    /// Invalid syntax
    InvalidSyntax {
        /// What is wrong
        reason: String,
    },

    /// Java construct outside the translated subset
    Unsupported {
        /// Name of the construct
        feature: String,
    },

    /// Error reported by the lexer
    Lex(LexError),

    /// Parser exceeded its nesting limit
    ParserLimitExceeded,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Parse error at {}:{}: {}",
            self.span.line, self.span.column, self.message
        )
    }
}

impl std::error::Error for ParseError {}

impl From<LexError> for ParseError {
    fn from(error: LexError) -> Self {
        Self {
            span: error.span(),
            message: error.to_string(),
            kind: ParseErrorKind::Lex(error),
        }
    }
}

fn describe(expected: &[Token]) -> String {
    let names: Vec<String> = expected.iter().map(|t| format!("'{}'", t)).collect();
    match names.len() {
        0 => "something else".to_string(),
        1 => names[0].clone(),
        _ => format!("one of {}", names.join(", ")),
    }
}

impl ParseError {
    /// Create an "unexpected token" error.
    pub fn unexpected_token(expected: Vec<Token>, found: Token, span: Span) -> Self {
        let message = format!("Expected {}, found '{}'", describe(&expected), found);
        Self {
            kind: ParseErrorKind::UnexpectedToken { expected, found },
            span,
            message,
        }
    }

    /// Create an "unexpected end of file" error.
    pub fn unexpected_eof(expected: Vec<Token>, span: Span) -> Self {
        let message = format!("Unexpected end of file, expected {}", describe(&expected));
        Self {
            kind: ParseErrorKind::UnexpectedEof { expected },
            span,
            message,
        }
    }

    /// Create an "invalid syntax" error.
    pub fn invalid_syntax(reason: impl Into<String>, span: Span) -> Self {
        let reason = reason.into();
        Self {
            message: reason.clone(),
            kind: ParseErrorKind::InvalidSyntax { reason },
            span,
        }
    }

    /// Create an error for a construct the translator does not handle.
    pub fn unsupported(feature: impl Into<String>, span: Span) -> Self {
        let feature = feature.into();
        Self {
            message: format!("{} are not supported", feature),
            kind: ParseErrorKind::Unsupported { feature },
            span,
        }
    }

    /// Create a nesting-limit error.
    pub fn parser_limit_exceeded(message: impl Into<String>, span: Span) -> Self {
        Self {
            kind: ParseErrorKind::ParserLimitExceeded,
            span,
            message: message.into(),
        }
    }
}
