//! Parser for the Java subset
//!
//! This module implements a recursive descent parser that transforms
//! a token stream from the lexer into a [`CompilationUnit`]. Errors inside a
//! class body are recorded and parsing resumes at the next member, so one
//! run reports every malformed member of a file.

pub mod decl;
pub mod error;
pub mod expr;
pub mod precedence;
pub mod recovery;
pub mod stmt;
pub mod types;

use crate::ast::*;
use crate::lexer::{LexError, Lexer};
use crate::token::{Span, Token};

pub use error::{ParseError, ParseErrorKind};

/// Maximum nesting of statements and expressions before the parser gives up.
pub const MAX_PARSE_DEPTH: usize = 128;

/// Parser state.
///
/// Recursive descent with arbitrary lookahead over the pre-tokenized input;
/// lookahead is needed to tell casts from parenthesized expressions and
/// local declarations from expression statements.
pub struct Parser {
    /// Pre-tokenized input, always terminated by [`Token::Eof`]
    tokens: Vec<(Token, Span)>,

    /// Current position in token stream
    pos: usize,

    /// Accumulated parse errors (allows continuing after errors)
    errors: Vec<ParseError>,

    /// Current recursion depth
    depth: usize,

    /// Number of `{` consumed and not yet closed
    braces: usize,
}

impl Parser {
    /// Create a new parser from source code.
    pub fn new(source: &str) -> Result<Self, Vec<LexError>> {
        let tokens = Lexer::new(source).tokenize()?;
        Ok(Self {
            tokens,
            pos: 0,
            errors: Vec::new(),
            depth: 0,
            braces: 0,
        })
    }

    /// Parse the entire source file.
    ///
    /// Returns the compilation unit on success, or all accumulated errors on
    /// failure.
    pub fn parse(mut self) -> Result<CompilationUnit, Vec<ParseError>> {
        let unit = decl::parse_compilation_unit(&mut self);
        match unit {
            Ok(unit) if self.errors.is_empty() => Ok(unit),
            Ok(_) => Err(self.errors),
            Err(err) => {
                self.errors.push(err);
                Err(self.errors)
            }
        }
    }

    // ========================================================================
    // Token Management
    // ========================================================================

    /// Get the current token.
    #[inline]
    pub fn current(&self) -> &Token {
        &self.tokens[self.pos].0
    }

    /// Get the current token's span.
    #[inline]
    pub fn current_span(&self) -> Span {
        self.tokens[self.pos].1
    }

    /// Span of the most recently consumed token.
    pub fn previous_span(&self) -> Span {
        if self.pos == 0 {
            self.current_span()
        } else {
            self.tokens[self.pos - 1].1
        }
    }

    /// Peek at the next token (lookahead).
    #[inline]
    pub fn peek(&self) -> Option<&Token> {
        self.peek_nth(1)
    }

    /// Peek `n` tokens past the current one.
    #[inline]
    pub fn peek_nth(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.pos + n).map(|(tok, _)| tok)
    }

    /// Advance to the next token, returning the previous current token.
    pub fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].0.clone();
        match tok {
            Token::LeftBrace => self.braces += 1,
            Token::RightBrace => self.braces = self.braces.saturating_sub(1),
            _ => {}
        }
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    /// Check if the current token matches the given kind.
    #[inline]
    pub fn check(&self, expected: &Token) -> bool {
        std::mem::discriminant(self.current()) == std::mem::discriminant(expected)
    }

    /// Check if the current token matches any of the given kinds.
    pub fn check_any(&self, expected: &[Token]) -> bool {
        expected.iter().any(|tok| self.check(tok))
    }

    /// Consume the current token if it matches; report whether it did.
    pub fn eat(&mut self, expected: &Token) -> bool {
        if self.check(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Check if we've reached EOF.
    #[inline]
    pub fn at_eof(&self) -> bool {
        matches!(self.current(), Token::Eof)
    }

    /// Consume the current token if it matches the expected kind.
    ///
    /// Returns Ok(token) on match, or Err(ParseError) on mismatch.
    pub fn expect(&mut self, expected: Token) -> Result<Token, ParseError> {
        if self.check(&expected) {
            Ok(self.advance())
        } else {
            Err(self.unexpected_token(&[expected]))
        }
    }

    /// Consume an identifier.
    pub fn expect_identifier(&mut self) -> Result<Identifier, ParseError> {
        let span = self.current_span();
        match self.current().clone() {
            Token::Identifier(name) => {
                self.advance();
                Ok(Identifier::new(name, span))
            }
            _ => Err(self.unexpected_token(&[Token::Identifier(String::new())])),
        }
    }

    /// Brace nesting level at the current position.
    pub fn brace_depth(&self) -> usize {
        self.braces
    }

    /// Save the position for speculative scanning.
    pub(crate) fn mark(&self) -> usize {
        self.pos
    }

    /// Token at an absolute position, clamped to EOF.
    pub(crate) fn token_at(&self, pos: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[pos.min(last)].0
    }

    // ========================================================================
    // Error Handling
    // ========================================================================

    /// Record an error and keep parsing.
    pub fn report(&mut self, error: ParseError) {
        self.errors.push(error);
    }

    /// Create an "unexpected token" error at the current position.
    pub fn unexpected_token(&self, expected: &[Token]) -> ParseError {
        let span = self.current_span();
        if self.at_eof() {
            ParseError::unexpected_eof(expected.to_vec(), span)
        } else {
            ParseError::unexpected_token(expected.to_vec(), self.current().clone(), span)
        }
    }

    /// Enter a nested construct, failing once [`MAX_PARSE_DEPTH`] is reached.
    pub(crate) fn enter(&mut self) -> Result<(), ParseError> {
        if self.depth >= MAX_PARSE_DEPTH {
            return Err(ParseError::parser_limit_exceeded(
                format!("Nesting depth exceeds {}", MAX_PARSE_DEPTH),
                self.current_span(),
            ));
        }
        self.depth += 1;
        Ok(())
    }

    /// Leave a nested construct.
    pub(crate) fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    // ========================================================================
    // Utilities
    // ========================================================================

    /// Combine two spans into a single span.
    pub fn combine_spans(&self, start: &Span, end: &Span) -> Span {
        start.merge(end)
    }

    /// Span from `start` to the last consumed token.
    pub fn span_from(&self, start: &Span) -> Span {
        self.combine_spans(start, &self.previous_span())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_new() {
        let parser = Parser::new("class A {}").unwrap();
        assert!(matches!(parser.current(), Token::Class));
    }

    #[test]
    fn test_parser_advance() {
        let mut parser = Parser::new("class A").unwrap();
        let tok = parser.advance();
        assert!(matches!(tok, Token::Class));
        assert!(matches!(parser.current(), Token::Identifier(_)));
    }

    #[test]
    fn test_parser_at_eof() {
        let mut parser = Parser::new("").unwrap();
        assert!(parser.at_eof());
        parser.advance();
        assert!(parser.at_eof());
    }

    #[test]
    fn test_parser_check_and_peek() {
        let parser = Parser::new("int x").unwrap();
        assert!(parser.check(&Token::Int));
        assert!(!parser.check(&Token::Long));
        assert!(matches!(parser.peek(), Some(Token::Identifier(_))));
        assert!(matches!(parser.peek_nth(2), Some(Token::Eof)));
    }

    #[test]
    fn test_expect_reports_eof() {
        let mut parser = Parser::new("").unwrap();
        let err = parser.expect(Token::Semicolon).unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::UnexpectedEof { .. }));
    }

    #[test]
    fn test_depth_limit() {
        let mut parser = Parser::new("x").unwrap();
        for _ in 0..MAX_PARSE_DEPTH {
            parser.enter().unwrap();
        }
        let err = parser.enter().unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::ParserLimitExceeded);
    }
}
