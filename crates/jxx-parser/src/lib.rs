//! Jxx Java-Subset Parser
//!
//! Lexer and recursive-descent parser for the restricted Java dialect the
//! translator accepts. The parser produces a closed sum-type syntax tree
//! ([`ast::CompilationUnit`]) with a [`Span`] on every node.

#![warn(missing_docs)]

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;

pub use lexer::{LexError, Lexer};
pub use parser::{ParseError, ParseErrorKind, Parser};
pub use token::{Span, Token};

/// Parse a whole source file.
///
/// Lex errors are reported as [`ParseErrorKind::Lex`] parse errors so callers
/// only deal with one error type.
pub fn parse_compilation_unit(source: &str) -> Result<ast::CompilationUnit, Vec<ParseError>> {
    let parser = Parser::new(source)
        .map_err(|errors| errors.into_iter().map(ParseError::from).collect::<Vec<_>>())?;
    parser.parse()
}
