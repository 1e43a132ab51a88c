//! Error recovery strategies for the parser.
//!
//! When the parser encounters an error, it uses these strategies to
//! resynchronize and continue parsing to find more errors.

use super::Parser;
use crate::token::Token;

/// Skip the rest of a malformed declaration.
///
/// `level` is the brace depth of the body holding the declaration (0 at top
/// level). Stops after a `;` or a member body closing back to `level`, or
/// before the `}` that closes the enclosing body.
pub fn sync_to_declaration_boundary(parser: &mut Parser, level: usize) {
    while !parser.at_eof() {
        let depth = parser.brace_depth();
        match parser.current() {
            Token::RightBrace if depth <= level => return,
            Token::Semicolon if depth == level => {
                parser.advance();
                return;
            }
            Token::RightBrace if depth == level + 1 => {
                parser.advance();
                return;
            }
            _ => {
                parser.advance();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_skips_body() {
        let mut parser = Parser::new("void f() { if (x) { y; } } int z;").unwrap();
        sync_to_declaration_boundary(&mut parser, 0);
        assert!(parser.check(&Token::Int));
    }

    #[test]
    fn test_sync_stops_at_closing_brace() {
        let mut parser = Parser::new("int = ; }").unwrap();
        sync_to_declaration_boundary(&mut parser, 0);
        assert!(parser.check(&Token::RightBrace));
    }

    #[test]
    fn test_sync_from_inside_body() {
        let mut parser = Parser::new("{ void f() { x + ; y; } int z; }").unwrap();
        parser.advance();
        let level = parser.brace_depth();
        while !parser.check(&Token::Semicolon) {
            parser.advance();
        }
        sync_to_declaration_boundary(&mut parser, level);
        assert!(parser.check(&Token::Int));
    }

    #[test]
    fn test_sync_after_semicolon() {
        let mut parser = Parser::new("int x = = 3; class").unwrap();
        sync_to_declaration_boundary(&mut parser, 0);
        assert!(parser.check(&Token::Class));
    }
}
