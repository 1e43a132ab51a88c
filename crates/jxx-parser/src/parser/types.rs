//! Type expression parsing

use super::{ParseError, Parser};
use crate::ast::{QualifiedName, TypeExpr, TypeExprKind};
use crate::token::Token;
use jxx_types::PrimitiveType;

/// Parse a qualified name: `a.b.C`.
///
/// Stops before a `.` that is not followed by an identifier, so `a.b.*`
/// leaves `.*` for the caller.
pub fn parse_qualified_name(parser: &mut Parser) -> Result<QualifiedName, ParseError> {
    let first = parser.expect_identifier()?;
    let start = first.span;
    let mut segments = vec![first];
    while parser.check(&Token::Dot) && matches!(parser.peek(), Some(Token::Identifier(_))) {
        parser.advance();
        segments.push(parser.expect_identifier()?);
    }
    Ok(QualifiedName {
        segments,
        span: parser.span_from(&start),
    })
}

/// Primitive type for a keyword token, `void` included.
pub fn primitive_keyword(token: &Token) -> Option<PrimitiveType> {
    let ty = match token {
        Token::Void => PrimitiveType::Void,
        Token::Boolean => PrimitiveType::Boolean,
        Token::Byte => PrimitiveType::Byte,
        Token::Char => PrimitiveType::Char,
        Token::Short => PrimitiveType::Short,
        Token::Int => PrimitiveType::Int,
        Token::Long => PrimitiveType::Long,
        Token::Float => PrimitiveType::Float,
        Token::Double => PrimitiveType::Double,
        _ => return None,
    };
    Some(ty)
}

/// Parse a type without trailing dimensions.
pub fn parse_base_type(parser: &mut Parser) -> Result<TypeExpr, ParseError> {
    let start = parser.current_span();
    if let Some(primitive) = primitive_keyword(parser.current()) {
        parser.advance();
        return Ok(TypeExpr {
            kind: TypeExprKind::Primitive(primitive),
            dimensions: 0,
            span: start,
        });
    }

    if !matches!(parser.current(), Token::Identifier(_)) {
        return Err(parser.unexpected_token(&[Token::Identifier(String::new())]));
    }
    let name = parse_qualified_name(parser)?;
    if parser.check(&Token::Less) {
        return Err(ParseError::unsupported("generic types", parser.current_span()));
    }
    Ok(TypeExpr {
        kind: TypeExprKind::Named(name),
        dimensions: 0,
        span: parser.span_from(&start),
    })
}

/// Parse a type with any number of `[]` pairs.
pub fn parse_type(parser: &mut Parser) -> Result<TypeExpr, ParseError> {
    let start = parser.current_span();
    let base = parse_base_type(parser)?;
    let dimensions = parse_dimensions(parser);
    Ok(TypeExpr {
        dimensions,
        span: parser.span_from(&start),
        ..base
    })
}

/// Consume `[]` pairs and count them.
pub fn parse_dimensions(parser: &mut Parser) -> usize {
    let mut dimensions = 0;
    while parser.check(&Token::LeftBracket) && matches!(parser.peek(), Some(Token::RightBracket)) {
        parser.advance();
        parser.advance();
        dimensions += 1;
    }
    dimensions
}

/// Position just past a type that starts at `pos`, if one is there.
///
/// Used for lookahead only; nothing is consumed.
pub(crate) fn scan_type(parser: &Parser, mut pos: usize) -> Option<usize> {
    match parser.token_at(pos) {
        tok if primitive_keyword(tok).is_some() => pos += 1,
        Token::Identifier(_) => {
            pos += 1;
            while matches!(parser.token_at(pos), Token::Dot)
                && matches!(parser.token_at(pos + 1), Token::Identifier(_))
            {
                pos += 2;
            }
        }
        _ => return None,
    }
    while matches!(parser.token_at(pos), Token::LeftBracket)
        && matches!(parser.token_at(pos + 1), Token::RightBracket)
    {
        pos += 2;
    }
    Some(pos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ParseErrorKind;

    fn parse(source: &str) -> Result<TypeExpr, ParseError> {
        let mut parser = Parser::new(source).unwrap();
        parse_type(&mut parser)
    }

    #[test]
    fn test_parse_primitive() {
        let ty = parse("int").unwrap();
        assert_eq!(ty.kind, TypeExprKind::Primitive(PrimitiveType::Int));
        assert_eq!(ty.dimensions, 0);
    }

    #[test]
    fn test_parse_qualified_array() {
        let ty = parse("java.lang.String[][]").unwrap();
        assert_eq!(ty.display_name(), "java.lang.String[][]");
        assert_eq!(ty.dimensions, 2);
    }

    #[test]
    fn test_generic_type_rejected() {
        let err = parse("List<String>").unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::Unsupported { .. }));
    }

    #[test]
    fn test_scan_type() {
        let parser = Parser::new("a.B[] x").unwrap();
        assert_eq!(scan_type(&parser, 0), Some(5));
        assert_eq!(scan_type(&Parser::new("(x").unwrap(), 0), None);
    }
}
