//! Declaration parsing: package, imports, classes and their members

use super::recovery::sync_to_declaration_boundary;
use super::types::{parse_dimensions, parse_qualified_name, parse_type};
use super::{expr, stmt, ParseError, Parser};
use crate::ast::*;
use crate::token::{Span, Token};

/// Parse a whole file.
///
/// Errors inside class bodies and between top-level declarations are
/// recorded on the parser; only a malformed package or import clause aborts.
pub fn parse_compilation_unit(parser: &mut Parser) -> Result<CompilationUnit, ParseError> {
    let start = parser.current_span();

    let package = if parser.eat(&Token::Package) {
        let name = parse_qualified_name(parser)?;
        parser.expect(Token::Semicolon)?;
        Some(name)
    } else {
        None
    };

    let mut imports = Vec::new();
    while parser.check(&Token::Import) {
        imports.push(parse_import(parser)?);
    }

    let mut classes = Vec::new();
    while !parser.at_eof() {
        if parser.eat(&Token::Semicolon) {
            continue;
        }
        let decl_start = parser.current_span();
        let before = parser.mark();
        let result = parse_modifiers(parser)
            .and_then(|modifiers| parse_class_declaration(parser, modifiers, decl_start));
        match result {
            Ok(class) => classes.push(class),
            Err(err) => {
                parser.report(err);
                sync_to_declaration_boundary(parser, 0);
                if parser.mark() == before {
                    parser.advance();
                }
            }
        }
    }

    Ok(CompilationUnit {
        package,
        imports,
        classes,
        span: parser.span_from(&start),
    })
}

fn parse_import(parser: &mut Parser) -> Result<ImportDecl, ParseError> {
    let start = parser.current_span();
    parser.expect(Token::Import)?;
    if parser.check(&Token::Static) {
        return Err(ParseError::unsupported("static imports", parser.current_span()));
    }
    let name = parse_qualified_name(parser)?;
    let wildcard = parser.check(&Token::Dot) && matches!(parser.peek(), Some(Token::Star));
    if wildcard {
        parser.advance();
        parser.advance();
    }
    parser.expect(Token::Semicolon)?;
    Ok(ImportDecl {
        name,
        wildcard,
        span: parser.span_from(&start),
    })
}

/// Parse modifiers and annotations preceding a declaration.
///
/// Annotations are skipped apart from their names. Modifiers without a
/// meaning for the translator (`native`, `transient`, ...) are accepted and
/// dropped.
pub fn parse_modifiers(parser: &mut Parser) -> Result<Modifiers, ParseError> {
    let mut modifiers = Modifiers::default();
    loop {
        let span = parser.current_span();
        let access = match parser.current() {
            Token::At => {
                if matches!(parser.peek(), Some(Token::Interface)) {
                    return Err(ParseError::unsupported("annotation types", span));
                }
                parser.advance();
                let name = parse_qualified_name(parser)?;
                if parser.check(&Token::LeftParen) {
                    skip_parenthesized(parser)?;
                }
                modifiers.annotations.push(name.dotted());
                continue;
            }
            Token::Public => Some(AccessModifier::Public),
            Token::Protected => Some(AccessModifier::Protected),
            Token::Private => Some(AccessModifier::Private),
            Token::Static => {
                modifiers.is_static = true;
                None
            }
            Token::Final => {
                modifiers.is_final = true;
                None
            }
            Token::Abstract => {
                modifiers.is_abstract = true;
                None
            }
            tok if tok.is_modifier() => None,
            _ => break,
        };
        if let Some(access) = access {
            if modifiers.access.is_some_and(|existing| existing != access) {
                parser.report(ParseError::invalid_syntax(
                    "Conflicting access modifiers",
                    span,
                ));
            }
            modifiers.access = Some(access);
        }
        parser.advance();
    }
    Ok(modifiers)
}

fn skip_parenthesized(parser: &mut Parser) -> Result<(), ParseError> {
    parser.expect(Token::LeftParen)?;
    let mut depth = 1usize;
    while depth > 0 {
        match parser.current() {
            Token::Eof => return Err(parser.unexpected_token(&[Token::RightParen])),
            Token::LeftParen => depth += 1,
            Token::RightParen => depth -= 1,
            _ => {}
        }
        parser.advance();
    }
    Ok(())
}

/// Parse `class Name [extends T] { members }` after its modifiers.
pub fn parse_class_declaration(
    parser: &mut Parser,
    modifiers: Modifiers,
    start: Span,
) -> Result<ClassDecl, ParseError> {
    match parser.current() {
        Token::Class => {
            parser.advance();
        }
        Token::Interface => return Err(ParseError::unsupported("interfaces", parser.current_span())),
        Token::Enum => return Err(ParseError::unsupported("enums", parser.current_span())),
        _ => return Err(parser.unexpected_token(&[Token::Class])),
    }

    let name = parser.expect_identifier()?;
    if parser.check(&Token::Less) {
        return Err(ParseError::unsupported("generic classes", parser.current_span()));
    }

    let extends = if parser.eat(&Token::Extends) {
        let ty = parse_type(parser)?;
        if ty.dimensions > 0 || matches!(ty.kind, TypeExprKind::Primitive(_)) {
            return Err(ParseError::invalid_syntax(
                format!("Cannot extend '{}'", ty.display_name()),
                ty.span,
            ));
        }
        Some(ty)
    } else {
        None
    };

    if parser.check(&Token::Implements) {
        return Err(ParseError::unsupported("interfaces", parser.current_span()));
    }

    parser.expect(Token::LeftBrace)?;
    let level = parser.brace_depth();
    let mut members = Vec::new();
    while !parser.check(&Token::RightBrace) && !parser.at_eof() {
        if parser.eat(&Token::Semicolon) {
            continue;
        }
        match parse_member(parser, &name.name) {
            Ok(member) => members.push(member),
            Err(err) => {
                parser.report(err);
                sync_to_declaration_boundary(parser, level);
            }
        }
    }
    parser.expect(Token::RightBrace)?;

    Ok(ClassDecl {
        modifiers,
        name,
        extends,
        members,
        span: parser.span_from(&start),
    })
}

/// Parse one member of the body of class `class_name`.
pub fn parse_member(parser: &mut Parser, class_name: &str) -> Result<MemberDecl, ParseError> {
    let start = parser.current_span();
    let modifiers = parse_modifiers(parser)?;

    match parser.current() {
        Token::Class | Token::Interface | Token::Enum => {
            return parse_class_declaration(parser, modifiers, start).map(MemberDecl::Class);
        }
        Token::LeftBrace => {
            return Err(ParseError::unsupported("initializer blocks", parser.current_span()));
        }
        Token::Less => {
            return Err(ParseError::unsupported("generic methods", parser.current_span()));
        }
        Token::Identifier(name)
            if name == class_name && matches!(parser.peek(), Some(Token::LeftParen)) =>
        {
            return parse_constructor(parser, modifiers, start).map(MemberDecl::Constructor);
        }
        _ => {}
    }

    let ty = parse_type(parser)?;
    let name = parser.expect_identifier()?;

    if parser.check(&Token::LeftParen) {
        let params = parse_parameters(parser)?;
        let return_type = ty.with_extra_dimensions(parse_dimensions(parser));
        skip_throws(parser)?;
        let body = if parser.eat(&Token::Semicolon) {
            None
        } else {
            Some(stmt::parse_block(parser)?)
        };
        return Ok(MemberDecl::Method(MethodDecl {
            modifiers,
            return_type,
            name,
            params,
            body,
            span: parser.span_from(&start),
        }));
    }

    if ty.is_void() {
        return Err(ParseError::invalid_syntax(
            "Fields cannot have type 'void'",
            ty.span,
        ));
    }
    let declarators = parse_variable_declarators(parser, name)?;
    parser.expect(Token::Semicolon)?;
    Ok(MemberDecl::Field(FieldDecl {
        modifiers,
        ty,
        declarators,
        span: parser.span_from(&start),
    }))
}

fn parse_constructor(
    parser: &mut Parser,
    modifiers: Modifiers,
    start: Span,
) -> Result<ConstructorDecl, ParseError> {
    let name = parser.expect_identifier()?;
    let params = parse_parameters(parser)?;
    skip_throws(parser)?;
    let body = stmt::parse_block(parser)?;
    Ok(ConstructorDecl {
        modifiers,
        name,
        params,
        body,
        span: parser.span_from(&start),
    })
}

/// Parse `(T a, U b)`.
pub fn parse_parameters(parser: &mut Parser) -> Result<Vec<Parameter>, ParseError> {
    parser.expect(Token::LeftParen)?;
    let mut params = Vec::new();
    if !parser.check(&Token::RightParen) {
        loop {
            let start = parser.current_span();
            parse_modifiers(parser)?;
            let ty = parse_type(parser)?;
            if parser.check(&Token::DotDotDot) {
                return Err(ParseError::unsupported(
                    "variable arity parameters",
                    parser.current_span(),
                ));
            }
            let name = parser.expect_identifier()?;
            let ty = ty.with_extra_dimensions(parse_dimensions(parser));
            params.push(Parameter {
                ty,
                name,
                span: parser.span_from(&start),
            });
            if !parser.eat(&Token::Comma) {
                break;
            }
        }
    }
    parser.expect(Token::RightParen)?;
    Ok(params)
}

// `throws` clauses are accepted and dropped; exceptions are never raised.
fn skip_throws(parser: &mut Parser) -> Result<(), ParseError> {
    if parser.eat(&Token::Throws) {
        parse_qualified_name(parser)?;
        while parser.eat(&Token::Comma) {
            parse_qualified_name(parser)?;
        }
    }
    Ok(())
}

/// Parse the declarators of a field or local declaration whose first name
/// has already been consumed.
pub fn parse_variable_declarators(
    parser: &mut Parser,
    first: Identifier,
) -> Result<Vec<VariableDeclarator>, ParseError> {
    let mut declarators = vec![parse_declarator_rest(parser, first)?];
    while parser.eat(&Token::Comma) {
        let name = parser.expect_identifier()?;
        declarators.push(parse_declarator_rest(parser, name)?);
    }
    Ok(declarators)
}

fn parse_declarator_rest(
    parser: &mut Parser,
    name: Identifier,
) -> Result<VariableDeclarator, ParseError> {
    let start = name.span;
    let dimensions = parse_dimensions(parser);
    let initializer = if parser.eat(&Token::Equal) {
        if parser.check(&Token::LeftBrace) {
            return Err(ParseError::unsupported("array initializers", parser.current_span()));
        }
        Some(expr::parse_expression(parser)?)
    } else {
        None
    };
    Ok(VariableDeclarator {
        name,
        dimensions,
        initializer,
        span: parser.span_from(&start),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ParseErrorKind;

    fn parse(source: &str) -> Result<CompilationUnit, Vec<ParseError>> {
        Parser::new(source).unwrap().parse()
    }

    #[test]
    fn test_package_and_imports() {
        let unit = parse("package a.b; import java.util.*; import c.D; class A {}").unwrap();
        assert_eq!(unit.package.unwrap().dotted(), "a.b");
        assert_eq!(unit.imports.len(), 2);
        assert!(unit.imports[0].wildcard);
        assert_eq!(unit.imports[0].name.dotted(), "java.util");
        assert!(!unit.imports[1].wildcard);
        assert_eq!(unit.imports[1].name.dotted(), "c.D");
    }

    #[test]
    fn test_modifiers() {
        let mut parser = Parser::new("@Override public static final x").unwrap();
        let modifiers = parse_modifiers(&mut parser).unwrap();
        assert_eq!(modifiers.access, Some(AccessModifier::Public));
        assert!(modifiers.is_static);
        assert!(modifiers.is_final);
        assert_eq!(modifiers.annotations, vec!["Override".to_string()]);
    }

    #[test]
    fn test_member_kinds() {
        let unit = parse(
            "class A extends B { int x, y = 2; A(int x) { } static void m(String[] a) {} static class N {} }",
        )
        .unwrap();
        let class = &unit.classes[0];
        assert_eq!(class.extends.as_ref().unwrap().display_name(), "B");
        assert!(matches!(&class.members[0], MemberDecl::Field(f) if f.declarators.len() == 2));
        assert!(matches!(&class.members[1], MemberDecl::Constructor(c) if c.params.len() == 1));
        assert!(matches!(&class.members[2], MemberDecl::Method(m) if m.modifiers.is_static));
        assert!(matches!(&class.members[3], MemberDecl::Class(c) if c.name.name == "N"));
    }

    #[test]
    fn test_abstract_method_has_no_body() {
        let unit = parse("abstract class A { abstract int f(); }").unwrap();
        match &unit.classes[0].members[0] {
            MemberDecl::Method(m) => assert!(m.body.is_none()),
            other => panic!("expected method, got {:?}", other),
        }
    }

    #[test]
    fn test_recovers_after_bad_member() {
        let errors = parse("class A { int = 3; void f( { } int ok; } class B { int = ; }").unwrap_err();
        assert!(errors.len() >= 2);
    }

    #[test]
    fn test_interfaces_unsupported() {
        let errors = parse("interface I {} class A {}").unwrap_err();
        assert!(matches!(
            &errors[0].kind,
            ParseErrorKind::Unsupported { feature } if feature == "interfaces"
        ));
    }

    #[test]
    fn test_array_initializer_unsupported() {
        let errors = parse("class A { int[] a = {1, 2}; }").unwrap_err();
        assert!(matches!(&errors[0].kind, ParseErrorKind::Unsupported { .. }));
    }
}
