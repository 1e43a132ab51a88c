//! Statement parsing

use super::decl::{parse_modifiers, parse_variable_declarators};
use super::expr::{parse_arguments, parse_expression};
use super::types::{parse_type, scan_type};
use super::{ParseError, Parser};
use crate::ast::*;
use crate::token::{Span, Token};

/// Parse `{ statements }`.
pub fn parse_block(parser: &mut Parser) -> Result<Block, ParseError> {
    let start = parser.current_span();
    parser.expect(Token::LeftBrace)?;
    let mut statements = Vec::new();
    while !parser.check(&Token::RightBrace) && !parser.at_eof() {
        statements.push(parse_statement(parser)?);
    }
    parser.expect(Token::RightBrace)?;
    Ok(Block {
        statements,
        span: parser.span_from(&start),
    })
}

/// Parse a statement.
pub fn parse_statement(parser: &mut Parser) -> Result<Statement, ParseError> {
    parser.enter()?;
    let result = parse_statement_inner(parser);
    parser.leave();
    result
}

fn parse_statement_inner(parser: &mut Parser) -> Result<Statement, ParseError> {
    let start = parser.current_span();
    match parser.current() {
        Token::LeftBrace => parse_block(parser).map(Statement::Block),
        Token::Semicolon => {
            parser.advance();
            Ok(Statement::Empty(start))
        }
        Token::If => parse_if(parser, start),
        Token::While => parse_while(parser, start),
        Token::Do => parse_do_while(parser, start),
        Token::For => parse_for(parser, start),
        Token::Switch => parse_switch(parser, start),
        Token::Return => {
            parser.advance();
            let value = if parser.check(&Token::Semicolon) {
                None
            } else {
                Some(parse_expression(parser)?)
            };
            parser.expect(Token::Semicolon)?;
            Ok(Statement::Return(ReturnStatement {
                value,
                span: parser.span_from(&start),
            }))
        }
        Token::Break | Token::Continue => {
            let is_break = parser.check(&Token::Break);
            parser.advance();
            if matches!(parser.current(), Token::Identifier(_)) {
                return Err(ParseError::unsupported("labeled statements", parser.current_span()));
            }
            parser.expect(Token::Semicolon)?;
            let span = parser.span_from(&start);
            Ok(if is_break {
                Statement::Break(span)
            } else {
                Statement::Continue(span)
            })
        }
        Token::This | Token::Super if matches!(parser.peek(), Some(Token::LeftParen)) => {
            let kind = if parser.check(&Token::This) {
                ConstructorCallKind::This
            } else {
                ConstructorCallKind::Super
            };
            parser.advance();
            let args = parse_arguments(parser)?;
            parser.expect(Token::Semicolon)?;
            Ok(Statement::ConstructorCall(ConstructorCall {
                kind,
                args,
                span: parser.span_from(&start),
            }))
        }
        Token::Try | Token::Throw | Token::Catch | Token::Finally => {
            Err(ParseError::unsupported("exceptions", start))
        }
        Token::Class | Token::Interface | Token::Enum => {
            Err(ParseError::unsupported("local classes", start))
        }
        Token::Synchronized => Err(ParseError::unsupported("synchronized blocks", start)),
        Token::Identifier(_) if matches!(parser.peek(), Some(Token::Colon)) => {
            Err(ParseError::unsupported("labeled statements", start))
        }
        Token::Final | Token::At => {
            parse_modifiers(parser)?;
            let decl = parse_local_declaration(parser, start)?;
            parser.expect(Token::Semicolon)?;
            Ok(Statement::LocalVariable(decl))
        }
        _ if looks_like_local_declaration(parser) => {
            let decl = parse_local_declaration(parser, start)?;
            parser.expect(Token::Semicolon)?;
            Ok(Statement::LocalVariable(decl))
        }
        _ => {
            let expression = parse_expression(parser)?;
            if !is_statement_expression(&expression) {
                return Err(ParseError::invalid_syntax("Not a statement", *expression.span()));
            }
            parser.expect(Token::Semicolon)?;
            Ok(Statement::Expression(ExpressionStatement {
                expression,
                span: parser.span_from(&start),
            }))
        }
    }
}

/// A type followed by an identifier starts a local declaration.
fn looks_like_local_declaration(parser: &Parser) -> bool {
    scan_type(parser, parser.mark())
        .is_some_and(|end| matches!(parser.token_at(end), Token::Identifier(_)))
}

fn is_statement_expression(expression: &Expression) -> bool {
    match expression {
        Expression::Assign(_) | Expression::MethodCall(_) | Expression::New(_) => true,
        Expression::Unary(unary) => unary.op.is_update(),
        _ => false,
    }
}

fn parse_local_declaration(parser: &mut Parser, start: Span) -> Result<LocalVariableDecl, ParseError> {
    let ty = parse_type(parser)?;
    if ty.is_void() {
        return Err(ParseError::invalid_syntax("Variables cannot have type 'void'", ty.span));
    }
    let name = parser.expect_identifier()?;
    let declarators = parse_variable_declarators(parser, name)?;
    Ok(LocalVariableDecl {
        ty,
        declarators,
        span: parser.span_from(&start),
    })
}

fn parse_condition(parser: &mut Parser) -> Result<Expression, ParseError> {
    parser.expect(Token::LeftParen)?;
    let condition = parse_expression(parser)?;
    parser.expect(Token::RightParen)?;
    Ok(condition)
}

fn parse_if(parser: &mut Parser, start: Span) -> Result<Statement, ParseError> {
    parser.expect(Token::If)?;
    let condition = parse_condition(parser)?;
    let then_branch = Box::new(parse_statement(parser)?);
    let else_branch = if parser.eat(&Token::Else) {
        Some(Box::new(parse_statement(parser)?))
    } else {
        None
    };
    Ok(Statement::If(IfStatement {
        condition,
        then_branch,
        else_branch,
        span: parser.span_from(&start),
    }))
}

fn parse_while(parser: &mut Parser, start: Span) -> Result<Statement, ParseError> {
    parser.expect(Token::While)?;
    let condition = parse_condition(parser)?;
    let body = Box::new(parse_statement(parser)?);
    Ok(Statement::While(WhileStatement {
        condition,
        body,
        span: parser.span_from(&start),
    }))
}

fn parse_do_while(parser: &mut Parser, start: Span) -> Result<Statement, ParseError> {
    parser.expect(Token::Do)?;
    let body = Box::new(parse_statement(parser)?);
    parser.expect(Token::While)?;
    let condition = parse_condition(parser)?;
    parser.expect(Token::Semicolon)?;
    Ok(Statement::DoWhile(DoWhileStatement {
        body,
        condition,
        span: parser.span_from(&start),
    }))
}

fn parse_expression_list(parser: &mut Parser) -> Result<Vec<Expression>, ParseError> {
    let mut expressions = vec![parse_expression(parser)?];
    while parser.eat(&Token::Comma) {
        expressions.push(parse_expression(parser)?);
    }
    Ok(expressions)
}

fn parse_for(parser: &mut Parser, start: Span) -> Result<Statement, ParseError> {
    parser.expect(Token::For)?;
    parser.expect(Token::LeftParen)?;

    let init_start = parser.current_span();
    if parser.check(&Token::Final) {
        parse_modifiers(parser)?;
    }

    let init = if looks_like_local_declaration(parser) {
        let ty = parse_type(parser)?;
        let name = parser.expect_identifier()?;

        if parser.eat(&Token::Colon) {
            let iterable = parse_expression(parser)?;
            parser.expect(Token::RightParen)?;
            let body = Box::new(parse_statement(parser)?);
            return Ok(Statement::ForEach(ForEachStatement {
                ty,
                name,
                iterable,
                body,
                span: parser.span_from(&start),
            }));
        }

        let declarators = parse_variable_declarators(parser, name)?;
        Some(ForInit::Declaration(LocalVariableDecl {
            ty,
            declarators,
            span: parser.span_from(&init_start),
        }))
    } else if parser.check(&Token::Semicolon) {
        None
    } else {
        Some(ForInit::Expressions(parse_expression_list(parser)?))
    };
    parser.expect(Token::Semicolon)?;

    let condition = if parser.check(&Token::Semicolon) {
        None
    } else {
        Some(parse_expression(parser)?)
    };
    parser.expect(Token::Semicolon)?;

    let update = if parser.check(&Token::RightParen) {
        Vec::new()
    } else {
        parse_expression_list(parser)?
    };
    parser.expect(Token::RightParen)?;

    let body = Box::new(parse_statement(parser)?);
    Ok(Statement::For(ForStatement {
        init,
        condition,
        update,
        body,
        span: parser.span_from(&start),
    }))
}

fn parse_switch(parser: &mut Parser, start: Span) -> Result<Statement, ParseError> {
    parser.expect(Token::Switch)?;
    let discriminant = parse_condition(parser)?;
    parser.expect(Token::LeftBrace)?;

    let mut cases = Vec::new();
    while !parser.check(&Token::RightBrace) && !parser.at_eof() {
        let case_start = parser.current_span();
        let label = if parser.eat(&Token::Case) {
            Some(parse_expression(parser)?)
        } else if parser.eat(&Token::Default) {
            None
        } else {
            return Err(parser.unexpected_token(&[Token::Case, Token::Default]));
        };
        if parser.check(&Token::Arrow) {
            return Err(ParseError::unsupported("switch rules", parser.current_span()));
        }
        parser.expect(Token::Colon)?;

        let mut body = Vec::new();
        while !parser.check_any(&[Token::Case, Token::Default, Token::RightBrace]) && !parser.at_eof() {
            body.push(parse_statement(parser)?);
        }
        cases.push(SwitchCase {
            label,
            body,
            span: parser.span_from(&case_start),
        });
    }
    parser.expect(Token::RightBrace)?;

    Ok(Statement::Switch(SwitchStatement {
        discriminant,
        cases,
        span: parser.span_from(&start),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ParseErrorKind;

    fn parse(source: &str) -> Result<Statement, ParseError> {
        let mut parser = Parser::new(source).unwrap();
        parse_statement(&mut parser)
    }

    #[test]
    fn test_local_declaration() {
        match parse("String[] names = null, other;").unwrap() {
            Statement::LocalVariable(decl) => {
                assert_eq!(decl.ty.display_name(), "String[]");
                assert_eq!(decl.declarators.len(), 2);
                assert!(decl.declarators[0].initializer.is_some());
            }
            other => panic!("expected declaration, got {:?}", other),
        }
    }

    #[test]
    fn test_qualified_local_declaration() {
        assert!(matches!(
            parse("a.b.C x = y;").unwrap(),
            Statement::LocalVariable(_)
        ));
        assert!(matches!(
            parse("a.b = y;").unwrap(),
            Statement::Expression(_)
        ));
        assert!(matches!(
            parse("a[i] = y;").unwrap(),
            Statement::Expression(_)
        ));
    }

    #[test]
    fn test_for_loops() {
        match parse("for (int i = 0, j = 1; i < 10; i++, j--) {}").unwrap() {
            Statement::For(f) => {
                assert!(matches!(f.init, Some(ForInit::Declaration(ref d)) if d.declarators.len() == 2));
                assert!(f.condition.is_some());
                assert_eq!(f.update.len(), 2);
            }
            other => panic!("expected for, got {:?}", other),
        }
        assert!(matches!(parse("for (;;) ;").unwrap(), Statement::For(_)));
        assert!(matches!(
            parse("for (String s : args) f(s);").unwrap(),
            Statement::ForEach(_)
        ));
    }

    #[test]
    fn test_switch() {
        match parse("switch (x) { case 1: case 2: f(); break; default: g(); }").unwrap() {
            Statement::Switch(s) => {
                assert_eq!(s.cases.len(), 3);
                assert!(s.cases[0].body.is_empty());
                assert_eq!(s.cases[1].body.len(), 2);
                assert!(s.cases[2].label.is_none());
            }
            other => panic!("expected switch, got {:?}", other),
        }
    }

    #[test]
    fn test_constructor_calls() {
        assert!(matches!(
            parse("super(1, 2);").unwrap(),
            Statement::ConstructorCall(ConstructorCall { kind: ConstructorCallKind::Super, .. })
        ));
        assert!(matches!(
            parse("this();").unwrap(),
            Statement::ConstructorCall(ConstructorCall { kind: ConstructorCallKind::This, .. })
        ));
    }

    #[test]
    fn test_dangling_else_binds_inner() {
        match parse("if (a) if (b) x(); else y();").unwrap() {
            Statement::If(outer) => {
                assert!(outer.else_branch.is_none());
                assert!(matches!(*outer.then_branch, Statement::If(ref inner) if inner.else_branch.is_some()));
            }
            other => panic!("expected if, got {:?}", other),
        }
    }

    #[test]
    fn test_not_a_statement() {
        let err = parse("a + b;").unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::InvalidSyntax { .. }));
    }

    #[test]
    fn test_exceptions_unsupported() {
        let err = parse("throw x;").unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::Unsupported { .. }));
    }
}
