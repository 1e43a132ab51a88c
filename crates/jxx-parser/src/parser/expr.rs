//! Expression parsing
//!
//! Precedence climbing for binary operators; recursive descent for
//! everything else. A parenthesized type is read as a cast when it names a
//! primitive or array type, or when the token after `)` can only start an
//! operand.

use super::precedence::{binary_operator, compound_operator, get_precedence, Precedence};
use super::types::{parse_base_type, parse_dimensions, parse_type, primitive_keyword, scan_type};
use super::{ParseError, Parser};
use crate::ast::*;
use crate::token::Token;

type ExprResult = Result<Expression, ParseError>;

fn guarded(parser: &mut Parser, parse: fn(&mut Parser) -> ExprResult) -> ExprResult {
    parser.enter()?;
    let result = parse(parser);
    parser.leave();
    result
}

/// Parse a full expression, assignments included.
pub fn parse_expression(parser: &mut Parser) -> ExprResult {
    guarded(parser, parse_assignment)
}

/// Parse `(a, b, c)`.
pub fn parse_arguments(parser: &mut Parser) -> Result<Vec<Expression>, ParseError> {
    parser.expect(Token::LeftParen)?;
    let mut args = Vec::new();
    if !parser.check(&Token::RightParen) {
        loop {
            args.push(parse_expression(parser)?);
            if !parser.eat(&Token::Comma) {
                break;
            }
        }
    }
    parser.expect(Token::RightParen)?;
    Ok(args)
}

fn parse_assignment(parser: &mut Parser) -> ExprResult {
    let target = parse_conditional(parser)?;

    let op = match parser.current() {
        Token::Equal => Some(AssignOperator::Assign),
        Token::Arrow => {
            return Err(ParseError::unsupported("lambda expressions", parser.current_span()));
        }
        tok => compound_operator(tok).map(AssignOperator::Compound),
    };
    let Some(op) = op else {
        return Ok(target);
    };

    if !target.is_assignable() {
        return Err(ParseError::invalid_syntax(
            "Invalid assignment target",
            *target.span(),
        ));
    }
    parser.advance();
    let value = parse_expression(parser)?;
    let span = target.span().merge(value.span());
    Ok(Expression::Assign(AssignExpression {
        op,
        target: Box::new(target),
        value: Box::new(value),
        span,
    }))
}

fn parse_conditional(parser: &mut Parser) -> ExprResult {
    let condition = parse_binary(parser, Precedence::LogicalOr)?;
    if !parser.eat(&Token::Question) {
        return Ok(condition);
    }
    let then_expr = parse_expression(parser)?;
    parser.expect(Token::Colon)?;
    let else_expr = guarded(parser, parse_conditional)?;
    let span = condition.span().merge(else_expr.span());
    Ok(Expression::Conditional(ConditionalExpression {
        condition: Box::new(condition),
        then_expr: Box::new(then_expr),
        else_expr: Box::new(else_expr),
        span,
    }))
}

fn parse_binary(parser: &mut Parser, min: Precedence) -> ExprResult {
    let mut left = parse_unary(parser)?;
    loop {
        let precedence = get_precedence(parser.current());
        if precedence < min {
            break;
        }

        if parser.eat(&Token::Instanceof) {
            let ty = parse_type(parser)?;
            let span = left.span().merge(&ty.span);
            left = Expression::InstanceOf(InstanceOfExpression {
                expr: Box::new(left),
                ty,
                span,
            });
            continue;
        }

        let Some(op) = binary_operator(parser.current()) else {
            break;
        };
        parser.advance();
        let right = parse_binary(parser, precedence.next())?;
        let span = left.span().merge(right.span());
        left = Expression::Binary(BinaryExpression {
            op,
            left: Box::new(left),
            right: Box::new(right),
            span,
        });
    }
    Ok(left)
}

fn parse_unary(parser: &mut Parser) -> ExprResult {
    let start = parser.current_span();
    let op = match parser.current() {
        Token::Plus => Some(UnaryOperator::Plus),
        Token::Minus => Some(UnaryOperator::Minus),
        Token::Bang => Some(UnaryOperator::Not),
        Token::Tilde => Some(UnaryOperator::BitNot),
        Token::PlusPlus => Some(UnaryOperator::PreIncrement),
        Token::MinusMinus => Some(UnaryOperator::PreDecrement),
        _ => None,
    };

    if let Some(op) = op {
        parser.advance();
        let operand = guarded(parser, parse_unary)?;
        if op.is_update() && !operand.is_assignable() {
            return Err(ParseError::invalid_syntax(
                format!("Operand of '{}' must be a variable", op.as_str()),
                *operand.span(),
            ));
        }
        let span = start.merge(operand.span());
        return Ok(Expression::Unary(UnaryExpression {
            op,
            operand: Box::new(operand),
            span,
        }));
    }

    if parser.check(&Token::LeftParen) && is_cast(parser) {
        parser.advance();
        let ty = parse_type(parser)?;
        parser.expect(Token::RightParen)?;
        let operand = guarded(parser, parse_unary)?;
        let span = start.merge(operand.span());
        return Ok(Expression::Cast(CastExpression {
            ty,
            expr: Box::new(operand),
            span,
        }));
    }

    let primary = parse_primary(parser)?;
    parse_postfix(parser, primary)
}

/// Decide whether the `(` at the current position opens a cast.
fn is_cast(parser: &Parser) -> bool {
    let open = parser.mark();
    let Some(close) = scan_type(parser, open + 1) else {
        return false;
    };
    if !matches!(parser.token_at(close), Token::RightParen) {
        return false;
    }
    let primitive = primitive_keyword(parser.token_at(open + 1)).is_some();
    let array = matches!(parser.token_at(close - 1), Token::RightBracket);
    if primitive || array {
        return true;
    }
    let next = parser.token_at(close + 1);
    next.is_literal()
        || matches!(
            next,
            Token::Identifier(_)
                | Token::LeftParen
                | Token::This
                | Token::Super
                | Token::New
                | Token::Bang
                | Token::Tilde
        )
}

fn parse_primary(parser: &mut Parser) -> ExprResult {
    let start = parser.current_span();
    let literal = match parser.current() {
        Token::IntLiteral(v) => Some(LiteralValue::Int(*v)),
        Token::LongLiteral(v) => Some(LiteralValue::Long(*v)),
        Token::FloatLiteral(v) => Some(LiteralValue::Float(*v)),
        Token::DoubleLiteral(v) => Some(LiteralValue::Double(*v)),
        Token::CharLiteral(c) => Some(LiteralValue::Char(*c)),
        Token::StringLiteral(s) => Some(LiteralValue::String(s.clone())),
        Token::True => Some(LiteralValue::Boolean(true)),
        Token::False => Some(LiteralValue::Boolean(false)),
        Token::Null => Some(LiteralValue::Null),
        _ => None,
    };
    if let Some(value) = literal {
        parser.advance();
        return Ok(Expression::Literal(Literal { value, span: start }));
    }

    match parser.current().clone() {
        Token::This => {
            parser.advance();
            if parser.check(&Token::LeftParen) {
                return Err(ParseError::invalid_syntax(
                    "Call to this(...) must be the first statement in a constructor",
                    start,
                ));
            }
            Ok(Expression::This(start))
        }
        Token::Super => {
            parser.advance();
            if parser.check(&Token::LeftParen) {
                return Err(ParseError::invalid_syntax(
                    "Call to super(...) must be the first statement in a constructor",
                    start,
                ));
            }
            parser.expect(Token::Dot)?;
            let name = parser.expect_identifier()?;
            if !parser.check(&Token::LeftParen) {
                return Err(ParseError::unsupported("super field accesses", name.span));
            }
            let args = parse_arguments(parser)?;
            Ok(Expression::MethodCall(MethodCall {
                target: CallTarget::Super(start),
                name,
                args,
                span: parser.span_from(&start),
            }))
        }
        Token::Identifier(_) => {
            let name = parser.expect_identifier()?;
            if parser.check(&Token::LeftParen) {
                let args = parse_arguments(parser)?;
                return Ok(Expression::MethodCall(MethodCall {
                    target: CallTarget::Implicit,
                    name,
                    args,
                    span: parser.span_from(&start),
                }));
            }
            Ok(Expression::Name(name))
        }
        Token::LeftParen => {
            parser.advance();
            let inner = parse_expression(parser)?;
            parser.expect(Token::RightParen)?;
            Ok(inner)
        }
        Token::New => parse_new(parser),
        tok if tok.is_primitive_type() => Err(ParseError::unsupported("class literals", start)),
        Token::Eof => Err(ParseError::unexpected_eof(Vec::new(), start)),
        tok => Err(ParseError::invalid_syntax(
            format!("Expected expression, found '{}'", tok),
            start,
        )),
    }
}

fn parse_new(parser: &mut Parser) -> ExprResult {
    let start = parser.current_span();
    parser.expect(Token::New)?;
    let element = parse_base_type(parser)?;

    if parser.check(&Token::LeftParen) {
        if matches!(element.kind, TypeExprKind::Primitive(_)) {
            return Err(ParseError::invalid_syntax(
                format!("Cannot instantiate primitive type '{}'", element.display_name()),
                element.span,
            ));
        }
        let args = parse_arguments(parser)?;
        if parser.check(&Token::LeftBrace) {
            return Err(ParseError::unsupported("anonymous classes", parser.current_span()));
        }
        return Ok(Expression::New(NewObject {
            class: element,
            args,
            span: parser.span_from(&start),
        }));
    }

    if !parser.check(&Token::LeftBracket) {
        return Err(parser.unexpected_token(&[Token::LeftParen, Token::LeftBracket]));
    }

    let mut dimensions = Vec::new();
    while parser.check(&Token::LeftBracket) && !matches!(parser.peek(), Some(Token::RightBracket)) {
        parser.advance();
        dimensions.push(parse_expression(parser)?);
        parser.expect(Token::RightBracket)?;
    }
    let extra_dimensions = parse_dimensions(parser);
    if dimensions.is_empty() || parser.check(&Token::LeftBrace) {
        return Err(ParseError::unsupported("array initializers", parser.current_span()));
    }

    Ok(Expression::NewArray(NewArray {
        element,
        dimensions,
        extra_dimensions,
        span: parser.span_from(&start),
    }))
}

fn parse_postfix(parser: &mut Parser, mut expr: Expression) -> ExprResult {
    loop {
        let start = *expr.span();
        match parser.current() {
            Token::Dot => {
                parser.advance();
                match parser.current() {
                    Token::Identifier(_) => {}
                    Token::Class => {
                        return Err(ParseError::unsupported("class literals", parser.current_span()));
                    }
                    Token::New => {
                        return Err(ParseError::unsupported(
                            "inner class creations",
                            parser.current_span(),
                        ));
                    }
                    Token::This => {
                        return Err(ParseError::unsupported("qualified this", parser.current_span()));
                    }
                    _ => return Err(parser.unexpected_token(&[Token::Identifier(String::new())])),
                }
                let name = parser.expect_identifier()?;
                expr = if parser.check(&Token::LeftParen) {
                    let args = parse_arguments(parser)?;
                    Expression::MethodCall(MethodCall {
                        target: CallTarget::Expression(Box::new(expr)),
                        name,
                        args,
                        span: parser.span_from(&start),
                    })
                } else {
                    Expression::FieldAccess(FieldAccess {
                        target: Box::new(expr),
                        name,
                        span: parser.span_from(&start),
                    })
                };
            }
            Token::LeftBracket => {
                parser.advance();
                let index = parse_expression(parser)?;
                parser.expect(Token::RightBracket)?;
                expr = Expression::ArrayAccess(ArrayAccess {
                    array: Box::new(expr),
                    index: Box::new(index),
                    span: parser.span_from(&start),
                });
            }
            Token::PlusPlus | Token::MinusMinus => {
                let op = if parser.check(&Token::PlusPlus) {
                    UnaryOperator::PostIncrement
                } else {
                    UnaryOperator::PostDecrement
                };
                if !expr.is_assignable() {
                    return Err(ParseError::invalid_syntax(
                        format!("Operand of '{}' must be a variable", op.as_str()),
                        start,
                    ));
                }
                parser.advance();
                expr = Expression::Unary(UnaryExpression {
                    op,
                    operand: Box::new(expr),
                    span: parser.span_from(&start),
                });
            }
            _ => return Ok(expr),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ParseErrorKind;

    fn parse(source: &str) -> Expression {
        let mut parser = Parser::new(source).unwrap();
        parse_expression(&mut parser).unwrap()
    }

    fn parse_err(source: &str) -> ParseError {
        let mut parser = Parser::new(source).unwrap();
        parse_expression(&mut parser).unwrap_err()
    }

    #[test]
    fn test_precedence() {
        match parse("1 + 2 * 3") {
            Expression::Binary(add) => {
                assert_eq!(add.op, BinaryOperator::Add);
                assert!(matches!(*add.right, Expression::Binary(ref mul) if mul.op == BinaryOperator::Mul));
            }
            other => panic!("expected binary, got {:?}", other),
        }
    }

    #[test]
    fn test_left_associative() {
        match parse("a - b - c") {
            Expression::Binary(outer) => {
                assert!(matches!(*outer.left, Expression::Binary(_)));
                assert!(matches!(*outer.right, Expression::Name(_)));
            }
            other => panic!("expected binary, got {:?}", other),
        }
    }

    #[test]
    fn test_assignment_is_right_associative() {
        match parse("a = b += 1") {
            Expression::Assign(outer) => {
                assert_eq!(outer.op, AssignOperator::Assign);
                assert!(matches!(
                    *outer.value,
                    Expression::Assign(ref inner) if inner.op == AssignOperator::Compound(BinaryOperator::Add)
                ));
            }
            other => panic!("expected assignment, got {:?}", other),
        }
    }

    #[test]
    fn test_casts() {
        assert!(matches!(parse("(int) x"), Expression::Cast(_)));
        assert!(matches!(parse("(A) x"), Expression::Cast(_)));
        assert!(matches!(parse("(a.B[]) x"), Expression::Cast(_)));
        assert!(matches!(parse("(int) -x"), Expression::Cast(_)));
        assert!(matches!(parse("(a) + b"), Expression::Binary(_)));
        assert!(matches!(parse("(a)"), Expression::Name(_)));
    }

    #[test]
    fn test_instanceof_binds_tighter_than_equality() {
        match parse("a instanceof B == c") {
            Expression::Binary(eq) => assert!(matches!(*eq.left, Expression::InstanceOf(_))),
            other => panic!("expected binary, got {:?}", other),
        }
    }

    #[test]
    fn test_call_chains() {
        match parse("a.b.c(1).d[2]") {
            Expression::ArrayAccess(access) => match *access.array {
                Expression::FieldAccess(ref field) => {
                    assert_eq!(field.name.name, "d");
                    assert!(matches!(*field.target, Expression::MethodCall(ref call) if call.name.name == "c"));
                }
                ref other => panic!("expected field access, got {:?}", other),
            },
            other => panic!("expected array access, got {:?}", other),
        }
    }

    #[test]
    fn test_super_call() {
        match parse("super.toString()") {
            Expression::MethodCall(call) => assert!(matches!(call.target, CallTarget::Super(_))),
            other => panic!("expected call, got {:?}", other),
        }
    }

    #[test]
    fn test_new_array() {
        match parse("new int[3][4][]") {
            Expression::NewArray(array) => {
                assert_eq!(array.dimensions.len(), 2);
                assert_eq!(array.extra_dimensions, 1);
            }
            other => panic!("expected array creation, got {:?}", other),
        }
        assert!(matches!(parse("new a.B(1, 2)"), Expression::New(_)));
    }

    #[test]
    fn test_conditional() {
        match parse("a ? b : c ? d : e") {
            Expression::Conditional(cond) => {
                assert!(matches!(*cond.else_expr, Expression::Conditional(_)));
            }
            other => panic!("expected conditional, got {:?}", other),
        }
    }

    #[test]
    fn test_postfix_and_prefix() {
        assert!(matches!(
            parse("i++"),
            Expression::Unary(UnaryExpression { op: UnaryOperator::PostIncrement, .. })
        ));
        assert!(matches!(
            parse("--a[0]"),
            Expression::Unary(UnaryExpression { op: UnaryOperator::PreDecrement, .. })
        ));
    }

    #[test]
    fn test_invalid_targets() {
        assert!(matches!(parse_err("1 = 2").kind, ParseErrorKind::InvalidSyntax { .. }));
        assert!(matches!(parse_err("f()++").kind, ParseErrorKind::InvalidSyntax { .. }));
    }

    #[test]
    fn test_unsupported_forms() {
        assert!(matches!(parse_err("new int[] {1}").kind, ParseErrorKind::Unsupported { .. }));
        assert!(matches!(parse_err("A.class").kind, ParseErrorKind::Unsupported { .. }));
    }

    #[test]
    fn test_deep_nesting_hits_limit() {
        let kind = std::thread::Builder::new()
            .stack_size(32 * 1024 * 1024)
            .spawn(|| {
                let source = format!("{}1{}", "(".repeat(400), ")".repeat(400));
                parse_err(&source).kind
            })
            .unwrap()
            .join()
            .unwrap();
        assert_eq!(kind, ParseErrorKind::ParserLimitExceeded);
    }
}
