//! Operator precedence table for expression parsing.
//!
//! Levels follow the Java Language Specification, lowest first.

use crate::ast::BinaryOperator;
use crate::token::Token;

/// Operator precedence level (higher = tighter binding).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    None = 0,
    Assignment = 1,      // =, +=, -=, etc.
    Conditional = 2,     // ?:
    LogicalOr = 3,       // ||
    LogicalAnd = 4,      // &&
    BitwiseOr = 5,       // |
    BitwiseXor = 6,      // ^
    BitwiseAnd = 7,      // &
    Equality = 8,        // ==, !=
    Relational = 9,      // <, >, <=, >=, instanceof
    Shift = 10,          // <<, >>, >>>
    Additive = 11,       // +, -
    Multiplicative = 12, // *, /, %
    Unary = 13,          // !, ~, +, -, ++, --, casts
}

impl Precedence {
    /// The next tighter level, used for left-associative operators.
    pub fn next(self) -> Precedence {
        match self {
            Precedence::None => Precedence::Assignment,
            Precedence::Assignment => Precedence::Conditional,
            Precedence::Conditional => Precedence::LogicalOr,
            Precedence::LogicalOr => Precedence::LogicalAnd,
            Precedence::LogicalAnd => Precedence::BitwiseOr,
            Precedence::BitwiseOr => Precedence::BitwiseXor,
            Precedence::BitwiseXor => Precedence::BitwiseAnd,
            Precedence::BitwiseAnd => Precedence::Equality,
            Precedence::Equality => Precedence::Relational,
            Precedence::Relational => Precedence::Shift,
            Precedence::Shift => Precedence::Additive,
            Precedence::Additive => Precedence::Multiplicative,
            Precedence::Multiplicative | Precedence::Unary => Precedence::Unary,
        }
    }
}

/// Get the precedence of a binary operator token.
pub fn get_precedence(token: &Token) -> Precedence {
    match token {
        // Assignment
        Token::Equal
        | Token::PlusEqual
        | Token::MinusEqual
        | Token::StarEqual
        | Token::SlashEqual
        | Token::PercentEqual
        | Token::AmpEqual
        | Token::PipeEqual
        | Token::CaretEqual
        | Token::LessLessEqual
        | Token::GreaterGreaterEqual
        | Token::GreaterGreaterGreaterEqual => Precedence::Assignment,

        Token::Question => Precedence::Conditional,
        Token::PipePipe => Precedence::LogicalOr,
        Token::AmpAmp => Precedence::LogicalAnd,
        Token::Pipe => Precedence::BitwiseOr,
        Token::Caret => Precedence::BitwiseXor,
        Token::Amp => Precedence::BitwiseAnd,
        Token::EqualEqual | Token::BangEqual => Precedence::Equality,
        Token::Less | Token::LessEqual | Token::Greater | Token::GreaterEqual | Token::Instanceof => {
            Precedence::Relational
        }
        Token::LessLess | Token::GreaterGreater | Token::GreaterGreaterGreater => Precedence::Shift,
        Token::Plus | Token::Minus => Precedence::Additive,
        Token::Star | Token::Slash | Token::Percent => Precedence::Multiplicative,

        _ => Precedence::None,
    }
}

/// Map a binary operator token to its AST operator.
pub fn binary_operator(token: &Token) -> Option<BinaryOperator> {
    let op = match token {
        Token::Plus => BinaryOperator::Add,
        Token::Minus => BinaryOperator::Sub,
        Token::Star => BinaryOperator::Mul,
        Token::Slash => BinaryOperator::Div,
        Token::Percent => BinaryOperator::Rem,
        Token::LessLess => BinaryOperator::Shl,
        Token::GreaterGreater => BinaryOperator::Shr,
        Token::GreaterGreaterGreater => BinaryOperator::UShr,
        Token::Less => BinaryOperator::Lt,
        Token::Greater => BinaryOperator::Gt,
        Token::LessEqual => BinaryOperator::Le,
        Token::GreaterEqual => BinaryOperator::Ge,
        Token::EqualEqual => BinaryOperator::Eq,
        Token::BangEqual => BinaryOperator::Ne,
        Token::Amp => BinaryOperator::BitAnd,
        Token::Pipe => BinaryOperator::BitOr,
        Token::Caret => BinaryOperator::BitXor,
        Token::AmpAmp => BinaryOperator::And,
        Token::PipePipe => BinaryOperator::Or,
        _ => return None,
    };
    Some(op)
}

/// Map a compound assignment token to the operator it applies.
pub fn compound_operator(token: &Token) -> Option<BinaryOperator> {
    let op = match token {
        Token::PlusEqual => BinaryOperator::Add,
        Token::MinusEqual => BinaryOperator::Sub,
        Token::StarEqual => BinaryOperator::Mul,
        Token::SlashEqual => BinaryOperator::Div,
        Token::PercentEqual => BinaryOperator::Rem,
        Token::AmpEqual => BinaryOperator::BitAnd,
        Token::PipeEqual => BinaryOperator::BitOr,
        Token::CaretEqual => BinaryOperator::BitXor,
        Token::LessLessEqual => BinaryOperator::Shl,
        Token::GreaterGreaterEqual => BinaryOperator::Shr,
        Token::GreaterGreaterGreaterEqual => BinaryOperator::UShr,
        _ => return None,
    };
    Some(op)
}
