//! Expression AST nodes

use super::*;
use crate::token::Span;

/// Expression node
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Literal value
    Literal(Literal),

    /// Bare identifier: `x`, `Foo`, or the first segment of `a.b.C`
    Name(Identifier),

    /// `this`
    This(Span),

    /// `target.name`
    FieldAccess(FieldAccess),

    /// `m(args)`, `target.m(args)`, `super.m(args)`
    MethodCall(MethodCall),

    /// `array[index]`
    ArrayAccess(ArrayAccess),

    /// `new C(args)`
    New(NewObject),

    /// `new T[n][m][]`
    NewArray(NewArray),

    /// Prefix or postfix unary operation
    Unary(UnaryExpression),

    /// Binary operation
    Binary(BinaryExpression),

    /// Assignment or compound assignment
    Assign(AssignExpression),

    /// `c ? a : b`
    Conditional(ConditionalExpression),

    /// `(T) e`
    Cast(CastExpression),

    /// `e instanceof T`
    InstanceOf(InstanceOfExpression),
}

impl Expression {
    /// Get the span of this expression
    pub fn span(&self) -> &Span {
        match self {
            Expression::Literal(e) => &e.span,
            Expression::Name(e) => &e.span,
            Expression::This(span) => span,
            Expression::FieldAccess(e) => &e.span,
            Expression::MethodCall(e) => &e.span,
            Expression::ArrayAccess(e) => &e.span,
            Expression::New(e) => &e.span,
            Expression::NewArray(e) => &e.span,
            Expression::Unary(e) => &e.span,
            Expression::Binary(e) => &e.span,
            Expression::Assign(e) => &e.span,
            Expression::Conditional(e) => &e.span,
            Expression::Cast(e) => &e.span,
            Expression::InstanceOf(e) => &e.span,
        }
    }

    /// Check if this expression can appear on the left of `=`
    pub fn is_assignable(&self) -> bool {
        matches!(
            self,
            Expression::Name(_) | Expression::FieldAccess(_) | Expression::ArrayAccess(_)
        )
    }

    /// The dotted name of a pure name chain such as `a.b.c`.
    pub fn as_dotted_name(&self) -> Option<Vec<String>> {
        match self {
            Expression::Name(id) => Some(vec![id.name.clone()]),
            Expression::FieldAccess(access) => {
                let mut names = access.target.as_dotted_name()?;
                names.push(access.name.name.clone());
                Some(names)
            }
            _ => None,
        }
    }
}

/// Literal values
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// `int` literal
    Int(i64),
    /// `long` literal
    Long(i128),
    /// `float` literal
    Float(f64),
    /// `double` literal
    Double(f64),
    /// `char` literal
    Char(char),
    /// String literal
    String(String),
    /// `true` or `false`
    Boolean(bool),
    /// `null`
    Null,
}

/// A literal occurrence
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    /// Value
    pub value: LiteralValue,
    /// Location
    pub span: Span,
}

/// `target.name`
#[derive(Debug, Clone, PartialEq)]
pub struct FieldAccess {
    /// Object, class name or package prefix
    pub target: Box<Expression>,
    /// Selected name
    pub name: Identifier,
    /// Location
    pub span: Span,
}

/// What a method call is invoked on
#[derive(Debug, Clone, PartialEq)]
pub enum CallTarget {
    /// No qualifier: `m()`
    Implicit,
    /// `super.m()`
    Super(Span),
    /// `e.m()`
    Expression(Box<Expression>),
}

/// Method invocation
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    /// Receiver
    pub target: CallTarget,
    /// Method name
    pub name: Identifier,
    /// Arguments
    pub args: Vec<Expression>,
    /// Location
    pub span: Span,
}

/// `array[index]`
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayAccess {
    /// Array expression
    pub array: Box<Expression>,
    /// Index expression
    pub index: Box<Expression>,
    /// Location
    pub span: Span,
}

/// `new C(args)`
#[derive(Debug, Clone, PartialEq)]
pub struct NewObject {
    /// Instantiated class
    pub class: TypeExpr,
    /// Constructor arguments
    pub args: Vec<Expression>,
    /// Location
    pub span: Span,
}

/// `new T[a][b][]`
#[derive(Debug, Clone, PartialEq)]
pub struct NewArray {
    /// Element type without dimensions
    pub element: TypeExpr,
    /// Sized dimensions, outermost first
    pub dimensions: Vec<Expression>,
    /// Trailing unsized `[]` pairs
    pub extra_dimensions: usize,
    /// Location
    pub span: Span,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    /// `+e`
    Plus,
    /// `-e`
    Minus,
    /// `!e`
    Not,
    /// `~e`
    BitNot,
    /// `++e`
    PreIncrement,
    /// `--e`
    PreDecrement,
    /// `e++`
    PostIncrement,
    /// `e--`
    PostDecrement,
}

impl UnaryOperator {
    /// Operator symbol.
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOperator::Plus => "+",
            UnaryOperator::Minus => "-",
            UnaryOperator::Not => "!",
            UnaryOperator::BitNot => "~",
            UnaryOperator::PreIncrement | UnaryOperator::PostIncrement => "++",
            UnaryOperator::PreDecrement | UnaryOperator::PostDecrement => "--",
        }
    }

    /// True for `e++` and `e--`.
    pub fn is_postfix(&self) -> bool {
        matches!(self, UnaryOperator::PostIncrement | UnaryOperator::PostDecrement)
    }

    /// True for the four increment/decrement forms.
    pub fn is_update(&self) -> bool {
        matches!(
            self,
            UnaryOperator::PreIncrement
                | UnaryOperator::PreDecrement
                | UnaryOperator::PostIncrement
                | UnaryOperator::PostDecrement
        )
    }
}

/// Unary expression
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpression {
    /// Operator
    pub op: UnaryOperator,
    /// Operand
    pub operand: Box<Expression>,
    /// Location
    pub span: Span,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Rem,
    /// `<<`
    Shl,
    /// `>>`
    Shr,
    /// `>>>`
    UShr,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    Le,
    /// `>=`
    Ge,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `&`
    BitAnd,
    /// `|`
    BitOr,
    /// `^`
    BitXor,
    /// `&&`
    And,
    /// `||`
    Or,
}

impl BinaryOperator {
    /// Operator symbol.
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Rem => "%",
            BinaryOperator::Shl => "<<",
            BinaryOperator::Shr => ">>",
            BinaryOperator::UShr => ">>>",
            BinaryOperator::Lt => "<",
            BinaryOperator::Gt => ">",
            BinaryOperator::Le => "<=",
            BinaryOperator::Ge => ">=",
            BinaryOperator::Eq => "==",
            BinaryOperator::Ne => "!=",
            BinaryOperator::BitAnd => "&",
            BinaryOperator::BitOr => "|",
            BinaryOperator::BitXor => "^",
            BinaryOperator::And => "&&",
            BinaryOperator::Or => "||",
        }
    }
}

/// Binary expression
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpression {
    /// Operator
    pub op: BinaryOperator,
    /// Left operand
    pub left: Box<Expression>,
    /// Right operand
    pub right: Box<Expression>,
    /// Location
    pub span: Span,
}

/// Assignment operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOperator {
    /// `=`
    Assign,
    /// Compound assignment `op=`
    Compound(BinaryOperator),
}

impl AssignOperator {
    /// Operator symbol, e.g. `+=`.
    pub fn as_str(&self) -> String {
        match self {
            AssignOperator::Assign => "=".to_string(),
            AssignOperator::Compound(op) => format!("{}=", op.as_str()),
        }
    }
}

/// Assignment expression
#[derive(Debug, Clone, PartialEq)]
pub struct AssignExpression {
    /// Operator
    pub op: AssignOperator,
    /// Assigned location
    pub target: Box<Expression>,
    /// Assigned value
    pub value: Box<Expression>,
    /// Location
    pub span: Span,
}

/// `c ? a : b`
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalExpression {
    /// Condition
    pub condition: Box<Expression>,
    /// Value when true
    pub then_expr: Box<Expression>,
    /// Value when false
    pub else_expr: Box<Expression>,
    /// Location
    pub span: Span,
}

/// `(T) e`
#[derive(Debug, Clone, PartialEq)]
pub struct CastExpression {
    /// Target type
    pub ty: TypeExpr,
    /// Operand
    pub expr: Box<Expression>,
    /// Location
    pub span: Span,
}

/// `e instanceof T`
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceOfExpression {
    /// Tested value
    pub expr: Box<Expression>,
    /// Tested type
    pub ty: TypeExpr,
    /// Location
    pub span: Span,
}
