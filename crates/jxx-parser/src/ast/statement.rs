//! Statement AST nodes

use super::*;
use crate::token::Span;

/// `{ ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// Statements in order
    pub statements: Vec<Statement>,
    /// Location
    pub span: Span,
}

/// Block-level statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Nested block
    Block(Block),

    /// Local variable declaration
    LocalVariable(LocalVariableDecl),

    /// Expression statement (e.g., method call)
    Expression(ExpressionStatement),

    /// If statement
    If(IfStatement),

    /// While loop
    While(WhileStatement),

    /// Do-while loop
    DoWhile(DoWhileStatement),

    /// Classic for loop
    For(ForStatement),

    /// Enhanced for loop over an array
    ForEach(ForEachStatement),

    /// Switch on an integral value
    Switch(SwitchStatement),

    /// Return statement
    Return(ReturnStatement),

    /// Break statement
    Break(Span),

    /// Continue statement
    Continue(Span),

    /// `super(...)` or `this(...)` as the first statement of a constructor
    ConstructorCall(ConstructorCall),

    /// Empty statement (;)
    Empty(Span),
}

impl Statement {
    /// Get the span of this statement
    pub fn span(&self) -> &Span {
        match self {
            Statement::Block(s) => &s.span,
            Statement::LocalVariable(s) => &s.span,
            Statement::Expression(s) => &s.span,
            Statement::If(s) => &s.span,
            Statement::While(s) => &s.span,
            Statement::DoWhile(s) => &s.span,
            Statement::For(s) => &s.span,
            Statement::ForEach(s) => &s.span,
            Statement::Switch(s) => &s.span,
            Statement::Return(s) => &s.span,
            Statement::ConstructorCall(s) => &s.span,
            Statement::Break(span) | Statement::Continue(span) | Statement::Empty(span) => span,
        }
    }
}

/// `int x = 1, y[];`
#[derive(Debug, Clone, PartialEq)]
pub struct LocalVariableDecl {
    /// Declared type
    pub ty: TypeExpr,
    /// One entry per declared name
    pub declarators: Vec<VariableDeclarator>,
    /// Location
    pub span: Span,
}

/// Expression followed by `;`
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStatement {
    /// The expression
    pub expression: Expression,
    /// Location
    pub span: Span,
}

/// `if (c) a else b`
#[derive(Debug, Clone, PartialEq)]
pub struct IfStatement {
    /// Condition
    pub condition: Expression,
    /// Taken branch
    pub then_branch: Box<Statement>,
    /// `else` branch
    pub else_branch: Option<Box<Statement>>,
    /// Location
    pub span: Span,
}

/// `while (c) body`
#[derive(Debug, Clone, PartialEq)]
pub struct WhileStatement {
    /// Condition
    pub condition: Expression,
    /// Loop body
    pub body: Box<Statement>,
    /// Location
    pub span: Span,
}

/// `do body while (c);`
#[derive(Debug, Clone, PartialEq)]
pub struct DoWhileStatement {
    /// Loop body
    pub body: Box<Statement>,
    /// Condition
    pub condition: Expression,
    /// Location
    pub span: Span,
}

/// Initializer part of a classic for loop
#[derive(Debug, Clone, PartialEq)]
pub enum ForInit {
    /// `int i = 0`
    Declaration(LocalVariableDecl),
    /// `i = 0, j = 1`
    Expressions(Vec<Expression>),
}

/// `for (init; cond; update) body`
#[derive(Debug, Clone, PartialEq)]
pub struct ForStatement {
    /// Initializer
    pub init: Option<ForInit>,
    /// Condition, absent means `true`
    pub condition: Option<Expression>,
    /// Update expressions
    pub update: Vec<Expression>,
    /// Loop body
    pub body: Box<Statement>,
    /// Location
    pub span: Span,
}

/// `for (T x : array) body`
#[derive(Debug, Clone, PartialEq)]
pub struct ForEachStatement {
    /// Declared element type
    pub ty: TypeExpr,
    /// Loop variable
    pub name: Identifier,
    /// The array being iterated
    pub iterable: Expression,
    /// Loop body
    pub body: Box<Statement>,
    /// Location
    pub span: Span,
}

/// `switch (x) { case 1: ... default: ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchStatement {
    /// Switched value
    pub discriminant: Expression,
    /// Case groups in order
    pub cases: Vec<SwitchCase>,
    /// Location
    pub span: Span,
}

/// One `case` or `default` label with the statements following it.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    /// Case constant, `None` for `default`
    pub label: Option<Expression>,
    /// Statements until the next label
    pub body: Vec<Statement>,
    /// Location
    pub span: Span,
}

/// `return x;`
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStatement {
    /// Returned value
    pub value: Option<Expression>,
    /// Location
    pub span: Span,
}

/// Which constructor an explicit constructor call targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructorCallKind {
    /// `super(...)`
    Super,
    /// `this(...)`
    This,
}

/// `super(args);` or `this(args);`
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructorCall {
    /// Target
    pub kind: ConstructorCallKind,
    /// Arguments
    pub args: Vec<Expression>,
    /// Location
    pub span: Span,
}
