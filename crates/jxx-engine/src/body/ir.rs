//! Typed body IR
//!
//! Every expression carries its static type and every name is classified.
//! Method calls and constructor calls point at their resolved slots so the
//! lowering never searches the class table again.

use crate::model::ClassId;
use jxx_parser::ast::{BinaryOperator, LiteralValue, UnaryOperator};
use jxx_parser::Span;
use jxx_types::Type;

/// A braced statement list
#[derive(Debug, Clone, PartialEq)]
pub struct TypedBlock {
    /// Statements in order
    pub statements: Vec<TypedStmt>,
    /// Location
    pub span: Span,
}

/// One local variable of a declaration statement
#[derive(Debug, Clone, PartialEq)]
pub struct TypedLocal {
    /// C++ name
    pub name: String,
    /// Declared type
    pub ty: Type,
    /// Initializer
    pub init: Option<TypedExpr>,
}

/// A `case` or `default` arm
#[derive(Debug, Clone, PartialEq)]
pub struct TypedCase {
    /// Label, `None` for `default`
    pub label: Option<TypedExpr>,
    /// Statements of the arm
    pub body: Vec<TypedStmt>,
}

/// Which constructor an explicit constructor call chains to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainKind {
    /// `super(...)`
    Super,
    /// `this(...)`
    This,
}

/// Resolved `super(...)` or `this(...)` call of a constructor
#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    /// Chain target
    pub kind: ChainKind,
    /// Class of the target constructor
    pub class: ClassId,
    /// Position in that class's constructor list
    pub index: usize,
    /// Arguments
    pub args: Vec<TypedExpr>,
}

/// Statements
#[derive(Debug, Clone, PartialEq)]
pub enum TypedStmt {
    /// `{ ... }`
    Block(TypedBlock),
    /// Local variable declarations
    Locals(Vec<TypedLocal>),
    /// Expression statement
    Expr(TypedExpr),
    /// `if`
    If {
        /// Boolean condition
        condition: TypedExpr,
        /// Taken branch
        then_branch: Box<TypedStmt>,
        /// Other branch
        else_branch: Option<Box<TypedStmt>>,
    },
    /// `while`
    While {
        /// Boolean condition
        condition: TypedExpr,
        /// Loop body
        body: Box<TypedStmt>,
    },
    /// `do ... while`
    DoWhile {
        /// Loop body
        body: Box<TypedStmt>,
        /// Boolean condition
        condition: TypedExpr,
    },
    /// Classic `for`
    For {
        /// Initializer statements
        init: Vec<TypedStmt>,
        /// Boolean condition
        condition: Option<TypedExpr>,
        /// Update expressions
        update: Vec<TypedExpr>,
        /// Loop body
        body: Box<TypedStmt>,
    },
    /// Enhanced `for` over an array
    ForEach {
        /// Temporary holding the array
        array_temp: String,
        /// Temporary holding the index
        index_temp: String,
        /// The iterated array
        array: TypedExpr,
        /// The loop variable
        variable: TypedLocal,
        /// Loop body
        body: Box<TypedStmt>,
    },
    /// `switch` on an integral value
    Switch {
        /// Switched value
        discriminant: TypedExpr,
        /// Arms in source order
        cases: Vec<TypedCase>,
    },
    /// `return`
    Return(Option<TypedExpr>),
    /// `break`
    Break,
    /// `continue`
    Continue,
    /// `System.out.print` or `System.out.println`
    Print {
        /// `println`
        newline: bool,
        /// Printed value
        arg: Option<TypedExpr>,
    },
    /// `;`
    Empty,
}

/// How a resolved method is invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Through the receiver's vtable
    Virtual,
    /// Directly, no receiver
    Static,
    /// Directly on `this`, bypassing the vtable
    Super,
}

/// Kinds of cast
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastKind {
    /// Between primitives
    Primitive,
    /// To a supertype, no check needed
    Widening,
    /// To a subtype, checked at run time
    Checked,
}

/// A typed expression
#[derive(Debug, Clone, PartialEq)]
pub struct TypedExpr {
    /// Expression
    pub kind: ExprKind,
    /// Static type
    pub ty: Type,
    /// Location
    pub span: Span,
}

/// Expression forms
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Literal
    Literal(LiteralValue),
    /// Local variable or parameter, by C++ name
    Local(String),
    /// `this`
    This,
    /// Instance field of `target`
    Field {
        /// Object holding the field
        target: Box<TypedExpr>,
        /// C++ member name
        name: String,
    },
    /// Static field
    StaticField {
        /// Declaring class
        class: ClassId,
        /// C++ member name
        name: String,
    },
    /// `a.length`
    ArrayLength(Box<TypedExpr>),
    /// `a[i]`
    Index {
        /// Array
        array: Box<TypedExpr>,
        /// Index, an `int`
        index: Box<TypedExpr>,
    },
    /// Resolved method call
    Call {
        /// Dispatch kind
        dispatch: Dispatch,
        /// Receiver for virtual and super calls
        receiver: Option<Box<TypedExpr>>,
        /// Class whose method list holds the slot
        class: ClassId,
        /// Slot position
        index: usize,
        /// Arguments
        args: Vec<TypedExpr>,
    },
    /// `new C(...)`
    New {
        /// Instantiated class
        class: ClassId,
        /// Position in its constructor list
        constructor: usize,
        /// Arguments
        args: Vec<TypedExpr>,
    },
    /// `new T[n]...[]`
    NewArray {
        /// Sized dimensions, outermost first
        dimensions: Vec<TypedExpr>,
    },
    /// Prefix or postfix operator
    Unary {
        /// Operator
        op: UnaryOperator,
        /// Operand
        operand: Box<TypedExpr>,
    },
    /// Binary operator other than string `+`
    Binary {
        /// Operator
        op: BinaryOperator,
        /// Left operand
        left: Box<TypedExpr>,
        /// Right operand
        right: Box<TypedExpr>,
    },
    /// String concatenation, flattened
    Concat(Vec<TypedExpr>),
    /// `target = value`
    Assign {
        /// Variable
        target: Box<TypedExpr>,
        /// Value
        value: Box<TypedExpr>,
    },
    /// `target op= value` on numbers and booleans
    CompoundAssign {
        /// Operator
        op: BinaryOperator,
        /// Variable
        target: Box<TypedExpr>,
        /// Value
        value: Box<TypedExpr>,
    },
    /// `c ? a : b`
    Conditional {
        /// Boolean condition
        condition: Box<TypedExpr>,
        /// Value when true
        then_expr: Box<TypedExpr>,
        /// Value when false
        else_expr: Box<TypedExpr>,
    },
    /// `(T) e`; the target is the expression's type
    Cast {
        /// Conversion kind
        kind: CastKind,
        /// Converted value
        expr: Box<TypedExpr>,
    },
    /// `e instanceof C`
    InstanceOf {
        /// Tested value
        expr: Box<TypedExpr>,
        /// Tested class
        class: ClassId,
    },
}

impl TypedExpr {
    /// Build an expression.
    pub fn new(kind: ExprKind, ty: Type, span: Span) -> Self {
        Self { kind, ty, span }
    }

    /// `this` of the given class type.
    pub fn this(ty: Type, span: Span) -> Self {
        Self::new(ExprKind::This, ty, span)
    }

    /// True for expressions that name a variable.
    pub fn is_variable(&self) -> bool {
        matches!(
            self.kind,
            ExprKind::Local(_) | ExprKind::Field { .. } | ExprKind::StaticField { .. } | ExprKind::Index { .. }
        )
    }

    /// Value of an `int` literal.
    pub fn int_constant(&self) -> Option<i64> {
        match self.kind {
            ExprKind::Literal(LiteralValue::Int(value)) => Some(value),
            ExprKind::Literal(LiteralValue::Char(c)) => Some(c as i64),
            _ => None,
        }
    }
}
