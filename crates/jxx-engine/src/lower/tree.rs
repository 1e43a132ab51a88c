//! C++ statement and expression tree
//!
//! The last stop before text. Binary and assignment expressions print fully
//! parenthesized, so no precedence table is needed. Statements print on one
//! line through [`fmt::Display`]; the emitters lay out multi-line bodies
//! themselves.

use std::fmt;

/// A C++ expression
#[derive(Debug, Clone, PartialEq)]
pub enum CppExpr {
    /// Identifier, qualified name or literal, printed verbatim
    Raw(String),
    /// `callee(args)`
    Call {
        /// Called function
        callee: Box<CppExpr>,
        /// Arguments
        args: Vec<CppExpr>,
    },
    /// `target->member`
    Arrow {
        /// Pointer-like value
        target: Box<CppExpr>,
        /// Member name
        member: String,
    },
    /// `(*array)[index]`
    Index {
        /// Array handle
        array: Box<CppExpr>,
        /// Position
        index: Box<CppExpr>,
    },
    /// Prefix or postfix operator
    Unary {
        /// Operator spelling
        op: &'static str,
        /// Operand
        operand: Box<CppExpr>,
        /// Printed after the operand
        postfix: bool,
    },
    /// `(left op right)`
    Binary {
        /// Operator spelling
        op: &'static str,
        /// Left operand
        left: Box<CppExpr>,
        /// Right operand
        right: Box<CppExpr>,
    },
    /// `(target op value)` for `=` and compound assignment
    Assign {
        /// Operator spelling
        op: String,
        /// Assigned lvalue
        target: Box<CppExpr>,
        /// Value
        value: Box<CppExpr>,
    },
    /// `(c ? a : b)`
    Conditional {
        /// Condition
        condition: Box<CppExpr>,
        /// Value when true
        then_expr: Box<CppExpr>,
        /// Value when false
        else_expr: Box<CppExpr>,
    },
    /// C-style `((T) e)`
    Cast {
        /// Target type
        ty: String,
        /// Operand
        expr: Box<CppExpr>,
    },
    /// Functional conversion `T(e)`
    Convert {
        /// Target type
        ty: String,
        /// Operand
        expr: Box<CppExpr>,
    },
    /// `(a, b)`
    Comma(Box<CppExpr>, Box<CppExpr>),
    /// `new T(args)`
    New {
        /// Allocated type
        ty: String,
        /// Constructor arguments
        args: Vec<CppExpr>,
    },
    /// Immediately invoked lambda `([&]() { ... })()`
    Lambda {
        /// Captures by reference; only allowed inside functions
        capture: bool,
        /// Body, ending in a `return`
        body: Vec<CppStmt>,
    },
}

impl CppExpr {
    /// A verbatim expression.
    pub fn raw(text: impl Into<String>) -> Self {
        CppExpr::Raw(text.into())
    }

    /// Call a named function.
    pub fn call(callee: impl Into<String>, args: Vec<CppExpr>) -> Self {
        CppExpr::Call {
            callee: Box::new(CppExpr::raw(callee)),
            args,
        }
    }

    /// `self->member`
    pub fn arrow(self, member: impl Into<String>) -> Self {
        CppExpr::Arrow {
            target: Box::new(self),
            member: member.into(),
        }
    }

    /// `T(self)`
    pub fn convert(self, ty: impl Into<String>) -> Self {
        CppExpr::Convert {
            ty: ty.into(),
            expr: Box::new(self),
        }
    }

    /// `(T) self`
    pub fn cast(self, ty: impl Into<String>) -> Self {
        CppExpr::Cast {
            ty: ty.into(),
            expr: Box::new(self),
        }
    }

    /// `(self op right)`
    pub fn binary(self, op: &'static str, right: CppExpr) -> Self {
        CppExpr::Binary {
            op,
            left: Box::new(self),
            right: Box::new(right),
        }
    }
}

/// Initializer of a `for` header
#[derive(Debug, Clone, PartialEq)]
pub enum CppForInit {
    /// `for (;`
    None,
    /// One declaration with one or more variables
    Declare {
        /// Shared type
        ty: String,
        /// Names and initializers
        vars: Vec<(String, Option<CppExpr>)>,
    },
    /// Comma-separated expressions
    Exprs(Vec<CppExpr>),
}

/// One arm of a `switch`
#[derive(Debug, Clone, PartialEq)]
pub struct CppCase {
    /// Label, `None` for `default`
    pub label: Option<CppExpr>,
    /// Statements
    pub body: Vec<CppStmt>,
}

/// A C++ statement
#[derive(Debug, Clone, PartialEq)]
pub enum CppStmt {
    /// `e;`
    Expr(CppExpr),
    /// `T a = x, b;`
    Declare {
        /// Shared type
        ty: String,
        /// Names and initializers
        vars: Vec<(String, Option<CppExpr>)>,
    },
    /// `if`
    If {
        /// Condition
        condition: CppExpr,
        /// Taken branch
        then_branch: Box<CppStmt>,
        /// Other branch
        else_branch: Option<Box<CppStmt>>,
    },
    /// `while`
    While {
        /// Condition
        condition: CppExpr,
        /// Body
        body: Box<CppStmt>,
    },
    /// `do ... while`
    DoWhile {
        /// Body
        body: Box<CppStmt>,
        /// Condition
        condition: CppExpr,
    },
    /// `for`
    For {
        /// Header initializer
        init: CppForInit,
        /// Condition, empty when absent
        condition: Option<CppExpr>,
        /// Update expressions
        update: Vec<CppExpr>,
        /// Body
        body: Box<CppStmt>,
    },
    /// `switch`
    Switch {
        /// Switched value
        discriminant: CppExpr,
        /// Arms
        cases: Vec<CppCase>,
    },
    /// `return`
    Return(Option<CppExpr>),
    /// `break;`
    Break,
    /// `continue;`
    Continue,
    /// `{ ... }`
    Block(Vec<CppStmt>),
    /// `;`
    Empty,
}

impl CppStmt {
    /// `ty name = init;`
    pub fn declare(ty: impl Into<String>, name: impl Into<String>, init: Option<CppExpr>) -> Self {
        CppStmt::Declare {
            ty: ty.into(),
            vars: vec![(name.into(), init)],
        }
    }

    /// True for declarations, which C++ forbids jumping over.
    pub fn is_declaration(&self) -> bool {
        matches!(self, CppStmt::Declare { .. })
    }
}

// ============================================================================
// Printing
// ============================================================================

fn comma_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

/// `a = x, b` after a declaration's type.
pub(crate) fn declarators(f: &mut fmt::Formatter<'_>, vars: &[(String, Option<CppExpr>)]) -> fmt::Result {
    for (i, (name, init)) in vars.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        match init {
            Some(init) => write!(f, "{} = {}", name, init)?,
            None => write!(f, "{}", name)?,
        }
    }
    Ok(())
}

impl fmt::Display for CppExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CppExpr::Raw(text) => write!(f, "{}", text),
            CppExpr::Call { callee, args } => {
                write!(f, "{}(", callee)?;
                comma_list(f, args)?;
                write!(f, ")")
            }
            CppExpr::Arrow { target, member } => write!(f, "{}->{}", target, member),
            CppExpr::Index { array, index } => write!(f, "(*{})[{}]", array, index),
            CppExpr::Unary { op, operand, postfix } => {
                if *postfix {
                    write!(f, "{}{}", operand, op)
                } else if matches!(operand.as_ref(), CppExpr::Unary { postfix: false, .. }) {
                    // `- -x` must not print as `--x`
                    write!(f, "{}({})", op, operand)
                } else {
                    write!(f, "{}{}", op, operand)
                }
            }
            CppExpr::Binary { op, left, right } => write!(f, "({} {} {})", left, op, right),
            CppExpr::Assign { op, target, value } => write!(f, "({} {} {})", target, op, value),
            CppExpr::Conditional {
                condition,
                then_expr,
                else_expr,
            } => write!(f, "({} ? {} : {})", condition, then_expr, else_expr),
            CppExpr::Cast { ty, expr } => write!(f, "(({}) {})", ty, expr),
            CppExpr::Convert { ty, expr } => write!(f, "{}({})", ty, expr),
            CppExpr::Comma(left, right) => write!(f, "({}, {})", left, right),
            CppExpr::New { ty, args } => {
                write!(f, "new {}(", ty)?;
                comma_list(f, args)?;
                write!(f, ")")
            }
            CppExpr::Lambda { capture, body } => {
                write!(f, "([{}]() {{", if *capture { "&" } else { "" })?;
                for stmt in body {
                    write!(f, " {}", stmt)?;
                }
                write!(f, " }})()")
            }
        }
    }
}

impl fmt::Display for CppForInit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CppForInit::None => Ok(()),
            CppForInit::Declare { ty, vars } => {
                write!(f, "{} ", ty)?;
                declarators(f, vars)
            }
            CppForInit::Exprs(exprs) => comma_list(f, exprs),
        }
    }
}

impl fmt::Display for CppStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CppStmt::Expr(expr) => write!(f, "{};", expr),
            CppStmt::Declare { ty, vars } => {
                write!(f, "{} ", ty)?;
                declarators(f, vars)?;
                write!(f, ";")
            }
            CppStmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                match (then_branch.as_ref(), else_branch) {
                    // keep the `else` on the outer `if`
                    (CppStmt::If { else_branch: None, .. }, Some(_)) => {
                        write!(f, "if ({}) {{ {} }}", condition, then_branch)?
                    }
                    _ => write!(f, "if ({}) {}", condition, then_branch)?,
                }
                if let Some(else_branch) = else_branch {
                    write!(f, " else {}", else_branch)?;
                }
                Ok(())
            }
            CppStmt::While { condition, body } => write!(f, "while ({}) {}", condition, body),
            CppStmt::DoWhile { body, condition } => write!(f, "do {} while ({});", body, condition),
            CppStmt::For {
                init,
                condition,
                update,
                body,
            } => {
                write!(f, "for ({};", init)?;
                if let Some(condition) = condition {
                    write!(f, " {}", condition)?;
                }
                write!(f, ";")?;
                if !update.is_empty() {
                    write!(f, " ")?;
                    comma_list(f, update)?;
                }
                write!(f, ") {}", body)
            }
            CppStmt::Switch { discriminant, cases } => {
                write!(f, "switch ({}) {{", discriminant)?;
                for case in cases {
                    match &case.label {
                        Some(label) => write!(f, " case {}:", label)?,
                        None => write!(f, " default:")?,
                    }
                    for stmt in &case.body {
                        write!(f, " {}", stmt)?;
                    }
                }
                write!(f, " }}")
            }
            CppStmt::Return(None) => write!(f, "return;"),
            CppStmt::Return(Some(value)) => write!(f, "return {};", value),
            CppStmt::Break => write!(f, "break;"),
            CppStmt::Continue => write!(f, "continue;"),
            CppStmt::Block(stmts) => {
                write!(f, "{{")?;
                for stmt in stmts {
                    write!(f, " {}", stmt)?;
                }
                write!(f, " }}")
            }
            CppStmt::Empty => write!(f, ";"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_is_parenthesized() {
        let expr = CppExpr::raw("a").binary("+", CppExpr::raw("b").binary("*", CppExpr::raw("c")));
        assert_eq!(expr.to_string(), "(a + (b * c))");
    }

    #[test]
    fn test_virtual_call_shape() {
        let call = CppExpr::Call {
            callee: Box::new(CppExpr::raw("x").arrow("__vptr").arrow("foo")),
            args: vec![CppExpr::raw("x"), CppExpr::raw("1")],
        };
        assert_eq!(call.to_string(), "x->__vptr->foo(x, 1)");
    }

    #[test]
    fn test_lambda_inline() {
        let lambda = CppExpr::Lambda {
            capture: true,
            body: vec![
                CppStmt::declare("A", "__tmp0", Some(CppExpr::raw("f()"))),
                CppStmt::Return(Some(CppExpr::raw("__tmp0"))),
            ],
        };
        assert_eq!(lambda.to_string(), "([&]() { A __tmp0 = f(); return __tmp0; })()");
    }

    #[test]
    fn test_for_header() {
        let stmt = CppStmt::For {
            init: CppForInit::Declare {
                ty: "int32_t".to_string(),
                vars: vec![("i".to_string(), Some(CppExpr::raw("0")))],
            },
            condition: Some(CppExpr::raw("i").binary("<", CppExpr::raw("n"))),
            update: vec![CppExpr::Unary {
                op: "++",
                operand: Box::new(CppExpr::raw("i")),
                postfix: true,
            }],
            body: Box::new(CppStmt::Block(vec![])),
        };
        assert_eq!(stmt.to_string(), "for (int32_t i = 0; (i < n); i++) { }");
    }
}
