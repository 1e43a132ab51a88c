//! Typed IR to C++ tree
//!
//! Lowering never fails: every name, call and conversion was checked when
//! the body was rewritten. What remains is spelling. Java semantics that C++
//! does not share (shift counts, `>>>`, floating `%`, null receivers) are
//! expanded here.

use super::tree::{CppCase, CppExpr, CppForInit, CppStmt};
use crate::body::ir::{CastKind, Dispatch, ExprKind, TypedBlock, TypedExpr, TypedLocal, TypedStmt};
use crate::model::{predefined, ClassId};
use crate::names::{self, THIS};
use crate::resolve::NameGen;
use crate::table::ClassTable;
use jxx_parser::ast::{BinaryOperator, LiteralValue, UnaryOperator};
use jxx_types::{template, PrimitiveType, Type};

/// Lowers the bodies of one function
#[derive(Debug)]
pub struct BodyLowerer<'t> {
    table: &'t ClassTable,
    names: NameGen,
    constructor: bool,
    in_function: bool,
    arrays: Vec<(ClassId, usize)>,
}

impl<'t> BodyLowerer<'t> {
    /// Lowerer for a method body, continuing `names`.
    pub fn function(table: &'t ClassTable, names: NameGen) -> Self {
        Self {
            table,
            names,
            constructor: false,
            in_function: true,
            arrays: Vec::new(),
        }
    }

    /// Lowerer for an `__init` body; `return;` returns the receiver.
    pub fn constructor(table: &'t ClassTable, names: NameGen) -> Self {
        Self {
            constructor: true,
            ..Self::function(table, names)
        }
    }

    /// Lowerer for static field initializers at namespace scope.
    pub fn static_initializer(table: &'t ClassTable) -> Self {
        Self {
            in_function: false,
            ..Self::function(table, NameGen::new())
        }
    }

    /// Multi-dimensional arrays of user classes seen so far.
    pub fn into_arrays(self) -> Vec<(ClassId, usize)> {
        self.arrays
    }

    fn struct_name(&self, class: ClassId) -> String {
        self.table.get(class).name.struct_name()
    }

    // ========================================================================
    // Statements
    // ========================================================================

    /// Lower a block's statements.
    pub fn block(&mut self, block: &TypedBlock) -> Vec<CppStmt> {
        let mut out = Vec::with_capacity(block.statements.len());
        for stmt in &block.statements {
            self.statement(stmt, &mut out);
        }
        out
    }

    fn single(&mut self, stmt: &TypedStmt) -> CppStmt {
        let mut out = Vec::new();
        self.statement(stmt, &mut out);
        if out.len() == 1 {
            out.remove(0)
        } else {
            CppStmt::Block(out)
        }
    }

    fn locals(&mut self, locals: &[TypedLocal], out: &mut Vec<CppStmt>) {
        for local in locals {
            let init = local.init.as_ref().map(|init| self.expr(init));
            out.push(CppStmt::declare(local.ty.cpp_name(), local.name.clone(), init));
        }
    }

    /// Lower one statement, appending to `out`.
    pub fn statement(&mut self, stmt: &TypedStmt, out: &mut Vec<CppStmt>) {
        match stmt {
            TypedStmt::Block(block) => out.push(CppStmt::Block(self.block(block))),
            TypedStmt::Locals(locals) => self.locals(locals, out),
            TypedStmt::Expr(expr) => out.push(CppStmt::Expr(self.expr(expr))),
            TypedStmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let condition = self.expr(condition);
                let then_branch = Box::new(self.single(then_branch));
                let else_branch = else_branch.as_ref().map(|b| Box::new(self.single(b)));
                out.push(CppStmt::If {
                    condition,
                    then_branch,
                    else_branch,
                });
            }
            TypedStmt::While { condition, body } => {
                let condition = self.expr(condition);
                let body = Box::new(self.single(body));
                out.push(CppStmt::While { condition, body });
            }
            TypedStmt::DoWhile { body, condition } => {
                let body = Box::new(self.single(body));
                let condition = self.expr(condition);
                out.push(CppStmt::DoWhile { body, condition });
            }
            TypedStmt::For {
                init,
                condition,
                update,
                body,
            } => out.push(self.for_loop(init, condition.as_ref(), update, body)),
            TypedStmt::ForEach {
                array_temp,
                index_temp,
                array,
                variable,
                body,
            } => {
                let index = CppExpr::raw(index_temp.as_str());
                let element = CppExpr::Index {
                    array: Box::new(CppExpr::raw(array_temp.as_str())),
                    index: Box::new(index.clone()),
                };
                let mut inner = vec![CppStmt::declare(
                    variable.ty.cpp_name(),
                    variable.name.clone(),
                    Some(element),
                )];
                self.statement(body, &mut inner);

                let array_ty = array.ty.cpp_name();
                let array = self.expr(array);
                out.push(CppStmt::Block(vec![
                    CppStmt::declare(array_ty, array_temp.clone(), Some(array)),
                    CppStmt::For {
                        init: CppForInit::Declare {
                            ty: PrimitiveType::Int.native_name().to_string(),
                            vars: vec![(index_temp.clone(), Some(CppExpr::raw("0")))],
                        },
                        condition: Some(index.clone().binary("<", CppExpr::raw(array_temp.as_str()).arrow("length"))),
                        update: vec![CppExpr::Unary {
                            op: "++",
                            operand: Box::new(index),
                            postfix: true,
                        }],
                        body: Box::new(CppStmt::Block(inner)),
                    },
                ]));
            }
            TypedStmt::Switch { discriminant, cases } => {
                let discriminant = self.expr(discriminant);
                let cases = cases
                    .iter()
                    .map(|case| {
                        let label = case.label.as_ref().map(|l| self.expr(l));
                        let mut body = Vec::new();
                        for stmt in &case.body {
                            self.statement(stmt, &mut body);
                        }
                        // C++ rejects jumps past initialized declarations
                        if body.iter().any(CppStmt::is_declaration) {
                            body = vec![CppStmt::Block(body)];
                        }
                        CppCase { label, body }
                    })
                    .collect();
                out.push(CppStmt::Switch { discriminant, cases });
            }
            TypedStmt::Return(value) => {
                let value = match value {
                    Some(value) => Some(self.expr(value)),
                    None if self.constructor => Some(CppExpr::raw(THIS)),
                    None => None,
                };
                out.push(CppStmt::Return(value));
            }
            TypedStmt::Break => out.push(CppStmt::Break),
            TypedStmt::Continue => out.push(CppStmt::Continue),
            TypedStmt::Print { newline, arg } => {
                let function = if *newline { "__jxx_println" } else { "__jxx_print" };
                let args = arg.iter().map(|a| self.expr(a)).collect();
                out.push(CppStmt::Expr(CppExpr::call(function, args)));
            }
            TypedStmt::Empty => out.push(CppStmt::Empty),
        }
    }

    fn for_loop(
        &mut self,
        init: &[TypedStmt],
        condition: Option<&TypedExpr>,
        update: &[TypedExpr],
        body: &TypedStmt,
    ) -> CppStmt {
        let mut header = CppForInit::None;
        let mut prelude = Vec::new();
        match init {
            [] => {}
            [TypedStmt::Locals(locals)] if locals.iter().all(|l| l.ty == locals[0].ty) => {
                let vars = locals
                    .iter()
                    .map(|l| (l.name.clone(), l.init.as_ref().map(|i| self.expr(i))))
                    .collect();
                header = CppForInit::Declare {
                    ty: locals[0].ty.cpp_name(),
                    vars,
                };
            }
            _ if init.iter().all(|s| matches!(s, TypedStmt::Expr(_))) => {
                let exprs = init
                    .iter()
                    .filter_map(|s| match s {
                        TypedStmt::Expr(e) => Some(self.expr(e)),
                        _ => None,
                    })
                    .collect();
                header = CppForInit::Exprs(exprs);
            }
            _ => {
                for stmt in init {
                    self.statement(stmt, &mut prelude);
                }
            }
        }

        let condition = condition.map(|c| self.expr(c));
        let update = update.iter().map(|u| self.expr(u)).collect();
        let body = Box::new(self.single(body));
        let stmt = CppStmt::For {
            init: header,
            condition,
            update,
            body,
        };
        if prelude.is_empty() {
            stmt
        } else {
            prelude.push(stmt);
            CppStmt::Block(prelude)
        }
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    /// Lower one expression.
    pub fn expr(&mut self, expr: &TypedExpr) -> CppExpr {
        match &expr.kind {
            ExprKind::Literal(value) => CppExpr::Raw(literal(value)),
            ExprKind::Local(name) => CppExpr::raw(name.as_str()),
            ExprKind::This => CppExpr::raw(THIS),
            ExprKind::Field { target, name } => self.expr(target).arrow(name.as_str()),
            ExprKind::StaticField { class, name } => CppExpr::Raw(format!("{}::{}", self.struct_name(*class), name)),
            ExprKind::ArrayLength(array) => self.expr(array).arrow("length"),
            ExprKind::Index { array, index } => CppExpr::Index {
                array: Box::new(self.expr(array)),
                index: Box::new(self.expr(index)),
            },
            ExprKind::Call {
                dispatch,
                receiver,
                class,
                index,
                args,
            } => self.call(*dispatch, receiver.as_deref(), *class, *index, args),
            ExprKind::New {
                class,
                constructor,
                args,
            } => {
                let table = self.table;
                let klass = table.get(*class);
                if *class == predefined::OBJECT {
                    return CppExpr::New {
                        ty: klass.name.struct_name(),
                        args: Vec::new(),
                    }
                    .convert(klass.name.qualified_name());
                }
                let mut lowered = vec![CppExpr::New {
                    ty: klass.name.struct_name(),
                    args: Vec::new(),
                }];
                lowered.extend(args.iter().map(|a| self.expr(a)));
                CppExpr::call(
                    format!("{}::{}", klass.name.struct_name(), names::constructor_name(klass, *constructor)),
                    lowered,
                )
            }
            ExprKind::NewArray { dimensions } => self.new_array(&expr.ty, dimensions),
            ExprKind::Unary { op, operand } => {
                let (op, postfix) = match op {
                    UnaryOperator::Plus => ("+", false),
                    UnaryOperator::Minus => ("-", false),
                    UnaryOperator::Not => ("!", false),
                    UnaryOperator::BitNot => ("~", false),
                    UnaryOperator::PreIncrement => ("++", false),
                    UnaryOperator::PreDecrement => ("--", false),
                    UnaryOperator::PostIncrement => ("++", true),
                    UnaryOperator::PostDecrement => ("--", true),
                };
                CppExpr::Unary {
                    op,
                    operand: Box::new(self.expr(operand)),
                    postfix,
                }
            }
            ExprKind::Binary { op, left, right } => {
                let l = self.expr(left);
                let r = self.expr(right);
                binary(*op, &expr.ty, l, r)
            }
            ExprKind::Concat(parts) => {
                let parts = parts.iter().map(|p| self.expr(p)).collect();
                CppExpr::call("__jxx_concat", parts)
            }
            ExprKind::Assign { target, value } => CppExpr::Assign {
                op: "=".to_string(),
                target: Box::new(self.expr(target)),
                value: Box::new(self.expr(value)),
            },
            ExprKind::CompoundAssign { op, target, value } => self.compound_assign(*op, target, value),
            ExprKind::Conditional {
                condition,
                then_expr,
                else_expr,
            } => {
                let condition = self.expr(condition);
                let then_branch = self.branch(then_expr, &expr.ty);
                let else_branch = self.branch(else_expr, &expr.ty);
                CppExpr::Conditional {
                    condition: Box::new(condition),
                    then_expr: Box::new(then_branch),
                    else_expr: Box::new(else_branch),
                }
            }
            ExprKind::Cast { kind, expr: inner } => {
                let lowered = self.expr(inner);
                match kind {
                    CastKind::Primitive if inner.ty == expr.ty => lowered,
                    CastKind::Primitive => lowered.cast(expr.ty.cpp_name()),
                    CastKind::Widening => lowered.convert(expr.ty.cpp_name()),
                    CastKind::Checked => {
                        self.note_array(&expr.ty);
                        CppExpr::call(template("__rt::java_cast", &expr.ty.cpp_name()), vec![lowered])
                    }
                }
            }
            ExprKind::InstanceOf { expr: inner, class } => {
                let descriptor = format!("{}::__class()", self.struct_name(*class));
                CppExpr::Call {
                    callee: Box::new(CppExpr::raw(descriptor.as_str()).arrow("__vptr").arrow("isInstance")),
                    args: vec![CppExpr::Raw(descriptor), self.expr(inner)],
                }
            }
        }
    }

    fn branch(&mut self, branch: &TypedExpr, ty: &Type) -> CppExpr {
        let lowered = self.expr(branch);
        if ty.is_reference() && branch.ty != *ty {
            lowered.convert(ty.cpp_name())
        } else {
            lowered
        }
    }

    fn lambda(&self, body: Vec<CppStmt>) -> CppExpr {
        CppExpr::Lambda {
            capture: self.in_function,
            body,
        }
    }

    fn call(
        &mut self,
        dispatch: Dispatch,
        receiver: Option<&TypedExpr>,
        class: ClassId,
        index: usize,
        args: &[TypedExpr],
    ) -> CppExpr {
        let implementor = self.table.get(class).methods[index].implementor;
        let definition = format!(
            "{}::{}",
            self.struct_name(implementor),
            names::definition_name(self.table, class, index)
        );
        let mut lowered: Vec<CppExpr> = args.iter().map(|a| self.expr(a)).collect();

        let receiver = match (dispatch, receiver) {
            (Dispatch::Static, Some(receiver)) if !matches!(receiver.kind, ExprKind::This | ExprKind::Local(_)) => {
                let evaluated = self.expr(receiver).cast("void");
                return CppExpr::Comma(Box::new(evaluated), Box::new(CppExpr::call(definition, lowered)));
            }
            (Dispatch::Static, _) | (_, None) => return CppExpr::call(definition, lowered),
            (Dispatch::Super, Some(receiver)) => {
                lowered.insert(0, self.expr(receiver));
                return CppExpr::call(definition, lowered);
            }
            (Dispatch::Virtual, Some(receiver)) => receiver,
        };

        let slot = names::slot_name(self.table, class, index);
        let dispatch_on = |name: &str, mut args: Vec<CppExpr>| {
            args.insert(0, CppExpr::raw(name));
            CppExpr::Call {
                callee: Box::new(CppExpr::raw(name).arrow("__vptr").arrow(slot.as_str())),
                args,
            }
        };
        match &receiver.kind {
            ExprKind::This => dispatch_on(THIS, lowered),
            ExprKind::Local(name) => {
                let call = dispatch_on(name, lowered);
                CppExpr::Comma(
                    Box::new(CppExpr::call("__rt::checkNotNull", vec![CppExpr::raw(name.as_str())])),
                    Box::new(call),
                )
            }
            _ => {
                let temp = self.names.fresh();
                let value = self.expr(receiver);
                let body = vec![
                    CppStmt::declare(receiver.ty.cpp_name(), temp.clone(), Some(value)),
                    CppStmt::Expr(CppExpr::call("__rt::checkNotNull", vec![CppExpr::raw(temp.as_str())])),
                    CppStmt::Return(Some(dispatch_on(&temp, lowered))),
                ];
                self.lambda(body)
            }
        }
    }

    fn new_array(&mut self, ty: &Type, dimensions: &[TypedExpr]) -> CppExpr {
        self.note_array(ty);
        let sizes: Vec<CppExpr> = dimensions.iter().map(|d| self.expr(d)).collect();
        if sizes.len() == 1 {
            return self.allocate(ty, &sizes);
        }

        // Every size is evaluated before anything is allocated
        let mut body = Vec::new();
        let mut temps = Vec::new();
        for size in sizes {
            let temp = self.names.fresh();
            body.push(CppStmt::declare(
                PrimitiveType::Int.native_name(),
                temp.clone(),
                Some(size),
            ));
            temps.push(CppExpr::Raw(temp));
        }
        let allocation = self.allocate(ty, &temps);
        body.push(CppStmt::Return(Some(allocation)));
        self.lambda(body)
    }

    fn allocate(&mut self, ty: &Type, sizes: &[CppExpr]) -> CppExpr {
        let element = ty.element().unwrap_or(Type::Null);
        let outer = CppExpr::New {
            ty: template("__rt::Array", &element.cpp_name()),
            args: vec![sizes[0].clone()],
        }
        .convert(ty.cpp_name());
        if sizes.len() == 1 {
            return outer;
        }

        let array = self.names.fresh();
        let index = self.names.fresh();
        let fill = CppExpr::Assign {
            op: "=".to_string(),
            target: Box::new(CppExpr::Index {
                array: Box::new(CppExpr::raw(array.as_str())),
                index: Box::new(CppExpr::raw(index.as_str())),
            }),
            value: Box::new(self.allocate(&element, &sizes[1..])),
        };
        let body = vec![
            CppStmt::declare(ty.cpp_name(), array.clone(), Some(outer)),
            CppStmt::For {
                init: CppForInit::Declare {
                    ty: PrimitiveType::Int.native_name().to_string(),
                    vars: vec![(index.clone(), Some(CppExpr::raw("0")))],
                },
                condition: Some(CppExpr::raw(index.as_str()).binary("<", CppExpr::raw(array.as_str()).arrow("length"))),
                update: vec![CppExpr::Unary {
                    op: "++",
                    operand: Box::new(CppExpr::raw(index.as_str())),
                    postfix: true,
                }],
                body: Box::new(CppStmt::Expr(fill)),
            },
            CppStmt::Return(Some(CppExpr::Raw(array))),
        ];
        self.lambda(body)
    }

    // Array classes of more than one dimension need their own descriptors
    fn note_array(&mut self, ty: &Type) {
        let Some(class) = ty.base().as_class().and_then(|q| self.table.lookup(q)) else {
            return;
        };
        if self.table.get(class).predefined {
            return;
        }
        for dims in 2..=ty.dimensions() {
            if !self.arrays.contains(&(class, dims)) {
                self.arrays.push((class, dims));
            }
        }
    }

    fn compound_assign(&mut self, op: BinaryOperator, target: &TypedExpr, value: &TypedExpr) -> CppExpr {
        let promoted = promoted(&target.ty);
        let floating_rem = op == BinaryOperator::Rem && is_floating(&target.ty, value);
        let lowered_target = self.expr(target);
        let lowered_value = self.expr(value);

        if op == BinaryOperator::UShr || floating_rem {
            let temp = self.names.fresh();
            let current = CppExpr::raw(temp.as_str());
            let result = if floating_rem {
                CppExpr::call("std::fmod", vec![current, lowered_value])
            } else {
                unsigned_shift(current, lowered_value, promoted)
            };
            let body = vec![
                CppStmt::declare("auto&", temp.clone(), Some(lowered_target)),
                CppStmt::Expr(CppExpr::Assign {
                    op: "=".to_string(),
                    target: Box::new(CppExpr::raw(temp.as_str())),
                    value: Box::new(result.cast(target.ty.cpp_name())),
                }),
                CppStmt::Return(Some(CppExpr::Raw(temp))),
            ];
            return self.lambda(body);
        }

        let value = match op {
            BinaryOperator::Shl | BinaryOperator::Shr => shift_count(lowered_value, promoted),
            _ => lowered_value,
        };
        CppExpr::Assign {
            op: format!("{}=", cpp_operator(op)),
            target: Box::new(lowered_target),
            value: Box::new(value),
        }
    }
}

fn promoted(ty: &Type) -> PrimitiveType {
    match ty.as_primitive() {
        Some(p) if p.is_numeric() => PrimitiveType::promote(p, PrimitiveType::Int),
        _ => PrimitiveType::Int,
    }
}

fn is_floating(target: &Type, value: &TypedExpr) -> bool {
    [target, &value.ty]
        .iter()
        .any(|t| matches!(t.as_primitive(), Some(PrimitiveType::Float | PrimitiveType::Double)))
}

fn cpp_operator(op: BinaryOperator) -> &'static str {
    use BinaryOperator::*;

    match op {
        Add => "+",
        Sub => "-",
        Mul => "*",
        Div => "/",
        Rem => "%",
        Shl => "<<",
        Shr | UShr => ">>",
        Lt => "<",
        Gt => ">",
        Le => "<=",
        Ge => ">=",
        Eq => "==",
        Ne => "!=",
        BitAnd => "&",
        BitOr => "|",
        BitXor => "^",
        And => "&&",
        Or => "||",
    }
}

fn shift_count(count: CppExpr, promoted: PrimitiveType) -> CppExpr {
    let mask = if promoted == PrimitiveType::Long { "63" } else { "31" };
    count.binary("&", CppExpr::raw(mask))
}

fn unsigned_shift(value: CppExpr, count: CppExpr, promoted: PrimitiveType) -> CppExpr {
    let (signed, unsigned) = if promoted == PrimitiveType::Long {
        ("int64_t", "uint64_t")
    } else {
        ("int32_t", "uint32_t")
    };
    value
        .cast(unsigned)
        .binary(">>", shift_count(count, promoted))
        .cast(signed)
}

fn binary(op: BinaryOperator, ty: &Type, left: CppExpr, right: CppExpr) -> CppExpr {
    match op {
        BinaryOperator::Shl | BinaryOperator::Shr => {
            let promoted = promoted(ty);
            left.binary(cpp_operator(op), shift_count(right, promoted))
        }
        BinaryOperator::UShr => unsigned_shift(left, right, promoted(ty)),
        BinaryOperator::Rem if matches!(ty.as_primitive(), Some(PrimitiveType::Float | PrimitiveType::Double)) => {
            CppExpr::call("std::fmod", vec![left, right])
        }
        _ => left.binary(cpp_operator(op), right),
    }
}

/// C++ spelling of a Java literal.
pub fn literal(value: &LiteralValue) -> String {
    match value {
        LiteralValue::Int(v) if *v == i32::MIN as i64 => "(-2147483647 - 1)".to_string(),
        LiteralValue::Int(v) if *v < 0 => format!("({})", v),
        LiteralValue::Int(v) => v.to_string(),
        LiteralValue::Long(v) if *v == i64::MIN as i128 => "(-INT64_C(9223372036854775807) - 1)".to_string(),
        LiteralValue::Long(v) if *v < 0 => format!("(-INT64_C({}))", -v),
        LiteralValue::Long(v) => format!("INT64_C({})", v),
        LiteralValue::Float(v) => floating(*v as f32 as f64, "f"),
        LiteralValue::Double(v) => floating(*v, ""),
        LiteralValue::Char(c) => char_literal(*c),
        LiteralValue::String(s) => format!("__rt::literal(\"{}\")", escape(s)),
        LiteralValue::Boolean(b) => b.to_string(),
        LiteralValue::Null => "__rt::null()".to_string(),
    }
}

fn floating(value: f64, suffix: &str) -> String {
    if !value.is_finite() {
        return format!("(1.0{} / 0.0{})", suffix, suffix);
    }
    let text = if suffix.is_empty() {
        format!("{:?}", value)
    } else {
        format!("{:?}{}", value as f32, suffix)
    };
    if value.is_sign_negative() {
        format!("({})", text)
    } else {
        text
    }
}

fn char_literal(c: char) -> String {
    match c {
        '\'' => "'\\''".to_string(),
        '\\' => "'\\\\'".to_string(),
        '\n' => "'\\n'".to_string(),
        '\t' => "'\\t'".to_string(),
        '\r' => "'\\r'".to_string(),
        ' '..='~' => format!("'{}'", c),
        _ => format!("((char) {})", c as u32),
    }
}

/// Escape text for a C++ string literal. Non-ASCII text is kept as UTF-8
/// bytes through fixed-width octal escapes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            ' '..='~' => out.push(c),
            _ => {
                let mut buf = [0u8; 4];
                for byte in c.encode_utf8(&mut buf).bytes() {
                    out.push_str(&format!("\\{:03o}", byte));
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_literal_extremes() {
        assert_eq!(literal(&LiteralValue::Int(-2147483648)), "(-2147483647 - 1)");
        assert_eq!(literal(&LiteralValue::Int(-5)), "(-5)");
        assert_eq!(literal(&LiteralValue::Long(i64::MIN as i128)), "(-INT64_C(9223372036854775807) - 1)");
        assert_eq!(literal(&LiteralValue::Long(7)), "INT64_C(7)");
    }

    #[test]
    fn test_floating_literals() {
        assert_eq!(literal(&LiteralValue::Double(1.0)), "1.0");
        assert_eq!(literal(&LiteralValue::Float(2.5)), "2.5f");
        assert_eq!(literal(&LiteralValue::Double(-0.5)), "(-0.5)");
    }

    #[test]
    fn test_string_and_char_escapes() {
        assert_eq!(literal(&LiteralValue::String("a\"b\n".into())), "__rt::literal(\"a\\\"b\\n\")");
        assert_eq!(escape("é"), "\\303\\251");
        assert_eq!(literal(&LiteralValue::Char('\'')), "'\\''");
        assert_eq!(literal(&LiteralValue::Null), "__rt::null()");
    }

    #[test]
    fn test_shift_operators_mask_their_count() {
        let shl = binary(BinaryOperator::Shl, &Type::int(), CppExpr::raw("a"), CppExpr::raw("b"));
        assert_eq!(shl.to_string(), "(a << (b & 31))");
        let long = Type::primitive(PrimitiveType::Long);
        let ushr = binary(BinaryOperator::UShr, &long, CppExpr::raw("a"), CppExpr::raw("b"));
        assert_eq!(ushr.to_string(), "((int64_t) (((uint64_t) a) >> (b & 63)))");
    }

    #[test]
    fn test_floating_remainder() {
        let rem = binary(
            BinaryOperator::Rem,
            &Type::primitive(PrimitiveType::Double),
            CppExpr::raw("a"),
            CppExpr::raw("b"),
        );
        assert_eq!(rem.to_string(), "std::fmod(a, b)");
    }
}
