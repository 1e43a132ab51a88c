//! Syntax to typed IR
//!
//! One [`BodyRewriter`] handles one method, constructor or field
//! initializer. Bare identifiers are classified in a fixed order: a class
//! visible from the enclosing declaration, a local variable, a field of the
//! current class, and finally the first segment of a package name. A dotted
//! chain reinterprets its later segments once a prefix resolves to a class.

use super::ir::{
    CastKind, Chain, ChainKind, Dispatch, ExprKind, TypedBlock, TypedCase, TypedExpr, TypedLocal, TypedStmt,
};
use super::scope::LocalScopes;
use crate::error::{CompileError, CompileResult};
use crate::model::{predefined, ClassId, Member};
use crate::resolve::{Caller, Invocation, NameGen, Receiver, Resolver, Selector};
use crate::table::ClassTable;
use jxx_parser::ast::{
    AssignExpression, AssignOperator, BinaryExpression, BinaryOperator, Block, CallTarget, ConstructorCall,
    ConstructorCallKind, Expression, FieldAccess, ForInit, ForStatement, Identifier, LiteralValue, LocalVariableDecl,
    MethodCall, Statement, SwitchStatement, TypeExpr, UnaryExpression, UnaryOperator,
};
use jxx_parser::Span;
use jxx_types::{is_convertible, PrimitiveType, Type};
use rustc_hash::FxHashSet;

/// What kind of body is being rewritten
#[derive(Debug, Clone, PartialEq)]
pub struct BodyMode {
    /// No `this` available
    pub is_static: bool,
    /// Declared return type, `void` for constructors and initializers
    pub return_type: Type,
    /// Constructor bodies may `return;` and chain
    pub constructor: bool,
}

impl BodyMode {
    /// Mode for a method body.
    pub fn method(is_static: bool, return_type: Type) -> Self {
        Self {
            is_static,
            return_type,
            constructor: false,
        }
    }

    /// Mode for a constructor body.
    pub fn constructor() -> Self {
        Self {
            is_static: false,
            return_type: Type::void(),
            constructor: true,
        }
    }
}

/// Classification of a name or dotted prefix
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A value of known type
    Value(TypedExpr),
    /// A class name
    Class(ClassId),
    /// A package prefix that has not resolved yet
    Package(Vec<String>),
}

enum FieldTarget {
    Implicit,
    Class,
    Value(TypedExpr),
}

/// Rewrites one body
#[derive(Debug)]
pub struct BodyRewriter<'t> {
    resolver: Resolver<'t>,
    caller: Caller,
    mode: BodyMode,
    scopes: LocalScopes,
    names: NameGen,
    loops: usize,
    breakables: usize,
}

impl<'t> BodyRewriter<'t> {
    /// Create a rewriter for a body of `caller`'s class.
    pub fn new(resolver: Resolver<'t>, caller: Caller, mode: BodyMode) -> Self {
        Self {
            resolver,
            caller,
            mode,
            scopes: LocalScopes::new(),
            names: NameGen::new(),
            loops: 0,
            breakables: 0,
        }
    }

    /// Declare a parameter and return its C++ name.
    pub fn declare(&mut self, name: &str, ty: Type) -> String {
        self.scopes.declare(name, ty)
    }

    /// The temporary name generator, for the lowering to continue from.
    pub fn finish(self) -> NameGen {
        self.names
    }

    fn table(&self) -> &'t ClassTable {
        self.resolver.table()
    }

    fn resolve_type(&self, ty: &TypeExpr) -> CompileResult<Type> {
        let table = self.table();
        table.resolve_type(&table.get(self.caller.class).scope, self.caller.file, ty)
    }

    // ========================================================================
    // Errors
    // ========================================================================

    fn mismatch(&self, expected: impl Into<String>, found: impl Into<String>, span: Span) -> CompileError {
        CompileError::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
            file: self.caller.file,
            span,
        }
    }

    fn misplaced(&self, what: impl Into<String>, span: Span) -> CompileError {
        CompileError::Misplaced {
            what: what.into(),
            file: self.caller.file,
            span,
        }
    }

    fn unsupported(&self, feature: impl Into<String>, span: Span) -> CompileError {
        CompileError::Unsupported {
            feature: feature.into(),
            file: self.caller.file,
            span,
        }
    }

    fn unresolved(&self, name: String, span: Span) -> CompileError {
        CompileError::UnresolvedName {
            name,
            file: self.caller.file,
            span,
        }
    }

    // ========================================================================
    // Statements
    // ========================================================================

    /// Rewrite a block in a fresh scope.
    pub fn block(&mut self, block: &Block) -> CompileResult<TypedBlock> {
        self.scopes.push();
        let statements = self.statements(&block.statements);
        self.scopes.pop();
        Ok(TypedBlock {
            statements: statements?,
            span: block.span,
        })
    }

    /// Rewrite statements in the current scope.
    pub fn statements(&mut self, statements: &[Statement]) -> CompileResult<Vec<TypedStmt>> {
        statements.iter().map(|s| self.statement(s)).collect()
    }

    /// Rewrite one statement.
    pub fn statement(&mut self, stmt: &Statement) -> CompileResult<TypedStmt> {
        match stmt {
            Statement::Block(block) => Ok(TypedStmt::Block(self.block(block)?)),
            Statement::LocalVariable(decl) => Ok(TypedStmt::Locals(self.locals(decl)?)),
            Statement::Expression(expr) => {
                if let Expression::MethodCall(call) = &expr.expression {
                    if let Some(print) = self.print(call)? {
                        return Ok(print);
                    }
                }
                Ok(TypedStmt::Expr(self.expression(&expr.expression)?))
            }
            Statement::If(stmt) => {
                let condition = self.condition(&stmt.condition)?;
                let then_branch = Box::new(self.nested(&stmt.then_branch)?);
                let else_branch = match &stmt.else_branch {
                    Some(branch) => Some(Box::new(self.nested(branch)?)),
                    None => None,
                };
                Ok(TypedStmt::If {
                    condition,
                    then_branch,
                    else_branch,
                })
            }
            Statement::While(stmt) => {
                let condition = self.condition(&stmt.condition)?;
                let body = Box::new(self.loop_body(&stmt.body)?);
                Ok(TypedStmt::While { condition, body })
            }
            Statement::DoWhile(stmt) => {
                let body = Box::new(self.loop_body(&stmt.body)?);
                let condition = self.condition(&stmt.condition)?;
                Ok(TypedStmt::DoWhile { body, condition })
            }
            Statement::For(stmt) => {
                self.scopes.push();
                let result = self.for_loop(stmt);
                self.scopes.pop();
                result
            }
            Statement::ForEach(stmt) => {
                let array = self.expression(&stmt.iterable)?;
                let element = array
                    .ty
                    .element()
                    .map_err(|_| self.mismatch("an array", array.ty.java_name(), array.span))?;
                let declared = self.resolve_type(&stmt.ty)?;
                if !is_convertible(self.table(), &element, &declared) {
                    return Err(self.mismatch(declared.java_name(), element.java_name(), stmt.ty.span));
                }

                let array_temp = self.names.fresh();
                let index_temp = self.names.fresh();
                self.scopes.push();
                let name = self.scopes.declare(&stmt.name.name, declared.clone());
                let body = self.loop_body(&stmt.body);
                self.scopes.pop();
                Ok(TypedStmt::ForEach {
                    array_temp,
                    index_temp,
                    array,
                    variable: TypedLocal {
                        name,
                        ty: declared,
                        init: None,
                    },
                    body: Box::new(body?),
                })
            }
            Statement::Switch(stmt) => self.switch(stmt),
            Statement::Return(stmt) => {
                let expected = self.mode.return_type.clone();
                match &stmt.value {
                    None if expected.is_void() => Ok(TypedStmt::Return(None)),
                    None => Err(self.mismatch(expected.java_name(), "void", stmt.span)),
                    Some(value) if expected.is_void() => {
                        Err(self.mismatch("void", "a value", *value.span()))
                    }
                    Some(value) => Ok(TypedStmt::Return(Some(self.initializer(value, &expected)?))),
                }
            }
            Statement::Break(span) => {
                if self.breakables == 0 {
                    return Err(self.misplaced("'break' outside of a loop or switch", *span));
                }
                Ok(TypedStmt::Break)
            }
            Statement::Continue(span) => {
                if self.loops == 0 {
                    return Err(self.misplaced("'continue' outside of a loop", *span));
                }
                Ok(TypedStmt::Continue)
            }
            Statement::ConstructorCall(call) => Err(self.misplaced(
                "A constructor call that is not the first statement of a constructor",
                call.span,
            )),
            Statement::Empty(_) => Ok(TypedStmt::Empty),
        }
    }

    fn for_loop(&mut self, stmt: &ForStatement) -> CompileResult<TypedStmt> {
        let init = match &stmt.init {
            Some(ForInit::Declaration(decl)) => vec![TypedStmt::Locals(self.locals(decl)?)],
            Some(ForInit::Expressions(exprs)) => exprs
                .iter()
                .map(|e| Ok(TypedStmt::Expr(self.expression(e)?)))
                .collect::<CompileResult<Vec<_>>>()?,
            None => Vec::new(),
        };
        let condition = match &stmt.condition {
            Some(condition) => Some(self.condition(condition)?),
            None => None,
        };
        let update = stmt
            .update
            .iter()
            .map(|e| self.expression(e))
            .collect::<CompileResult<Vec<_>>>()?;
        let body = Box::new(self.loop_body(&stmt.body)?);
        Ok(TypedStmt::For {
            init,
            condition,
            update,
            body,
        })
    }

    // A branch or loop body that is not a block still gets its own scope
    fn nested(&mut self, stmt: &Statement) -> CompileResult<TypedStmt> {
        self.scopes.push();
        let result = self.statement(stmt);
        self.scopes.pop();
        result
    }

    fn loop_body(&mut self, stmt: &Statement) -> CompileResult<TypedStmt> {
        self.loops += 1;
        self.breakables += 1;
        let result = self.nested(stmt);
        self.loops -= 1;
        self.breakables -= 1;
        result
    }

    fn condition(&mut self, expr: &Expression) -> CompileResult<TypedExpr> {
        let condition = self.expression(expr)?;
        if !condition.ty.is_boolean() {
            return Err(self.mismatch("boolean", condition.ty.java_name(), condition.span));
        }
        Ok(condition)
    }

    fn locals(&mut self, decl: &LocalVariableDecl) -> CompileResult<Vec<TypedLocal>> {
        let base = self.resolve_type(&decl.ty)?;
        if base.is_void() {
            return Err(self.misplaced("A variable of type void", decl.ty.span));
        }
        let mut locals = Vec::with_capacity(decl.declarators.len());
        for declarator in &decl.declarators {
            let ty = base.array_of(declarator.dimensions);
            let init = match &declarator.initializer {
                Some(init) => Some(self.initializer(init, &ty)?),
                None => None,
            };
            let name = self.scopes.declare(&declarator.name.name, ty.clone());
            locals.push(TypedLocal { name, ty, init });
        }
        Ok(locals)
    }

    fn switch(&mut self, stmt: &SwitchStatement) -> CompileResult<TypedStmt> {
        let discriminant = self.expression(&stmt.discriminant)?;
        if discriminant.ty.is_string() {
            return Err(self.unsupported("switch statements on strings", discriminant.span));
        }
        let allowed = matches!(
            discriminant.ty.as_primitive(),
            Some(PrimitiveType::Int | PrimitiveType::Short | PrimitiveType::Byte | PrimitiveType::Char)
        );
        if !allowed {
            return Err(self.mismatch("an int, short, byte or char", discriminant.ty.java_name(), discriminant.span));
        }

        self.scopes.push();
        self.breakables += 1;
        let cases = self.cases(stmt, &discriminant.ty);
        self.breakables -= 1;
        self.scopes.pop();
        Ok(TypedStmt::Switch {
            discriminant,
            cases: cases?,
        })
    }

    fn cases(&mut self, stmt: &SwitchStatement, discriminant: &Type) -> CompileResult<Vec<TypedCase>> {
        let mut seen = FxHashSet::default();
        let mut has_default = false;
        let mut cases = Vec::with_capacity(stmt.cases.len());
        for case in &stmt.cases {
            let label = match &case.label {
                Some(label) => {
                    let label = self.initializer(label, discriminant)?;
                    let value = label
                        .int_constant()
                        .ok_or_else(|| self.unsupported("case labels that are not literals", label.span))?;
                    if !seen.insert(value) {
                        return Err(self.misplaced("A duplicate case label", label.span));
                    }
                    Some(label)
                }
                None if has_default => return Err(self.misplaced("A second default label", case.span)),
                None => {
                    has_default = true;
                    None
                }
            };
            let body = self.statements(&case.body)?;
            cases.push(TypedCase { label, body });
        }
        Ok(cases)
    }

    fn print(&mut self, call: &MethodCall) -> CompileResult<Option<TypedStmt>> {
        let newline = match call.name.name.as_str() {
            "println" => true,
            "print" => false,
            _ => return Ok(None),
        };
        let CallTarget::Expression(target) = &call.target else {
            return Ok(None);
        };
        if !target.as_dotted_name().is_some_and(|name| name == ["System", "out"]) || self.is_declared("System") {
            return Ok(None);
        }

        let mut args = self.arguments(&call.args)?;
        if args.len() > 1 || (args.is_empty() && !newline) {
            return Err(CompileError::NoApplicableMethod {
                name: call.name.name.clone(),
                class: "java.io.PrintStream".to_string(),
                args: args.iter().map(|a| a.ty.java_name()).collect::<Vec<_>>().join(", "),
                file: self.caller.file,
                span: call.span,
            });
        }
        Ok(Some(TypedStmt::Print { newline, arg: args.pop() }))
    }

    fn is_declared(&self, name: &str) -> bool {
        let table = self.table();
        let klass = table.get(self.caller.class);
        self.scopes.lookup(name).is_some()
            || klass.field(name).is_some()
            || table.resolve_simple(&klass.scope, name).is_some()
    }

    /// Rewrite a leading `super(...)` or `this(...)`.
    pub fn constructor_call(&mut self, call: &ConstructorCall, current: usize) -> CompileResult<Option<Chain>> {
        let args = self.arguments(&call.args)?;
        let types: Vec<Type> = args.iter().map(|a| a.ty.clone()).collect();
        let (kind, class) = match call.kind {
            ConstructorCallKind::Super => {
                let parent = self
                    .table()
                    .superclass(self.caller.class)
                    .unwrap_or(predefined::OBJECT);
                (ChainKind::Super, parent)
            }
            ConstructorCallKind::This => (ChainKind::This, self.caller.class),
        };

        let index = self.resolver.resolve_constructor(self.caller, class, &types, call.span)?;
        if kind == ChainKind::This && index == current {
            return Err(self.misplaced("A recursive constructor invocation", call.span));
        }
        if class == predefined::OBJECT {
            return Ok(None);
        }
        Ok(Some(Chain {
            kind,
            class,
            index,
            args,
        }))
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    /// Rewrite an expression that must be assignable to `target`.
    pub fn initializer(&mut self, expr: &Expression, target: &Type) -> CompileResult<TypedExpr> {
        let value = self.expression(expr)?;
        self.check_assignable(&value, target)?;
        Ok(value)
    }

    fn check_assignable(&self, value: &TypedExpr, target: &Type) -> CompileResult<()> {
        if is_convertible(self.table(), &value.ty, target) {
            return Ok(());
        }
        let narrowed = match (target.as_primitive(), value.int_constant()) {
            (Some(PrimitiveType::Byte), Some(v)) => (-128..=127).contains(&v),
            (Some(PrimitiveType::Short), Some(v)) => (-32768..=32767).contains(&v),
            (Some(PrimitiveType::Char), Some(v)) => (0..=0xFFFF).contains(&v),
            _ => false,
        };
        if narrowed && value.ty.as_primitive().is_some_and(PrimitiveType::is_integral) {
            return Ok(());
        }
        Err(self.mismatch(target.java_name(), value.ty.java_name(), value.span))
    }

    fn arguments(&mut self, args: &[Expression]) -> CompileResult<Vec<TypedExpr>> {
        args.iter()
            .map(|arg| {
                let arg = self.expression(arg)?;
                if arg.ty.is_void() {
                    return Err(self.mismatch("a value", "void", arg.span));
                }
                Ok(arg)
            })
            .collect()
    }

    /// Rewrite an expression used as a value.
    pub fn expression(&mut self, expr: &Expression) -> CompileResult<TypedExpr> {
        match expr {
            Expression::Literal(lit) => self.literal(&lit.value, lit.span),
            Expression::Name(_) | Expression::FieldAccess(_) => {
                let operand = self.operand(expr)?;
                self.value(operand, *expr.span())
            }
            Expression::This(span) => self.this_expr("this", *span),
            Expression::MethodCall(call) => self.call(call),
            Expression::ArrayAccess(access) => {
                let array = self.expression(&access.array)?;
                let element = array
                    .ty
                    .element()
                    .map_err(|_| self.mismatch("an array", array.ty.java_name(), array.span))?;
                let index = self.index(&access.index)?;
                Ok(TypedExpr::new(
                    ExprKind::Index {
                        array: Box::new(array),
                        index: Box::new(index),
                    },
                    element,
                    access.span,
                ))
            }
            Expression::New(new) => {
                let ty = self.resolve_type(&new.class)?;
                let class = self
                    .table()
                    .class_of_type(&ty)
                    .ok_or_else(|| self.mismatch("a class type", ty.java_name(), new.class.span))?;
                if self.table().get(class).is_abstract {
                    return Err(self.misplaced(format!("Instantiation of abstract class '{}'", ty), new.span));
                }
                let args = self.arguments(&new.args)?;
                let types: Vec<Type> = args.iter().map(|a| a.ty.clone()).collect();
                let constructor = self
                    .resolver
                    .resolve_constructor(self.caller, class, &types, new.span)?;
                Ok(TypedExpr::new(
                    ExprKind::New {
                        class,
                        constructor,
                        args,
                    },
                    ty,
                    new.span,
                ))
            }
            Expression::NewArray(new) => {
                let element = self.resolve_type(&new.element)?;
                if element.is_void() {
                    return Err(self.misplaced("An array of void", new.element.span));
                }
                let dimensions = new
                    .dimensions
                    .iter()
                    .map(|d| self.index(d))
                    .collect::<CompileResult<Vec<_>>>()?;
                let ty = element.array_of(dimensions.len() + new.extra_dimensions);
                Ok(TypedExpr::new(ExprKind::NewArray { dimensions }, ty, new.span))
            }
            Expression::Unary(unary) => self.unary(unary),
            Expression::Binary(binary) => self.binary(binary),
            Expression::Assign(assign) => self.assign(assign),
            Expression::Conditional(cond) => {
                let condition = self.condition(&cond.condition)?;
                let then_expr = self.expression(&cond.then_expr)?;
                let else_expr = self.expression(&cond.else_expr)?;
                let ty = self.conditional_type(&then_expr, &else_expr, cond.span)?;
                Ok(TypedExpr::new(
                    ExprKind::Conditional {
                        condition: Box::new(condition),
                        then_expr: Box::new(then_expr),
                        else_expr: Box::new(else_expr),
                    },
                    ty,
                    cond.span,
                ))
            }
            Expression::Cast(cast) => {
                let target = self.resolve_type(&cast.ty)?;
                let expr = self.expression(&cast.expr)?;
                let kind = self.cast_kind(&expr.ty, &target, cast.span)?;
                Ok(TypedExpr::new(
                    ExprKind::Cast {
                        kind,
                        expr: Box::new(expr),
                    },
                    target,
                    cast.span,
                ))
            }
            Expression::InstanceOf(test) => {
                let expr = self.expression(&test.expr)?;
                let target = self.resolve_type(&test.ty)?;
                if target.is_array() {
                    return Err(self.unsupported("instanceof tests against array types", test.ty.span));
                }
                if !expr.ty.is_reference() {
                    return Err(self.mismatch("a reference", expr.ty.java_name(), expr.span));
                }
                if !is_convertible(self.table(), &expr.ty, &target) && !is_convertible(self.table(), &target, &expr.ty) {
                    return Err(self.mismatch(target.java_name(), expr.ty.java_name(), test.span));
                }
                let class = self
                    .table()
                    .class_of_type(&target)
                    .ok_or_else(|| self.mismatch("a class type", target.java_name(), test.ty.span))?;
                Ok(TypedExpr::new(
                    ExprKind::InstanceOf {
                        expr: Box::new(expr),
                        class,
                    },
                    Type::boolean(),
                    test.span,
                ))
            }
        }
    }

    fn literal(&self, value: &LiteralValue, span: Span) -> CompileResult<TypedExpr> {
        let ty = match value {
            LiteralValue::Int(v) => {
                if *v > i32::MAX as i64 {
                    return Err(self.mismatch("an int in range", v.to_string(), span));
                }
                Type::int()
            }
            LiteralValue::Long(v) => {
                if *v > i64::MAX as i128 {
                    return Err(self.mismatch("a long in range", v.to_string(), span));
                }
                Type::primitive(PrimitiveType::Long)
            }
            LiteralValue::Float(_) => Type::primitive(PrimitiveType::Float),
            LiteralValue::Double(_) => Type::primitive(PrimitiveType::Double),
            LiteralValue::Char(_) => Type::primitive(PrimitiveType::Char),
            LiteralValue::String(_) => Type::string(),
            LiteralValue::Boolean(_) => Type::boolean(),
            LiteralValue::Null => Type::Null,
        };
        Ok(TypedExpr::new(ExprKind::Literal(value.clone()), ty, span))
    }

    fn index(&mut self, expr: &Expression) -> CompileResult<TypedExpr> {
        let index = self.expression(expr)?;
        let allowed = matches!(
            index.ty.as_primitive(),
            Some(PrimitiveType::Int | PrimitiveType::Short | PrimitiveType::Byte | PrimitiveType::Char)
        );
        if !allowed {
            return Err(self.mismatch("int", index.ty.java_name(), index.span));
        }
        Ok(index)
    }

    fn this_expr(&self, name: &str, span: Span) -> CompileResult<TypedExpr> {
        if self.mode.is_static {
            return Err(CompileError::StaticContext {
                name: name.to_string(),
                file: self.caller.file,
                span,
            });
        }
        Ok(TypedExpr::this(self.table().get(self.caller.class).ty(), span))
    }

    // ========================================================================
    // Names
    // ========================================================================

    /// Classify a name, a dotted chain or any other expression.
    pub fn operand(&mut self, expr: &Expression) -> CompileResult<Operand> {
        match expr {
            Expression::Name(id) => self.name(id),
            Expression::FieldAccess(access) => self.field_access(access),
            _ => Ok(Operand::Value(self.expression(expr)?)),
        }
    }

    fn value(&self, operand: Operand, span: Span) -> CompileResult<TypedExpr> {
        match operand {
            Operand::Value(value) => Ok(value),
            Operand::Class(class) => Err(self.unresolved(self.table().get(class).name.dotted_name(), span)),
            Operand::Package(path) => Err(self.unresolved(path.join("."), span)),
        }
    }

    fn name(&self, id: &Identifier) -> CompileResult<Operand> {
        let table = self.table();
        let klass = table.get(self.caller.class);
        if let Some(class) = table.resolve_simple(&klass.scope, &id.name) {
            return Ok(Operand::Class(class));
        }
        if let Some(local) = self.scopes.lookup(&id.name) {
            return Ok(Operand::Value(TypedExpr::new(
                ExprKind::Local(local.cpp_name.clone()),
                local.ty.clone(),
                id.span,
            )));
        }
        if klass.field(&id.name).is_some() {
            return self.member_field(FieldTarget::Implicit, self.caller.class, &id.name, id.span);
        }
        Ok(Operand::Package(vec![id.name.clone()]))
    }

    fn field_access(&mut self, access: &FieldAccess) -> CompileResult<Operand> {
        let name = &access.name.name;
        let table = self.table();
        match self.operand(&access.target)? {
            Operand::Value(value) if value.ty.is_array() => {
                if name != "length" {
                    return Err(CompileError::UnknownField {
                        name: name.clone(),
                        class: value.ty.java_name(),
                        file: self.caller.file,
                        span: access.name.span,
                    });
                }
                Ok(Operand::Value(TypedExpr::new(
                    ExprKind::ArrayLength(Box::new(value)),
                    Type::int(),
                    access.span,
                )))
            }
            Operand::Value(value) => {
                let class = table.class_of_type(&value.ty).ok_or_else(|| CompileError::InvalidSelector {
                    reason: format!("a value of type {} has no fields", value.ty),
                    file: self.caller.file,
                    span: access.span,
                })?;
                self.member_field(FieldTarget::Value(value), class, name, access.span)
            }
            Operand::Class(class) => {
                if table.get(class).field(name).is_some() {
                    return self.member_field(FieldTarget::Class, class, name, access.span);
                }
                match table.nested_class(class, name) {
                    Some(nested) => Ok(Operand::Class(nested)),
                    None => Err(CompileError::UnknownField {
                        name: name.clone(),
                        class: table.get(class).name.dotted_name(),
                        file: self.caller.file,
                        span: access.name.span,
                    }),
                }
            }
            Operand::Package(mut path) => {
                path.push(name.clone());
                let segments: Vec<&str> = path.iter().map(String::as_str).collect();
                match table.tree().resolve(&segments) {
                    Some(class) => Ok(Operand::Class(class)),
                    None => Ok(Operand::Package(path)),
                }
            }
        }
    }

    fn member_field(&self, target: FieldTarget, class: ClassId, name: &str, span: Span) -> CompileResult<Operand> {
        let index = self.resolver.resolve_field(self.caller, class, name, span)?;
        let field = &self.table().get(class).fields[index];
        if field.is_static {
            return Ok(Operand::Value(TypedExpr::new(
                ExprKind::StaticField {
                    class: field.implementor,
                    name: field.cpp_name.clone(),
                },
                field.ty.clone(),
                span,
            )));
        }

        let target = match target {
            FieldTarget::Implicit => self.this_expr(name, span)?,
            FieldTarget::Value(value) => value,
            FieldTarget::Class => {
                return Err(CompileError::StaticContext {
                    name: name.to_string(),
                    file: self.caller.file,
                    span,
                })
            }
        };
        Ok(Operand::Value(TypedExpr::new(
            ExprKind::Field {
                target: Box::new(target),
                name: field.cpp_name.clone(),
            },
            field.ty.clone(),
            span,
        )))
    }

    // ========================================================================
    // Calls
    // ========================================================================

    fn call(&mut self, call: &MethodCall) -> CompileResult<TypedExpr> {
        let (selectors, receiver) = match &call.target {
            CallTarget::Implicit => (Vec::new(), None),
            CallTarget::Super(span) => (vec![Selector::Super], Some(self.this_expr("super", *span)?)),
            CallTarget::Expression(target) => match self.operand(target)? {
                Operand::Value(value) => (vec![Selector::Value(value.ty.clone())], Some(value)),
                Operand::Class(class) => (vec![Selector::Class(class)], None),
                Operand::Package(path) => return Err(self.unresolved(path.join("."), *target.span())),
            },
        };

        let args = self.arguments(&call.args)?;
        let invocation = Invocation {
            selectors,
            name: call.name.name.clone(),
            args: args.iter().map(|a| a.ty.clone()).collect(),
            span: call.span,
        };
        let resolved = self.resolver.resolve_method(self.caller, &invocation)?;
        let method = &resolved.method;

        let (dispatch, receiver) = if method.is_static {
            // `expr.staticMethod()` still evaluates `expr`
            match resolved.receiver {
                Receiver::Value => (Dispatch::Static, receiver),
                _ => (Dispatch::Static, None),
            }
        } else {
            match resolved.receiver {
                Receiver::Super if method.is_abstract => {
                    return Err(self.misplaced(
                        format!("A direct call to abstract method '{}'", method.signature()),
                        call.span,
                    ))
                }
                Receiver::Super => (Dispatch::Super, receiver),
                Receiver::Class => {
                    return Err(CompileError::StaticContext {
                        name: method.signature(),
                        file: self.caller.file,
                        span: call.span,
                    })
                }
                Receiver::Implicit | Receiver::This => {
                    (Dispatch::Virtual, Some(self.this_expr(&call.name.name, call.span)?))
                }
                Receiver::Value => (Dispatch::Virtual, receiver),
            }
        };

        Ok(TypedExpr::new(
            ExprKind::Call {
                dispatch,
                receiver: receiver.map(Box::new),
                class: resolved.class,
                index: resolved.index,
                args,
            },
            method.return_type.clone(),
            call.span,
        ))
    }

    // ========================================================================
    // Operators
    // ========================================================================

    fn unary(&mut self, unary: &UnaryExpression) -> CompileResult<TypedExpr> {
        use UnaryOperator::*;

        if unary.op == Minus {
            if let Expression::Literal(lit) = unary.operand.as_ref() {
                let folded = match lit.value {
                    // Magnitudes past MAX only come from decimal literals; the
                    // rest negate with the wrap-around of the target type
                    LiteralValue::Int(v) if v > i32::MAX as i64 => Some(LiteralValue::Int(-v)),
                    LiteralValue::Int(v) => Some(LiteralValue::Int((v as i32).wrapping_neg() as i64)),
                    LiteralValue::Long(v) if v > i64::MAX as i128 => Some(LiteralValue::Long(-v)),
                    LiteralValue::Long(v) => Some(LiteralValue::Long((v as i64).wrapping_neg() as i128)),
                    LiteralValue::Float(v) => Some(LiteralValue::Float(-v)),
                    LiteralValue::Double(v) => Some(LiteralValue::Double(-v)),
                    _ => None,
                };
                if let Some(value) = folded {
                    let ty = match value {
                        LiteralValue::Int(v) if v < i32::MIN as i64 => {
                            return Err(self.mismatch("an int in range", v.to_string(), unary.span))
                        }
                        LiteralValue::Long(_) => Type::primitive(PrimitiveType::Long),
                        LiteralValue::Float(_) => Type::primitive(PrimitiveType::Float),
                        LiteralValue::Double(_) => Type::primitive(PrimitiveType::Double),
                        _ => Type::int(),
                    };
                    return Ok(TypedExpr::new(ExprKind::Literal(value), ty, unary.span));
                }
            }
        }

        let operand = self.expression(&unary.operand)?;
        let ty = match unary.op {
            Plus | Minus | BitNot => {
                let primitive = operand.ty.as_primitive().filter(|p| {
                    if unary.op == BitNot {
                        p.is_integral()
                    } else {
                        p.is_numeric()
                    }
                });
                match primitive {
                    Some(p) => Type::primitive(promoted(p)),
                    None => {
                        let expected = if unary.op == BitNot { "an integral operand" } else { "a numeric operand" };
                        return Err(self.mismatch(expected, operand.ty.java_name(), operand.span));
                    }
                }
            }
            Not => {
                if !operand.ty.is_boolean() {
                    return Err(self.mismatch("boolean", operand.ty.java_name(), operand.span));
                }
                Type::boolean()
            }
            PreIncrement | PreDecrement | PostIncrement | PostDecrement => {
                if !operand.is_variable() {
                    return Err(self.misplaced(format!("'{}' on a value that is not a variable", unary.op.as_str()), unary.span));
                }
                if !operand.ty.is_numeric() {
                    return Err(self.mismatch("a numeric variable", operand.ty.java_name(), operand.span));
                }
                operand.ty.clone()
            }
        };
        Ok(TypedExpr::new(
            ExprKind::Unary {
                op: unary.op,
                operand: Box::new(operand),
            },
            ty,
            unary.span,
        ))
    }

    fn binary(&mut self, binary: &BinaryExpression) -> CompileResult<TypedExpr> {
        let left = self.expression(&binary.left)?;
        let right = self.expression(&binary.right)?;

        if binary.op == BinaryOperator::Add && (left.ty.is_string() || right.ty.is_string()) {
            for side in [&left, &right] {
                if side.ty.is_void() {
                    return Err(self.mismatch("a value", "void", side.span));
                }
            }
            let mut parts = concat_parts(left);
            parts.extend(concat_parts(right));
            return Ok(TypedExpr::new(ExprKind::Concat(parts), Type::string(), binary.span));
        }

        let ty = self.binary_type(binary.op, &left, &right, binary.span)?;
        Ok(TypedExpr::new(
            ExprKind::Binary {
                op: binary.op,
                left: Box::new(left),
                right: Box::new(right),
            },
            ty,
            binary.span,
        ))
    }

    fn binary_type(&self, op: BinaryOperator, left: &TypedExpr, right: &TypedExpr, span: Span) -> CompileResult<Type> {
        use BinaryOperator::*;

        let (l, r) = (&left.ty, &right.ty);
        let found = || format!("{} and {}", l, r);
        let numeric = match (l.as_primitive(), r.as_primitive()) {
            (Some(a), Some(b)) if a.is_numeric() && b.is_numeric() => Some(PrimitiveType::promote(a, b)),
            _ => None,
        };
        let integral = match (l.as_primitive(), r.as_primitive()) {
            (Some(a), Some(b)) if a.is_integral() && b.is_integral() => Some(PrimitiveType::promote(a, b)),
            _ => None,
        };
        let both_boolean = l.is_boolean() && r.is_boolean();

        match op {
            Add | Sub | Mul | Div | Rem => numeric
                .map(Type::primitive)
                .ok_or_else(|| self.mismatch("numeric operands", found(), span)),
            Shl | Shr | UShr => match (l.as_primitive(), integral) {
                (Some(left), Some(_)) => Ok(Type::primitive(promoted(left))),
                _ => Err(self.mismatch("integral operands", found(), span)),
            },
            Lt | Gt | Le | Ge => numeric
                .map(|_| Type::boolean())
                .ok_or_else(|| self.mismatch("numeric operands", found(), span)),
            Eq | Ne => {
                let references = l.is_reference()
                    && r.is_reference()
                    && (is_convertible(self.table(), l, r) || is_convertible(self.table(), r, l));
                if numeric.is_some() || both_boolean || references {
                    Ok(Type::boolean())
                } else {
                    Err(self.mismatch("comparable operands", found(), span))
                }
            }
            BitAnd | BitOr | BitXor => {
                if both_boolean {
                    Ok(Type::boolean())
                } else {
                    integral
                        .map(Type::primitive)
                        .ok_or_else(|| self.mismatch("integral or boolean operands", found(), span))
                }
            }
            And | Or => {
                if both_boolean {
                    Ok(Type::boolean())
                } else {
                    Err(self.mismatch("boolean operands", found(), span))
                }
            }
        }
    }

    fn assign(&mut self, assign: &AssignExpression) -> CompileResult<TypedExpr> {
        let target = self.expression(&assign.target)?;
        if !target.is_variable() {
            return Err(self.misplaced("Assignment to a value that is not a variable", assign.span));
        }
        let value = self.expression(&assign.value)?;
        let ty = target.ty.clone();

        let kind = match assign.op {
            AssignOperator::Assign => {
                self.check_assignable(&value, &ty)?;
                ExprKind::Assign {
                    target: Box::new(target),
                    value: Box::new(value),
                }
            }
            AssignOperator::Compound(BinaryOperator::Add) if ty.is_string() => {
                if value.ty.is_void() {
                    return Err(self.mismatch("a value", "void", value.span));
                }
                let mut parts = vec![target.clone()];
                parts.extend(concat_parts(value));
                ExprKind::Assign {
                    target: Box::new(target),
                    value: Box::new(TypedExpr::new(ExprKind::Concat(parts), Type::string(), assign.span)),
                }
            }
            AssignOperator::Compound(op) => {
                self.binary_type(op, &target, &value, assign.span)?;
                ExprKind::CompoundAssign {
                    op,
                    target: Box::new(target),
                    value: Box::new(value),
                }
            }
        };
        Ok(TypedExpr::new(kind, ty, assign.span))
    }

    fn conditional_type(&self, a: &TypedExpr, b: &TypedExpr, span: Span) -> CompileResult<Type> {
        if a.ty == b.ty {
            return Ok(a.ty.clone());
        }
        if let (Some(x), Some(y)) = (a.ty.as_primitive(), b.ty.as_primitive()) {
            if x.is_numeric() && y.is_numeric() {
                return Ok(Type::primitive(PrimitiveType::promote(x, y)));
            }
        }
        if a.ty.is_reference() && b.ty.is_reference() {
            if is_convertible(self.table(), &a.ty, &b.ty) {
                return Ok(b.ty.clone());
            }
            if is_convertible(self.table(), &b.ty, &a.ty) {
                return Ok(a.ty.clone());
            }
        }
        Err(self.mismatch("compatible branches", format!("{} and {}", a.ty, b.ty), span))
    }

    fn cast_kind(&self, from: &Type, to: &Type, span: Span) -> CompileResult<CastKind> {
        match (from.as_primitive(), to.as_primitive()) {
            (Some(f), Some(t)) if (f.is_numeric() && t.is_numeric()) || (f == t && f != PrimitiveType::Void) => {
                Ok(CastKind::Primitive)
            }
            (None, None) if is_convertible(self.table(), from, to) => Ok(CastKind::Widening),
            (None, None) if is_convertible(self.table(), to, from) => Ok(CastKind::Checked),
            _ => Err(self.mismatch(to.java_name(), from.java_name(), span)),
        }
    }
}

fn promoted(p: PrimitiveType) -> PrimitiveType {
    PrimitiveType::promote(p, PrimitiveType::Int)
}

fn concat_parts(expr: TypedExpr) -> Vec<TypedExpr> {
    let TypedExpr { kind, ty, span } = expr;
    match kind {
        ExprKind::Concat(parts) => parts,
        kind => vec![TypedExpr::new(kind, ty, span)],
    }
}
