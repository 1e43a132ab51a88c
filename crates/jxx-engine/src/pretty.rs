//! Pretty-printing for inputs and lowered output
//!
//! Provides human-readable dumps for debugging: the parsed Java back as
//! fully parenthesized source, and the lowered classes as a layout listing
//! followed by their function bodies.

use crate::emit::CodeWriter;
use crate::lower::{CppClass, CppUnit, SlotInit};
use jxx_parser::ast::*;

/// Trait for pretty-printing syntax trees and lowered units
pub trait PrettyPrint {
    /// Render as indented text.
    fn pretty_print(&self) -> String;
}

// ============================================================================
// Java syntax
// ============================================================================

impl PrettyPrint for CompilationUnit {
    fn pretty_print(&self) -> String {
        let mut w = CodeWriter::new();
        if let Some(package) = &self.package {
            w.line(&format!("package {};", package.dotted()));
        }
        for import in &self.imports {
            let suffix = if import.wildcard { ".*" } else { "" };
            w.line(&format!("import {}{};", import.name.dotted(), suffix));
        }
        for class in &self.classes {
            w.blank();
            class_decl(&mut w, class);
        }
        w.finish()
    }
}

impl PrettyPrint for Expression {
    fn pretty_print(&self) -> String {
        expr(self)
    }
}

fn modifiers(m: &Modifiers) -> String {
    let mut words = Vec::new();
    words.extend(m.annotations.iter().map(|a| format!("@{}", a)));
    match m.access {
        Some(AccessModifier::Public) => words.push("public".to_string()),
        Some(AccessModifier::Protected) => words.push("protected".to_string()),
        Some(AccessModifier::Private) => words.push("private".to_string()),
        None => {}
    }
    if m.is_abstract {
        words.push("abstract".to_string());
    }
    if m.is_static {
        words.push("static".to_string());
    }
    if m.is_final {
        words.push("final".to_string());
    }
    let mut text = words.join(" ");
    if !text.is_empty() {
        text.push(' ');
    }
    text
}

fn params(params: &[Parameter]) -> String {
    params
        .iter()
        .map(|p| format!("{} {}", p.ty.display_name(), p.name.name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn class_decl(w: &mut CodeWriter, class: &ClassDecl) {
    let mut head = format!("{}class {}", modifiers(&class.modifiers), class.name.name);
    if let Some(parent) = &class.extends {
        head.push_str(&format!(" extends {}", parent.display_name()));
    }
    w.braced(&head, "", |w| {
        for member in &class.members {
            match member {
                MemberDecl::Field(field) => {
                    let vars: Vec<String> = field.declarators.iter().map(declarator).collect();
                    w.line(&format!(
                        "{}{} {};",
                        modifiers(&field.modifiers),
                        field.ty.display_name(),
                        vars.join(", ")
                    ));
                }
                MemberDecl::Method(method) => {
                    let head = format!(
                        "{}{} {}({})",
                        modifiers(&method.modifiers),
                        method.return_type.display_name(),
                        method.name.name,
                        params(&method.params)
                    );
                    match &method.body {
                        Some(body) => w.braced(&head, "", |w| statements(w, &body.statements)),
                        None => w.line(&format!("{};", head)),
                    }
                }
                MemberDecl::Constructor(ctor) => {
                    let head = format!(
                        "{}{}({})",
                        modifiers(&ctor.modifiers),
                        ctor.name.name,
                        params(&ctor.params)
                    );
                    w.braced(&head, "", |w| statements(w, &ctor.body.statements));
                }
                MemberDecl::Class(nested) => class_decl(w, nested),
            }
        }
    });
}

fn declarator(d: &VariableDeclarator) -> String {
    let mut text = format!("{}{}", d.name.name, "[]".repeat(d.dimensions));
    if let Some(init) = &d.initializer {
        text.push_str(&format!(" = {}", expr(init)));
    }
    text
}

fn local(decl: &LocalVariableDecl) -> String {
    let vars: Vec<String> = decl.declarators.iter().map(declarator).collect();
    format!("{} {}", decl.ty.display_name(), vars.join(", "))
}

fn statements(w: &mut CodeWriter, stmts: &[Statement]) {
    for stmt in stmts {
        statement(w, stmt);
    }
}

fn nested(w: &mut CodeWriter, head: &str, body: &Statement) {
    match body {
        Statement::Block(block) => w.braced(head, "", |w| statements(w, &block.statements)),
        other => {
            w.line(head);
            w.indented(|w| statement(w, other));
        }
    }
}

fn statement(w: &mut CodeWriter, stmt: &Statement) {
    match stmt {
        Statement::Block(block) => w.braced("", "", |w| statements(w, &block.statements)),
        Statement::LocalVariable(decl) => w.line(&format!("{};", local(decl))),
        Statement::Expression(e) => w.line(&format!("{};", expr(&e.expression))),
        Statement::If(s) => {
            nested(w, &format!("if ({})", expr(&s.condition)), &s.then_branch);
            if let Some(else_branch) = &s.else_branch {
                nested(w, "else", else_branch);
            }
        }
        Statement::While(s) => nested(w, &format!("while ({})", expr(&s.condition)), &s.body),
        Statement::DoWhile(s) => {
            nested(w, "do", &s.body);
            w.line(&format!("while ({});", expr(&s.condition)));
        }
        Statement::For(s) => {
            let init = match &s.init {
                Some(ForInit::Declaration(decl)) => local(decl),
                Some(ForInit::Expressions(exprs)) => exprs.iter().map(expr).collect::<Vec<_>>().join(", "),
                None => String::new(),
            };
            let condition = s.condition.as_ref().map(expr).unwrap_or_default();
            let update = s.update.iter().map(expr).collect::<Vec<_>>().join(", ");
            nested(w, &format!("for ({}; {}; {})", init, condition, update), &s.body);
        }
        Statement::ForEach(s) => nested(
            w,
            &format!("for ({} {} : {})", s.ty.display_name(), s.name.name, expr(&s.iterable)),
            &s.body,
        ),
        Statement::Switch(s) => w.braced(&format!("switch ({})", expr(&s.discriminant)), "", |w| {
            for case in &s.cases {
                match &case.label {
                    Some(label) => w.line(&format!("case {}:", expr(label))),
                    None => w.line("default:"),
                }
                w.indented(|w| statements(w, &case.body));
            }
        }),
        Statement::Return(r) => match &r.value {
            Some(value) => w.line(&format!("return {};", expr(value))),
            None => w.line("return;"),
        },
        Statement::Break(_) => w.line("break;"),
        Statement::Continue(_) => w.line("continue;"),
        Statement::ConstructorCall(call) => {
            let keyword = match call.kind {
                ConstructorCallKind::Super => "super",
                ConstructorCallKind::This => "this",
            };
            w.line(&format!("{}({});", keyword, args(&call.args)));
        }
        Statement::Empty(_) => w.line(";"),
    }
}

fn args(args: &[Expression]) -> String {
    args.iter().map(expr).collect::<Vec<_>>().join(", ")
}

fn literal(value: &LiteralValue) -> String {
    match value {
        LiteralValue::Int(v) => v.to_string(),
        LiteralValue::Long(v) => format!("{}L", v),
        LiteralValue::Float(v) => format!("{:?}f", v),
        LiteralValue::Double(v) => format!("{:?}", v),
        LiteralValue::Char(c) => format!("{:?}", c),
        LiteralValue::String(s) => format!("{:?}", s),
        LiteralValue::Boolean(b) => b.to_string(),
        LiteralValue::Null => "null".to_string(),
    }
}

fn expr(e: &Expression) -> String {
    match e {
        Expression::Literal(l) => literal(&l.value),
        Expression::Name(id) => id.name.clone(),
        Expression::This(_) => "this".to_string(),
        Expression::FieldAccess(f) => format!("{}.{}", expr(&f.target), f.name.name),
        Expression::MethodCall(call) => {
            let target = match &call.target {
                CallTarget::Implicit => String::new(),
                CallTarget::Super(_) => "super.".to_string(),
                CallTarget::Expression(target) => format!("{}.", expr(target)),
            };
            format!("{}{}({})", target, call.name.name, args(&call.args))
        }
        Expression::ArrayAccess(a) => format!("{}[{}]", expr(&a.array), expr(&a.index)),
        Expression::New(n) => format!("new {}({})", n.class.display_name(), args(&n.args)),
        Expression::NewArray(n) => {
            let sized: String = n.dimensions.iter().map(|d| format!("[{}]", expr(d))).collect();
            format!(
                "new {}{}{}",
                n.element.display_name(),
                sized,
                "[]".repeat(n.extra_dimensions)
            )
        }
        Expression::Unary(u) if u.op.is_postfix() => format!("({}{})", expr(&u.operand), u.op.as_str()),
        Expression::Unary(u) => format!("({}{})", u.op.as_str(), expr(&u.operand)),
        Expression::Binary(b) => format!("({} {} {})", expr(&b.left), b.op.as_str(), expr(&b.right)),
        Expression::Assign(a) => format!("{} {} {}", expr(&a.target), a.op.as_str(), expr(&a.value)),
        Expression::Conditional(c) => format!(
            "({} ? {} : {})",
            expr(&c.condition),
            expr(&c.then_expr),
            expr(&c.else_expr)
        ),
        Expression::Cast(c) => format!("(({}) {})", c.ty.display_name(), expr(&c.expr)),
        Expression::InstanceOf(i) => format!("({} instanceof {})", expr(&i.expr), i.ty.display_name()),
    }
}

// ============================================================================
// Lowered classes
// ============================================================================

impl PrettyPrint for CppClass {
    fn pretty_print(&self) -> String {
        let mut w = CodeWriter::new();
        w.line(&format!("; class {} -> {}", self.java_name, self.qualified_struct));
        w.line(&format!(";   parent {}", self.parent_struct));
        for field in &self.fields {
            w.line(&format!(";   field {} {}", field.ty, field.name));
        }
        for field in &self.static_fields {
            match &field.init {
                Some(init) => w.line(&format!(";   static {} {} = {}", field.ty, field.name, init)),
                None => w.line(&format!(";   static {} {}", field.ty, field.name)),
            }
        }
        for (i, slot) in self.slots.iter().enumerate() {
            let init = match &slot.init {
                SlotInit::Direct(definition) => definition.clone(),
                SlotInit::Cast(definition) => format!("{} (inherited)", definition),
                SlotInit::Abstract => "abstract".to_string(),
            };
            w.line(&format!(";   slot {} {}: {} <- {}", i, slot.name, slot.pointer_type(), init));
        }
        for function in &self.functions {
            let params: Vec<String> = function.params.iter().map(|(ty, name)| format!("{} {}", ty, name)).collect();
            w.braced(
                &format!("{} {}({})", function.ret, function.name, params.join(", ")),
                "",
                |w| w.statements(&function.body),
            );
        }
        w.finish()
    }
}

impl PrettyPrint for CppUnit {
    fn pretty_print(&self) -> String {
        let mut output = String::new();
        for class in &self.classes {
            output.push_str(&class.pretty_print());
            output.push('\n');
        }
        for array in &self.arrays {
            output.push_str(&format!(
                "; array {} of {}, parent {}\n",
                array.java_name, array.element, array.parent
            ));
        }
        if let Some(main) = &self.main {
            output.push_str(&format!("; main -> {}\n", main.function));
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jxx_parser::parse_compilation_unit;

    #[test]
    fn test_ast_round_trips_structure() {
        let unit = parse_compilation_unit(
            "package p; class A extends B { int x = 1 + 2; int get() { return x; } }",
        )
        .unwrap();
        let text = unit.pretty_print();
        assert!(text.starts_with("package p;\n"));
        assert!(text.contains("class A extends B {"));
        assert!(text.contains("  int x = (1 + 2);"));
        assert!(text.contains("  int get() {\n    return x;\n  }"));
    }

    #[test]
    fn test_else_and_loops() {
        let unit = parse_compilation_unit(
            "class A { void f(int n) { if (n > 0) n--; else { n++; } for (int i = 0; i < n; i++) ; } }",
        )
        .unwrap();
        let text = unit.pretty_print();
        assert!(text.contains("if ((n > 0))\n      (n--);\n    else {\n      (n++);\n    }"));
        assert!(text.contains("for (int i = 0; (i < n); (i++))"));
    }
}
