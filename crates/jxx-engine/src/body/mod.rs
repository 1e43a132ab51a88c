//! Body rewriting
//!
//! Turns the stored syntax of every method, constructor and field
//! initializer into the typed IR of [`ir`]. Runs after the class table is
//! complete, so every name in a body can be classified and every call bound
//! to a method slot.

pub mod ir;
pub mod rewrite;
pub mod scope;

pub use ir::{Chain, ChainKind, TypedBlock, TypedExpr, TypedLocal, TypedStmt};
pub use rewrite::{BodyMode, BodyRewriter};

use crate::error::{CompileError, CompileResult, FileId};
use crate::model::{predefined, BodyId, ClassId, Param};
use crate::resolve::{Caller, NameGen, Resolver};
use crate::table::{BodyKind, ClassTable};
use jxx_parser::ast::{Block, Statement};
use jxx_parser::Span;
use tracing::debug;

/// A rewritten method
#[derive(Debug, Clone, PartialEq)]
pub struct TypedFunction {
    /// Parameters with their C++ names
    pub params: Vec<TypedLocal>,
    /// Body
    pub body: TypedBlock,
    /// Temporaries already handed out
    pub names: NameGen,
}

/// A rewritten constructor
#[derive(Debug, Clone, PartialEq)]
pub struct TypedConstructor {
    /// Position in the class's constructor list
    pub index: usize,
    /// Parameters with their C++ names
    pub params: Vec<TypedLocal>,
    /// Explicit or implicit chained constructor; `None` when it is `Object`'s
    pub chain: Option<Chain>,
    /// Body after the chained call
    pub body: TypedBlock,
    /// Temporaries already handed out
    pub names: NameGen,
}

impl TypedConstructor {
    /// True when the constructor starts with `this(...)`; field
    /// initializers then run in the delegate instead.
    pub fn delegates(&self) -> bool {
        self.chain.as_ref().is_some_and(|c| c.kind == ChainKind::This)
    }
}

/// A field initializer
#[derive(Debug, Clone, PartialEq)]
pub struct TypedFieldInit {
    /// C++ member name
    pub name: String,
    /// Static field
    pub is_static: bool,
    /// Initial value
    pub value: TypedExpr,
}

/// Every rewritten body of one class
#[derive(Debug, Clone, PartialEq)]
pub struct ClassBodies {
    /// The class
    pub class: ClassId,
    /// Own methods with bodies, keyed by method slot
    pub methods: Vec<(usize, TypedFunction)>,
    /// All constructors, implicit ones included
    pub constructors: Vec<TypedConstructor>,
    /// Own field initializers in declaration order
    pub fields: Vec<TypedFieldInit>,
}

/// Rewrite the bodies of every user class, parents first.
pub fn rewrite_bodies(table: &ClassTable, access_checks: bool) -> CompileResult<Vec<ClassBodies>> {
    let resolver = Resolver::new(table, access_checks);
    let mut out = Vec::new();
    for id in table.parent_first_order() {
        let klass = table.get(id);
        let Some(file) = klass.file else { continue };
        if klass.predefined {
            continue;
        }
        let bodies = rewrite_class(resolver, Caller { class: id, file })?;
        debug!(
            target: "jxx::body",
            class = %klass.name,
            methods = bodies.methods.len(),
            constructors = bodies.constructors.len(),
            fields = bodies.fields.len(),
            "rewrote class bodies"
        );
        out.push(bodies);
    }
    Ok(out)
}

fn rewrite_class(resolver: Resolver<'_>, caller: Caller) -> CompileResult<ClassBodies> {
    let table = resolver.table();
    let klass = table.get(caller.class);

    let mut methods = Vec::new();
    for (index, method) in klass.own_methods() {
        let Some(body) = method.body else { continue };
        let mode = BodyMode::method(method.is_static, method.return_type.clone());
        let mut rewriter = BodyRewriter::new(resolver, caller_for(table, body, caller), mode);
        let params = declare_params(&mut rewriter, &method.params);
        let body = rewriter.block(block_of(table, body, caller.file, method.span)?)?;
        methods.push((
            index,
            TypedFunction {
                params,
                body,
                names: rewriter.finish(),
            },
        ));
    }

    let constructors = (0..klass.constructors.len())
        .map(|index| rewrite_constructor(resolver, caller, index))
        .collect::<CompileResult<Vec<_>>>()?;
    check_delegation(table, caller, &constructors)?;

    let mut fields = Vec::new();
    for field in klass.fields.iter().filter(|f| f.implementor == caller.class) {
        let Some(init) = field.initializer else { continue };
        let BodyKind::Expression(expr) = &table.body(init).kind else {
            continue;
        };
        let mode = BodyMode::method(field.is_static, jxx_types::Type::void());
        let mut rewriter = BodyRewriter::new(resolver, caller_for(table, init, caller), mode);
        let value = rewriter.initializer(expr, &field.ty)?;
        fields.push(TypedFieldInit {
            name: field.cpp_name.clone(),
            is_static: field.is_static,
            value,
        });
    }

    Ok(ClassBodies {
        class: caller.class,
        methods,
        constructors,
        fields,
    })
}

fn rewrite_constructor(resolver: Resolver<'_>, caller: Caller, index: usize) -> CompileResult<TypedConstructor> {
    let table = resolver.table();
    let constructor = &table.get(caller.class).constructors[index];
    let mut rewriter = BodyRewriter::new(resolver, caller, BodyMode::constructor());
    let params = declare_params(&mut rewriter, &constructor.params);

    let (statements, span) = match constructor.body {
        Some(body) => {
            let block = block_of(table, body, caller.file, constructor.span)?;
            (block.statements.as_slice(), block.span)
        }
        None => (&[][..], constructor.span),
    };

    let (chain, rest) = match statements.split_first() {
        Some((Statement::ConstructorCall(call), rest)) => (rewriter.constructor_call(call, index)?, rest),
        _ => (implicit_super(resolver, caller, constructor.span)?, statements),
    };

    let body = rewriter.block(&Block {
        statements: rest.to_vec(),
        span,
    })?;
    Ok(TypedConstructor {
        index,
        params,
        chain,
        body,
        names: rewriter.finish(),
    })
}

/// Reject `this(...)` chains that lead back to a constructor already on
/// the chain.
fn check_delegation(table: &ClassTable, caller: Caller, constructors: &[TypedConstructor]) -> CompileResult<()> {
    let delegate = |index: usize| {
        constructors[index]
            .chain
            .as_ref()
            .filter(|chain| chain.kind == ChainKind::This)
            .map(|chain| chain.index)
    };

    let mut finished = vec![false; constructors.len()];
    for start in 0..constructors.len() {
        let mut path = Vec::new();
        let mut current = Some(start);
        while let Some(index) = current {
            if finished[index] {
                break;
            }
            if path.contains(&index) {
                return Err(CompileError::Misplaced {
                    what: "A recursive constructor invocation".to_string(),
                    file: caller.file,
                    span: table.get(caller.class).constructors[index].span,
                });
            }
            path.push(index);
            current = delegate(index);
        }
        for index in path {
            finished[index] = true;
        }
    }
    Ok(())
}

fn implicit_super(resolver: Resolver<'_>, caller: Caller, span: Span) -> CompileResult<Option<Chain>> {
    let parent = match resolver.table().superclass(caller.class) {
        Some(parent) if parent != predefined::OBJECT => parent,
        _ => return Ok(None),
    };
    let index = resolver.resolve_constructor(caller, parent, &[], span)?;
    Ok(Some(Chain {
        kind: ChainKind::Super,
        class: parent,
        index,
        args: Vec::new(),
    }))
}

fn declare_params(rewriter: &mut BodyRewriter<'_>, params: &[Param]) -> Vec<TypedLocal> {
    params
        .iter()
        .map(|p| TypedLocal {
            name: rewriter.declare(&p.name, p.ty.clone()),
            ty: p.ty.clone(),
            init: None,
        })
        .collect()
}

fn caller_for(table: &ClassTable, body: BodyId, caller: Caller) -> Caller {
    Caller {
        file: table.body(body).file,
        ..caller
    }
}

fn block_of(table: &ClassTable, body: BodyId, file: FileId, span: Span) -> CompileResult<&Block> {
    match &table.body(body).kind {
        BodyKind::Block(block) => Ok(block),
        BodyKind::Expression(_) => Err(CompileError::Misplaced {
            what: "An expression where a block body was expected".to_string(),
            file,
            span,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::ir::{Dispatch, ExprKind};
    use super::*;
    use crate::analyzer::{Analyzer, SourceUnit};
    use jxx_parser::parse_compilation_unit;
    use jxx_types::{QualifiedType, Type};

    fn analyze(source: &str) -> ClassTable {
        let ast = parse_compilation_unit(source).unwrap();
        let mut analyzer = Analyzer::new();
        analyzer.analyze(&[SourceUnit { file: 0, ast: &ast }]).unwrap();
        analyzer.finish().unwrap()
    }

    fn rewrite(source: &str) -> CompileResult<Vec<ClassBodies>> {
        let table = analyze(source);
        rewrite_bodies(&table, true)
    }

    fn code(source: &str) -> &'static str {
        rewrite(source).unwrap_err().code()
    }

    fn id(table: &ClassTable, name: &str) -> ClassId {
        table.lookup(&QualifiedType::parse(name).unwrap()).unwrap()
    }

    fn first_method(bodies: &[ClassBodies], class: ClassId) -> &TypedFunction {
        let class = bodies.iter().find(|b| b.class == class).unwrap();
        &class.methods[0].1
    }

    fn returned(function: &TypedFunction) -> &TypedExpr {
        match function.body.statements.last() {
            Some(TypedStmt::Return(Some(value))) => value,
            other => panic!("expected a return, got {:?}", other),
        }
    }

    #[test]
    fn test_overload_binds_to_exact_slot() {
        let source = "class A { int add(int a, int b) { return a + b; } \
                      double add(double a, double b) { return a + b; } \
                      int run() { return add(1, 2); } }";
        let table = analyze(source);
        let bodies = rewrite_bodies(&table, true).unwrap();
        let a = id(&table, "A");
        let run = bodies[0].methods.iter().find(|(i, _)| table.get(a).methods[*i].name == "run").unwrap();
        let call = returned(&run.1);
        match &call.kind {
            ExprKind::Call {
                dispatch, class, index, ..
            } => {
                assert_eq!(*dispatch, Dispatch::Virtual);
                assert_eq!(table.get(*class).methods[*index].params[0].ty, Type::int());
            }
            other => panic!("expected a call, got {:?}", other),
        }
        assert_eq!(call.ty, Type::int());
    }

    #[test]
    fn test_names_prefer_locals_over_fields() {
        let source = "class A { int x; int f() { int x = 2; return x; } int g() { return x; } }";
        let table = analyze(source);
        let bodies = rewrite_bodies(&table, true).unwrap();
        let methods = &bodies[0].methods;
        assert_eq!(returned(&methods[0].1).kind, ExprKind::Local("x".to_string()));
        assert!(matches!(returned(&methods[1].1).kind, ExprKind::Field { .. }));
    }

    #[test]
    fn test_static_field_through_class_name() {
        let source = "class A { static int count; } class B { int f() { return A.count; } }";
        let table = analyze(source);
        let bodies = rewrite_bodies(&table, true).unwrap();
        let value = returned(first_method(&bodies, id(&table, "B")));
        assert_eq!(
            value.kind,
            ExprKind::StaticField {
                class: id(&table, "A"),
                name: "count".to_string()
            }
        );
    }

    #[test]
    fn test_string_concatenation_is_flattened() {
        let source = "class A { String f(int i) { return \"a\" + i + \"b\" + 1.5; } }";
        let bodies = rewrite(source).unwrap();
        match &returned(&bodies[0].methods[0].1).kind {
            ExprKind::Concat(parts) => assert_eq!(parts.len(), 4),
            other => panic!("expected a concatenation, got {:?}", other),
        }
    }

    #[test]
    fn test_print_statement() {
        let bodies = rewrite("class A { void f() { System.out.println(\"hi\"); System.out.print(1); } }").unwrap();
        let statements = &bodies[0].methods[0].1.body.statements;
        assert!(matches!(statements[0], TypedStmt::Print { newline: true, arg: Some(_) }));
        assert!(matches!(statements[1], TypedStmt::Print { newline: false, arg: Some(_) }));
    }

    #[test]
    fn test_constructor_chains() {
        let source = "class A { int v; A(int v) { this.v = v; } A() { this(1); } } \
                      class B extends A { B() { super(2); } } \
                      class C extends A { }";
        let table = analyze(source);
        let bodies = rewrite_bodies(&table, true).unwrap();
        let (a, b) = (id(&table, "A"), id(&table, "B"));

        let a_bodies = bodies.iter().find(|c| c.class == a).unwrap();
        assert!(a_bodies.constructors[0].chain.is_none());
        assert!(a_bodies.constructors[1].delegates());

        let b_bodies = bodies.iter().find(|c| c.class == b).unwrap();
        let chain = b_bodies.constructors[0].chain.as_ref().unwrap();
        assert_eq!((chain.kind, chain.class, chain.index), (ChainKind::Super, a, 0));

        let c_bodies = bodies.iter().find(|c| c.class == id(&table, "C")).unwrap();
        let implicit = c_bodies.constructors[0].chain.as_ref().unwrap();
        assert_eq!(implicit.index, 1);
    }

    #[test]
    fn test_field_initializers() {
        let source = "class A { int a = 1; static String s = \"x\"; int b; }";
        let bodies = rewrite(source).unwrap();
        let fields = &bodies[0].fields;
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].name, "a");
        assert!(fields[1].is_static);
    }

    #[test]
    fn test_foreach_uses_fresh_temporaries() {
        let bodies = rewrite("class A { int f(int[] xs) { int s = 0; for (int x : xs) s += x; return s; } }").unwrap();
        match &bodies[0].methods[0].1.body.statements[1] {
            TypedStmt::ForEach {
                array_temp, index_temp, ..
            } => {
                assert_eq!(array_temp, "__tmp0");
                assert_eq!(index_temp, "__tmp1");
            }
            other => panic!("expected a foreach, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_literal_extremes() {
        let bodies = rewrite("class A { int f() { return -2147483648; } long g() { return -9223372036854775808L; } }").unwrap();
        let f = returned(&bodies[0].methods[0].1);
        assert_eq!(f.kind, ExprKind::Literal(jxx_parser::ast::LiteralValue::Int(-2147483648)));
        let g = returned(&bodies[0].methods[1].1);
        assert_eq!(g.kind, ExprKind::Literal(jxx_parser::ast::LiteralValue::Long(i64::MIN as i128)));
    }

    #[test]
    fn test_hex_literal_extremes() {
        let bodies = rewrite(
            "class A { int f() { return -0x80000000; } long g() { return 0x8000000000000000L; } int h() { return -0xFFFFFFFF; } }",
        )
        .unwrap();
        let f = returned(&bodies[0].methods[0].1);
        assert_eq!(f.kind, ExprKind::Literal(jxx_parser::ast::LiteralValue::Int(-2147483648)));
        assert_eq!(f.ty, Type::int());
        let g = returned(&bodies[0].methods[1].1);
        assert_eq!(g.kind, ExprKind::Literal(jxx_parser::ast::LiteralValue::Long(i64::MIN as i128)));
        let h = returned(&bodies[0].methods[2].1);
        assert_eq!(h.kind, ExprKind::Literal(jxx_parser::ast::LiteralValue::Int(1)));
    }

    #[test]
    fn test_decimal_literal_past_max_needs_minus() {
        assert_eq!(code("class A { int f() { return 2147483648; } }"), "E2007");
        assert_eq!(code("class A { long f() { return 9223372036854775808L; } }"), "E2007");
    }

    #[test]
    fn test_byte_constant_narrowing() {
        assert!(rewrite("class A { void f() { byte b = 10; char c = 65; } }").is_ok());
        assert_eq!(code("class A { void f() { byte b = 300; } }"), "E2007");
    }

    #[test]
    fn test_semantic_error_codes() {
        let cases = [
            ("class A { void f() { int x = \"s\"; } }", "E2007"),
            ("class A { void f() { y = 1; } }", "E1004"),
            ("class A { int x; static int f() { return x; } }", "E2005"),
            ("class A { void f() { this.g(); } }", "E2001"),
            ("class A { void f() { break; } }", "E2008"),
            ("class A { void f() { if (1) {} } }", "E2007"),
            ("class A { int f() { return; } }", "E2007"),
            ("abstract class A { void f() { new A(); } }", "E2008"),
            ("class A { A() { this(); } }", "E2008"),
            ("class A { void f(String s) { switch (s) { default: } } }", "E2009"),
            ("class A { void f(int i) { switch (i) { case 1: case 1: } } }", "E2008"),
        ];
        for (source, expected) in cases {
            assert_eq!(code(source), expected, "{}", source);
        }
    }

    #[test]
    fn test_constructor_delegation_cycles() {
        assert_eq!(code("class A { A() { this(1); } A(int x) { this(); } }"), "E2008");
        assert_eq!(
            code("class A { A() { this(1); } A(int x) { this(x, x); } A(int x, int y) { this(); } }"),
            "E2008"
        );
        let bodies = rewrite("class A { A() { this(1); } A(int x) { this(x, x); } A(int x, int y) { } }").unwrap();
        let delegating: Vec<bool> = bodies[0].constructors.iter().map(|c| c.delegates()).collect();
        assert_eq!(delegating, [true, true, false]);
    }

    #[test]
    fn test_abstract_super_call_rejected() {
        let source = "abstract class A { abstract void f(); } class B extends A { void f() { super.f(); } }";
        assert_eq!(code(source), "E2008");
    }
}
