//! Call and member resolution
//!
//! Resolution runs in four steps, each exposed on its own so callers and tests
//! can observe them:
//!
//! 1. [`Resolver::match_context`] walks the selector chain to the class whose
//!    member list is searched
//! 2. [`Resolver::candidates`] collects every method of that class with the
//!    invoked name
//! 3. [`Resolver::filter`] keeps the candidates applicable to the argument
//!    types and accessible from the caller
//! 4. [`Resolver::choose`] picks the unique most specific candidate
//!
//! [`Resolver::rename`] then gives the C++ name every emitter uses for the
//! chosen slot.

use crate::error::{CompileError, CompileResult, FileId};
use crate::model::{ClassId, Member, Method, Visibility};
use crate::names;
use crate::table::ClassTable;
use jxx_parser::Span;
use jxx_types::{is_convertible, Type};
use tracing::trace;

/// One token of a receiver chain
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    /// `this`
    This,
    /// `super`
    Super,
    /// An unclassified identifier
    Name(String),
    /// A class already resolved by the body rewriter
    Class(ClassId),
    /// A receiver expression of known type
    Value(Type),
}

/// A call site ready for resolution
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    /// Receiver chain, empty for an unqualified call
    pub selectors: Vec<Selector>,
    /// Method name
    pub name: String,
    /// Argument types
    pub args: Vec<Type>,
    /// Location of the call
    pub span: Span,
}

/// How the searched class was reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Receiver {
    /// No selector; the caller's own class
    Implicit,
    /// `this.`
    This,
    /// `super.`
    Super,
    /// A class name, static access
    Class,
    /// An expression value
    Value,
}

/// Result of walking a selector chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchedContext {
    /// Class whose member list is searched
    pub class: ClassId,
    /// Last selector kind
    pub receiver: Receiver,
}

/// The class and file a lookup is made from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    /// Class containing the code
    pub class: ClassId,
    /// Source file of the code
    pub file: FileId,
}

/// A resolved method call
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMethod {
    /// Class whose list holds the chosen slot
    pub class: ClassId,
    /// Position of the slot in that list
    pub index: usize,
    /// How the class was reached
    pub receiver: Receiver,
    /// The chosen slot
    pub method: Method,
    /// C++ name of the slot in `class`
    pub cpp_name: String,
}

/// Resolves invocations against the class table
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'t> {
    table: &'t ClassTable,
    access_checks: bool,
}

impl<'t> Resolver<'t> {
    /// Create a resolver; `access_checks` enables the `private` filter.
    pub fn new(table: &'t ClassTable, access_checks: bool) -> Self {
        Self { table, access_checks }
    }

    /// The table being searched.
    pub fn table(&self) -> &'t ClassTable {
        self.table
    }

    /// Walk the selector chain from the caller's class.
    pub fn match_context(&self, caller: Caller, selectors: &[Selector], span: Span) -> CompileResult<MatchedContext> {
        let invalid = |reason: String| CompileError::InvalidSelector {
            reason,
            file: caller.file,
            span,
        };

        let mut ctx = MatchedContext {
            class: caller.class,
            receiver: Receiver::Implicit,
        };
        for selector in selectors {
            ctx = match selector {
                Selector::This => MatchedContext {
                    class: ctx.class,
                    receiver: Receiver::This,
                },
                Selector::Super => {
                    let parent = self
                        .table
                        .superclass(ctx.class)
                        .ok_or_else(|| invalid("java.lang.Object has no superclass".to_string()))?;
                    MatchedContext {
                        class: parent,
                        receiver: Receiver::Super,
                    }
                }
                Selector::Name(name) if name.starts_with(char::is_uppercase) => {
                    let scope = &self.table.get(caller.class).scope;
                    let class = self
                        .table
                        .resolve_simple(scope, name)
                        .ok_or_else(|| CompileError::UnknownType {
                            name: name.clone(),
                            file: caller.file,
                            span,
                        })?;
                    MatchedContext {
                        class,
                        receiver: Receiver::Class,
                    }
                }
                Selector::Name(name) => return Err(invalid(format!("'{}' is not a class name", name))),
                Selector::Class(class) => MatchedContext {
                    class: *class,
                    receiver: Receiver::Class,
                },
                Selector::Value(ty) if ty.is_array() => MatchedContext {
                    class: crate::model::predefined::OBJECT,
                    receiver: Receiver::Value,
                },
                Selector::Value(ty) => {
                    let class = self
                        .table
                        .class_of_type(ty)
                        .ok_or_else(|| invalid(format!("a value of type {} has no members", ty)))?;
                    MatchedContext {
                        class,
                        receiver: Receiver::Value,
                    }
                }
            };
        }
        Ok(ctx)
    }

    /// Every method of `class` named `name`, as list positions.
    pub fn candidates(&self, class: ClassId, name: &str) -> Vec<usize> {
        self.table
            .get(class)
            .methods_named(name)
            .map(|(index, _)| index)
            .collect()
    }

    /// Keep the candidates applicable to `args` and accessible to `caller`.
    pub fn filter(&self, caller: Caller, class: ClassId, candidates: &[usize], inv: &Invocation) -> CompileResult<Vec<usize>> {
        let klass = self.table.get(class);
        let applicable: Vec<usize> = candidates
            .iter()
            .copied()
            .filter(|&index| self.applicable(&klass.methods[index].param_types(), &inv.args))
            .collect();
        if applicable.is_empty() {
            return Err(CompileError::NoApplicableMethod {
                name: inv.name.clone(),
                class: klass.name.dotted_name(),
                args: argument_list(&inv.args),
                file: caller.file,
                span: inv.span,
            });
        }

        let accessible: Vec<usize> = applicable
            .iter()
            .copied()
            .filter(|&index| {
                let method = &klass.methods[index];
                self.accessible(caller, method.implementor, method.visibility)
            })
            .collect();
        if accessible.is_empty() {
            let method = &klass.methods[applicable[0]];
            return Err(CompileError::InaccessibleMember {
                name: method.signature(),
                class: self.table.get(method.implementor).name.dotted_name(),
                file: caller.file,
                span: inv.span,
            });
        }
        trace!(target: "jxx::resolve", name = %inv.name, ?candidates, ?accessible, "filtered candidates");
        Ok(accessible)
    }

    /// The unique candidate more specific than every other one.
    pub fn choose(&self, caller: Caller, class: ClassId, applicable: &[usize], inv: &Invocation) -> CompileResult<usize> {
        let klass = self.table.get(class);
        let params: Vec<Vec<Type>> = applicable
            .iter()
            .map(|&index| klass.methods[index].param_types())
            .collect();
        match self.most_specific(&params) {
            Ok(position) => Ok(applicable[position]),
            Err(maximal) => Err(CompileError::AmbiguousCall {
                name: inv.name.clone(),
                candidates: maximal
                    .into_iter()
                    .map(|position| klass.methods[applicable[position]].signature())
                    .collect(),
                file: caller.file,
                span: inv.span,
            }),
        }
    }

    /// C++ name of slot `index` of `class`.
    pub fn rename(&self, class: ClassId, index: usize) -> String {
        names::slot_name(self.table, class, index)
    }

    /// Resolve a method invocation end to end.
    pub fn resolve_method(&self, caller: Caller, inv: &Invocation) -> CompileResult<ResolvedMethod> {
        let ctx = self.match_context(caller, &inv.selectors, inv.span)?;
        let candidates = self.candidates(ctx.class, &inv.name);
        trace!(
            target: "jxx::resolve",
            class = %self.table.get(ctx.class).name,
            name = %inv.name,
            ?candidates,
            "collected candidates"
        );
        let applicable = self.filter(caller, ctx.class, &candidates, inv)?;
        let index = self.choose(caller, ctx.class, &applicable, inv)?;
        Ok(ResolvedMethod {
            class: ctx.class,
            index,
            receiver: ctx.receiver,
            method: self.table.get(ctx.class).methods[index].clone(),
            cpp_name: self.rename(ctx.class, index),
        })
    }

    /// Resolve `new class(args)` to a constructor position.
    pub fn resolve_constructor(&self, caller: Caller, class: ClassId, args: &[Type], span: Span) -> CompileResult<usize> {
        let klass = self.table.get(class);
        let no_match = || CompileError::NoApplicableConstructor {
            class: klass.name.dotted_name(),
            args: argument_list(args),
            file: caller.file,
            span,
        };

        let applicable: Vec<usize> = (0..klass.constructors.len())
            .filter(|&index| self.applicable(&klass.constructors[index].param_types(), args))
            .collect();
        if applicable.is_empty() {
            return Err(no_match());
        }
        let accessible: Vec<usize> = applicable
            .iter()
            .copied()
            .filter(|&index| self.accessible(caller, class, klass.constructors[index].visibility))
            .collect();
        if accessible.is_empty() {
            return Err(CompileError::InaccessibleMember {
                name: klass.constructors[applicable[0]].name.clone(),
                class: klass.name.dotted_name(),
                file: caller.file,
                span,
            });
        }

        let params: Vec<Vec<Type>> = accessible
            .iter()
            .map(|&index| klass.constructors[index].param_types())
            .collect();
        match self.most_specific(&params) {
            Ok(position) => Ok(accessible[position]),
            Err(maximal) => Err(CompileError::AmbiguousCall {
                name: klass.simple_name().to_string(),
                candidates: maximal
                    .into_iter()
                    .map(|position| format!("{}({})", klass.simple_name(), argument_list(&params[position])))
                    .collect(),
                file: caller.file,
                span,
            }),
        }
    }

    /// Look up a field of `class` by name, most derived first.
    pub fn resolve_field(&self, caller: Caller, class: ClassId, name: &str, span: Span) -> CompileResult<usize> {
        let klass = self.table.get(class);
        let (index, field) = klass.field(name).ok_or_else(|| CompileError::UnknownField {
            name: name.to_string(),
            class: klass.name.dotted_name(),
            file: caller.file,
            span,
        })?;
        if !self.accessible(caller, field.implementor, field.visibility) {
            return Err(CompileError::InaccessibleMember {
                name: name.to_string(),
                class: self.table.get(field.implementor).name.dotted_name(),
                file: caller.file,
                span,
            });
        }
        Ok(index)
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn applicable(&self, params: &[Type], args: &[Type]) -> bool {
        params.len() == args.len()
            && args
                .iter()
                .zip(params)
                .all(|(arg, param)| is_convertible(self.table, arg, param))
    }

    fn more_specific(&self, a: &[Type], b: &[Type]) -> bool {
        a.iter().zip(b).all(|(a, b)| is_convertible(self.table, a, b))
    }

    /// Position of the maximal parameter list, or every tied position.
    fn most_specific(&self, params: &[Vec<Type>]) -> Result<usize, Vec<usize>> {
        let maximal: Vec<usize> = (0..params.len())
            .filter(|&i| (0..params.len()).all(|j| i == j || self.more_specific(&params[i], &params[j])))
            .collect();
        match maximal.as_slice() {
            [only] => Ok(*only),
            [] => Err((0..params.len()).collect()),
            _ => Err(maximal),
        }
    }

    fn accessible(&self, caller: Caller, declaring: ClassId, visibility: Visibility) -> bool {
        !self.access_checks
            || visibility != Visibility::Private
            || self.table.outermost(caller.class) == self.table.outermost(declaring)
    }
}

fn argument_list(args: &[Type]) -> String {
    args.iter().map(Type::java_name).collect::<Vec<_>>().join(", ")
}

/// Fresh temporary names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameGen {
    next: u32,
}

impl NameGen {
    /// Create a generator starting at `__tmp0`.
    pub fn new() -> Self {
        Self::default()
    }

    /// A name not returned before by this generator.
    pub fn fresh(&mut self) -> String {
        let name = format!("__tmp{}", self.next);
        self.next += 1;
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{Analyzer, SourceUnit};
    use crate::model::predefined;
    use jxx_parser::parse_compilation_unit;
    use jxx_types::QualifiedType;

    fn table(source: &str) -> ClassTable {
        let ast = parse_compilation_unit(source).unwrap();
        let mut analyzer = Analyzer::new();
        analyzer.analyze(&[SourceUnit { file: 0, ast: &ast }]).unwrap();
        analyzer.finish().unwrap()
    }

    fn id(table: &ClassTable, name: &str) -> ClassId {
        table.lookup(&QualifiedType::parse(name).unwrap()).unwrap()
    }

    fn class_type(name: &str) -> Type {
        Type::qualified(QualifiedType::parse(name).unwrap())
    }

    fn call(name: &str, args: Vec<Type>) -> Invocation {
        Invocation {
            selectors: Vec::new(),
            name: name.to_string(),
            args,
            span: Span::default(),
        }
    }

    fn caller(table: &ClassTable, name: &str) -> Caller {
        Caller {
            class: id(table, name),
            file: 0,
        }
    }

    fn params_of(resolved: &ResolvedMethod) -> Vec<Type> {
        resolved.method.param_types()
    }

    #[test]
    fn test_overloads_resolve_to_int_int() {
        let table = table(
            "class M { \
               int add(int a, int b) { return 0; } \
               int add(String a, String b) { return 0; } \
               int add(int a, String b) { return 0; } \
               int add(String a, int b) { return 0; } }",
        );
        let resolver = Resolver::new(&table, true);
        let resolved = resolver
            .resolve_method(caller(&table, "M"), &call("add", vec![Type::int(), Type::int()]))
            .unwrap();
        assert_eq!(params_of(&resolved), vec![Type::int(), Type::int()]);
        assert_eq!(resolved.cpp_name, "add_int_int");
        assert_eq!(resolved.receiver, Receiver::Implicit);
    }

    #[test]
    fn test_more_specific_wins_in_any_order() {
        for source in [
            "class A {} class B extends A {} class M { void f(Object o) {} void f(A a) {} }",
            "class A {} class B extends A {} class M { void f(A a) {} void f(Object o) {} }",
        ] {
            let table = table(source);
            let resolver = Resolver::new(&table, true);
            let resolved = resolver
                .resolve_method(caller(&table, "M"), &call("f", vec![class_type("B")]))
                .unwrap();
            assert_eq!(params_of(&resolved), vec![class_type("A")], "{}", source);
        }
    }

    #[test]
    fn test_widening_and_null_arguments() {
        let table = table("class M { void g(long x) {} void g(double x) {} void h(String s) {} void h(Object o) {} }");
        let resolver = Resolver::new(&table, true);
        let m = caller(&table, "M");
        let resolved = resolver.resolve_method(m, &call("g", vec![Type::int()])).unwrap();
        assert_eq!(params_of(&resolved), vec![Type::primitive(jxx_types::PrimitiveType::Long)]);
        let resolved = resolver.resolve_method(m, &call("h", vec![Type::Null])).unwrap();
        assert_eq!(params_of(&resolved), vec![Type::string()]);
    }

    #[test]
    fn test_tie_is_ambiguous() {
        let table = table("class A {} class M { void f(A a, Object o) {} void f(Object o, A a) {} }");
        let resolver = Resolver::new(&table, true);
        let err = resolver
            .resolve_method(caller(&table, "M"), &call("f", vec![class_type("A"), class_type("A")]))
            .unwrap_err();
        match err {
            CompileError::AmbiguousCall { name, candidates, .. } => {
                assert_eq!(name, "f");
                assert_eq!(candidates.len(), 2);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_no_applicable_method() {
        let table = table("class M { void f(int x) {} }");
        let resolver = Resolver::new(&table, true);
        let m = caller(&table, "M");
        let err = resolver.resolve_method(m, &call("f", vec![Type::string()])).unwrap_err();
        assert_eq!(err.code(), "E2001");
        let err = resolver.resolve_method(m, &call("missing", vec![])).unwrap_err();
        assert!(matches!(err, CompileError::NoApplicableMethod { ref name, .. } if name == "missing"));
    }

    #[test]
    fn test_selector_chain() {
        let table = table("class A { void m() {} } class B extends A { void m() {} static void s() {} }");
        let resolver = Resolver::new(&table, true);
        let b = caller(&table, "B");

        let ctx = resolver.match_context(b, &[Selector::Super], Span::default()).unwrap();
        assert_eq!(ctx, MatchedContext { class: id(&table, "A"), receiver: Receiver::Super });

        let ctx = resolver
            .match_context(b, &[Selector::Name("A".to_string())], Span::default())
            .unwrap();
        assert_eq!(ctx.receiver, Receiver::Class);

        let ctx = resolver
            .match_context(b, &[Selector::Value(Type::int().array_of(1))], Span::default())
            .unwrap();
        assert_eq!(ctx.class, predefined::OBJECT);

        let err = resolver
            .match_context(b, &[Selector::Value(Type::int())], Span::default())
            .unwrap_err();
        assert_eq!(err.code(), "E2006");
        let err = resolver
            .match_context(b, &[Selector::Name("local".to_string())], Span::default())
            .unwrap_err();
        assert_eq!(err.code(), "E2006");
    }

    #[test]
    fn test_private_access() {
        let table = table(
            "class A { private void secret() {} private int hidden; static class In { } } \
             class B { }",
        );
        let checked = Resolver::new(&table, true);
        let unchecked = Resolver::new(&table, false);
        let mut inv = call("secret", vec![]);
        inv.selectors.push(Selector::Class(id(&table, "A")));

        let err = checked.resolve_method(caller(&table, "B"), &inv).unwrap_err();
        assert_eq!(err.code(), "E2004");
        assert!(unchecked.resolve_method(caller(&table, "B"), &inv).is_ok());
        assert!(checked.resolve_method(caller(&table, "In"), &inv).is_ok());

        let a = id(&table, "A");
        assert!(checked.resolve_field(caller(&table, "B"), a, "hidden", Span::default()).is_err());
        assert_eq!(checked.resolve_field(caller(&table, "A"), a, "hidden", Span::default()), Ok(0));
        let err = checked
            .resolve_field(caller(&table, "A"), a, "nothing", Span::default())
            .unwrap_err();
        assert_eq!(err.code(), "E1003");
    }

    #[test]
    fn test_constructor_resolution() {
        let table = table("class P { P(int x) {} P(long x) {} P(Object o) {} }");
        let resolver = Resolver::new(&table, true);
        let p = id(&table, "P");
        let c = caller(&table, "P");
        let index = resolver.resolve_constructor(c, p, &[Type::int()], Span::default()).unwrap();
        assert_eq!(table.get(p).constructors[index].param_types(), vec![Type::int()]);
        let err = resolver.resolve_constructor(c, p, &[], Span::default()).unwrap_err();
        assert_eq!(err.code(), "E2002");
        let err = resolver
            .resolve_constructor(c, predefined::STRING, &[], Span::default())
            .unwrap_err();
        assert_eq!(err.code(), "E2002");
    }

    #[test]
    fn test_rename_keeps_predefined_names() {
        let table = table("class A { public boolean equals(A other) { return true; } }");
        let resolver = Resolver::new(&table, true);
        let a = id(&table, "A");
        let klass = table.get(a);
        let inherited = klass.method_index("equals", &[Type::object()]).unwrap();
        let own = klass.method_index("equals", &[class_type("A")]).unwrap();
        assert_eq!(resolver.rename(a, inherited), "equals");
        assert_eq!(resolver.rename(a, own), "equals_A");
    }

    #[test]
    fn test_name_gen() {
        let mut names = NameGen::new();
        assert_eq!(names.fresh(), "__tmp0");
        assert_eq!(names.fresh(), "__tmp1");
    }
}
