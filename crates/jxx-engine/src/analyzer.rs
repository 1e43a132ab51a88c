//! Class table construction
//!
//! Walks parsed compilation units and fills the [`ClassTable`]. Each call to
//! [`Analyzer::analyze`] handles one batch of units in three steps:
//!
//! 1. declare every class of every unit, nested classes included
//! 2. attach parents; a parent that is not declared yet leaves the class
//!    under `java.lang.Object` and is retried by later batches
//! 3. build members class by class, parents first, and re-seed the
//!    subclasses of each finished class
//!
//! [`Analyzer::finish`] closes the table once every batch has been added.

use crate::error::{CompileError, CompileResult, FileId};
use crate::model::{predefined, ClassId, Field, Member, Method, Param, Scope, Visibility};
use crate::table::{BodyKind, ClassTable};
use jxx_parser::ast::{
    ClassDecl, CompilationUnit, ConstructorDecl, FieldDecl, MemberDecl, MethodDecl, Parameter,
    TypeExprKind,
};
use jxx_parser::Span;
use jxx_types::{QualifiedType, Type};
use rustc_hash::FxHashMap;
use tracing::{debug, info};

/// A parsed unit and the file it came from
#[derive(Debug, Clone, Copy)]
pub struct SourceUnit<'a> {
    /// File handle
    pub file: FileId,
    /// Syntax tree
    pub ast: &'a CompilationUnit,
}

/// The member currently being built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberContext<'a> {
    /// A field declarator
    Field(&'a str),
    /// A method
    Method(&'a str),
    /// A constructor
    Constructor,
}

/// Where the analyzer is while walking a unit
#[derive(Debug, Clone, Copy)]
pub struct AnalysisContext<'a> {
    /// File of the unit
    pub file: FileId,
    /// Names visible in the unit
    pub scope: &'a Scope,
    /// Class being populated
    pub class: Option<ClassId>,
    /// Member being built
    pub member: Option<MemberContext<'a>>,
}

impl<'a> AnalysisContext<'a> {
    /// Context at the top of a unit.
    pub fn new(file: FileId, scope: &'a Scope) -> Self {
        Self {
            file,
            scope,
            class: None,
            member: None,
        }
    }

    /// Enter a class.
    pub fn in_class(self, class: ClassId) -> Self {
        Self {
            class: Some(class),
            member: None,
            ..self
        }
    }

    /// Enter a member of the current class.
    pub fn in_member(self, member: MemberContext<'a>) -> Self {
        Self {
            member: Some(member),
            ..self
        }
    }

    /// The current class, or `MemberOutsideClass` for the member being built.
    pub fn owner(&self, span: Span) -> CompileResult<ClassId> {
        self.class.ok_or_else(|| CompileError::MemberOutsideClass {
            name: match self.member {
                Some(MemberContext::Field(name)) | Some(MemberContext::Method(name)) => name.to_string(),
                Some(MemberContext::Constructor) => "<init>".to_string(),
                None => String::new(),
            },
            file: self.file,
            span,
        })
    }
}

#[derive(Debug, Clone)]
struct PendingParent {
    child: ClassId,
    parent: Vec<String>,
    file: FileId,
    span: Span,
}

/// Builds the class table batch by batch
#[derive(Debug, Default)]
pub struct Analyzer {
    table: ClassTable,
    pending: Vec<PendingParent>,
}

impl Analyzer {
    /// Create an analyzer over a table holding only the predefined classes.
    pub fn new() -> Self {
        Self::default()
    }

    /// The table built so far.
    pub fn table(&self) -> &ClassTable {
        &self.table
    }

    /// Add the classes of a batch of units.
    ///
    /// Returns the handles of the classes the batch declared.
    pub fn analyze(&mut self, units: &[SourceUnit<'_>]) -> CompileResult<Vec<ClassId>> {
        let scopes: Vec<Scope> = units.iter().map(|u| Scope::from_unit(u.ast)).collect();

        let mut declared = Vec::new();
        for (unit, scope) in units.iter().zip(&scopes) {
            let ctx = AnalysisContext::new(unit.file, scope);
            for class in &unit.ast.classes {
                self.declare_class(ctx, class, None, &mut declared)?;
            }
        }

        self.retry_pending()?;
        for (ctx, decl) in &declared {
            self.attach_parent(*ctx, decl)?;
        }

        let batch: FxHashMap<ClassId, (AnalysisContext<'_>, &ClassDecl)> = declared
            .iter()
            .filter_map(|(ctx, decl)| ctx.class.map(|id| (id, (*ctx, *decl))))
            .collect();
        for id in self.table.parent_first_order() {
            if let Some((ctx, decl)) = batch.get(&id) {
                self.populate(*ctx, decl)?;
                self.table.reseed_descendants(id)?;
            }
        }

        info!(
            target: "jxx::analyzer",
            units = units.len(),
            classes = declared.len(),
            pending = self.pending.len(),
            "analyzed batch"
        );
        Ok(declared.iter().filter_map(|(ctx, _)| ctx.class).collect())
    }

    /// Close the table.
    ///
    /// Fails on a parent that no batch declared and on concrete classes with
    /// unimplemented abstract methods.
    pub fn finish(mut self) -> CompileResult<ClassTable> {
        if let Some(pending) = self.pending.first() {
            return Err(CompileError::UnresolvedParent {
                class: self.table.get(pending.child).name.dotted_name(),
                parent: pending.parent.join("."),
                file: pending.file,
                span: pending.span,
            });
        }

        for klass in self.table.iter().filter(|k| !k.predefined && !k.is_abstract) {
            if let Some(method) = klass.abstract_methods().next() {
                return Err(CompileError::AbstractNotImplemented {
                    class: klass.name.dotted_name(),
                    method: method.signature(),
                    file: klass.file.unwrap_or_default(),
                    span: klass.span,
                });
            }
        }

        self.table.assign_field_names();
        info!(target: "jxx::analyzer", classes = self.table.len(), "class table complete");
        Ok(self.table)
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    fn declare_class<'a>(
        &mut self,
        ctx: AnalysisContext<'a>,
        decl: &'a ClassDecl,
        enclosing: Option<ClassId>,
        declared: &mut Vec<(AnalysisContext<'a>, &'a ClassDecl)>,
    ) -> CompileResult<()> {
        let mut segments = ctx.scope.package.clone();
        segments.push(decl.name.name.clone());
        let duplicate = || CompileError::DuplicateClass {
            name: segments.join("."),
            file: ctx.file,
            span: decl.name.span,
        };
        let name = QualifiedType::new(segments.clone()).map_err(|_| duplicate())?;
        if name.is_predefined() {
            return Err(duplicate());
        }

        let id = self.table.declare(name, ctx.scope.clone(), ctx.file, decl.span)?;
        let klass = self.table.get_mut(id);
        klass.is_abstract = decl.modifiers.is_abstract;
        klass.visibility = Visibility::from(decl.modifiers.access);
        klass.enclosing = enclosing;

        let ctx = ctx.in_class(id);
        declared.push((ctx, decl));
        for member in &decl.members {
            if let MemberDecl::Class(nested) = member {
                self.declare_class(ctx, nested, Some(id), declared)?;
            }
        }
        Ok(())
    }

    fn attach_parent(&mut self, ctx: AnalysisContext<'_>, decl: &ClassDecl) -> CompileResult<()> {
        let Some(extends) = &decl.extends else {
            return Ok(());
        };
        let child = ctx.owner(decl.span)?;
        let segments = match &extends.kind {
            TypeExprKind::Named(name) => name.names(),
            TypeExprKind::Primitive(p) => {
                return Err(CompileError::UnknownType {
                    name: p.java_name().to_string(),
                    file: ctx.file,
                    span: extends.span,
                })
            }
        };

        let refs: Vec<&str> = segments.iter().map(String::as_str).collect();
        match self.table.resolve_path(ctx.scope, &refs) {
            Some(parent) => self.link(child, parent, ctx.file, extends.span),
            None => {
                debug!(
                    target: "jxx::analyzer",
                    class = %self.table.get(child).name,
                    parent = %segments.join("."),
                    "parent not declared yet"
                );
                self.pending.push(PendingParent {
                    child,
                    parent: segments,
                    file: ctx.file,
                    span: extends.span,
                });
                Ok(())
            }
        }
    }

    fn link(&mut self, child: ClassId, parent: ClassId, file: FileId, span: Span) -> CompileResult<()> {
        if parent != predefined::OBJECT && self.table.get(parent).predefined {
            return Err(CompileError::Unsupported {
                feature: "subclasses of runtime classes".to_string(),
                file,
                span,
            });
        }
        self.table.set_parent(child, parent, span)
    }

    fn retry_pending(&mut self) -> CompileResult<()> {
        let pending = std::mem::take(&mut self.pending);
        for entry in pending {
            let scope = self.table.get(entry.child).scope.clone();
            let refs: Vec<&str> = entry.parent.iter().map(String::as_str).collect();
            match self.table.resolve_path(&scope, &refs) {
                Some(parent) => self.link(entry.child, parent, entry.file, entry.span)?,
                None => self.pending.push(entry),
            }
        }
        Ok(())
    }

    // ========================================================================
    // Members
    // ========================================================================

    fn populate(&mut self, ctx: AnalysisContext<'_>, decl: &ClassDecl) -> CompileResult<()> {
        let class = ctx.owner(decl.span)?;
        for member in &decl.members {
            match member {
                MemberDecl::Field(field) => self.add_fields(ctx, field)?,
                MemberDecl::Method(method) => self.add_method(ctx, method)?,
                MemberDecl::Constructor(ctor) => self.add_constructor(ctx, ctor)?,
                MemberDecl::Class(_) => {}
            }
        }

        let klass = self.table.get_mut(class);
        if klass.constructors.is_empty() {
            let mut implicit = klass.new_constructor(Vec::new());
            implicit.visibility = klass.visibility;
            klass.add_constructor(implicit)?;
        }
        Ok(())
    }

    fn resolve(&self, ctx: AnalysisContext<'_>, ty: &jxx_parser::ast::TypeExpr) -> CompileResult<Type> {
        self.table.resolve_type(ctx.scope, ctx.file, ty)
    }

    fn params(&self, ctx: AnalysisContext<'_>, params: &[Parameter]) -> CompileResult<Vec<Param>> {
        params
            .iter()
            .map(|p| Ok(Param::new(p.name.name.clone(), self.resolve(ctx, &p.ty)?)))
            .collect()
    }

    fn add_fields(&mut self, ctx: AnalysisContext<'_>, decl: &FieldDecl) -> CompileResult<()> {
        for declarator in &decl.declarators {
            let ctx = ctx.in_member(MemberContext::Field(&declarator.name.name));
            let class = ctx.owner(declarator.span)?;
            let ty = self.resolve(ctx, &decl.ty)?.array_of(declarator.dimensions);
            let initializer = declarator
                .initializer
                .as_ref()
                .map(|init| self.table.store_body(ctx.file, BodyKind::Expression(init.clone())));

            let field = Field {
                is_static: decl.modifiers.is_static,
                visibility: Visibility::from(decl.modifiers.access),
                initializer,
                span: declarator.span,
                ..self.table.get(class).new_field(declarator.name.name.clone(), ty)
            };
            let result = self.table.get_mut(class).incorporate_field(field)?;
            debug!(
                target: "jxx::analyzer",
                class = %self.table.get(class).name,
                field = %declarator.name.name,
                ?result,
                "incorporated field"
            );
        }
        Ok(())
    }

    fn add_method(&mut self, ctx: AnalysisContext<'_>, decl: &MethodDecl) -> CompileResult<()> {
        let ctx = ctx.in_member(MemberContext::Method(&decl.name.name));
        let class = ctx.owner(decl.span)?;
        let misplaced = |what: &str| CompileError::Misplaced {
            what: what.to_string(),
            file: ctx.file,
            span: decl.name.span,
        };

        let modifiers = &decl.modifiers;
        match (&decl.body, modifiers.is_abstract) {
            (Some(_), true) => return Err(misplaced("A body on an abstract method")),
            (None, false) => {
                return Err(CompileError::Unsupported {
                    feature: "methods without a body".to_string(),
                    file: ctx.file,
                    span: decl.name.span,
                })
            }
            _ => {}
        }
        if modifiers.is_abstract && modifiers.is_static {
            return Err(misplaced("An abstract static method"));
        }

        let params = self.params(ctx, &decl.params)?;
        let return_type = self.resolve(ctx, &decl.return_type)?;
        let body = decl
            .body
            .as_ref()
            .map(|block| self.table.store_body(ctx.file, BodyKind::Block(block.clone())));

        let method = Method {
            is_static: modifiers.is_static,
            is_abstract: modifiers.is_abstract,
            visibility: Visibility::from(modifiers.access),
            body,
            span: decl.span,
            ..self
                .table
                .get(class)
                .new_method(decl.name.name.clone(), params, return_type)
        };
        let result = self.table.get_mut(class).incorporate_method(method)?;
        debug!(
            target: "jxx::analyzer",
            class = %self.table.get(class).name,
            method = %decl.name.name,
            ?result,
            "incorporated method"
        );
        Ok(())
    }

    fn add_constructor(&mut self, ctx: AnalysisContext<'_>, decl: &ConstructorDecl) -> CompileResult<()> {
        let ctx = ctx.in_member(MemberContext::Constructor);
        let class = ctx.owner(decl.span)?;
        if decl.name.name != self.table.get(class).simple_name() {
            return Err(CompileError::Unsupported {
                feature: "methods without a return type".to_string(),
                file: ctx.file,
                span: decl.name.span,
            });
        }

        let params = self.params(ctx, &decl.params)?;
        let body = self
            .table
            .store_body(ctx.file, BodyKind::Block(decl.body.clone()));
        let mut ctor = self.table.get(class).new_constructor(params);
        ctor.visibility = Visibility::from(decl.modifiers.access);
        ctor.body = Some(body);
        ctor.span = decl.span;
        self.table.get_mut(class).add_constructor(ctor)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jxx_parser::parse_compilation_unit;

    fn analyze(sources: &[&str]) -> CompileResult<ClassTable> {
        let asts: Vec<CompilationUnit> = sources
            .iter()
            .map(|s| parse_compilation_unit(s).unwrap())
            .collect();
        let units: Vec<SourceUnit<'_>> = asts
            .iter()
            .enumerate()
            .map(|(file, ast)| SourceUnit { file, ast })
            .collect();
        let mut analyzer = Analyzer::new();
        analyzer.analyze(&units)?;
        analyzer.finish()
    }

    fn class<'t>(table: &'t ClassTable, name: &str) -> &'t crate::model::Klass {
        let id = table.lookup(&QualifiedType::parse(name).unwrap()).unwrap();
        table.get(id)
    }

    fn method_names(table: &ClassTable, name: &str) -> Vec<String> {
        class(table, name).methods.iter().map(|m| m.name.clone()).collect()
    }

    #[test]
    fn test_round_trip_scenario() {
        let table = analyze(&["class A { int x; void foo() {} } \
             class B extends A { void foo() {} void bar() {} }"])
        .unwrap();
        let a = class(&table, "A");
        let b = class(&table, "B");
        assert_eq!(a.methods.len(), 5);
        assert_eq!(b.methods.len(), a.methods.len() + 1);
        assert_eq!(b.methods[4].name, "foo");
        assert_eq!(b.methods[4].implementor, b.id);
        assert_eq!(b.methods[5].name, "bar");
        assert_eq!(b.methods[5].implementor, b.id);
    }

    #[test]
    fn test_concrete_scenario() {
        let table = analyze(&["class A { int baz; void foo() {} void bar() {} } \
             class B extends A { void foo() {} public String toString() { return null; } } \
             class C extends B { int baz; public String toString() { return null; } void qux() {} }"])
        .unwrap();
        let object = table.get(predefined::OBJECT);
        let c = class(&table, "C");
        assert_eq!(object.methods.len(), 4);
        assert_eq!(class(&table, "A").methods.len(), 6);
        assert_eq!(class(&table, "B").methods.len(), 6);
        assert_eq!(c.methods.len(), 7);
        assert_eq!(c.methods[3].name, "toString");
        assert_eq!(c.methods[3].implementor, c.id);
        assert_eq!(c.methods[6].name, "qux");
        assert_eq!(c.methods[6].implementor, c.id);
        assert_eq!(c.fields.len(), 2);
        assert_eq!(c.fields[1].cpp_name, "baz_C");
    }

    #[test]
    fn test_slot_stability_down_the_chain() {
        let table = analyze(&["class A { void m() {} void n() {} } \
             class B extends A { void m() {} } \
             class C extends B { void o() {} }"])
        .unwrap();
        let a = class(&table, "A");
        let b = class(&table, "B");
        let c = class(&table, "C");
        let pos = |k: &crate::model::Klass| k.methods.iter().position(|m| m.name == "m");
        assert_eq!(pos(a), pos(c));
        assert_eq!(c.methods[pos(c).unwrap()].implementor, b.id);
        for klass in [a, b, c] {
            assert_eq!(&method_names(&table, &klass.name.dotted_name())[..4], predefined::ROOT_METHODS);
        }
    }

    #[test]
    fn test_forward_reference_across_files() {
        let table = analyze(&[
            "package p; class B extends A { void bar() {} }",
            "package p; class A { void foo() {} }",
        ])
        .unwrap();
        let b = class(&table, "p.B");
        assert_eq!(b.parent, table.lookup(&QualifiedType::parse("p.A").unwrap()));
        assert_eq!(method_names(&table, "p.B")[4..], ["foo", "bar"]);
    }

    #[test]
    fn test_parent_declared_in_later_batch() {
        let first = parse_compilation_unit("class B extends A { void bar() {} }").unwrap();
        let second = parse_compilation_unit("class A { void foo() {} }").unwrap();
        let mut analyzer = Analyzer::new();
        analyzer.analyze(&[SourceUnit { file: 0, ast: &first }]).unwrap();
        assert_eq!(method_names(analyzer.table(), "B").len(), 5);
        analyzer.analyze(&[SourceUnit { file: 1, ast: &second }]).unwrap();
        let table = analyzer.finish().unwrap();
        assert_eq!(method_names(&table, "B")[4..], ["foo", "bar"]);
    }

    #[test]
    fn test_unresolved_parent_reported_at_finish() {
        let err = analyze(&["class B extends Missing {}"]).unwrap_err();
        assert!(matches!(err, CompileError::UnresolvedParent { ref parent, .. } if parent == "Missing"));
    }

    #[test]
    fn test_unknown_member_type() {
        let err = analyze(&["class A { Missing m; }"]).unwrap_err();
        assert!(matches!(err, CompileError::UnknownType { ref name, .. } if name == "Missing"));
    }

    #[test]
    fn test_structural_errors() {
        let cases: &[(&str, &str)] = &[
            ("class A {} class A {}", "E3001"),
            ("class A { void f() {} void f() {} }", "E3002"),
            ("class A { int x; int x; }", "E3002"),
            ("class A extends B {} class B extends A {}", "E3003"),
            ("class A { static String toString() { return null; } }", "E3005"),
            ("abstract class A { abstract void f(); } class B extends A {}", "E3006"),
            ("class A extends String {}", "E2009"),
        ];
        for (source, code) in cases {
            let err = analyze(&[source]).unwrap_err();
            assert_eq!(err.code(), *code, "{}: {}", source, err);
        }
    }

    #[test]
    fn test_implicit_constructor_and_nested_classes() {
        let table = analyze(&["package p; class Outer { static class Inner { Inner(int x) {} } }"]).unwrap();
        let outer = class(&table, "p.Outer");
        let inner = class(&table, "p.Inner");
        assert_eq!(outer.constructors.len(), 1);
        assert!(outer.constructors[0].is_implicit());
        assert_eq!(inner.enclosing, Some(outer.id));
        assert_eq!(inner.constructors[0].params.len(), 1);
    }

    #[test]
    fn test_context_requires_class() {
        let scope = Scope::default();
        let ctx = AnalysisContext::new(3, &scope).in_member(MemberContext::Field("x"));
        let err = ctx.owner(Span::default()).unwrap_err();
        assert!(matches!(err, CompileError::MemberOutsideClass { ref name, file: 3, .. } if name == "x"));
    }
}
