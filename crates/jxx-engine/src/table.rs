//! Class table
//!
//! Owns the class arena, the flat name map, the inheritance tree and the
//! store of unanalyzed member bodies. Entries are never removed; a batch of
//! compilation units only adds classes and re-parents pending ones.

use crate::error::{CompileError, CompileResult, FileId};
use crate::inheritance::{InheritanceTree, NodeId};
use crate::model::{predefined, BodyId, ClassId, Klass, Scope};
use crate::names;
use jxx_parser::ast::{Block, Expression, TypeExpr, TypeExprKind};
use jxx_parser::Span;
use jxx_types::{ClassHierarchy, QualifiedType, Type, JAVA_LANG, PREDEFINED};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

/// Syntax of a member body kept for the body rewriter
#[derive(Debug, Clone, PartialEq)]
pub enum BodyKind {
    /// Method or constructor block
    Block(Block),
    /// Field initializer
    Expression(Expression),
}

/// A member body and the file it came from
#[derive(Debug, Clone, PartialEq)]
pub struct StoredBody {
    /// Source file
    pub file: FileId,
    /// Syntax
    pub kind: BodyKind,
}

/// Every class of a compilation
#[derive(Debug, Clone)]
pub struct ClassTable {
    classes: Vec<Klass>,
    by_name: FxHashMap<QualifiedType, ClassId>,
    bodies: Vec<StoredBody>,
    tree: InheritanceTree,
}

impl Default for ClassTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassTable {
    /// Create a table holding the predefined runtime classes.
    pub fn new() -> Self {
        let object = predefined::object();
        let string = predefined::string(&object);
        let class = predefined::class(&object);

        let mut table = ClassTable {
            classes: Vec::new(),
            by_name: FxHashMap::default(),
            bodies: Vec::new(),
            tree: InheritanceTree::new(predefined::OBJECT),
        };
        for klass in [object, string, class] {
            if !klass.name.is_object() {
                // Both names are fresh in a new tree
                let _ = table.tree.insert(&klass.name, None, klass.id);
            }
            table.by_name.insert(klass.name.clone(), klass.id);
            table.classes.push(klass);
        }
        table
    }

    // ========================================================================
    // Access
    // ========================================================================

    /// The class behind a handle.
    pub fn get(&self, id: ClassId) -> &Klass {
        &self.classes[id.index()]
    }

    pub(crate) fn get_mut(&mut self, id: ClassId) -> &mut Klass {
        &mut self.classes[id.index()]
    }

    /// Number of classes, predefined ones included.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Always false; the predefined classes are always present.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Every class in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Klass> {
        self.classes.iter()
    }

    /// The inheritance tree.
    pub fn tree(&self) -> &InheritanceTree {
        &self.tree
    }

    /// Class with this exact qualified name.
    pub fn lookup(&self, name: &QualifiedType) -> Option<ClassId> {
        self.by_name.get(name).copied()
    }

    /// Class of a non-array class type.
    pub fn class_of_type(&self, ty: &Type) -> Option<ClassId> {
        ty.as_class().and_then(|name| self.lookup(name))
    }

    /// Direct superclass.
    pub fn superclass(&self, id: ClassId) -> Option<ClassId> {
        self.get(id).parent
    }

    /// Strict subclass test over the inheritance tree's parent links.
    pub fn is_subclass(&self, sub: ClassId, sup: ClassId) -> bool {
        match (self.node(sub), self.node(sup)) {
            (Some(sub), Some(sup)) => self.tree.descends_from(sub, sup),
            _ => false,
        }
    }

    fn node(&self, id: ClassId) -> Option<NodeId> {
        self.tree.dereference(&self.get(id).name)
    }

    /// Outermost lexically enclosing class.
    pub fn outermost(&self, id: ClassId) -> ClassId {
        let mut current = id;
        while let Some(outer) = self.get(current).enclosing {
            current = outer;
        }
        current
    }

    /// Direct subclasses in declaration order.
    pub fn children_of(&self, id: ClassId) -> Vec<ClassId> {
        self.classes
            .iter()
            .filter(|k| k.parent == Some(id))
            .map(|k| k.id)
            .collect()
    }

    /// User classes ordered so every class follows its parent.
    pub fn parent_first_order(&self) -> Vec<ClassId> {
        let mut order = Vec::new();
        let mut stack = vec![predefined::OBJECT];
        while let Some(id) = stack.pop() {
            if !self.get(id).predefined {
                order.push(id);
            }
            let mut children = self.children_of(id);
            children.reverse();
            stack.extend(children);
        }
        order
    }

    // ========================================================================
    // Bodies
    // ========================================================================

    /// Keep a body for later analysis.
    pub fn store_body(&mut self, file: FileId, kind: BodyKind) -> BodyId {
        let id = BodyId(self.bodies.len() as u32);
        self.bodies.push(StoredBody { file, kind });
        id
    }

    /// A stored body.
    pub fn body(&self, id: BodyId) -> &StoredBody {
        &self.bodies[id.index()]
    }

    // ========================================================================
    // Declaration and parenting
    // ========================================================================

    /// Add a class under `java.lang.Object`.
    pub fn declare(&mut self, name: QualifiedType, scope: Scope, file: FileId, span: Span) -> CompileResult<ClassId> {
        let id = ClassId(self.classes.len() as u32);
        if self.by_name.contains_key(&name) || self.tree.insert(&name, None, id).is_err() {
            return Err(CompileError::DuplicateClass {
                name: name.dotted_name(),
                file,
                span,
            });
        }

        let mut klass = Klass::new(id, name.clone(), scope, Some(file), span);
        klass.seed_from(self.get(predefined::OBJECT))?;
        debug!(target: "jxx::table", class = %name, id = id.0, "declared class");

        self.by_name.insert(name, id);
        self.classes.push(klass);
        Ok(id)
    }

    /// Attach `child` to `parent` and rebuild the member lists below it.
    pub fn set_parent(&mut self, child: ClassId, parent: ClassId, span: Span) -> CompileResult<()> {
        let file = self.get(child).file.unwrap_or_default();
        if child == parent || self.is_subclass(parent, child) {
            return Err(CompileError::CyclicInheritance {
                class: self.get(child).name.dotted_name(),
                file,
                span,
            });
        }

        let child_name = self.get(child).name.clone();
        let parent_name = self.get(parent).name.clone();
        self.tree
            .reparent(&child_name, &parent_name)
            .map_err(|_| CompileError::UnknownType {
                name: parent_name.dotted_name(),
                file,
                span,
            })?;
        debug!(target: "jxx::table", class = %child_name, parent = %parent_name, "re-parented class");

        self.get_mut(child).parent = Some(parent);
        self.reseed(child)?;
        self.reseed_descendants(child)
    }

    /// Rebuild a class's member lists from its current parent.
    pub fn reseed(&mut self, id: ClassId) -> CompileResult<()> {
        if let Some(parent) = self.superclass(id) {
            let parent = self.get(parent).clone();
            self.get_mut(id).seed_from(&parent)?;
        }
        Ok(())
    }

    /// Rebuild every class below `id`, parents before children.
    pub fn reseed_descendants(&mut self, id: ClassId) -> CompileResult<()> {
        let mut pending = self.children_of(id);
        pending.reverse();
        while let Some(next) = pending.pop() {
            self.reseed(next)?;
            let mut children = self.children_of(next);
            children.reverse();
            pending.extend(children);
        }
        Ok(())
    }

    // ========================================================================
    // Name resolution
    // ========================================================================

    /// Resolve a simple class name from a declaration's scope.
    ///
    /// Order: single-type imports, same package, on-demand imports,
    /// `java.lang`, default package.
    pub fn resolve_simple(&self, scope: &Scope, name: &str) -> Option<ClassId> {
        if let Some(import) = scope.single_imports.iter().find(|i| i.simple_name() == name) {
            if let Some(id) = self.lookup(import) {
                return Some(id);
            }
        }

        let in_package = |package: &[String]| {
            let mut segments = package.to_vec();
            segments.push(name.to_string());
            QualifiedType::new(segments).ok().and_then(|q| self.lookup(&q))
        };

        if let Some(id) = in_package(&scope.package) {
            return Some(id);
        }
        if let Some(id) = scope.wildcard_imports.iter().find_map(|p| in_package(p)) {
            return Some(id);
        }
        if PREDEFINED.contains(&name) {
            let java_lang: Vec<String> = JAVA_LANG.iter().map(|s| s.to_string()).collect();
            if let Some(id) = in_package(&java_lang) {
                return Some(id);
            }
        }
        in_package(&[])
    }

    /// Resolve a dotted class name.
    ///
    /// Fully qualified names go through the inheritance tree; `Outer.Inner`
    /// forms walk nested classes from a simple name.
    pub fn resolve_path(&self, scope: &Scope, segments: &[&str]) -> Option<ClassId> {
        match segments {
            [] => None,
            [name] => self.resolve_simple(scope, name),
            _ => self.tree.resolve(segments).or_else(|| {
                let mut current = self.resolve_simple(scope, segments[0])?;
                for segment in &segments[1..] {
                    current = self.nested_class(current, segment)?;
                }
                Some(current)
            }),
        }
    }

    /// Resolve a written type.
    pub fn resolve_type(&self, scope: &Scope, file: FileId, ty: &TypeExpr) -> CompileResult<Type> {
        match &ty.kind {
            TypeExprKind::Primitive(primitive) => Ok(Type::Primitive {
                ty: *primitive,
                dimensions: ty.dimensions,
            }),
            TypeExprKind::Named(name) => {
                let segments = name.names();
                let segments: Vec<&str> = segments.iter().map(String::as_str).collect();
                let class = self
                    .resolve_path(scope, &segments)
                    .ok_or_else(|| CompileError::UnknownType {
                        name: name.dotted(),
                        file,
                        span: ty.span,
                    })?;
                Ok(Type::Qualified {
                    ty: self.get(class).name.clone(),
                    dimensions: ty.dimensions,
                })
            }
        }
    }

    /// Nested class of `outer` with this simple name.
    pub fn nested_class(&self, outer: ClassId, name: &str) -> Option<ClassId> {
        self.classes
            .iter()
            .find(|k| k.enclosing == Some(outer) && k.simple_name() == name)
            .map(|k| k.id)
    }

    // ========================================================================
    // Finishing
    // ========================================================================

    /// Choose the C++ member name of every field slot.
    ///
    /// Inherited slots keep the parent's name, a field shadowing an earlier
    /// one becomes `name_Class`, and names colliding with a method of the
    /// same struct get a trailing `_`.
    pub fn assign_field_names(&mut self) {
        for id in self.parent_first_order() {
            let klass = self.get(id);
            let inherited: Vec<String> = match klass.parent {
                Some(parent) => self.get(parent).fields.iter().map(|f| f.cpp_name.clone()).collect(),
                None => Vec::new(),
            };
            let mut taken: FxHashSet<String> = klass
                .own_methods()
                .map(|(index, _)| names::method_name(klass, index, false))
                .collect();
            taken.insert(names::INIT.to_string());

            let mut assigned = Vec::with_capacity(klass.fields.len());
            for (index, field) in klass.fields.iter().enumerate() {
                let mut name = match inherited.get(index) {
                    Some(name) => name.clone(),
                    None if klass.fields[..index].iter().any(|f| f.name == field.name) => {
                        format!("{}_{}", names::cpp_identifier(&field.name), klass.simple_name())
                    }
                    None => names::cpp_identifier(&field.name),
                };
                while taken.contains(&name) {
                    name.push('_');
                }
                taken.insert(name.clone());
                assigned.push(name);
            }

            let klass = self.get_mut(id);
            for (field, name) in klass.fields.iter_mut().zip(assigned) {
                field.cpp_name = name;
            }
        }
    }
}

impl ClassHierarchy for ClassTable {
    fn superclass_of(&self, class: &QualifiedType) -> Option<QualifiedType> {
        let node = self.tree.dereference(class)?;
        let parent = self.tree.parent_of(node)?;
        self.tree.class_of(parent).map(|id| self.get(id).name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jxx_types::is_subtype;

    fn name(dotted: &str) -> QualifiedType {
        QualifiedType::parse(dotted).unwrap()
    }

    fn declare(table: &mut ClassTable, dotted: &str) -> ClassId {
        let q = name(dotted);
        let scope = Scope {
            package: q.package().to_vec(),
            ..Scope::default()
        };
        table.declare(q, scope, 0, Span::default()).unwrap()
    }

    #[test]
    fn test_predefined_classes_present() {
        let table = ClassTable::new();
        assert_eq!(table.len(), 3);
        assert_eq!(table.lookup(&QualifiedType::object()), Some(predefined::OBJECT));
        assert_eq!(table.lookup(&QualifiedType::string()), Some(predefined::STRING));
        assert_eq!(table.tree().resolve(&["java", "lang", "Class"]), Some(predefined::CLASS));
        assert!(table.parent_first_order().is_empty());
    }

    #[test]
    fn test_declared_class_is_seeded_from_object() {
        let mut table = ClassTable::new();
        let a = declare(&mut table, "p.A");
        assert_eq!(table.get(a).parent, Some(predefined::OBJECT));
        assert_eq!(table.get(a).methods.len(), 4);
    }

    #[test]
    fn test_duplicate_class() {
        let mut table = ClassTable::new();
        declare(&mut table, "p.A");
        let err = table
            .declare(name("p.A"), Scope::default(), 1, Span::default())
            .unwrap_err();
        assert!(matches!(err, CompileError::DuplicateClass { file: 1, .. }));
    }

    #[test]
    fn test_set_parent_reseeds_descendants() {
        let mut table = ClassTable::new();
        let a = declare(&mut table, "p.A");
        let b = declare(&mut table, "p.B");
        let c = declare(&mut table, "p.C");
        table.set_parent(c, b, Span::default()).unwrap();

        let foo = table.get(a).new_method("foo", vec![], Type::void());
        table.get_mut(a).incorporate_method(foo).unwrap();
        table.set_parent(b, a, Span::default()).unwrap();

        assert_eq!(table.get(c).methods.len(), 5);
        assert_eq!(table.get(c).methods[4].implementor, a);
        assert!(is_subtype(&table, &table.get(c).ty(), &table.get(a).ty()));
        assert_eq!(table.parent_first_order(), vec![a, b, c]);
        assert!(table.is_subclass(c, predefined::OBJECT));
        assert!(!table.is_subclass(a, c));
    }

    #[test]
    fn test_cycles_rejected() {
        let mut table = ClassTable::new();
        let a = declare(&mut table, "p.A");
        let b = declare(&mut table, "p.B");
        table.set_parent(b, a, Span::default()).unwrap();
        let err = table.set_parent(a, b, Span::default()).unwrap_err();
        assert!(matches!(err, CompileError::CyclicInheritance { .. }));
        let err = table.set_parent(a, a, Span::default()).unwrap_err();
        assert!(matches!(err, CompileError::CyclicInheritance { .. }));
    }

    #[test]
    fn test_resolution_order() {
        let mut table = ClassTable::new();
        declare(&mut table, "p.Shape");
        let imported = declare(&mut table, "q.Shape");
        let wild = declare(&mut table, "w.Circle");
        let default = declare(&mut table, "Square");

        let mut scope = Scope {
            package: vec!["p".to_string()],
            ..Scope::default()
        };
        scope.single_imports.push(name("q.Shape"));
        scope.wildcard_imports.push(vec!["w".to_string()]);

        assert_eq!(table.resolve_simple(&scope, "Shape"), Some(imported));
        assert_eq!(table.resolve_simple(&scope, "Circle"), Some(wild));
        assert_eq!(table.resolve_simple(&scope, "String"), Some(predefined::STRING));
        assert_eq!(table.resolve_simple(&scope, "Square"), Some(default));
        assert_eq!(table.resolve_simple(&scope, "Missing"), None);
        assert_eq!(table.resolve_path(&scope, &["java", "lang", "Object"]), Some(predefined::OBJECT));
    }

    #[test]
    fn test_nested_path() {
        let mut table = ClassTable::new();
        let outer = declare(&mut table, "p.Outer");
        let inner = declare(&mut table, "p.Inner");
        table.get_mut(inner).enclosing = Some(outer);
        let scope = Scope {
            package: vec!["p".to_string()],
            ..Scope::default()
        };
        assert_eq!(table.resolve_path(&scope, &["Outer", "Inner"]), Some(inner));
        assert_eq!(table.resolve_path(&scope, &["p", "Inner"]), Some(inner));
        assert_eq!(table.outermost(inner), outer);
    }

    #[test]
    fn test_field_names() {
        let mut table = ClassTable::new();
        let a = declare(&mut table, "p.A");
        let b = declare(&mut table, "p.B");
        table.set_parent(b, a, Span::default()).unwrap();

        for (class, field) in [(a, "x"), (a, "count"), (b, "x")] {
            let f = table.get(class).new_field(field, Type::int());
            table.get_mut(class).incorporate_field(f).unwrap();
        }
        table.reseed_descendants(a).unwrap();
        let count = table.get(b).new_method("count", vec![], Type::int());
        table.get_mut(b).incorporate_method(count).unwrap();

        table.assign_field_names();
        let names: Vec<&str> = table.get(b).fields.iter().map(|f| f.cpp_name.as_str()).collect();
        assert_eq!(names, vec!["x", "count_", "x_B"]);
        let names: Vec<&str> = table.get(a).fields.iter().map(|f| f.cpp_name.as_str()).collect();
        assert_eq!(names, vec!["x", "count"]);
    }
}
