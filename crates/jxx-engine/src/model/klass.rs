//! The class record

use super::member::{incorporate, Constructor, Field, Incorporated, Member, Method, Param};
use super::{ClassId, Scope, Visibility};
use crate::error::{CompileError, CompileResult, FileId};
use jxx_parser::Span;
use jxx_types::{QualifiedType, Type};

/// In-memory model of one class
///
/// `fields` and `methods` are the complete ordered lists, inherited entries
/// first. `declared_fields` and `declared_methods` keep the class's own
/// declarations in source order so the lists can be rebuilt when the class
/// is re-parented.
#[derive(Debug, Clone)]
pub struct Klass {
    /// Arena handle
    pub id: ClassId,
    /// Qualified name
    pub name: QualifiedType,
    /// Superclass, `None` only for `java.lang.Object`
    pub parent: Option<ClassId>,
    /// Field slots, inherited first
    pub fields: Vec<Field>,
    /// Method slots, inherited first
    pub methods: Vec<Method>,
    /// Constructors, never inherited
    pub constructors: Vec<Constructor>,
    /// Own field declarations in source order
    pub declared_fields: Vec<Field>,
    /// Own method declarations in source order
    pub declared_methods: Vec<Method>,
    /// Supplied by the runtime library, never emitted
    pub predefined: bool,
    /// `abstract`
    pub is_abstract: bool,
    /// Access level
    pub visibility: Visibility,
    /// Lexically enclosing class of a nested class
    pub enclosing: Option<ClassId>,
    /// Declaring file, `None` for predefined classes
    pub file: Option<FileId>,
    /// Declaration site
    pub span: Span,
    /// Names visible to the declaration
    pub scope: Scope,
}

impl Klass {
    /// Create a class with no parent and no members.
    pub fn new(id: ClassId, name: QualifiedType, scope: Scope, file: Option<FileId>, span: Span) -> Self {
        Self {
            id,
            name,
            parent: None,
            fields: Vec::new(),
            methods: Vec::new(),
            constructors: Vec::new(),
            declared_fields: Vec::new(),
            declared_methods: Vec::new(),
            predefined: false,
            is_abstract: false,
            visibility: Visibility::Package,
            enclosing: None,
            file,
            span,
            scope,
        }
    }

    /// The class as a type.
    pub fn ty(&self) -> Type {
        Type::qualified(self.name.clone())
    }

    /// Simple name.
    pub fn simple_name(&self) -> &str {
        self.name.simple_name()
    }

    /// A public instance method owned and implemented by this class.
    pub fn new_method(&self, name: impl Into<String>, params: Vec<Param>, return_type: Type) -> Method {
        Method {
            name: name.into(),
            params,
            return_type,
            of: self.id,
            implementor: self.id,
            is_static: false,
            is_abstract: false,
            visibility: Visibility::Public,
            body: None,
            span: self.span,
        }
    }

    /// A package-access instance field owned by this class.
    pub fn new_field(&self, name: impl Into<String>, ty: Type) -> Field {
        let name = name.into();
        Field {
            cpp_name: name.clone(),
            name,
            ty,
            of: self.id,
            implementor: self.id,
            is_static: false,
            visibility: Visibility::Package,
            initializer: None,
            span: self.span,
        }
    }

    /// A constructor of this class.
    pub fn new_constructor(&self, params: Vec<Param>) -> Constructor {
        Constructor {
            name: self.simple_name().to_string(),
            of: self.id,
            params,
            visibility: Visibility::Public,
            body: None,
            span: self.span,
        }
    }

    // ========================================================================
    // Incorporation
    // ========================================================================

    /// Record a declared method and merge it into the method list.
    pub fn incorporate_method(&mut self, method: Method) -> CompileResult<Incorporated> {
        let result = self.merge_method(method.clone())?;
        self.declared_methods.push(method);
        Ok(result)
    }

    /// Record a declared field and append it to the field list.
    pub fn incorporate_field(&mut self, field: Field) -> CompileResult<Incorporated> {
        let result = self.merge_field(field.clone())?;
        self.declared_fields.push(field);
        Ok(result)
    }

    /// Add a constructor; signatures must be distinct.
    pub fn add_constructor(&mut self, constructor: Constructor) -> CompileResult<usize> {
        let mut list = std::mem::take(&mut self.constructors);
        let result = incorporate(&mut list, constructor.clone());
        self.constructors = list;
        match result {
            Ok(done) => Ok(done.index()),
            Err(_) => Err(self.duplicate(&constructor)),
        }
    }

    fn merge_method(&mut self, method: Method) -> CompileResult<Incorporated> {
        if let Some(existing) = self.methods.iter().find(|existing| method.overrides(existing)) {
            if existing.is_static != method.is_static {
                return Err(CompileError::IncompatibleOverride {
                    name: method.signature(),
                    class: self.name.dotted_name(),
                    file: self.file.unwrap_or_default(),
                    span: method.span,
                });
            }
        }
        let duplicate = self.duplicate(&method);
        incorporate(&mut self.methods, method).map_err(|_| duplicate)
    }

    fn merge_field(&mut self, field: Field) -> CompileResult<Incorporated> {
        let duplicate = self.duplicate(&field);
        incorporate(&mut self.fields, field).map_err(|_| duplicate)
    }

    fn duplicate<M: Member>(&self, member: &M) -> CompileError {
        CompileError::DuplicateMember {
            name: member.signature(),
            class: self.name.dotted_name(),
            file: self.file.unwrap_or_default(),
            span: member.span(),
        }
    }

    /// Attach to `parent` and rebuild the member lists.
    ///
    /// The lists become copies of the parent's lists followed by this class's
    /// own declarations, merged again in source order.
    pub fn seed_from(&mut self, parent: &Klass) -> CompileResult<()> {
        self.parent = Some(parent.id);
        self.fields = parent.fields.clone();
        self.methods = parent.methods.clone();
        for field in &mut self.fields {
            field.rebind(self.id);
        }
        for method in &mut self.methods {
            method.rebind(self.id);
        }

        for field in self.declared_fields.clone() {
            self.merge_field(field)?;
        }
        for method in self.declared_methods.clone() {
            self.merge_method(method)?;
        }
        Ok(())
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// The most derived field with this name.
    pub fn field(&self, name: &str) -> Option<(usize, &Field)> {
        self.fields.iter().enumerate().rev().find(|(_, f)| f.name == name)
    }

    /// Methods with this name, overloads included.
    pub fn methods_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = (usize, &'a Method)> + 'a {
        self.methods.iter().enumerate().filter(move |(_, m)| m.name == name)
    }

    /// Position of the method with this exact signature.
    pub fn method_index(&self, name: &str, params: &[Type]) -> Option<usize> {
        self.methods
            .iter()
            .position(|m| m.name == name && m.param_types() == params)
    }

    /// True when several methods of the list share `name`.
    pub fn is_overloaded(&self, name: &str) -> bool {
        self.methods_named(name).nth(1).is_some()
    }

    /// Methods occupying vtable slots, in slot order.
    pub fn virtual_methods(&self) -> impl Iterator<Item = (usize, &Method)> {
        self.methods.iter().enumerate().filter(|(_, m)| m.is_virtual())
    }

    /// Instance fields in layout order.
    pub fn instance_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| !f.is_static)
    }

    /// Static fields declared by this class.
    pub fn own_static_fields(&self) -> impl Iterator<Item = &Field> {
        let id = self.id;
        self.fields.iter().filter(move |f| f.is_static && f.implementor == id)
    }

    /// Methods whose bodies this class supplies.
    pub fn own_methods(&self) -> impl Iterator<Item = (usize, &Method)> {
        let id = self.id;
        self.methods.iter().enumerate().filter(move |(_, m)| m.implementor == id)
    }

    /// Abstract methods still unimplemented in this class.
    pub fn abstract_methods(&self) -> impl Iterator<Item = &Method> {
        self.methods.iter().filter(|m| m.is_abstract)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(id: u32, name: &str) -> Klass {
        Klass::new(
            ClassId(id),
            QualifiedType::parse(name).unwrap(),
            Scope::default(),
            Some(0),
            Span::default(),
        )
    }

    fn root() -> Klass {
        let mut object = class(0, "java.lang.Object");
        for name in ["hashCode", "equals", "getClass", "toString"] {
            let m = object.new_method(name, vec![], Type::int());
            object.incorporate_method(m).unwrap();
        }
        object
    }

    #[test]
    fn test_seed_copies_parent_lists() {
        let object = root();
        let mut a = class(1, "p.A");
        a.seed_from(&object).unwrap();
        assert_eq!(a.methods.len(), 4);
        assert!(a.methods.iter().all(|m| m.of == a.id && m.implementor == object.id));
        assert!(a.declared_methods.is_empty());
    }

    #[test]
    fn test_seed_is_a_copy() {
        let mut object = root();
        let mut a = class(1, "p.A");
        a.seed_from(&object).unwrap();
        let extra = object.new_method("extra", vec![], Type::void());
        object.incorporate_method(extra).unwrap();
        assert_eq!(a.methods.len(), 4);
    }

    #[test]
    fn test_reseed_replays_declarations() {
        let object = root();
        let mut parent = class(1, "p.P");
        parent.seed_from(&object).unwrap();
        let foo = parent.new_method("foo", vec![], Type::void());
        parent.incorporate_method(foo).unwrap();

        let mut child = class(2, "p.C");
        child.seed_from(&object).unwrap();
        let foo = child.new_method("foo", vec![], Type::void());
        let bar = child.new_method("bar", vec![], Type::void());
        child.incorporate_method(foo).unwrap();
        child.incorporate_method(bar).unwrap();
        assert_eq!(child.methods.len(), 6);

        child.seed_from(&parent).unwrap();
        assert_eq!(child.parent, Some(parent.id));
        assert_eq!(child.methods.len(), 6);
        assert_eq!(child.methods[4].name, "foo");
        assert_eq!(child.methods[4].implementor, child.id);
        assert_eq!(child.methods[5].name, "bar");
    }

    #[test]
    fn test_static_override_rejected() {
        let object = root();
        let mut a = class(1, "p.A");
        a.seed_from(&object).unwrap();
        let mut m = a.new_method("toString", vec![], Type::string());
        m.is_static = true;
        let err = a.incorporate_method(m).unwrap_err();
        assert!(matches!(err, CompileError::IncompatibleOverride { .. }));
    }

    #[test]
    fn test_duplicate_constructor() {
        let a = class(1, "p.A");
        let mut a2 = a.clone();
        a2.add_constructor(a.new_constructor(vec![Param::new("x", Type::int())]))
            .unwrap();
        let err = a2
            .add_constructor(a.new_constructor(vec![Param::new("y", Type::int())]))
            .unwrap_err();
        assert!(matches!(err, CompileError::DuplicateMember { .. }));
    }

    #[test]
    fn test_field_lookup_prefers_most_derived() {
        let mut a = class(1, "p.A");
        let x = a.new_field("x", Type::int());
        a.incorporate_field(x).unwrap();
        let mut b = class(2, "p.B");
        b.seed_from(&a).unwrap();
        let x = b.new_field("x", Type::string());
        b.incorporate_field(x).unwrap();

        let (index, field) = b.field("x").unwrap();
        assert_eq!(index, 1);
        assert_eq!(field.ty, Type::string());
        assert_eq!(b.fields.len(), 2);
    }
}
