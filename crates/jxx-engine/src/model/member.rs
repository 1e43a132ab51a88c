//! Fields, methods and constructors
//!
//! All three implement [`Member`], which is what [`incorporate`] needs to
//! merge a declaration into a class's ordered member list.

use super::{BodyId, ClassId, Visibility};
use jxx_parser::Span;
use jxx_types::Type;

/// Common view of a class member
pub trait Member {
    /// Source name.
    fn name(&self) -> &str;

    /// Class whose member list holds this entry.
    fn of(&self) -> ClassId;

    /// Class whose declaration supplies the body.
    fn implementor(&self) -> ClassId;

    /// `static` members.
    fn is_static(&self) -> bool;

    /// Declared access level.
    fn visibility(&self) -> Visibility;

    /// Declaration site.
    fn span(&self) -> Span;

    /// True when `self` takes over the list slot held by `existing`.
    fn overrides(&self, existing: &Self) -> bool;

    /// True when one class cannot declare both `self` and `existing`.
    fn conflicts_with(&self, existing: &Self) -> bool;

    /// Name plus parameter list, for diagnostics.
    fn signature(&self) -> String;

    /// Move the entry into the member list of `of`.
    fn rebind(&mut self, of: ClassId);
}

/// Outcome of [`incorporate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Incorporated {
    /// An inherited entry was overwritten in place
    Replaced(usize),
    /// A new entry was added at the end
    Appended(usize),
}

impl Incorporated {
    /// Position of the member in the list.
    pub fn index(self) -> usize {
        match self {
            Incorporated::Replaced(index) | Incorporated::Appended(index) => index,
        }
    }
}

/// The list already holds a conflicting declaration of the same class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conflict {
    /// Position of the earlier declaration
    pub index: usize,
}

/// Merge `member` into `list`.
///
/// An entry that `member` overrides is overwritten in place so list
/// positions stay stable down the hierarchy; anything else is appended.
pub fn incorporate<M: Member>(list: &mut Vec<M>, member: M) -> Result<Incorporated, Conflict> {
    if let Some(index) = list
        .iter()
        .position(|existing| existing.implementor() == member.of() && member.conflicts_with(existing))
    {
        return Err(Conflict { index });
    }

    match list.iter().position(|existing| member.overrides(existing)) {
        Some(index) => {
            list[index] = member;
            Ok(Incorporated::Replaced(index))
        }
        None => {
            list.push(member);
            Ok(Incorporated::Appended(list.len() - 1))
        }
    }
}

fn parameter_list(params: &[Param]) -> String {
    params
        .iter()
        .map(|p| p.ty.java_name())
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// Parameters
// ============================================================================

/// A formal parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    /// Source name
    pub name: String,
    /// Declared type
    pub ty: Type,
}

impl Param {
    /// Create a parameter.
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

// ============================================================================
// Fields
// ============================================================================

/// A field slot in a class layout
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Source name
    pub name: String,
    /// Declared type
    pub ty: Type,
    /// Class whose list holds this entry
    pub of: ClassId,
    /// Declaring class
    pub implementor: ClassId,
    /// `static`
    pub is_static: bool,
    /// Access level
    pub visibility: Visibility,
    /// Initializer expression
    pub initializer: Option<BodyId>,
    /// Member name in the generated struct
    pub cpp_name: String,
    /// Declaration site
    pub span: Span,
}

impl Member for Field {
    fn name(&self) -> &str {
        &self.name
    }

    fn of(&self) -> ClassId {
        self.of
    }

    fn implementor(&self) -> ClassId {
        self.implementor
    }

    fn is_static(&self) -> bool {
        self.is_static
    }

    fn visibility(&self) -> Visibility {
        self.visibility
    }

    fn span(&self) -> Span {
        self.span
    }

    // Fields shadow, they never take over a slot
    fn overrides(&self, _existing: &Self) -> bool {
        false
    }

    fn conflicts_with(&self, existing: &Self) -> bool {
        self.name == existing.name
    }

    fn signature(&self) -> String {
        self.name.clone()
    }

    fn rebind(&mut self, of: ClassId) {
        self.of = of;
    }
}

// ============================================================================
// Methods
// ============================================================================

/// A method slot
#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    /// Source name
    pub name: String,
    /// Formal parameters
    pub params: Vec<Param>,
    /// Declared return type
    pub return_type: Type,
    /// Class whose list holds this entry
    pub of: ClassId,
    /// Class whose body is used
    pub implementor: ClassId,
    /// `static`
    pub is_static: bool,
    /// Declared without a body
    pub is_abstract: bool,
    /// Access level
    pub visibility: Visibility,
    /// Method body
    pub body: Option<BodyId>,
    /// Declaration site
    pub span: Span,
}

impl Method {
    /// Parameter types in order.
    pub fn param_types(&self) -> Vec<Type> {
        self.params.iter().map(|p| p.ty.clone()).collect()
    }

    /// Same name and parameter types.
    pub fn same_signature(&self, other: &Method) -> bool {
        self.name == other.name
            && self.params.len() == other.params.len()
            && self.params.iter().zip(&other.params).all(|(a, b)| a.ty == b.ty)
    }

    /// True for methods that occupy a vtable slot.
    pub fn is_virtual(&self) -> bool {
        !self.is_static
    }
}

impl Member for Method {
    fn name(&self) -> &str {
        &self.name
    }

    fn of(&self) -> ClassId {
        self.of
    }

    fn implementor(&self) -> ClassId {
        self.implementor
    }

    fn is_static(&self) -> bool {
        self.is_static
    }

    fn visibility(&self) -> Visibility {
        self.visibility
    }

    fn span(&self) -> Span {
        self.span
    }

    fn overrides(&self, existing: &Self) -> bool {
        existing.implementor != self.of && self.same_signature(existing)
    }

    fn conflicts_with(&self, existing: &Self) -> bool {
        self.same_signature(existing)
    }

    fn signature(&self) -> String {
        format!("{}({})", self.name, parameter_list(&self.params))
    }

    fn rebind(&mut self, of: ClassId) {
        self.of = of;
    }
}

// ============================================================================
// Constructors
// ============================================================================

/// A constructor of a class
#[derive(Debug, Clone, PartialEq)]
pub struct Constructor {
    /// Simple name of the class
    pub name: String,
    /// Owning class
    pub of: ClassId,
    /// Formal parameters
    pub params: Vec<Param>,
    /// Access level
    pub visibility: Visibility,
    /// Body, absent for the implicit constructor
    pub body: Option<BodyId>,
    /// Declaration site
    pub span: Span,
}

impl Constructor {
    /// Parameter types in order.
    pub fn param_types(&self) -> Vec<Type> {
        self.params.iter().map(|p| p.ty.clone()).collect()
    }

    /// True for the constructor supplied when a class declares none.
    pub fn is_implicit(&self) -> bool {
        self.body.is_none()
    }
}

impl Member for Constructor {
    fn name(&self) -> &str {
        &self.name
    }

    fn of(&self) -> ClassId {
        self.of
    }

    fn implementor(&self) -> ClassId {
        self.of
    }

    fn is_static(&self) -> bool {
        false
    }

    fn visibility(&self) -> Visibility {
        self.visibility
    }

    fn span(&self) -> Span {
        self.span
    }

    fn overrides(&self, _existing: &Self) -> bool {
        false
    }

    fn conflicts_with(&self, existing: &Self) -> bool {
        self.param_types() == existing.param_types()
    }

    fn signature(&self) -> String {
        format!("{}({})", self.name, parameter_list(&self.params))
    }

    fn rebind(&mut self, of: ClassId) {
        self.of = of;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn method(name: &str, params: Vec<Type>, of: ClassId) -> Method {
        Method {
            name: name.to_string(),
            params: params.into_iter().map(|ty| Param::new("p", ty)).collect(),
            return_type: Type::void(),
            of,
            implementor: of,
            is_static: false,
            is_abstract: false,
            visibility: Visibility::Public,
            body: None,
            span: Span::default(),
        }
    }

    fn inherited(list: &[Method], of: ClassId) -> Vec<Method> {
        list.iter()
            .cloned()
            .map(|mut m| {
                m.rebind(of);
                m
            })
            .collect()
    }

    #[test]
    fn test_new_signature_appends() {
        let a = ClassId(1);
        let mut list = vec![method("foo", vec![], a)];
        let before = list.len();
        let result = incorporate(&mut list, method("bar", vec![], a)).unwrap();
        assert_eq!(result, Incorporated::Appended(1));
        assert_eq!(list.len(), before + 1);
    }

    #[test]
    fn test_override_keeps_length_and_position() {
        let (a, b) = (ClassId(1), ClassId(2));
        let parent = vec![method("foo", vec![], a), method("bar", vec![Type::int()], a)];
        let mut list = inherited(&parent, b);

        let result = incorporate(&mut list, method("foo", vec![], b)).unwrap();
        assert_eq!(result, Incorporated::Replaced(0));
        assert_eq!(list.len(), parent.len());
        assert_eq!(list[0].implementor, b);
        assert_eq!(list[1].implementor, a);
    }

    #[test]
    fn test_overload_with_same_arity_appends() {
        let (a, b) = (ClassId(1), ClassId(2));
        let mut list = inherited(&[method("foo", vec![Type::int()], a)], b);
        let result = incorporate(&mut list, method("foo", vec![Type::string()], b)).unwrap();
        assert_eq!(result, Incorporated::Appended(1));
    }

    #[test]
    fn test_redeclaration_in_same_class_conflicts() {
        let a = ClassId(1);
        let mut list = vec![method("foo", vec![Type::int()], a)];
        let err = incorporate(&mut list, method("foo", vec![Type::int()], a)).unwrap_err();
        assert_eq!(err, Conflict { index: 0 });
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_fields_shadow() {
        let (a, b) = (ClassId(1), ClassId(2));
        let field = |of: ClassId| Field {
            name: "x".to_string(),
            ty: Type::int(),
            of,
            implementor: of,
            is_static: false,
            visibility: Visibility::Package,
            initializer: None,
            cpp_name: "x".to_string(),
            span: Span::default(),
        };
        let mut inherited = field(a);
        inherited.rebind(b);
        let mut list = vec![inherited];

        assert_eq!(incorporate(&mut list, field(b)).unwrap(), Incorporated::Appended(1));
        assert_eq!(incorporate(&mut list, field(b)).unwrap_err(), Conflict { index: 1 });
    }

    #[test]
    fn test_signature_rendering() {
        let m = method("add", vec![Type::int(), Type::string().array_of(1)], ClassId(0));
        assert_eq!(m.signature(), "add(int, java.lang.String[])");
    }
}
