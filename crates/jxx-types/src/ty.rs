//! Core type definitions for the jxx type model
//!
//! A [`Type`] is either a primitive, a class reference written as a
//! [`QualifiedType`], or the type of the `null` literal. Both primitives and
//! classes may carry array dimensions.

use crate::error::TypeError;
use std::fmt;

/// Separator used when composing C++ qualified names.
pub const QUALIFIER: &str = "::";

/// Package holding the predefined runtime classes.
pub const JAVA_LANG: [&str; 2] = ["java", "lang"];

/// Simple names of the classes supplied by the runtime library.
pub const PREDEFINED: [&str; 3] = ["Object", "String", "Class"];

/// Spell the C++ template instantiation `name<argument>`.
///
/// A closing `>` of a nested instantiation is kept apart from the outer one.
pub fn template(name: &str, argument: &str) -> String {
    if argument.ends_with('>') {
        format!("{}<{} >", name, argument)
    } else {
        format!("{}<{}>", name, argument)
    }
}

// ============================================================================
// Primitive types
// ============================================================================

/// The Java primitive types plus `void`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    /// `long`, 64-bit signed
    Long,
    /// `int`, 32-bit signed
    Int,
    /// `short`, 16-bit signed
    Short,
    /// `byte`, 8-bit signed
    Byte,
    /// `char`
    Char,
    /// `float`
    Float,
    /// `double`
    Double,
    /// `boolean`
    Boolean,
    /// `void`, only valid as a return type
    Void,
}

impl PrimitiveType {
    /// Every primitive, in declaration order.
    pub const ALL: [PrimitiveType; 9] = [
        PrimitiveType::Long,
        PrimitiveType::Int,
        PrimitiveType::Short,
        PrimitiveType::Byte,
        PrimitiveType::Char,
        PrimitiveType::Float,
        PrimitiveType::Double,
        PrimitiveType::Boolean,
        PrimitiveType::Void,
    ];

    /// Look up a primitive by its Java keyword.
    pub fn from_java_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.java_name() == name)
    }

    /// The Java keyword for this primitive.
    pub fn java_name(self) -> &'static str {
        match self {
            PrimitiveType::Long => "long",
            PrimitiveType::Int => "int",
            PrimitiveType::Short => "short",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Char => "char",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Void => "void",
        }
    }

    /// The fixed-width C++ type this primitive maps to.
    pub fn native_name(self) -> &'static str {
        match self {
            PrimitiveType::Long => "int64_t",
            PrimitiveType::Int => "int32_t",
            PrimitiveType::Short => "int16_t",
            PrimitiveType::Byte => "int8_t",
            PrimitiveType::Char => "char",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
            PrimitiveType::Boolean => "bool",
            PrimitiveType::Void => "void",
        }
    }

    /// True for the integral and floating-point primitives.
    pub fn is_numeric(self) -> bool {
        !matches!(self, PrimitiveType::Boolean | PrimitiveType::Void)
    }

    /// True for `long`, `int`, `short`, `byte` and `char`.
    pub fn is_integral(self) -> bool {
        matches!(
            self,
            PrimitiveType::Long
                | PrimitiveType::Int
                | PrimitiveType::Short
                | PrimitiveType::Byte
                | PrimitiveType::Char
        )
    }

    /// Identity or Java widening primitive conversion from `self` to `target`.
    pub fn widens_to(self, target: PrimitiveType) -> bool {
        use PrimitiveType::*;

        if self == target {
            return true;
        }
        matches!(
            (self, target),
            (Byte, Short | Int | Long | Float | Double)
                | (Short, Int | Long | Float | Double)
                | (Char, Int | Long | Float | Double)
                | (Int, Long | Float | Double)
                | (Long, Float | Double)
                | (Float, Double)
        )
    }

    /// Binary numeric promotion of two numeric operands.
    pub fn promote(a: PrimitiveType, b: PrimitiveType) -> PrimitiveType {
        use PrimitiveType::*;

        if a == Double || b == Double {
            Double
        } else if a == Float || b == Float {
            Float
        } else if a == Long || b == Long {
            Long
        } else {
            Int
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.java_name())
    }
}

/// Map a Java primitive name to its native C++ type name.
pub fn primitive_for(java_name: &str) -> Result<&'static str, TypeError> {
    PrimitiveType::from_java_name(java_name)
        .map(PrimitiveType::native_name)
        .ok_or_else(|| TypeError::NotPrimitive {
            name: java_name.to_string(),
        })
}

// ============================================================================
// Qualified types
// ============================================================================

/// A class type named by its package ancestry and simple name.
///
/// The ancestry of `Object`, `String` and `Class` is always `java::lang`,
/// whether they were written with or without the package.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedType {
    ancestry: Vec<String>,
}

impl QualifiedType {
    /// Build a qualified type from its name segments.
    pub fn new<S: Into<String>>(ancestry: impl IntoIterator<Item = S>) -> Result<Self, TypeError> {
        let ancestry: Vec<String> = ancestry.into_iter().map(Into::into).collect();
        if ancestry.is_empty() || ancestry.iter().any(|s| s.is_empty()) {
            return Err(TypeError::MalformedName {
                name: ancestry.join("."),
            });
        }
        Ok(Self::canonical(ancestry))
    }

    /// Parse a `.` or `::` separated name.
    pub fn parse(name: &str) -> Result<Self, TypeError> {
        if name.contains(QUALIFIER) {
            Self::new(name.split(QUALIFIER))
        } else {
            Self::new(name.split('.'))
        }
    }

    /// `java::lang::Object`
    pub fn object() -> Self {
        Self::java_lang("Object")
    }

    /// `java::lang::String`
    pub fn string() -> Self {
        Self::java_lang("String")
    }

    /// `java::lang::Class`
    pub fn class() -> Self {
        Self::java_lang("Class")
    }

    fn java_lang(name: &str) -> Self {
        QualifiedType {
            ancestry: vec![JAVA_LANG[0].to_string(), JAVA_LANG[1].to_string(), name.to_string()],
        }
    }

    fn canonical(ancestry: Vec<String>) -> Self {
        let simple = ancestry[ancestry.len() - 1].as_str();
        let bare = ancestry.len() == 1;
        let in_java_lang = ancestry.len() == 3 && ancestry[0] == JAVA_LANG[0] && ancestry[1] == JAVA_LANG[1];
        if PREDEFINED.contains(&simple) && (bare || in_java_lang) {
            return Self::java_lang(simple);
        }
        QualifiedType { ancestry }
    }

    /// All name segments, package first.
    pub fn ancestry(&self) -> &[String] {
        &self.ancestry
    }

    /// The last segment.
    pub fn simple_name(&self) -> &str {
        &self.ancestry[self.ancestry.len() - 1]
    }

    /// The package segments (empty for the default package).
    pub fn package(&self) -> &[String] {
        &self.ancestry[..self.ancestry.len() - 1]
    }

    /// `::`-joined name, used for the C++ value alias.
    pub fn qualified_name(&self) -> String {
        self.ancestry.join(QUALIFIER)
    }

    /// `.`-joined Java name.
    pub fn dotted_name(&self) -> String {
        self.ancestry.join(".")
    }

    /// `_`-joined name, used when mangling overloads.
    pub fn mangled_name(&self) -> String {
        self.ancestry.join("_")
    }

    /// Qualified name of the C++ data layout struct, e.g. `pkg::__A`.
    pub fn struct_name(&self) -> String {
        self.prefixed(&format!("__{}", self.simple_name()))
    }

    /// Qualified name of the C++ vtable struct, e.g. `pkg::__A_VT`.
    pub fn vtable_name(&self) -> String {
        self.prefixed(&format!("__{}_VT", self.simple_name()))
    }

    fn prefixed(&self, last: &str) -> String {
        let mut parts: Vec<&str> = self.package().iter().map(String::as_str).collect();
        parts.push(last);
        parts.join(QUALIFIER)
    }

    /// True for `java::lang::Object`, `String` and `Class`.
    pub fn is_predefined(&self) -> bool {
        self.package().len() == 2
            && self.package()[0] == JAVA_LANG[0]
            && self.package()[1] == JAVA_LANG[1]
            && PREDEFINED.contains(&self.simple_name())
    }

    /// True for `java::lang::Object`.
    pub fn is_object(&self) -> bool {
        *self == Self::object()
    }
}

impl fmt::Display for QualifiedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dotted_name())
    }
}

/// Build a qualified type from name segments.
pub fn qualify(ancestry: &[&str]) -> Result<QualifiedType, TypeError> {
    QualifiedType::new(ancestry.iter().copied())
}

/// True when the type is one of the runtime's predefined classes.
pub fn is_predefined(ty: &QualifiedType) -> bool {
    ty.is_predefined()
}

// ============================================================================
// Types
// ============================================================================

/// A Java type as seen by the translator
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// A primitive, possibly as the element of an array
    Primitive {
        /// The primitive
        ty: PrimitiveType,
        /// Array nesting depth, 0 for a plain value
        dimensions: usize,
    },
    /// A class, possibly as the element of an array
    Qualified {
        /// The class name
        ty: QualifiedType,
        /// Array nesting depth, 0 for a plain reference
        dimensions: usize,
    },
    /// Type of the `null` literal
    Null,
}

impl Type {
    /// A plain primitive.
    pub fn primitive(ty: PrimitiveType) -> Self {
        Type::Primitive { ty, dimensions: 0 }
    }

    /// A plain class reference.
    pub fn qualified(ty: QualifiedType) -> Self {
        Type::Qualified { ty, dimensions: 0 }
    }

    /// `int`
    pub fn int() -> Self {
        Self::primitive(PrimitiveType::Int)
    }

    /// `boolean`
    pub fn boolean() -> Self {
        Self::primitive(PrimitiveType::Boolean)
    }

    /// `void`
    pub fn void() -> Self {
        Self::primitive(PrimitiveType::Void)
    }

    /// `java.lang.Object`
    pub fn object() -> Self {
        Self::qualified(QualifiedType::object())
    }

    /// `java.lang.String`
    pub fn string() -> Self {
        Self::qualified(QualifiedType::string())
    }

    /// `java.lang.Class`
    pub fn class() -> Self {
        Self::qualified(QualifiedType::class())
    }

    /// This type wrapped in `extra` more array dimensions.
    pub fn array_of(&self, extra: usize) -> Self {
        match self {
            Type::Primitive { ty, dimensions } => Type::Primitive {
                ty: *ty,
                dimensions: dimensions + extra,
            },
            Type::Qualified { ty, dimensions } => Type::Qualified {
                ty: ty.clone(),
                dimensions: dimensions + extra,
            },
            Type::Null => Type::Null,
        }
    }

    /// Array nesting depth.
    pub fn dimensions(&self) -> usize {
        match self {
            Type::Primitive { dimensions, .. } | Type::Qualified { dimensions, .. } => *dimensions,
            Type::Null => 0,
        }
    }

    /// True for arrays of any element type.
    pub fn is_array(&self) -> bool {
        self.dimensions() > 0
    }

    /// The type of one element of this array.
    pub fn element(&self) -> Result<Type, TypeError> {
        match self {
            Type::Primitive { ty, dimensions } if *dimensions > 0 => Ok(Type::Primitive {
                ty: *ty,
                dimensions: dimensions - 1,
            }),
            Type::Qualified { ty, dimensions } if *dimensions > 0 => Ok(Type::Qualified {
                ty: ty.clone(),
                dimensions: dimensions - 1,
            }),
            _ => Err(TypeError::NotAnArray { ty: self.to_string() }),
        }
    }

    /// The innermost element type, with no dimensions.
    pub fn base(&self) -> Type {
        match self {
            Type::Primitive { ty, .. } => Type::primitive(*ty),
            Type::Qualified { ty, .. } => Type::qualified(ty.clone()),
            Type::Null => Type::Null,
        }
    }

    /// The primitive of a non-array primitive type.
    pub fn as_primitive(&self) -> Option<PrimitiveType> {
        match self {
            Type::Primitive { ty, dimensions: 0 } => Some(*ty),
            _ => None,
        }
    }

    /// The class of a non-array class type.
    pub fn as_class(&self) -> Option<&QualifiedType> {
        match self {
            Type::Qualified { ty, dimensions: 0 } => Some(ty),
            _ => None,
        }
    }

    /// Classes, arrays and `null`.
    pub fn is_reference(&self) -> bool {
        !matches!(self, Type::Primitive { dimensions: 0, .. })
    }

    /// `void`
    pub fn is_void(&self) -> bool {
        self.as_primitive() == Some(PrimitiveType::Void)
    }

    /// `boolean`
    pub fn is_boolean(&self) -> bool {
        self.as_primitive() == Some(PrimitiveType::Boolean)
    }

    /// Numeric primitives.
    pub fn is_numeric(&self) -> bool {
        self.as_primitive().is_some_and(PrimitiveType::is_numeric)
    }

    /// `java.lang.String`
    pub fn is_string(&self) -> bool {
        self.as_class().is_some_and(|q| *q == QualifiedType::string())
    }

    /// Java spelling, e.g. `int[]` or `pkg.A`.
    pub fn java_name(&self) -> String {
        let (base, dims) = match self {
            Type::Primitive { ty, dimensions } => (ty.java_name().to_string(), *dimensions),
            Type::Qualified { ty, dimensions } => (ty.dotted_name(), *dimensions),
            Type::Null => return "null".to_string(),
        };
        format!("{}{}", base, "[]".repeat(dims))
    }

    /// Name fragment used when mangling overloaded method names.
    pub fn mangled_name(&self) -> String {
        let base = match self {
            Type::Primitive { ty, .. } => ty.java_name().to_string(),
            Type::Qualified { ty, .. } => ty.mangled_name(),
            Type::Null => "null".to_string(),
        };
        format!("{}{}", base, "_array".repeat(self.dimensions()))
    }

    /// C++ spelling of a variable of this type.
    pub fn cpp_name(&self) -> String {
        match self {
            Type::Primitive { ty, dimensions: 0 } => ty.native_name().to_string(),
            Type::Qualified { ty, dimensions: 0 } => ty.qualified_name(),
            Type::Null => QualifiedType::object().qualified_name(),
            _ => match self.element() {
                Ok(element) => template("__rt::Ptr", &template("__rt::Array", &element.cpp_name())),
                Err(_) => QualifiedType::object().qualified_name(),
            },
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.java_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_for_maps_every_java_primitive() {
        assert_eq!(primitive_for("long").unwrap(), "int64_t");
        assert_eq!(primitive_for("int").unwrap(), "int32_t");
        assert_eq!(primitive_for("short").unwrap(), "int16_t");
        assert_eq!(primitive_for("byte").unwrap(), "int8_t");
        assert_eq!(primitive_for("char").unwrap(), "char");
        assert_eq!(primitive_for("float").unwrap(), "float");
        assert_eq!(primitive_for("double").unwrap(), "double");
        assert_eq!(primitive_for("boolean").unwrap(), "bool");
        assert_eq!(primitive_for("void").unwrap(), "void");
    }

    #[test]
    fn test_primitive_for_unknown_name() {
        assert_eq!(
            primitive_for("String"),
            Err(TypeError::NotPrimitive { name: "String".to_string() })
        );
    }

    #[test]
    fn test_qualified_name_joins_ancestry() {
        let ty = qualify(&["qimpp", "tests", "Foo"]).unwrap();
        assert_eq!(ty.qualified_name(), "qimpp::tests::Foo");
        assert_eq!(ty.dotted_name(), "qimpp.tests.Foo");
        assert_eq!(ty.struct_name(), "qimpp::tests::__Foo");
        assert_eq!(ty.vtable_name(), "qimpp::tests::__Foo_VT");
        assert!(!is_predefined(&ty));
    }

    #[test]
    fn test_predefined_names_are_canonicalized() {
        for name in PREDEFINED {
            let bare = qualify(&[name]).unwrap();
            let full = QualifiedType::parse(&format!("java.lang.{}", name)).unwrap();
            assert_eq!(bare, full);
            assert_eq!(bare.qualified_name(), format!("java::lang::{}", name));
            assert!(is_predefined(&bare));
        }
    }

    #[test]
    fn test_predefined_name_in_user_package_is_not_canonicalized() {
        let ty = QualifiedType::parse("pkg.String").unwrap();
        assert_eq!(ty.qualified_name(), "pkg::String");
        assert!(!ty.is_predefined());
    }

    #[test]
    fn test_parse_accepts_both_separators() {
        assert_eq!(
            QualifiedType::parse("a::b::C").unwrap(),
            QualifiedType::parse("a.b.C").unwrap()
        );
        assert!(QualifiedType::parse("a..C").is_err());
    }

    #[test]
    fn test_array_types() {
        let ints = Type::int().array_of(2);
        assert_eq!(ints.dimensions(), 2);
        assert_eq!(ints.java_name(), "int[][]");
        assert_eq!(
            ints.cpp_name(),
            "__rt::Ptr<__rt::Array<__rt::Ptr<__rt::Array<int32_t> > > >"
        );
        assert_eq!(Type::int().array_of(1).cpp_name(), "__rt::Ptr<__rt::Array<int32_t> >");
        assert_eq!(ints.element().unwrap(), Type::int().array_of(1));
        assert!(ints.is_reference());
        assert!(Type::int().element().is_err());
    }

    #[test]
    fn test_template_spacing() {
        assert_eq!(template("__rt::Array", "int32_t"), "__rt::Array<int32_t>");
        assert_eq!(
            template("__rt::java_cast", "__rt::Ptr<__rt::Array<int32_t> >"),
            "__rt::java_cast<__rt::Ptr<__rt::Array<int32_t> > >"
        );
    }

    #[test]
    fn test_mangled_names() {
        assert_eq!(Type::string().mangled_name(), "java_lang_String");
        assert_eq!(Type::int().array_of(1).mangled_name(), "int_array");
    }

    #[test]
    fn test_widening() {
        assert!(PrimitiveType::Byte.widens_to(PrimitiveType::Int));
        assert!(PrimitiveType::Char.widens_to(PrimitiveType::Long));
        assert!(!PrimitiveType::Char.widens_to(PrimitiveType::Short));
        assert!(!PrimitiveType::Int.widens_to(PrimitiveType::Byte));
        assert!(!PrimitiveType::Boolean.widens_to(PrimitiveType::Int));
        assert_eq!(
            PrimitiveType::promote(PrimitiveType::Char, PrimitiveType::Char),
            PrimitiveType::Int
        );
    }
}
