//! Names and type expressions

use crate::token::Span;
use jxx_types::PrimitiveType;

/// An identifier occurrence.
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    /// The name
    pub name: String,
    /// Location
    pub span: Span,
}

impl Identifier {
    /// Create an identifier.
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// A dotted name such as `java.lang.String`.
#[derive(Debug, Clone, PartialEq)]
pub struct QualifiedName {
    /// Segments in order
    pub segments: Vec<Identifier>,
    /// Location
    pub span: Span,
}

impl QualifiedName {
    /// The segment names.
    pub fn names(&self) -> Vec<String> {
        self.segments.iter().map(|s| s.name.clone()).collect()
    }

    /// `.`-joined form.
    pub fn dotted(&self) -> String {
        self.names().join(".")
    }

    /// The last segment.
    pub fn last(&self) -> &str {
        self.segments.last().map(|s| s.name.as_str()).unwrap_or("")
    }
}

/// Base of a written type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExprKind {
    /// A primitive keyword, `void` included
    Primitive(PrimitiveType),
    /// A class name, simple or dotted
    Named(QualifiedName),
}

/// A type as written in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeExpr {
    /// The element type
    pub kind: TypeExprKind,
    /// Number of `[]` pairs
    pub dimensions: usize,
    /// Location
    pub span: Span,
}

impl TypeExpr {
    /// Same type with `extra` more dimensions.
    pub fn with_extra_dimensions(&self, extra: usize) -> TypeExpr {
        TypeExpr {
            kind: self.kind.clone(),
            dimensions: self.dimensions + extra,
            span: self.span,
        }
    }

    /// Source spelling, e.g. `String[]`.
    pub fn display_name(&self) -> String {
        let base = match &self.kind {
            TypeExprKind::Primitive(p) => p.java_name().to_string(),
            TypeExprKind::Named(name) => name.dotted(),
        };
        format!("{}{}", base, "[]".repeat(self.dimensions))
    }

    /// True for the `void` keyword.
    pub fn is_void(&self) -> bool {
        matches!(self.kind, TypeExprKind::Primitive(PrimitiveType::Void)) && self.dimensions == 0
    }
}
