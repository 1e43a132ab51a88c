//! Abstract syntax tree for the Java subset
//!
//! Every grammar category is a closed enum and every node carries its
//! [`Span`]. Declarations live here; statements, expressions and type
//! expressions live in the submodules.

mod expression;
mod statement;
mod types;

pub use expression::*;
pub use statement::*;
pub use types::*;

use crate::token::Span;

/// A whole source file.
#[derive(Debug, Clone, PartialEq)]
pub struct CompilationUnit {
    /// `package a.b;`, absent for the default package
    pub package: Option<QualifiedName>,
    /// Import declarations in source order
    pub imports: Vec<ImportDecl>,
    /// Top-level class declarations
    pub classes: Vec<ClassDecl>,
    /// Whole file
    pub span: Span,
}

/// `import a.b.C;` or `import a.b.*;`
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    /// Imported name, without the trailing `.*`
    pub name: QualifiedName,
    /// True for on-demand imports
    pub wildcard: bool,
    /// Location
    pub span: Span,
}

/// Java access modifier keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessModifier {
    /// `public`
    Public,
    /// `protected`
    Protected,
    /// `private`
    Private,
}

/// Modifiers on a class or member declaration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Modifiers {
    /// Access keyword, `None` for package access
    pub access: Option<AccessModifier>,
    /// `static`
    pub is_static: bool,
    /// `final`
    pub is_final: bool,
    /// `abstract`
    pub is_abstract: bool,
    /// Annotation names that were skipped, e.g. `Override`
    pub annotations: Vec<String>,
}

/// A class declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    /// Modifiers
    pub modifiers: Modifiers,
    /// Simple name
    pub name: Identifier,
    /// `extends` clause
    pub extends: Option<TypeExpr>,
    /// Members in source order
    pub members: Vec<MemberDecl>,
    /// Location
    pub span: Span,
}

/// A member of a class body.
#[derive(Debug, Clone, PartialEq)]
pub enum MemberDecl {
    /// Field declaration, possibly with several declarators
    Field(FieldDecl),
    /// Method declaration
    Method(MethodDecl),
    /// Constructor declaration
    Constructor(ConstructorDecl),
    /// Nested class declaration
    Class(ClassDecl),
}

impl MemberDecl {
    /// Get the span of this member
    pub fn span(&self) -> &Span {
        match self {
            MemberDecl::Field(f) => &f.span,
            MemberDecl::Method(m) => &m.span,
            MemberDecl::Constructor(c) => &c.span,
            MemberDecl::Class(c) => &c.span,
        }
    }
}

/// `int x = 1, y;`
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    /// Modifiers
    pub modifiers: Modifiers,
    /// Declared type
    pub ty: TypeExpr,
    /// One entry per declared name
    pub declarators: Vec<VariableDeclarator>,
    /// Location
    pub span: Span,
}

/// One name of a field or local declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclarator {
    /// Declared name
    pub name: Identifier,
    /// Extra dimensions written after the name (`int a[]`)
    pub dimensions: usize,
    /// Initializer expression
    pub initializer: Option<Expression>,
    /// Location
    pub span: Span,
}

/// A method declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    /// Modifiers
    pub modifiers: Modifiers,
    /// Return type, `void` included
    pub return_type: TypeExpr,
    /// Method name
    pub name: Identifier,
    /// Formal parameters
    pub params: Vec<Parameter>,
    /// Body, absent for abstract and native methods
    pub body: Option<Block>,
    /// Location
    pub span: Span,
}

/// A constructor declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructorDecl {
    /// Modifiers
    pub modifiers: Modifiers,
    /// Class name as written
    pub name: Identifier,
    /// Formal parameters
    pub params: Vec<Parameter>,
    /// Body
    pub body: Block,
    /// Location
    pub span: Span,
}

/// A formal parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// Declared type
    pub ty: TypeExpr,
    /// Parameter name
    pub name: Identifier,
    /// Location
    pub span: Span,
}
