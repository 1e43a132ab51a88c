//! Class model
//!
//! In-memory representation of classes and their members. Classes live in
//! the [`ClassTable`](crate::table::ClassTable) arena and refer to each other
//! through [`ClassId`] handles; member bodies stay in the table's body store
//! and are referred to through [`BodyId`] handles.

mod klass;
mod member;
pub mod predefined;

pub use klass::Klass;
pub use member::{incorporate, Conflict, Constructor, Field, Incorporated, Member, Method, Param};

use jxx_parser::ast::{AccessModifier, CompilationUnit};
use jxx_types::QualifiedType;

/// Handle of a class in the class table arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(pub u32);

impl ClassId {
    /// Arena index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle of a stored method, constructor or initializer body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub u32);

impl BodyId {
    /// Body store index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Java access level of a class or member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    /// `public`
    Public,
    /// `protected`
    Protected,
    /// No modifier
    #[default]
    Package,
    /// `private`
    Private,
}

impl From<Option<AccessModifier>> for Visibility {
    fn from(access: Option<AccessModifier>) -> Self {
        match access {
            Some(AccessModifier::Public) => Visibility::Public,
            Some(AccessModifier::Protected) => Visibility::Protected,
            Some(AccessModifier::Private) => Visibility::Private,
            None => Visibility::Package,
        }
    }
}

/// Names visible to the declarations of one compilation unit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scope {
    /// Package segments, empty for the default package
    pub package: Vec<String>,
    /// `import a.b.C;`
    pub single_imports: Vec<QualifiedType>,
    /// `import a.b.*;`, package segments only
    pub wildcard_imports: Vec<Vec<String>>,
}

impl Scope {
    /// Collect the package and imports of a unit.
    ///
    /// Single-type imports that do not form a valid qualified name are
    /// dropped here; the analyzer reports the use site instead.
    pub fn from_unit(unit: &CompilationUnit) -> Self {
        let package = unit.package.as_ref().map(|p| p.names()).unwrap_or_default();
        let mut scope = Scope {
            package,
            ..Scope::default()
        };
        for import in &unit.imports {
            if import.wildcard {
                scope.wildcard_imports.push(import.name.names());
            } else if let Ok(name) = QualifiedType::new(import.name.names()) {
                scope.single_imports.push(name);
            }
        }
        scope
    }

    /// Scope of the runtime's own classes.
    pub fn java_lang() -> Self {
        Scope {
            package: jxx_types::JAVA_LANG.iter().map(|s| s.to_string()).collect(),
            ..Scope::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jxx_parser::parse_compilation_unit;

    #[test]
    fn test_scope_from_unit() {
        let unit = parse_compilation_unit(
            "package a.b; import c.D; import e.*; class X {}",
        )
        .unwrap();
        let scope = Scope::from_unit(&unit);
        assert_eq!(scope.package, vec!["a", "b"]);
        assert_eq!(scope.single_imports, vec![QualifiedType::parse("c.D").unwrap()]);
        assert_eq!(scope.wildcard_imports, vec![vec!["e".to_string()]]);
    }

    #[test]
    fn test_visibility_from_modifier() {
        assert_eq!(Visibility::from(None), Visibility::Package);
        assert_eq!(
            Visibility::from(Some(AccessModifier::Private)),
            Visibility::Private
        );
    }
}
