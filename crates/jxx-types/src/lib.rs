//! Jxx Type Model
//!
//! Primitive and class types of the translated Java subset, their C++
//! spellings, and the subtyping queries the resolver relies on.

#![warn(missing_docs)]

pub mod error;
pub mod subtyping;
pub mod ty;

pub use error::TypeError;
pub use subtyping::{inherits_from, is_convertible, is_subtype, ClassHierarchy};
pub use ty::{is_predefined, primitive_for, qualify, template, PrimitiveType, QualifiedType, Type};
pub use ty::{JAVA_LANG, PREDEFINED, QUALIFIER};
