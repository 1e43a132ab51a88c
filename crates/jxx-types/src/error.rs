//! Type model errors

use thiserror::Error;

/// Errors raised while building or querying types
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TypeError {
    /// A Java name that is not one of the eight primitives or `void`
    #[error("Not a primitive type: {name}")]
    NotPrimitive {
        /// The name that was looked up
        name: String,
    },

    /// A qualified name with an empty segment or no segments at all
    #[error("Malformed qualified name: '{name}'")]
    MalformedName {
        /// The offending name
        name: String,
    },

    /// Element type requested for a non-array type
    #[error("Type {ty} is not an array")]
    NotAnArray {
        /// Display form of the type
        ty: String,
    },
}
