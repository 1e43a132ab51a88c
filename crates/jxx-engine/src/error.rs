//! Translation errors
//!
//! Every semantic failure is fatal for the whole compilation. Each variant
//! names the offending symbol and carries the file and span used to render
//! the diagnostic.

use jxx_parser::{ParseError, Span};
use thiserror::Error;

/// Index of a source file in the translator's file set
pub type FileId = usize;

/// A fatal translation error
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CompileError {
    /// The source could not be parsed
    #[error("{error}")]
    Syntax {
        /// File with the error
        file: FileId,
        /// Parser error
        error: ParseError,
    },

    /// A type name that resolves to no class
    #[error("Unknown type '{name}'")]
    UnknownType {
        /// Name as written
        name: String,
        /// File
        file: FileId,
        /// Location
        span: Span,
    },

    /// A superclass that was never declared
    #[error("Superclass '{parent}' of '{class}' is never declared")]
    UnresolvedParent {
        /// Subclass
        class: String,
        /// Parent name as written
        parent: String,
        /// File
        file: FileId,
        /// Location of the `extends` clause
        span: Span,
    },

    /// A field lookup on a class that has no such field
    #[error("Class '{class}' has no field '{name}'")]
    UnknownField {
        /// Field name
        name: String,
        /// Searched class
        class: String,
        /// File
        file: FileId,
        /// Location
        span: Span,
    },

    /// A name that is neither a variable, a field, a class nor a package
    #[error("Cannot resolve symbol '{name}'")]
    UnresolvedName {
        /// Name as written
        name: String,
        /// File
        file: FileId,
        /// Location
        span: Span,
    },

    /// The entry point class has no `static void main(String[])`
    #[error("Class '{class}' has no method 'static void main(String[])'")]
    MissingMain {
        /// Class searched for the entry point
        class: String,
        /// File
        file: FileId,
        /// Location of the class
        span: Span,
    },

    /// No overload accepts the argument types
    #[error("No applicable method '{name}({args})' in class '{class}'")]
    NoApplicableMethod {
        /// Method name
        name: String,
        /// Searched class
        class: String,
        /// Argument types, comma separated
        args: String,
        /// File
        file: FileId,
        /// Location
        span: Span,
    },

    /// No constructor accepts the argument types
    #[error("No applicable constructor '{class}({args})'")]
    NoApplicableConstructor {
        /// Instantiated class
        class: String,
        /// Argument types, comma separated
        args: String,
        /// File
        file: FileId,
        /// Location
        span: Span,
    },

    /// Several applicable overloads and none is most specific
    #[error("Call to '{name}' is ambiguous")]
    AmbiguousCall {
        /// Method name
        name: String,
        /// Signatures of the maximal candidates
        candidates: Vec<String>,
        /// File
        file: FileId,
        /// Location
        span: Span,
    },

    /// A private member used outside its declaring class
    #[error("'{name}' has private access in '{class}'")]
    InaccessibleMember {
        /// Member name
        name: String,
        /// Declaring class
        class: String,
        /// File
        file: FileId,
        /// Location
        span: Span,
    },

    /// An instance member used where there is no `this`
    #[error("Instance member '{name}' cannot be referenced from a static context")]
    StaticContext {
        /// Member name, or `this`
        name: String,
        /// File
        file: FileId,
        /// Location
        span: Span,
    },

    /// A selector that cannot receive the selected member
    #[error("Invalid selector: {reason}")]
    InvalidSelector {
        /// What was wrong
        reason: String,
        /// File
        file: FileId,
        /// Location
        span: Span,
    },

    /// Operand types that do not fit the operation
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// Expected type or category
        expected: String,
        /// Actual type
        found: String,
        /// File
        file: FileId,
        /// Location
        span: Span,
    },

    /// A statement in a position where it has no meaning
    #[error("{what} is not allowed here")]
    Misplaced {
        /// The statement, e.g. `break`
        what: String,
        /// File
        file: FileId,
        /// Location
        span: Span,
    },

    /// A construct the translator does not handle
    #[error("{feature} are not supported")]
    Unsupported {
        /// Feature name, plural
        feature: String,
        /// File
        file: FileId,
        /// Location
        span: Span,
    },

    /// Two classes with the same qualified name
    #[error("Duplicate class '{name}'")]
    DuplicateClass {
        /// Qualified name
        name: String,
        /// File
        file: FileId,
        /// Location of the second declaration
        span: Span,
    },

    /// Two members with the same signature in one class
    #[error("Duplicate member '{name}' in class '{class}'")]
    DuplicateMember {
        /// Member signature
        name: String,
        /// Declaring class
        class: String,
        /// File
        file: FileId,
        /// Location of the second declaration
        span: Span,
    },

    /// A class that is its own ancestor
    #[error("Cyclic inheritance involving '{class}'")]
    CyclicInheritance {
        /// Class closing the cycle
        class: String,
        /// File
        file: FileId,
        /// Location
        span: Span,
    },

    /// A member incorporated without an owning class
    #[error("Member '{name}' declared outside of a class")]
    MemberOutsideClass {
        /// Member name
        name: String,
        /// File
        file: FileId,
        /// Location
        span: Span,
    },

    /// An override that changes a method between static and instance
    #[error("Method '{name}' in '{class}' cannot change static-ness of the method it overrides")]
    IncompatibleOverride {
        /// Method signature
        name: String,
        /// Overriding class
        class: String,
        /// File
        file: FileId,
        /// Location
        span: Span,
    },

    /// A concrete class that leaves an abstract method unimplemented
    #[error("Class '{class}' must implement abstract method '{method}'")]
    AbstractNotImplemented {
        /// Concrete class
        class: String,
        /// Method signature
        method: String,
        /// File
        file: FileId,
        /// Location of the class
        span: Span,
    },
}

impl CompileError {
    /// File the error points into.
    pub fn file(&self) -> FileId {
        use CompileError::*;

        match self {
            Syntax { file, .. }
            | UnknownType { file, .. }
            | UnresolvedParent { file, .. }
            | UnknownField { file, .. }
            | UnresolvedName { file, .. }
            | MissingMain { file, .. }
            | NoApplicableMethod { file, .. }
            | NoApplicableConstructor { file, .. }
            | AmbiguousCall { file, .. }
            | InaccessibleMember { file, .. }
            | StaticContext { file, .. }
            | InvalidSelector { file, .. }
            | TypeMismatch { file, .. }
            | Misplaced { file, .. }
            | Unsupported { file, .. }
            | DuplicateClass { file, .. }
            | DuplicateMember { file, .. }
            | CyclicInheritance { file, .. }
            | MemberOutsideClass { file, .. }
            | IncompatibleOverride { file, .. }
            | AbstractNotImplemented { file, .. } => *file,
        }
    }

    /// Location of the error.
    pub fn span(&self) -> Span {
        use CompileError::*;

        match self {
            Syntax { error, .. } => error.span,
            UnknownType { span, .. }
            | UnresolvedParent { span, .. }
            | UnknownField { span, .. }
            | UnresolvedName { span, .. }
            | MissingMain { span, .. }
            | NoApplicableMethod { span, .. }
            | NoApplicableConstructor { span, .. }
            | AmbiguousCall { span, .. }
            | InaccessibleMember { span, .. }
            | StaticContext { span, .. }
            | InvalidSelector { span, .. }
            | TypeMismatch { span, .. }
            | Misplaced { span, .. }
            | Unsupported { span, .. }
            | DuplicateClass { span, .. }
            | DuplicateMember { span, .. }
            | CyclicInheritance { span, .. }
            | MemberOutsideClass { span, .. }
            | IncompatibleOverride { span, .. }
            | AbstractNotImplemented { span, .. } => *span,
        }
    }

    /// Stable diagnostic code.
    ///
    /// `E0xxx` syntax, `E1xxx` unresolved references, `E2xxx` resolution,
    /// `E3xxx` structural consistency.
    pub fn code(&self) -> &'static str {
        use CompileError::*;

        match self {
            Syntax { .. } => "E0001",
            UnknownType { .. } => "E1001",
            UnresolvedParent { .. } => "E1002",
            UnknownField { .. } => "E1003",
            UnresolvedName { .. } => "E1004",
            MissingMain { .. } => "E1005",
            NoApplicableMethod { .. } => "E2001",
            NoApplicableConstructor { .. } => "E2002",
            AmbiguousCall { .. } => "E2003",
            InaccessibleMember { .. } => "E2004",
            StaticContext { .. } => "E2005",
            InvalidSelector { .. } => "E2006",
            TypeMismatch { .. } => "E2007",
            Misplaced { .. } => "E2008",
            Unsupported { .. } => "E2009",
            DuplicateClass { .. } => "E3001",
            DuplicateMember { .. } => "E3002",
            CyclicInheritance { .. } => "E3003",
            MemberOutsideClass { .. } => "E3004",
            IncompatibleOverride { .. } => "E3005",
            AbstractNotImplemented { .. } => "E3006",
        }
    }
}

/// Shorthand for engine results.
pub type CompileResult<T> = Result<T, CompileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_by_category() {
        let span = Span::new(3, 7, 1, 4);
        let unknown = CompileError::UnknownType {
            name: "Foo".to_string(),
            file: 2,
            span,
        };
        assert_eq!(unknown.code(), "E1001");
        assert_eq!(unknown.file(), 2);
        assert_eq!(unknown.span(), span);
        assert_eq!(unknown.to_string(), "Unknown type 'Foo'");

        let dup = CompileError::DuplicateClass {
            name: "p.A".to_string(),
            file: 0,
            span,
        };
        assert!(dup.code().starts_with("E3"));
    }
}
