//! Diagnostic rendering
//!
//! Turns [`CompileError`]s into codespan diagnostics with error codes,
//! labels, notes and help, rendered to a terminal or as JSON.

use codespan_reporting::diagnostic::{Diagnostic as CsDiagnostic, Label, LabelStyle, Severity};
use codespan_reporting::files::{Files, SimpleFiles};
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream, WriteColor};
use jxx_parser::{ParseErrorKind, Span};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{CompileError, FileId};

/// The source files a translation reads, indexed by [`FileId`]
pub type SourceFiles = SimpleFiles<String, String>;

/// Error code for a diagnostic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorCode(pub &'static str);

impl ErrorCode {
    /// The code text, e.g. `E2003`.
    pub fn as_str(&self) -> &str {
        self.0
    }
}

/// A diagnostic message with source code context
pub struct Diagnostic {
    inner: CsDiagnostic<FileId>,
    code: Option<ErrorCode>,
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Diagnostic {
            inner: CsDiagnostic::new(severity).with_message(message),
            code: None,
        }
    }

    /// Create an error diagnostic
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Set the error code
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.inner = self.inner.with_code(code.0);
        self.code = Some(code);
        self
    }

    /// Add a primary label (main error location)
    pub fn with_primary_label(mut self, file: FileId, span: Span, message: impl Into<String>) -> Self {
        self.inner
            .labels
            .push(Label::primary(file, span.start..span.end).with_message(message));
        self
    }

    /// Add a note (additional context)
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.inner.notes.push(note.into());
        self
    }

    /// Add a help suggestion
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.inner.notes.push(format!("help: {}", help.into()));
        self
    }

    /// Create diagnostic from a CompileError
    pub fn from_compile_error(error: &CompileError) -> Self {
        use CompileError::*;

        let file = error.file();
        let span = error.span();
        let diag = Diagnostic::error(error.to_string()).with_code(ErrorCode(error.code()));

        match error {
            Syntax { error: parse, .. } => {
                let diag = diag.with_primary_label(file, span, "here");
                match &parse.kind {
                    ParseErrorKind::Unsupported { .. } => {
                        diag.with_note("the translator accepts a subset of Java without generics, interfaces or exceptions")
                    }
                    _ => diag,
                }
            }

            UnknownType { .. } => diag
                .with_primary_label(file, span, "type not found")
                .with_help("declare the class in one of the translated files or import it"),

            UnresolvedParent { parent, .. } => diag
                .with_primary_label(file, span, format!("'{}' is not declared", parent))
                .with_help("every superclass must be part of the translation"),

            UnknownField { .. } => diag.with_primary_label(file, span, "field not found"),

            UnresolvedName { .. } => diag.with_primary_label(file, span, "not found in this scope"),

            MissingMain { .. } => diag
                .with_primary_label(file, span, "entry point class")
                .with_help("declare 'public static void main(String[] args)' or set translate.main_class"),

            NoApplicableMethod { .. } | NoApplicableConstructor { .. } => {
                diag.with_primary_label(file, span, "no overload accepts these arguments")
            }

            AmbiguousCall { candidates, .. } => diag
                .with_primary_label(file, span, "more than one overload is most specific")
                .with_note(format!("candidates: {}", candidates.join(", ")))
                .with_help("cast an argument to select one overload"),

            InaccessibleMember { .. } => diag.with_primary_label(file, span, "private member"),

            StaticContext { .. } => diag
                .with_primary_label(file, span, "no 'this' in a static context")
                .with_help("qualify the member with an instance, or make it static"),

            InvalidSelector { .. } => diag.with_primary_label(file, span, "invalid selector"),

            TypeMismatch { expected, found, .. } => {
                diag.with_primary_label(file, span, format!("expected {}, found {}", expected, found))
            }

            Misplaced { .. } => diag.with_primary_label(file, span, "not allowed here"),

            Unsupported { .. } => diag.with_primary_label(file, span, "unsupported"),

            DuplicateClass { .. } => diag.with_primary_label(file, span, "duplicate declaration"),

            DuplicateMember { .. } => diag.with_primary_label(file, span, "duplicate declaration"),

            CyclicInheritance { .. } => diag
                .with_primary_label(file, span, "cycle closes here")
                .with_note("a class cannot be its own ancestor"),

            MemberOutsideClass { .. } => diag.with_primary_label(file, span, "no enclosing class"),

            IncompatibleOverride { .. } => diag
                .with_primary_label(file, span, "overriding declaration")
                .with_note("static and instance methods cannot override each other"),

            AbstractNotImplemented { .. } => diag
                .with_primary_label(file, span, "concrete class")
                .with_help("implement the method or declare the class abstract"),
        }
    }

    /// Emit the diagnostic to stderr
    pub fn emit(&self, files: &SourceFiles, color: ColorChoice) -> Result<(), codespan_reporting::files::Error> {
        let mut writer = StandardStream::stderr(color);
        self.emit_to(&mut writer, files)
    }

    /// Emit the diagnostic to any color-capable writer
    pub fn emit_to(&self, writer: &mut dyn WriteColor, files: &SourceFiles) -> Result<(), codespan_reporting::files::Error> {
        let config = term::Config::default();
        term::emit(writer, &config, files, &self.inner)
    }

    /// Get the underlying codespan diagnostic (for testing/custom rendering)
    pub fn inner(&self) -> &CsDiagnostic<FileId> {
        &self.inner
    }

    /// The error code, if any
    pub fn code(&self) -> Option<&ErrorCode> {
        self.code.as_ref()
    }

    /// Convert to JSON representation for IDE integration
    pub fn to_json(&self, files: &SourceFiles) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&JsonDiagnostic::from_diagnostic(self, files))
    }
}

/// JSON representation of a diagnostic for IDE integration
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonDiagnostic {
    /// Error code (e.g., "E2001")
    pub code: Option<String>,
    /// Severity level
    pub severity: String,
    /// Main error message
    pub message: String,
    /// Source locations with labels
    pub labels: Vec<JsonLabel>,
    /// Additional notes and help
    pub notes: Vec<String>,
}

/// JSON representation of a diagnostic label
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonLabel {
    /// File path
    pub file: String,
    /// Start line (1-indexed)
    pub start_line: usize,
    /// Start column (1-indexed)
    pub start_column: usize,
    /// End line (1-indexed)
    pub end_line: usize,
    /// End column (1-indexed)
    pub end_column: usize,
    /// Label message
    pub message: String,
    /// Label style (primary or secondary)
    pub style: String,
}

impl JsonDiagnostic {
    /// Convert a Diagnostic to JSON representation
    pub fn from_diagnostic(diag: &Diagnostic, files: &SourceFiles) -> Self {
        let severity = match diag.inner.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
            Severity::Help => "help",
            Severity::Bug => "bug",
        };

        // Labels pointing outside the known files are dropped
        let labels = diag
            .inner
            .labels
            .iter()
            .filter_map(|label| {
                let file = files.get(label.file_id).ok()?;
                let start = file.location((), label.range.start).ok()?;
                let end = file.location((), label.range.end).ok()?;
                Some(JsonLabel {
                    file: file.name().to_string(),
                    start_line: start.line_number,
                    start_column: start.column_number,
                    end_line: end.line_number,
                    end_column: end.column_number,
                    message: label.message.clone(),
                    style: match label.style {
                        LabelStyle::Primary => "primary",
                        LabelStyle::Secondary => "secondary",
                    }
                    .to_string(),
                })
            })
            .collect();

        JsonDiagnostic {
            code: diag.code.as_ref().map(|c| c.0.to_string()),
            severity: severity.to_string(),
            message: diag.inner.message.clone(),
            labels,
            notes: diag.inner.notes.clone(),
        }
    }
}

/// Helper to create a file set holding one source
pub fn create_files(path: impl Into<PathBuf>, source: impl Into<String>) -> SourceFiles {
    let mut files = SimpleFiles::new();
    files.add(path.into().display().to_string(), source.into());
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use codespan_reporting::term::termcolor::NoColor;

    fn ambiguous() -> CompileError {
        CompileError::AmbiguousCall {
            name: "f".to_string(),
            candidates: vec!["f(int, long)".to_string(), "f(long, int)".to_string()],
            file: 0,
            span: Span::new(21, 28, 1, 22),
        }
    }

    #[test]
    fn test_code_and_notes() {
        let diag = Diagnostic::from_compile_error(&ambiguous());
        assert_eq!(diag.code(), Some(&ErrorCode("E2003")));
        assert_eq!(diag.inner().severity, Severity::Error);
        assert!(diag.inner().notes[0].contains("f(int, long)"));
    }

    #[test]
    fn test_render_to_text() {
        let files = create_files("A.java", "class A { void g() { f(1, 2); } }");
        let diag = Diagnostic::from_compile_error(&ambiguous());
        let mut out = NoColor::new(Vec::new());
        diag.emit_to(&mut out, &files).unwrap();
        let text = String::from_utf8(out.into_inner()).unwrap();
        assert!(text.contains("error[E2003]"));
        assert!(text.contains("A.java:1:22"));
    }

    #[test]
    fn test_json_labels() {
        let files = create_files("A.java", "class A { void g() { f(1, 2); } }");
        let diag = Diagnostic::from_compile_error(&ambiguous());
        let json = diag.to_json(&files).unwrap();
        assert!(json.contains("\"E2003\""));
        assert!(json.contains("\"start_column\": 22"));
        assert!(json.contains("\"style\": \"primary\""));
    }
}
