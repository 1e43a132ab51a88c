//! Translation pipeline
//!
//! Parse, analyze, rewrite bodies, lower, emit. Parsing collects every
//! syntax error of every file; from analysis on, the first error aborts the
//! translation and nothing is emitted.

use crate::analyzer::{Analyzer, SourceUnit};
use crate::body::rewrite_bodies;
use crate::config::TranslatorConfig;
use crate::diagnostic::SourceFiles;
use crate::emit::{emit_header, emit_implementation};
use crate::error::{CompileError, CompileResult, FileId};
use crate::lower::{lower, CppUnit};
use crate::model::ClassId;
use crate::table::ClassTable;
use jxx_parser::ast::CompilationUnit;
use jxx_parser::{parse_compilation_unit, Span};
use jxx_types::{QualifiedType, Type};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// The generated files of one translation
#[derive(Debug, Clone, PartialEq)]
pub struct Artifacts {
    /// Header file name
    pub header_name: String,
    /// Header text
    pub header: String,
    /// Implementation file name
    pub implementation_name: String,
    /// Implementation text
    pub implementation: String,
    /// The lowered model both files were printed from
    pub lowered: CppUnit,
}

impl Artifacts {
    /// Write both files into `dir`, creating it if needed.
    ///
    /// Returns the written paths, header first.
    pub fn write_to(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;
        let mut written = Vec::with_capacity(2);
        for (name, text) in [
            (&self.header_name, &self.header),
            (&self.implementation_name, &self.implementation),
        ] {
            let path = dir.join(name);
            std::fs::write(&path, text)?;
            debug!(target: "jxx::pipeline", path = %path.display(), bytes = text.len(), "wrote artifact");
            written.push(path);
        }
        Ok(written)
    }
}

/// Translates a set of Java sources into one header and one
/// implementation file
#[derive(Debug)]
pub struct Translator {
    config: TranslatorConfig,
    files: SourceFiles,
    sources: Vec<String>,
}

impl Translator {
    /// Create a translator with no sources.
    pub fn new(config: TranslatorConfig) -> Self {
        Self {
            config,
            files: SourceFiles::new(),
            sources: Vec::new(),
        }
    }

    /// The configuration in use.
    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    /// Sources added so far, for rendering diagnostics.
    pub fn files(&self) -> &SourceFiles {
        &self.files
    }

    /// Add a source file. Files are translated in the order they are added.
    pub fn add_source(&mut self, name: impl Into<String>, text: impl Into<String>) -> FileId {
        let text = text.into();
        let id = self.files.add(name.into(), text.clone());
        self.sources.push(text);
        id
    }

    /// Parse every source, reporting all syntax errors at once.
    pub fn parse(&self) -> Result<Vec<(FileId, CompilationUnit)>, Vec<CompileError>> {
        let mut units = Vec::with_capacity(self.sources.len());
        let mut errors = Vec::new();
        for (file, source) in self.sources.iter().enumerate() {
            match parse_compilation_unit(source) {
                Ok(unit) => units.push((file, unit)),
                Err(parse_errors) => {
                    errors.extend(parse_errors.into_iter().map(|error| CompileError::Syntax { file, error }))
                }
            }
        }
        info!(target: "jxx::pipeline", files = self.sources.len(), errors = errors.len(), "parsed sources");
        if errors.is_empty() {
            Ok(units)
        } else {
            Err(errors)
        }
    }

    /// Build the class table without rewriting any body.
    pub fn check(&self) -> Result<ClassTable, Vec<CompileError>> {
        let units = self.parse()?;
        self.analyze(&units).map_err(|e| vec![e])
    }

    /// Run the whole pipeline.
    pub fn translate(&self) -> Result<Artifacts, Vec<CompileError>> {
        let units = self.parse()?;
        self.translate_units(&units).map_err(|e| vec![e])
    }

    fn analyze(&self, units: &[(FileId, CompilationUnit)]) -> CompileResult<ClassTable> {
        let sources: Vec<SourceUnit<'_>> = units.iter().map(|(file, ast)| SourceUnit { file: *file, ast }).collect();
        let mut analyzer = Analyzer::new();
        analyzer.analyze(&sources)?;
        analyzer.finish()
    }

    fn translate_units(&self, units: &[(FileId, CompilationUnit)]) -> CompileResult<Artifacts> {
        let table = self.analyze(units)?;
        let bodies = rewrite_bodies(&table, self.config.translate.access_checks)?;
        info!(target: "jxx::pipeline", classes = bodies.len(), "rewrote bodies");

        let main = self.entry_point(&table)?;
        let lowered = lower(&table, &bodies, main);
        info!(
            target: "jxx::pipeline",
            classes = lowered.classes.len(),
            arrays = lowered.arrays.len(),
            main = lowered.main.is_some(),
            "lowered"
        );

        let output = &self.config.output;
        let header = emit_header(&lowered, &output.header, &output.runtime_header);
        let implementation = emit_implementation(&lowered, &output.header);
        info!(
            target: "jxx::pipeline",
            header_bytes = header.len(),
            implementation_bytes = implementation.len(),
            "emitted"
        );

        Ok(Artifacts {
            header_name: output.header.clone(),
            header,
            implementation_name: output.implementation.clone(),
            implementation,
            lowered,
        })
    }

    /// The method `int main` forwards to, if one is wanted.
    fn entry_point(&self, table: &ClassTable) -> CompileResult<Option<(ClassId, usize)>> {
        let translate = &self.config.translate;
        if !translate.emit_main {
            return Ok(None);
        }

        let Some(name) = &translate.main_class else {
            let found = table
                .iter()
                .filter(|k| !k.predefined && k.file.is_some())
                .find_map(|k| main_method(table, k.id).map(|index| (k.id, index)));
            debug!(target: "jxx::pipeline", found = found.is_some(), "searched for an entry point");
            return Ok(found);
        };

        let unknown = || CompileError::UnknownType {
            name: name.clone(),
            file: 0,
            span: Span::default(),
        };
        let qualified = QualifiedType::parse(name).map_err(|_| unknown())?;
        let class = table.lookup(&qualified).ok_or_else(unknown)?;
        let klass = table.get(class);
        match main_method(table, class) {
            Some(index) => Ok(Some((class, index))),
            None => Err(CompileError::MissingMain {
                class: klass.name.dotted_name(),
                file: klass.file.unwrap_or_default(),
                span: klass.span,
            }),
        }
    }
}

/// Slot of `static void main(String[])` in the class's method list.
fn main_method(table: &ClassTable, class: ClassId) -> Option<usize> {
    let klass = table.get(class);
    let index = klass.method_index("main", &[Type::string().array_of(1)])?;
    let method = &klass.methods[index];
    (method.is_static && method.return_type == Type::void()).then_some(index)
}
