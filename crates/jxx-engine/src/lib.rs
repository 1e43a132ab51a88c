//! Jxx Translation Engine
//!
//! Translates a Java subset into C++ built on a small runtime.
//!
//! This crate provides:
//! - The class table: declared classes, their members and the inheritance tree
//! - Overload resolution and the body rewrite into explicitly typed trees
//! - Lowering to a C++ object model with explicit vtables
//! - Header and implementation emitters
//! - Diagnostics and configuration
//!
//! # Usage
//!
//! ```ignore
//! use jxx_engine::{Translator, TranslatorConfig};
//!
//! let mut translator = Translator::new(TranslatorConfig::default());
//! translator.add_source("Main.java", source);
//! let artifacts = translator.translate()?;
//! artifacts.write_to(Path::new("out"))?;
//! ```

#![warn(missing_docs)]

pub mod analyzer;
pub mod body;
pub mod config;
pub mod diagnostic;
pub mod emit;
pub mod error;
pub mod inheritance;
pub mod lower;
pub mod model;
pub mod names;
pub mod pipeline;
pub mod pretty;
pub mod resolve;
pub mod table;

// Re-export main types
pub use analyzer::{Analyzer, SourceUnit};
pub use config::{ConfigError, TranslatorConfig, CONFIG_FILE};
pub use diagnostic::{Diagnostic, SourceFiles};
pub use error::{CompileError, CompileResult, FileId};
pub use lower::CppUnit;
pub use model::{ClassId, Klass};
pub use pipeline::{Artifacts, Translator};
pub use pretty::PrettyPrint;
pub use table::ClassTable;
