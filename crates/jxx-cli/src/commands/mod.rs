//! Subcommand implementations.

pub mod check;
pub mod translate;

use anyhow::Context;
use jxx_engine::{CompileError, Diagnostic, Translator};
use std::path::PathBuf;
use termcolor::ColorChoice;

use crate::output::StyledOutput;

/// Read every file into the translator, in command-line order.
pub fn load_sources(translator: &mut Translator, files: &[PathBuf]) -> anyhow::Result<()> {
    for path in files {
        let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        translator.add_source(path.display().to_string(), text);
    }
    Ok(())
}

/// Render `errors` to stderr and turn them into the command's failure.
pub fn report(translator: &Translator, errors: &[CompileError], color: ColorChoice) -> anyhow::Error {
    for error in errors {
        if let Err(render) = Diagnostic::from_compile_error(error).emit(translator.files(), color) {
            tracing::warn!(%render, "could not render diagnostic");
            eprintln!("error[{}]: {}", error.code(), error);
        }
    }
    let count = errors.len();
    StyledOutput::new(color).failure("Failed", &format!("{} error{}", count, if count == 1 { "" } else { "s" }));
    anyhow::anyhow!("translation failed")
}
