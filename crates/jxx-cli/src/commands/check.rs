//! `jxx check`: parse and analyze without emitting.

use jxx_engine::{Translator, TranslatorConfig};
use std::path::PathBuf;
use termcolor::ColorChoice;

use super::{load_sources, report};
use crate::output::StyledOutput;

pub fn execute(files: Vec<PathBuf>, config: TranslatorConfig, color: ColorChoice) -> anyhow::Result<()> {
    let mut translator = Translator::new(config);
    load_sources(&mut translator, &files)?;

    let table = translator.check().map_err(|errors| report(&translator, &errors, color))?;
    let classes = table.iter().filter(|k| !k.predefined).count();
    StyledOutput::new(color).success(
        "Checked",
        &format!(
            "{} file{}, {} class{}",
            files.len(),
            if files.len() == 1 { "" } else { "s" },
            classes,
            if classes == 1 { "" } else { "es" }
        ),
    );
    Ok(())
}
