//! `jxx translate`: Java sources to a C++ header and implementation.

use anyhow::Context;
use jxx_engine::{PrettyPrint, Translator, TranslatorConfig};
use std::path::PathBuf;
use termcolor::ColorChoice;

use super::{load_sources, report};
use crate::output::StyledOutput;

/// Flags of `jxx translate`
pub struct TranslateOptions {
    pub print_input: bool,
    pub print_lowered: bool,
    pub write: bool,
    pub out_dir: Option<PathBuf>,
}

pub fn execute(
    files: Vec<PathBuf>,
    options: TranslateOptions,
    mut config: TranslatorConfig,
    color: ColorChoice,
) -> anyhow::Result<()> {
    if let Some(dir) = options.out_dir {
        config.output.directory = dir;
    }
    let directory = config.output.directory.clone();

    let mut translator = Translator::new(config);
    load_sources(&mut translator, &files)?;

    if options.print_input {
        let units = translator.parse().map_err(|errors| report(&translator, &errors, color))?;
        for ((_, unit), path) in units.iter().zip(&files) {
            println!("// {}", path.display());
            println!("{}", unit.pretty_print());
        }
    }

    let artifacts = translator.translate().map_err(|errors| report(&translator, &errors, color))?;

    if options.print_lowered {
        println!("{}", artifacts.lowered.pretty_print());
    }

    if options.write {
        let written = artifacts
            .write_to(&directory)
            .with_context(|| format!("writing to {}", directory.display()))?;
        let mut out = StyledOutput::new(color);
        for path in written {
            out.success("Wrote", &path.display().to_string());
        }
    } else if !options.print_input && !options.print_lowered {
        print!("{}", artifacts.header);
        println!();
        print!("{}", artifacts.implementation);
    }
    Ok(())
}
