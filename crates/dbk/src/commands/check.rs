//! `dbk check` command implementation.

use std::path::PathBuf;

use clap::Args;
use dbk_config::CliSettings;
use dbk_renderer::{DocBookGenerator, Severity, check_well_formed};

use super::load_inputs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the check command.
#[derive(Args)]
pub(crate) struct CheckArgs {
    /// Documentation model file (overrides config).
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Check internal nodes too.
    #[arg(long)]
    show_internal: bool,

    /// Treat warnings as errors.
    #[arg(long)]
    strict: bool,

    /// Path to configuration file (default: auto-discover dbk.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

/// Problems found by a check run.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct CheckReport {
    pub(crate) documents: usize,
    pub(crate) warnings: usize,
    pub(crate) errors: usize,
}

impl CheckArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let report = self.run(&output)?;
        let failures = if self.strict {
            report.errors + report.warnings
        } else {
            report.errors
        };
        if failures > 0 {
            return Err(CliError::Validation(format!(
                "{} errors and {} warnings in {} documents",
                report.errors, report.warnings, report.documents
            )));
        }
        output.success(&format!(
            "Checked {} documents ({} warnings)",
            report.documents, report.warnings
        ));
        Ok(())
    }

    fn run(&self, output: &Output) -> Result<CheckReport, CliError> {
        let settings = CliSettings {
            model: self.model.clone(),
            show_internal: self.show_internal.then_some(true),
            ..CliSettings::default()
        };
        let (config, tree) = load_inputs(self.config.as_deref(), &settings)?;
        let generator_config = config.generator_config();
        let documents = DocBookGenerator::new(&tree, &generator_config).generate_documentation();

        let mut report = CheckReport::default();
        for document in &documents {
            report.documents += 1;
            for diagnostic in &document.diagnostics {
                output.diagnostic(diagnostic);
                match diagnostic.severity {
                    Severity::Warning => report.warnings += 1,
                    Severity::Error => report.errors += 1,
                }
            }
            if document.forced_closes > 0 {
                output.warning(&format!(
                    "{}: {} elements closed at end of document",
                    document.file_name, document.forced_closes
                ));
                report.warnings += 1;
            }
            for (name, opened, closed) in document.balance.unbalanced() {
                output.error(&format!(
                    "{}: element {name} opened {opened} times but closed {closed} times",
                    document.file_name
                ));
                report.errors += 1;
            }
            if let Err(err) = check_well_formed(&document.content) {
                output.error(&format!("{}: not well-formed: {err}", document.file_name));
                report.errors += 1;
            }
        }
        Ok(report)
    }
}
