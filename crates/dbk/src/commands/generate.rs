//! `dbk generate` command implementation.

use std::path::PathBuf;

use clap::Args;
use dbk_config::CliSettings;
use dbk_renderer::DocBookGenerator;

use super::load_inputs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the generate command.
#[derive(Args)]
pub(crate) struct GenerateArgs {
    /// Documentation model file (overrides config).
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Output directory for the DocBook files (overrides config).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Generate documentation for internal nodes too.
    #[arg(long)]
    show_internal: bool,

    /// Do not emit DocBook synopsis elements.
    #[arg(long)]
    no_extensions: bool,

    /// Path to configuration file (default: auto-discover dbk.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

/// Counts reported after a generate run.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct GenerateSummary {
    pub(crate) documents: usize,
    pub(crate) images: usize,
    pub(crate) diagnostics: usize,
}

impl GenerateArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let summary = self.run(&output)?;
        output.success(&format!(
            "Generated {} documents ({} images, {} diagnostics)",
            summary.documents, summary.images, summary.diagnostics
        ));
        Ok(())
    }

    fn settings(&self) -> CliSettings {
        CliSettings {
            model: self.model.clone(),
            output_dir: self.output_dir.clone(),
            use_extensions: self.no_extensions.then_some(false),
            show_internal: self.show_internal.then_some(true),
        }
    }

    fn run(&self, output: &Output) -> Result<GenerateSummary, CliError> {
        let (config, tree) = load_inputs(self.config.as_deref(), &self.settings())?;
        let generator_config = config.generator_config();
        let out_dir = &config.output_dir;

        output.info(&format!("Model: {}", config.input_resolved.model.display()));
        output.info(&format!("Output: {}", out_dir.display()));

        let documents = DocBookGenerator::new(&tree, &generator_config).generate_documentation();
        std::fs::create_dir_all(out_dir)?;

        let mut summary = GenerateSummary::default();
        for document in &documents {
            for diagnostic in &document.diagnostics {
                output.diagnostic(diagnostic);
            }
            summary.diagnostics += document.diagnostics.len();
            let path = document.write_to(out_dir)?;
            tracing::debug!(path = %path.display(), "wrote document");
            summary.images += document.copy_images(out_dir)?;
            summary.documents += 1;
        }

        tracing::info!(
            documents = summary.documents,
            images = summary.images,
            diagnostics = summary.diagnostics,
            "generation finished"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::commands::test_support::write_project;

    fn args(config: PathBuf) -> GenerateArgs {
        GenerateArgs {
            model: None,
            output_dir: None,
            show_internal: false,
            no_extensions: false,
            config: Some(config),
            verbose: false,
        }
    }

    #[test]
    fn test_generate_writes_documents() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_project(dir.path());

        let summary = args(config).run(&Output::new()).unwrap();
        assert_eq!(
            summary,
            GenerateSummary {
                documents: 2,
                images: 0,
                diagnostics: 1,
            }
        );

        let out = dir.path().join("out");
        let widget = std::fs::read_to_string(out.join("widget.xml")).unwrap();
        assert!(widget.contains("<db:title>Widget Class</db:title>"));
        assert!(widget.contains("<db:classsynopsis>"));
        let intro = std::fs::read_to_string(out.join("intro.xml")).unwrap();
        assert!(intro.contains("nowhere"));
        assert!(!intro.contains("xlink:href"));
    }

    #[test]
    fn test_generate_output_dir_override() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_project(dir.path());
        let target = dir.path().join("elsewhere");

        let mut args = args(config);
        args.output_dir = Some(target.clone());
        args.no_extensions = true;
        args.run(&Output::new()).unwrap();

        let widget = std::fs::read_to_string(target.join("widget.xml")).unwrap();
        assert!(!widget.contains("classsynopsis"));
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_generate_missing_model() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_project(dir.path());

        let mut args = args(config);
        args.model = Some(dir.path().join("missing.json"));
        let err = args.run(&Output::new()).unwrap_err();
        assert!(matches!(err, CliError::Model(_)));
    }
}
