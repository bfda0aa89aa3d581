//! CLI command implementations.

pub(crate) mod check;
pub(crate) mod generate;

pub(crate) use check::CheckArgs;
pub(crate) use generate::GenerateArgs;

use std::path::Path;

use dbk_config::{CliSettings, Config};
use dbk_model::DocTree;

use crate::error::CliError;

/// Load the configuration and the documentation model it points at.
pub(crate) fn load_inputs(
    config_path: Option<&Path>,
    settings: &CliSettings,
) -> Result<(Config, DocTree), CliError> {
    let config = Config::load(config_path, Some(settings))?;
    tracing::info!(model = %config.input_resolved.model.display(), "loading documentation model");
    let tree = DocTree::load(&config.input_resolved.model)?;
    Ok((config, tree))
}
