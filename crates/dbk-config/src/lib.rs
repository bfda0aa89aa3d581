//! Configuration management for the DocBook generator.
//!
//! Parses `dbk.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `project.name`
//! - `project.description`
//! - `project.version`

mod expand;

use dbk_renderer::GeneratorConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the documentation model file.
    pub model: Option<PathBuf>,
    /// Override the output directory.
    pub output_dir: Option<PathBuf>,
    /// Override the synopsis extension flag.
    pub use_extensions: Option<bool>,
    /// Override the internal documentation flag.
    pub show_internal: Option<bool>,
}

/// Configuration filename to search for.
pub const CONFIG_FILENAME: &str = "dbk.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project metadata written into every document header.
    pub project: ProjectConfig,
    /// Input configuration (paths are relative strings from TOML).
    input: InputConfigRaw,
    /// Output configuration (paths are relative strings from TOML).
    output: OutputConfigRaw,
    /// DocBook output options.
    pub docbook: DocBookConfig,

    /// Resolved input configuration (set after loading).
    #[serde(skip)]
    pub input_resolved: InputConfig,
    /// Resolved output directory (set after loading).
    #[serde(skip)]
    pub output_dir: PathBuf,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Project metadata.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Project name, used as product name and to qualify versions.
    pub name: String,
    /// Description written as title abbreviation and fallback abstract.
    pub description: Option<String>,
    /// Version written as edition.
    pub version: Option<String>,
    /// Value of `xml:lang`.
    pub language: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: None,
            version: None,
            language: "en".to_owned(),
        }
    }
}

/// Raw input configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct InputConfigRaw {
    model: Option<String>,
    image_dirs: Option<Vec<String>>,
}

/// Resolved input configuration with absolute paths.
#[derive(Debug, Default)]
pub struct InputConfig {
    /// JSON documentation model.
    pub model: PathBuf,
    /// Directories searched for images referenced by the documentation.
    pub image_dirs: Vec<PathBuf>,
}

/// Raw output configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct OutputConfigRaw {
    dir: Option<String>,
}

/// DocBook output options.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DocBookConfig {
    /// Emit DocBook synopsis elements for reference nodes.
    pub use_extensions: bool,
    /// Generate documentation for internal nodes.
    pub show_internal: bool,
    /// Override of the per-kind heading level offset.
    pub heading_offset: Option<i32>,
}

impl Default for DocBookConfig {
    fn default() -> Self {
        Self {
            use_extensions: true,
            show_internal: false,
            heading_offset: None,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`project.version`").
        field: String,
        /// Error message (e.g., "${`ACME_VERSION`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `dbk.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(model) = &settings.model {
            self.input_resolved.model.clone_from(model);
        }
        if let Some(output_dir) = &settings.output_dir {
            self.output_dir.clone_from(output_dir);
        }
        if let Some(use_extensions) = settings.use_extensions {
            self.docbook.use_extensions = use_extensions;
        }
        if let Some(show_internal) = settings.show_internal {
            self.docbook.show_internal = show_internal;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            project: ProjectConfig::default(),
            input: InputConfigRaw::default(),
            output: OutputConfigRaw::default(),
            docbook: DocBookConfig::default(),
            input_resolved: InputConfig {
                model: base.join("docs.json"),
                image_dirs: Vec::new(),
            },
            output_dir: base.join("docbook"),
            config_path: None,
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.project.name, "project.name")?;
        require_non_empty(&self.project.language, "project.language")?;
        if self.docbook.heading_offset.is_some_and(|offset| offset < 0) {
            return Err(ConfigError::Validation(
                "docbook.heading_offset cannot be negative".to_owned(),
            ));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.project.name = expand::expand_env(&self.project.name, "project.name")?;
        self.project.description =
            expand::expand_env_opt(self.project.description.as_deref(), "project.description")?;
        self.project.version =
            expand::expand_env_opt(self.project.version.as_deref(), "project.version")?;
        Ok(())
    }

    /// Resolve relative paths against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        self.input_resolved = InputConfig {
            model: resolve(self.input.model.as_deref(), "docs.json"),
            image_dirs: self
                .input
                .image_dirs
                .iter()
                .flatten()
                .map(|dir| config_dir.join(dir))
                .collect(),
        };
        self.output_dir = resolve(self.output.dir.as_deref(), "docbook");
    }

    /// Generator settings for this configuration.
    #[must_use]
    pub fn generator_config(&self) -> GeneratorConfig {
        let mut config = GeneratorConfig::new(self.project.name.clone())
            .with_extensions(self.docbook.use_extensions)
            .with_image_dirs(self.input_resolved.image_dirs.clone());
        config.natural_language.clone_from(&self.project.language);
        config.show_internal = self.docbook.show_internal;
        if let Some(description) = &self.project.description {
            config = config.with_description(description.clone());
        }
        if let Some(version) = &self.project.version {
            config = config.with_build_version(version.clone());
        }
        if let Some(offset) = self.docbook.heading_offset {
            config = config.with_heading_offset(offset);
        }
        config
    }
}
