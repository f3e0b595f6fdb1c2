//! Configuration management for braindump.
//!
//! Parses `braindump.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! ```toml
//! [content]
//! dev_dir = "_posts"
//! prod_dir = ".."
//! suffix = ".md"
//!
//! [pipeline]
//! on_error = "abort"
//! ```
//!
//! Relative directories are resolved against the directory holding the
//! config file (or the current directory when there is none).
//!
//! ## Mode
//!
//! Documents are read from `dev_dir` in [`Mode::Development`] and from
//! `prod_dir` in [`Mode::Production`]. Development mode is selected by a
//! non-empty `BRAINDUMP_DEV` environment variable or by [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! `content.dev_dir` and `content.prod_dir` support `${VAR}` and
//! `${VAR:-default}`.

mod expand;

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "braindump.toml";

/// Environment variable selecting development mode.
pub const DEV_ENV_VAR: &str = "BRAINDUMP_DEV";

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the detected mode.
    pub mode: Option<Mode>,
    /// Read documents from this directory regardless of mode.
    pub source_dir: Option<PathBuf>,
    /// Override the per-document failure policy.
    pub on_error: Option<OnError>,
}

/// Where documents are read from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// Local drafts directory.
    Development,
    /// Published content directory.
    #[default]
    Production,
}

impl Mode {
    /// Detect the mode from the value of [`DEV_ENV_VAR`].
    #[must_use]
    pub fn detect(dev_var: Option<&str>) -> Self {
        match dev_var {
            Some(value) if !value.is_empty() => Self::Development,
            _ => Self::Production,
        }
    }

    /// Detect the mode from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::detect(std::env::var(DEV_ENV_VAR).ok().as_deref())
    }
}

/// What happens when one document fails to load.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnError {
    /// Fail the whole load.
    #[default]
    Abort,
    /// Leave the document out and continue.
    Skip,
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Content configuration (paths are relative strings from TOML).
    content: ContentConfigRaw,
    /// Pipeline configuration.
    pub pipeline: PipelineConfig,

    /// Resolved content configuration (set after loading).
    #[serde(skip)]
    pub content_resolved: ContentConfig,
    /// Active mode (set after loading).
    #[serde(skip)]
    pub mode: Mode,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Raw content configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ContentConfigRaw {
    dev_dir: Option<String>,
    prod_dir: Option<String>,
    suffix: Option<String>,
}

/// Resolved content configuration with absolute paths.
#[derive(Debug, Default)]
pub struct ContentConfig {
    /// Directory read in development mode.
    pub dev_dir: PathBuf,
    /// Directory read in production mode.
    pub prod_dir: PathBuf,
    /// Explicit directory overriding both (from the CLI).
    pub source_override: Option<PathBuf>,
    /// Source file suffix, including the dot.
    pub suffix: String,
}

/// Pipeline configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Per-document failure policy.
    pub on_error: OnError,
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
        /// Config field path (e.g., "`content.dev_dir`").
        field: String,
        /// Error message (e.g., "${`NOTES`} not set").
        message: String,
    },
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `braindump.toml` in current directory and parents.
    /// The mode comes from the environment unless CLI settings override it.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or validation fails.
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

        config.mode = Mode::from_env();
        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Directory to read documents from.
    #[must_use]
    pub fn source_dir(&self) -> &Path {
        if let Some(dir) = &self.content_resolved.source_override {
            return dir;
        }
        match self.mode {
            Mode::Development => &self.content_resolved.dev_dir,
            Mode::Production => &self.content_resolved.prod_dir,
        }
    }

    /// Source file suffix (e.g., ".md").
    #[must_use]
    pub fn suffix(&self) -> &str {
        &self.content_resolved.suffix
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(mode) = settings.mode {
            self.mode = mode;
        }
        if let Some(source_dir) = &settings.source_dir {
            self.content_resolved.source_override = Some(source_dir.clone());
        }
        if let Some(on_error) = settings.on_error {
            self.pipeline.on_error = on_error;
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
        let mut config = Self::default();
        config.resolve_paths(base);
        config
    }

    /// Load configuration from a specific file.
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
        let suffix = &self.content_resolved.suffix;
        if !suffix.starts_with('.') || suffix.len() < 2 {
            return Err(ConfigError::Validation(format!(
                "content.suffix must be a dot followed by an extension, got {suffix:?}"
            )));
        }
        if suffix.contains('/') {
            return Err(ConfigError::Validation(
                "content.suffix cannot contain '/'".to_owned(),
            ));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref dir) = self.content.dev_dir {
            self.content.dev_dir = Some(expand::expand_env(dir, "content.dev_dir")?);
        }
        if let Some(ref dir) = self.content.prod_dir {
            self.content.prod_dir = Some(expand::expand_env(dir, "content.prod_dir")?);
        }
        Ok(())
    }

    /// Resolve relative paths against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        self.content_resolved = ContentConfig {
            dev_dir: resolve(self.content.dev_dir.as_deref(), "_posts"),
            prod_dir: resolve(self.content.prod_dir.as_deref(), ".."),
            source_override: None,
            suffix: self
                .content
                .suffix
                .clone()
                .unwrap_or_else(|| ".md".to_owned()),
        };
    }
}
