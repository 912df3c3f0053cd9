//! Configuration management for octohl.
//!
//! Parses `octohl.toml` configuration files with serde and provides
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
//! - `cache.dir`
//! - `highlight.pygmentize`
//! - `include.href_base`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override highlight cache directory.
    pub cache_dir: Option<PathBuf>,
    /// Override pygmentize program.
    pub pygmentize: Option<String>,
    /// Override base URL for included file download links.
    pub href_base: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "octohl.toml";

/// Default cache directory, relative to the config file.
const DEFAULT_CACHE_DIR: &str = "tmp/pygments-cache";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Cache configuration (paths are relative strings from TOML).
    cache: CacheConfigRaw,
    /// Highlighter configuration.
    pub highlight: HighlightConfig,
    /// `include` command configuration.
    pub include: IncludeConfig,

    /// Resolved cache configuration (set after loading).
    #[serde(skip)]
    pub cache_resolved: CacheConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw cache configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct CacheConfigRaw {
    dir: Option<String>,
}

/// Resolved cache configuration with absolute paths.
#[derive(Debug, Default)]
pub struct CacheConfig {
    /// Directory holding highlighted fragments.
    pub dir: PathBuf,
}

/// Highlighter configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// `pygmentize` program name or path.
    pub pygmentize: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            pygmentize: "pygmentize".to_owned(),
        }
    }
}

/// `include` command configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct IncludeConfig {
    /// Base URL prepended to file names for download links.
    pub href_base: Option<String>,
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
        /// Config field path (e.g., "`cache.dir`").
        field: String,
        /// Error message (e.g., "${`CACHE_DIR`} not set").
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
    /// Otherwise, searches for `octohl.toml` in current directory and parents.
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
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(cache_dir) = &settings.cache_dir {
            self.cache_resolved.dir.clone_from(cache_dir);
        }
        if let Some(pygmentize) = &settings.pygmentize {
            self.highlight.pygmentize.clone_from(pygmentize);
        }
        if let Some(href_base) = &settings.href_base {
            self.include.href_base = Some(href_base.clone());
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
            cache: CacheConfigRaw::default(),
            highlight: HighlightConfig::default(),
            include: IncludeConfig::default(),
            cache_resolved: CacheConfig {
                dir: base.join(DEFAULT_CACHE_DIR),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        // Validate configuration after loading and resolution
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file and after applying CLI
    /// settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.highlight.pygmentize, "highlight.pygmentize")?;
        if self.cache_resolved.dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation("cache.dir cannot be empty".to_owned()));
        }
        self.validate_include()?;
        Ok(())
    }

    /// Validate include configuration.
    fn validate_include(&self) -> Result<(), ConfigError> {
        if let Some(ref href_base) = self.include.href_base {
            require_non_empty(href_base, "include.href_base")?;
            if !href_base.starts_with("http://")
                && !href_base.starts_with("https://")
                && !href_base.starts_with('/')
            {
                return Err(ConfigError::Validation(
                    "include.href_base must start with http://, https:// or /".to_owned(),
                ));
            }
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref dir) = self.cache.dir {
            self.cache.dir = Some(expand::expand_env(dir, "cache.dir")?);
        }

        self.highlight.pygmentize =
            expand::expand_env(&self.highlight.pygmentize, "highlight.pygmentize")?;

        if let Some(ref href_base) = self.include.href_base {
            self.include.href_base = Some(expand::expand_env(href_base, "include.href_base")?);
        }

        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.cache_resolved = CacheConfig {
            dir: config_dir.join(self.cache.dir.as_deref().unwrap_or(DEFAULT_CACHE_DIR)),
        };
    }
}
