//! Configuration management for mdpress.
//!
//! Parses `mdpress.toml` configuration files with serde and provides
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
//! - `diagrams.kroki_url`
//! - `pdf.rasterizer`

mod expand;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override Kroki URL for diagram rendering.
    pub kroki_url: Option<String>,
    /// Override the page theme name for paginated output.
    pub theme: Option<String>,
    /// Override the rasterizer program.
    pub rasterizer: Option<String>,
    /// Override the syntax highlighting flag.
    pub highlight_enabled: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "mdpress.toml";

/// Theme names accepted by `pdf.theme`.
const THEME_NAMES: &[&str] = &["default", "professional", "minimal"];

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Diagram rendering configuration (optional section).
    /// When present, `kroki_url` is required.
    diagrams: Option<DiagramsConfigRaw>,
    /// Paginated (PDF) output configuration.
    pub pdf: PdfConfig,
    /// Syntax highlighting configuration.
    pub highlight: HighlightConfig,

    /// Resolved diagrams configuration (set after loading).
    #[serde(skip)]
    pub diagrams_resolved: DiagramsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Raw diagrams configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DiagramsConfigRaw {
    kroki_url: Option<String>,
    format: Option<String>,
    dpi: Option<u32>,
    timeout_secs: Option<u64>,
}

/// Resolved diagram rendering configuration.
#[derive(Debug)]
pub struct DiagramsConfig {
    /// Kroki server URL. `None` disables diagram rendering.
    pub kroki_url: Option<String>,
    /// Output format requested from Kroki (`svg` or `png`).
    pub format: String,
    /// DPI the diagrams are rendered at.
    pub dpi: u32,
    /// HTTP timeout per diagram request.
    pub timeout: Duration,
}

impl Default for DiagramsConfig {
    fn default() -> Self {
        Self {
            kroki_url: None,
            format: "svg".to_owned(),
            dpi: 192,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Paginated output configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Default page theme name.
    pub theme: String,
    /// HTML-to-image program used for rasterization.
    pub rasterizer: String,
    /// Extra arguments passed to the rasterizer before the input/output paths.
    pub rasterizer_args: Vec<String>,
    /// Page margin in millimetres.
    pub margin_mm: f64,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            theme: "default".to_owned(),
            rasterizer: "wkhtmltoimage".to_owned(),
            rasterizer_args: Vec::new(),
            margin_mm: 10.0,
        }
    }
}

/// Syntax highlighting configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// Whether fenced code blocks are highlighted.
    pub enabled: bool,
    /// Highlighting theme name.
    pub theme: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            theme: "InspiredGitHub".to_owned(),
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
        /// Config field path (e.g., "`diagrams.kroki_url`").
        field: String,
        /// Error message (e.g., "${`KROKI_URL`} not set").
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

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `mdpress.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading, allowing CLI arguments to take
    /// precedence over config file values. The merged result is validated again.
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
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(kroki_url) = &settings.kroki_url {
            self.diagrams_resolved.kroki_url = Some(kroki_url.clone());
        }
        if let Some(theme) = &settings.theme {
            self.pdf.theme.clone_from(theme);
        }
        if let Some(rasterizer) = &settings.rasterizer {
            self.pdf.rasterizer.clone_from(rasterizer);
        }
        if let Some(enabled) = settings.highlight_enabled {
            self.highlight.enabled = enabled;
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

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before resolution
        config.expand_env_vars()?;
        config.resolve()?;
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_diagrams()?;
        self.validate_pdf()?;
        require_non_empty(&self.highlight.theme, "highlight.theme")?;
        Ok(())
    }

    /// Validate diagrams configuration.
    fn validate_diagrams(&self) -> Result<(), ConfigError> {
        const MAX_DPI: u32 = 1000;

        let diagrams = &self.diagrams_resolved;
        if let Some(ref kroki_url) = diagrams.kroki_url {
            require_non_empty(kroki_url, "diagrams.kroki_url")?;
            require_http_url(kroki_url, "diagrams.kroki_url")?;
        }

        if diagrams.format != "svg" && diagrams.format != "png" {
            return Err(ConfigError::Validation(format!(
                "diagrams.format must be \"svg\" or \"png\", got \"{}\"",
                diagrams.format
            )));
        }

        if diagrams.dpi == 0 {
            return Err(ConfigError::Validation(
                "diagrams.dpi must be greater than 0".to_owned(),
            ));
        }
        if diagrams.dpi > MAX_DPI {
            return Err(ConfigError::Validation(format!(
                "diagrams.dpi cannot exceed {MAX_DPI}"
            )));
        }

        if diagrams.timeout.is_zero() {
            return Err(ConfigError::Validation(
                "diagrams.timeout_secs must be greater than 0".to_owned(),
            ));
        }

        Ok(())
    }

    /// Validate paginated output configuration.
    fn validate_pdf(&self) -> Result<(), ConfigError> {
        if !THEME_NAMES.contains(&self.pdf.theme.as_str()) {
            return Err(ConfigError::Validation(format!(
                "pdf.theme must be one of {}, got \"{}\"",
                THEME_NAMES.join(", "),
                self.pdf.theme
            )));
        }
        require_non_empty(&self.pdf.rasterizer, "pdf.rasterizer")?;
        if !(0.0..50.0).contains(&self.pdf.margin_mm) {
            return Err(ConfigError::Validation(
                "pdf.margin_mm must be in the range 0..50".to_owned(),
            ));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref mut diagrams) = self.diagrams
            && let Some(ref url) = diagrams.kroki_url
        {
            diagrams.kroki_url = Some(expand::expand_env(url, "diagrams.kroki_url")?);
        }

        self.pdf.rasterizer = expand::expand_env(&self.pdf.rasterizer, "pdf.rasterizer")?;

        Ok(())
    }

    /// Resolve raw sections into their final form.
    ///
    /// Validates that `kroki_url` is provided when `[diagrams]` section exists.
    fn resolve(&mut self) -> Result<(), ConfigError> {
        let defaults = DiagramsConfig::default();
        self.diagrams_resolved = match &self.diagrams {
            Some(diagrams) => {
                let kroki_url = diagrams.kroki_url.clone().ok_or_else(|| {
                    ConfigError::Validation(
                        "[diagrams] section requires kroki_url to be set".to_owned(),
                    )
                })?;
                DiagramsConfig {
                    kroki_url: Some(kroki_url),
                    format: diagrams.format.clone().unwrap_or(defaults.format),
                    dpi: diagrams.dpi.unwrap_or(defaults.dpi),
                    timeout: diagrams
                        .timeout_secs
                        .map_or(defaults.timeout, Duration::from_secs),
                }
            }
            None => defaults,
        };

        Ok(())
    }
}
