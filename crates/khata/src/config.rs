//! Report display configuration.
//!
//! Callers pass a [`ReportConfig`] to the human report. Apart from the
//! `NO_COLOR` convention, rendering reads no process state. The
//! configuration system supports:
//! - Bundled defaults (include_str! from khata.toml)
//! - User overrides (~/.config/khata/khata.toml, then ./khata.toml)
//! - Environment overrides (`KHATA_PATH_TRIM_PREFIX`,
//!   `KHATA_FUNCTION_TRIM_PREFIX`, `KHATA_COLOR`)

use std::io::IsTerminal;

use config::{Config, Environment, File, FileFormat};
use khata_error::{ConfigError, ConfigErrorKind, KhataResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Bundled default configuration.
const DEFAULT_CONFIG: &str = include_str!("../khata.toml");

/// Color only when stdout is a terminal that understands ANSI sequences.
fn default_color() -> bool {
    let terminal = std::io::stdout().is_terminal();
    #[cfg(windows)]
    let terminal = terminal && crossterm::ansi_support::supports_ansi();
    terminal
}

/// Display knobs for the human report.
///
/// # Example
///
/// ```toml
/// path_trim_prefix = "/home/me/src/app/"
/// function_trim_prefix = "app::"
/// color = false
/// ```
///
/// ```
/// use khata::ReportConfig;
///
/// let config = ReportConfig::default().with_path_trim_prefix("/home/me/src/app/");
/// assert_eq!(config.trim_path("/home/me/src/app/src/main.rs"), "src/main.rs");
/// assert_eq!(config.trim_path("/usr/lib/rust/core.rs"), "/usr/lib/rust/core.rs");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Prefix stripped from displayed file paths
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_trim_prefix: Option<String>,

    /// Prefix stripped from displayed function names
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_trim_prefix: Option<String>,

    /// Style the report with ANSI colors; defaults to whether stdout is a terminal
    #[serde(default = "default_color")]
    pub color: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            path_trim_prefix: None,
            function_trim_prefix: None,
            color: default_color(),
        }
    }
}

impl ReportConfig {
    /// A configuration producing unstyled, untrimmed output.
    pub fn plain() -> Self {
        Self {
            color: false,
            ..Self::default()
        }
    }

    /// Sets the file path prefix to strip.
    pub fn with_path_trim_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.path_trim_prefix = Some(prefix.into());
        self
    }

    /// Sets the function name prefix to strip.
    pub fn with_function_trim_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.function_trim_prefix = Some(prefix.into());
        self
    }

    /// Enables or disables styling.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// `path` without the configured prefix, or unchanged.
    pub fn trim_path<'a>(&self, path: &'a str) -> &'a str {
        trim(self.path_trim_prefix.as_deref(), path)
    }

    /// `function_name` without the configured prefix, or unchanged.
    pub fn trim_function<'a>(&self, function_name: &'a str) -> &'a str {
        trim(self.function_trim_prefix.as_deref(), function_name)
    }

    /// Load configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> KhataResult<Self> {
        debug!("Loading report configuration from file");

        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                ConfigError::new(ConfigErrorKind::Build(format!(
                    "{}: {}",
                    path.as_ref().display(),
                    e
                )))
            })?;
        Self::deserialize_from(config)
    }

    /// Load configuration with precedence: environment > user files > bundled default.
    ///
    /// Sources in order of precedence (later sources override earlier):
    /// 1. Bundled defaults (khata.toml shipped with the library)
    /// 2. User config in home directory (~/.config/khata/khata.toml)
    /// 3. User config in current directory (./khata.toml)
    /// 4. `KHATA_*` environment variables
    ///
    /// User config files are optional and silently skipped if not found.
    #[instrument]
    pub fn load() -> KhataResult<Self> {
        debug!("Loading report configuration with precedence: env > current dir > home dir > bundled defaults");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/khata/khata.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder
            .add_source(File::with_name("khata").required(false))
            .add_source(Environment::with_prefix("KHATA").try_parsing(true));

        let config = builder
            .build()
            .map_err(|e| ConfigError::new(ConfigErrorKind::Build(e.to_string())))?;
        Self::deserialize_from(config)
    }

    fn deserialize_from(config: Config) -> KhataResult<Self> {
        let report: ReportConfig = config
            .try_deserialize()
            .map_err(|e| ConfigError::new(ConfigErrorKind::Parse(e.to_string())))?;
        debug!(
            path_trim_prefix = ?report.path_trim_prefix,
            function_trim_prefix = ?report.function_trim_prefix,
            color = report.color,
            "Report configuration loaded"
        );
        Ok(report)
    }
}

fn trim<'a>(prefix: Option<&str>, text: &'a str) -> &'a str {
    match prefix {
        Some(prefix) if !prefix.is_empty() => text.strip_prefix(prefix).unwrap_or(text),
        _ => text,
    }
}
