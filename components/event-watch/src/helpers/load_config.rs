// Local crates
use crate::output::sink::OutputFormat;

// External crates
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::instrument;

/// Environment variable prefix, e.g. `EVENT_WATCH__ACCOUNT__AUTH_TOKEN`.
pub const ENV_PREFIX: &str = "EVENT_WATCH";
const ENV_SEPARATOR: &str = "__";

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub account: AccountConfig,
    pub api: ApiConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load the optional configuration file, then layer `EVENT_WATCH__*` environment
    /// variables on top of it. A missing file yields the defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::read(path.as_ref(), false)
    }

    /// Like [`Config::load`], but a missing file is an error.
    pub fn load_required<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::read(path.as_ref(), true)
    }

    #[instrument(
        name = "config_loader",
        target = "helpers::load_config",
        level = "trace",
        skip_all
    )]
    fn read(path_ref: &Path, required: bool) -> Result<Self> {
        tracing::trace!(
            configuration_file_path = %path_ref.display(),
            exists = path_ref.exists(),
            required,
            "Loading event-watch configuration"
        );

        let settings = match config::Config::builder()
            .add_source(
                config::File::from(path_ref)
                    .format(config::FileFormat::Toml)
                    .required(required),
            )
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()
        {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read configuration sources");
                return Err(e)
                    .with_context(|| format!("Failed to read config file at {:?}", path_ref));
            }
        };

        let config: Config = match settings.try_deserialize() {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::error!(error = %e, "Failed to parse configuration");
                return Err(e)
                    .with_context(|| format!("Failed to parse configuration from {:?}", path_ref));
            }
        };

        tracing::trace!(configuration_file_path = %path_ref.display(), "Configuration loaded successfully");
        Ok(config)
    }

    /// Copy of the configuration that is safe to print.
    pub fn redacted(&self) -> Self {
        let mut cfg = self.clone();
        if cfg.account.auth_token.is_some() {
            cfg.account.auth_token = Some("********".into());
        }
        cfg
    }

    /// Render the configuration as TOML, secrets masked.
    pub fn to_redacted_toml(&self) -> Result<String> {
        toml::to_string_pretty(&self.redacted()).context("Failed to render configuration as TOML")
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct AccountConfig {
    pub sid: Option<String>,
    pub auth_token: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub monitor_base_url: String,
    pub timeout_ms: u64,
    pub page_size: u32,
    pub max_pages: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.twilio.com".into(),
            monitor_base_url: "https://monitor.twilio.com".into(),
            timeout_ms: 10_000,
            page_size: 50,
            max_pages: 20,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub color: ColorMode,
}

/// When to bold column headings.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    pub fn enabled(&self, is_terminal: bool) -> bool {
        match self {
            ColorMode::Auto => is_terminal,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: Option<String>,
    pub json: bool,
    /// Also write a daily-rolling log file into this directory.
    pub directory: Option<String>,
}
