//! CLI configuration.
//!
//! Layered with the `config` crate, later sources winning:
//! built-in defaults, `divvy.toml` in the data directory, `DIVVY_*`
//! environment variables, then command-line flags.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use ::config::{Config, Environment, File};
use serde::Deserialize;

/// Name of the optional config file inside the data directory.
pub const CONFIG_FILE: &str = "divvy.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CliConfig {
    /// JSON snapshot of the token.
    pub state_path: PathBuf,
    /// Log level filter string (e.g. "info", "divvy_dividend=debug").
    pub log_level: String,
    /// `text` or `json`.
    pub log_format: String,
}

/// Values given on the command line. `None` leaves lower layers in charge.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub state_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_format: Option<String>,
}

impl CliConfig {
    /// Default data directory (`<platform data dir>/divvy`).
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("divvy")
    }

    pub fn load(overrides: &Overrides) -> Result<Self> {
        Self::load_from(&Self::default_data_dir(), overrides)
    }

    /// Load with `data_dir` as the location of defaults and the config file.
    pub fn load_from(data_dir: &Path, overrides: &Overrides) -> Result<Self> {
        let default_state = data_dir.join("state.json");
        let settings = Config::builder()
            .set_default("state_path", default_state.to_string_lossy().into_owned())?
            .set_default("log_level", "info")?
            .set_default("log_format", "text")?
            .add_source(File::from(data_dir.join(CONFIG_FILE)).required(false))
            .add_source(Environment::with_prefix("DIVVY"))
            .set_override_option(
                "state_path",
                overrides
                    .state_path
                    .as_ref()
                    .map(|p| p.to_string_lossy().into_owned()),
            )?
            .set_override_option("log_level", overrides.log_level.clone())?
            .set_override_option("log_format", overrides.log_format.clone())?
            .build()
            .context("failed to assemble configuration")?;

        let cfg: CliConfig = settings
            .try_deserialize()
            .context("invalid configuration")?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        if self.log_format != "text" && self.log_format != "json" {
            bail!("log_format must be \"text\" or \"json\", got {:?}", self.log_format);
        }
        Ok(())
    }
}
