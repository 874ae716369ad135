use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::money::Money;

pub const ENV_PREFIX: &str = "MOCKMART";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub log_level: String,
    /// Units of every item available to one purchase session.
    pub default_stock: u32,
    pub password_length: usize,
    /// Wallet top-up choices, in whole naira.
    pub funding_options: Vec<u64>,
}

impl Settings {
    pub fn funding_amounts(&self) -> Vec<Money> {
        self.funding_options
            .iter()
            .map(|&naira| Money::from_naira(naira))
            .collect()
    }

    pub fn log_file(&self) -> PathBuf {
        self.data_dir.join("mockmart.log")
    }
}

/// Reads `mockmart.toml` from the user config directory, creating an empty
/// one on first run, then applies `MOCKMART_*` variables and `data_dir`.
pub fn load_config(data_dir: Option<PathBuf>) -> Result<Settings> {
    let config_file = match dirs_next::config_dir() {
        Some(mut config_dir) => {
            config_dir.push("mockmart");
            config_dir.push("mockmart.toml");
            config_dir
        }
        None => bail!("Could not find or create config file!"),
    };

    if !config_file.exists() {
        if let Some(parent) = config_file.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("could not create {}", parent.display()))?;
        }
        std::fs::File::create(&config_file)
            .with_context(|| format!("could not create {}", config_file.display()))?;
    }

    build_settings(Some(&config_file), data_dir)
}

pub fn build_settings(config_file: Option<&Path>, data_dir: Option<PathBuf>) -> Result<Settings> {
    build_settings_from(config_file, data_dir, None)
}

/// Like [`build_settings`], reading `MOCKMART_*` pairs from `env` instead of
/// the process environment when given.
pub fn build_settings_from(
    config_file: Option<&Path>,
    data_dir: Option<PathBuf>,
    env: Option<config::Map<String, String>>,
) -> Result<Settings> {
    let default_data_dir = match dirs_next::data_local_dir() {
        Some(mut dir) => {
            dir.push("mockmart");
            dir
        }
        None => PathBuf::from("data"),
    };

    let mut builder = config::Config::builder()
        .set_default("data_dir", default_data_dir.to_string_lossy().to_string())?
        .set_default("log_level", "info")?
        .set_default("default_stock", 10i64)?
        .set_default("password_length", 16i64)?
        .set_default("funding_options", vec![10000i64, 20000, 50000, 100000])?;

    if let Some(path) = config_file {
        builder = builder.add_source(config::File::from(path).required(false));
    }

    let settings = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .source(env),
        )
        .set_override_option(
            "data_dir",
            data_dir.map(|d| d.to_string_lossy().to_string()),
        )?
        .build()
        .context("could not assemble configuration")?;

    settings
        .try_deserialize::<Settings>()
        .context("invalid configuration")
}
