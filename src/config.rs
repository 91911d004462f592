use crate::presale::{Currency, RateTable};
use chrono::{DateTime, Utc};
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::warn;
use url::Url;

const APP_DIR: &str = "presale-tui";
const CONFIG_FILE: &str = "config.json";

pub const CONFIG_ENV: &str = "PRESALE_TUI_CONFIG";
pub const URL_ENV: &str = "PRESALE_TUI_URL";
pub const DATA_DIR_ENV: &str = "PRESALE_TUI_DATA_DIR";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid {currency} minimum \"{value}\" in config file {path}")]
    InvalidMinimum {
        path: PathBuf,
        currency: Currency,
        value: String,
    },
    #[error("invalid landing URL \"{value}\"")]
    LandingUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub token_symbol: String,
    /// Base location used for generated links when no landing URL is given.
    pub page_url: Url,
    pub sale_ends_at: DateTime<Utc>,
    pub referral_reward: u64,
    /// How long the inbound referral banner stays up.
    pub notification_secs: u64,
    pub rates: RateTable,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            token_symbol: "WLFG".into(),
            page_url: Url::parse("https://presale.example/").expect("static URL is valid"),
            sale_ends_at: DateTime::parse_from_rfc3339("2025-07-20T12:00:00-04:00")
                .expect("static timestamp is valid")
                .with_timezone(&Utc),
            referral_reward: 2_500,
            notification_secs: 8,
            rates: RateTable::default(),
        }
    }
}

impl Config {
    /// `$PRESALE_TUI_CONFIG` if set, then `<config dir>/presale-tui/config.json`
    /// if it exists, otherwise built-in defaults.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(explicit) = std::env::var(CONFIG_ENV) {
            return Self::from_path(explicit);
        }
        match dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE)) {
            Some(path) if path.exists() => Self::from_path(path),
            _ => Ok(Self::default()),
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();
        let raw = fs::read(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config: Config = serde_json::from_slice(&raw).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        if let Some((currency, value)) = config.rates.invalid_minimum() {
            return Err(ConfigError::InvalidMinimum {
                path,
                currency,
                value: value.to_string(),
            });
        }
        if config.rates.bonus_bps > 10_000 {
            warn!(bonus_bps = config.rates.bonus_bps, "bonus exceeds the base allocation");
        }
        Ok(config)
    }

    /// Picks the URL the session was opened with: the CLI argument, then
    /// `$PRESALE_TUI_URL`, then `page_url`.
    pub fn landing_url(&self, arg: Option<&str>) -> Result<Url, ConfigError> {
        let env = std::env::var(URL_ENV).ok();
        resolve_landing_url(arg, env.as_deref(), &self.page_url)
    }
}

fn resolve_landing_url(
    arg: Option<&str>,
    env: Option<&str>,
    fallback: &Url,
) -> Result<Url, ConfigError> {
    match arg.or(env).map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => Url::parse(value).map_err(|source| ConfigError::LandingUrl {
            value: value.to_string(),
            source,
        }),
        None => Ok(fallback.clone()),
    }
}

/// Where log files go.
pub fn data_dir() -> Result<PathBuf> {
    let explicit = std::env::var(DATA_DIR_ENV).map(PathBuf::from);
    let path = match explicit {
        Ok(path) => path,
        Err(_) => {
            let mut root = dirs::data_local_dir()
                .unwrap_or(std::env::current_dir()?)
                .join(APP_DIR);
            if cfg!(debug_assertions) {
                root = root.join("dev");
            }
            root
        }
    };
    Ok(path)
}
