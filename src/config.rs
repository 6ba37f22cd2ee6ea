use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use log::info;
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// File consulted for configuration, relative to the working directory.
pub const CONFIG_FILE: &str = "VoteClient.toml";

/// Prefix of environment variables that override the config file.
pub const ENV_PREFIX: &str = "VOTE_CLIENT_";

/// Application configuration, derived from `VoteClient.toml` and
/// `VOTE_CLIENT_*` environment variables. Resolved once at startup and
/// handed to everything that talks to the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    api_base_url: String,
    poll_interval_secs: u64,
    session_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8000".to_string(),
            poll_interval_secs: 5,
            session_file: PathBuf::from("vote-client-session.json"),
        }
    }
}

impl Config {
    /// Load the config from defaults, the config file and the environment,
    /// in increasing order of precedence.
    pub fn load() -> Result<Self> {
        Self::from_figment(
            Figment::from(Serialized::defaults(Config::default()))
                .merge(Toml::file(CONFIG_FILE))
                .merge(Env::prefixed(ENV_PREFIX)),
        )
    }

    /// Extract and validate a config from an arbitrary figment.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Config = figment.extract()?;
        config.validate()?;
        info!("Using API at {}", config.api_base_url);
        Ok(config)
    }

    /// Config for a server at the given base URL, with all other values defaulted.
    pub fn for_base_url(base_url: impl Into<String>) -> Result<Self> {
        let config = Self {
            api_base_url: base_url.into(),
            ..Default::default()
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.api_base_url)
            .map_err(|e| Error::Config(format!("`api_base_url` {}: {e}", self.api_base_url)))?;
        if url.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "`api_base_url` {} cannot be used as a base URL",
                self.api_base_url
            )));
        }
        if self.poll_interval_secs == 0 {
            return Err(Error::Config(
                "`poll_interval_secs` must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Root URL of the voting API, without a trailing slash.
    pub fn api_base_url(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }

    /// How often the results page re-fetches.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Where the CLI persists the session between runs.
    pub fn session_file(&self) -> &Path {
        &self.session_file
    }
}
