//! Configuration types and loading
//!
//! Precedence: env vars > config file > defaults. The config file is
//! optional; a bare `CLIENT_ID` + `CLIENT_SECRET` environment is enough to
//! run the relay against Spotify. The client secret comes from
//! `CLIENT_SECRET` or `client_secret_file`, never from the TOML itself.

use serde::Deserialize;
use spotify_auth::{
    ACCOUNTS_BASE_URL, API_BASE_URL, BASIC_SCOPES, DEFAULT_REDIRECT_URI, FULL_SCOPES, Secret,
};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Config file picked up from the working directory when no path is given.
const DEFAULT_CONFIG_FILE: &str = "auth-relay.toml";

/// Root configuration
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub spotify: SpotifyConfig,
}

/// HTTP listener and upstream call settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    /// Per-call timeout for token and Web API requests
    pub timeout_secs: u64,
    pub max_connections: usize,
    /// Answer cross-origin requests from any origin
    pub cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8888)),
            timeout_secs: 10,
            max_connections: 1000,
            cors: true,
        }
    }
}

/// How tokens reach the browser after the callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Delivery {
    /// `httpOnly` cookies; enables `/profile`
    #[default]
    Cookie,
    /// URL fragment on a redirect to `/`
    Fragment,
}

impl Delivery {
    pub fn default_scopes(self) -> &'static [&'static str] {
        match self {
            Delivery::Cookie => FULL_SCOPES,
            Delivery::Fragment => BASIC_SCOPES,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Delivery::Cookie => "cookie",
            Delivery::Fragment => "fragment",
        }
    }
}

/// Registered application and provider endpoints
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SpotifyConfig {
    pub client_id: String,
    #[serde(skip)]
    pub client_secret: Option<Secret<String>>,
    /// File holding the client secret (alternative to CLIENT_SECRET)
    pub client_secret_file: Option<PathBuf>,
    pub redirect_uri: String,
    pub accounts_url: String,
    pub api_url: String,
    pub delivery: Delivery,
    /// Overrides the scope set implied by `delivery`
    pub scopes: Option<Vec<String>>,
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: None,
            client_secret_file: None,
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            accounts_url: ACCOUNTS_BASE_URL.to_string(),
            api_url: API_BASE_URL.to_string(),
            delivery: Delivery::default(),
            scopes: None,
        }
    }
}

impl Config {
    /// Load configuration from an optional TOML file, then overlay
    /// environment variables and validate.
    ///
    /// Client secret resolution order:
    /// 1. CLIENT_SECRET env var
    /// 2. client_secret_file path from config
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config: Config = match path {
            Some(path) => {
                let contents = std::fs::read_to_string(path)?;
                toml::from_str(&contents)?
            }
            None => Config::default(),
        };

        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Some(id) = non_empty_env("CLIENT_ID") {
            self.spotify.client_id = id;
        }
        if let Some(uri) = non_empty_env("REDIRECT_URI") {
            self.spotify.redirect_uri = uri;
        }

        if let Some(secret) = non_empty_env("CLIENT_SECRET") {
            self.spotify.client_secret = Some(Secret::new(secret));
        } else if let Some(ref secret_file) = self.spotify.client_secret_file {
            let secret = std::fs::read_to_string(secret_file).map_err(|e| {
                Error::Config(format!(
                    "failed to read client_secret_file {}: {e}",
                    secret_file.display()
                ))
            })?;
            let secret = secret.trim().to_owned();
            if !secret.is_empty() {
                self.spotify.client_secret = Some(Secret::new(secret));
            }
        }

        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.spotify.client_id.trim().is_empty() {
            return Err(Error::Config(
                "client id missing: set CLIENT_ID or spotify.client_id".into(),
            ));
        }
        if self.spotify.client_secret.is_none() {
            return Err(Error::Config(
                "client secret missing: set CLIENT_SECRET or spotify.client_secret_file".into(),
            ));
        }

        for (name, url) in [
            ("redirect_uri", &self.spotify.redirect_uri),
            ("accounts_url", &self.spotify.accounts_url),
            ("api_url", &self.spotify.api_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(Error::Config(format!(
                    "{name} must start with http:// or https://, got: {url}"
                )));
            }
        }

        if let Some(scopes) = &self.spotify.scopes {
            if scopes.iter().all(|s| s.trim().is_empty()) {
                return Err(Error::Config("scopes must not be empty".into()));
            }
        }

        if self.server.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be greater than 0".into()));
        }

        if self.server.max_connections == 0 {
            return Err(Error::Config(
                "max_connections must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Space-delimited scope string sent on the authorization request.
    pub fn scope(&self) -> String {
        match &self.spotify.scopes {
            Some(scopes) => scopes
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(" "),
            None => self.spotify.delivery.default_scopes().join(" "),
        }
    }

    /// Resolve the config file from CLI arg, CONFIG_PATH env var, or
    /// `auth-relay.toml` in the working directory if it exists.
    pub fn resolve_path(cli_path: Option<&str>) -> Option<PathBuf> {
        if let Some(p) = cli_path {
            return Some(PathBuf::from(p));
        }
        if let Ok(p) = std::env::var("CONFIG_PATH") {
            return Some(PathBuf::from(p));
        }
        let default = PathBuf::from(DEFAULT_CONFIG_FILE);
        default.exists().then_some(default)
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
