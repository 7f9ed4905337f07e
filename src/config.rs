use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{Error, Result};

pub const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8898/callback";
pub const DEFAULT_SCOPES: &str = "user-read-private user-read-email";
pub const DEFAULT_ACCOUNTS_URL: &str = "https://accounts.spotify.com";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
const DEFAULT_CALLBACK_TIMEOUT_SECS: u64 = 300;
const APP_DIR: &str = "spotify-explorer";

pub const ENV_CLIENT_ID: &str = "SPOTIFY_CLIENT_ID";
pub const ENV_REDIRECT_URI: &str = "SPOTIFY_REDIRECT_URI";
pub const ENV_DATA_DIR: &str = "SPOTIFY_EXPLORER_DATA_DIR";

fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(".cache"))
}

/// Values accepted from the TOML config file.
#[derive(Deserialize, Default, Debug)]
pub struct FileConfig {
    pub client_id: Option<String>,
    pub redirect_uri: Option<String>,
    pub scopes: Option<String>,
    pub accounts_url: Option<String>,
    pub api_url: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub request_timeout_secs: Option<u64>,
    pub callback_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub client_id: String,
    pub redirect_uri: String,
    pub scopes: String,
    pub accounts_url: String,
    pub api_url: String,
    pub data_dir: PathBuf,
    pub request_timeout: Duration,
    pub callback_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            scopes: DEFAULT_SCOPES.to_string(),
            accounts_url: DEFAULT_ACCOUNTS_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            data_dir: default_data_dir(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            callback_timeout: Duration::from_secs(DEFAULT_CALLBACK_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Merge CLI flags over the file config over the process environment
    /// over built-in defaults.
    pub fn resolve(file: Option<FileConfig>, args: &crate::cli::Args) -> Self {
        Self::resolve_with_env(file, args, process_env)
    }

    /// [`Self::resolve`] with `env` standing in for the process environment.
    pub fn resolve_with_env(
        file: Option<FileConfig>,
        args: &crate::cli::Args,
        env: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Config::default();
        Config {
            client_id: args
                .client_id
                .clone()
                .or(file.client_id)
                .or_else(|| env(ENV_CLIENT_ID))
                .unwrap_or(defaults.client_id),
            redirect_uri: args
                .redirect_uri
                .clone()
                .or(file.redirect_uri)
                .or_else(|| env(ENV_REDIRECT_URI))
                .unwrap_or(defaults.redirect_uri),
            scopes: file.scopes.unwrap_or(defaults.scopes),
            accounts_url: trim_base(file.accounts_url.unwrap_or(defaults.accounts_url)),
            api_url: trim_base(file.api_url.unwrap_or(defaults.api_url)),
            data_dir: args
                .data_dir
                .clone()
                .or(file.data_dir)
                .or_else(|| env(ENV_DATA_DIR).map(PathBuf::from))
                .unwrap_or(defaults.data_dir),
            request_timeout: file
                .request_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            callback_timeout: file
                .callback_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.callback_timeout),
        }
    }

    /// Reject configurations that cannot talk to Spotify at all.
    pub fn validate(&self) -> Result<()> {
        if self.client_id.trim().is_empty() {
            return Err(Error::Config(
                "client id is not set (use --client-id or SPOTIFY_CLIENT_ID)".to_string(),
            ));
        }
        reqwest::Url::parse(&self.redirect_uri)
            .map_err(|e| Error::Config(format!("invalid redirect uri {}: {e}", self.redirect_uri)))?;
        Ok(())
    }

    pub fn token_dir(&self) -> PathBuf {
        self.data_dir.join("tokens")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

pub fn find_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_owned());
    }
    let cwd_config = PathBuf::from("spotify-explorer.toml");
    if cwd_config.exists() {
        return Some(cwd_config);
    }
    if let Some(config_dir) = dirs::config_dir() {
        let user_config = config_dir.join(APP_DIR).join("config.toml");
        if user_config.exists() {
            return Some(user_config);
        }
    }
    None
}

pub fn load_config(path: &Path) -> Result<FileConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| Error::Config(format!("{}: {e}", path.display())))
}
