//! Explicit auth context shared by the authenticator and the API client.

use std::sync::Arc;

use crate::config::Config;
use crate::model::TokenStore;
use crate::Result;

const USER_AGENT: &str = concat!("spotify-explorer/", env!("CARGO_PKG_VERSION"));

/// Config, HTTP client and token store for one logical session.
#[derive(Clone)]
pub struct Session {
    config: Arc<Config>,
    http: reqwest::Client,
    tokens: Arc<dyn TokenStore>,
}

impl Session {
    pub fn new(config: Config, tokens: Arc<dyn TokenStore>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            config: Arc::new(config),
            http,
            tokens,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn tokens(&self) -> &dyn TokenStore {
        self.tokens.as_ref()
    }

    pub fn authorize_url(&self) -> String {
        format!("{}/authorize", self.config.accounts_url)
    }

    pub fn token_url(&self) -> String {
        format!("{}/api/token", self.config.accounts_url)
    }

    pub fn api_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.config.api_url,
            endpoint.trim_start_matches('/')
        )
    }
}
