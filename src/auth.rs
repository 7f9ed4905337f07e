//! OAuth authorization code flow with PKCE.
//!
//! A login attempt writes a fresh code verifier, sends the user to the
//! authorize URL with the derived challenge, and trades the returned code
//! (plus the verifier) for a token pair. The verifier is deleted as soon as
//! the exchange succeeds.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::{rngs::OsRng, RngCore};
use reqwest::Url;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::model::{TokenPair, TokenSlot};
use crate::session::Session;
use crate::{Error, Result};

const VERIFIER_BYTES: usize = 32;

/// Random PKCE verifier: 32 bytes of OS entropy, base64url without padding.
pub fn generate_code_verifier() -> String {
    let mut bytes = [0u8; VERIFIER_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// `base64url(SHA-256(verifier))`, no padding.
pub fn code_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

/// Token endpoint success body.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

fn token_error_message(body: &str) -> String {
    serde_json::from_str::<TokenErrorBody>(body)
        .ok()
        .and_then(|b| b.error_description.or(b.error))
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| "failed to exchange code for token".to_string())
}

#[derive(Clone)]
pub struct Authenticator {
    session: Session,
}

impl Authenticator {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.session.tokens().access_token(), Ok(Some(_)))
    }

    /// Start a login attempt. The only side effect is the verifier write.
    pub fn build_authorization_url(&self) -> Result<Url> {
        let config = self.session.config();
        let verifier = generate_code_verifier();
        let challenge = code_challenge(&verifier);

        let mut url = Url::parse(&self.session.authorize_url())
            .map_err(|e| Error::Config(format!("invalid accounts url: {e}")))?;
        url.query_pairs_mut()
            .append_pair("client_id", &config.client_id)
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", &config.redirect_uri)
            .append_pair("scope", &config.scopes)
            .append_pair("code_challenge_method", "S256")
            .append_pair("code_challenge", &challenge);

        self.session.tokens().set(TokenSlot::CodeVerifier, &verifier)?;
        tracing::debug!("Authorization URL built, verifier stored");
        Ok(url)
    }

    /// Trade an authorization code for tokens using the stored verifier.
    pub async fn exchange_code_for_token(&self, code: &str) -> Result<TokenPair> {
        let tokens = self.session.tokens();
        let verifier = tokens
            .get(TokenSlot::CodeVerifier)?
            .ok_or(Error::MissingVerifier)?;
        let config = self.session.config();

        let form = [
            ("client_id", config.client_id.as_str()),
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", config.redirect_uri.as_str()),
            ("code_verifier", verifier.as_str()),
        ];

        tracing::info!("Exchanging authorization code for tokens");
        let response = self
            .session
            .http()
            .post(self.session.token_url())
            .form(&form)
            .send()
            .await
            .map_err(|e| Error::TokenExchangeFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = token_error_message(&body);
            tracing::warn!(status = status.as_u16(), %message, "Token exchange rejected");
            return Err(Error::TokenExchangeFailed(message));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::TokenExchangeFailed(e.to_string()))?;

        let pair = TokenPair {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
        };
        tokens.store_pair(&pair)?;
        tokens.remove(TokenSlot::CodeVerifier)?;

        tracing::info!(
            has_refresh_token = pair.refresh_token.is_some(),
            expires_in = ?token.expires_in,
            "Token exchange completed"
        );
        Ok(pair)
    }

    /// Refresh-grant request. Any failure purges both tokens.
    ///
    /// Not serialized; the API client wraps this behind its refresh gate.
    pub async fn refresh_access_token(&self) -> Result<TokenPair> {
        let tokens = self.session.tokens();
        let refresh_token = tokens.refresh_token()?.ok_or(Error::NoRefreshToken)?;

        match self.request_refresh(&refresh_token).await {
            Ok(token) => {
                let pair = TokenPair {
                    access_token: token.access_token,
                    refresh_token: token.refresh_token,
                };
                tokens.store_pair(&pair)?;
                tracing::info!(rotated = pair.refresh_token.is_some(), "Token refreshed successfully");
                Ok(TokenPair {
                    refresh_token: pair.refresh_token.or(Some(refresh_token)),
                    ..pair
                })
            }
            Err(e) => {
                tracing::warn!(error = %e, "Token refresh failed, clearing stored tokens");
                tokens.clear_tokens()?;
                Err(Error::SessionExpired)
            }
        }
    }

    async fn request_refresh(&self, refresh_token: &str) -> Result<TokenResponse> {
        let form = [
            ("client_id", self.session.config().client_id.as_str()),
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ];
        let response = self
            .session
            .http()
            .post(self.session.token_url())
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::upstream(Some(status.as_u16()), token_error_message(&body)));
        }
        Ok(response.json().await?)
    }

    /// Drop both tokens and any half-finished login attempt.
    pub fn logout(&self) -> Result<()> {
        let tokens = self.session.tokens();
        tokens.clear_tokens()?;
        tokens.remove(TokenSlot::CodeVerifier)?;
        tracing::info!("Logged out");
        Ok(())
    }
}
