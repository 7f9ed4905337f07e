//! Error types for spotify-explorer.

use thiserror::Error;

/// Main error type for the library.
#[derive(Debug, Error)]
pub enum Error {
    /// No usable access token (or no user id for favorites).
    #[error("not authenticated")]
    Unauthenticated,

    /// Code exchange attempted without a stored PKCE verifier.
    #[error("missing PKCE code verifier")]
    MissingVerifier,

    /// Authorization code exchange was rejected or could not be sent.
    #[error("token exchange failed: {0}")]
    TokenExchangeFailed(String),

    /// Refresh requested but no refresh token is stored.
    #[error("no refresh token")]
    NoRefreshToken,

    /// Refresh was denied; stored tokens have been purged.
    #[error("session expired, please log in again")]
    SessionExpired,

    /// Favorite addressed by (user, track) does not exist.
    #[error("favorite not found: {track_id} for user {user_id}")]
    NotFound { user_id: String, track_id: String },

    /// Opaque failure from the catalog or the document store.
    #[error("upstream error{}: {message}", .status.map(|s| format!(" {s}")).unwrap_or_default())]
    Upstream { status: Option<u16>, message: String },

    /// Note/alias/rating failed validation.
    #[error("invalid annotation: {0}")]
    InvalidAnnotation(String),

    /// Redirect callback could not be received or parsed.
    #[error("callback error: {0}")]
    Callback(String),

    /// Configuration could not be loaded.
    #[error("config error: {0}")]
    Config(String),

    /// HTTP transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Errors that mean the user has to log in (again). A 401 that survives
    /// the refresh-and-replay counts too.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Error::Unauthenticated
                | Error::SessionExpired
                | Error::NoRefreshToken
                | Error::Upstream {
                    status: Some(401),
                    ..
                }
        )
    }

    pub(crate) fn upstream(status: Option<u16>, message: impl Into<String>) -> Self {
        Error::Upstream {
            status,
            message: message.into(),
        }
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;
