//! Controller module - turns user intents into API and repository calls
//!
//! Every operation reports its outcome as [`Action`]s on the [`AppStore`];
//! failures become `SetError` and never abort the caller. Submodules by
//! responsibility:
//!
//! - `account`: sign-in and the authorization redirect
//! - `catalog`: track listing, filters, paging and genres
//! - `favorites`: toggling, annotating and removing favorites

mod account;
mod catalog;
mod favorites;

pub use catalog::{format_genre_name, Genre, DEFAULT_GENRES, RECOMMENDATION_TOTAL_FACTOR};

use std::sync::Arc;

use crate::auth::Authenticator;
use crate::model::{
    Action, AppState, AppStore, DocumentStore, FavoritesRepository, SpotifyClient,
};
use crate::session::Session;
use crate::Error;

#[derive(Clone)]
pub struct AppController {
    pub(crate) client: SpotifyClient,
    pub(crate) auth: Authenticator,
    pub(crate) favorites: FavoritesRepository,
    pub(crate) store: AppStore,
}

impl AppController {
    pub fn new(session: Session, documents: Arc<dyn DocumentStore>) -> Self {
        Self::with_store(session, documents, AppStore::new())
    }

    pub fn with_store(session: Session, documents: Arc<dyn DocumentStore>, store: AppStore) -> Self {
        Self {
            client: SpotifyClient::new(session.clone()),
            auth: Authenticator::new(session),
            favorites: FavoritesRepository::new(documents),
            store,
        }
    }

    pub fn client(&self) -> &SpotifyClient {
        &self.client
    }

    pub fn auth(&self) -> &Authenticator {
        &self.auth
    }

    pub fn store(&self) -> &AppStore {
        &self.store
    }

    pub async fn state(&self) -> AppState {
        self.store.snapshot().await
    }

    pub fn is_authenticated(&self) -> bool {
        self.client.is_authenticated()
    }

    /// Short user-facing text for `error`, falling back to `fallback` for
    /// anything that is not an auth or rate-limit problem.
    pub(crate) fn format_error(error: &Error, fallback: &str) -> String {
        match error {
            Error::Unauthenticated | Error::NoRefreshToken => {
                "Not logged in. Run `spotify-explorer login` first.".to_string()
            }
            Error::SessionExpired
            | Error::Upstream {
                status: Some(401), ..
            } => "Session expired. Please log in again.".to_string(),
            Error::Upstream {
                status: Some(429), ..
            } => "Rate limited. Please wait a moment.".to_string(),
            Error::InvalidAnnotation(reason) => format!("{fallback}: {reason}"),
            Error::NotFound { track_id, .. } => format!("{fallback}: {track_id} is not a favorite"),
            _ => fallback.to_string(),
        }
    }

    /// Log `error`, publish it to the state, and drop a session that can no
    /// longer authenticate.
    pub(crate) async fn report(&self, error: Error, fallback: &str) {
        tracing::error!(error = %error, "{fallback}");
        if error.is_auth_failure() {
            if let Err(e) = self.auth.logout() {
                tracing::warn!(error = %e, "Could not clear stored tokens");
            }
            self.store.dispatch(Action::SetUser(None)).await;
        }
        self.store
            .dispatch(Action::SetError(Some(Self::format_error(&error, fallback))))
            .await;
    }

    /// Drop the error shown to the user.
    pub async fn clear_error(&self) {
        self.store.dispatch(Action::SetError(None)).await;
    }
}
