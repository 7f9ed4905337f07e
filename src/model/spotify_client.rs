//! Spotify Web API client with refresh-on-401 support

use std::sync::Arc;

use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::Mutex;

use super::types::{Category, Paging, Track, UserIdentity};
use crate::auth::Authenticator;
use crate::session::Session;
use crate::{log_api_result, Error, Result};

/// Replays after a rejected token. One refresh, one retry, then give up.
pub const MAX_AUTH_RETRIES: u32 = 1;

/// Genre seed used when recommendations are requested without any seed.
pub const FALLBACK_GENRE_SEED: &str = "pop";

#[derive(Deserialize)]
struct SearchResponse {
    tracks: Paging<Track>,
}

#[derive(Deserialize)]
struct TracksResponse {
    tracks: Vec<Track>,
}

#[derive(Deserialize)]
struct GenresResponse {
    genres: Vec<String>,
}

#[derive(Deserialize)]
struct CategoriesResponse {
    categories: Paging<Category>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

/// Spotify API client. Clones share the token store and the refresh gate.
#[derive(Clone)]
pub struct SpotifyClient {
    session: Session,
    auth: Authenticator,
    refresh_gate: Arc<Mutex<()>>,
}

impl SpotifyClient {
    pub fn new(session: Session) -> Self {
        Self {
            auth: Authenticator::new(session.clone()),
            session,
            refresh_gate: Arc::new(Mutex::new(())),
        }
    }

    /// True while an access token is stored, valid or not.
    pub fn is_authenticated(&self) -> bool {
        self.auth.is_authenticated()
    }

    fn current_token(&self) -> Result<String> {
        self.session
            .tokens()
            .access_token()?
            .ok_or(Error::Unauthenticated)
    }

    /// Serialized refresh. Concurrent callers queue on the gate and each
    /// performs its own refresh; request replays use
    /// [`Self::refresh_after_rejection`] instead.
    pub async fn refresh_access_token(&self) -> Result<()> {
        let _gate = self.refresh_gate.lock().await;
        self.auth.refresh_access_token().await.map(|_| ())
    }

    /// Refresh after `rejected` got a 401, unless another request already
    /// replaced it while we waited on the gate.
    async fn refresh_after_rejection(&self, rejected: &str) -> Result<String> {
        let _gate = self.refresh_gate.lock().await;
        if let Some(current) = self.session.tokens().access_token()? {
            if current != rejected {
                tracing::debug!("Token already refreshed by a concurrent request");
                return Ok(current);
            }
        }
        self.auth.refresh_access_token().await?;
        self.current_token()
    }

    /// Restore a stored session whose access token is gone but whose
    /// refresh token is still around. Returns whether we end up
    /// authenticated.
    pub async fn resume_session(&self) -> Result<bool> {
        let tokens = self.session.tokens();
        if tokens.access_token()?.is_some() {
            return Ok(true);
        }
        if tokens.refresh_token()?.is_none() {
            return Ok(false);
        }
        tracing::info!("Found stored refresh token, resuming session");
        self.refresh_access_token().await?;
        Ok(self.is_authenticated())
    }

    async fn send(
        &self,
        method: &Method,
        url: &str,
        params: &[(&str, String)],
        token: &str,
    ) -> Result<Response> {
        self.session
            .http()
            .request(method.clone(), url)
            .bearer_auth(token)
            .query(params)
            .send()
            .await
            .map_err(|e| Error::upstream(None, e.to_string()))
    }

    /// Authenticated request returning the JSON body.
    ///
    /// A 401 triggers one refresh and one identical replay; a second 401 is
    /// returned as is.
    pub async fn call(
        &self,
        method: Method,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<Value> {
        let mut token = self.current_token()?;
        let url = self.session.api_url(endpoint);
        let mut retries = 0;

        loop {
            tracing::debug!(%method, endpoint, attempt = retries + 1, "API request started");
            let response = self.send(&method, &url, params, &token).await?;

            if response.status() == StatusCode::UNAUTHORIZED && retries < MAX_AUTH_RETRIES {
                retries += 1;
                tracing::info!(endpoint, "Access token rejected, refreshing");
                token = self.refresh_after_rejection(&token).await?;
                continue;
            }

            return Self::read_body(response).await;
        }
    }

    pub async fn call_json<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let value = self.call(method, endpoint, params).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn read_body(response: Response) -> Result<Value> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::upstream(Some(status.as_u16()), e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(|b| b.error.message)
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_string()
                });
            return Err(Error::upstream(Some(status.as_u16()), message));
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }

    pub async fn search_tracks(&self, query: &str, limit: u32, offset: u32) -> Result<Paging<Track>> {
        let params = [
            ("q", query.to_string()),
            ("type", "track".to_string()),
            ("limit", limit.to_string()),
            ("offset", offset.to_string()),
        ];
        let result = self
            .call_json::<SearchResponse>(Method::GET, "search", &params)
            .await;
        log_api_result!("search_tracks", result);
        let page = result?.tracks;
        tracing::debug!(query, total = page.total, returned = page.items.len(), "Search finished");
        Ok(page)
    }

    pub async fn get_recommendations(
        &self,
        genre_seeds: &[String],
        track_seeds: &[String],
        limit: u32,
    ) -> Result<Vec<Track>> {
        let mut params = vec![("limit", limit.to_string())];
        if !genre_seeds.is_empty() {
            params.push(("seed_genres", genre_seeds.join(",")));
        }
        if !track_seeds.is_empty() {
            params.push(("seed_tracks", track_seeds.join(",")));
        }
        if genre_seeds.is_empty() && track_seeds.is_empty() {
            params.push(("seed_genres", FALLBACK_GENRE_SEED.to_string()));
        }

        let result = self
            .call_json::<TracksResponse>(Method::GET, "recommendations", &params)
            .await;
        log_api_result!("get_recommendations", result);
        Ok(result?.tracks)
    }

    pub async fn get_available_genre_seeds(&self) -> Result<Vec<String>> {
        let result = self
            .call_json::<GenresResponse>(Method::GET, "recommendations/available-genre-seeds", &[])
            .await;
        log_api_result!("get_available_genre_seeds", result);
        Ok(result?.genres)
    }

    pub async fn get_categories(&self, limit: u32) -> Result<Vec<Category>> {
        let params = [("limit", limit.to_string())];
        let result = self
            .call_json::<CategoriesResponse>(Method::GET, "browse/categories", &params)
            .await;
        log_api_result!("get_categories", result);
        Ok(result?.categories.items)
    }

    pub async fn get_track(&self, track_id: &str) -> Result<Track> {
        if track_id.is_empty() {
            return Err(Error::upstream(None, "track id is empty"));
        }
        let result = self
            .call_json::<Track>(Method::GET, &format!("tracks/{track_id}"), &[])
            .await;
        log_api_result!("get_track", result);
        result
    }

    /// Profile of the signed-in user; its id keys the user's favorites.
    pub async fn current_user(&self) -> Result<UserIdentity> {
        let result = self.call_json::<UserIdentity>(Method::GET, "me", &[]).await;
        log_api_result!("current_user", result);
        result
    }
}
