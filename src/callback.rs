//! Authorization redirect handling.
//!
//! The browser is redirected to the registered redirect URI with either
//! `code` or `error` in the query string. [`CallbackListener`] serves that
//! single request on the loopback interface.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{RawQuery, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use reqwest::Url;
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Mutex};

use crate::{Error, Result};

/// How long the success page gets to reach the browser after the redirect
/// arrived.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

const SUCCESS_PAGE: &str = r#"<!doctype html>
<html>
<head><title>spotify-explorer</title></head>
<body><h1>Authorization received</h1><p>You can close this window and return to the terminal.</p></body>
</html>
"#;

/// What the redirect carried.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallbackOutcome {
    Code(String),
    Denied(String),
    Missing,
}

impl CallbackOutcome {
    /// Parse a raw query string (without the leading `?`). `error` wins
    /// over `code`.
    pub fn from_query(query: &str) -> Self {
        let mut code = None;
        let mut error = None;
        for (key, value) in Url::parse(&format!("http://localhost/?{query}"))
            .map(|u| u.query_pairs().into_owned().collect::<Vec<_>>())
            .unwrap_or_default()
        {
            match key.as_str() {
                "code" if !value.is_empty() => code = Some(value),
                "error" => error = Some(value),
                _ => {}
            }
        }
        match (error, code) {
            (Some(error), _) => CallbackOutcome::Denied(error),
            (None, Some(code)) => CallbackOutcome::Code(code),
            (None, None) => CallbackOutcome::Missing,
        }
    }
}

/// One-shot HTTP listener bound to the redirect URI's host and port.
pub struct CallbackListener {
    listener: TcpListener,
    path: String,
}

impl CallbackListener {
    pub async fn bind(redirect_uri: &str) -> Result<Self> {
        let url = Url::parse(redirect_uri)
            .map_err(|e| Error::Callback(format!("invalid redirect uri {redirect_uri}: {e}")))?;
        let host = match url.host_str() {
            Some("localhost") | None => "127.0.0.1",
            Some(host) => host,
        };
        let port = url
            .port_or_known_default()
            .ok_or_else(|| Error::Callback(format!("redirect uri has no port: {redirect_uri}")))?;

        let listener = TcpListener::bind((host, port)).await?;
        tracing::debug!(host, port, path = url.path(), "Callback listener bound");
        Ok(Self {
            listener,
            path: url.path().to_string(),
        })
    }

    pub fn local_addr(&self) -> Result<std::net::SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve the redirect path until the first request for it arrives.
    /// Other paths (favicon and the like) get a 404, and connections are
    /// served independently so an idle one cannot hold up the redirect.
    pub async fn wait(self, timeout: Duration) -> Result<CallbackOutcome> {
        let (outcome_tx, outcome_rx) = oneshot::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let router = redirect_router(&self.path, Arc::new(Mutex::new(Some(outcome_tx))));

        let mut server = tokio::spawn(async move {
            axum::serve(self.listener, router)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        let outcome = tokio::time::timeout(timeout, outcome_rx).await;

        let _ = shutdown_tx.send(());
        if tokio::time::timeout(SHUTDOWN_GRACE, &mut server).await.is_err() {
            tracing::debug!("Callback server still has open connections, aborting");
            server.abort();
        }

        match outcome {
            Ok(Ok(outcome)) => Ok(outcome),
            Ok(Err(_)) => Err(Error::Callback("callback server stopped unexpectedly".to_string())),
            Err(_) => Err(Error::Callback(
                "timed out waiting for the authorization redirect".to_string(),
            )),
        }
    }
}

type OutcomeSender = Arc<Mutex<Option<oneshot::Sender<CallbackOutcome>>>>;

fn redirect_router(path: &str, sender: OutcomeSender) -> Router {
    Router::new()
        .route(path, get(receive_redirect))
        .fallback(ignore_request)
        .with_state(sender)
}

async fn receive_redirect(
    State(sender): State<OutcomeSender>,
    RawQuery(query): RawQuery,
) -> Html<&'static str> {
    let outcome = CallbackOutcome::from_query(query.as_deref().unwrap_or_default());
    match sender.lock().await.take() {
        Some(tx) => {
            tracing::debug!(?outcome, "Authorization redirect received");
            let _ = tx.send(outcome);
        }
        None => tracing::debug!("Repeated authorization redirect ignored"),
    }
    Html(SUCCESS_PAGE)
}

async fn ignore_request(uri: axum::http::Uri) -> StatusCode {
    tracing::debug!(path = uri.path(), "Ignoring request outside the redirect path");
    StatusCode::NOT_FOUND
}
