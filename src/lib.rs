//! Music discovery and favorites client for the Spotify Web API.
//!
//! Sign-in uses the OAuth authorization code flow with PKCE
//! ([`auth::Authenticator`]). Catalog calls go through
//! [`model::SpotifyClient`], which refreshes and replays once on a 401.
//! Favorites are stored per user in a [`model::DocumentStore`], and
//! [`controller::AppController`] publishes every outcome to a reducer-driven
//! [`model::AppStore`].

pub mod auth;
pub mod callback;
pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod model;
pub mod session;
pub mod view;

pub use error::{Error, Result};
