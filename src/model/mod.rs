//! Model module - application state and data types
//!
//! - `types`: catalog, favorite and filter value types
//! - `token_store`: persisted auth slots
//! - `spotify_client`: Spotify Web API client with refresh-on-401
//! - `document_store`: black-box document storage
//! - `favorites`: favorites repository keyed by (user, track)
//! - `app_model`: application state, actions and the reducer

mod types;
mod token_store;
mod spotify_client;
mod document_store;
mod favorites;
mod app_model;

pub use types::{
    favorite_key, Album, Annotation, AnnotationPatch, Artist, Category, ExternalUrls,
    FavoriteTrack, FilterOptions, Image, Listing, Paging, Route, Track, UserIdentity,
    MAX_NOTE_LEN, MAX_RATING, MIN_RATING,
};

pub use token_store::{FileTokenStore, MemoryTokenStore, TokenPair, TokenSlot, TokenStore};

pub use spotify_client::{SpotifyClient, FALLBACK_GENRE_SEED, MAX_AUTH_RETRIES};

pub use document_store::{DocumentStore, JsonFileDocumentStore, MemoryDocumentStore};

pub use favorites::{FavoritesRepository, FAVORITES_COLLECTION};

pub use app_model::{reduce, total_pages, Action, AppState, AppStore, PAGE_SIZE};
