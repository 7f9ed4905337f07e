//! Track listing, filters, paging and genre controller methods

use super::AppController;
use crate::model::{Action, AppState, FilterOptions, Track, PAGE_SIZE};
use crate::Result;

/// Recommendations carry no total; one result page stands in for this many.
pub const RECOMMENDATION_TOTAL_FACTOR: u32 = 10;

/// A selectable genre seed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Genre {
    pub id: String,
    pub name: String,
}

/// Shown when the genre seed list cannot be fetched.
pub const DEFAULT_GENRES: [(&str, &str); 10] = [
    ("pop", "Pop"),
    ("rock", "Rock"),
    ("hip-hop", "Hip hop"),
    ("jazz", "Jazz"),
    ("classical", "Classical"),
    ("electronic", "Electronic"),
    ("r-n-b", "R&B"),
    ("indie", "Indie"),
    ("k-pop", "K-pop"),
    ("dance", "Dance"),
];

fn default_genres() -> Vec<Genre> {
    DEFAULT_GENRES
        .iter()
        .map(|(id, name)| Genre {
            id: id.to_string(),
            name: name.to_string(),
        })
        .collect()
}

/// `"hip-hop"` -> `"Hip hop"`
pub fn format_genre_name(seed: &str) -> String {
    let mut chars = seed.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars)
            .collect::<String>()
            .replace('-', " "),
        None => String::new(),
    }
}

impl AppController {
    /// Fetch the page described by the current filters. Search when a
    /// query is set, recommendations otherwise. Does nothing while logged
    /// out.
    pub async fn load_tracks(&self) {
        if !self.is_authenticated() {
            tracing::debug!("Not authenticated, skipping track load");
            return;
        }

        let state = self.store.snapshot().await;
        self.store.dispatch(Action::SetLoading(true)).await;

        match self.fetch_tracks(&state).await {
            Ok((tracks, total)) => {
                tracing::info!(
                    page = state.current_page,
                    returned = tracks.len(),
                    total,
                    "Tracks loaded"
                );
                self.store.dispatch(Action::SetTracks { tracks, total }).await;
            }
            Err(e) => self.report(e, "Failed to load tracks").await,
        }
    }

    async fn fetch_tracks(&self, state: &AppState) -> Result<(Vec<Track>, u32)> {
        let query = state
            .filters
            .query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty());

        match query {
            Some(query) => {
                let page = self
                    .client
                    .search_tracks(query, PAGE_SIZE, state.page_offset())
                    .await?;
                Ok((page.items, page.total))
            }
            None => {
                let genres: Vec<String> = state.filters.genre.iter().cloned().collect();
                let tracks = self.client.get_recommendations(&genres, &[], PAGE_SIZE).await?;
                let total = tracks.len() as u32 * RECOMMENDATION_TOTAL_FACTOR;
                Ok((tracks, total))
            }
        }
    }

    /// Replace the filters (back to page 1) and reload.
    pub async fn apply_filters(&self, filters: FilterOptions) {
        tracing::debug!(query = ?filters.query, genre = ?filters.genre, "Applying filters");
        self.store.dispatch(Action::SetFilters(filters)).await;
        self.load_tracks().await;
    }

    /// Jump to `page` and reload. Pages outside `1..=total_pages` are
    /// ignored; returns whether the page changed.
    pub async fn go_to_page(&self, page: u32) -> bool {
        let total_pages = self.store.snapshot().await.total_pages;
        if page < 1 || page > total_pages {
            tracing::debug!(page, total_pages, "Ignoring page outside range");
            return false;
        }
        self.store.dispatch(Action::SetPage(page)).await;
        self.load_tracks().await;
        true
    }

    pub async fn clear_filters(&self) {
        self.store
            .dispatch(Action::SetFilters(FilterOptions::default()))
            .await;
        self.store
            .dispatch(Action::SetTracks {
                tracks: Vec::new(),
                total: 0,
            })
            .await;
    }

    /// Genre seeds for the filter picker. Never fails: the built-in list is
    /// returned when logged out or when the request fails or comes back
    /// empty.
    pub async fn load_genres(&self) -> Vec<Genre> {
        if !self.is_authenticated() {
            return default_genres();
        }
        match self.client.get_available_genre_seeds().await {
            Ok(seeds) if !seeds.is_empty() => seeds
                .into_iter()
                .map(|id| Genre {
                    name: format_genre_name(&id),
                    id,
                })
                .collect(),
            Ok(_) => default_genres(),
            Err(e) => {
                tracing::warn!(error = %e, "Could not load genre seeds, using defaults");
                default_genres()
            }
        }
    }
}
