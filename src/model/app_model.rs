//! Application state, the actions that advance it, and the store that owns it

use std::sync::Arc;
use tokio::sync::RwLock;

use super::types::{AnnotationPatch, FavoriteTrack, FilterOptions, Listing, Track, UserIdentity};

/// Tracks per result page.
pub const PAGE_SIZE: u32 = 20;

#[derive(Clone, Debug, PartialEq)]
pub struct AppState {
    pub tracks: Vec<Track>,
    pub favorites: Vec<FavoriteTrack>,
    pub loading: bool,
    pub error: Option<String>,
    pub current_page: u32,
    pub total_pages: u32,
    pub filters: FilterOptions,
    pub user: Option<UserIdentity>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            tracks: Vec::new(),
            favorites: Vec::new(),
            loading: false,
            error: None,
            current_page: 1,
            total_pages: 1,
            filters: FilterOptions::default(),
            user: None,
        }
    }
}

impl AppState {
    pub fn is_favorite(&self, track_id: &str) -> bool {
        self.favorites.iter().any(|f| f.id() == track_id)
    }

    pub fn favorite(&self, track_id: &str) -> Option<&FavoriteTrack> {
        self.favorites.iter().find(|f| f.id() == track_id)
    }

    /// Current tracks, tagged as favorites where the user saved them.
    pub fn listings(&self) -> Vec<Listing> {
        self.tracks
            .iter()
            .map(|track| match self.favorite(&track.id) {
                Some(fav) => Listing::Favorite(fav.clone()),
                None => Listing::Track(track.clone()),
            })
            .collect()
    }

    /// Catalog offset of the current page.
    pub fn page_offset(&self) -> u32 {
        self.current_page.saturating_sub(1) * PAGE_SIZE
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.id.as_str())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    SetLoading(bool),
    SetError(Option<String>),
    SetTracks { tracks: Vec<Track>, total: u32 },
    SetFavorites(Vec<FavoriteTrack>),
    /// Caller guarantees the id is not already present.
    AddFavorite(FavoriteTrack),
    RemoveFavorite(String),
    UpdateFavorite { id: String, patch: AnnotationPatch },
    SetFilters(FilterOptions),
    /// Not clamped; callers check bounds.
    SetPage(u32),
    SetUser(Option<UserIdentity>),
}

pub fn total_pages(total: u32) -> u32 {
    total.div_ceil(PAGE_SIZE).max(1)
}

/// Advance `state` by one action. Pure.
pub fn reduce(state: AppState, action: Action) -> AppState {
    match action {
        Action::SetLoading(loading) => AppState { loading, ..state },
        Action::SetError(error) => AppState {
            error,
            loading: false,
            ..state
        },
        Action::SetTracks { tracks, total } => AppState {
            tracks,
            total_pages: total_pages(total),
            loading: false,
            error: None,
            ..state
        },
        Action::SetFavorites(favorites) => AppState {
            favorites,
            loading: false,
            error: None,
            ..state
        },
        Action::AddFavorite(favorite) => {
            let mut favorites = state.favorites;
            favorites.push(favorite);
            AppState { favorites, ..state }
        }
        Action::RemoveFavorite(id) => {
            let mut favorites = state.favorites;
            favorites.retain(|f| f.id() != id);
            AppState { favorites, ..state }
        }
        Action::UpdateFavorite { id, patch } => {
            let mut favorites = state.favorites;
            if let Some(fav) = favorites.iter_mut().find(|f| f.id() == id) {
                patch.apply(&mut fav.annotation);
            }
            AppState { favorites, ..state }
        }
        Action::SetFilters(filters) => AppState {
            filters,
            current_page: 1,
            ..state
        },
        Action::SetPage(current_page) => AppState {
            current_page,
            ..state
        },
        Action::SetUser(user) => AppState { user, ..state },
    }
}

/// Owner of the single [`AppState`]; the only way to change it is
/// [`AppStore::dispatch`].
#[derive(Clone, Default)]
pub struct AppStore {
    state: Arc<RwLock<AppState>>,
}

impl AppStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: AppState) -> Self {
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    pub async fn dispatch(&self, action: Action) {
        tracing::trace!(action = action_name(&action), "dispatch");
        let mut state = self.state.write().await;
        let current = std::mem::take(&mut *state);
        *state = reduce(current, action);
    }

    pub async fn snapshot(&self) -> AppState {
        self.state.read().await.clone()
    }
}

fn action_name(action: &Action) -> &'static str {
    match action {
        Action::SetLoading(_) => "SetLoading",
        Action::SetError(_) => "SetError",
        Action::SetTracks { .. } => "SetTracks",
        Action::SetFavorites(_) => "SetFavorites",
        Action::AddFavorite(_) => "AddFavorite",
        Action::RemoveFavorite(_) => "RemoveFavorite",
        Action::UpdateFavorite { .. } => "UpdateFavorite",
        Action::SetFilters(_) => "SetFilters",
        Action::SetPage(_) => "SetPage",
        Action::SetUser(_) => "SetUser",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{sample_favorite, sample_track};

    #[test]
    fn set_filters_resets_page() {
        let state = AppState {
            current_page: 5,
            ..Default::default()
        };
        let state = reduce(
            state,
            Action::SetFilters(FilterOptions {
                query: Some("x".to_string()),
                genre: None,
            }),
        );
        assert_eq!(state.current_page, 1);
        assert_eq!(state.filters.query.as_deref(), Some("x"));
    }

    #[test]
    fn set_tracks_derives_total_pages() {
        let state = AppState {
            loading: true,
            error: Some("old".to_string()),
            ..Default::default()
        };
        let state = reduce(
            state,
            Action::SetTracks {
                tracks: vec![sample_track("t1")],
                total: 45,
            },
        );
        assert_eq!(state.total_pages, 3);
        assert!(!state.loading);
        assert!(state.error.is_none());

        let state = reduce(state, Action::SetTracks { tracks: vec![], total: 0 });
        assert_eq!(state.total_pages, 1);
        let state = reduce(state, Action::SetTracks { tracks: vec![], total: 40 });
        assert_eq!(state.total_pages, 2);
    }

    #[test]
    fn set_error_clears_loading() {
        let state = reduce(AppState::default(), Action::SetLoading(true));
        assert!(state.loading);
        let state = reduce(state, Action::SetError(Some("boom".to_string())));
        assert!(!state.loading);
        assert_eq!(state.error.as_deref(), Some("boom"));
    }

    #[test]
    fn set_page_is_not_clamped() {
        let state = reduce(AppState::default(), Action::SetPage(99));
        assert_eq!(state.current_page, 99);
        assert_eq!(state.total_pages, 1);
        assert_eq!(state.page_offset(), 98 * PAGE_SIZE);
    }

    #[test]
    fn favorite_actions() {
        let state = reduce(AppState::default(), Action::AddFavorite(sample_favorite("u1", "t1")));
        let state = reduce(state, Action::AddFavorite(sample_favorite("u1", "t2")));
        assert!(state.is_favorite("t1"));

        let state = reduce(
            state,
            Action::UpdateFavorite {
                id: "t2".to_string(),
                patch: AnnotationPatch::note("loud"),
            },
        );
        assert_eq!(state.favorite("t2").unwrap().annotation.note, "loud");

        // unknown id leaves the list untouched
        let before = state.favorites.clone();
        let state = reduce(
            state,
            Action::UpdateFavorite {
                id: "zz".to_string(),
                patch: AnnotationPatch::note("x"),
            },
        );
        assert_eq!(state.favorites, before);

        let state = reduce(state, Action::RemoveFavorite("t1".to_string()));
        assert!(!state.is_favorite("t1"));
        assert_eq!(state.favorites.len(), 1);

        let state = reduce(state, Action::SetFavorites(vec![]));
        assert!(state.favorites.is_empty());
    }

    #[test]
    fn listings_tag_favorites() {
        let state = AppState {
            tracks: vec![sample_track("t1"), sample_track("t2")],
            favorites: vec![sample_favorite("u1", "t2")],
            ..Default::default()
        };
        let listings = state.listings();
        assert!(!listings[0].is_favorite());
        assert!(listings[1].is_favorite());
    }

    #[tokio::test]
    async fn store_dispatch_updates_snapshot() {
        let store = AppStore::new();
        store
            .dispatch(Action::SetUser(Some(UserIdentity {
                id: "u1".to_string(),
                display_name: None,
            })))
            .await;
        store.dispatch(Action::SetPage(3)).await;
        let state = store.snapshot().await;
        assert_eq!(state.user_id(), Some("u1"));
        assert_eq!(state.current_page, 3);
    }
}
