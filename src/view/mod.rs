//! View module - text rendering of the application state
//!
//! stdout belongs to the view; everything else logs to file.
//!
//! - `utils`: formatting helpers and the page selector
//! - `content`: track, favorite and pager rendering

mod content;
mod utils;

pub use utils::{format_duration, page_numbers, truncate_string, PageMarker};

use std::fmt::Write;

use crate::controller::Genre;
use crate::model::{AppState, Category, Route};

/// Width used when the terminal size is unknown.
pub const DEFAULT_WIDTH: usize = 100;

pub struct AppView;

impl AppView {
    /// Render the view `route` leads to.
    pub fn render(state: &AppState, route: Route, width: usize) -> String {
        let mut out = String::new();

        if let Some(error) = &state.error {
            let _ = writeln!(out, "Error: {error}\n");
        }

        match route {
            Route::Explore => Self::render_explore(&mut out, state, width),
            Route::Favorites => Self::render_favorites(&mut out, state, width),
        }
        out
    }

    fn render_explore(out: &mut String, state: &AppState, width: usize) {
        let filters = &state.filters;
        match (&filters.query, &filters.genre) {
            (Some(query), _) => {
                let _ = writeln!(out, "Search results for \"{query}\"\n");
            }
            (None, Some(genre)) => {
                let _ = writeln!(out, "Recommended {genre} tracks\n");
            }
            (None, None) => {
                let _ = writeln!(out, "Recommended tracks\n");
            }
        }

        if state.tracks.is_empty() {
            if state.error.is_none() {
                let _ = writeln!(out, "No tracks found.");
            }
            return;
        }

        content::render_track_list(out, &state.listings(), state.page_offset() as usize, width);
        let _ = writeln!(out);
        content::render_pagination(out, state.current_page, state.total_pages);
    }

    fn render_favorites(out: &mut String, state: &AppState, width: usize) {
        let _ = writeln!(out, "Favorites ({})\n", state.favorites.len());
        if state.favorites.is_empty() {
            if state.error.is_none() {
                let _ = writeln!(out, "No favorites yet. Toggle a track to save it.");
            }
            return;
        }
        content::render_favorite_list(out, &state.favorites, width);
    }

    pub fn render_login_prompt(authorize_url: &str) -> String {
        format!(
            "Open this URL in your browser to authorize spotify-explorer:\n\n  {authorize_url}\n\nWaiting for the redirect...\n"
        )
    }

    pub fn render_status(authenticated: bool, state: &AppState) -> String {
        match (&state.user, authenticated) {
            (Some(user), _) => format!(
                "Logged in as {} ({})\n",
                user.display_name.as_deref().unwrap_or(&user.id),
                user.id
            ),
            (None, true) => "Logged in\n".to_string(),
            (None, false) => match &state.error {
                Some(error) => format!("Not logged in: {error}\n"),
                None => "Not logged in. Run `spotify-explorer login`.\n".to_string(),
            },
        }
    }

    pub fn render_genres(genres: &[Genre]) -> String {
        let id_width = genres.iter().map(|g| g.id.len()).max().unwrap_or(0);
        genres
            .iter()
            .map(|g| format!("{:<id_width$}   {}\n", g.id, g.name))
            .collect()
    }

    pub fn render_categories(categories: &[Category]) -> String {
        if categories.is_empty() {
            return "No categories.\n".to_string();
        }
        let num_width = utils::calculate_num_width(categories.len());
        categories
            .iter()
            .enumerate()
            .map(|(i, c)| format!(" {:<num_width$}   {}   ({})\n", i + 1, c.name, c.id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{sample_favorite, sample_track};
    use crate::model::{FilterOptions, UserIdentity};

    #[test]
    fn explore_lists_tracks_and_pager() {
        let state = AppState {
            tracks: vec![sample_track("t1"), sample_track("t2")],
            favorites: vec![sample_favorite("u1", "t2")],
            filters: FilterOptions {
                query: Some("queen".to_string()),
                genre: None,
            },
            current_page: 2,
            total_pages: 4,
            ..Default::default()
        };
        let out = AppView::render(&state, Route::Explore, DEFAULT_WIDTH);
        assert!(out.starts_with("Search results for \"queen\""));
        assert!(out.contains("Song t1"));
        assert!(out.contains("Page 2 of 4: 1 [2] 3 4"));
    }

    #[test]
    fn error_is_shown_first() {
        let state = AppState {
            error: Some("Failed to load tracks".to_string()),
            ..Default::default()
        };
        let out = AppView::render(&state, Route::Explore, DEFAULT_WIDTH);
        assert!(out.starts_with("Error: Failed to load tracks"));
        assert!(!out.contains("No tracks found"));
    }

    #[test]
    fn empty_favorites() {
        let out = AppView::render(&AppState::default(), Route::Favorites, DEFAULT_WIDTH);
        assert!(out.contains("Favorites (0)"));
        assert!(out.contains("No favorites yet"));
    }

    #[test]
    fn status_lines() {
        let state = AppState {
            user: Some(UserIdentity {
                id: "u1".to_string(),
                display_name: Some("Ada".to_string()),
            }),
            ..Default::default()
        };
        assert_eq!(AppView::render_status(true, &state), "Logged in as Ada (u1)\n");
        assert!(AppView::render_status(false, &AppState::default()).starts_with("Not logged in"));
    }
}
