//! Track and favorite listings

use std::fmt::Write;

use super::utils::{
    calculate_num_width, calculate_track_column_widths, format_duration, page_numbers,
    truncate_string, PageMarker,
};
use crate::model::{FavoriteTrack, Listing, MAX_RATING};

pub fn render_track_list(out: &mut String, listings: &[Listing], first_index: usize, width: usize) {
    let (num_width, title_width, artist_width) =
        calculate_track_column_widths(width, first_index + listings.len());

    let _ = writeln!(
        out,
        " {:<num_width$}   {}   {:<title_width$}   {:<artist_width$}   {}",
        "#", " ", "Title", "Artist", "Duration",
    );

    for (i, listing) in listings.iter().enumerate() {
        let track = listing.track();
        let mark = if listing.is_favorite() { "*" } else { " " };
        let _ = writeln!(
            out,
            " {:<num_width$}   {}   {}   {}   {}",
            first_index + i + 1,
            mark,
            truncate_string(&track.name, title_width),
            truncate_string(&track.artist_names(), artist_width),
            format_duration(track.duration_ms),
        );
        let _ = writeln!(out, " {:<num_width$}       id: {}", "", track.id);
    }
}

fn rating_stars(rating: u8) -> String {
    let filled = usize::from(rating.min(MAX_RATING));
    let empty = usize::from(MAX_RATING) - filled;
    format!("{}{}", "★".repeat(filled), "☆".repeat(empty))
}

pub fn render_favorite_list(out: &mut String, favorites: &[FavoriteTrack], width: usize) {
    let num_width = calculate_num_width(favorites.len());
    let (_, title_width, artist_width) = calculate_track_column_widths(width, favorites.len());

    for (i, fav) in favorites.iter().enumerate() {
        let title = fav.annotation.alias.as_deref().unwrap_or(&fav.track.name);
        let _ = writeln!(
            out,
            " {:<num_width$}   {}   {}   {}",
            i + 1,
            truncate_string(title, title_width),
            truncate_string(&fav.track.artist_names(), artist_width),
            format_duration(fav.track.duration_ms),
        );

        let indent = " ".repeat(num_width + 4);
        let _ = writeln!(
            out,
            "{indent}id: {}   saved {}",
            fav.track.id,
            fav.saved_at.format("%Y-%m-%d %H:%M")
        );
        if let Some(rating) = fav.annotation.rating {
            let _ = writeln!(out, "{indent}{}", rating_stars(rating));
        }
        if !fav.annotation.note.is_empty() {
            let _ = writeln!(out, "{indent}note: {}", fav.annotation.note);
        }
    }
}

pub fn render_pagination(out: &mut String, current: u32, total: u32) {
    let markers = page_numbers(current, total);
    if markers.is_empty() {
        return;
    }
    let pages: Vec<String> = markers
        .into_iter()
        .map(|marker| match marker {
            PageMarker::Page(p) if p == current => format!("[{p}]"),
            PageMarker::Page(p) => p.to_string(),
            PageMarker::Gap => "...".to_string(),
        })
        .collect();
    let _ = writeln!(out, "Page {current} of {total}: {}", pages.join(" "));
}
