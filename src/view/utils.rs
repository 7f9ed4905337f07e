//! Formatting helpers shared by the renderers

pub fn format_duration(ms: u64) -> String {
    let total_seconds = ms / 1000;
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{}:{:02}", minutes, seconds)
}

/// Calculate width needed for index column (log10(n) + padding)
pub fn calculate_num_width(item_count: usize) -> usize {
    if item_count == 0 {
        2
    } else {
        let digits = (item_count as f64).log10().floor() as usize + 1;
        digits + 1
    }
}

pub fn truncate_string(s: &str, max_width: usize) -> String {
    if s.chars().count() > max_width {
        let truncated: String = s.chars().take(max_width.saturating_sub(3)).collect();
        format!("{:<width$}", format!("{}...", truncated), width = max_width)
    } else {
        format!("{:<width$}", s, width = max_width)
    }
}

/// Column widths for track listings.
/// Returns (num_width, title_width, artist_width)
pub fn calculate_track_column_widths(content_width: usize, item_count: usize) -> (usize, usize, usize) {
    // Format: " {num}   {fav}   {title}   {artist}   {duration}"
    let num_width = calculate_num_width(item_count);
    let fixed_width = 1 + num_width + 3 + FAVORITE_MARK_WIDTH + 3 + 3 + 3 + DURATION_WIDTH;
    let remaining_width = content_width.saturating_sub(fixed_width);
    let title_width = (remaining_width * 55) / 100;
    let artist_width = remaining_width.saturating_sub(title_width);

    (num_width, title_width, artist_width)
}

pub const FAVORITE_MARK_WIDTH: usize = 1;
pub const DURATION_WIDTH: usize = 8;

/// One slot of the page selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageMarker {
    Page(u32),
    Gap,
}

const MAX_VISIBLE_PAGES: u32 = 5;

/// Page numbers to offer around `current`, with gaps where ranges are
/// skipped. Empty when there is only one page.
pub fn page_numbers(current: u32, total: u32) -> Vec<PageMarker> {
    use PageMarker::{Gap, Page};

    if total <= 1 {
        return Vec::new();
    }
    if total <= MAX_VISIBLE_PAGES {
        return (1..=total).map(Page).collect();
    }
    if current <= 3 {
        vec![Page(1), Page(2), Page(3), Page(4), Gap, Page(total)]
    } else if current >= total - 2 {
        vec![Page(1), Gap, Page(total - 3), Page(total - 2), Page(total - 1), Page(total)]
    } else {
        vec![
            Page(1),
            Gap,
            Page(current - 1),
            Page(current),
            Page(current + 1),
            Gap,
            Page(total),
        ]
    }
}
