//! Catalog and favorites value types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub name: String,
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalUrls {
    #[serde(default)]
    pub spotify: Option<String>,
}

/// A catalog track. Field names follow the Web API JSON.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<Artist>,
    #[serde(default)]
    pub album: Album,
    #[serde(default)]
    pub preview_url: Option<String>,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

impl Track {
    pub fn artist_names(&self) -> String {
        self.artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn cover_url(&self) -> Option<&str> {
        self.album.images.first().map(|i| i.url.as_str())
    }
}

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;
pub const MAX_NOTE_LEN: usize = 500;

/// User-supplied annotation stored with a favorite.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub rating: Option<u8>,
}

impl Annotation {
    pub fn validate(&self) -> Result<()> {
        validate_note(&self.note)?;
        validate_rating(self.rating)
    }
}

/// Partial annotation: only `Some` fields are merged.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnnotationPatch {
    pub note: Option<String>,
    pub alias: Option<String>,
    pub rating: Option<u8>,
}

impl AnnotationPatch {
    pub fn note(note: impl Into<String>) -> Self {
        Self {
            note: Some(note.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.note.is_none() && self.alias.is_none() && self.rating.is_none()
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(note) = &self.note {
            validate_note(note)?;
        }
        validate_rating(self.rating)
    }

    pub fn apply(&self, annotation: &mut Annotation) {
        if let Some(note) = &self.note {
            annotation.note = note.clone();
        }
        if let Some(alias) = &self.alias {
            annotation.alias = Some(alias.clone());
        }
        if let Some(rating) = self.rating {
            annotation.rating = Some(rating);
        }
    }
}

fn validate_note(note: &str) -> Result<()> {
    if note.chars().count() > MAX_NOTE_LEN {
        return Err(Error::InvalidAnnotation(format!(
            "note longer than {MAX_NOTE_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_rating(rating: Option<u8>) -> Result<()> {
    match rating {
        Some(r) if !(MIN_RATING..=MAX_RATING).contains(&r) => Err(Error::InvalidAnnotation(
            format!("rating {r} outside {MIN_RATING}..={MAX_RATING}"),
        )),
        _ => Ok(()),
    }
}

/// A track saved by a user, addressed by `(user_id, track.id)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteTrack {
    #[serde(flatten)]
    pub track: Track,
    #[serde(flatten)]
    pub annotation: Annotation,
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "savedAt")]
    pub saved_at: DateTime<Utc>,
}

impl FavoriteTrack {
    pub fn id(&self) -> &str {
        &self.track.id
    }

    /// Document key of this favorite in the store.
    pub fn key(&self) -> String {
        favorite_key(&self.user_id, &self.track.id)
    }
}

pub fn favorite_key(user_id: &str, track_id: &str) -> String {
    format!("{user_id}_{track_id}")
}

/// A track as shown in a list: plain catalog entry or a saved favorite.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Listing {
    Track(Track),
    Favorite(FavoriteTrack),
}

impl Listing {
    pub fn track(&self) -> &Track {
        match self {
            Listing::Track(track) => track,
            Listing::Favorite(fav) => &fav.track,
        }
    }

    pub fn is_favorite(&self) -> bool {
        matches!(self, Listing::Favorite(_))
    }
}

/// Search and browse filters. Not persisted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterOptions {
    pub query: Option<String>,
    pub genre: Option<String>,
}

/// The signed-in user, taken from the Spotify profile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Browse category
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icons: Vec<Image>,
}

/// One page of a Web API listing.
#[derive(Clone, Debug, Deserialize)]
pub struct Paging<T> {
    pub items: Vec<T>,
    pub total: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
}

/// Where the front end should go next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Explore,
    Favorites,
}
