//! Favorites repository over a [`DocumentStore`].
//!
//! Every favorite lives under the compound key `"{user_id}_{track_id}"`, so
//! add is an upsert and remove is idempotent. Nothing is cached: every call
//! is a round trip to the store.

use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use serde_json::Value;

use super::document_store::DocumentStore;
use super::types::{favorite_key, Annotation, AnnotationPatch, FavoriteTrack, Track};
use crate::{Error, Result};

pub const FAVORITES_COLLECTION: &str = "favorites";

#[derive(Clone)]
pub struct FavoritesRepository {
    store: Arc<dyn DocumentStore>,
}

fn require_user(user_id: &str) -> Result<()> {
    if user_id.trim().is_empty() {
        return Err(Error::Unauthenticated);
    }
    Ok(())
}

impl FavoritesRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Upsert `track` for `user_id`, overwriting any earlier entry.
    pub async fn add(
        &self,
        user_id: &str,
        track: &Track,
        annotation: Annotation,
    ) -> Result<FavoriteTrack> {
        require_user(user_id)?;
        annotation.validate()?;

        let favorite = FavoriteTrack {
            track: track.clone(),
            annotation,
            user_id: user_id.to_string(),
            saved_at: Utc::now(),
        };
        self.store
            .put(FAVORITES_COLLECTION, &favorite.key(), serde_json::to_value(&favorite)?)
            .await?;

        tracing::info!(user_id, track_id = %track.id, "Favorite saved");
        Ok(favorite)
    }

    pub async fn remove(&self, track_id: &str, user_id: &str) -> Result<()> {
        require_user(user_id)?;
        self.store
            .delete(FAVORITES_COLLECTION, &favorite_key(user_id, track_id))
            .await?;
        tracing::info!(user_id, track_id, "Favorite removed");
        Ok(())
    }

    /// Delete all `track_ids` concurrently and wait for every delete to
    /// finish. The first failure is returned; the other deletes still run
    /// to completion and stay deleted.
    pub async fn remove_many(&self, track_ids: &[String], user_id: &str) -> Result<()> {
        require_user(user_id)?;
        let results = join_all(track_ids.iter().map(|id| self.remove(id, user_id))).await;
        let failed = results.iter().filter(|r| r.is_err()).count();
        tracing::debug!(user_id, count = track_ids.len(), failed, "Bulk removal finished");
        results.into_iter().collect()
    }

    /// Merge `patch` into the stored entry.
    pub async fn update(
        &self,
        track_id: &str,
        user_id: &str,
        patch: &AnnotationPatch,
    ) -> Result<FavoriteTrack> {
        require_user(user_id)?;
        patch.validate()?;

        let key = favorite_key(user_id, track_id);
        let Some(doc) = self.store.get(FAVORITES_COLLECTION, &key).await? else {
            return Err(Error::NotFound {
                user_id: user_id.to_string(),
                track_id: track_id.to_string(),
            });
        };

        let mut favorite: FavoriteTrack = serde_json::from_value(doc)?;
        patch.apply(&mut favorite.annotation);
        self.store
            .put(FAVORITES_COLLECTION, &key, serde_json::to_value(&favorite)?)
            .await?;

        tracing::debug!(user_id, track_id, "Favorite annotation updated");
        Ok(favorite)
    }

    /// All favorites of `user_id`, most recently saved first.
    pub async fn list(&self, user_id: &str) -> Result<Vec<FavoriteTrack>> {
        require_user(user_id)?;
        let docs = self
            .store
            .query_eq(FAVORITES_COLLECTION, "userId", &Value::from(user_id))
            .await?;

        let mut favorites = docs
            .into_iter()
            .map(serde_json::from_value::<FavoriteTrack>)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        favorites.sort_by(|a, b| {
            b.saved_at
                .cmp(&a.saved_at)
                .then_with(|| a.track.id.cmp(&b.track.id))
        });
        Ok(favorites)
    }
}
