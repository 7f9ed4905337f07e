//! Favorites controller methods

use super::AppController;
use crate::model::{Action, Annotation, AnnotationPatch, Track};
use crate::Result;

impl AppController {
    async fn current_user_id(&self) -> Option<String> {
        let user_id = self.store.snapshot().await.user_id().map(str::to_string);
        if user_id.is_none() {
            tracing::debug!("No signed-in user, skipping favorites operation");
        }
        user_id
    }

    pub async fn load_favorites(&self) {
        if !self.is_authenticated() {
            return;
        }
        let Some(user_id) = self.current_user_id().await else {
            return;
        };

        self.store.dispatch(Action::SetLoading(true)).await;
        match self.favorites.list(&user_id).await {
            Ok(favorites) => {
                tracing::info!(count = favorites.len(), "Favorites loaded");
                self.store.dispatch(Action::SetFavorites(favorites)).await;
            }
            Err(e) => self.report(e, "Failed to load favorites").await,
        }
    }

    /// Save `track` if it is not a favorite yet, remove it otherwise.
    /// Returns the new favorite status, or `None` if nothing changed.
    pub async fn toggle_favorite(&self, track: &Track) -> Option<bool> {
        let user_id = self.current_user_id().await?;
        let saved = self.store.snapshot().await.is_favorite(&track.id);

        let result = if saved {
            self.favorites
                .remove(&track.id, &user_id)
                .await
                .map(|()| Action::RemoveFavorite(track.id.clone()))
        } else {
            self.favorites
                .add(&user_id, track, Annotation::default())
                .await
                .map(Action::AddFavorite)
        };

        match result {
            Ok(action) => {
                self.store.dispatch(action).await;
                Some(!saved)
            }
            Err(e) => {
                self.report(e, "Failed to update favorite").await;
                None
            }
        }
    }

    /// [`Self::toggle_favorite`] for a bare id. The track is looked up in
    /// the loaded listings first and fetched from the catalog otherwise.
    pub async fn toggle_favorite_by_id(&self, track_id: &str) -> Option<bool> {
        let track = match self.find_track(track_id).await {
            Ok(track) => track,
            Err(e) => {
                self.report(e, "Failed to update favorite").await;
                return None;
            }
        };
        self.toggle_favorite(&track).await
    }

    async fn find_track(&self, track_id: &str) -> Result<Track> {
        let state = self.store.snapshot().await;
        let known = state
            .favorite(track_id)
            .map(|f| &f.track)
            .or_else(|| state.tracks.iter().find(|t| t.id == track_id));
        match known {
            Some(track) => Ok(track.clone()),
            None => self.client.get_track(track_id).await,
        }
    }

    /// Merge `patch` into a saved favorite. Returns whether it was stored.
    pub async fn save_annotation(&self, track_id: &str, patch: AnnotationPatch) -> bool {
        let Some(user_id) = self.current_user_id().await else {
            return false;
        };

        match self.favorites.update(track_id, &user_id, &patch).await {
            Ok(_) => {
                self.store
                    .dispatch(Action::UpdateFavorite {
                        id: track_id.to_string(),
                        patch,
                    })
                    .await;
                true
            }
            Err(e) => {
                self.report(e, "Failed to update note").await;
                false
            }
        }
    }

    /// Remove every id in `track_ids`. Returns whether the removal went
    /// through; on failure the list in the state is left as it was.
    pub async fn bulk_remove(&self, track_ids: &[String]) -> bool {
        if track_ids.is_empty() {
            return false;
        }
        let Some(user_id) = self.current_user_id().await else {
            return false;
        };

        match self.favorites.remove_many(track_ids, &user_id).await {
            Ok(()) => {
                let remaining = self
                    .store
                    .snapshot()
                    .await
                    .favorites
                    .into_iter()
                    .filter(|f| !track_ids.iter().any(|id| id == f.id()))
                    .collect();
                self.store.dispatch(Action::SetFavorites(remaining)).await;
                true
            }
            Err(e) => {
                self.report(e, "Failed to delete favorites").await;
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::super::test_support::{offline_controller, offline_controller_with, signed_in};
    use crate::model::fixtures::{sample_track, FailingDeletes};
    use crate::model::{Action, AnnotationPatch, TokenSlot, TokenStore};

    #[tokio::test]
    async fn toggle_adds_then_removes() {
        let (controller, _) = offline_controller();
        signed_in(&controller, "u1").await;
        let track = sample_track("t1");

        assert_eq!(controller.toggle_favorite(&track).await, Some(true));
        assert!(controller.state().await.is_favorite("t1"));

        assert_eq!(controller.toggle_favorite(&track).await, Some(false));
        assert!(!controller.state().await.is_favorite("t1"));
        assert!(controller.favorites.list("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn toggle_by_id_uses_loaded_tracks() {
        let (controller, _) = offline_controller();
        signed_in(&controller, "u1").await;
        controller
            .store
            .dispatch(Action::SetTracks {
                tracks: vec![sample_track("t7")],
                total: 1,
            })
            .await;

        assert_eq!(controller.toggle_favorite_by_id("t7").await, Some(true));
        let state = controller.state().await;
        assert_eq!(state.favorite("t7").unwrap().track.name, "Song t7");
    }

    #[tokio::test]
    async fn toggle_without_user_does_nothing() {
        let (controller, _) = offline_controller();
        assert_eq!(controller.toggle_favorite(&sample_track("t1")).await, None);
        assert!(controller.state().await.favorites.is_empty());
    }

    #[tokio::test]
    async fn annotation_of_missing_favorite_is_reported() {
        let (controller, _) = offline_controller();
        signed_in(&controller, "u1").await;

        assert!(!controller.save_annotation("t1", AnnotationPatch::note("hi")).await);
        let error = controller.state().await.error.unwrap();
        assert!(error.starts_with("Failed to update note"));
    }

    #[tokio::test]
    async fn annotation_is_saved_and_reflected() {
        let (controller, _) = offline_controller();
        signed_in(&controller, "u1").await;
        controller.toggle_favorite(&sample_track("t1")).await;

        let patch = AnnotationPatch {
            note: Some("on repeat".to_string()),
            rating: Some(5),
            ..Default::default()
        };
        assert!(controller.save_annotation("t1", patch).await);

        let state = controller.state().await;
        let fav = state.favorite("t1").unwrap();
        assert_eq!(fav.annotation.note, "on repeat");
        assert_eq!(fav.annotation.rating, Some(5));
        let stored = controller.favorites.list("u1").await.unwrap();
        assert_eq!(stored[0].annotation, fav.annotation);
    }

    #[tokio::test]
    async fn bulk_remove_drops_every_id() {
        let (controller, tokens) = offline_controller();
        tokens.set(TokenSlot::AccessToken, "a").unwrap();
        signed_in(&controller, "u1").await;
        for id in ["t1", "t2", "t3"] {
            controller.toggle_favorite(&sample_track(id)).await;
        }

        let ids = vec!["t1".to_string(), "t3".to_string()];
        assert!(controller.bulk_remove(&ids).await);

        let state = controller.state().await;
        assert_eq!(state.favorites.len(), 1);
        assert!(state.is_favorite("t2"));

        controller.load_favorites().await;
        let state = controller.state().await;
        assert_eq!(state.favorites.len(), 1);
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn failed_bulk_remove_keeps_the_list() {
        let (controller, tokens) = offline_controller_with(Arc::new(FailingDeletes::new("u1_t2")));
        tokens.set(TokenSlot::AccessToken, "a").unwrap();
        signed_in(&controller, "u1").await;
        for id in ["t1", "t2", "t3"] {
            controller.toggle_favorite(&sample_track(id)).await;
        }
        let before = controller.state().await.favorites;

        let ids = vec!["t1".to_string(), "t2".to_string(), "t3".to_string()];
        assert!(!controller.bulk_remove(&ids).await);

        let state = controller.state().await;
        assert_eq!(state.error.as_deref(), Some("Failed to delete favorites"));
        assert_eq!(state.favorites, before);

        // the deletes that could go through did
        let stored: Vec<_> = controller
            .favorites
            .list("u1")
            .await
            .unwrap()
            .iter()
            .map(|f| f.id().to_string())
            .collect();
        assert_eq!(stored, vec!["t2"]);
    }
}
