//! Sign-in, logout and authorization redirect handling

use reqwest::Url;

use super::AppController;
use crate::callback::CallbackOutcome;
use crate::model::{Action, Route};
use crate::Result;

impl AppController {
    /// Start a login attempt; the caller opens the returned URL.
    pub fn login_url(&self) -> Result<Url> {
        self.auth.build_authorization_url()
    }

    /// Load the profile of the signed-in user into the state.
    pub async fn sign_in(&self) -> bool {
        if !self.is_authenticated() {
            return false;
        }
        match self.client.current_user().await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "Signed in");
                self.store.dispatch(Action::SetUser(Some(user))).await;
                true
            }
            Err(e) => {
                self.report(e, "Failed to load user profile").await;
                false
            }
        }
    }

    /// Recover a stored session on startup and sign in. Returns whether a
    /// user is signed in afterwards.
    pub async fn resume(&self) -> bool {
        match self.client.resume_session().await {
            Ok(true) => self.sign_in().await,
            Ok(false) => false,
            Err(e) => {
                self.report(e, "Failed to restore session").await;
                false
            }
        }
    }

    /// Finish the redirect leg of a login. Whatever happens, the user lands
    /// on the explore view; failures show up in the state.
    pub async fn handle_callback(&self, outcome: CallbackOutcome) -> Route {
        match outcome {
            CallbackOutcome::Denied(error) => {
                tracing::error!(%error, "Authorization denied");
                self.store
                    .dispatch(Action::SetError(Some(format!("Authorization denied: {error}"))))
                    .await;
            }
            CallbackOutcome::Missing => {
                tracing::error!("Redirect carried no authorization code");
                self.store
                    .dispatch(Action::SetError(Some(
                        "No authorization code received".to_string(),
                    )))
                    .await;
            }
            CallbackOutcome::Code(code) => match self.auth.exchange_code_for_token(&code).await {
                Ok(_) => {
                    self.sign_in().await;
                }
                Err(e) => self.report(e, "Failed to log in").await,
            },
        }
        Route::Explore
    }

    pub async fn logout(&self) -> Result<()> {
        self.auth.logout()?;
        self.store.dispatch(Action::SetUser(None)).await;
        self.store.dispatch(Action::SetFavorites(Vec::new())).await;
        Ok(())
    }
}
