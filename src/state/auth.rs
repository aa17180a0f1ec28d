use super::StatusMessage;
use crate::api::IdentityService;
use crate::platform::{Page, Platform};
use leptos::prelude::*;
use std::sync::Arc;

const SIGN_UP_OK: &str = "Account created! You can login now.";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct AuthState {
    pub message: Option<StatusMessage>,
}

/// Sign-in / sign-up page. Credentials go to the identity service as typed
/// (only the email is trimmed); its error text is shown unmodified.
#[derive(Clone)]
pub(crate) struct AuthController<I> {
    identity: I,
    platform: Arc<dyn Platform>,
    state: RwSignal<AuthState>,
}

impl<I: IdentityService> AuthController<I> {
    pub fn new(identity: I, platform: Arc<dyn Platform>) -> Self {
        Self {
            identity,
            platform,
            state: RwSignal::new(AuthState::default()),
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> AuthState {
        self.state.get_untracked()
    }

    /// Reactive view of the page state for rendering.
    pub fn view(&self) -> ReadSignal<AuthState> {
        self.state.read_only()
    }

    pub async fn sign_in(&self, email: &str, password: &str) {
        self.state.update(|s| s.message = None);

        match self.identity.sign_in(email.trim(), password).await {
            Ok(session) => {
                log::info!("signed in {}", session.user_id);
                self.platform.navigate(Page::Notes);
            }
            Err(e) => {
                log::warn!("sign in failed: {e}");
                self.state
                    .update(|s| s.message = Some(StatusMessage::failure(e.message)));
            }
        }
    }

    /// Creates the account but stays on this page.
    pub async fn sign_up(&self, email: &str, password: &str) {
        self.state.update(|s| s.message = None);

        match self.identity.sign_up(email.trim(), password).await {
            Ok(session) => {
                log::info!("created account {}", session.user_id);
                self.state
                    .update(|s| s.message = Some(StatusMessage::success(SIGN_UP_OK)));
            }
            Err(e) => {
                log::warn!("sign up failed: {e}");
                self.state
                    .update(|s| s.message = Some(StatusMessage::failure(e.message)));
            }
        }
    }
}
