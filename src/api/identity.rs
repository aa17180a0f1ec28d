use super::{
    send_json, ApiError, ApiErrorKind, ApiResult, AuthListener, IdentityService, SubscriptionId,
};
use crate::config::FirebaseConfig;
use crate::models::Session;
use crate::storage::{load_json, save_json, ClientStorage, SESSION_KEY};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Token lifetime the service uses when `expiresIn` is absent.
const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
struct PasswordAuthRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PasswordAuthResponse {
    pub local_id: String,
    #[serde(default)]
    pub email: String,
    pub id_token: String,
    #[serde(default)]
    pub refresh_token: String,
    /// Seconds, sent as a decimal string.
    #[serde(default)]
    pub expires_in: Option<String>,
}

impl PasswordAuthResponse {
    pub(crate) fn into_session(self, now: DateTime<Utc>) -> Session {
        Session {
            user_id: self.local_id,
            email: self.email,
            id_token: self.id_token,
            refresh_token: self.refresh_token,
            expires_at: expiry(self.expires_in.as_deref(), now),
        }
    }
}

#[derive(Serialize, Clone, Debug)]
struct RefreshTokenRequest<'a> {
    grant_type: &'a str,
    refresh_token: &'a str,
}

/// Secure Token exchange result. Unlike Identity Toolkit it uses snake_case.
#[derive(Deserialize, Clone, Debug)]
pub(crate) struct RefreshTokenResponse {
    pub id_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: Option<String>,
}

impl RefreshTokenResponse {
    /// Same user, new tokens.
    pub(crate) fn refresh(self, previous: Session, now: DateTime<Utc>) -> Session {
        Session {
            id_token: self.id_token,
            refresh_token: self.refresh_token,
            expires_at: expiry(self.expires_in.as_deref(), now),
            ..previous
        }
    }
}

fn expiry(expires_in: Option<&str>, now: DateTime<Utc>) -> DateTime<Utc> {
    let secs = expires_in
        .and_then(|s| s.trim().parse::<i64>().ok())
        .unwrap_or(DEFAULT_EXPIRES_IN_SECS);
    now + Duration::seconds(secs)
}

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(SubscriptionId, AuthListener)>,
}

/// Identity Toolkit REST client with the session persisted in client storage,
/// so a freshly loaded page picks up the signed-in user.
#[derive(Clone)]
pub(crate) struct FirebaseAuth {
    config: Arc<FirebaseConfig>,
    storage: Arc<dyn ClientStorage>,
    listeners: Arc<Mutex<Listeners>>,
}

impl FirebaseAuth {
    pub fn new(config: Arc<FirebaseConfig>, storage: Arc<dyn ClientStorage>) -> Self {
        Self {
            config,
            storage,
            listeners: Arc::new(Mutex::new(Listeners::default())),
        }
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "{}/accounts:{}?key={}",
            self.config.auth_url,
            action,
            urlencoding::encode(&self.config.api_key)
        )
    }

    fn token_endpoint(&self) -> String {
        format!(
            "{}/token?key={}",
            self.config.token_url,
            urlencoding::encode(&self.config.api_key)
        )
    }

    async fn password_request(&self, action: &str, email: &str, password: &str) -> ApiResult<Session> {
        let req = reqwest::Client::new()
            .post(self.endpoint(action))
            .json(&PasswordAuthRequest {
                email,
                password,
                return_secure_token: true,
            });

        let data = send_json(req, None).await?;
        let parsed: PasswordAuthResponse = serde_json::from_value(data).map_err(ApiError::parse)?;
        let session = parsed.into_session(Utc::now());

        save_json(self.storage.as_ref(), SESSION_KEY, &session);
        log::info!("signed in as {}", session.user_id);
        self.notify(Some(session.clone()));
        Ok(session)
    }

    /// The current session with a usable id token. An expired token is
    /// exchanged for a new one first; the session only ends when the token
    /// service rejects the refresh token.
    pub async fn active_session(&self) -> ApiResult<Session> {
        let Some(session) = self.current_session() else {
            return Err(ApiError::unauthorized("Not signed in"));
        };
        if !session.is_expired_at(Utc::now()) {
            return Ok(session);
        }

        let user_id = session.user_id.clone();
        match self.refresh(session).await {
            Ok(fresh) => Ok(fresh),
            Err(e) if e.kind == ApiErrorKind::Network => Err(e),
            Err(e) => {
                log::warn!("refreshing the session for {user_id} failed: {e}");
                self.storage.remove_item(SESSION_KEY);
                self.notify(None);
                Err(ApiError::unauthorized(e.message))
            }
        }
    }

    async fn refresh(&self, session: Session) -> ApiResult<Session> {
        let req = reqwest::Client::new()
            .post(self.token_endpoint())
            .json(&RefreshTokenRequest {
                grant_type: "refresh_token",
                refresh_token: &session.refresh_token,
            });

        let data = send_json(req, None).await?;
        let parsed: RefreshTokenResponse = serde_json::from_value(data).map_err(ApiError::parse)?;
        let session = parsed.refresh(session, Utc::now());

        save_json(self.storage.as_ref(), SESSION_KEY, &session);
        log::debug!("refreshed id token for {}", session.user_id);
        Ok(session)
    }

    fn lock_listeners(&self) -> MutexGuard<'_, Listeners> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self, session: Option<Session>) {
        // Clone out under the lock; listeners may call back into `self`.
        let listeners: Vec<AuthListener> = self
            .lock_listeners()
            .entries
            .iter()
            .map(|(_, f)| f.clone())
            .collect();
        for listener in listeners {
            listener(session.clone());
        }
    }
}

impl IdentityService for FirebaseAuth {
    async fn sign_in(&self, email: &str, password: &str) -> ApiResult<Session> {
        self.password_request("signInWithPassword", email, password).await
    }

    async fn sign_up(&self, email: &str, password: &str) -> ApiResult<Session> {
        self.password_request("signUp", email, password).await
    }

    async fn sign_out(&self) -> ApiResult<()> {
        self.storage.remove_item(SESSION_KEY);
        log::info!("signed out");
        self.notify(None);
        Ok(())
    }

    /// Expired sessions stay current while they hold a refresh token;
    /// `active_session` renews them on first use.
    fn current_session(&self) -> Option<Session> {
        let session: Session = load_json(self.storage.as_ref(), SESSION_KEY)?;
        if session.is_expired_at(Utc::now()) && !session.can_refresh() {
            log::info!("stored session for {} has expired", session.user_id);
            self.storage.remove_item(SESSION_KEY);
            return None;
        }
        Some(session)
    }

    fn subscribe(&self, listener: AuthListener) -> SubscriptionId {
        let id = {
            let mut l = self.lock_listeners();
            l.next_id += 1;
            let id = SubscriptionId(l.next_id);
            l.entries.push((id, listener.clone()));
            id
        };
        listener(self.current_session());
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.lock_listeners().entries.retain(|(entry, _)| *entry != id);
    }
}
