mod firestore;
mod identity;

pub(crate) use firestore::FirestoreNotes;
pub(crate) use identity::FirebaseAuth;

use crate::models::{NewNote, Note, NoteUpdate, Session};
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ApiErrorKind {
    Unauthorized,
    Network,
    Http,
    Parse,
}

/// A failed backend call. Displays as the service's own message.
#[derive(Clone, Debug, thiserror::Error)]
#[error("{message}")]
pub(crate) struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl ApiError {
    fn network(e: reqwest::Error) -> Self {
        Self {
            kind: ApiErrorKind::Network,
            message: e.to_string(),
        }
    }

    pub(crate) fn parse(e: impl std::fmt::Display) -> Self {
        Self {
            kind: ApiErrorKind::Parse,
            message: e.to_string(),
        }
    }

    pub(crate) fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Unauthorized,
            message: message.into(),
        }
    }

    pub(crate) fn http(message: impl Into<String>) -> Self {
        Self {
            kind: ApiErrorKind::Http,
            message: message.into(),
        }
    }

    fn from_status(status: u16, body: &str) -> Self {
        let message = error_message_from_body(status, body);
        if status == 401 {
            Self::unauthorized(message)
        } else {
            Self::http(message)
        }
    }
}

pub(crate) type ApiResult<T> = Result<T, ApiError>;

/// Callback registered with [`IdentityService::subscribe`].
pub(crate) type AuthListener = Arc<dyn Fn(Option<Session>) + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct SubscriptionId(pub u64);

/// Hosted account service: password sign-in/sign-up and session state.
#[allow(async_fn_in_trait)]
pub(crate) trait IdentityService: Clone + Send + Sync + 'static {
    async fn sign_in(&self, email: &str, password: &str) -> ApiResult<Session>;
    async fn sign_up(&self, email: &str, password: &str) -> ApiResult<Session>;
    async fn sign_out(&self) -> ApiResult<()>;

    fn current_session(&self) -> Option<Session>;

    /// `listener` runs once right away with the current session, then on every
    /// sign-in/sign-out.
    fn subscribe(&self, listener: AuthListener) -> SubscriptionId;
    fn unsubscribe(&self, id: SubscriptionId);
}

/// Hosted document collection holding every user's notes.
#[allow(async_fn_in_trait)]
pub(crate) trait NoteStore: Clone + Send + Sync + 'static {
    /// Returns the backend-assigned id.
    async fn add(&self, note: &NewNote) -> ApiResult<String>;
    async fn update(&self, id: &str, update: &NoteUpdate) -> ApiResult<()>;
    async fn delete(&self, id: &str) -> ApiResult<()>;
    /// All notes owned by `user_id`, newest `updated_at` first.
    async fn list_for_user(&self, user_id: &str) -> ApiResult<Vec<Note>>;
}

/// Pulls a human-readable message out of an error response.
///
/// Firebase services wrap errors as `{"error": {"code": .., "message": ..}}`.
/// Streaming endpoints such as `:runQuery` send a list of those envelopes.
pub(crate) fn error_message_from_body(status: u16, body: &str) -> String {
    let from_envelope = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            let envelope = match v {
                serde_json::Value::Array(items) => items.into_iter().next()?,
                other => other,
            };
            envelope
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(|s| s.to_string())
        });

    match from_envelope {
        Some(message) if !message.trim().is_empty() => message,
        _ if !body.trim().is_empty() => body.trim().to_string(),
        _ => format!("Request failed ({status})"),
    }
}

fn with_auth_headers(
    mut req: reqwest::RequestBuilder,
    token: Option<&str>,
) -> reqwest::RequestBuilder {
    if let Some(token) = token {
        req = req.header("Authorization", format!("Bearer {}", token));
    }
    req
}

/// Send a request and return its JSON body (`Null` for an empty body).
async fn send_json(
    req: reqwest::RequestBuilder,
    token: Option<&str>,
) -> ApiResult<serde_json::Value> {
    let res = with_auth_headers(req, token)
        .send()
        .await
        .map_err(ApiError::network)?;

    let status = res.status();
    let body = res.text().await.map_err(ApiError::network)?;

    if !status.is_success() {
        return Err(ApiError::from_status(status.as_u16(), &body));
    }

    if body.trim().is_empty() {
        return Ok(serde_json::Value::Null);
    }
    serde_json::from_str(&body).map_err(ApiError::parse)
}
