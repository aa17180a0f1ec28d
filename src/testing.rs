//! In-memory stand-ins for the hosted services and the browser, used by the
//! native unit tests.

use crate::api::{
    ApiError, ApiResult, AuthListener, IdentityService, NoteStore, SubscriptionId,
};
use crate::models::{NewNote, Note, NoteUpdate, Session, Theme};
use crate::platform::{Page, Platform};
use crate::storage::ClientStorage;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
pub(crate) struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl ClientStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.lock().unwrap().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) {
        self.items
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    fn remove_item(&self, key: &str) {
        self.items.lock().unwrap().remove(key);
    }
}

#[derive(Default)]
pub(crate) struct RecordingPlatform {
    navigations: Mutex<Vec<Page>>,
    prompts: Mutex<Vec<String>>,
    themes: Mutex<Vec<Theme>>,
    confirm_answer: AtomicBool,
}

impl RecordingPlatform {
    pub fn answer_confirm(&self, yes: bool) {
        self.confirm_answer.store(yes, Ordering::SeqCst);
    }

    pub fn navigations(&self) -> Vec<Page> {
        self.navigations.lock().unwrap().clone()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn themes(&self) -> Vec<Theme> {
        self.themes.lock().unwrap().clone()
    }
}

impl Platform for RecordingPlatform {
    fn navigate(&self, page: Page) {
        self.navigations.lock().unwrap().push(page);
    }

    fn confirm(&self, message: &str) -> bool {
        self.prompts.lock().unwrap().push(message.to_string());
        self.confirm_answer.load(Ordering::SeqCst)
    }

    fn apply_theme(&self, theme: Theme) {
        self.themes.lock().unwrap().push(theme);
    }
}

#[derive(Default)]
struct IdentityInner {
    /// email -> (password, user id)
    accounts: HashMap<String, (String, String)>,
    session: Option<Session>,
    listeners: Vec<(SubscriptionId, AuthListener)>,
    next_id: u64,
    sign_up_calls: usize,
    sign_out_error: Option<ApiError>,
}

/// Accepts any password of six or more characters, like the hosted service.
#[derive(Clone, Default)]
pub(crate) struct FakeIdentity {
    inner: Arc<Mutex<IdentityInner>>,
}

impl FakeIdentity {
    fn session_for(email: &str, user_id: &str) -> Session {
        Session {
            user_id: user_id.to_string(),
            email: email.to_string(),
            id_token: format!("token-{user_id}"),
            refresh_token: String::new(),
            expires_at: Utc::now() + Duration::hours(1),
        }
    }

    fn create_account(inner: &mut IdentityInner, email: &str, password: &str) -> String {
        let user_id = format!("uid-{}", inner.accounts.len() + 1);
        inner
            .accounts
            .insert(email.to_string(), (password.to_string(), user_id.clone()));
        user_id
    }

    /// Registers the account (if new) and makes it the current session,
    /// without notifying listeners.
    pub fn seed_session(&self, email: &str, password: &str) -> Session {
        let mut inner = self.inner.lock().unwrap();
        let user_id = match inner.accounts.get(email) {
            Some((_, id)) => id.clone(),
            None => Self::create_account(&mut inner, email, password),
        };
        let session = Self::session_for(email, &user_id);
        inner.session = Some(session.clone());
        session
    }

    /// The next `sign_out` fails with `e` and keeps the session.
    pub fn fail_next_sign_out(&self, e: ApiError) {
        self.inner.lock().unwrap().sign_out_error = Some(e);
    }

    pub fn sign_up_calls(&self) -> usize {
        self.inner.lock().unwrap().sign_up_calls
    }

    fn set_session(&self, session: Option<Session>) {
        let listeners: Vec<AuthListener> = {
            let mut inner = self.inner.lock().unwrap();
            inner.session = session.clone();
            inner.listeners.iter().map(|(_, f)| f.clone()).collect()
        };
        for listener in listeners {
            listener(session.clone());
        }
    }
}

impl IdentityService for FakeIdentity {
    async fn sign_in(&self, email: &str, password: &str) -> ApiResult<Session> {
        let user_id = {
            let inner = self.inner.lock().unwrap();
            match inner.accounts.get(email) {
                Some((pw, id)) if pw == password => id.clone(),
                _ => return Err(ApiError::http("INVALID_LOGIN_CREDENTIALS")),
            }
        };
        let session = Self::session_for(email, &user_id);
        self.set_session(Some(session.clone()));
        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &str) -> ApiResult<Session> {
        let user_id = {
            let mut inner = self.inner.lock().unwrap();
            inner.sign_up_calls += 1;
            if inner.accounts.contains_key(email) {
                return Err(ApiError::http("EMAIL_EXISTS"));
            }
            if password.len() < 6 {
                return Err(ApiError::http(
                    "WEAK_PASSWORD : Password should be at least 6 characters",
                ));
            }
            Self::create_account(&mut inner, email, password)
        };
        let session = Self::session_for(email, &user_id);
        self.set_session(Some(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> ApiResult<()> {
        if let Some(e) = self.inner.lock().unwrap().sign_out_error.take() {
            return Err(e);
        }
        self.set_session(None);
        Ok(())
    }

    fn current_session(&self) -> Option<Session> {
        self.inner.lock().unwrap().session.clone()
    }

    fn subscribe(&self, listener: AuthListener) -> SubscriptionId {
        let (id, session) = {
            let mut inner = self.inner.lock().unwrap();
            inner.next_id += 1;
            let id = SubscriptionId(inner.next_id);
            inner.listeners.push((id, listener.clone()));
            (id, inner.session.clone())
        };
        listener(session);
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.inner
            .lock()
            .unwrap()
            .listeners
            .retain(|(entry, _)| *entry != id);
    }
}

#[derive(Default)]
struct StoreInner {
    notes: Vec<Note>,
    next_id: u64,
    calls: usize,
    list_calls: Vec<String>,
    fail_next: Option<ApiError>,
    on_next_list: Option<Box<dyn FnOnce() + Send>>,
}

impl StoreInner {
    fn begin_call(&mut self) -> ApiResult<()> {
        self.calls += 1;
        match self.fail_next.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Document collection kept in a vector; queries sort by `updated_at`
/// descending like the hosted store's index.
#[derive(Clone, Default)]
pub(crate) struct MemoryNoteStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl MemoryNoteStore {
    pub fn insert(&self, note: Note) {
        self.inner.lock().unwrap().notes.push(note);
    }

    pub fn fail_next(&self, e: ApiError) {
        self.inner.lock().unwrap().fail_next = Some(e);
    }

    /// Runs `f` once, after the next query has been answered but before
    /// the caller sees the result.
    pub fn on_next_list(&self, f: impl FnOnce() + Send + 'static) {
        self.inner.lock().unwrap().on_next_list = Some(Box::new(f));
    }

    pub fn calls(&self) -> usize {
        self.inner.lock().unwrap().calls
    }

    pub fn list_calls(&self) -> Vec<String> {
        self.inner.lock().unwrap().list_calls.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().notes.is_empty()
    }
}

impl NoteStore for MemoryNoteStore {
    async fn add(&self, note: &NewNote) -> ApiResult<String> {
        let mut inner = self.inner.lock().unwrap();
        inner.begin_call()?;
        inner.next_id += 1;
        let id = format!("note-{}", inner.next_id);
        inner.notes.push(Note {
            id: id.clone(),
            user_id: note.user_id.clone(),
            title: note.title.clone(),
            content: note.content.clone(),
            tags: note.tags.clone(),
            color: note.color.clone(),
            created_at: Some(note.created_at),
            updated_at: Some(note.updated_at),
        });
        Ok(id)
    }

    async fn update(&self, id: &str, update: &NoteUpdate) -> ApiResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.begin_call()?;
        let note = inner
            .notes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| ApiError::http(format!("No document to update: {id}")))?;
        note.title = update.title.clone();
        note.content = update.content.clone();
        note.tags = update.tags.clone();
        note.color = update.color.clone();
        note.updated_at = Some(update.updated_at);
        Ok(())
    }

    async fn delete(&self, id: &str) -> ApiResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.begin_call()?;
        inner.notes.retain(|n| n.id != id);
        Ok(())
    }

    async fn list_for_user(&self, user_id: &str) -> ApiResult<Vec<Note>> {
        let (result, hook) = {
            let mut inner = self.inner.lock().unwrap();
            let result = inner.begin_call().map(|()| {
                inner.list_calls.push(user_id.to_string());
                let mut notes: Vec<Note> = inner
                    .notes
                    .iter()
                    .filter(|n| n.user_id == user_id)
                    .cloned()
                    .collect();
                notes.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
                notes
            });
            (result, inner.on_next_list.take())
        };
        if let Some(hook) = hook {
            hook();
        }
        result
    }
}
