use super::StatusMessage;
use crate::api::{ApiErrorKind, IdentityService, NoteStore};
use crate::models::{join_tags, parse_tags, NewNote, Note, NoteUpdate, Session, Theme, DEFAULT_COLOR};
use crate::platform::{Page, Platform};
use crate::storage::{ClientStorage, THEME_KEY};
use chrono::{DateTime, Utc};
use leptos::prelude::*;
use std::sync::Arc;

const DELETE_PROMPT: &str = "Delete this note?";

/// Where the notes page is in its sign-in / fetch cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Phase {
    SignedOut,
    /// Initial fetch for this user is outstanding.
    Loading { user_id: String },
    Loaded { user_id: String },
    /// Last fetch failed; the list area shows `message`.
    LoadFailed { user_id: String, message: String },
}

impl Phase {
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Phase::SignedOut => None,
            Phase::Loading { user_id }
            | Phase::Loaded { user_id }
            | Phase::LoadFailed { user_id, .. } => Some(user_id),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub(crate) enum FormError {
    #[error("Note cannot be empty!")]
    Empty,
}

/// Pending contents of the note editor. An empty `note_id` means "new note".
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct NoteForm {
    pub note_id: String,
    pub title: String,
    pub content: String,
    /// Raw comma-separated input.
    pub tags: String,
    pub color: String,
}

impl Default for NoteForm {
    fn default() -> Self {
        Self {
            note_id: String::new(),
            title: String::new(),
            content: String::new(),
            tags: String::new(),
            color: DEFAULT_COLOR.to_string(),
        }
    }
}

impl NoteForm {
    pub fn from_note(note: &Note) -> Self {
        Self {
            note_id: note.id.clone(),
            title: note.title.clone(),
            content: note.content.clone(),
            tags: join_tags(&note.tags),
            color: note.display_color().to_string(),
        }
    }

    pub fn is_editing(&self) -> bool {
        !self.note_id.is_empty()
    }

    fn validate(&self) -> Result<NoteDraft, FormError> {
        let title = self.title.trim();
        let content = self.content.trim();
        if title.is_empty() && content.is_empty() {
            return Err(FormError::Empty);
        }
        Ok(NoteDraft {
            title: title.to_string(),
            content: content.to_string(),
            tags: parse_tags(&self.tags),
            color: self.color.clone(),
        })
    }
}

/// Validated form contents, ready to be written.
struct NoteDraft {
    title: String,
    content: String,
    tags: Vec<String>,
    color: String,
}

impl NoteDraft {
    fn into_new_note(self, user_id: String, now: DateTime<Utc>) -> NewNote {
        NewNote {
            user_id,
            title: self.title,
            content: self.content,
            tags: self.tags,
            color: self.color,
            created_at: now,
            updated_at: now,
        }
    }

    fn into_update(self, now: DateTime<Utc>) -> NoteUpdate {
        NoteUpdate {
            title: self.title,
            content: self.content,
            tags: self.tags,
            color: self.color,
            updated_at: now,
        }
    }
}

/// Everything the notes page renders from.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct NotesState {
    pub phase: Phase,
    /// Full result of the last successful fetch, newest first.
    pub all_notes: Vec<Note>,
    /// `all_notes` narrowed by `query`, same order.
    pub visible: Vec<Note>,
    pub query: String,
    pub form: NoteForm,
    pub status: Option<StatusMessage>,
    pub theme: Theme,
}

impl NotesState {
    fn new(theme: Theme) -> Self {
        Self {
            phase: Phase::SignedOut,
            all_notes: vec![],
            visible: vec![],
            query: String::new(),
            form: NoteForm::default(),
            status: None,
            theme,
        }
    }

    pub fn list_view(&self) -> ListView<'_> {
        match &self.phase {
            Phase::Loading { .. } => ListView::Loading,
            Phase::LoadFailed { message, .. } => ListView::Failed(message),
            Phase::SignedOut | Phase::Loaded { .. } if self.visible.is_empty() => ListView::Empty,
            Phase::SignedOut | Phase::Loaded { .. } => ListView::Notes(&self.visible),
        }
    }

    fn refilter(&mut self) {
        self.visible = filter_notes(&self.all_notes, &self.query);
    }
}

/// What the list area shows.
#[derive(Debug, PartialEq)]
pub(crate) enum ListView<'a> {
    Loading,
    Failed(&'a str),
    Empty,
    Notes(&'a [Note]),
}

/// Case-insensitive substring match over title, content and tags.
/// An empty query keeps everything; order is never changed.
pub(crate) fn filter_notes(notes: &[Note], query: &str) -> Vec<Note> {
    if query.is_empty() {
        return notes.to_vec();
    }
    let q = query.to_lowercase();
    notes
        .iter()
        .filter(|n| {
            n.title.to_lowercase().contains(&q)
                || n.content.to_lowercase().contains(&q)
                || n.tags.join(" ").to_lowercase().contains(&q)
        })
        .cloned()
        .collect()
}

/// Drives the notes page: reacts to identity changes, owns the fetched
/// notes and the editor form, and forwards every mutation to the store
/// followed by a full re-fetch.
#[derive(Clone)]
pub(crate) struct NotesController<I, S> {
    identity: I,
    store: S,
    storage: Arc<dyn ClientStorage>,
    platform: Arc<dyn Platform>,
    state: RwSignal<NotesState>,
}

impl<I: IdentityService, S: NoteStore> NotesController<I, S> {
    /// Restores and applies the persisted theme.
    pub fn new(
        identity: I,
        store: S,
        storage: Arc<dyn ClientStorage>,
        platform: Arc<dyn Platform>,
    ) -> Self {
        let theme = Theme::parse_or_default(storage.get_item(THEME_KEY).as_deref());
        platform.apply_theme(theme);

        Self {
            identity,
            store,
            storage,
            platform,
            state: RwSignal::new(NotesState::new(theme)),
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> NotesState {
        self.state.get_untracked()
    }

    /// Reactive view of the page state for rendering.
    pub fn view(&self) -> ReadSignal<NotesState> {
        self.state.read_only()
    }

    pub fn identity(&self) -> &I {
        &self.identity
    }

    /// Entry point for the identity service's state-change callback.
    pub async fn on_auth_state_changed(&self, session: Option<Session>) {
        match session {
            None => self.enter_signed_out(),
            Some(session) => {
                log::info!("session active for {}", session.user_id);
                self.state.update(|s| {
                    s.phase = Phase::Loading {
                        user_id: session.user_id.clone(),
                    }
                });
                self.reload().await;
            }
        }
    }

    fn enter_signed_out(&self) {
        self.state.update(|s| {
            s.phase = Phase::SignedOut;
            s.all_notes.clear();
            s.visible.clear();
        });
        self.platform.navigate(Page::Auth);
    }

    /// Replace the note list with a fresh fetch for the session's user.
    pub async fn reload(&self) {
        let Some(user_id) = self.state.with_untracked(|s| s.phase.user_id().map(str::to_string)) else {
            return;
        };

        let result = self.store.list_for_user(&user_id).await;

        // The session may have ended or changed while the fetch was out.
        let still_current = self
            .state
            .with_untracked(|s| s.phase.user_id() == Some(user_id.as_str()));
        if !still_current {
            log::debug!("dropping notes fetched for {user_id}: session changed");
            return;
        }

        match result {
            Ok(notes) => {
                log::debug!("fetched {} notes for {}", notes.len(), user_id);
                self.state.update(|s| {
                    s.all_notes = notes;
                    s.refilter();
                    s.phase = Phase::Loaded { user_id };
                });
            }
            Err(e) if e.kind == ApiErrorKind::Unauthorized => {
                log::warn!("session rejected by the note store: {e}");
                if let Err(e) = self.identity.sign_out().await {
                    log::warn!("sign out failed: {e}");
                }
                self.enter_signed_out();
            }
            Err(e) => {
                log::warn!("fetching notes failed: {e}");
                self.state.update(|s| {
                    s.phase = Phase::LoadFailed {
                        user_id,
                        message: e.message,
                    }
                });
            }
        }
    }

    pub fn set_title(&self, value: String) {
        self.state.update(|s| s.form.title = value);
    }

    pub fn set_content(&self, value: String) {
        self.state.update(|s| s.form.content = value);
    }

    pub fn set_tags(&self, value: String) {
        self.state.update(|s| s.form.tags = value);
    }

    pub fn select_color(&self, color: &str) {
        self.state.update(|s| s.form.color = color.to_string());
    }

    /// Create or update from the form, then clear it and re-fetch.
    pub async fn save(&self) {
        let (user_id, form) = self
            .state
            .with_untracked(|s| (s.phase.user_id().map(str::to_string), s.form.clone()));
        let Some(user_id) = user_id else {
            log::warn!("save ignored without a session");
            return;
        };

        let draft = match form.validate() {
            Ok(draft) => draft,
            Err(e) => {
                self.state
                    .update(|s| s.status = Some(StatusMessage::failure(e.to_string())));
                return;
            }
        };

        let now = Utc::now();
        let result = if form.is_editing() {
            self.store
                .update(&form.note_id, &draft.into_update(now))
                .await
                .map(|()| {
                    log::info!("updated note {}", form.note_id);
                    "Note updated!"
                })
        } else {
            self.store
                .add(&draft.into_new_note(user_id, now))
                .await
                .map(|id| {
                    log::info!("created note {id}");
                    "Note added!"
                })
        };

        match result {
            Ok(message) => {
                self.state.update(|s| {
                    s.status = Some(StatusMessage::success(message));
                    s.form = NoteForm::default();
                });
                self.reload().await;
            }
            Err(e) => {
                log::warn!("saving note failed: {e}");
                self.state
                    .update(|s| s.status = Some(StatusMessage::failure(e.message)));
            }
        }
    }

    /// Reset the form and drop any status line.
    pub fn clear(&self) {
        self.state.update(|s| {
            s.form = NoteForm::default();
            s.status = None;
        });
    }

    /// Load `note` into the form. Nothing is locked; the last save wins.
    pub fn edit(&self, note: &Note) {
        self.state.update(|s| {
            s.form = NoteForm::from_note(note);
            s.status = Some(StatusMessage::info("Editing existing note..."));
        });
    }

    /// Ask first; on yes, delete and re-fetch.
    pub async fn delete(&self, note: &Note) {
        if !self.platform.confirm(DELETE_PROMPT) {
            return;
        }

        match self.store.delete(&note.id).await {
            Ok(()) => {
                log::info!("deleted note {}", note.id);
                self.reload().await;
            }
            Err(e) => {
                log::warn!("deleting note {} failed: {e}", note.id);
                self.state
                    .update(|s| s.status = Some(StatusMessage::failure(e.message)));
            }
        }
    }

    /// Purely local: narrows the visible list without a backend call.
    pub fn search(&self, query: &str) {
        self.state.update(|s| {
            s.query = query.to_string();
            s.refilter();
        });
    }

    pub async fn logout(&self) {
        match self.identity.sign_out().await {
            Ok(()) => self.platform.navigate(Page::Auth),
            Err(e) => {
                log::warn!("sign out failed: {e}");
                self.state
                    .update(|s| s.status = Some(StatusMessage::failure(e.message)));
            }
        }
    }

    pub fn set_theme(&self, theme: Theme) {
        self.platform.apply_theme(theme);
        self.storage.set_item(THEME_KEY, theme.as_ref());
        self.state.update(|s| s.theme = theme);
    }
}
