use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default swatch; also what an uncolored note renders as.
pub(crate) const DEFAULT_COLOR: &str = "#ffffff";

/// Fixed swatch palette offered by the note form.
pub(crate) const PALETTE: [&str; 6] = [
    DEFAULT_COLOR,
    "#ffcc00",
    "#ffadad",
    "#caffbf",
    "#9bf6ff",
    "#bdb2ff",
];

/// A note document as returned by the store.
///
/// Fields are trusted as-is; anything missing in the stored document decodes
/// to an empty value.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Note {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub color: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Note {
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            "(No title)"
        } else {
            &self.title
        }
    }

    pub fn display_color(&self) -> &str {
        if self.color.is_empty() {
            DEFAULT_COLOR
        } else {
            &self.color
        }
    }
}

/// Field set written when a note is first created.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct NewNote {
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Mutable fields overwritten on save of an existing note.
/// `user_id` and `created_at` are never part of an update.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct NoteUpdate {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub color: String,
    pub updated_at: DateTime<Utc>,
}

/// Authenticated session reported by the identity service.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Session {
    pub user_id: String,
    pub email: String,
    pub id_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn can_refresh(&self) -> bool {
        !self.refresh_token.is_empty()
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    strum::Display,
    strum::AsRefStr,
    strum::EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Unknown or missing values fall back to light.
    pub fn parse_or_default(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }
}

/// Split a comma-separated tags field into trimmed, non-empty tags.
/// Order is kept and duplicates are allowed.
pub(crate) fn parse_tags(input: &str) -> Vec<String> {
    input
        .trim()
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

pub(crate) fn join_tags(tags: &[String]) -> String {
    tags.join(", ")
}
