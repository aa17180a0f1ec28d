mod auth;
mod notes;

pub use auth::AuthPage;
pub use notes::NotesPage;

use crate::state::Tone;

fn tone_class(tone: Tone) -> &'static str {
    match tone {
        Tone::Success => "text-green-600 dark:text-green-400",
        Tone::Failure => "text-destructive",
        Tone::Info => "text-blue-600 dark:text-blue-400",
    }
}
