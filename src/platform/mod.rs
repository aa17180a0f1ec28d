use crate::models::Theme;

/// The two top-level views.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Page {
    Auth,
    Notes,
}

impl Page {
    pub fn path(self) -> &'static str {
        match self {
            Page::Auth => "/",
            Page::Notes => "/notes",
        }
    }
}

/// Host effects the controllers trigger but do not own.
pub(crate) trait Platform: Send + Sync {
    /// Full document navigation; the target page starts from scratch.
    fn navigate(&self, page: Page);
    /// Blocking yes/no prompt.
    fn confirm(&self, message: &str) -> bool;
    fn apply_theme(&self, theme: Theme);
}

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct BrowserPlatform;

impl Platform for BrowserPlatform {
    fn navigate(&self, page: Page) {
        if let Some(window) = web_sys::window() {
            let _ = window.location().set_href(page.path());
        }
    }

    fn confirm(&self, message: &str) -> bool {
        web_sys::window()
            .and_then(|w| w.confirm_with_message(message).ok())
            .unwrap_or(false)
    }

    fn apply_theme(&self, theme: Theme) {
        let Some(root) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.document_element())
        else {
            return;
        };
        let _ = root
            .class_list()
            .toggle_with_force("dark", theme == Theme::Dark);
    }
}
