use crate::api::{FirebaseAuth, FirestoreNotes};
use crate::config::FirebaseConfig;
use crate::pages::{AuthPage, NotesPage};
use crate::platform::{BrowserPlatform, Platform};
use crate::storage::{BrowserStorage, ClientStorage};
use leptos::prelude::*;
use leptos_router::components::{Route, Router, Routes};
use leptos_router::path;
use std::sync::Arc;

/// Backend clients and host adapters shared by both pages.
#[derive(Clone)]
pub(crate) struct AppContext {
    pub identity: FirebaseAuth,
    pub store: FirestoreNotes,
    pub storage: Arc<dyn ClientStorage>,
    pub platform: Arc<dyn Platform>,
}

impl AppContext {
    pub fn new(config: FirebaseConfig) -> Self {
        let config = Arc::new(config);
        let storage: Arc<dyn ClientStorage> = Arc::new(BrowserStorage);
        let identity = FirebaseAuth::new(config.clone(), storage.clone());
        let store = FirestoreNotes::new(config, identity.clone());

        Self {
            identity,
            store,
            storage,
            platform: Arc::new(BrowserPlatform),
        }
    }
}

/// Expects an [`AppContext`] in context.
#[component]
pub fn App() -> impl IntoView {
    // IMPORTANT:
    // - Leptos CSR requires the `csr` feature on `leptos`.
    // - router hooks require a <Router> context.
    view! {
        <Router>
            <Routes fallback=|| view! { <div class="px-4 py-8 text-xs text-muted-foreground">"Not found"</div> }>
                <Route path=path!("notes") view=NotesPage />
                <Route path=path!("") view=AuthPage />
            </Routes>
        </Router>
    }
}
