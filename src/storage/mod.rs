use serde::{Deserialize, Serialize};

pub(crate) const THEME_KEY: &str = "theme";
pub(crate) const SESSION_KEY: &str = "cloudnotes_session";

/// Device-local key/value persistence (browser localStorage in production).
pub(crate) trait ClientStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str);
    fn remove_item(&self, key: &str);
}

/// `window.localStorage`. Every call is best-effort: a missing window or a
/// storage exception is treated as "nothing stored".
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct BrowserStorage;

impl BrowserStorage {
    fn local_storage() -> Option<web_sys::Storage> {
        web_sys::window().and_then(|w| w.local_storage().ok().flatten())
    }
}

impl ClientStorage for BrowserStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        Self::local_storage()?.get_item(key).ok().flatten()
    }

    fn set_item(&self, key: &str, value: &str) {
        if let Some(storage) = Self::local_storage() {
            warn_on_failure(storage.set_item(key, value), "write", key);
        }
    }

    fn remove_item(&self, key: &str) {
        if let Some(storage) = Self::local_storage() {
            warn_on_failure(storage.remove_item(key), "remove", key);
        }
    }
}

/// Logs a rejected localStorage call. Returns whether it went through.
fn warn_on_failure<E>(result: Result<(), E>, action: &str, key: &str) -> bool {
    match result {
        Ok(()) => true,
        Err(_) => {
            log::warn!("localStorage rejected {action} for {key}");
            false
        }
    }
}

pub(crate) fn load_json<T: for<'de> Deserialize<'de>>(
    storage: &dyn ClientStorage,
    key: &str,
) -> Option<T> {
    let json = storage.get_item(key)?;
    serde_json::from_str(&json).ok()
}

pub(crate) fn save_json<T: Serialize>(storage: &dyn ClientStorage, key: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(json) => storage.set_item(key, &json),
        Err(e) => log::warn!("could not serialize {key}: {e}"),
    }
}


// WASM-only tests (run with `cargo test --target wasm32-unknown-unknown` + wasm-bindgen-test-runner)
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_browser_storage_roundtrip() {
        let storage = BrowserStorage;
        storage.remove_item(THEME_KEY);
        assert!(storage.get_item(THEME_KEY).is_none());

        storage.set_item(THEME_KEY, "dark");
        assert_eq!(storage.get_item(THEME_KEY).as_deref(), Some("dark"));

        storage.remove_item(THEME_KEY);
        assert!(storage.get_item(THEME_KEY).is_none());
    }

    #[wasm_bindgen_test]
    fn test_session_persists_in_local_storage() {
        use crate::models::Session;
        use chrono::{Duration, Utc};

        let storage = BrowserStorage;
        let session = Session {
            user_id: "uid-1".to_string(),
            email: "u@test.com".to_string(),
            id_token: "tok".to_string(),
            refresh_token: "ref".to_string(),
            expires_at: Utc::now() + Duration::hours(1),
        };

        save_json(&storage, SESSION_KEY, &session);
        let loaded: Option<Session> = load_json(&storage, SESSION_KEY);
        assert_eq!(loaded, Some(session));

        storage.remove_item(SESSION_KEY);
        assert!(load_json::<Session>(&storage, SESSION_KEY).is_none());
    }
}
