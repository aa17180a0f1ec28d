const DEFAULT_AUTH_URL: &str = "https://identitytoolkit.googleapis.com/v1";
const DEFAULT_FIRESTORE_URL: &str = "https://firestore.googleapis.com/v1";
const DEFAULT_TOKEN_URL: &str = "https://securetoken.googleapis.com/v1";

/// Backend connectivity, read once from the page's `window.ENV` object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct FirebaseConfig {
    pub api_key: String,
    pub project_id: String,
    pub auth_url: String,
    pub firestore_url: String,
    /// Secure Token service, exchanges refresh tokens for new id tokens.
    pub token_url: String,
    pub log_level: log::LevelFilter,
}

impl FirebaseConfig {
    pub fn new(api_key: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            project_id: project_id.into(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            firestore_url: DEFAULT_FIRESTORE_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            log_level: log::LevelFilter::Info,
        }
    }

    /// Point both services somewhere else (e.g. the local emulators).
    pub fn with_urls(mut self, auth_url: &str, firestore_url: &str) -> Self {
        self.auth_url = normalize_base_url(auth_url);
        self.firestore_url = normalize_base_url(firestore_url);
        self
    }

    pub fn with_token_url(mut self, token_url: &str) -> Self {
        self.token_url = normalize_base_url(token_url);
        self
    }

    pub fn from_window() -> Self {
        let auth_url = env_string(&["AUTH_URL", "auth_url"])
            .unwrap_or_else(|| DEFAULT_AUTH_URL.to_string());
        let firestore_url = env_string(&["FIRESTORE_URL", "firestore_url"])
            .unwrap_or_else(|| DEFAULT_FIRESTORE_URL.to_string());
        let token_url = env_string(&["TOKEN_URL", "token_url"])
            .unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string());

        let mut cfg = Self::new(
            env_string(&["FIREBASE_API_KEY", "firebase_api_key"]).unwrap_or_default(),
            env_string(&["FIREBASE_PROJECT_ID", "firebase_project_id"]).unwrap_or_default(),
        )
        .with_urls(&auth_url, &firestore_url)
        .with_token_url(&token_url);

        if let Some(level) = env_string(&["LOG_LEVEL", "log_level"]) {
            cfg.log_level = parse_log_level(&level);
        }
        cfg
    }

    pub fn is_complete(&self) -> bool {
        !self.api_key.trim().is_empty() && !self.project_id.trim().is_empty()
    }

    /// Root of the document tree: `.../projects/{p}/databases/(default)/documents`.
    pub fn documents_url(&self) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents",
            self.firestore_url, self.project_id
        )
    }
}

/// First string-valued key of `window.ENV` among `keys`.
fn env_string(keys: &[&str]) -> Option<String> {
    let window = web_sys::window()?;
    let env = window.get("ENV")?;
    if env.is_undefined() || !env.is_object() {
        return None;
    }
    keys.iter().find_map(|k| {
        js_sys::Reflect::get(&env, &(*k).into())
            .ok()
            .and_then(|v| v.as_string())
    })
}

pub(crate) fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

pub(crate) fn parse_log_level(value: &str) -> log::LevelFilter {
    value.trim().parse().unwrap_or(log::LevelFilter::Info)
}
