mod api;
mod app;
mod components;
mod config;
mod logging;
mod models;
mod pages;
mod platform;
mod state;
mod storage;
#[cfg(test)]
mod testing;

use crate::app::{App, AppContext};
use crate::config::FirebaseConfig;
use leptos::prelude::*;

// Needed for `#[wasm_bindgen(start)]` on the wasm entrypoint.
#[cfg(all(target_arch = "wasm32", not(test)))]
use wasm_bindgen::prelude::wasm_bindgen;

// Only register the WASM start function for normal builds (not for tests),
// otherwise wasm-bindgen-test will end up with multiple entry symbols.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() {
    console_error_panic_hook::set_once();

    let config = FirebaseConfig::from_window();
    logging::init(config.log_level);
    if !config.is_complete() {
        log::warn!("window.ENV is missing the Firebase api key or project id");
    }
    log::info!("cloudnotes starting (project: {})", config.project_id);

    mount_to_body(move || {
        provide_context(AppContext::new(config));
        view! { <App /> }
    });
}
