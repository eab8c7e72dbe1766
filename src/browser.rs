//! Browser helpers
//!
//! Session token in `localStorage` and the `?page=` query parameter.

use log::warn;
use wasm_bindgen::JsValue;

const TOKEN_KEY: &str = "taskio.token";

fn storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok()?
}

pub fn load_token() -> Option<String> {
    storage()?.get_item(TOKEN_KEY).ok()?.filter(|t| !t.is_empty())
}

pub fn save_token(token: &str) {
    let saved = storage().map(|s| s.set_item(TOKEN_KEY, token));
    if !matches!(saved, Some(Ok(()))) {
        warn!("could not persist session token");
    }
}

pub fn clear_token() {
    if let Some(storage) = storage() {
        let _ = storage.remove_item(TOKEN_KEY);
    }
}

// ========================
// Location
// ========================

/// Raw `page` parameter of the current URL
pub fn page_param() -> Option<String> {
    let search = web_sys::window()?.location().search().ok()?;
    web_sys::UrlSearchParams::new_with_str(&search).ok()?.get("page")
}

/// Reflect the current page in the address bar without adding history.
pub fn replace_page_param(page: u32) {
    let Some(history) = web_sys::window().and_then(|w| w.history().ok()) else {
        return;
    };
    let url = format!("?page={}", page);
    if history
        .replace_state_with_url(&JsValue::NULL, "", Some(url.as_str()))
        .is_err()
    {
        warn!("could not update page parameter");
    }
}
