//! UI State Store
//!
//! Uses Leptos reactive_stores for what only the view needs: the toasts on
//! screen and the signed-in user. Server data lives in the query cache.

use leptos::prelude::*;
use reactive_stores::Store;
use taskio_sync::{Notice, User};

/// A notice currently on screen
#[derive(Clone, Debug, PartialEq)]
pub struct Toast {
    pub id: u64,
    pub notice: Notice,
}

#[derive(Clone, Debug, Default, Store)]
pub struct UiState {
    /// Oldest first
    pub toasts: Vec<Toast>,
    /// Set once `/users/me` has loaded
    pub user: Option<User>,
    pub next_toast_id: u64,
}

pub type UiStore = Store<UiState>;

pub fn use_ui_store() -> UiStore {
    expect_context::<UiStore>()
}

// ========================
// Store Helper Functions
// ========================

/// Show a notice; returns the toast id for dismissal.
pub fn store_push_toast(store: &UiStore, notice: Notice) -> u64 {
    let id = {
        let next_field = store.next_toast_id();
        let mut next = next_field.write();
        *next += 1;
        *next
    };
    store.toasts().write().push(Toast { id, notice });
    id
}

pub fn store_dismiss_toast(store: &UiStore, id: u64) {
    store.toasts().write().retain(|toast| toast.id != id);
}

pub fn store_set_user(store: &UiStore, user: Option<User>) {
    store.user().set(user);
}
