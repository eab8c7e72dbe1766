//! Toaster Component
//!
//! Stack of transient notices in the corner of the screen.

use leptos::prelude::*;
use taskio_sync::NoticeLevel;

use crate::store::{store_dismiss_toast, use_ui_store, UiStateStoreFields};

#[component]
pub fn Toaster() -> impl IntoView {
    let store = use_ui_store();

    view! {
        <div class="toaster">
            <For
                each=move || store.toasts().get()
                key=|toast| toast.id
                children=move |toast| {
                    let id = toast.id;
                    let class = match toast.notice.level {
                        NoticeLevel::Success => "toast success",
                        NoticeLevel::Error => "toast error",
                    };
                    view! {
                        <div class=class role="status">
                            <strong class="toast-title">{toast.notice.title.clone()}</strong>
                            <span class="toast-message">{toast.notice.message.clone()}</span>
                            <button class="toast-close" on:click=move |_| store_dismiss_toast(&store, id)>
                                "×"
                            </button>
                        </div>
                    }
                }
            />
        </div>
    }
}
