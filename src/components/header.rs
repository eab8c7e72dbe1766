//! Header Component
//!
//! App title, the signed-in user and the session actions.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::components::ProfileSheet;
use crate::context::use_app_context;
use crate::store::{store_set_user, use_ui_store, UiStateStoreFields};

#[component]
pub fn Header() -> impl IntoView {
    let ctx = use_app_context();
    let ui = use_ui_store();
    let (profile_open, set_profile_open) = signal(false);

    // Load the profile once per session
    let store = ctx.task_store();
    spawn_local(async move {
        if let Ok(user) = store.current_user().await {
            store_set_user(&ui, Some(user));
        }
    });

    let user_name = move || ui.user().with(|user| user.as_ref().map(|u| u.name.clone()).unwrap_or_default());

    view! {
        <header class="app-header">
            <h1>"Task.io"</h1>
            <div class="header-actions">
                <span class="user-name">{user_name}</span>
                <button class="profile-btn" on:click=move |_| set_profile_open.set(true)>"Profile"</button>
                <button class="sign-out-btn" on:click=move |_| ctx.end_session()>"Sign out"</button>
            </div>
            <Show when=move || profile_open.get()>
                <ProfileSheet on_close=move |()| set_profile_open.set(false) />
            </Show>
        </header>
    }
}
