//! Profile Sheet Component
//!
//! Side panel for changing the display name and, optionally, the password.

use leptos::prelude::*;
use leptos::task::spawn_local;
use taskio_sync::{ApiError, ProfileUpdate};

use crate::components::FieldHint;
use crate::context::use_app_context;
use crate::store::{store_set_user, use_ui_store, UiStateStoreFields};

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

#[component]
pub fn ProfileSheet(#[prop(into)] on_close: Callback<()>) -> impl IntoView {
    let ctx = use_app_context();
    let ui = use_ui_store();

    let initial_name = ui.user().with_untracked(|user| user.as_ref().map(|u| u.name.clone()).unwrap_or_default());
    let (name, set_name) = signal(initial_name);
    let (old_password, set_old_password) = signal(String::new());
    let (new_password, set_new_password) = signal(String::new());
    let (error, set_error) = signal::<Option<ApiError>>(None);
    let (saving, set_saving) = signal(false);

    let save = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let Some(user_id) = ui.user().with_untracked(|user| user.as_ref().map(|u| u.id)) else {
            return;
        };
        let update = ProfileUpdate {
            name: name.get_untracked(),
            old_password: non_empty(old_password.get_untracked()),
            new_password: non_empty(new_password.get_untracked()),
        };
        let store = ctx.task_store();
        set_saving.set(true);
        spawn_local(async move {
            match store.update_profile(user_id, &update).await {
                Ok(()) => {
                    if let Ok(user) = store.current_user().await {
                        store_set_user(&ui, Some(user));
                    }
                    on_close.run(());
                }
                Err(err) => {
                    set_error.try_set(Some(err));
                }
            }
            set_saving.try_set(false);
        });
    };

    view! {
        <aside class="profile-sheet">
            <header class="sheet-header">
                <h2>"Profile"</h2>
                <button class="modal-close" on:click=move |_| on_close.run(())>"×"</button>
            </header>
            <form class="profile-form" on:submit=save>
                <label>
                    "Name"
                    <input
                        type="text"
                        prop:value=move || name.get()
                        on:input=move |ev| set_name.set(event_target_value(&ev))
                    />
                </label>
                <FieldHint error=error field="name" />
                <label>
                    "Current password"
                    <input
                        type="password"
                        autocomplete="current-password"
                        prop:value=move || old_password.get()
                        on:input=move |ev| set_old_password.set(event_target_value(&ev))
                    />
                </label>
                <FieldHint error=error field="oldPassword" />
                <label>
                    "New password"
                    <input
                        type="password"
                        autocomplete="new-password"
                        prop:value=move || new_password.get()
                        on:input=move |ev| set_new_password.set(event_target_value(&ev))
                    />
                </label>
                <FieldHint error=error field="newPassword" />
                <button type="submit" disabled=move || saving.get()>"Save"</button>
            </form>
        </aside>
    }
}
