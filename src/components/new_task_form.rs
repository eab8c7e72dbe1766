//! New Task Form Component
//!
//! Single input for adding a task to the list.

use leptos::prelude::*;
use leptos::task::spawn_local;
use taskio_sync::ApiError;

use crate::components::FieldHint;
use crate::context::use_app_context;

#[component]
pub fn NewTaskForm() -> impl IntoView {
    let ctx = use_app_context();

    let (description, set_description) = signal(String::new());
    let (error, set_error) = signal::<Option<ApiError>>(None);
    let (saving, set_saving) = signal(false);

    let create_task = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if saving.get_untracked() {
            return;
        }
        let text = description.get_untracked();
        let store = ctx.task_store();
        set_saving.set(true);

        spawn_local(async move {
            match store.mutations().create_task(&text).await {
                Ok(()) => {
                    set_description.set(String::new());
                    set_error.set(None);
                }
                Err(err) => set_error.set(Some(err)),
            }
            set_saving.set(false);
        });
    };

    view! {
        <form class="new-task-form" on:submit=create_task>
            <div class="new-task-row">
                <input
                    type="text"
                    placeholder="What needs to be done?"
                    maxlength="255"
                    prop:value=move || description.get()
                    on:input=move |ev| set_description.set(event_target_value(&ev))
                />
                <button type="submit" disabled=move || saving.get()>"Add"</button>
            </div>
            <FieldHint error=error field="description" />
        </form>
    }
}
