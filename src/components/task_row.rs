//! Task Row Component
//!
//! One task in the list: completion checkbox, inline edit, comments and
//! delete.

use leptos::prelude::*;
use leptos::task::spawn_local;
use taskio_sync::{ApiError, Task};

use crate::components::{ConfirmDelete, FieldHint};
use crate::context::use_app_context;

#[component]
pub fn TaskRow(
    task: Task,
    /// Opens the comments dialog for `(id, description)`
    #[prop(into)]
    on_comments: Callback<(u32, String)>,
) -> impl IntoView {
    let ctx = use_app_context();

    let id = task.id;
    let completed = task.completed;
    let description = task.description.clone();

    let (editing, set_editing) = signal(false);
    let (draft, set_draft) = signal(description.clone());
    let (error, set_error) = signal::<Option<ApiError>>(None);
    let (checked, set_checked) = signal(completed);
    let (deleting, set_deleting) = signal(false);

    // Failures are announced by the coordinator; the row only restores its own state
    let toggle = move |_| {
        let store = ctx.task_store();
        set_checked.set(!completed);
        spawn_local(async move {
            if store.mutations().complete_task(id, !completed).await.is_err() {
                set_checked.try_set(completed);
            }
        });
    };

    let save = move || {
        let text = draft.get_untracked();
        let store = ctx.task_store();
        spawn_local(async move {
            match store.mutations().edit_task(id, &text).await {
                Ok(()) => {
                    set_error.set(None);
                    set_editing.set(false);
                }
                Err(err) => set_error.set(Some(err)),
            }
        });
    };

    let original = description.clone();
    let cancel = move || {
        set_draft.set(original.clone());
        set_error.set(None);
        set_editing.set(false);
    };

    let delete = move |()| {
        let store = ctx.task_store();
        set_deleting.set(true);
        spawn_local(async move {
            if store.mutations().delete_task(id).await.is_err() {
                set_deleting.try_set(false);
            }
        });
    };

    let comments_title = description.clone();

    view! {
        <div class=if completed { "task-row completed" } else { "task-row" }>
            <input type="checkbox" prop:checked=move || checked.get() on:change=toggle />

            {move || if editing.get() {
                let cancel = cancel.clone();
                view! {
                    <div class="task-edit">
                        <input
                            type="text"
                            class="task-edit-input"
                            maxlength="255"
                            prop:value=move || draft.get()
                            on:input=move |ev| set_draft.set(event_target_value(&ev))
                            on:keydown=move |ev: web_sys::KeyboardEvent| match ev.key().as_str() {
                                "Enter" => save(),
                                "Escape" => cancel(),
                                _ => {}
                            }
                        />
                        <FieldHint error=error field="description" />
                    </div>
                }.into_any()
            } else {
                view! {
                    <span class="task-text" title="Double-click to edit" on:dblclick=move |_| set_editing.set(true)>
                        {description.clone()}
                    </span>
                }.into_any()
            }}

            <button
                class="comments-btn"
                title="Comments"
                on:click=move |_| on_comments.run((id, comments_title.clone()))
            >
                "💬"
            </button>
            <ConfirmDelete prompt="Delete task?" pending=deleting on_confirm=delete />
        </div>
    }
}
