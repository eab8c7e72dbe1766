//! Comments Dialog Component
//!
//! Modal listing the comments of one task, with a form to add one and a
//! delete button per comment. Follows the cached list through a cache
//! subscription, so optimistic removals and rollbacks show up immediately.
//! A fetch still pending when the dialog closes is discarded.

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::debug;
use taskio_sync::{ApiError, CacheEvent, Comment, QueryData, QueryKey, StaleGuard};

use crate::components::{ConfirmDelete, FieldHint};
use crate::context::use_app_context;

#[component]
pub fn CommentsDialog(task_id: u32, title: String, #[prop(into)] on_close: Callback<()>) -> impl IntoView {
    let ctx = use_app_context();
    let store = ctx.task_store();

    let comments = RwSignal::new(None::<Vec<Comment>>);
    let (load_error, set_load_error) = signal::<Option<String>>(None);
    let (content, set_content) = signal(String::new());
    let (form_error, set_form_error) = signal::<Option<ApiError>>(None);
    let (saving, set_saving) = signal(false);

    let subscription = store.cache().subscribe(QueryKey::comments(task_id), move |event| {
        if let CacheEvent::Updated {
            value: QueryData::Comments(list),
            ..
        } = event
        {
            comments.try_set(Some(list.clone()));
        }
    });

    let guard = StaleGuard::new();
    let ticket = guard.issue();
    let stored_guard = StoredValue::new_local(guard);
    spawn_local({
        let store = store.clone();
        async move {
            let result = store.comments(task_id).await;
            let current = stored_guard.try_with_value(|g| g.is_current(ticket)).unwrap_or(false);
            if !current {
                debug!("dropping comments for closed dialog (task {})", task_id);
                return;
            }
            match result {
                Ok(list) => {
                    comments.try_set(Some(list));
                }
                Err(err) if !err.is_auth() => {
                    set_load_error.try_set(Some(err.user_message()));
                }
                Err(_) => {}
            }
        }
    });

    on_cleanup(move || {
        stored_guard.try_with_value(|g| g.revoke());
        if let Some(store) = ctx.try_task_store() {
            store.cache().unsubscribe(subscription);
        }
    });

    let register = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if saving.get_untracked() {
            return;
        }
        let text = content.get_untracked();
        let store = ctx.task_store();
        set_saving.set(true);
        spawn_local(async move {
            match store.mutations().register_comment(task_id, &text).await {
                Ok(()) => {
                    set_content.try_set(String::new());
                    set_form_error.try_set(None);
                }
                Err(err) => {
                    set_form_error.try_set(Some(err));
                }
            }
            set_saving.try_set(false);
        });
    };

    // The comment leaves the list at once; a failure restores it through the
    // cache subscription and raises a notice
    let delete = move |comment_id: u32| {
        let store = ctx.task_store();
        spawn_local(async move {
            if let Err(err) = store.mutations().delete_comment(task_id, comment_id).await {
                debug!("comment {} kept: {}", comment_id, err);
            }
        });
    };

    view! {
        <div class="modal-backdrop" on:click=move |_| on_close.run(())>
            <div class="modal comments-dialog" on:click=|ev| ev.stop_propagation()>
                <header class="modal-header">
                    <h2>"Comments"</h2>
                    <p class="modal-subtitle">{title}</p>
                    <button class="modal-close" on:click=move |_| on_close.run(())>"×"</button>
                </header>

                {move || load_error.get().map(|message| view! { <p class="list-error">{message}</p> })}

                {move || match comments.get() {
                    None => view! { <p class="loading">"Loading…"</p> }.into_any(),
                    Some(list) if list.is_empty() => view! { <p class="empty">"No comments yet."</p> }.into_any(),
                    Some(list) => view! {
                        <ul class="comment-list">
                            {list.into_iter().map(|comment| {
                                let comment_id = comment.id;
                                view! {
                                    <li class="comment">
                                        <span class="comment-text">{comment.content}</span>
                                        <time class="comment-date">
                                            {comment.created_at.format("%Y-%m-%d %H:%M").to_string()}
                                        </time>
                                        <ConfirmDelete
                                            prompt="Delete comment?"
                                            on_confirm=move |()| delete(comment_id)
                                        />
                                    </li>
                                }
                            }).collect_view()}
                        </ul>
                    }.into_any(),
                }}

                <form class="comment-form" on:submit=register>
                    <textarea
                        placeholder="Write a comment"
                        maxlength="255"
                        prop:value=move || content.get()
                        on:input=move |ev| set_content.set(event_target_value(&ev))
                    />
                    <FieldHint error=form_error field="content" />
                    <button type="submit" disabled=move || saving.get()>"Comment"</button>
                </form>
            </div>
        </div>
    }
}
