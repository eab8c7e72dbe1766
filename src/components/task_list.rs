//! Task List Component
//!
//! Owns the list view model: loads the selected page through the store,
//! reloads when task data is invalidated and steps back when a delete left
//! the current page past the end.

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::debug;
use taskio_sync::{ListSelection, ListViewModel, SortMode};

use crate::browser;
use crate::components::{CommentsDialog, ListControls, Pagination, TaskRow};
use crate::context::use_app_context;

#[component]
pub fn TaskList() -> impl IntoView {
    let ctx = use_app_context();

    let page_index = ListSelection::parse_page_param(browser::page_param().as_deref());
    let vm = RwSignal::new(ListViewModel::new(ListSelection::new(
        page_index,
        ctx.default_per_page,
        SortMode::default(),
    )));
    let selection = Memo::new(move |_| vm.with(|vm| vm.selection()));
    let comments_for = RwSignal::new(None::<(u32, String)>);

    // Load on selection change and on invalidation
    Effect::new(move |_| {
        let selection = selection.get();
        let version = ctx.tasks_version.get();
        debug!("loading task page {:?} (version {})", selection, version);
        browser::replace_page_param(selection.page_param());

        let (Some(ticket), Some(store)) = (vm.try_update(|vm| vm.begin_load()), ctx.try_task_store()) else {
            return;
        };
        spawn_local(async move {
            let result = store.tasks(ticket.selection).await;
            vm.try_update(|vm| vm.finish_page(ticket, result));
        });
    });

    Effect::new(move |_| {
        if let Some(last) = vm.with(|vm| vm.overflow_target()) {
            vm.update(|vm| {
                vm.set_page(last);
            });
        }
    });

    let tasks = move || vm.with(|vm| vm.page().map(|page| page.items.clone()).unwrap_or_default());
    let is_empty = move || vm.with(|vm| vm.page().is_some_and(|page| page.items.is_empty()) && !vm.is_loading());
    let open_comments = Callback::new(move |task: (u32, String)| comments_for.set(Some(task)));

    view! {
        <section class="task-list">
            <ListControls vm=vm />

            <Show when=move || vm.with(|vm| vm.is_loading())>
                <p class="loading">"Loading…"</p>
            </Show>
            {move || vm.with(|vm| vm.error().map(|message| view! { <p class="list-error">{message.to_string()}</p> }))}
            <Show when=is_empty>
                <p class="empty">"No tasks yet."</p>
            </Show>

            <For
                each=tasks
                key=|task| (task.id, task.completed, task.description.clone())
                children=move |task| view! { <TaskRow task=task on_comments=open_comments /> }
            />

            <Pagination vm=vm />

            {move || comments_for.get().map(|(task_id, title)| view! {
                <CommentsDialog
                    task_id=task_id
                    title=title
                    on_close=Callback::new(move |()| comments_for.set(None))
                />
            })}
        </section>
    }
}
