//! List Controls Component
//!
//! Sort order, page size and the completion counters above the task list.

use leptos::prelude::*;
use taskio_sync::{ListViewModel, PerPage, SortMode};

const SORT_MODES: [SortMode; 2] = [SortMode::PendingFirst, SortMode::CompletedFirst];

#[component]
pub fn ListControls(vm: RwSignal<ListViewModel>) -> impl IntoView {
    let sort = move || vm.with(|vm| vm.selection().sort);
    let per_page = move || vm.with(|vm| vm.selection().per_page);

    let counters = move || {
        vm.with(|vm| {
            vm.page().map(|page| {
                format!(
                    "{} of {} tasks completed",
                    page.completed_total_count, page.total_count
                )
            })
        })
    };

    let on_per_page = move |ev: web_sys::Event| {
        let Ok(size) = event_target_value(&ev).parse::<u32>() else {
            return;
        };
        if let Ok(size) = PerPage::try_from(size) {
            vm.update(|vm| {
                vm.set_per_page(size);
            });
        }
    };

    view! {
        <div class="list-controls">
            <div class="sort-selector">
                {SORT_MODES.iter().map(|&mode| {
                    view! {
                        <button
                            type="button"
                            class=move || if sort() == mode { "sort-btn small active" } else { "sort-btn small" }
                            on:click=move |_| vm.update(|vm| {
                                vm.set_sort(mode);
                            })
                        >
                            {mode.label()}
                        </button>
                    }
                }).collect_view()}
            </div>

            <label class="per-page">
                "Per page "
                <select on:change=on_per_page>
                    {PerPage::ALL.iter().map(|&size| {
                        view! {
                            <option value=size.get().to_string() selected=move || per_page() == size>
                                {size.get()}
                            </option>
                        }
                    }).collect_view()}
                </select>
            </label>

            <span class="task-counters">{counters}</span>
        </div>
    }
}
