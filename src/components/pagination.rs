//! Pagination Component

use leptos::prelude::*;
use taskio_sync::ListViewModel;

#[component]
pub fn Pagination(vm: RwSignal<ListViewModel>) -> impl IntoView {
    let page_number = move || vm.with(|vm| vm.selection().page_param());
    let page_count = move || vm.with(|vm| vm.page_count());

    let go_to = move |delta: i64| {
        vm.update(|vm| {
            let target = i64::from(vm.selection().page_index) + delta;
            if let Ok(target) = u32::try_from(target) {
                vm.set_page(target);
            }
        });
    };

    view! {
        <nav class="pagination">
            <button
                class="page-btn"
                disabled=move || !vm.with(|vm| vm.has_previous())
                on:click=move |_| go_to(-1)
            >
                "‹ Previous"
            </button>
            <span class="page-status">{move || format!("Page {} of {}", page_number(), page_count())}</span>
            <button
                class="page-btn"
                disabled=move || !vm.with(|vm| vm.has_next())
                on:click=move |_| go_to(1)
            >
                "Next ›"
            </button>
        </nav>
    }
}
