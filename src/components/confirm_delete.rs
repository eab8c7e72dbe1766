//! Confirm Delete Component
//!
//! Two-step delete control for tasks and comments. While the parent's
//! delete call is in flight the control is locked.

use leptos::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Idle,
    Asking,
    Deleting,
}

#[component]
pub fn ConfirmDelete(
    /// Question shown once the × is pressed, e.g. "Delete task?"
    #[prop(into)]
    prompt: String,
    /// True while the parent's delete request is running
    #[prop(into, default = Signal::stored(false))]
    pending: Signal<bool>,
    #[prop(into)] on_confirm: Callback<()>,
) -> impl IntoView {
    let asking = RwSignal::new(false);
    let stage = move || match (pending.get(), asking.get()) {
        (true, _) => Stage::Deleting,
        (false, true) => Stage::Asking,
        (false, false) => Stage::Idle,
    };

    move || match stage() {
        Stage::Idle => view! {
            <button
                class="delete-btn"
                title=prompt.clone()
                on:click=move |ev| {
                    ev.stop_propagation();
                    asking.set(true);
                }
            >
                "×"
            </button>
        }
        .into_any(),
        Stage::Asking => view! {
            <span class="delete-confirm">
                <span class="delete-confirm-text">{prompt.clone()}</span>
                <button
                    class="confirm-btn"
                    title="Yes, delete"
                    on:click=move |ev| {
                        ev.stop_propagation();
                        asking.set(false);
                        on_confirm.run(());
                    }
                >
                    "✓"
                </button>
                <button
                    class="cancel-btn"
                    title="Keep"
                    on:click=move |ev| {
                        ev.stop_propagation();
                        asking.set(false);
                    }
                >
                    "✗"
                </button>
            </span>
        }
        .into_any(),
        Stage::Deleting => view! {
            <span class="delete-confirm deleting">
                <button class="delete-btn" disabled=true>"Deleting…"</button>
            </span>
        }
        .into_any(),
    }
}
