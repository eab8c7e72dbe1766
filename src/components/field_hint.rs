//! Inline field error under a form input.

use leptos::prelude::*;
use taskio_sync::ApiError;

#[component]
pub fn FieldHint(error: ReadSignal<Option<ApiError>>, field: &'static str) -> impl IntoView {
    move || {
        error.with(|err| {
            err.as_ref()
                .and_then(|e| e.field_message(field))
                .map(|message| view! { <p class="field-error">{message.to_string()}</p> })
        })
    }
}
