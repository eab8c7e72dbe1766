//! Sign In Screen

use leptos::prelude::*;
use leptos::task::spawn_local;
use taskio_sync::{ApiError, Credentials};

use crate::components::FieldHint;
use crate::context::{use_app_context, Screen};

#[component]
pub fn SignIn() -> impl IntoView {
    let ctx = use_app_context();

    let (username, set_username) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (error, set_error) = signal::<Option<ApiError>>(None);
    let (busy, set_busy) = signal(false);

    let submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let credentials = Credentials {
            username: username.get_untracked().trim().to_string(),
            password: password.get_untracked(),
        };
        let store = ctx.task_store();
        set_busy.set(true);
        spawn_local(async move {
            match store.sign_in(&credentials).await {
                Ok(session) => ctx.start_session(&session.token),
                Err(err) => {
                    set_error.try_set(Some(err));
                    set_busy.try_set(false);
                }
            }
        });
    };

    view! {
        <div class="auth-screen">
            <form class="auth-form" on:submit=submit>
                <h1>"Sign in to Task.io"</h1>
                <label>
                    "Username"
                    <input
                        type="text"
                        autocomplete="username"
                        prop:value=move || username.get()
                        on:input=move |ev| set_username.set(event_target_value(&ev))
                    />
                </label>
                <FieldHint error=error field="username" />
                <label>
                    "Password"
                    <input
                        type="password"
                        autocomplete="current-password"
                        prop:value=move || password.get()
                        on:input=move |ev| set_password.set(event_target_value(&ev))
                    />
                </label>
                <FieldHint error=error field="password" />
                <button type="submit" disabled=move || busy.get()>"Sign in"</button>
                <p class="auth-switch">
                    "No account yet? "
                    <a href="#" on:click=move |ev| {
                        ev.prevent_default();
                        ctx.show(Screen::SignUp);
                    }>"Create one"</a>
                </p>
            </form>
        </div>
    }
}
