//! Task.io Frontend App
//!
//! Switches between the sign-in, sign-up and task screens.

use leptos::prelude::*;
use log::error;
use reactive_stores::Store;
use taskio_sync::ClientConfig;

use crate::components::{Header, NewTaskForm, SignIn, SignUp, TaskList, Toaster};
use crate::context::{AppContext, Screen};
use crate::store::UiState;

#[component]
pub fn App() -> impl IntoView {
    let config = ClientConfig::from_env();
    let ui = Store::new(UiState::default());
    provide_context(ui);

    let ctx = match AppContext::new(&config, ui) {
        Ok(ctx) => ctx,
        Err(err) => {
            error!("cannot start: {}", err);
            return view! { <div class="config-error">{err.to_string()}</div> }.into_any();
        }
    };
    provide_context(ctx);

    // A 401 anywhere ends the session
    Effect::new(move |_| {
        if ctx.session_expired.get() > 0 {
            ctx.end_session();
        }
    });

    view! {
        <div class="app-layout">
            {move || match ctx.screen.get() {
                Screen::SignIn => view! { <SignIn /> }.into_any(),
                Screen::SignUp => view! { <SignUp /> }.into_any(),
                Screen::Tasks => view! {
                    <Header />
                    <main class="main-content">
                        <NewTaskForm />
                        <TaskList />
                    </main>
                }.into_any(),
            }}
            <Toaster />
        </div>
    }
    .into_any()
}
