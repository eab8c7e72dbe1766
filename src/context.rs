//! Application Context
//!
//! Shared handles provided via Leptos Context API.

use std::rc::Rc;

use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;
use log::info;
use taskio_sync::{
    CacheEvent, ClientConfig, ConfigError, HttpGateway, Notice, Notifier, PerPage, QueryKey, TaskStore,
};

use crate::browser;
use crate::store::{store_dismiss_toast, store_push_toast, store_set_user, UiStore};

pub type ClientStore = TaskStore<HttpGateway>;

/// Top-level screen
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    SignIn,
    SignUp,
    Tasks,
}

/// App-wide handles provided via context
#[derive(Clone, Copy)]
pub struct AppContext {
    /// Session store; `Rc` so async tasks can hold it across awaits
    store: StoredValue<Rc<ClientStore>, LocalStorage>,
    pub screen: RwSignal<Screen>,
    /// Bumped whenever cached task pages are invalidated
    pub tasks_version: RwSignal<u32>,
    /// Bumped when a request came back 401
    pub session_expired: RwSignal<u32>,
    pub default_per_page: PerPage,
    pub ui: UiStore,
}

impl AppContext {
    pub fn new(config: &ClientConfig, ui: UiStore) -> Result<Self, ConfigError> {
        let gateway = HttpGateway::new(config)?.with_token(browser::load_token());
        let screen = RwSignal::new(if gateway.has_token() { Screen::Tasks } else { Screen::SignIn });
        let tasks_version = RwSignal::new(0u32);
        let session_expired = RwSignal::new(0u32);

        let notifier = Rc::new(ToastNotifier {
            ui,
            session_expired,
            duration_ms: config.notice_duration_ms,
        });
        let store = Rc::new(TaskStore::new(gateway, notifier));

        store.cache().subscribe_prefix(QueryKey::all_tasks(), move |event| {
            if matches!(event, CacheEvent::Invalidated { .. }) {
                tasks_version.try_update(|v| *v += 1);
            }
        });

        Ok(Self {
            store: StoredValue::new_local(store),
            screen,
            tasks_version,
            session_expired,
            default_per_page: config.default_per_page,
            ui,
        })
    }

    pub fn task_store(&self) -> Rc<ClientStore> {
        self.store.get_value()
    }

    /// `None` once the app has been torn down
    pub fn try_task_store(&self) -> Option<Rc<ClientStore>> {
        self.store.try_get_value()
    }

    pub fn show(&self, screen: Screen) {
        self.screen.set(screen);
    }

    /// Signed in: remember the token and open the task list.
    pub fn start_session(&self, token: &str) {
        browser::save_token(token);
        self.show(Screen::Tasks);
    }

    /// Signed out or expired: forget everything from this session.
    pub fn end_session(&self) {
        if let Some(store) = self.try_task_store() {
            store.sign_out();
        }
        browser::clear_token();
        store_set_user(&self.ui, None);
        self.show(Screen::SignIn);
        info!("session ended");
    }
}

pub fn use_app_context() -> AppContext {
    expect_context::<AppContext>()
}

// ========================
// Toast Notifier
// ========================

/// Renders notices as toasts that dismiss themselves.
struct ToastNotifier {
    ui: UiStore,
    session_expired: RwSignal<u32>,
    duration_ms: u32,
}

impl Notifier for ToastNotifier {
    fn notify(&self, notice: Notice) {
        let ui = self.ui;
        let id = store_push_toast(&ui, notice);
        let duration_ms = self.duration_ms;
        spawn_local(async move {
            TimeoutFuture::new(duration_ms).await;
            store_dismiss_toast(&ui, id);
        });
    }

    fn session_expired(&self) {
        self.notify(Notice::error("Session", "Your session has expired. Please sign in again."));
        self.session_expired.try_update(|n| *n += 1);
    }
}
