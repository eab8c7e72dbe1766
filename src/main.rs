//! Task.io Frontend Entry Point

mod app;
mod browser;
mod components;
mod context;
mod logger;
mod store;

use app::App;
use leptos::prelude::*;
use taskio_sync::ClientConfig;

fn main() {
    console_error_panic_hook::set_once();
    logger::init(ClientConfig::from_env().log_level);
    mount_to_body(App);
}
