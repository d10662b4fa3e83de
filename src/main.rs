mod app;
mod catalog;
mod config;
mod error;
mod http;
mod logging;
mod markdown;
mod pages;
mod router;
mod search;
mod views;

use app::*;
use config::SiteConfig;
use leptos::prelude::*;

fn main() {
    console_error_panic_hook::set_once();
    let search = window().location().search().unwrap_or_default();
    let config = SiteConfig::default().with_query(&search);
    logging::init(config.log_level);
    log::info!("starting with catalog at {}", config.catalog_path);
    mount_to_body(move || {
        view! { <App config=config /> }
    })
}
