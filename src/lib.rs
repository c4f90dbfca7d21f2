//! CleanGraph curation client: subgraph windows of a large knowledge graph,
//! server-confirmed curation and a force-directed canvas, wired into a Leptos CSR app.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, error, info};

// Modules
pub mod api;
pub mod components;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
mod pages;
pub mod store;
pub mod window;

#[cfg(test)]
mod testing;

// Top-Level pages
use crate::components::notification::{NotificationBanner, Notifications};
use crate::config::ClientConfig;
use crate::pages::graph::GraphPage;
use crate::pages::home::Home;
use crate::pages::not_found::NotFound;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("Logging initialized");
}

/// The app router: graph entry, curation view and 404's.
#[component]
pub fn App(#[prop(optional)] config: ClientConfig) -> impl IntoView {
	// Provides context that manages stylesheets, titles, meta tags, etc.
	provide_meta_context();

	let config = match config.validate() {
		Ok(()) => config,
		Err(e) => {
			error!("{e}; falling back to defaults");
			ClientConfig::default()
		}
	};
	info!("backend at {}", config.api_base_url);
	provide_context(config);

	let notifications = Notifications(RwSignal::new(None));
	provide_context(notifications);

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="light" />

		// sets the document title
		<Title text="CleanGraph" />

		// injects metadata in the <head> of the page
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<NotificationBanner notifications />
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/") view=Home />
				<Route path=path!("/graph/:graph_id") view=GraphPage />
			</Routes>
		</Router>
	}
}
