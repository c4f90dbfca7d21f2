use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::components::A;
use leptos_router::hooks::use_navigate;
use log::{info, warn};

use crate::api::{GraphApi, HttpGraphApi};
use crate::config::ClientConfig;
use crate::model::GraphListing;

/// Graphs requested for the start page.
const LISTED_GRAPHS: usize = 50;

/// Route to the curation view of `graph_id`, or `None` for blank input.
pub fn graph_path(graph_id: &str) -> Option<String> {
	let graph_id = graph_id.trim();
	(!graph_id.is_empty()).then(|| format!("/graph/{graph_id}"))
}

/// Last-change line shown under a listed graph.
pub fn listing_age(listing: &GraphListing) -> String {
	match listing.updated_at.or(listing.created_at) {
		Some(at) => format!("updated {}", at.format("%Y-%m-%d %H:%M")),
		None => String::new(),
	}
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let config = use_context::<ClientConfig>().unwrap_or_default();
	let graph_id = RwSignal::new(String::new());
	let graphs = RwSignal::new(Vec::<GraphListing>::new());
	let navigate = use_navigate();

	let api = HttpGraphApi::new(config.api_base_url.clone());
	spawn_local(async move {
		match api.graphs(0, LISTED_GRAPHS).await {
			Ok(listed) => {
				info!("{} graphs available", listed.len());
				graphs.try_set(listed);
			}
			Err(e) => warn!("graph list unavailable: {e}"),
		}
	});

	let open = move |ev: leptos::ev::SubmitEvent| {
		ev.prevent_default();
		if let Some(path) = graph_path(&graph_id.get_untracked()) {
			navigate(&path, Default::default());
		}
	};

	view! {
		<div class="home">
			<h1>"CleanGraph"</h1>
			<p class="subtitle">
				"Review and curate a knowledge graph one neighbourhood at a time."
			</p>
			<Show when=move || graphs.with(|g| !g.is_empty())>
				<ul class="graphs">
					<For
						each=move || graphs.get()
						key=|listing| listing.id.clone()
						children=move |listing: GraphListing| {
							let age = listing_age(&listing);
							view! {
								<li>
									<A href=format!("/graph/{}", listing.id)>{listing.name}</A>
									<span class="age">{age}</span>
								</li>
							}
						}
					/>
				</ul>
			</Show>
			<form on:submit=open>
				<input
					placeholder="Graph id"
					prop:value=move || graph_id.get()
					on:input=move |ev| graph_id.set(event_target_value(&ev))
				/>
				<button type="submit" disabled=move || graph_path(&graph_id.get()).is_none()>
					"Open"
				</button>
			</form>
			<p class="backend">"Backend: " {config.api_base_url}</p>
		</div>
	}
}
