use leptos::prelude::*;

use crate::config::ClientConfig;
use crate::model::{DisplayToggle, NodeSize, Settings};
use crate::store::GraphState;

/// Graph title, neighbourhood review, display switches and pagination of the
/// loaded window.
#[component]
pub fn Toolbar(
	state: RwSignal<GraphState>,
	on_page: Callback<usize>,
	on_limit: Callback<usize>,
	on_review_all: Callback<()>,
	/// Local override of the graph's display settings.
	on_settings: Callback<Settings>,
) -> impl IntoView {
	let config = use_context::<ClientConfig>().unwrap_or_default();

	let title = move || state.with(|s| s.graph.as_ref().map(|g| g.name.clone()).unwrap_or_default());
	let central = move || {
		state.with(|s| {
			s.window
				.central_id
				.as_ref()
				.and_then(|id| s.window.nodes.get(id))
				.map(|n| n.name.clone())
				.unwrap_or_default()
		})
	};
	let totals = move || {
		state.with(|s| {
			s.graph
				.as_ref()
				.map(|g| format!("{} errors · {} suggestions", g.total_errors, g.total_suggestions))
				.unwrap_or_default()
		})
	};
	let loaded = move || state.with(|s| s.window.loaded);
	let page = move || state.with(|s| s.window.requested_page());
	let pages = move || state.with(|s| s.window.page_count());
	let limit = move || state.with(|s| s.window.requested_limit());

	let switch = move |toggle: DisplayToggle, label: &'static str| {
		view! {
			<label>
				<input
					type="checkbox"
					prop:checked=move || state.with(|s| s.settings.is_on(toggle))
					on:change=move |_| on_settings.run(state.with_untracked(|s| s.settings.toggled(toggle)))
				/>
				{label}
			</label>
		}
	};
	let node_size = move || state.with(|s| s.settings.graph.node_size);

	view! {
		<header class="toolbar">
			<h1>{title}</h1>
			<span class="central">{central}</span>
			<span class="totals">{totals}</span>
			<button disabled=move || !loaded() on:click=move |_| on_review_all.run(())>
				"Review neighbourhood"
			</button>
			<fieldset class="display">
				{switch(DisplayToggle::Errors, "Errors")}
				{switch(DisplayToggle::Suggestions, "Suggestions")}
				{switch(DisplayToggle::EdgeLabels, "Edge labels")}
				<select
					prop:value=move || node_size().as_str()
					on:change=move |ev| {
						if let Some(size) = NodeSize::parse(&event_target_value(&ev)) {
							on_settings.run(state.with_untracked(|s| s.settings.with_node_size(size)));
						}
					}
				>
					{NodeSize::ALL
						.into_iter()
						.map(|size| view! { <option value=size.as_str()>{size.as_str()}</option> })
						.collect_view()}
				</select>
			</fieldset>
			<nav class="pagination">
				<button
					disabled=move || page() == 0
					on:click=move |_| on_page.run(page().saturating_sub(1))
				>
					"Previous"
				</button>
				<span>{move || format!("Page {} of {}", page() + 1, pages())}</span>
				<button
					disabled=move || page() + 1 >= pages()
					on:click=move |_| on_page.run(page() + 1)
				>
					"Next"
				</button>
				<select
					prop:value=move || limit().to_string()
					on:change=move |ev| {
						if let Ok(limit) = event_target_value(&ev).parse::<usize>() {
							on_limit.run(limit);
						}
					}
				>
					{move || {
						config
							.page_sizes_with(limit())
							.into_iter()
							.map(|size| view! { <option value=size.to_string()>{size}</option> })
							.collect_view()
					}}
				</select>
			</nav>
		</header>
	}
}
