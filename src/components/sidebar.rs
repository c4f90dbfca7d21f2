use std::cmp::Ordering;

use leptos::prelude::*;

use crate::api::DiagnosticListing;
use crate::model::{ItemId, ItemRef, SubgraphSummary};
use crate::store::GraphState;

/// Which diagnostic listing the sidebar shows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SidebarTab {
	#[default]
	Subgraphs,
	Errors,
	Suggestions,
}

/// Field the subgraph list is ordered by.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SubgraphSortKey {
	Name,
	#[default]
	Degree,
	Errors,
	Suggestions,
	Progress,
}

/// Ordering and name filter of the subgraph list.
#[derive(Clone, Debug, PartialEq)]
pub struct SubgraphQuery {
	pub key: SubgraphSortKey,
	pub descending: bool,
	/// Case-insensitive substring of the anchor name.
	pub filter: String,
}

impl Default for SubgraphQuery {
	fn default() -> Self {
		Self {
			key: SubgraphSortKey::Degree,
			descending: true,
			filter: String::new(),
		}
	}
}

impl SubgraphQuery {
	/// Selecting the active key again flips the direction; a new key starts
	/// alphabetical for names and largest first otherwise.
	pub fn select(&self, key: SubgraphSortKey) -> Self {
		let descending = if key == self.key {
			!self.descending
		} else {
			key != SubgraphSortKey::Name
		};
		Self {
			key,
			descending,
			filter: self.filter.clone(),
		}
	}

	fn compare(&self, a: &SubgraphSummary, b: &SubgraphSummary) -> Ordering {
		let primary = match self.key {
			SubgraphSortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
			SubgraphSortKey::Degree => a.value.cmp(&b.value),
			SubgraphSortKey::Errors => a.errors.cmp(&b.errors),
			SubgraphSortKey::Suggestions => a.suggestions.cmp(&b.suggestions),
			SubgraphSortKey::Progress => a.reviewed_progress.total_cmp(&b.reviewed_progress),
		};
		let primary = if self.descending { primary.reverse() } else { primary };
		primary.then_with(|| a.name.cmp(&b.name)).then_with(|| a.id.cmp(&b.id))
	}
}

/// Subgraph anchors matching the filter, in query order.
pub fn ranked_subgraphs(subgraphs: &[SubgraphSummary], query: &SubgraphQuery) -> Vec<SubgraphSummary> {
	let needle = query.filter.trim().to_lowercase();
	let mut ranked: Vec<SubgraphSummary> = subgraphs
		.iter()
		.filter(|s| needle.is_empty() || s.name.to_lowercase().contains(&needle))
		.cloned()
		.collect();
	ranked.sort_by(|a, b| query.compare(a, b));
	ranked
}

/// Reviewed share of a subgraph; the backend already sends a percentage.
pub fn progress_label(reviewed_progress: f64) -> String {
	format!("{reviewed_progress:.0}%")
}

/// Anchor list and diagnostic listings of the open graph.
#[component]
pub fn Sidebar(
	state: RwSignal<GraphState>,
	tab: RwSignal<SidebarTab>,
	listings: RwSignal<Vec<DiagnosticListing>>,
	/// Re-anchor the window on a node.
	on_anchor: Callback<ItemId>,
	/// Focus a listed item, or anchor on it when it is outside the window.
	on_select: Callback<ItemRef>,
	on_tab: Callback<SidebarTab>,
) -> impl IntoView {
	let central = move || state.with(|s| s.window.central_id.clone());
	let query = RwSignal::new(SubgraphQuery::default());
	let display_errors = move || state.with(|s| s.settings.display_errors);
	let display_suggestions = move || state.with(|s| s.settings.display_suggestions);

	let tab_button = move |target: SidebarTab, label: &'static str| {
		view! {
			<button class:active=move || tab.get() == target on:click=move |_| on_tab.run(target)>
				{label}
			</button>
		}
	};
	let sort_button = move |key: SubgraphSortKey, label: &'static str| {
		view! {
			<button
				class:active=move || query.with(|q| q.key == key)
				on:click=move |_| query.update(|q| *q = q.select(key))
			>
				{label}
				{move || {
					query.with(|q| match (q.key == key, q.descending) {
						(false, _) => "",
						(true, true) => " ↓",
						(true, false) => " ↑",
					})
				}}
			</button>
		}
	};

	let subgraphs = move || {
		let ranked = query.with(|q| state.with(|s| ranked_subgraphs(&s.subgraphs, q)));
		ranked
			.into_iter()
			.map(|summary| {
				let id = summary.id.clone();
				let is_central = central().as_ref() == Some(&summary.id);
				let progress = progress_label(summary.reviewed_progress);
				view! {
					<li class:central=is_central on:click=move |_| on_anchor.run(id.clone())>
						<span class="name">{summary.name}</span>
						<span class="value">{summary.value}</span>
						<Show when=display_errors>
							<span class="errors">{summary.errors}</span>
						</Show>
						<Show when=display_suggestions>
							<span class="suggestions">{summary.suggestions}</span>
						</Show>
						<span class="progress">{progress}</span>
					</li>
				}
			})
			.collect_view()
	};

	// Rows the backend could not tie to an item are listed but not selectable.
	let diagnostics = move || {
		listings
			.get()
			.into_iter()
			.map(|row| {
				let item = row.item();
				let selectable = item.is_some();
				view! {
					<li
						class:acknowledged=row.diagnostic.acknowledged
						class:selectable=selectable
						on:click=move |_| {
							if let Some(item) = &item {
								on_select.run(item.clone());
							}
						}
					>
						<span class="name">{row.item_name}</span>
						<span class="kind">{row.diagnostic.kind}</span>
						<span class="value">{row.diagnostic.value}</span>
					</li>
				}
			})
			.collect_view()
	};

	view! {
		<nav class="sidebar">
			<div class="tabs">
				{tab_button(SidebarTab::Subgraphs, "Subgraphs")}
				{tab_button(SidebarTab::Errors, "Errors")}
				{tab_button(SidebarTab::Suggestions, "Suggestions")}
			</div>
			<Show when=move || tab.get() == SidebarTab::Subgraphs>
				<div class="subgraph-query">
					<input
						placeholder="Filter anchors"
						prop:value=move || query.with(|q| q.filter.clone())
						on:input=move |ev| query.update(|q| q.filter = event_target_value(&ev))
					/>
					{sort_button(SubgraphSortKey::Name, "Name")}
					{sort_button(SubgraphSortKey::Degree, "Degree")}
					<Show when=display_errors>{sort_button(SubgraphSortKey::Errors, "Errors")}</Show>
					<Show when=display_suggestions>
						{sort_button(SubgraphSortKey::Suggestions, "Suggestions")}
					</Show>
					{sort_button(SubgraphSortKey::Progress, "Reviewed")}
				</div>
			</Show>
			<ul>
				{move || match tab.get() {
					SidebarTab::Subgraphs => subgraphs().into_any(),
					SidebarTab::Errors | SidebarTab::Suggestions => diagnostics().into_any(),
				}}
			</ul>
		</nav>
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use rstest::rstest;

	use super::*;

	fn summary(id: &str, name: &str, value: u64) -> SubgraphSummary {
		SubgraphSummary {
			id: id.into(),
			name: name.into(),
			class_id: "T1".into(),
			value,
			..SubgraphSummary::default()
		}
	}

	fn anchors() -> Vec<SubgraphSummary> {
		let mut beta = summary("a", "Beta", 2);
		beta.errors = 5;
		beta.reviewed_progress = 50.0;
		let mut alpha = summary("b", "alpha", 2);
		alpha.suggestions = 3;
		alpha.reviewed_progress = 100.0;
		let mut gamma = summary("c", "Gamma", 7);
		gamma.errors = 1;
		gamma.suggestions = 1;
		vec![beta, alpha, gamma]
	}

	fn ids(ranked: &[SubgraphSummary]) -> Vec<&str> {
		ranked.iter().map(|s| s.id.as_str()).collect()
	}

	#[rstest]
	#[case(SubgraphSortKey::Degree, true, vec!["c", "a", "b"])]
	#[case(SubgraphSortKey::Degree, false, vec!["a", "b", "c"])]
	#[case(SubgraphSortKey::Name, false, vec!["b", "a", "c"])]
	#[case(SubgraphSortKey::Name, true, vec!["c", "a", "b"])]
	#[case(SubgraphSortKey::Errors, true, vec!["a", "c", "b"])]
	#[case(SubgraphSortKey::Suggestions, true, vec!["b", "c", "a"])]
	#[case(SubgraphSortKey::Progress, true, vec!["b", "a", "c"])]
	#[case(SubgraphSortKey::Progress, false, vec!["c", "a", "b"])]
	fn anchors_follow_the_query(
		#[case] key: SubgraphSortKey,
		#[case] descending: bool,
		#[case] expected: Vec<&str>,
	) {
		let query = SubgraphQuery {
			key,
			descending,
			filter: String::new(),
		};
		let ranked = ranked_subgraphs(&anchors(), &query);
		assert_eq!(ids(&ranked), expected);
	}

	#[test]
	fn filter_matches_names_case_insensitively() {
		let query = SubgraphQuery {
			filter: " A ".into(),
			..SubgraphQuery::default()
		};
		let ranked = ranked_subgraphs(&anchors(), &query);
		assert_eq!(ids(&ranked), vec!["c", "a", "b"]);

		let query = SubgraphQuery {
			filter: "GAM".into(),
			..SubgraphQuery::default()
		};
		let ranked = ranked_subgraphs(&anchors(), &query);
		assert_eq!(ids(&ranked), vec!["c"]);
	}

	#[test]
	fn reselecting_a_key_flips_direction() {
		let flipped = SubgraphQuery::default().select(SubgraphSortKey::Degree);
		assert!(!flipped.descending);

		let by_name = flipped.select(SubgraphSortKey::Name);
		assert_eq!(by_name.key, SubgraphSortKey::Name);
		assert!(!by_name.descending);
		assert!(by_name.select(SubgraphSortKey::Name).descending);
		assert!(by_name.select(SubgraphSortKey::Errors).descending);
	}

	#[rstest]
	#[case(50.0, "50%")]
	#[case(0.0, "0%")]
	#[case(100.0, "100%")]
	fn progress_is_already_a_percentage(#[case] progress: f64, #[case] expected: &str) {
		assert_eq!(progress_label(progress), expected);
	}
}
