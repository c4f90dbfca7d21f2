use leptos::prelude::*;

use crate::engine::MergeConflict;

/// Human-readable summary of what confirming a merge will do.
pub fn merge_summary(conflict: &MergeConflict, class_name: &str) -> String {
	let triples = match conflict.linked_triples {
		1 => "1 triple".to_owned(),
		n => format!("{n} triples"),
	};
	format!(
		"A {class_name} named {:?} already exists. Merging moves {triples} onto it and removes the edited node.",
		conflict.name
	)
}

/// Asks whether a refused rename should become a merge.
#[component]
pub fn MergeDialog(
	/// Pending conflict with the display name of its class.
	#[prop(into)]
	conflict: Signal<Option<(MergeConflict, String)>>,
	on_confirm: Callback<()>,
	on_cancel: Callback<()>,
) -> impl IntoView {
	move || {
		conflict.get().map(|(conflict, class_name)| {
			view! {
				<div class="merge-dialog" role="dialog">
					<h2>"Merge nodes?"</h2>
					<p>{merge_summary(&conflict, &class_name)}</p>
					<div class="actions">
						<button on:click=move |_| on_cancel.run(())>"Cancel"</button>
						<button class="primary" on:click=move |_| on_confirm.run(())>
							"Merge"
						</button>
					</div>
				</div>
			}
		})
	}
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	#[rstest]
	#[case(1, "moves 1 triple onto")]
	#[case(3, "moves 3 triples onto")]
	fn summary_counts_triples(#[case] linked_triples: u64, #[case] expected: &str) {
		let conflict = MergeConflict {
			item_id: "a".into(),
			name: "Acme".into(),
			class_id: "T1".into(),
			linked_triples,
			existing_node_id: Some("b".into()),
		};
		let summary = merge_summary(&conflict, "Organisation");
		assert!(summary.starts_with("A Organisation named \"Acme\" already exists."));
		assert!(summary.contains(expected), "{summary}");
	}
}
