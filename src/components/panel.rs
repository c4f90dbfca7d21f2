use leptos::prelude::*;

use crate::api::ItemPatch;
use crate::model::{Diagnostic, ItemId, ItemRef, Property};
use crate::store::GraphState;

/// What the focus panel asks the page to do with the focused item.
#[derive(Clone, Debug, PartialEq)]
pub enum PanelIntent {
	Update(ItemRef, ItemPatch),
	ToggleReview(ItemRef),
	ToggleActivation(ItemRef),
	DeleteProperty(ItemRef, ItemId),
	Acknowledge {
		item: ItemRef,
		is_error: bool,
		diagnostic_id: ItemId,
	},
	Close,
}

/// Everything the panel shows about the focused item.
#[derive(Clone, Debug, PartialEq)]
pub struct FocusView {
	pub item: ItemRef,
	/// Node name, or `source -> target` for a link.
	pub title: String,
	pub name: String,
	pub class_id: ItemId,
	/// Classes of the same kind as the item, by name.
	pub classes: Vec<(ItemId, String)>,
	pub is_active: bool,
	pub is_reviewed: bool,
	pub properties: Vec<Property>,
	pub errors: Vec<Diagnostic>,
	pub suggestions: Vec<Diagnostic>,
}

/// Projects the focused item out of the state, if it is in the window.
pub fn focus_view(state: &GraphState) -> Option<FocusView> {
	let item = state.current_item.clone()?;
	let window = &state.window;
	let (title, name, class_id, item_state) = if item.is_node {
		let node = window.nodes.get(&item.id)?;
		(node.name.clone(), node.name.clone(), node.class_id.clone(), &node.state)
	} else {
		let link = window.links.get(&item.id)?;
		let name_of = |id: &ItemId| window.nodes.get(id).map_or_else(|| id.to_string(), |n| n.name.clone());
		let class = state.ontology.name_of(false, &link.class_id).unwrap_or(link.class_id.as_str());
		(
			format!("{} -> {}", name_of(&link.source), name_of(&link.target)),
			class.to_owned(),
			link.class_id.clone(),
			&link.state,
		)
	};
	let classes = if item.is_node {
		&state.ontology.nodes
	} else {
		&state.ontology.edges
	};
	let mut classes: Vec<_> = classes
		.values()
		.map(|c| (c.id.clone(), c.name.clone()))
		.collect();
	classes.sort_by(|a, b| a.1.cmp(&b.1));

	Some(FocusView {
		item,
		title,
		name,
		class_id,
		classes,
		is_active: item_state.is_active,
		is_reviewed: item_state.is_reviewed,
		properties: item_state.properties.clone(),
		errors: item_state.errors.clone(),
		suggestions: item_state.suggestions.clone(),
	})
}

/// Text shown in a property's input: strings without their JSON quotes.
pub fn property_text(value: &serde_json::Value) -> String {
	match value {
		serde_json::Value::String(text) => text.clone(),
		other => other.to_string(),
	}
}

/// Applies an edited input to the property `id`, typed by its `value_type`.
/// Input that does not parse as the property's type leaves it unchanged.
pub fn edit_property(properties: &[Property], id: &ItemId, raw: &str) -> Vec<Property> {
	properties
		.iter()
		.map(|p| {
			if &p.id != id {
				return p.clone();
			}
			let raw = raw.trim();
			let value = match p.value_type.as_str() {
				"bool" => raw.parse::<bool>().ok().map(serde_json::Value::from),
				"int" => raw.parse::<i64>().ok().map(serde_json::Value::from),
				"float" => raw
					.parse::<f64>()
					.ok()
					.and_then(serde_json::Number::from_f64)
					.map(serde_json::Value::Number),
				_ => Some(serde_json::Value::from(raw)),
			};
			match value {
				Some(value) => Property { value, ..p.clone() },
				None => p.clone(),
			}
		})
		.collect()
}

fn diagnostic_rows(
	item: ItemRef,
	diagnostics: Vec<Diagnostic>,
	is_error: bool,
	on_intent: Callback<PanelIntent>,
) -> impl IntoView {
	diagnostics
		.into_iter()
		.map(|d| {
			let intent = PanelIntent::Acknowledge {
				item: item.clone(),
				is_error,
				diagnostic_id: d.id.clone(),
			};
			view! {
				<li class:acknowledged=d.acknowledged>
					<span class="kind">{d.kind.clone()}</span>
					<span class="value">{d.value.clone()}</span>
					<button
						disabled=d.acknowledged
						on:click=move |_| on_intent.run(intent.clone())
					>
						"Acknowledge"
					</button>
				</li>
			}
		})
		.collect_view()
}

/// Details and edits for the focused node or link.
#[component]
pub fn FocusPanel(state: RwSignal<GraphState>, on_intent: Callback<PanelIntent>) -> impl IntoView {
	let focus = Memo::new(move |_| state.with(focus_view));
	let name = RwSignal::new(String::new());
	let class = RwSignal::new(String::new());
	let draft = RwSignal::new(Vec::<Property>::new());

	Effect::new(move |_| {
		if let Some(view) = focus.get() {
			name.set(view.name);
			class.set(view.class_id.to_string());
			draft.set(view.properties);
		}
	});

	let save = move |_: leptos::ev::MouseEvent| {
		let Some(view) = focus.get_untracked() else {
			return;
		};
		let patch = if view.item.is_node {
			ItemPatch::rename(name.get_untracked(), class.get_untracked())
		} else {
			ItemPatch {
				class_id: Some(class.get_untracked().into()),
				..ItemPatch::default()
			}
		};
		on_intent.run(PanelIntent::Update(view.item, patch));
	};

	move || {
		focus.get().map(|view| {
			let FocusView {
				item,
				title,
				classes,
				is_active,
				is_reviewed,
				properties,
				errors,
				suggestions,
				..
			} = view;
			let (review_item, activation_item, reverse_item) = (item.clone(), item.clone(), item.clone());
			let is_node = item.is_node;
			let has_properties = !properties.is_empty();
			let properties_item = item.clone();
			let property_rows = properties
				.into_iter()
				.map(|p| {
					let intent = PanelIntent::DeleteProperty(item.clone(), p.id.clone());
					let id = p.id.clone();
					view! {
						<li>
							<label class="name">{p.name.clone()}</label>
							<input
								class="value"
								value=property_text(&p.value)
								on:change=move |ev| {
									let raw = event_target_value(&ev);
									draft.update(|d| *d = edit_property(d, &id, &raw));
								}
							/>
							<button on:click=move |_| on_intent.run(intent.clone())>"Delete"</button>
						</li>
					}
				})
				.collect_view();
			let error_rows = diagnostic_rows(item.clone(), errors, true, on_intent);
			let suggestion_rows = diagnostic_rows(item.clone(), suggestions, false, on_intent);

			view! {
				<aside class="focus-panel">
					<header>
						<h2>{title}</h2>
						<button on:click=move |_| on_intent.run(PanelIntent::Close)>"Close"</button>
					</header>
					<section class="information">
						<Show when=move || is_node>
							<input
								prop:value=move || name.get()
								on:input=move |ev| name.set(event_target_value(&ev))
							/>
						</Show>
						<select
							prop:value=move || class.get()
							on:change=move |ev| class.set(event_target_value(&ev))
						>
							{classes
								.into_iter()
								.map(|(id, label)| view! { <option value=id.to_string()>{label}</option> })
								.collect_view()}
						</select>
						<button on:click=save>"Save"</button>
						<Show when=move || !is_node>
							{
								let item = reverse_item.clone();
								view! {
									<button on:click=move |_| {
										on_intent.run(PanelIntent::Update(item.clone(), ItemPatch::reverse()))
									}>"Reverse direction"</button>
								}
							}
						</Show>
					</section>
					<section class="state">
						<button on:click=move |_| on_intent.run(PanelIntent::ToggleReview(review_item.clone()))>
							{if is_reviewed { "Mark unreviewed" } else { "Mark reviewed" }}
						</button>
						<button on:click=move |_| {
							on_intent.run(PanelIntent::ToggleActivation(activation_item.clone()))
						}>{if is_active { "Deactivate" } else { "Activate" }}</button>
					</section>
					<section class="properties">
						<h3>"Properties"</h3>
						<ul>{property_rows}</ul>
						<Show when=move || has_properties>
							{
								let item = properties_item.clone();
								view! {
									<button on:click=move |_| {
										on_intent
											.run(
												PanelIntent::Update(
													item.clone(),
													ItemPatch::properties(draft.get_untracked()),
												),
											)
									}>"Save properties"</button>
								}
							}
						</Show>
					</section>
					<section class="errors">
						<h3>"Errors"</h3>
						<ul>{error_rows}</ul>
					</section>
					<section class="suggestions">
						<h3>"Suggestions"</h3>
						<ul>{suggestion_rows}</ul>
					</section>
				</aside>
			}
		})
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use rstest::rstest;

	use super::*;
	use crate::model::Ontology;
	use crate::store::{Action, Transition};
	use crate::testing::{class, diagnostic, link, node, payload};

	fn focused(item: ItemRef) -> GraphState {
		let mut state = GraphState {
			ontology: Ontology::from_classes(
				vec![class("T2", "Person", true), class("T1", "Organisation", true)],
				vec![class("R1", "owns", false)],
			),
			..GraphState::default()
		};
		let Transition::FetchStarted(generation) = state.apply(Action::BeginFetch {
			central: None,
			page: 0,
			limit: 10,
		}) else {
			panic!("fetch did not start");
		};
		let mut acme = node("a", "Acme");
		acme.state.errors = vec![diagnostic("e1", false)];
		state.apply(Action::SetSubgraph {
			generation,
			payload: payload("a", vec![acme, node("b", "Beta")], vec![link("ab", "a", "b")]),
		});
		state.apply(Action::SetCurrentItem(Some(item)));
		state
	}

	#[test]
	fn node_focus_lists_node_classes_by_name() {
		let view = focus_view(&focused(ItemRef::node("a"))).unwrap();
		assert_eq!(view.title, "Acme");
		assert_eq!(view.class_id, ItemId::from("T1"));
		assert_eq!(
			view.classes,
			vec![(ItemId::from("T1"), "Organisation".to_owned()), (ItemId::from("T2"), "Person".to_owned())]
		);
		assert_eq!(view.errors.len(), 1);
	}

	#[test]
	fn link_focus_is_titled_by_its_endpoints() {
		let view = focus_view(&focused(ItemRef::link("ab"))).unwrap();
		assert_eq!(view.title, "Acme -> Beta");
		assert_eq!(view.name, "owns");
		assert_eq!(view.classes.len(), 1);
	}

	fn property(id: &str, value: serde_json::Value, value_type: &str) -> Property {
		Property {
			id: id.into(),
			name: id.to_uppercase(),
			value,
			value_type: value_type.into(),
			updated_at: None,
		}
	}

	#[rstest]
	#[case("int", serde_json::json!(1), " 42 ", serde_json::json!(42))]
	#[case("int", serde_json::json!(1), "4.5", serde_json::json!(1))]
	#[case("float", serde_json::json!(1.5), "2.25", serde_json::json!(2.25))]
	#[case("bool", serde_json::json!(false), "true", serde_json::json!(true))]
	#[case("bool", serde_json::json!(false), "yes", serde_json::json!(false))]
	#[case("str", serde_json::json!("a"), "Acme", serde_json::json!("Acme"))]
	fn edits_are_typed_by_value_type(
		#[case] value_type: &str,
		#[case] before: serde_json::Value,
		#[case] raw: &str,
		#[case] after: serde_json::Value,
	) {
		let properties = vec![property("p1", before, value_type), property("p2", serde_json::json!(7), "int")];
		let edited = edit_property(&properties, &"p1".into(), raw);
		assert_eq!(edited[0].value, after);
		assert_eq!(edited[1], properties[1]);
	}

	#[test]
	fn property_text_drops_string_quotes() {
		assert_eq!(property_text(&serde_json::json!("Acme")), "Acme");
		assert_eq!(property_text(&serde_json::json!(1901)), "1901");
		assert_eq!(property_text(&serde_json::json!(true)), "true");
	}

	#[test]
	fn acknowledge_rows_own_their_item() {
		let rows = {
			let item = ItemRef::node("a");
			diagnostic_rows(item.clone(), vec![diagnostic("e1", false)], true, Callback::new(|_| {}))
		};
		drop(rows);
	}

	#[test]
	fn nothing_to_show_without_a_focused_window_item() {
		let mut state = focused(ItemRef::node("a"));
		state.apply(Action::SetCurrentItem(Some(ItemRef::node("gone"))));
		assert_eq!(focus_view(&state), None);
		state.apply(Action::SetCurrentItem(None));
		assert_eq!(focus_view(&state), None);
	}
}
