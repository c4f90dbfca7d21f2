use chrono::NaiveDateTime;
use log::{debug, warn};

use super::action::{Action, Transition};
use crate::api::ItemPatch;
use crate::model::{
	GraphDetails, GraphId, ItemId, ItemRef, ItemState, Ontology, Settings, SubgraphSummary,
};
use crate::window::{Neighbours, SubgraphWindow};

/// Graph-level metadata kept next to the window.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphMeta {
	pub id: GraphId,
	pub name: String,
	pub total_errors: u64,
	pub total_suggestions: u64,
	pub start_node_count: u64,
	pub start_edge_count: u64,
	pub updated_at: Option<NaiveDateTime>,
}

impl From<&GraphDetails> for GraphMeta {
	fn from(details: &GraphDetails) -> Self {
		Self {
			id: details.id.clone(),
			name: details.name.clone(),
			total_errors: details.total_errors,
			total_suggestions: details.total_suggestions,
			start_node_count: details.start_node_count,
			start_edge_count: details.start_edge_count,
			updated_at: details.updated_at,
		}
	}
}

/// Everything the curation view renders from.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphState {
	pub graph: Option<GraphMeta>,
	pub window: SubgraphWindow,
	pub current_item: Option<ItemRef>,
	pub subgraphs: Vec<SubgraphSummary>,
	pub ontology: Ontology,
	pub settings: Settings,
}

impl GraphState {
	pub fn graph_id(&self) -> Option<&GraphId> {
		self.graph.as_ref().map(|g| &g.id)
	}

	pub fn is_focused(&self, item: &ItemRef) -> bool {
		self.current_item.as_ref() == Some(item)
	}

	/// Applies one action. Pure apart from the state it is called on.
	pub fn apply(&mut self, action: Action) -> Transition {
		let name = action.name();
		let transition = match action {
			Action::SetGraph(details) => self.set_graph(details),
			Action::BeginFetch {
				central,
				page,
				limit,
			} => Transition::FetchStarted(self.window.begin_fetch(central, page, limit)),
			Action::SetSubgraph {
				generation,
				payload,
			} => {
				let central = payload.central_node_id.clone();
				if self.window.install(generation, payload) {
					self.current_item = Some(ItemRef::node(central));
					Transition::Changed
				} else {
					warn!("dropping window of superseded fetch #{generation}");
					Transition::Stale
				}
			}
			Action::FetchFailed { generation } => {
				if self.window.abandon(generation) {
					Transition::Changed
				} else {
					Transition::Stale
				}
			}
			Action::SetCurrentItem(item) => {
				if self.current_item == item {
					Transition::Unchanged
				} else {
					self.current_item = item;
					Transition::Changed
				}
			}
			Action::ReviewItem {
				item,
				review_all,
				neighbours,
				at,
			} => self.review(&item, review_all, neighbours, at),
			Action::ToggleActivation {
				item,
				is_active,
				updated_node_ids,
				updated_edge_ids,
				at,
			} => self.set_activation(&item, is_active, &updated_node_ids, &updated_edge_ids, at),
			Action::UpdateItem { item, patch, at } => self.update_item(&item, patch, at),
			Action::DeleteProperty { item, property_id } => {
				match self.window.state_mut(&item) {
					Some(state) => {
						let before = state.properties.len();
						state.properties.retain(|p| p.id != property_id);
						(state.properties.len() != before).into()
					}
					None => Transition::Unchanged,
				}
			}
			Action::Acknowledge {
				item,
				is_error,
				diagnostic_id,
				at,
			} => self
				.window
				.state_mut(&item)
				.and_then(|state| {
					state
						.diagnostics_mut(is_error)
						.iter_mut()
						.find(|d| d.id == diagnostic_id)
				})
				.is_some_and(|diagnostic| diagnostic.acknowledge(at))
				.into(),
			Action::AddClass(class) => self.ontology.insert(class).into(),
			Action::UpdateClass {
				is_node,
				id,
				name,
				color,
			} => self.ontology.update(is_node, &id, &name, &color).into(),
			Action::MergeNodes {
				old_node_ids,
				new_subgraph,
			} => {
				self.subgraphs
					.retain(|s| !old_node_ids.contains(&s.id) && s.id != new_subgraph.id);
				self.subgraphs.push(new_subgraph);
				Transition::Changed
			}
			Action::UpdateSettings(settings) => {
				if self.settings == settings {
					Transition::Unchanged
				} else {
					self.settings = settings;
					Transition::Changed
				}
			}
		};
		debug!("{name}: {transition:?}");
		transition
	}

	fn set_graph(&mut self, details: GraphDetails) -> Transition {
		self.graph = Some(GraphMeta::from(&details));
		self.ontology = Ontology::from_classes(details.node_classes, details.edge_classes);
		self.subgraphs = details.subgraphs;
		self.settings = details.settings;
		Transition::Changed
	}

	fn review(
		&mut self,
		item: &ItemRef,
		review_all: bool,
		neighbours: Option<Neighbours>,
		at: NaiveDateTime,
	) -> Transition {
		if !review_all {
			let Some(state) = self.window.state_mut(item) else {
				return Transition::Unchanged;
			};
			state.is_reviewed = !state.is_reviewed;
			state.updated_at = Some(at);
			return Transition::Changed;
		}

		let neighbours = neighbours.unwrap_or_default();
		let mark = |state: &mut ItemState| {
			state.is_reviewed = true;
			state.updated_at = Some(at);
		};

		let mut touched = false;
		let node_ids = neighbours.nodes.iter().chain(item.is_node.then_some(&item.id));
		for id in node_ids {
			if let Some(node) = self.window.node_mut(id) {
				mark(&mut node.state);
				touched = true;
			}
		}
		let link_ids = neighbours.links.iter().chain((!item.is_node).then_some(&item.id));
		for id in link_ids {
			if let Some(link) = self.window.link_mut(id) {
				mark(&mut link.state);
				touched = true;
			}
		}
		touched.into()
	}

	fn set_activation(
		&mut self,
		item: &ItemRef,
		is_active: bool,
		updated_node_ids: &[ItemId],
		updated_edge_ids: &[ItemId],
		at: NaiveDateTime,
	) -> Transition {
		let mut touched = false;
		let node_ids = updated_node_ids.iter().chain(item.is_node.then_some(&item.id));
		for id in node_ids {
			if let Some(node) = self.window.node_mut(id) {
				node.state.is_active = is_active;
				node.state.updated_at = Some(at);
				touched = true;
			}
		}
		let link_ids = updated_edge_ids.iter().chain((!item.is_node).then_some(&item.id));
		for id in link_ids {
			if let Some(link) = self.window.link_mut(id) {
				link.state.is_active = is_active;
				link.state.updated_at = Some(at);
				touched = true;
			}
		}
		touched.into()
	}

	fn update_item(&mut self, item: &ItemRef, patch: ItemPatch, at: NaiveDateTime) -> Transition {
		let identity = patch.touches_identity();
		let ItemPatch {
			name,
			class_id,
			is_reviewed,
			is_active,
			properties,
			reverse_direction,
		} = patch;

		let state = if item.is_node {
			let Some(node) = self.window.node_mut(&item.id) else {
				return Transition::Unchanged;
			};
			if let Some(name) = name {
				node.name = name;
			}
			if let Some(class_id) = class_id {
				node.class_id = class_id;
			}
			if identity {
				if let Some(summary) = self.subgraphs.iter_mut().find(|s| s.id == item.id) {
					summary.name = node.name.clone();
					summary.class_id = node.class_id.clone();
				}
			}
			&mut node.state
		} else {
			let Some(link) = self.window.link_mut(&item.id) else {
				return Transition::Unchanged;
			};
			if let Some(class_id) = class_id {
				link.class_id = class_id;
			}
			if reverse_direction == Some(true) {
				std::mem::swap(&mut link.source, &mut link.target);
			}
			&mut link.state
		};

		if let Some(is_reviewed) = is_reviewed {
			state.is_reviewed = is_reviewed;
		}
		if let Some(is_active) = is_active {
			state.is_active = is_active;
		}
		if let Some(properties) = properties {
			state.properties = properties;
		}
		state.updated_at = Some(at);
		Transition::Changed
	}
}
