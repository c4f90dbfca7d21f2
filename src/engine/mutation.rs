use std::rc::Rc;

use log::{debug, info, warn};

use super::merge::MergeConflict;
use super::{ActionKind, LoadingFlags, now};
use crate::api::{AcknowledgeRequest, ClassRequest, GraphApi, ItemPatch, ReviewRequest};
use crate::error::{CleanGraphError, Result};
use crate::model::{GraphId, ItemId, ItemRef, OntologyClass};
use crate::store::{Action, Dispatch};
use crate::window::Neighbours;

/// Result of an attribute patch.
#[derive(Clone, Debug, PartialEq)]
pub enum UpdateOutcome {
	Applied,
	/// The server accepted the request but nothing changed.
	Unchanged,
	/// The patch would make the node identical to another one; nothing was applied.
	Conflict(MergeConflict),
}

/// Item curation: review, activation, attribute patches, diagnostics and ontology.
///
/// Local state only changes after the server confirmed; a failed or refused
/// request leaves the store untouched.
pub struct MutationEngine<A, D> {
	api: Rc<A>,
	store: D,
	loading: LoadingFlags,
}

impl<A, D: Clone> Clone for MutationEngine<A, D> {
	fn clone(&self) -> Self {
		Self {
			api: self.api.clone(),
			store: self.store.clone(),
			loading: self.loading.clone(),
		}
	}
}

impl<A: GraphApi, D: Dispatch> MutationEngine<A, D> {
	pub fn new(api: Rc<A>, store: D, loading: LoadingFlags) -> Self {
		Self {
			api,
			store,
			loading,
		}
	}

	pub fn loading(&self) -> &LoadingFlags {
		&self.loading
	}

	fn ensure_loaded(&self, item: &ItemRef) -> Result<()> {
		if self.store.read(|s| s.window.contains(item)) {
			Ok(())
		} else {
			Err(CleanGraphError::UnknownItem(item.id.clone()))
		}
	}

	fn rejected(action: ActionKind, item: &ItemRef) -> CleanGraphError {
		warn!("{action} on {} was not applied", item.id);
		CleanGraphError::Rejected { action }
	}

	/// Flips the review flag of `item`, or with `review_all` marks `item` and
	/// every id of `neighbours` as reviewed.
	pub async fn toggle_review(
		&self,
		item: &ItemRef,
		review_all: bool,
		neighbours: Option<Neighbours>,
	) -> Result<()> {
		self.ensure_loaded(item)?;
		let _guard = self.loading.acquire(ActionKind::Review, &item.id)?;

		let request = ReviewRequest {
			review_all,
			neighbours: neighbours.clone(),
		};
		let response = self.api.review(item, &request).await?;
		if !response.item_reviewed {
			return Err(Self::rejected(ActionKind::Review, item));
		}

		self.store.dispatch(Action::ReviewItem {
			item: item.clone(),
			review_all,
			neighbours,
			at: now(),
		});
		Ok(())
	}

	/// Reviews the central node together with its neighbourhood, as captured now.
	pub async fn review_central(&self) -> Result<()> {
		let (central, snapshot) = self
			.store
			.read(|s| s.window.central_snapshot())
			.ok_or(CleanGraphError::NoWindow)?;
		self.toggle_review(&ItemRef::node(central), true, Some(snapshot)).await
	}

	/// Toggles `item` and applies the server's orphan cascade. Returns the new state.
	pub async fn toggle_activation(&self, item: &ItemRef) -> Result<bool> {
		let current = self
			.store
			.read(|s| s.window.state(item).map(|state| state.is_active))
			.ok_or_else(|| CleanGraphError::UnknownItem(item.id.clone()))?;
		let _guard = self.loading.acquire(ActionKind::Activation, &item.id)?;

		let response = self.api.toggle_activation(item).await?;
		if !response.item_updated {
			return Err(Self::rejected(ActionKind::Activation, item));
		}

		let is_active = response.is_active.unwrap_or(!current);
		debug!(
			"{} {} with {} nodes and {} links",
			if is_active { "activated" } else { "deactivated" },
			item.id,
			response.updated_node_ids.len(),
			response.updated_edge_ids.len()
		);
		self.store.dispatch(Action::ToggleActivation {
			item: item.clone(),
			is_active,
			updated_node_ids: response.updated_node_ids,
			updated_edge_ids: response.updated_edge_ids,
			at: now(),
		});
		Ok(is_active)
	}

	/// Patches attributes of `item`. A node rename that clashes with an
	/// existing node comes back as [`UpdateOutcome::Conflict`].
	pub async fn update_item(&self, item: &ItemRef, patch: ItemPatch) -> Result<UpdateOutcome> {
		let (name, class_id) = self
			.store
			.read(|s| {
				if item.is_node {
					s.window.nodes.get(&item.id).map(|n| (n.name.clone(), n.class_id.clone()))
				} else {
					s.window.links.get(&item.id).map(|l| (String::new(), l.class_id.clone()))
				}
			})
			.ok_or_else(|| CleanGraphError::UnknownItem(item.id.clone()))?;

		let kind = if patch.reverses() {
			ActionKind::ReverseEdgeDirection
		} else if patch.properties.is_some() {
			ActionKind::Properties
		} else {
			ActionKind::Information
		};
		let _guard = self.loading.acquire(kind, &item.id)?;

		let response = self.api.update_item(item, &patch).await?;
		if response.node_exists {
			let conflict = MergeConflict {
				item_id: item.id.clone(),
				name: patch.name.unwrap_or(name),
				class_id: patch.class_id.unwrap_or(class_id),
				linked_triples: response.linked_triples,
				existing_node_id: response.existing_node_id,
			};
			info!(
				"{} would duplicate {:?}; {} triples affected by a merge",
				item.id, conflict.name, conflict.linked_triples
			);
			return Ok(UpdateOutcome::Conflict(conflict));
		}
		if !response.item_modified {
			debug!("{kind} on {} left the item unchanged", item.id);
			return Ok(UpdateOutcome::Unchanged);
		}

		self.store.dispatch(Action::UpdateItem {
			item: item.clone(),
			patch,
			at: now(),
		});
		Ok(UpdateOutcome::Applied)
	}

	pub async fn delete_property(&self, item: &ItemRef, property_id: &ItemId) -> Result<()> {
		self.ensure_loaded(item)?;
		let _guard = self.loading.acquire(ActionKind::DeleteProperty, &item.id)?;

		let response = self.api.delete_property(item, property_id).await?;
		if !response.property_deleted {
			return Err(Self::rejected(ActionKind::DeleteProperty, item));
		}
		self.store.dispatch(Action::DeleteProperty {
			item: item.clone(),
			property_id: property_id.clone(),
		});
		Ok(())
	}

	/// Acknowledges one error or suggestion. Returns `false` when it already was.
	pub async fn acknowledge(
		&self,
		item: &ItemRef,
		is_error: bool,
		diagnostic_id: &ItemId,
	) -> Result<bool> {
		let acknowledged = self
			.store
			.read(|s| {
				let state = s.window.state(item)?;
				let diagnostics = if is_error { &state.errors } else { &state.suggestions };
				diagnostics
					.iter()
					.find(|d| &d.id == diagnostic_id)
					.map(|d| d.acknowledged)
			})
			.ok_or_else(|| CleanGraphError::UnknownItem(diagnostic_id.clone()))?;
		let _guard = self.loading.acquire(ActionKind::Acknowledge, &item.id)?;

		let request = AcknowledgeRequest {
			is_node: item.is_node,
			item_id: item.id.clone(),
			is_error,
			error_or_suggestion_item_id: diagnostic_id.clone(),
		};
		let response = self.api.acknowledge(&request).await?;
		if !response.item_acknowledged && !acknowledged {
			return Err(Self::rejected(ActionKind::Acknowledge, item));
		}

		let transition = self.store.dispatch(Action::Acknowledge {
			item: item.clone(),
			is_error,
			diagnostic_id: diagnostic_id.clone(),
			at: now(),
		});
		Ok(transition.changed())
	}

	/// Adds a node or edge class to the ontology of `graph`.
	pub async fn add_class(
		&self,
		graph: &GraphId,
		is_node: bool,
		name: &str,
		color: &str,
	) -> Result<OntologyClass> {
		if self.store.read(|s| s.ontology.name_taken(is_node, name, None)) {
			return Err(CleanGraphError::ClassExists(name.to_owned()));
		}
		let _guard = self
			.loading
			.acquire(ActionKind::Ontology, &ItemId::new(graph.as_str()))?;

		let request = ClassRequest {
			id: None,
			is_node,
			name: name.to_owned(),
			color: color.to_owned(),
		};
		let response = self.api.add_class(graph, &request).await?;
		if !response.classes_modified {
			return Err(CleanGraphError::ClassExists(name.to_owned()));
		}
		let mut class = response.new_class.ok_or_else(|| CleanGraphError::Decode {
			endpoint: format!("/graph/item-classes/{graph}"),
			message: "response is missing new_class".into(),
		})?;
		class.is_node = is_node;

		info!("added {} class {:?}", if is_node { "node" } else { "edge" }, class.name);
		self.store.dispatch(Action::AddClass(class.clone()));
		Ok(class)
	}

	/// Renames and recolours an existing class.
	pub async fn update_class(
		&self,
		graph: &GraphId,
		is_node: bool,
		id: &ItemId,
		name: &str,
		color: &str,
	) -> Result<()> {
		if self.store.read(|s| s.ontology.name_taken(is_node, name, Some(id))) {
			return Err(CleanGraphError::ClassExists(name.to_owned()));
		}
		let _guard = self.loading.acquire(ActionKind::Ontology, id)?;

		let request = ClassRequest {
			id: Some(id.clone()),
			is_node,
			name: name.to_owned(),
			color: color.to_owned(),
		};
		let response = self.api.update_class(graph, &request).await?;
		if !response.classes_modified {
			return Err(CleanGraphError::ClassExists(name.to_owned()));
		}
		self.store.dispatch(Action::UpdateClass {
			is_node,
			id: id.clone(),
			name: name.to_owned(),
			color: color.to_owned(),
		});
		Ok(())
	}

	/// Focuses `item`; focusing the focused item again clears the focus.
	pub fn set_focus(&self, item: Option<ItemRef>) -> Option<ItemRef> {
		let next = match item {
			Some(item) if self.store.read(|s| s.is_focused(&item)) => None,
			other => other,
		};
		self.store.dispatch(Action::SetCurrentItem(next.clone()));
		next
	}
}
