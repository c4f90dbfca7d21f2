use serde::{Deserialize, Serialize};

use crate::model::{Diagnostic, ItemId, ItemRef, Node, OntologyClass, Property, SubgraphSummary};
use crate::window::Neighbours;

/// Attribute patch for `PATCH /graph/{item}`. Unset fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemPatch {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	#[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
	pub class_id: Option<ItemId>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub is_reviewed: Option<bool>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub is_active: Option<bool>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub properties: Option<Vec<Property>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub reverse_direction: Option<bool>,
}

impl ItemPatch {
	pub fn rename(name: impl Into<String>, class_id: impl Into<ItemId>) -> Self {
		Self {
			name: Some(name.into()),
			class_id: Some(class_id.into()),
			..Self::default()
		}
	}

	pub fn reverse() -> Self {
		Self {
			reverse_direction: Some(true),
			..Self::default()
		}
	}

	pub fn properties(properties: Vec<Property>) -> Self {
		Self {
			properties: Some(properties),
			..Self::default()
		}
	}

	pub fn reverses(&self) -> bool {
		self.reverse_direction == Some(true)
	}

	pub fn touches_identity(&self) -> bool {
		self.name.is_some() || self.class_id.is_some()
	}
}

/// Either `item_modified` or, for a node identity clash, `node_exists` with conflict data.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateResponse {
	#[serde(default)]
	pub item_modified: bool,
	#[serde(default)]
	pub node_exists: bool,
	#[serde(default)]
	pub linked_triples: u64,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub existing_node_id: Option<ItemId>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MergeResponse {
	#[serde(default)]
	pub item_modified: bool,
	pub new_node: Node,
	#[serde(default)]
	pub old_node_ids: Vec<ItemId>,
	pub new_subgraph: SubgraphSummary,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewRequest {
	pub review_all: bool,
	pub neighbours: Option<Neighbours>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewResponse {
	#[serde(default)]
	pub item_reviewed: bool,
}

/// Result of an activation toggle; the id lists are the server-computed cascade.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivationResponse {
	#[serde(default)]
	pub item_updated: bool,
	/// New state of the toggled item, when the backend reports it.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub is_active: Option<bool>,
	#[serde(default)]
	pub updated_node_ids: Vec<ItemId>,
	#[serde(default)]
	pub updated_edge_ids: Vec<ItemId>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DeletePropertyResponse {
	#[serde(default)]
	pub property_deleted: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AcknowledgeRequest {
	pub is_node: bool,
	pub item_id: ItemId,
	pub is_error: bool,
	pub error_or_suggestion_item_id: ItemId,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AcknowledgeResponse {
	#[serde(default)]
	pub item_acknowledged: bool,
}

/// Body of the ontology class endpoints; `id` is only sent for updates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassRequest {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<ItemId>,
	pub is_node: bool,
	pub name: String,
	pub color: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassResponse {
	#[serde(default)]
	pub classes_modified: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub new_class: Option<OntologyClass>,
}

/// Row of the graph-wide error/suggestion listings.
///
/// The backend does not always say which item a row belongs to; such rows
/// can be shown but not selected.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticListing {
	#[serde(flatten)]
	pub diagnostic: Diagnostic,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub item_id: Option<ItemId>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub is_node: Option<bool>,
	#[serde(default)]
	pub item_name: String,
	/// Class name or class id, depending on the listing.
	#[serde(default)]
	pub item_type: Option<String>,
}

impl DiagnosticListing {
	/// The item the row points at. Listings only cover nodes unless they say otherwise.
	pub fn item(&self) -> Option<ItemRef> {
		let id = self.item_id.clone()?;
		Some(if self.is_node.unwrap_or(true) {
			ItemRef::node(id)
		} else {
			ItemRef::link(id)
		})
	}
}
