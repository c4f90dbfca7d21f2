use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

use super::ids::ItemId;

/// A node or link as addressed by mutations: the id plus which collection it lives in.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemRef {
	pub id: ItemId,
	pub is_node: bool,
}

impl ItemRef {
	pub fn node(id: impl Into<ItemId>) -> Self {
		Self {
			id: id.into(),
			is_node: true,
		}
	}

	pub fn link(id: impl Into<ItemId>) -> Self {
		Self {
			id: id.into(),
			is_node: false,
		}
	}

	/// Query value for the `item_type` parameter.
	pub fn item_type(&self) -> &'static str {
		if self.is_node { "node" } else { "edge" }
	}
}

/// Free-form attribute attached to a node or link.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Property {
	pub id: ItemId,
	pub name: String,
	#[serde(default)]
	pub value: serde_json::Value,
	#[serde(default)]
	pub value_type: String,
	#[serde(
		default,
		skip_serializing_if = "Option::is_none",
		deserialize_with = "super::timestamp::optional"
	)]
	pub updated_at: Option<NaiveDateTime>,
}

/// An error or suggestion raised against a node or link.
///
/// Errors arrive as `error_type`/`error_value`, suggestions as
/// `suggestion_type`/`suggestion_value`; both land in `kind`/`value`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
	pub id: ItemId,
	#[serde(alias = "error_type", alias = "suggestion_type")]
	pub kind: String,
	#[serde(alias = "error_value", alias = "suggestion_value")]
	pub value: String,
	#[serde(default)]
	pub acknowledged: bool,
	#[serde(
		default,
		skip_serializing_if = "Option::is_none",
		deserialize_with = "super::timestamp::optional"
	)]
	pub updated_at: Option<NaiveDateTime>,
	/// Optional fix the backend can execute for this diagnostic.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub action: Option<serde_json::Value>,
}

impl Diagnostic {
	/// Marks the diagnostic acknowledged. Returns `false` when it already was;
	/// the timestamp is only refreshed on the first acknowledgement.
	pub fn acknowledge(&mut self, at: NaiveDateTime) -> bool {
		if self.acknowledged {
			return false;
		}
		self.acknowledged = true;
		self.updated_at = Some(at);
		true
	}
}

/// Curation state shared by nodes and links.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemState {
	#[serde(default = "active_by_default")]
	pub is_active: bool,
	#[serde(default)]
	pub is_reviewed: bool,
	#[serde(default)]
	pub properties: Vec<Property>,
	#[serde(default)]
	pub errors: Vec<Diagnostic>,
	#[serde(default)]
	pub suggestions: Vec<Diagnostic>,
	#[serde(
		default,
		skip_serializing_if = "Option::is_none",
		deserialize_with = "super::timestamp::optional"
	)]
	pub updated_at: Option<NaiveDateTime>,
}

impl Default for ItemState {
	fn default() -> Self {
		Self {
			is_active: true,
			is_reviewed: false,
			properties: Vec::new(),
			errors: Vec::new(),
			suggestions: Vec::new(),
			updated_at: None,
		}
	}
}

impl ItemState {
	pub fn open_errors(&self) -> usize {
		self.errors.iter().filter(|d| !d.acknowledged).count()
	}

	pub fn open_suggestions(&self) -> usize {
		self.suggestions.iter().filter(|d| !d.acknowledged).count()
	}

	pub fn diagnostics_mut(&mut self, is_error: bool) -> &mut Vec<Diagnostic> {
		if is_error {
			&mut self.errors
		} else {
			&mut self.suggestions
		}
	}
}

fn active_by_default() -> bool {
	true
}

fn unit_value() -> u32 {
	1
}

/// Treats an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: Deserializer<'de>,
	T: Default + Deserialize<'de>,
{
	Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Graph entity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
	#[serde(rename = "_id", alias = "id")]
	pub id: ItemId,
	#[serde(default, deserialize_with = "null_as_default")]
	pub name: String,
	/// Ontology class id; empty when the backend has none.
	#[serde(rename = "type", default, deserialize_with = "null_as_default")]
	pub class_id: ItemId,
	/// Degree of the node across the full graph.
	#[serde(default = "unit_value")]
	pub value: u32,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub color: Option<String>,
	#[serde(flatten)]
	pub state: ItemState,
}

/// Directed relation between two nodes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Link {
	#[serde(rename = "_id", alias = "id")]
	pub id: ItemId,
	pub source: ItemId,
	pub target: ItemId,
	#[serde(rename = "type", default, deserialize_with = "null_as_default")]
	pub class_id: ItemId,
	/// Frequency of the relation; merged duplicates add up.
	#[serde(default = "unit_value")]
	pub value: u32,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub color: Option<String>,
	#[serde(flatten)]
	pub state: ItemState,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn node_decodes_backend_shape() {
		let node: Node = serde_json::from_value(serde_json::json!({
			"_id": "n1",
			"name": "Acme",
			"type": "c1",
			"value": 3,
			"is_active": true,
			"is_reviewed": false,
			"properties": [{"id": "p1", "name": "founded", "value": 1901, "value_type": "int"}],
			"errors": [{"id": "e1", "error_type": "typo", "error_value": "Acmee", "acknowledged": false,
				"updated_at": "2023-06-01T10:00:00.123000"}],
			"suggestions": [{"id": "s1", "suggestion_type": "merge", "suggestion_value": "ACME", "acknowledged": true}],
			"updated_at": "2023-06-01T10:00:00+00:00"
		}))
		.unwrap();

		assert_eq!(node.id, ItemId::from("n1"));
		assert_eq!(node.class_id, ItemId::from("c1"));
		assert_eq!(node.state.properties.len(), 1);
		assert_eq!(node.state.errors[0].kind, "typo");
		assert_eq!(node.state.open_errors(), 1);
		assert_eq!(node.state.open_suggestions(), 0);
		assert!(node.state.updated_at.is_some());
	}

	#[test]
	fn link_defaults_missing_flags() {
		let link: Link = serde_json::from_value(serde_json::json!({
			"id": "l1", "source": "a", "target": "b", "type": "r"
		}))
		.unwrap();
		assert!(link.state.is_active);
		assert!(!link.state.is_reviewed);
		assert_eq!(link.value, 1);
	}

	#[test]
	fn null_name_and_type_decode_as_empty() {
		let node: Node = serde_json::from_value(serde_json::json!({
			"_id": "n1", "name": null, "type": null
		}))
		.unwrap();
		assert_eq!(node.name, "");
		assert_eq!(node.class_id, ItemId::default());

		let link: Link = serde_json::from_value(serde_json::json!({
			"_id": "l1", "source": "a", "target": "b", "type": null
		}))
		.unwrap();
		assert_eq!(link.class_id.as_str(), "");
	}

	#[test]
	fn acknowledging_twice_keeps_first_timestamp() {
		let mut diagnostic = Diagnostic {
			id: "e1".into(),
			kind: "typo".into(),
			value: "x".into(),
			acknowledged: false,
			updated_at: None,
			action: None,
		};
		let first = NaiveDateTime::parse_from_str("2024-01-01 00:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
		let second = NaiveDateTime::parse_from_str("2024-02-01 00:00:00", "%Y-%m-%d %H:%M:%S").unwrap();

		assert!(diagnostic.acknowledge(first));
		assert!(!diagnostic.acknowledge(second));
		assert!(diagnostic.acknowledged);
		assert_eq!(diagnostic.updated_at, Some(first));
	}
}
