use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

use super::ids::{GraphId, ItemId};
use super::ontology::OntologyClass;
use super::settings::Settings;

/// One entry of a graph's subgraph list: a central node and its review progress.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SubgraphSummary {
	#[serde(rename = "_id", alias = "id")]
	pub id: ItemId,
	pub name: String,
	#[serde(rename = "type")]
	pub class_id: ItemId,
	/// Number of triples around the central node.
	#[serde(default, deserialize_with = "count")]
	pub value: u64,
	#[serde(default)]
	pub errors: u64,
	#[serde(default)]
	pub suggestions: u64,
	#[serde(default)]
	pub reviewed_progress: f64,
}

/// Graph metadata, ontology, subgraph list and settings (`GET /graph/{id}`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphDetails {
	#[serde(rename = "_id", alias = "id")]
	pub id: GraphId,
	pub name: String,
	#[serde(default)]
	pub node_classes: Vec<OntologyClass>,
	#[serde(default)]
	pub edge_classes: Vec<OntologyClass>,
	#[serde(default)]
	pub subgraphs: Vec<SubgraphSummary>,
	#[serde(default)]
	pub settings: Settings,
	#[serde(default)]
	pub total_errors: u64,
	#[serde(default)]
	pub total_suggestions: u64,
	#[serde(default)]
	pub start_node_count: u64,
	#[serde(default)]
	pub start_edge_count: u64,
	#[serde(default, deserialize_with = "super::timestamp::optional")]
	pub created_at: Option<NaiveDateTime>,
	#[serde(default, deserialize_with = "super::timestamp::optional")]
	pub updated_at: Option<NaiveDateTime>,
}

/// Entry of the graph list (`GET /graph/`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphListing {
	#[serde(rename = "_id", alias = "id")]
	pub id: GraphId,
	pub name: String,
	#[serde(default, deserialize_with = "super::timestamp::optional")]
	pub created_at: Option<NaiveDateTime>,
	#[serde(default, deserialize_with = "super::timestamp::optional")]
	pub updated_at: Option<NaiveDateTime>,
}

/// The backend declares the triple count as a string but sends numbers too.
fn count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
	D: Deserializer<'de>,
{
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum Raw {
		Number(u64),
		Float(f64),
		Text(String),
	}

	match Raw::deserialize(deserializer)? {
		Raw::Number(n) => Ok(n),
		Raw::Float(f) => Ok(f.max(0.0) as u64),
		Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn summary_value_accepts_strings_and_numbers() {
		let a: SubgraphSummary =
			serde_json::from_str(r#"{"_id":"n1","name":"A","type":"c","value":"12"}"#).unwrap();
		let b: SubgraphSummary =
			serde_json::from_str(r#"{"_id":"n2","name":"B","type":"c","value":7}"#).unwrap();
		assert_eq!(a.value, 12);
		assert_eq!(b.value, 7);
	}

	#[test]
	fn graph_listing_decodes_list_entry() {
		let listed: Vec<GraphListing> = serde_json::from_value(serde_json::json!([
			{"_id": "g1", "name": "Acme holdings",
				"created_at": "2023-06-01T10:00:00.123000", "updated_at": "2023-06-02T08:30:00"}
		]))
		.unwrap();
		assert_eq!(listed[0].id, GraphId::from("g1"));
		assert_eq!(listed[0].name, "Acme holdings");
		assert!(listed[0].created_at.is_some());
		assert!(listed[0].updated_at > listed[0].created_at);
	}
}
