use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ids::ItemId;

/// Node or edge type definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OntologyClass {
	#[serde(rename = "_id", alias = "id")]
	pub id: ItemId,
	pub name: String,
	pub color: String,
	/// Not sent by the backend inside the class lists; set from the list the class came from.
	#[serde(default)]
	pub is_node: bool,
}

/// Node and edge classes of the loaded graph, keyed by class id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Ontology {
	pub nodes: BTreeMap<ItemId, OntologyClass>,
	pub edges: BTreeMap<ItemId, OntologyClass>,
}

impl Ontology {
	pub fn from_classes(
		node_classes: impl IntoIterator<Item = OntologyClass>,
		edge_classes: impl IntoIterator<Item = OntologyClass>,
	) -> Self {
		let mut ontology = Self::default();
		for mut class in node_classes {
			class.is_node = true;
			ontology.nodes.insert(class.id.clone(), class);
		}
		for mut class in edge_classes {
			class.is_node = false;
			ontology.edges.insert(class.id.clone(), class);
		}
		ontology
	}

	fn classes(&self, is_node: bool) -> &BTreeMap<ItemId, OntologyClass> {
		if is_node { &self.nodes } else { &self.edges }
	}

	fn classes_mut(&mut self, is_node: bool) -> &mut BTreeMap<ItemId, OntologyClass> {
		if is_node {
			&mut self.nodes
		} else {
			&mut self.edges
		}
	}

	pub fn get(&self, is_node: bool, id: &ItemId) -> Option<&OntologyClass> {
		self.classes(is_node).get(id)
	}

	pub fn color_of(&self, is_node: bool, id: &ItemId) -> Option<&str> {
		self.get(is_node, id).map(|c| c.color.as_str())
	}

	pub fn name_of(&self, is_node: bool, id: &ItemId) -> Option<&str> {
		self.get(is_node, id).map(|c| c.name.as_str())
	}

	/// True when another class of the same kind already uses `name`.
	pub fn name_taken(&self, is_node: bool, name: &str, except: Option<&ItemId>) -> bool {
		self.classes(is_node)
			.values()
			.any(|c| c.name == name && Some(&c.id) != except)
	}

	/// Appends a class. Refuses duplicates by id or by name within the same kind.
	pub fn insert(&mut self, class: OntologyClass) -> bool {
		if self.classes(class.is_node).contains_key(&class.id)
			|| self.name_taken(class.is_node, &class.name, None)
		{
			return false;
		}
		self.classes_mut(class.is_node).insert(class.id.clone(), class);
		true
	}

	/// Renames/recolours an existing class.
	pub fn update(&mut self, is_node: bool, id: &ItemId, name: &str, color: &str) -> bool {
		if self.name_taken(is_node, name, Some(id)) {
			return false;
		}
		let Some(class) = self.classes_mut(is_node).get_mut(id) else {
			return false;
		};
		if class.name == name && class.color == color {
			return false;
		}
		class.name = name.to_owned();
		class.color = color.to_owned();
		true
	}
}
