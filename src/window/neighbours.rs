use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::model::{ItemId, Link};

/// Items directly incident to one node or link.
///
/// Also the shape of the neighbour snapshot sent with a review-all request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Neighbours {
	#[serde(default)]
	pub nodes: Vec<ItemId>,
	#[serde(default)]
	pub links: Vec<ItemId>,
}

/// Adjacency table: item id → incident node and link ids.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NeighborIndex(BTreeMap<ItemId, Neighbours>);

impl NeighborIndex {
	/// Builds node adjacency from links: both endpoints gain each other and the link id.
	pub fn from_links<'a>(
		node_ids: impl IntoIterator<Item = &'a ItemId>,
		links: impl IntoIterator<Item = &'a Link>,
	) -> Self {
		let mut sets: BTreeMap<ItemId, (BTreeSet<ItemId>, BTreeSet<ItemId>)> = node_ids
			.into_iter()
			.map(|id| (id.clone(), Default::default()))
			.collect();

		for link in links {
			let (a, b) = (&link.source, &link.target);
			let entry = sets.entry(a.clone()).or_default();
			entry.0.insert(b.clone());
			entry.1.insert(link.id.clone());
			let entry = sets.entry(b.clone()).or_default();
			entry.0.insert(a.clone());
			entry.1.insert(link.id.clone());
		}

		Self(
			sets.into_iter()
				.map(|(id, (nodes, links))| {
					(
						id,
						Neighbours {
							nodes: nodes.into_iter().collect(),
							links: links.into_iter().collect(),
						},
					)
				})
				.collect(),
		)
	}

	/// Adds an entry for every link: its two endpoints, no further links.
	pub(crate) fn add_link_entries<'a>(&mut self, links: impl IntoIterator<Item = &'a Link>) {
		for link in links {
			let mut nodes = vec![link.source.clone()];
			if link.target != link.source {
				nodes.push(link.target.clone());
			}
			self.0.insert(
				link.id.clone(),
				Neighbours {
					nodes,
					links: Vec::new(),
				},
			);
		}
	}

	pub fn get(&self, id: &ItemId) -> Option<&Neighbours> {
		self.0.get(id)
	}

	pub fn contains(&self, id: &ItemId) -> bool {
		self.0.contains_key(id)
	}

	pub fn nodes_of(&self, id: &ItemId) -> &[ItemId] {
		self.0.get(id).map(|n| n.nodes.as_slice()).unwrap_or(&[])
	}

	pub fn links_of(&self, id: &ItemId) -> &[ItemId] {
		self.0.get(id).map(|n| n.links.as_slice()).unwrap_or(&[])
	}

	/// Owned copy of one entry, taken before a review-all request.
	pub fn snapshot(&self, id: &ItemId) -> Neighbours {
		self.0.get(id).cloned().unwrap_or_default()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
