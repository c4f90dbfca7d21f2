use std::collections::HashSet;

use crate::model::ItemId;
use crate::window::NeighborIndex;

/// Items emphasised while a node is dragged. Empty sets mean "show everything".
///
/// The sets are cleared and refilled in place across drags.
#[derive(Clone, Debug, Default)]
pub struct Highlight {
	nodes: HashSet<ItemId>,
	links: HashSet<ItemId>,
}

impl Highlight {
	/// Highlights `node`, its neighbour nodes and its incident links.
	pub fn start(&mut self, node: &ItemId, neighbours: &NeighborIndex) {
		self.clear();
		self.nodes.insert(node.clone());
		self.nodes.extend(neighbours.nodes_of(node).iter().cloned());
		self.links.extend(neighbours.links_of(node).iter().cloned());
	}

	pub fn clear(&mut self) {
		self.nodes.clear();
		self.links.clear();
	}

	pub fn is_active(&self) -> bool {
		!self.nodes.is_empty()
	}

	pub fn node_visible(&self, id: &ItemId) -> bool {
		self.nodes.is_empty() || self.nodes.contains(id)
	}

	pub fn link_visible(&self, id: &ItemId) -> bool {
		self.links.is_empty() || self.links.contains(id)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::link;

	fn index() -> NeighborIndex {
		let ids: Vec<ItemId> = ["d", "a", "b", "c"].into_iter().map(ItemId::from).collect();
		NeighborIndex::from_links(&ids, &[link("da", "d", "a"), link("db", "d", "b"), link("bc", "b", "c")])
	}

	#[test]
	fn everything_is_visible_without_a_drag() {
		let highlight = Highlight::default();
		for id in ["a", "b", "c", "d", "da", "bc"] {
			assert!(highlight.node_visible(&id.into()));
			assert!(highlight.link_visible(&id.into()));
		}
	}

	#[test]
	fn dragging_shows_only_the_neighbourhood() {
		let mut highlight = Highlight::default();
		highlight.start(&"d".into(), &index());

		let visible: Vec<&str> = ["a", "b", "c", "d"]
			.into_iter()
			.filter(|id| highlight.node_visible(&(*id).into()))
			.collect();
		assert_eq!(visible, vec!["a", "b", "d"]);
		assert!(highlight.link_visible(&"db".into()));
		assert!(!highlight.link_visible(&"bc".into()));

		highlight.clear();
		assert!(!highlight.is_active());
		assert!(highlight.node_visible(&"c".into()));
	}

	#[test]
	fn isolated_node_highlights_only_itself() {
		let ids = vec![ItemId::from("z")];
		let index = NeighborIndex::from_links(&ids, std::iter::empty());
		let mut highlight = Highlight::default();
		highlight.start(&"z".into(), &index);
		assert!(highlight.node_visible(&"z".into()));
		assert!(!highlight.node_visible(&"a".into()));
		// No incident links: the link set stays empty, so links remain visible.
		assert!(highlight.link_visible(&"da".into()));
	}
}
