use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::neighbours::{NeighborIndex, Neighbours};
use crate::error::{CleanGraphError, Result};
use crate::model::{ItemId, ItemRef, ItemState, Link, Node};

/// A window as served by the backend (`/graph/sample/..` and `/graph/{graph}/{node}`).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SubgraphPayload {
	#[serde(default)]
	pub nodes: BTreeMap<ItemId, Node>,
	#[serde(default)]
	pub links: BTreeMap<ItemId, Link>,
	#[serde(default)]
	pub neighbours: NeighborIndex,
	pub central_node_id: ItemId,
	#[serde(default)]
	pub max_triples: u64,
}

impl SubgraphPayload {
	/// Checks that every link endpoint is present and every node has a neighbour
	/// entry, then adds entries for the links themselves.
	pub fn into_checked(mut self) -> Result<Self> {
		for link in self.links.values() {
			for end in [&link.source, &link.target] {
				if !self.nodes.contains_key(end) {
					return Err(CleanGraphError::InconsistentWindow(format!(
						"link {} references node {end} outside the window",
						link.id
					)));
				}
			}
		}

		if self.neighbours.is_empty() && !self.nodes.is_empty() {
			self.neighbours = NeighborIndex::from_links(self.nodes.keys(), self.links.values());
		}
		if let Some(id) = self.nodes.keys().find(|id| !self.neighbours.contains(id)) {
			return Err(CleanGraphError::InconsistentWindow(format!(
				"node {id} has no neighbour entry"
			)));
		}

		self.neighbours.add_link_entries(self.links.values());
		Ok(self)
	}
}

/// A fetch that was started but whose response has not been applied yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingFetch {
	pub generation: u64,
	pub central: Option<ItemId>,
	pub page: usize,
	pub limit: usize,
}

/// The slice of the graph currently held by the client.
///
/// Node, link and neighbour maps are shared copy-on-write: cloning a window is
/// cheap and a patch only copies the map it touches.
#[derive(Clone, Debug, PartialEq)]
pub struct SubgraphWindow {
	pub nodes: Arc<BTreeMap<ItemId, Node>>,
	pub links: Arc<BTreeMap<ItemId, Link>>,
	pub neighbours: Arc<NeighborIndex>,
	pub central_id: Option<ItemId>,
	pub page: usize,
	pub limit: usize,
	pub max_triples: u64,
	/// Bumped by every fetch; only the newest fetch may install its response.
	pub generation: u64,
	/// False while a fetch is pending or before the first window arrived.
	pub loaded: bool,
	pub pending: Option<PendingFetch>,
}

impl Default for SubgraphWindow {
	fn default() -> Self {
		Self {
			nodes: Arc::default(),
			links: Arc::default(),
			neighbours: Arc::default(),
			central_id: None,
			page: 0,
			limit: 10,
			max_triples: 0,
			generation: 0,
			loaded: false,
			pending: None,
		}
	}
}

impl SubgraphWindow {
	/// Invalidates the window and returns the generation the response must carry.
	pub fn begin_fetch(&mut self, central: Option<ItemId>, page: usize, limit: usize) -> u64 {
		self.generation += 1;
		self.loaded = false;
		self.pending = Some(PendingFetch {
			generation: self.generation,
			central,
			page,
			limit,
		});
		self.generation
	}

	pub fn is_current(&self, generation: u64) -> bool {
		self.pending
			.as_ref()
			.is_some_and(|pending| pending.generation == generation)
	}

	/// Replaces the window with a fetched payload. Returns `false` for a stale generation.
	pub fn install(&mut self, generation: u64, payload: SubgraphPayload) -> bool {
		if !self.is_current(generation) {
			return false;
		}
		let Some(pending) = self.pending.take() else {
			return false;
		};

		self.nodes = Arc::new(payload.nodes);
		self.links = Arc::new(payload.links);
		self.neighbours = Arc::new(payload.neighbours);
		self.central_id = Some(payload.central_node_id);
		self.max_triples = payload.max_triples;
		self.page = pending.page;
		self.limit = pending.limit;
		self.loaded = true;
		true
	}

	/// Drops a failed fetch; the previous window (if any) stays visible.
	pub fn abandon(&mut self, generation: u64) -> bool {
		if !self.is_current(generation) {
			return false;
		}
		self.pending = None;
		self.loaded = self.central_id.is_some();
		true
	}

	/// Page shown by pagination controls, including a pending change.
	pub fn requested_page(&self) -> usize {
		self.pending.as_ref().map_or(self.page, |p| p.page)
	}

	pub fn requested_limit(&self) -> usize {
		self.pending.as_ref().map_or(self.limit, |p| p.limit)
	}

	/// Anchor of the pending fetch, or of the installed window when none is
	/// pending. `None` asks for the graph's default anchor.
	pub fn requested_central(&self) -> Option<ItemId> {
		match &self.pending {
			Some(pending) => pending.central.clone(),
			None => self.central_id.clone(),
		}
	}

	/// Pages of the anchor's triples at the requested page size.
	pub fn page_count(&self) -> usize {
		let limit = self.requested_limit().max(1) as u64;
		self.max_triples.div_ceil(limit).max(1) as usize
	}

	pub fn contains(&self, item: &ItemRef) -> bool {
		if item.is_node {
			self.nodes.contains_key(&item.id)
		} else {
			self.links.contains_key(&item.id)
		}
	}

	pub fn state(&self, item: &ItemRef) -> Option<&ItemState> {
		if item.is_node {
			self.nodes.get(&item.id).map(|n| &n.state)
		} else {
			self.links.get(&item.id).map(|l| &l.state)
		}
	}

	pub fn node_mut(&mut self, id: &ItemId) -> Option<&mut Node> {
		if !self.nodes.contains_key(id) {
			return None;
		}
		Arc::make_mut(&mut self.nodes).get_mut(id)
	}

	pub fn link_mut(&mut self, id: &ItemId) -> Option<&mut Link> {
		if !self.links.contains_key(id) {
			return None;
		}
		Arc::make_mut(&mut self.links).get_mut(id)
	}

	pub fn state_mut(&mut self, item: &ItemRef) -> Option<&mut ItemState> {
		if item.is_node {
			self.node_mut(&item.id).map(|n| &mut n.state)
		} else {
			self.link_mut(&item.id).map(|l| &mut l.state)
		}
	}

	/// Neighbours of the central node, as sent with the toolbar review-all.
	pub fn central_snapshot(&self) -> Option<(ItemId, Neighbours)> {
		let central = self.central_id.clone()?;
		let snapshot = self.neighbours.snapshot(&central);
		Some((central, snapshot))
	}

	/// Checks the window invariants: endpoints are loaded and every item has a neighbour entry.
	pub fn check_consistency(&self) -> Result<()> {
		for link in self.links.values() {
			if !self.nodes.contains_key(&link.source) || !self.nodes.contains_key(&link.target) {
				return Err(CleanGraphError::InconsistentWindow(format!(
					"link {} has an endpoint outside the window",
					link.id
				)));
			}
		}
		let missing = self
			.nodes
			.keys()
			.chain(self.links.keys())
			.find(|id| !self.neighbours.contains(id));
		match missing {
			Some(id) => Err(CleanGraphError::InconsistentWindow(format!(
				"{id} has no neighbour entry"
			))),
			None => Ok(()),
		}
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::testing::{link, node};

	fn payload() -> SubgraphPayload {
		let nodes = [node("a", "A"), node("b", "B")]
			.into_iter()
			.map(|n| (n.id.clone(), n))
			.collect();
		let links = [link("ab", "a", "b")]
			.into_iter()
			.map(|l| (l.id.clone(), l))
			.collect();
		SubgraphPayload {
			nodes,
			links,
			neighbours: NeighborIndex::default(),
			central_node_id: "a".into(),
			max_triples: 1,
		}
	}

	#[test]
	fn checked_payload_gains_link_entries() {
		let checked = payload().into_checked().unwrap();
		assert_eq!(
			checked.neighbours.nodes_of(&"ab".into()),
			&[ItemId::from("a"), ItemId::from("b")][..]
		);
		assert_eq!(checked.neighbours.nodes_of(&"a".into()), &[ItemId::from("b")][..]);
	}

	#[test]
	fn dangling_endpoint_is_rejected() {
		let mut bad = payload();
		bad.links.insert("ax".into(), link("ax", "a", "x"));
		let err = bad.into_checked().unwrap_err();
		assert!(matches!(err, CleanGraphError::InconsistentWindow(_)));
	}

	#[test]
	fn only_newest_generation_installs() {
		let mut window = SubgraphWindow::default();
		let first = window.begin_fetch(None, 0, 10);
		let second = window.begin_fetch(None, 1, 10);

		assert!(!window.install(first, payload().into_checked().unwrap()));
		assert!(!window.loaded);
		assert!(window.install(second, payload().into_checked().unwrap()));
		assert!(window.loaded);
		assert_eq!(window.page, 1);
		assert!(window.check_consistency().is_ok());
	}

	#[test]
	fn abandoned_fetch_keeps_previous_window() {
		let mut window = SubgraphWindow::default();
		let first = window.begin_fetch(None, 0, 10);
		window.install(first, payload().into_checked().unwrap());

		let second = window.begin_fetch(Some("a".into()), 3, 10);
		assert_eq!(window.requested_page(), 3);
		assert!(window.abandon(second));
		assert!(window.loaded);
		assert_eq!(window.requested_page(), 0);
		assert_eq!(window.nodes.len(), 2);
	}

	#[test]
	fn patching_a_shared_window_copies_only_the_touched_map() {
		let mut window = SubgraphWindow::default();
		let generation = window.begin_fetch(None, 0, 10);
		window.install(generation, payload().into_checked().unwrap());
		let before = window.clone();

		window.node_mut(&"a".into()).unwrap().state.is_reviewed = true;

		assert!(!before.nodes[&ItemId::from("a")].state.is_reviewed);
		assert!(Arc::ptr_eq(&before.links, &window.links));
		assert!(!Arc::ptr_eq(&before.nodes, &window.nodes));
	}

	#[test]
	fn page_count_rounds_up() {
		let window = SubgraphWindow {
			max_triples: 21,
			limit: 10,
			..SubgraphWindow::default()
		};
		assert_eq!(window.page_count(), 3);
	}

	#[test]
	fn pagination_follows_the_pending_request() {
		let mut window = SubgraphWindow::default();
		let first = window.begin_fetch(Some("a".into()), 0, 10);
		window.install(first, payload().into_checked().unwrap());
		window.max_triples = 21;
		assert_eq!(window.requested_central(), Some(ItemId::from("a")));
		assert_eq!(window.page_count(), 3);

		window.begin_fetch(Some("b".into()), 0, 5);
		assert_eq!(window.central_id, Some(ItemId::from("a")));
		assert_eq!(window.requested_central(), Some(ItemId::from("b")));
		assert_eq!(window.page_count(), 5);
	}
}
