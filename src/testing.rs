//! Fixtures shared by unit tests: item builders and an in-memory backend.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};

use crate::api::*;
use crate::error::{CleanGraphError, Result};
use crate::model::{
	Diagnostic, GraphDetails, GraphId, GraphListing, ItemId, ItemRef, ItemState, Link, Node, OntologyClass,
	SubgraphSummary,
};
use crate::window::{NeighborIndex, SubgraphPayload};

pub fn node(id: &str, name: &str) -> Node {
	Node {
		id: id.into(),
		name: name.into(),
		class_id: "T1".into(),
		value: 1,
		color: None,
		state: ItemState::default(),
	}
}

pub fn link(id: &str, source: &str, target: &str) -> Link {
	Link {
		id: id.into(),
		source: source.into(),
		target: target.into(),
		class_id: "R1".into(),
		value: 1,
		color: None,
		state: ItemState::default(),
	}
}

pub fn diagnostic(id: &str, acknowledged: bool) -> Diagnostic {
	Diagnostic {
		id: id.into(),
		kind: "typo".into(),
		value: "check spelling".into(),
		acknowledged,
		updated_at: None,
		action: None,
	}
}

/// Fixed timestamp `2024-01-{day} 12:00:00`.
pub fn at(day: u32) -> NaiveDateTime {
	NaiveDate::from_ymd_opt(2024, 1, day)
		.and_then(|d| d.and_hms_opt(12, 0, 0))
		.expect("valid fixture date")
}

pub fn class(id: &str, name: &str, is_node: bool) -> OntologyClass {
	OntologyClass {
		id: id.into(),
		name: name.into(),
		color: "#3f51b5".into(),
		is_node,
	}
}

/// Window payload over the given items, with the neighbour table built from the links.
pub fn payload(central: &str, nodes: Vec<Node>, links: Vec<Link>) -> SubgraphPayload {
	let nodes: BTreeMap<_, _> = nodes.into_iter().map(|n| (n.id.clone(), n)).collect();
	let links: BTreeMap<_, _> = links.into_iter().map(|l| (l.id.clone(), l)).collect();
	let neighbours = NeighborIndex::from_links(nodes.keys(), links.values());
	SubgraphPayload {
		nodes,
		links,
		neighbours,
		central_node_id: central.into(),
		max_triples: 0,
	}
}

fn apply_flags(state: &mut ItemState, patch: &ItemPatch) {
	if let Some(is_reviewed) = patch.is_reviewed {
		state.is_reviewed = is_reviewed;
	}
	if let Some(is_active) = patch.is_active {
		state.is_active = is_active;
	}
	if let Some(properties) = &patch.properties {
		state.properties = properties.clone();
	}
}

/// Completes on the second poll, letting other futures interleave.
struct YieldOnce(bool);

impl Future for YieldOnce {
	type Output = ();

	fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
		if self.0 {
			return Poll::Ready(());
		}
		self.0 = true;
		cx.waker().wake_by_ref();
		Poll::Pending
	}
}

#[derive(Default)]
struct FullGraph {
	nodes: BTreeMap<ItemId, Node>,
	links: BTreeMap<ItemId, Link>,
	/// Secondary items deactivated together with the key, restored on reactivation.
	cascades: BTreeMap<ItemId, (Vec<ItemId>, Vec<ItemId>)>,
}

impl FullGraph {
	fn incident<'a>(&'a self, node: &'a ItemId) -> impl Iterator<Item = &'a Link> + 'a {
		self.links
			.values()
			.filter(move |l| &l.source == node || &l.target == node)
	}

	fn summary(&self, id: &ItemId) -> Option<SubgraphSummary> {
		let node = self.nodes.get(id)?;
		Some(SubgraphSummary {
			id: node.id.clone(),
			name: node.name.clone(),
			class_id: node.class_id.clone(),
			value: self.incident(id).count() as u64,
			errors: 0,
			suggestions: 0,
			reviewed_progress: 0.0,
		})
	}
}

/// [`GraphApi`] over a whole graph held in memory.
///
/// Behaves like the backend where the client depends on it: default anchoring,
/// paging, the orphan cascade, identity conflicts and merges.
pub struct FakeBackend {
	graph_id: GraphId,
	full: RefCell<FullGraph>,
	classes: RefCell<Vec<OntologyClass>>,
	failing: RefCell<HashSet<&'static str>>,
	yield_windows: Cell<bool>,
	calls: RefCell<Vec<&'static str>>,
}

impl FakeBackend {
	pub fn new(nodes: Vec<Node>, links: Vec<Link>) -> Self {
		let full = FullGraph {
			nodes: nodes.into_iter().map(|n| (n.id.clone(), n)).collect(),
			links: links.into_iter().map(|l| (l.id.clone(), l)).collect(),
			cascades: BTreeMap::new(),
		};
		Self {
			graph_id: "g1".into(),
			full: RefCell::new(full),
			classes: RefCell::new(vec![class("T1", "Organisation", true), class("R1", "owns", false)]),
			failing: RefCell::default(),
			yield_windows: Cell::new(false),
			calls: RefCell::default(),
		}
	}

	pub fn graph_id(&self) -> GraphId {
		self.graph_id.clone()
	}

	/// Makes every later call to `endpoint` answer HTTP 500.
	pub fn fail(&self, endpoint: &'static str) {
		self.failing.borrow_mut().insert(endpoint);
	}

	/// Makes window requests suspend once before answering.
	pub fn yield_windows(&self) {
		self.yield_windows.set(true);
	}

	pub fn calls(&self, endpoint: &str) -> usize {
		self.calls.borrow().iter().filter(|c| **c == endpoint).count()
	}

	pub fn node(&self, id: &str) -> Option<Node> {
		self.full.borrow().nodes.get(id).cloned()
	}

	pub fn link(&self, id: &str) -> Option<Link> {
		self.full.borrow().links.get(id).cloned()
	}

	fn enter(&self, endpoint: &'static str) -> Result<()> {
		self.calls.borrow_mut().push(endpoint);
		if self.failing.borrow().contains(endpoint) {
			return Err(CleanGraphError::Status {
				endpoint: endpoint.to_owned(),
				status: 500,
			});
		}
		Ok(())
	}

	fn not_found(endpoint: &str) -> CleanGraphError {
		CleanGraphError::Status {
			endpoint: endpoint.to_owned(),
			status: 404,
		}
	}

	fn build_window(&self, central: Option<&ItemId>, skip: usize, limit: usize) -> Result<SubgraphPayload> {
		let full = self.full.borrow();
		let anchor = match central {
			Some(id) if full.nodes.contains_key(id) => id.clone(),
			Some(_) => return Err(Self::not_found("window")),
			None => full
				.nodes
				.keys()
				.next()
				.cloned()
				.ok_or_else(|| Self::not_found("window"))?,
		};

		let triples: Vec<&Link> = full.incident(&anchor).collect();
		let page: Vec<Link> = triples.iter().skip(skip).take(limit).map(|l| (*l).clone()).collect();

		let mut ids = BTreeSet::from([anchor.clone()]);
		for l in &page {
			ids.insert(l.source.clone());
			ids.insert(l.target.clone());
		}
		let nodes = ids.iter().filter_map(|id| full.nodes.get(id).cloned()).collect();

		let mut payload = payload(anchor.as_str(), nodes, page);
		payload.max_triples = triples.len() as u64;
		Ok(payload)
	}
}

#[async_trait(?Send)]
impl GraphApi for FakeBackend {
	async fn graphs(&self, skip: usize, limit: usize) -> Result<Vec<GraphListing>> {
		self.enter("graphs")?;
		let listing = GraphListing {
			id: self.graph_id.clone(),
			name: "Acme holdings".into(),
			created_at: Some(at(1)),
			updated_at: Some(at(2)),
		};
		Ok(std::iter::once(listing).skip(skip).take(limit).collect())
	}

	async fn graph(&self, graph: &GraphId) -> Result<GraphDetails> {
		self.enter("graph")?;
		if graph != &self.graph_id {
			return Err(Self::not_found("graph"));
		}
		let full = self.full.borrow();
		let classes = self.classes.borrow();
		Ok(GraphDetails {
			id: self.graph_id.clone(),
			name: "Acme holdings".into(),
			node_classes: classes.iter().filter(|c| c.is_node).cloned().collect(),
			edge_classes: classes.iter().filter(|c| !c.is_node).cloned().collect(),
			subgraphs: full.nodes.keys().filter_map(|id| full.summary(id)).collect(),
			settings: Default::default(),
			total_errors: 0,
			total_suggestions: 0,
			start_node_count: full.nodes.len() as u64,
			start_edge_count: full.links.len() as u64,
			created_at: None,
			updated_at: None,
		})
	}

	async fn window(
		&self,
		graph: &GraphId,
		central: Option<&ItemId>,
		skip: usize,
		limit: usize,
	) -> Result<SubgraphPayload> {
		self.enter("window")?;
		if graph != &self.graph_id {
			return Err(Self::not_found("window"));
		}
		if self.yield_windows.get() {
			YieldOnce(false).await;
		}
		self.build_window(central, skip, limit)
	}

	async fn update_item(&self, item: &ItemRef, patch: &ItemPatch) -> Result<UpdateResponse> {
		self.enter("update_item")?;
		let mut full = self.full.borrow_mut();

		if item.is_node {
			let current = full.nodes.get(&item.id).ok_or_else(|| Self::not_found("update_item"))?;
			let name = patch.name.clone().unwrap_or_else(|| current.name.clone());
			let class_id = patch.class_id.clone().unwrap_or_else(|| current.class_id.clone());
			let clash = full
				.nodes
				.values()
				.find(|n| n.id != item.id && n.name == name && n.class_id == class_id)
				.map(|n| n.id.clone());
			if let Some(existing) = clash {
				return Ok(UpdateResponse {
					item_modified: false,
					node_exists: true,
					linked_triples: full.incident(&item.id).count() as u64,
					existing_node_id: Some(existing),
				});
			}

			let Some(node) = full.nodes.get_mut(&item.id) else {
				return Err(Self::not_found("update_item"));
			};
			let before = node.clone();
			node.name = name;
			node.class_id = class_id;
			apply_flags(&mut node.state, patch);
			return Ok(UpdateResponse {
				item_modified: *node != before,
				..UpdateResponse::default()
			});
		}

		let link = full.links.get_mut(&item.id).ok_or_else(|| Self::not_found("update_item"))?;
		let before = link.clone();
		if let Some(class_id) = &patch.class_id {
			link.class_id = class_id.clone();
		}
		if patch.reverses() {
			std::mem::swap(&mut link.source, &mut link.target);
		}
		apply_flags(&mut link.state, patch);
		Ok(UpdateResponse {
			item_modified: *link != before,
			..UpdateResponse::default()
		})
	}

	async fn merge_node(
		&self,
		node: &ItemId,
		name: &str,
		class_id: &ItemId,
	) -> Result<MergeResponse> {
		self.enter("merge_node")?;
		let mut full = self.full.borrow_mut();
		let target = full
			.nodes
			.values()
			.find(|n| &n.id != node && n.name == name && &n.class_id == class_id)
			.map(|n| n.id.clone())
			.ok_or_else(|| Self::not_found("merge_node"))?;
		full.nodes.remove(node);

		// Re-point the merged node's links at the survivor, folding duplicates.
		let mut by_triple: BTreeMap<(ItemId, ItemId, ItemId), ItemId> = BTreeMap::new();
		let ids: Vec<ItemId> = full.links.keys().cloned().collect();
		for id in ids {
			let Some(mut l) = full.links.remove(&id) else {
				continue;
			};
			if &l.source == node {
				l.source = target.clone();
			}
			if &l.target == node {
				l.target = target.clone();
			}
			if l.source == l.target {
				continue;
			}
			let key = (l.source.clone(), l.class_id.clone(), l.target.clone());
			if let Some(kept) = by_triple.get(&key).cloned() {
				if let Some(kept) = full.links.get_mut(&kept) {
					kept.value += l.value;
				}
			} else {
				by_triple.insert(key, l.id.clone());
				full.links.insert(l.id.clone(), l);
			}
		}

		let value = full.incident(&target).map(|l| l.value).sum::<u32>().max(1);
		let new_node = match full.nodes.get_mut(&target) {
			Some(n) => {
				n.value = value;
				n.clone()
			}
			None => return Err(Self::not_found("merge_node")),
		};
		let new_subgraph = full
			.summary(&target)
			.ok_or_else(|| Self::not_found("merge_node"))?;

		Ok(MergeResponse {
			item_modified: true,
			new_node,
			old_node_ids: vec![node.clone()],
			new_subgraph,
		})
	}

	async fn review(&self, item: &ItemRef, request: &ReviewRequest) -> Result<ReviewResponse> {
		self.enter("review")?;
		let mut full = self.full.borrow_mut();
		let neighbours = request.neighbours.clone().unwrap_or_default();
		let mut found = false;

		if item.is_node {
			if let Some(n) = full.nodes.get_mut(&item.id) {
				n.state.is_reviewed = request.review_all || !n.state.is_reviewed;
				found = true;
			}
		} else if let Some(l) = full.links.get_mut(&item.id) {
			l.state.is_reviewed = request.review_all || !l.state.is_reviewed;
			found = true;
		}
		if request.review_all {
			for id in &neighbours.nodes {
				if let Some(n) = full.nodes.get_mut(id) {
					n.state.is_reviewed = true;
				}
			}
			for id in &neighbours.links {
				if let Some(l) = full.links.get_mut(id) {
					l.state.is_reviewed = true;
				}
			}
		}
		Ok(ReviewResponse {
			item_reviewed: found,
		})
	}

	async fn toggle_activation(&self, item: &ItemRef) -> Result<ActivationResponse> {
		self.enter("toggle_activation")?;
		let mut full = self.full.borrow_mut();

		let current = if item.is_node {
			full.nodes.get(&item.id).map(|n| n.state.is_active)
		} else {
			full.links.get(&item.id).map(|l| l.state.is_active)
		};
		let Some(current) = current else {
			return Err(Self::not_found("toggle_activation"));
		};
		let is_active = !current;

		let (nodes, links) = if is_active {
			full.cascades.remove(&item.id).unwrap_or_default()
		} else {
			let links: Vec<ItemId> = if item.is_node {
				full.incident(&item.id)
					.filter(|l| l.state.is_active)
					.map(|l| l.id.clone())
					.collect()
			} else {
				Vec::new()
			};
			let mut gone: BTreeSet<ItemId> = links.iter().cloned().collect();
			if !item.is_node {
				gone.insert(item.id.clone());
			}

			let mut endpoints = BTreeSet::new();
			for id in &gone {
				if let Some(l) = full.links.get(id) {
					endpoints.insert(l.source.clone());
					endpoints.insert(l.target.clone());
				}
			}
			endpoints.remove(&item.id);
			let orphans: Vec<ItemId> = endpoints
				.into_iter()
				.filter(|n| {
					full.nodes.get(n).is_some_and(|n| n.state.is_active)
						&& full
							.incident(n)
							.filter(|l| l.state.is_active && !gone.contains(&l.id))
							.count() == 0
				})
				.collect();
			full.cascades
				.insert(item.id.clone(), (orphans.clone(), links.clone()));
			(orphans, links)
		};

		let targets = nodes.iter().chain(item.is_node.then_some(&item.id));
		let targets: Vec<ItemId> = targets.cloned().collect();
		for id in &targets {
			if let Some(n) = full.nodes.get_mut(id) {
				n.state.is_active = is_active;
			}
		}
		let link_targets: Vec<ItemId> = links
			.iter()
			.chain((!item.is_node).then_some(&item.id))
			.cloned()
			.collect();
		for id in &link_targets {
			if let Some(l) = full.links.get_mut(id) {
				l.state.is_active = is_active;
			}
		}

		Ok(ActivationResponse {
			item_updated: true,
			is_active: Some(is_active),
			updated_node_ids: nodes,
			updated_edge_ids: links,
		})
	}

	async fn delete_property(
		&self,
		item: &ItemRef,
		property: &ItemId,
	) -> Result<DeletePropertyResponse> {
		self.enter("delete_property")?;
		let mut full = self.full.borrow_mut();
		let state = if item.is_node {
			full.nodes.get_mut(&item.id).map(|n| &mut n.state)
		} else {
			full.links.get_mut(&item.id).map(|l| &mut l.state)
		};
		let Some(state) = state else {
			return Ok(DeletePropertyResponse::default());
		};
		let before = state.properties.len();
		state.properties.retain(|p| &p.id != property);
		Ok(DeletePropertyResponse {
			property_deleted: state.properties.len() != before,
		})
	}

	async fn acknowledge(&self, request: &AcknowledgeRequest) -> Result<AcknowledgeResponse> {
		self.enter("acknowledge")?;
		let mut full = self.full.borrow_mut();
		let state = if request.is_node {
			full.nodes.get_mut(&request.item_id).map(|n| &mut n.state)
		} else {
			full.links.get_mut(&request.item_id).map(|l| &mut l.state)
		};
		let acknowledged = state
			.and_then(|s| {
				s.diagnostics_mut(request.is_error)
					.iter_mut()
					.find(|d| d.id == request.error_or_suggestion_item_id)
			})
			.is_some_and(|d| d.acknowledge(at(1)));
		Ok(AcknowledgeResponse {
			item_acknowledged: acknowledged,
		})
	}

	async fn add_class(&self, graph: &GraphId, request: &ClassRequest) -> Result<ClassResponse> {
		self.enter("add_class")?;
		if graph != &self.graph_id {
			return Err(Self::not_found("add_class"));
		}
		let mut classes = self.classes.borrow_mut();
		if classes
			.iter()
			.any(|c| c.is_node == request.is_node && c.name == request.name)
		{
			return Ok(ClassResponse::default());
		}
		let new_class = OntologyClass {
			id: ItemId::new(format!("class-{}", classes.len() + 1)),
			name: request.name.clone(),
			color: request.color.clone(),
			is_node: request.is_node,
		};
		classes.push(new_class.clone());
		Ok(ClassResponse {
			classes_modified: true,
			new_class: Some(new_class),
		})
	}

	async fn update_class(
		&self,
		graph: &GraphId,
		request: &ClassRequest,
	) -> Result<ClassResponse> {
		self.enter("update_class")?;
		if graph != &self.graph_id {
			return Err(Self::not_found("update_class"));
		}
		let mut classes = self.classes.borrow_mut();
		let clash = classes.iter().any(|c| {
			c.is_node == request.is_node && c.name == request.name && Some(&c.id) != request.id.as_ref()
		});
		let Some(class) = classes.iter_mut().find(|c| Some(&c.id) == request.id.as_ref()) else {
			return Ok(ClassResponse::default());
		};
		if clash {
			return Ok(ClassResponse::default());
		}
		class.name = request.name.clone();
		class.color = request.color.clone();
		Ok(ClassResponse {
			classes_modified: true,
			new_class: Some(class.clone()),
		})
	}

	async fn errors(&self, _graph: &GraphId) -> Result<Vec<DiagnosticListing>> {
		self.enter("errors")?;
		Ok(self.listings(true))
	}

	async fn suggestions(&self, _graph: &GraphId) -> Result<Vec<DiagnosticListing>> {
		self.enter("suggestions")?;
		Ok(self.listings(false))
	}
}

impl FakeBackend {
	fn listings(&self, is_error: bool) -> Vec<DiagnosticListing> {
		let full = self.full.borrow();
		let nodes = full
			.nodes
			.values()
			.map(|n| (&n.id, true, n.name.clone(), &n.class_id, &n.state));
		let links = full
			.links
			.values()
			.map(|l| (&l.id, false, l.class_id.to_string(), &l.class_id, &l.state));
		nodes
			.chain(links)
			.flat_map(|(id, is_node, name, class_id, state)| {
				let diagnostics = if is_error { &state.errors } else { &state.suggestions };
				diagnostics.iter().map(move |d| DiagnosticListing {
					diagnostic: d.clone(),
					item_id: Some(id.clone()),
					is_node: Some(is_node),
					item_name: name.clone(),
					item_type: Some(class_id.to_string()),
				})
			})
			.collect()
	}
}
