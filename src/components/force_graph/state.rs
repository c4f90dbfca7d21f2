use std::collections::{BTreeMap, HashMap};
use std::f64::consts::PI;
use std::sync::Arc;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData};
use log::debug;

use super::highlight::Highlight;
use super::layout::{LayoutConfig, collide_correction, link_correction};
use super::render::{DrawCommand, LinkView, NodeView, RenderStyle, Viewport, paint_link, paint_node};
use crate::model::{ItemId, ItemRef, Link};
use crate::store::GraphState;
use crate::window::SubgraphWindow;

/// Colour used when neither the item nor its class carries one.
pub const FALLBACK_COLOR: &str = "#9e9e9e";
/// Extra slack around a link's stroke that still counts as a hit.
pub const LINK_HIT_SLACK: f64 = 8.0;
/// Pointer travel (screen pixels) after which a press becomes a drag.
pub const DRAG_THRESHOLD: f64 = 4.0;

/// Ticks after which an undisturbed layout stops animating.
pub const SETTLE_TICKS: u32 = 600;

const LINK_STRENGTH: f64 = 0.1;

#[derive(Clone, Debug, Default)]
pub struct NodeInfo {
	pub id: ItemId,
}

#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node: Option<ItemId>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f32,
	pub node_start_y: f32,
	/// Set once the pointer travelled far enough to count as a drag, not a click.
	pub moved: bool,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// Layout and interaction state of the canvas, rebuilt whenever the window's
/// topology changes.
pub struct ForceGraphState {
	pub graph: ForceGraph<NodeInfo, ()>,
	pub layout: LayoutConfig,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub highlight: Highlight,
	pub width: f64,
	pub height: f64,
	pub animation_running: bool,
	ticks: u32,
	index: HashMap<ItemId, DefaultNodeIdx>,
	edges: Vec<(DefaultNodeIdx, DefaultNodeIdx)>,
	/// Window generation and link map the simulation was built from.
	built: Option<(u64, Arc<BTreeMap<ItemId, Link>>)>,
}

impl ForceGraphState {
	pub fn new(layout: LayoutConfig, width: f64, height: f64) -> Self {
		Self {
			graph: ForceGraph::new(layout.simulation_parameters()),
			layout,
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 0.5,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			highlight: Highlight::default(),
			width,
			height,
			animation_running: true,
			ticks: 0,
			index: HashMap::new(),
			edges: Vec::new(),
			built: None,
		}
	}

	fn is_built_from(&self, window: &SubgraphWindow) -> bool {
		self.built.as_ref().is_some_and(|(generation, links)| {
			*generation == window.generation
				&& (Arc::ptr_eq(links, &window.links) || same_topology(links, &window.links))
		})
	}

	/// Rebuilds the simulation if the window changed shape. Nodes that survive
	/// keep their position and anchoring. Returns whether a rebuild happened.
	pub fn sync(&mut self, window: &SubgraphWindow) -> bool {
		if self.is_built_from(window) {
			if let Some((_, links)) = &mut self.built {
				*links = Arc::clone(&window.links);
			}
			return false;
		}

		let mut previous = HashMap::new();
		self.graph.visit_nodes(|node| {
			previous.insert(
				node.data.user_data.id.clone(),
				(node.data.x, node.data.y, node.data.is_anchor),
			);
		});

		let mut graph = ForceGraph::new(self.layout.simulation_parameters());
		let mut index = HashMap::new();
		let count = window.nodes.len().max(1) as f64;
		let spread = self.layout.link_distance / 2.0;
		for (i, id) in window.nodes.keys().enumerate() {
			let (x, y, is_anchor) = previous.get(id).copied().unwrap_or_else(|| {
				let angle = i as f64 * 2.0 * PI / count;
				((spread * angle.cos()) as f32, (spread * angle.sin()) as f32, false)
			});
			let idx = graph.add_node(NodeData {
				x,
				y,
				mass: 10.0,
				is_anchor,
				user_data: NodeInfo { id: id.clone() },
			});
			index.insert(id.clone(), idx);
		}

		let mut edges = Vec::new();
		for link in window.links.values() {
			if let (Some(&src), Some(&tgt)) = (index.get(&link.source), index.get(&link.target)) {
				if src != tgt {
					graph.add_edge(src, tgt, EdgeData::default());
					edges.push((src, tgt));
				}
			}
		}

		debug!(
			"layout rebuilt for window #{}: {} nodes, {} edges",
			window.generation,
			index.len(),
			edges.len()
		);
		self.graph = graph;
		self.index = index;
		self.edges = edges;
		self.built = Some((window.generation, Arc::clone(&window.links)));
		self.highlight.clear();
		self.wake();
		true
	}

	/// Restarts a settled layout.
	pub fn wake(&mut self) {
		self.ticks = 0;
		self.animation_running = true;
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn positions(&self) -> HashMap<ItemId, (f64, f64)> {
		let mut positions = HashMap::with_capacity(self.index.len());
		self.graph.visit_nodes(|node| {
			positions.insert(node.data.user_data.id.clone(), (node.x() as f64, node.y() as f64));
		});
		positions
	}

	pub fn position(&self, id: &ItemId) -> Option<(f64, f64)> {
		let idx = *self.index.get(id)?;
		let mut found = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				found = Some((node.x() as f64, node.y() as f64));
			}
		});
		found
	}

	/// Topmost visible node under the pointer.
	pub fn node_at(&self, sx: f64, sy: f64, window: &SubgraphWindow, style: &RenderStyle) -> Option<ItemId> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let id = &node.data.user_data.id;
			let Some(item) = window.nodes.get(id) else {
				return;
			};
			if !self.highlight.node_visible(id) {
				return;
			}
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			if (dx * dx + dy * dy).sqrt() < style.node_radius(item.value) {
				found = Some(id.clone());
			}
		});
		found
	}

	/// Closest visible link within hit distance of the pointer.
	pub fn link_at(&self, sx: f64, sy: f64, window: &SubgraphWindow) -> Option<ItemId> {
		let point = self.screen_to_graph(sx, sy);
		let positions = self.positions();
		window
			.links
			.values()
			.filter(|link| self.highlight.link_visible(&link.id))
			.filter_map(|link| {
				let a = *positions.get(&link.source)?;
				let b = *positions.get(&link.target)?;
				let reach = (2.0 * link.value as f64).min(6.0) / 2.0 + LINK_HIT_SLACK;
				let distance = segment_distance(point, a, b);
				(distance <= reach).then_some((distance, &link.id))
			})
			.min_by(|a, b| a.0.total_cmp(&b.0))
			.map(|(_, id)| id.clone())
	}

	/// Starts dragging `node`, highlighting its neighbourhood.
	pub fn begin_drag(&mut self, node: &ItemId, sx: f64, sy: f64, window: &SubgraphWindow) {
		let Some((x, y)) = self.position(node) else {
			return;
		};
		self.drag = DragState {
			active: true,
			node: Some(node.clone()),
			start_x: sx,
			start_y: sy,
			node_start_x: x as f32,
			node_start_y: y as f32,
			moved: false,
		};
		self.highlight.start(node, &window.neighbours);
	}

	pub fn drag_to(&mut self, sx: f64, sy: f64) {
		let Some(idx) = self.drag.node.as_ref().and_then(|id| self.index.get(id)).copied() else {
			return;
		};
		let (dx, dy) = (sx - self.drag.start_x, sy - self.drag.start_y);
		if !self.drag.moved && (dx * dx + dy * dy).sqrt() < DRAG_THRESHOLD {
			return;
		}
		self.drag.moved = true;
		let (nx, ny) = (
			self.drag.node_start_x + (dx / self.transform.k) as f32,
			self.drag.node_start_y + (dy / self.transform.k) as f32,
		);
		self.graph.visit_nodes_mut(|node| {
			if node.index() == idx {
				node.data.x = nx;
				node.data.y = ny;
				node.data.is_anchor = true;
			}
		});
		self.wake();
	}

	/// Ends a drag; a moved node stays pinned where it was dropped.
	/// Returns the node and whether it actually moved.
	pub fn end_drag(&mut self) -> Option<(ItemId, bool)> {
		let node = self.drag.node.take()?;
		let moved = self.drag.moved;
		self.drag = DragState::default();
		self.highlight.clear();
		Some((node, moved))
	}

	pub fn begin_pan(&mut self, sx: f64, sy: f64) {
		self.pan = PanState {
			active: true,
			start_x: sx,
			start_y: sy,
			transform_start_x: self.transform.x,
			transform_start_y: self.transform.y,
		};
	}

	pub fn pan_to(&mut self, sx: f64, sy: f64) {
		if self.pan.active {
			self.transform.x = self.pan.transform_start_x + (sx - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (sy - self.pan.start_y);
		}
	}

	pub fn end_pan(&mut self) {
		self.pan.active = false;
	}

	/// Zooms by `factor` keeping the graph point under the pointer fixed.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		let new_k = (self.transform.k * factor).clamp(0.05, 5.0);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	/// Advances the simulation, then relaxes link lengths and separates
	/// overlapping nodes. Anchored nodes are not moved.
	pub fn tick(&mut self, dt: f32) {
		self.graph.update(dt);
		self.ticks += 1;
		if self.ticks >= SETTLE_TICKS && !self.drag.active {
			self.animation_running = false;
		}

		let mut nodes: HashMap<DefaultNodeIdx, (f64, f64, bool)> = HashMap::with_capacity(self.index.len());
		self.graph.visit_nodes(|node| {
			nodes.insert(node.index(), (node.x() as f64, node.y() as f64, node.data.is_anchor));
		});
		let mut offsets: HashMap<DefaultNodeIdx, (f64, f64)> = HashMap::new();
		let mut push = |idx: DefaultNodeIdx, (dx, dy): (f64, f64)| {
			let entry = offsets.entry(idx).or_insert((0.0, 0.0));
			entry.0 += dx;
			entry.1 += dy;
		};

		for &(src, tgt) in &self.edges {
			if let (Some(a), Some(b)) = (nodes.get(&src), nodes.get(&tgt)) {
				let (dx, dy) = link_correction((a.0, a.1), (b.0, b.1), self.layout.link_distance, LINK_STRENGTH);
				push(src, (dx, dy));
				push(tgt, (-dx, -dy));
			}
		}

		let all: Vec<_> = nodes.iter().map(|(idx, n)| (*idx, *n)).collect();
		for (i, (a_idx, a)) in all.iter().enumerate() {
			for (b_idx, b) in &all[i + 1..] {
				if let Some((dx, dy)) = collide_correction((a.0, a.1), (b.0, b.1), self.layout.collide_radius) {
					push(*a_idx, (dx, dy));
					push(*b_idx, (-dx, -dy));
				}
			}
		}

		self.graph.visit_nodes_mut(|node| {
			if node.data.is_anchor {
				return;
			}
			if let Some((dx, dy)) = offsets.get(&node.index()) {
				node.data.x += *dx as f32;
				node.data.y += *dy as f32;
			}
		});
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	/// Draw commands for the current frame: links below nodes, items outside an
	/// active drag highlight left out.
	pub fn frame(&self, state: &GraphState, style: &RenderStyle) -> Vec<DrawCommand> {
		let window = &state.window;
		let viewport = Viewport { k: self.transform.k };
		let positions = self.positions();
		let focused = state.current_item.as_ref();
		let mut commands = Vec::new();

		for link in window.links.values() {
			if !self.highlight.link_visible(&link.id) {
				continue;
			}
			let (Some(&source), Some(&target)) = (positions.get(&link.source), positions.get(&link.target)) else {
				continue;
			};
			let value_of = |id: &ItemId| window.nodes.get(id).map_or(1, |n| n.value);
			let color = link
				.color
				.as_deref()
				.or_else(|| state.ontology.color_of(false, &link.class_id))
				.unwrap_or(FALLBACK_COLOR);
			let view = LinkView {
				link,
				source,
				target,
				source_value: value_of(&link.source),
				target_value: value_of(&link.target),
				color,
				label: state.ontology.name_of(false, &link.class_id),
				focused: focused.is_some_and(|item| is_item(item, &link.id, false)),
			};
			commands.extend(paint_link(&view, viewport, style));
		}

		for node in window.nodes.values() {
			if !self.highlight.node_visible(&node.id) {
				continue;
			}
			let Some(&(x, y)) = positions.get(&node.id) else {
				continue;
			};
			let color = node
				.color
				.as_deref()
				.or_else(|| state.ontology.color_of(true, &node.class_id))
				.unwrap_or(FALLBACK_COLOR);
			let view = NodeView {
				node,
				x,
				y,
				color,
				focused: focused.is_some_and(|item| is_item(item, &node.id, true)),
			};
			commands.extend(paint_node(&view, viewport, style));
		}
		commands
	}
}

fn is_item(item: &ItemRef, id: &ItemId, is_node: bool) -> bool {
	item.is_node == is_node && &item.id == id
}

fn same_topology(a: &BTreeMap<ItemId, Link>, b: &BTreeMap<ItemId, Link>) -> bool {
	a.len() == b.len()
		&& a.iter().zip(b.iter()).all(|((ka, la), (kb, lb))| {
			ka == kb && la.source == lb.source && la.target == lb.target
		})
}

/// Distance from `p` to the segment `a`-`b`.
pub fn segment_distance(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
	let (dx, dy) = (b.0 - a.0, b.1 - a.1);
	let len2 = dx * dx + dy * dy;
	let t = if len2 < 1e-12 {
		0.0
	} else {
		(((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len2).clamp(0.0, 1.0)
	};
	let (cx, cy) = (a.0 + t * dx, a.1 + t * dy);
	((p.0 - cx).powi(2) + (p.1 - cy).powi(2)).sqrt()
}
