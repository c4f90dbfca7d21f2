//! Pure painting: items in, draw commands out.
//!
//! Coordinates are in graph space; [`super::canvas::replay`] applies the view
//! transform when drawing onto the canvas.

use std::f64::consts::{FRAC_PI_2, PI};

use super::color::{font_color, lighten, shade, with_alpha};
use crate::model::{ColorSettings, Link, Node, Settings};

const NODE_BADGE_SIZE: f64 = 30.0;
const LINK_BADGE_SIZE: f64 = 30.0;
const BADGE_LINE_WIDTH: f64 = 2.0;
const ARROW_LENGTH: f64 = 30.0;
const LABEL_OFFSET: f64 = -15.0;
const LABEL_GREY: &str = "#424242";
const MAX_LABEL_WORDS: usize = 4;
const MAX_WORD_LEN: usize = 12;

#[derive(Clone, Debug, PartialEq)]
pub struct Stroke {
	pub color: String,
	pub width: f64,
	/// Empty for a solid line.
	pub dash: Vec<f64>,
}

impl Stroke {
	fn solid(color: impl Into<String>, width: f64) -> Self {
		Self {
			color: color.into(),
			width,
			dash: Vec::new(),
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
	Circle {
		x: f64,
		y: f64,
		radius: f64,
		fill: Option<String>,
		stroke: Option<Stroke>,
	},
	Line {
		from: (f64, f64),
		to: (f64, f64),
		stroke: Stroke,
	},
	Polygon {
		points: Vec<(f64, f64)>,
		fill: String,
		stroke: Option<Stroke>,
	},
	/// Centred text, rotated by `angle` around its anchor.
	Text {
		x: f64,
		y: f64,
		text: String,
		font_size: f64,
		color: String,
		angle: f64,
	},
}

/// Current zoom of the canvas; only affects font sizes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
	pub k: f64,
}

impl Default for Viewport {
	fn default() -> Self {
		Self { k: 1.0 }
	}
}

impl Viewport {
	fn font_scale(self) -> f64 {
		self.k.max(0.01).powf(0.6)
	}
}

/// Display settings that influence painting.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderStyle {
	pub base_radius: f64,
	pub display_edge_labels: bool,
	pub display_errors: bool,
	pub display_suggestions: bool,
	pub colors: ColorSettings,
	/// Where the arrowhead sits along a link, 0 at the source and 1 at the target.
	pub arrow_rel_pos: f64,
}

impl Default for RenderStyle {
	fn default() -> Self {
		Self::new(&Settings::default(), 1.0)
	}
}

impl RenderStyle {
	pub fn new(settings: &Settings, arrow_rel_pos: f64) -> Self {
		Self {
			base_radius: settings.graph.node_size.base_radius(),
			display_edge_labels: settings.graph.display_edge_labels,
			display_errors: settings.display_errors,
			display_suggestions: settings.display_suggestions,
			colors: settings.colors.clone(),
			arrow_rel_pos,
		}
	}

	/// Rendered radius of a node with the given degree.
	pub fn node_radius(&self, value: u32) -> f64 {
		self.base_radius * (value.max(1) as f64).cbrt()
	}

	fn badge_fill(&self, is_error: bool) -> String {
		lighten(self.badge_stroke(is_error), 0.75)
	}

	fn badge_stroke(&self, is_error: bool) -> &str {
		if is_error {
			&self.colors.error
		} else {
			&self.colors.suggestion
		}
	}
}

/// A node at its simulated position.
pub struct NodeView<'a> {
	pub node: &'a Node,
	pub x: f64,
	pub y: f64,
	/// Class colour of the node.
	pub color: &'a str,
	pub focused: bool,
}

/// A link between two positioned endpoints.
pub struct LinkView<'a> {
	pub link: &'a Link,
	pub source: (f64, f64),
	pub target: (f64, f64),
	pub source_value: u32,
	pub target_value: u32,
	pub color: &'a str,
	/// Edge class name, drawn when edge labels are on.
	pub label: Option<&'a str>,
	pub focused: bool,
}

/// Splits a node name into at most four lines, shortening long words.
pub fn label_lines(name: &str) -> Vec<String> {
	name.split_whitespace()
		.take(MAX_LABEL_WORDS)
		.map(|word| {
			if word.chars().count() > MAX_WORD_LEN {
				let short: String = word.chars().take(MAX_WORD_LEN).collect();
				format!("{short}...")
			} else {
				word.to_owned()
			}
		})
		.collect()
}

/// Folds an angle into (-90°, 90°] so rotated text never reads upside down.
pub fn upright(angle: f64) -> f64 {
	let mut angle = angle;
	if angle > FRAC_PI_2 {
		angle -= PI;
	}
	if angle <= -FRAC_PI_2 {
		angle += PI;
	}
	angle
}

fn count_text(count: usize, x: f64, y: f64, triangle_height: f64, angle: f64) -> DrawCommand {
	DrawCommand::Text {
		x,
		y,
		text: count.to_string(),
		font_size: triangle_height * 0.5,
		color: "black".into(),
		angle,
	}
}

pub fn paint_node(view: &NodeView<'_>, viewport: Viewport, style: &RenderStyle) -> Vec<DrawCommand> {
	let NodeView {
		node,
		x,
		y,
		color,
		focused,
	} = *view;
	let state = &node.state;
	let radius = style.node_radius(node.value);
	let fill = if state.is_active {
		lighten(color, 0.5)
	} else {
		shade(color, 90)
	};

	let mut commands = vec![DrawCommand::Circle {
		x,
		y,
		radius,
		fill: Some(fill.clone()),
		stroke: None,
	}];

	if focused {
		commands.push(DrawCommand::Circle {
			x,
			y,
			radius: radius * 1.2,
			fill: None,
			stroke: Some(Stroke {
				color: with_alpha(color, 0.75),
				width: radius * 0.1,
				dash: vec![5.0, 5.0],
			}),
		});
	}

	commands.push(DrawCommand::Circle {
		x,
		y,
		radius: radius - 0.5,
		fill: None,
		stroke: Some(Stroke {
			color: if state.is_active {
				color.to_owned()
			} else {
				style.colors.deactivated.clone()
			},
			width: if state.is_active { 3.0 } else { 5.0 },
			dash: if state.is_reviewed {
				Vec::new()
			} else {
				vec![8.0, 10.0]
			},
		}),
	});

	let size = NODE_BADGE_SIZE;
	let height = 3f64.sqrt() / 2.0 * size;
	let half = BADGE_LINE_WIDTH / 2.0;
	let (left, apex) = (x + radius, x + radius + size / 2.0);
	let top = y - radius;

	let errors = state.open_errors();
	if errors > 0 && style.display_errors {
		commands.push(DrawCommand::Polygon {
			points: vec![
				(apex, top - height - half),
				(left, top - half),
				(left + size, top - half),
			],
			fill: style.badge_fill(true),
			stroke: Some(Stroke::solid(style.badge_stroke(true), BADGE_LINE_WIDTH)),
		});
		commands.push(count_text(errors, apex, top - height / 3.0, height, 0.0));
	}

	let suggestions = state.open_suggestions();
	if suggestions > 0 && style.display_suggestions {
		commands.push(DrawCommand::Polygon {
			points: vec![
				(apex, top + height + half),
				(left, top + half),
				(left + size, top + half),
			],
			fill: style.badge_fill(false),
			stroke: Some(Stroke::solid(style.badge_stroke(false), BADGE_LINE_WIDTH)),
		});
		commands.push(count_text(suggestions, apex, top + height / 2.0, height, 0.0));
	}

	let font_size = 14.0 * (node.value.max(1) as f64).cbrt() / viewport.font_scale();
	let lines = label_lines(&node.name);
	let y_start = -(font_size / 2.0) * (lines.len().saturating_sub(1)) as f64;
	let text_color = font_color(&fill);
	for (i, line) in lines.into_iter().enumerate() {
		commands.push(DrawCommand::Text {
			x,
			y: y + y_start + (font_size + 2.0) * i as f64,
			text: line,
			font_size,
			color: text_color.into(),
			angle: 0.0,
		});
	}
	commands
}

/// Maps a point from the badge frame at a link's midpoint into graph space.
struct BadgeFrame {
	origin: (f64, f64),
	angle: f64,
}

impl BadgeFrame {
	fn to_graph(&self, (px, py): (f64, f64)) -> (f64, f64) {
		let (sin, cos) = self.angle.sin_cos();
		(
			self.origin.0 + px * cos - py * sin,
			self.origin.1 + px * sin + py * cos,
		)
	}
}

fn rotate_about((px, py): (f64, f64), (cx, cy): (f64, f64), angle: f64) -> (f64, f64) {
	let (sin, cos) = angle.sin_cos();
	let (dx, dy) = (px - cx, py - cy);
	(cx + dx * cos - dy * sin, cy + dx * sin + dy * cos)
}

pub fn paint_link(view: &LinkView<'_>, viewport: Viewport, style: &RenderStyle) -> Vec<DrawCommand> {
	let link = view.link;
	let state = &link.state;
	let (dx, dy) = (view.target.0 - view.source.0, view.target.1 - view.source.1);
	let dist = (dx * dx + dy * dy).sqrt();
	if dist < 0.001 {
		return Vec::new();
	}
	let (ux, uy) = (dx / dist, dy / dist);

	let source_radius = style.node_radius(view.source_value);
	let target_radius = style.node_radius(view.target_value);
	let start = (view.source.0 + ux * source_radius, view.source.1 + uy * source_radius);
	let end = (view.target.0 - ux * target_radius, view.target.1 - uy * target_radius);
	let mid = ((start.0 + end.0) / 2.0, (start.1 + end.1) / 2.0);

	let color = if !state.is_active {
		style.colors.deactivated.clone()
	} else if style.display_edge_labels {
		LABEL_GREY.to_owned()
	} else {
		view.color.to_owned()
	};
	let width = (2.0 * link.value as f64).min(6.0);

	let mut commands = Vec::new();
	if view.focused {
		commands.push(DrawCommand::Line {
			from: start,
			to: end,
			stroke: Stroke::solid(with_alpha(view.color, 0.35), width + 8.0),
		});
	}
	commands.push(DrawCommand::Line {
		from: start,
		to: end,
		stroke: Stroke {
			color: color.clone(),
			width,
			dash: if state.is_reviewed {
				Vec::new()
			} else {
				vec![6.0, 8.0]
			},
		},
	});

	let rel = style.arrow_rel_pos.clamp(0.0, 1.0);
	let tip = (start.0 + (end.0 - start.0) * rel, start.1 + (end.1 - start.1) * rel);
	let back = (tip.0 - ux * ARROW_LENGTH, tip.1 - uy * ARROW_LENGTH);
	let (px, py) = (-uy * ARROW_LENGTH / 3.2, ux * ARROW_LENGTH / 3.2);
	commands.push(DrawCommand::Polygon {
		points: vec![tip, (back.0 + px, back.1 + py), (back.0 - px, back.1 - py)],
		fill: color,
		stroke: None,
	});

	let (errors, suggestions) = (state.open_errors(), state.open_suggestions());
	if errors > 0 || suggestions > 0 {
		let size = LINK_BADGE_SIZE;
		let height = 3f64.sqrt() / 2.0 * size;
		let angle = dy.atan2(dx);
		let flip = if angle > FRAC_PI_2 || angle < -FRAC_PI_2 { -1.0 } else { 1.0 };
		let shifted = rotate_about((0.0, flip * -0.25 * height), (0.0, 0.0), angle);
		let frame = BadgeFrame {
			origin: (mid.0 + shifted.0, mid.1 + shifted.1),
			angle: if flip < 0.0 { angle + PI } else { angle },
		};
		// A lone badge is turned a quarter so it points along the link.
		let turn = if (errors > 0) != (suggestions > 0) { FRAC_PI_2 } else { 0.0 };
		let pivot = (0.0, -0.75 * size);

		let mut badge = |side: f64, count: usize, is_error: bool| {
			let points = [
				(side * 1.0, -0.25 * size),
				(side * size, -0.75 * size),
				(side * 1.0, -1.25 * size),
			]
			.into_iter()
			.map(|p| frame.to_graph(rotate_about(p, pivot, turn)))
			.collect();
			commands.push(DrawCommand::Polygon {
				points,
				fill: style.badge_fill(is_error),
				stroke: Some(Stroke::solid(style.badge_stroke(is_error), BADGE_LINE_WIDTH)),
			});
			let (tx, ty) = frame.to_graph(rotate_about((side * size / 3.0, -height * 4.0 / 5.0), pivot, turn));
			commands.push(count_text(count, tx, ty, height, frame.angle));
		};
		if errors > 0 && style.display_errors {
			badge(-1.0, errors, true);
		}
		if suggestions > 0 && style.display_suggestions {
			badge(1.0, suggestions, false);
		}
	}

	if style.display_edge_labels {
		if let Some(label) = view.label {
			let angle = upright((end.1 - start.1).atan2(end.0 - start.0));
			commands.push(DrawCommand::Text {
				x: mid.0 + LABEL_OFFSET * angle.sin(),
				y: mid.1 - LABEL_OFFSET * angle.cos(),
				text: label.to_owned(),
				font_size: 18.0 / viewport.font_scale(),
				color: LABEL_GREY.into(),
				angle,
			});
		}
	}
	commands
}
