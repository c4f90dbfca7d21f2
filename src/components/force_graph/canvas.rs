use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::render::{DrawCommand, Stroke};
use super::state::ViewTransform;

const BACKGROUND: &str = "#fafafa";

fn apply_stroke(ctx: &CanvasRenderingContext2d, stroke: &Stroke) {
	ctx.set_stroke_style_str(&stroke.color);
	ctx.set_line_width(stroke.width);
	let dash: js_sys::Array = stroke.dash.iter().map(|d| JsValue::from_f64(*d)).collect();
	let _ = ctx.set_line_dash(&dash);
}

/// Clears the canvas and draws `commands` under `transform`.
pub fn replay(
	ctx: &CanvasRenderingContext2d,
	commands: &[DrawCommand],
	transform: &ViewTransform,
	width: f64,
	height: f64,
) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, width, height);
	ctx.save();
	let _ = ctx.translate(transform.x, transform.y);
	let _ = ctx.scale(transform.k, transform.k);
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");

	for command in commands {
		match command {
			DrawCommand::Circle {
				x,
				y,
				radius,
				fill,
				stroke,
			} => {
				ctx.begin_path();
				let _ = ctx.arc(*x, *y, radius.max(0.0), 0.0, 2.0 * PI);
				if let Some(fill) = fill {
					ctx.set_fill_style_str(fill);
					ctx.fill();
				}
				if let Some(stroke) = stroke {
					apply_stroke(ctx, stroke);
					ctx.stroke();
				}
			}
			DrawCommand::Line { from, to, stroke } => {
				apply_stroke(ctx, stroke);
				ctx.begin_path();
				ctx.move_to(from.0, from.1);
				ctx.line_to(to.0, to.1);
				ctx.stroke();
			}
			DrawCommand::Polygon {
				points,
				fill,
				stroke,
			} => {
				let Some((first, rest)) = points.split_first() else {
					continue;
				};
				ctx.begin_path();
				ctx.move_to(first.0, first.1);
				for point in rest {
					ctx.line_to(point.0, point.1);
				}
				ctx.close_path();
				ctx.set_fill_style_str(fill);
				ctx.fill();
				if let Some(stroke) = stroke {
					apply_stroke(ctx, stroke);
					ctx.stroke();
				}
			}
			DrawCommand::Text {
				x,
				y,
				text,
				font_size,
				color,
				angle,
			} => {
				ctx.save();
				let _ = ctx.translate(*x, *y);
				if *angle != 0.0 {
					let _ = ctx.rotate(*angle);
				}
				ctx.set_font(&format!("{font_size}px sans-serif"));
				ctx.set_fill_style_str(color);
				let _ = ctx.fill_text(text, 0.0, 0.0);
				ctx.restore();
			}
		}
	}

	let _ = ctx.set_line_dash(&js_sys::Array::new());
	ctx.restore();
}
