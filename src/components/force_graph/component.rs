use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, error};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::canvas;
use super::layout::LayoutConfig;
use super::render::RenderStyle;
use super::state::{DRAG_THRESHOLD, ForceGraphState};
use crate::model::ItemRef;
use crate::store::GraphState;

/// What a pointer gesture on the canvas asks the page to do.
#[derive(Clone, Debug, PartialEq)]
pub enum CanvasIntent {
	/// Click: focus an item, or clear focus on the background.
	Focus(Option<ItemRef>),
	/// Shift-click.
	ToggleReview(ItemRef),
	/// Right-click.
	ToggleActivation(ItemRef),
}

fn pointer(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get_untracked()?;
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn parent_size(canvas: &HtmlCanvasElement) -> (f64, f64) {
	canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64))
		.filter(|(w, h)| *w > 0.0 && *h > 0.0)
		.unwrap_or((800.0, 600.0))
}

fn item_at(sim: &ForceGraphState, graph: &GraphState, x: f64, y: f64, arrow_rel_pos: f64) -> Option<ItemRef> {
	let style = RenderStyle::new(&graph.settings, arrow_rel_pos);
	sim.node_at(x, y, &graph.window, &style)
		.map(ItemRef::node)
		.or_else(|| sim.link_at(x, y, &graph.window).map(ItemRef::link))
}

fn click_intent(item: ItemRef, shift: bool) -> CanvasIntent {
	if shift {
		CanvasIntent::ToggleReview(item)
	} else {
		CanvasIntent::Focus(Some(item))
	}
}

/// Force-directed view of the loaded window.
///
/// Dragging a node pins it and shows only its neighbourhood until release;
/// dragging the background pans and the wheel zooms.
#[component]
pub fn ForceGraphCanvas(
	state: RwSignal<GraphState>,
	#[prop(optional)] layout: LayoutConfig,
	#[prop(default = 1.0)] arrow_rel_pos: f64,
	on_intent: Rc<dyn Fn(CanvasIntent)>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let sim: Rc<RefCell<Option<ForceGraphState>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (sim_init, animate_init, resize_cb_init) = (sim.clone(), animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let Some(window) = web_sys::window() else {
			return;
		};
		let (w, h) = parent_size(&canvas);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			error!("canvas has no 2d context");
			return;
		};
		*sim_init.borrow_mut() = Some(ForceGraphState::new(layout.clone(), w, h));

		let (sim_resize, canvas_resize) = (sim_init.clone(), canvas.clone());
		*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
			let (nw, nh) = parent_size(&canvas_resize);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			if let Some(ref mut s) = *sim_resize.borrow_mut() {
				s.resize(nw, nh);
			}
		}));
		if let Some(ref cb) = *resize_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (sim_anim, animate_inner, resize_inner) =
			(sim_init.clone(), animate_init.clone(), resize_cb_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			let Some(window) = web_sys::window() else {
				return;
			};
			if !canvas.is_connected() {
				debug!("canvas detached, stopping animation");
				if let Some(ref cb) = *resize_inner.borrow() {
					let _ = window.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
				}
				return;
			}
			if let Some(ref mut s) = *sim_anim.borrow_mut() {
				let drawn = state.try_with_untracked(|graph| {
					s.sync(&graph.window);
					if s.animation_running {
						s.tick(0.016);
					}
					let style = RenderStyle::new(&graph.settings, arrow_rel_pos);
					canvas::replay(&ctx, &s.frame(graph, &style), &s.transform, s.width, s.height);
				});
				if drawn.is_none() {
					return;
				}
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let sim_md = sim.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if ev.button() != 0 {
			return;
		}
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *sim_md.borrow_mut() {
			let _ = state.try_with_untracked(|graph| {
				let style = RenderStyle::new(&graph.settings, arrow_rel_pos);
				match s.node_at(x, y, &graph.window, &style) {
					Some(node) => s.begin_drag(&node, x, y, &graph.window),
					None => s.begin_pan(x, y),
				}
			});
		}
	};

	let sim_mm = sim.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *sim_mm.borrow_mut() {
			if s.drag.active {
				s.drag_to(x, y);
			} else {
				s.pan_to(x, y);
			}
		}
	};

	let (sim_mu, intent_mu) = (sim.clone(), on_intent.clone());
	let on_mouseup = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		let intent = {
			let mut guard = sim_mu.borrow_mut();
			let Some(s) = guard.as_mut() else {
				return;
			};
			if let Some((node, moved)) = s.end_drag() {
				(!moved).then(|| click_intent(ItemRef::node(node), ev.shift_key()))
			} else if s.pan.active {
				let travelled = ((x - s.pan.start_x).powi(2) + (y - s.pan.start_y).powi(2)).sqrt();
				s.end_pan();
				if travelled < DRAG_THRESHOLD {
					let link = state
						.try_with_untracked(|graph| s.link_at(x, y, &graph.window))
						.flatten();
					Some(match link {
						Some(link) => click_intent(ItemRef::link(link), ev.shift_key()),
						None => CanvasIntent::Focus(None),
					})
				} else {
					None
				}
			} else {
				None
			}
		};
		if let Some(intent) = intent {
			intent_mu(intent);
		}
	};

	let sim_ml = sim.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *sim_ml.borrow_mut() {
			s.end_drag();
			s.end_pan();
		}
	};

	let (sim_cm, intent_cm) = (sim.clone(), on_intent.clone());
	let on_contextmenu = move |ev: MouseEvent| {
		ev.prevent_default();
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		let item = sim_cm.borrow().as_ref().and_then(|s| {
			state
				.try_with_untracked(|graph| item_at(s, graph, x, y, arrow_rel_pos))
				.flatten()
		});
		if let Some(item) = item {
			intent_cm(CanvasIntent::ToggleActivation(item));
		}
	};

	let sim_wh = sim.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *sim_wh.borrow_mut() {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			s.zoom_at(x, y, factor);
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:contextmenu=on_contextmenu
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
