use std::cell::RefCell;
use std::rc::Rc;

use leptos::callback::{Callable, Callback};
use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, KeyboardEvent, MouseEvent, WheelEvent};

use super::designer::{CanvasIntent, StationDesigner};
use super::render;
use super::selection::DELETE_KEYS;
use super::types::{Position, Selection};
use super::viewport::{CanvasView, DragState, LinkState, ViewportHandle};

/// Pointer travel, in pixels, before a press on a node becomes a drag.
const DRAG_THRESHOLD: f64 = 3.0;

fn local_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?;
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

/// Draws the designer's graph and reports gestures as [`CanvasIntent`]s.
///
/// - click a node to select it (ctrl/cmd adds to the selection), drag to move
/// - shift-drag from a node to another to connect them
/// - click an edge to select it, click the background to clear
/// - drag the background to pan, scroll to zoom
#[component]
pub fn DesignCanvas(
	#[prop(into)] designer: Signal<StationDesigner>,
	viewport: ViewportHandle,
	on_intent: Callback<CanvasIntent>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state = viewport.cell().clone();
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (state_init, animate_init, resize_cb_init) =
		(state.clone(), animate.clone(), resize_cb.clone());

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
			log::error!("2d canvas context unavailable");
			return;
		};
		*state_init.borrow_mut() = Some(CanvasView::new(w, h));

		let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
		*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
			let (nw, nh) = parent_size(&canvas_resize);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			if let Some(ref mut v) = *state_resize.borrow_mut() {
				v.resize(nw, nh);
			}
		}));
		if let Some(ref cb) = *resize_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut v) = *state_anim.borrow_mut() {
				v.tick(0.016);
				designer.with_untracked(|d| {
					render::render(v, d.nodes(), d.edges(), d.selection().selection(), &ctx)
				});
			}
			if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		let mut intent = None;
		if let Some(ref mut v) = *state_md.borrow_mut() {
			designer.with_untracked(|d| {
				let current = d.selection().selection().cloned().unwrap_or_default();
				if let Some(node) = v.node_at_position(d.nodes(), x, y) {
					if ev.shift_key() {
						v.link = LinkState {
							source: Some(node.id.clone()),
							cursor: v.screen_to_graph(x, y),
						};
						return;
					}
					v.drag = DragState {
						node_id: Some(node.id.clone()),
						start_x: x,
						start_y: y,
						node_start: node.position,
						current: node.position,
						moved: false,
					};
					let additive = ev.ctrl_key() || ev.meta_key();
					let next = if additive {
						let mut next = current.clone();
						if next.contains_node(&node.id) {
							next.nodes.retain(|n| n.id != node.id);
						} else {
							next.nodes.push(node.clone());
						}
						next
					} else if current.contains_node(&node.id) {
						current.clone()
					} else {
						Selection {
							nodes: vec![node.clone()],
							edges: Vec::new(),
						}
					};
					if next != current {
						intent = Some(CanvasIntent::SelectionChanged(next));
					}
				} else if let Some(edge) = v.edge_at_position(d.nodes(), d.edges(), x, y) {
					intent = Some(CanvasIntent::SelectionChanged(Selection {
						nodes: Vec::new(),
						edges: vec![edge.clone()],
					}));
				} else {
					if !current.is_empty() {
						intent = Some(CanvasIntent::SelectionChanged(Selection::default()));
					}
					v.pan.active = true;
					v.pan.start_x = x;
					v.pan.start_y = y;
					v.pan.transform_start_x = v.transform.x;
					v.pan.transform_start_y = v.transform.y;
				}
			});
		}
		if let Some(intent) = intent {
			on_intent.run(intent);
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut v) = *state_mm.borrow_mut() {
			if v.drag.node_id.is_none() {
				v.hover = designer
					.with_untracked(|d| v.node_at_position(d.nodes(), x, y).map(|n| n.id.clone()));
			}

			if v.drag.node_id.is_some() {
				let (dx, dy) = (x - v.drag.start_x, y - v.drag.start_y);
				if !v.drag.moved && (dx * dx + dy * dy).sqrt() >= DRAG_THRESHOLD {
					v.drag.moved = true;
				}
				if v.drag.moved {
					let k = v.transform.k;
					v.drag.current = Position::new(
						v.drag.node_start.x + dx / k,
						v.drag.node_start.y + dy / k,
					);
				}
			} else if v.link.source.is_some() {
				v.link.cursor = v.screen_to_graph(x, y);
			} else if v.pan.active {
				v.transform.x = v.pan.transform_start_x + (x - v.pan.start_x);
				v.transform.y = v.pan.transform_start_y + (y - v.pan.start_y);
			}
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let point = local_point(canvas_ref, &ev);
		let mut intent = None;
		if let Some(ref mut v) = *state_mu.borrow_mut() {
			let drag = std::mem::take(&mut v.drag);
			let link = std::mem::take(&mut v.link);
			v.pan.active = false;

			if let (Some(id), true) = (drag.node_id, drag.moved) {
				intent = Some(CanvasIntent::NodeMoved {
					id,
					position: drag.current,
				});
			} else if let (Some(source), Some((x, y))) = (link.source, point) {
				let target =
					designer.with_untracked(|d| v.node_at_position(d.nodes(), x, y).map(|n| n.id.clone()));
				if let Some(target) = target {
					intent = Some(CanvasIntent::ConnectionRequested { source, target });
				}
			}
		}
		if let Some(intent) = intent {
			on_intent.run(intent);
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut v) = *state_ml.borrow_mut() {
			v.drag = DragState::default();
			v.link = LinkState::default();
			v.pan.active = false;
			v.hover = None;
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut v) = *state_wh.borrow_mut() {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			v.zoom_at(x, y, factor);
		}
	};

	let on_keydown = move |ev: KeyboardEvent| {
		let key = ev.key();
		if DELETE_KEYS.contains(&key.as_str()) {
			ev.prevent_default();
			on_intent.run(CanvasIntent::KeyPressed(key));
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="design-canvas"
			tabindex="0"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			on:keydown=on_keydown
			style="display: block; cursor: grab; outline: none;"
		/>
	}
}
