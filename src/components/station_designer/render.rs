use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::types::{Edge, Node, Selection};
use super::viewport::{CanvasView, NODE_HEIGHT, NODE_WIDTH};

const BACKGROUND: &str = "#10131f";
const GRID_COLOR: &str = "rgba(170, 170, 170, 0.25)";
const GRID_GAP: f64 = 16.0;
const EDGE_COLOR: &str = "rgba(100, 180, 255, 0.8)";
const SELECTED_COLOR: &str = "#ffffff";

pub fn render(
	view: &CanvasView,
	nodes: &[Node],
	edges: &[Edge],
	selection: Option<&Selection>,
	ctx: &CanvasRenderingContext2d,
) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, view.width, view.height);
	ctx.save();
	let _ = ctx.translate(view.transform.x, view.transform.y);
	let _ = ctx.scale(view.transform.k, view.transform.k);
	draw_grid(view, ctx);
	draw_edges(view, nodes, edges, selection, ctx);
	draw_link_preview(view, nodes, ctx);
	draw_nodes(view, nodes, selection, ctx);
	ctx.restore();
}

fn draw_grid(view: &CanvasView, ctx: &CanvasRenderingContext2d) {
	let k = view.transform.k;
	if GRID_GAP * k < 6.0 {
		return;
	}
	let top_left = view.screen_to_graph(0.0, 0.0);
	let bottom_right = view.screen_to_graph(view.width, view.height);
	let r = 1.0 / k;
	ctx.set_fill_style_str(GRID_COLOR);
	let mut x = (top_left.x / GRID_GAP).floor() * GRID_GAP;
	while x <= bottom_right.x {
		let mut y = (top_left.y / GRID_GAP).floor() * GRID_GAP;
		while y <= bottom_right.y {
			ctx.fill_rect(x - r / 2.0, y - r / 2.0, r, r);
			y += GRID_GAP;
		}
		x += GRID_GAP;
	}
}

fn draw_edges(
	view: &CanvasView,
	nodes: &[Node],
	edges: &[Edge],
	selection: Option<&Selection>,
	ctx: &CanvasRenderingContext2d,
) {
	let k = view.transform.k;
	let (line_width, dash, gap, arrow_size) = (2.0 / k.max(0.5), 6.0, 4.0, 9.0);
	let dash_offset = -(view.flow_time * 30.0) % (dash + gap);

	for edge in edges {
		let (Some(a), Some(b)) = (
			view.node_center(nodes, &edge.source),
			view.node_center(nodes, &edge.target),
		) else {
			continue;
		};
		let selected = selection.is_some_and(|s| s.contains_edge(&edge.id));
		ctx.set_stroke_style_str(if selected { SELECTED_COLOR } else { EDGE_COLOR });
		ctx.set_line_width(if selected { line_width * 1.8 } else { line_width });

		if edge.animated {
			let _ = ctx.set_line_dash(&js_sys::Array::of2(
				&JsValue::from_f64(dash),
				&JsValue::from_f64(gap),
			));
			ctx.set_line_dash_offset(dash_offset);
		}

		if edge.source == edge.target {
			// Self-loop above the node.
			ctx.begin_path();
			let _ = ctx.arc(a.x, a.y - NODE_HEIGHT / 2.0, 18.0, 0.0, 2.0 * PI);
			ctx.stroke();
			let _ = ctx.set_line_dash(&js_sys::Array::new());
			continue;
		}

		let (dx, dy) = (b.x - a.x, b.y - a.y);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			let _ = ctx.set_line_dash(&js_sys::Array::new());
			continue;
		}
		let (ux, uy) = (dx / dist, dy / dist);
		let tip_inset = box_exit_distance(ux, uy);
		let (tip_x, tip_y) = (b.x - ux * tip_inset, b.y - uy * tip_inset);

		ctx.begin_path();
		ctx.move_to(a.x, a.y);
		ctx.line_to(tip_x - ux * arrow_size, tip_y - uy * arrow_size);
		ctx.stroke();
		let _ = ctx.set_line_dash(&js_sys::Array::new());

		ctx.set_fill_style_str(if selected { SELECTED_COLOR } else { EDGE_COLOR });
		let (back_x, back_y) = (tip_x - ux * arrow_size, tip_y - uy * arrow_size);
		let (px, py) = (-uy * arrow_size * 0.5, ux * arrow_size * 0.5);
		ctx.begin_path();
		ctx.move_to(tip_x, tip_y);
		ctx.line_to(back_x + px, back_y + py);
		ctx.line_to(back_x - px, back_y - py);
		ctx.close_path();
		ctx.fill();
	}
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

/// Distance from a node's centre to its border along the unit direction.
fn box_exit_distance(ux: f64, uy: f64) -> f64 {
	let (hw, hh) = (NODE_WIDTH / 2.0, NODE_HEIGHT / 2.0);
	let tx = if ux.abs() > 1e-9 { hw / ux.abs() } else { f64::INFINITY };
	let ty = if uy.abs() > 1e-9 { hh / uy.abs() } else { f64::INFINITY };
	tx.min(ty)
}

fn draw_link_preview(view: &CanvasView, nodes: &[Node], ctx: &CanvasRenderingContext2d) {
	let Some(source) = &view.link.source else {
		return;
	};
	let Some(from) = view.node_center(nodes, source) else {
		return;
	};
	ctx.set_stroke_style_str(EDGE_COLOR);
	ctx.set_line_width(1.5 / view.transform.k);
	let _ = ctx.set_line_dash(&js_sys::Array::of2(
		&JsValue::from_f64(4.0),
		&JsValue::from_f64(4.0),
	));
	ctx.begin_path();
	ctx.move_to(from.x, from.y);
	ctx.line_to(view.link.cursor.x, view.link.cursor.y);
	ctx.stroke();
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn draw_nodes(
	view: &CanvasView,
	nodes: &[Node],
	selection: Option<&Selection>,
	ctx: &CanvasRenderingContext2d,
) {
	for node in nodes {
		let at = view.display_position(node);
		let radius = node.style.border_radius.clamp(0.0, NODE_HEIGHT / 2.0);
		let selected = selection.is_some_and(|s| s.contains_node(&node.id));
		let hovered = view.hover.as_deref() == Some(node.id.as_str());

		ctx.set_global_alpha(if hovered { 1.0 } else { 0.92 });
		rounded_rect(ctx, at.x, at.y, NODE_WIDTH, NODE_HEIGHT, radius);
		ctx.set_fill_style_str(&node.style.background);
		ctx.fill();
		ctx.set_global_alpha(1.0);

		ctx.set_stroke_style_str(if selected { SELECTED_COLOR } else { "#333" });
		ctx.set_line_width(if selected { 3.0 } else { 2.0 });
		ctx.stroke();

		ctx.set_fill_style_str(&node.style.color);
		ctx.set_font(&format!("{} 13px sans-serif", node.style.font_weight));
		ctx.set_text_baseline("middle");
		let _ = ctx.fill_text_with_max_width(
			node.label(),
			at.x + node.style.padding,
			at.y + NODE_HEIGHT / 2.0,
			NODE_WIDTH - 2.0 * node.style.padding,
		);
	}
}

fn rounded_rect(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64, r: f64) {
	ctx.begin_path();
	ctx.move_to(x + r, y);
	let _ = ctx.arc_to(x + w, y, x + w, y + h, r);
	let _ = ctx.arc_to(x + w, y + h, x, y + h, r);
	let _ = ctx.arc_to(x, y + h, x, y, r);
	let _ = ctx.arc_to(x, y, x + w, y, r);
	ctx.close_path();
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn arrow_tip_sits_on_node_border() {
		assert_eq!(box_exit_distance(1.0, 0.0), NODE_WIDTH / 2.0);
		assert_eq!(box_exit_distance(0.0, -1.0), NODE_HEIGHT / 2.0);
		let diag = std::f64::consts::FRAC_1_SQRT_2;
		assert!(box_exit_distance(diag, diag) <= NODE_WIDTH / 2.0 / diag);
	}
}
