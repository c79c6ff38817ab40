use std::cell::RefCell;
use std::rc::Rc;

use super::error::ProjectionError;
use super::placement::ViewportProjector;
use super::types::{Edge, Node, Position};

pub const NODE_WIDTH: f64 = 150.0;
pub const NODE_HEIGHT: f64 = 44.0;
pub const EDGE_HIT_WIDTH: f64 = 6.0;
pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 4.0;
const FIT_PADDING: f64 = 60.0;

#[derive(Clone, Debug)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub node_id: Option<String>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start: Position,
	pub current: Position,
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

#[derive(Clone, Debug, Default)]
pub struct LinkState {
	pub source: Option<String>,
	pub cursor: Position,
}

/// Camera and gesture state of the design canvas.
#[derive(Clone, Debug, Default)]
pub struct CanvasView {
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub link: LinkState,
	pub hover: Option<String>,
	pub width: f64,
	pub height: f64,
	pub flow_time: f64,
}

impl CanvasView {
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			width,
			height,
			..Self::default()
		}
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> Position {
		Position::new(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	#[cfg(test)]
	fn graph_to_screen(&self, p: Position) -> (f64, f64) {
		(
			p.x * self.transform.k + self.transform.x,
			p.y * self.transform.k + self.transform.y,
		)
	}

	/// Where `node` is drawn, accounting for an in-progress drag.
	pub fn display_position(&self, node: &Node) -> Position {
		match &self.drag.node_id {
			Some(id) if *id == node.id && self.drag.moved => self.drag.current,
			_ => node.position,
		}
	}

	/// Topmost node under the screen point.
	pub fn node_at_position<'a>(&self, nodes: &'a [Node], sx: f64, sy: f64) -> Option<&'a Node> {
		let p = self.screen_to_graph(sx, sy);
		nodes.iter().rev().find(|node| {
			let at = self.display_position(node);
			p.x >= at.x && p.x <= at.x + NODE_WIDTH && p.y >= at.y && p.y <= at.y + NODE_HEIGHT
		})
	}

	/// Edge whose segment passes within the hit width of the screen point.
	pub fn edge_at_position<'a>(
		&self,
		nodes: &[Node],
		edges: &'a [Edge],
		sx: f64,
		sy: f64,
	) -> Option<&'a Edge> {
		let p = self.screen_to_graph(sx, sy);
		let tolerance = EDGE_HIT_WIDTH / self.transform.k;
		edges.iter().rev().find(|edge| {
			let (Some(a), Some(b)) = (
				self.node_center(nodes, &edge.source),
				self.node_center(nodes, &edge.target),
			) else {
				return false;
			};
			distance_to_segment(p, a, b) <= tolerance
		})
	}

	pub fn node_center(&self, nodes: &[Node], id: &str) -> Option<Position> {
		nodes.iter().find(|n| n.id == id).map(|n| {
			let at = self.display_position(n);
			Position::new(at.x + NODE_WIDTH / 2.0, at.y + NODE_HEIGHT / 2.0)
		})
	}

	/// Zoom by `factor` keeping the screen point fixed.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		let new_k = (self.transform.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	/// Frame every node, or reset the camera when there are none.
	pub fn fit_view(&mut self, nodes: &[Node]) {
		let Some((min, max)) = bounds(nodes) else {
			self.transform = ViewTransform::default();
			return;
		};
		let (w, h) = (max.x - min.x, max.y - min.y);
		let usable_w = (self.width - 2.0 * FIT_PADDING).max(1.0);
		let usable_h = (self.height - 2.0 * FIT_PADDING).max(1.0);
		let k = (usable_w / w).min(usable_h / h).clamp(MIN_ZOOM, 1.0);
		let (cx, cy) = ((min.x + max.x) / 2.0, (min.y + max.y) / 2.0);
		self.transform = ViewTransform {
			x: self.width / 2.0 - cx * k,
			y: self.height / 2.0 - cy * k,
			k,
		};
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	pub fn tick(&mut self, dt: f64) {
		self.flow_time += dt;
	}
}

impl ViewportProjector for CanvasView {
	fn viewport_center(&self) -> Result<Position, ProjectionError> {
		let usable = self.width > 0.0
			&& self.height > 0.0
			&& self.transform.k.is_finite()
			&& self.transform.k > 0.0;
		if !usable {
			return Err(ProjectionError::Degenerate);
		}
		let centre = self.screen_to_graph(self.width / 2.0, self.height / 2.0);
		// Centre the node box, not its corner, on the viewport.
		Ok(Position::new(
			centre.x - NODE_WIDTH / 2.0,
			centre.y - NODE_HEIGHT / 2.0,
		))
	}
}

/// Shared handle the canvas fills in once it has a size.
#[derive(Clone, Debug, Default)]
pub struct ViewportHandle(Rc<RefCell<Option<CanvasView>>>);

impl ViewportHandle {
	pub fn new() -> Self {
		Self::default()
	}

	#[cfg(test)]
	fn is_ready(&self) -> bool {
		self.0.borrow().is_some()
	}

	pub(crate) fn cell(&self) -> &Rc<RefCell<Option<CanvasView>>> {
		&self.0
	}

	pub fn fit_view(&self, nodes: &[Node]) {
		if let Some(view) = self.0.borrow_mut().as_mut() {
			view.fit_view(nodes);
		}
	}
}

impl ViewportProjector for ViewportHandle {
	fn viewport_center(&self) -> Result<Position, ProjectionError> {
		let view = self
			.0
			.try_borrow()
			.map_err(|_| ProjectionError::NotInitialized)?;
		view.as_ref()
			.ok_or(ProjectionError::NotInitialized)?
			.viewport_center()
	}
}

fn bounds(nodes: &[Node]) -> Option<(Position, Position)> {
	let first = nodes.first()?;
	let init = (
		first.position,
		Position::new(first.position.x + NODE_WIDTH, first.position.y + NODE_HEIGHT),
	);
	Some(nodes.iter().fold(init, |(min, max), n| {
		(
			Position::new(min.x.min(n.position.x), min.y.min(n.position.y)),
			Position::new(
				max.x.max(n.position.x + NODE_WIDTH),
				max.y.max(n.position.y + NODE_HEIGHT),
			),
		)
	}))
}

fn distance_to_segment(p: Position, a: Position, b: Position) -> f64 {
	let (dx, dy) = (b.x - a.x, b.y - a.y);
	let len_sq = dx * dx + dy * dy;
	let t = if len_sq < f64::EPSILON {
		0.0
	} else {
		(((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0)
	};
	let (cx, cy) = (a.x + t * dx, a.y + t * dy);
	((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt()
}
