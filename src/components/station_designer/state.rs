use std::collections::HashSet;

use log::{debug, warn};

use super::catalog::PartDefinition;
use super::clock::Clock;
use super::types::{Edge, GraphSnapshot, Node, NodeData, NodeStyle, Position};

/// The in-memory node and edge collections.
///
/// # Invariants
/// - every edge's `source` and `target` name a node in `nodes`
/// - node ids and edge ids are unique within the store
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphStore {
	nodes: Vec<Node>,
	edges: Vec<Edge>,
	next_edge_seq: u64,
}

impl GraphStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	pub fn edges(&self) -> &[Edge] {
		&self.edges
	}

	pub fn node(&self, id: &str) -> Option<&Node> {
		self.nodes.iter().find(|n| n.id == id)
	}

	pub fn contains_node(&self, id: &str) -> bool {
		self.node(id).is_some()
	}

	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	pub fn snapshot(&self) -> GraphSnapshot {
		GraphSnapshot {
			nodes: self.nodes.clone(),
			edges: self.edges.clone(),
		}
	}

	/// Append a node for `part` at `position`.
	///
	/// Ids are `{partId}_{millis}`. When that id is already taken the
	/// millisecond component is advanced until it is free.
	pub fn add_node(&mut self, part: &PartDefinition, position: Position, clock: &impl Clock) -> Node {
		let mut stamp = clock.now_ms();
		let mut id = format!("{}_{}", part.id, stamp);
		while self.contains_node(&id) {
			stamp += 1;
			id = format!("{}_{}", part.id, stamp);
		}

		let node = Node {
			id,
			kind: "default".into(),
			data: NodeData {
				label: format!("{} {}", part.icon, part.name),
				part_id: Some(part.id.to_string()),
			},
			position,
			style: NodeStyle {
				background: part.color.to_string(),
				..NodeStyle::default()
			},
		};
		debug!("added node {} at ({:.1}, {:.1})", node.id, position.x, position.y);
		self.nodes.push(node.clone());
		node
	}

	/// Remove the nodes in `ids` and every edge incident to them.
	///
	/// Returns whether anything was removed.
	pub fn remove_nodes(&mut self, ids: &HashSet<String>) -> bool {
		if ids.is_empty() {
			return false;
		}
		let (nodes_before, edges_before) = (self.nodes.len(), self.edges.len());
		self.nodes.retain(|n| !ids.contains(&n.id));
		self.edges.retain(|e| !e.touches(ids));
		let (removed_nodes, removed_edges) = (
			nodes_before - self.nodes.len(),
			edges_before - self.edges.len(),
		);
		if removed_nodes + removed_edges > 0 {
			debug!("removed {removed_nodes} nodes and {removed_edges} incident edges");
		}
		removed_nodes + removed_edges > 0
	}

	/// Remove edges by id. Unknown ids are ignored.
	pub fn remove_edges(&mut self, ids: &HashSet<String>) -> bool {
		let before = self.edges.len();
		self.edges.retain(|e| !ids.contains(&e.id));
		before != self.edges.len()
	}

	/// Move one node. Unknown ids are ignored.
	pub fn update_node_position(&mut self, id: &str, position: Position) -> bool {
		match self.nodes.iter_mut().find(|n| n.id == id) {
			Some(node) => {
				node.position = position;
				true
			}
			None => false,
		}
	}

	/// Append an animated edge. Self-loops and parallel edges are allowed.
	pub fn add_edge(&mut self, source: &str, target: &str) -> Edge {
		let id = self.fresh_edge_id(source, target);
		let edge = Edge {
			id,
			source: source.to_string(),
			target: target.to_string(),
			animated: true,
		};
		debug!("added edge {} ({} -> {})", edge.id, source, target);
		self.edges.push(edge.clone());
		edge
	}

	pub fn clear(&mut self) {
		self.nodes.clear();
		self.edges.clear();
		self.next_edge_seq = 0;
	}

	/// Replace both collections wholesale.
	///
	/// Edges without an id get one; edges whose endpoints are not in `nodes`
	/// are dropped.
	pub fn hydrate(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) {
		let node_ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
		let (kept, dangling): (Vec<Edge>, Vec<Edge>) = edges.into_iter().partition(|e| {
			node_ids.contains(e.source.as_str()) && node_ids.contains(e.target.as_str())
		});
		if !dangling.is_empty() {
			warn!("dropped {} edges with missing endpoints", dangling.len());
		}

		self.nodes = nodes;
		self.edges = Vec::with_capacity(kept.len());
		self.next_edge_seq = 0;
		for mut edge in kept {
			if edge.id.is_empty() || self.edges.iter().any(|e| e.id == edge.id) {
				edge.id = self.fresh_edge_id(&edge.source, &edge.target);
			}
			self.edges.push(edge);
		}
		debug!(
			"hydrated {} nodes and {} edges",
			self.nodes.len(),
			self.edges.len()
		);
	}

	fn fresh_edge_id(&mut self, source: &str, target: &str) -> String {
		loop {
			let id = format!("e{}_{}_{}", self.next_edge_seq, source, target);
			self.next_edge_seq += 1;
			if !self.edges.iter().any(|e| e.id == id) {
				return id;
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::super::catalog::PartCatalog;
	use super::super::clock::tests::TestClock;
	use super::*;

	fn part(id: &str) -> &'static PartDefinition {
		PartCatalog::station().find_part(id).unwrap()
	}

	fn ids(list: &[&str]) -> HashSet<String> {
		list.iter().map(|s| s.to_string()).collect()
	}

	#[test]
	fn add_node_derives_id_label_and_style() {
		let mut store = GraphStore::new();
		let clock = TestClock::fixed(1_718_000_000_000);
		let node = store.add_node(part("solar_panel"), Position::new(5.0, 6.0), &clock);

		assert_eq!(node.id, "solar_panel_1718000000000");
		let stamp = node.id.strip_prefix("solar_panel_").unwrap();
		assert_eq!(stamp.len(), 13);
		assert!(stamp.chars().all(|c| c.is_ascii_digit()));
		assert!(node.label().contains("Solar Panel"));
		assert!(node.label().starts_with("☀️"));
		assert_eq!(node.style.background, "#FFC107");
		assert_eq!(node.data.part_id.as_deref(), Some("solar_panel"));
		assert_eq!(store.nodes(), &[node]);
	}

	#[test]
	fn same_tick_ids_stay_unique_and_ordered() {
		let mut store = GraphStore::new();
		let clock = TestClock::fixed(1_718_000_000_000);
		let parts = ["airlock", "airlock", "galley", "airlock", "galley"];
		let created: Vec<String> = parts
			.iter()
			.map(|p| store.add_node(part(p), Position::default(), &clock).id)
			.collect();

		let unique: HashSet<_> = created.iter().collect();
		assert_eq!(unique.len(), created.len());
		let stored: Vec<String> = store.nodes().iter().map(|n| n.id.clone()).collect();
		assert_eq!(stored, created);
		assert_eq!(created[1], "airlock_1718000000001");
	}

	#[test]
	fn remove_nodes_cascades_to_incident_edges() {
		let mut store = GraphStore::new();
		let clock = TestClock::stepping(1_718_000_000_000, 1);
		let a = store.add_node(part("solar_panel"), Position::default(), &clock).id;
		let b = store.add_node(part("battery_bank"), Position::default(), &clock).id;
		let c = store.add_node(part("power_grid"), Position::default(), &clock).id;
		store.add_edge(&a, &b);
		store.add_edge(&b, &c);
		let kept = store.add_edge(&a, &c);

		assert!(store.remove_nodes(&ids(&[&b])));
		assert!(store.nodes().iter().all(|n| n.id != b));
		assert_eq!(store.edges(), &[kept]);
		assert!(
			store
				.edges()
				.iter()
				.all(|e| e.source != b && e.target != b)
		);
	}

	#[test]
	fn remove_nodes_ignores_empty_and_unknown() {
		let mut store = GraphStore::new();
		let clock = TestClock::fixed(1);
		store.add_node(part("airlock"), Position::default(), &clock);
		let before = store.clone();

		assert!(!store.remove_nodes(&HashSet::new()));
		assert!(!store.remove_nodes(&ids(&["ghost"])));
		assert_eq!(store, before);
	}

	#[test]
	fn update_position_touches_only_target() {
		let mut store = GraphStore::new();
		let clock = TestClock::stepping(1_000, 1);
		let a = store.add_node(part("airlock"), Position::new(1.0, 1.0), &clock).id;
		let b = store.add_node(part("galley"), Position::new(2.0, 2.0), &clock).id;

		assert!(store.update_node_position(&a, Position::new(50.0, 60.0)));
		assert!(!store.update_node_position("ghost", Position::new(0.0, 0.0)));
		assert_eq!(store.node(&a).unwrap().position, Position::new(50.0, 60.0));
		assert_eq!(store.node(&b).unwrap().position, Position::new(2.0, 2.0));
	}

	#[test]
	fn edges_allow_self_loops_and_parallels() {
		let mut store = GraphStore::new();
		let clock = TestClock::fixed(1);
		let a = store.add_node(part("airlock"), Position::default(), &clock).id;
		let loop_edge = store.add_edge(&a, &a);
		let first = store.add_edge(&a, &a);

		assert!(loop_edge.animated);
		assert_eq!(store.edges().len(), 2);
		assert_ne!(loop_edge.id, first.id);
	}

	#[test]
	fn clear_empties_everything() {
		let mut store = GraphStore::new();
		let clock = TestClock::stepping(1, 1);
		let a = store.add_node(part("airlock"), Position::default(), &clock).id;
		let b = store.add_node(part("galley"), Position::default(), &clock).id;
		store.add_edge(&a, &b);
		store.clear();
		assert!(store.nodes().is_empty());
		assert!(store.edges().is_empty());
	}

	#[test]
	fn hydrate_round_trips_well_formed_arrays() {
		let elements = json!([
			{ "id": "a", "type": "default", "data": { "label": "A" }, "position": { "x": 1.0, "y": 2.0 } },
			{ "id": "b", "type": "default", "data": { "label": "B" }, "position": { "x": 3.0, "y": 4.0 } }
		]);
		let connections = json!([{ "id": "e1", "source": "a", "target": "b", "animated": true }]);

		let mut store = GraphStore::new();
		store.hydrate(
			serde_json::from_value(elements).unwrap(),
			serde_json::from_value(connections).unwrap(),
		);

		assert_eq!(serde_json::to_value(store.nodes()).unwrap()[1]["id"], "b");
		assert_eq!(store.nodes().len(), 2);
		assert_eq!(store.edges().len(), 1);
		assert_eq!(store.edges()[0].id, "e1");
		assert_eq!(store.node("b").unwrap().position, Position::new(3.0, 4.0));
	}

	#[test]
	fn hydrate_drops_dangling_edges() {
		let mut store = GraphStore::new();
		let nodes = vec![serde_json::from_value::<Node>(json!({ "id": "a" })).unwrap()];
		let edges = vec![
			Edge {
				id: "ok".into(),
				source: "a".into(),
				target: "a".into(),
				animated: true,
			},
			Edge {
				id: "bad".into(),
				source: "a".into(),
				target: "gone".into(),
				animated: true,
			},
		];
		store.hydrate(nodes, edges);
		assert_eq!(store.edges().len(), 1);
		assert_eq!(store.edges()[0].id, "ok");
	}
}
