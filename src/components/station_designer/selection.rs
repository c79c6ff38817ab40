use log::debug;

use super::state::GraphStore;
use super::types::Selection;

/// Keys that delete the current node selection.
pub const DELETE_KEYS: &[&str] = &["Delete", "Backspace"];

/// Tracks the canvas selection and performs deletions.
///
/// ```text
/// Idle --non-empty selection--> Selected
/// Selected --non-empty selection--> Selected (replaced)
/// Selected --empty selection | delete--> Idle
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub enum SelectionController {
	#[default]
	Idle,
	Selected(Selection),
}

impl SelectionController {
	pub fn selection(&self) -> Option<&Selection> {
		match self {
			Self::Idle => None,
			Self::Selected(selection) => Some(selection),
		}
	}

	pub fn is_idle(&self) -> bool {
		matches!(self, Self::Idle)
	}

	/// Replace the selection wholesale with what the canvas reported.
	pub fn on_selection_changed(&mut self, selection: Selection) {
		*self = if selection.is_empty() {
			Self::Idle
		} else {
			Self::Selected(selection)
		};
	}

	/// Delete the selected nodes (with incident edges) and selected edges.
	///
	/// Returns whether the store changed. Idle is a no-op.
	pub fn delete_selected(&mut self, store: &mut GraphStore) -> bool {
		let Self::Selected(selection) = std::mem::take(self) else {
			return false;
		};
		let removed_nodes = store.remove_nodes(&selection.node_ids());
		let removed_edges = store.remove_edges(&selection.edge_ids());
		debug!(
			"deleted selection of {} nodes and {} edges",
			selection.nodes.len(),
			selection.edges.len()
		);
		removed_nodes || removed_edges
	}

	/// Handle a key press. Delete/Backspace only act on a node selection.
	pub fn on_key(&mut self, key: &str, store: &mut GraphStore) -> bool {
		if !DELETE_KEYS.contains(&key) {
			return false;
		}
		let has_nodes = self.selection().is_some_and(|s| !s.nodes.is_empty());
		has_nodes && self.delete_selected(store)
	}
}

#[cfg(test)]
mod tests {
	use super::super::catalog::PartCatalog;
	use super::super::clock::tests::TestClock;
	use super::super::types::Position;
	use super::*;

	fn populated() -> (GraphStore, Vec<String>) {
		let catalog = PartCatalog::station();
		let clock = TestClock::stepping(1_718_000_000_000, 1);
		let mut store = GraphStore::new();
		let ids: Vec<String> = ["solar_panel", "battery_bank", "power_grid"]
			.iter()
			.map(|p| {
				store
					.add_node(catalog.find_part(p).unwrap(), Position::default(), &clock)
					.id
			})
			.collect();
		store.add_edge(&ids[0], &ids[1]);
		store.add_edge(&ids[1], &ids[2]);
		(store, ids)
	}

	fn select_nodes(store: &GraphStore, ids: &[&String]) -> Selection {
		Selection {
			nodes: ids.iter().map(|id| store.node(id).unwrap().clone()).collect(),
			edges: Vec::new(),
		}
	}

	#[test]
	fn transitions_follow_reported_selection() {
		let (store, ids) = populated();
		let mut controller = SelectionController::default();
		assert!(controller.is_idle());

		controller.on_selection_changed(select_nodes(&store, &[&ids[0]]));
		assert_eq!(controller.selection().map(|s| s.nodes.len()), Some(1));

		controller.on_selection_changed(select_nodes(&store, &[&ids[1], &ids[2]]));
		let selection = controller.selection().unwrap();
		assert!(selection.contains_node(&ids[2]));
		assert!(!selection.contains_node(&ids[0]));

		controller.on_selection_changed(Selection::default());
		assert!(controller.is_idle());
	}

	#[test]
	fn delete_key_removes_nodes_and_incident_edges() {
		let (mut store, ids) = populated();
		let mut controller = SelectionController::default();
		controller.on_selection_changed(select_nodes(&store, &[&ids[1]]));

		assert!(controller.on_key("Backspace", &mut store));
		assert!(controller.is_idle());
		assert_eq!(store.node_count(), 2);
		assert!(store.edges().is_empty());
	}

	#[test]
	fn delete_key_with_empty_selection_is_noop() {
		let (mut store, _) = populated();
		let before = store.clone();
		let mut controller = SelectionController::default();

		assert!(!controller.on_key("Delete", &mut store));
		assert!(!controller.delete_selected(&mut store));
		assert_eq!(store, before);
	}

	#[test]
	fn other_keys_and_edge_only_selection_do_not_delete() {
		let (mut store, _) = populated();
		let before = store.clone();
		let mut controller = SelectionController::default();
		controller.on_selection_changed(Selection {
			nodes: Vec::new(),
			edges: vec![store.edges()[0].clone()],
		});

		assert!(!controller.on_key("Delete", &mut store));
		assert!(!controller.on_key("a", &mut store));
		assert_eq!(store, before);
		assert!(!controller.is_idle());
	}

	#[test]
	fn explicit_delete_removes_selected_edges_too() {
		let (mut store, _) = populated();
		let mut controller = SelectionController::default();
		controller.on_selection_changed(Selection {
			nodes: Vec::new(),
			edges: vec![store.edges()[0].clone()],
		});

		assert!(controller.delete_selected(&mut store));
		assert_eq!(store.edges().len(), 1);
		assert_eq!(store.node_count(), 3);
	}
}
