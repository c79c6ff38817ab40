//! The designer core: graph store, selection and current-design bookkeeping
//! behind a message-passing surface.
//!
//! The canvas never mutates state directly. It reports [`CanvasIntent`]s;
//! every action says whether it changed anything, so a no-op never has to
//! notify the view.

use log::{debug, info};
use rand::Rng;

use super::catalog::PartCatalog;
use super::clock::Clock;
use super::persistence::LoadedDesign;
use super::placement::{ViewportProjector, compute_position};
use super::selection::SelectionController;
use super::state::GraphStore;
use super::types::{DesignId, Edge, GraphSnapshot, Node, Position, Selection};

/// Something the user did on the canvas.
#[derive(Clone, Debug, PartialEq)]
pub enum CanvasIntent {
	SelectionChanged(Selection),
	ConnectionRequested { source: String, target: String },
	NodeMoved { id: String, position: Position },
	KeyPressed(String),
}

/// Power generated and drawn by the placed parts, in kW.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PowerBudget {
	pub generated_kw: f64,
	pub consumed_kw: f64,
}

impl PowerBudget {
	pub fn net_kw(&self) -> f64 {
		self.generated_kw - self.consumed_kw
	}
}

#[derive(Clone, Debug)]
pub struct StationDesigner {
	catalog: PartCatalog,
	store: GraphStore,
	selection: SelectionController,
	current_design: Option<DesignId>,
	design_name: String,
	generation: u64,
}

impl StationDesigner {
	pub fn new(catalog: PartCatalog) -> Self {
		Self {
			catalog,
			store: GraphStore::new(),
			selection: SelectionController::default(),
			current_design: None,
			design_name: String::new(),
			generation: 0,
		}
	}

	pub fn catalog(&self) -> &PartCatalog {
		&self.catalog
	}

	#[cfg(test)]
	pub(crate) fn store(&self) -> &GraphStore {
		&self.store
	}

	pub fn nodes(&self) -> &[Node] {
		self.store.nodes()
	}

	pub fn edges(&self) -> &[Edge] {
		self.store.edges()
	}

	pub fn selection(&self) -> &SelectionController {
		&self.selection
	}

	pub fn current_design(&self) -> Option<DesignId> {
		self.current_design
	}

	pub fn design_name(&self) -> &str {
		&self.design_name
	}

	/// Changes whenever a different design is opened or started.
	///
	/// Read before an async save and passed back to [`Self::mark_saved`].
	pub fn generation(&self) -> u64 {
		self.generation
	}

	pub fn snapshot(&self) -> GraphSnapshot {
		self.store.snapshot()
	}

	pub fn set_design_name(&mut self, name: impl Into<String>) {
		self.design_name = name.into();
	}

	/// Place a part from the catalog. Unknown part ids are ignored.
	pub fn add_part(
		&mut self,
		part_id: &str,
		projector: Option<&dyn ViewportProjector>,
		rng: &mut impl Rng,
		clock: &impl Clock,
	) -> Option<Node> {
		let Some(part) = self.catalog.find_part(part_id) else {
			debug!("ignoring unknown part {part_id}");
			return None;
		};
		let position = compute_position(projector, rng);
		Some(self.store.add_node(part, position, clock))
	}

	pub fn handle(&mut self, intent: CanvasIntent) -> bool {
		match intent {
			CanvasIntent::SelectionChanged(selection) => self.on_selection_changed(selection),
			CanvasIntent::ConnectionRequested { source, target } => {
				self.on_connection_requested(&source, &target).is_some()
			}
			CanvasIntent::NodeMoved { id, position } => self.on_node_moved(&id, position),
			CanvasIntent::KeyPressed(key) => self.on_key(&key),
		}
	}

	pub fn on_selection_changed(&mut self, selection: Selection) -> bool {
		if self.selection.selection() == Some(&selection)
			|| (selection.is_empty() && self.selection.is_idle())
		{
			return false;
		}
		self.selection.on_selection_changed(selection);
		true
	}

	/// Connect two existing nodes.
	pub fn on_connection_requested(&mut self, source: &str, target: &str) -> Option<Edge> {
		if !self.store.contains_node(source) || !self.store.contains_node(target) {
			debug!("ignoring connection {source} -> {target} with unknown endpoint");
			return None;
		}
		Some(self.store.add_edge(source, target))
	}

	pub fn on_node_moved(&mut self, id: &str, position: Position) -> bool {
		self.store.update_node_position(id, position)
	}

	pub fn on_key(&mut self, key: &str) -> bool {
		self.selection.on_key(key, &mut self.store)
	}

	pub fn delete_selected(&mut self) -> bool {
		if self.selection.is_idle() {
			return false;
		}
		self.selection.delete_selected(&mut self.store);
		true
	}

	/// Empty the canvas. The current design stays selected for saving.
	pub fn clear(&mut self) {
		self.store.clear();
		self.selection = SelectionController::Idle;
	}

	/// Start an unsaved design.
	pub fn new_design(&mut self, name: impl Into<String>) {
		self.store.clear();
		self.selection = SelectionController::Idle;
		self.current_design = None;
		self.design_name = name.into();
		self.generation += 1;
	}

	/// Replace the canvas with a loaded design and make it current.
	pub fn apply_loaded(&mut self, loaded: LoadedDesign) {
		let LoadedDesign {
			design,
			nodes,
			edges,
		} = loaded;
		self.store.hydrate(nodes, edges);
		self.selection = SelectionController::Idle;
		self.current_design = Some(design.id);
		self.design_name = design.name;
		self.generation += 1;
		info!(
			"design {} is now current ({} parts)",
			design.id,
			self.store.node_count()
		);
	}

	/// Record that the canvas was saved as `id`, so later saves update it.
	///
	/// `generation` is [`Self::generation`] as read when the save was sent.
	/// If another design was opened or started since, or the canvas already
	/// has an id, nothing is recorded and `false` is returned.
	pub fn mark_saved(&mut self, id: DesignId, name: impl Into<String>, generation: u64) -> bool {
		if generation != self.generation || self.current_design.is_some() {
			debug!("not binding saved design {id} to a different canvas");
			return false;
		}
		self.current_design = Some(id);
		self.design_name = name.into();
		true
	}

	/// Forget `id` if it is the current design (after it was deleted remotely).
	pub fn forget_design(&mut self, id: DesignId) -> bool {
		if self.current_design != Some(id) {
			return false;
		}
		self.current_design = None;
		true
	}

	pub fn power_budget(&self) -> PowerBudget {
		self.store
			.nodes()
			.iter()
			.filter_map(|n| n.data.part_id.as_deref())
			.filter_map(|id| self.catalog.find_part(id))
			.fold(PowerBudget::default(), |mut budget, part| {
				if part.power_kw < 0.0 {
					budget.generated_kw -= part.power_kw;
				} else {
					budget.consumed_kw += part.power_kw;
				}
				budget
			})
	}
}

#[cfg(test)]
mod tests {
	use futures::executor::block_on;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	use super::super::alert::tests::RecordingNotifier;
	use super::super::clock::tests::TestClock;
	use super::super::error::ProjectionError;
	use super::super::persistence::PersistenceGateway;
	use super::super::persistence::tests::{MemoryStore, user};
	use super::super::types::SavedDesign;
	use super::*;

	struct Centre(Position);

	impl ViewportProjector for Centre {
		fn viewport_center(&self) -> Result<Position, ProjectionError> {
			Ok(self.0)
		}
	}

	fn designer() -> StationDesigner {
		StationDesigner::new(PartCatalog::station())
	}

	fn rng() -> StdRng {
		StdRng::seed_from_u64(42)
	}

	#[test]
	fn add_part_places_at_viewport_centre() {
		let mut d = designer();
		let clock = TestClock::fixed(1_718_000_000_000);
		let centre = Centre(Position::new(300.0, -20.0));
		let node = d
			.add_part("solar_panel", Some(&centre), &mut rng(), &clock)
			.unwrap();

		assert_eq!(node.id, "solar_panel_1718000000000");
		assert_eq!(node.position, Position::new(300.0, -20.0));
		assert_eq!(d.nodes().len(), 1);
	}

	#[test]
	fn unknown_part_is_noop() {
		let mut d = designer();
		assert!(
			d.add_part("warp_core", None, &mut rng(), &TestClock::fixed(1))
				.is_none()
		);
		assert!(d.nodes().is_empty());
	}

	#[test]
	fn intents_drive_the_graph() {
		let mut d = designer();
		let clock = TestClock::stepping(1_000, 1);
		let a = d.add_part("airlock", None, &mut rng(), &clock).unwrap();
		let b = d.add_part("galley", None, &mut rng(), &clock).unwrap();

		assert!(d.handle(CanvasIntent::ConnectionRequested {
			source: a.id.clone(),
			target: b.id.clone(),
		}));
		assert!(!d.handle(CanvasIntent::ConnectionRequested {
			source: a.id.clone(),
			target: "ghost".into(),
		}));
		assert!(d.handle(CanvasIntent::NodeMoved {
			id: b.id.clone(),
			position: Position::new(9.0, 9.0),
		}));
		assert!(!d.handle(CanvasIntent::NodeMoved {
			id: "ghost".into(),
			position: Position::new(9.0, 9.0),
		}));
		assert_eq!(d.store().node(&b.id).unwrap().position, Position::new(9.0, 9.0));
		assert!(d.edges()[0].animated);

		assert!(d.handle(CanvasIntent::SelectionChanged(Selection {
			nodes: vec![a.clone()],
			edges: Vec::new(),
		})));
		assert!(d.handle(CanvasIntent::KeyPressed("Delete".into())));
		assert_eq!(d.nodes(), &[d.store().node(&b.id).unwrap().clone()]);
		assert!(d.edges().is_empty());
		assert!(d.selection().is_idle());
	}

	#[test]
	fn delete_with_empty_selection_does_not_signal() {
		let mut d = designer();
		d.add_part("airlock", None, &mut rng(), &TestClock::fixed(1));
		let before = d.clone();

		assert!(!d.handle(CanvasIntent::KeyPressed("Delete".into())));
		assert!(!d.handle(CanvasIntent::KeyPressed("Backspace".into())));
		assert!(!d.delete_selected());
		assert!(!d.on_selection_changed(Selection::default()));
		assert_eq!(d.snapshot(), before.snapshot());
		assert_eq!(d.selection(), before.selection());
	}

	#[test]
	fn power_budget_sums_known_parts() {
		let mut d = designer();
		let clock = TestClock::stepping(1, 1);
		for part in ["solar_panel", "solar_panel", "research_lab", "crew_quarters"] {
			d.add_part(part, None, &mut rng(), &clock);
		}
		let budget = d.power_budget();
		assert_eq!(budget.generated_kw, 100.0);
		assert_eq!(budget.consumed_kw, 17.5);
		assert_eq!(budget.net_kw(), 82.5);
	}

	#[test]
	fn save_then_update_targets_the_new_design() {
		let gateway = PersistenceGateway::new(MemoryStore::default(), RecordingNotifier::default());
		let clock = TestClock::stepping(1_718_000_000_000, 1);
		let mut d = designer();
		d.add_part("solar_panel", None, &mut rng(), &clock);

		let name = "Outpost";
		let generation = d.generation();
		let id = block_on(gateway.create_new(Some(&user()), name, &d.snapshot(), &clock)).unwrap();
		assert!(d.mark_saved(id, name, generation));
		assert_eq!(d.current_design(), Some(id));

		d.add_part("battery_bank", None, &mut rng(), &clock);
		block_on(gateway.update_existing(
			Some(&user()),
			d.current_design(),
			d.design_name(),
			&d.snapshot(),
		))
		.unwrap();

		let mut other = designer();
		other.apply_loaded(block_on(gateway.load(Some(&user()), id)).unwrap());
		assert_eq!(other.snapshot(), d.snapshot());
		assert_eq!(other.current_design(), Some(id));
		assert_eq!(other.design_name(), "Outpost");
		assert_eq!(gateway.notifier().alert_count(), 0);
	}

	#[test]
	fn new_design_and_forget_reset_current_id() {
		let mut d = designer();
		assert!(d.mark_saved(DesignId(5), "Five", d.generation()));
		assert!(!d.forget_design(DesignId(6)));
		assert_eq!(d.current_design(), Some(DesignId(5)));
		assert!(d.forget_design(DesignId(5)));
		assert_eq!(d.current_design(), None);

		assert!(d.mark_saved(DesignId(7), "Seven", d.generation()));
		d.new_design("Fresh");
		assert_eq!(d.current_design(), None);
		assert_eq!(d.design_name(), "Fresh");
	}

	#[test]
	fn save_completing_after_new_design_is_not_bound() {
		let mut d = designer();
		d.set_design_name("Outpost");
		let sent_at = d.generation();

		d.new_design("Fresh");
		assert!(!d.mark_saved(DesignId(9), "Outpost", sent_at));
		assert_eq!(d.current_design(), None);
		assert_eq!(d.design_name(), "Fresh");
	}

	#[test]
	fn save_completing_after_load_is_not_bound() {
		let mut d = designer();
		let sent_at = d.generation();
		let design: SavedDesign = serde_json::from_value(serde_json::json!({
			"id": 3,
			"name": "Loaded",
			"elements": [],
			"connections": []
		}))
		.unwrap();
		d.apply_loaded(LoadedDesign::from_saved(design));

		assert!(!d.mark_saved(DesignId(9), "Stale", sent_at));
		assert_eq!(d.current_design(), Some(DesignId(3)));
		assert_eq!(d.design_name(), "Loaded");
	}

	#[test]
	fn mark_saved_never_overrides_an_existing_id() {
		let mut d = designer();
		assert!(d.mark_saved(DesignId(1), "One", d.generation()));
		assert!(!d.mark_saved(DesignId(2), "Two", d.generation()));
		assert_eq!(d.current_design(), Some(DesignId(1)));
	}
}
