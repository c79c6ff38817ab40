//! Static registry of placeable station parts, grouped by category.

/// A placeable part type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PartDefinition {
	pub id: &'static str,
	pub name: &'static str,
	pub icon: &'static str,
	pub color: &'static str,
	pub description: &'static str,
	/// Power draw in kW. Negative values generate power.
	pub power_kw: f64,
}

/// A palette category and its parts, in display order.
#[derive(Clone, Copy, Debug)]
pub struct ToolGroup {
	pub id: &'static str,
	pub name: &'static str,
	pub parts: &'static [PartDefinition],
}

const fn part(
	id: &'static str,
	name: &'static str,
	icon: &'static str,
	color: &'static str,
	description: &'static str,
	power_kw: f64,
) -> PartDefinition {
	PartDefinition {
		id,
		name,
		icon,
		color,
		description,
		power_kw,
	}
}

const POWER: &[PartDefinition] = &[
	part("solar_panel", "Solar Panel", "☀️", "#FFC107", "Photovoltaic array", -50.0),
	part("battery_bank", "Battery Bank", "🔋", "#8BC34A", "Energy storage for eclipse periods", 0.0),
	part("nuclear_reactor", "Nuclear Reactor", "☢️", "#FF5722", "Fission power generation", -100.0),
	part("fuel_cell", "Fuel Cell", "🧪", "#03A9F4", "Hydrogen fuel cell power", -25.0),
	part("power_grid", "Power Grid", "⚡", "#FFEB3B", "Power distribution network", 0.0),
];

const HABITAT: &[PartDefinition] = &[
	part("crew_quarters", "Crew Quarters", "🛏️", "#4CAF50", "Sleeping and personal space", 2.5),
	part("galley", "Galley", "🍽️", "#FF9800", "Food preparation and dining", 4.0),
	part("medical_bay", "Medical Bay", "🏥", "#E91E63", "Crew health and emergency care", 5.0),
	part("recreation_module", "Recreation Module", "🎮", "#9C27B0", "Exercise and leisure", 3.0),
	part("hydroponics", "Hydroponics", "🌱", "#66BB6A", "Food production facility", 8.0),
];

const STRUCTURE: &[PartDefinition] = &[
	part("truss_segment", "Truss Segment", "🏗️", "#90A4AE", "Primary structural backbone", 0.0),
	part("docking_port", "Docking Port", "🚀", "#607D8B", "Berthing for visiting vehicles", 1.0),
	part("airlock", "Airlock", "🚪", "#8D6E63", "EVA access and pressure barrier", 2.0),
	part("connecting_node", "Connecting Node", "🔗", "#78909C", "Junction between modules", 0.5),
	part("radiation_shield", "Radiation Shield", "🛡️", "#546E7A", "Storm shelter shielding", 0.0),
];

const LIFE_SUPPORT: &[PartDefinition] = &[
	part("oxygen_generator", "Oxygen Generator", "🫁", "#00BCD4", "Electrolysis oxygen supply", 10.0),
	part("water_recycler", "Water Recycler", "💧", "#2196F3", "Closed-loop water recovery", 6.0),
	part("co2_scrubber", "CO₂ Scrubber", "🌬️", "#4DD0E1", "Carbon dioxide removal", 4.0),
	part("thermal_control", "Thermal Control", "🌡️", "#FF7043", "Radiators and heat exchange", 3.0),
];

const SCIENCE: &[PartDefinition] = &[
	part("research_lab", "Research Lab", "🔬", "#3F51B5", "Scientific research facility", 15.0),
	part("observatory", "Observatory", "🔭", "#5C6BC0", "Astronomical observation deck", 5.0),
	part("sensor_array", "Sensor Array", "🔍", "#7986CB", "Environmental sensing", 2.0),
	part("comm_dish", "Comm Dish", "📡", "#9FA8DA", "Ground and relay communications", 3.0),
];

const ROBOTICS: &[PartDefinition] = &[
	part("robotic_arm", "Robotic Arm", "🦾", "#F44336", "External manipulation and berthing", 5.0),
	part("maintenance_drone", "Maintenance Drone", "🤖", "#EF5350", "Autonomous inspection and repair", 2.0),
	part("rover_bay", "Rover Bay", "🚙", "#E57373", "Surface rover hangar", 8.0),
];

const STATION_GROUPS: &[ToolGroup] = &[
	ToolGroup {
		id: "power",
		name: "Power",
		parts: POWER,
	},
	ToolGroup {
		id: "habitat",
		name: "Habitat",
		parts: HABITAT,
	},
	ToolGroup {
		id: "structure",
		name: "Structure",
		parts: STRUCTURE,
	},
	ToolGroup {
		id: "life_support",
		name: "Life Support",
		parts: LIFE_SUPPORT,
	},
	ToolGroup {
		id: "science",
		name: "Science",
		parts: SCIENCE,
	},
	ToolGroup {
		id: "robotics",
		name: "Robotics",
		parts: ROBOTICS,
	},
];

/// Read-only lookup over a set of tool groups.
#[derive(Clone, Copy, Debug)]
pub struct PartCatalog {
	groups: &'static [ToolGroup],
}

impl Default for PartCatalog {
	fn default() -> Self {
		Self::station()
	}
}

impl PartCatalog {
	/// The built-in space station catalog.
	pub fn station() -> Self {
		Self {
			groups: STATION_GROUPS,
		}
	}

	pub fn list_groups(&self) -> &'static [ToolGroup] {
		self.groups
	}

	pub fn find_part(&self, part_id: &str) -> Option<&'static PartDefinition> {
		self.groups
			.iter()
			.flat_map(|g| g.parts.iter())
			.find(|p| p.id == part_id)
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use super::*;

	#[test]
	fn finds_solar_panel() {
		let part = PartCatalog::station().find_part("solar_panel").unwrap();
		assert_eq!(part.id, "solar_panel");
		assert_eq!(part.name, "Solar Panel");
		assert!(part.power_kw < 0.0);
	}

	#[test]
	fn unknown_part_is_none() {
		assert!(PartCatalog::station().find_part("warp_core").is_none());
		assert!(PartCatalog::station().find_part("").is_none());
	}

	#[test]
	fn groups_cover_all_categories_in_order() {
		let ids: Vec<_> = PartCatalog::station()
			.list_groups()
			.iter()
			.map(|g| g.id)
			.collect();
		assert_eq!(
			ids,
			["power", "habitat", "structure", "life_support", "science", "robotics"]
		);
	}

	#[test]
	fn part_ids_are_unique_across_groups() {
		let mut seen = HashSet::new();
		for group in PartCatalog::station().list_groups() {
			assert!(!group.parts.is_empty(), "empty group {}", group.id);
			for part in group.parts {
				assert!(seen.insert(part.id), "duplicate part id {}", part.id);
			}
		}
	}
}
