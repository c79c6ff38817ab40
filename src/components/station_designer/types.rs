use std::collections::HashSet;
use std::fmt;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// View mode tag written with every saved design.
pub const VIEW_MODE: &str = "designer";

fn default_node_kind() -> String {
	"default".into()
}

fn default_view_mode() -> String {
	VIEW_MODE.into()
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
	pub x: f64,
	pub y: f64,
}

impl Position {
	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
	pub label: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub part_id: Option<String>,
}

/// Presentation attributes copied from the part at creation time.
///
/// Decoding never fails: a field of the wrong shape (`"padding": "10px"`,
/// `"fontWeight": 700`) is read leniently or falls back to its default.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStyle {
	pub background: String,
	pub color: String,
	pub padding: f64,
	pub border_radius: f64,
	pub border: String,
	pub font_weight: String,
}

impl Default for NodeStyle {
	fn default() -> Self {
		Self {
			background: "#888888".into(),
			color: "#fff".into(),
			padding: 10.0,
			border_radius: 8.0,
			border: "2px solid #333".into(),
			font_weight: "bold".into(),
		}
	}
}

impl<'de> Deserialize<'de> for NodeStyle {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let defaults = Self::default();
		let Value::Object(map) = Value::deserialize(deserializer)? else {
			return Ok(defaults);
		};
		let text =
			|key: &str, fallback: String| map.get(key).and_then(text_value).unwrap_or(fallback);
		let number =
			|key: &str, fallback: f64| map.get(key).and_then(css_number).unwrap_or(fallback);
		Ok(Self {
			background: text("background", defaults.background),
			color: text("color", defaults.color),
			padding: number("padding", defaults.padding),
			border_radius: number("borderRadius", defaults.border_radius),
			border: text("border", defaults.border),
			font_weight: text("fontWeight", defaults.font_weight),
		})
	}
}

/// A string, or a number rendered as one.
fn text_value(value: &Value) -> Option<String> {
	match value {
		Value::String(s) => Some(s.clone()),
		Value::Number(n) => Some(n.to_string()),
		_ => None,
	}
}

/// A finite number, or a string like `"10"` / `"10px"`.
fn css_number(value: &Value) -> Option<f64> {
	let n = match value {
		Value::Number(n) => n.as_f64()?,
		Value::String(s) => s.trim().trim_end_matches("px").trim().parse().ok()?,
		_ => return None,
	};
	n.is_finite().then_some(n)
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
	Ok(Option::<Value>::deserialize(deserializer)?
		.as_ref()
		.and_then(text_value)
		.unwrap_or_default())
}

fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
	let count = match Option::<Value>::deserialize(deserializer)? {
		Some(Value::Number(n)) => n
			.as_u64()
			.or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
		Some(Value::String(s)) => s.trim().parse().ok(),
		_ => None,
	};
	Ok(count.unwrap_or_default() as usize)
}

/// A placed part instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
	pub id: String,
	#[serde(rename = "type", default = "default_node_kind")]
	pub kind: String,
	#[serde(default)]
	pub data: NodeData,
	#[serde(default)]
	pub position: Position,
	#[serde(default)]
	pub style: NodeStyle,
}

impl Node {
	pub fn label(&self) -> &str {
		&self.data.label
	}
}

/// A connection between two nodes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge {
	#[serde(default)]
	pub id: String,
	pub source: String,
	pub target: String,
	#[serde(default)]
	pub animated: bool,
}

impl Edge {
	pub fn touches(&self, node_ids: &HashSet<String>) -> bool {
		node_ids.contains(&self.source) || node_ids.contains(&self.target)
	}
}

/// What the canvas currently reports as selected. Replaced wholesale on change.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Selection {
	pub nodes: Vec<Node>,
	pub edges: Vec<Edge>,
}

impl Selection {
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty() && self.edges.is_empty()
	}

	pub fn node_ids(&self) -> HashSet<String> {
		self.nodes.iter().map(|n| n.id.clone()).collect()
	}

	pub fn edge_ids(&self) -> HashSet<String> {
		self.edges.iter().map(|e| e.id.clone()).collect()
	}

	pub fn contains_node(&self, id: &str) -> bool {
		self.nodes.iter().any(|n| n.id == id)
	}

	pub fn contains_edge(&self, id: &str) -> bool {
		self.edges.iter().any(|e| e.id == id)
	}
}

/// Point-in-time copy of the node and edge collections.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphSnapshot {
	pub nodes: Vec<Node>,
	pub edges: Vec<Edge>,
}

/// Identifier of a saved design. Accepts numbers or numeric strings on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct DesignId(pub u64);

impl fmt::Display for DesignId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl<'de> Deserialize<'de> for DesignId {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		#[derive(Deserialize)]
		#[serde(untagged)]
		enum Raw {
			Int(u64),
			Float(f64),
			Text(String),
		}

		match Raw::deserialize(deserializer)? {
			Raw::Int(n) => Ok(Self(n)),
			Raw::Float(f) if f >= 0.0 && f.fract() == 0.0 => Ok(Self(f as u64)),
			Raw::Float(f) => Err(de::Error::custom(format!("invalid design id {f}"))),
			Raw::Text(s) => s.trim().parse().map(Self).map_err(de::Error::custom),
		}
	}
}

/// A design record as stored by the backend.
///
/// `elements` and `connections` stay raw: the backend may send them as arrays
/// or as JSON-encoded strings, and decoding is the gateway's job.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedDesign {
	pub id: DesignId,
	#[serde(default, deserialize_with = "lenient_text")]
	pub user_id: String,
	#[serde(default, deserialize_with = "lenient_text")]
	pub name: String,
	#[serde(default = "default_view_mode")]
	pub view_mode: String,
	#[serde(default)]
	pub elements: Value,
	#[serde(default)]
	pub connections: Value,
	#[serde(default, deserialize_with = "lenient_count")]
	pub parts_count: usize,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub created_at: Option<Value>,
}

/// Body of `POST /save`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDesign<'a> {
	pub id: DesignId,
	pub user_id: &'a str,
	pub name: &'a str,
	pub view_mode: &'a str,
	pub elements: &'a [Node],
	pub connections: &'a [Edge],
	pub parts_count: usize,
	pub created_at: String,
}

/// Body of `PUT /update/{userId}/{id}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignUpdate<'a> {
	pub name: &'a str,
	pub view_mode: &'a str,
	pub elements: &'a [Node],
	pub connections: &'a [Edge],
	pub parts_count: usize,
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn design_id_accepts_numbers_and_strings() {
		let a: DesignId = serde_json::from_value(json!(1718000000000u64)).unwrap();
		let b: DesignId = serde_json::from_value(json!("1718000000000")).unwrap();
		let c: DesignId = serde_json::from_value(json!(1718000000000.0)).unwrap();
		assert_eq!(a, DesignId(1_718_000_000_000));
		assert_eq!(a, b);
		assert_eq!(a, c);
		assert!(serde_json::from_value::<DesignId>(json!("abc")).is_err());
		assert!(serde_json::from_value::<DesignId>(json!(1.5)).is_err());
	}

	#[test]
	fn node_uses_graph_editor_field_names() {
		let node: Node = serde_json::from_value(json!({
			"id": "airlock_1718000000000",
			"type": "default",
			"data": { "label": "🚪 Airlock", "partId": "airlock" },
			"position": { "x": 10.0, "y": 20.5 },
			"style": { "background": "#8D6E63", "borderRadius": 8 }
		}))
		.unwrap();
		assert_eq!(node.label(), "🚪 Airlock");
		assert_eq!(node.data.part_id.as_deref(), Some("airlock"));
		assert_eq!(node.position, Position::new(10.0, 20.5));
		assert_eq!(node.style.background, "#8D6E63");
		assert_eq!(node.style.color, "#fff");

		let back = serde_json::to_value(&node).unwrap();
		assert_eq!(back["type"], "default");
		assert_eq!(back["style"]["borderRadius"], 8.0);
	}

	#[test]
	fn node_without_optional_fields_gets_defaults() {
		let node: Node = serde_json::from_value(json!({ "id": "n1" })).unwrap();
		assert_eq!(node.kind, "default");
		assert_eq!(node.position, Position::default());
		assert!(node.data.part_id.is_none());
	}

	#[test]
	fn saved_design_tolerates_sparse_records() {
		let design: SavedDesign = serde_json::from_value(json!({
			"_id": "65f0c0ffee",
			"id": "42",
			"name": "Gateway"
		}))
		.unwrap();
		assert_eq!(design.id, DesignId(42));
		assert_eq!(design.view_mode, VIEW_MODE);
		assert_eq!(design.elements, Value::Null);
		assert_eq!(design.parts_count, 0);
	}

	#[test]
	fn style_with_css_strings_still_decodes() {
		let node: Node = serde_json::from_value(json!({
			"id": "galley_1",
			"style": { "padding": "12px", "borderRadius": "4", "fontWeight": 700, "color": null }
		}))
		.unwrap();
		assert_eq!(node.style.padding, 12.0);
		assert_eq!(node.style.border_radius, 4.0);
		assert_eq!(node.style.font_weight, "700");
		assert_eq!(node.style.color, "#fff");

		let odd: Node =
			serde_json::from_value(json!({ "id": "n", "style": { "padding": "wide" } })).unwrap();
		assert_eq!(odd.style, NodeStyle::default());
		let flat: Node = serde_json::from_value(json!({ "id": "n", "style": "bold" })).unwrap();
		assert_eq!(flat.style, NodeStyle::default());
	}

	#[test]
	fn saved_design_accepts_numeric_user_and_null_fields() {
		let design: SavedDesign = serde_json::from_value(json!({
			"id": 1,
			"userId": 7,
			"name": null,
			"partsCount": null
		}))
		.unwrap();
		assert_eq!(design.user_id, "7");
		assert_eq!(design.name, "");
		assert_eq!(design.parts_count, 0);

		let counted: SavedDesign =
			serde_json::from_value(json!({ "id": 2, "partsCount": 3.0 })).unwrap();
		assert_eq!(counted.parts_count, 3);
	}

	#[test]
	fn selection_reports_ids() {
		let selection = Selection {
			nodes: vec![serde_json::from_value(json!({ "id": "a" })).unwrap()],
			edges: vec![Edge {
				id: "e0_a_b".into(),
				source: "a".into(),
				target: "b".into(),
				animated: true,
			}],
		};
		assert!(!selection.is_empty());
		assert!(selection.contains_node("a"));
		assert!(selection.contains_edge("e0_a_b"));
		assert!(selection.node_ids().contains("a"));
		assert!(Selection::default().is_empty());
	}
}
