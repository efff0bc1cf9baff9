use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
	pub x: f64,
	pub y: f64,
}

impl Position {
	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn offset(self, dx: f64, dy: f64) -> Self {
		Self::new(self.x + dx, self.y + dy)
	}
}

/// Rendering hint carried over from the diagram file format. Only `Input` has
/// meaning here: it marks the root.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
	Input,
	Default,
	Output,
	#[serde(other)]
	Other,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
	#[serde(default)]
	pub label: String,
	/// Back-reference to the parent node. Lookup only, never ownership.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub parent_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
	pub id: String,
	#[serde(default)]
	pub data: NodeData,
	#[serde(default)]
	pub position: Position,
	#[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
	pub kind: Option<NodeKind>,
}

impl Node {
	pub fn root(id: impl Into<String>, label: impl Into<String>, position: Position) -> Self {
		Self {
			id: id.into(),
			data: NodeData {
				label: label.into(),
				parent_id: None,
			},
			position,
			kind: Some(NodeKind::Input),
		}
	}

	pub fn child(
		id: impl Into<String>,
		parent_id: impl Into<String>,
		label: impl Into<String>,
		position: Position,
	) -> Self {
		Self {
			id: id.into(),
			data: NodeData {
				label: label.into(),
				parent_id: Some(parent_id.into()),
			},
			position,
			kind: None,
		}
	}

	pub fn label(&self) -> &str {
		&self.data.label
	}

	pub fn parent_id(&self) -> Option<&str> {
		self.data.parent_id.as_deref()
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
	pub id: String,
	pub source: String,
	pub target: String,
}

impl Edge {
	pub fn new(
		id: impl Into<String>,
		source: impl Into<String>,
		target: impl Into<String>,
	) -> Self {
		Self {
			id: id.into(),
			source: source.into(),
			target: target.into(),
		}
	}
}

/// Pan offset and zoom factor of the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
	#[serde(default)]
	pub x: f64,
	#[serde(default)]
	pub y: f64,
	#[serde(default = "default_zoom")]
	pub zoom: f64,
}

fn default_zoom() -> f64 {
	1.0
}

impl Default for Viewport {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			zoom: default_zoom(),
		}
	}
}

/// The unit of save and restore.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
	#[serde(default)]
	pub nodes: Vec<Node>,
	#[serde(default)]
	pub edges: Vec<Edge>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub viewport: Option<Viewport>,
}
