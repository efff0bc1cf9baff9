use std::collections::HashSet;

use crate::tree::{GraphStore, Node, Position, Viewport};

pub const NODE_WIDTH: f64 = 150.0;
pub const NODE_HEIGHT: f64 = 40.0;
/// Pointer travel (screen px) below which a press on a node counts as a click.
pub const CLICK_SLOP: f64 = 3.0;
/// Distance (screen px) from an edge line that still selects it.
pub const EDGE_SLOP: f64 = 6.0;

/// What a Delete or Backspace press removes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection {
	Node(String),
	Edge(String),
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_id: Option<String>,
	/// Shift-drag draws a new edge instead of moving the node.
	pub connecting: bool,
	pub moved: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start: Position,
	/// Pointer in graph space while connecting.
	pub pointer: Position,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub viewport_start: Viewport,
}

#[derive(Clone, Debug, Default)]
pub struct HoverState {
	pub node: Option<String>,
	pub neighbors: HashSet<String>,
	pub highlight_t: f64,
	pub prev_node: Option<String>,
	pub prev_neighbors: HashSet<String>,
}

#[derive(Clone, Debug, Default)]
pub struct CanvasState {
	pub drag: DragState,
	pub pan: PanState,
	pub hover: HoverState,
	pub selection: Option<Selection>,
	pub width: f64,
	pub height: f64,
	pub flow_time: f64,
}

pub fn screen_to_graph(viewport: &Viewport, sx: f64, sy: f64) -> Position {
	Position::new(
		(sx - viewport.x) / viewport.zoom,
		(sy - viewport.y) / viewport.zoom,
	)
}

/// Edges leave the bottom of their source and enter the top of their target.
pub fn edge_endpoints(source: &Node, target: &Node) -> (Position, Position) {
	(
		source.position.offset(NODE_WIDTH / 2.0, NODE_HEIGHT),
		target.position.offset(NODE_WIDTH / 2.0, 0.0),
	)
}

fn distance_to_segment(p: Position, a: Position, b: Position) -> f64 {
	let (dx, dy) = (b.x - a.x, b.y - a.y);
	let len_sq = dx * dx + dy * dy;
	let t = if len_sq < f64::EPSILON {
		0.0
	} else {
		(((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0)
	};
	let (cx, cy) = (a.x + t * dx - p.x, a.y + t * dy - p.y);
	(cx * cx + cy * cy).sqrt()
}

/// Topmost edge within [`EDGE_SLOP`] of a screen point. Edges with a missing
/// endpoint are not drawn and cannot be hit.
pub fn edge_at_position(
	graph: &GraphStore,
	viewport: &Viewport,
	sx: f64,
	sy: f64,
) -> Option<String> {
	let p = screen_to_graph(viewport, sx, sy);
	let slop = EDGE_SLOP / viewport.zoom;
	graph
		.edges()
		.iter()
		.rev()
		.find(|e| match (graph.node(&e.source), graph.node(&e.target)) {
			(Some(source), Some(target)) => {
				let (a, b) = edge_endpoints(source, target);
				distance_to_segment(p, a, b) <= slop
			}
			_ => false,
		})
		.map(|e| e.id.clone())
}

/// Topmost node under a screen point. Nodes are drawn in store order, so the
/// last hit wins.
pub fn node_at_position(
	graph: &GraphStore,
	viewport: &Viewport,
	sx: f64,
	sy: f64,
) -> Option<String> {
	let p = screen_to_graph(viewport, sx, sy);
	graph
		.nodes()
		.iter()
		.rev()
		.find(|n| {
			p.x >= n.position.x
				&& p.x <= n.position.x + NODE_WIDTH
				&& p.y >= n.position.y
				&& p.y <= n.position.y + NODE_HEIGHT
		})
		.map(|n| n.id.clone())
}

impl CanvasState {
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			width,
			height,
			..Self::default()
		}
	}

	pub fn set_hover(&mut self, graph: &GraphStore, node: Option<String>) {
		if self.hover.node == node {
			return;
		}
		let was_hovering = self.hover.node.is_some();

		// Keep the old highlight around while it fades out
		if was_hovering && node.is_none() {
			self.hover.prev_node = self.hover.node.take();
			self.hover.prev_neighbors = std::mem::take(&mut self.hover.neighbors);
		} else {
			self.hover.prev_node = None;
			self.hover.prev_neighbors.clear();
		}

		self.hover.neighbors.clear();
		if let Some(id) = &node {
			for edge in graph.edges() {
				if &edge.source == id {
					self.hover.neighbors.insert(edge.target.clone());
				} else if &edge.target == id {
					self.hover.neighbors.insert(edge.source.clone());
				}
			}
		}
		self.hover.node = node;
	}

	pub fn is_highlighted(&self, id: &str) -> bool {
		self.is_hovered(id)
			|| self.hover.neighbors.contains(id)
			|| self.hover.prev_neighbors.contains(id)
	}

	pub fn is_hovered(&self, id: &str) -> bool {
		self.hover.node.as_deref() == Some(id) || self.hover.prev_node.as_deref() == Some(id)
	}

	pub fn has_active_highlight(&self) -> bool {
		self.hover.node.is_some() || self.hover.prev_node.is_some()
	}

	pub fn is_selected_node(&self, id: &str) -> bool {
		matches!(&self.selection, Some(Selection::Node(n)) if n == id)
	}

	pub fn is_selected_edge(&self, id: &str) -> bool {
		matches!(&self.selection, Some(Selection::Edge(e)) if e == id)
	}

	/// Forgets a selection whose node or edge has left the graph.
	pub fn prune_selection(&mut self, graph: &GraphStore) {
		let alive = match &self.selection {
			Some(Selection::Node(id)) => graph.contains(id),
			Some(Selection::Edge(id)) => graph.edges().iter().any(|e| &e.id == id),
			None => true,
		};
		if !alive {
			self.selection = None;
		}
	}

	pub fn tick(&mut self, dt: f64) {
		self.flow_time += dt;
		let (target, speed) = if self.hover.node.is_some() {
			(1.0, 1.8)
		} else {
			(0.0, 1.26)
		};
		self.hover.highlight_t += (target - self.hover.highlight_t) * speed * dt;
		if self.hover.node.is_none() && self.hover.highlight_t < 0.01 {
			self.hover.highlight_t = 0.0;
			self.hover.prev_node = None;
			self.hover.prev_neighbors.clear();
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	pub fn end_gestures(&mut self) {
		self.drag = DragState::default();
		self.pan.active = false;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn graph() -> GraphStore {
		let mut g = GraphStore::new(None);
		g.replace_all(
			vec![
				Node::root("r", "root", Position::new(0.0, 0.0)),
				Node::child("c", "r", "child", Position::new(100.0, 20.0)),
			],
			Vec::new(),
		);
		g.connect("r", "c");
		g
	}

	#[test]
	fn hit_test_respects_viewport_and_stacking() {
		let g = graph();
		let vp = Viewport::default();
		assert_eq!(node_at_position(&g, &vp, 10.0, 10.0).as_deref(), Some("r"));
		// overlap region: child is drawn last
		assert_eq!(node_at_position(&g, &vp, 120.0, 30.0).as_deref(), Some("c"));
		assert_eq!(node_at_position(&g, &vp, 400.0, 400.0), None);

		let zoomed = Viewport {
			x: 50.0,
			y: 50.0,
			zoom: 2.0,
		};
		assert_eq!(node_at_position(&g, &zoomed, 60.0, 60.0).as_deref(), Some("r"));
		assert_eq!(node_at_position(&g, &zoomed, 10.0, 10.0), None);
	}

	#[test]
	fn hover_collects_neighbors_and_fades() {
		let g = graph();
		let mut state = CanvasState::new(800.0, 600.0);
		state.set_hover(&g, Some("r".into()));
		assert!(state.is_highlighted("c"));
		assert!(state.is_hovered("r"));

		state.set_hover(&g, None);
		assert!(state.has_active_highlight());
		for _ in 0..600 {
			state.tick(0.016);
		}
		assert!(!state.has_active_highlight());
	}

	#[test]
	fn edges_are_hit_near_their_line() {
		let g = graph();
		let vp = Viewport::default();
		let edge = g.edges()[0].id.clone();
		// r bottom center (75, 40) to c top center (175, 20)
		assert_eq!(edge_at_position(&g, &vp, 125.0, 31.0), Some(edge.clone()));
		assert_eq!(edge_at_position(&g, &vp, 125.0, 60.0), None);
		let zoomed = Viewport {
			x: 0.0,
			y: 0.0,
			zoom: 2.0,
		};
		assert_eq!(edge_at_position(&g, &zoomed, 250.0, 62.0), Some(edge));
	}

	#[test]
	fn selection_is_pruned_when_its_target_goes() {
		let mut g = graph();
		let edge = g.edges()[0].id.clone();
		let mut state = CanvasState::new(800.0, 600.0);

		state.selection = Some(Selection::Edge(edge.clone()));
		assert!(state.is_selected_edge(&edge));
		state.prune_selection(&g);
		assert!(state.selection.is_some());

		state.selection = Some(Selection::Node("c".into()));
		assert!(state.is_selected_node("c"));
		assert!(!state.is_selected_node("r"));
		assert!(g.remove_node("c"));
		state.prune_selection(&g);
		assert_eq!(state.selection, None);

		assert!(g.edges().is_empty());
		state.selection = Some(Selection::Edge(edge));
		state.prune_selection(&g);
		assert_eq!(state.selection, None);
	}
}
