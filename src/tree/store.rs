use std::collections::{HashMap, HashSet};

use log::{debug, warn};

use super::ids::new_id;
use super::model::{Edge, GraphSnapshot, Node, Position, Viewport};

pub const DEFAULT_ROOT_LABEL: &str = "AI assistant for university students";
pub const ROOT_POSITION: Position = Position { x: 100.0, y: 100.0 };

/// Authoritative node and edge records of the tree.
///
/// Insertion order is kept for deterministic export. `index` maps node ids to
/// their slot in `nodes` and is rebuilt whenever the node list is replaced.
#[derive(Clone, Debug)]
pub struct GraphStore {
	nodes: Vec<Node>,
	edges: Vec<Edge>,
	index: HashMap<String, usize>,
}

impl Default for GraphStore {
	fn default() -> Self {
		Self::new(None)
	}
}

impl GraphStore {
	/// A store holding only the root node.
	pub fn new(root_label: Option<&str>) -> Self {
		let mut store = Self {
			nodes: Vec::new(),
			edges: Vec::new(),
			index: HashMap::new(),
		};
		store.reset(root_label);
		store
	}

	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	pub fn edges(&self) -> &[Edge] {
		&self.edges
	}

	pub fn node(&self, id: &str) -> Option<&Node> {
		self.index.get(id).and_then(|&i| self.nodes.get(i))
	}

	pub fn contains(&self, id: &str) -> bool {
		self.index.contains_key(id)
	}

	/// The first node without a parent.
	pub fn root(&self) -> Option<&Node> {
		self.nodes.iter().find(|n| n.parent_id().is_none())
	}

	pub fn children_of<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
		self.nodes.iter().filter(move |n| n.parent_id() == Some(id))
	}

	/// Labels from the root down to `id`, inclusive.
	///
	/// The walk stops at the first parent id that does not resolve, and at any
	/// node already visited, so broken or cyclic imports still terminate.
	pub fn ancestor_labels(&self, id: &str) -> Vec<String> {
		let mut labels = Vec::new();
		let mut seen = HashSet::new();
		let mut current = self.node(id);
		while let Some(node) = current {
			if !seen.insert(node.id.as_str()) {
				warn!("parent chain of {id} loops back to {}", node.id);
				break;
			}
			labels.push(node.data.label.clone());
			current = node.parent_id().and_then(|p| self.node(p));
		}
		labels.reverse();
		labels
	}

	/// Adds records after the existing ones, keeping their relative order.
	pub fn append(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) {
		for node in nodes {
			if self.index.contains_key(&node.id) {
				warn!("appending node with duplicate id {}", node.id);
			}
			self.index.insert(node.id.clone(), self.nodes.len());
			self.nodes.push(node);
		}
		self.edges.extend(edges);
	}

	/// Relabels one node. Returns `false` when the node no longer exists.
	pub fn replace_label(&mut self, id: &str, label: impl Into<String>) -> bool {
		let Some(&i) = self.index.get(id) else {
			debug!("label for missing node {id} dropped");
			return false;
		};
		match self.nodes.get_mut(i) {
			Some(node) => {
				node.data.label = label.into();
				true
			}
			None => false,
		}
	}

	pub fn move_node(&mut self, id: &str, position: Position) -> bool {
		match self.index.get(id).and_then(|&i| self.nodes.get_mut(i)) {
			Some(node) => {
				node.position = position;
				true
			}
			None => false,
		}
	}

	/// Adds a user-drawn edge. Self loops, unknown endpoints and duplicates of
	/// an existing source/target pair are rejected.
	pub fn connect(&mut self, source: &str, target: &str) -> Option<String> {
		if source == target || !self.contains(source) || !self.contains(target) {
			return None;
		}
		if self
			.edges
			.iter()
			.any(|e| e.source == source && e.target == target)
		{
			return None;
		}
		let id = new_id();
		self.edges.push(Edge::new(id.clone(), source, target));
		Some(id)
	}

	/// Removes a node and every edge touching it. Children keep their parent id
	/// and become dangling. Parentless nodes are kept; `reset` clears the tree.
	pub fn remove_node(&mut self, id: &str) -> bool {
		match self.node(id) {
			None => return false,
			Some(node) if node.parent_id().is_none() => {
				debug!("refusing to remove root {id}");
				return false;
			}
			Some(_) => {}
		}
		let nodes = self.nodes.drain(..).filter(|n| n.id != id).collect();
		let edges = self
			.edges
			.drain(..)
			.filter(|e| e.source != id && e.target != id)
			.collect();
		self.replace_all(nodes, edges);
		true
	}

	pub fn remove_edge(&mut self, id: &str) -> bool {
		let before = self.edges.len();
		self.edges.retain(|e| e.id != id);
		self.edges.len() != before
	}

	/// Discards everything and installs a single root node.
	pub fn reset(&mut self, root_label: Option<&str>) {
		let label = root_label
			.map(str::trim)
			.filter(|l| !l.is_empty())
			.unwrap_or(DEFAULT_ROOT_LABEL);
		self.replace_all(vec![Node::root(new_id(), label, ROOT_POSITION)], Vec::new());
	}

	pub fn replace_all(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) {
		self.index = nodes
			.iter()
			.enumerate()
			.map(|(i, n)| (n.id.clone(), i))
			.collect();
		self.nodes = nodes;
		self.edges = edges;
	}

	pub fn snapshot(&self, viewport: Viewport) -> GraphSnapshot {
		GraphSnapshot {
			nodes: self.nodes.clone(),
			edges: self.edges.clone(),
			viewport: Some(viewport),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn chain() -> (GraphStore, [String; 4]) {
		let mut store = GraphStore::new(Some("root"));
		let root = store.root().map(|n| n.id.clone()).unwrap();
		store.append(
			vec![
				Node::child("a", root.clone(), "A", Position::new(0.0, 200.0)),
				Node::child("b", "a", "B", Position::new(0.0, 300.0)),
				Node::child("n", "b", "N", Position::new(0.0, 400.0)),
			],
			vec![
				Edge::new("e1", root.clone(), "a"),
				Edge::new("e2", "a", "b"),
				Edge::new("e3", "b", "n"),
			],
		);
		(store, [root, "a".into(), "b".into(), "n".into()])
	}

	#[test]
	fn new_store_holds_only_the_root() {
		let store = GraphStore::default();
		assert_eq!(store.nodes().len(), 1);
		assert!(store.edges().is_empty());
		let root = store.root().unwrap();
		assert_eq!(root.label(), DEFAULT_ROOT_LABEL);
		assert_eq!(root.position, ROOT_POSITION);
		assert_eq!(root.kind, Some(crate::tree::NodeKind::Input));
	}

	#[test]
	fn reset_discards_any_graph() {
		let (mut store, _) = chain();
		assert_eq!(store.nodes().len(), 4);
		store.reset(Some("fresh"));
		assert_eq!(store.nodes().len(), 1);
		assert!(store.edges().is_empty());
		assert_eq!(store.root().unwrap().label(), "fresh");
		assert!(store.node("a").is_none());
	}

	#[test]
	fn blank_root_label_falls_back_to_default() {
		let store = GraphStore::new(Some("   "));
		assert_eq!(store.root().unwrap().label(), DEFAULT_ROOT_LABEL);
	}

	#[test]
	fn append_keeps_existing_records_in_order() {
		let (store, [root, ..]) = chain();
		let ids: Vec<&str> = store.nodes().iter().map(|n| n.id.as_str()).collect();
		assert_eq!(ids, vec![root.as_str(), "a", "b", "n"]);
		assert_eq!(store.edges().len(), 3);
		assert_eq!(store.node("b").unwrap().label(), "B");
	}

	#[test]
	fn ancestor_labels_run_root_first() {
		let (store, _) = chain();
		assert_eq!(store.ancestor_labels("n"), vec!["root", "A", "B", "N"]);
		assert!(store.ancestor_labels("missing").is_empty());
	}

	#[test]
	fn ancestor_walk_stops_at_dangling_parent() {
		let mut store = GraphStore::new(None);
		store.append(
			vec![
				Node::child("x", "gone", "X", Position::default()),
				Node::child("y", "x", "Y", Position::default()),
			],
			Vec::new(),
		);
		assert_eq!(store.ancestor_labels("y"), vec!["X", "Y"]);
	}

	#[test]
	fn ancestor_walk_survives_cycles() {
		let mut store = GraphStore::new(None);
		store.replace_all(
			vec![
				Node::child("p", "q", "P", Position::default()),
				Node::child("q", "p", "Q", Position::default()),
			],
			Vec::new(),
		);
		assert_eq!(store.ancestor_labels("p"), vec!["Q", "P"]);
	}

	#[test]
	fn replace_label_touches_one_node() {
		let (mut store, [root, ..]) = chain();
		assert!(store.replace_label("a", "renamed"));
		assert_eq!(store.node("a").unwrap().label(), "renamed");
		assert_eq!(store.node("b").unwrap().label(), "B");
		assert_eq!(store.node(&root).unwrap().label(), "root");
	}

	#[test]
	fn replace_label_on_missing_node_is_a_no_op() {
		let (mut store, _) = chain();
		store.reset(None);
		assert!(!store.replace_label("a", "late"));
		assert_eq!(store.nodes().len(), 1);
		assert!(store.node("a").is_none());
	}

	#[test]
	fn replace_all_rebuilds_the_index() {
		let (mut store, _) = chain();
		store.replace_all(
			vec![Node::root("r2", "other", Position::default())],
			Vec::new(),
		);
		assert!(store.node("a").is_none());
		assert_eq!(store.node("r2").unwrap().label(), "other");
	}

	#[test]
	fn children_are_found_by_parent_id() {
		let (store, [root, ..]) = chain();
		let children: Vec<&str> = store.children_of(&root).map(|n| n.id.as_str()).collect();
		assert_eq!(children, vec!["a"]);
	}

	#[test]
	fn connect_rejects_loops_unknown_and_duplicates() {
		let (mut store, [root, ..]) = chain();
		assert!(store.connect("a", "a").is_none());
		assert!(store.connect("a", "nowhere").is_none());
		assert!(store.connect(&root, "a").is_none());
		let id = store.connect(&root, "n").unwrap();
		assert_eq!(store.edges().len(), 4);
		let edge = store.edges().last().unwrap();
		assert_eq!(
			(edge.id.as_str(), edge.source.as_str(), edge.target.as_str()),
			(id.as_str(), root.as_str(), "n")
		);
		assert!(store.connect(&root, "n").is_none());
	}

	#[test]
	fn move_node_updates_position() {
		let (mut store, _) = chain();
		assert!(store.move_node("b", Position::new(7.0, 9.0)));
		assert_eq!(store.node("b").unwrap().position, Position::new(7.0, 9.0));
		assert!(!store.move_node("nope", Position::default()));
	}

	#[test]
	fn remove_node_drops_incident_edges_and_reindexes() {
		let (mut store, [root, ..]) = chain();
		assert!(store.remove_node("a"));
		let ids: Vec<&str> = store.nodes().iter().map(|n| n.id.as_str()).collect();
		assert_eq!(ids, vec![root.as_str(), "b", "n"]);
		let edges: Vec<&str> = store.edges().iter().map(|e| e.id.as_str()).collect();
		assert_eq!(edges, vec!["e3"]);
		assert!(store.node("a").is_none());
		for id in [root.as_str(), "b", "n"] {
			assert_eq!(store.node(id).unwrap().id, id);
		}
		assert_eq!(store.ancestor_labels("n"), vec!["B", "N"]);
		assert!(!store.remove_node("a"));
	}

	#[test]
	fn removed_nodes_ignore_later_labels() {
		let (mut store, _) = chain();
		assert!(store.remove_node("b"));
		assert!(!store.replace_label("b", "late"));
		assert_eq!(store.nodes().len(), 3);
		assert!(store.node("b").is_none());
		assert_eq!(store.node("n").unwrap().label(), "N");
	}

	#[test]
	fn root_is_not_removed() {
		let (mut store, [root, ..]) = chain();
		assert!(!store.remove_node(&root));
		assert_eq!(store.nodes().len(), 4);
		assert_eq!(store.root().unwrap().id, root);
	}

	#[test]
	fn remove_edge_keeps_nodes() {
		let (mut store, _) = chain();
		assert!(store.remove_edge("e2"));
		assert!(!store.remove_edge("e2"));
		assert_eq!(store.edges().len(), 2);
		assert_eq!(store.nodes().len(), 4);
		assert!(store.connect("a", "b").is_some());
	}
}
