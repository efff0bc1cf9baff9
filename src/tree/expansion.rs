use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::{RwSignal, Update};
use log::{debug, info, warn};

use super::ids::new_id;
use super::model::{Edge, Node};
use super::store::GraphStore;
use crate::oracle::LabelOracle;
use crate::settings::UserSettings;

pub const LOADING_LABEL: &str = "Loading...";
pub const SIBLING_SPACING: f64 = 160.0;
pub const ROW_HEIGHT: f64 = 100.0;
const CHILDREN_PER_EXPANSION: usize = 3;

/// Serialized access to the graph store.
///
/// Every mutation runs to completion inside `f`. Returns `None` when the store
/// is gone (the page owning it was torn down).
pub trait StoreHandle {
	fn update_store<R>(&self, f: impl FnOnce(&mut GraphStore) -> R) -> Option<R>;
}

impl StoreHandle for RwSignal<GraphStore> {
	fn update_store<R>(&self, f: impl FnOnce(&mut GraphStore) -> R) -> Option<R> {
		self.try_update(f)
	}
}

impl StoreHandle for Rc<RefCell<GraphStore>> {
	fn update_store<R>(&self, f: impl FnOnce(&mut GraphStore) -> R) -> Option<R> {
		Some(f(&mut *self.borrow_mut()))
	}
}

/// One in-flight expansion of a node: the placeholders it reserved and the
/// ancestor path it asks labels for.
#[derive(Clone, Debug, PartialEq)]
pub struct Expansion {
	pub parent_id: String,
	pub placeholder_ids: Vec<String>,
	pub path: Vec<String>,
}

impl Expansion {
	/// Inserts three placeholder children under `node_id` in a single append.
	///
	/// The ancestor path is taken before the append so it reflects the graph as
	/// it was when the node was activated.
	pub fn begin(store: &mut GraphStore, node_id: &str) -> Option<Self> {
		let Some(parent) = store.node(node_id) else {
			warn!("activation of unknown node {node_id} ignored");
			return None;
		};
		let origin = parent.position;
		let path = store.ancestor_labels(node_id);
		let siblings = store.children_of(node_id).count();

		let mut nodes = Vec::with_capacity(CHILDREN_PER_EXPANSION);
		let mut edges = Vec::with_capacity(CHILDREN_PER_EXPANSION);
		for i in 0..CHILDREN_PER_EXPANSION {
			let slot = (siblings + i) as f64 - 1.0;
			let child = Node::child(
				new_id(),
				node_id,
				LOADING_LABEL,
				origin.offset(slot * SIBLING_SPACING, ROW_HEIGHT),
			);
			edges.push(Edge::new(new_id(), node_id, child.id.clone()));
			nodes.push(child);
		}
		let placeholder_ids = nodes.iter().map(|n| n.id.clone()).collect();
		store.append(nodes, edges);
		debug!("placeholders inserted under {node_id} after {siblings} siblings");

		Some(Self {
			parent_id: node_id.to_owned(),
			placeholder_ids,
			path,
		})
	}

	/// Writes labels onto the placeholders in creation order.
	///
	/// Labels are written as returned. Placeholders without a label keep the
	/// placeholder text, surplus labels are dropped, and placeholders removed
	/// in the meantime are skipped. Returns how many nodes were relabelled.
	pub fn commit(&self, store: &mut GraphStore, labels: &[String]) -> usize {
		if labels.len() != self.placeholder_ids.len() {
			warn!(
				"expected {} labels for {}, got {}",
				self.placeholder_ids.len(),
				self.parent_id,
				labels.len()
			);
		}
		let mut committed = 0;
		for (id, label) in self.placeholder_ids.iter().zip(labels) {
			if store.replace_label(id, label.as_str()) {
				committed += 1;
			}
		}
		committed
	}
}

/// Expands `node_id`: placeholders first, then one label request, then the
/// commit. Returns the number of placeholders that received a label, or
/// `None` if nothing was expanded.
pub async fn expand<H, O>(
	store: &H,
	oracle: &O,
	settings: &UserSettings,
	node_id: &str,
) -> Option<usize>
where
	H: StoreHandle,
	O: LabelOracle,
{
	let expansion = store.update_store(|s| Expansion::begin(s, node_id))??;
	info!("expanding {}", expansion.path.join(" > "));

	let labels = oracle.fetch_labels(&settings.api_key, &expansion.path).await;

	let committed = store.update_store(|s| expansion.commit(s, &labels));
	if committed.is_none() {
		debug!("store dropped before labels for {node_id} arrived");
	}
	committed
}
