use log::{info, warn};
use thiserror::Error;

use super::model::{GraphSnapshot, Viewport};
use super::store::GraphStore;

/// File name offered for exported trees.
pub const EXPORT_FILE_NAME: &str = "flow-data.json";

#[derive(Debug, Error)]
pub enum PersistenceError {
	#[error("invalid tree document: {0}")]
	Json(#[from] serde_json::Error),
}

/// Pretty-printed JSON (2-space indentation) of a snapshot.
pub fn export_document(snapshot: &GraphSnapshot) -> Result<String, PersistenceError> {
	Ok(serde_json::to_string_pretty(snapshot)?)
}

pub fn parse_document(text: &str) -> Result<GraphSnapshot, PersistenceError> {
	Ok(serde_json::from_str(text)?)
}

/// Replaces the store's contents with the parsed document.
///
/// The whole document is parsed before the store is touched, so a bad file
/// leaves the current tree as it was. Returns the viewport stored in the file,
/// if any.
pub fn import_document(
	store: &mut GraphStore,
	text: &str,
) -> Result<Option<Viewport>, PersistenceError> {
	let snapshot = parse_document(text).inspect_err(|e| warn!("import rejected: {e}"))?;
	info!(
		"importing {} nodes and {} edges",
		snapshot.nodes.len(),
		snapshot.edges.len()
	);
	store.replace_all(snapshot.nodes, snapshot.edges);
	Ok(snapshot.viewport)
}
