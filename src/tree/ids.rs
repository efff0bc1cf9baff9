//! Identifier generation for nodes and edges.

use uuid::Uuid;

/// A fresh random identifier, unique for the lifetime of the session.
pub fn new_id() -> String {
	Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use super::*;

	#[test]
	fn ids_do_not_repeat() {
		let ids: HashSet<String> = (0..1000).map(|_| new_id()).collect();
		assert_eq!(ids.len(), 1000);
	}
}
