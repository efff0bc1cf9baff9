//! The role tree: node/edge model, the graph store, node expansion and JSON persistence.

mod expansion;
pub mod ids;
mod model;
mod persistence;
mod store;

pub use expansion::{LOADING_LABEL, expand};
pub use model::{Node, NodeKind, Position, Viewport};
pub use persistence::{EXPORT_FILE_NAME, export_document, import_document};
pub use store::{DEFAULT_ROOT_LABEL, GraphStore};
