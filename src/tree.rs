pub mod graph;
pub mod node;

pub use graph::{DanglingTarget, Graph, TreeExport};
pub use node::{Node, NodeKind, NodeOption};

/// Id of the node every decision tree is entered through.
pub const START_NODE_ID: &str = "start";
