use std::collections::{HashMap, HashSet, VecDeque};

use anyhow::Result;
use log::{debug, warn};
use serde::Serialize;

use crate::tree::node::Node;
use crate::tree::START_NODE_ID;

/// The full extracted tree: nodes in delivery order plus an id index.
///
/// Read-only once built. Options may point at ids that are not in the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    nodes: Vec<Node>,
    index: HashMap<String, usize>,
}

/// An option whose target id does not resolve to a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingTarget<'a> {
    pub source: &'a str,
    pub label: &'a str,
    pub target: &'a str,
}

/// Export artifact body: `{ "nodes": [...] }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeExport {
    pub nodes: Vec<Node>,
}

impl Graph {
    /// Build a graph from extracted nodes. The first node with a given id
    /// wins; later duplicates are dropped. Fails without a `start` node.
    pub fn new(nodes: Vec<Node>) -> Result<Self> {
        let mut kept = Vec::with_capacity(nodes.len());
        let mut index = HashMap::new();
        for node in nodes {
            if index.contains_key(&node.id) {
                warn!("Duplicate node id '{}' dropped", node.id);
                continue;
            }
            index.insert(node.id.clone(), kept.len());
            kept.push(node);
        }

        if !index.contains_key(START_NODE_ID) {
            anyhow::bail!(
                "decision tree has no '{START_NODE_ID}' node (ids: {:?})",
                kept.iter().map(|n| n.id.as_str()).collect::<Vec<_>>()
            );
        }

        debug!("Graph built with {} nodes", kept.len());
        Ok(Self { nodes: kept, index })
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn start(&self) -> Option<&Node> {
        self.get(START_NODE_ID)
    }

    /// All nodes in the order the extractor delivered them.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Ids reachable from `start`, breadth first. Cycles are visited once.
    pub fn reachable(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut order = Vec::new();
        let mut queue = VecDeque::from([START_NODE_ID]);

        while let Some(id) = queue.pop_front() {
            let Some(node) = self.get(id) else {
                continue;
            };
            if !seen.insert(node.id.as_str()) {
                continue;
            }
            order.push(node.id.as_str());
            queue.extend(node.options.iter().map(|o| o.target.as_str()));
        }

        order
    }

    /// Options pointing at ids the graph does not contain.
    pub fn dangling_targets(&self) -> Vec<DanglingTarget<'_>> {
        self.nodes
            .iter()
            .flat_map(move |node| {
                node.options
                    .iter()
                    .filter(move |o| !self.contains(&o.target))
                    .map(move |o| DanglingTarget {
                        source: &node.id,
                        label: &o.label,
                        target: &o.target,
                    })
            })
            .collect()
    }

    /// The full node set for persistence, independent of any exploration.
    pub fn export(&self) -> TreeExport {
        TreeExport {
            nodes: self.nodes.clone(),
        }
    }
}
