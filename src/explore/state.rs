use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use anyhow::Context;
use log::debug;
use serde::{Serialize, Serializer};

use crate::tree::START_NODE_ID;

// ---------------------------------------------------------------------------
// Branch archive
// ---------------------------------------------------------------------------

/// Addresses an archived branch: the node it hangs off and the option that
/// led into it. Written as `source:option`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BranchKey {
    source: String,
    option: String,
}

impl BranchKey {
    pub fn new(source: impl Into<String>, option: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            option: option.into(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn option(&self) -> &str {
        &self.option
    }
}

impl fmt::Display for BranchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source, self.option)
    }
}

/// Splits at the first `:`, so option labels may contain colons.
impl FromStr for BranchKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (source, option) = s
            .split_once(':')
            .with_context(|| format!("branch key '{s}' is not of the form <node>:<option>"))?;
        Ok(Self::new(source, option))
    }
}

impl Serialize for BranchKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A downstream sub-path that was abandoned when another option was chosen
/// at `source_node_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchivedBranch {
    pub source_node_id: String,
    pub option: String,
    pub path_nodes: Vec<String>,
    pub node_history: Vec<String>,
}

// ---------------------------------------------------------------------------
// Exploration state
// ---------------------------------------------------------------------------

/// Per-page record of where the user is in a decision tree and how they got
/// there. Only the navigation operations mutate it.
///
/// Invariants: `path_nodes` starts with `start`, holds no duplicates, and
/// contains `current_node_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorationState {
    pub(crate) current_node_id: String,
    /// Active branch from `start` to the deepest explored node.
    pub(crate) path_nodes: Vec<String>,
    /// Every value `current_node_id` took through selections, in order.
    pub(crate) node_history: Vec<String>,
    pub(crate) selected_options: BTreeMap<String, String>,
    pub(crate) collapsed_branches: BTreeMap<BranchKey, ArchivedBranch>,
    pub(crate) expanded: bool,
}

impl Default for ExplorationState {
    fn default() -> Self {
        Self::new()
    }
}

impl ExplorationState {
    pub fn new() -> Self {
        Self {
            current_node_id: START_NODE_ID.to_string(),
            path_nodes: vec![START_NODE_ID.to_string()],
            node_history: vec![START_NODE_ID.to_string()],
            selected_options: BTreeMap::new(),
            collapsed_branches: BTreeMap::new(),
            expanded: true,
        }
    }

    pub fn current_node_id(&self) -> &str {
        &self.current_node_id
    }

    pub fn path_nodes(&self) -> &[String] {
        &self.path_nodes
    }

    pub fn node_history(&self) -> &[String] {
        &self.node_history
    }

    pub fn selected_option(&self, node_id: &str) -> Option<&str> {
        self.selected_options.get(node_id).map(String::as_str)
    }

    pub fn selected_options(&self) -> &BTreeMap<String, String> {
        &self.selected_options
    }

    pub fn collapsed_branches(&self) -> &BTreeMap<BranchKey, ArchivedBranch> {
        &self.collapsed_branches
    }

    pub fn archived(&self, key: &BranchKey) -> Option<&ArchivedBranch> {
        self.collapsed_branches.get(key)
    }

    /// Archived alternatives hanging off `node_id`.
    pub fn archives_at<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a BranchKey> {
        self.collapsed_branches
            .keys()
            .filter(move |key| key.source == node_id)
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn is_on_path(&self, node_id: &str) -> bool {
        self.path_nodes.iter().any(|id| id == node_id)
    }

    // -- helpers shared by the navigation operations ------------------------

    /// First position of `node_id` in the history.
    pub(crate) fn history_index(&self, node_id: &str) -> Option<usize> {
        self.node_history.iter().position(|id| id == node_id)
    }

    pub(crate) fn has_downstream(&self, index: usize) -> bool {
        index + 1 < self.node_history.len()
    }

    /// Path and history entries that lie beyond history position `index`.
    fn downstream_of(&self, index: usize) -> (Vec<String>, Vec<String>) {
        let prefix = &self.node_history[..=index];
        let path = self
            .path_nodes
            .iter()
            .filter(|id| !prefix.contains(*id))
            .cloned()
            .collect();
        let history = self.node_history[index + 1..].to_vec();
        (path, history)
    }

    /// Store everything beyond history position `index` under
    /// `source:option`. Nothing is written for an empty suffix.
    pub(crate) fn archive_downstream(
        &mut self,
        source: &str,
        option: &str,
        index: usize,
    ) -> Option<BranchKey> {
        let (path_nodes, node_history) = self.downstream_of(index);
        if node_history.is_empty() {
            debug!("Nothing downstream of '{source}' to archive under '{option}'");
            return None;
        }

        let key = BranchKey::new(source, option);
        debug!("Archiving {key}: path={path_nodes:?} history={node_history:?}");
        self.collapsed_branches.insert(
            key.clone(),
            ArchivedBranch {
                source_node_id: source.to_string(),
                option: option.to_string(),
                path_nodes,
                node_history,
            },
        );
        Some(key)
    }

    /// Cut the history after position `index` and drop path entries that no
    /// longer occur in it.
    pub(crate) fn truncate_after(&mut self, index: usize) {
        self.node_history.truncate(index + 1);
        let history = &self.node_history;
        self.path_nodes.retain(|id| history.contains(id));
    }

    pub(crate) fn push_path(&mut self, node_id: &str) {
        if !self.is_on_path(node_id) {
            self.path_nodes.push(node_id.to_string());
        }
    }
}
