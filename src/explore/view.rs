//! Read-only projection of an exploration for renderers.
//!
//! A renderer never touches [`ExplorationState`] directly: it builds a
//! [`PathView`], draws it, and turns user input back into
//! [`Command`](crate::explore::Command)s.

use std::collections::HashSet;

use crate::explore::state::{BranchKey, ExplorationState};
use crate::tree::{Graph, Node, NodeOption};

/// One option of a node on the active path.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionView<'a> {
    pub option: &'a NodeOption,
    pub is_selected: bool,
    /// Set when a branch taken through this option is archived. Renderers
    /// offer "restore" instead of "select" for such options.
    pub archived: Option<&'a BranchKey>,
}

/// One node of the active path.
#[derive(Debug, Clone, PartialEq)]
pub struct PathEntry<'a> {
    pub id: &'a str,
    /// `None` when the id does not resolve; render it as "no content".
    pub node: Option<&'a Node>,
    /// Position in the active path, used for indentation.
    pub level: usize,
    pub is_current: bool,
    /// Reached no later than the current node. Only active entries offer
    /// their options.
    pub is_active: bool,
    pub selected: Option<&'a str>,
    /// Archive key for the selected label, when one exists.
    pub restorable: Option<&'a BranchKey>,
    pub options: Vec<OptionView<'a>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PathView<'a> {
    pub entries: Vec<PathEntry<'a>>,
    pub current: &'a str,
    pub expanded: bool,
    pub archived: Vec<&'a BranchKey>,
}

impl<'a> PathView<'a> {
    pub fn build(state: &'a ExplorationState, graph: &'a Graph) -> Self {
        let current_index = state.history_index(state.current_node_id());
        let mut seen = HashSet::new();
        let mut entries = Vec::new();

        for (history_index, id) in state.node_history().iter().enumerate() {
            let Some(level) = state.path_nodes().iter().position(|p| p == id) else {
                continue;
            };
            if !seen.insert(id.as_str()) {
                continue;
            }

            let is_current = id == state.current_node_id();
            let is_active = is_current || current_index.is_some_and(|c| history_index <= c);
            let node = graph.get(id);
            let selected = state.selected_option(id);

            let options = match node {
                Some(node) if is_active => node
                    .options
                    .iter()
                    .map(|option| OptionView {
                        option,
                        is_selected: selected == Some(option.label.as_str()),
                        archived: archive_key(state, id, &option.label),
                    })
                    .collect(),
                _ => Vec::new(),
            };

            entries.push(PathEntry {
                id,
                node,
                level,
                is_current,
                is_active,
                selected,
                restorable: selected.and_then(|label| archive_key(state, id, label)),
                options,
            });
        }

        entries.sort_by_key(|e| e.level);

        Self {
            entries,
            current: state.current_node_id(),
            expanded: state.is_expanded(),
            archived: state.collapsed_branches().keys().collect(),
        }
    }

    pub fn current_entry(&self) -> Option<&PathEntry<'a>> {
        self.entries.iter().find(|e| e.is_current)
    }
}

fn archive_key<'a>(state: &'a ExplorationState, node_id: &str, label: &str) -> Option<&'a BranchKey> {
    state
        .collapsed_branches()
        .get_key_value(&BranchKey::new(node_id, label))
        .map(|(key, _)| key)
}
