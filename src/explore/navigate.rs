use log::{debug, info, warn};

use crate::explore::state::ExplorationState;
use crate::explore::Transition;
use crate::tree::{Graph, NodeOption};

impl ExplorationState {
    /// Record `option` as the choice at `source` (or at the current node) and
    /// move to its target.
    ///
    /// When `source` already occurs in the history this is a revision: the
    /// history is cut back to it, and the branch that hung off the previous,
    /// different choice is archived first. Re-choosing the label already
    /// selected there keeps the existing downstream branch.
    pub fn select_option(
        &mut self,
        graph: &Graph,
        option: &NodeOption,
        source: Option<&str>,
    ) -> Transition {
        let from = source.map_or_else(|| self.current_node_id.clone(), str::to_string);
        let mut archived = None;

        if let Some(index) = source.and_then(|s| self.history_index(s)) {
            let previous = self.selected_options.get(&from).cloned();
            match previous {
                Some(previous) if previous == option.label && self.has_downstream(index) => {
                    debug!("'{}' already chosen at '{from}', keeping its branch", option.label);
                    if option.target != self.current_node_id && self.is_on_path(&option.target) {
                        self.current_node_id = option.target.clone();
                        return Transition::Navigated;
                    }
                    return Transition::Unchanged;
                }
                Some(previous) if previous != option.label => {
                    archived = self.archive_downstream(&from, &previous, index);
                }
                _ => {}
            }
            self.truncate_after(index);
        }

        if !graph.contains(&option.target) {
            warn!(
                "Option '{}' at '{from}' points at unknown node '{}'",
                option.label, option.target
            );
        }

        self.selected_options
            .insert(from.clone(), option.label.clone());
        self.current_node_id = option.target.clone();
        self.push_path(&option.target);
        self.node_history.push(option.target.clone());

        info!(
            "Transition: {from} -> {} (option: {}{})",
            option.target,
            option.label,
            archived
                .as_ref()
                .map(|key| format!(", archived {key}"))
                .unwrap_or_default()
        );

        Transition::Selected { archived }
    }

    /// Look at a node already on the active path. Anything else is a no-op.
    pub fn navigate_to_node(&mut self, node_id: &str) -> Transition {
        if node_id == self.current_node_id {
            return Transition::Unchanged;
        }
        if !self.is_on_path(node_id) {
            debug!("'{node_id}' is not on the active path, staying at '{}'", self.current_node_id);
            return Transition::Unchanged;
        }

        info!("Navigate: {} -> {node_id}", self.current_node_id);
        self.current_node_id = node_id.to_string();
        Transition::Navigated
    }

    /// Throw the whole exploration away and stand at `start` again.
    pub fn restart(&mut self) -> Transition {
        info!("Restarting exploration");
        *self = ExplorationState::new();
        Transition::Restarted
    }

    pub fn set_expanded(&mut self, expanded: bool) -> Transition {
        if self.expanded == expanded {
            return Transition::Unchanged;
        }
        self.expanded = expanded;
        Transition::ExpandedChanged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explore::BranchKey;
    use crate::tree::{Node, NodeKind};

    fn graph() -> Graph {
        Graph::new(vec![
            Node::new("start", NodeKind::Decision, "Begin?").with_option("Yes", "n1"),
            Node::new("n1", NodeKind::Decision, "Next?")
                .with_option("No", "n2")
                .with_option("Maybe", "n3"),
            Node::new("n2", NodeKind::End, "Done."),
            Node::new("n3", NodeKind::Decision, "Go on?").with_option("Ok", "n4"),
            Node::new("n4", NodeKind::End, "Finished."),
        ])
        .unwrap()
    }

    fn assert_invariants(state: &ExplorationState) {
        assert_eq!(state.path_nodes()[0], "start");
        assert!(state.is_on_path(state.current_node_id()));
        let mut seen = std::collections::HashSet::new();
        assert!(state.path_nodes().iter().all(|id| seen.insert(id)));
    }

    fn straight_line() -> ExplorationState {
        let graph = graph();
        let mut state = ExplorationState::new();
        state.select_option(&graph, &NodeOption::new("Yes", "n1"), None);
        state.select_option(&graph, &NodeOption::new("No", "n2"), None);
        state
    }

    #[test]
    fn test_straight_line_path() {
        let state = straight_line();
        assert_eq!(state.path_nodes(), ["start", "n1", "n2"]);
        assert_eq!(state.node_history(), ["start", "n1", "n2"]);
        assert_eq!(state.current_node_id(), "n2");
        assert_eq!(state.selected_option("start"), Some("Yes"));
        assert_eq!(state.selected_option("n1"), Some("No"));
        assert_invariants(&state);
    }

    #[test]
    fn test_revision_archives_abandoned_branch() {
        let graph = graph();
        let mut state = straight_line();

        let transition = state.select_option(&graph, &NodeOption::new("Maybe", "n3"), Some("n1"));

        let key = BranchKey::new("n1", "No");
        assert_eq!(
            transition,
            Transition::Selected {
                archived: Some(key.clone())
            }
        );
        let branch = state.archived(&key).unwrap();
        assert_eq!(branch.path_nodes, ["n2"]);
        assert_eq!(branch.node_history, ["n2"]);
        assert_eq!(state.path_nodes(), ["start", "n1", "n3"]);
        assert_eq!(state.node_history(), ["start", "n1", "n3"]);
        assert_eq!(state.current_node_id(), "n3");
        assert_eq!(state.selected_option("n1"), Some("Maybe"));
        assert_invariants(&state);
    }

    #[test]
    fn test_revision_at_start_keeps_deep_branch() {
        let graph = graph();
        let mut state = ExplorationState::new();
        state.select_option(&graph, &NodeOption::new("Yes", "n1"), None);
        state.select_option(&graph, &NodeOption::new("Maybe", "n3"), None);
        state.select_option(&graph, &NodeOption::new("Ok", "n4"), None);

        state.select_option(&graph, &NodeOption::new("Skip", "n2"), Some("start"));

        let branch = state.archived(&BranchKey::new("start", "Yes")).unwrap();
        assert_eq!(branch.path_nodes, ["n1", "n3", "n4"]);
        assert_eq!(branch.node_history, ["n1", "n3", "n4"]);
        assert_eq!(state.path_nodes(), ["start", "n2"]);
        assert_invariants(&state);
    }

    #[test]
    fn test_same_label_keeps_downstream_branch() {
        let graph = graph();
        let mut state = straight_line();
        state.navigate_to_node("start");
        let before = state.clone();

        let transition = state.select_option(&graph, &NodeOption::new("Yes", "n1"), Some("start"));

        assert_eq!(transition, Transition::Navigated);
        assert!(state.collapsed_branches().is_empty());
        assert_eq!(state.path_nodes(), before.path_nodes());
        assert_eq!(state.node_history(), before.node_history());
        assert_eq!(state.current_node_id(), "n1");
    }

    #[test]
    fn test_same_label_without_downstream_appends_target() {
        let graph = graph();
        let mut state = ExplorationState::new();
        state.selected_options.insert("start".into(), "Yes".into());

        let transition = state.select_option(&graph, &NodeOption::new("Yes", "n1"), Some("start"));

        assert_eq!(transition, Transition::Selected { archived: None });
        assert_eq!(state.path_nodes(), ["start", "n1"]);
    }

    #[test]
    fn test_explicit_source_at_frontier_extends_path() {
        let graph = graph();
        let mut state = ExplorationState::new();
        state.select_option(&graph, &NodeOption::new("Yes", "n1"), Some("start"));
        state.select_option(&graph, &NodeOption::new("No", "n2"), Some("n1"));

        assert_eq!(state.path_nodes(), ["start", "n1", "n2"]);
        assert!(state.collapsed_branches().is_empty());
    }

    #[test]
    fn test_unknown_target_is_tolerated() {
        let graph = graph();
        let mut state = ExplorationState::new();

        let transition = state.select_option(&graph, &NodeOption::new("Yes", "ghost"), None);

        assert_eq!(transition, Transition::Selected { archived: None });
        assert_eq!(state.current_node_id(), "ghost");
        assert_eq!(state.path_nodes(), ["start", "ghost"]);
        assert_invariants(&state);
    }

    #[test]
    fn test_loop_back_to_path_node_does_not_duplicate() {
        let graph = graph();
        let mut state = ExplorationState::new();
        state.select_option(&graph, &NodeOption::new("Yes", "n1"), None);
        state.select_option(&graph, &NodeOption::new("Back", "start"), None);

        assert_eq!(state.path_nodes(), ["start", "n1"]);
        assert_eq!(state.node_history(), ["start", "n1", "start"]);
        assert_eq!(state.current_node_id(), "start");
        assert_invariants(&state);
    }

    #[test]
    fn test_navigate_to_current_is_identity() {
        let mut state = straight_line();
        let before = state.clone();
        assert_eq!(state.navigate_to_node("n2"), Transition::Unchanged);
        assert_eq!(state, before);
    }

    #[test]
    fn test_navigate_off_path_is_noop() {
        let mut state = straight_line();
        let before = state.clone();
        assert_eq!(state.navigate_to_node("n3"), Transition::Unchanged);
        assert_eq!(state, before);
    }

    #[test]
    fn test_navigate_moves_only_current() {
        let mut state = straight_line();
        assert_eq!(state.navigate_to_node("n1"), Transition::Navigated);
        assert_eq!(state.current_node_id(), "n1");
        assert_eq!(state.path_nodes(), ["start", "n1", "n2"]);
        assert_eq!(state.node_history(), ["start", "n1", "n2"]);
    }

    #[test]
    fn test_restart_after_revisions() {
        let graph = graph();
        let mut state = straight_line();
        state.select_option(&graph, &NodeOption::new("Maybe", "n3"), Some("n1"));
        state.set_expanded(false);

        state.restart();

        assert_eq!(state.current_node_id(), "start");
        assert_eq!(state.path_nodes(), ["start"]);
        assert_eq!(state.node_history(), ["start"]);
        assert!(state.selected_options().is_empty());
        assert!(state.collapsed_branches().is_empty());
        assert!(state.is_expanded());
    }
}
