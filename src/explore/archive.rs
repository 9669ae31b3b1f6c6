use log::{debug, info, warn};

use crate::explore::state::{BranchKey, ExplorationState};
use crate::explore::Transition;

impl ExplorationState {
    /// Swap the branch active at an archive's source node for the archived
    /// one. The displaced branch is archived under its own label, so the swap
    /// can be undone by toggling back.
    ///
    /// Away from the source node this only focuses it (when it is on the
    /// active path) and leaves the archive entry in place.
    pub fn toggle_collapsed_branch(&mut self, key: &BranchKey) -> Transition {
        let Some(source) = self.archived(key).map(|b| b.source_node_id.clone()) else {
            debug!("No archived branch under {key}");
            return Transition::Unchanged;
        };

        if self.current_node_id != source {
            debug!("Toggle {key} requested away from '{source}', focusing it first");
            return match self.navigate_to_node(&source) {
                Transition::Navigated => Transition::Focused,
                other => other,
            };
        }

        let Some(index) = self.history_index(&source) else {
            warn!("Branch point '{source}' is missing from the history, ignoring {key}");
            return Transition::Unchanged;
        };
        let Some(branch) = self.collapsed_branches.remove(key) else {
            return Transition::Unchanged;
        };

        let displaced = match self.selected_options.get(&source).cloned() {
            Some(current) => self.archive_downstream(&source, &current, index),
            None => None,
        };

        self.selected_options
            .insert(source.clone(), branch.option.clone());
        self.truncate_after(index);
        self.node_history.extend(branch.node_history.iter().cloned());
        for id in branch.path_nodes.iter().chain(&branch.node_history) {
            self.push_path(id);
        }
        self.current_node_id = branch.node_history.last().cloned().unwrap_or(source);

        info!(
            "Restored {key}, now at '{}'{}",
            self.current_node_id,
            displaced
                .as_ref()
                .map(|k| format!(" (archived {k})"))
                .unwrap_or_default()
        );

        Transition::Restored {
            archived: displaced,
        }
    }
}
