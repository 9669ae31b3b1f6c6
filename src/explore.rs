//! Exploration of a decision tree: per-page state, the branch archive, and
//! the commands a renderer issues against them.

pub mod archive;
pub mod navigate;
pub mod state;
pub mod view;

use log::debug;

use crate::tree::{Graph, NodeOption};

pub use state::{ArchivedBranch, BranchKey, ExplorationState};
pub use view::{OptionView, PathEntry, PathView};

/// A user action, as issued by whatever renders the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Choose `option` at `source`, or at the current node when `source` is
    /// `None`.
    SelectOption {
        source: Option<String>,
        option: NodeOption,
    },
    /// Look at a node that is already on the active path.
    NavigateTo { node: String },
    /// Swap the active branch at a node for an archived one.
    ToggleBranch { key: BranchKey },
    Restart,
    /// Presentation flag only; navigation ignores it.
    SetExpanded(bool),
}

/// What a command did to the state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Unchanged,
    /// A new choice was recorded. `archived` names the branch it displaced.
    Selected { archived: Option<BranchKey> },
    /// Only `current_node_id` moved.
    Navigated,
    /// An archived branch became active. `archived` names the branch it
    /// displaced.
    Restored { archived: Option<BranchKey> },
    /// The branch point of a toggle was brought into focus; the toggle itself
    /// has to be issued again from there.
    Focused,
    Restarted,
    ExpandedChanged,
}

impl Transition {
    pub fn is_change(&self) -> bool {
        !matches!(self, Transition::Unchanged)
    }
}

impl ExplorationState {
    /// Run one command against this state.
    pub fn apply(&mut self, graph: &Graph, command: Command) -> Transition {
        debug!("Applying {command:?}");
        match command {
            Command::SelectOption { source, option } => {
                self.select_option(graph, &option, source.as_deref())
            }
            Command::NavigateTo { node } => self.navigate_to_node(&node),
            Command::ToggleBranch { key } => self.toggle_collapsed_branch(&key),
            Command::Restart => self.restart(),
            Command::SetExpanded(expanded) => self.set_expanded(expanded),
        }
    }
}

/// Consume a state, run `command` against it, and hand the result back.
pub fn apply(mut state: ExplorationState, graph: &Graph, command: Command) -> ExplorationState {
    state.apply(graph, command);
    state
}
