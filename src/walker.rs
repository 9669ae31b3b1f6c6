//! Terminal front end: draws the active path of one page and turns typed
//! input into navigation commands.

use std::fmt::Write as _;
use std::fs;
use std::io::{self, Write};

use anyhow::{Context, Result};
use log::{info, warn};

use crate::config::ViewerConfig;
use crate::document::Document;
use crate::explore::{BranchKey, Command, ExplorationState, PathView, Transition};
use crate::tree::Graph;

const HELP: &str = "\
  <n>              choose option n at the current node
  <node> <n>       choose option n at an earlier node on the path
  goto <node>      look at a node on the path
  restore <key>    bring back an archived branch (e.g. restore q2:No)
  restart          start over from 'start'
  expand|collapse  show or hide options
  export           write the tree to the export directory
  state            print the exploration state as JSON
  quit             leave";

// ---------------------------------------------------------------------------
// Input parsing
// ---------------------------------------------------------------------------

/// One line of user input, before it is resolved against the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Option `index` (1-based) at `source`, or at the current node.
    Choose { source: Option<String>, index: usize },
    Goto(String),
    Restore(BranchKey),
    Restart,
    SetExpanded(bool),
    Export,
    ShowState,
    Help,
    Quit,
}

pub fn parse_input(line: &str) -> Result<Input> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let input = match words.as_slice() {
        ["quit"] | ["exit"] => Input::Quit,
        ["help"] | ["?"] => Input::Help,
        ["restart"] => Input::Restart,
        ["expand"] => Input::SetExpanded(true),
        ["collapse"] => Input::SetExpanded(false),
        ["export"] => Input::Export,
        ["state"] => Input::ShowState,
        ["goto", node] => Input::Goto(node.to_string()),
        ["restore", ..] => {
            let key = line.trim_start().trim_start_matches("restore").trim();
            Input::Restore(key.parse()?)
        }
        [index] => Input::Choose {
            source: None,
            index: parse_index(index)?,
        },
        [node, index] => Input::Choose {
            source: Some(node.to_string()),
            index: parse_index(index)?,
        },
        _ => anyhow::bail!("unrecognized input '{}' (type 'help')", line.trim()),
    };
    Ok(input)
}

fn parse_index(word: &str) -> Result<usize> {
    match word.parse::<usize>() {
        Ok(0) | Err(_) => anyhow::bail!("'{word}' is not an option number"),
        Ok(n) => Ok(n),
    }
}

/// Turn a numbered choice into a command. Choosing an option whose branch is
/// archived restores that branch instead of selecting it afresh.
pub fn resolve_choice(
    state: &ExplorationState,
    graph: &Graph,
    source: Option<&str>,
    index: usize,
) -> Result<Command> {
    let node_id = source.unwrap_or(state.current_node_id());
    if !state.is_on_path(node_id) {
        anyhow::bail!("'{node_id}' is not on the active path");
    }
    let node = graph
        .get(node_id)
        .with_context(|| format!("'{node_id}' has no content"))?;
    let option = index
        .checked_sub(1)
        .and_then(|i| node.options.get(i))
        .with_context(|| format!("'{node_id}' has no option {index}"))?;

    let key = BranchKey::new(node_id, &option.label);
    if state.archived(&key).is_some() {
        return Ok(Command::ToggleBranch { key });
    }

    Ok(Command::SelectOption {
        source: Some(node_id.to_string()),
        option: option.clone(),
    })
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

pub fn render(view: &PathView<'_>) -> String {
    let mut out = String::new();

    for entry in &view.entries {
        let indent = "  ".repeat(entry.level);
        let marker = if entry.is_current { "*" } else { " " };
        match entry.node {
            Some(node) => {
                let _ = writeln!(out, "{indent}{marker} {} ({})", entry.id, node.kind_label());
                if !node.prompt.is_empty() {
                    let _ = writeln!(out, "{indent}    {}", node.prompt);
                }
            }
            None => {
                let _ = writeln!(out, "{indent}{marker} {} (no content)", entry.id);
            }
        }

        if let Some(selected) = entry.selected {
            let _ = write!(out, "{indent}    Selected: {selected}");
            if let Some(key) = entry.restorable {
                let _ = write!(out, " [archived: {key}]");
            }
            out.push('\n');
        }

        if view.expanded {
            for (i, option) in entry.options.iter().enumerate() {
                let arrow = if option.is_selected { "✓" } else { "→" };
                let _ = write!(
                    out,
                    "{indent}    {}. {arrow} {} ({})",
                    i + 1,
                    option.option.label,
                    option.option.target
                );
                if let Some(key) = option.archived {
                    let _ = write!(out, " [archived: {key}]");
                }
                out.push('\n');
            }
        }
    }

    out
}

fn describe(transition: &Transition) -> Option<String> {
    match transition {
        Transition::Selected {
            archived: Some(key),
        }
        | Transition::Restored {
            archived: Some(key),
        } => Some(format!("(previous branch kept as {key})")),
        Transition::Focused => {
            Some("(moved to the branch point, restore again to swap branches)".into())
        }
        Transition::Unchanged => Some("(nothing changed)".into()),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Session loop
// ---------------------------------------------------------------------------

fn show(document: &Document, page: u32) {
    match document.view(page) {
        Ok(view) => {
            println!("\n--- Page {page} ---");
            print!("{}", render(&view));
            if let Some(entry) = view.current_entry() {
                if entry.node.map_or(true, |n| n.is_terminal()) {
                    println!("\n(End of this path. Choose at an earlier node, or 'restart'.)");
                }
            }
        }
        Err(notice) => println!("{notice}"),
    }
}

fn export(document: &Document, page: u32, config: &ViewerConfig) -> Result<()> {
    let artifact = match document.export(page) {
        Ok(artifact) => artifact,
        Err(notice) => {
            println!("Warning: {notice}");
            return Ok(());
        }
    };
    let path = config.export_dir.join(&artifact.file_name);
    fs::write(&path, artifact.to_json_pretty()?)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!("Exported page {page} to {}", path.display());
    println!("Exported to {}", path.display());
    Ok(())
}

fn handle(document: &mut Document, config: &ViewerConfig, input: Input) -> Result<bool> {
    let page = config.page_number;
    let command = match input {
        Input::Quit => return Ok(false),
        Input::Help => {
            println!("{HELP}");
            return Ok(true);
        }
        Input::Export => {
            export(document, page, config)?;
            return Ok(true);
        }
        Input::ShowState => {
            let state = document.state(page)?;
            println!("{}", serde_json::to_string_pretty(state)?);
            return Ok(true);
        }
        Input::Choose { source, index } => {
            resolve_choice(document.state(page)?, document.graph(page)?, source.as_deref(), index)?
        }
        Input::Goto(node) => Command::NavigateTo { node },
        Input::Restore(key) => Command::ToggleBranch { key },
        Input::Restart => Command::Restart,
        Input::SetExpanded(expanded) => Command::SetExpanded(expanded),
    };

    let transition = document.apply(page, command)?;
    if let Some(note) = describe(&transition) {
        println!("{note}");
    }
    if transition.is_change() {
        show(document, page);
    }
    Ok(true)
}

/// Walk the tree of `config.page_number` until the user quits or input ends.
pub fn run(document: &mut Document, config: &ViewerConfig) -> Result<()> {
    println!("\n========================================");
    println!("   DECISION TREE EXPLORER");
    println!("========================================");
    println!("Type 'help' for commands.");

    show(document, config.page_number);

    loop {
        print!("\n> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        let keep_going = match parse_input(&line) {
            Ok(input) => handle(document, config, input).unwrap_or_else(|err| {
                warn!("Input '{}' failed: {err:#}", line.trim());
                println!("{err:#}");
                true
            }),
            Err(err) => {
                println!("{err:#}");
                true
            }
        };
        if !keep_going {
            break;
        }
    }

    println!("Goodbye.");
    Ok(())
}
