//! Pages of a converted document and the per-page exploration they own.

use std::collections::BTreeMap;
use std::fmt;

use anyhow::{Context, Result};
use log::{info, warn};

use crate::explore::{Command, ExplorationState, PathView, Transition};
use crate::tree::{Graph, TreeExport};

/// Content of a single page.
#[derive(Debug, Clone, PartialEq)]
pub enum Page {
    /// Converted markup of an ordinary page.
    Markup(String),
    /// A procedural page with its tree and the user's exploration of it.
    Tree {
        graph: Graph,
        state: ExplorationState,
    },
    /// A tree page on which the extractor found no decision logic.
    Empty,
}

/// A recoverable condition the renderer shows to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    MissingPage(u32),
    NotATreePage(u32),
    NoTree(u32),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::MissingPage(page) => write!(f, "Page {page} is not available"),
            Notice::NotATreePage(page) => {
                write!(f, "Page {page} does not contain a decision tree")
            }
            Notice::NoTree(page) => write!(f, "No decision tree available for page {page}"),
        }
    }
}

impl std::error::Error for Notice {}

/// A named export artifact for one page.
#[derive(Debug, Clone, PartialEq)]
pub struct Export {
    pub file_name: String,
    pub tree: TreeExport,
}

impl Export {
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.tree)
            .with_context(|| format!("failed to serialize {}", self.file_name))
    }
}

/// Owns every page, addressed by 1-based page number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pages: BTreeMap<u32, Page>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_markup(&mut self, page: u32, markup: impl Into<String>) {
        self.pages.insert(page, Page::Markup(markup.into()));
    }

    /// Install a freshly delivered tree with a new exploration.
    pub fn set_tree(&mut self, page: u32, graph: Graph) {
        info!("Page {page}: decision tree with {} nodes", graph.nodes().len());
        self.pages.insert(
            page,
            Page::Tree {
                graph,
                state: ExplorationState::new(),
            },
        );
    }

    pub fn set_empty(&mut self, page: u32) {
        info!("Page {page}: no decision logic found");
        self.pages.insert(page, Page::Empty);
    }

    /// Drop a page's content together with its exploration.
    pub fn invalidate(&mut self, page: u32) -> Option<Page> {
        self.pages.remove(&page)
    }

    pub fn page(&self, page: u32) -> Option<&Page> {
        self.pages.get(&page)
    }

    pub fn page_numbers(&self) -> impl Iterator<Item = u32> + '_ {
        self.pages.keys().copied()
    }

    pub fn graph(&self, page: u32) -> Result<&Graph, Notice> {
        self.tree(page).map(|(graph, _)| graph)
    }

    pub fn state(&self, page: u32) -> Result<&ExplorationState, Notice> {
        self.tree(page).map(|(_, state)| state)
    }

    pub fn view(&self, page: u32) -> Result<PathView<'_>, Notice> {
        self.tree(page)
            .map(|(graph, state)| PathView::build(state, graph))
    }

    /// Run a navigation command on one page. Other pages are untouched.
    pub fn apply(&mut self, page: u32, command: Command) -> Result<Transition, Notice> {
        match self.pages.get_mut(&page) {
            Some(Page::Tree { graph, state }) => Ok(state.apply(graph, command)),
            other => {
                let notice = notice_for(page, other.map(|p| &*p));
                warn!("Ignoring {command:?}: {notice}");
                Err(notice)
            }
        }
    }

    /// Reset a page's exploration to its initial state.
    pub fn restart(&mut self, page: u32) -> Result<Transition, Notice> {
        self.apply(page, Command::Restart)
    }

    /// The full tree of a page as a named artifact. Read-only.
    pub fn export(&self, page: u32) -> Result<Export, Notice> {
        let (graph, _) = self.tree(page)?;
        Ok(Export {
            file_name: format!("decision-tree-page-{page}.json"),
            tree: graph.export(),
        })
    }

    fn tree(&self, page: u32) -> Result<(&Graph, &ExplorationState), Notice> {
        match self.pages.get(&page) {
            Some(Page::Tree { graph, state }) => Ok((graph, state)),
            other => Err(notice_for(page, other)),
        }
    }
}

fn notice_for(page: u32, content: Option<&Page>) -> Notice {
    match content {
        None => Notice::MissingPage(page),
        Some(Page::Markup(_)) => Notice::NotATreePage(page),
        Some(Page::Empty) | Some(Page::Tree { .. }) => Notice::NoTree(page),
    }
}
