use std::path::PathBuf;

use anyhow::{Context, Result};

const USAGE: &str = "\
Usage: branchwise <tree.json> [page_number] [export_dir]

Example:
  branchwise ./extracted/page-3.json 3 ./exports

The tree file is the extractor's raw reply (fenced or bare JSON) or a
previous export.

Logging: set RUST_LOG=debug or RUST_LOG=trace for verbose output";

// ---------------------------------------------------------------------------
// Viewer configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerConfig {
    /// File holding the extracted tree for the page.
    pub graph_path: PathBuf,
    /// Page the tree belongs to (1-based).
    pub page_number: u32,
    /// Where `export` writes its artifacts.
    pub export_dir: PathBuf,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            graph_path: PathBuf::new(),
            page_number: 1,
            export_dir: PathBuf::from("."),
        }
    }
}

impl ViewerConfig {
    /// Build from `std::env::args()`-style arguments (program name first).
    pub fn from_args(args: &[String]) -> Result<Self> {
        let defaults = Self::default();
        let graph_path = args.get(1).context(USAGE)?;

        Ok(Self {
            graph_path: PathBuf::from(graph_path),
            page_number: args
                .get(2)
                .and_then(|s| s.parse().ok())
                .filter(|&n| n > 0)
                .unwrap_or(defaults.page_number),
            export_dir: args.get(3).map(PathBuf::from).unwrap_or(defaults.export_dir),
        })
    }
}
