use anyhow::{Context, Result};
use log::warn;

use branchwise::config::ViewerConfig;
use branchwise::document::Document;
use branchwise::{extract, walker};

fn main() -> Result<()> {
    // Initialize logging. Control verbosity with RUST_LOG env var:
    //   RUST_LOG=info   cargo run -- tree.json   # transitions, archives, restores
    //   RUST_LOG=debug  cargo run -- tree.json   # + no-op decisions and parsed JSON
    //   RUST_LOG=trace  cargo run -- tree.json   # + raw extractor reply
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args: Vec<String> = std::env::args().collect();
    let config = ViewerConfig::from_args(&args)?;

    println!("Loading decision tree: {}", config.graph_path.display());
    println!("  Page       : {}", config.page_number);
    println!("  Export dir : {}", config.export_dir.display());

    let bytes = std::fs::read(&config.graph_path)
        .with_context(|| format!("failed to read {}", config.graph_path.display()))?;

    let mut document = Document::new();
    match extract::load_graph(&bytes).context("failed to load decision tree")? {
        Some(graph) => {
            for dangling in graph.dangling_targets() {
                warn!(
                    "Option '{}' at '{}' leads to missing node '{}'",
                    dangling.label, dangling.source, dangling.target
                );
            }
            let unreachable = graph.nodes().len() - graph.reachable().len();
            if unreachable > 0 {
                warn!("{unreachable} node(s) cannot be reached from 'start'");
            }
            document.set_tree(config.page_number, graph);
        }
        None => {
            document.set_empty(config.page_number);
            println!("No decision logic found on page {}.", config.page_number);
            return Ok(());
        }
    }

    walker::run(&mut document, &config)
}
