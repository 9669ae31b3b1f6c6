use anyhow::{Context, Result};
use log::{debug, info, trace, warn};
use regex::Regex;
use serde::Deserialize;

use crate::tree::{Graph, Node};

// ---------------------------------------------------------------------------
// Extractor response decoding
// ---------------------------------------------------------------------------

/// Decode raw response bytes. A byte order mark picks the encoding,
/// otherwise UTF-8 with replacement characters for invalid sequences.
pub fn decode_response(bytes: &[u8]) -> String {
    let (text, encoding, had_errors) = encoding_rs::UTF_8.decode(bytes);
    if had_errors {
        warn!(
            "Extractor response is not valid {}, invalid bytes were replaced",
            encoding.name()
        );
    }
    text.into_owned()
}

/// Top-level shapes an extractor (or a previous export) may hand over.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GraphPayload {
    Nodes(Vec<Node>),
    Document { nodes: Vec<Node> },
}

// ---------------------------------------------------------------------------
// JSON extraction
// ---------------------------------------------------------------------------

/// Parse a decision tree out of an extractor's raw reply.
///
/// Returns `Ok(None)` when the extractor reported no decision logic (an empty
/// node list).
pub fn parse_graph(raw: &str) -> Result<Option<Graph>> {
    let re_think = Regex::new(r"(?s)<think>(.*?)</think>").context("invalid think pattern")?;
    for cap in re_think.captures_iter(raw) {
        let thought = cap.get(1).map_or("", |m| m.as_str()).trim();
        if !thought.is_empty() {
            debug!("Extractor thinking:\n{thought}");
        }
    }

    let cleaned = re_think.replace_all(raw, "");
    trace!("After stripping <think> blocks:\n{cleaned}");

    let re_json_fence = Regex::new(r"(?s)```json(.*?)```").context("invalid fence pattern")?;
    let re_fence = Regex::new(r"(?s)```(.*?)```").context("invalid fence pattern")?;
    let body = re_json_fence
        .captures(&cleaned)
        .or_else(|| re_fence.captures(&cleaned))
        .and_then(|cap| cap.get(1))
        .map_or(&*cleaned, |m| m.as_str())
        .trim();

    debug!("Extracted JSON: {body}");

    let payload: GraphPayload = serde_json::from_str(body)
        .with_context(|| format!("failed to parse decision tree JSON: {body}"))?;
    let nodes = match payload {
        GraphPayload::Nodes(nodes) | GraphPayload::Document { nodes } => nodes,
    };

    if nodes.is_empty() {
        info!("Extractor found no decision logic");
        return Ok(None);
    }

    let graph = Graph::new(nodes).context("extracted decision tree is unusable")?;
    info!("Decision tree parsed: {} nodes", graph.nodes().len());
    Ok(Some(graph))
}

/// Decode and parse in one step.
pub fn load_graph(bytes: &[u8]) -> Result<Option<Graph>> {
    parse_graph(&decode_response(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TREE: &str = r#"[
        {"id": "start", "type": "decision", "question": "Is it on?",
         "next": [{"on": "Yes", "id": "ok"}, {"on": "No", "id": "fix"}]},
        {"id": "fix", "type": "action", "text": "Press the power button.", "next": []},
        {"id": "ok", "type": "end", "text": "Nothing to do."}
    ]"#;

    #[test]
    fn test_parse_graph_clean() {
        let graph = parse_graph(TREE).unwrap().unwrap();
        assert_eq!(graph.nodes().len(), 3);
        assert_eq!(graph.start().unwrap().options.len(), 2);
    }

    #[test]
    fn test_parse_graph_with_json_fence() {
        let raw = format!("Here is the tree:\n```json\n{TREE}\n```\nLet me know.");
        let graph = parse_graph(&raw).unwrap().unwrap();
        assert!(graph.contains("fix"));
    }

    #[test]
    fn test_parse_graph_with_plain_fence_and_think() {
        let raw = format!("<think>Two branches, one action.</think>\n```\n{TREE}\n```");
        let graph = parse_graph(&raw).unwrap().unwrap();
        assert_eq!(graph.get("ok").unwrap().prompt, "Nothing to do.");
    }

    #[test]
    fn test_parse_graph_accepts_export_shape() {
        let raw = format!(r#"{{"nodes": {TREE}}}"#);
        let graph = parse_graph(&raw).unwrap().unwrap();
        assert_eq!(graph.nodes().len(), 3);
    }

    #[test]
    fn test_parse_graph_reimports_export() {
        let graph = parse_graph(TREE).unwrap().unwrap();
        let exported = serde_json::to_string(&graph.export()).unwrap();
        let again = parse_graph(&exported).unwrap().unwrap();
        assert_eq!(again, graph);
    }

    #[test]
    fn test_parse_graph_empty_means_no_tree() {
        assert!(parse_graph("[]").unwrap().is_none());
        assert!(parse_graph("```json\n[]\n```").unwrap().is_none());
    }

    #[test]
    fn test_parse_graph_without_start_fails() {
        let err = parse_graph(r#"[{"id": "q1", "question": "?"}]"#).unwrap_err();
        assert!(format!("{err:#}").contains("no 'start' node"));
    }

    #[test]
    fn test_parse_graph_rejects_prose() {
        assert!(parse_graph("I could not find a decision tree.").is_err());
    }

    #[test]
    fn test_decode_response_handles_bom_and_bad_bytes() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"[]");
        assert_eq!(decode_response(&bytes), "[]");

        assert_eq!(decode_response(&[b'[', 0xFF, b']']), "[\u{FFFD}]");

        let utf16: Vec<u8> = [0xFF, 0xFE, b'[', 0, b']', 0].to_vec();
        assert_eq!(decode_response(&utf16), "[]");
        assert!(load_graph(&utf16).unwrap().is_none());
    }
}
