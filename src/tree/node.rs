use std::fmt;

use serde::{Deserialize, Serialize};

/// Tag the extractor attaches to a node. Unknown tags are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Decision,
    YesNoNa,
    Info,
    Goal,
    Action,
    Rule,
    Conclusion,
    End,
    Other(String),
}

impl NodeKind {
    pub fn as_str(&self) -> &str {
        match self {
            NodeKind::Decision => "decision",
            NodeKind::YesNoNa => "yes_no_n_a",
            NodeKind::Info => "info",
            NodeKind::Goal => "goal",
            NodeKind::Action => "action",
            NodeKind::Rule => "rule",
            NodeKind::Conclusion => "conclusion",
            NodeKind::End => "end",
            NodeKind::Other(tag) => tag,
        }
    }

    /// Whether the prompt of this kind of node is phrased as a question.
    pub fn asks_question(&self) -> bool {
        matches!(self, NodeKind::Decision | NodeKind::YesNoNa)
    }
}

impl From<String> for NodeKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "decision" => NodeKind::Decision,
            "yes_no_n_a" => NodeKind::YesNoNa,
            "info" => NodeKind::Info,
            "goal" => NodeKind::Goal,
            "action" => NodeKind::Action,
            "rule" => NodeKind::Rule,
            "conclusion" => NodeKind::Conclusion,
            "end" => NodeKind::End,
            _ => NodeKind::Other(tag),
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A labeled edge to another node. The target may name a node that does not
/// exist; nothing here checks it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeOption {
    #[serde(rename = "on", alias = "label", default)]
    pub label: String,
    #[serde(rename = "id", alias = "next", alias = "targetId", default)]
    pub target: String,
}

impl NodeOption {
    pub fn new(label: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            target: target.into(),
        }
    }
}

/// A single decision or information point of an extracted tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawNode", into = "RawNode")]
pub struct Node {
    /// Unique identifier within the graph (e.g. "start", "q2", "end_ok").
    pub id: String,
    /// `None` when the extractor left the type out.
    pub kind: Option<NodeKind>,
    /// Question or informational text shown for the node.
    pub prompt: String,
    pub category: Option<String>,
    /// Outgoing options in display order. Empty for terminal nodes.
    pub options: Vec<NodeOption>,
}

impl Node {
    pub fn new(id: impl Into<String>, kind: NodeKind, prompt: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: Some(kind),
            prompt: prompt.into(),
            category: None,
            options: Vec::new(),
        }
    }

    pub fn with_option(mut self, label: impl Into<String>, target: impl Into<String>) -> Self {
        self.options.push(NodeOption::new(label, target));
        self
    }

    pub fn is_terminal(&self) -> bool {
        self.options.is_empty()
    }

    pub fn option(&self, label: &str) -> Option<&NodeOption> {
        self.options.iter().find(|o| o.label == label)
    }

    /// Kind tag for display, "Unknown" when absent.
    pub fn kind_label(&self) -> &str {
        self.kind.as_ref().map_or("Unknown", NodeKind::as_str)
    }
}

// ---------------------------------------------------------------------------
// Wire form
// ---------------------------------------------------------------------------

/// Node as written by the extractor and by exports: `question` or `text` for
/// the prompt, `type` for the kind, `next` for the options.
#[derive(Debug, Serialize, Deserialize)]
struct RawNode {
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    category: Option<String>,
    #[serde(rename = "type", alias = "kind", default, skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    question: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "next", alias = "options", default)]
    options: Option<Vec<NodeOption>>,
}

impl From<RawNode> for Node {
    fn from(raw: RawNode) -> Self {
        let prompt = raw
            .question
            .filter(|q| !q.trim().is_empty())
            .or(raw.text)
            .unwrap_or_default();
        Self {
            id: raw.id,
            kind: raw.kind.map(NodeKind::from),
            prompt,
            category: raw.category,
            options: raw.options.unwrap_or_default(),
        }
    }
}

impl From<Node> for RawNode {
    fn from(node: Node) -> Self {
        let asks_question = node.kind.as_ref().map_or(true, NodeKind::asks_question);
        let prompt = Some(node.prompt).filter(|p| !p.is_empty());
        let (question, text) = if asks_question {
            (prompt, None)
        } else {
            (None, prompt)
        };
        Self {
            id: node.id,
            category: node.category,
            kind: node.kind.map(|k| k.as_str().to_string()),
            question,
            text,
            options: Some(node.options),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_extraction_schema() {
        let node: Node = serde_json::from_value(json!({
            "id": "start",
            "category": "triage",
            "question": "Is the patient conscious?",
            "type": "yes_no_n_a",
            "next": [{"on": "Yes", "id": "q2"}, {"on": "No", "id": "call"}]
        }))
        .unwrap();

        assert_eq!(node.id, "start");
        assert_eq!(node.kind, Some(NodeKind::YesNoNa));
        assert_eq!(node.prompt, "Is the patient conscious?");
        assert_eq!(node.category.as_deref(), Some("triage"));
        assert_eq!(node.options[1], NodeOption::new("No", "call"));
    }

    #[test]
    fn test_deserialize_alternate_field_names() {
        let node: Node = serde_json::from_value(json!({
            "id": "n1",
            "kind": "info",
            "text": "Check the fuse.",
            "options": [{"label": "Done", "next": "n2"}]
        }))
        .unwrap();

        assert_eq!(node.kind, Some(NodeKind::Info));
        assert_eq!(node.prompt, "Check the fuse.");
        assert_eq!(node.options, vec![NodeOption::new("Done", "n2")]);
    }

    #[test]
    fn test_terminal_node_with_null_options() {
        let node: Node =
            serde_json::from_value(json!({"id": "end", "type": "end", "text": "Stop.", "next": null}))
                .unwrap();
        assert!(node.is_terminal());
    }

    #[test]
    fn test_unknown_kind_is_preserved() {
        let node: Node =
            serde_json::from_value(json!({"id": "x", "type": "warning", "text": "Hot"})).unwrap();
        assert_eq!(node.kind, Some(NodeKind::Other("warning".into())));
        assert_eq!(node.kind_label(), "warning");

        let out = serde_json::to_value(&node).unwrap();
        assert_eq!(out["type"], "warning");
        assert_eq!(out["text"], "Hot");
    }

    #[test]
    fn test_serialize_uses_question_for_decisions() {
        let node = Node::new("start", NodeKind::Decision, "Power on?").with_option("Yes", "n1");
        let out = serde_json::to_value(&node).unwrap();
        assert_eq!(
            out,
            json!({
                "id": "start",
                "type": "decision",
                "question": "Power on?",
                "next": [{"on": "Yes", "id": "n1"}]
            })
        );
    }

    #[test]
    fn test_missing_kind_labels_unknown() {
        let node: Node = serde_json::from_value(json!({"id": "q"})).unwrap();
        assert_eq!(node.kind_label(), "Unknown");
        assert!(node.prompt.is_empty());
    }
}
