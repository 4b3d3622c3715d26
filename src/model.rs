use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::LayoutConfig;
use crate::geometry::Position;

/// Opaque per-node data (person/contact details). The engine never inspects it
/// beyond picking display labels.
pub type Payload = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    pub position: Position,
    pub level: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(flatten)]
    pub payload: Payload,
}

impl Node {
    /// Creates a node whose level is derived from `position.y`.
    pub fn new(id: impl Into<String>, position: Position, config: &LayoutConfig) -> Self {
        Self {
            id: id.into(),
            position,
            level: config.level_for_y(position.y),
            parent_id: None,
            payload: Payload::new(),
        }
    }

    /// Creates a node snapped onto the row of `level`.
    pub fn at_level(id: impl Into<String>, x: f32, level: u32, config: &LayoutConfig) -> Self {
        Self {
            id: id.into(),
            position: Position::new(x, config.level_y(level)),
            level,
            parent_id: None,
            payload: Payload::new(),
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.payload.insert(key.to_string(), value.into());
        self
    }

    /// Primary display label: payload `name`, falling back to the id.
    pub fn display_name(&self) -> String {
        self.payload
            .get("name")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| self.id.clone())
    }

    pub fn display_title(&self) -> Option<String> {
        self.payload
            .get("title")
            .or_else(|| self.payload.get("role"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
    }
}

/// Non-fatal conditions worth surfacing to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Diagnostic {
    /// `parentId` names a node that is not in the set; the node was treated as a root.
    MissingParent { node: String, parent: String },
    /// Following explicit `parentId` links from this node leads back to it; the link was dropped.
    ParentCycle { node: String },
    /// The collision search was exhausted and the node was pushed right of everything.
    FallbackPlacement { node: String },
    /// A later node reused an id already seen; it was skipped.
    DuplicateId { id: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MissingParent { node, parent } => {
                write!(f, "node {node} references missing parent {parent}")
            }
            Diagnostic::ParentCycle { node } => {
                write!(f, "node {node} is part of a parent cycle")
            }
            Diagnostic::FallbackPlacement { node } => {
                write!(f, "node {node} required far-right fallback placement")
            }
            Diagnostic::DuplicateId { id } => write!(f, "duplicate node id {id} skipped"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    #[error("failed to read chart input: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid chart JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("chart input contains no nodes")]
    EmptyInput,
}

/// Drops every node whose id was already seen, keeping the first occurrence.
pub fn dedupe_nodes(nodes: Vec<Node>) -> (Vec<Node>, Vec<Diagnostic>) {
    let mut seen: HashSet<String> = HashSet::new();
    let mut kept = Vec::with_capacity(nodes.len());
    let mut diagnostics = Vec::new();
    for node in nodes {
        if seen.insert(node.id.clone()) {
            kept.push(node);
        } else {
            tracing::warn!(id = %node.id, "duplicate node id skipped");
            diagnostics.push(Diagnostic::DuplicateId { id: node.id });
        }
    }
    (kept, diagnostics)
}

pub fn parse_nodes(json: &str) -> Result<(Vec<Node>, Vec<Diagnostic>), ChartError> {
    let nodes: Vec<Node> = serde_json::from_str(json)?;
    if nodes.is_empty() {
        return Err(ChartError::EmptyInput);
    }
    Ok(dedupe_nodes(nodes))
}

pub fn load_nodes(path: &Path) -> Result<(Vec<Node>, Vec<Diagnostic>), ChartError> {
    let contents = std::fs::read_to_string(path)?;
    parse_nodes(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_inbound_shape_with_payload() {
        let json = r#"[
            {"id":"ceo","position":{"x":100,"y":0},"level":0,"name":"Ada","title":"CEO"},
            {"id":"cto","position":{"x":100,"y":150},"level":1,"parentId":"ceo","email":"c@x.io"}
        ]"#;
        let (nodes, diagnostics) = parse_nodes(json).unwrap();
        assert!(diagnostics.is_empty());
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].display_name(), "Ada");
        assert_eq!(nodes[0].display_title().as_deref(), Some("CEO"));
        assert_eq!(nodes[1].parent_id.as_deref(), Some("ceo"));
        assert_eq!(nodes[1].payload.get("email"), Some(&Value::from("c@x.io")));
        assert_eq!(nodes[1].display_name(), "cto");
    }

    #[test]
    fn payload_survives_serialization() {
        let config = LayoutConfig::default();
        let node = Node::at_level("a", 10.0, 1, &config)
            .with_parent("b")
            .with_field("phone", "555");
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["parentId"], "b");
        assert_eq!(json["phone"], "555");
        assert_eq!(json["position"]["y"], 150.0);
    }

    #[test]
    fn duplicate_ids_keep_first() {
        let config = LayoutConfig::default();
        let nodes = vec![
            Node::at_level("a", 0.0, 0, &config),
            Node::at_level("a", 500.0, 2, &config),
            Node::at_level("b", 0.0, 1, &config),
        ];
        let (kept, diagnostics) = dedupe_nodes(nodes);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].position.x, 0.0);
        assert_eq!(diagnostics, vec![Diagnostic::DuplicateId { id: "a".to_string() }]);
    }

    #[test]
    fn empty_list_is_rejected() {
        assert!(matches!(parse_nodes("[]"), Err(ChartError::EmptyInput)));
    }
}
