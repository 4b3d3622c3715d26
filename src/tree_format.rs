//! Tree-shaped persisted chart format.
//!
//! Persistence adapters store a chart as one root record with nested
//! `children`, each record carrying arbitrary payload fields next to its `id`.
//! Positions and levels are not stored; they are re-derived on import.

use std::collections::{HashSet, VecDeque};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::LayoutConfig;
use crate::geometry::Position;
use crate::layout::{Forest, resolve_placement};
use crate::model::{ChartError, Diagnostic, Node, Payload};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeRecord>,
    #[serde(flatten)]
    pub payload: Payload,
}

impl TreeRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            children: Vec::new(),
            payload: Payload::new(),
        }
    }

    pub fn with_child(mut self, child: TreeRecord) -> Self {
        self.children.push(child);
        self
    }
}

// Dropped iteratively: exported chains can be thousands of records deep.
impl Drop for TreeRecord {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut record) = pending.pop() {
            pending.append(&mut record.children);
        }
    }
}

/// Serializes the hierarchy as a single root descriptor. Extra roots are
/// nested under the first one so nothing is lost; `None` for an empty forest.
pub fn export_tree(nodes: &[Node], forest: &Forest) -> Option<TreeRecord> {
    // Reverse pre-order finishes every child record before its parent.
    let mut built: Vec<Option<TreeRecord>> = (0..forest.nodes.len()).map(|_| None).collect();
    for idx in forest.preorder().into_iter().rev() {
        let entry = &forest.nodes[idx];
        let children = entry
            .children
            .iter()
            .filter_map(|&child| built[child].take())
            .collect();
        built[idx] = Some(TreeRecord {
            id: entry.id.clone(),
            children,
            payload: nodes[entry.node].payload.clone(),
        });
    }

    let (&first, rest) = forest.roots.split_first()?;
    let mut root = built[first].take()?;
    for &extra in rest {
        tracing::warn!(
            root = %root.id,
            node = %forest.nodes[extra].id,
            "chart has several roots, nesting extra root under primary"
        );
        if let Some(record) = built[extra].take() {
            root.children.push(record);
        }
    }
    Some(root)
}

#[derive(Debug, Clone, Default)]
pub struct ImportedChart {
    pub nodes: Vec<Node>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Flattens a persisted tree into a node list. Levels come from tree depth,
/// `x` from the same collision rules as a fresh insert (children start under
/// their parent), and every non-root node gets an explicit `parentId`.
/// A repeated id keeps its first occurrence; the repeat's children are
/// attached to that first occurrence instead.
pub fn import_tree(root: &TreeRecord, config: &LayoutConfig) -> ImportedChart {
    let mut chart = ImportedChart::default();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<(&TreeRecord, u32, Option<&str>)> = VecDeque::new();
    queue.push_back((root, 0, None));

    while let Some((record, depth, parent)) = queue.pop_front() {
        if !seen.insert(record.id.as_str()) {
            tracing::warn!(id = %record.id, "duplicate id in persisted tree skipped");
            chart.diagnostics.push(Diagnostic::DuplicateId {
                id: record.id.clone(),
            });
        } else {
            let anchor_x = parent
                .and_then(|pid| chart.nodes.iter().find(|n| n.id == pid))
                .map(|n| n.position.x)
                .unwrap_or(config.origin_x);
            let placement = resolve_placement(
                Position::new(anchor_x, 0.0),
                &chart.nodes,
                None,
                Some(depth),
                config,
            );
            if placement.used_fallback {
                chart.diagnostics.push(Diagnostic::FallbackPlacement {
                    node: record.id.clone(),
                });
            }
            chart.nodes.push(Node {
                id: record.id.clone(),
                position: placement.position,
                level: depth,
                parent_id: parent.map(str::to_string),
                payload: record.payload.clone(),
            });
        }
        for child in &record.children {
            queue.push_back((child, depth + 1, Some(record.id.as_str())));
        }
    }

    tracing::debug!(nodes = chart.nodes.len(), "imported persisted tree");
    chart
}

pub fn parse_tree(json: &str) -> Result<TreeRecord, ChartError> {
    Ok(serde_json::from_str(json)?)
}

pub fn load_tree(path: &Path) -> Result<TreeRecord, ChartError> {
    let contents = std::fs::read_to_string(path)?;
    parse_tree(&contents)
}
