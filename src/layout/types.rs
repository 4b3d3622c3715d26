use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::geometry::Position;
use crate::model::{Diagnostic, Node};

/// Position map keyed by node id. Ordered so dumps and tests are stable.
pub type PositionMap = BTreeMap<String, Position>;

/// Index of a node inside a [`Forest`] arena.
pub type NodeIdx = usize;

/// A node of the reporting hierarchy. `node` indexes the flat input list; the
/// node data itself is never copied into the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct HierarchicalNode {
    pub id: String,
    pub node: usize,
    pub level: u32,
    pub parent: Option<NodeIdx>,
    pub children: Vec<NodeIdx>,
    /// Filled in by auto layout only.
    pub subtree_width: f32,
}

/// Arena of hierarchy nodes plus the ordered list of roots.
#[derive(Debug, Clone, Default)]
pub struct Forest {
    pub nodes: Vec<HierarchicalNode>,
    pub roots: Vec<NodeIdx>,
    pub index: HashMap<String, NodeIdx>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Forest {
    /// Seeds an arena with one unattached entry per input node, in list order.
    pub(crate) fn from_nodes(nodes: &[Node]) -> Self {
        let mut forest = Forest::default();
        for (i, node) in nodes.iter().enumerate() {
            if forest.index.contains_key(&node.id) {
                continue;
            }
            forest.index.insert(node.id.clone(), forest.nodes.len());
            forest.nodes.push(HierarchicalNode {
                id: node.id.clone(),
                node: i,
                level: node.level,
                parent: None,
                children: Vec::new(),
                subtree_width: 0.0,
            });
        }
        forest
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&HierarchicalNode> {
        self.index.get(id).map(|&idx| &self.nodes[idx])
    }

    pub fn parent_id(&self, id: &str) -> Option<&str> {
        let node = self.get(id)?;
        node.parent.map(|p| self.nodes[p].id.as_str())
    }

    pub fn children_ids(&self, id: &str) -> Vec<&str> {
        self.get(id)
            .map(|node| {
                node.children
                    .iter()
                    .map(|&c| self.nodes[c].id.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn root_ids(&self) -> Vec<&str> {
        self.roots.iter().map(|&r| self.nodes[r].id.as_str()).collect()
    }

    /// True when `ancestor` is reachable by following parent links up from `idx`
    /// (a node counts as its own ancestor).
    pub fn is_ancestor(&self, ancestor: NodeIdx, idx: NodeIdx) -> bool {
        let mut current = Some(idx);
        let mut steps = 0;
        while let Some(c) = current {
            if c == ancestor {
                return true;
            }
            steps += 1;
            if steps > self.nodes.len() {
                return false;
            }
            current = self.nodes[c].parent;
        }
        false
    }

    pub(crate) fn attach(&mut self, child: NodeIdx, parent: NodeIdx) {
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
    }

    /// Pre-order walk over every tree, roots in order.
    pub fn preorder(&self) -> Vec<NodeIdx> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeIdx> = self.roots.iter().rev().copied().collect();
        while let Some(idx) = stack.pop() {
            order.push(idx);
            for &child in self.nodes[idx].children.iter().rev() {
                stack.push(child);
            }
        }
        order
    }

    /// Parent/child id pairs in pre-order, handy for comparing hierarchies.
    pub fn edge_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for idx in self.preorder() {
            for &child in &self.nodes[idx].children {
                pairs.push((self.nodes[idx].id.clone(), self.nodes[child].id.clone()));
            }
        }
        pairs
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArrowKind {
    /// Parent with a single child.
    Direct,
    /// Parent stem down to the bus line.
    Vertical,
    /// Bus line spanning the children.
    Horizontal,
    /// Bus line down to one child.
    #[serde(rename = "T-connector")]
    TConnector,
}

impl ArrowKind {
    /// Name used in JSON dumps and SVG attributes.
    pub fn as_str(self) -> &'static str {
        match self {
            ArrowKind::Direct => "direct",
            ArrowKind::Vertical => "vertical",
            ArrowKind::Horizontal => "horizontal",
            ArrowKind::TConnector => "T-connector",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Arrow {
    #[serde(rename = "type")]
    pub kind: ArrowKind,
    pub from: (f32, f32),
    pub to: (f32, f32),
    pub parent: String,
    pub children: Vec<String>,
}

/// Outcome of a collision-resolved placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Position,
    pub level: u32,
    pub used_fallback: bool,
}

impl Placement {
    /// `FallbackPlacement` for `node` when the search had to give up.
    pub fn diagnostic(&self, node: &str) -> Option<Diagnostic> {
        self.used_fallback.then(|| Diagnostic::FallbackPlacement {
            node: node.to_string(),
        })
    }
}
