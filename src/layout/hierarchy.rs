//! Reporting-hierarchy construction from a flat node list.
//!
//! Parents are assigned by a chain of [`ParentStrategy`] passes over a shared
//! [`Forest`] arena. Each pass only touches nodes that are still unattached,
//! so earlier strategies always win. Nodes left unattached become roots.

use std::collections::{BTreeMap, HashMap};

use crate::config::LayoutConfig;
use crate::model::{Diagnostic, Node};

use super::types::{Forest, NodeIdx};

pub trait ParentStrategy {
    fn name(&self) -> &'static str;

    /// Attaches some of the still-unattached nodes of `forest`.
    /// Must never attach a node beneath one of its own descendants.
    fn assign(&self, nodes: &[Node], forest: &mut Forest, config: &LayoutConfig);
}

/// Follows explicit `parentId` references. Unresolvable references and links
/// that would close a cycle are dropped and reported.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExplicitLinkStrategy;

impl ParentStrategy for ExplicitLinkStrategy {
    fn name(&self) -> &'static str {
        "explicit"
    }

    fn assign(&self, nodes: &[Node], forest: &mut Forest, _config: &LayoutConfig) {
        let count = forest.nodes.len();
        let mut links: Vec<Option<NodeIdx>> = vec![None; count];

        for idx in 0..count {
            if forest.nodes[idx].parent.is_some() {
                continue;
            }
            let node = &nodes[forest.nodes[idx].node];
            let Some(parent_id) = node.parent_id.as_deref() else {
                continue;
            };
            match forest.index.get(parent_id) {
                Some(&parent) if parent == idx => {
                    tracing::warn!(node = %node.id, "node lists itself as parent");
                    forest.diagnostics.push(Diagnostic::ParentCycle {
                        node: node.id.clone(),
                    });
                }
                Some(&parent) => links[idx] = Some(parent),
                None => {
                    tracing::warn!(node = %node.id, parent = parent_id, "parent not found, treating as root");
                    forest.diagnostics.push(Diagnostic::MissingParent {
                        node: node.id.clone(),
                        parent: parent_id.to_string(),
                    });
                }
            }
        }

        // Break cycles: the first node of a cycle in list order loses its link.
        for idx in 0..count {
            let mut current = links[idx];
            let mut steps = 0;
            while let Some(c) = current {
                if c == idx {
                    tracing::warn!(node = %forest.nodes[idx].id, "parent cycle broken");
                    forest.diagnostics.push(Diagnostic::ParentCycle {
                        node: forest.nodes[idx].id.clone(),
                    });
                    links[idx] = None;
                    break;
                }
                steps += 1;
                if steps > count {
                    break;
                }
                current = links[c];
            }
        }

        for (child, link) in links.into_iter().enumerate() {
            if let Some(parent) = link {
                forest.attach(child, parent);
            }
        }
    }
}

/// Infers a parent for unattached nodes from the horizontally nearest node on
/// the level directly above, provided it is closer than the proximity threshold.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProximityFallbackStrategy {
    /// Overrides `LayoutConfig::proximity_threshold` when set.
    pub threshold: Option<f32>,
}

impl ParentStrategy for ProximityFallbackStrategy {
    fn name(&self) -> &'static str {
        "proximity"
    }

    fn assign(&self, nodes: &[Node], forest: &mut Forest, config: &LayoutConfig) {
        let threshold = self.threshold.unwrap_or(config.proximity_threshold);
        let mut by_level: BTreeMap<u32, Vec<NodeIdx>> = BTreeMap::new();
        for (idx, entry) in forest.nodes.iter().enumerate() {
            by_level.entry(entry.level).or_default().push(idx);
        }

        let levels: Vec<u32> = by_level.keys().copied().collect();
        for level in levels {
            let Some(next) = level.checked_add(1) else {
                continue;
            };
            let (Some(parents), Some(children)) = (by_level.get(&level), by_level.get(&next))
            else {
                continue;
            };
            let parents = parents.clone();
            let children = children.clone();

            for child in children {
                if forest.nodes[child].parent.is_some() {
                    continue;
                }
                let child_x = nodes[forest.nodes[child].node].position.x;
                let mut best: Option<(NodeIdx, f32)> = None;
                for &candidate in &parents {
                    if forest.is_ancestor(child, candidate) {
                        continue;
                    }
                    let distance = (nodes[forest.nodes[candidate].node].position.x - child_x).abs();
                    if best.is_none_or(|(_, d)| distance < d) {
                        best = Some((candidate, distance));
                    }
                }
                if let Some((parent, distance)) = best
                    && distance < threshold
                {
                    tracing::debug!(
                        child = %forest.nodes[child].id,
                        parent = %forest.nodes[parent].id,
                        distance,
                        "inferred parent by proximity"
                    );
                    forest.attach(child, parent);
                }
            }
        }
    }
}

/// Ordered chain of parent strategies.
pub struct HierarchyBuilder {
    strategies: Vec<Box<dyn ParentStrategy>>,
}

impl Default for HierarchyBuilder {
    fn default() -> Self {
        Self {
            strategies: vec![
                Box::new(ExplicitLinkStrategy),
                Box::new(ProximityFallbackStrategy::default()),
            ],
        }
    }
}

impl HierarchyBuilder {
    /// Explicit links only; unlinked nodes stay roots.
    pub fn explicit_only() -> Self {
        Self {
            strategies: vec![Box::new(ExplicitLinkStrategy)],
        }
    }

    pub fn with_strategy(mut self, strategy: Box<dyn ParentStrategy>) -> Self {
        self.strategies.push(strategy);
        self
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn build(&self, nodes: &[Node], config: &LayoutConfig) -> Forest {
        let mut forest = Forest::from_nodes(nodes);
        for strategy in &self.strategies {
            strategy.assign(nodes, &mut forest, config);
        }
        forest.roots = forest
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.parent.is_none())
            .map(|(idx, _)| idx)
            .collect();
        tracing::debug!(
            nodes = forest.nodes.len(),
            roots = forest.roots.len(),
            "hierarchy built"
        );
        forest
    }
}

pub fn build_hierarchy(nodes: &[Node], config: &LayoutConfig) -> Forest {
    HierarchyBuilder::default().build(nodes, config)
}

/// Parent id per node id, as found in a forest.
pub fn parent_map(forest: &Forest) -> HashMap<String, Option<String>> {
    forest
        .nodes
        .iter()
        .map(|entry| {
            (
                entry.id.clone(),
                entry.parent.map(|p| forest.nodes[p].id.clone()),
            )
        })
        .collect()
}
