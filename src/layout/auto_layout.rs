//! Level-preserving tidy layout for a whole forest.
//!
//! Widths are measured bottom-up, then every subtree is given a horizontal
//! span and parents are centered over their children. Only `x` is ever
//! recomputed: a node's `y` (and therefore its level) is copied through
//! untouched, since levels are set by the user and are not tree depths.

use crate::config::LayoutConfig;
use crate::geometry::{Position, nodes_collide};
use crate::model::Node;

use super::collision::search_free_position;
use super::types::{Forest, PositionMap};

/// Minimum horizontal span of each subtree, indexed like `forest.nodes`.
pub fn subtree_widths(forest: &Forest, config: &LayoutConfig) -> Vec<f32> {
    let mut widths = vec![config.node_width; forest.nodes.len()];
    // Reverse pre-order visits every child before its parent.
    for idx in forest.preorder().into_iter().rev() {
        let children = &forest.nodes[idx].children;
        if children.is_empty() {
            continue;
        }
        let spread: f32 = children.iter().map(|&c| widths[c]).sum::<f32>()
            + (children.len() as f32 - 1.0) * config.horizontal_spacing
            + config.subtree_padding;
        widths[idx] = config.node_width.max(spread);
    }
    widths
}

/// Stores the measured widths on the forest nodes.
pub fn annotate_subtree_widths(forest: &mut Forest, config: &LayoutConfig) {
    let widths = subtree_widths(forest, config);
    for (entry, width) in forest.nodes.iter_mut().zip(widths) {
        entry.subtree_width = width;
    }
}

fn assign_spans(forest: &Forest, widths: &[f32], config: &LayoutConfig) -> Vec<f32> {
    let mut span_left = vec![0.0f32; forest.nodes.len()];
    let mut node_x = vec![0.0f32; forest.nodes.len()];

    let mut cursor = config.origin_x;
    for &root in &forest.roots {
        span_left[root] = cursor;
        cursor += widths[root] + config.forest_gap;
    }

    for idx in forest.preorder() {
        let left = span_left[idx];
        let children = &forest.nodes[idx].children;
        if children.is_empty() {
            node_x[idx] = left + (widths[idx] - config.node_width) / 2.0;
            continue;
        }
        let total: f32 = children.iter().map(|&c| widths[c]).sum::<f32>()
            + (children.len() as f32 - 1.0) * config.horizontal_spacing;
        let start = left + (widths[idx] - total) / 2.0;
        let mut child_cursor = start;
        for &child in children {
            span_left[child] = child_cursor;
            child_cursor += widths[child] + config.horizontal_spacing;
        }
        let center = start + total / 2.0;
        node_x[idx] = center - config.node_width / 2.0;
    }
    node_x
}

/// Recomputes `x` for every node of `forest`; `y` is taken from `nodes` as-is.
///
/// Spans of distinct subtrees never intersect, but a node sharing a row with
/// one of its own ancestors can still land on top of it. Those are pushed
/// sideways within their row, in pre-order.
pub fn compute_auto_layout(forest: &Forest, nodes: &[Node], config: &LayoutConfig) -> PositionMap {
    let mut positions = PositionMap::new();
    if forest.is_empty() {
        return positions;
    }

    let widths = subtree_widths(forest, config);
    let node_x = assign_spans(forest, &widths, config);

    let mut placed: Vec<Position> = Vec::with_capacity(forest.nodes.len());
    let mut shifted = 0usize;
    for idx in forest.preorder() {
        let entry = &forest.nodes[idx];
        let y = nodes[entry.node].position.y;
        let mut position = Position::new(node_x[idx], y);
        if placed.iter().any(|p| nodes_collide(position, *p, config)) {
            let (resolved, _) = search_free_position(position, &placed, true, config);
            position = resolved;
            shifted += 1;
        }
        placed.push(position);
        positions.insert(entry.id.clone(), position);
    }

    tracing::debug!(
        nodes = positions.len(),
        roots = forest.roots.len(),
        shifted,
        "auto layout computed"
    );
    positions
}
