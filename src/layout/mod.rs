mod auto_layout;
mod collision;
mod drag;
mod hierarchy;
mod routing;
pub(crate) mod types;
pub use auto_layout::*;
pub use collision::{insert_node, resolve_placement, resolve_position};
pub use drag::*;
pub use hierarchy::*;
pub use routing::*;
pub use types::*;

use crate::config::LayoutConfig;
use crate::model::{Diagnostic, Node};

#[derive(Debug, Clone, Copy)]
pub struct ChartOptions {
    /// Recompute `x` for the whole forest before routing.
    ///
    /// With `infer_parents` on, inferred parents depend on `x`, so laying out
    /// the output again can regroup nodes. Freeze the hierarchy with
    /// [`pin_parents`] first when the layout is fed back in.
    pub auto_layout: bool,
    /// Infer parents for unlinked nodes by proximity.
    pub infer_parents: bool,
    /// Translation from tree space to canvas space applied to arrows.
    pub offset: (f32, f32),
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            auto_layout: false,
            infer_parents: true,
            offset: (0.0, 0.0),
        }
    }
}

/// Everything a host needs to draw the chart.
#[derive(Debug, Clone)]
pub struct ChartLayout {
    pub nodes: Vec<Node>,
    pub forest: Forest,
    pub positions: PositionMap,
    pub arrows: Vec<Arrow>,
    pub diagnostics: Vec<Diagnostic>,
    pub width: f32,
    pub height: f32,
}

/// Returns a copy of `nodes` with positions taken from `positions` where present.
/// Levels and parent ids are never touched.
pub fn apply_positions(nodes: &[Node], positions: &PositionMap) -> Vec<Node> {
    nodes
        .iter()
        .map(|node| {
            let mut next = node.clone();
            if let Some(pos) = positions.get(&node.id) {
                next.position = *pos;
            }
            next
        })
        .collect()
}

/// Returns a copy of `nodes` where every node carries the parent it has in
/// `forest` as an explicit `parentId`, inferred or not.
pub fn pin_parents(nodes: &[Node], forest: &Forest) -> Vec<Node> {
    nodes
        .iter()
        .map(|node| {
            let mut next = node.clone();
            if forest.get(&node.id).is_some() {
                next.parent_id = forest.parent_id(&node.id).map(str::to_string);
            }
            next
        })
        .collect()
}

fn chart_bounds(positions: &PositionMap, config: &LayoutConfig) -> (f32, f32) {
    let mut max_x = f32::MIN;
    let mut max_y = f32::MIN;
    for pos in positions.values() {
        max_x = max_x.max(pos.x + config.node_width);
        max_y = max_y.max(pos.y + config.node_height);
    }
    if positions.is_empty() {
        (1.0, 1.0)
    } else {
        (max_x.max(1.0), max_y.max(1.0))
    }
}

/// Hierarchy, optional auto layout and connector routing in one pass.
pub fn compute_chart(nodes: &[Node], options: &ChartOptions, config: &LayoutConfig) -> ChartLayout {
    let builder = if options.infer_parents {
        HierarchyBuilder::default()
    } else {
        HierarchyBuilder::explicit_only()
    };
    let mut forest = builder.build(nodes, config);

    let positions: PositionMap = if options.auto_layout {
        annotate_subtree_widths(&mut forest, config);
        compute_auto_layout(&forest, nodes, config)
    } else {
        nodes
            .iter()
            .map(|node| (node.id.clone(), node.position))
            .collect()
    };
    let laid_out = apply_positions(nodes, &positions);
    let arrows = route_arrows(&forest, &positions, options.offset, config);
    let (width, height) = chart_bounds(&positions, config);
    let diagnostics = forest.diagnostics.clone();

    tracing::debug!(
        nodes = laid_out.len(),
        arrows = arrows.len(),
        auto_layout = options.auto_layout,
        "chart computed"
    );

    ChartLayout {
        nodes: laid_out,
        forest,
        positions,
        arrows,
        diagnostics,
        width,
        height,
    }
}
