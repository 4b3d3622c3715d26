use crate::config::LayoutConfig;
use crate::geometry::{Position, bottom_center, top_center};

use super::types::{Arrow, ArrowKind, Forest, NodeIdx, PositionMap};

fn translate(point: (f32, f32), offset: (f32, f32)) -> (f32, f32) {
    (point.0 + offset.0, point.1 + offset.1)
}

fn route_node(
    forest: &Forest,
    idx: NodeIdx,
    positions: &PositionMap,
    offset: (f32, f32),
    config: &LayoutConfig,
    arrows: &mut Vec<Arrow>,
) {
    let entry = &forest.nodes[idx];
    let Some(parent_pos) = positions.get(&entry.id) else {
        return;
    };
    // Children without a position are left out of the fan-out.
    let children: Vec<(&str, Position)> = entry
        .children
        .iter()
        .filter_map(|&c| {
            let id = forest.nodes[c].id.as_str();
            positions.get(id).map(|p| (id, *p))
        })
        .collect();

    let stem = translate(bottom_center(*parent_pos, config), offset);
    match children.as_slice() {
        [] => {}
        [(child_id, child_pos)] => {
            arrows.push(Arrow {
                kind: ArrowKind::Direct,
                from: stem,
                to: translate(top_center(*child_pos, config), offset),
                parent: entry.id.clone(),
                children: vec![child_id.to_string()],
            });
        }
        _ => {
            let tops: Vec<(f32, f32)> = children
                .iter()
                .map(|(_, pos)| translate(top_center(*pos, config), offset))
                .collect();
            let children_top = tops.iter().map(|t| t.1).fold(f32::INFINITY, f32::min);
            let bus_y = (stem.1 + children_top) / 2.0;
            let left = tops.iter().map(|t| t.0).fold(f32::INFINITY, f32::min);
            let right = tops.iter().map(|t| t.0).fold(f32::NEG_INFINITY, f32::max);
            let child_ids: Vec<String> = children.iter().map(|(id, _)| id.to_string()).collect();

            arrows.push(Arrow {
                kind: ArrowKind::Vertical,
                from: stem,
                to: (stem.0, bus_y),
                parent: entry.id.clone(),
                children: child_ids.clone(),
            });
            arrows.push(Arrow {
                kind: ArrowKind::Horizontal,
                from: (left, bus_y),
                to: (right, bus_y),
                parent: entry.id.clone(),
                children: child_ids,
            });
            for ((child_id, _), top) in children.iter().zip(&tops) {
                arrows.push(Arrow {
                    kind: ArrowKind::TConnector,
                    from: (top.0, bus_y),
                    to: *top,
                    parent: entry.id.clone(),
                    children: vec![child_id.to_string()],
                });
            }
        }
    }
}

/// Connector segments for every parent/child relation in `forest`.
///
/// A single child gets one `Direct` edge from the parent's bottom-center to the
/// child's top-center. Several children share a bus halfway between the parent
/// and the highest child: one `Vertical` stem, one `Horizontal` bus across the
/// child centers and one `TConnector` drop per child. `positions` may be
/// committed or transient drag positions; `offset` translates tree space into
/// canvas space.
pub fn route_arrows(
    forest: &Forest,
    positions: &PositionMap,
    offset: (f32, f32),
    config: &LayoutConfig,
) -> Vec<Arrow> {
    let mut arrows = Vec::new();
    for idx in forest.preorder() {
        route_node(forest, idx, positions, offset, config, &mut arrows);
    }
    arrows
}

/// Polyline points for drawing an arrow.
pub fn arrow_points(arrow: &Arrow) -> Vec<(f32, f32)> {
    vec![arrow.from, arrow.to]
}
