// Collision-free placement of single nodes.
// Pure geometry: callers hand in the current node snapshot and get a position back.

use crate::config::LayoutConfig;
use crate::geometry::{Position, nodes_collide};
use crate::model::Node;

use super::types::Placement;

fn collides_any(candidate: Position, obstacles: &[Position], config: &LayoutConfig) -> bool {
    obstacles
        .iter()
        .any(|other| nodes_collide(candidate, *other, config))
}

/// Right of every obstacle, so collision-free by construction.
fn far_right_x(target_x: f32, obstacles: &[Position], config: &LayoutConfig) -> f32 {
    obstacles
        .iter()
        .map(|p| p.x + config.node_width + config.collision_padding)
        .fold(target_x, f32::max)
}

/// Core search shared by every placement entry point. Returns the position and
/// whether the far-right fallback was needed.
pub(crate) fn search_free_position(
    target: Position,
    obstacles: &[Position],
    lock_row: bool,
    config: &LayoutConfig,
) -> (Position, bool) {
    if !collides_any(target, obstacles, config) {
        return (target, false);
    }

    let step = config.placement_step();
    let attempts = config.max_placement_attempts;

    for i in 1..=attempts {
        let candidate = Position::new(target.x + step * i as f32, target.y);
        if !collides_any(candidate, obstacles, config) {
            return (candidate, false);
        }
    }

    for i in 1..=attempts {
        let x = target.x - step * i as f32;
        if x < 0.0 {
            break;
        }
        let candidate = Position::new(x, target.y);
        if !collides_any(candidate, obstacles, config) {
            return (candidate, false);
        }
    }

    if !lock_row {
        for i in 1..=attempts {
            let offset = config.level_height * i as f32;
            let up = target.y - offset;
            if up >= 0.0 {
                let candidate = Position::new(target.x, up);
                if !collides_any(candidate, obstacles, config) {
                    return (candidate, false);
                }
            }
            let candidate = Position::new(target.x, target.y + offset);
            if !collides_any(candidate, obstacles, config) {
                return (candidate, false);
            }
        }
    }

    let x = far_right_x(target.x, obstacles, config);
    (Position::new(x, target.y), true)
}

fn obstacles_from(nodes: &[Node], exclude_id: Option<&str>) -> Vec<Position> {
    nodes
        .iter()
        .filter(|node| Some(node.id.as_str()) != exclude_id)
        .map(|node| node.position)
        .collect()
}

/// Nearest non-overlapping position to `target`.
///
/// With a `preferred_level`, `y` is first snapped onto that level's row and the
/// search only moves horizontally. Without one the search may also try rows
/// above and below. Never fails: an exhausted search falls back to a position
/// right of every existing node.
pub fn resolve_placement(
    target: Position,
    existing: &[Node],
    exclude_id: Option<&str>,
    preferred_level: Option<u32>,
    config: &LayoutConfig,
) -> Placement {
    let start = match preferred_level {
        Some(level) => Position::new(target.x, config.level_y(level)),
        None => target,
    };
    let obstacles = obstacles_from(existing, exclude_id);
    let (position, used_fallback) =
        search_free_position(start, &obstacles, preferred_level.is_some(), config);
    if used_fallback {
        tracing::warn!(
            x = position.x,
            y = position.y,
            node = exclude_id.unwrap_or("<new>"),
            "placement search exhausted, using far-right fallback"
        );
    }
    Placement {
        position,
        level: config.level_for_y(position.y),
        used_fallback,
    }
}

pub fn resolve_position(
    target: Position,
    existing: &[Node],
    exclude_id: Option<&str>,
    preferred_level: Option<u32>,
    config: &LayoutConfig,
) -> Position {
    resolve_placement(target, existing, exclude_id, preferred_level, config).position
}

/// Places a freshly created node dropped at raw pixel `raw`: the level is the
/// nearest row (clamped to the supported range) and `x` is resolved around
/// the existing nodes. Returns a new list with the node appended.
pub fn insert_node(
    nodes: &[Node],
    mut node: Node,
    raw: Position,
    config: &LayoutConfig,
) -> (Vec<Node>, Placement) {
    let level = config.snap_level(raw.y);
    let target = raw.clamped_non_negative();
    let placement = resolve_placement(target, nodes, Some(&node.id), Some(level), config);
    node.position = placement.position;
    node.level = placement.level;
    let mut next: Vec<Node> = nodes
        .iter()
        .filter(|existing| existing.id != node.id)
        .cloned()
        .collect();
    next.push(node);
    (next, placement)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, x: f32, y: f32) -> Node {
        Node::new(id, Position::new(x, y), &LayoutConfig::default())
    }

    #[test]
    fn free_target_is_kept() {
        let config = LayoutConfig::default();
        let nodes = vec![node("a", 0.0, 0.0)];
        let pos = resolve_position(Position::new(500.0, 0.0), &nodes, None, None, &config);
        assert_eq!(pos, Position::new(500.0, 0.0));
    }

    #[test]
    fn steps_right_first() {
        let config = LayoutConfig::default();
        let nodes = vec![node("a", 100.0, 150.0)];
        let pos = resolve_position(Position::new(100.0, 150.0), &nodes, None, Some(1), &config);
        assert_eq!(pos, Position::new(320.0, 150.0));
    }

    #[test]
    fn excluded_node_is_ignored() {
        let config = LayoutConfig::default();
        let nodes = vec![node("a", 100.0, 150.0)];
        let pos = resolve_position(Position::new(100.0, 150.0), &nodes, Some("a"), None, &config);
        assert_eq!(pos, Position::new(100.0, 150.0));
    }

    #[test]
    fn preferred_level_snaps_y() {
        let config = LayoutConfig::default();
        let placement = resolve_placement(Position::new(40.0, 333.0), &[], None, Some(2), &config);
        assert_eq!(placement.position, Position::new(40.0, 300.0));
        assert_eq!(placement.level, 2);
        assert!(!placement.used_fallback);
    }

    #[test]
    fn steps_left_when_right_is_blocked() {
        let mut config = LayoutConfig::default();
        config.max_placement_attempts = 2;
        let step = config.placement_step();
        // Block the target and both right-hand candidates.
        let nodes = vec![
            node("a", 1000.0, 0.0),
            node("b", 1000.0 + step, 0.0),
            node("c", 1000.0 + 2.0 * step, 0.0),
        ];
        let pos = resolve_position(Position::new(1000.0, 0.0), &nodes, None, Some(0), &config);
        assert_eq!(pos, Position::new(1000.0 - step, 0.0));
    }

    #[test]
    fn left_search_never_goes_negative() {
        let mut config = LayoutConfig::default();
        config.max_placement_attempts = 1;
        let step = config.placement_step();
        let nodes = vec![node("a", 10.0, 0.0), node("b", 10.0 + step, 0.0)];
        let placement = resolve_placement(Position::new(10.0, 0.0), &nodes, None, Some(0), &config);
        assert!(placement.position.x >= 0.0);
        assert!(placement.used_fallback);
    }

    #[test]
    fn unconstrained_search_tries_other_rows() {
        let mut config = LayoutConfig::default();
        config.max_placement_attempts = 1;
        let step = config.placement_step();
        let nodes = vec![
            node("a", 10.0, 150.0),
            node("b", 10.0 + step, 150.0),
        ];
        let pos = resolve_position(Position::new(10.0, 150.0), &nodes, None, None, &config);
        assert_eq!(pos, Position::new(10.0, 0.0));
    }

    #[test]
    fn exhausted_search_falls_back_far_right() {
        let mut config = LayoutConfig::default();
        config.max_placement_attempts = 0;
        let nodes = vec![node("a", 0.0, 0.0), node("b", 400.0, 150.0)];
        let placement = resolve_placement(Position::new(0.0, 0.0), &nodes, None, Some(0), &config);
        assert!(placement.used_fallback);
        assert_eq!(placement.position.x, 400.0 + config.node_width + config.collision_padding);
        assert_eq!(placement.position.y, 0.0);
    }

    #[test]
    fn insert_snaps_raw_drop_point() {
        let config = LayoutConfig::default();
        let (nodes, placement) = insert_node(
            &[],
            Node::new("n", Position::default(), &config),
            Position::new(150.0, 310.0),
            &config,
        );
        assert_eq!(placement.level, 2);
        assert_eq!(nodes[0].position, Position::new(150.0, 300.0));
        assert_eq!(nodes[0].level, 2);
    }

    #[test]
    fn insert_clamps_level_range() {
        let config = LayoutConfig::default();
        let (nodes, _) = insert_node(
            &[],
            Node::new("n", Position::default(), &config),
            Position::new(-20.0, 99_999.0),
            &config,
        );
        assert_eq!(nodes[0].level, config.max_level);
        assert_eq!(nodes[0].position.x, 0.0);
    }
}
