// Drag/drop state transitions.
// A node is settled, then dragging (transient position held in a DragSession),
// then settled again with a committed position and possibly a new level/parent.

use std::collections::HashMap;

use crate::config::LayoutConfig;
use crate::geometry::Position;
use crate::model::{Diagnostic, Node};

use super::collision::resolve_placement;
use super::types::Placement;

/// Whether `id` reaches `ancestor` by following `parents` links.
fn reports_to(parents: &HashMap<&str, &str>, id: &str, ancestor: &str) -> bool {
    let mut current = id;
    // Bounded walk: a list with a parent cycle must not spin forever.
    for _ in 0..=parents.len() {
        match parents.get(current) {
            Some(&parent) if parent == ancestor => return true,
            Some(&parent) => current = parent,
            None => return false,
        }
    }
    false
}

/// Applies a collision-resolved drop position to `old`.
///
/// The level follows the new row. When the level changed, the parent is
/// re-derived from the other nodes on the level directly above: a single
/// candidate is adopted, none clears the parent, several keep the current
/// parent only if it still sits on that level. Nodes reporting to `old`
/// are never candidates.
pub fn settle_move(old: &Node, resolved: Position, others: &[Node], config: &LayoutConfig) -> Node {
    let position = resolved.clamped_non_negative();
    let level = config.level_for_y(position.y);
    let mut next = old.clone();
    next.position = position;
    next.level = level;

    if level == old.level {
        return next;
    }

    let Some(above) = level.checked_sub(1) else {
        next.parent_id = None;
        return next;
    };
    let parents: HashMap<&str, &str> = others
        .iter()
        .filter_map(|n| n.parent_id.as_deref().map(|p| (n.id.as_str(), p)))
        .collect();
    let candidates: Vec<&Node> = others
        .iter()
        .filter(|n| n.id != old.id && n.level == above)
        .filter(|n| !reports_to(&parents, &n.id, &old.id))
        .collect();
    next.parent_id = match candidates.as_slice() {
        [] => None,
        [only] => Some(only.id.clone()),
        _ => old
            .parent_id
            .as_deref()
            .filter(|pid| candidates.iter().any(|c| c.id == *pid))
            .map(str::to_string),
    };
    tracing::debug!(
        node = %next.id,
        from_level = old.level,
        to_level = level,
        parent = next.parent_id.as_deref().unwrap_or("<root>"),
        "node moved to new level"
    );
    next
}

/// Result of committing a drop.
#[derive(Debug, Clone)]
pub struct DropOutcome {
    pub nodes: Vec<Node>,
    pub node: Node,
    pub placement: Placement,
}

impl DropOutcome {
    pub fn diagnostic(&self) -> Option<Diagnostic> {
        self.placement.diagnostic(&self.node.id)
    }
}

fn replace_node(nodes: &[Node], node: &Node) -> Vec<Node> {
    nodes
        .iter()
        .map(|n| if n.id == node.id { node.clone() } else { n.clone() })
        .collect()
}

fn commit_drop(committed: &Node, raw: Position, nodes: &[Node], config: &LayoutConfig) -> DropOutcome {
    let level = config.snap_level(raw.y);
    let target = raw.clamped_non_negative();
    let placement = resolve_placement(target, nodes, Some(&committed.id), Some(level), config);
    let node = settle_move(committed, placement.position, nodes, config);
    DropOutcome {
        nodes: replace_node(nodes, &node),
        node,
        placement,
    }
}

/// One-shot drop of node `id` at raw pixel `raw`, with the placement report.
/// `None` for unknown ids.
pub fn try_move_node(
    nodes: &[Node],
    id: &str,
    raw: Position,
    config: &LayoutConfig,
) -> Option<DropOutcome> {
    let Some(node) = nodes.iter().find(|n| n.id == id) else {
        tracing::warn!(node = id, "move requested for unknown node");
        return None;
    };
    Some(commit_drop(node, raw, nodes, config))
}

/// One-shot drop of node `id` at raw pixel `raw`. Unknown ids leave the list unchanged.
pub fn move_node(nodes: &[Node], id: &str, raw: Position, config: &LayoutConfig) -> Vec<Node> {
    try_move_node(nodes, id, raw, config)
        .map(|outcome| outcome.nodes)
        .unwrap_or_else(|| nodes.to_vec())
}

/// Transient state of one in-flight drag. Hosts keep at most one per node id.
#[derive(Debug, Clone)]
pub struct DragSession {
    committed: Node,
    transient: Position,
    latest: Position,
    last_seq: Option<u64>,
    updates_seen: u32,
    last_move_ms: u64,
    throttle: u32,
    debounce_ms: u64,
}

impl DragSession {
    pub fn begin(node: &Node, now_ms: u64, config: &LayoutConfig) -> Self {
        Self {
            committed: node.clone(),
            transient: node.position,
            latest: node.position,
            last_seq: None,
            updates_seen: 0,
            last_move_ms: now_ms,
            throttle: config.drag_throttle.max(1),
            debounce_ms: config.commit_debounce_ms,
        }
    }

    pub fn node_id(&self) -> &str {
        &self.committed.id
    }

    /// Position to draw while dragging.
    pub fn transient_position(&self) -> Position {
        self.transient
    }

    /// Feeds a pointer update. Updates with a sequence number not newer than
    /// the last accepted one are dropped. Returns true when the drawn
    /// position changed.
    pub fn update(&mut self, seq: u64, position: Position, now_ms: u64) -> bool {
        if self.last_seq.is_some_and(|last| seq <= last) {
            tracing::debug!(node = %self.committed.id, seq, "stale drag update ignored");
            return false;
        }
        self.last_seq = Some(seq);
        self.latest = position;
        self.last_move_ms = now_ms;
        self.updates_seen += 1;
        if self.updates_seen % self.throttle != 0 {
            return false;
        }
        self.transient = position;
        true
    }

    /// Whether the pointer has rested long enough to commit.
    pub fn ready_to_commit(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.last_move_ms) >= self.debounce_ms
    }

    /// Resolves the last pointer position against `nodes` and applies the
    /// level/parent transition.
    pub fn commit(self, nodes: &[Node], config: &LayoutConfig) -> DropOutcome {
        commit_drop(&self.committed, self.latest, nodes, config)
    }

    /// Abandons the drag; the committed node comes back unchanged.
    pub fn cancel(self) -> Node {
        self.committed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, x: f32, level: u32) -> Node {
        Node::at_level(id, x, level, &LayoutConfig::default())
    }

    #[test]
    fn own_reports_are_never_adopted() {
        let config = LayoutConfig::default();
        let nodes = vec![
            node("m", 0.0, 1),
            node("c", 400.0, 2).with_parent("m"),
            node("g", 800.0, 3).with_parent("c"),
        ];
        let next = move_node(&nodes, "m", Position::new(0.0, 450.0), &config);
        let m = next.iter().find(|n| n.id == "m").unwrap();
        assert_eq!(m.level, 3);
        assert_eq!(m.parent_id, None);

        let next = move_node(&nodes, "m", Position::new(0.0, 600.0), &config);
        let m = next.iter().find(|n| n.id == "m").unwrap();
        assert_eq!(m.level, 4);
        assert_eq!(m.parent_id, None);
        let forest = crate::layout::build_hierarchy(&next, &config);
        assert!(forest.diagnostics.is_empty());
    }

    #[test]
    fn crowded_row_reports_fallback() {
        let mut config = LayoutConfig::default();
        config.max_placement_attempts = 2;
        let step = config.placement_step();
        let mut nodes = vec![node("m", 0.0, 0)];
        for i in 0..3 {
            nodes.push(node(&format!("r{i}"), i as f32 * step, 1));
        }
        let outcome = try_move_node(&nodes, "m", Position::new(0.0, 150.0), &config).unwrap();
        assert!(outcome.placement.used_fallback);
        assert_eq!(
            outcome.diagnostic(),
            Some(Diagnostic::FallbackPlacement { node: "m".to_string() })
        );
        assert!(outcome.node.position.x > 2.0 * step);

        let calm = try_move_node(&nodes, "m", Position::new(2000.0, 150.0), &config).unwrap();
        assert_eq!(calm.diagnostic(), None);
        assert!(try_move_node(&nodes, "ghost", Position::default(), &config).is_none());
    }

    #[test]
    fn same_level_keeps_parent() {
        let config = LayoutConfig::default();
        let old = node("m", 0.0, 1).with_parent("boss");
        let others = vec![node("boss", 0.0, 0), node("other", 600.0, 0)];
        let moved = settle_move(&old, Position::new(900.0, 150.0), &others, &config);
        assert_eq!(moved.parent_id.as_deref(), Some("boss"));
        assert_eq!(moved.level, 1);
    }

    #[test]
    fn single_candidate_becomes_parent() {
        let config = LayoutConfig::default();
        let old = node("m", 0.0, 1).with_parent("boss");
        let others = vec![node("boss", 0.0, 0), node("lead", 400.0, 1)];
        let moved = settle_move(&old, Position::new(400.0, 300.0), &others, &config);
        assert_eq!(moved.level, 2);
        assert_eq!(moved.parent_id.as_deref(), Some("lead"));
    }

    #[test]
    fn empty_level_above_clears_parent() {
        let config = LayoutConfig::default();
        let old = node("m", 0.0, 1).with_parent("boss");
        let others = vec![node("boss", 0.0, 0)];
        let moved = settle_move(&old, Position::new(0.0, 450.0), &others, &config);
        assert_eq!(moved.level, 3);
        assert_eq!(moved.parent_id, None);
    }

    #[test]
    fn several_candidates_keep_consistent_parent() {
        let config = LayoutConfig::default();
        let old = node("m", 0.0, 3).with_parent("lead-b");
        let others = vec![node("lead-a", 0.0, 1), node("lead-b", 400.0, 1)];
        let moved = settle_move(&old, Position::new(0.0, 300.0), &others, &config);
        assert_eq!(moved.parent_id.as_deref(), Some("lead-b"));
    }

    #[test]
    fn several_candidates_drop_inconsistent_parent() {
        let config = LayoutConfig::default();
        let old = node("m", 0.0, 1).with_parent("boss");
        let others = vec![
            node("boss", 0.0, 0),
            node("lead-a", 0.0, 1),
            node("lead-b", 400.0, 1),
        ];
        let moved = settle_move(&old, Position::new(0.0, 300.0), &others, &config);
        assert_eq!(moved.parent_id, None);
    }

    #[test]
    fn moving_to_top_level_clears_parent() {
        let config = LayoutConfig::default();
        let old = node("m", 0.0, 1).with_parent("boss");
        let moved = settle_move(&old, Position::new(500.0, 0.0), &[node("boss", 0.0, 0)], &config);
        assert_eq!(moved.level, 0);
        assert_eq!(moved.parent_id, None);
    }

    #[test]
    fn negative_positions_are_clamped() {
        let config = LayoutConfig::default();
        let old = node("m", 0.0, 0);
        let moved = settle_move(&old, Position::new(-30.0, -5.0), &[], &config);
        assert_eq!(moved.position, Position::new(0.0, 0.0));
    }

    #[test]
    fn move_node_resolves_collisions() {
        let config = LayoutConfig::default();
        let nodes = vec![node("a", 100.0, 1), node("b", 700.0, 1)];
        let next = move_node(&nodes, "b", Position::new(110.0, 160.0), &config);
        let b = next.iter().find(|n| n.id == "b").unwrap();
        assert_eq!(b.position, Position::new(330.0, 150.0));
        assert_eq!(nodes[1].position.x, 700.0);
    }

    #[test]
    fn session_throttles_and_orders_updates() {
        let config = LayoutConfig::default();
        let n = node("m", 0.0, 0);
        let mut session = DragSession::begin(&n, 0, &config);
        assert!(!session.update(1, Position::new(10.0, 0.0), 5));
        assert!(!session.update(2, Position::new(20.0, 0.0), 10));
        assert!(session.update(3, Position::new(30.0, 0.0), 15));
        assert_eq!(session.transient_position(), Position::new(30.0, 0.0));
        assert!(!session.update(2, Position::new(999.0, 0.0), 20));
        assert_eq!(session.transient_position(), Position::new(30.0, 0.0));
        assert!(!session.ready_to_commit(50));
        assert!(session.ready_to_commit(15 + config.commit_debounce_ms));
    }

    #[test]
    fn session_commits_latest_pointer() {
        let config = LayoutConfig::default();
        let nodes = vec![node("boss", 0.0, 0), node("m", 600.0, 0)];
        let mut session = DragSession::begin(&nodes[1], 0, &config);
        session.update(1, Position::new(20.0, 160.0), 5);
        let outcome = session.commit(&nodes, &config);
        assert_eq!(outcome.node.level, 1);
        assert_eq!(outcome.node.parent_id.as_deref(), Some("boss"));
        assert_eq!(outcome.nodes.len(), 2);
    }

    #[test]
    fn cancelled_session_restores_node() {
        let config = LayoutConfig::default();
        let n = node("m", 40.0, 2).with_parent("x");
        let mut session = DragSession::begin(&n, 0, &config);
        session.update(1, Position::new(500.0, 10.0), 5);
        session.update(2, Position::new(600.0, 20.0), 6);
        session.update(3, Position::new(700.0, 30.0), 7);
        assert_eq!(session.cancel(), n);
    }
}
