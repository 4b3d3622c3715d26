use serde::{Deserialize, Serialize};

use crate::config::LayoutConfig;

/// Top-left corner of a node in content-space pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn clamped_non_negative(self) -> Self {
        Self {
            x: self.x.max(0.0),
            y: self.y.max(0.0),
        }
    }
}

/// Axis-aligned rectangle as `(x, y, width, height)`.
pub type Rect = (f32, f32, f32, f32);

pub fn node_rect(pos: Position, config: &LayoutConfig) -> Rect {
    (pos.x, pos.y, config.node_width, config.node_height)
}

pub fn rects_overlap(a: &Rect, b: &Rect) -> bool {
    a.0 < b.0 + b.2 && a.0 + a.2 > b.0 && a.1 < b.1 + b.3 && a.1 + a.3 > b.1
}

pub fn inflate_rect(rect: Rect, pad: f32) -> Rect {
    (rect.0, rect.1, rect.2 + pad, rect.3 + pad)
}

/// Whether two nodes placed at `a` and `b` collide once both boxes grow by
/// the collision padding. Nodes exactly `width + padding` apart do not collide.
pub fn nodes_collide(a: Position, b: Position, config: &LayoutConfig) -> bool {
    let pad = config.collision_padding;
    rects_overlap(
        &inflate_rect(node_rect(a, config), pad),
        &inflate_rect(node_rect(b, config), pad),
    )
}

/// Bottom-center anchor of a node box.
pub fn bottom_center(pos: Position, config: &LayoutConfig) -> (f32, f32) {
    (pos.x + config.node_width / 2.0, pos.y + config.node_height)
}

/// Top-center anchor of a node box.
pub fn top_center(pos: Position, config: &LayoutConfig) -> (f32, f32) {
    (pos.x + config.node_width / 2.0, pos.y)
}
