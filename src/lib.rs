//! Org chart layout engine: hierarchy inference, collision-free placement,
//! level-preserving auto layout and connector routing over a flat node list.

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod geometry;
pub mod layout;
pub mod layout_dump;
pub mod model;
pub mod render;
pub mod theme;
pub mod tree_format;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, RenderConfig, load_config};
pub use geometry::Position;
pub use layout::{
    Arrow, ArrowKind, ChartLayout, ChartOptions, DragSession, Forest, PositionMap,
    apply_positions, build_hierarchy, compute_auto_layout, compute_chart, insert_node, pin_parents,
    resolve_position, route_arrows, settle_move,
};
pub use model::{ChartError, Diagnostic, Node, Payload};
pub use render::render_svg;
pub use theme::Theme;
pub use tree_format::{TreeRecord, export_tree, import_tree};
