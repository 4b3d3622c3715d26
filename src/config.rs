use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ── Node geometry ───────────────────────────────────────────────────
pub const NODE_WIDTH: f32 = 200.0;
pub const NODE_HEIGHT: f32 = 80.0;
/// Vertical distance between two adjacent levels.
pub const LEVEL_HEIGHT: f32 = 150.0;

// ── Auto layout ─────────────────────────────────────────────────────
/// Gap between sibling subtrees.
pub const HORIZONTAL_SPACING: f32 = 50.0;
/// Smallest clear gap between a parent's bottom edge and its child's top edge.
pub const MIN_VERTICAL_SPACING: f32 = LEVEL_HEIGHT - NODE_HEIGHT;
/// Extra span added to every subtree that has children.
pub const SUBTREE_PADDING: f32 = 20.0;
/// Gap between the spans of two root trees.
pub const FOREST_GAP: f32 = 100.0;
/// Left edge of the first root span.
pub const LAYOUT_ORIGIN_X: f32 = 50.0;

// ── Collision avoidance ─────────────────────────────────────────────
/// Margin added to both node dimensions for the overlap test.
pub const COLLISION_PADDING: f32 = 15.0;
/// Gap added to the node width for every search step of the resolver.
pub const PLACEMENT_STEP_GAP: f32 = 20.0;
/// Candidates tried in each search direction before the far-right fallback.
pub const MAX_PLACEMENT_ATTEMPTS: usize = 20;
/// Highest level reachable by snapping.
pub const MAX_LEVEL: u32 = 9;

// ── Hierarchy inference ─────────────────────────────────────────────
/// Horizontal distance below which a node on the level above may be inferred as parent.
pub const PROXIMITY_THRESHOLD: f32 = 300.0;

// ── Interaction ─────────────────────────────────────────────────────
/// Only every n-th pointer update of a drag moves the transient position.
pub const DRAG_THROTTLE: u32 = 3;
/// Quiet period before a settled drag position is committed.
pub const COMMIT_DEBOUNCE_MS: u64 = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub node_width: f32,
    pub node_height: f32,
    pub level_height: f32,
    pub horizontal_spacing: f32,
    pub min_vertical_spacing: f32,
    pub subtree_padding: f32,
    pub forest_gap: f32,
    pub origin_x: f32,
    pub collision_padding: f32,
    pub placement_step_gap: f32,
    pub max_placement_attempts: usize,
    pub max_level: u32,
    pub proximity_threshold: f32,
    pub drag_throttle: u32,
    pub commit_debounce_ms: u64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: NODE_WIDTH,
            node_height: NODE_HEIGHT,
            level_height: LEVEL_HEIGHT,
            horizontal_spacing: HORIZONTAL_SPACING,
            min_vertical_spacing: MIN_VERTICAL_SPACING,
            subtree_padding: SUBTREE_PADDING,
            forest_gap: FOREST_GAP,
            origin_x: LAYOUT_ORIGIN_X,
            collision_padding: COLLISION_PADDING,
            placement_step_gap: PLACEMENT_STEP_GAP,
            max_placement_attempts: MAX_PLACEMENT_ATTEMPTS,
            max_level: MAX_LEVEL,
            proximity_threshold: PROXIMITY_THRESHOLD,
            drag_throttle: DRAG_THROTTLE,
            commit_debounce_ms: COMMIT_DEBOUNCE_MS,
        }
    }
}

impl LayoutConfig {
    /// Horizontal distance covered by one resolver search step.
    pub fn placement_step(&self) -> f32 {
        self.node_width + self.placement_step_gap
    }

    /// Level whose row contains `y`, never negative.
    pub fn level_for_y(&self, y: f32) -> u32 {
        let level = (y / self.level_height).floor();
        if level.is_finite() && level > 0.0 {
            level as u32
        } else {
            0
        }
    }

    /// Nearest level row to `y`, clamped into the snappable range.
    pub fn snap_level(&self, y: f32) -> u32 {
        let level = (y / self.level_height).round();
        if !level.is_finite() || level <= 0.0 {
            return 0;
        }
        (level as u32).min(self.max_level)
    }

    pub fn level_y(&self, level: u32) -> f32 {
        level as f32 * self.level_height
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub background: String,
    /// Margin around the chart bounds in the rendered canvas.
    pub margin: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            background: "#FFFFFF".to_string(),
            margin: 40.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::classic();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            layout: LayoutConfig::default(),
            render,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    node_fill: Option<String>,
    node_border: Option<String>,
    text_color: Option<String>,
    secondary_text_color: Option<String>,
    line_color: Option<String>,
    background: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    width: Option<f32>,
    height: Option<f32>,
    margin: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    render: Option<RenderConfigFile>,
}

/// Loads presentation settings. Layout constants are fixed and never read from the file.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    // Strict JSON first, then JSON5 (comments, trailing commas).
    let parsed: ConfigFile = match serde_json::from_str(&contents) {
        Ok(parsed) => parsed,
        Err(_) => json5::from_str(&contents)?,
    };

    if let Some(theme_name) = parsed.theme.as_deref() {
        match theme_name {
            "modern" => config.theme = Theme::modern(),
            "default" | "classic" => config.theme = Theme::classic(),
            other => tracing::warn!(theme = other, "unknown theme name, keeping default"),
        }
        config.render.background = config.theme.background.clone();
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.node_fill {
            config.theme.node_fill = v;
        }
        if let Some(v) = vars.node_border {
            config.theme.node_border = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.secondary_text_color {
            config.theme.secondary_text_color = v;
        }
        if let Some(v) = vars.line_color {
            config.theme.line_color = v;
        }
        if let Some(v) = vars.background {
            config.render.background = v.clone();
            config.theme.background = v;
        }
    }

    if let Some(render) = parsed.render {
        if let Some(v) = render.width {
            config.render.width = v;
        }
        if let Some(v) = render.height {
            config.render.height = v;
        }
        if let Some(v) = render.margin {
            config.render.margin = v;
        }
    }

    Ok(config)
}
