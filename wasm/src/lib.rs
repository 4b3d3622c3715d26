use orgchart_layout::layout::try_move_node;
use orgchart_layout::layout_dump::layout_dump_json;
use orgchart_layout::model::parse_nodes;
use orgchart_layout::{
    ChartLayout, ChartOptions, Config, Diagnostic, Node, Position, RenderConfig, Theme,
    compute_chart, insert_node, render_svg,
};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartRenderOptions {
    theme: Option<String>,
    font_family: Option<String>,
    font_size: Option<f32>,
    auto_layout: Option<bool>,
    infer_parents: Option<bool>,
    offset_x: Option<f32>,
    offset_y: Option<f32>,
}

fn to_js(error: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn parse_options(options_json: Option<String>) -> Result<ChartRenderOptions, JsValue> {
    match options_json {
        Some(raw) => serde_json::from_str(&raw).map_err(to_js),
        None => Ok(ChartRenderOptions::default()),
    }
}

fn build_config(options: &ChartRenderOptions) -> Config {
    let mut config = Config::default();
    if options.theme.as_deref() == Some("modern") {
        config.theme = Theme::modern();
        config.render = RenderConfig {
            background: config.theme.background.clone(),
            ..RenderConfig::default()
        };
    }
    if let Some(font_family) = &options.font_family {
        config.theme.font_family = font_family.clone();
    }
    if let Some(font_size) = options.font_size {
        config.theme.font_size = font_size;
    }
    config
}

fn build_chart_options(options: &ChartRenderOptions) -> ChartOptions {
    ChartOptions {
        auto_layout: options.auto_layout.unwrap_or(false),
        infer_parents: options.infer_parents.unwrap_or(true),
        offset: (options.offset_x.unwrap_or(0.0), options.offset_y.unwrap_or(0.0)),
    }
}

/// New node list after an edit, plus anything worth surfacing to the user.
#[derive(Debug, Serialize)]
struct EditResult {
    nodes: Vec<Node>,
    diagnostics: Vec<Diagnostic>,
}

fn chart_from_json(
    nodes_json: &str,
    options: &ChartRenderOptions,
    config: &Config,
) -> Result<ChartLayout, JsValue> {
    let (nodes, mut diagnostics) = parse_nodes(nodes_json).map_err(to_js)?;
    let mut chart = compute_chart(&nodes, &build_chart_options(options), &config.layout);
    diagnostics.append(&mut chart.diagnostics);
    chart.diagnostics = diagnostics;
    Ok(chart)
}

/// Hierarchy, positions and connectors for a flat node list, as JSON.
#[wasm_bindgen]
pub fn layout_chart_json(nodes_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = parse_options(options_json)?;
    let config = build_config(&options);
    let chart = chart_from_json(nodes_json, &options, &config)?;
    layout_dump_json(&chart).map_err(to_js)
}

#[wasm_bindgen]
pub fn render_chart_svg(nodes_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = parse_options(options_json)?;
    let config = build_config(&options);
    let chart = chart_from_json(nodes_json, &options, &config)?;
    Ok(render_svg(&chart, &config.theme, &config.render, &config.layout))
}

/// Drops node `id` at canvas point (`x`, `y`). Returns `{nodes, diagnostics}`.
#[wasm_bindgen]
pub fn drop_node(nodes_json: &str, id: &str, x: f32, y: f32) -> Result<String, JsValue> {
    let config = Config::default();
    let nodes: Vec<Node> = serde_json::from_str(nodes_json).map_err(to_js)?;
    let result = match try_move_node(&nodes, id, Position::new(x, y), &config.layout) {
        Some(outcome) => EditResult {
            diagnostics: outcome.diagnostic().into_iter().collect(),
            nodes: outcome.nodes,
        },
        None => EditResult {
            nodes,
            diagnostics: Vec::new(),
        },
    };
    serde_json::to_string(&result).map_err(to_js)
}

/// Adds `node_json` at canvas point (`x`, `y`). Returns `{nodes, diagnostics}`.
#[wasm_bindgen]
pub fn add_node(nodes_json: &str, node_json: &str, x: f32, y: f32) -> Result<String, JsValue> {
    let config = Config::default();
    let nodes: Vec<Node> = serde_json::from_str(nodes_json).map_err(to_js)?;
    let node: Node = serde_json::from_str(node_json).map_err(to_js)?;
    let id = node.id.clone();
    let (next, placement) = insert_node(&nodes, node, Position::new(x, y), &config.layout);
    let result = EditResult {
        nodes: next,
        diagnostics: placement.diagnostic(&id).into_iter().collect(),
    };
    serde_json::to_string(&result).map_err(to_js)
}
