use crate::layout::{Arrow, ChartLayout};
use crate::model::Diagnostic;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub width: f32,
    pub height: f32,
    pub roots: Vec<String>,
    pub nodes: Vec<NodeDump>,
    pub arrows: Vec<Arrow>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDump {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub level: u32,
    pub parent_id: Option<String>,
    pub children: Vec<String>,
    pub subtree_width: Option<f32>,
}

impl LayoutDump {
    pub fn from_chart(chart: &ChartLayout) -> Self {
        let nodes = chart
            .nodes
            .iter()
            .map(|node| {
                let entry = chart.forest.get(&node.id);
                NodeDump {
                    id: node.id.clone(),
                    x: node.position.x,
                    y: node.position.y,
                    level: node.level,
                    parent_id: chart.forest.parent_id(&node.id).map(str::to_string),
                    children: chart
                        .forest
                        .children_ids(&node.id)
                        .into_iter()
                        .map(str::to_string)
                        .collect(),
                    subtree_width: entry
                        .map(|e| e.subtree_width)
                        .filter(|width| *width > 0.0),
                }
            })
            .collect();

        LayoutDump {
            width: chart.width,
            height: chart.height,
            roots: chart
                .forest
                .root_ids()
                .into_iter()
                .map(str::to_string)
                .collect(),
            nodes,
            arrows: chart.arrows.clone(),
            diagnostics: chart.diagnostics.clone(),
        }
    }
}

pub fn layout_dump_json(chart: &ChartLayout) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&LayoutDump::from_chart(chart))?)
}
