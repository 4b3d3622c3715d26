use crate::config::{LayoutConfig, RenderConfig};
use crate::layout::{Arrow, ChartLayout, arrow_points};
use crate::model::Node;
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

/// Renders nodes and connectors. The chart is shifted by the render margin so
/// nodes at the origin are not clipped.
pub fn render_svg(
    chart: &ChartLayout,
    theme: &Theme,
    render: &RenderConfig,
    config: &LayoutConfig,
) -> String {
    let mut svg = String::new();
    let margin = render.margin;
    let width = (chart.width + margin * 2.0).max(200.0);
    let height = (chart.height + margin * 2.0).max(200.0);

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        render.background
    ));
    svg.push_str(&format!("<g transform=\"translate({margin:.2},{margin:.2})\">"));

    for arrow in &chart.arrows {
        svg.push_str(&arrow_svg(arrow, theme));
    }

    for node in &chart.nodes {
        svg.push_str(&node_svg(node, theme, config));
    }

    svg.push_str("</g></svg>");
    svg
}

fn arrow_svg(arrow: &Arrow, theme: &Theme) -> String {
    format!(
        "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"1.4\" data-type=\"{}\"/>",
        points_to_path(&arrow_points(arrow)),
        theme.line_color,
        arrow.kind.as_str()
    )
}

fn node_svg(node: &Node, theme: &Theme, config: &LayoutConfig) -> String {
    let mut out = String::new();
    let (x, y) = (node.position.x, node.position.y);
    out.push_str(&format!(
        "<rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"8\" ry=\"8\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1.4\" data-id=\"{}\"/>",
        config.node_width,
        config.node_height,
        theme.node_fill,
        theme.node_border,
        escape_xml(&node.id)
    ));

    let center_x = x + config.node_width / 2.0;
    let max_chars = max_label_chars(theme, config);
    let name = truncate_label(&node.display_name(), max_chars);
    let title = node.display_title().map(|t| truncate_label(&t, max_chars));
    let name_y = match title {
        Some(_) => y + config.node_height / 2.0 - theme.font_size * 0.2,
        None => y + config.node_height / 2.0 + theme.font_size * 0.35,
    };
    out.push_str(&format!(
        "<text x=\"{center_x:.2}\" y=\"{name_y:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" font-weight=\"600\" fill=\"{}\">{}</text>",
        theme.font_family,
        theme.font_size,
        theme.text_color,
        escape_xml(&name)
    ));
    if let Some(title) = title {
        let title_size = theme.font_size * 0.85;
        let title_y = name_y + title_size * 1.4;
        out.push_str(&format!(
            "<text x=\"{center_x:.2}\" y=\"{title_y:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{title_size:.2}\" fill=\"{}\">{}</text>",
            theme.font_family,
            theme.secondary_text_color,
            escape_xml(&title)
        ));
    }
    out
}

fn max_label_chars(theme: &Theme, config: &LayoutConfig) -> usize {
    let usable = (config.node_width - 16.0).max(0.0);
    let per_char = (theme.font_size * 0.6).max(1.0);
    ((usable / per_char) as usize).max(4)
}

fn truncate_label(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        return label.to_string();
    }
    let mut out: String = label.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn points_to_path(points: &[(f32, f32)]) -> String {
    if points.is_empty() {
        return String::new();
    }
    let mut d = String::new();
    d.push_str(&format!("M {:.2} {:.2}", points[0].0, points[0].1));
    for point in points.iter().skip(1) {
        d.push_str(&format!(" L {:.2} {:.2}", point.0, point.1));
    }
    d
}

pub fn write_output_text(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, text)?;
        }
        None => {
            print!("{}", text);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = "Inter".to_string();
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .ok_or_else(|| anyhow::anyhow!("Invalid render size"))?;

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{ChartOptions, compute_chart};

    #[test]
    fn render_svg_basic() {
        let config = LayoutConfig::default();
        let nodes = vec![
            Node::at_level("ceo", 0.0, 0, &config)
                .with_field("name", "Ada <Lovelace>")
                .with_field("title", "CEO"),
            Node::at_level("cto", 0.0, 1, &config).with_parent("ceo"),
        ];
        let chart = compute_chart(&nodes, &ChartOptions::default(), &config);
        let svg = render_svg(&chart, &Theme::modern(), &RenderConfig::default(), &config);
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Ada &lt;Lovelace&gt;"));
        assert!(svg.contains("CEO"));
        assert!(svg.contains("data-type=\"direct\""));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn long_labels_are_truncated() {
        let label = truncate_label("Maximilian Alexander Bartholomew-Featherstonehaugh", 10);
        assert_eq!(label.chars().count(), 10);
        assert!(label.ends_with('…'));
        assert_eq!(truncate_label("Ada", 10), "Ada");
    }
}
