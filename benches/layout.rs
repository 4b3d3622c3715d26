use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use orgchart_layout::config::LayoutConfig;
use orgchart_layout::layout::{ChartOptions, compute_chart};
use orgchart_layout::model::Node;
use orgchart_layout::render::render_svg;
use orgchart_layout::theme::Theme;
use orgchart_layout::{Position, build_hierarchy, insert_node};
use std::hint::black_box;

/// Complete `fan_out`-ary tree, breadth first. Every other node keeps its
/// explicit parent; the rest are left for proximity inference.
fn synthetic_chart(count: usize, fan_out: usize, config: &LayoutConfig) -> Vec<Node> {
    let mut nodes = Vec::with_capacity(count);
    let mut level_of = Vec::with_capacity(count);
    for i in 0..count {
        let (level, parent) = if i == 0 {
            (0, None)
        } else {
            let p = (i - 1) / fan_out;
            (level_of[p] + 1, Some(p))
        };
        level_of.push(level);
        let x = (i as f32) * (config.node_width + config.horizontal_spacing);
        let mut node = Node::at_level(format!("n{i}"), x, level.min(config.max_level), config);
        if let Some(p) = parent
            && i % 2 == 0
        {
            node = node.with_parent(format!("n{p}"));
        }
        nodes.push(node);
    }
    nodes
}

fn bench_hierarchy(c: &mut Criterion) {
    let mut group = c.benchmark_group("hierarchy_build");
    let config = LayoutConfig::default();
    for count in [50usize, 200, 800] {
        let nodes = synthetic_chart(count, 4, &config);
        group.bench_with_input(BenchmarkId::from_parameter(count), &nodes, |b, nodes| {
            b.iter(|| {
                let forest = build_hierarchy(black_box(nodes), &config);
                black_box(forest.roots.len());
            });
        });
    }
    group.finish();
}

fn bench_auto_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("auto_layout");
    let config = LayoutConfig::default();
    let options = ChartOptions {
        auto_layout: true,
        ..Default::default()
    };
    for (count, fan_out) in [(50usize, 3usize), (200, 4), (800, 6)] {
        let name = format!("tree_{}_{}", count, fan_out);
        let nodes = synthetic_chart(count, fan_out, &config);
        group.bench_with_input(BenchmarkId::from_parameter(name), &nodes, |b, nodes| {
            b.iter(|| {
                let chart = compute_chart(black_box(nodes), &options, &config);
                black_box(chart.arrows.len());
            });
        });
    }
    group.finish();
}

fn bench_inserts(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_crowded_row");
    let config = LayoutConfig::default();
    for count in [10usize, 40, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| {
                let mut nodes: Vec<Node> = Vec::new();
                let raw = Position::new(100.0, 150.0);
                for i in 0..count {
                    nodes = insert_node(&nodes, Node::new(format!("n{i}"), raw, &config), raw, &config).0;
                }
                black_box(nodes.len());
            });
        });
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let config = LayoutConfig::default();
    let theme = Theme::modern();
    let render = orgchart_layout::config::RenderConfig::default();
    let nodes = synthetic_chart(200, 4, &config);
    let chart = compute_chart(&nodes, &ChartOptions::default(), &config);
    c.bench_function("render_svg_200", |b| {
        b.iter(|| {
            let svg = render_svg(black_box(&chart), &theme, &render, &config);
            black_box(svg.len());
        });
    });
}

criterion_group!(benches, bench_hierarchy, bench_auto_layout, bench_inserts, bench_render);
criterion_main!(benches);
