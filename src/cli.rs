use crate::config::load_config;
use crate::layout::{ChartOptions, compute_chart};
use crate::layout_dump::layout_dump_json;
use crate::model::{Diagnostic, Node, parse_nodes};
use crate::render::{render_svg, write_output_text};
use crate::tree_format::{import_tree, parse_tree};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "orgc", version, about = "Org chart layout and rendering")]
pub struct Args {
    /// Input file (.json) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout for SVG/JSON if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file (theme and render settings)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Input is a persisted tree ({id, children}) instead of a flat node list
    #[arg(long = "tree")]
    pub tree: bool,

    /// Re-flow x positions of the whole chart, keeping levels
    #[arg(short = 'a', long = "auto-layout")]
    pub auto_layout: bool,

    /// Only use explicit parentId links
    #[arg(long = "no-infer")]
    pub no_infer: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
    Json,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

pub fn run() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    let input = read_input(args.input.as_deref())?;
    let (nodes, mut diagnostics) = load_chart_input(&input, args.tree, &config.layout)?;

    let options = ChartOptions {
        auto_layout: args.auto_layout,
        infer_parents: !args.no_infer,
        ..Default::default()
    };
    let mut chart = compute_chart(&nodes, &options, &config.layout);
    diagnostics.append(&mut chart.diagnostics);
    chart.diagnostics = diagnostics;
    for diagnostic in &chart.diagnostics {
        tracing::info!(%diagnostic, "chart diagnostic");
    }

    match args.output_format {
        OutputFormat::Svg => {
            let svg = render_svg(&chart, &config.theme, &config.render, &config.layout);
            write_output_text(&svg, args.output.as_deref())?;
        }
        OutputFormat::Json => {
            let json = layout_dump_json(&chart)?;
            write_output_text(&json, args.output.as_deref())?;
        }
        OutputFormat::Png => write_png(&chart, &config, &args)?,
    }
    Ok(())
}

#[cfg(feature = "png")]
fn write_png(chart: &crate::layout::ChartLayout, config: &crate::config::Config, args: &Args) -> Result<()> {
    let output = ensure_output(&args.output, "png")?;
    let svg = render_svg(chart, &config.theme, &config.render, &config.layout);
    crate::render::write_output_png(&svg, &output, &config.render)
}

#[cfg(not(feature = "png"))]
fn write_png(_chart: &crate::layout::ChartLayout, _config: &crate::config::Config, _args: &Args) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn load_chart_input(
    input: &str,
    tree: bool,
    config: &crate::config::LayoutConfig,
) -> Result<(Vec<Node>, Vec<Diagnostic>)> {
    if tree {
        let record = parse_tree(input)?;
        let imported = import_tree(&record, config);
        return Ok((imported.nodes, imported.diagnostics));
    }
    Ok(parse_nodes(input)?)
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path
        && path != Path::new("-")
    {
        return Ok(std::fs::read_to_string(path)?);
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

#[cfg_attr(not(feature = "png"), allow(dead_code))]
fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}
