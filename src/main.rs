use std::fmt::Display;
use std::hash::Hash;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use itertools::Itertools;
use log::{debug, info};
use serde::Serialize;
use serde_json::json;

use louvain_community::config::{AppConfig, OutputFormat};
use louvain_community::labeled::LabeledGraph;
use louvain_community::logger::init_logger;
use louvain_community::louvain::{Detection, Louvain};
use louvain_community::GraphView;

/// Detect communities in an undirected graph with the Louvain method.
#[derive(Parser, Debug)]
#[command(name = "louvain", version, about)]
struct Args {
    /// Edge list (`u v` per line) or a `.graph` file.
    input: PathBuf,

    /// YAML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Print every coarsening level.
    #[arg(long)]
    levels: bool,

    #[arg(long)]
    max_levels: Option<usize>,

    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log at debug level.
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn app_config(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_yaml_file(path)?,
            None => AppConfig::default(),
        };
        if let Some(format) = self.format {
            config.output = format;
        }
        if self.levels {
            config.levels = true;
        }
        if self.max_levels.is_some() {
            config.louvain.max_levels = self.max_levels;
        }
        if self.log_file.is_some() {
            config.log.file = self.log_file.clone();
        }
        if self.verbose {
            config.log.level = "debug".to_owned();
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = args.app_config()?;
    init_logger(&config.log)?;
    debug!("Configuration: {:?}", config);

    let report = if is_graph_file(&args.input) {
        let graph = LabeledGraph::from_graph_file(&args.input)?;
        detect(&graph, &config)?
    } else {
        let graph = LabeledGraph::from_txt_file(&args.input)?;
        detect(&graph, &config)?
    };
    println!("{}", report);
    Ok(())
}

fn is_graph_file(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "graph")
}

fn detect<L>(graph: &LabeledGraph<L>, config: &AppConfig) -> Result<String>
where
    L: Clone + Eq + Hash + Display + Serialize,
{
    info!(
        "Loaded graph with {} vertices and {} edges",
        graph.graph().node_count(),
        graph.graph().edge_count()
    );
    let louvain = Louvain::with_config(config.louvain.clone());
    let detection = graph.run(&louvain).context("community detection failed")?;
    info!(
        "Found {} communities, modularity {:.6}",
        detection.communities.len(),
        detection.modularity
    );

    match config.output {
        OutputFormat::Text => Ok(render_text(graph, &detection, config.levels)),
        OutputFormat::Json => render_json(graph, &detection, config.levels),
    }
}

fn render_text<L: Clone + Eq + Hash + Display>(
    graph: &LabeledGraph<L>,
    detection: &Detection,
    levels: bool,
) -> String {
    let lines = |groups: &[Vec<u32>]| {
        graph
            .translate(groups)
            .iter()
            .map(|community| community.iter().join(" "))
            .join("\n")
    };
    if !levels {
        return lines(&detection.communities);
    }
    if detection.levels.is_empty() {
        // Nothing moved, the singletons are the only level.
        return format!(
            "# level 0 modularity {:.6}\n{}",
            detection.modularity,
            lines(&detection.communities)
        );
    }
    detection
        .levels
        .iter()
        .enumerate()
        .map(|(i, level)| {
            format!(
                "# level {} modularity {:.6}\n{}",
                i + 1,
                level.modularity,
                lines(&level.communities)
            )
        })
        .join("\n")
}

fn render_json<L: Clone + Eq + Hash + Serialize>(
    graph: &LabeledGraph<L>,
    detection: &Detection,
    levels: bool,
) -> Result<String> {
    let mut document = json!({
        "modularity": detection.modularity,
        "communities": graph.translate(&detection.communities),
    });
    if levels {
        document["levels"] = detection
            .levels
            .iter()
            .map(|level| {
                json!({
                    "modularity": level.modularity,
                    "communities": graph.translate(&level.communities),
                })
            })
            .collect();
    }
    serde_json::to_string_pretty(&document).context("failed to serialize the result")
}
