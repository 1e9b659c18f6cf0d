//! CLI module for compgraph.
//!
//! Commands:
//! - Output: json, print
//! - Queries: roots, tree, stats
//! - Run health: diagnostics

use clap::{Parser, Subcommand};
use std::collections::HashSet;
use std::fmt::Write;
use std::path::{Path, PathBuf};

use crate::config::{ExtractorConfig, CONFIG_FILE_NAME};
use crate::discover::discover_files;
use crate::error::Result;
use crate::graph::{build_graph, EntityId, Extraction, ExtractionGraph};
use crate::project::Project;

#[derive(Parser)]
#[command(name = "compgraph")]
#[command(about = "Extract the component graph of a UI codebase")]
#[command(override_help = HELP_TEXT)]
pub struct Cli {
    /// Project root directory (default: current directory)
    #[arg(short, long, default_value = ".")]
    pub root: PathBuf,

    /// Config file (default: <root>/.compgraph.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

const HELP_TEXT: &str = "
compgraph - component graph extractor

Output:
  json                  Serialized graph (componentList)
  print                 Human-readable trace

Query:
  roots                 Root components
  tree <name>           Descendants of a component, largest subtree first
  stats                 Graph statistics

Other:
  diagnostics           Skipped files and ambiguous names

Options:
  -r, --root <PATH>     Project root (default: .)
  -c, --config <PATH>   Config file (default: <root>/.compgraph.toml)
";

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Print the serialized graph as JSON
    Json {
        /// Single-line output
        #[arg(long)]
        compact: bool,
    },

    /// Print the human-readable trace
    Print,

    /// List root components
    Roots,

    /// Show a component's descendants
    Tree {
        /// Component name
        name: String,
    },

    /// Show graph statistics
    Stats,

    /// List diagnostics of the run
    Diagnostics,
}

impl Cli {
    /// The config to use: `--config` if given, else the root's default file.
    pub fn load_config(&self) -> ExtractorConfig {
        let path = self
            .config
            .clone()
            .unwrap_or_else(|| self.root.join(CONFIG_FILE_NAME));
        ExtractorConfig::load(&path)
    }
}

/// Discover files under `root` and run one extraction.
pub fn extract_root(root: &Path, config: &ExtractorConfig) -> Result<Extraction> {
    let files = discover_files(root)?;
    Ok(build_graph(&Project::new(files), config))
}

/// Render the output of `command` for a finished extraction.
pub fn render(command: &Commands, extraction: &Extraction) -> Result<String> {
    let graph = &extraction.graph;
    let out = match command {
        Commands::Json { compact: false } => graph.to_json_string()?,
        Commands::Json { compact: true } => serde_json::to_string(&graph.to_document())?,
        Commands::Print => graph.print(),
        Commands::Roots => render_roots(graph),
        Commands::Tree { name } => render_tree(graph, name),
        Commands::Stats => render_stats(extraction),
        Commands::Diagnostics => {
            if extraction.diagnostics.is_empty() {
                "No diagnostics.\n".to_string()
            } else {
                extraction
                    .diagnostics
                    .iter()
                    .map(|d| format!("{d}\n"))
                    .collect()
            }
        }
    };
    Ok(out)
}

fn render_roots(graph: &ExtractionGraph) -> String {
    let mut out = String::new();
    for root in graph.roots() {
        let _ = writeln!(
            out,
            "{} ({}) {} descendants  {}",
            root.name,
            root.id,
            graph.count_descendants(root.id),
            root.file_path.display()
        );
    }
    out
}

fn render_tree(graph: &ExtractionGraph, name: &str) -> String {
    let matches = graph.find_by_name(name);
    if matches.is_empty() {
        return format!("No component named '{name}'.\n");
    }

    let mut out = String::new();
    for component in matches {
        let _ = writeln!(out, "{} ({})", component.name, component.id);
        let mut visited = HashSet::from([component.id]);
        tree_lines(graph, component.id, 1, &mut visited, &mut out);
    }
    out
}

/// Indented children, largest subtree first. Shared or cyclic children are
/// listed once and marked instead of expanded again.
fn tree_lines(
    graph: &ExtractionGraph,
    id: EntityId,
    depth: usize,
    visited: &mut HashSet<EntityId>,
    out: &mut String,
) {
    for child in graph.sorted_children(id) {
        let indent = "  ".repeat(depth);
        if !visited.insert(child.id) {
            let _ = writeln!(out, "{indent}{} (seen)", child.name);
            continue;
        }
        let _ = writeln!(out, "{indent}{}", child.name);
        tree_lines(graph, child.id, depth + 1, visited, out);
    }
}

fn render_stats(extraction: &Extraction) -> String {
    let stats = extraction.stats();
    let mut out = String::new();
    let _ = writeln!(out, "Components:        {}", stats.component_count);
    let _ = writeln!(out, "Props:             {}", stats.prop_count);
    let _ = writeln!(out, "States:            {}", stats.state_count);
    let _ = writeln!(out, "Effects:           {}", stats.effect_count);
    let _ = writeln!(out, "Child edges:       {}", stats.child_edges);
    let _ = writeln!(out, "False-child edges: {}", stats.false_child_edges);
    let _ = writeln!(out, "Roots:             {}", stats.root_count);
    let _ = writeln!(out, "Cyclic:            {}", stats.cyclic);
    let _ = writeln!(out, "Diagnostics:       {}", extraction.diagnostics.len());
    out
}

/// Print usage help
pub fn print_usage() {
    print!("{}", HELP_TEXT);
}
