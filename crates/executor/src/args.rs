use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::types::DataSource;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "spfa",
    version,
    about = "Single-source shortest paths with negative-cycle detection"
)]
pub struct Cli {
    /// Configuration file (default: crates/executor/Config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Source vertex; repeat to run from several sources. Overrides `search.sources`.
    #[arg(short, long = "source", global = true)]
    pub sources: Vec<usize>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Read a graph in the text format: vertex count, edge count, then `from to weight` lines.
    Text { path: PathBuf },

    /// Read a graph from a CSV file with a `from,to,weight` header.
    Csv {
        path: PathBuf,

        /// Vertex count; defaults to one past the largest vertex id in the file.
        #[arg(long)]
        vertices: Option<usize>,
    },

    /// Generate a random graph (parameters default to the `[random]` config section).
    Random {
        #[arg(long)]
        vertices: Option<usize>,
        #[arg(long)]
        edges: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
    },
}

impl Command {
    pub fn data_source(&self) -> DataSource {
        match self {
            Command::Text { path } => DataSource::Text(path.clone()),
            Command::Csv { path, vertices } => DataSource::Csv {
                path: path.clone(),
                vertices: *vertices,
            },
            Command::Random { .. } => DataSource::Random,
        }
    }
}
