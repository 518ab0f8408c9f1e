pub mod args;
pub mod config;
pub mod csv_streamer;
pub mod error;
pub mod producer;
pub mod random_streamer;
pub mod report;
pub mod searcher;
pub mod text_streamer;
pub mod types;
pub mod writer;

use clap::Parser;
use std::sync::Arc;
use tokio::sync::{mpsc, mpsc::Sender};
use tokio::task::JoinHandle;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use args::{Cli, Command};
use csv_streamer::CsvStreamer;
use error::Error;
use producer::Producer;
use random_streamer::RandomStreamer;
use report::Report;
use searcher::Searcher;
use spfa_core::{Graph, SPFASolver};
use text_streamer::TextStreamer;
use types::{DataSource, GraphMessage};
use writer::Writer;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        error!(error = %e, "spfa failed");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), Error> {
    let mut config = config::load_config(cli.config.as_deref())?;
    if let Command::Random {
        vertices,
        edges,
        seed,
    } = &cli.command
    {
        config.random.vertices = vertices.unwrap_or(config.random.vertices);
        config.random.edges = edges.unwrap_or(config.random.edges);
        config.random.seed = seed.unwrap_or(config.random.seed);
    }
    let sources = if cli.sources.is_empty() {
        config.search.sources.clone()
    } else {
        cli.sources.clone()
    };

    let graph = load_graph(&cli.command.data_source(), &config).await?;

    let searcher = Searcher::new(Arc::new(graph), sources, SPFASolver);
    for outcome in searcher.search().await? {
        match outcome.result {
            Ok(engine) => print!("{}", Report::new(&engine)),
            Err(e) => println!("source {}: {}", outcome.source, e),
        }
    }

    info!("Pipeline shut down.");
    Ok(())
}

/// Runs the producer and writer tasks and waits for the finished graph.
async fn load_graph(source: &DataSource, config: &config::Config) -> Result<Graph, Error> {
    let (sender, receiver) = mpsc::channel::<GraphMessage>(config.loader.channel_capacity.max(1));

    let producer_handle = spawn_producer(source, sender, config);
    let writer_handle = Writer::new(receiver).spawn_task();

    let (produced, written) = tokio::join!(producer_handle, writer_handle);
    match (produced?, written?) {
        // The writer stopped first; its error explains the closed channel.
        (Err(Error::ChannelSendFailed), Err(e)) => Err(e),
        (Err(e), _) => Err(e),
        (Ok(()), graph) => graph,
    }
}

pub fn spawn_producer(
    source: &DataSource,
    sender: Sender<GraphMessage>,
    config: &config::Config,
) -> JoinHandle<Result<(), Error>> {
    let batch_size = config.loader.batch_size;
    match source {
        DataSource::Text(path) => {
            info!("Starting TextStreamer producer task...");
            Producer::new(TextStreamer::new(path.clone(), batch_size)).spawn(sender)
        }
        DataSource::Csv { path, vertices } => {
            info!("Starting CsvStreamer producer task...");
            Producer::new(CsvStreamer::new(path.clone(), *vertices, batch_size)).spawn(sender)
        }
        DataSource::Random => {
            info!("Starting RandomStreamer producer task...");
            Producer::new(RandomStreamer::new(config.random.clone(), batch_size)).spawn(sender)
        }
    }
}
