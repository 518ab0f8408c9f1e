use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc::Sender;

use super::error::Error;
use common::types::Edge;
use spfa_core::Graph;

/// A finished graph shared read-only between independent solver runs.
pub type SharedGraph = Arc<Graph>;

/// Message sent from a streamer to the writer.
///
/// A stream always starts with exactly one `Header`, followed by any number
/// of `Edges` batches.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphMessage {
    Header { vertex_count: usize },
    Edges(Vec<Edge>),
}

/// Where the executor reads its graph from.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    Text(PathBuf),
    Csv {
        path: PathBuf,
        vertices: Option<usize>,
    },
    Random,
}

/// A source that streams one graph into the loading pipeline: a header, then
/// edge batches, then it drops the sender.
#[async_trait::async_trait]
pub trait GraphStreamer: Send + Sync + 'static {
    async fn run_stream(self, sender: Sender<GraphMessage>) -> Result<(), Error>;
}

/// Sends the header followed by `edges` in chunks of `batch_size`.
pub(crate) async fn send_graph(
    sender: &Sender<GraphMessage>,
    vertex_count: usize,
    edges: &[Edge],
    batch_size: usize,
) -> Result<(), Error> {
    sender
        .send(GraphMessage::Header { vertex_count })
        .await
        .map_err(|_| Error::ChannelSendFailed)?;

    for chunk in edges.chunks(batch_size.max(1)) {
        sender
            .send(GraphMessage::Edges(chunk.to_vec()))
            .await
            .map_err(|_| Error::ChannelSendFailed)?;
    }
    Ok(())
}
