use std::path::PathBuf;
use tokio::sync::mpsc::Sender;
use tracing::{error, info};

use super::error::Error;
use super::types::{GraphMessage, GraphStreamer};
use spfa_core::text::TextGraphReader;

/// Streams a graph stored in the plain-text format
/// (vertex count, edge count, then one `from to weight` line per edge).
pub struct TextStreamer {
    path: PathBuf,
    batch_size: usize,
}

impl TextStreamer {
    pub fn new(path: PathBuf, batch_size: usize) -> Self {
        TextStreamer {
            path,
            batch_size: batch_size.max(1),
        }
    }

    fn read_input(&self) -> Result<String, Error> {
        std::fs::read_to_string(&self.path).map_err(|e| {
            error!(path = %self.path.display(), error = %e, "failed to read graph file");
            Error::IoError(e)
        })
    }
}

#[async_trait::async_trait]
impl GraphStreamer for TextStreamer {
    async fn run_stream(self, sender: Sender<GraphMessage>) -> Result<(), Error> {
        let input = self.read_input()?;
        let reader = TextGraphReader::new(&input)?;
        let vertex_count = reader.vertex_count();

        info!(
            path = %self.path.display(),
            vertices = vertex_count,
            edges = reader.edge_count(),
            "TextStreamer: starting transfer"
        );

        sender
            .send(GraphMessage::Header { vertex_count })
            .await
            .map_err(|_| Error::ChannelSendFailed)?;

        let mut batch = Vec::with_capacity(self.batch_size);
        let mut edges_sent = 0;
        for edge in reader {
            batch.push(edge?);
            if batch.len() == self.batch_size {
                edges_sent += batch.len();
                let full = std::mem::replace(&mut batch, Vec::with_capacity(self.batch_size));
                sender
                    .send(GraphMessage::Edges(full))
                    .await
                    .map_err(|_| Error::ChannelSendFailed)?;
            }
        }
        if !batch.is_empty() {
            edges_sent += batch.len();
            sender
                .send(GraphMessage::Edges(batch))
                .await
                .map_err(|_| Error::ChannelSendFailed)?;
        }

        info!(edges = edges_sent, "TextStreamer: transfer complete");
        Ok(())
    }
}
