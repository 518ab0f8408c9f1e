use tokio::sync::mpsc::Receiver;
use tracing::{debug, info};

use super::error::Error;
use super::types::GraphMessage;
use spfa_core::Graph;

/// Async consumer that assembles the streamed messages into a [`Graph`].
///
/// Edges are inserted in arrival order, so the adjacency order of the finished
/// graph matches the order of the source file.
pub struct Writer {
    receiver: Receiver<GraphMessage>,
}

impl Writer {
    pub fn new(receiver: Receiver<GraphMessage>) -> Self {
        Self { receiver }
    }

    /// Run the writer asynchronously.
    ///
    /// Consumes messages until every sender is dropped, then returns the graph.
    ///
    /// # Errors
    /// `Error::MissingHeader` if edges arrive before the vertex count, and
    /// `Error::GraphError` for an edge outside the announced vertex range.
    pub async fn build_graph(mut self) -> Result<Graph, Error> {
        debug!("Writer ready.");

        let mut graph: Option<Graph> = None;

        while let Some(message) = self.receiver.recv().await {
            match message {
                GraphMessage::Header { vertex_count } => {
                    debug!(vertex_count, "Writer: header received");
                    graph = Some(Graph::new(vertex_count));
                }
                GraphMessage::Edges(edges) => {
                    let graph = graph.as_mut().ok_or(Error::MissingHeader)?;
                    debug!(batch = edges.len(), "Writer: adding edges");
                    for edge in edges {
                        graph.add_edge(edge)?;
                    }
                }
            }
        }

        let graph = graph.ok_or(Error::MissingHeader)?;
        info!(
            vertices = graph.vertex_count(),
            edges = graph.edge_count(),
            "Writer: graph complete"
        );
        Ok(graph)
    }

    /// Public method that spawns the Writer task onto the Tokio runtime.
    ///
    /// This function consumes the Writer instance (`self`) and returns a JoinHandle,
    /// allowing the pipeline orchestrator to monitor the task.
    pub fn spawn_task(self) -> tokio::task::JoinHandle<Result<Graph, Error>> {
        tokio::spawn(self.build_graph())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::error::Error as GraphLibError;
    use common::types::Edge;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_builds_graph_in_arrival_order() {
        let (tx, rx) = mpsc::channel(8);
        let handle = Writer::new(rx).spawn_task();

        tx.send(GraphMessage::Header { vertex_count: 3 }).await.unwrap();
        tx.send(GraphMessage::Edges(vec![Edge::new(0, 2, 5.0), Edge::new(0, 1, 1.0)]))
            .await
            .unwrap();
        tx.send(GraphMessage::Edges(vec![Edge::new(1, 2, 1.0)]))
            .await
            .unwrap();
        drop(tx);

        let graph = handle.await.unwrap().unwrap();
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(
            graph.adjacent(0).unwrap(),
            &[Edge::new(0, 2, 5.0), Edge::new(0, 1, 1.0)]
        );
    }

    #[tokio::test]
    async fn test_edges_before_header_rejected() {
        let (tx, rx) = mpsc::channel(8);
        tx.send(GraphMessage::Edges(vec![Edge::new(0, 1, 1.0)]))
            .await
            .unwrap();
        drop(tx);

        let result = Writer::new(rx).build_graph().await;
        assert!(matches!(result, Err(Error::MissingHeader)));
    }

    #[tokio::test]
    async fn test_empty_stream_rejected() {
        let (tx, rx) = mpsc::channel::<GraphMessage>(1);
        drop(tx);

        assert!(matches!(
            Writer::new(rx).build_graph().await,
            Err(Error::MissingHeader)
        ));
    }

    #[tokio::test]
    async fn test_out_of_range_edge_rejected() {
        let (tx, rx) = mpsc::channel(8);
        tx.send(GraphMessage::Header { vertex_count: 2 }).await.unwrap();
        tx.send(GraphMessage::Edges(vec![Edge::new(0, 5, 1.0)]))
            .await
            .unwrap();
        drop(tx);

        let result = Writer::new(rx).build_graph().await;
        assert!(matches!(
            result,
            Err(Error::GraphError(GraphLibError::VertexOutOfRange { vertex: 5, .. }))
        ));
    }
}
