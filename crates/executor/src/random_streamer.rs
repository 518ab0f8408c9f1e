use async_trait::async_trait;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc::Sender;
use tracing::info;

use super::config::RandomConfig;
use super::error::Error;
use super::types::{GraphMessage, GraphStreamer, send_graph};
use common::error::Error as GraphLibError;
use common::types::Edge;

/// Weights are `WEIGHT_STEP * k` for `k` uniform in `0..WEIGHT_LEVELS`.
const WEIGHT_STEP: f64 = 0.01;
const WEIGHT_LEVELS: u32 = 100;

/// Produces a random graph for demos and smoke runs.
///
/// Both endpoints of every edge are drawn uniformly from `0..vertices`, and
/// weights lie in `[0.00, 0.99]` in steps of `0.01`, so generated graphs never
/// contain a negative cycle. A fixed seed reproduces the same graph.
pub struct RandomStreamer {
    pub vertices: usize,
    pub edges: usize,
    pub seed: u64,
    pub batch_size: usize,
}

impl RandomStreamer {
    pub fn new(config: RandomConfig, batch_size: usize) -> Self {
        RandomStreamer {
            vertices: config.vertices,
            edges: config.edges,
            seed: config.seed,
            batch_size,
        }
    }

    fn generate(&self) -> Result<Vec<Edge>, Error> {
        if self.vertices == 0 && self.edges > 0 {
            return Err(GraphLibError::InvalidArgument(
                "cannot generate edges on a graph without vertices".to_string(),
            )
            .into());
        }

        let mut rng = SmallRng::seed_from_u64(self.seed);
        let vertex_range = 0..self.vertices;

        let edges = (0..self.edges)
            .map(|_| {
                let from = rng.random_range(vertex_range.clone());
                let to = rng.random_range(vertex_range.clone());
                let weight = WEIGHT_STEP * f64::from(rng.random_range(0..WEIGHT_LEVELS));
                Edge::new(from, to, weight)
            })
            .collect();
        Ok(edges)
    }
}

#[async_trait]
impl GraphStreamer for RandomStreamer {
    async fn run_stream(self, sender: Sender<GraphMessage>) -> Result<(), Error> {
        let edges = self.generate()?;

        info!(
            vertices = self.vertices,
            edges = edges.len(),
            seed = self.seed,
            "RandomStreamer: generated graph"
        );

        send_graph(&sender, self.vertices, &edges, self.batch_size).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn streamer(vertices: usize, edges: usize, seed: u64) -> RandomStreamer {
        RandomStreamer {
            vertices,
            edges,
            seed,
            batch_size: 4,
        }
    }

    #[test]
    fn test_edges_in_bounds() {
        let edges = streamer(10, 200, 7).generate().unwrap();

        assert_eq!(edges.len(), 200);
        for edge in edges {
            assert!(edge.from() < 10, "from vertex out of bounds");
            assert!(edge.to() < 10, "to vertex out of bounds");
            assert!(
                (0.0..1.0).contains(&edge.weight()),
                "weight out of bounds"
            );
        }
    }

    #[test]
    fn test_same_seed_same_graph() {
        assert_eq!(
            streamer(20, 50, 42).generate().unwrap(),
            streamer(20, 50, 42).generate().unwrap()
        );
    }

    #[test]
    fn test_edges_without_vertices_rejected() {
        assert!(streamer(0, 1, 1).generate().is_err());
        assert!(streamer(0, 0, 1).generate().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_batch_size() {
        let (tx, mut rx) = mpsc::channel(16);

        streamer(5, 10, 3).run_stream(tx).await.unwrap();

        assert_eq!(rx.recv().await, Some(GraphMessage::Header { vertex_count: 5 }));
        let mut sizes = Vec::new();
        while let Some(GraphMessage::Edges(batch)) = rx.recv().await {
            sizes.push(batch.len());
        }
        assert_eq!(sizes, vec![4, 4, 2]);
    }
}
