use tracing::{error, info, warn};

use super::{error::Error, types::SharedGraph};
use common::{error::Error as GraphLibError, types::VertexId};
use spfa_core::{ShortestPathEngine, traits::GraphSolver};

/// Result of one solver run.
#[derive(Debug)]
pub struct SearchOutcome {
    pub source: VertexId,
    pub result: Result<ShortestPathEngine, GraphLibError>,
}

/// Runs a solver from each configured source over a finished graph.
///
/// Runs are independent and never mutate the graph; each one executes on
/// Tokio's blocking pool so long searches do not stall the runtime.
pub struct Searcher<S> {
    solver: S,
    graph: SharedGraph,
    sources: Vec<VertexId>,
}

impl<S> Searcher<S>
where
    S: GraphSolver + Clone + Send + 'static,
{
    pub fn new(graph: SharedGraph, sources: Vec<VertexId>, solver: S) -> Self {
        Searcher {
            graph,
            sources,
            solver,
        }
    }

    pub async fn search(self) -> Result<Vec<SearchOutcome>, Error> {
        info!(
            vertices = self.graph.vertex_count(),
            edges = self.graph.edge_count(),
            sources = ?self.sources,
            "Searcher: starting"
        );

        let mut outcomes = Vec::with_capacity(self.sources.len());
        for &source in &self.sources {
            let graph = self.graph.clone();
            let solver = self.solver.clone();

            let result = tokio::task::spawn_blocking(move || solver.solve(&graph, source)).await?;

            match &result {
                Ok(engine) if engine.has_negative_cycle() => {
                    info!(source, "Searcher: negative cycle found");
                }
                Ok(_) => info!(source, "Searcher: shortest paths computed"),
                Err(e) if e.is_internal() => {
                    error!(source, error = %e, "Searcher: self-check failed. Continuing.");
                }
                Err(e) => warn!(source, error = %e, "Searcher: run rejected. Continuing."),
            }

            outcomes.push(SearchOutcome { source, result });
        }

        Ok(outcomes)
    }
}
