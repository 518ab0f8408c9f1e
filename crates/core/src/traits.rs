use super::graph::Graph;
use super::solver::ShortestPathEngine;
use common::{
    error::Error,
    types::{VertexId, WeightedCycle},
};

/// Trait for single-source shortest-path solvers capable of detecting negative cycles.
pub trait GraphSolver {
    /// Runs the solver on `graph` from `source`.
    fn solve(&self, graph: &Graph, source: VertexId) -> Result<ShortestPathEngine, Error>;

    /// Detects a negative cycle reachable from `source`.
    ///
    /// Returns `Ok(Some(cycle))` if a negative cycle is found,
    /// `Ok(None)` if none exists, or `Err(e)` on failure.
    fn find_negative_cycle(
        &self,
        graph: &Graph,
        source: VertexId,
    ) -> Result<Option<WeightedCycle>, Error> {
        Ok(self.solve(graph, source)?.into_negative_cycle())
    }
}
