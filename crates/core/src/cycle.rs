use common::error::{Error, Result};
use common::types::{Edge, VertexId};
use tracing::error;

use super::graph::Graph;

/// Depth-first search for a directed cycle.
///
/// Roots are tried in index order `0..vertex_count` and the search stops at
/// the first back edge it meets, so at most one cycle is reported. The DFS is
/// iterative: predecessor graphs built by the shortest-path engine are often
/// one long chain, which would overflow the call stack with recursion.
#[derive(Debug, Clone, Default)]
pub struct CycleFinder {
    cycle: Option<Vec<Edge>>,
}

impl CycleFinder {
    /// Searches `graph` and verifies any cycle found.
    ///
    /// # Errors
    /// Returns `Error::MalformedCycle` if the extracted cycle is not a closed
    /// chain of incident edges. This indicates a bug, never bad input.
    pub fn new(graph: &Graph) -> Result<Self> {
        let n = graph.vertex_count();
        let mut marked = vec![false; n];
        let mut on_stack = vec![false; n];
        let mut edge_to: Vec<Option<Edge>> = vec![None; n];

        let mut cycle = None;
        for root in 0..n {
            if marked[root] {
                continue;
            }
            cycle = Self::dfs(graph, root, &mut marked, &mut on_stack, &mut edge_to)?;
            if cycle.is_some() {
                break;
            }
        }

        let finder = CycleFinder { cycle };
        finder.check()?;
        Ok(finder)
    }

    /// Runs one DFS tree from `root`. Returns the cycle closed by the first
    /// back edge, in forward order.
    fn dfs(
        graph: &Graph,
        root: VertexId,
        marked: &mut [bool],
        on_stack: &mut [bool],
        edge_to: &mut [Option<Edge>],
    ) -> Result<Option<Vec<Edge>>> {
        // Each frame is a vertex and the index of the next outgoing edge to visit.
        let mut stack: Vec<(VertexId, usize)> = vec![(root, 0)];
        marked[root] = true;
        on_stack[root] = true;

        while let Some(frame) = stack.last_mut() {
            let (v, next) = *frame;
            let adjacent = graph.adjacent(v)?;

            let Some(&edge) = adjacent.get(next) else {
                // post-order
                on_stack[v] = false;
                stack.pop();
                continue;
            };
            frame.1 += 1;

            let w = edge.to();
            if !marked[w] {
                edge_to[w] = Some(edge);
                marked[w] = true;
                on_stack[w] = true;
                stack.push((w, 0));
            } else if on_stack[w] {
                return Self::trace_back(edge, w, edge_to).map(Some);
            }
        }

        Ok(None)
    }

    /// Walks predecessor edges backwards from the back edge `closing` until
    /// reaching `w`, then returns the collected edges in forward order.
    fn trace_back(closing: Edge, w: VertexId, edge_to: &[Option<Edge>]) -> Result<Vec<Edge>> {
        let mut path = Vec::new();
        let mut trace = closing;
        while trace.from() != w {
            path.push(trace);
            trace = edge_to[trace.from()].ok_or_else(|| {
                Error::MalformedCycle(format!(
                    "vertex {} on the DFS stack has no tree edge",
                    trace.from()
                ))
            })?;
        }
        path.push(trace);
        path.reverse();
        Ok(path)
    }

    pub fn has_cycle(&self) -> bool {
        self.cycle.is_some()
    }

    /// The cycle in traversal order, or `None` if the graph is acyclic.
    pub fn cycle(&self) -> Option<&[Edge]> {
        self.cycle.as_deref()
    }

    pub fn into_cycle(self) -> Option<Vec<Edge>> {
        self.cycle
    }

    fn check(&self) -> Result<()> {
        match &self.cycle {
            Some(path) => validate_cycle(path).inspect_err(|e| {
                error!(error = %e, "cycle finder produced a malformed cycle");
            }),
            None => Ok(()),
        }
    }
}

/// Verifies that `path` is a non-empty, closed chain: each edge ends where the
/// next one starts and the last edge ends where the first one starts.
///
/// # Errors
/// Returns `Error::MalformedCycle` describing the first violation.
pub fn validate_cycle(path: &[Edge]) -> Result<()> {
    let (Some(first), Some(last)) = (path.first(), path.last()) else {
        return Err(Error::MalformedCycle("cycle has no edges".to_string()));
    };

    for pair in path.windows(2) {
        if pair[0].to() != pair[1].from() {
            return Err(Error::MalformedCycle(format!(
                "cycle edges {} and {} not incident",
                pair[0], pair[1]
            )));
        }
    }

    if last.to() != first.from() {
        return Err(Error::MalformedCycle(format!(
            "cycle edges {} and {} not incident",
            last, first
        )));
    }

    Ok(())
}
