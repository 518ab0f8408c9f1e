use std::fmt;

use common::error::{Error, Result};
use common::types::{Edge, VertexId};

/// Directed multigraph with a fixed vertex set `0..vertex_count`.
///
/// Outgoing edges of each vertex are kept in insertion order:
/// - `adjacency[v]` -> edges leaving `v`, oldest first
/// - `indegree[w]` -> number of inserted edges ending at `w`
///
/// Parallel edges and self-loops are allowed. The only mutation is
/// [`Graph::add_edge`]; solvers borrow the graph immutably, so one graph can be
/// shared by several independent runs. `Clone` keeps every adjacency list in
/// the same order, which matters because path reconstruction depends on it.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    vertex_count: usize,
    edge_count: usize,
    adjacency: Vec<Vec<Edge>>,
    indegree: Vec<usize>,
}

impl Graph {
    /// Creates an empty graph on vertices `0..vertex_count`.
    pub fn new(vertex_count: usize) -> Self {
        Self {
            vertex_count,
            edge_count: 0,
            adjacency: vec![Vec::new(); vertex_count],
            indegree: vec![0; vertex_count],
        }
    }

    /// Creates a graph on `0..vertex_count` and inserts `(from, to, weight)` edges in order.
    ///
    /// # Errors
    /// Returns `Error::VertexOutOfRange` on the first edge with an endpoint
    /// outside the vertex set.
    pub fn from_edges<I>(vertex_count: usize, edges: I) -> Result<Self>
    where
        I: IntoIterator<Item = (VertexId, VertexId, f64)>,
    {
        let mut graph = Self::new(vertex_count);
        for (from, to, weight) in edges {
            graph.add_edge(Edge::new(from, to, weight))?;
        }
        Ok(graph)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// O(1) range check shared by every vertex-indexed query.
    ///
    /// # Errors
    /// Returns `Error::VertexOutOfRange` unless `v < vertex_count`.
    pub fn validate_vertex(&self, v: VertexId) -> Result<()> {
        if v < self.vertex_count {
            Ok(())
        } else {
            Err(Error::vertex_out_of_range(v, self.vertex_count))
        }
    }

    /// Appends `edge` to the adjacency list of its source vertex.
    ///
    /// # Errors
    /// Returns `Error::VertexOutOfRange` if either endpoint is outside the
    /// vertex set. The graph is left untouched in that case.
    pub fn add_edge(&mut self, edge: Edge) -> Result<()> {
        self.validate_vertex(edge.from())?;
        self.validate_vertex(edge.to())?;

        self.adjacency[edge.from()].push(edge);
        self.indegree[edge.to()] += 1;
        self.edge_count += 1;
        Ok(())
    }

    /// Edges leaving `v`, in insertion order.
    ///
    /// The returned slice can be iterated any number of times.
    pub fn adjacent(&self, v: VertexId) -> Result<&[Edge]> {
        self.validate_vertex(v)?;
        Ok(&self.adjacency[v])
    }

    pub fn out_degree(&self, v: VertexId) -> Result<usize> {
        self.validate_vertex(v)?;
        Ok(self.adjacency[v].len())
    }

    pub fn in_degree(&self, v: VertexId) -> Result<usize> {
        self.validate_vertex(v)?;
        Ok(self.indegree[v])
    }

    /// All edges, grouped by source vertex in ascending order and by insertion
    /// order within each vertex.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.adjacency.iter().flatten()
    }
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{} {}", self.vertex_count, self.edge_count)?;
        for (v, edges) in self.adjacency.iter().enumerate() {
            write!(f, "{}: ", v)?;
            for edge in edges {
                write!(f, "{}  ", edge)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
