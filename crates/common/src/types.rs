use std::fmt;

/// Index of a vertex, valid in `0..vertex_count` of the graph it belongs to.
pub type VertexId = usize;

/// A weighted directed edge `from -> to`.
///
/// Edges are plain values: two edges with equal fields are interchangeable,
/// although a graph stores each inserted edge separately.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    from: VertexId,
    to: VertexId,
    weight: f64,
}

impl Edge {
    pub const fn new(from: VertexId, to: VertexId, weight: f64) -> Self {
        Edge { from, to, weight }
    }

    pub const fn from(&self) -> VertexId {
        self.from
    }

    pub const fn to(&self) -> VertexId {
        self.to
    }

    pub const fn weight(&self) -> f64 {
        self.weight
    }
}

impl From<(VertexId, VertexId, f64)> for Edge {
    fn from((from, to, weight): (VertexId, VertexId, f64)) -> Self {
        Edge::new(from, to, weight)
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}->{} {:.2}", self.from, self.to, self.weight)
    }
}

/// Represents a cycle in a weighted directed graph.
///
/// Fields:
/// - `path`: The edges forming the cycle, in traversal order. Each edge ends where
///   the next one starts and the last edge ends where the first one starts.
/// - `weight_sum`: Sum of the edge weights along the cycle; negative for the cycles
///   reported by the shortest-path engine.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedCycle {
    pub path: Vec<Edge>,
    pub weight_sum: f64,
}

impl WeightedCycle {
    pub fn from_path(path: Vec<Edge>) -> Self {
        let weight_sum = path.iter().map(Edge::weight).sum();
        WeightedCycle { path, weight_sum }
    }

    /// Returns true if walking the cycle lowers the distance (weight sum < 0).
    pub fn is_negative(&self) -> bool {
        self.weight_sum < 0.0
    }

    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// Vertices in the order the cycle visits them, starting at the first edge's source.
    pub fn vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.path.iter().map(Edge::from)
    }
}
