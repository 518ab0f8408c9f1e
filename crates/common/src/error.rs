use thiserror::Error;

use super::types::VertexId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// A constructor or loader received a value it cannot represent, such as a
    /// negative vertex count or a non-finite weight.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Indicates an attempt to use a vertex index outside `0..vertex_count`.
    ///
    /// `vertex` is signed so negative ids read from input keep their value.
    #[error("Vertex {vertex} is not between 0 and {}.", .vertex_count.saturating_sub(1))]
    VertexOutOfRange { vertex: i64, vertex_count: usize },

    /// Distances and paths are undefined once a negative cycle has been confirmed.
    #[error("Negative cost cycle exists.")]
    NegativeCycleExists,

    /// The text graph format could not be read.
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// A reported cycle is not a closed chain of incident edges.
    #[error("Malformed cycle: {0}")]
    MalformedCycle(String),

    /// Distances and predecessor edges disagree after a run.
    #[error("Inconsistent shortest-path state: {0}")]
    InconsistentState(String),
}

impl Error {
    /// `VertexOutOfRange` for an id that is already a [`VertexId`].
    pub fn vertex_out_of_range(vertex: VertexId, vertex_count: usize) -> Self {
        Error::VertexOutOfRange {
            vertex: i64::try_from(vertex).unwrap_or(i64::MAX),
            vertex_count,
        }
    }

    /// True for the internal self-check failures, which indicate a bug rather than bad input.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Error::MalformedCycle(_) | Error::InconsistentState(_)
        )
    }
}
