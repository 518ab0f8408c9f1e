//! Plain-text graph format.
//!
//! ```text
//! <vertex count>
//! <edge count E>
//! <from> <to> <weight>     (E lines)
//! ```
//!
//! Tokens are whitespace separated and blank lines are skipped.

use std::str::FromStr;

use common::error::{Error, Result};
use common::types::{Edge, VertexId};

use super::graph::Graph;

/// Parses a vertex or edge count. `what` names the value in error messages.
///
/// # Errors
/// `Error::InvalidArgument` for a negative count, `Error::Parse` otherwise.
pub fn parse_count(line: &str, line_no: usize, what: &str) -> Result<usize> {
    let value: i64 = line.trim().parse().map_err(|e| Error::Parse {
        line: line_no,
        message: format!("{} {:?}: {}", what, line.trim(), e),
    })?;

    usize::try_from(value)
        .map_err(|_| Error::InvalidArgument(format!("{} must be nonnegative, got {}", what, value)))
}

/// Parses a vertex id and checks it against `vertex_count`.
///
/// # Errors
/// `Error::Parse` for a non-integer token, `Error::VertexOutOfRange` for an id
/// outside `0..vertex_count`, negative ids included.
pub fn parse_vertex(token: &str, line_no: usize, vertex_count: usize) -> Result<VertexId> {
    let value: i64 = token.parse().map_err(|e| Error::Parse {
        line: line_no,
        message: format!("vertex {:?}: {}", token, e),
    })?;

    usize::try_from(value)
        .ok()
        .filter(|&v| v < vertex_count)
        .ok_or(Error::VertexOutOfRange {
            vertex: value,
            vertex_count,
        })
}

/// Parses one `from to weight` line of a graph with `vertex_count` vertices.
///
/// # Errors
/// `Error::Parse` for a missing, extra or unreadable token,
/// `Error::VertexOutOfRange` for an endpoint outside the graph and
/// `Error::InvalidArgument` for a non-finite weight.
pub fn parse_edge_line(line: &str, line_no: usize, vertex_count: usize) -> Result<Edge> {
    let parse_err = |message: String| Error::Parse {
        line: line_no,
        message,
    };

    let tokens: Vec<&str> = line.split_whitespace().collect();
    let &[from, to, weight] = tokens.as_slice() else {
        return Err(parse_err(format!(
            "expected `<from> <to> <weight>`, got {} tokens",
            tokens.len()
        )));
    };

    let from = parse_vertex(from, line_no, vertex_count)?;
    let to = parse_vertex(to, line_no, vertex_count)?;
    let weight: f64 = weight
        .parse()
        .map_err(|e| parse_err(format!("weight {:?}: {}", weight, e)))?;
    if !weight.is_finite() {
        return Err(Error::InvalidArgument(format!(
            "weight on line {} must be finite, got {}",
            line_no, weight
        )));
    }

    Ok(Edge::new(from, to, weight))
}

/// Streaming reader over the text format.
///
/// The header is parsed eagerly by [`TextGraphReader::new`]; edges are parsed
/// lazily as the iterator advances, so large inputs can be forwarded in batches.
pub struct TextGraphReader<'a> {
    input: &'a str,
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
    vertex_count: usize,
    edge_count: usize,
    remaining: usize,
}

impl<'a> TextGraphReader<'a> {
    /// Reads the vertex and edge counts.
    ///
    /// # Errors
    /// `Error::Parse` for a missing or unreadable count and
    /// `Error::InvalidArgument` for a negative one.
    pub fn new(input: &'a str) -> Result<Self> {
        let mut reader = TextGraphReader {
            input,
            lines: input.lines().enumerate(),
            vertex_count: 0,
            edge_count: 0,
            remaining: 0,
        };

        let (line_no, line) = reader.next_line("vertex count")?;
        reader.vertex_count = parse_count(line, line_no, "vertex count")?;

        let (line_no, line) = reader.next_line("edge count")?;
        reader.edge_count = parse_count(line, line_no, "edge count")?;
        reader.remaining = reader.edge_count;

        Ok(reader)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Number of edge lines announced by the header.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Next non-blank line with its 1-based line number.
    fn next_line(&mut self, expected: &str) -> Result<(usize, &'a str)> {
        self.lines
            .find(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| (i + 1, line))
            .ok_or_else(|| Error::Parse {
                line: self.input.lines().count() + 1,
                message: format!("unexpected end of input, expected {}", expected),
            })
    }
}

impl Iterator for TextGraphReader<'_> {
    type Item = Result<Edge>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let vertex_count = self.vertex_count;
        Some(
            self.next_line("edge")
                .and_then(|(line_no, line)| parse_edge_line(line, line_no, vertex_count)),
        )
    }
}

/// Parses a whole graph in the text format.
pub fn parse_graph(input: &str) -> Result<Graph> {
    let reader = TextGraphReader::new(input)?;
    let mut graph = Graph::new(reader.vertex_count());
    for edge in reader {
        graph.add_edge(edge?)?;
    }
    Ok(graph)
}

impl FromStr for Graph {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_graph(s)
    }
}
