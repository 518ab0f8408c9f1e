use csv::ReaderBuilder;
use serde::Deserialize;
use std::fs::File;
use std::path::PathBuf;
use tokio::sync::mpsc::Sender;
use tracing::{error, info};

use super::error::Error;
use super::types::{GraphMessage, GraphStreamer, send_graph};
use common::error::Error as GraphLibError;
use common::types::{Edge, VertexId};

// Helper struct for CSV parsing
#[derive(Debug, Deserialize, Default)]
pub struct CsvRecord {
    #[serde(rename = "from")]
    pub from_vertex: i64,

    #[serde(rename = "to")]
    pub to_vertex: i64,

    #[serde(rename = "weight")]
    pub weight: f64,
}

impl CsvRecord {
    fn to_edge(&self, vertex_count: usize) -> Result<Edge, GraphLibError> {
        let vertex = |id: i64| {
            usize::try_from(id).map_err(|_| GraphLibError::VertexOutOfRange {
                vertex: id,
                vertex_count,
            })
        };
        Ok(Edge::new(
            vertex(self.from_vertex)?,
            vertex(self.to_vertex)?,
            self.weight,
        ))
    }
}

/// Streams a graph stored as CSV with a `from,to,weight` header.
///
/// CSV carries no vertex count, so it is either given explicitly or taken
/// as one past the largest vertex id in the file.
pub struct CsvStreamer {
    path: PathBuf,
    vertices: Option<usize>,
    batch_size: usize,
}

impl CsvStreamer {
    pub fn new(path: PathBuf, vertices: Option<usize>, batch_size: usize) -> Self {
        CsvStreamer {
            path,
            vertices,
            batch_size,
        }
    }

    /// Reads every record and returns the vertex count with the edges.
    ///
    /// Negative ids are reported as out of range here; ids past the vertex
    /// count are left to the writer's graph.
    fn parse_csv_to_edges(&self) -> Result<(usize, Vec<Edge>), Error> {
        let file = File::open(&self.path).map_err(|e| {
            error!(path = %self.path.display(), error = %e, "failed to read CSV file");
            Error::IoError(e)
        })?;

        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let mut records = Vec::new();

        for result in rdr.deserialize() {
            let record: CsvRecord = result?;
            if !record.weight.is_finite() {
                return Err(GraphLibError::InvalidArgument(format!(
                    "weight of edge {}->{} must be finite, got {}",
                    record.from_vertex, record.to_vertex, record.weight
                ))
                .into());
            }
            records.push(record);
        }

        let vertex_count = self.vertex_count(&records);
        let edges = records
            .iter()
            .map(|record| record.to_edge(vertex_count))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((vertex_count, edges))
    }

    fn vertex_count(&self, records: &[CsvRecord]) -> usize {
        self.vertices.unwrap_or_else(|| {
            records
                .iter()
                .flat_map(|r| [r.from_vertex, r.to_vertex])
                .filter_map(|id| VertexId::try_from(id).ok())
                .max()
                .map_or(0, |max_id| max_id + 1)
        })
    }
}

#[async_trait::async_trait]
impl GraphStreamer for CsvStreamer {
    async fn run_stream(self, sender: Sender<GraphMessage>) -> Result<(), Error> {
        let (vertex_count, all_edges) = self.parse_csv_to_edges()?;

        info!(
            path = %self.path.display(),
            vertices = vertex_count,
            edges = all_edges.len(),
            "CsvStreamer: starting transfer"
        );

        send_graph(&sender, vertex_count, &all_edges, self.batch_size).await?;

        info!(edges = all_edges.len(), "CsvStreamer: transfer complete");
        Ok(())
    }
}
