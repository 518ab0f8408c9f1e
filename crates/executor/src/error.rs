use thiserror::Error;

use common::error::Error as GraphLibError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Channel sender failed: Receiver has been dropped.")]
    ChannelSendFailed,

    #[error("Graph processing error: {0}")]
    GraphError(#[from] GraphLibError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Failed to load configuration: {0}")]
    ConfigLoadError(String),

    #[error("Edge batch received before the vertex count was announced.")]
    MissingHeader,

    #[error("Pipeline task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}
