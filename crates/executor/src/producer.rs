use tokio::sync::mpsc::Sender;
use tracing::debug;

use super::{
    error::Error,
    types::{GraphMessage, GraphStreamer},
};

pub struct Producer<S: GraphStreamer> {
    streamer: S,
}

impl<S> Producer<S>
where
    S: GraphStreamer,
{
    pub fn new(streamer: S) -> Self {
        Producer { streamer }
    }

    pub fn spawn(self, sender: Sender<GraphMessage>) -> tokio::task::JoinHandle<Result<(), Error>> {
        debug!("Producer ready.");
        tokio::spawn(async move { self.streamer.run_stream(sender).await })
    }
}
