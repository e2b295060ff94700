use {
    super::subscriber::{
        MessageSink,
        MessageStream,
    },
    anyhow::anyhow,
    async_trait::async_trait,
    tokio::sync::mpsc,
};

/// In-process message channel with the same ownership shape as a real
/// transport: a bounded pipe per direction. Used by the simulator and the
/// tests; production deployments plug their own transport into the
/// [`MessageSink`]/[`MessageStream`] seams instead.
pub fn loopback_channel(capacity: usize) -> (LoopbackSink, LoopbackStream) {
    let (sender, receiver) = mpsc::channel(capacity);
    (LoopbackSink(sender), LoopbackStream(receiver))
}

pub struct LoopbackSink(mpsc::Sender<String>);

pub struct LoopbackStream(mpsc::Receiver<String>);

impl LoopbackStream {
    /// Non-async drain for callers that poll.
    pub fn try_next(&mut self) -> Option<String> {
        self.0.try_recv().ok()
    }
}

#[async_trait]
impl MessageSink for LoopbackSink {
    async fn send(&mut self, message: String) -> anyhow::Result<()> {
        self.0
            .send(message)
            .await
            .map_err(|_| anyhow!("loopback peer hung up"))
    }
}

#[async_trait]
impl MessageStream for LoopbackStream {
    async fn next(&mut self) -> Option<String> {
        self.0.recv().await
    }
}
