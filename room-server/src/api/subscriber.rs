use {
    super::{
        handle_client_message,
        RoomError,
    },
    crate::{
        kernel::entities::{
            BidderId,
            ProductId,
        },
        room::{
            entities::ConnectionHandle,
            service::{
                attach::AttachInput,
                detach::DetachInput,
                Service,
            },
        },
    },
    anyhow::{
        anyhow,
        Result,
    },
    async_trait::async_trait,
    room_server_api_types::ws::ServerUpdateResponse,
};

/// Outbound half of the abstract bidirectional channel owned by the
/// transport layer. Sends may suspend on the subscriber's own delivery
/// buffer; the room is already decoupled from that by the bounded outbox.
#[async_trait]
pub trait MessageSink: Send {
    async fn send(&mut self, message: String) -> Result<()>;
}

/// Inbound half of the channel. `None` means the client hung up.
#[async_trait]
pub trait MessageStream: Send {
    async fn next(&mut self) -> Option<String>;
}

/// Subscriber is an actor that drives a single connection: it forwards the
/// room's events into the sink and dispatches client frames from the
/// stream, then detaches when either side goes away.
pub struct Subscriber<S, R> {
    service:    Service,
    connection: ConnectionHandle,
    sink:       S,
    stream:     R,
    closed:     bool,
}

impl<S: MessageSink, R: MessageStream> Subscriber<S, R> {
    /// Attaches to the product's room and sends the snapshot frame, so the
    /// client is consistent before the first broadcast event arrives.
    pub async fn connect(
        service: Service,
        product_id: ProductId,
        bidder: BidderId,
        sink: S,
        stream: R,
    ) -> Result<Self, RoomError> {
        let (connection, snapshot) = service
            .attach(AttachInput {
                product_id,
                bidder,
            })
            .await?;
        let mut subscriber = Self {
            service,
            connection,
            sink,
            stream,
            closed: false,
        };
        let frame = ServerUpdateResponse::from(&snapshot);
        if subscriber.send_json(&frame).await.is_err() {
            subscriber.closed = true;
        }
        Ok(subscriber)
    }

    pub fn subscriber_id(&self) -> u64 {
        self.connection.subscriber
    }

    pub async fn run(&mut self) {
        while !self.closed {
            if let Err(e) = self.handle_next().await {
                tracing::debug!(
                    subscriber = self.connection.subscriber,
                    error = ?e,
                    "Closing subscriber session"
                );
                break;
            }
        }
        self.service
            .detach(DetachInput {
                product_id: self.connection.product_id.clone(),
                subscriber: self.connection.subscriber,
            })
            .await;
    }

    async fn handle_next(&mut self) -> Result<()> {
        tokio::select! {
            maybe_event = self.connection.next_event() => {
                match maybe_event {
                    Some(event) => {
                        let update = ServerUpdateResponse::from(&event);
                        self.send_json(&update).await
                    }
                    // Detached, evicted as a slow consumer, or the room is
                    // gone; either way this session is over.
                    None => {
                        self.closed = true;
                        Err(anyhow!("room closed the event channel"))
                    }
                }
            },
            maybe_message = self.stream.next() => {
                match maybe_message {
                    Some(raw) => {
                        let response =
                            handle_client_message(&self.service, &self.connection, &raw).await;
                        self.send_json(&response).await
                    }
                    None => {
                        self.closed = true;
                        Err(anyhow!("client channel is closed"))
                    }
                }
            },
        }
    }

    async fn send_json<T: serde::Serialize>(&mut self, payload: &T) -> Result<()> {
        self.sink.send(serde_json::to_string(payload)?).await
    }
}
