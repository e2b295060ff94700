use {
    super::{
        auction::RoomId,
        event::RoomEvent,
    },
    crate::kernel::entities::{
        BidderId,
        ProductId,
    },
    tokio::sync::mpsc,
};

/// Identifies one subscriber within one room instance.
pub type SubscriberId = u64;

/// The transport layer's handle to one attached subscriber: identity plus
/// the consuming end of that subscriber's bounded event outbox. The room
/// only tracks membership; dropping the handle (or detaching) is always
/// safe, no matter what the room is doing concurrently.
#[derive(Debug)]
pub struct ConnectionHandle {
    pub product_id: ProductId,
    pub room_id:    RoomId,
    pub subscriber: SubscriberId,
    pub bidder:     BidderId,
    events:         mpsc::Receiver<RoomEvent>,
}

impl ConnectionHandle {
    pub(crate) fn new(
        product_id: ProductId,
        room_id: RoomId,
        subscriber: SubscriberId,
        bidder: BidderId,
        events: mpsc::Receiver<RoomEvent>,
    ) -> Self {
        Self {
            product_id,
            room_id,
            subscriber,
            bidder,
            events,
        }
    }

    /// Next event for this subscriber, in per-room acceptance order. None
    /// once the room is gone or this subscriber was detached/evicted.
    pub async fn next_event(&mut self) -> Option<RoomEvent> {
        self.events.recv().await
    }
}
