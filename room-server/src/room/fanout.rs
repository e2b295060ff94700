use {
    super::entities::{
        RoomEvent,
        SubscriberId,
    },
    crate::kernel::entities::BidderId,
    std::collections::HashMap,
    tokio::sync::mpsc::{
        self,
        error::TrySendError,
    },
};

struct Outbox {
    bidder: BidderId,
    sender: mpsc::Sender<RoomEvent>,
}

/// Delivers room events to every attached subscriber through its own
/// bounded queue. Sends never block the room: a subscriber whose queue is
/// full or whose receiver is gone is evicted so it cannot delay the others.
pub(crate) struct Fanout {
    subscribers:     HashMap<SubscriberId, Outbox>,
    next_subscriber: SubscriberId,
    buffer:          usize,
}

impl Fanout {
    pub fn new(buffer: usize) -> Self {
        Self {
            subscribers: HashMap::new(),
            next_subscriber: 0,
            buffer,
        }
    }

    pub fn attach(&mut self, bidder: BidderId) -> (SubscriberId, mpsc::Receiver<RoomEvent>) {
        self.next_subscriber += 1;
        let id = self.next_subscriber;
        let (sender, receiver) = mpsc::channel(self.buffer);
        self.subscribers.insert(id, Outbox { bidder, sender });
        (id, receiver)
    }

    /// Idempotent; detaching an unknown or already removed subscriber is a
    /// no-op.
    pub fn detach(&mut self, id: SubscriberId) -> bool {
        self.subscribers.remove(&id).is_some()
    }

    pub fn contains(&self, id: SubscriberId) -> bool {
        self.subscribers.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Fans one event out to every subscriber and returns the ones that had
    /// to be evicted (queue full or receiver dropped), already removed from
    /// the set.
    pub fn publish(&mut self, event: &RoomEvent) -> Vec<(SubscriberId, BidderId)> {
        let mut evicted = Vec::new();
        for (id, outbox) in &self.subscribers {
            match outbox.sender.try_send(event.clone()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) | Err(TrySendError::Closed(_)) => {
                    evicted.push((*id, outbox.bidder.clone()));
                }
            }
        }
        for (id, _) in &evicted {
            self.subscribers.remove(id);
        }
        evicted
    }
}
