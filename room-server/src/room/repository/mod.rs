use {
    super::{
        entities::RoomLock,
        mailbox::RoomHandle,
    },
    crate::kernel::entities::ProductId,
    dashmap::DashMap,
    std::collections::HashMap,
    tokio::sync::Mutex,
};

mod add_room;
mod get_room;
mod get_or_create_room_lock;
mod remove_room;
mod remove_room_lock;

/// The only state shared across rooms: the process-wide product id to room
/// mapping plus the per-product creation locks. Everything inside a room is
/// private to its worker.
#[derive(Default, Debug)]
pub struct InMemoryStore {
    pub rooms:      DashMap<ProductId, RoomHandle>,
    pub room_locks: Mutex<HashMap<ProductId, RoomLock>>,
}

#[derive(Default, Debug)]
pub struct Repository {
    pub in_memory_store: InMemoryStore,
}

impl Repository {
    pub fn new() -> Self {
        Self::default()
    }
}
