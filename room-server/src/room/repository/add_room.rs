use {
    super::Repository,
    crate::room::mailbox::RoomHandle,
    dashmap::mapref::entry::Entry,
};

impl Repository {
    /// Publishes a freshly spawned room, unless a live room already occupies
    /// the slot. Returns the winning handle; creation is serialized by the
    /// per-product room lock, so a losing insert only happens when a caller
    /// raced the lock teardown, and the entry arbitration keeps the
    /// one-room-per-product invariant regardless.
    pub fn add_room(&self, handle: RoomHandle) -> RoomHandle {
        match self.in_memory_store.rooms.entry(handle.product_id.clone()) {
            Entry::Occupied(mut entry) => {
                if entry.get().is_closed() {
                    entry.insert(handle.clone());
                    handle
                } else {
                    entry.get().clone()
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(handle.clone());
                handle
            }
        }
    }
}
