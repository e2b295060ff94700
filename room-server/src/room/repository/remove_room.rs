use {
    super::Repository,
    crate::{
        kernel::entities::ProductId,
        room::entities::RoomId,
    },
};

impl Repository {
    /// Removes the registry entry only while it still belongs to the given
    /// room instance; a predecessor's late teardown never removes a
    /// successor room.
    pub fn remove_room(&self, product_id: &ProductId, room_id: RoomId) -> bool {
        self.in_memory_store
            .rooms
            .remove_if(product_id, |_, handle| handle.room_id == room_id)
            .is_some()
    }
}
