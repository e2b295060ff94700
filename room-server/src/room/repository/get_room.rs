use {
    super::Repository,
    crate::{
        kernel::entities::ProductId,
        room::mailbox::RoomHandle,
    },
};

impl Repository {
    pub fn get_room(&self, product_id: &ProductId) -> Option<RoomHandle> {
        self.in_memory_store
            .rooms
            .get(product_id)
            .map(|entry| entry.value().clone())
    }
}
