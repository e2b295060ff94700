use {
    super::Repository,
    crate::{
        kernel::entities::ProductId,
        room::entities::RoomLock,
    },
};

impl Repository {
    #[tracing::instrument(skip_all)]
    pub async fn get_or_create_room_lock(&self, product_id: ProductId) -> RoomLock {
        self.in_memory_store
            .room_locks
            .lock()
            .await
            .entry(product_id)
            .or_default()
            .clone()
    }
}
