use {
    super::Repository,
    crate::kernel::entities::ProductId,
};

impl Repository {
    pub async fn remove_room_lock(&self, product_id: &ProductId) {
        self.in_memory_store.room_locks.lock().await.remove(product_id);
    }
}
