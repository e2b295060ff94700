use {
    super::Service,
    crate::{
        api::RoomError,
        kernel::entities::ProductId,
        room::{
            entities::Auction,
            mailbox::RoomHandle,
        },
    },
    time::OffsetDateTime,
};

pub struct GetOrCreateRoomInput {
    pub product_id: ProductId,
}

impl Service {
    /// Returns the live room for the product, creating it when absent.
    /// Creation is serialized per product id, so concurrent first-time
    /// callers all observe the same room and the auction store is consulted
    /// once per created room.
    #[tracing::instrument(skip_all, fields(product_id = %input.product_id, room_id))]
    pub async fn get_or_create_room(
        &self,
        input: GetOrCreateRoomInput,
    ) -> Result<RoomHandle, RoomError> {
        if self.is_shutting_down() {
            return Err(RoomError::RoomUnavailable);
        }
        let lock = self
            .repo
            .get_or_create_room_lock(input.product_id.clone())
            .await;
        let _creation_guard = lock.lock().await;

        if let Some(handle) = self.repo.get_room(&input.product_id) {
            if !handle.is_closed() {
                tracing::Span::current().record("room_id", handle.room_id.to_string());
                return Ok(handle);
            }
            // The worker exited but its registry entry lingers; clear it and
            // build a fresh room below.
            self.repo.remove_room(&input.product_id, handle.room_id);
        }

        let seed = self
            .store
            .fetch_auction(&input.product_id)
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, "Failed to fetch auction metadata");
                RoomError::RoomUnavailable
            })?
            .ok_or(RoomError::NotFound)?;

        let auction = Auction::new(input.product_id.clone(), seed, OffsetDateTime::now_utc());
        let spawned = self.spawn_room(auction);
        let winner = self.repo.add_room(spawned.clone());
        if winner.room_id != spawned.room_id {
            spawned.try_shutdown();
        }
        tracing::Span::current().record("room_id", winner.room_id.to_string());
        Ok(winner)
    }
}
