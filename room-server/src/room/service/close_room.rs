use {
    super::Service,
    crate::{
        api::RoomError,
        kernel::entities::ProductId,
        room::mailbox::RoomCommand,
    },
};

pub struct CloseRoomInput {
    pub product_id: ProductId,
}

impl Service {
    /// Administrative close. Idempotent with the end-of-auction timer: only
    /// the first trigger performs the transition and broadcasts
    /// `AuctionClosed`, every later call is absorbed by the room.
    #[tracing::instrument(skip_all, fields(product_id = %input.product_id))]
    pub async fn close_room(&self, input: CloseRoomInput) -> Result<(), RoomError> {
        let handle = self
            .repo
            .get_room(&input.product_id)
            .ok_or(RoomError::NotFound)?;
        handle
            .request(
                |respond_to| RoomCommand::Close { respond_to },
                self.config.submit_timeout,
            )
            .await
    }
}
