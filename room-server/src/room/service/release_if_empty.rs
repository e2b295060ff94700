use {
    super::Service,
    crate::{
        kernel::entities::ProductId,
        room::mailbox::RoomCommand,
    },
};

pub struct ReleaseIfEmptyInput {
    pub product_id: ProductId,
}

impl Service {
    /// Explicit reclamation sweep: removes the room only when it is Closed
    /// with no subscribers left, otherwise a no-op. Returns whether the
    /// room was removed. The worker also reclaims itself on the same
    /// condition, so calling this is never required for correctness.
    #[tracing::instrument(skip_all, fields(product_id = %input.product_id))]
    pub async fn release_if_empty(&self, input: ReleaseIfEmptyInput) -> bool {
        match self.repo.get_room(&input.product_id) {
            None => false,
            Some(handle) => handle
                .request(
                    |respond_to| RoomCommand::ReleaseIfEmpty { respond_to },
                    self.config.submit_timeout,
                )
                .await
                .unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            kernel::test_utils::DEFAULT_PRODUCT_ID,
            room::service::{
                attach::AttachInput,
                close_room::CloseRoomInput,
                detach::DetachInput,
                get_or_create_room::GetOrCreateRoomInput,
                submit_bid::SubmitBidInput,
                tests::{
                    open_seed,
                    test_config,
                },
                Service,
            },
        },
    };

    #[tokio::test]
    async fn released_rooms_are_recreated_fresh() {
        let service =
            Service::new_with_catalog(&[(DEFAULT_PRODUCT_ID, open_seed(100))], test_config())
                .await;
        let first_room = service
            .get_or_create_room(GetOrCreateRoomInput {
                product_id: DEFAULT_PRODUCT_ID.to_string(),
            })
            .await
            .unwrap();
        let (connection, _) = service
            .attach(AttachInput {
                product_id: DEFAULT_PRODUCT_ID.to_string(),
                bidder:     "alice".to_string(),
            })
            .await
            .unwrap();
        service
            .submit_bid(SubmitBidInput {
                product_id: DEFAULT_PRODUCT_ID.to_string(),
                bidder:     "alice".to_string(),
                amount:     500,
                origin:     None,
            })
            .await
            .unwrap();

        // Not removable while open, nor while a subscriber remains.
        assert!(
            !service
                .release_if_empty(ReleaseIfEmptyInput {
                    product_id: DEFAULT_PRODUCT_ID.to_string(),
                })
                .await
        );
        service
            .close_room(CloseRoomInput {
                product_id: DEFAULT_PRODUCT_ID.to_string(),
            })
            .await
            .unwrap();
        assert!(
            !service
                .release_if_empty(ReleaseIfEmptyInput {
                    product_id: DEFAULT_PRODUCT_ID.to_string(),
                })
                .await
        );

        service
            .detach(DetachInput {
                product_id: DEFAULT_PRODUCT_ID.to_string(),
                subscriber: connection.subscriber,
            })
            .await;
        // The worker reclaims itself once the last subscriber is gone.
        let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(2);
        while service.room_count() > 0 {
            assert!(tokio::time::Instant::now() < deadline, "room was never reclaimed");
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }

        // A fresh room takes over the product id with clean state: the old
        // highest bid is gone and the auction window decides the status.
        let second_room = service
            .get_or_create_room(GetOrCreateRoomInput {
                product_id: DEFAULT_PRODUCT_ID.to_string(),
            })
            .await
            .unwrap();
        assert_ne!(first_room.room_id, second_room.room_id);

        let (_connection, snapshot) = service
            .attach(AttachInput {
                product_id: DEFAULT_PRODUCT_ID.to_string(),
                bidder:     "late".to_string(),
            })
            .await
            .unwrap();
        assert!(snapshot.highest_bid.is_none());
        let accepted = service
            .submit_bid(SubmitBidInput {
                product_id: DEFAULT_PRODUCT_ID.to_string(),
                bidder:     "late".to_string(),
                amount:     100,
                origin:     None,
            })
            .await
            .unwrap();
        assert_eq!(accepted.sequence, 1);
    }

    #[tokio::test]
    async fn explicit_release_removes_a_closed_empty_room() {
        let service =
            Service::new_with_catalog(&[(DEFAULT_PRODUCT_ID, open_seed(100))], test_config())
                .await;
        let (connection, _) = service
            .attach(AttachInput {
                product_id: DEFAULT_PRODUCT_ID.to_string(),
                bidder:     "alice".to_string(),
            })
            .await
            .unwrap();
        service
            .close_room(CloseRoomInput {
                product_id: DEFAULT_PRODUCT_ID.to_string(),
            })
            .await
            .unwrap();
        service
            .detach(DetachInput {
                product_id: DEFAULT_PRODUCT_ID.to_string(),
                subscriber: connection.subscriber,
            })
            .await;

        // The detach may already have torn the room down; either the room
        // is gone or the sweep removes it now.
        let _ = service
            .release_if_empty(ReleaseIfEmptyInput {
                product_id: DEFAULT_PRODUCT_ID.to_string(),
            })
            .await;
        let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(2);
        while service.room_count() > 0 {
            assert!(tokio::time::Instant::now() < deadline, "room was never released");
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
    }
}
