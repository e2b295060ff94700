use {
    super::Service,
    crate::{
        kernel::entities::ProductId,
        room::{
            entities::SubscriberId,
            mailbox::RoomCommand,
        },
    },
};

pub struct DetachInput {
    pub product_id: ProductId,
    pub subscriber: SubscriberId,
}

impl Service {
    /// Idempotent: detaching twice, after an eviction, or after the room is
    /// already gone are all no-ops.
    #[tracing::instrument(
        skip_all,
        fields(product_id = %input.product_id, subscriber = input.subscriber)
    )]
    pub async fn detach(&self, input: DetachInput) {
        if let Some(handle) = self.repo.get_room(&input.product_id) {
            handle
                .notify(RoomCommand::Detach {
                    subscriber: input.subscriber,
                })
                .await;
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
                release_if_empty::ReleaseIfEmptyInput,
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
    async fn repeated_detach_takes_effect_only_once() {
        let service =
            Service::new_with_catalog(&[(DEFAULT_PRODUCT_ID, open_seed(100))], test_config())
                .await;
        let (first, _) = service
            .attach(AttachInput {
                product_id: DEFAULT_PRODUCT_ID.to_string(),
                bidder:     "alice".to_string(),
            })
            .await
            .unwrap();
        let (_second, _) = service
            .attach(AttachInput {
                product_id: DEFAULT_PRODUCT_ID.to_string(),
                bidder:     "bob".to_string(),
            })
            .await
            .unwrap();

        for _ in 0..3 {
            service
                .detach(DetachInput {
                    product_id: DEFAULT_PRODUCT_ID.to_string(),
                    subscriber: first.subscriber,
                })
                .await;
        }

        service
            .close_room(CloseRoomInput {
                product_id: DEFAULT_PRODUCT_ID.to_string(),
            })
            .await
            .unwrap();

        // Bob is still attached; the triple detach of Alice must not have
        // emptied the room.
        assert!(
            !service
                .release_if_empty(ReleaseIfEmptyInput {
                    product_id: DEFAULT_PRODUCT_ID.to_string(),
                })
                .await
        );
        assert_eq!(service.room_count(), 1);
    }

    #[tokio::test]
    async fn detached_connection_can_no_longer_bid_through_its_origin() {
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
            .submit_bid(SubmitBidInput {
                product_id: DEFAULT_PRODUCT_ID.to_string(),
                bidder:     "alice".to_string(),
                amount:     100,
                origin:     Some(connection.subscriber),
            })
            .await
            .unwrap();

        service
            .detach(DetachInput {
                product_id: DEFAULT_PRODUCT_ID.to_string(),
                subscriber: connection.subscriber,
            })
            .await;

        let rejected = service
            .submit_bid(SubmitBidInput {
                product_id: DEFAULT_PRODUCT_ID.to_string(),
                bidder:     "alice".to_string(),
                amount:     200,
                origin:     Some(connection.subscriber),
            })
            .await;
        assert_eq!(rejected, Err(crate::api::RoomError::Unauthorized));
    }

    #[tokio::test]
    async fn detaching_without_a_room_is_a_no_op() {
        let service =
            Service::new_with_catalog(&[(DEFAULT_PRODUCT_ID, open_seed(100))], test_config())
                .await;
        service
            .detach(DetachInput {
                product_id: "never-created".to_string(),
                subscriber: 7,
            })
            .await;
        assert_eq!(service.room_count(), 0);
    }
}
