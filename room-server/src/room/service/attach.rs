use {
    super::{
        get_or_create_room::GetOrCreateRoomInput,
        Service,
    },
    crate::{
        api::RoomError,
        kernel::entities::{
            BidderId,
            ProductId,
        },
        room::{
            entities::{
                ConnectionHandle,
                RoomSnapshot,
            },
            mailbox::RoomCommand,
        },
    },
};

pub struct AttachInput {
    pub product_id: ProductId,
    pub bidder:     BidderId,
}

impl Service {
    /// Registers a subscriber on the product's room and returns the
    /// connection handle together with a snapshot of the current state, so
    /// a newly joined client is immediately consistent with the event
    /// stream it is about to receive.
    #[tracing::instrument(
        skip_all,
        fields(product_id = %input.product_id, bidder = %input.bidder, subscriber)
    )]
    pub async fn attach(
        &self,
        input: AttachInput,
    ) -> Result<(ConnectionHandle, RoomSnapshot), RoomError> {
        // One retry: the room can reclaim itself between the registry
        // lookup and the mailbox send, in which case a fresh room takes
        // over the product id.
        for _ in 0..2 {
            let handle = self
                .get_or_create_room(GetOrCreateRoomInput {
                    product_id: input.product_id.clone(),
                })
                .await?;
            let attached = handle
                .request(
                    |respond_to| RoomCommand::Attach {
                        bidder: input.bidder.clone(),
                        respond_to,
                    },
                    self.config.submit_timeout,
                )
                .await;
            match attached {
                Ok(outcome) => {
                    tracing::Span::current().record("subscriber", outcome.subscriber);
                    let connection = ConnectionHandle::new(
                        handle.product_id.clone(),
                        handle.room_id,
                        outcome.subscriber,
                        input.bidder.clone(),
                        outcome.events,
                    );
                    return Ok((connection, outcome.snapshot));
                }
                Err(RoomError::RoomUnavailable) if handle.is_closed() => continue,
                Err(e) => return Err(e),
            }
        }
        Err(RoomError::RoomUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            kernel::test_utils::DEFAULT_PRODUCT_ID,
            room::{
                entities::{
                    AuctionStatus,
                    RoomEvent,
                },
                service::{
                    submit_bid::SubmitBidInput,
                    tests::{
                        expect_event,
                        open_seed,
                        test_config,
                    },
                },
            },
        },
    };

    fn attach_as(bidder: &str) -> AttachInput {
        AttachInput {
            product_id: DEFAULT_PRODUCT_ID.to_string(),
            bidder:     bidder.to_string(),
        }
    }

    #[tokio::test]
    async fn late_joiner_snapshot_matches_the_accepted_history() {
        let service =
            Service::new_with_catalog(&[(DEFAULT_PRODUCT_ID, open_seed(100))], test_config())
                .await;
        for amount in [100u64, 120, 150] {
            service
                .submit_bid(SubmitBidInput {
                    product_id: DEFAULT_PRODUCT_ID.to_string(),
                    bidder: "early".to_string(),
                    amount,
                    origin: None,
                })
                .await
                .unwrap();
        }

        let (_connection, snapshot) = service.attach(attach_as("late")).await.unwrap();
        assert_eq!(snapshot.status, AuctionStatus::Open);
        assert_eq!(snapshot.highest_bid.as_ref().unwrap().amount, 150);
        let amounts: Vec<u64> = snapshot.recent_bids.iter().map(|bid| bid.amount).collect();
        assert_eq!(amounts, vec![100, 120, 150]);
    }

    #[tokio::test]
    async fn subscribers_observe_accepted_bids_in_identical_order() {
        let service =
            Service::new_with_catalog(&[(DEFAULT_PRODUCT_ID, open_seed(100))], test_config())
                .await;
        let (mut first, _) = service.attach(attach_as("first")).await.unwrap();
        let (mut second, _) = service.attach(attach_as("second")).await.unwrap();

        for (bidder, amount) in [("x", 150u64), ("y", 200)] {
            service
                .submit_bid(SubmitBidInput {
                    product_id: DEFAULT_PRODUCT_ID.to_string(),
                    bidder: bidder.to_string(),
                    amount,
                    origin: None,
                })
                .await
                .unwrap();
        }

        for connection in [&mut first, &mut second] {
            match expect_event(connection).await {
                RoomEvent::BidAccepted { bid, .. } => {
                    assert_eq!((bid.amount, bid.sequence), (150, 1));
                }
                other => panic!("unexpected event: {other:?}"),
            }
            match expect_event(connection).await {
                RoomEvent::BidAccepted { bid, .. } => {
                    assert_eq!((bid.amount, bid.sequence), (200, 2));
                }
                other => panic!("unexpected event: {other:?}"),
            }
        }
    }
}
