use {
    super::{
        get_or_create_room::GetOrCreateRoomInput,
        Service,
    },
    crate::{
        api::RoomError,
        kernel::entities::{
            Amount,
            BidderId,
            ProductId,
        },
        room::{
            entities::{
                Bid,
                SubscriberId,
            },
            mailbox::RoomCommand,
        },
    },
};

pub struct SubmitBidInput {
    pub product_id: ProductId,
    pub bidder:     BidderId,
    pub amount:     Amount,
    /// The submitting subscriber, when the bid arrives through an attached
    /// connection. None for trusted in-process callers.
    pub origin:     Option<SubscriberId>,
}

impl Service {
    /// Hands the submission to the room's sequencer and waits for the
    /// verdict, bounded by the configured submission timeout.
    #[tracing::instrument(
        skip_all,
        fields(
            product_id = %input.product_id,
            bidder = %input.bidder,
            amount = input.amount,
            sequence,
        ),
        err(level = tracing::Level::TRACE)
    )]
    pub async fn submit_bid(&self, input: SubmitBidInput) -> Result<Bid, RoomError> {
        for _ in 0..2 {
            let handle = self
                .get_or_create_room(GetOrCreateRoomInput {
                    product_id: input.product_id.clone(),
                })
                .await?;
            let verdict = handle
                .request(
                    |respond_to| RoomCommand::SubmitBid {
                        bidder: input.bidder.clone(),
                        amount: input.amount,
                        origin: input.origin,
                        respond_to,
                    },
                    self.config.submit_timeout,
                )
                .await;
            match verdict {
                Ok(result) => {
                    let bid = result?;
                    tracing::Span::current().record("sequence", bid.sequence);
                    return Ok(bid);
                }
                Err(RoomError::RoomUnavailable) if handle.is_closed() => continue,
                Err(e) => return Err(e),
            }
        }
        Err(RoomError::RoomUnavailable)
    }
}
