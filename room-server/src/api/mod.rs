use {
    crate::{
        kernel::entities::Amount,
        room::{
            entities::{
                AuctionStatus,
                Bid,
                ConnectionHandle,
                RoomEvent,
                RoomSnapshot,
            },
            service::{
                submit_bid::SubmitBidInput,
                Service,
            },
        },
    },
    room_server_api_types as api_types,
    room_server_api_types::{
        bid::{
            BidData,
            BidResult,
        },
        ws::{
            APIResponse,
            ClientMessage,
            ClientRequest,
            ServerResultMessage,
            ServerResultResponse,
            ServerUpdateResponse,
        },
    },
};

pub mod loopback;
pub mod subscriber;

/// Why a request could not be honored. Every variant is recoverable by the
/// caller: the rejection travels back over the connection and the client
/// may resubmit, nothing here terminates the session.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    /// The auction window is not open (not yet started, closed, or ended).
    #[error("auction is not open for bidding")]
    AuctionNotOpen,
    /// The bid does not beat the current highest bid. Carries the amount to
    /// beat so the caller can retry informed.
    #[error("bid amount is too low, the amount to beat is {current}")]
    AmountTooLow { current: Amount },
    /// Missing bidder identity, or the submitting connection is no longer
    /// attached to the room.
    #[error("bidder is not authorized to bid in this room")]
    Unauthorized,
    /// The room could not take the submission in time (teardown racing the
    /// submission, or a saturated mailbox).
    #[error("auction room is currently unavailable")]
    RoomUnavailable,
    /// No auction exists for the referenced product.
    #[error("no auction found for this product")]
    NotFound,
}

impl From<&Bid> for BidData {
    fn from(bid: &Bid) -> Self {
        BidData {
            bidder:    bid.bidder.clone(),
            amount:    bid.amount,
            timestamp: bid.accepted_at,
            sequence:  bid.sequence,
        }
    }
}

impl From<AuctionStatus> for api_types::AuctionStatus {
    fn from(status: AuctionStatus) -> Self {
        match status {
            AuctionStatus::Pending => api_types::AuctionStatus::Pending,
            AuctionStatus::Open => api_types::AuctionStatus::Open,
            AuctionStatus::Closed => api_types::AuctionStatus::Closed,
        }
    }
}

impl From<&RoomEvent> for ServerUpdateResponse {
    fn from(event: &RoomEvent) -> Self {
        match event {
            RoomEvent::AuctionOpened => ServerUpdateResponse::AuctionOpened,
            RoomEvent::BidAccepted {
                bid,
                current_highest,
            } => ServerUpdateResponse::BidAccepted {
                bid:             bid.into(),
                current_highest: *current_highest,
            },
            RoomEvent::AuctionClosed { winning_bid } => ServerUpdateResponse::AuctionClosed {
                winning_bid: winning_bid.as_ref().map(BidData::from),
            },
        }
    }
}

impl From<&RoomSnapshot> for ServerUpdateResponse {
    fn from(snapshot: &RoomSnapshot) -> Self {
        ServerUpdateResponse::Snapshot {
            status:          snapshot.status.into(),
            current_highest: snapshot.highest_bid.as_ref().map(BidData::from),
            recent:          snapshot.recent_bids.iter().map(BidData::from).collect(),
        }
    }
}

/// Dispatches one raw client frame received on an attached connection and
/// returns the result to send back. The bidder identity and room come from
/// the connection, never from the payload.
#[tracing::instrument(skip_all, fields(product_id = %handle.product_id, name, result = "success"))]
pub async fn handle_client_message(
    service: &Service,
    handle: &ConnectionHandle,
    raw: &str,
) -> ServerResultResponse {
    let request = match serde_json::from_str::<ClientRequest>(raw) {
        Ok(request) => request,
        Err(e) => {
            tracing::Span::current().record("result", "error");
            return ServerResultResponse {
                id:     None,
                result: ServerResultMessage::Err(e.to_string()),
            };
        }
    };
    match request.msg {
        ClientMessage::SubmitBid { bid } => {
            tracing::Span::current().record("name", "submit_bid");
            let submitted = service
                .submit_bid(SubmitBidInput {
                    product_id: handle.product_id.clone(),
                    bidder:     handle.bidder.clone(),
                    amount:     bid.amount,
                    origin:     Some(handle.subscriber),
                })
                .await;
            match submitted {
                Ok(bid) => ServerResultResponse {
                    id:     Some(request.id),
                    result: ServerResultMessage::Success(Some(APIResponse::BidResult(BidResult {
                        bid: BidData::from(&bid),
                    }))),
                },
                Err(e) => {
                    tracing::Span::current().record("result", "error");
                    ServerResultResponse {
                        id:     Some(request.id),
                        result: ServerResultMessage::Err(e.to_string()),
                    }
                }
            }
        }
    }
}
