use {
    super::{
        auction::AuctionStatus,
        bid::Bid,
    },
    crate::kernel::entities::Amount,
};

/// Events fanned out to every subscriber of one room, in acceptance order.
#[derive(Clone, Debug, PartialEq)]
pub enum RoomEvent {
    AuctionOpened,
    BidAccepted {
        bid:             Bid,
        current_highest: Amount,
    },
    AuctionClosed {
        winning_bid: Option<Bid>,
    },
}

/// What a freshly attached subscriber sees, so a late joiner is immediately
/// consistent with the broadcast stream.
#[derive(Clone, Debug, PartialEq)]
pub struct RoomSnapshot {
    pub status:      AuctionStatus,
    pub highest_bid: Option<Bid>,
    pub recent_bids: Vec<Bid>,
}
