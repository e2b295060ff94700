use {
    crate::kernel::entities::{
        Amount,
        BidderId,
    },
    time::OffsetDateTime,
};

/// Per-room monotonically increasing acceptance order, starting at 1.
pub type SequenceNumber = u64;

/// An accepted bid. Immutable once sequenced; the timestamp is assigned by
/// the room, never by the client.
#[derive(Clone, Debug, PartialEq)]
pub struct Bid {
    pub bidder:      BidderId,
    pub amount:      Amount,
    pub accepted_at: OffsetDateTime,
    pub sequence:    SequenceNumber,
}
