use {
    crate::{
        Amount,
        BidderId,
    },
    serde::{
        Deserialize,
        Serialize,
    },
    time::OffsetDateTime,
};

pub type SequenceNumber = u64;

/// An accepted bid as broadcast to subscribers and returned to the submitter.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct BidData {
    pub bidder:    BidderId,
    pub amount:    Amount,
    /// Server-side acceptance time, assigned by the room.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// Monotonically increasing per-room acceptance order.
    pub sequence:  SequenceNumber,
}

/// A bid submission as carried over the transport. The bidder identity is
/// connection-scoped and never part of the payload.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct BidSubmit {
    pub amount: Amount,
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct BidResult {
    pub bid: BidData,
}
