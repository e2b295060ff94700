use {
    crate::kernel::{
        entities::{
            Amount,
            ProductId,
        },
        store::AuctionSeed,
    },
    std::sync::Arc,
    time::OffsetDateTime,
    tokio::sync::Mutex,
    uuid::Uuid,
};

/// Identifies one live room instance. A product that is auctioned again
/// after its room was reclaimed gets a fresh id, so late teardown of the
/// predecessor can never touch the successor.
pub type RoomId = Uuid;

/// Serializes room creation per product id.
pub type RoomLock = Arc<Mutex<()>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuctionStatus {
    /// The auction window has not started; bids are rejected.
    Pending,
    /// Bids are accepted.
    Open,
    /// Terminal. Bids are rejected, subscribers may still read final state.
    Closed,
}

impl AuctionStatus {
    pub fn is_open(&self) -> bool {
        matches!(self, AuctionStatus::Open)
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, AuctionStatus::Closed)
    }
}

#[derive(Clone, Debug)]
pub struct Auction {
    pub product_id: ProductId,
    pub base_price: Amount,
    pub opens_at:   OffsetDateTime,
    pub closes_at:  OffsetDateTime,
    pub status:     AuctionStatus,
}

impl Auction {
    /// Builds the live auction state from catalog metadata. The initial
    /// status is derived from where `now` falls in the auction window.
    pub fn new(product_id: ProductId, seed: AuctionSeed, now: OffsetDateTime) -> Self {
        let status = if now >= seed.closes_at {
            AuctionStatus::Closed
        } else if now >= seed.opens_at {
            AuctionStatus::Open
        } else {
            AuctionStatus::Pending
        };
        Self {
            product_id,
            base_price: seed.base_price,
            opens_at: seed.opens_at,
            closes_at: seed.closes_at,
            status,
        }
    }
}
