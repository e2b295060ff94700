use {
    super::entities::{
        Amount,
        ProductId,
    },
    crate::room::entities::Bid,
    async_trait::async_trait,
    std::collections::HashMap,
    time::OffsetDateTime,
    tokio::sync::RwLock,
};

#[cfg(test)]
use mockall::automock;

/// Auction metadata as registered by the surrounding product catalog. The
/// registry consults it once per room creation; the values are immutable for
/// the lifetime of the auction.
#[derive(Clone, Debug, PartialEq)]
pub struct AuctionSeed {
    pub base_price: Amount,
    pub opens_at:   OffsetDateTime,
    pub closes_at:  OffsetDateTime,
}

/// Read-only collaborator holding the product/auction metadata.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AuctionStore: Send + Sync {
    /// Returns None for an unknown product.
    async fn fetch_auction(&self, product_id: &ProductId) -> anyhow::Result<Option<AuctionSeed>>;
}

/// Write-behind collaborator for durable bid history. Failures are logged by
/// the caller and never surfaced to bidders; the in-memory room state stays
/// the source of truth for the live auction.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait BidRecorder: Send + Sync {
    async fn record_bid(&self, product_id: &ProductId, bid: &Bid) -> anyhow::Result<()>;
}

/// In-memory `AuctionStore` used by the simulator and tests.
#[derive(Default, Debug)]
pub struct StaticCatalog {
    auctions: RwLock<HashMap<ProductId, AuctionSeed>>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, product_id: ProductId, seed: AuctionSeed) {
        self.auctions.write().await.insert(product_id, seed);
    }
}

#[async_trait]
impl AuctionStore for StaticCatalog {
    async fn fetch_auction(&self, product_id: &ProductId) -> anyhow::Result<Option<AuctionSeed>> {
        Ok(self.auctions.read().await.get(product_id).cloned())
    }
}

/// `BidRecorder` that only logs. Stands in for the external persistence
/// collaborator in the simulator and tests.
#[derive(Default, Debug)]
pub struct LoggingRecorder;

#[async_trait]
impl BidRecorder for LoggingRecorder {
    async fn record_bid(&self, product_id: &ProductId, bid: &Bid) -> anyhow::Result<()> {
        tracing::debug!(
            product_id = %product_id,
            bidder = %bid.bidder,
            amount = bid.amount,
            sequence = bid.sequence,
            "Recorded bid"
        );
        Ok(())
    }
}
