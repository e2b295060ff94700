use serde::{
    Deserialize,
    Serialize,
};

pub mod bid;
pub mod ws;

pub type ProductId = String;
pub type BidderId = String;

/// Monetary amount in minor currency units (e.g. cents).
pub type Amount = u64;

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "snake_case")]
pub enum AuctionStatus {
    Pending,
    Open,
    Closed,
}

#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct ErrorBodyResponse {
    pub error: String,
}
