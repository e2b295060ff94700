use {
    crate::{
        bid::{
            BidData,
            BidResult,
            BidSubmit,
        },
        Amount,
        AuctionStatus,
    },
    serde::{
        Deserialize,
        Serialize,
    },
    strum::AsRefStr,
};

#[derive(Deserialize, Clone, Serialize, PartialEq, Debug)]
#[serde(tag = "method", content = "params")]
pub enum ClientMessage {
    #[serde(rename = "submit_bid")]
    SubmitBid { bid: BidSubmit },
}

#[derive(Deserialize, Clone, Serialize, PartialEq, Debug)]
pub struct ClientRequest {
    pub id:  String,
    #[serde(flatten)]
    pub msg: ClientMessage,
}

/// This enum is used to push an update to the client for the room it is
/// attached to. The snapshot variant is connection-scoped: it is sent once
/// right after attaching, never broadcast.
#[derive(Serialize, Clone, Deserialize, AsRefStr, PartialEq, Debug)]
#[serde(tag = "type")]
pub enum ServerUpdateResponse {
    #[serde(rename = "snapshot")]
    #[strum(serialize = "snapshot")]
    Snapshot {
        status:          AuctionStatus,
        current_highest: Option<BidData>,
        recent:          Vec<BidData>,
    },
    #[serde(rename = "auction_opened")]
    #[strum(serialize = "auction_opened")]
    AuctionOpened,
    #[serde(rename = "bid_accepted")]
    #[strum(serialize = "bid_accepted")]
    BidAccepted {
        bid:             BidData,
        current_highest: Amount,
    },
    #[serde(rename = "auction_closed")]
    #[strum(serialize = "auction_closed")]
    AuctionClosed { winning_bid: Option<BidData> },
}

#[derive(Serialize, Clone, Deserialize, PartialEq, Debug)]
#[serde(untagged)]
pub enum APIResponse {
    BidResult(BidResult),
}

#[derive(Serialize, Clone, Deserialize, PartialEq, Debug)]
#[serde(tag = "status", content = "result")]
pub enum ServerResultMessage {
    #[serde(rename = "success")]
    Success(Option<APIResponse>),
    #[serde(rename = "error")]
    Err(String),
}

/// The result for a specific client request, correlated by the request id.
/// Id is only None when the client message could not be parsed.
#[derive(Serialize, Deserialize, Clone, PartialEq, Debug)]
pub struct ServerResultResponse {
    pub id:     Option<String>,
    #[serde(flatten)]
    pub result: ServerResultMessage,
}
