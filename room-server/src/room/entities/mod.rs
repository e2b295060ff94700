mod auction;
mod bid;
mod event;
mod subscriber;

pub use {
    auction::{
        Auction,
        AuctionStatus,
        RoomId,
        RoomLock,
    },
    bid::{
        Bid,
        SequenceNumber,
    },
    event::{
        RoomEvent,
        RoomSnapshot,
    },
    subscriber::{
        ConnectionHandle,
        SubscriberId,
    },
};
