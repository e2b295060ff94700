//! Real-time auction room engine.
//!
//! Each auctioned product gets one [`room`]: a worker task that serializes
//! bid submissions, validates them against the current highest bid, fans
//! accepted bids out to every attached subscriber and enforces the auction
//! lifecycle. The [`api`] module is the transport-facing boundary; concrete
//! wire transports, persistence and identity live outside this crate behind
//! the seams in [`kernel`].

pub mod api;
pub mod config;
pub mod kernel;
pub mod room;
