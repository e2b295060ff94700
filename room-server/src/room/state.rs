use {
    super::{
        entities::{
            Auction,
            AuctionStatus,
            Bid,
            RoomEvent,
            RoomId,
            RoomSnapshot,
            SequenceNumber,
            SubscriberId,
        },
        fanout::Fanout,
    },
    crate::{
        api::RoomError,
        config::RoomConfig,
        kernel::entities::{
            Amount,
            BidderId,
        },
    },
    std::collections::VecDeque,
    time::OffsetDateTime,
    tokio::sync::mpsc,
};

/// All mutable state of one room. Owned exclusively by the room worker
/// task; every method runs inside the worker, so no two bids for the same
/// room are ever validated concurrently.
pub(crate) struct RoomState {
    pub room_id:   RoomId,
    auction:       Auction,
    highest_bid:   Option<Bid>,
    recent_bids:   VecDeque<Bid>,
    next_sequence: SequenceNumber,
    fanout:        Fanout,
    recent_tail:   usize,
}

impl RoomState {
    pub fn new(room_id: RoomId, auction: Auction, config: &RoomConfig) -> Self {
        Self {
            room_id,
            auction,
            highest_bid: None,
            recent_bids: VecDeque::with_capacity(config.recent_tail),
            next_sequence: 1,
            fanout: Fanout::new(config.subscriber_buffer),
            recent_tail: config.recent_tail,
        }
    }

    pub fn status(&self) -> AuctionStatus {
        self.auction.status
    }

    pub fn is_closed(&self) -> bool {
        self.auction.status.is_closed()
    }

    pub fn opens_at(&self) -> OffsetDateTime {
        self.auction.opens_at
    }

    pub fn closes_at(&self) -> OffsetDateTime {
        self.auction.closes_at
    }

    pub fn highest_bid(&self) -> Option<&Bid> {
        self.highest_bid.as_ref()
    }

    pub fn subscriber_count(&self) -> usize {
        self.fanout.len()
    }

    /// Lazy `Pending -> Open` transition; returns true when it happened so
    /// the caller can publish `AuctionOpened`. Also driven by the open
    /// timer, which makes the transition identical regardless of trigger.
    pub fn maybe_open(&mut self, now: OffsetDateTime) -> bool {
        if self.auction.status == AuctionStatus::Pending && now >= self.auction.opens_at {
            self.auction.status = AuctionStatus::Open;
            return true;
        }
        false
    }

    /// Idempotent close; only the first caller observes true and performs
    /// the closing side effects. Timer firing, administrative close and
    /// shutdown all funnel through here.
    pub fn close(&mut self) -> bool {
        if self.auction.status.is_closed() {
            return false;
        }
        self.auction.status = AuctionStatus::Closed;
        true
    }

    /// The amount a new bid has to beat: the current highest, or the base
    /// price while no bid exists (where matching it exactly is enough).
    fn amount_to_beat(&self) -> Amount {
        match &self.highest_bid {
            Some(bid) => bid.amount,
            None => self.auction.base_price,
        }
    }

    fn beats_current(&self, amount: Amount) -> bool {
        match &self.highest_bid {
            Some(bid) => amount > bid.amount,
            None => amount >= self.auction.base_price,
        }
    }

    /// Validates and sequences one submission. Validation order: room must
    /// be open, amount must beat the current highest, bidder must be a
    /// known identity (and, for connection-originated submissions, still
    /// attached).
    pub fn sequence_bid(
        &mut self,
        bidder: BidderId,
        amount: Amount,
        origin: Option<SubscriberId>,
        now: OffsetDateTime,
    ) -> Result<Bid, RoomError> {
        if !self.auction.status.is_open() {
            return Err(RoomError::AuctionNotOpen);
        }
        if amount == 0 || !self.beats_current(amount) {
            return Err(RoomError::AmountTooLow {
                current: self.amount_to_beat(),
            });
        }
        if bidder.is_empty() {
            return Err(RoomError::Unauthorized);
        }
        if let Some(subscriber) = origin {
            if !self.fanout.contains(subscriber) {
                return Err(RoomError::Unauthorized);
            }
        }

        let bid = Bid {
            bidder,
            amount,
            accepted_at: now,
            sequence: self.next_sequence,
        };
        self.next_sequence += 1;
        self.highest_bid = Some(bid.clone());
        if self.recent_bids.len() == self.recent_tail {
            self.recent_bids.pop_front();
        }
        if self.recent_tail > 0 {
            self.recent_bids.push_back(bid.clone());
        }
        Ok(bid)
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            status:      self.auction.status,
            highest_bid: self.highest_bid.clone(),
            recent_bids: self.recent_bids.iter().cloned().collect(),
        }
    }

    pub fn attach(&mut self, bidder: BidderId) -> (SubscriberId, mpsc::Receiver<RoomEvent>) {
        self.fanout.attach(bidder)
    }

    pub fn detach(&mut self, subscriber: SubscriberId) -> bool {
        self.fanout.detach(subscriber)
    }

    /// Fans the event out; evicted subscribers are already removed from the
    /// membership set when this returns.
    pub fn publish(&mut self, event: &RoomEvent) -> Vec<(SubscriberId, BidderId)> {
        self.fanout.publish(event)
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            kernel::{
                store::AuctionSeed,
                test_utils::DEFAULT_PRODUCT_ID,
            },
            room::entities::Auction,
        },
        std::time::Duration,
        uuid::Uuid,
    };

    fn open_state(base_price: Amount) -> RoomState {
        let now = OffsetDateTime::now_utc();
        let auction = Auction::new(
            DEFAULT_PRODUCT_ID.to_string(),
            AuctionSeed {
                base_price,
                opens_at: now - Duration::from_secs(1),
                closes_at: now + Duration::from_secs(3600),
            },
            now,
        );
        RoomState::new(Uuid::new_v4(), auction, &RoomConfig::default())
    }

    fn submit(state: &mut RoomState, bidder: &str, amount: Amount) -> Result<Bid, RoomError> {
        state.sequence_bid(bidder.to_string(), amount, None, OffsetDateTime::now_utc())
    }

    #[test]
    fn first_bid_below_base_price_is_rejected_with_base_to_beat() {
        let mut state = open_state(100);
        assert_eq!(
            submit(&mut state, "alice", 90),
            Err(RoomError::AmountTooLow { current: 100 })
        );
        assert!(state.highest_bid().is_none());
    }

    #[test]
    fn bid_matching_base_price_is_accepted_only_while_no_bid_exists() {
        let mut state = open_state(100);

        let accepted = submit(&mut state, "alice", 100).unwrap();
        assert_eq!(accepted.sequence, 1);
        assert_eq!(accepted.amount, 100);

        // Equal to the current highest is no longer enough.
        assert_eq!(
            submit(&mut state, "bob", 100),
            Err(RoomError::AmountTooLow { current: 100 })
        );
    }

    #[test]
    fn accepted_bids_are_strictly_increasing_in_amount_and_sequence() {
        let mut state = open_state(50);
        let mut last: Option<Bid> = None;
        for amount in [50u64, 51, 60, 100, 101] {
            let bid = submit(&mut state, "alice", amount).unwrap();
            if let Some(previous) = &last {
                assert!(bid.amount > previous.amount);
                assert_eq!(bid.sequence, previous.sequence + 1);
            }
            last = Some(bid);
        }
        assert_eq!(state.highest_bid().unwrap().amount, 101);
    }

    #[test]
    fn zero_amount_is_never_accepted() {
        let mut state = open_state(0);
        assert_eq!(
            submit(&mut state, "alice", 0),
            Err(RoomError::AmountTooLow { current: 0 })
        );
    }

    #[test]
    fn bids_are_rejected_unless_open() {
        let now = OffsetDateTime::now_utc();
        let pending = Auction::new(
            DEFAULT_PRODUCT_ID.to_string(),
            AuctionSeed {
                base_price: 100,
                opens_at:   now + Duration::from_secs(60),
                closes_at:  now + Duration::from_secs(120),
            },
            now,
        );
        let mut state = RoomState::new(Uuid::new_v4(), pending, &RoomConfig::default());
        assert_eq!(submit(&mut state, "alice", 500), Err(RoomError::AuctionNotOpen));

        assert!(!state.maybe_open(now));
        assert!(state.maybe_open(now + Duration::from_secs(61)));
        submit(&mut state, "alice", 500).unwrap();

        assert!(state.close());
        assert!(!state.close());
        assert_eq!(submit(&mut state, "alice", 600), Err(RoomError::AuctionNotOpen));
    }

    #[test]
    fn anonymous_or_detached_origins_are_unauthorized() {
        let mut state = open_state(100);
        assert_eq!(submit(&mut state, "", 500), Err(RoomError::Unauthorized));

        let (subscriber, _events) = state.attach("alice".to_string());
        state
            .sequence_bid(
                "alice".to_string(),
                500,
                Some(subscriber),
                OffsetDateTime::now_utc(),
            )
            .unwrap();

        state.detach(subscriber);
        assert_eq!(
            state.sequence_bid(
                "alice".to_string(),
                600,
                Some(subscriber),
                OffsetDateTime::now_utc(),
            ),
            Err(RoomError::Unauthorized)
        );
    }

    #[test]
    fn snapshot_tail_is_bounded() {
        let config = RoomConfig {
            recent_tail: 3,
            ..RoomConfig::default()
        };
        let now = OffsetDateTime::now_utc();
        let auction = Auction::new(
            DEFAULT_PRODUCT_ID.to_string(),
            AuctionSeed {
                base_price: 1,
                opens_at:   now - Duration::from_secs(1),
                closes_at:  now + Duration::from_secs(3600),
            },
            now,
        );
        let mut state = RoomState::new(Uuid::new_v4(), auction, &config);
        for amount in 1..=10u64 {
            submit(&mut state, "alice", amount).unwrap();
        }

        let snapshot = state.snapshot();
        assert_eq!(snapshot.highest_bid.as_ref().unwrap().amount, 10);
        let amounts: Vec<Amount> = snapshot.recent_bids.iter().map(|b| b.amount).collect();
        assert_eq!(amounts, vec![8, 9, 10]);
    }
}
