use {
    super::Service,
    crate::{
        kernel::{
            entities::ProductId,
            store::BidRecorder,
        },
        room::{
            entities::{
                Auction,
                AuctionStatus,
                Bid,
                RoomEvent,
            },
            mailbox::{
                AttachOutcome,
                RoomCommand,
                RoomHandle,
            },
            repository::Repository,
            state::RoomState,
        },
    },
    std::{
        sync::Arc,
        time::Duration,
    },
    time::OffsetDateTime,
    tokio::sync::mpsc,
    tokio_util::task::TaskTracker,
    uuid::Uuid,
};

enum Flow {
    Continue,
    Exit,
}

/// The room's serialization point: one worker task owns all room state and
/// drains the mailbox, so attach, detach, submissions, the lifecycle timers
/// and teardown are totally ordered relative to each other.
pub(super) struct RoomWorker {
    product_id:    ProductId,
    state:         RoomState,
    mailbox:       mpsc::Receiver<RoomCommand>,
    repo:          Arc<Repository>,
    recorder:      Arc<dyn BidRecorder>,
    task_tracker:  TaskTracker,
    reclaim_grace: Duration,
    removed:       bool,
}

impl Service {
    pub(super) fn spawn_room(&self, auction: Auction) -> RoomHandle {
        let room_id = Uuid::new_v4();
        let product_id = auction.product_id.clone();
        let (commands, mailbox) = mpsc::channel(self.config.mailbox_capacity);
        let handle = RoomHandle::new(room_id, product_id.clone(), commands);
        let worker = RoomWorker {
            product_id,
            state: RoomState::new(room_id, auction, &self.config),
            mailbox,
            repo: self.repo.clone(),
            recorder: self.recorder.clone(),
            task_tracker: self.task_tracker.clone(),
            reclaim_grace: self.config.reclaim_grace,
            removed: false,
        };
        self.task_tracker.spawn(worker.run());
        handle
    }
}

impl RoomWorker {
    #[tracing::instrument(
        name = "room_worker",
        skip_all,
        fields(product_id = %self.product_id, room_id = %self.state.room_id)
    )]
    async fn run(mut self) {
        tracing::info!(status = ?self.state.status(), "Starting auction room");

        let open_timer = tokio::time::sleep_until(instant_at(self.state.opens_at()));
        let close_timer = tokio::time::sleep_until(instant_at(self.state.closes_at()));
        let reclaim_timer = tokio::time::sleep(self.reclaim_grace);
        tokio::pin!(open_timer, close_timer, reclaim_timer);

        // A room born after its own end (late subscribers reading final
        // state) starts on the reclaim clock right away.
        let mut reclaiming = self.state.is_closed();

        loop {
            tokio::select! {
                maybe_command = self.mailbox.recv() => match maybe_command {
                    Some(command) => {
                        if let Flow::Exit = self.handle_command(command).await {
                            break;
                        }
                    }
                    // Every handle (including the registry's) is gone.
                    None => break,
                },
                () = &mut open_timer, if self.state.status() == AuctionStatus::Pending => {
                    self.open_room();
                },
                () = &mut close_timer, if !self.state.is_closed() => {
                    self.close_room();
                    if self.reclaim_eligible() {
                        reclaim_timer
                            .as_mut()
                            .reset(tokio::time::Instant::now() + self.reclaim_grace);
                        reclaiming = true;
                    }
                },
                () = &mut reclaim_timer, if reclaiming => {
                    if self.reclaim_eligible() {
                        break;
                    }
                    reclaiming = false;
                },
            }
            if reclaiming && !self.reclaim_eligible() {
                reclaiming = false;
            }
        }

        self.remove_from_registry().await;
        tracing::info!("Auction room reclaimed");
    }

    async fn handle_command(&mut self, command: RoomCommand) -> Flow {
        let now = OffsetDateTime::now_utc();
        match command {
            RoomCommand::Attach { bidder, respond_to } => {
                self.open_if_due(now);
                let (subscriber, events) = self.state.attach(bidder);
                let outcome = AttachOutcome {
                    subscriber,
                    events,
                    snapshot: self.state.snapshot(),
                };
                if respond_to.send(outcome).is_err() {
                    // The caller gave up while waiting; take the membership
                    // back out instead of leaking a dead outbox.
                    self.state.detach(subscriber);
                }
                Flow::Continue
            }
            RoomCommand::Detach { subscriber } => {
                if self.state.detach(subscriber) {
                    tracing::debug!(subscriber, "Detached subscriber");
                }
                self.exit_if_reclaimable()
            }
            RoomCommand::SubmitBid {
                bidder,
                amount,
                origin,
                respond_to,
            } => {
                self.open_if_due(now);
                let result = self.state.sequence_bid(bidder, amount, origin, now);
                if let Ok(bid) = &result {
                    tracing::info!(
                        bidder = %bid.bidder,
                        amount = bid.amount,
                        sequence = bid.sequence,
                        "Accepted bid"
                    );
                    self.publish(&RoomEvent::BidAccepted {
                        bid:             bid.clone(),
                        current_highest: bid.amount,
                    });
                    self.record_bid(bid.clone());
                }
                let _ = respond_to.send(result);
                Flow::Continue
            }
            RoomCommand::Close { respond_to } => {
                self.close_room();
                let _ = respond_to.send(());
                self.exit_if_reclaimable()
            }
            RoomCommand::ReleaseIfEmpty { respond_to } => {
                if self.reclaim_eligible() {
                    // Remove before answering so the caller observes the
                    // registry without the entry.
                    self.remove_from_registry().await;
                    let _ = respond_to.send(true);
                    Flow::Exit
                } else {
                    let _ = respond_to.send(false);
                    Flow::Continue
                }
            }
            RoomCommand::Shutdown => {
                self.close_room();
                Flow::Exit
            }
        }
    }

    fn open_if_due(&mut self, now: OffsetDateTime) {
        if self.state.maybe_open(now) {
            tracing::info!("Opening auction");
            self.publish(&RoomEvent::AuctionOpened);
        }
    }

    fn open_room(&mut self) {
        self.open_if_due(OffsetDateTime::now_utc());
    }

    fn close_room(&mut self) {
        if self.state.close() {
            let winning_bid = self.state.highest_bid().cloned();
            tracing::info!(
                winning_amount = winning_bid.as_ref().map(|bid| bid.amount),
                "Closing auction"
            );
            self.publish(&RoomEvent::AuctionClosed { winning_bid });
        }
    }

    fn publish(&mut self, event: &RoomEvent) {
        for (subscriber, bidder) in self.state.publish(event) {
            tracing::warn!(subscriber, bidder = %bidder, "Evicting unresponsive subscriber");
        }
    }

    /// Write-behind persistence: never blocks or fails the acceptance.
    fn record_bid(&self, bid: Bid) {
        let recorder = self.recorder.clone();
        let product_id = self.product_id.clone();
        self.task_tracker.spawn(async move {
            if let Err(e) = recorder.record_bid(&product_id, &bid).await {
                tracing::error!(error = ?e, product_id = %product_id, "Failed to record bid");
            }
        });
    }

    fn reclaim_eligible(&self) -> bool {
        self.state.is_closed() && self.state.subscriber_count() == 0
    }

    fn exit_if_reclaimable(&self) -> Flow {
        if self.reclaim_eligible() {
            Flow::Exit
        } else {
            Flow::Continue
        }
    }

    async fn remove_from_registry(&mut self) {
        if self.removed {
            return;
        }
        self.removed = true;
        self.repo.remove_room(&self.product_id, self.state.room_id);
        self.repo.remove_room_lock(&self.product_id).await;
    }
}

fn instant_at(when: OffsetDateTime) -> tokio::time::Instant {
    let delta = when - OffsetDateTime::now_utc();
    if delta.is_negative() {
        tokio::time::Instant::now()
    } else {
        tokio::time::Instant::now() + delta.unsigned_abs()
    }
}
