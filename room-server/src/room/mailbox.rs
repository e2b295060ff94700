use {
    super::entities::{
        Bid,
        RoomEvent,
        RoomId,
        RoomSnapshot,
        SubscriberId,
    },
    crate::{
        api::RoomError,
        kernel::entities::{
            Amount,
            BidderId,
            ProductId,
        },
    },
    std::time::Duration,
    tokio::sync::{
        mpsc,
        oneshot,
    },
};

/// Commands processed by the room worker. Everything that touches room
/// state goes through this mailbox, which is what makes bid validation and
/// fan-out totally ordered per room.
#[derive(Debug)]
pub enum RoomCommand {
    Attach {
        bidder:     BidderId,
        respond_to: oneshot::Sender<AttachOutcome>,
    },
    Detach {
        subscriber: SubscriberId,
    },
    SubmitBid {
        bidder:     BidderId,
        amount:     Amount,
        /// Set when the submission arrives through an attached connection;
        /// a stale subscriber id is rejected as unauthorized.
        origin:     Option<SubscriberId>,
        respond_to: oneshot::Sender<Result<Bid, RoomError>>,
    },
    Close {
        respond_to: oneshot::Sender<()>,
    },
    ReleaseIfEmpty {
        respond_to: oneshot::Sender<bool>,
    },
    Shutdown,
}

#[derive(Debug)]
pub struct AttachOutcome {
    pub subscriber: SubscriberId,
    pub events:     mpsc::Receiver<RoomEvent>,
    pub snapshot:   RoomSnapshot,
}

/// Cloneable sender side of one room's mailbox.
#[derive(Clone, Debug)]
pub struct RoomHandle {
    pub room_id:    RoomId,
    pub product_id: ProductId,
    commands:       mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub(crate) fn new(
        room_id: RoomId,
        product_id: ProductId,
        commands: mpsc::Sender<RoomCommand>,
    ) -> Self {
        Self {
            room_id,
            product_id,
            commands,
        }
    }

    /// True once the worker has exited; a closed handle in the registry is
    /// stale and gets replaced on the next create.
    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    pub(crate) fn try_shutdown(&self) {
        let _ = self.commands.try_send(RoomCommand::Shutdown);
    }

    /// Sends a command and awaits its reply, bounded by one deadline
    /// covering both the mailbox enqueue and the worker's answer. A full
    /// mailbox that stays full, a torn-down room or a dropped reply all
    /// surface as `RoomUnavailable` instead of hanging the caller.
    pub(crate) async fn request<R>(
        &self,
        make: impl FnOnce(oneshot::Sender<R>) -> RoomCommand,
        deadline: Duration,
    ) -> Result<R, RoomError> {
        let (respond_to, response) = oneshot::channel();
        let command = make(respond_to);
        tokio::time::timeout(deadline, async {
            self.commands
                .send(command)
                .await
                .map_err(|_| RoomError::RoomUnavailable)?;
            response.await.map_err(|_| RoomError::RoomUnavailable)
        })
        .await
        .map_err(|_| RoomError::RoomUnavailable)?
    }

    /// Fire-and-forget send for commands that need no reply.
    pub(crate) async fn notify(&self, command: RoomCommand) {
        let _ = self.commands.send(command).await;
    }
}
