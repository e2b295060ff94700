use {
    super::{
        mailbox::{
            RoomCommand,
            RoomHandle,
        },
        repository::Repository,
    },
    crate::{
        config::RoomConfig,
        kernel::store::{
            AuctionStore,
            BidRecorder,
        },
    },
    futures::future::join_all,
    std::sync::{
        atomic::{
            AtomicBool,
            Ordering,
        },
        Arc,
    },
    tokio_util::task::TaskTracker,
};

pub mod attach;
pub mod close_room;
pub mod detach;
pub mod get_or_create_room;
pub mod release_if_empty;
pub mod submit_bid;
pub mod workers;

pub struct ServiceInner {
    repo:          Arc<Repository>,
    store:         Arc<dyn AuctionStore>,
    recorder:      Arc<dyn BidRecorder>,
    config:        RoomConfig,
    task_tracker:  TaskTracker,
    shutting_down: AtomicBool,
}

#[derive(Clone)]
pub struct Service(Arc<ServiceInner>);
impl std::ops::Deref for Service {
    type Target = ServiceInner;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Service {
    pub fn new(
        store: Arc<dyn AuctionStore>,
        recorder: Arc<dyn BidRecorder>,
        config: RoomConfig,
    ) -> Self {
        Self(Arc::new(ServiceInner {
            repo: Arc::new(Repository::new()),
            store,
            recorder,
            config,
            task_tracker: TaskTracker::new(),
            shutting_down: AtomicBool::new(false),
        }))
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    pub fn room_count(&self) -> usize {
        self.repo.in_memory_store.rooms.len()
    }

    pub(super) fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::Acquire)
    }

    /// Closes every live room and waits for the workers (and any in-flight
    /// write-behind recording) to finish. No new rooms are created
    /// afterwards.
    pub async fn shutdown(&self) {
        self.shutting_down.store(true, Ordering::Release);
        let handles: Vec<RoomHandle> = self
            .repo
            .in_memory_store
            .rooms
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        join_all(
            handles
                .iter()
                .map(|handle| handle.notify(RoomCommand::Shutdown)),
        )
        .await;
        self.task_tracker.close();
        self.task_tracker.wait().await;
    }
}
