//! Background task that flushes committed events to durable storage.
//!
//! The writer subscribes to the [`EventBus`] and applies each event in
//! sequence order. Events that fail to apply stay in a backlog and are
//! retried on a timer, oldest first. If the writer falls behind the
//! broadcast buffer it cannot know which events it missed, so it flushes a
//! full store snapshot instead, retrying until one succeeds.
//!
//! Shutdown is cooperative: [`WriterHandle::shutdown`] lets the task apply
//! every event still queued in its receiver before it exits.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::postgres::PostgresPersistence;
use crate::domain::{DomainRecord, DomainStore, EventBus, RegistryEvent};
use crate::error::RegistryError;

/// Upper bound on events held for retry. Older events are dropped past
/// this point and the records table is repaired by a snapshot instead.
const MAX_BACKLOG: usize = 10_000;

/// Durable destination for committed registry events.
pub trait EventSink: Send + Sync + 'static {
    /// Applies one committed event. Must be idempotent per sequence.
    fn apply_event(
        &self,
        event: &RegistryEvent,
    ) -> impl Future<Output = Result<(), RegistryError>> + Send;

    /// Overwrites stored records with a full snapshot, returning the number
    /// of rows written.
    fn flush_snapshot(
        &self,
        records: &[DomainRecord],
        last_sequence: u64,
    ) -> impl Future<Output = Result<u64, RegistryError>> + Send;
}

impl EventSink for PostgresPersistence {
    fn apply_event(
        &self,
        event: &RegistryEvent,
    ) -> impl Future<Output = Result<(), RegistryError>> + Send {
        Self::apply_event(self, event)
    }

    fn flush_snapshot(
        &self,
        records: &[DomainRecord],
        last_sequence: u64,
    ) -> impl Future<Output = Result<u64, RegistryError>> + Send {
        Self::flush_snapshot(self, records, last_sequence)
    }
}

/// Handle to a running writer task.
#[derive(Debug)]
pub struct WriterHandle {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl WriterHandle {
    /// Asks the writer to drain its queue and waits for it to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(());
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "persistence writer task failed");
        }
    }
}

/// Spawns the persistence writer.
///
/// The task runs until [`WriterHandle::shutdown`] is called, the handle is
/// dropped, or the bus closes.
#[must_use]
pub fn spawn_writer<S: EventSink>(
    sink: S,
    store: Arc<DomainStore>,
    event_bus: &EventBus,
    retry_interval: Duration,
) -> WriterHandle {
    let rx = event_bus.subscribe();
    let (shutdown, shutdown_rx) = oneshot::channel();
    let writer = Writer {
        sink,
        store,
        backlog: VecDeque::new(),
        needs_snapshot: false,
    };
    let task = tokio::spawn(writer.run(rx, shutdown_rx, retry_interval));
    WriterHandle { shutdown, task }
}

struct Writer<S> {
    sink: S,
    store: Arc<DomainStore>,
    backlog: VecDeque<RegistryEvent>,
    needs_snapshot: bool,
}

impl<S: EventSink> Writer<S> {
    fn is_dirty(&self) -> bool {
        self.needs_snapshot || !self.backlog.is_empty()
    }

    async fn run(
        mut self,
        mut rx: broadcast::Receiver<RegistryEvent>,
        mut shutdown: oneshot::Receiver<()>,
        retry_interval: Duration,
    ) {
        let mut retry = tokio::time::interval(retry_interval);
        retry.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                received = rx.recv() => match received {
                    Ok(event) => self.accept(event).await,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "persistence writer lagged behind event bus");
                        self.needs_snapshot = true;
                        self.recover().await;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                _ = retry.tick(), if self.is_dirty() => self.recover().await,
            }
        }

        loop {
            match rx.try_recv() {
                Ok(event) => self.backlog_push(event),
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    tracing::warn!(lagged = n, "persistence writer lagged during shutdown");
                    self.needs_snapshot = true;
                }
                Err(_) => break,
            }
        }
        self.recover().await;

        if self.is_dirty() {
            tracing::error!(
                pending_events = self.backlog.len(),
                needs_snapshot = self.needs_snapshot,
                "persistence writer stopped with unwritten state"
            );
        } else {
            tracing::debug!("persistence writer stopped");
        }
    }

    async fn accept(&mut self, event: RegistryEvent) {
        self.backlog_push(event);
        self.recover().await;
    }

    fn backlog_push(&mut self, event: RegistryEvent) {
        if self.backlog.len() >= MAX_BACKLOG
            && let Some(dropped) = self.backlog.pop_front()
        {
            tracing::error!(
                sequence = dropped.sequence(),
                domain = %dropped.name(),
                "persistence backlog full; event dropped from the log"
            );
            self.needs_snapshot = true;
        }
        self.backlog.push_back(event);
    }

    /// Applies backlogged events in order, stopping at the first failure,
    /// then flushes a snapshot if one is owed.
    async fn recover(&mut self) {
        while let Some(event) = self.backlog.front() {
            if let Err(e) = self.sink.apply_event(event).await {
                tracing::warn!(
                    sequence = event.sequence(),
                    domain = %event.name(),
                    controller = %event.controller(),
                    pending = self.backlog.len(),
                    error = %e,
                    "failed to persist event; will retry"
                );
                self.needs_snapshot = true;
                break;
            }
            self.backlog.pop_front();
        }

        if self.needs_snapshot && flush(&self.sink, &self.store).await {
            self.needs_snapshot = false;
        }
    }
}

/// Writes the full in-memory state. Failures are logged rather than
/// propagated; returns `true` when the snapshot was written.
pub async fn flush<S: EventSink>(sink: &S, store: &DomainStore) -> bool {
    let (records, last_sequence) = store.snapshot().await;
    match sink.flush_snapshot(&records, last_sequence).await {
        Ok(rows) => {
            tracing::info!(rows, last_sequence, "registry snapshot flushed");
            true
        }
        Err(e) => {
            tracing::error!(error = %e, "registry snapshot flush failed");
            false
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::domain::{Amount, DomainName, Identity};
    use crate::service::RegistryService;

    #[derive(Default)]
    struct MemorySink {
        applied: Mutex<Vec<u64>>,
        snapshots: Mutex<Vec<u64>>,
        failing_applies: AtomicUsize,
        failing_flushes: AtomicUsize,
    }

    impl MemorySink {
        fn failing(applies: usize, flushes: usize) -> Self {
            Self {
                failing_applies: AtomicUsize::new(applies),
                failing_flushes: AtomicUsize::new(flushes),
                ..Self::default()
            }
        }

        fn take_failure(counter: &AtomicUsize) -> bool {
            counter
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
        }

        fn applied(&self) -> Vec<u64> {
            self.applied.lock().map(|v| v.clone()).unwrap_or_default()
        }

        fn snapshots(&self) -> Vec<u64> {
            self.snapshots.lock().map(|v| v.clone()).unwrap_or_default()
        }
    }

    impl EventSink for Arc<MemorySink> {
        async fn apply_event(&self, event: &RegistryEvent) -> Result<(), RegistryError> {
            if MemorySink::take_failure(&self.failing_applies) {
                return Err(RegistryError::PersistenceError("database down".to_string()));
            }
            if let Ok(mut applied) = self.applied.lock() {
                applied.push(event.sequence());
            }
            Ok(())
        }

        async fn flush_snapshot(
            &self,
            records: &[DomainRecord],
            last_sequence: u64,
        ) -> Result<u64, RegistryError> {
            if MemorySink::take_failure(&self.failing_flushes) {
                return Err(RegistryError::PersistenceError("database down".to_string()));
            }
            if let Ok(mut snapshots) = self.snapshots.lock() {
                snapshots.push(last_sequence);
            }
            Ok(records.len() as u64)
        }
    }

    fn service() -> RegistryService {
        RegistryService::new(
            Arc::new(DomainStore::new(Amount::new(100))),
            EventBus::new(64),
        )
    }

    async fn register(service: &RegistryService, n: &str) {
        let (Ok(name), Ok(caller)) = (DomainName::new(n), Identity::new("0xa")) else {
            panic!("valid inputs");
        };
        if service.register(name, caller, Amount::new(100)).await.is_err() {
            panic!("registration of {n} should succeed");
        }
    }

    async fn wait_until(check: impl Fn() -> bool) {
        for _ in 0..500 {
            if check() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not reached in time");
    }

    #[tokio::test]
    async fn shutdown_applies_queued_events() {
        let service = service();
        let sink = Arc::new(MemorySink::default());
        let handle = spawn_writer(
            Arc::clone(&sink),
            Arc::clone(service.store()),
            service.event_bus(),
            Duration::from_secs(60),
        );

        for n in ["a", "b", "c"] {
            register(&service, n).await;
        }
        handle.shutdown().await;

        assert_eq!(sink.applied(), vec![1, 2, 3]);
        assert!(sink.snapshots().is_empty());
    }

    #[tokio::test]
    async fn failed_writes_are_retried_in_order() {
        let service = service();
        let sink = Arc::new(MemorySink::failing(1, 1));
        let handle = spawn_writer(
            Arc::clone(&sink),
            Arc::clone(service.store()),
            service.event_bus(),
            Duration::from_millis(10),
        );

        register(&service, "a").await;
        register(&service, "b").await;

        let observed = Arc::clone(&sink);
        wait_until(move || observed.applied() == vec![1, 2] && !observed.snapshots().is_empty())
            .await;
        handle.shutdown().await;

        assert_eq!(sink.applied(), vec![1, 2]);
        assert_eq!(sink.snapshots().last().copied(), Some(2));
    }

    #[tokio::test]
    async fn shutdown_flushes_snapshot_when_event_write_fails() {
        let service = service();
        let sink = Arc::new(MemorySink::failing(1, 0));
        let handle = spawn_writer(
            Arc::clone(&sink),
            Arc::clone(service.store()),
            service.event_bus(),
            Duration::from_secs(60),
        );

        register(&service, "a").await;
        handle.shutdown().await;

        assert!(sink.applied().is_empty());
        assert_eq!(sink.snapshots(), vec![1]);
    }
}
