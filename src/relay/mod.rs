//! # Notification Relay
//!
//! A single consumer thread that forwards [`Notification`]s from a bounded
//! queue to a [`NotificationSink`].
//!
//! Producers hold cloneable [`NotificationSender`]s. [`NotificationSender::send`]
//! blocks while the queue is full; [`NotificationSender::try_send`] reports
//! [`RelayError::Full`] instead.
//!
//! ## Shutdown
//!
//! [`NotificationRelay::close`] stops accepting notifications and queues an
//! end marker behind whatever is already waiting. With
//! [`ShutdownMode::Drain`] everything queued before the marker is delivered;
//! with [`ShutdownMode::Drop`] it is counted and discarded. A notification
//! being delivered when `close` is called always finishes.
//! [`NotificationRelay::join`] waits for the consumer and returns its
//! [`RelayStats`]. Dropping the relay drains it.

mod sink;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};
use std::thread::{self, JoinHandle};

use serde::Serialize;
use thiserror::Error;

use crate::domain::Notification;

pub use sink::{FanOut, LogSink, NotificationSink};

/// Default queue capacity
pub const DEFAULT_CAPACITY: usize = 64;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Notification queue is full")]
    Full,

    #[error("Notification relay has been shut down")]
    Closed,

    #[error("Failed to start notification relay: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("Notification relay thread panicked")]
    ConsumerPanicked,
}

/// What happens to queued notifications on shutdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShutdownMode {
    #[default]
    Drain,
    Drop,
}

/// Counters reported by the consumer when it exits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RelayStats {
    pub delivered: usize,
    pub failed: usize,
    pub dropped: usize,
}

enum Message {
    Notify(Notification),
    Stop,
}

/// Senders hold a read guard on `closed` while they enqueue, and `close`
/// takes the write guard, so no notification can land behind `Stop`.
#[derive(Default)]
struct Shared {
    closed: RwLock<bool>,
    discard: AtomicBool,
}

impl Shared {
    fn open_guard(&self) -> Result<RwLockReadGuard<'_, bool>, RelayError> {
        let closed = self.closed.read().unwrap_or_else(PoisonError::into_inner);
        if *closed {
            return Err(RelayError::Closed);
        }
        Ok(closed)
    }
}

/// Cloneable handle for queueing notifications
#[derive(Clone)]
pub struct NotificationSender {
    tx: SyncSender<Message>,
    shared: Arc<Shared>,
}

impl NotificationSender {
    /// Queues a notification, waiting for room if the queue is full
    pub fn send(&self, notification: Notification) -> Result<(), RelayError> {
        let _open = self.shared.open_guard()?;

        self.tx
            .send(Message::Notify(notification))
            .map_err(|_| RelayError::Closed)
    }

    /// Queues a notification without waiting
    pub fn try_send(&self, notification: Notification) -> Result<(), RelayError> {
        let _open = self.shared.open_guard()?;

        self.tx
            .try_send(Message::Notify(notification))
            .map_err(|e| match e {
                TrySendError::Full(_) => RelayError::Full,
                TrySendError::Disconnected(_) => RelayError::Closed,
            })
    }
}

/// The relay and its consumer thread
pub struct NotificationRelay {
    sender: NotificationSender,
    handle: Option<JoinHandle<RelayStats>>,
}

impl NotificationRelay {
    /// Starts the consumer thread with a queue of `capacity` notifications
    pub fn spawn(capacity: usize, sink: impl NotificationSink) -> Result<Self, RelayError> {
        let (tx, rx) = mpsc::sync_channel(capacity.max(1));
        let shared = Arc::new(Shared::default());

        let consumer_shared = Arc::clone(&shared);
        let handle = thread::Builder::new()
            .name("notification-relay".to_string())
            .spawn(move || consume(rx, sink, &consumer_shared))
            .map_err(RelayError::Spawn)?;

        Ok(Self {
            sender: NotificationSender { tx, shared },
            handle: Some(handle),
        })
    }

    /// Returns a new handle for queueing notifications
    pub fn sender(&self) -> NotificationSender {
        self.sender.clone()
    }

    /// Queues a notification through the relay's own handle
    pub fn send(&self, notification: Notification) -> Result<(), RelayError> {
        self.sender.send(notification)
    }

    /// Stops accepting notifications and tells the consumer to finish.
    ///
    /// Waits for senders that are mid-enqueue, and blocks if the queue is
    /// full. Calling it again has no effect.
    pub fn close(&self, mode: ShutdownMode) {
        let shared = &self.sender.shared;
        if mode == ShutdownMode::Drop {
            shared.discard.store(true, Ordering::Release);
        }

        {
            let mut closed = shared.closed.write().unwrap_or_else(PoisonError::into_inner);
            if *closed {
                return;
            }
            *closed = true;
        }

        // The consumer may already be gone if the sink panicked
        let _ = self.sender.tx.send(Message::Stop);
    }

    /// Waits for the consumer to exit
    pub fn join(mut self) -> Result<RelayStats, RelayError> {
        self.close(ShutdownMode::Drain);
        self.join_inner()
    }

    /// Closes the relay and waits for the consumer to exit
    pub fn shutdown(self, mode: ShutdownMode) -> Result<RelayStats, RelayError> {
        self.close(mode);
        self.join()
    }

    fn join_inner(&mut self) -> Result<RelayStats, RelayError> {
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| RelayError::ConsumerPanicked),
            None => Ok(RelayStats::default()),
        }
    }
}

impl Drop for NotificationRelay {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.close(ShutdownMode::Drain);
            let _ = self.join_inner();
        }
    }
}

fn consume(rx: Receiver<Message>, mut sink: impl NotificationSink, shared: &Shared) -> RelayStats {
    let mut stats = RelayStats::default();

    for message in rx.iter() {
        match message {
            Message::Notify(notification) => {
                relay_one(&mut sink, &notification, shared, &mut stats)
            }
            Message::Stop => break,
        }
    }

    // Accepted notifications are never left in the queue unaccounted
    for message in rx.try_iter() {
        if let Message::Notify(notification) = message {
            relay_one(&mut sink, &notification, shared, &mut stats);
        }
    }

    stats
}

fn relay_one(
    sink: &mut impl NotificationSink,
    notification: &Notification,
    shared: &Shared,
    stats: &mut RelayStats,
) {
    if shared.discard.load(Ordering::Acquire) {
        stats.dropped += 1;
        return;
    }

    match sink.deliver(notification) {
        Ok(()) => stats.delivered += 1,
        Err(_) => stats.failed += 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    use crate::storage::AppLog;

    fn note(i: usize) -> Notification {
        Notification::new("Lominus", format!("update {}", i))
    }

    fn collecting_sink() -> (Arc<Mutex<Vec<Notification>>>, impl NotificationSink) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = Arc::clone(&seen);
        let sink = move |n: &Notification| -> anyhow::Result<()> {
            sink_seen.lock().unwrap().push(n.clone());
            Ok(())
        };
        (seen, sink)
    }

    /// Sink that reports when it starts each delivery and then waits for a
    /// release signal
    fn gated_sink() -> (
        mpsc::Receiver<()>,
        mpsc::Sender<()>,
        impl NotificationSink,
    ) {
        let (started_tx, started_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let sink = move |_: &Notification| -> anyhow::Result<()> {
            let _ = started_tx.send(());
            let _ = release_rx.recv();
            Ok(())
        };
        (started_rx, release_tx, sink)
    }

    #[test]
    fn drain_delivers_everything_in_order() {
        let (seen, sink) = collecting_sink();
        let relay = NotificationRelay::spawn(8, sink).unwrap();

        for i in 0..5 {
            relay.send(note(i)).unwrap();
        }
        let stats = relay.shutdown(ShutdownMode::Drain).unwrap();

        assert_eq!(stats.delivered, 5);
        assert_eq!(stats.dropped, 0);
        let seen = seen.lock().unwrap();
        let contents: Vec<_> = seen.iter().map(|n| n.content.as_str()).collect();
        assert_eq!(
            contents,
            vec!["update 0", "update 1", "update 2", "update 3", "update 4"]
        );
    }

    #[test]
    fn drop_discards_queued_notifications() {
        let (started, release, sink) = gated_sink();
        let relay = NotificationRelay::spawn(4, sink).unwrap();

        relay.send(note(0)).unwrap();
        started.recv().unwrap();
        relay.send(note(1)).unwrap();
        relay.send(note(2)).unwrap();

        relay.close(ShutdownMode::Drop);
        release.send(()).unwrap();
        let stats = relay.join().unwrap();

        assert_eq!(
            stats,
            RelayStats {
                delivered: 1,
                failed: 0,
                dropped: 2
            }
        );
    }

    #[test]
    fn try_send_reports_full_queue() {
        let (started, release, sink) = gated_sink();
        let relay = NotificationRelay::spawn(1, sink).unwrap();
        let sender = relay.sender();

        sender.send(note(0)).unwrap();
        started.recv().unwrap();
        sender.try_send(note(1)).unwrap();

        assert!(matches!(sender.try_send(note(2)), Err(RelayError::Full)));

        release.send(()).unwrap();
        release.send(()).unwrap();
        let stats = relay.shutdown(ShutdownMode::Drain).unwrap();
        assert_eq!(stats.delivered, 2);
    }

    #[test]
    fn senders_fail_after_close() {
        let (_seen, sink) = collecting_sink();
        let relay = NotificationRelay::spawn(4, sink).unwrap();
        let sender = relay.sender();

        relay.close(ShutdownMode::Drain);

        assert!(matches!(sender.send(note(0)), Err(RelayError::Closed)));
        assert!(matches!(sender.try_send(note(0)), Err(RelayError::Closed)));
        relay.join().unwrap();
    }

    #[test]
    fn concurrent_senders_are_fully_accounted_for() {
        use std::sync::atomic::AtomicUsize;

        for mode in [ShutdownMode::Drain, ShutdownMode::Drop] {
            for _ in 0..200 {
                let (seen, sink) = collecting_sink();
                let relay = NotificationRelay::spawn(1, sink).unwrap();
                let accepted = Arc::new(AtomicUsize::new(0));

                let producers: Vec<_> = (0..4)
                    .map(|_| {
                        let sender = relay.sender();
                        let accepted = Arc::clone(&accepted);
                        thread::spawn(move || {
                            for i in 0..20 {
                                if sender.send(note(i)).is_ok() {
                                    accepted.fetch_add(1, Ordering::SeqCst);
                                }
                            }
                        })
                    })
                    .collect();

                let stats = relay.shutdown(mode).unwrap();
                for producer in producers {
                    producer.join().unwrap();
                }

                assert_eq!(
                    accepted.load(Ordering::SeqCst),
                    stats.delivered + stats.failed + stats.dropped
                );
                assert_eq!(seen.lock().unwrap().len(), stats.delivered);
                if mode == ShutdownMode::Drain {
                    assert_eq!(stats.dropped, 0);
                }
            }
        }
    }

    #[test]
    fn sink_errors_are_counted() {
        let sink = |n: &Notification| -> anyhow::Result<()> {
            if n.content.ends_with('1') {
                anyhow::bail!("bot unreachable");
            }
            Ok(())
        };
        let relay = NotificationRelay::spawn(4, sink).unwrap();

        for i in 0..3 {
            relay.send(note(i)).unwrap();
        }
        let stats = relay.shutdown(ShutdownMode::Drain).unwrap();

        assert_eq!(stats.delivered, 2);
        assert_eq!(stats.failed, 1);
    }

    #[test]
    fn panicking_sink_is_reported() {
        let sink = |_: &Notification| -> anyhow::Result<()> { panic!("sink exploded") };
        let relay = NotificationRelay::spawn(4, sink).unwrap();
        let sender = relay.sender();

        sender.send(note(0)).unwrap();

        assert!(matches!(
            relay.shutdown(ShutdownMode::Drain),
            Err(RelayError::ConsumerPanicked)
        ));
    }

    #[test]
    fn dropping_relay_drains() {
        let (seen, sink) = collecting_sink();
        {
            let relay = NotificationRelay::spawn(4, sink).unwrap();
            relay.send(note(0)).unwrap();
            relay.send(note(1)).unwrap();
        }

        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[test]
    fn log_sink_writes_to_app_log() {
        let dir = TempDir::new().unwrap();
        let log = AppLog::new(dir.path().join("lominus.log"));
        let relay = NotificationRelay::spawn(4, LogSink::new(log.clone())).unwrap();

        relay
            .send(Notification::new("CS1010", "2 new files"))
            .unwrap();
        relay.shutdown(ShutdownMode::Drain).unwrap();

        let lines = log.tail(5).unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("notification: CS1010: 2 new files"));
    }

    #[test]
    fn fan_out_reaches_every_sink() {
        let (first, first_sink) = collecting_sink();
        let (second, second_sink) = collecting_sink();
        let failing = |_: &Notification| -> anyhow::Result<()> { anyhow::bail!("offline") };
        let fan_out = FanOut::new()
            .with(first_sink)
            .with(failing)
            .with(second_sink);
        let relay = NotificationRelay::spawn(4, fan_out).unwrap();

        relay.send(note(0)).unwrap();
        let stats = relay.shutdown(ShutdownMode::Drain).unwrap();

        assert_eq!(stats.failed, 1);
        assert_eq!(first.lock().unwrap().len(), 1);
        assert_eq!(second.lock().unwrap().len(), 1);
    }
}
