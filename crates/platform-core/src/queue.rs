//! Bounded event queue between a capture adapter and the dispatcher.
//!
//! The producing side never blocks: OS keyboard callbacks must return
//! quickly, so a full queue drops the event and counts it. Closing the queue
//! makes the consumer stop immediately, discarding anything still buffered.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TryRecvError, TrySendError};
use std::sync::Arc;
use std::time::Duration;

use mousekeys_key_model::KeyEvent;

/// How often a blocked consumer re-checks the closed flag.
const CLOSE_POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Default)]
struct QueueState {
    closed: AtomicBool,
    dropped: AtomicU64,
}

/// Create a bounded queue holding at most `capacity` pending events.
pub fn event_queue(capacity: usize) -> (EventSink, EventSource) {
    let (tx, rx) = mpsc::sync_channel(capacity.max(1));
    let state = Arc::new(QueueState::default());
    (
        EventSink {
            tx,
            state: state.clone(),
        },
        EventSource { rx, state },
    )
}

/// Producer half, owned by the capture adapter.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: SyncSender<KeyEvent>,
    state: Arc<QueueState>,
}

impl EventSink {
    /// Enqueue an event without blocking. Returns false if the event was
    /// dropped because the queue is full or closed.
    pub fn push(&self, event: KeyEvent) -> bool {
        if self.state.closed.load(Ordering::Acquire) {
            return false;
        }
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                let dropped = self.state.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                tracing::warn!(
                    key = ?event.logical_key,
                    kind = ?event.kind,
                    dropped,
                    "Key event queue full, dropping event"
                );
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    /// Close the queue. The consumer stops and pending events are dropped.
    pub fn close(&self) {
        self.state.closed.store(true, Ordering::Release);
    }

    pub fn is_closed(&self) -> bool {
        self.state.closed.load(Ordering::Acquire)
    }

    /// Number of events dropped because the queue was full.
    pub fn dropped(&self) -> u64 {
        self.state.dropped.load(Ordering::Relaxed)
    }
}

/// Consumer half, handed to the dispatcher by `KeyboardCapture::start`.
#[derive(Debug)]
pub struct EventSource {
    rx: Receiver<KeyEvent>,
    state: Arc<QueueState>,
}

impl EventSource {
    /// Block until the next event. Returns `None` once the queue is closed
    /// or every producer is gone.
    pub fn recv(&self) -> Option<KeyEvent> {
        loop {
            if self.is_closed() {
                return None;
            }
            match self.rx.recv_timeout(CLOSE_POLL_INTERVAL) {
                Ok(event) if self.is_closed() => {
                    tracing::trace!(key = ?event.logical_key, "Dropping event queued before close");
                    return None;
                }
                Ok(event) => return Some(event),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return None,
            }
        }
    }

    /// Next event if one is already queued.
    pub fn try_recv(&self) -> Option<KeyEvent> {
        if self.is_closed() {
            return None;
        }
        match self.rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.state.closed.load(Ordering::Acquire)
    }

    /// Blocking iterator over events until the queue ends.
    pub fn iter(&self) -> impl Iterator<Item = KeyEvent> + '_ {
        std::iter::from_fn(move || self.recv())
    }
}
