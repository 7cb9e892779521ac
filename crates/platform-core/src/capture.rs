//! Keyboard capture contract.

use std::sync::Arc;

use mousekeys_common::error::MouseKeysResult;
use mousekeys_key_model::LogicalKey;

use crate::queue::EventSource;

/// Answers "is MouseKeys currently active?" from a capture callback.
///
/// Adapters receive this at construction instead of reaching for a global
/// controller. It must be cheap: it is called for every captured key.
pub type ActivityProbe = Arc<dyn Fn() -> bool + Send + Sync>;

/// Everything an adapter needs from the rest of the process.
#[derive(Clone)]
pub struct CaptureContext {
    queue_capacity: usize,
    activity: ActivityProbe,
}

impl CaptureContext {
    pub fn new(queue_capacity: usize, activity: ActivityProbe) -> Self {
        Self {
            queue_capacity: queue_capacity.max(1),
            activity,
        }
    }

    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    pub fn is_active(&self) -> bool {
        (self.activity)()
    }
}

impl std::fmt::Debug for CaptureContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureContext")
            .field("queue_capacity", &self.queue_capacity)
            .finish_non_exhaustive()
    }
}

/// A platform keyboard hook producing unified key events.
pub trait KeyboardCapture: Send {
    /// Acquire the platform resource and begin delivering events.
    ///
    /// Fails with `MouseKeysError::CaptureUnavailable` when the permission,
    /// device or hook cannot be obtained.
    fn start(&mut self) -> MouseKeysResult<EventSource>;

    /// Release the platform resource. No events are delivered after this
    /// returns; anything still queued is dropped.
    fn stop(&mut self) -> MouseKeysResult<()>;

    /// Adapter name for logging.
    fn name(&self) -> &str;

    fn is_running(&self) -> bool;
}

/// Whether an adapter forwards a key into the event queue.
///
/// While inactive only the toggle key is watched.
pub fn forwards(key: LogicalKey, active: bool) -> bool {
    match key {
        LogicalKey::Toggle => true,
        LogicalKey::Unknown => false,
        _ => active,
    }
}

/// Whether an adapter hides a key from other applications.
///
/// The toggle key always passes through.
pub fn suppresses(key: LogicalKey, active: bool) -> bool {
    active && key.is_known() && key != LogicalKey::Toggle
}
