//! Registration table for the low-level keyboard hook.
//!
//! `WH_KEYBOARD_LL` procedures are plain functions with no user-data pointer,
//! and Windows runs them on the thread that installed the hook. The hook
//! thread registers its context here under its own thread id before
//! installing the hook and removes it after unhooking.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread::ThreadId;
use std::time::Instant;

use parking_lot::Mutex;

use mousekeys_key_model::{KeyEvent, LogicalKey};
use mousekeys_platform_core::{forwards, suppresses, CaptureContext, EventSink};

use crate::keymap::translate;

/// Everything the hook procedure needs for one capture session.
#[derive(Debug)]
pub struct HookContext {
    sink: EventSink,
    ctx: CaptureContext,
    toggle_held: AtomicBool,
}

impl HookContext {
    pub fn new(sink: EventSink, ctx: CaptureContext) -> Self {
        Self {
            sink,
            ctx,
            toggle_held: AtomicBool::new(false),
        }
    }

    /// Handle one key transition. Returns true if the key must be blocked.
    ///
    /// Toggle is forwarded as a Press on its first key-down only; Windows
    /// repeats key-down while a key is held.
    pub fn handle(&self, vk: u32, down: bool) -> bool {
        let key = translate(vk);
        let raw = vk as i64;

        if key == LogicalKey::Toggle {
            if down {
                if !self.toggle_held.swap(true, Ordering::SeqCst) {
                    self.sink.push(KeyEvent::press(key, raw).stamped(Instant::now()));
                }
            } else {
                self.toggle_held.store(false, Ordering::SeqCst);
            }
            return false;
        }

        let active = self.ctx.is_active();
        if !forwards(key, active) {
            return false;
        }
        let event = if down {
            KeyEvent::press(key, raw)
        } else {
            KeyEvent::release(key, raw)
        };
        self.sink.push(event.stamped(Instant::now()));
        suppresses(key, active)
    }
}

/// Thread id to hook context table.
#[derive(Debug, Default)]
pub struct HookRegistry {
    entries: Mutex<HashMap<ThreadId, Arc<HookContext>>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, thread: ThreadId, context: Arc<HookContext>) {
        if self.entries.lock().insert(thread, context).is_some() {
            tracing::warn!(?thread, "Replaced an existing hook registration");
        }
    }

    pub fn unregister(&self, thread: ThreadId) -> Option<Arc<HookContext>> {
        self.entries.lock().remove(&thread)
    }

    pub fn lookup(&self, thread: ThreadId) -> Option<Arc<HookContext>> {
        self.entries.lock().get(&thread).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The process-wide table used by the hook procedure.
pub fn registry() -> &'static HookRegistry {
    static REGISTRY: OnceLock<HookRegistry> = OnceLock::new();
    REGISTRY.get_or_init(HookRegistry::new)
}
