//! In-process keyboard capture that replays a fixed script.
//!
//! Events are delivered verbatim: there is no activity filtering and no
//! suppression. Used by integration tests and `mousekeys simulate`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use mousekeys_common::error::{MouseKeysError, MouseKeysResult};
use mousekeys_key_model::KeyEvent;

use crate::capture::{CaptureContext, KeyboardCapture};
use crate::queue::{event_queue, EventSink, EventSource};

/// One entry in a capture script.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScriptStep {
    Event(KeyEvent),
    Pause(Duration),
}

/// Replays a script on a background thread.
pub struct ScriptedCapture {
    script: Vec<ScriptStep>,
    ctx: CaptureContext,
    unavailable: Option<String>,
    sink: Option<EventSink>,
    replay: Option<JoinHandle<()>>,
    cancelled: Arc<AtomicBool>,
}

impl ScriptedCapture {
    pub fn new(script: Vec<ScriptStep>, ctx: CaptureContext) -> Self {
        Self {
            script,
            ctx,
            unavailable: None,
            sink: None,
            replay: None,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A capture whose `start` always fails with `CaptureUnavailable`.
    pub fn unavailable(message: impl Into<String>, ctx: CaptureContext) -> Self {
        let mut capture = Self::new(Vec::new(), ctx);
        capture.unavailable = Some(message.into());
        capture
    }

    /// Wait for the script to finish replaying. The queue stays open so
    /// already-delivered events can still be drained.
    pub fn wait_replayed(&mut self) {
        if let Some(handle) = self.replay.take() {
            if handle.join().is_err() {
                tracing::error!("Scripted capture replay thread panicked");
            }
        }
    }
}

impl KeyboardCapture for ScriptedCapture {
    fn start(&mut self) -> MouseKeysResult<EventSource> {
        if let Some(ref message) = self.unavailable {
            return Err(MouseKeysError::capture_unavailable(message.clone()));
        }
        if self.sink.is_some() {
            return Err(MouseKeysError::capture("scripted capture already started"));
        }

        let (sink, source) = event_queue(self.ctx.queue_capacity());
        let script = self.script.clone();
        let replay_sink = sink.clone();
        self.cancelled.store(false, Ordering::SeqCst);
        let cancelled = self.cancelled.clone();

        let handle = std::thread::Builder::new()
            .name("mousekeys-scripted-capture".into())
            .spawn(move || {
                for step in script {
                    if cancelled.load(Ordering::SeqCst) {
                        break;
                    }
                    match step {
                        ScriptStep::Event(event) => {
                            replay_sink.push(event);
                        }
                        ScriptStep::Pause(pause) => std::thread::sleep(pause),
                    }
                }
                tracing::debug!("Scripted capture finished replaying");
            })?;

        tracing::info!(steps = self.script.len(), "Scripted capture started");
        self.sink = Some(sink);
        self.replay = Some(handle);
        Ok(source)
    }

    fn stop(&mut self) -> MouseKeysResult<()> {
        self.cancelled.store(true, Ordering::SeqCst);
        if let Some(sink) = self.sink.take() {
            sink.close();
        }
        self.wait_replayed();
        Ok(())
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn is_running(&self) -> bool {
        self.sink.is_some()
    }
}

impl Drop for ScriptedCapture {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mousekeys_key_model::LogicalKey;

    fn ctx() -> CaptureContext {
        CaptureContext::new(16, Arc::new(|| false))
    }

    #[test]
    fn replays_events_in_order_without_filtering() {
        let script = vec![
            ScriptStep::Event(KeyEvent::press(LogicalKey::Toggle, 58)),
            ScriptStep::Pause(Duration::from_millis(1)),
            ScriptStep::Event(KeyEvent::press(LogicalKey::MoveUp, 17)),
            ScriptStep::Event(KeyEvent::release(LogicalKey::MoveUp, 17)),
        ];
        let mut capture = ScriptedCapture::new(script, ctx());
        let source = capture.start().unwrap();
        assert!(capture.is_running());
        capture.wait_replayed();

        let keys: Vec<_> = std::iter::from_fn(|| source.try_recv())
            .map(|e| e.logical_key)
            .collect();
        assert_eq!(
            keys,
            vec![LogicalKey::Toggle, LogicalKey::MoveUp, LogicalKey::MoveUp]
        );

        capture.stop().unwrap();
        assert!(!capture.is_running());
        assert!(source.recv().is_none());
    }

    #[test]
    fn unavailable_capture_fails_to_start() {
        let mut capture = ScriptedCapture::unavailable("no keyboard", ctx());
        let err = capture.start().unwrap_err();
        assert!(err.is_capture_unavailable());
        assert!(err.to_string().contains("no keyboard"));
        assert!(!capture.is_running());
        capture.stop().unwrap();
        drop(capture);
    }

    #[test]
    fn double_start_is_rejected() {
        let mut capture = ScriptedCapture::new(Vec::new(), ctx());
        let _source = capture.start().unwrap();
        assert!(capture.start().is_err());
    }
}
