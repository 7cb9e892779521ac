//! Quartz event tap keyboard capture.

use std::cell::RefCell;
use std::ptr;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use core_foundation::base::TCFType;
use core_foundation::mach_port::{CFMachPort, CFMachPortCreateRunLoopSource, CFMachPortRef};
use core_foundation::runloop::{kCFRunLoopCommonModes, kCFRunLoopDefaultMode, CFRunLoop, CFRunLoopSource};
use core_graphics::event::{
    CGEvent, CGEventTap, CGEventTapLocation, CGEventTapOptions, CGEventTapPlacement,
    CGEventTapProxy, CGEventType, EventField,
};

use mousekeys_common::error::{MouseKeysError, MouseKeysResult};
use mousekeys_platform_core::{event_queue, CaptureContext, EventSink, EventSource, KeyboardCapture};

use crate::filter::{classify, TapEventKind};
use crate::modifiers::ModifierEdges;

/// Run loop slice between stop-flag checks.
const RUN_LOOP_SLICE: Duration = Duration::from_millis(100);

const ACCESSIBILITY_HINT: &str =
    "Grant Accessibility access in System Settings > Privacy & Security > Accessibility";

#[link(name = "CoreGraphics", kind = "framework")]
extern "C" {
    fn CGEventTapEnable(tap: CFMachPortRef, enable: bool);
}

/// The tap thread's run loop, so `stop()` can wake it from another thread.
struct RunLoopHandle(CFRunLoop);

// SAFETY: CFRunLoopStop may be called from any thread.
unsafe impl Send for RunLoopHandle {}

pub struct EventTapCapture {
    ctx: CaptureContext,
    sink: Option<EventSink>,
    run_loop: Option<RunLoopHandle>,
    stop_flag: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl EventTapCapture {
    pub fn new(ctx: CaptureContext) -> Self {
        Self {
            ctx,
            sink: None,
            run_loop: None,
            stop_flag: Arc::new(AtomicBool::new(false)),
            thread: None,
        }
    }
}

impl KeyboardCapture for EventTapCapture {
    fn start(&mut self) -> MouseKeysResult<EventSource> {
        if self.thread.is_some() {
            return Err(MouseKeysError::capture("event tap already running"));
        }

        let (sink, source) = event_queue(self.ctx.queue_capacity());
        let (ready_tx, ready_rx) = mpsc::channel();
        self.stop_flag.store(false, Ordering::SeqCst);

        let ctx = self.ctx.clone();
        let tap_sink = sink.clone();
        let stop_flag = self.stop_flag.clone();
        let handle = std::thread::Builder::new()
            .name("mousekeys-event-tap".into())
            .spawn(move || run_tap(ctx, tap_sink, stop_flag, ready_tx))?;

        match ready_rx.recv() {
            Ok(Ok(run_loop)) => {
                tracing::info!("Keyboard capture started (Quartz event tap)");
                self.sink = Some(sink);
                self.run_loop = Some(run_loop);
                self.thread = Some(handle);
                Ok(source)
            }
            Ok(Err(message)) => {
                let _ = handle.join();
                Err(MouseKeysError::capture_unavailable(message))
            }
            Err(_) => {
                let _ = handle.join();
                Err(MouseKeysError::capture_unavailable(
                    "event tap thread exited during setup",
                ))
            }
        }
    }

    fn stop(&mut self) -> MouseKeysResult<()> {
        self.stop_flag.store(true, Ordering::SeqCst);
        if let Some(sink) = self.sink.take() {
            sink.close();
        }
        if let Some(RunLoopHandle(run_loop)) = self.run_loop.take() {
            run_loop.stop();
        }
        if let Some(handle) = self.thread.take() {
            handle
                .join()
                .map_err(|_| MouseKeysError::capture("event tap thread panicked"))?;
            tracing::info!("Keyboard capture stopped");
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "cg-event-tap"
    }

    fn is_running(&self) -> bool {
        self.thread.is_some()
    }
}

impl Drop for EventTapCapture {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            tracing::warn!(error = %e, "Failed to stop event tap cleanly");
        }
    }
}

fn run_tap(
    ctx: CaptureContext,
    sink: EventSink,
    stop_flag: Arc<AtomicBool>,
    ready: mpsc::Sender<Result<RunLoopHandle, String>>,
) {
    let run_loop = CFRunLoop::get_current();
    let edges = RefCell::new(ModifierEdges::default());
    let tap_port: Rc<RefCell<Option<CFMachPort>>> = Rc::new(RefCell::new(None));
    let callback_port = tap_port.clone();

    let callback = move |_proxy: CGEventTapProxy,
                         event_type: CGEventType,
                         event: &CGEvent|
          -> Option<CGEvent> {
        let kind = match event_type {
            CGEventType::KeyDown => TapEventKind::KeyDown,
            CGEventType::KeyUp => TapEventKind::KeyUp,
            CGEventType::FlagsChanged => TapEventKind::FlagsChanged,
            CGEventType::TapDisabledByTimeout | CGEventType::TapDisabledByUserInput => {
                tracing::warn!("Event tap disabled by the system, re-enabling");
                if let Some(port) = callback_port.borrow().as_ref() {
                    unsafe { CGEventTapEnable(port.as_concrete_TypeRef(), true) };
                }
                return Some(event.clone());
            }
            _ => return Some(event.clone()),
        };

        let keycode = event.get_integer_value_field(EventField::KEYBOARD_EVENT_KEYCODE);
        let flags = event.get_flags().bits();
        let decision = classify(
            kind,
            keycode,
            flags,
            ctx.is_active(),
            &mut edges.borrow_mut(),
        );

        if let Some(key_event) = decision.event {
            sink.push(key_event.stamped(Instant::now()));
        }
        if decision.suppress {
            None
        } else {
            Some(event.clone())
        }
    };

    let tap = match CGEventTap::new(
        CGEventTapLocation::Session,
        CGEventTapPlacement::HeadInsertEventTap,
        CGEventTapOptions::Default,
        vec![
            CGEventType::KeyDown,
            CGEventType::KeyUp,
            CGEventType::FlagsChanged,
        ],
        callback,
    ) {
        Ok(tap) => tap,
        Err(()) => {
            let _ = ready.send(Err(format!(
                "Failed to create event tap. {ACCESSIBILITY_HINT}"
            )));
            return;
        }
    };
    *tap_port.borrow_mut() = Some(tap.mach_port.clone());

    unsafe {
        let source = CFMachPortCreateRunLoopSource(ptr::null(), tap.mach_port.as_concrete_TypeRef(), 0);
        if source.is_null() {
            let _ = ready.send(Err("Failed to create run loop source for event tap".into()));
            return;
        }
        let source = CFRunLoopSource::wrap_under_create_rule(source);
        run_loop.add_source(&source, kCFRunLoopCommonModes);
    }
    tap.enable();

    if ready.send(Ok(RunLoopHandle(run_loop.clone()))).is_err() {
        return;
    }

    while !stop_flag.load(Ordering::SeqCst) {
        unsafe {
            CFRunLoop::run_in_mode(kCFRunLoopDefaultMode, RUN_LOOP_SLICE, false);
        }
    }
    tracing::debug!("Event tap run loop exited");
}
