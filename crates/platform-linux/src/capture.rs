//! evdev keyboard capture.
//!
//! The physical keyboard is grabbed exclusively and every event MouseKeys
//! does not consume is re-emitted through a uinput keyboard. Without the grab
//! the reader only observes, and handled keys also reach other applications.

use std::collections::HashSet;
use std::io::ErrorKind;
use std::os::fd::AsRawFd;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

use evdev::uinput::{VirtualDevice, VirtualDeviceBuilder};
use evdev::{AttributeSet, Device, InputEvent, InputEventKind, Key};

use mousekeys_common::config::CaptureSettings;
use mousekeys_common::error::{MouseKeysError, MouseKeysResult};
use mousekeys_platform_core::{event_queue, CaptureContext, EventSink, EventSource, KeyboardCapture};

use crate::discovery;
use crate::filter::{route, KEY_PRESSED, KEY_RELEASED};

/// Upper bound on how long `stop()` waits for the reader to notice.
const POLL_TIMEOUT_MS: i32 = 100;

const PASSTHROUGH_NAME: &str = "MouseKeys passthrough keyboard";

pub struct EvdevCapture {
    settings: CaptureSettings,
    ctx: CaptureContext,
    sink: Option<EventSink>,
    stop_flag: Arc<AtomicBool>,
    reader_alive: Arc<AtomicBool>,
    reader: Option<JoinHandle<()>>,
}

impl EvdevCapture {
    pub fn new(settings: CaptureSettings, ctx: CaptureContext) -> Self {
        Self {
            settings,
            ctx,
            sink: None,
            stop_flag: Arc::new(AtomicBool::new(false)),
            reader_alive: Arc::new(AtomicBool::new(false)),
            reader: None,
        }
    }

    /// Whether evdev capture can be attempted at all on this machine.
    pub fn is_supported() -> bool {
        std::path::Path::new("/dev/input").exists()
    }
}

impl KeyboardCapture for EvdevCapture {
    fn start(&mut self) -> MouseKeysResult<EventSource> {
        if self.reader.is_some() {
            return Err(MouseKeysError::capture("evdev capture already running"));
        }

        let path = discovery::find_keyboard(self.settings.device.as_deref()).ok_or_else(|| {
            MouseKeysError::capture_unavailable("No keyboard device found under /dev/input")
        })?;

        let mut device = Device::open(&path).map_err(|e| {
            MouseKeysError::capture_unavailable(format!(
                "Failed to open {}: {e}. Fix: sudo usermod -aG input $USER && log out/in",
                path.display()
            ))
        })?;
        let device_name = device.name().unwrap_or("unknown").to_string();

        set_nonblocking(&device).map_err(|e| {
            MouseKeysError::capture_unavailable(format!(
                "Failed to make {} non-blocking: {e}",
                path.display()
            ))
        })?;

        let passthrough = if self.settings.grab {
            device.grab().map_err(|e| {
                MouseKeysError::capture_unavailable(format!(
                    "Failed to grab {}: {e}",
                    path.display()
                ))
            })?;
            match build_passthrough(&device) {
                Ok(vdev) => Some(vdev),
                Err(e) => {
                    let _ = device.ungrab();
                    return Err(MouseKeysError::capture_unavailable(format!(
                        "Failed to create uinput passthrough keyboard: {e}. Check write access to /dev/uinput"
                    )));
                }
            }
        } else {
            tracing::warn!(
                device = %path.display(),
                "Keyboard grab disabled; running passive, handled keys cannot be suppressed"
            );
            None
        };

        let (sink, source) = event_queue(self.ctx.queue_capacity());
        self.stop_flag.store(false, Ordering::SeqCst);

        let reader = Reader {
            _alive: AliveGuard::arm(self.reader_alive.clone()),
            device,
            passthrough,
            sink: sink.clone(),
            ctx: self.ctx.clone(),
            stop_flag: self.stop_flag.clone(),
            replayed_down: HashSet::new(),
        };
        let handle = std::thread::Builder::new()
            .name("mousekeys-evdev".into())
            .spawn(move || reader.run())?;

        tracing::info!(
            device = %path.display(),
            name = %device_name,
            grab = self.settings.grab,
            "Keyboard capture started"
        );

        self.sink = Some(sink);
        self.reader = Some(handle);
        Ok(source)
    }

    fn stop(&mut self) -> MouseKeysResult<()> {
        self.stop_flag.store(true, Ordering::SeqCst);
        if let Some(sink) = self.sink.take() {
            sink.close();
        }
        if let Some(handle) = self.reader.take() {
            handle
                .join()
                .map_err(|_| MouseKeysError::capture("evdev reader thread panicked"))?;
            tracing::info!("Keyboard capture stopped");
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "evdev"
    }

    /// False once the reader thread has exited, even before `stop()`.
    fn is_running(&self) -> bool {
        self.reader.is_some() && self.reader_alive.load(Ordering::SeqCst)
    }
}

impl Drop for EvdevCapture {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            tracing::warn!(error = %e, "Failed to stop evdev capture cleanly");
        }
    }
}

/// Marks the reader as alive until dropped.
struct AliveGuard(Arc<AtomicBool>);

impl AliveGuard {
    fn arm(flag: Arc<AtomicBool>) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for AliveGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

struct Reader {
    _alive: AliveGuard,
    device: Device,
    passthrough: Option<VirtualDevice>,
    sink: EventSink,
    ctx: CaptureContext,
    stop_flag: Arc<AtomicBool>,
    replayed_down: HashSet<u16>,
}

impl Reader {
    fn run(mut self) {
        while !self.stop_flag.load(Ordering::SeqCst) {
            let fetched = self
                .device
                .fetch_events()
                .map(|events| events.collect::<Vec<InputEvent>>());
            let events = match fetched {
                Ok(events) => events,
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    self.wait_readable();
                    continue;
                }
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        "Keyboard read failed; capture has ended and keys no longer reach MouseKeys"
                    );
                    break;
                }
            };

            for event in events {
                self.handle(event);
            }
        }

        if self.passthrough.is_some() {
            if let Err(e) = self.device.ungrab() {
                tracing::warn!(error = %e, "Failed to release keyboard grab");
            }
        }
        self.sink.close();
    }

    fn handle(&mut self, event: InputEvent) {
        let InputEventKind::Key(key) = event.kind() else {
            return;
        };
        let code = key.code();
        let active = self.ctx.is_active();
        let routing = route(code, event.value(), active, self.replayed_down.contains(&code));

        if let Some(key_event) = routing.event {
            self.sink.push(key_event.stamped(Instant::now()));
        }

        if !routing.replay {
            return;
        }
        let Some(ref mut vdev) = self.passthrough else {
            return;
        };
        if let Err(e) = vdev.emit(&[event]) {
            tracing::warn!(code, error = %e, "uinput passthrough emit failed");
            return;
        }
        match event.value() {
            KEY_PRESSED => {
                self.replayed_down.insert(code);
            }
            KEY_RELEASED => {
                self.replayed_down.remove(&code);
            }
            _ => {}
        }
    }

    fn wait_readable(&self) {
        let mut fds = libc::pollfd {
            fd: self.device.as_raw_fd(),
            events: libc::POLLIN,
            revents: 0,
        };
        // Timeout or EINTR both just send us back round the loop.
        unsafe {
            libc::poll(&mut fds, 1, POLL_TIMEOUT_MS);
        }
    }
}

fn set_nonblocking(device: &Device) -> std::io::Result<()> {
    let raw_fd = device.as_raw_fd();

    let current = unsafe { libc::fcntl(raw_fd, libc::F_GETFL) };
    if current < 0 {
        return Err(std::io::Error::last_os_error());
    }

    let rc = unsafe { libc::fcntl(raw_fd, libc::F_SETFL, current | libc::O_NONBLOCK) };
    if rc < 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(())
}

/// A uinput keyboard advertising the same keys as the grabbed device.
fn build_passthrough(device: &Device) -> std::io::Result<VirtualDevice> {
    let mut keys: AttributeSet<Key> = AttributeSet::new();
    if let Some(source_keys) = device.supported_keys() {
        for key in source_keys.iter() {
            keys.insert(key);
        }
    }

    VirtualDeviceBuilder::new()?
        .name(PASSTHROUGH_NAME)
        .with_keys(&keys)?
        .build()
}
