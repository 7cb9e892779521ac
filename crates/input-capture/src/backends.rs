//! Capture backend selection.

use mousekeys_common::config::CaptureSettings;
use mousekeys_key_model::LogicalKey;
use mousekeys_platform_core::{ActivityProbe, Capability, CaptureContext, KeyboardCapture};

/// Detect the keyboard capture backend for the current system.
///
/// Never fails: when no backend can work here, the returned capture fails
/// `start()` with `CaptureUnavailable` and a diagnostic.
pub fn detect_capture(settings: &CaptureSettings, activity: ActivityProbe) -> Box<dyn KeyboardCapture> {
    let ctx = CaptureContext::new(settings.queue_capacity, activity);
    platform_capture(settings, ctx)
}

#[cfg(target_os = "linux")]
fn platform_capture(settings: &CaptureSettings, ctx: CaptureContext) -> Box<dyn KeyboardCapture> {
    use mousekeys_platform_linux::EvdevCapture;

    if EvdevCapture::is_supported() {
        tracing::info!(grab = settings.grab, "Using evdev capture backend");
        return Box::new(EvdevCapture::new(settings.clone(), ctx));
    }

    let details = input_device_diagnostic();
    tracing::warn!(details = %details, "evdev capture is not available");
    Box::new(mousekeys_platform_core::ScriptedCapture::unavailable(details, ctx))
}

#[cfg(target_os = "macos")]
fn platform_capture(_settings: &CaptureSettings, ctx: CaptureContext) -> Box<dyn KeyboardCapture> {
    tracing::info!("Using Quartz event tap capture backend");
    Box::new(mousekeys_platform_macos::EventTapCapture::new(ctx))
}

#[cfg(windows)]
fn platform_capture(_settings: &CaptureSettings, ctx: CaptureContext) -> Box<dyn KeyboardCapture> {
    tracing::info!("Using low-level keyboard hook capture backend");
    Box::new(mousekeys_platform_windows::LowLevelHookCapture::new(ctx))
}

#[cfg(not(any(target_os = "linux", target_os = "macos", windows)))]
fn platform_capture(_settings: &CaptureSettings, ctx: CaptureContext) -> Box<dyn KeyboardCapture> {
    tracing::warn!("No keyboard capture backend for this platform");
    Box::new(mousekeys_platform_core::ScriptedCapture::unavailable(
        format!("keyboard capture is not supported on {}", std::env::consts::OS),
        ctx,
    ))
}

#[cfg(target_os = "linux")]
fn input_device_diagnostic() -> String {
    use std::os::unix::fs::MetadataExt;

    let path = "/dev/input";
    let uid = unsafe { libc::geteuid() };
    let gid = unsafe { libc::getegid() };

    match std::fs::metadata(path) {
        Ok(meta) => format!(
            "dir={path} mode={:o} owner_uid={} owner_gid={} process_uid={uid} process_gid={gid}; likely missing 'input' group membership. Fix: sudo usermod -aG input $USER && log out/in",
            meta.mode() & 0o777,
            meta.uid(),
            meta.gid()
        ),
        Err(err) => format!(
            "dir={path} unavailable ({err}); ensure the kernel evdev interface exists"
        ),
    }
}

/// Capability report for the current platform.
pub fn check_capabilities() -> Vec<Capability> {
    #[cfg(target_os = "linux")]
    {
        mousekeys_platform_linux::check_capabilities()
    }
    #[cfg(target_os = "macos")]
    {
        mousekeys_platform_macos::check_capabilities()
    }
    #[cfg(windows)]
    {
        mousekeys_platform_windows::check_capabilities()
    }
    #[cfg(not(any(target_os = "linux", target_os = "macos", windows)))]
    {
        vec![Capability {
            name: "Keyboard Capture".to_string(),
            description: format!("No capture backend for {}", std::env::consts::OS),
            available: false,
            required: true,
            fix_instructions: None,
        }]
    }
}

/// Platform key code bound to a logical key on this system.
pub fn raw_code(key: LogicalKey) -> Option<i64> {
    #[cfg(target_os = "linux")]
    {
        mousekeys_platform_linux::keymap::raw_code(key).map(i64::from)
    }
    #[cfg(target_os = "macos")]
    {
        mousekeys_platform_macos::keymap::raw_code(key)
    }
    #[cfg(windows)]
    {
        mousekeys_platform_windows::keymap::raw_code(key).map(i64::from)
    }
    #[cfg(not(any(target_os = "linux", target_os = "macos", windows)))]
    {
        let _ = key;
        None
    }
}

/// Human-readable name of the key code space used by [`raw_code`].
pub fn platform_name() -> &'static str {
    if cfg!(target_os = "linux") {
        "linux-evdev"
    } else if cfg!(target_os = "macos") {
        "macos-keycode"
    } else if cfg!(windows) {
        "windows-vk"
    } else {
        "unsupported"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_detected_capture_starts_stopped() {
        let capture = detect_capture(&CaptureSettings::default(), Arc::new(|| false));
        assert!(!capture.is_running());
        assert!(!capture.name().is_empty());
    }

    #[cfg(any(target_os = "linux", target_os = "macos", windows))]
    #[test]
    fn test_every_binding_has_a_code_on_supported_platforms() {
        for key in LogicalKey::ALL {
            assert!(raw_code(key).is_some(), "{key:?}");
        }
        assert_eq!(raw_code(LogicalKey::Unknown), None);
    }
}
