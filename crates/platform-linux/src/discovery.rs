//! Keyboard device discovery.
//!
//! Lookup order: configured path, `/dev/input/by-id` links whose name mentions
//! a keyboard, the handler table in `/proc/bus/input/devices`, and finally the
//! first evdev device that reports Caps Lock, A and Space.

use std::path::{Path, PathBuf};

const BY_ID_DIR: &str = "/dev/input/by-id";
const PROC_DEVICES: &str = "/proc/bus/input/devices";

/// Whether a `/dev/input/by-id` entry names a keyboard.
pub fn is_keyboard_link(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    name.contains("kbd") || name.contains("keyboard")
}

/// Pick the best keyboard link from a directory listing.
///
/// Links ending in `-event-kbd` sort first, and secondary USB interfaces
/// (`-if01-event-kbd`, usually media keys) after the primary one.
pub fn pick_by_id<'a>(names: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    let mut candidates: Vec<&str> = names.into_iter().filter(|n| is_keyboard_link(n)).collect();
    candidates.sort_by_key(|n| (!n.ends_with("-event-kbd"), n.contains("-if0"), *n));
    candidates.first().copied()
}

/// Find the first keyboard's event handler in `/proc/bus/input/devices`
/// content, e.g. `event3`.
pub fn parse_proc_devices(content: &str) -> Option<String> {
    let mut is_keyboard = false;
    for line in content.lines() {
        if let Some(name) = line.strip_prefix("N: Name=") {
            let name = name.to_ascii_lowercase();
            is_keyboard = name.contains("keyboard") || name.contains("kbd");
        } else if let Some(handlers) = line.strip_prefix("H: Handlers=") {
            if is_keyboard {
                if let Some(handler) = handlers.split_whitespace().find(|h| h.starts_with("event")) {
                    return Some(handler.to_string());
                }
            }
        } else if line.trim().is_empty() {
            is_keyboard = false;
        }
    }
    None
}

/// Locate the keyboard device to capture.
pub fn find_keyboard(configured: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = configured {
        tracing::debug!(path = %path.display(), "Using configured keyboard device");
        return Some(path.to_path_buf());
    }

    if let Ok(entries) = std::fs::read_dir(BY_ID_DIR) {
        let names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        if let Some(name) = pick_by_id(names.iter().map(String::as_str)) {
            let path = Path::new(BY_ID_DIR).join(name);
            tracing::debug!(path = %path.display(), "Found keyboard by id");
            return Some(path);
        }
    }

    if let Ok(content) = std::fs::read_to_string(PROC_DEVICES) {
        if let Some(handler) = parse_proc_devices(&content) {
            let path = Path::new("/dev/input").join(handler);
            tracing::debug!(path = %path.display(), source = PROC_DEVICES, "Found keyboard in device table");
            return Some(path);
        }
    }

    probe_capabilities()
}

#[cfg(target_os = "linux")]
fn probe_capabilities() -> Option<PathBuf> {
    use evdev::Key;

    for (path, device) in evdev::enumerate() {
        let Some(keys) = device.supported_keys() else {
            continue;
        };
        if keys.contains(Key::KEY_CAPSLOCK) && keys.contains(Key::KEY_A) && keys.contains(Key::KEY_SPACE) {
            tracing::debug!(
                path = %path.display(),
                name = device.name().unwrap_or("unknown"),
                "Found keyboard by capabilities"
            );
            return Some(path);
        }
    }
    None
}

#[cfg(not(target_os = "linux"))]
fn probe_capabilities() -> Option<PathBuf> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyboard_link_names() {
        assert!(is_keyboard_link("usb-Logitech_USB_Keyboard-event-kbd"));
        assert!(is_keyboard_link("platform-i8042-serio-0-event-kbd"));
        assert!(!is_keyboard_link("usb-Logitech_USB_Optical_Mouse-event-mouse"));
    }

    #[test]
    fn test_pick_prefers_primary_kbd_interface() {
        let names = [
            "usb-Razer_Razer_BlackWidow-if01-event-kbd",
            "usb-Logitech_Mouse-event-mouse",
            "usb-Razer_Razer_BlackWidow-event-kbd",
        ];
        assert_eq!(
            pick_by_id(names),
            Some("usb-Razer_Razer_BlackWidow-event-kbd")
        );
        assert_eq!(pick_by_id(["usb-Mouse-event-mouse"]), None);
    }

    #[test]
    fn test_parse_proc_devices_finds_keyboard_handler() {
        let content = "\
I: Bus=0019 Vendor=0000 Product=0001 Version=0000
N: Name=\"Power Button\"
H: Handlers=kbd event0

I: Bus=0011 Vendor=0001 Product=0001 Version=ab41
N: Name=\"AT Translated Set 2 keyboard\"
H: Handlers=sysrq kbd leds event3
";
        assert_eq!(parse_proc_devices(content), Some("event3".to_string()));
    }

    #[test]
    fn test_parse_proc_devices_without_keyboard() {
        let content = "N: Name=\"ImPS/2 Mouse\"\nH: Handlers=mouse0 event4\n";
        assert_eq!(parse_proc_devices(content), None);
    }

    #[test]
    fn test_configured_path_wins() {
        let path = Path::new("/dev/input/event42");
        assert_eq!(find_keyboard(Some(path)), Some(path.to_path_buf()));
    }
}
