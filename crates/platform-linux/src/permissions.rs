//! Permission detection and guidance for Linux.
//!
//! Capturing the keyboard needs read access to `/dev/input/event*`;
//! suppressing handled keys additionally needs write access to `/dev/uinput`.

use std::path::Path;

use mousekeys_platform_core::Capability;

use crate::discovery;

/// Check all capabilities and report status.
pub fn check_capabilities() -> Vec<Capability> {
    vec![
        check_keyboard_device(),
        check_input_device_access(),
        check_uinput_access(),
        check_display_session(),
    ]
}

fn check_keyboard_device() -> Capability {
    let found = discovery::find_keyboard(None);

    Capability {
        name: "Keyboard Device".to_string(),
        description: match found {
            Some(ref path) => format!("Keyboard found at {}", path.display()),
            None => "evdev keyboard device to capture".to_string(),
        },
        available: found.is_some(),
        required: true,
        fix_instructions: if found.is_none() {
            Some(
                "Connect a keyboard or set capture.device in the config file to an /dev/input/event* path"
                    .to_string(),
            )
        } else {
            None
        },
    }
}

/// Check if the user can read input devices.
fn check_input_device_access() -> Capability {
    let input_dir = Path::new("/dev/input");
    let exists = input_dir.exists();

    let in_input_group = std::process::Command::new("groups")
        .output()
        .map(|o| String::from_utf8_lossy(&o.stdout).split_whitespace().any(|g| g == "input"))
        .unwrap_or(false);
    let is_root = is_root();

    Capability {
        name: "Input Device Access".to_string(),
        description: "Read access to /dev/input/event* for keyboard capture (evdev)".to_string(),
        available: exists && (in_input_group || is_root),
        required: true,
        fix_instructions: if !(in_input_group || is_root) {
            Some(
                "Add user to input group: sudo usermod -aG input $USER (logout required)"
                    .to_string(),
            )
        } else {
            None
        },
    }
}

/// Check write access to uinput, needed to pass unhandled keys through.
fn check_uinput_access() -> Capability {
    let available = std::fs::OpenOptions::new()
        .write(true)
        .open("/dev/uinput")
        .is_ok();

    Capability {
        name: "uinput".to_string(),
        description: "Virtual keyboard used to suppress handled keys while active".to_string(),
        available,
        required: false, // passive mode works without it
        fix_instructions: if !available {
            Some(
                "Load the module (sudo modprobe uinput) and grant access, e.g. a udev rule: KERNEL==\"uinput\", GROUP=\"input\", MODE=\"0660\""
                    .to_string(),
            )
        } else {
            None
        },
    }
}

/// Pointer injection goes through the display server.
fn check_display_session() -> Capability {
    let available = std::env::var("WAYLAND_DISPLAY").is_ok() || std::env::var("DISPLAY").is_ok();

    Capability {
        name: "Display Session".to_string(),
        description: "Graphical session for pointer injection".to_string(),
        available,
        required: true,
        fix_instructions: if !available {
            Some(
                "Run MouseKeys inside a graphical desktop session (X11 or Wayland)".to_string(),
            )
        } else {
            None
        },
    }
}

#[cfg(target_os = "linux")]
fn is_root() -> bool {
    unsafe { libc::geteuid() == 0 }
}

#[cfg(not(target_os = "linux"))]
fn is_root() -> bool {
    false
}
