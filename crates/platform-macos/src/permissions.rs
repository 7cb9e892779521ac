//! Permission detection and guidance for macOS.

use core_graphics::event::{
    CGEventTap, CGEventTapLocation, CGEventTapOptions, CGEventTapPlacement, CGEventType,
};

use mousekeys_platform_core::Capability;

/// Check all capabilities and report status.
pub fn check_capabilities() -> Vec<Capability> {
    vec![check_accessibility()]
}

/// Creating a tap only succeeds once the process is trusted for
/// Accessibility. A listen-only tap is enough to find out.
fn check_accessibility() -> Capability {
    let available = CGEventTap::new(
        CGEventTapLocation::Session,
        CGEventTapPlacement::TailAppendEventTap,
        CGEventTapOptions::ListenOnly,
        vec![CGEventType::KeyDown],
        |_proxy, _event_type, event| Some(event.clone()),
    )
    .is_ok();

    Capability {
        name: "Accessibility".to_string(),
        description: "Quartz event tap for keyboard capture and key suppression".to_string(),
        available,
        required: true,
        fix_instructions: if !available {
            Some(
                "Grant Accessibility access in System Settings > Privacy & Security > Accessibility, then restart MouseKeys"
                    .to_string(),
            )
        } else {
            None
        },
    }
}
