//! Capability detection for Windows.

use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, SetWindowsHookExW, UnhookWindowsHookEx, WH_KEYBOARD_LL,
};
use windows::Win32::Foundation::{LPARAM, LRESULT, WPARAM};

use mousekeys_platform_core::Capability;

/// Check all capabilities and report status.
pub fn check_capabilities() -> Vec<Capability> {
    vec![check_keyboard_hook()]
}

unsafe extern "system" fn passthrough_proc(code: i32, w_param: WPARAM, l_param: LPARAM) -> LRESULT {
    CallNextHookEx(None, code, w_param, l_param)
}

/// Install and immediately remove a no-op hook.
fn check_keyboard_hook() -> Capability {
    let available = match unsafe { SetWindowsHookExW(WH_KEYBOARD_LL, Some(passthrough_proc), None, 0) } {
        Ok(hook) => {
            let _ = unsafe { UnhookWindowsHookEx(hook) };
            true
        }
        Err(e) => {
            tracing::debug!(error = %e, "Keyboard hook probe failed");
            false
        }
    };

    Capability {
        name: "Low-Level Keyboard Hook".to_string(),
        description: "WH_KEYBOARD_LL hook for keyboard capture and key suppression".to_string(),
        available,
        required: true,
        fix_instructions: if !available {
            Some(
                "Run MouseKeys in an interactive desktop session; elevated windows also require running MouseKeys as administrator"
                    .to_string(),
            )
        } else {
            None
        },
    }
}
