//! MouseKeys Input Capture
//!
//! Picks the keyboard capture backend for the running platform:
//!
//! - **Linux:** evdev grab with uinput passthrough
//! - **macOS:** Quartz session event tap
//! - **Windows:** `WH_KEYBOARD_LL` hook
//!
//! Every backend yields the same unified [`KeyEvent`] stream through an
//! [`EventSource`]. Backend failures surface from `start()` as
//! `CaptureUnavailable` so callers can keep running without capture.

pub mod backends;

pub use backends::{check_capabilities, detect_capture, platform_name, raw_code};
pub use mousekeys_key_model::{KeyEvent, KeyEventKind, LogicalKey};
pub use mousekeys_platform_core::{
    ActivityProbe, CaptureContext, EventSource, KeyboardCapture, ScriptStep, ScriptedCapture,
};
