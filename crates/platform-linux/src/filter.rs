//! Per-event routing for the evdev reader.
//!
//! Every `EV_KEY` event read from the grabbed keyboard is routed two ways:
//! into the MouseKeys event queue, and back out through the passthrough
//! keyboard so other applications still see it.

use mousekeys_key_model::{KeyEvent, LogicalKey};
use mousekeys_platform_core::{forwards, suppresses};

use crate::keymap::translate;

pub const KEY_RELEASED: i32 = 0;
pub const KEY_PRESSED: i32 = 1;
pub const KEY_REPEAT: i32 = 2;

/// Where one raw key event goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Routing {
    /// Event to enqueue for the dispatcher.
    pub event: Option<KeyEvent>,
    /// Whether to re-emit the raw event on the passthrough keyboard.
    pub replay: bool,
}

/// Route a raw evdev key event.
///
/// `replayed_down` is whether the passthrough keyboard currently holds this
/// code down. A release always follows its replayed press so no key is left
/// stuck on the passthrough device when MouseKeys turns on mid-press.
pub fn route(code: u16, value: i32, active: bool, replayed_down: bool) -> Routing {
    let key = translate(code);
    let raw = code as i64;

    let event = match value {
        KEY_PRESSED if forwards(key, active) => Some(KeyEvent::press(key, raw)),
        KEY_RELEASED if forwards(key, active) && key != LogicalKey::Toggle => {
            Some(KeyEvent::release(key, raw))
        }
        _ => None,
    };

    let replay = match value {
        KEY_RELEASED => replayed_down || !suppresses(key, active),
        _ => !suppresses(key, active),
    };

    Routing { event, replay }
}
