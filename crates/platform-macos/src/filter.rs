//! Event tap callback decisions, independent of Quartz types.

use mousekeys_key_model::{KeyEvent, KeyEventKind, LogicalKey};
use mousekeys_platform_core::{forwards, suppresses};

use crate::keymap::translate;
use crate::modifiers::{modifier_mask, ModifierEdges};

/// The keyboard event types the tap subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapEventKind {
    KeyDown,
    KeyUp,
    FlagsChanged,
}

/// What the tap callback does with one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TapDecision {
    pub event: Option<KeyEvent>,
    /// Return no event from the callback, hiding it from other applications.
    pub suppress: bool,
}

impl TapDecision {
    const PASS: TapDecision = TapDecision {
        event: None,
        suppress: false,
    };
}

/// Decide how to handle a tapped keyboard event.
///
/// Modifier edges are tracked even while inactive so a modifier held across
/// activation reports its release correctly.
pub fn classify(
    kind: TapEventKind,
    keycode: i64,
    flags: u64,
    active: bool,
    edges: &mut ModifierEdges,
) -> TapDecision {
    let key = translate(keycode);

    match kind {
        TapEventKind::FlagsChanged => {
            if key == LogicalKey::Toggle {
                // Caps Lock: the flag word does not say which edge occurred.
                return TapDecision {
                    event: Some(KeyEvent::modifier_change(key, keycode, flags)),
                    suppress: false,
                };
            }
            let Some(mask) = modifier_mask(key) else {
                return TapDecision::PASS;
            };
            let edge = edges.edge(mask, flags);
            if !active {
                return TapDecision::PASS;
            }
            TapDecision {
                event: edge.map(|kind| KeyEvent::new(key, kind, keycode, flags)),
                suppress: true,
            }
        }
        TapEventKind::KeyDown | TapEventKind::KeyUp => {
            if !forwards(key, active) {
                return TapDecision::PASS;
            }
            let kind = if kind == TapEventKind::KeyDown {
                KeyEventKind::Press
            } else {
                KeyEventKind::Release
            };
            TapDecision {
                event: Some(KeyEvent::new(key, kind, keycode, flags)),
                suppress: suppresses(key, active),
            }
        }
    }
}
