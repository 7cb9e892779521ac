//! Normalized key events produced by capture adapters.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::key::LogicalKey;

/// Edge reported by a capture adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyEventKind {
    Press,
    Release,
    /// Combined modifier-state change where the platform does not say which
    /// edge occurred (e.g. Caps Lock on macOS).
    ModifierChange,
}

/// One key event in the unified stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub logical_key: LogicalKey,
    pub kind: KeyEventKind,
    /// Platform key code, kept for diagnostics only.
    pub raw_code: i64,
    /// Platform modifier flags at the time of the event.
    pub raw_flags: u64,
    /// When the adapter read the event from the OS. Unset for synthetic
    /// events.
    #[serde(skip)]
    pub captured_at: Option<Instant>,
}

impl KeyEvent {
    pub fn new(logical_key: LogicalKey, kind: KeyEventKind, raw_code: i64, raw_flags: u64) -> Self {
        Self {
            logical_key,
            kind,
            raw_code,
            raw_flags,
            captured_at: None,
        }
    }

    /// Record the capture time.
    pub fn stamped(mut self, at: Instant) -> Self {
        self.captured_at = Some(at);
        self
    }

    pub fn press(logical_key: LogicalKey, raw_code: i64) -> Self {
        Self::new(logical_key, KeyEventKind::Press, raw_code, 0)
    }

    pub fn release(logical_key: LogicalKey, raw_code: i64) -> Self {
        Self::new(logical_key, KeyEventKind::Release, raw_code, 0)
    }

    pub fn modifier_change(logical_key: LogicalKey, raw_code: i64, raw_flags: u64) -> Self {
        Self::new(logical_key, KeyEventKind::ModifierChange, raw_code, raw_flags)
    }

    pub fn is_toggle(&self) -> bool {
        self.logical_key == LogicalKey::Toggle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_set_kind() {
        assert_eq!(
            KeyEvent::press(LogicalKey::MoveUp, 17).kind,
            KeyEventKind::Press
        );
        assert_eq!(
            KeyEvent::release(LogicalKey::MoveUp, 17).kind,
            KeyEventKind::Release
        );
        let flags = KeyEvent::modifier_change(LogicalKey::Toggle, 57, 1 << 16);
        assert_eq!(flags.kind, KeyEventKind::ModifierChange);
        assert_eq!(flags.raw_flags, 1 << 16);
        assert!(flags.is_toggle());
    }

    #[test]
    fn test_stamp_is_kept_out_of_json() {
        let event = KeyEvent::press(LogicalKey::Toggle, 58);
        assert_eq!(event.captured_at, None);

        let at = Instant::now();
        let stamped = event.stamped(at);
        assert_eq!(stamped.captured_at, Some(at));
        assert_eq!(
            serde_json::to_string(&stamped).unwrap(),
            serde_json::to_string(&event).unwrap()
        );
        let back: KeyEvent = serde_json::from_str(&serde_json::to_string(&stamped).unwrap()).unwrap();
        assert_eq!(back.captured_at, None);
    }

    #[test]
    fn test_event_json_shape() {
        let event = KeyEvent::press(LogicalKey::ScrollUp, 19);
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(
            json,
            r#"{"logical_key":"scroll_up","kind":"press","raw_code":19,"raw_flags":0}"#
        );
    }
}
