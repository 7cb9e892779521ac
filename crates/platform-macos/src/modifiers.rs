//! Edge detection over the Quartz modifier flag mask.
//!
//! Modifier keys never produce KeyDown/KeyUp on macOS, only a `FlagsChanged`
//! carrying the new flag word. A rising bit is a press, a falling bit a
//! release.

use mousekeys_key_model::{KeyEventKind, LogicalKey};

/// `kCGEventFlagMaskAlphaShift` (Caps Lock state).
pub const FLAG_ALPHA_SHIFT: u64 = 1 << 16;
/// `kCGEventFlagMaskShift`.
pub const FLAG_SHIFT: u64 = 1 << 17;
/// `kCGEventFlagMaskControl`.
pub const FLAG_CONTROL: u64 = 1 << 18;

/// Flag bit carrying the pressed state of a bound modifier key.
pub fn modifier_mask(key: LogicalKey) -> Option<u64> {
    match key {
        LogicalKey::RightClick => Some(FLAG_CONTROL),
        LogicalKey::MiddleClick => Some(FLAG_SHIFT),
        _ => None,
    }
}

/// Remembers which tracked modifier bits were last seen set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModifierEdges {
    held: u64,
}

impl ModifierEdges {
    /// Record the new flag word and report the edge on `mask`, if any.
    pub fn edge(&mut self, mask: u64, flags: u64) -> Option<KeyEventKind> {
        let was = self.held & mask != 0;
        let now = flags & mask != 0;
        if now {
            self.held |= mask;
        } else {
            self.held &= !mask;
        }
        match (was, now) {
            (false, true) => Some(KeyEventKind::Press),
            (true, false) => Some(KeyEventKind::Release),
            _ => None,
        }
    }

    pub fn is_held(&self, mask: u64) -> bool {
        self.held & mask != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rising_then_falling_edge() {
        let mut edges = ModifierEdges::default();
        assert_eq!(edges.edge(FLAG_CONTROL, FLAG_CONTROL), Some(KeyEventKind::Press));
        assert!(edges.is_held(FLAG_CONTROL));
        assert_eq!(edges.edge(FLAG_CONTROL, 0), Some(KeyEventKind::Release));
        assert!(!edges.is_held(FLAG_CONTROL));
    }

    #[test]
    fn test_unchanged_bit_is_not_an_edge() {
        let mut edges = ModifierEdges::default();
        edges.edge(FLAG_SHIFT, FLAG_SHIFT);
        // Another modifier changed; shift is still down.
        assert_eq!(edges.edge(FLAG_SHIFT, FLAG_SHIFT | FLAG_CONTROL), None);
        assert_eq!(edges.edge(FLAG_CONTROL, 0), None);
    }

    #[test]
    fn test_masks_are_tracked_independently() {
        let mut edges = ModifierEdges::default();
        edges.edge(FLAG_SHIFT, FLAG_SHIFT);
        assert_eq!(edges.edge(FLAG_CONTROL, FLAG_SHIFT | FLAG_CONTROL), Some(KeyEventKind::Press));
        assert_eq!(edges.edge(FLAG_SHIFT, FLAG_CONTROL), Some(KeyEventKind::Release));
        assert!(edges.is_held(FLAG_CONTROL));
    }

    #[test]
    fn test_only_bound_modifiers_have_masks() {
        assert_eq!(modifier_mask(LogicalKey::RightClick), Some(FLAG_CONTROL));
        assert_eq!(modifier_mask(LogicalKey::MiddleClick), Some(FLAG_SHIFT));
        assert_eq!(modifier_mask(LogicalKey::Toggle), None);
        assert_eq!(modifier_mask(LogicalKey::MoveUp), None);
    }
}
