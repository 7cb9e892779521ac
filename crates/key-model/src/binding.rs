//! The fixed key bindings. Raw codes live in each platform crate.

use serde::Serialize;

use crate::key::LogicalKey;

/// A physical key and what it does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Binding {
    pub key: LogicalKey,
    /// Physical key label on a US layout.
    pub label: &'static str,
    pub action: &'static str,
}

pub const BINDINGS: [Binding; 14] = [
    Binding { key: LogicalKey::Toggle, label: "Caps Lock", action: "toggle MouseKeys on/off" },
    Binding { key: LogicalKey::MoveUp, label: "W", action: "move up" },
    Binding { key: LogicalKey::MoveDown, label: "S", action: "move down" },
    Binding { key: LogicalKey::MoveLeft, label: "A", action: "move left" },
    Binding { key: LogicalKey::MoveRight, label: "D", action: "move right" },
    Binding { key: LogicalKey::DiagUpLeft, label: "Q", action: "move up-left" },
    Binding { key: LogicalKey::DiagUpRight, label: "E", action: "move up-right" },
    Binding { key: LogicalKey::DiagDownLeft, label: "Z", action: "move down-left" },
    Binding { key: LogicalKey::DiagDownRight, label: "X", action: "move down-right" },
    Binding { key: LogicalKey::LeftClick, label: "Space", action: "left button (hold to drag)" },
    Binding { key: LogicalKey::RightClick, label: "Left Ctrl", action: "right click" },
    Binding { key: LogicalKey::MiddleClick, label: "Left Shift", action: "middle click" },
    Binding { key: LogicalKey::ScrollUp, label: "R", action: "scroll up" },
    Binding { key: LogicalKey::ScrollDown, label: "F", action: "scroll down" },
];

/// Look up the binding for a logical key.
pub fn binding_for(key: LogicalKey) -> Option<&'static Binding> {
    BINDINGS.iter().find(|b| b.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_logical_key_has_one_binding() {
        for key in LogicalKey::ALL {
            assert_eq!(BINDINGS.iter().filter(|b| b.key == key).count(), 1, "{key:?}");
        }
        assert!(binding_for(LogicalKey::Unknown).is_none());
    }
}
