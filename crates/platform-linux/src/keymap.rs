//! evdev key code table.

use mousekeys_key_model::LogicalKey;

pub const KEY_Q: u16 = 16;
pub const KEY_W: u16 = 17;
pub const KEY_E: u16 = 18;
pub const KEY_R: u16 = 19;
pub const KEY_LEFTCTRL: u16 = 29;
pub const KEY_A: u16 = 30;
pub const KEY_S: u16 = 31;
pub const KEY_D: u16 = 32;
pub const KEY_F: u16 = 33;
pub const KEY_LEFTSHIFT: u16 = 42;
pub const KEY_Z: u16 = 44;
pub const KEY_X: u16 = 45;
pub const KEY_SPACE: u16 = 57;
pub const KEY_CAPSLOCK: u16 = 58;

/// Map an evdev `EV_KEY` code to its logical key.
pub fn translate(code: u16) -> LogicalKey {
    match code {
        KEY_CAPSLOCK => LogicalKey::Toggle,
        KEY_W => LogicalKey::MoveUp,
        KEY_S => LogicalKey::MoveDown,
        KEY_A => LogicalKey::MoveLeft,
        KEY_D => LogicalKey::MoveRight,
        KEY_Q => LogicalKey::DiagUpLeft,
        KEY_E => LogicalKey::DiagUpRight,
        KEY_Z => LogicalKey::DiagDownLeft,
        KEY_X => LogicalKey::DiagDownRight,
        KEY_SPACE => LogicalKey::LeftClick,
        KEY_LEFTCTRL => LogicalKey::RightClick,
        KEY_LEFTSHIFT => LogicalKey::MiddleClick,
        KEY_R => LogicalKey::ScrollUp,
        KEY_F => LogicalKey::ScrollDown,
        _ => LogicalKey::Unknown,
    }
}

/// Reverse lookup, used to print the binding table.
pub fn raw_code(key: LogicalKey) -> Option<u16> {
    (0..=255u16).find(|code| key.is_known() && translate(*code) == key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_matches_default_bindings() {
        assert_eq!(translate(58), LogicalKey::Toggle);
        assert_eq!(translate(17), LogicalKey::MoveUp);
        assert_eq!(translate(45), LogicalKey::DiagDownRight);
        assert_eq!(translate(57), LogicalKey::LeftClick);
        assert_eq!(translate(29), LogicalKey::RightClick);
        assert_eq!(translate(42), LogicalKey::MiddleClick);
        assert_eq!(translate(33), LogicalKey::ScrollDown);
    }

    #[test]
    fn test_unbound_codes_are_unknown() {
        assert_eq!(translate(1), LogicalKey::Unknown); // Esc
        assert_eq!(translate(54), LogicalKey::Unknown); // Right Shift
        assert_eq!(translate(u16::MAX), LogicalKey::Unknown);
    }

    #[test]
    fn test_every_logical_key_has_exactly_one_code() {
        for key in LogicalKey::ALL {
            let codes: Vec<u16> = (0..=255u16).filter(|c| translate(*c) == key).collect();
            assert_eq!(codes.len(), 1, "{key:?}");
            assert_eq!(raw_code(key), Some(codes[0]));
        }
        assert_eq!(raw_code(LogicalKey::Unknown), None);
    }
}
