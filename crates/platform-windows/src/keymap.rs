//! Windows virtual-key code table.

use mousekeys_key_model::LogicalKey;

pub const VK_SPACE: u32 = 0x20;
pub const VK_CAPITAL: u32 = 0x14;
pub const VK_A: u32 = 0x41;
pub const VK_D: u32 = 0x44;
pub const VK_E: u32 = 0x45;
pub const VK_F: u32 = 0x46;
pub const VK_Q: u32 = 0x51;
pub const VK_R: u32 = 0x52;
pub const VK_S: u32 = 0x53;
pub const VK_W: u32 = 0x57;
pub const VK_X: u32 = 0x58;
pub const VK_Z: u32 = 0x5A;
pub const VK_LSHIFT: u32 = 0xA0;
pub const VK_LCONTROL: u32 = 0xA2;

pub fn translate(vk: u32) -> LogicalKey {
    match vk {
        VK_CAPITAL => LogicalKey::Toggle,
        VK_W => LogicalKey::MoveUp,
        VK_S => LogicalKey::MoveDown,
        VK_A => LogicalKey::MoveLeft,
        VK_D => LogicalKey::MoveRight,
        VK_Q => LogicalKey::DiagUpLeft,
        VK_E => LogicalKey::DiagUpRight,
        VK_Z => LogicalKey::DiagDownLeft,
        VK_X => LogicalKey::DiagDownRight,
        VK_SPACE => LogicalKey::LeftClick,
        VK_LCONTROL => LogicalKey::RightClick,
        VK_LSHIFT => LogicalKey::MiddleClick,
        VK_R => LogicalKey::ScrollUp,
        VK_F => LogicalKey::ScrollDown,
        _ => LogicalKey::Unknown,
    }
}

/// Reverse lookup, used to print the binding table.
pub fn raw_code(key: LogicalKey) -> Option<u32> {
    (0..=0xFEu32).find(|vk| key.is_known() && translate(*vk) == key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_matches_default_bindings() {
        assert_eq!(translate(0x14), LogicalKey::Toggle);
        assert_eq!(translate(0x57), LogicalKey::MoveUp);
        assert_eq!(translate(0x5A), LogicalKey::DiagDownLeft);
        assert_eq!(translate(0x20), LogicalKey::LeftClick);
        assert_eq!(translate(0xA2), LogicalKey::RightClick);
        assert_eq!(translate(0xA0), LogicalKey::MiddleClick);
        assert_eq!(translate(0x46), LogicalKey::ScrollDown);
    }

    #[test]
    fn test_generic_and_right_modifiers_are_unbound() {
        assert_eq!(translate(0x10), LogicalKey::Unknown); // VK_SHIFT
        assert_eq!(translate(0x11), LogicalKey::Unknown); // VK_CONTROL
        assert_eq!(translate(0xA1), LogicalKey::Unknown); // VK_RSHIFT
        assert_eq!(translate(0xA3), LogicalKey::Unknown); // VK_RCONTROL
    }

    #[test]
    fn test_every_logical_key_has_a_code() {
        for key in LogicalKey::ALL {
            assert_eq!(translate(raw_code(key).unwrap()), key);
        }
    }
}
