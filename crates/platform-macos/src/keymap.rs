//! macOS virtual key code table (`kVK_*`, ANSI layout).

use mousekeys_key_model::LogicalKey;

pub const KVK_A: i64 = 0;
pub const KVK_S: i64 = 1;
pub const KVK_D: i64 = 2;
pub const KVK_F: i64 = 3;
pub const KVK_Z: i64 = 6;
pub const KVK_X: i64 = 7;
pub const KVK_Q: i64 = 12;
pub const KVK_W: i64 = 13;
pub const KVK_E: i64 = 14;
pub const KVK_R: i64 = 15;
pub const KVK_SPACE: i64 = 49;
pub const KVK_SHIFT: i64 = 56;
pub const KVK_CAPS_LOCK: i64 = 57;
pub const KVK_CONTROL: i64 = 59;

pub fn translate(keycode: i64) -> LogicalKey {
    match keycode {
        KVK_CAPS_LOCK => LogicalKey::Toggle,
        KVK_W => LogicalKey::MoveUp,
        KVK_S => LogicalKey::MoveDown,
        KVK_A => LogicalKey::MoveLeft,
        KVK_D => LogicalKey::MoveRight,
        KVK_Q => LogicalKey::DiagUpLeft,
        KVK_E => LogicalKey::DiagUpRight,
        KVK_Z => LogicalKey::DiagDownLeft,
        KVK_X => LogicalKey::DiagDownRight,
        KVK_SPACE => LogicalKey::LeftClick,
        KVK_CONTROL => LogicalKey::RightClick,
        KVK_SHIFT => LogicalKey::MiddleClick,
        KVK_R => LogicalKey::ScrollUp,
        KVK_F => LogicalKey::ScrollDown,
        _ => LogicalKey::Unknown,
    }
}

/// Reverse lookup, used to print the binding table.
pub fn raw_code(key: LogicalKey) -> Option<i64> {
    (0..128i64).find(|code| key.is_known() && translate(*code) == key)
}
