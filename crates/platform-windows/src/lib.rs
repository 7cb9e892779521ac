//! MouseKeys Windows Platform Integration
//!
//! - **Keymap:** virtual-key codes to logical keys
//! - **Registry:** hook thread id to hook context, for the free hook procedure
//! - **Hook:** `WH_KEYBOARD_LL` hook on a dedicated message-loop thread
//!
//! Only the hook itself is Windows-only.

pub mod keymap;
pub mod registry;

#[cfg(windows)]
pub mod hook;
#[cfg(windows)]
pub mod permissions;

#[cfg(windows)]
pub use hook::LowLevelHookCapture;
pub use keymap::translate;
#[cfg(windows)]
pub use permissions::check_capabilities;
pub use registry::{registry, HookContext, HookRegistry};
