//! MouseKeys macOS Platform Integration
//!
//! - **Keymap:** virtual key codes to logical keys
//! - **Modifiers:** Press/Release decomposition of `FlagsChanged` events
//! - **Event tap:** session-level Quartz event tap on its own run loop
//!
//! The tap itself only builds on macOS; the translation logic is plain Rust
//! and is tested on every platform.

pub mod filter;
pub mod keymap;
pub mod modifiers;

#[cfg(target_os = "macos")]
pub mod permissions;
#[cfg(target_os = "macos")]
pub mod tap;

pub use keymap::translate;
#[cfg(target_os = "macos")]
pub use permissions::check_capabilities;
#[cfg(target_os = "macos")]
pub use tap::EventTapCapture;
