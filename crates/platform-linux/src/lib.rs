//! MouseKeys Linux Platform Integration
//!
//! Platform-specific implementations for Linux:
//! - **Keymap:** evdev key codes to logical keys
//! - **Discovery:** locating the physical keyboard under `/dev/input`
//! - **Capture:** exclusive evdev grab with a uinput passthrough keyboard
//! - **Permissions:** capability detection and user guidance

pub mod discovery;
pub mod filter;
pub mod keymap;
pub mod permissions;

#[cfg(target_os = "linux")]
pub mod capture;

#[cfg(target_os = "linux")]
pub use capture::EvdevCapture;
pub use keymap::translate;
pub use permissions::check_capabilities;
