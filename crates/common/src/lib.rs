//! MouseKeys Common Utilities
//!
//! Shared infrastructure for all MouseKeys crates:
//! - Error types and result aliases
//! - Monotonic clock abstraction and tick pacing
//! - Tracing/logging initialization
//! - Configuration loading and validation

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
