//! MouseKeys Unified Key Model
//!
//! The platform-independent vocabulary shared by every capture adapter and
//! the motion engine:
//!
//! - **LogicalKey:** the closed set of keys MouseKeys reacts to
//! - **Direction:** the eight movement keys and their input vectors
//! - **KeyEvent:** one normalized capture event
//! - **Bindings:** the fixed physical key assigned to each logical key

pub mod binding;
pub mod event;
pub mod key;

pub use binding::{binding_for, Binding, BINDINGS};
pub use event::{KeyEvent, KeyEventKind};
pub use key::{Direction, DirectionSet, LogicalKey};
