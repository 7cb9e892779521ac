//! MouseKeys pointer actuator.
//!
//! [`EnigoActuator`] drives the real pointer through `enigo`. The enigo
//! handle is not `Send` on every platform, so it lives on a dedicated worker
//! thread and the actuator talks to it over a channel.

pub mod enigo_worker;

pub use enigo_worker::EnigoActuator;
