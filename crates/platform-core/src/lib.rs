//! MouseKeys platform core contracts.
//!
//! This crate contains the cross-platform seams between the motion engine and
//! the operating system, without coupling to a concrete OS backend:
//!
//! - **Actuator:** moves the pointer and injects button/scroll actions
//! - **KeyboardCapture:** turns a platform key hook into a unified event stream
//! - **Event queue:** bounded hand-off from capture threads to the dispatcher
//! - **Scripted capture / recording actuator:** in-process doubles for tests
//!   and simulations

pub mod actuator;
pub mod capability;
pub mod capture;
pub mod queue;
pub mod scripted;

pub use actuator::{clamp_to_screen, Actuator, ActuatorCall, MouseButton, RecordingActuator};
pub use capability::{print_capability_report, Capability};
pub use capture::{forwards, suppresses, ActivityProbe, CaptureContext, KeyboardCapture};
pub use queue::{event_queue, EventSink, EventSource};
pub use scripted::{ScriptStep, ScriptedCapture};
