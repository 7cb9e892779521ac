//! MouseKeys Motion Engine
//!
//! Turns the unified key event stream into pointer motion:
//! - **Debounce:** filters duplicate toggle reports
//! - **Motion:** the state machine behind every key and every tick
//! - **Profile:** acceleration curves and deceleration policies
//! - **Scheduler:** fixed-rate tick loop that drives the actuator
//! - **Dispatcher:** routes queued key events into the state machine
//! - **Service:** wires capture, dispatcher and scheduler together
//!
//! Timing is passed in as explicit [`std::time::Instant`]s so every
//! computation can be driven deterministically from tests.

pub mod debounce;
pub mod dispatcher;
pub mod motion;
pub mod profile;
pub mod scheduler;
pub mod service;

pub use debounce::ToggleDebouncer;
pub use dispatcher::{DispatchOutcome, DispatchStats, Dispatcher};
pub use motion::{MotionController, MotionPhase, MotionState};
pub use profile::MotionProfile;
pub use scheduler::{SchedulerHandle, TickScheduler};
pub use service::{MouseKeysService, ServiceReport};
