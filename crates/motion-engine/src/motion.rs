//! Motion state machine.
//!
//! One [`MotionController`] exists per process. Key handlers mutate it from
//! the dispatcher thread while the tick loop polls it for displacement.
//!
//! Locking: `state` is held only while reading or updating [`MotionState`].
//! Key mutators additionally hold `gate` for their whole duration, including
//! the actuator call that follows the state update. That keeps a deactivating
//! toggle's button release ordered before the next key-down's actions. The
//! tick loop only takes `state`.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use serde::Serialize;

use mousekeys_common::config::{DirectionChangePolicy, ReleasePolicy};
use mousekeys_key_model::{DirectionSet, LogicalKey};
use mousekeys_platform_core::{Actuator, ActuatorCall, MouseButton};

use crate::profile::MotionProfile;

/// Input components smaller than this are treated as zero.
const AXIS_EPSILON: f64 = 1e-9;

/// Everything the controller knows about the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotionState {
    pub active: bool,
    pub pressed: DirectionSet,
    pub left_button_held: bool,
    /// Last displacement returned by a tick, in pixels per tick.
    pub velocity: (f64, f64),
    /// Sign-only travel direction of the last moving tick.
    pub last_direction: (i8, i8),
    /// Start of the current acceleration ramp.
    pub move_start: Option<Instant>,
}

impl MotionState {
    pub fn phase(&self) -> MotionPhase {
        if !self.active {
            MotionPhase::Inactive
        } else if input_direction(self.pressed).is_some() {
            MotionPhase::Moving
        } else if self.velocity != (0.0, 0.0) {
            MotionPhase::Decelerating
        } else {
            MotionPhase::Idle
        }
    }

    fn clear(&mut self) {
        *self = MotionState::default();
    }
}

/// Coarse controller state, for observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionPhase {
    Inactive,
    Idle,
    Moving,
    Decelerating,
}

pub struct MotionController {
    profile: MotionProfile,
    actuator: Arc<dyn Actuator>,
    state: Mutex<MotionState>,
    gate: Mutex<()>,
}

impl MotionController {
    /// Create an inactive controller.
    pub fn new(profile: MotionProfile, actuator: Arc<dyn Actuator>) -> Self {
        Self {
            profile,
            actuator,
            state: Mutex::new(MotionState::default()),
            gate: Mutex::new(()),
        }
    }

    pub fn profile(&self) -> &MotionProfile {
        &self.profile
    }

    pub fn actuator(&self) -> &Arc<dyn Actuator> {
        &self.actuator
    }

    /// Flip between active and inactive. Returns the new active flag.
    ///
    /// Deactivating clears held directions, velocity and ramp timing, and
    /// releases the left button if it is held.
    pub fn toggle(&self) -> bool {
        let _gate = self.gate.lock();
        let (active, release) = {
            let mut state = self.state.lock();
            if state.active {
                let held = state.left_button_held;
                state.clear();
                (false, held)
            } else {
                state.active = true;
                (true, false)
            }
        };
        if release {
            self.perform(ActuatorCall::ButtonUp(MouseButton::Left));
        }
        tracing::debug!(active, "Motion controller toggled");
        active
    }

    /// Force the inactive state. Does nothing if already inactive.
    pub fn deactivate(&self) {
        let _gate = self.gate.lock();
        let release = {
            let mut state = self.state.lock();
            if !state.active {
                return;
            }
            let held = state.left_button_held;
            state.clear();
            held
        };
        if release {
            self.perform(ActuatorCall::ButtonUp(MouseButton::Left));
        }
        tracing::debug!("Motion controller deactivated");
    }

    pub fn is_active(&self) -> bool {
        self.state.lock().active
    }

    /// Handle a key press. Returns whether the key was consumed.
    pub fn on_key_down(&self, key: LogicalKey) -> bool {
        let _gate = self.gate.lock();
        let action = {
            let mut state = self.state.lock();
            if !state.active {
                return false;
            }
            if let Some(direction) = key.direction() {
                state.pressed.insert(direction);
                return true;
            }
            let amount = self.profile.scroll_amount;
            match key {
                LogicalKey::LeftClick => {
                    if state.left_button_held {
                        None
                    } else {
                        state.left_button_held = true;
                        Some(ActuatorCall::ButtonDown(MouseButton::Left))
                    }
                }
                LogicalKey::RightClick => Some(ActuatorCall::Click(MouseButton::Right)),
                LogicalKey::MiddleClick => Some(ActuatorCall::Click(MouseButton::Middle)),
                LogicalKey::ScrollUp => Some(ActuatorCall::Scroll(0, amount)),
                LogicalKey::ScrollDown => Some(ActuatorCall::Scroll(0, -amount)),
                _ => return false,
            }
        };
        if let Some(call) = action {
            self.perform(call);
        }
        true
    }

    /// Handle a key release. Returns whether the key was consumed.
    pub fn on_key_up(&self, key: LogicalKey) -> bool {
        let _gate = self.gate.lock();
        let action = {
            let mut state = self.state.lock();
            if !state.active {
                return false;
            }
            if let Some(direction) = key.direction() {
                state.pressed.remove(direction);
                return true;
            }
            match key {
                LogicalKey::LeftClick => {
                    if state.left_button_held {
                        state.left_button_held = false;
                        Some(ActuatorCall::ButtonUp(MouseButton::Left))
                    } else {
                        None
                    }
                }
                k if k.is_one_shot() => None,
                _ => return false,
            }
        };
        if let Some(call) = action {
            self.perform(call);
        }
        true
    }

    /// Advance one tick and return the displacement to apply, in pixels.
    pub fn compute_displacement(&self, now: Instant) -> (f64, f64) {
        let mut state = self.state.lock();
        if !state.active {
            return (0.0, 0.0);
        }

        let Some((unit, direction)) = input_direction(state.pressed) else {
            state.last_direction = (0, 0);
            state.move_start = None;
            state.velocity = self.decay(state.velocity);
            return state.velocity;
        };

        let start = match state.move_start {
            None => now,
            Some(start) if direction != state.last_direction => match self.profile.direction_change {
                DirectionChangePolicy::Restart => now,
                DirectionChangePolicy::HalveElapsed => {
                    let elapsed = now.saturating_duration_since(start);
                    start + (elapsed - elapsed / 2)
                }
            },
            Some(start) => start,
        };
        state.move_start = Some(start);
        state.last_direction = direction;

        let speed = self.profile.speed_at(now.saturating_duration_since(start));
        state.velocity = (unit.0 * speed, unit.1 * speed);
        state.velocity
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> MotionState {
        *self.state.lock()
    }

    pub fn phase(&self) -> MotionPhase {
        self.state.lock().phase()
    }

    fn decay(&self, velocity: (f64, f64)) -> (f64, f64) {
        match self.profile.release {
            ReleasePolicy::HardStop => (0.0, 0.0),
            ReleasePolicy::Friction => {
                let next = (velocity.0 * self.profile.friction, velocity.1 * self.profile.friction);
                if next.0.hypot(next.1) < self.profile.stop_threshold {
                    (0.0, 0.0)
                } else {
                    next
                }
            }
        }
    }

    fn perform(&self, call: ActuatorCall) {
        let result = match call {
            ActuatorCall::MoveTo(x, y) => self.actuator.move_to(x, y),
            ActuatorCall::ButtonDown(button) => self.actuator.button_down(button),
            ActuatorCall::ButtonUp(button) => self.actuator.button_up(button),
            ActuatorCall::Click(button) => self.actuator.click(button),
            ActuatorCall::Scroll(dx, dy) => self.actuator.scroll(dx, dy),
        };
        if let Err(e) = result {
            tracing::warn!(?call, actuator = self.actuator.name(), error = %e, "Pointer action failed");
        }
    }
}

impl std::fmt::Debug for MotionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MotionController")
            .field("profile", &self.profile)
            .field("actuator", &self.actuator.name())
            .field("state", &*self.state.lock())
            .finish()
    }
}

/// Unit travel vector and its sign-only direction, or `None` when the held
/// keys cancel out.
fn input_direction(pressed: DirectionSet) -> Option<((f64, f64), (i8, i8))> {
    let (x, y) = pressed.input_vector();
    let magnitude = x.hypot(y);
    if magnitude < AXIS_EPSILON {
        return None;
    }
    Some(((x / magnitude, y / magnitude), (sign(x), sign(y))))
}

fn sign(v: f64) -> i8 {
    if v > AXIS_EPSILON {
        1
    } else if v < -AXIS_EPSILON {
        -1
    } else {
        0
    }
}
