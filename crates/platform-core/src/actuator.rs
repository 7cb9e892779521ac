//! Pointer actuator contract.
//!
//! The actuator is the only thing that touches the real pointer. The motion
//! engine calls it, never the other way round, and it never retries a failed
//! call: failures are reported to the caller and logged there.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use mousekeys_common::error::{MouseKeysError, MouseKeysResult};

/// Mouse buttons MouseKeys can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Low-level pointer primitives.
///
/// Coordinates are absolute device pixels with the origin at the top-left of
/// the main display. Scroll deltas are wheel units; positive `dy` scrolls up.
pub trait Actuator: Send + Sync {
    fn move_to(&self, x: i32, y: i32) -> MouseKeysResult<()>;

    fn button_down(&self, button: MouseButton) -> MouseKeysResult<()>;

    fn button_up(&self, button: MouseButton) -> MouseKeysResult<()>;

    fn click(&self, button: MouseButton) -> MouseKeysResult<()>;

    fn scroll(&self, dx: i32, dy: i32) -> MouseKeysResult<()>;

    fn cursor_position(&self) -> MouseKeysResult<(i32, i32)>;

    fn screen_size(&self) -> MouseKeysResult<(u32, u32)>;

    /// Backend name for logging.
    fn name(&self) -> &str;
}

/// Clamp a target position to `[0, width-1] x [0, height-1]`.
pub fn clamp_to_screen(x: i64, y: i64, (width, height): (u32, u32)) -> (i32, i32) {
    let max_x = width.max(1) as i64 - 1;
    let max_y = height.max(1) as i64 - 1;
    (x.clamp(0, max_x) as i32, y.clamp(0, max_y) as i32)
}

/// A call observed by [`RecordingActuator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorCall {
    MoveTo(i32, i32),
    ButtonDown(MouseButton),
    ButtonUp(MouseButton),
    Click(MouseButton),
    Scroll(i32, i32),
}

#[derive(Debug)]
struct PointerModel {
    position: (i32, i32),
    screen: (u32, u32),
    calls: Vec<ActuatorCall>,
}

/// In-memory actuator that records every action and keeps a simulated
/// cursor position. Used by tests and the `simulate` command.
#[derive(Debug)]
pub struct RecordingActuator {
    model: Mutex<PointerModel>,
    fail: bool,
}

impl RecordingActuator {
    pub fn new(screen: (u32, u32), position: (i32, i32)) -> Self {
        Self {
            model: Mutex::new(PointerModel {
                position,
                screen,
                calls: Vec::new(),
            }),
            fail: false,
        }
    }

    /// An actuator whose every call fails, for exercising error paths.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new((1920, 1080), (0, 0))
        }
    }

    /// Snapshot of all recorded calls in order.
    pub fn calls(&self) -> Vec<ActuatorCall> {
        self.model.lock().calls.clone()
    }

    /// Drain the recorded calls.
    pub fn take_calls(&self) -> Vec<ActuatorCall> {
        std::mem::take(&mut self.model.lock().calls)
    }

    pub fn position(&self) -> (i32, i32) {
        self.model.lock().position
    }

    fn record(&self, call: ActuatorCall) -> MouseKeysResult<()> {
        if self.fail {
            return Err(MouseKeysError::actuator(format!(
                "recording actuator rejected {call:?}"
            )));
        }
        let mut model = self.model.lock();
        if let ActuatorCall::MoveTo(x, y) = call {
            model.position = (x, y);
        }
        model.calls.push(call);
        Ok(())
    }
}

impl Default for RecordingActuator {
    fn default() -> Self {
        Self::new((1920, 1080), (960, 540))
    }
}

impl Actuator for RecordingActuator {
    fn move_to(&self, x: i32, y: i32) -> MouseKeysResult<()> {
        self.record(ActuatorCall::MoveTo(x, y))
    }

    fn button_down(&self, button: MouseButton) -> MouseKeysResult<()> {
        self.record(ActuatorCall::ButtonDown(button))
    }

    fn button_up(&self, button: MouseButton) -> MouseKeysResult<()> {
        self.record(ActuatorCall::ButtonUp(button))
    }

    fn click(&self, button: MouseButton) -> MouseKeysResult<()> {
        self.record(ActuatorCall::Click(button))
    }

    fn scroll(&self, dx: i32, dy: i32) -> MouseKeysResult<()> {
        self.record(ActuatorCall::Scroll(dx, dy))
    }

    fn cursor_position(&self) -> MouseKeysResult<(i32, i32)> {
        if self.fail {
            return Err(MouseKeysError::actuator("cursor position unavailable"));
        }
        Ok(self.model.lock().position)
    }

    fn screen_size(&self) -> MouseKeysResult<(u32, u32)> {
        if self.fail {
            return Err(MouseKeysError::actuator("screen size unavailable"));
        }
        Ok(self.model.lock().screen)
    }

    fn name(&self) -> &str {
        "recording"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_keeps_targets_on_screen() {
        assert_eq!(clamp_to_screen(-5, 20, (1920, 1080)), (0, 20));
        assert_eq!(clamp_to_screen(5000, 5000, (1920, 1080)), (1919, 1079));
        assert_eq!(clamp_to_screen(100, 200, (1920, 1080)), (100, 200));
    }

    #[test]
    fn clamp_handles_degenerate_screen() {
        assert_eq!(clamp_to_screen(10, 10, (0, 0)), (0, 0));
    }

    #[test]
    fn recording_actuator_tracks_moves() {
        let actuator = RecordingActuator::default();
        actuator.move_to(10, 20).unwrap();
        actuator.click(MouseButton::Right).unwrap();
        assert_eq!(actuator.position(), (10, 20));
        assert_eq!(
            actuator.take_calls(),
            vec![
                ActuatorCall::MoveTo(10, 20),
                ActuatorCall::Click(MouseButton::Right)
            ]
        );
        assert!(actuator.calls().is_empty());
    }

    #[test]
    fn failing_actuator_reports_actuator_errors() {
        let actuator = RecordingActuator::failing();
        assert!(matches!(
            actuator.button_down(MouseButton::Left),
            Err(MouseKeysError::Actuator { .. })
        ));
        assert!(actuator.cursor_position().is_err());
    }
}
