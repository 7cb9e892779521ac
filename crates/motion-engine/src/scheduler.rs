//! Fixed-rate motion tick loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use mousekeys_common::clock::{MonotonicClock, SystemClock, TickPacer};
use mousekeys_common::error::{MouseKeysError, MouseKeysResult};
use mousekeys_platform_core::clamp_to_screen;

use crate::motion::MotionController;

/// Turns controller displacement into absolute pointer moves.
///
/// Fractional displacement is carried between ticks so slow movement still
/// advances the pointer. The carry is dropped whenever the controller
/// reports zero displacement.
pub struct TickScheduler {
    controller: Arc<MotionController>,
    clock: Arc<dyn MonotonicClock>,
    remainder: (f64, f64),
    ticks: u64,
}

impl TickScheduler {
    pub fn new(controller: Arc<MotionController>) -> Self {
        Self::with_clock(controller, Arc::new(SystemClock))
    }

    pub fn with_clock(controller: Arc<MotionController>, clock: Arc<dyn MonotonicClock>) -> Self {
        Self {
            controller,
            clock,
            remainder: (0.0, 0.0),
            ticks: 0,
        }
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Run one tick at the clock's current instant. Returns the target the
    /// pointer was moved to, if it moved.
    pub fn tick(&mut self) -> Option<(i32, i32)> {
        self.ticks += 1;
        let now = self.clock.now();
        let (dx, dy) = self.controller.compute_displacement(now);
        if dx == 0.0 && dy == 0.0 {
            self.remainder = (0.0, 0.0);
            return None;
        }

        let total_x = dx + self.remainder.0;
        let total_y = dy + self.remainder.1;
        let step_x = total_x.round();
        let step_y = total_y.round();
        self.remainder = (total_x - step_x, total_y - step_y);
        if step_x == 0.0 && step_y == 0.0 {
            return None;
        }

        let actuator = self.controller.actuator();
        let position = match actuator.cursor_position() {
            Ok(position) => position,
            Err(e) => {
                tracing::warn!(error = %e, "Could not read cursor position");
                return None;
            }
        };
        let screen = match actuator.screen_size() {
            Ok(screen) => screen,
            Err(e) => {
                tracing::warn!(error = %e, "Could not read screen size");
                return None;
            }
        };

        let target = clamp_to_screen(
            position.0 as i64 + step_x as i64,
            position.1 as i64 + step_y as i64,
            screen,
        );
        if target == position {
            return None;
        }
        if let Err(e) = actuator.move_to(target.0, target.1) {
            tracing::warn!(x = target.0, y = target.1, error = %e, "Pointer move failed");
            return None;
        }
        tracing::trace!(x = target.0, y = target.1, dx, dy, "Pointer moved");
        Some(target)
    }

    /// Run the loop on its own thread at the profile's tick interval.
    pub fn spawn(mut self) -> MouseKeysResult<SchedulerHandle> {
        let running = Arc::new(AtomicBool::new(true));
        let flag = running.clone();
        let interval = self.controller.profile().tick_interval;

        let handle = std::thread::Builder::new()
            .name("mousekeys-tick".into())
            .spawn(move || {
                tracing::debug!(interval_ms = interval.as_millis() as u64, "Tick loop started");
                let mut pacer = TickPacer::new(interval);
                while flag.load(Ordering::SeqCst) {
                    pacer.wait();
                    if !flag.load(Ordering::SeqCst) {
                        break;
                    }
                    self.tick();
                }
                tracing::debug!(ticks = self.ticks, "Tick loop stopped");
                self.ticks
            })?;

        Ok(SchedulerHandle {
            running,
            handle: Some(handle),
        })
    }
}

/// Owner of a running tick loop.
pub struct SchedulerHandle {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<u64>>,
}

impl SchedulerHandle {
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stop the loop and return the number of ticks it ran.
    pub fn stop(mut self) -> MouseKeysResult<u64> {
        self.running.store(false, Ordering::SeqCst);
        match self.handle.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| MouseKeysError::platform("tick thread panicked")),
            None => Ok(0),
        }
    }
}

impl Drop for SchedulerHandle {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::MotionProfile;
    use mousekeys_common::clock::ManualClock;
    use mousekeys_key_model::LogicalKey;
    use mousekeys_platform_core::{ActuatorCall, RecordingActuator};
    use std::time::Duration;

    fn setup(
        profile: MotionProfile,
        position: (i32, i32),
    ) -> (TickScheduler, Arc<MotionController>, Arc<RecordingActuator>, ManualClock) {
        let actuator = Arc::new(RecordingActuator::new((1920, 1080), position));
        let controller = Arc::new(MotionController::new(profile, actuator.clone()));
        let clock = ManualClock::new();
        let scheduler = TickScheduler::with_clock(controller.clone(), Arc::new(clock.clone()));
        (scheduler, controller, actuator, clock)
    }

    #[test]
    fn test_idle_tick_makes_no_calls() {
        let (mut scheduler, controller, actuator, _) = setup(MotionProfile::default(), (10, 10));
        assert_eq!(scheduler.tick(), None);
        controller.toggle();
        assert_eq!(scheduler.tick(), None);
        assert!(actuator.calls().is_empty());
        assert_eq!(scheduler.ticks(), 2);
    }

    #[test]
    fn test_fractional_speed_accumulates() {
        let profile = MotionProfile {
            base_speed: 0.4,
            max_speed: 0.4,
            ..MotionProfile::default()
        };
        let (mut scheduler, controller, actuator, clock) = setup(profile, (100, 100));
        controller.toggle();
        controller.on_key_down(LogicalKey::MoveRight);

        let mut moved = 0;
        for _ in 0..5 {
            if scheduler.tick().is_some() {
                moved += 1;
            }
            clock.advance(Duration::from_millis(16));
        }
        // 0.4 px/tick over 5 ticks is 2 px, delivered in whole steps.
        assert_eq!(moved, 2);
        assert_eq!(actuator.position(), (102, 100));
    }

    #[test]
    fn test_moves_clamp_to_screen_edge() {
        let (mut scheduler, controller, actuator, clock) = setup(MotionProfile::default(), (0, 5));
        controller.toggle();
        controller.on_key_down(LogicalKey::MoveLeft);
        assert_eq!(scheduler.tick(), None);

        controller.on_key_up(LogicalKey::MoveLeft);
        controller.on_key_down(LogicalKey::MoveUp);
        clock.advance(Duration::from_millis(300));
        scheduler.tick();
        clock.advance(Duration::from_millis(300));
        assert_eq!(scheduler.tick(), Some((0, 0)));
        assert_eq!(actuator.calls().last(), Some(&ActuatorCall::MoveTo(0, 0)));
    }

    #[test]
    fn test_actuator_failure_keeps_ticking() {
        let actuator = Arc::new(RecordingActuator::failing());
        let controller = Arc::new(MotionController::new(MotionProfile::default(), actuator));
        let mut scheduler = TickScheduler::with_clock(controller.clone(), Arc::new(ManualClock::new()));
        controller.toggle();
        controller.on_key_down(LogicalKey::MoveDown);
        assert_eq!(scheduler.tick(), None);
        assert_eq!(scheduler.tick(), None);
        assert_eq!(scheduler.ticks(), 2);
    }

    #[test]
    fn test_spawned_loop_stops() {
        let (scheduler, _, _, _) = setup(MotionProfile::default(), (0, 0));
        let handle = scheduler.spawn().unwrap();
        assert!(handle.is_running());
        std::thread::sleep(Duration::from_millis(40));
        let ticks = handle.stop().unwrap();
        assert!(ticks >= 1);
    }
}
