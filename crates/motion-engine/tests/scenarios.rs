//! End-to-end motion scenarios driven by a manual clock.

use std::sync::Arc;
use std::time::Duration;

use mousekeys_common::clock::{ManualClock, MonotonicClock};
use mousekeys_common::logging::init_default_logging;
use mousekeys_key_model::{KeyEvent, LogicalKey};
use mousekeys_motion_engine::{
    DispatchOutcome, Dispatcher, MotionController, MotionPhase, MotionProfile, TickScheduler,
    ToggleDebouncer,
};
use mousekeys_platform_core::{ActuatorCall, MouseButton, RecordingActuator};

const TICK: Duration = Duration::from_millis(16);

struct Rig {
    clock: ManualClock,
    actuator: Arc<RecordingActuator>,
    controller: Arc<MotionController>,
    dispatcher: Dispatcher,
}

impl Rig {
    fn new() -> Self {
        init_default_logging();
        let clock = ManualClock::new();
        let actuator = Arc::new(RecordingActuator::default());
        let controller = Arc::new(MotionController::new(
            MotionProfile::default(),
            actuator.clone(),
        ));
        let dispatcher = Dispatcher::with_clock(
            controller.clone(),
            ToggleDebouncer::default(),
            Arc::new(clock.clone()),
        );
        Self {
            clock,
            actuator,
            controller,
            dispatcher,
        }
    }

    fn press(&mut self, key: LogicalKey) -> DispatchOutcome {
        self.dispatcher.dispatch(&KeyEvent::press(key, 0))
    }

    fn release(&mut self, key: LogicalKey) -> DispatchOutcome {
        self.dispatcher.dispatch(&KeyEvent::release(key, 0))
    }

    fn tick(&self) -> (f64, f64) {
        let displacement = self.controller.compute_displacement(self.clock.now());
        self.clock.advance(TICK);
        displacement
    }
}

#[test]
fn move_right_ramps_to_max_and_glides_to_a_stop() {
    let mut rig = Rig::new();
    assert_eq!(rig.press(LogicalKey::Toggle), DispatchOutcome::Toggled { active: true });
    assert_eq!(rig.press(LogicalKey::MoveRight), DispatchOutcome::Handled);

    let (dx, dy) = rig.tick();
    assert_eq!((dx, dy), (1.0, 0.0));

    // Hold for the rest of the 300 ms ramp.
    let mut last = dx;
    while rig.clock.now() - rig.controller.snapshot().move_start.unwrap() < Duration::from_millis(300) {
        let (dx, dy) = rig.tick();
        assert_eq!(dy, 0.0);
        assert!(dx >= last);
        last = dx;
    }
    let (dx, _) = rig.tick();
    assert_eq!(dx, 30.0);

    rig.release(LogicalKey::MoveRight);
    let limit = rig.controller.profile().max_decel_ticks();
    let mut previous = dx;
    let mut ticks = 0;
    loop {
        let (dx, dy) = rig.tick();
        ticks += 1;
        assert_eq!(dy, 0.0);
        assert!(dx < previous, "tick {ticks}: {dx} !< {previous}");
        if dx == 0.0 {
            break;
        }
        assert!(ticks < limit, "still gliding after {ticks} ticks");
        previous = dx;
    }
    assert!(ticks <= limit);
    assert_eq!(rig.controller.phase(), MotionPhase::Idle);
}

#[test]
fn diagonal_key_moves_both_axes_equally() {
    let mut rig = Rig::new();
    rig.press(LogicalKey::Toggle);
    rig.press(LogicalKey::DiagUpLeft);

    let (dx, dy) = rig.tick();
    assert!(dx < 0.0 && dy < 0.0);
    assert!((dx.abs() - dy.abs()).abs() < 1e-9);
    assert!((dx.hypot(dy) - 1.0).abs() < 1e-9);
}

#[test]
fn double_toggle_within_debounce_counts_once() {
    let mut rig = Rig::new();
    assert_eq!(rig.press(LogicalKey::Toggle), DispatchOutcome::Toggled { active: true });
    rig.clock.advance(Duration::from_millis(120));
    assert_eq!(rig.press(LogicalKey::Toggle), DispatchOutcome::Debounced);
    assert!(rig.controller.is_active());

    let stats = rig.dispatcher.stats();
    assert_eq!(stats.toggles_accepted, 1);
    assert_eq!(stats.toggles_debounced, 1);
}

#[test]
fn toggling_off_mid_drag_releases_the_button() {
    let mut rig = Rig::new();
    rig.press(LogicalKey::Toggle);
    rig.press(LogicalKey::LeftClick);
    rig.press(LogicalKey::MoveDown);
    rig.tick();

    rig.clock.advance(Duration::from_millis(400));
    assert_eq!(rig.press(LogicalKey::Toggle), DispatchOutcome::Toggled { active: false });
    assert_eq!(
        rig.actuator.calls(),
        vec![
            ActuatorCall::ButtonDown(MouseButton::Left),
            ActuatorCall::ButtonUp(MouseButton::Left),
        ]
    );

    // Keys released after deactivation belong to other applications again.
    assert_eq!(rig.release(LogicalKey::LeftClick), DispatchOutcome::Ignored);
    assert_eq!(rig.tick(), (0.0, 0.0));
}

#[test]
fn scheduler_moves_the_pointer_by_rounded_steps() {
    let rig = Rig::new();
    let mut scheduler = TickScheduler::with_clock(rig.controller.clone(), Arc::new(rig.clock.clone()));
    rig.controller.toggle();
    rig.controller.on_key_down(LogicalKey::MoveUp);

    assert_eq!(scheduler.tick(), Some((960, 539)));
    rig.clock.advance(Duration::from_millis(300));
    assert_eq!(scheduler.tick(), Some((960, 509)));

    rig.controller.on_key_up(LogicalKey::MoveUp);
    let glide: Vec<_> = (0..rig.controller.profile().max_decel_ticks())
        .filter_map(|_| scheduler.tick())
        .collect();
    assert!(!glide.is_empty());
    assert!(glide.windows(2).all(|w| w[1].1 < w[0].1 && w[1].0 == 960));
    assert_eq!(scheduler.tick(), None);
    assert_eq!(rig.controller.phase(), MotionPhase::Idle);
}
