//! Threaded tests: concurrent mutation and the full service lifecycle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use mousekeys_common::config::ToggleSettings;
use mousekeys_key_model::{KeyEvent, LogicalKey};
use mousekeys_motion_engine::{MotionController, MotionPhase, MotionProfile, MouseKeysService};
use mousekeys_platform_core::{
    ActuatorCall, CaptureContext, MouseButton, RecordingActuator, ScriptStep, ScriptedCapture,
};

/// xorshift, so every worker gets a different but reproducible schedule.
fn next(seed: &mut u64) -> u64 {
    *seed ^= *seed << 13;
    *seed ^= *seed >> 7;
    *seed ^= *seed << 17;
    *seed
}

#[test]
fn concurrent_fuzz_never_deadlocks_or_leaks_held_keys() {
    let controller = Arc::new(MotionController::new(
        MotionProfile::default(),
        Arc::new(RecordingActuator::default()),
    ));
    let stop = Arc::new(AtomicBool::new(false));
    let (done_tx, done_rx) = mpsc::channel();

    let workers: Vec<_> = (0..6u64)
        .map(|worker| {
            let mc = controller.clone();
            let done = done_tx.clone();
            std::thread::spawn(move || {
                let mut seed = 0x9E37_79B9_7F4A_7C15 ^ (worker + 1);
                for _ in 0..5_000 {
                    let roll = next(&mut seed);
                    let key = LogicalKey::ALL[(roll % LogicalKey::ALL.len() as u64) as usize];
                    match (roll >> 8) % 5 {
                        0 => {
                            mc.toggle();
                        }
                        1 | 2 => {
                            mc.on_key_down(key);
                        }
                        3 => {
                            mc.on_key_up(key);
                        }
                        _ => {
                            mc.compute_displacement(Instant::now());
                        }
                    }
                }
                let _ = done.send(());
            })
        })
        .collect();
    drop(done_tx);

    let observer = {
        let mc = controller.clone();
        let stop = stop.clone();
        std::thread::spawn(move || {
            let mut violations = 0;
            while !stop.load(Ordering::SeqCst) {
                let state = mc.snapshot();
                if !state.active && (!state.pressed.is_empty() || state.left_button_held) {
                    violations += 1;
                }
            }
            violations
        })
    };

    for _ in 0..workers.len() {
        done_rx
            .recv_timeout(Duration::from_secs(30))
            .expect("worker did not finish; possible deadlock");
    }
    for worker in workers {
        worker.join().unwrap();
    }
    stop.store(true, Ordering::SeqCst);
    assert_eq!(observer.join().unwrap(), 0);

    controller.deactivate();
    assert!(controller.snapshot().pressed.is_empty());
}

fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    condition()
}

#[test]
fn service_runs_a_scripted_session() {
    let actuator = Arc::new(RecordingActuator::default());
    let controller = Arc::new(MotionController::new(
        MotionProfile::default(),
        actuator.clone(),
    ));
    let probe = {
        let mc = controller.clone();
        Arc::new(move || mc.is_active())
    };
    let script = vec![
        ScriptStep::Event(KeyEvent::press(LogicalKey::Toggle, 58)),
        ScriptStep::Event(KeyEvent::release(LogicalKey::Toggle, 58)),
        ScriptStep::Event(KeyEvent::press(LogicalKey::LeftClick, 33)),
        ScriptStep::Event(KeyEvent::press(LogicalKey::MoveRight, 32)),
        ScriptStep::Pause(Duration::from_millis(120)),
        ScriptStep::Event(KeyEvent::release(LogicalKey::MoveRight, 32)),
    ];
    let capture = ScriptedCapture::new(script, CaptureContext::new(16, probe));

    let mut service = MouseKeysService::new(
        controller.clone(),
        Box::new(capture),
        &ToggleSettings::default(),
    );
    service.start().unwrap();
    assert!(service.is_running());
    assert_eq!(service.capture_name(), "scripted");

    assert!(wait_until(Duration::from_secs(5), || actuator.position().0 > 960));
    // Key released and glide finished: nothing moves the pointer any more.
    assert!(wait_until(Duration::from_secs(5), || {
        controller.phase() == MotionPhase::Idle && controller.snapshot().left_button_held
    }));

    let report = service.shutdown().unwrap();
    assert_eq!(report.dispatch.toggles_accepted, 1);
    assert_eq!(report.dispatch.toggles_debounced, 1);
    assert!(report.ticks > 0);
    assert!(!controller.is_active());

    let calls = actuator.calls();
    assert_eq!(calls.first(), Some(&ActuatorCall::ButtonDown(MouseButton::Left)));
    assert_eq!(calls.last(), Some(&ActuatorCall::ButtonUp(MouseButton::Left)));
    assert!(calls
        .iter()
        .all(|call| !matches!(call, ActuatorCall::MoveTo(_, y) if *y != 540)));
}

#[test]
fn service_reports_unavailable_capture() {
    let controller = Arc::new(MotionController::new(
        MotionProfile::default(),
        Arc::new(RecordingActuator::default()),
    ));
    let capture = ScriptedCapture::unavailable(
        "no keyboard device",
        CaptureContext::new(16, Arc::new(|| false)),
    );
    let mut service = MouseKeysService::new(controller, Box::new(capture), &ToggleSettings::default());

    let err = service.start().unwrap_err();
    assert!(err.is_capture_unavailable());
    assert!(!service.is_running());

    let report = service.shutdown().unwrap();
    assert_eq!(report.ticks, 0);
    assert_eq!(report.dispatch.events, 0);
}
