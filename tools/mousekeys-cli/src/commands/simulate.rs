//! Headless motion simulation for tuning a profile.
//!
//! Toggles MouseKeys on, holds one key for the requested time, releases it
//! and keeps ticking until the pointer stops. Time is simulated, so the run
//! is instant and repeatable.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use mousekeys_common::clock::ManualClock;
use mousekeys_common::config::AppConfig;
use mousekeys_key_model::{KeyEvent, LogicalKey};
use mousekeys_motion_engine::{
    Dispatcher, MotionController, MotionProfile, TickScheduler, ToggleDebouncer,
};
use mousekeys_platform_core::RecordingActuator;

#[derive(Debug, Serialize)]
struct Sample {
    tick: u64,
    t_ms: u64,
    held: bool,
    dx: f64,
    dy: f64,
    speed: f64,
    x: i32,
    y: i32,
}

pub fn run(config: &AppConfig, key: &str, hold_ms: u64, json: bool) -> anyhow::Result<()> {
    let key: LogicalKey = serde_json::from_value(serde_json::Value::String(key.to_string()))
        .map_err(|_| anyhow::anyhow!("Unknown key '{key}'; see `mousekeys keys --json`"))?;
    if key == LogicalKey::Toggle || key == LogicalKey::Unknown {
        anyhow::bail!("Cannot hold {key:?} in a simulation");
    }

    let profile = MotionProfile::from_settings(&config.motion);
    let actuator = Arc::new(RecordingActuator::default());
    let controller = Arc::new(MotionController::new(profile, actuator.clone()));
    let clock = ManualClock::new();
    let mut dispatcher = Dispatcher::with_clock(
        controller.clone(),
        ToggleDebouncer::from_settings(&config.toggle),
        Arc::new(clock.clone()),
    );
    let mut scheduler = TickScheduler::with_clock(controller.clone(), Arc::new(clock.clone()));

    dispatcher.dispatch(&KeyEvent::press(LogicalKey::Toggle, 0));
    dispatcher.dispatch(&KeyEvent::press(key, 0));

    let hold = Duration::from_millis(hold_ms);
    let tick = profile.tick_interval;
    let mut elapsed = Duration::ZERO;
    let mut held = true;
    let mut samples = Vec::new();
    let mut glide_ticks = 0;

    loop {
        if held && elapsed >= hold {
            dispatcher.dispatch(&KeyEvent::release(key, 0));
            held = false;
        }

        scheduler.tick();
        let (dx, dy) = controller.snapshot().velocity;
        let (x, y) = actuator.position();
        samples.push(Sample {
            tick: scheduler.ticks(),
            t_ms: elapsed.as_millis() as u64,
            held,
            dx,
            dy,
            speed: dx.hypot(dy),
            x,
            y,
        });

        if !held {
            glide_ticks += 1;
            if (dx == 0.0 && dy == 0.0) || glide_ticks > profile.max_decel_ticks() {
                break;
            }
        }
        clock.advance(tick);
        elapsed += tick;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&samples)?);
        return Ok(());
    }

    println!(
        "Holding {key:?} for {hold_ms} ms (base {} / max {} px per tick, ramp {} ms, {:?})",
        profile.base_speed,
        profile.max_speed,
        profile.ramp.as_millis(),
        profile.curve
    );
    println!("{}", "=".repeat(64));
    println!(
        "{:>5} {:>7} {:>5} {:>9} {:>9} {:>8} {:>6} {:>6}",
        "tick", "t(ms)", "held", "dx", "dy", "speed", "x", "y"
    );
    for s in &samples {
        println!(
            "{:>5} {:>7} {:>5} {:>9.3} {:>9.3} {:>8.3} {:>6} {:>6}",
            s.tick, s.t_ms, s.held, s.dx, s.dy, s.speed, s.x, s.y
        );
    }
    println!();
    println!(
        "Stopped {} ticks after release (bound {}).",
        glide_ticks,
        profile.max_decel_ticks()
    );
    Ok(())
}
