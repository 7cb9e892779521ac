//! Run MouseKeys until Ctrl+C.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use mousekeys_actuator::EnigoActuator;
use mousekeys_common::config::AppConfig;
use mousekeys_input_capture::{detect_capture, ActivityProbe};
use mousekeys_motion_engine::{MotionController, MotionProfile, MouseKeysService};

const STATUS_POLL: Duration = Duration::from_millis(100);

pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let actuator = EnigoActuator::new().context("Failed to start the pointer actuator")?;
    let controller = Arc::new(MotionController::new(
        MotionProfile::from_settings(&config.motion),
        Arc::new(actuator),
    ));

    let probe: ActivityProbe = {
        let controller = controller.clone();
        Arc::new(move || controller.is_active())
    };
    let capture = detect_capture(&config.capture, probe);
    let mut service = MouseKeysService::new(controller.clone(), capture, &config.toggle);

    match service.start() {
        Ok(()) => {
            println!("MouseKeys is running. Press Caps Lock to toggle, Ctrl+C to quit.");
        }
        Err(e) if e.is_capture_unavailable() => {
            tracing::error!(
                error = %e,
                "Keyboard capture unavailable; keys will not move the pointer. Run `mousekeys check` for details"
            );
        }
        Err(e) => return Err(e.into()),
    }

    let observer = tokio::spawn(observe_status(controller));

    tokio::signal::ctrl_c().await?;
    observer.abort();

    println!();
    let report = tokio::task::spawn_blocking(move || service.shutdown()).await??;
    println!(
        "Stopped after {} key events ({} toggles) and {} ticks.",
        report.dispatch.events, report.dispatch.toggles_accepted, report.ticks
    );

    Ok(())
}

/// Log every active/inactive transition.
async fn observe_status(controller: Arc<MotionController>) {
    let mut interval = tokio::time::interval(STATUS_POLL);
    let mut last = controller.is_active();
    loop {
        interval.tick().await;
        let active = controller.is_active();
        if active != last {
            tracing::info!(active, phase = ?controller.phase(), "Status changed");
            last = active;
        }
    }
}
