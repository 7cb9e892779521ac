//! Service lifecycle: capture, dispatcher and tick loop.

use std::sync::Arc;
use std::thread::JoinHandle;

use serde::Serialize;

use mousekeys_common::config::ToggleSettings;
use mousekeys_common::error::{MouseKeysError, MouseKeysResult};
use mousekeys_platform_core::KeyboardCapture;

use crate::debounce::ToggleDebouncer;
use crate::dispatcher::{DispatchStats, Dispatcher};
use crate::motion::MotionController;
use crate::scheduler::{SchedulerHandle, TickScheduler};

/// Totals collected at shutdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ServiceReport {
    pub dispatch: DispatchStats,
    pub ticks: u64,
}

/// A running MouseKeys instance.
///
/// The capture's activity probe must read the same controller passed here.
pub struct MouseKeysService {
    controller: Arc<MotionController>,
    capture: Box<dyn KeyboardCapture>,
    debounce: ToggleSettings,
    dispatcher: Option<JoinHandle<DispatchStats>>,
    scheduler: Option<SchedulerHandle>,
}

impl MouseKeysService {
    pub fn new(
        controller: Arc<MotionController>,
        capture: Box<dyn KeyboardCapture>,
        toggle: &ToggleSettings,
    ) -> Self {
        Self {
            controller,
            capture,
            debounce: toggle.clone(),
            dispatcher: None,
            scheduler: None,
        }
    }

    pub fn controller(&self) -> &Arc<MotionController> {
        &self.controller
    }

    pub fn capture_name(&self) -> &str {
        self.capture.name()
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_some()
    }

    /// Start capture, then the dispatcher and the tick loop.
    ///
    /// A capture failure is returned as-is and nothing else is started.
    pub fn start(&mut self) -> MouseKeysResult<()> {
        if self.is_running() {
            return Err(MouseKeysError::capture("service already started"));
        }

        let source = self.capture.start()?;
        tracing::info!(capture = self.capture.name(), "Keyboard capture running");

        let dispatcher = Dispatcher::new(
            self.controller.clone(),
            ToggleDebouncer::from_settings(&self.debounce),
        );
        self.dispatcher = Some(dispatcher.spawn(source)?);
        self.scheduler = Some(TickScheduler::new(self.controller.clone()).spawn()?);

        let profile = self.controller.profile();
        tracing::info!(
            tick_ms = profile.tick_interval.as_millis() as u64,
            base_speed = profile.base_speed,
            max_speed = profile.max_speed,
            "MouseKeys service started"
        );
        Ok(())
    }

    /// Stop everything. Held buttons are released before the tick loop
    /// stops.
    pub fn shutdown(mut self) -> MouseKeysResult<ServiceReport> {
        let mut report = ServiceReport::default();

        if let Err(e) = self.capture.stop() {
            tracing::warn!(error = %e, "Keyboard capture did not stop cleanly");
        }
        if let Some(handle) = self.dispatcher.take() {
            report.dispatch = handle
                .join()
                .map_err(|_| MouseKeysError::platform("dispatcher thread panicked"))?;
        }

        self.controller.deactivate();

        if let Some(scheduler) = self.scheduler.take() {
            report.ticks = scheduler.stop()?;
        }

        tracing::info!(
            events = report.dispatch.events,
            toggles = report.dispatch.toggles_accepted,
            ticks = report.ticks,
            "MouseKeys service stopped"
        );
        Ok(report)
    }
}
