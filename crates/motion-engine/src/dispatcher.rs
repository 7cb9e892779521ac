//! Routes queued key events into the motion controller.

use std::sync::Arc;
use std::thread::JoinHandle;

use serde::Serialize;

use mousekeys_common::clock::{MonotonicClock, SystemClock};
use mousekeys_common::error::MouseKeysResult;
use mousekeys_key_model::{KeyEvent, KeyEventKind, LogicalKey};
use mousekeys_platform_core::EventSource;

use crate::debounce::ToggleDebouncer;
use crate::motion::MotionController;

/// What happened to one dispatched event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Toggled { active: bool },
    Debounced,
    Handled,
    Ignored,
}

/// Counters for one dispatcher run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchStats {
    pub events: u64,
    pub toggles_accepted: u64,
    pub toggles_debounced: u64,
    pub handled: u64,
    pub ignored: u64,
}

impl DispatchStats {
    fn record(&mut self, outcome: DispatchOutcome) {
        self.events += 1;
        match outcome {
            DispatchOutcome::Toggled { .. } => self.toggles_accepted += 1,
            DispatchOutcome::Debounced => self.toggles_debounced += 1,
            DispatchOutcome::Handled => self.handled += 1,
            DispatchOutcome::Ignored => self.ignored += 1,
        }
    }
}

pub struct Dispatcher {
    controller: Arc<MotionController>,
    debouncer: ToggleDebouncer,
    clock: Arc<dyn MonotonicClock>,
    stats: DispatchStats,
}

impl Dispatcher {
    pub fn new(controller: Arc<MotionController>, debouncer: ToggleDebouncer) -> Self {
        Self::with_clock(controller, debouncer, Arc::new(SystemClock))
    }

    pub fn with_clock(
        controller: Arc<MotionController>,
        debouncer: ToggleDebouncer,
        clock: Arc<dyn MonotonicClock>,
    ) -> Self {
        Self {
            controller,
            debouncer,
            clock,
            stats: DispatchStats::default(),
        }
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    /// Apply one event.
    ///
    /// Every toggle edge goes through the debouncer regardless of its kind,
    /// timed by its capture stamp when it has one. Modifier changes of other
    /// keys are ignored.
    pub fn dispatch(&mut self, event: &KeyEvent) -> DispatchOutcome {
        let outcome = match (event.logical_key, event.kind) {
            (LogicalKey::Toggle, _) => {
                let at = event.captured_at.unwrap_or_else(|| self.clock.now());
                if self.debouncer.should_toggle(at) {
                    let active = self.controller.toggle();
                    tracing::info!(
                        active,
                        "MouseKeys {}",
                        if active { "enabled" } else { "disabled" }
                    );
                    DispatchOutcome::Toggled { active }
                } else {
                    tracing::debug!(kind = ?event.kind, "Toggle debounced");
                    DispatchOutcome::Debounced
                }
            }
            (LogicalKey::Unknown, _) | (_, KeyEventKind::ModifierChange) => DispatchOutcome::Ignored,
            (key, KeyEventKind::Press) => consumed(self.controller.on_key_down(key)),
            (key, KeyEventKind::Release) => consumed(self.controller.on_key_up(key)),
        };
        self.stats.record(outcome);
        outcome
    }

    /// Drain `source` until it is closed or its producers are gone.
    pub fn run(mut self, source: EventSource) -> DispatchStats {
        tracing::debug!("Dispatcher started");
        while let Some(event) = source.recv() {
            self.dispatch(&event);
        }
        tracing::debug!(
            events = self.stats.events,
            toggles = self.stats.toggles_accepted,
            "Dispatcher stopped"
        );
        self.stats
    }

    /// Run on a dedicated thread.
    pub fn spawn(self, source: EventSource) -> MouseKeysResult<JoinHandle<DispatchStats>> {
        let handle = std::thread::Builder::new()
            .name("mousekeys-dispatch".into())
            .spawn(move || self.run(source))?;
        Ok(handle)
    }
}

fn consumed(handled: bool) -> DispatchOutcome {
    if handled {
        DispatchOutcome::Handled
    } else {
        DispatchOutcome::Ignored
    }
}
