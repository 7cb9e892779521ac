//! Application configuration.
//!
//! Key bindings are fixed; only the motion profile, debounce interval,
//! capture options and logging are configurable.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{MouseKeysError, MouseKeysResult};

/// Global application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Acceleration profile and tick cadence.
    pub motion: MotionSettings,

    /// Toggle key handling.
    pub toggle: ToggleSettings,

    /// Keyboard capture options.
    pub capture: CaptureSettings,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Motion profile parameters. Speeds are in device pixels per tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionSettings {
    /// Speed on the first tick of a movement.
    pub base_speed: f64,

    /// Speed once the ramp has completed.
    pub max_speed: f64,

    /// Time to go from base to max speed (ms).
    pub ramp_ms: u64,

    /// Shape of the speed ramp.
    pub curve: SpeedCurve,

    /// What happens to the ramp when the travel direction changes.
    pub direction_change: DirectionChangePolicy,

    /// What happens to velocity when all movement keys are released.
    pub release: ReleasePolicy,

    /// Per-tick velocity multiplier while gliding to a stop, in (0, 1).
    pub friction: f64,

    /// Velocity magnitude below which gliding snaps to zero.
    pub stop_threshold: f64,

    /// Motion tick period (ms).
    pub tick_interval_ms: u64,

    /// Wheel notches per scroll key press. The actuator scrolls in whole
    /// notches, so small values already move a page noticeably.
    pub scroll_amount: i32,
}

/// Speed ramp shape. Every curve starts at base speed and never decreases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpeedCurve {
    /// Straight line from base to max.
    #[default]
    Linear,
    /// Quadratic ease-out: fast early gain, gentle approach to max.
    EaseOut,
    /// Hold base speed for `hold_ms`, then ramp linearly for the rest.
    Precision { hold_ms: u64 },
}

/// Ramp handling when the sign-only travel direction changes mid-movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DirectionChangePolicy {
    /// Start the ramp over from base speed.
    #[default]
    Restart,
    /// Keep half of the elapsed ramp time.
    HalveElapsed,
}

/// Velocity handling once every movement key is released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReleasePolicy {
    /// Decay by `friction` each tick until below `stop_threshold`.
    #[default]
    Friction,
    /// Stop on the next tick.
    HardStop,
}

/// Toggle key handling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToggleSettings {
    /// Minimum time between two accepted toggles (ms).
    pub debounce_ms: u64,
}

/// Keyboard capture options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    /// Explicit keyboard device (Linux evdev only). Auto-detected when unset.
    pub device: Option<PathBuf>,

    /// Take exclusive ownership of the keyboard so handled keys can be
    /// suppressed (Linux evdev only).
    pub grab: bool,

    /// Bounded event queue capacity between capture and dispatch.
    pub queue_capacity: usize,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "mousekeys=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for MotionSettings {
    fn default() -> Self {
        Self {
            base_speed: 1.0,
            max_speed: 30.0,
            ramp_ms: 300,
            curve: SpeedCurve::Linear,
            direction_change: DirectionChangePolicy::Restart,
            release: ReleasePolicy::Friction,
            friction: 0.8,
            stop_threshold: 0.5,
            tick_interval_ms: 16,
            scroll_amount: 3,
        }
    }
}

impl Default for ToggleSettings {
    fn default() -> Self {
        Self { debounce_ms: 300 }
    }
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            device: None,
            grab: true,
            queue_capacity: 100,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl MotionSettings {
    pub fn validate(&self) -> MouseKeysResult<()> {
        if !(self.base_speed.is_finite() && self.base_speed > 0.0) {
            return Err(MouseKeysError::config("motion.base_speed must be > 0"));
        }
        if !(self.max_speed.is_finite() && self.max_speed >= self.base_speed) {
            return Err(MouseKeysError::config(
                "motion.max_speed must be >= motion.base_speed",
            ));
        }
        if self.ramp_ms == 0 {
            return Err(MouseKeysError::config("motion.ramp_ms must be > 0"));
        }
        if let SpeedCurve::Precision { hold_ms } = self.curve {
            if hold_ms >= self.ramp_ms {
                return Err(MouseKeysError::config(format!(
                    "motion.curve.hold_ms ({hold_ms}) must be shorter than motion.ramp_ms ({})",
                    self.ramp_ms
                )));
            }
        }
        if !(self.friction > 0.0 && self.friction < 1.0) {
            return Err(MouseKeysError::config(
                "motion.friction must be strictly between 0 and 1",
            ));
        }
        if !(self.stop_threshold.is_finite() && self.stop_threshold > 0.0) {
            return Err(MouseKeysError::config("motion.stop_threshold must be > 0"));
        }
        if self.tick_interval_ms == 0 {
            return Err(MouseKeysError::config(
                "motion.tick_interval_ms must be > 0",
            ));
        }
        if self.scroll_amount <= 0 {
            return Err(MouseKeysError::config("motion.scroll_amount must be > 0"));
        }
        Ok(())
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Load and validate config from an explicit path.
    pub fn load_from(path: &Path) -> MouseKeysResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> MouseKeysResult<()> {
        self.motion.validate()?;
        if self.toggle.debounce_ms == 0 {
            return Err(MouseKeysError::config("toggle.debounce_ms must be > 0"));
        }
        if self.capture.queue_capacity == 0 {
            return Err(MouseKeysError::config(
                "capture.queue_capacity must be > 0",
            ));
        }
        Ok(())
    }

    /// Save config to the standard location.
    pub fn save(&self) -> MouseKeysResult<PathBuf> {
        let config_path = config_file_path();
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    pub fn save_to(&self, path: &Path) -> MouseKeysResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME")
                .or_else(|_| std::env::var("USERPROFILE"))
                .unwrap_or_else(|_| std::env::temp_dir().to_string_lossy().into_owned());
            PathBuf::from(home).join(".config")
        });
    base.join("mousekeys").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        AppConfig::default().validate().unwrap();
    }

    #[test]
    fn test_scroll_amount_counts_wheel_notches() {
        let mut config = AppConfig::default();
        assert_eq!(config.motion.scroll_amount, 3);

        config.motion.scroll_amount = 0;
        assert!(config.validate().is_err());
        config.motion.scroll_amount = -3;
        assert!(config.validate().is_err());
        config.motion.scroll_amount = 15;
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"motion":{"max_speed":50.0},"logging":{"json":true}}"#)
                .unwrap();
        assert_eq!(config.motion.max_speed, 50.0);
        assert_eq!(config.motion.base_speed, 1.0);
        assert_eq!(config.toggle.debounce_ms, 300);
        assert!(config.capture.grab);
        assert!(config.logging.json);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_curve_and_policies_use_snake_case() {
        let config: AppConfig = serde_json::from_str(
            r#"{"motion":{"curve":{"kind":"precision","hold_ms":80},"direction_change":"halve_elapsed","release":"hard_stop"}}"#,
        )
        .unwrap();
        assert_eq!(config.motion.curve, SpeedCurve::Precision { hold_ms: 80 });
        assert_eq!(
            config.motion.direction_change,
            DirectionChangePolicy::HalveElapsed
        );
        assert_eq!(config.motion.release, ReleasePolicy::HardStop);
    }

    #[test]
    fn test_validation_rejects_bad_friction() {
        let mut config = AppConfig::default();
        config.motion.friction = 1.0;
        assert!(matches!(
            config.validate(),
            Err(MouseKeysError::Config { .. })
        ));
    }

    #[test]
    fn test_validation_rejects_precision_hold_longer_than_ramp() {
        let mut config = AppConfig::default();
        config.motion.curve = SpeedCurve::Precision { hold_ms: 300 };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_max_below_base() {
        let mut config = AppConfig::default();
        config.motion.max_speed = 0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = std::env::temp_dir().join("mousekeys_test_config");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("config.json");

        let mut config = AppConfig::default();
        config.motion.curve = SpeedCurve::EaseOut;
        config.capture.device = Some(PathBuf::from("/dev/input/event3"));
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_from_rejects_invalid_values() {
        let dir = std::env::temp_dir().join("mousekeys_test_config_invalid");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(&path, r#"{"toggle":{"debounce_ms":0}}"#).unwrap();

        assert!(AppConfig::load_from(&path).is_err());

        std::fs::remove_dir_all(&dir).ok();
    }
}
