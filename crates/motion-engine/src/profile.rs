//! Acceleration and deceleration profile.

use std::time::Duration;

use mousekeys_common::config::{DirectionChangePolicy, MotionSettings, ReleasePolicy, SpeedCurve};

/// Resolved motion parameters. Speeds are device pixels per tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionProfile {
    pub base_speed: f64,
    pub max_speed: f64,
    pub ramp: Duration,
    pub curve: SpeedCurve,
    pub direction_change: DirectionChangePolicy,
    pub release: ReleasePolicy,
    pub friction: f64,
    pub stop_threshold: f64,
    pub tick_interval: Duration,
    pub scroll_amount: i32,
}

impl MotionProfile {
    pub fn from_settings(settings: &MotionSettings) -> Self {
        Self {
            base_speed: settings.base_speed,
            max_speed: settings.max_speed,
            ramp: Duration::from_millis(settings.ramp_ms),
            curve: settings.curve,
            direction_change: settings.direction_change,
            release: settings.release,
            friction: settings.friction,
            stop_threshold: settings.stop_threshold,
            tick_interval: Duration::from_millis(settings.tick_interval_ms),
            scroll_amount: settings.scroll_amount,
        }
    }

    /// Speed after holding a direction for `elapsed`.
    ///
    /// Starts at `base_speed`, never decreases, and reaches `max_speed` once
    /// `elapsed >= ramp`.
    pub fn speed_at(&self, elapsed: Duration) -> f64 {
        self.base_speed + (self.max_speed - self.base_speed) * self.ramp_progress(elapsed)
    }

    /// Fraction of the ramp completed, in `[0, 1]`.
    fn ramp_progress(&self, elapsed: Duration) -> f64 {
        let ramp = self.ramp.as_secs_f64();
        if ramp <= 0.0 {
            return 1.0;
        }
        let t = elapsed.as_secs_f64();

        match self.curve {
            SpeedCurve::Linear => (t / ramp).clamp(0.0, 1.0),
            SpeedCurve::EaseOut => {
                let p = (t / ramp).clamp(0.0, 1.0);
                1.0 - (1.0 - p) * (1.0 - p)
            }
            SpeedCurve::Precision { hold_ms } => {
                let hold = Duration::from_millis(hold_ms).as_secs_f64();
                if t <= hold {
                    0.0
                } else if ramp <= hold {
                    1.0
                } else {
                    ((t - hold) / (ramp - hold)).clamp(0.0, 1.0)
                }
            }
        }
    }

    /// Upper bound on the ticks between releasing every direction at full
    /// speed and the first zero displacement.
    pub fn max_decel_ticks(&self) -> u32 {
        match self.release {
            ReleasePolicy::HardStop => 1,
            ReleasePolicy::Friction => {
                if self.max_speed < self.stop_threshold {
                    return 1;
                }
                // max * friction^k < stop  <=>  k > ln(stop / max) / ln(friction)
                let k = (self.stop_threshold / self.max_speed).ln() / self.friction.ln();
                k.floor() as u32 + 1
            }
        }
    }
}

impl Default for MotionProfile {
    fn default() -> Self {
        Self::from_settings(&MotionSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_linear_ramp_endpoints() {
        let profile = MotionProfile::default();
        assert_eq!(profile.speed_at(Duration::ZERO), 1.0);
        assert!((profile.speed_at(ms(150)) - 15.5).abs() < 1e-9);
        assert_eq!(profile.speed_at(ms(300)), 30.0);
        assert_eq!(profile.speed_at(ms(5_000)), 30.0);
    }

    #[test]
    fn test_ease_out_gains_faster_early() {
        let linear = MotionProfile::default();
        let ease = MotionProfile {
            curve: SpeedCurve::EaseOut,
            ..MotionProfile::default()
        };
        assert!(ease.speed_at(ms(100)) > linear.speed_at(ms(100)));
        assert_eq!(ease.speed_at(ms(300)), 30.0);
    }

    #[test]
    fn test_precision_holds_base_speed() {
        let profile = MotionProfile {
            curve: SpeedCurve::Precision { hold_ms: 100 },
            ..MotionProfile::default()
        };
        assert_eq!(profile.speed_at(ms(50)), 1.0);
        assert_eq!(profile.speed_at(ms(100)), 1.0);
        assert!((profile.speed_at(ms(200)) - 15.5).abs() < 1e-9);
        assert_eq!(profile.speed_at(ms(300)), 30.0);
    }

    #[test]
    fn test_default_decel_bound() {
        // 30 * 0.8^18 = 0.54, 30 * 0.8^19 = 0.43
        assert_eq!(MotionProfile::default().max_decel_ticks(), 19);
    }

    #[test]
    fn test_hard_stop_decel_bound() {
        let profile = MotionProfile {
            release: ReleasePolicy::HardStop,
            ..MotionProfile::default()
        };
        assert_eq!(profile.max_decel_ticks(), 1);
    }

    fn any_curve() -> impl Strategy<Value = SpeedCurve> {
        prop_oneof![
            Just(SpeedCurve::Linear),
            Just(SpeedCurve::EaseOut),
            (0u64..300).prop_map(|hold_ms| SpeedCurve::Precision { hold_ms }),
        ]
    }

    proptest! {
        #[test]
        fn prop_curves_are_monotonic_and_bounded(
            curve in any_curve(),
            base in 0.1f64..10.0,
            extra in 0.0f64..50.0,
            a in 0u64..1_000,
            b in 0u64..1_000,
        ) {
            let profile = MotionProfile {
                base_speed: base,
                max_speed: base + extra,
                curve,
                ..MotionProfile::default()
            };
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let s_lo = profile.speed_at(ms(lo));
            let s_hi = profile.speed_at(ms(hi));
            prop_assert!(s_lo <= s_hi + 1e-12);
            prop_assert!(s_lo >= base - 1e-12);
            prop_assert!(s_hi <= base + extra + 1e-12);
            prop_assert_eq!(profile.speed_at(Duration::ZERO), base);
            prop_assert!((profile.speed_at(profile.ramp) - (base + extra)).abs() < 1e-9);
        }
    }
}
