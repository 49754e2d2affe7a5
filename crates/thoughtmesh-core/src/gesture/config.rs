//! Per-recognizer gesture thresholds.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default time after which an undecided press commits to a single press.
pub const DEFAULT_SHORT_PRESS_MS: u64 = 100;
/// Default maximum gap between a release and the second press of a double press.
pub const DEFAULT_DOUBLE_PRESS_MS: u64 = 500;
/// Default hold time for a long press.
pub const DEFAULT_LONG_PRESS_MS: u64 = 500;
/// Drift allowance when a press may still turn into a long or double press.
pub const DEFAULT_MAX_DRIFT: f64 = 3.0;

/// Thresholds and timeouts for one gesture recognizer.
///
/// `max_drift` is optional: when unset it falls back to
/// [`DEFAULT_MAX_DRIFT`] if either double or long press is enabled, and to 0
/// otherwise, so a plain press turns into a drag on the first motion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    pub short_press_ms: u64,
    pub double_press: bool,
    pub double_press_ms: u64,
    pub long_press: bool,
    pub long_press_ms: u64,
    pub max_drift: Option<f64>,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            short_press_ms: DEFAULT_SHORT_PRESS_MS,
            double_press: false,
            double_press_ms: DEFAULT_DOUBLE_PRESS_MS,
            long_press: false,
            long_press_ms: DEFAULT_LONG_PRESS_MS,
            max_drift: None,
        }
    }
}

impl GestureConfig {
    /// Plain press: no double or long press detection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable double press detection with the default window.
    pub fn with_double_press(mut self) -> Self {
        self.double_press = true;
        self
    }

    /// Enable long press detection with the given hold time.
    pub fn with_long_press(mut self, hold_ms: u64) -> Self {
        self.long_press = true;
        self.long_press_ms = hold_ms;
        self
    }

    pub fn with_max_drift(mut self, drift: f64) -> Self {
        self.max_drift = Some(drift);
        self
    }

    /// Distance from the initial press beyond which a held press becomes a drag.
    pub fn drift_threshold(&self) -> f64 {
        match self.max_drift {
            Some(drift) => drift,
            None if self.double_press || self.long_press => DEFAULT_MAX_DRIFT,
            None => 0.0,
        }
    }

    pub fn short_press(&self) -> Duration {
        Duration::from_millis(self.short_press_ms)
    }

    pub fn double_press_window(&self) -> Duration {
        Duration::from_millis(self.double_press_ms)
    }

    pub fn long_press_hold(&self) -> Duration {
        Duration::from_millis(self.long_press_ms)
    }
}
