//! Engine tuning constants.

use crate::error::{EngineError, EngineResult};
use crate::gesture::GestureConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Every tuned constant of the engine. Missing JSON fields take the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Recognizer used for presses on a jot.
    pub jot_gesture: GestureConfig,
    /// Recognizer used for presses on a line.
    pub line_gesture: GestureConfig,
    /// Recognizer used for presses on the empty canvas.
    pub canvas_gesture: GestureConfig,
    /// Diameter of a circle jot.
    pub orb_size: f64,
    /// Added to `orb_size`: closer than this, a connected pair bumps.
    pub bump_inner_offset: f64,
    /// Added to `orb_size`: farther than this, the bump latch re-arms.
    pub bump_outer_offset: f64,
    /// Spiral step given to freshly created nodes.
    pub spiral_initial: u32,
    /// Offset from the origin's step given to a node placed around it.
    pub spiral_addend: u32,
    /// Extra advance of the origin's own step per placement.
    pub spiral_origin_bump: u32,
    /// Distance from the origin to a spiral-placed node.
    pub spiral_radius: f64,
    pub shake_ms: u64,
    /// Cut distance at which a line starts to weaken.
    pub cut_radius: f64,
    /// Cut distance at which the break rate saturates.
    pub cut_core: f64,
    /// Frames of the breaking animation.
    pub break_steps: u32,
    /// How long the cut cone must be still before returning to create mode.
    pub cone_hold_ms: u64,
    /// A new node within this distance of an existing one takes its color.
    pub color_snap_radius: f64,
    /// Radians the pop gap widens per frame.
    pub pop_step: f64,
    pub tap_fade_frames: u32,
    pub line_hit_tolerance: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            jot_gesture: GestureConfig::new().with_double_press().with_long_press(1200),
            line_gesture: GestureConfig::new().with_double_press(),
            canvas_gesture: GestureConfig::new().with_long_press(500),
            orb_size: 40.0,
            bump_inner_offset: 5.0,
            bump_outer_offset: 20.0,
            spiral_initial: 2,
            spiral_addend: 3,
            spiral_origin_bump: 5,
            spiral_radius: 150.0,
            shake_ms: 400,
            cut_radius: 30.0,
            cut_core: 4.0,
            break_steps: 12,
            cone_hold_ms: 700,
            color_snap_radius: 60.0,
            pop_step: 0.4,
            tap_fade_frames: 20,
            line_hit_tolerance: 6.0,
        }
    }
}

impl EngineConfig {
    /// Parse a (possibly partial) JSON config and validate it.
    pub fn from_json(json: &str) -> EngineResult<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Center distance below which a connected pair bumps.
    pub fn bump_inner(&self) -> f64 {
        self.orb_size + self.bump_inner_offset
    }

    /// Center distance beyond which the bump latch re-arms.
    pub fn bump_outer(&self) -> f64 {
        self.orb_size + self.bump_outer_offset
    }

    pub fn shake_duration(&self) -> Duration {
        Duration::from_millis(self.shake_ms)
    }

    pub fn cone_hold(&self) -> Duration {
        Duration::from_millis(self.cone_hold_ms)
    }

    /// Reject values that would break the hysteresis band or divide by zero.
    pub fn validate(&self) -> EngineResult<()> {
        let invalid = |msg: &str| Err(EngineError::InvalidConfig(msg.to_string()));
        if self.orb_size <= 0.0 {
            return invalid("orb_size must be positive");
        }
        if self.bump_inner() >= self.bump_outer() {
            return invalid("bump inner threshold must be below the outer threshold");
        }
        if self.spiral_radius <= 0.0 {
            return invalid("spiral_radius must be positive");
        }
        if self.cut_core < 0.0 || self.cut_radius <= self.cut_core {
            return invalid("cut_radius must exceed a non-negative cut_core");
        }
        if self.break_steps == 0 {
            return invalid("break_steps must be at least 1");
        }
        if self.pop_step <= 0.0 {
            return invalid("pop_step must be positive");
        }
        if self.line_hit_tolerance < 0.0 || self.color_snap_radius < 0.0 {
            return invalid("tolerances cannot be negative");
        }
        Ok(())
    }
}
