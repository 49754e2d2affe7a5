//! Visual effects driven by the canvas scheduler.

use super::Scene;
use crate::animation::{Effect, EffectStatus, Frame};
use crate::events::EngineEvent;
use crate::shapes::{Shape, ShapeId};
use std::time::Duration;

#[cfg(target_arch = "wasm32")]
use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

/// Widens a pop's gap every frame, removing the shape once it reaches 2π.
#[derive(Debug, Clone)]
pub struct PopEffect {
    pop: ShapeId,
    step: f64,
}

impl PopEffect {
    pub fn new(pop: ShapeId, step: f64) -> Self {
        Self { pop, step }
    }
}

impl Effect<Scene> for PopEffect {
    fn name(&self) -> &'static str {
        "pop"
    }

    fn step(&mut self, scene: &mut Scene, _frame: &Frame) -> EffectStatus {
        let Some(Shape::Pop(pop)) = scene.graph.shape_mut(self.pop) else {
            return EffectStatus::Finished;
        };
        if pop.advance(self.step) {
            scene.graph.remove_shape(self.pop);
            EffectStatus::Finished
        } else {
            EffectStatus::Running
        }
    }

    fn cancel(&mut self, scene: &mut Scene) {
        scene.graph.remove_shape(self.pop);
    }
}

/// Keeps a jot flagged as shaking for a fixed time.
#[derive(Debug, Clone)]
pub struct ShakeEffect {
    jot: ShapeId,
    duration: Duration,
    started: Option<Instant>,
}

impl ShakeEffect {
    pub fn new(jot: ShapeId, duration: Duration) -> Self {
        Self {
            jot,
            duration,
            started: None,
        }
    }
}

impl Effect<Scene> for ShakeEffect {
    fn name(&self) -> &'static str {
        "shake"
    }

    fn step(&mut self, scene: &mut Scene, frame: &Frame) -> EffectStatus {
        let Some(jot) = scene.graph.jot_mut(self.jot) else {
            return EffectStatus::Finished;
        };
        let started = *self.started.get_or_insert(frame.now);
        if frame.now.saturating_duration_since(started) >= self.duration {
            jot.shaking = false;
            EffectStatus::Finished
        } else {
            jot.shaking = true;
            EffectStatus::Running
        }
    }

    fn cancel(&mut self, scene: &mut Scene) {
        if let Some(jot) = scene.graph.jot_mut(self.jot) {
            jot.shaking = false;
        }
    }
}

/// Opens a gap in a line over a number of frames, then queues its deletion.
#[derive(Debug, Clone)]
pub struct BreakLineEffect {
    line: ShapeId,
    steps: u32,
    done: u32,
}

impl BreakLineEffect {
    pub fn new(line: ShapeId, steps: u32) -> Self {
        Self {
            line,
            steps: steps.max(1),
            done: 0,
        }
    }
}

impl Effect<Scene> for BreakLineEffect {
    fn name(&self) -> &'static str {
        "break-line"
    }

    fn step(&mut self, scene: &mut Scene, _frame: &Frame) -> EffectStatus {
        let Some(line) = scene.graph.line_mut(self.line) else {
            return EffectStatus::Finished;
        };
        // Deleted, toggled or bumped by something else in the meantime.
        if line.breaking.is_none() {
            return EffectStatus::Finished;
        }
        self.done += 1;
        line.breaking = Some(f64::from(self.done) / f64::from(self.steps));
        if self.done < self.steps {
            return EffectStatus::Running;
        }
        scene.commands.push(EngineEvent::DeleteLine {
            shape_id: self.line,
        });
        EffectStatus::Finished
    }

    fn cancel(&mut self, scene: &mut Scene) {
        if let Some(line) = scene.graph.line_mut(self.line) {
            line.breaking = None;
            line.break_rate = 0.0;
        }
    }
}

/// Fades a tap marker out and removes it.
#[derive(Debug, Clone)]
pub struct TapFadeEffect {
    tap: ShapeId,
    frames: u32,
    left: u32,
}

impl TapFadeEffect {
    pub fn new(tap: ShapeId, frames: u32) -> Self {
        Self {
            tap,
            frames,
            left: frames,
        }
    }
}

impl Effect<Scene> for TapFadeEffect {
    fn name(&self) -> &'static str {
        "tap-fade"
    }

    fn step(&mut self, scene: &mut Scene, _frame: &Frame) -> EffectStatus {
        let Some(Shape::Tap(tap)) = scene.graph.shape_mut(self.tap) else {
            return EffectStatus::Finished;
        };
        self.left = self.left.saturating_sub(1);
        if self.left == 0 {
            scene.graph.remove_shape(self.tap);
            return EffectStatus::Finished;
        }
        tap.opacity = f64::from(self.left) / f64::from(self.frames);
        EffectStatus::Running
    }

    fn cancel(&mut self, scene: &mut Scene) {
        scene.graph.remove_shape(self.tap);
    }
}
