//! Frame-driven effect scheduler.
//!
//! Continuous effects (bursts, shakes, breaking lines) are explicit state
//! machines. The owner of the tick source calls [`Scheduler::tick`] once per
//! frame; each effect advances one step against a shared context and reports
//! whether it has reached its terminal state.

use std::fmt;
use std::time::Duration;

// Use web_time for WASM compatibility
#[cfg(target_arch = "wasm32")]
use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

/// Handle of a scheduled effect.
pub type EffectId = u64;

/// One tick of the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    /// Frames ticked so far, starting at 0.
    pub index: u64,
    pub now: Instant,
    /// Time since the previous tick, zero on the first.
    pub delta: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectStatus {
    Running,
    Finished,
}

/// A per-frame state machine operating on a context `C`.
pub trait Effect<C> {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Advance one frame.
    fn step(&mut self, ctx: &mut C, frame: &Frame) -> EffectStatus;

    /// Undo any lingering visual state when cancelled before finishing.
    fn cancel(&mut self, _ctx: &mut C) {}
}

struct Scheduled<C> {
    id: EffectId,
    effect: Box<dyn Effect<C>>,
}

/// Owns running effects and advances them once per tick.
pub struct Scheduler<C> {
    effects: Vec<Scheduled<C>>,
    next_id: EffectId,
    frame_index: u64,
    last_tick: Option<Instant>,
}

impl<C> fmt::Debug for Scheduler<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field(
                "effects",
                &self
                    .effects
                    .iter()
                    .map(|s| (s.id, s.effect.name()))
                    .collect::<Vec<_>>(),
            )
            .field("frame_index", &self.frame_index)
            .finish()
    }
}

impl<C> Default for Scheduler<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Scheduler<C> {
    pub fn new() -> Self {
        Self {
            effects: Vec::new(),
            next_id: 1,
            frame_index: 0,
            last_tick: None,
        }
    }

    /// Start an effect. It first steps on the next tick.
    pub fn spawn(&mut self, effect: impl Effect<C> + 'static) -> EffectId {
        let id = self.next_id;
        self.next_id += 1;
        log::trace!("Spawned effect {} #{id}", effect.name());
        self.effects.push(Scheduled {
            id,
            effect: Box::new(effect),
        });
        id
    }

    /// Stop an effect before it finishes. Returns whether it was running.
    pub fn cancel(&mut self, id: EffectId, ctx: &mut C) -> bool {
        let Some(pos) = self.effects.iter().position(|s| s.id == id) else {
            return false;
        };
        let mut scheduled = self.effects.remove(pos);
        scheduled.effect.cancel(ctx);
        true
    }

    /// Advance every effect one frame, dropping the ones that finish.
    /// Returns the number of effects that finished on this tick.
    pub fn tick(&mut self, ctx: &mut C, now: Instant) -> usize {
        let frame = Frame {
            index: self.frame_index,
            now,
            delta: self
                .last_tick
                .map(|last| now.saturating_duration_since(last))
                .unwrap_or_default(),
        };
        self.frame_index += 1;
        self.last_tick = Some(now);

        let before = self.effects.len();
        self.effects.retain_mut(|scheduled| {
            match scheduled.effect.step(ctx, &frame) {
                EffectStatus::Running => true,
                EffectStatus::Finished => {
                    log::trace!("Effect {} #{} finished", scheduled.effect.name(), scheduled.id);
                    false
                }
            }
        });
        before - self.effects.len()
    }

    pub fn is_running(&self, id: EffectId) -> bool {
        self.effects.iter().any(|s| s.id == id)
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }
}
