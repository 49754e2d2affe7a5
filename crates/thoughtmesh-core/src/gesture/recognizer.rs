//! Per-pointer press/drag state machine.

use super::config::GestureConfig;
use crate::geometry::Vector2;
use crate::input::{PointerEvent, PointerEventKind};
use serde::Serialize;
use std::time::Duration;

// Use web_time for WASM compatibility
#[cfg(target_arch = "wasm32")]
use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

/// Recognizer state for one interaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum GesturePhase {
    /// No interaction in progress.
    #[default]
    Initial,
    /// Pressed, committed to a single press.
    SingleDown,
    /// Pressed, waiting for the long-press timer.
    SingleDownOrLongDown,
    /// Pressed, waiting for the short-press timer or a release.
    SingleDownOrBeginDouble,
    /// Pressed, long press and double press both still possible.
    SingleDownOrLongDownOrBeginDouble,
    /// Released once, waiting for a second press.
    SingleUpOrBeginDouble,
    DoubleDown,
    LongDown,
    SingleDragging,
}

impl GesturePhase {
    /// Pressed but not yet classified; motion past the drift threshold drags.
    pub fn is_undecided_down(self) -> bool {
        matches!(
            self,
            GesturePhase::SingleDown
                | GesturePhase::SingleDownOrLongDown
                | GesturePhase::SingleDownOrBeginDouble
                | GesturePhase::SingleDownOrLongDownOrBeginDouble
        )
    }
}

/// Semantic outcome emitted by the recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum GestureKind {
    SingleDown,
    SingleUp,
    Tap,
    DoubleDown,
    DoubleUp,
    #[serde(rename = "taptap")]
    TapTap,
    LongDown,
    LongUp,
    DragStart,
    DragMove,
    DragEnd,
    /// Motion while pressed that stayed within the drift threshold.
    DragDrift,
}

/// A recognized gesture event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GestureEvent {
    pub kind: GestureKind,
    /// Phase after the transition that produced this event.
    pub phase: GesturePhase,
    /// Pointer position plus ambient scroll plus the initial press offset.
    pub position: Vector2,
    /// Screen displacement from the initial press.
    pub delta: Vector2,
    /// The pointer event that produced this gesture, or the last one seen
    /// when a timer fired.
    pub pointer: PointerEvent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerKind {
    ShortPress,
    LongPress,
    DoublePress,
}

#[derive(Debug, Clone, Copy)]
struct PendingTimer {
    kind: TimerKind,
    deadline: Instant,
    scheduled_in: GesturePhase,
}

/// Gesture recognizer for a single pointer interaction.
///
/// Feed it the pointer's events in arrival order through
/// [`handle`](GestureState::handle) and call [`poll`](GestureState::poll)
/// from the event loop so timers fire without further input. Every timer is
/// dropped the moment the phase that scheduled it is left.
#[derive(Debug, Clone)]
pub struct GestureState {
    config: GestureConfig,
    phase: GesturePhase,
    /// World position of the grabbed target, if any.
    anchor: Option<Vector2>,
    scroll: Vector2,
    initial: Vector2,
    current: Vector2,
    press_offset: Vector2,
    timers: Vec<PendingTimer>,
    last_pointer: PointerEvent,
}

impl GestureState {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            phase: GesturePhase::Initial,
            anchor: None,
            scroll: Vector2::ZERO,
            initial: Vector2::ZERO,
            current: Vector2::ZERO,
            press_offset: Vector2::ZERO,
            timers: Vec::new(),
            last_pointer: PointerEvent::new(PointerEventKind::Up, Vector2::ZERO, 0),
        }
    }

    /// Recognizer for a press on a target located at `anchor` (world
    /// coordinates). Emitted positions keep the target under the same spot
    /// of the pointer.
    pub fn with_anchor(config: GestureConfig, anchor: Vector2) -> Self {
        let mut state = Self::new(config);
        state.anchor = Some(anchor);
        state
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn phase(&self) -> GesturePhase {
        self.phase
    }

    pub fn is_dragging(&self) -> bool {
        self.phase == GesturePhase::SingleDragging
    }

    /// No interaction in progress and nothing left to fire.
    pub fn is_idle(&self) -> bool {
        self.phase == GesturePhase::Initial && self.timers.is_empty()
    }

    /// Earliest pending timer deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.iter().map(|t| t.deadline).min()
    }

    pub fn scroll(&self) -> Vector2 {
        self.scroll
    }

    /// Set the ambient scroll added to every emitted position.
    pub fn set_scroll(&mut self, scroll: Vector2) {
        self.scroll = scroll;
    }

    /// Abandon any interaction in progress.
    pub fn reset(&mut self) {
        self.transition(GesturePhase::Initial);
    }

    /// Process one pointer event.
    ///
    /// Timers already due at `now` fire first, so an event can never overtake
    /// an expired window.
    pub fn handle(&mut self, event: &PointerEvent, now: Instant) -> Vec<GestureEvent> {
        let mut out = Vec::with_capacity(3);
        self.fire_due(now, &mut out);

        if !event.is_primary() {
            log::trace!("ignoring {:?} from {:?} button", event.kind, event.button);
            return out;
        }

        match event.kind {
            PointerEventKind::Down => self.on_down(event, now, &mut out),
            PointerEventKind::Move => self.on_move(event, &mut out),
            PointerEventKind::Up => self.on_up(event, now, &mut out),
        }
        out
    }

    /// Fire every timer due at `now`.
    pub fn poll(&mut self, now: Instant) -> Vec<GestureEvent> {
        let mut out = Vec::new();
        self.fire_due(now, &mut out);
        out
    }

    fn on_down(&mut self, event: &PointerEvent, now: Instant, out: &mut Vec<GestureEvent>) {
        match self.phase {
            GesturePhase::Initial => {
                self.track(event);
                self.initial = event.position;
                self.press_offset = self
                    .anchor
                    .map_or(Vector2::ZERO, |anchor| anchor - (event.position + self.scroll));

                match (self.config.long_press, self.config.double_press) {
                    (false, false) => {
                        self.transition(GesturePhase::SingleDown);
                        self.emit(GestureKind::SingleDown, out);
                    }
                    (true, false) => {
                        self.transition(GesturePhase::SingleDownOrLongDown);
                        self.schedule(TimerKind::LongPress, self.config.long_press_hold(), now);
                    }
                    (false, true) => {
                        self.transition(GesturePhase::SingleDownOrBeginDouble);
                        self.schedule(TimerKind::ShortPress, self.config.short_press(), now);
                    }
                    (true, true) => {
                        self.transition(GesturePhase::SingleDownOrLongDownOrBeginDouble);
                        self.schedule(TimerKind::LongPress, self.config.long_press_hold(), now);
                    }
                }
            }
            GesturePhase::SingleUpOrBeginDouble => {
                self.track(event);
                self.transition(GesturePhase::DoubleDown);
                self.emit(GestureKind::DoubleDown, out);
            }
            phase => log::warn!("ignoring pointer down in {phase:?}"),
        }
    }

    fn on_move(&mut self, event: &PointerEvent, out: &mut Vec<GestureEvent>) {
        match self.phase {
            // Hovering or between the two presses of a double press.
            GesturePhase::Initial | GesturePhase::SingleUpOrBeginDouble => {}
            GesturePhase::SingleDragging => {
                self.track(event);
                self.emit(GestureKind::DragMove, out);
            }
            phase if phase.is_undecided_down() => {
                self.track(event);
                // Drift is measured from the initial press, never the last point.
                if self.initial.distance_to(event.position) > self.config.drift_threshold() {
                    self.transition(GesturePhase::SingleDragging);
                    self.emit(GestureKind::DragStart, out);
                } else {
                    self.emit(GestureKind::DragDrift, out);
                }
            }
            _ => {
                self.track(event);
                self.emit(GestureKind::DragDrift, out);
            }
        }
    }

    fn on_up(&mut self, event: &PointerEvent, now: Instant, out: &mut Vec<GestureEvent>) {
        match self.phase {
            GesturePhase::SingleDragging => {
                self.track(event);
                self.transition(GesturePhase::Initial);
                self.emit(GestureKind::DragEnd, out);
            }
            GesturePhase::SingleDown => {
                self.track(event);
                self.transition(GesturePhase::Initial);
                self.emit(GestureKind::SingleUp, out);
                self.emit(GestureKind::Tap, out);
            }
            GesturePhase::SingleDownOrLongDown => {
                self.track(event);
                self.transition(GesturePhase::Initial);
                self.emit(GestureKind::SingleDown, out);
                self.emit(GestureKind::SingleUp, out);
                self.emit(GestureKind::Tap, out);
            }
            GesturePhase::SingleDownOrBeginDouble
            | GesturePhase::SingleDownOrLongDownOrBeginDouble => {
                self.track(event);
                self.transition(GesturePhase::SingleUpOrBeginDouble);
                self.schedule(TimerKind::DoublePress, self.config.double_press_window(), now);
            }
            GesturePhase::LongDown => {
                self.track(event);
                self.transition(GesturePhase::Initial);
                self.emit(GestureKind::LongUp, out);
            }
            GesturePhase::DoubleDown => {
                self.track(event);
                self.transition(GesturePhase::Initial);
                self.emit(GestureKind::DoubleUp, out);
                self.emit(GestureKind::TapTap, out);
            }
            phase @ (GesturePhase::Initial | GesturePhase::SingleUpOrBeginDouble) => {
                log::warn!("ignoring pointer up in {phase:?}");
            }
        }
    }

    fn fire_due(&mut self, now: Instant, out: &mut Vec<GestureEvent>) {
        // Firing can transition and clear the remaining timers, so look again
        // after every fire.
        while let Some(index) = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.deadline <= now)
            .min_by_key(|(_, t)| t.deadline)
            .map(|(i, _)| i)
        {
            let timer = self.timers.remove(index);
            self.fire(timer, out);
        }
    }

    fn fire(&mut self, timer: PendingTimer, out: &mut Vec<GestureEvent>) {
        if timer.scheduled_in != self.phase {
            log::debug!(
                "stale {:?} timer from {:?} fired in {:?}",
                timer.kind,
                timer.scheduled_in,
                self.phase
            );
            return;
        }

        match (timer.kind, self.phase) {
            (TimerKind::ShortPress, GesturePhase::SingleDownOrBeginDouble) => {
                self.transition(GesturePhase::SingleDown);
                self.emit(GestureKind::SingleDown, out);
            }
            (
                TimerKind::LongPress,
                GesturePhase::SingleDownOrLongDown | GesturePhase::SingleDownOrLongDownOrBeginDouble,
            ) => {
                self.transition(GesturePhase::LongDown);
                self.emit(GestureKind::LongDown, out);
            }
            (TimerKind::DoublePress, GesturePhase::SingleUpOrBeginDouble) => {
                self.transition(GesturePhase::Initial);
                self.emit(GestureKind::SingleDown, out);
                self.emit(GestureKind::SingleUp, out);
                self.emit(GestureKind::Tap, out);
            }
            (kind, phase) => log::warn!("unexpected {kind:?} timer in {phase:?}"),
        }
    }

    /// Move to `next`, dropping every timer scheduled by the phase being left.
    fn transition(&mut self, next: GesturePhase) {
        self.timers.clear();
        self.phase = next;
    }

    /// Schedule a timer owned by the current phase.
    fn schedule(&mut self, kind: TimerKind, after: Duration, now: Instant) {
        self.timers.push(PendingTimer {
            kind,
            deadline: now + after,
            scheduled_in: self.phase,
        });
    }

    fn track(&mut self, event: &PointerEvent) {
        self.current = event.position;
        self.last_pointer = *event;
    }

    fn emit(&self, kind: GestureKind, out: &mut Vec<GestureEvent>) {
        out.push(GestureEvent {
            kind,
            phase: self.phase,
            position: self.current + self.scroll + self.press_offset,
            delta: self.current - self.initial,
            pointer: self.last_pointer,
        });
    }
}
