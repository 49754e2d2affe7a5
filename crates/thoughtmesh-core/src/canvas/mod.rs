//! Canvas runtime: routes pointer input through per-pointer recognizers into
//! graph mutations and runs the effects that follow.
//!
//! Everything happens on the caller's thread. [`Canvas::handle_pointer`] and
//! [`Canvas::tick`] run to completion, and the graph is re-applied before
//! either returns, so the render list never shows a half-applied mutation.

mod effects;
mod interaction;

pub use effects::{BreakLineEffect, PopEffect, ShakeEffect, TapFadeEffect};

use crate::animation::{EffectId, Scheduler};
use crate::camera::Camera;
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::events::{CutMode, EngineEvent};
use crate::geometry::Vector2;
use crate::gesture::{GestureEvent, GestureKind, GestureState};
use crate::graph::{Graph, NodeId};
use crate::input::{PointerEvent, PointerEventKind, PointerId};
use crate::mutation::{self, BumpOutcome};
use crate::shapes::{LineType, SerializableColor, Shape, ShapeId, ShapeKind, ShapeTrait, TapState};
use interaction::{Interaction, Target};
use std::collections::HashMap;

#[cfg(target_arch = "wasm32")]
use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

/// State shared with running effects.
#[derive(Debug, Default)]
pub struct Scene {
    pub graph: Graph,
    /// Commands queued by effects, dispatched at the end of the tick.
    pub commands: Vec<EngineEvent>,
}

/// The interaction engine for one canvas.
#[derive(Debug)]
pub struct Canvas {
    config: EngineConfig,
    scene: Scene,
    scheduler: Scheduler<Scene>,
    camera: Camera,
    interactions: HashMap<PointerId, Interaction>,
    mode: CutMode,
    /// Last time the cut cone moved or was released.
    cone_moved_at: Option<Instant>,
    shakes: HashMap<ShapeId, EffectId>,
    events: Vec<EngineEvent>,
    last_now: Option<Instant>,
}

impl Canvas {
    /// Create an empty canvas. Fails if the configuration is inconsistent.
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            scene: Scene::default(),
            scheduler: Scheduler::new(),
            camera: Camera::new(),
            interactions: HashMap::new(),
            mode: CutMode::Create,
            cone_moved_at: None,
            shakes: HashMap::new(),
            events: Vec::new(),
            last_now: None,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn graph(&self) -> &Graph {
        &self.scene.graph
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn mode(&self) -> CutMode {
        self.mode
    }

    /// Live shapes in render order.
    pub fn shapes(&self) -> impl Iterator<Item = &Shape> {
        self.scene.graph.shapes_ordered()
    }

    /// Take the semantic events published since the last call, in order.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    /// Running effects.
    pub fn active_effects(&self) -> usize {
        self.scheduler.len()
    }

    /// Whether `pointer` is currently dragging.
    pub fn is_dragging(&self, pointer: PointerId) -> bool {
        self.interactions
            .get(&pointer)
            .is_some_and(|i| i.gesture.is_dragging())
    }

    /// Earliest gesture timer across all pointers, for sleeping event loops.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.interactions
            .values()
            .filter_map(|i| i.gesture.next_deadline())
            .min()
    }

    /// Feed one pointer event. Positions are in screen coordinates.
    pub fn handle_pointer(&mut self, event: &PointerEvent, now: Instant) {
        self.last_now = Some(now);
        let pointer = event.pointer_id;
        let existing = self
            .interactions
            .remove(&pointer)
            .filter(|i| !i.gesture.is_idle());
        let mut interaction = match existing {
            Some(interaction) => interaction,
            None if event.kind == PointerEventKind::Down && event.is_primary() => {
                self.open_interaction(event)
            }
            None => {
                log::trace!("No interaction for {:?} from pointer {pointer}", event.kind);
                return;
            }
        };

        let gestures = interaction.gesture.handle(event, now);
        for gesture in &gestures {
            self.route(&mut interaction, gesture, now);
        }
        self.keep_or_close(pointer, interaction, now);
        self.scene.graph.apply_all();
    }

    /// Advance time: fire gesture timers, step effects, apply queued
    /// commands and settle the cut cone.
    pub fn tick(&mut self, now: Instant) {
        self.last_now = Some(now);
        let mut pointers: Vec<PointerId> = self.interactions.keys().copied().collect();
        pointers.sort_unstable();
        for pointer in pointers {
            let Some(mut interaction) = self.interactions.remove(&pointer) else {
                continue;
            };
            let gestures = interaction.gesture.poll(now);
            for gesture in &gestures {
                self.route(&mut interaction, gesture, now);
            }
            self.keep_or_close(pointer, interaction, now);
        }

        self.scheduler.tick(&mut self.scene, now);
        for command in std::mem::take(&mut self.scene.commands) {
            if let Err(err) = self.dispatch(command) {
                log::warn!("Queued command failed: {err}");
            }
        }
        self.shakes.retain(|_, id| self.scheduler.is_running(*id));
        self.settle_cone(now);
        self.scene.graph.apply_all();
    }

    /// Apply a semantic event as a command and publish it.
    ///
    /// `createNode` carries no position, so it is accepted as a notification
    /// only; use [`Canvas::create_node`] to create nodes.
    pub fn dispatch(&mut self, event: EngineEvent) -> EngineResult<()> {
        match event {
            EngineEvent::NodeMoved { node_id, x, y } => {
                self.move_node(node_id, Vector2::new(x, y))?;
            }
            EngineEvent::CreateNode { node_id } => {
                log::debug!("Ignoring createNode command for {node_id}");
            }
            EngineEvent::DestroyNode { node_id } => {
                if !self.destroy_node(node_id) {
                    return Err(EngineError::NodeNotFound(node_id));
                }
            }
            EngineEvent::SelectLine { shape_id } => {
                mutation::select_line(&mut self.scene.graph, shape_id)?;
                self.publish(event);
            }
            EngineEvent::Bump {
                shape_id,
                line_type,
            } => {
                mutation::set_line_type(&mut self.scene.graph, shape_id, line_type)?;
                self.publish(event);
            }
            EngineEvent::DeleteLine { shape_id } => {
                mutation::delete_line(&mut self.scene.graph, shape_id)?;
                self.publish(event);
            }
            EngineEvent::SetCutMode { mode } => self.set_mode(mode, self.last_now),
        }
        self.scene.graph.apply_all();
        Ok(())
    }

    /// Create a node at a world position and publish `createNode`.
    pub fn create_node(
        &mut self,
        at: Vector2,
        color: Option<SerializableColor>,
    ) -> EngineResult<NodeId> {
        let id = mutation::create_node_at(&mut self.scene.graph, &self.config, at, color)?;
        self.publish(EngineEvent::CreateNode { node_id: id });
        Ok(id)
    }

    /// Create a node on the spiral around `origin` and publish `createNode`.
    pub fn create_node_around(&mut self, origin: NodeId) -> EngineResult<NodeId> {
        let id = mutation::create_node_around(&mut self.scene.graph, &self.config, origin)?;
        self.publish(EngineEvent::CreateNode { node_id: id });
        Ok(id)
    }

    /// Destroy a node, leaving a pop burst in its place. Returns false when
    /// the node does not exist.
    pub fn destroy_node(&mut self, id: NodeId) -> bool {
        let Some(gone) = mutation::destroy_node(&mut self.scene.graph, id) else {
            return false;
        };
        match self.spawn_transient(ShapeKind::Pop, gone.position, gone.color) {
            Ok(pop) => {
                self.scheduler
                    .spawn(PopEffect::new(pop, self.config.pop_step));
            }
            Err(err) => log::warn!("Could not spawn pop for node {id}: {err}"),
        }
        self.publish(EngineEvent::DestroyNode { node_id: id });
        true
    }

    pub fn set_node_text(&mut self, id: NodeId, text: &str) -> EngineResult<()> {
        self.scene.graph.set_node_text(id, text)
    }

    /// Move a node, evaluate its bumps, and publish the results.
    pub fn move_node(&mut self, id: NodeId, to: Vector2) -> EngineResult<()> {
        mutation::move_node(&mut self.scene.graph, id, to)?;
        self.publish(EngineEvent::NodeMoved {
            node_id: id,
            x: to.x,
            y: to.y,
        });
        let outcome = mutation::update_bumps(&mut self.scene.graph, &self.config, id)?;
        self.after_bump(outcome);
        Ok(())
    }

    fn after_bump(&mut self, outcome: BumpOutcome) {
        for line in outcome.bumped {
            self.publish(EngineEvent::Bump {
                shape_id: line,
                line_type: LineType::Strong,
            });
        }
        for jot in outcome.shaken {
            let running = self
                .shakes
                .get(&jot)
                .is_some_and(|id| self.scheduler.is_running(*id));
            if !running {
                let effect = ShakeEffect::new(jot, self.config.shake_duration());
                self.shakes.insert(jot, self.scheduler.spawn(effect));
            }
        }
    }

    fn spawn_transient(
        &mut self,
        kind: ShapeKind,
        at: Vector2,
        color: SerializableColor,
    ) -> EngineResult<ShapeId> {
        let shape = Shape::transient(kind, at, color)?;
        self.scene.graph.create_shape(shape)
    }

    fn publish(&mut self, event: EngineEvent) {
        log::debug!("Publishing {event:?}");
        self.events.push(event);
    }

    fn set_mode(&mut self, mode: CutMode, now: Option<Instant>) {
        if self.mode == mode {
            return;
        }
        self.mode = mode;
        self.cone_moved_at = match mode {
            CutMode::Cut => now,
            CutMode::Create => None,
        };
        log::info!("Switched to {mode:?} mode");
        self.publish(EngineEvent::SetCutMode { mode });
    }

    /// Return to create mode once the cone has been still long enough. The
    /// cone never settles while a background press is held.
    fn settle_cone(&mut self, now: Instant) {
        if self.mode != CutMode::Cut {
            return;
        }
        if self.interactions.values().any(Interaction::is_background) {
            return;
        }
        let since = *self.cone_moved_at.get_or_insert(now);
        if now.saturating_duration_since(since) >= self.config.cone_hold() {
            self.set_mode(CutMode::Create, Some(now));
        }
    }

    fn hit_target(&self, world: Vector2) -> Target {
        let graph = &self.scene.graph;
        let jot = graph
            .shapes_at_point(world, 0.0)
            .into_iter()
            .find_map(|id| {
                graph
                    .jot(id)
                    .map(|j| Target::Jot(j.controls_node_id))
            });
        if let Some(target) = jot {
            return target;
        }
        if self.mode == CutMode::Create {
            let tolerance = self.config.line_hit_tolerance;
            let nearest = graph
                .shapes_ordered()
                .filter_map(Shape::as_line)
                .filter(|l| l.hit_test(world, tolerance))
                .min_by(|a, b| a.distance_to(world).total_cmp(&b.distance_to(world)));
            if let Some(line) = nearest {
                return Target::Line(line.id);
            }
        }
        Target::Background
    }

    fn open_interaction(&mut self, event: &PointerEvent) -> Interaction {
        let scroll = self.camera.scroll;
        let world = self.camera.screen_to_world(event.position);
        let target = self.hit_target(world);
        let mut gesture = match target {
            Target::Jot(node) => {
                let anchor = self.scene.graph.node(node).map_or(world, |n| n.position);
                GestureState::with_anchor(self.config.jot_gesture.clone(), anchor)
            }
            Target::Line(_) => GestureState::new(self.config.line_gesture.clone()),
            Target::Background => GestureState::new(self.config.canvas_gesture.clone()),
        };
        gesture.set_scroll(scroll);
        log::trace!("Pointer {} pressed {target:?}", event.pointer_id);

        let mut interaction = Interaction::new(target, gesture, scroll, world);
        if target == Target::Background {
            interaction.marker = self
                .spawn_transient(ShapeKind::Tap, world, SerializableColor::black())
                .ok();
        }
        interaction
    }

    fn keep_or_close(&mut self, pointer: PointerId, mut interaction: Interaction, now: Instant) {
        if !interaction.gesture.is_idle() {
            self.interactions.insert(pointer, interaction);
            return;
        }
        self.release_marker(&mut interaction, None);
        if interaction.is_background() && self.mode == CutMode::Cut {
            self.cone_moved_at = Some(now);
        }
    }

    /// Start fading the press marker, optionally recording how it resolved.
    fn release_marker(&mut self, interaction: &mut Interaction, state: Option<TapState>) {
        let Some(marker) = interaction.marker.take() else {
            return;
        };
        if let (Some(state), Some(Shape::Tap(tap))) = (state, self.scene.graph.shape_mut(marker)) {
            tap.tap_state = state;
        }
        self.scheduler
            .spawn(TapFadeEffect::new(marker, self.config.tap_fade_frames));
    }

    fn route(&mut self, interaction: &mut Interaction, gesture: &GestureEvent, now: Instant) {
        match interaction.target {
            Target::Background => self.on_background(interaction, gesture, now),
            Target::Jot(node) => self.on_jot(node, gesture),
            Target::Line(line) => self.on_line(line, gesture),
        }
    }

    fn on_background(&mut self, interaction: &mut Interaction, gesture: &GestureEvent, now: Instant) {
        match gesture.kind {
            GestureKind::Tap => {
                self.release_marker(interaction, Some(TapState::Single));
                if self.mode == CutMode::Create {
                    if let Err(err) = self.create_node(gesture.position, None) {
                        log::warn!("Tap could not create a node: {err}");
                    }
                }
            }
            GestureKind::LongDown => {
                self.release_marker(interaction, Some(TapState::Long));
                let next = match self.mode {
                    CutMode::Create => CutMode::Cut,
                    CutMode::Cut => CutMode::Create,
                };
                self.set_mode(next, Some(now));
            }
            GestureKind::DragStart | GestureKind::DragMove | GestureKind::DragEnd => {
                if gesture.kind == GestureKind::DragStart {
                    self.release_marker(interaction, None);
                }
                match self.mode {
                    CutMode::Create => {
                        self.camera.scroll = interaction.scroll_at_press;
                        self.camera.pan(gesture.delta);
                    }
                    CutMode::Cut => {
                        let broken = mutation::cut_lines(
                            &mut self.scene.graph,
                            &self.config,
                            interaction.last_world,
                            gesture.position,
                        );
                        for line in broken {
                            log::debug!("Line {line} is breaking");
                            self.scheduler
                                .spawn(BreakLineEffect::new(line, self.config.break_steps));
                        }
                        interaction.last_world = gesture.position;
                        self.cone_moved_at = Some(now);
                    }
                }
            }
            _ => {}
        }
    }

    fn on_jot(&mut self, node: NodeId, gesture: &GestureEvent) {
        if self.scene.graph.node(node).is_none() {
            log::trace!("Ignoring {:?} on destroyed node {node}", gesture.kind);
            return;
        }
        let result = match gesture.kind {
            GestureKind::DragStart | GestureKind::DragMove | GestureKind::DragEnd => {
                self.move_node(node, gesture.position)
            }
            GestureKind::TapTap => self.create_node_around(node).map(|_| ()),
            GestureKind::LongDown => {
                self.destroy_node(node);
                Ok(())
            }
            _ => Ok(()),
        };
        if let Err(err) = result {
            log::warn!("{:?} on node {node} failed: {err}", gesture.kind);
        }
    }

    fn on_line(&mut self, line: ShapeId, gesture: &GestureEvent) {
        let result = match gesture.kind {
            GestureKind::Tap => self.dispatch(EngineEvent::SelectLine { shape_id: line }),
            GestureKind::TapTap => {
                mutation::toggle_line_disabled(&mut self.scene.graph, line).map(|t| {
                    log::debug!("Line {line} is now {t:?}");
                })
            }
            _ => Ok(()),
        };
        if let Err(err) = result {
            log::warn!("{:?} on line {line} failed: {err}", gesture.kind);
        }
    }
}
