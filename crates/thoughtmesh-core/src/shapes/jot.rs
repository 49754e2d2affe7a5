//! Jot shape: the draggable marker that controls a node.

use super::{PATH_TOLERANCE, SerializableColor, ShapeId, ShapeTrait, write_color, write_number};
use crate::error::{EngineError, EngineResult};
use crate::geometry::{Box2, Vector2};
use crate::graph::{AttrValue, NodeId, ShapeAttr};
use kurbo::{BezPath, Circle, Point, Rect, RoundedRect, Shape as KurboShape};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Longest single-line text that still fits in a pill.
pub const PILL_MAX_CHARS: usize = 24;

/// Approximate advance of one character, used to size pills and rectangles.
const CHAR_WIDTH: f64 = 8.0;
/// Height of one text line inside a rectangle jot.
const LINE_HEIGHT: f64 = 18.0;

/// Outline of a jot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JotKind {
    /// Empty node.
    #[default]
    Circle,
    /// Short single-line label.
    Pill,
    /// Anything longer.
    Rectangle,
}

impl JotKind {
    /// Pick the outline that fits `text`.
    pub fn for_text(text: &str) -> Self {
        if text.is_empty() {
            JotKind::Circle
        } else if !text.contains('\n') && text.chars().count() <= PILL_MAX_CHARS {
            JotKind::Pill
        } else {
            JotKind::Rectangle
        }
    }
}

impl FromStr for JotKind {
    type Err = EngineError;

    fn from_str(s: &str) -> EngineResult<Self> {
        match s {
            "circle" => Ok(JotKind::Circle),
            "pill" => Ok(JotKind::Pill),
            "rectangle" => Ok(JotKind::Rectangle),
            other => Err(EngineError::UnknownJotKind(other.to_string())),
        }
    }
}

/// A draggable marker. Its position, color and text are overwritten from
/// the node it controls whenever dependents are applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Jot {
    pub(crate) id: ShapeId,
    /// Node moved when this jot is dragged.
    pub controls_node_id: NodeId,
    pub kind: JotKind,
    /// Center.
    pub x: f64,
    pub y: f64,
    /// Diameter of the circle outline, and height of the pill.
    pub size: f64,
    pub color: SerializableColor,
    #[serde(default)]
    pub text: String,
    /// Transient visual cue set while a shake effect runs.
    #[serde(default)]
    pub shaking: bool,
}

impl Jot {
    /// Create a circle jot controlling `node`.
    pub fn new(controls_node_id: NodeId, center: Vector2, size: f64, color: SerializableColor) -> Self {
        Self {
            id: Uuid::new_v4(),
            controls_node_id,
            kind: JotKind::Circle,
            x: center.x,
            y: center.y,
            size,
            color,
            text: String::new(),
            shaking: false,
        }
    }

    pub fn center(&self) -> Vector2 {
        Vector2::new(self.x, self.y)
    }

    /// Replace the text and re-derive the outline.
    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.kind = JotKind::for_text(text);
    }

    /// Width and height of the outline.
    pub fn extent(&self) -> (f64, f64) {
        match self.kind {
            JotKind::Circle => (self.size, self.size),
            JotKind::Pill => {
                let chars = self.text.chars().count() as f64;
                (self.size + chars * CHAR_WIDTH, self.size)
            }
            JotKind::Rectangle => {
                let widest = self
                    .text
                    .lines()
                    .map(|l| l.chars().count())
                    .max()
                    .unwrap_or(0)
                    .min(PILL_MAX_CHARS) as f64;
                let lines = self.text.lines().count().max(1) as f64;
                (
                    self.size + widest * CHAR_WIDTH,
                    self.size / 2.0 + lines * LINE_HEIGHT,
                )
            }
        }
    }

    fn rect(&self) -> Rect {
        let (w, h) = self.extent();
        Rect::from_center_size(Point::new(self.x, self.y), (w, h))
    }

    fn corner_radius(&self) -> f64 {
        match self.kind {
            JotKind::Circle | JotKind::Pill => self.size / 2.0,
            JotKind::Rectangle => self.size / 6.0,
        }
    }
}

impl ShapeTrait for Jot {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Box2 {
        let (w, h) = self.extent();
        Box2::from_center_size(self.center(), Vector2::new(w, h))
    }

    fn hit_test(&self, point: Vector2, tolerance: f64) -> bool {
        match self.kind {
            JotKind::Circle => point.distance_to(self.center()) <= self.size / 2.0 + tolerance,
            JotKind::Pill | JotKind::Rectangle => {
                let rect = self.rect().inflate(tolerance, tolerance);
                rect.contains(Point::from(point))
            }
        }
    }

    fn to_path(&self) -> BezPath {
        match self.kind {
            JotKind::Circle => {
                Circle::new(Point::new(self.x, self.y), self.size / 2.0).to_path(PATH_TOLERANCE)
            }
            JotKind::Pill | JotKind::Rectangle => {
                RoundedRect::from_rect(self.rect(), self.corner_radius()).to_path(PATH_TOLERANCE)
            }
        }
    }

    fn attr(&self, attr: ShapeAttr) -> Option<AttrValue> {
        match attr {
            ShapeAttr::X => Some(AttrValue::Number(self.x)),
            ShapeAttr::Y => Some(AttrValue::Number(self.y)),
            ShapeAttr::Color => Some(AttrValue::Color(self.color)),
            ShapeAttr::Text => Some(AttrValue::Text(self.text.clone())),
            _ => None,
        }
    }

    fn set_attr(&mut self, attr: ShapeAttr, value: &AttrValue) -> bool {
        match attr {
            ShapeAttr::X => write_number(&mut self.x, value),
            ShapeAttr::Y => write_number(&mut self.y, value),
            ShapeAttr::Color => write_color(&mut self.color, value),
            ShapeAttr::Text => match value.as_text() {
                Some(text) => {
                    self.set_text(text);
                    true
                }
                None => false,
            },
            _ => false,
        }
    }
}
