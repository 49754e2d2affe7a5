//! Pop shape: the burst left behind when a node is destroyed.

use super::{PATH_TOLERANCE, SerializableColor, ShapeId, ShapeTrait, write_color, write_number};
use crate::geometry::{Box2, Vector2};
use crate::graph::{AttrValue, ShapeAttr};
use kurbo::{Arc, BezPath, Point, Shape as KurboShape, Vec2};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use uuid::Uuid;

/// Default ring radius.
pub const DEFAULT_POP_RADIUS: f64 = 24.0;

/// A ring whose gap widens until it vanishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pop {
    pub(crate) id: ShapeId,
    pub x: f64,
    pub y: f64,
    /// Gap angle in radians. The ring is gone once this reaches 2π.
    pub theta: f64,
    pub color: SerializableColor,
    #[serde(default = "default_radius")]
    pub radius: f64,
}

fn default_radius() -> f64 {
    DEFAULT_POP_RADIUS
}

impl Pop {
    pub fn new(center: Vector2, color: SerializableColor) -> Self {
        Self {
            id: Uuid::new_v4(),
            x: center.x,
            y: center.y,
            theta: 0.0,
            color,
            radius: DEFAULT_POP_RADIUS,
        }
    }

    pub fn center(&self) -> Vector2 {
        Vector2::new(self.x, self.y)
    }

    /// Widen the gap by `step`. Returns true once the ring has closed out.
    pub fn advance(&mut self, step: f64) -> bool {
        self.theta = (self.theta + step).min(TAU);
        self.is_done()
    }

    pub fn is_done(&self) -> bool {
        self.theta >= TAU
    }
}

impl ShapeTrait for Pop {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Box2 {
        Box2::from_center_size(
            self.center(),
            Vector2::new(self.radius * 2.0, self.radius * 2.0),
        )
    }

    /// Bursts never take input.
    fn hit_test(&self, _point: Vector2, _tolerance: f64) -> bool {
        false
    }

    fn to_path(&self) -> BezPath {
        let sweep = TAU - self.theta.clamp(0.0, TAU);
        if sweep <= 0.0 {
            return BezPath::new();
        }
        Arc::new(
            Point::new(self.x, self.y),
            Vec2::new(self.radius, self.radius),
            self.theta / 2.0,
            sweep,
            0.0,
        )
        .to_path(PATH_TOLERANCE)
    }

    fn attr(&self, attr: ShapeAttr) -> Option<AttrValue> {
        match attr {
            ShapeAttr::X => Some(AttrValue::Number(self.x)),
            ShapeAttr::Y => Some(AttrValue::Number(self.y)),
            ShapeAttr::Color => Some(AttrValue::Color(self.color)),
            _ => None,
        }
    }

    fn set_attr(&mut self, attr: ShapeAttr, value: &AttrValue) -> bool {
        match attr {
            ShapeAttr::X => write_number(&mut self.x, value),
            ShapeAttr::Y => write_number(&mut self.y, value),
            ShapeAttr::Color => write_color(&mut self.color, value),
            _ => false,
        }
    }
}
