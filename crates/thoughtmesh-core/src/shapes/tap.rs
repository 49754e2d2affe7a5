//! Tap marker: short-lived feedback for background presses.

use super::{PATH_TOLERANCE, ShapeId, ShapeTrait, write_number};
use crate::geometry::{Box2, Vector2};
use crate::graph::{AttrValue, ShapeAttr};
use kurbo::{BezPath, Circle, Point, Shape as KurboShape};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const TAP_RADIUS: f64 = 12.0;

/// How far the press under the marker has been classified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TapState {
    #[default]
    Pending,
    Single,
    Double,
    Long,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tap {
    pub(crate) id: ShapeId,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub tap_state: TapState,
    /// Opacity in `[0, 1]`, lowered by the fade effect.
    #[serde(default = "full_opacity")]
    pub opacity: f64,
}

fn full_opacity() -> f64 {
    1.0
}

impl Tap {
    pub fn new(at: Vector2, tap_state: TapState) -> Self {
        Self {
            id: Uuid::new_v4(),
            x: at.x,
            y: at.y,
            tap_state,
            opacity: 1.0,
        }
    }

    pub fn center(&self) -> Vector2 {
        Vector2::new(self.x, self.y)
    }
}

impl ShapeTrait for Tap {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Box2 {
        Box2::from_center_size(
            self.center(),
            Vector2::new(TAP_RADIUS * 2.0, TAP_RADIUS * 2.0),
        )
    }

    fn hit_test(&self, _point: Vector2, _tolerance: f64) -> bool {
        false
    }

    fn to_path(&self) -> BezPath {
        // Double taps draw a second ring.
        let mut path = Circle::new(Point::new(self.x, self.y), TAP_RADIUS).to_path(PATH_TOLERANCE);
        if self.tap_state == TapState::Double {
            path.extend(
                Circle::new(Point::new(self.x, self.y), TAP_RADIUS * 1.5).path_elements(PATH_TOLERANCE),
            );
        }
        path
    }

    fn attr(&self, attr: ShapeAttr) -> Option<AttrValue> {
        match attr {
            ShapeAttr::X => Some(AttrValue::Number(self.x)),
            ShapeAttr::Y => Some(AttrValue::Number(self.y)),
            _ => None,
        }
    }

    fn set_attr(&mut self, attr: ShapeAttr, value: &AttrValue) -> bool {
        match attr {
            ShapeAttr::X => write_number(&mut self.x, value),
            ShapeAttr::Y => write_number(&mut self.y, value),
            _ => false,
        }
    }
}
