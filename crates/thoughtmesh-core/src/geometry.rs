//! 2D vector and axis-aligned box primitives.
//!
//! Plain value types shared by every other module. They convert to and from
//! kurbo types so renderers can use the engine's geometry directly.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// A 2D vector or point.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: f64,
    pub y: f64,
}

impl Vector2 {
    pub const ZERO: Vector2 = Vector2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Scale both components by `factor`.
    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    pub fn dot(self, other: Vector2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn length_squared(self) -> f64 {
        self.dot(self)
    }

    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }

    pub fn distance_to_squared(self, other: Vector2) -> f64 {
        (self - other).length_squared()
    }

    pub fn distance_to(self, other: Vector2) -> f64 {
        self.distance_to_squared(other).sqrt()
    }

    /// Angle of the vector from the positive x axis, in radians.
    pub fn angle(self) -> f64 {
        self.y.atan2(self.x)
    }

    /// Unit vector in the same direction. The zero vector stays zero.
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len < f64::EPSILON {
            return Self::ZERO;
        }
        self.scale(1.0 / len)
    }

    /// Linear interpolation towards `other` (`t = 0` is `self`, `t = 1` is `other`).
    pub fn lerp(self, other: Vector2, t: f64) -> Self {
        Self::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }

    /// Rotate this point around `center` by `angle` radians.
    pub fn rotate_around(self, center: Vector2, angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let d = self - center;
        Self::new(d.x * c - d.y * s + center.x, d.x * s + d.y * c + center.y)
    }

    /// Clamp into `bounds`. An empty box leaves the vector unchanged.
    pub fn clamp_to_box(self, bounds: &Box2) -> Self {
        if bounds.is_empty() {
            return self;
        }
        Self::new(
            self.x.clamp(bounds.min.x, bounds.max.x),
            self.y.clamp(bounds.min.y, bounds.max.y),
        )
    }
}

impl Add for Vector2 {
    type Output = Vector2;

    fn add(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vector2 {
    type Output = Vector2;

    fn sub(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vector2 {
    type Output = Vector2;

    fn mul(self, rhs: f64) -> Vector2 {
        self.scale(rhs)
    }
}

impl Neg for Vector2 {
    type Output = Vector2;

    fn neg(self) -> Vector2 {
        Vector2::new(-self.x, -self.y)
    }
}

impl AddAssign for Vector2 {
    fn add_assign(&mut self, rhs: Vector2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl SubAssign for Vector2 {
    fn sub_assign(&mut self, rhs: Vector2) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl From<kurbo::Point> for Vector2 {
    fn from(p: kurbo::Point) -> Self {
        Self::new(p.x, p.y)
    }
}

impl From<Vector2> for kurbo::Point {
    fn from(v: Vector2) -> Self {
        kurbo::Point::new(v.x, v.y)
    }
}

impl From<kurbo::Vec2> for Vector2 {
    fn from(v: kurbo::Vec2) -> Self {
        Self::new(v.x, v.y)
    }
}

impl From<Vector2> for kurbo::Vec2 {
    fn from(v: Vector2) -> Self {
        kurbo::Vec2::new(v.x, v.y)
    }
}

/// Axis-aligned bounding box. `min.x > max.x` (or the same on y) means empty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Box2 {
    pub min: Vector2,
    pub max: Vector2,
}

impl Default for Box2 {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Box2 {
    pub const EMPTY: Box2 = Box2 {
        min: Vector2::new(f64::INFINITY, f64::INFINITY),
        max: Vector2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
    };

    pub const fn new(min: Vector2, max: Vector2) -> Self {
        Self { min, max }
    }

    /// Box centered on `center` with the given full size.
    pub fn from_center_size(center: Vector2, size: Vector2) -> Self {
        let half = size.scale(0.5);
        Self::new(center - half, center + half)
    }

    /// Smallest box containing every point.
    pub fn from_points<I: IntoIterator<Item = Vector2>>(points: I) -> Self {
        let mut b = Self::EMPTY;
        for p in points {
            b.expand_by_point(p);
        }
        b
    }

    pub fn is_empty(&self) -> bool {
        self.max.x < self.min.x || self.max.y < self.min.y
    }

    pub fn expand_by_point(&mut self, p: Vector2) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    /// Grow the box by `amount` on every side.
    pub fn expand_by_scalar(&self, amount: f64) -> Self {
        if self.is_empty() {
            return *self;
        }
        Self::new(
            self.min - Vector2::new(amount, amount),
            self.max + Vector2::new(amount, amount),
        )
    }

    pub fn union(&self, other: &Box2) -> Self {
        Self::new(
            Vector2::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            Vector2::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        )
    }

    /// Overlap of two boxes; disjoint boxes give [`Box2::EMPTY`].
    pub fn intersect(&self, other: &Box2) -> Self {
        let b = Self::new(
            Vector2::new(self.min.x.max(other.min.x), self.min.y.max(other.min.y)),
            Vector2::new(self.max.x.min(other.max.x), self.max.y.min(other.max.y)),
        );
        if b.is_empty() { Self::EMPTY } else { b }
    }

    pub fn contains_point(&self, p: Vector2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn center(&self) -> Vector2 {
        if self.is_empty() {
            return Vector2::ZERO;
        }
        self.min.lerp(self.max, 0.5)
    }

    pub fn size(&self) -> Vector2 {
        if self.is_empty() {
            return Vector2::ZERO;
        }
        self.max - self.min
    }

    /// Position of `p` in box units (0 at `min`, 1 at `max`).
    ///
    /// A zero-size axis maps to 0 instead of dividing by zero.
    pub fn get_parameter(&self, p: Vector2) -> Vector2 {
        let size = self.size();
        let axis = |v: f64, min: f64, extent: f64| {
            if extent.abs() < f64::EPSILON { 0.0 } else { (v - min) / extent }
        };
        Vector2::new(
            axis(p.x, self.min.x, size.x),
            axis(p.y, self.min.y, size.y),
        )
    }

    /// Convert to a kurbo rectangle, `None` for an empty box.
    pub fn to_rect(&self) -> Option<kurbo::Rect> {
        if self.is_empty() {
            return None;
        }
        Some(kurbo::Rect::new(self.min.x, self.min.y, self.max.x, self.max.y))
    }
}

impl From<kurbo::Rect> for Box2 {
    fn from(r: kurbo::Rect) -> Self {
        let r = r.abs();
        Self::new(Vector2::new(r.x0, r.y0), Vector2::new(r.x1, r.y1))
    }
}

/// Distance from a point to the segment `a → b`.
pub fn distance_to_segment(point: Vector2, a: Vector2, b: Vector2) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.length_squared();
    if len_sq < f64::EPSILON {
        return pv.length();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    point.distance_to(a + seg.scale(t))
}

/// Test if the segments `a-b` and `c-d` intersect.
pub fn segments_intersect(a: Vector2, b: Vector2, c: Vector2, d: Vector2) -> bool {
    let cross = |o: Vector2, p: Vector2, q: Vector2| -> f64 {
        (p.x - o.x) * (q.y - o.y) - (p.y - o.y) * (q.x - o.x)
    };
    let d1 = cross(c, d, a);
    let d2 = cross(c, d, b);
    let d3 = cross(a, b, c);
    let d4 = cross(a, b, d);
    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }
    // Collinear: an endpoint lying on the other segment counts.
    let on_segment = |p: Vector2, q: Vector2, r: Vector2| -> bool {
        r.x >= p.x.min(q.x) && r.x <= p.x.max(q.x) && r.y >= p.y.min(q.y) && r.y <= p.y.max(q.y)
    };
    (d1.abs() < 1e-10 && on_segment(c, d, a))
        || (d2.abs() < 1e-10 && on_segment(c, d, b))
        || (d3.abs() < 1e-10 && on_segment(a, b, c))
        || (d4.abs() < 1e-10 && on_segment(a, b, d))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_vector_arithmetic() {
        let a = Vector2::new(1.0, 2.0);
        let b = Vector2::new(3.0, -1.0);
        assert_eq!(a + b, Vector2::new(4.0, 1.0));
        assert_eq!(a - b, Vector2::new(-2.0, 3.0));
        assert_eq!(a * 2.0, Vector2::new(2.0, 4.0));
        assert_eq!(-a, Vector2::new(-1.0, -2.0));
        assert!(approx(a.dot(b), 1.0));
        assert!(approx(Vector2::new(3.0, 4.0).length(), 5.0));
        assert!(approx(a.distance_to(b), 13.0_f64.sqrt()));
    }

    #[test]
    fn test_normalize_zero_is_noop() {
        assert_eq!(Vector2::ZERO.normalize(), Vector2::ZERO);
        let n = Vector2::new(0.0, 10.0).normalize();
        assert!(approx(n.x, 0.0));
        assert!(approx(n.y, 1.0));
    }

    #[test]
    fn test_lerp_and_rotate() {
        let a = Vector2::new(0.0, 0.0);
        let b = Vector2::new(10.0, 20.0);
        assert_eq!(a.lerp(b, 0.5), Vector2::new(5.0, 10.0));

        let p = Vector2::new(2.0, 1.0).rotate_around(Vector2::new(1.0, 1.0), std::f64::consts::FRAC_PI_2);
        assert!(approx(p.x, 1.0));
        assert!(approx(p.y, 2.0));
    }

    #[test]
    fn test_clamp_to_box() {
        let b = Box2::new(Vector2::new(0.0, 0.0), Vector2::new(10.0, 10.0));
        assert_eq!(Vector2::new(-5.0, 15.0).clamp_to_box(&b), Vector2::new(0.0, 10.0));
        // Empty box must not panic.
        let p = Vector2::new(-5.0, 15.0);
        assert_eq!(p.clamp_to_box(&Box2::EMPTY), p);
    }

    #[test]
    fn test_box_empty_and_expand() {
        let mut b = Box2::EMPTY;
        assert!(b.is_empty());
        assert_eq!(b.size(), Vector2::ZERO);
        assert_eq!(b.to_rect(), None);

        b.expand_by_point(Vector2::new(1.0, 2.0));
        assert!(!b.is_empty());
        b.expand_by_point(Vector2::new(-1.0, 5.0));
        assert_eq!(b.min, Vector2::new(-1.0, 2.0));
        assert_eq!(b.max, Vector2::new(1.0, 5.0));
        assert_eq!(b.center(), Vector2::new(0.0, 3.5));
    }

    #[test]
    fn test_box_union_intersect() {
        let a = Box2::new(Vector2::new(0.0, 0.0), Vector2::new(10.0, 10.0));
        let b = Box2::new(Vector2::new(5.0, 5.0), Vector2::new(20.0, 20.0));
        let c = Box2::new(Vector2::new(50.0, 50.0), Vector2::new(60.0, 60.0));

        let u = a.union(&b);
        assert_eq!(u.min, Vector2::new(0.0, 0.0));
        assert_eq!(u.max, Vector2::new(20.0, 20.0));
        assert_eq!(Box2::EMPTY.union(&a), a);

        let i = a.intersect(&b);
        assert_eq!(i.min, Vector2::new(5.0, 5.0));
        assert_eq!(i.max, Vector2::new(10.0, 10.0));
        assert!(a.intersect(&c).is_empty());

        assert!(a.contains_point(Vector2::new(10.0, 0.0)));
        assert!(!a.contains_point(Vector2::new(10.1, 0.0)));
    }

    #[test]
    fn test_get_parameter_zero_size() {
        let flat = Box2::new(Vector2::new(0.0, 5.0), Vector2::new(10.0, 5.0));
        let t = flat.get_parameter(Vector2::new(5.0, 5.0));
        assert!(approx(t.x, 0.5));
        assert!(approx(t.y, 0.0));
        assert!(t.y.is_finite());
    }

    #[test]
    fn test_distance_to_segment() {
        let a = Vector2::new(0.0, 0.0);
        let b = Vector2::new(10.0, 0.0);
        assert!(approx(distance_to_segment(Vector2::new(5.0, 3.0), a, b), 3.0));
        assert!(approx(distance_to_segment(Vector2::new(-4.0, 3.0), a, b), 5.0));
        // Degenerate segment.
        assert!(approx(distance_to_segment(Vector2::new(3.0, 4.0), a, a), 5.0));
    }

    #[test]
    fn test_segments_intersect() {
        let a = Vector2::new(0.0, 0.0);
        let b = Vector2::new(10.0, 10.0);
        assert!(segments_intersect(a, b, Vector2::new(0.0, 10.0), Vector2::new(10.0, 0.0)));
        assert!(!segments_intersect(a, b, Vector2::new(20.0, 0.0), Vector2::new(30.0, 0.0)));
    }

    #[test]
    fn test_kurbo_roundtrip() {
        let v = Vector2::new(1.5, -2.5);
        let p: kurbo::Point = v.into();
        assert_eq!(Vector2::from(p), v);
        let r = Box2::new(Vector2::new(0.0, 0.0), Vector2::new(4.0, 3.0)).to_rect().unwrap();
        assert!(approx(r.area(), 12.0));
    }
}
