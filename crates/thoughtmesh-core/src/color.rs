//! Position-derived node colors.

use crate::geometry::Vector2;
use crate::shapes::SerializableColor;
use peniko::Color;
use peniko::color::{AlphaColor, Oklch, Srgb};

/// Lightness shared by every generated color.
const LIGHTNESS: f32 = 0.78;
/// Chroma approached far from the origin.
const MAX_CHROMA: f32 = 0.14;
/// Distance at which chroma reaches about 63% of its maximum.
const CHROMA_FALLOFF: f64 = 400.0;

/// Color for a point on the canvas: hue follows the polar angle around the
/// origin and chroma saturates with distance. Pure function of `point`.
pub fn position_color(point: Vector2) -> SerializableColor {
    let hue = point.angle().to_degrees().rem_euclid(360.0) as f32;
    let saturation = 1.0 - (-point.length() / CHROMA_FALLOFF).exp();
    let chroma = MAX_CHROMA * saturation as f32;
    let color: Color = AlphaColor::<Oklch>::new([LIGHTNESS, chroma, hue, 1.0]).convert::<Srgb>();
    color.into()
}
