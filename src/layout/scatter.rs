//! Random scatter: every word gets an independent in-bounds position and
//! may overlap others. Kept as a cheap fallback next to the spiral search.

use rand::Rng;

use super::CanvasSize;

/// Uniform top-left for the box, or `None` when it cannot fit at all.
pub fn scatter_position<R: Rng + ?Sized>(
    box_width: f32,
    box_height: f32,
    canvas: CanvasSize,
    rng: &mut R,
) -> Option<(f32, f32)> {
    let free_x = canvas.width - box_width;
    let free_y = canvas.height - box_height;
    if free_x < 0.0 || free_y < 0.0 {
        return None;
    }
    let x = if free_x > 0.0 { rng.gen_range(0.0..=free_x) } else { 0.0 };
    let y = if free_y > 0.0 { rng.gen_range(0.0..=free_y) } else { 0.0 };
    // Snap inward so rounding never pushes the box past the far edge.
    Some((x.floor(), y.floor()))
}
