//! Outward spiral search for a free slot.
//!
//! The walk starts at the canvas center. Every step advances the angle by a
//! fixed amount and grows the radius by `step_size / (1 + decay * i)`, so
//! early turns are dense around the center and later turns reach further
//! with fewer samples. The first in-bounds, collision-free candidate wins.

use crate::config::SpiralConfig;

use super::collision::CollisionIndex;
use super::{BoundingBox, CanvasSize};

/// Offsets from the spiral origin, one per iteration.
#[derive(Debug, Clone)]
pub struct Spiral {
    config: SpiralConfig,
    iteration: usize,
    angle: f32,
    radius: f32,
}

impl Spiral {
    pub fn new(config: SpiralConfig) -> Self {
        Self {
            config,
            iteration: 0,
            angle: 0.0,
            radius: 0.0,
        }
    }
}

impl Iterator for Spiral {
    type Item = (f32, f32);

    fn next(&mut self) -> Option<Self::Item> {
        if self.iteration >= self.config.max_iterations {
            return None;
        }
        self.angle += self.config.angle_step;
        self.radius += self.config.step_size / (1.0 + self.config.decay * self.iteration as f32);
        self.iteration += 1;
        Some((self.radius * self.angle.cos(), self.radius * self.angle.sin()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.config.max_iterations.saturating_sub(self.iteration);
        (left, Some(left))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    Placed { x: f32, y: f32, iterations: usize },
    /// Budget spent (or the box can never fit); the word is dropped.
    Exhausted { iterations: usize },
}

impl Placement {
    pub fn iterations(&self) -> usize {
        match *self {
            Placement::Placed { iterations, .. } | Placement::Exhausted { iterations } => {
                iterations
            }
        }
    }
}

/// Finds a top-left for a `box_width x box_height` box and commits it to
/// `index` on success. Candidates are snapped to whole pixels.
pub fn place(
    box_width: f32,
    box_height: f32,
    index: &mut dyn CollisionIndex,
    canvas: CanvasSize,
    config: &SpiralConfig,
) -> Placement {
    if box_width > canvas.width || box_height > canvas.height {
        return Placement::Exhausted { iterations: 0 };
    }
    let (cx, cy) = canvas.center();
    for (step, (dx, dy)) in Spiral::new(*config).enumerate() {
        let x = (cx + dx - box_width / 2.0).round();
        let y = (cy + dy - box_height / 2.0).round();
        let candidate = BoundingBox::new(x, y, box_width, box_height);
        if !canvas.contains(&candidate) {
            continue;
        }
        if !index.collides(&candidate) {
            index.insert(candidate);
            return Placement::Placed {
                x,
                y,
                iterations: step + 1,
            };
        }
    }
    Placement::Exhausted {
        iterations: config.max_iterations,
    }
}
