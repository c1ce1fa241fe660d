use serde::{Deserialize, Serialize};

/// Canvas extent in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f32,
    pub height: f32,
}

impl CanvasSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    pub fn center(&self) -> (f32, f32) {
        (self.width / 2.0, self.height / 2.0)
    }

    /// True when `rect` lies fully inside `[0, width] x [0, height]`.
    pub fn contains(&self, rect: &BoundingBox) -> bool {
        rect.x >= 0.0 && rect.y >= 0.0 && rect.right() <= self.width && rect.bottom() <= self.height
    }
}

/// Axis-aligned box, already inflated by padding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl BoundingBox {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Strict overlap: boxes that only share an edge do not intersect.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Inclusive on every edge.
    pub fn contains_point(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.right() && py >= self.y && py <= self.bottom()
    }
}

/// A label with its size and rotation resolved, before placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizedWord {
    pub text: String,
    pub weight: f32,
    pub font_size: f32,
    /// Radians, positive is clockwise in screen space.
    pub rotation: f32,
    /// Unrotated text extent, without padding.
    pub text_width: f32,
    pub text_height: f32,
    /// Rotated extent including padding on both sides.
    pub box_width: f32,
    pub box_height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedWord {
    pub text: String,
    pub weight: f32,
    pub font_size: f32,
    pub rotation: f32,
    pub text_width: f32,
    pub text_height: f32,
    pub box_width: f32,
    pub box_height: f32,
    /// Top-left of the padded, rotated bounding box.
    pub x: f32,
    pub y: f32,
    pub color: String,
}

impl PlacedWord {
    pub(crate) fn from_sized(word: SizedWord, x: f32, y: f32, color: String) -> Self {
        Self {
            text: word.text,
            weight: word.weight,
            font_size: word.font_size,
            rotation: word.rotation,
            text_width: word.text_width,
            text_height: word.text_height,
            box_width: word.box_width,
            box_height: word.box_height,
            x,
            y,
            color,
        }
    }

    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::new(self.x, self.y, self.box_width, self.box_height)
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.box_width / 2.0, self.y + self.box_height / 2.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutStats {
    /// Words handed to the pass with a usable weight.
    pub requested: usize,
    pub placed: usize,
    /// Words whose search budget ran out (or that can never fit).
    pub dropped: usize,
    /// Spiral steps taken across all words.
    pub iterations: usize,
}

/// Output of one placement pass. `words` is in placement order, which is
/// also paint order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudLayout {
    pub canvas: CanvasSize,
    pub words: Vec<PlacedWord>,
    pub dropped: Vec<String>,
    pub stats: LayoutStats,
}

impl CloudLayout {
    pub fn empty(canvas: CanvasSize) -> Self {
        Self {
            canvas,
            words: Vec::new(),
            dropped: Vec::new(),
            stats: LayoutStats::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Front-most word under the point. Later words are smaller and sit
    /// among the larger ones, so the scan runs back to front.
    pub fn hit_test(&self, px: f32, py: f32) -> Option<&PlacedWord> {
        self.words
            .iter()
            .rev()
            .find(|word| word.bounds().contains_point(px, py))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placed(text: &str, x: f32, y: f32, w: f32, h: f32) -> PlacedWord {
        PlacedWord {
            text: text.to_string(),
            weight: 1.0,
            font_size: 18.0,
            rotation: 0.0,
            text_width: w,
            text_height: h,
            box_width: w,
            box_height: h,
            x,
            y,
            color: "#000".to_string(),
        }
    }

    #[test]
    fn touching_boxes_do_not_intersect() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(10.0, 0.0, 10.0, 10.0);
        let c = BoundingBox::new(9.5, 9.5, 10.0, 10.0);
        assert!(!a.intersects(&b));
        assert!(a.intersects(&c));
        assert!(c.intersects(&a));
    }

    #[test]
    fn canvas_validity() {
        assert!(CanvasSize::new(10.0, 10.0).is_valid());
        assert!(!CanvasSize::new(0.0, 10.0).is_valid());
        assert!(!CanvasSize::new(10.0, -1.0).is_valid());
        assert!(!CanvasSize::new(f32::INFINITY, 10.0).is_valid());
    }

    #[test]
    fn canvas_contains_is_inclusive_of_edges() {
        let canvas = CanvasSize::new(100.0, 50.0);
        assert!(canvas.contains(&BoundingBox::new(0.0, 0.0, 100.0, 50.0)));
        assert!(!canvas.contains(&BoundingBox::new(-1.0, 0.0, 10.0, 10.0)));
        assert!(!canvas.contains(&BoundingBox::new(95.0, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn hit_test_prefers_most_recently_placed() {
        let mut layout = CloudLayout::empty(CanvasSize::new(200.0, 200.0));
        layout.words.push(placed("big", 0.0, 0.0, 100.0, 100.0));
        layout.words.push(placed("small", 40.0, 40.0, 20.0, 20.0));
        assert_eq!(layout.hit_test(50.0, 50.0).unwrap().text, "small");
        assert_eq!(layout.hit_test(5.0, 5.0).unwrap().text, "big");
        assert!(layout.hit_test(150.0, 150.0).is_none());
    }
}
