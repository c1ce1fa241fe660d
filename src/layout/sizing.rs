use crate::config::LayoutConfig;
use crate::ir::WeightedWord;
use crate::text_metrics::{MeasureError, TextMeasure};

use super::SizedWord;

/// Weight extent of the current batch; sizes are relative to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightRange {
    pub min: f32,
    pub max: f32,
}

impl WeightRange {
    pub fn of(words: &[WeightedWord]) -> Option<Self> {
        Self::from_weights(words.iter().map(|word| word.weight))
    }

    pub fn from_weights(weights: impl IntoIterator<Item = f32>) -> Option<Self> {
        let mut iter = weights.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), w| (min.min(w), max.max(w)));
        Some(Self { min, max })
    }

    /// Position of `weight` in the range, clamped to `[0, 1]`. A flat range
    /// maps everything to 1, so an all-equal batch renders at max size.
    pub fn fraction(&self, weight: f32) -> f32 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return 1.0;
        }
        ((weight - self.min) / span).clamp(0.0, 1.0)
    }
}

/// Interpolated font size in whole pixels, never below 1px.
pub fn font_size_for_weight(weight: f32, range: WeightRange, config: &LayoutConfig) -> f32 {
    let t = range.fraction(weight);
    (config.min_font_px + t * (config.max_font_px - config.min_font_px))
        .round()
        .max(1.0)
}

/// Axis-aligned extent of a `width x height` rectangle rotated by `angle`,
/// rounded up and padded on every side.
pub fn rotated_box(width: f32, height: f32, angle: f32, padding: f32) -> (f32, f32) {
    let cos = angle.cos().abs();
    let sin = angle.sin().abs();
    let box_width = (width * cos + height * sin).ceil() + 2.0 * padding;
    let box_height = (width * sin + height * cos).ceil() + 2.0 * padding;
    (box_width, box_height)
}

pub fn size_word(
    word: &WeightedWord,
    range: WeightRange,
    rotation: f32,
    font_family: &str,
    config: &LayoutConfig,
    measurer: &dyn TextMeasure,
) -> Result<SizedWord, MeasureError> {
    let font_size = font_size_for_weight(word.weight, range, config);
    let text_width = measurer.text_width(&word.text, font_family, font_size)?.ceil();
    // Ascent + descent approximation; good enough for Latin glyphs.
    let text_height = (font_size * config.line_height_factor).ceil();
    let (box_width, box_height) = rotated_box(text_width, text_height, rotation, config.padding_px);
    Ok(SizedWord {
        text: word.text.clone(),
        weight: word.weight,
        font_size,
        rotation,
        text_width,
        text_height,
        box_width,
        box_height,
    })
}
