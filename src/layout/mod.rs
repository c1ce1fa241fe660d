//! Word cloud placement.
//!
//! One pass runs weighting output through sizing and placement:
//! words are sorted by descending weight, each gets a rotation, a font size
//! relative to the batch and a padded box, then the spiral search commits it
//! to the shared collision index or drops it. Nothing placed is revisited.
//! Every pass starts from a fresh index, so re-running after a resize or new
//! submissions is just another call.

pub mod collision;
mod error;
pub mod scatter;
pub mod sizing;
pub mod spiral;
mod types;
pub mod weighting;

use std::sync::atomic::{AtomicBool, Ordering};

use rand::Rng;
use rand::seq::SliceRandom;

use crate::config::{LayoutConfig, LayoutStrategy};
use crate::ir::WeightedWord;
use crate::text_metrics::TextMeasure;
use crate::theme::Theme;

pub use error::{LayoutError, Result};
pub use sizing::WeightRange;
pub use spiral::Placement;
pub use types::{BoundingBox, CanvasSize, CloudLayout, LayoutStats, PlacedWord, SizedWord};
pub use weighting::{count_words, merge_weighted, normalize_word, weigh, weigh_submissions};

/// Lays out `words` on `canvas`. An invalid canvas or an empty word list
/// yields an empty layout; only measurement failures abort the pass.
pub fn compute_layout<R: Rng + ?Sized>(
    words: &[WeightedWord],
    canvas: CanvasSize,
    theme: &Theme,
    config: &LayoutConfig,
    measurer: &dyn TextMeasure,
    rng: &mut R,
) -> Result<CloudLayout> {
    LayoutPass::new(canvas, theme, config, measurer).run(words, rng, None)
}

/// Like [`compute_layout`], but gives up between words once `cancel` is set.
pub fn compute_layout_cancellable<R: Rng + ?Sized>(
    words: &[WeightedWord],
    canvas: CanvasSize,
    theme: &Theme,
    config: &LayoutConfig,
    measurer: &dyn TextMeasure,
    rng: &mut R,
    cancel: &AtomicBool,
) -> Result<CloudLayout> {
    LayoutPass::new(canvas, theme, config, measurer).run(words, rng, Some(cancel))
}

struct LayoutPass<'a> {
    canvas: CanvasSize,
    theme: &'a Theme,
    config: &'a LayoutConfig,
    measurer: &'a dyn TextMeasure,
}

impl<'a> LayoutPass<'a> {
    fn new(
        canvas: CanvasSize,
        theme: &'a Theme,
        config: &'a LayoutConfig,
        measurer: &'a dyn TextMeasure,
    ) -> Self {
        Self {
            canvas,
            theme,
            config,
            measurer,
        }
    }

    fn run<R: Rng + ?Sized>(
        &self,
        words: &[WeightedWord],
        rng: &mut R,
        cancel: Option<&AtomicBool>,
    ) -> Result<CloudLayout> {
        let canvas = self.canvas;
        if !canvas.is_valid() {
            tracing::warn!(
                width = canvas.width,
                height = canvas.height,
                "skipping layout for invalid canvas size"
            );
            return Ok(CloudLayout::empty(canvas));
        }

        let mut ordered: Vec<&WeightedWord> =
            words.iter().filter(|word| word.has_valid_weight()).collect();
        if ordered.len() < words.len() {
            tracing::warn!(
                skipped = words.len() - ordered.len(),
                "ignoring words with non-positive weight"
            );
        }
        let Some(range) = WeightRange::from_weights(ordered.iter().map(|word| word.weight)) else {
            return Ok(CloudLayout::empty(canvas));
        };
        // Stable sort: equal weights keep their input order.
        ordered.sort_by(|a, b| b.weight.total_cmp(&a.weight));

        let mut index = collision::new_index(self.config.collision_index, canvas);
        let mut layout = CloudLayout::empty(canvas);
        layout.stats.requested = ordered.len();

        for word in ordered {
            if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                tracing::debug!(placed = layout.words.len(), "layout pass cancelled");
                return Err(LayoutError::Cancelled {
                    placed: layout.words.len(),
                });
            }

            let rotation = self
                .config
                .rotation_set
                .choose(rng)
                .copied()
                .unwrap_or(0.0);
            let sized = sizing::size_word(
                word,
                range,
                rotation,
                &self.theme.font_family,
                self.config,
                self.measurer,
            )?;

            let position = match self.config.strategy {
                LayoutStrategy::Spiral => {
                    let placement = spiral::place(
                        sized.box_width,
                        sized.box_height,
                        index.as_mut(),
                        canvas,
                        &self.config.spiral,
                    );
                    layout.stats.iterations += placement.iterations();
                    match placement {
                        Placement::Placed { x, y, .. } => Some((x, y)),
                        Placement::Exhausted { .. } => None,
                    }
                }
                LayoutStrategy::Scatter => {
                    scatter::scatter_position(sized.box_width, sized.box_height, canvas, rng)
                }
            };

            match position {
                Some((x, y)) => {
                    let color = self.pick_color(word, rng);
                    layout.words.push(PlacedWord::from_sized(sized, x, y, color));
                }
                None => {
                    tracing::debug!(
                        word = %sized.text,
                        font_size = sized.font_size,
                        box_width = sized.box_width,
                        box_height = sized.box_height,
                        "no free slot, word dropped"
                    );
                    layout.dropped.push(sized.text);
                }
            }
        }

        layout.stats.placed = layout.words.len();
        layout.stats.dropped = layout.dropped.len();
        tracing::debug!(
            requested = layout.stats.requested,
            placed = layout.stats.placed,
            dropped = layout.stats.dropped,
            iterations = layout.stats.iterations,
            "layout pass finished"
        );
        Ok(layout)
    }

    fn pick_color<R: Rng + ?Sized>(&self, word: &WeightedWord, rng: &mut R) -> String {
        if let Some(color) = &word.color {
            return color.clone();
        }
        self.theme
            .word_colors
            .choose(rng)
            .cloned()
            .unwrap_or_else(|| self.theme.text_color.clone())
    }
}
