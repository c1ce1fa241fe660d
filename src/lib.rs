#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod export;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod parser;
pub mod render;
pub mod session;
pub mod text_metrics;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;

use anyhow::Result;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::{Config, LayoutConfig, RenderConfig};
use crate::ir::WeightedWord;
use crate::layout::{CanvasSize, CloudLayout, compute_layout, weigh_submissions};
use crate::text_metrics::{HeuristicMeasurer, SystemFontMeasurer, TextMeasure};
use crate::theme::Theme;

/// Everything one render call needs besides the words.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
    /// Fixed seed for rotation and color picks; `None` draws from entropy.
    pub seed: Option<u64>,
    /// Use the width table instead of system fonts.
    pub fast_text: bool,
}

impl RenderOptions {
    pub fn from_config(config: Config) -> Self {
        Self {
            theme: config.theme,
            layout: config.layout,
            render: config.render,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.render.width = width;
        self.render.height = height;
        self
    }

    pub fn canvas(&self) -> CanvasSize {
        CanvasSize::new(self.render.width, self.render.height)
    }

    fn measurer(&self) -> Box<dyn TextMeasure> {
        if self.fast_text {
            Box::new(HeuristicMeasurer::default())
        } else {
            Box::new(SystemFontMeasurer)
        }
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

pub fn layout_with_options(words: &[WeightedWord], options: &RenderOptions) -> Result<CloudLayout> {
    let measurer = options.measurer();
    let layout = compute_layout(
        words,
        options.canvas(),
        &options.theme,
        &options.layout,
        measurer.as_ref(),
        &mut options.rng(),
    )?;
    Ok(layout)
}

pub fn render_with_options(words: &[WeightedWord], options: &RenderOptions) -> Result<String> {
    let layout = layout_with_options(words, options)?;
    Ok(render::render_svg(&layout, &options.theme))
}

/// Counts raw submissions with the configured weight scale and renders them.
pub fn render_submissions<I, S>(submissions: I, options: &RenderOptions) -> Result<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let words = weigh_submissions(submissions, &options.layout.weighting);
    render_with_options(&words, options)
}
