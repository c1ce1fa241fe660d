use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEG: f32 = std::f32::consts::PI / 180.0;

/// Mostly upright, some tilted: four zeros against four tilts.
pub const DEFAULT_ROTATIONS: [f32; 8] = [
    0.0,
    0.0,
    0.0,
    0.0,
    -10.0 * DEG,
    10.0 * DEG,
    -20.0 * DEG,
    20.0 * DEG,
];

/// Maps an occurrence count to a layout weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum WeightScale {
    /// `base + (count - 1) * increment`
    Linear { base: f32, increment: f32 },
    /// `count * factor`
    Proportional { factor: f32 },
    /// `base + factor * ln(count)`, compresses runaway counts.
    Logarithmic { base: f32, factor: f32 },
}

impl Default for WeightScale {
    fn default() -> Self {
        WeightScale::Linear {
            base: 1.0,
            increment: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LayoutStrategy {
    /// Collision-free spiral search, the reference behavior.
    #[default]
    Spiral,
    /// Random positions with no collision avoidance.
    Scatter,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CollisionIndexKind {
    #[default]
    Linear,
    Grid { cell_size: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpiralConfig {
    /// Angle added per iteration, radians.
    pub angle_step: f32,
    /// Radius growth of the first iteration.
    pub step_size: f32,
    /// Radius growth at iteration `i` is `step_size / (1 + decay * i)`.
    pub decay: f32,
    pub max_iterations: usize,
}

impl Default for SpiralConfig {
    fn default() -> Self {
        Self {
            angle_step: 0.35,
            step_size: 3.0,
            decay: 0.003,
            max_iterations: 3000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub min_font_px: f32,
    pub max_font_px: f32,
    pub padding_px: f32,
    /// Rotation candidates in radians, drawn uniformly. Repeat an angle to
    /// bias towards it.
    pub rotation_set: Vec<f32>,
    /// Glyph box height as a multiple of the font size (ascent + descent).
    pub line_height_factor: f32,
    pub spiral: SpiralConfig,
    pub strategy: LayoutStrategy,
    pub collision_index: CollisionIndexKind,
    pub weighting: WeightScale,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            min_font_px: 18.0,
            max_font_px: 110.0,
            padding_px: 3.0,
            rotation_set: DEFAULT_ROTATIONS.to_vec(),
            line_height_factor: 1.05,
            spiral: SpiralConfig::default(),
            strategy: LayoutStrategy::Spiral,
            collision_index: CollisionIndexKind::Linear,
            weighting: WeightScale::default(),
        }
    }
}

impl LayoutConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(self.min_font_px.is_finite() && self.min_font_px > 0.0) {
            anyhow::bail!("minFontPx must be positive, got {}", self.min_font_px);
        }
        if !(self.max_font_px.is_finite() && self.max_font_px >= self.min_font_px) {
            anyhow::bail!(
                "maxFontPx ({}) must be at least minFontPx ({})",
                self.max_font_px,
                self.min_font_px
            );
        }
        if !(self.padding_px.is_finite() && self.padding_px >= 0.0) {
            anyhow::bail!("paddingPx must not be negative, got {}", self.padding_px);
        }
        if self.rotation_set.iter().any(|angle| !angle.is_finite()) {
            anyhow::bail!("rotationSet contains a non-finite angle");
        }
        if !(self.line_height_factor.is_finite() && self.line_height_factor > 0.0) {
            anyhow::bail!("lineHeightFactor must be positive");
        }
        let spiral = &self.spiral;
        if !(spiral.step_size.is_finite() && spiral.step_size > 0.0) {
            anyhow::bail!("spiralStepSize must be positive, got {}", spiral.step_size);
        }
        if !(spiral.decay.is_finite() && spiral.decay >= 0.0) {
            anyhow::bail!("spiralDecay must not be negative, got {}", spiral.decay);
        }
        if !(spiral.angle_step.is_finite() && spiral.angle_step != 0.0) {
            anyhow::bail!("spiralAngleStep must be non-zero");
        }
        if spiral.max_iterations == 0 {
            anyhow::bail!("maxIterationsPerWord must be at least 1");
        }
        if let CollisionIndexKind::Grid { cell_size } = self.collision_index
            && !(cell_size.is_finite() && cell_size > 0.0)
        {
            anyhow::bail!("gridCellSize must be positive, got {cell_size}");
        }
        self.weighting.validate().map_err(anyhow::Error::msg)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 550.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.theme.word_colors.is_empty() {
            anyhow::bail!("wordColorPalette must contain at least one color");
        }
        self.layout.validate()
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    background_color: Option<String>,
    word_color_palette: Option<Vec<String>>,
    font_family: Option<String>,
    text_color: Option<String>,
    min_font_px: Option<f32>,
    max_font_px: Option<f32>,
    padding_px: Option<f32>,
    rotation_set: Option<Vec<f32>>,
    rotation_set_degrees: Option<Vec<f32>>,
    line_height_factor: Option<f32>,
    spiral_angle_step: Option<f32>,
    spiral_step_size: Option<f32>,
    spiral_decay: Option<f32>,
    max_iterations_per_word: Option<usize>,
    strategy: Option<LayoutStrategy>,
    collision_index: Option<IndexName>,
    grid_cell_size: Option<f32>,
    weighting: Option<WeightScale>,
    width: Option<f32>,
    height: Option<f32>,
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(rename_all = "camelCase")]
enum IndexName {
    Linear,
    Grid,
}

const DEFAULT_GRID_CELL: f32 = 64.0;

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Parses a JSON5 config document on top of the defaults.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = json5::from_str(contents)?;
    let mut config = Config::default();

    if let Some(theme_name) = parsed.theme.as_deref() {
        config.theme = Theme::by_id(theme_name)
            .ok_or_else(|| anyhow::anyhow!("unknown theme `{theme_name}`"))?;
    }
    if let Some(v) = parsed.background_color {
        config.theme.background = v;
    }
    if let Some(v) = parsed.word_color_palette {
        config.theme.word_colors = v;
    }
    if let Some(v) = parsed.font_family {
        config.theme.font_family = v;
    }
    if let Some(v) = parsed.text_color {
        config.theme.text_color = v;
    }

    let layout = &mut config.layout;
    if let Some(v) = parsed.min_font_px {
        layout.min_font_px = v;
    }
    if let Some(v) = parsed.max_font_px {
        layout.max_font_px = v;
    }
    if let Some(v) = parsed.padding_px {
        layout.padding_px = v;
    }
    match (parsed.rotation_set, parsed.rotation_set_degrees) {
        (Some(_), Some(_)) => {
            anyhow::bail!("rotationSet and rotationSetDegrees are mutually exclusive")
        }
        (Some(radians), None) => layout.rotation_set = radians,
        (None, Some(degrees)) => {
            layout.rotation_set = degrees.into_iter().map(|deg| deg * DEG).collect()
        }
        (None, None) => {}
    }
    if let Some(v) = parsed.line_height_factor {
        layout.line_height_factor = v;
    }
    if let Some(v) = parsed.spiral_angle_step {
        layout.spiral.angle_step = v;
    }
    if let Some(v) = parsed.spiral_step_size {
        layout.spiral.step_size = v;
    }
    if let Some(v) = parsed.spiral_decay {
        layout.spiral.decay = v;
    }
    if let Some(v) = parsed.max_iterations_per_word {
        layout.spiral.max_iterations = v;
    }
    if let Some(v) = parsed.strategy {
        layout.strategy = v;
    }
    match (parsed.collision_index, parsed.grid_cell_size) {
        (Some(IndexName::Linear), _) => layout.collision_index = CollisionIndexKind::Linear,
        (Some(IndexName::Grid), cell) | (None, cell @ Some(_)) => {
            layout.collision_index = CollisionIndexKind::Grid {
                cell_size: cell.unwrap_or(DEFAULT_GRID_CELL),
            }
        }
        (None, None) => {}
    }
    if let Some(v) = parsed.weighting {
        layout.weighting = v;
    }

    if let Some(v) = parsed.width {
        config.render.width = v;
    }
    if let Some(v) = parsed.height {
        config.render.height = v;
    }

    config.validate()?;
    Ok(config)
}
