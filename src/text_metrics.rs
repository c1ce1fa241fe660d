//! Text measurement for glyph sizing.
//!
//! Layout only needs the advance width of a label at a given font size. Two
//! measurers are provided: [`SystemFontMeasurer`] reads real glyph advances
//! from installed fonts (fontdb + ttf-parser) and [`HeuristicMeasurer`] uses a
//! calibrated per-character width table, which keeps results identical across
//! machines and works where no fonts are installed (WASM, CI).

use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::sync::Mutex;
use ttf_parser::Face;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeasureError {
    #[error("no installed font matches `{family}`")]
    FontUnavailable { family: String },
    #[error("font data for `{family}` could not be parsed")]
    InvalidFont { family: String },
    #[error("invalid font size {0}")]
    InvalidFontSize(f32),
    #[error("text measurer is unavailable")]
    Unavailable,
}

/// Returns the horizontal advance of `text` in CSS pixels.
pub trait TextMeasure {
    fn text_width(&self, text: &str, font_family: &str, font_size: f32)
    -> Result<f32, MeasureError>;
}

impl<T: TextMeasure + ?Sized> TextMeasure for &T {
    fn text_width(
        &self,
        text: &str,
        font_family: &str,
        font_size: f32,
    ) -> Result<f32, MeasureError> {
        (**self).text_width(text, font_family, font_size)
    }
}

fn check_font_size(font_size: f32) -> Result<(), MeasureError> {
    if font_size.is_finite() && font_size > 0.0 {
        Ok(())
    } else {
        Err(MeasureError::InvalidFontSize(font_size))
    }
}

static FONT_REGISTRY: Lazy<Mutex<FontRegistry>> = Lazy::new(|| Mutex::new(FontRegistry::new()));

/// Measures with the first installed font matching the CSS family list.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemFontMeasurer;

impl TextMeasure for SystemFontMeasurer {
    fn text_width(
        &self,
        text: &str,
        font_family: &str,
        font_size: f32,
    ) -> Result<f32, MeasureError> {
        check_font_size(font_size)?;
        if text.is_empty() {
            return Ok(0.0);
        }
        let mut registry = FONT_REGISTRY.lock().map_err(|_| MeasureError::Unavailable)?;
        registry.measure(text, font_size, font_family)
    }
}

/// Width table measurer. `width_scale` stretches every advance, which is
/// handy for display fonts that run wider than the calibration font.
#[derive(Debug, Clone, Copy)]
pub struct HeuristicMeasurer {
    pub width_scale: f32,
}

impl Default for HeuristicMeasurer {
    fn default() -> Self {
        Self { width_scale: 1.0 }
    }
}

impl TextMeasure for HeuristicMeasurer {
    fn text_width(
        &self,
        text: &str,
        _font_family: &str,
        font_size: f32,
    ) -> Result<f32, MeasureError> {
        check_font_size(font_size)?;
        let em: f32 = text.chars().map(char_width_factor).sum();
        Ok(em * font_size * self.width_scale.max(0.0))
    }
}

/// Advance widths in em, calibrated against a humanist sans at 16px.
pub(crate) fn char_width_factor(ch: char) -> f32 {
    match ch {
        ' ' => 0.306,
        '\\' | '.' | ',' | ':' | ';' | '|' | '!' | '(' | ')' | '[' | ']' | '{' | '}' => 0.321,
        '\'' | '"' | '`' => 0.28,
        '-' | '_' => 0.42,
        'A' => 0.652,
        'B' => 0.648,
        'C' => 0.734,
        'D' => 0.723,
        'E' => 0.594,
        'F' => 0.575,
        'G' | 'H' => 0.742,
        'I' => 0.272,
        'J' => 0.557,
        'K' => 0.648,
        'L' => 0.559,
        'M' => 0.903,
        'N' => 0.763,
        'O' => 0.754,
        'P' => 0.623,
        'Q' => 0.755,
        'R' => 0.637,
        'S' => 0.633,
        'T' => 0.599,
        'U' => 0.746,
        'V' => 0.661,
        'W' => 0.958,
        'X' => 0.655,
        'Y' => 0.646,
        'Z' => 0.621,
        'a' => 0.550,
        'b' => 0.603,
        'c' => 0.547,
        'd' => 0.609,
        'e' => 0.570,
        'f' => 0.340,
        'g' | 'h' => 0.600,
        'i' => 0.235,
        'j' => 0.227,
        'k' => 0.522,
        'l' => 0.239,
        'm' => 0.867,
        'n' => 0.585,
        'o' => 0.574,
        'p' => 0.595,
        'q' => 0.585,
        'r' => 0.364,
        's' => 0.523,
        't' => 0.305,
        'u' => 0.585,
        'v' => 0.545,
        'w' => 0.811,
        'x' => 0.538,
        'y' => 0.556,
        'z' => 0.550,
        '0' => 0.613,
        '1' => 0.396,
        '2' => 0.609,
        '3' => 0.597,
        '4' => 0.614,
        '5' => 0.586,
        '6' => 0.608,
        '7' => 0.559,
        '8' => 0.611,
        '9' => 0.595,
        '@' | '#' | '%' | '&' => 0.946,
        // CJK, Hangul and friends render at roughly one em.
        c if c as u32 >= 0x2E80 => 1.0,
        _ => 0.568,
    }
}

struct FontRegistry {
    db: Database,
    loaded_system_fonts: bool,
    faces: HashMap<String, Option<FontFace>>,
}

impl FontRegistry {
    fn new() -> Self {
        Self {
            db: Database::new(),
            loaded_system_fonts: false,
            faces: HashMap::new(),
        }
    }

    fn measure(
        &mut self,
        text: &str,
        font_size: f32,
        font_family: &str,
    ) -> Result<f32, MeasureError> {
        let family_key = normalize_family_key(font_family);
        if !self.faces.contains_key(&family_key) {
            let face = self.load_face(&family_key);
            self.faces.insert(family_key.clone(), face);
        }
        match self.faces.get_mut(&family_key).and_then(Option::as_mut) {
            Some(face) => face.measure_width(text, font_size, &family_key),
            None => Err(MeasureError::FontUnavailable { family: family_key }),
        }
    }

    fn load_face(&mut self, family_key: &str) -> Option<FontFace> {
        if let Some(face) = load_cached_face(family_key) {
            tracing::debug!(family = family_key, "font loaded from disk cache");
            return Some(face);
        }

        let tokens = parse_family_list(family_key);
        let families: Vec<Family<'_>> = tokens
            .iter()
            .map(|token| match token {
                FamilyToken::Generic(family) => *family,
                FamilyToken::Name(name) => Family::Name(name.as_str()),
            })
            .collect();

        if !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
            tracing::debug!(faces = self.db.len(), "system fonts loaded");
        }

        let query = Query {
            families: &families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let Some(id) = self.db.query(&query) else {
            tracing::warn!(family = family_key, "no installed font matches family list");
            return None;
        };
        let face = self
            .db
            .with_face_data(id, |data, index| {
                let face = FontFace::new(data.to_vec(), index)?;
                store_cached_face(family_key, &face);
                Some(face)
            })
            .flatten();
        if face.is_none() {
            tracing::warn!(family = family_key, "matched font could not be parsed");
        }
        face
    }
}

enum FamilyToken {
    Generic(Family<'static>),
    Name(String),
}

fn parse_family_list(font_family: &str) -> Vec<FamilyToken> {
    let mut tokens = Vec::new();
    for part in font_family.split(',') {
        let raw = part.trim().trim_matches('"').trim_matches('\'');
        if raw.is_empty() {
            continue;
        }
        let token = match raw.to_ascii_lowercase().as_str() {
            "serif" => FamilyToken::Generic(Family::Serif),
            "sans-serif" | "system-ui" | "-apple-system" | "ui-sans-serif" => {
                FamilyToken::Generic(Family::SansSerif)
            }
            "monospace" | "ui-monospace" => FamilyToken::Generic(Family::Monospace),
            "cursive" => FamilyToken::Generic(Family::Cursive),
            "fantasy" => FamilyToken::Generic(Family::Fantasy),
            _ => FamilyToken::Name(raw.to_string()),
        };
        tokens.push(token);
    }
    if tokens.is_empty() {
        tokens.push(FamilyToken::Generic(Family::SansSerif));
    }
    tokens
}

struct FontFace {
    data: Vec<u8>,
    index: u32,
    units_per_em: u16,
    ascii_advances: [u16; 128],
    glyph_advances: HashMap<char, Option<u16>>,
}

impl FontFace {
    fn new(data: Vec<u8>, index: u32) -> Option<Self> {
        let face = Face::parse(&data, index).ok()?;
        let units_per_em = face.units_per_em().max(1);
        let mut ascii_advances = [0u16; 128];
        for byte in 0u8..=127 {
            if let Some(glyph) = face.glyph_index(byte as char) {
                ascii_advances[byte as usize] = face.glyph_hor_advance(glyph).unwrap_or(0);
            }
        }
        drop(face);
        Some(Self {
            data,
            index,
            units_per_em,
            ascii_advances,
            glyph_advances: HashMap::new(),
        })
    }

    fn measure_width(
        &mut self,
        text: &str,
        font_size: f32,
        family: &str,
    ) -> Result<f32, MeasureError> {
        let scale = font_size / self.units_per_em as f32;
        // Advance used for glyphs the face does not cover (.notdef box).
        let missing = font_size * 0.56;

        if text.is_ascii() {
            let width = text
                .bytes()
                .map(|byte| match self.ascii_advances[byte as usize] {
                    0 => missing,
                    advance => advance as f32 * scale,
                })
                .sum::<f32>();
            return Ok(width);
        }

        let mut face: Option<Face<'_>> = None;
        let mut width = 0.0f32;
        for ch in text.chars() {
            let advance = match self.glyph_advances.get(&ch) {
                Some(cached) => *cached,
                None => {
                    if face.is_none() {
                        face = Some(Face::parse(&self.data, self.index).map_err(|_| {
                            MeasureError::InvalidFont {
                                family: family.to_string(),
                            }
                        })?);
                    }
                    let advance = face.as_ref().and_then(|face| {
                        face.glyph_index(ch)
                            .and_then(|glyph| face.glyph_hor_advance(glyph))
                    });
                    self.glyph_advances.insert(ch, advance);
                    advance
                }
            };
            width += match advance {
                Some(advance) if advance > 0 => advance as f32 * scale,
                _ => missing,
            };
        }
        Ok(width)
    }
}

fn normalize_family_key(font_family: &str) -> String {
    let trimmed = font_family.trim();
    if trimmed.is_empty() {
        "sans-serif".to_string()
    } else {
        trimmed.to_string()
    }
}

fn cache_paths(family_key: &str) -> Option<(PathBuf, PathBuf)> {
    let base = std::env::var_os("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".cache")))?;
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    family_key.hash(&mut hasher);
    let hash = hasher.finish();
    let dir = base.join("wordcloud-renderer").join("font-cache");
    Some((
        dir.join(format!("{hash:x}.font")),
        dir.join(format!("{hash:x}.meta")),
    ))
}

fn store_cached_face(family_key: &str, face: &FontFace) {
    let Some((font_path, meta_path)) = cache_paths(family_key) else {
        return;
    };
    if font_path.exists() {
        return;
    }
    if let Some(parent) = font_path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    if fs::write(&font_path, &face.data).is_ok() {
        let _ = fs::write(&meta_path, face.index.to_string());
    }
}

fn load_cached_face(family_key: &str) -> Option<FontFace> {
    let (font_path, meta_path) = cache_paths(family_key)?;
    if !font_path.exists() || !meta_path.exists() {
        return None;
    }
    let bytes = fs::read(font_path).ok()?;
    let index: u32 = fs::read_to_string(meta_path).ok()?.trim().parse().ok()?;
    FontFace::new(bytes, index)
}
