//! Raster and print exports of a rendered cloud.
//!
//! PNG goes through resvg, PDF through svg2pdf. Both load system fonts so the
//! text matches what the measurer saw when the layout was computed.

use crate::render::escape_xml;
use crate::theme::Theme;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to parse SVG: {0}")]
    SvgParse(String),
    #[error("failed to allocate pixmap for raster rendering")]
    PixmapAlloc,
    #[error("failed to encode PNG")]
    PngEncode,
    #[error("failed to convert SVG to PDF")]
    PdfConvert,
}

pub type Result<T> = std::result::Result<T, ExportError>;

#[derive(Debug, Clone)]
pub struct RasterOptions {
    pub scale: f32,
    /// Fill behind the SVG; `None` keeps transparency outside the cloud.
    pub background: Option<String>,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            background: None,
        }
    }
}

const TITLE_FONT_SIZE: f32 = 28.0;
const TITLE_BAND_HEIGHT: f32 = 72.0;

/// Composes a page with `title` centered in a band above the cloud.
///
/// The cloud keeps its own size; the page grows by the band height. An empty
/// title returns the cloud unchanged.
pub fn document_svg(cloud_svg: &str, title: &str, theme: &Theme) -> String {
    let title = title.trim();
    if title.is_empty() {
        return cloud_svg.to_string();
    }
    let (width, height) = svg_size(cloud_svg).unwrap_or((1000.0, 550.0));
    let page_height = height + TITLE_BAND_HEIGHT;
    let nested = cloud_svg
        .strip_prefix("<svg")
        .map(|rest| format!("<svg x=\"0\" y=\"{TITLE_BAND_HEIGHT}\"{rest}"))
        .unwrap_or_else(|| cloud_svg.to_string());

    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{page_height}\" viewBox=\"0 0 {width} {page_height}\">",
    );
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        escape_xml(&theme.background)
    ));
    svg.push_str(&format!(
        "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" dominant-baseline=\"central\" font-family=\"{}\" font-size=\"{TITLE_FONT_SIZE}\" font-weight=\"bold\" fill=\"{}\">{}</text>",
        width / 2.0,
        TITLE_BAND_HEIGHT / 2.0,
        escape_xml(&theme.font_family),
        escape_xml(&theme.text_color),
        escape_xml(title)
    ));
    svg.push_str(&nested);
    svg.push_str("</svg>");
    svg
}

/// Root `width`/`height` read from the `viewBox`.
fn svg_size(svg: &str) -> Option<(f32, f32)> {
    let start = svg.find("viewBox=\"")? + "viewBox=\"".len();
    let rest = &svg[start..];
    let raw = &rest[..rest.find('"')?];
    let mut parts = raw.split_whitespace().skip(2);
    let width = parts.next()?.parse::<f32>().ok()?;
    let height = parts.next()?.parse::<f32>().ok()?;
    (width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0)
        .then_some((width, height))
}

#[cfg(feature = "png")]
pub fn svg_to_png(svg: &str, options: &RasterOptions) -> Result<Vec<u8>> {
    use resvg::tiny_skia;

    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    let tree =
        usvg::Tree::from_str(svg, &opt).map_err(|err| ExportError::SvgParse(err.to_string()))?;

    let scale = if options.scale.is_finite() && options.scale > 0.0 {
        options.scale
    } else {
        1.0
    };
    let size = tree.size();
    let width = (size.width() * scale).ceil().max(1.0) as u32;
    let height = (size.height() * scale).ceil().max(1.0) as u32;
    let mut pixmap = tiny_skia::Pixmap::new(width, height).ok_or(ExportError::PixmapAlloc)?;
    if let Some(color) = options.background.as_deref().and_then(parse_hex_color) {
        pixmap.fill(tiny_skia::Color::from_rgba8(color[0], color[1], color[2], color[3]));
    }
    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    pixmap.encode_png().map_err(|_| ExportError::PngEncode)
}

#[cfg(feature = "pdf")]
pub fn svg_to_pdf(svg: &str) -> Result<Vec<u8>> {
    let mut opt = svg2pdf::usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    let tree = svg2pdf::usvg::Tree::from_str(svg, &opt)
        .map_err(|err| ExportError::SvgParse(err.to_string()))?;
    svg2pdf::to_pdf(
        &tree,
        svg2pdf::ConversionOptions::default(),
        svg2pdf::PageOptions::default(),
    )
    .map_err(|_| ExportError::PdfConvert)
}

/// One-page PDF with the title heading and the cloud below it.
#[cfg(feature = "pdf")]
pub fn export_pdf(cloud_svg: &str, title: &str, theme: &Theme) -> Result<Vec<u8>> {
    svg_to_pdf(&document_svg(cloud_svg, title, theme))
}

/// `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, plus a few keywords.
#[cfg_attr(not(feature = "png"), allow(dead_code))]
fn parse_hex_color(text: &str) -> Option<[u8; 4]> {
    let s = text.trim().to_ascii_lowercase();
    match s.as_str() {
        "transparent" => return Some([0, 0, 0, 0]),
        "white" => return Some([255, 255, 255, 255]),
        "black" => return Some([0, 0, 0, 255]),
        _ => {}
    }
    let hex = s.strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    let nibble = |idx: usize| u8::from_str_radix(&hex[idx..idx + 1], 16).ok();
    let byte = |idx: usize| u8::from_str_radix(&hex[idx..idx + 2], 16).ok();
    match hex.len() {
        3 | 4 => {
            let mut out = [255u8; 4];
            for (idx, slot) in out.iter_mut().take(hex.len()).enumerate() {
                *slot = nibble(idx)? * 17;
            }
            Some(out)
        }
        6 | 8 => {
            let mut out = [255u8; 4];
            for (idx, slot) in out.iter_mut().take(hex.len() / 2).enumerate() {
                *slot = byte(idx * 2)?;
            }
            Some(out)
        }
        _ => None,
    }
}
