use crate::layout::{CanvasSize, CloudLayout};
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

use crate::export::RasterOptions;

/// One word to draw, already resolved to its box center.
#[derive(Debug, Clone, Copy)]
pub struct TextDraw<'a> {
    pub text: &'a str,
    pub center_x: f32,
    pub center_y: f32,
    pub font_size: f32,
    /// Radians, clockwise in screen space.
    pub rotation: f32,
    pub font_family: &'a str,
    pub color: &'a str,
}

/// Drawing backend a layout is painted onto.
pub trait RenderSurface {
    type Output;

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: &str);
    fn draw_text(&mut self, text: &TextDraw<'_>);
    fn finish(self) -> Self::Output;
}

/// Paints the background and then every word in placement order.
pub fn draw_layout<S: RenderSurface>(layout: &CloudLayout, theme: &Theme, surface: &mut S) {
    let canvas = layout.canvas;
    surface.fill_rect(0.0, 0.0, canvas.width, canvas.height, &theme.background);
    for word in &layout.words {
        let (center_x, center_y) = word.center();
        surface.draw_text(&TextDraw {
            text: &word.text,
            center_x,
            center_y,
            font_size: word.font_size,
            rotation: word.rotation,
            font_family: &theme.font_family,
            color: &word.color,
        });
    }
}

pub fn render_svg(layout: &CloudLayout, theme: &Theme) -> String {
    let mut surface = SvgSurface::new(layout.canvas);
    draw_layout(layout, theme, &mut surface);
    surface.finish()
}

#[derive(Debug, Clone)]
pub struct SvgSurface {
    svg: String,
}

impl SvgSurface {
    pub fn new(canvas: CanvasSize) -> Self {
        let width = canvas.width.max(1.0);
        let height = canvas.height.max(1.0);
        let svg = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
        );
        Self { svg }
    }
}

impl RenderSurface for SvgSurface {
    type Output = String;

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: &str) {
        self.svg.push_str(&format!(
            "<rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"{width:.2}\" height=\"{height:.2}\" fill=\"{}\"/>",
            escape_xml(color)
        ));
    }

    fn draw_text(&mut self, text: &TextDraw<'_>) {
        let x = text.center_x;
        let y = text.center_y;
        let transform = if text.rotation == 0.0 {
            String::new()
        } else {
            format!(
                " transform=\"rotate({:.2} {x:.2} {y:.2})\"",
                text.rotation.to_degrees()
            )
        };
        self.svg.push_str(&format!(
            "<text x=\"{x:.2}\" y=\"{y:.2}\"{transform} text-anchor=\"middle\" dominant-baseline=\"central\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            escape_xml(text.font_family),
            text.font_size,
            escape_xml(text.color),
            escape_xml(text.text)
        ));
    }

    fn finish(mut self) -> String {
        self.svg.push_str("</svg>");
        self.svg
    }
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, raster: &RasterOptions) -> Result<()> {
    let bytes = crate::export::svg_to_png(svg, raster)?;
    std::fs::write(output, bytes)?;
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(_svg: &str, _output: &Path, _raster: &RasterOptions) -> Result<()> {
    Err(anyhow::anyhow!(
        "PNG output requires the 'png' feature. Rebuild with: cargo build --features png"
    ))
}

/// Writes a PDF page: the cloud under an optional title band.
#[cfg(feature = "pdf")]
pub fn write_output_pdf(
    svg: &str,
    output: &Path,
    title: Option<&str>,
    theme: &Theme,
) -> Result<()> {
    let bytes = match title {
        Some(title) => crate::export::export_pdf(svg, title, theme)?,
        None => crate::export::svg_to_pdf(svg)?,
    };
    std::fs::write(output, bytes)?;
    Ok(())
}

#[cfg(not(feature = "pdf"))]
pub fn write_output_pdf(
    _svg: &str,
    _output: &Path,
    _title: Option<&str>,
    _theme: &Theme,
) -> Result<()> {
    Err(anyhow::anyhow!(
        "PDF output requires the 'pdf' feature. Rebuild with: cargo build --features pdf"
    ))
}

pub(crate) fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::ir::WeightedWord;
    use crate::layout::compute_layout;
    use crate::text_metrics::HeuristicMeasurer;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[derive(Default)]
    struct Recorder {
        rects: Vec<String>,
        texts: Vec<String>,
    }

    impl RenderSurface for Recorder {
        type Output = (Vec<String>, Vec<String>);

        fn fill_rect(&mut self, _x: f32, _y: f32, _w: f32, _h: f32, color: &str) {
            self.rects.push(color.to_string());
        }

        fn draw_text(&mut self, text: &TextDraw<'_>) {
            self.texts.push(text.text.to_string());
        }

        fn finish(self) -> Self::Output {
            (self.rects, self.texts)
        }
    }

    fn sample_layout() -> CloudLayout {
        let words = vec![
            WeightedWord::new("rust", 3.0),
            WeightedWord::new("<tag> & co", 2.0),
            WeightedWord::new("tilt", 1.0),
        ];
        let config = LayoutConfig {
            rotation_set: vec![0.3],
            ..LayoutConfig::default()
        };
        compute_layout(
            &words,
            CanvasSize::new(600.0, 400.0),
            &Theme::default(),
            &config,
            &HeuristicMeasurer::default(),
            &mut StdRng::seed_from_u64(1),
        )
        .unwrap()
    }

    #[test]
    fn render_svg_basic() {
        let layout = sample_layout();
        let svg = render_svg(&layout, &Theme::default());
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("viewBox=\"0 0 600 400\""));
        assert!(svg.contains(">rust</text>"));
        assert!(svg.contains("&lt;tag&gt; &amp; co"));
        assert!(svg.contains("rotate("));
    }

    #[test]
    fn surface_sees_background_then_words_in_order() {
        let layout = sample_layout();
        let theme = Theme::default();
        let mut recorder = Recorder::default();
        draw_layout(&layout, &theme, &mut recorder);
        let (rects, texts) = recorder.finish();
        assert_eq!(rects, [theme.background.clone()]);
        let expected: Vec<String> = layout.words.iter().map(|w| w.text.clone()).collect();
        assert_eq!(texts, expected);
    }

    #[test]
    fn empty_layout_is_background_only() {
        let layout = CloudLayout::empty(CanvasSize::new(100.0, 50.0));
        let svg = render_svg(&layout, &Theme::default());
        assert!(!svg.contains("<text"));
        assert!(svg.contains("<rect"));
    }
}
