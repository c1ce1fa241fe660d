use serde::Deserialize;
use wasm_bindgen::prelude::*;
use wordcloud_renderer::ir::WeightedWord;
use wordcloud_renderer::layout::merge_weighted;
use wordcloud_renderer::theme::Theme;
use wordcloud_renderer::{RenderOptions, render_with_options};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CloudRenderOptions {
    theme: Option<String>,
    font_family: Option<String>,
    width: Option<f32>,
    height: Option<f32>,
    min_font_px: Option<f32>,
    max_font_px: Option<f32>,
    seed: Option<u64>,
}

fn build_render_options(options: CloudRenderOptions) -> Result<RenderOptions, String> {
    let mut render_options = RenderOptions {
        // No system fonts inside the browser sandbox.
        fast_text: true,
        ..RenderOptions::default()
    };

    if let Some(theme) = options.theme.as_deref() {
        render_options.theme =
            Theme::by_id(theme).ok_or_else(|| format!("unknown theme `{theme}`"))?;
    }
    if let Some(font_family) = options.font_family {
        render_options.theme.font_family = font_family;
    }
    if let Some(width) = options.width {
        render_options.render.width = width;
    }
    if let Some(height) = options.height {
        render_options.render.height = height;
    }
    if let Some(min) = options.min_font_px {
        render_options.layout.min_font_px = min;
    }
    if let Some(max) = options.max_font_px {
        render_options.layout.max_font_px = max;
    }
    render_options.layout.validate().map_err(|error| error.to_string())?;
    render_options.seed = options.seed;

    Ok(render_options)
}

fn parse_words(words_json: &str) -> Result<Vec<WeightedWord>, String> {
    let words: Vec<WeightedWord> =
        serde_json::from_str(words_json).map_err(|error| error.to_string())?;
    Ok(merge_weighted(words))
}

/// `words_json` is an array of `{ text, weight, color? }` objects.
#[wasm_bindgen]
pub fn render_word_cloud_svg(
    words_json: &str,
    options_json: Option<String>,
) -> Result<String, JsValue> {
    let words = parse_words(words_json).map_err(|error| JsValue::from_str(&error))?;
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<CloudRenderOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        CloudRenderOptions::default()
    };

    let render_options =
        build_render_options(options).map_err(|error| JsValue::from_str(&error))?;
    render_with_options(&words, &render_options)
        .map_err(|error| JsValue::from_str(&error.to_string()))
}

#[cfg(test)]
mod tests {
    use wordcloud_renderer::ir::WeightedWord;
    use wordcloud_renderer::render_with_options;

    use crate::{CloudRenderOptions, build_render_options, parse_words};

    #[test]
    fn renders_weighted_words() {
        let words = vec![
            WeightedWord::new("browser", 5.0),
            WeightedWord::new("wasm", 3.0).with_color("#654ff0"),
            WeightedWord::new("js", 1.0),
        ];
        let options = CloudRenderOptions {
            theme: Some("style-2".to_string()),
            width: Some(400.0),
            height: Some(300.0),
            seed: Some(1),
            ..CloudRenderOptions::default()
        };

        let svg = render_with_options(&words, &build_render_options(options).unwrap())
            .expect("weighted words should render");

        assert!(svg.contains("<svg"));
        assert!(svg.contains("browser"));
        assert!(svg.contains("#654ff0"));
    }

    #[test]
    fn word_labels_are_normalized_and_merged() {
        let words = parse_words(
            r#"[{"text":"Rust","weight":2},{"text":"rust","weight":2},{"text":"  ","weight":5}]"#,
        )
        .unwrap();
        assert_eq!(words, vec![WeightedWord::new("rust", 2.0)]);
        assert!(parse_words("{").is_err());
    }

    #[test]
    fn rejects_unknown_theme() {
        let options = CloudRenderOptions {
            theme: Some("neon".to_string()),
            ..CloudRenderOptions::default()
        };
        assert!(build_render_options(options).is_err());
    }
}
