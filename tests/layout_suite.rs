use std::path::Path;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rstest::rstest;
use wordcloud_renderer::config::{CollisionIndexKind, LayoutConfig, parse_config};
use wordcloud_renderer::ir::WeightedWord;
use wordcloud_renderer::layout::{CanvasSize, CloudLayout, compute_layout, weigh_submissions};
use wordcloud_renderer::parser::{WordInput, parse_words};
use wordcloud_renderer::render::render_svg;
use wordcloud_renderer::session::{SessionStore, WordSource};
use wordcloud_renderer::text_metrics::HeuristicMeasurer;
use wordcloud_renderer::theme::Theme;

fn fixture_words(name: &str, config: &LayoutConfig) -> Vec<WeightedWord> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    let input = std::fs::read_to_string(&path).expect("fixture read failed");
    match parse_words(&input).expect("fixture parse failed") {
        WordInput::Submissions(lines) => weigh_submissions(lines, &config.weighting),
        WordInput::Weighted(words) => words,
    }
}

fn layout(
    words: &[WeightedWord],
    canvas: CanvasSize,
    config: &LayoutConfig,
    seed: u64,
) -> CloudLayout {
    let mut rng = StdRng::seed_from_u64(seed);
    compute_layout(
        words,
        canvas,
        &Theme::default(),
        config,
        &HeuristicMeasurer::default(),
        &mut rng,
    )
    .expect("layout failed")
}

fn assert_cloud_invariants(cloud: &CloudLayout, label: &str) {
    for (idx, word) in cloud.words.iter().enumerate() {
        let bounds = word.bounds();
        assert!(
            cloud.canvas.contains(&bounds),
            "{label}: {} leaves the canvas: {bounds:?}",
            word.text
        );
        for other in &cloud.words[idx + 1..] {
            assert!(
                !bounds.intersects(&other.bounds()),
                "{label}: {} overlaps {}",
                word.text,
                other.text
            );
        }
        for other in &cloud.words {
            if word.weight > other.weight {
                assert!(
                    word.font_size >= other.font_size,
                    "{label}: {} outweighs {} but renders smaller",
                    word.text,
                    other.text
                );
            }
        }
    }
    assert_eq!(
        cloud.stats.placed + cloud.stats.dropped,
        cloud.stats.requested,
        "{label}: every word is either placed or dropped"
    );
}

#[rstest]
#[case("retro.txt")]
#[case("conference.txt")]
#[case("unicode.txt")]
#[case("weighted.json")]
fn fixtures_render_without_overlap(#[case] name: &str) {
    let config = LayoutConfig::default();
    let words = fixture_words(name, &config);
    assert!(!words.is_empty(), "{name}: no words");
    let cloud = layout(&words, CanvasSize::new(1000.0, 550.0), &config, 11);
    assert_cloud_invariants(&cloud, name);
    assert!(cloud.stats.placed > 0, "{name}: nothing placed");

    let svg = render_svg(&cloud, &Theme::default());
    assert!(svg.contains("<svg"), "{name}: missing <svg tag");
    assert!(svg.contains("</svg>"), "{name}: missing </svg tag");
    assert_eq!(svg.matches("<text").count(), cloud.words.len());
}

#[rstest]
fn invariants_hold_across_seeds_and_sizes(
    #[values(1, 2, 3)] seed: u64,
    #[values((1000.0, 550.0), (500.0, 400.0), (250.0, 200.0))] size: (f32, f32),
    #[values(CollisionIndexKind::Linear, CollisionIndexKind::Grid { cell_size: 40.0 })]
    index: CollisionIndexKind,
) {
    let config = LayoutConfig {
        collision_index: index,
        ..LayoutConfig::default()
    };
    let words = fixture_words("conference.txt", &config);
    let cloud = layout(&words, CanvasSize::new(size.0, size.1), &config, seed);
    assert_cloud_invariants(&cloud, &format!("seed {seed} size {size:?} {index:?}"));
}

#[test]
fn heaviest_word_lands_first_near_center() {
    let config = LayoutConfig::default();
    let words = fixture_words("retro.txt", &config);
    let canvas = CanvasSize::new(1000.0, 550.0);
    let cloud = layout(&words, canvas, &config, 5);
    let first = &cloud.words[0];
    assert_eq!(first.text, "teamwork");
    assert_eq!(first.font_size, config.max_font_px);
    let (cx, cy) = first.center();
    assert!((cx - 500.0).abs() < 10.0 && (cy - 275.0).abs() < 10.0);
}

#[test]
fn smaller_canvas_never_places_more() {
    let config = LayoutConfig::default();
    let words = fixture_words("conference.txt", &config);
    let wide = layout(&words, CanvasSize::new(1000.0, 550.0), &config, 7);
    let small = layout(&words, CanvasSize::new(250.0, 200.0), &config, 7);
    assert_cloud_invariants(&small, "resized");
    assert!(small.stats.placed <= wide.stats.placed);
    assert!(small.stats.dropped > 0);
}

#[test]
fn unicode_labels_are_normalized_and_counted() {
    let config = LayoutConfig::default();
    let words = fixture_words("unicode.txt", &config);
    let cloud_word = words.iter().find(|w| w.text == "szófelhő").expect("missing label");
    assert_eq!(cloud_word.weight, 2.0);
    assert!(words.iter().any(|w| w.text == "词云" && w.weight == 2.0));
    assert!(words.iter().all(|w| w.text != "Szófelhő"));
}

#[test]
fn explicit_colors_survive_layout() {
    let config = LayoutConfig::default();
    let words = fixture_words("weighted.json", &config);
    let cloud = layout(&words, CanvasSize::new(1000.0, 550.0), &config, 3);
    let lifetimes = cloud
        .words
        .iter()
        .find(|w| w.text == "lifetimes")
        .expect("lifetimes placed");
    assert_eq!(lifetimes.color, "#b7410e");
}

#[test]
fn hit_test_finds_placed_words() {
    let config = LayoutConfig::default();
    let words = fixture_words("weighted.json", &config);
    let cloud = layout(&words, CanvasSize::new(1000.0, 550.0), &config, 3);
    for word in &cloud.words {
        let (cx, cy) = word.center();
        assert_eq!(cloud.hit_test(cx, cy).map(|hit| hit.text.as_str()), Some(word.text.as_str()));
    }
    assert!(cloud.hit_test(-5.0, -5.0).is_none());
}

#[test]
fn config_file_drives_layout() {
    let config = parse_config(
        r#"{
            minFontPx: 16,
            maxFontPx: 60,
            rotationSetDegrees: [0],
            collisionIndex: "grid",
        }"#,
    )
    .unwrap();
    let words = fixture_words("retro.txt", &config.layout);
    let cloud = layout(&words, CanvasSize::new(500.0, 400.0), &config.layout, 9);
    assert_cloud_invariants(&cloud, "configured");
    assert!(cloud.words.iter().all(|w| w.rotation == 0.0));
    assert!(cloud.words.iter().all(|w| (16.0..=60.0).contains(&w.font_size)));
}

#[test]
fn session_submissions_feed_layout() {
    let mut store = SessionStore::new();
    let id = store.create_session("Favourite fruit").unwrap().id.clone();
    for word in ["Apple", "apple", "pear", "kiwi", "apple"] {
        store.submit_word(&id, word).unwrap();
    }
    let config = LayoutConfig::default();
    let words = weigh_submissions(store.submissions(&id).unwrap(), &config.weighting);
    let theme = store.get(&id).unwrap().theme();
    let mut rng = StdRng::seed_from_u64(1);
    let cloud = compute_layout(
        &words,
        CanvasSize::new(600.0, 400.0),
        &theme,
        &config,
        &HeuristicMeasurer::default(),
        &mut rng,
    )
    .unwrap();
    assert_eq!(cloud.words[0].text, "apple");
    assert!(cloud.words.iter().all(|w| theme.word_colors.contains(&w.color)));
}
