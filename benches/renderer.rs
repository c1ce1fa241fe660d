use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::hint::black_box;
use wordcloud_renderer::config::{CollisionIndexKind, LayoutConfig, LayoutStrategy, WeightScale};
use wordcloud_renderer::ir::WeightedWord;
use wordcloud_renderer::layout::{CanvasSize, compute_layout, weigh_submissions};
use wordcloud_renderer::render::render_svg;
use wordcloud_renderer::text_metrics::HeuristicMeasurer;
use wordcloud_renderer::theme::Theme;

fn synthetic_words(count: usize) -> Vec<WeightedWord> {
    (0..count)
        .map(|i| WeightedWord::new(format!("word{i}"), 1.0 + ((i * 7) % 13) as f32))
        .collect()
}

fn fixture(name: &str) -> &'static str {
    match name {
        "retro" => include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/retro.txt")),
        "conference" => include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/fixtures/conference.txt"
        )),
        _ => panic!("unknown fixture {name}"),
    }
}

fn canvas() -> CanvasSize {
    CanvasSize::new(1000.0, 550.0)
}

fn bench_weighting(c: &mut Criterion) {
    let mut group = c.benchmark_group("weighting");
    for name in ["retro", "conference"] {
        let lines: Vec<&str> = fixture(name).lines().collect();
        group.bench_with_input(BenchmarkId::from_parameter(name), &lines, |b, data| {
            b.iter(|| {
                let words = weigh_submissions(black_box(data), &WeightScale::default());
                black_box(words.len());
            });
        });
    }
    group.finish();
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    let theme = Theme::default();
    let measurer = HeuristicMeasurer::default();
    let linear = LayoutConfig::default();
    let grid = LayoutConfig {
        collision_index: CollisionIndexKind::Grid { cell_size: 64.0 },
        ..LayoutConfig::default()
    };
    for count in [10usize, 50, 150] {
        let words = synthetic_words(count);
        for (label, config) in [("linear", &linear), ("grid", &grid)] {
            group.bench_with_input(BenchmarkId::new(label, count), &words, |b, data| {
                b.iter(|| {
                    let mut rng = StdRng::seed_from_u64(1);
                    let layout = compute_layout(
                        black_box(data),
                        canvas(),
                        &theme,
                        config,
                        &measurer,
                        &mut rng,
                    )
                    .expect("layout failed");
                    black_box(layout.stats.placed);
                });
            });
        }
    }
    group.finish();
}

fn bench_scatter(c: &mut Criterion) {
    let mut group = c.benchmark_group("scatter");
    let theme = Theme::default();
    let measurer = HeuristicMeasurer::default();
    let config = LayoutConfig {
        strategy: LayoutStrategy::Scatter,
        ..LayoutConfig::default()
    };
    let words = synthetic_words(150);
    group.bench_function("150", |b| {
        b.iter(|| {
            let mut rng = StdRng::seed_from_u64(1);
            let layout = compute_layout(&words, canvas(), &theme, &config, &measurer, &mut rng)
                .expect("layout failed");
            black_box(layout.words.len());
        });
    });
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_svg");
    let theme = Theme::default();
    let config = LayoutConfig::default();
    for count in [10usize, 150] {
        let mut rng = StdRng::seed_from_u64(1);
        let layout = compute_layout(
            &synthetic_words(count),
            canvas(),
            &theme,
            &config,
            &HeuristicMeasurer::default(),
            &mut rng,
        )
        .expect("layout failed");
        group.bench_with_input(BenchmarkId::from_parameter(count), &layout, |b, data| {
            b.iter(|| {
                let svg = render_svg(black_box(data), &theme);
                black_box(svg.len());
            });
        });
    }
    group.finish();
}

fn bench_end_to_end(c: &mut Criterion) {
    let mut group = c.benchmark_group("end_to_end");
    let theme = Theme::default();
    let config = LayoutConfig::default();
    let measurer = HeuristicMeasurer::default();
    for name in ["retro", "conference"] {
        let input = fixture(name);
        group.bench_with_input(BenchmarkId::from_parameter(name), input, |b, data| {
            b.iter(|| {
                let words = weigh_submissions(black_box(data).lines(), &config.weighting);
                let mut rng = StdRng::seed_from_u64(1);
                let layout = compute_layout(&words, canvas(), &theme, &config, &measurer, &mut rng)
                    .expect("layout failed");
                let svg = render_svg(&layout, &theme);
                black_box(svg.len());
            });
        });
    }
    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bench_weighting, bench_layout, bench_scatter, bench_render, bench_end_to_end
);
criterion_main!(benches);
