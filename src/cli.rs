use crate::config::{Config, load_config};
use crate::export::RasterOptions;
use crate::ir::WeightedWord;
use crate::layout::weigh_submissions;
use crate::layout_dump::{layout_dump_json, write_layout_dump};
use crate::parser::{WordInput, parse_words};
use crate::render::{render_svg, write_output_pdf, write_output_png, write_output_svg};
use crate::session::{SessionStore, WordSource, join_url, qr_code_url};
use crate::theme::Theme;
use crate::{RenderOptions, layout_with_options};
use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::Level;

#[derive(Parser, Debug)]
#[command(name = "wcr", version, about = "Word cloud renderer in Rust")]
pub struct Args {
    /// Input file (one word per line, or a JSON array) or '-' for stdin
    #[arg(short = 'i', long = "input", conflicts_with = "store")]
    pub input: Option<PathBuf>,

    /// Session store JSON file to read words from
    #[arg(long = "store")]
    pub store: Option<PathBuf>,

    /// Session id or six-digit PIN inside the store
    #[arg(long = "session", requires = "store")]
    pub session: Option<String>,

    /// Create a session with this topic in the store before rendering
    #[arg(long = "createSession", requires = "store", conflicts_with = "session")]
    pub create_session: Option<String>,

    /// Submit a word to the selected session (repeatable)
    #[arg(long = "addWord", requires = "store")]
    pub add_word: Vec<String>,

    /// Base URL for the guest join link and QR code of the selected session
    #[arg(long = "baseUrl", requires = "store")]
    pub base_url: Option<String>,

    /// Output file. Defaults to stdout for SVG and JSON if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config file (JSON5)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,

    /// Theme id or name (classic, style-1 .. style-6)
    #[arg(short = 't', long = "theme")]
    pub theme: Option<String>,

    /// Heading for PDF output. Defaults to the session topic.
    #[arg(long = "title")]
    pub title: Option<String>,

    /// Seed for rotation and color picks
    #[arg(long = "seed")]
    pub seed: Option<u64>,

    /// Measure with the built-in width table instead of system fonts
    #[arg(long = "fastText")]
    pub fast_text: bool,

    /// Raster scale for PNG output
    #[arg(long = "scale", default_value_t = 1.0)]
    pub scale: f32,

    /// More logging (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    Pdf,
    Json,
}

/// Words plus whatever the source knows about how to present them.
struct Gathered {
    words: Vec<WeightedWord>,
    theme: Option<Theme>,
    title: Option<String>,
    /// Join and QR links for the session, when a base URL was given.
    links: Vec<String>,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = build_config(&args)?;
    let gathered = gather_words(&args, &config)?;
    for link in &gathered.links {
        eprintln!("{link}");
    }

    let mut options = RenderOptions::from_config(config);
    options.fast_text = args.fast_text;
    options.seed = args.seed;
    if args.theme.is_none()
        && let Some(theme) = gathered.theme
    {
        options.theme = theme;
    }

    let layout = layout_with_options(&gathered.words, &options)?;
    tracing::debug!(
        placed = layout.stats.placed,
        dropped = layout.stats.dropped,
        "layout ready"
    );

    let title = args.title.clone().or(gathered.title);
    match args.output_format {
        OutputFormat::Json => match args.output.as_deref() {
            Some(path) => write_layout_dump(path, &layout)?,
            None => println!("{}", layout_dump_json(&layout)?),
        },
        OutputFormat::Svg => {
            let svg = render_svg(&layout, &options.theme);
            write_output_svg(&svg, args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            let svg = render_svg(&layout, &options.theme);
            let raster = RasterOptions {
                scale: args.scale,
                background: Some(options.theme.background.clone()),
            };
            write_output_png(&svg, &output, &raster)?;
        }
        OutputFormat::Pdf => {
            let output = ensure_output(&args.output, "pdf")?;
            let svg = render_svg(&layout, &options.theme);
            write_output_pdf(&svg, &output, title.as_deref(), &options.theme)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .with_target(false)
        .try_init();
}

fn build_config(args: &Args) -> Result<Config> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(name) = args.theme.as_deref() {
        config.theme =
            Theme::by_id(name).ok_or_else(|| anyhow::anyhow!("unknown theme `{name}`"))?;
    }
    if let Some(width) = args.width {
        config.render.width = width;
    }
    if let Some(height) = args.height {
        config.render.height = height;
    }
    config.validate()?;
    Ok(config)
}

fn gather_words(args: &Args, config: &Config) -> Result<Gathered> {
    if let Some(store_path) = args.store.as_deref() {
        return gather_from_store(args, store_path, config);
    }
    let input = read_input(args.input.as_deref())?;
    let words = match parse_words(&input)? {
        WordInput::Submissions(submissions) => {
            weigh_submissions(submissions, &config.layout.weighting)
        }
        WordInput::Weighted(words) => words,
    };
    Ok(Gathered {
        words,
        theme: None,
        title: None,
        links: Vec::new(),
    })
}

fn gather_from_store(args: &Args, store_path: &Path, config: &Config) -> Result<Gathered> {
    let mut store = SessionStore::load(store_path)?;
    let mut dirty = false;

    let session_id = if let Some(topic) = args.create_session.as_deref() {
        let session = store.create_session(topic)?;
        eprintln!("session {} created, PIN {}", session.id, session.pin);
        dirty = true;
        session.id.clone()
    } else {
        let key = args
            .session
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("--store needs --session or --createSession"))?;
        store
            .lookup(key)
            .map(|session| session.id.clone())
            .ok_or_else(|| anyhow::anyhow!("no session matches `{key}`"))?
    };

    for word in &args.add_word {
        store.submit_word(&session_id, word)?;
        dirty = true;
    }
    if dirty {
        store
            .save(store_path)
            .with_context(|| format!("saving {}", store_path.display()))?;
    }

    let submissions = store.submissions(&session_id)?;
    let session = store
        .get(&session_id)
        .ok_or_else(|| anyhow::anyhow!("session `{session_id}` vanished from the store"))?;
    let links = match args.base_url.as_deref() {
        Some(base) => {
            let join = join_url(base, &session.pin);
            let qr = qr_code_url(&join, 150);
            vec![format!("join: {join}"), format!("qr: {qr}")]
        }
        None => Vec::new(),
    };
    Ok(Gathered {
        words: weigh_submissions(submissions, &config.layout.weighting),
        theme: Some(session.theme()),
        title: Some(session.topic.clone()),
        links,
    })
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path
        && path != Path::new("-")
    {
        return std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()));
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}
