//! CLI binary for md2img.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints the written image paths.

use anyhow::{Context, Result};
use clap::Parser;
use md2img::pipeline::input::read_markdown;
use md2img::{
    convert, convert_file, md_to_images, Backend, ConversionConfig, ConversionProgressCallback,
    ConversionStats, MarkdownExtension, OutputTarget, PageSize, ProgressCallback, Style,
    TextEncoding,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers ──────────────────────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner while the layout engine runs, then a per-page bar.
struct CliProgressCallback {
    bar: ProgressBar,
    page_started: Mutex<Option<Instant>>,
    written: AtomicUsize,
}

impl CliProgressCallback {
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Layout");
        bar.set_message("Rendering HTML…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            page_started: Mutex::new(None),
            written: AtomicUsize::new(0),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Rasterising");
    }

    fn page_elapsed(&self) -> f64 {
        self.page_started
            .lock()
            .ok()
            .and_then(|mut started| started.take())
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, total_pages: usize) {
        self.activate_bar(total_pages);
    }

    fn on_page_start(&self, page_num: usize, _total: usize) {
        if let Ok(mut started) = self.page_started.lock() {
            *started = Some(Instant::now());
        }
        self.bar.set_message(format!("page {page_num}"));
    }

    fn on_page_complete(&self, page_num: usize, total: usize) {
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            green("✓"),
            page_num,
            total,
            dim(&format!("{:.1}s", self.page_elapsed())),
        ));
        self.bar.inc(1);
    }

    fn on_page_error(&self, page_num: usize, total: usize, error: &str) {
        let msg = match error.char_indices().nth(79) {
            Some((cut, _)) => format!("{}\u{2026}", &error[..cut]),
            None => error.to_string(),
        };
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            red("✗"),
            page_num,
            total,
            red(&msg),
        ));
    }

    fn on_image_written(&self, _path: &Path) {
        self.written.fetch_add(1, Ordering::SeqCst);
    }

    fn on_conversion_complete(&self, total_pages: usize, image_count: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} image(s) from {} page(s)",
            green("✔"),
            bold(&image_count.to_string()),
            total_pages
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # One long image, whitespace cropped
  md2img notes.md

  # Explicit output, JPEG
  md2img notes.md -o out/notes.jpg

  # Social-media cards (3:4, 1242x1656), split into notes_1.png, notes_2.png, ...
  md2img --paged notes.md --output-dir cards

  # Square cards with a handwriting theme
  md2img --page-size 1:1 --style virgil notes.md -o cards/post.png

  # From stdin
  cat notes.md | md2img - -o card.png

  # Alternative renderer
  md2img --backend wkhtmltoimage notes.md

PAGE SIZES:
  3:4  1242x1656   (--paged default)
  1:1  1080x1080
  2:3  1080x1620
  4:3  1440x1080
  or any WIDTHxHEIGHT in CSS pixels

REQUIREMENTS:
  weasyprint      https://weasyprint.org (pip install weasyprint)
  PDFium          https://github.com/bblanchon/pdfium-binaries
  wkhtmltoimage   only for --backend wkhtmltoimage

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH     Path to libpdfium (file or directory)
  MD2IMG_PDFIUM_DIR   Directory searched for libpdfium before system paths
  RUST_LOG            Log filter, overrides -v / -q
"#;

/// Render Markdown into styled image cards.
#[derive(Parser, Debug)]
#[command(
    name = "md2img",
    version,
    about = "Render Markdown into styled image cards",
    long_about = "Render Markdown into PNG/JPEG images styled by a bundled CSS theme. \
Without a page size the result is one long image cropped to its content; with one, \
long documents are split into several fixed-size images.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Markdown file, or `-` for stdin.
    #[arg(required_unless_present = "list_styles")]
    input: Option<String>,

    /// Output image path (.png or .jpg). Default: next to the input.
    #[arg(short, long, env = "MD2IMG_OUTPUT")]
    output: Option<PathBuf>,

    /// Renderer: weasyprint (primary) or wkhtmltoimage (alternative).
    #[arg(long, env = "MD2IMG_BACKEND", default_value = "weasyprint")]
    backend: Backend,

    /// Fixed page size: WIDTHxHEIGHT or 3:4, 1:1, 2:3, 4:3.
    #[arg(long, env = "MD2IMG_PAGE_SIZE")]
    page_size: Option<PageSize>,

    /// Split into fixed-size cards (3:4 unless --page-size is given).
    #[arg(long, env = "MD2IMG_PAGED")]
    paged: bool,

    /// Visual theme; see --list-styles.
    #[arg(long, env = "MD2IMG_STYLE", default_value = "default")]
    style: Style,

    /// Extra CSS file appended after the theme.
    #[arg(long, env = "MD2IMG_CSS_FILE")]
    css_file: Option<PathBuf>,

    /// Markdown extensions, comma separated (default: extra,codehilite,toc).
    #[arg(long, env = "MD2IMG_EXTENSIONS")]
    extensions: Option<String>,

    /// Encoding of the input file, e.g. utf-8, utf-8-sig, gbk, latin-1.
    #[arg(long, env = "MD2IMG_ENCODING", default_value = "utf-8")]
    encoding: TextEncoding,

    /// Rasterisation DPI for unpaged output (72–400).
    #[arg(long, env = "MD2IMG_DPI", default_value_t = 150,
          value_parser = clap::value_parser!(u32).range(72..=400))]
    dpi: u32,

    /// Directory for output when -o is not given.
    #[arg(long, env = "MD2IMG_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Base file name when -o is not given (default: input stem or md2img_out).
    #[arg(long, env = "MD2IMG_BASENAME")]
    basename: Option<String>,

    /// Path to the weasyprint executable.
    #[arg(long, env = "MD2IMG_WEASYPRINT", default_value = "weasyprint")]
    weasyprint: PathBuf,

    /// Path to the wkhtmltoimage executable.
    #[arg(long, env = "MD2IMG_WKHTMLTOIMAGE", default_value = "wkhtmltoimage")]
    wkhtmltoimage: PathBuf,

    /// Print a JSON report instead of paths.
    #[arg(long, env = "MD2IMG_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "MD2IMG_NO_PROGRESS")]
    no_progress: bool,

    /// List bundled styles and exit.
    #[arg(long)]
    list_styles: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "MD2IMG_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "MD2IMG_QUIET")]
    quiet: bool,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    images: &'a [PathBuf],
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<&'a ConversionStats>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.list_styles {
        for style in Style::ALL {
            println!("{:<12} {}", style.name(), dim(style.description()));
        }
        return Ok(());
    }

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let input = cli
        .input
        .clone()
        .context("An INPUT file (or `-` for stdin) is required")?;

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new_dynamic() as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, &input, progress_cb)?;

    // ── Run conversion ───────────────────────────────────────────────────
    let started = Instant::now();
    let basename = cli.basename.clone().unwrap_or_else(|| default_basename(&input));
    let (images, stats) = if cli.paged {
        let markdown = read_source(&input, config.encoding)?;
        let target = match &cli.output {
            Some(path) => OutputTarget::Path(path.clone()),
            None => OutputTarget::Directory {
                dir: cli.output_dir.clone().unwrap_or_else(|| PathBuf::from(".")),
                basename,
            },
        };
        let images = md_to_images(&markdown, &target, &config).context("Conversion failed")?;
        (images, None)
    } else if input == "-" {
        let markdown = read_source(&input, config.encoding)?;
        let output = cli.output.clone().unwrap_or_else(|| {
            cli.output_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(format!("{basename}.png"))
        });
        let result = convert(&markdown, &output, &config).context("Conversion failed")?;
        (result.images, Some(result.stats))
    } else {
        let output = cli.output.clone().or_else(|| {
            cli.output_dir
                .as_ref()
                .map(|dir| dir.join(format!("{basename}.png")))
        });
        let result = convert_file(&input, output.as_deref(), &config)
            .with_context(|| format!("Failed to convert '{input}'"))?;
        (result.images, Some(result.stats))
    };

    // ── Report ───────────────────────────────────────────────────────────
    if cli.json {
        let report = JsonReport {
            images: &images,
            stats: stats.as_ref(),
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise report")?
        );
        return Ok(());
    }

    for path in &images {
        println!("{}", path.display());
    }
    if !cli.quiet && !show_progress {
        eprintln!(
            "{} {} image(s) in {}ms",
            cyan("◆"),
            images.len(),
            started.elapsed().as_millis()
        );
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(
    cli: &Cli,
    input: &str,
    progress: Option<ProgressCallback>,
) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .backend(cli.backend)
        .style(cli.style)
        .encoding(cli.encoding)
        .unpaged_dpi(cli.dpi)
        .weasyprint_path(&cli.weasyprint)
        .wkhtmltoimage_path(&cli.wkhtmltoimage);

    if let Some(size) = cli.page_size {
        builder = builder.page_size(size);
    }
    if let Some(ref path) = cli.css_file {
        let css = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read CSS from {:?}", path))?;
        builder = builder.extra_css(css);
    }
    if let Some(ref list) = cli.extensions {
        let extensions =
            MarkdownExtension::parse_list(list).context("Invalid --extensions value")?;
        builder = builder.extensions(extensions);
    }
    builder = builder.base_url(base_dir(input)?);
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Read Markdown from a file or, for `-`, from stdin.
fn read_source(input: &str, encoding: TextEncoding) -> Result<String> {
    if input != "-" {
        return read_markdown(Path::new(input), encoding)
            .with_context(|| format!("Failed to read '{input}'"));
    }
    let mut bytes = Vec::new();
    io::stdin()
        .read_to_end(&mut bytes)
        .context("Failed to read stdin")?;
    encoding
        .decode(bytes)
        .map_err(|detail| anyhow::anyhow!("stdin is not valid {encoding}: {detail}"))
}

/// Directory relative links resolve against: the source's directory, or the
/// working directory for stdin.
fn base_dir(input: &str) -> Result<PathBuf> {
    let dir = match Path::new(input).parent() {
        _ if input == "-" => Path::new("."),
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    md2img::pipeline::input::absolute(dir)
        .with_context(|| format!("Cannot resolve directory of '{input}'"))
}

fn default_basename(input: &str) -> String {
    if input == "-" {
        return "md2img_out".to_string();
    }
    Path::new(input)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "md2img_out".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_input_links_resolve_next_to_source() {
        let dir = base_dir("notes/posts/day1.md").unwrap();
        assert!(dir.is_absolute());
        assert!(dir.ends_with("notes/posts"));

        let cwd = std::env::current_dir().unwrap();
        assert_eq!(base_dir("day1.md").unwrap(), cwd);
        assert_eq!(base_dir("-").unwrap(), cwd);
    }

    #[test]
    fn paged_config_carries_source_dir() {
        let cli = Cli::parse_from(["md2img", "--paged", "docs/guide.md"]);
        let config = build_config(&cli, "docs/guide.md", None).unwrap();
        let base = config.base_url.unwrap();
        assert!(base.is_absolute());
        assert!(base.ends_with("docs"));
    }

    #[test]
    fn basename_defaults_to_stem() {
        assert_eq!(default_basename("notes/post.md"), "post");
        assert_eq!(default_basename("-"), "md2img_out");
    }
}
