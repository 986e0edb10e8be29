//! Conversion entry points.
//!
//! All three functions run the same pipeline and differ only in where the
//! Markdown comes from and where the images go:
//!
//! | Function | Source | Output | Page size default |
//! |---|---|---|---|
//! | [`convert`] | string | explicit path | none (one cropped image) |
//! | [`convert_file`] | file | `<source>.png` unless given | none |
//! | [`md_to_images`] | string | path or dir + basename | 3:4 preset |

use crate::config::{ConversionConfig, PageSize};
use crate::error::Md2ImgError;
use crate::output::{ConversionOutput, ConversionStats};
use crate::pipeline::{backend, document, input};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Render Markdown text to one or more images.
///
/// Without a page size this writes exactly `output_path`, cropped to its
/// content. With one, it writes `{stem}_1.{ext}`, `{stem}_2.{ext}`, … next
/// to `output_path`, one per laid-out page. Parent directories are created.
///
/// # Errors
/// Any failure is fatal and no partial result is returned:
/// - [`Md2ImgError::RendererNotFound`] / [`Md2ImgError::RendererFailed`]
/// - [`Md2ImgError::PdfiumBindingFailed`], [`Md2ImgError::CorruptPdf`],
///   [`Md2ImgError::RasterisationFailed`]
/// - [`Md2ImgError::ImageWrite`] / [`Md2ImgError::OutputWriteFailed`]
///
/// # Example
/// ```rust,no_run
/// use md2img::{convert, ConversionConfig, PageSize};
///
/// let config = ConversionConfig::builder()
///     .page_size(PageSize::SQUARE_1_1)
///     .build()?;
/// let output = convert("# Hello\n\nWorld", "out/hello.png", &config)?;
/// for path in &output.images {
///     println!("{}", path.display());
/// }
/// # Ok::<(), md2img::Md2ImgError>(())
/// ```
pub fn convert(
    markdown: &str,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Md2ImgError> {
    let total_start = Instant::now();
    let output_path = output_path.as_ref();
    info!(
        "Starting conversion → {} (backend={}, style={}, page_size={})",
        output_path.display(),
        config.backend,
        config.style,
        config
            .page_size
            .map(|s| s.to_string())
            .unwrap_or_else(|| "none".to_string())
    );

    // ── Step 1: Prepare output location ──────────────────────────────────
    input::ensure_parent_dir(output_path)?;

    // ── Step 2: Assemble the HTML document ───────────────────────────────
    let html = document::assemble(markdown, config)?;

    // ── Step 3: Layout and rasterise ─────────────────────────────────────
    let renderer = backend::for_config(config);
    debug!("Using {} backend", renderer.name());
    let rendered = renderer.render(
        &html,
        output_path,
        config.page_size,
        config.progress_callback.as_ref(),
    )?;

    if rendered.images.is_empty() {
        return Err(Md2ImgError::EmptyDocument);
    }

    // ── Step 4: Stats ────────────────────────────────────────────────────
    let stats = ConversionStats {
        page_count: rendered.page_count,
        backend: config.backend,
        style: config.style,
        page_size: config.page_size,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
        layout_duration_ms: rendered.layout_duration_ms,
        raster_duration_ms: rendered.raster_duration_ms,
    };

    info!(
        "Conversion complete: {} image(s) from {} page(s), {}ms total",
        rendered.images.len(),
        rendered.page_count,
        stats.total_duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_complete(rendered.page_count, rendered.images.len());
    }

    Ok(ConversionOutput {
        images: rendered.images,
        stats,
    })
}

/// Render a Markdown file to images.
///
/// The file is decoded with [`ConversionConfig::encoding`]. When
/// `output_path` is `None` the image goes next to the source with a `.png`
/// extension. Relative links in the document resolve against the source's
/// directory unless [`ConversionConfig::base_url`] is already set.
///
/// # Errors
/// [`Md2ImgError::FileNotFound`] when `source` does not exist; nothing is
/// written in that case. Otherwise as [`convert`].
pub fn convert_file(
    source: impl AsRef<Path>,
    output_path: Option<&Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Md2ImgError> {
    let source = source.as_ref();
    let markdown = input::read_markdown(source, config.encoding)?;

    let output_path = output_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| input::default_output_path(source));

    if config.base_url.is_some() {
        return convert(&markdown, &output_path, config);
    }

    let source_dir = match source.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut config = config.clone();
    config.base_url = Some(input::absolute(source_dir)?);
    convert(&markdown, &output_path, &config)
}

/// Where [`md_to_images`] writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// An explicit output path.
    Path(PathBuf),
    /// `{dir}/{basename}.png`; the directory is created if missing.
    Directory { dir: PathBuf, basename: String },
}

impl Default for OutputTarget {
    fn default() -> Self {
        OutputTarget::Directory {
            dir: PathBuf::from("."),
            basename: "md2img_out".to_string(),
        }
    }
}

impl OutputTarget {
    /// Resolve to a concrete output path, creating directories as needed.
    fn prepare(&self) -> Result<PathBuf, Md2ImgError> {
        match self {
            OutputTarget::Path(path) => {
                input::ensure_parent_dir(path)?;
                Ok(path.clone())
            }
            OutputTarget::Directory { dir, basename } => {
                let dir = input::absolute(dir)?;
                input::ensure_dir(&dir)?;
                Ok(dir.join(format!("{basename}.png")))
            }
        }
    }
}

/// Render Markdown to fixed-size cards and return absolute image paths.
///
/// Uses [`PageSize::PORTRAIT_3_4`] unless the config sets a page size, so
/// long input is split into several images.
///
/// # Example
/// ```rust,no_run
/// use md2img::{md_to_images, ConversionConfig, OutputTarget};
///
/// let target = OutputTarget::Directory { dir: "cards".into(), basename: "post".into() };
/// let paths = md_to_images("# Title\n\nBody", &target, &ConversionConfig::default())?;
/// assert!(paths.iter().all(|p| p.is_absolute()));
/// # Ok::<(), md2img::Md2ImgError>(())
/// ```
pub fn md_to_images(
    markdown: &str,
    target: &OutputTarget,
    config: &ConversionConfig,
) -> Result<Vec<PathBuf>, Md2ImgError> {
    let output_path = target.prepare()?;

    let output = if config.page_size.is_some() {
        convert(markdown, &output_path, config)?
    } else {
        let mut config = config.clone();
        config.page_size = Some(PageSize::PORTRAIT_3_4);
        convert(markdown, &output_path, &config)?
    };

    output
        .into_images()
        .into_iter()
        .map(|p| input::absolute(&p))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Backend;

    #[test]
    fn default_target_is_cwd_basename() {
        assert_eq!(
            OutputTarget::default(),
            OutputTarget::Directory {
                dir: PathBuf::from("."),
                basename: "md2img_out".into()
            }
        );
    }

    #[test]
    fn directory_target_resolves_absolute_and_creates_dir() {
        let tmp = tempfile::TempDir::new().unwrap();
        let target = OutputTarget::Directory {
            dir: tmp.path().join("cards/new"),
            basename: "post".into(),
        };
        let path = target.prepare().unwrap();
        assert!(path.is_absolute());
        assert_eq!(path.file_name().unwrap(), "post.png");
        assert!(tmp.path().join("cards/new").is_dir());
    }

    #[test]
    fn relative_directory_target_resolves_against_cwd() {
        let rel = PathBuf::from("target/md2img-relative-target/cards");
        let target = OutputTarget::Directory {
            dir: rel.clone(),
            basename: "post".into(),
        };
        let path = target.prepare().unwrap();

        let cwd = std::env::current_dir().unwrap();
        assert!(path.is_absolute());
        assert_eq!(path, cwd.join(&rel).join("post.png"));
        assert!(cwd.join(&rel).is_dir());
        std::fs::remove_dir_all(cwd.join("target/md2img-relative-target")).unwrap();
    }

    #[test]
    fn convert_file_missing_source_writes_nothing() {
        let tmp = tempfile::TempDir::new().unwrap();
        let out = tmp.path().join("out/card.png");
        let err = convert_file(tmp.path().join("missing.md"), Some(&out), &ConversionConfig::default())
            .unwrap_err();
        assert!(matches!(err, Md2ImgError::FileNotFound { .. }));
        assert!(!tmp.path().join("out").exists());
    }

    #[test]
    fn missing_renderer_is_reported() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = ConversionConfig::builder()
            .backend(Backend::Wkhtmltoimage)
            .wkhtmltoimage_path("md2img-no-such-wkhtmltoimage")
            .build()
            .unwrap();
        let err = convert("# hi", tmp.path().join("card.png"), &config).unwrap_err();
        assert!(matches!(err, Md2ImgError::RendererNotFound { .. }), "got: {err:?}");
    }

    #[cfg(unix)]
    #[test]
    fn md_to_images_returns_absolute_paths_via_fake_renderer() {
        use crate::pipeline::backend::test_support::fake_program;

        let tmp = tempfile::TempDir::new().unwrap();
        let fixture = tmp.path().join("fixture.png");
        image::RgbImage::from_pixel(3, 3, image::Rgb([0, 0, 0]))
            .save(&fixture)
            .unwrap();
        let width_log = tmp.path().join("args.log");
        let program = fake_program(
            tmp.path(),
            "wkhtmltoimage",
            &format!(
                "echo \"$@\" > \"{}\"\ncat > /dev/null\nfor last; do :; done\ncp \"{}\" \"$last\"\n",
                width_log.display(),
                fixture.display()
            ),
        );
        let config = ConversionConfig::builder()
            .backend(Backend::Wkhtmltoimage)
            .wkhtmltoimage_path(program)
            .build()
            .unwrap();

        let target = OutputTarget::Directory {
            dir: tmp.path().join("cards"),
            basename: "post".into(),
        };
        let paths = md_to_images("# Title", &target, &config).unwrap();
        assert_eq!(paths.len(), 1);
        assert!(paths[0].is_absolute());
        assert!(paths[0].ends_with("cards/post.png"));

        // The 3:4 preset is applied when no page size is configured.
        let args = std::fs::read_to_string(&width_log).unwrap();
        assert!(args.contains("--width 1242"), "args: {args}");
    }
}
