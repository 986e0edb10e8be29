//! Rendering backends: assembled HTML in, image files out.
//!
//! Both backends drive an external program, feeding it the document on
//! stdin:
//!
//! | Backend | Program | Pages | Fixed size |
//! |---|---|---|---|
//! | [`WeasyPrintBackend`] | `weasyprint` → PDF → pdfium | many | yes |
//! | [`WkhtmlBackend`] | `wkhtmltoimage` | one | width only |
//!
//! The backend is picked once from [`ConversionConfig::backend`] by
//! [`for_config`]; nothing downstream branches on the backend again.

mod weasyprint;
mod wkhtml;

pub use weasyprint::WeasyPrintBackend;
pub use wkhtml::WkhtmlBackend;

use crate::config::{Backend, ConversionConfig, PageSize};
use crate::error::Md2ImgError;
use crate::pipeline::encode;
use crate::progress::ProgressCallback;
use image::DynamicImage;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;
use tracing::{debug, warn};

/// What a backend produced.
#[derive(Debug, Clone, Default)]
pub struct BackendOutput {
    /// Written images in page order.
    pub images: Vec<PathBuf>,
    /// Pages laid out by the engine.
    pub page_count: usize,
    pub layout_duration_ms: u64,
    pub raster_duration_ms: u64,
}

/// A strategy for turning an HTML document into image files.
pub trait RenderBackend {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Render `html` to `output`.
    ///
    /// With a `page_size`, a paginating backend writes `{stem}_{n}.{ext}` per
    /// page next to `output`; otherwise it writes `output` itself.
    fn render(
        &self,
        html: &str,
        output: &Path,
        page_size: Option<PageSize>,
        progress: Option<&ProgressCallback>,
    ) -> Result<BackendOutput, Md2ImgError>;
}

/// Build the backend selected by `config`.
pub fn for_config(config: &ConversionConfig) -> Box<dyn RenderBackend> {
    match config.backend {
        Backend::WeasyPrint => Box::new(WeasyPrintBackend {
            program: config.weasyprint_path.clone(),
            base_url: config.base_url.clone(),
            unpaged_dpi: config.unpaged_dpi,
        }),
        Backend::Wkhtmltoimage => Box::new(WkhtmlBackend {
            program: config.wkhtmltoimage_path.clone(),
        }),
    }
}

/// `{stem}_{page_num}{.ext}` next to `output`.
pub fn page_path(output: &Path, page_num: usize) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match output.extension() {
        Some(ext) => format!("{stem}_{page_num}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{page_num}"),
    };
    output.with_file_name(name)
}

/// Images saved by one render call. Dropping the set deletes every file in
/// it, so a conversion that fails part way leaves nothing behind; call
/// [`WrittenImages::keep`] once the whole call has succeeded.
#[derive(Debug, Default)]
pub(crate) struct WrittenImages {
    paths: Vec<PathBuf>,
}

impl WrittenImages {
    /// Encode `image` to `path` and track it.
    pub(crate) fn save(&mut self, image: &DynamicImage, path: &Path) -> Result<(), Md2ImgError> {
        // Tracked before writing: a half-written file is removed too.
        self.paths.push(path.to_path_buf());
        encode::save_image(image, path)
    }

    pub(crate) fn keep(mut self) -> Vec<PathBuf> {
        std::mem::take(&mut self.paths)
    }
}

impl Drop for WrittenImages {
    fn drop(&mut self) {
        for path in &self.paths {
            match std::fs::remove_file(path) {
                Ok(()) => debug!("Removed partial output {}", path.display()),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => warn!("Could not remove partial output {}: {}", path.display(), e),
            }
        }
    }
}

/// Run `command` with `stdin` piped in; fail on spawn error or non-zero exit.
///
/// Returns the elapsed wall-clock time in milliseconds.
pub(crate) fn run_renderer(
    mut command: Command,
    program: &Path,
    stdin: &[u8],
) -> Result<u64, Md2ImgError> {
    let started_at = Instant::now();
    let program_name = program.display().to_string();
    debug!("Spawning {:?}", command);

    let mut child = command
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                Md2ImgError::RendererNotFound {
                    program: program_name.clone(),
                }
            } else {
                Md2ImgError::RendererFailed {
                    program: program_name.clone(),
                    exit_code: None,
                    stderr: e.to_string(),
                }
            }
        })?;

    // Feed stdin from a separate thread so a chatty stderr cannot deadlock us.
    let writer = child.stdin.take().map(|mut pipe| {
        let data = stdin.to_vec();
        std::thread::spawn(move || pipe.write_all(&data))
    });

    let output = child
        .wait_with_output()
        .map_err(|e| Md2ImgError::RendererFailed {
            program: program_name.clone(),
            exit_code: None,
            stderr: e.to_string(),
        })?;

    if let Some(handle) = writer {
        match handle.join() {
            Ok(Ok(())) => {}
            Ok(Err(e)) if e.kind() == ErrorKind::BrokenPipe => {
                debug!("{} closed stdin early", program_name);
            }
            Ok(Err(e)) => warn!("Writing HTML to {} failed: {}", program_name, e),
            Err(_) => {
                return Err(Md2ImgError::Internal(
                    "stdin writer thread panicked".to_string(),
                ))
            }
        }
    }

    let elapsed_ms = started_at.elapsed().as_millis() as u64;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        warn!(
            "{} failed after {}ms (exit {:?}): {}",
            program_name,
            elapsed_ms,
            output.status.code(),
            stderr
        );
        return Err(Md2ImgError::RendererFailed {
            program: program_name,
            exit_code: output.status.code(),
            stderr,
        });
    }

    debug!("{} finished in {}ms", program_name, elapsed_ms);
    Ok(elapsed_ms)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_paths_are_one_based_and_keep_extension() {
        let out = Path::new("/tmp/cards/article.png");
        assert_eq!(page_path(out, 1), PathBuf::from("/tmp/cards/article_1.png"));
        assert_eq!(page_path(out, 12), PathBuf::from("/tmp/cards/article_12.png"));
        assert_eq!(page_path(Path::new("post.JPG"), 2), PathBuf::from("post_2.JPG"));
        assert_eq!(page_path(Path::new("bare"), 3), PathBuf::from("bare_3"));
    }

    #[test]
    fn failed_render_removes_earlier_pages() {
        let dir = tempfile::TempDir::new().unwrap();
        let page = DynamicImage::new_rgb8(4, 4);
        let first = dir.path().join("card_1.png");
        // A directory where page 2 should go makes its write fail.
        let second = dir.path().join("card_2.png");
        std::fs::create_dir(&second).unwrap();

        let result = (|| {
            let mut written = WrittenImages::default();
            written.save(&page, &first)?;
            assert!(first.is_file());
            written.save(&page, &second)?;
            Ok::<_, Md2ImgError>(written.keep())
        })();

        assert!(matches!(result, Err(Md2ImgError::ImageWrite { .. })), "got: {result:?}");
        assert!(!first.exists(), "page 1 must not survive a failed render");
        assert!(second.is_dir());
    }

    #[test]
    fn kept_images_stay_on_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let out = dir.path().join("card.jpg");
        let mut written = WrittenImages::default();
        written.save(&DynamicImage::new_rgb8(2, 2), &out).unwrap();
        assert_eq!(written.keep(), vec![out.clone()]);
        assert!(out.is_file());
    }

    #[test]
    fn for_config_picks_backend() {
        let config = ConversionConfig::default();
        assert_eq!(for_config(&config).name(), "weasyprint");

        let config = ConversionConfig::builder()
            .backend(Backend::Wkhtmltoimage)
            .build()
            .unwrap();
        assert_eq!(for_config(&config).name(), "wkhtmltoimage");
    }

    #[test]
    fn missing_program_is_not_found() {
        let program = Path::new("md2img-definitely-not-installed");
        let err = run_renderer(Command::new(program), program, b"<html></html>").unwrap_err();
        assert!(
            matches!(err, Md2ImgError::RendererNotFound { ref program } if program == "md2img-definitely-not-installed"),
            "got: {err:?}"
        );
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_carries_stderr() {
        let dir = tempfile::TempDir::new().unwrap();
        let program = test_support::fake_program(dir.path(), "broken", "echo 'layout exploded' >&2\nexit 7\n");
        let err = run_renderer(Command::new(&program), &program, b"<p>x</p>").unwrap_err();
        match err {
            Md2ImgError::RendererFailed {
                exit_code, stderr, ..
            } => {
                assert_eq!(exit_code, Some(7));
                assert_eq!(stderr, "layout exploded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn stdin_reaches_the_program() {
        let dir = tempfile::TempDir::new().unwrap();
        let sink = dir.path().join("stdin.html");
        let program = test_support::fake_program(
            dir.path(),
            "sink",
            &format!("cat > \"{}\"\n", sink.display()),
        );
        run_renderer(Command::new(&program), &program, "<p>héllo</p>".as_bytes()).unwrap();
        assert_eq!(std::fs::read_to_string(&sink).unwrap(), "<p>héllo</p>");
    }
}
