//! WeasyPrint backend: HTML → paginated PDF → pdfium → images.
//!
//! The PDF lives in a [`tempfile::NamedTempFile`] owned by
//! [`WeasyPrintBackend::render`], so it is deleted on every exit path,
//! including errors and panics.

use super::{page_path, run_renderer, BackendOutput, RenderBackend, WrittenImages};
use crate::config::{PageSize, PAGED_DPI};
use crate::error::Md2ImgError;
use crate::pipeline::{postprocess, render};
use crate::progress::ProgressCallback;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct WeasyPrintBackend {
    /// `weasyprint` executable.
    pub program: PathBuf,
    /// Passed as `--base-url` so relative image paths resolve.
    pub base_url: Option<PathBuf>,
    /// DPI used when no page size is fixed.
    pub unpaged_dpi: u32,
}

impl WeasyPrintBackend {
    /// Build the command that reads HTML from stdin and writes `pdf_path`.
    pub(crate) fn command(&self, pdf_path: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command.arg("--encoding").arg("utf-8");
        if let Some(base) = &self.base_url {
            command.arg("--base-url").arg(base);
        }
        command.arg("-").arg(pdf_path);
        command
    }

    /// Run the layout engine, returning the temporary PDF and elapsed time.
    fn layout(&self, html: &str) -> Result<(tempfile::NamedTempFile, u64), Md2ImgError> {
        let pdf = tempfile::Builder::new()
            .prefix("md2img-")
            .suffix(".pdf")
            .tempfile()
            .map_err(|e| Md2ImgError::OutputWriteFailed {
                path: std::env::temp_dir(),
                source: e,
            })?;
        debug!("Laying out into {}", pdf.path().display());

        let elapsed = run_renderer(self.command(pdf.path()), &self.program, html.as_bytes())?;
        Ok((pdf, elapsed))
    }
}

impl RenderBackend for WeasyPrintBackend {
    fn name(&self) -> &'static str {
        "weasyprint"
    }

    fn render(
        &self,
        html: &str,
        output: &Path,
        page_size: Option<PageSize>,
        progress: Option<&ProgressCallback>,
    ) -> Result<BackendOutput, Md2ImgError> {
        // ── Step 1: Layout ───────────────────────────────────────────────
        let (pdf, layout_duration_ms) = self.layout(html)?;
        info!("Layout finished in {}ms", layout_duration_ms);

        // ── Step 2: Rasterise ────────────────────────────────────────────
        let raster_start = Instant::now();
        let mut written = WrittenImages::default();
        let page_count = match page_size {
            Some(size) => {
                debug!("Paged mode: {} at {} DPI", size, PAGED_DPI);
                render::rasterise_pages(pdf.path(), PAGED_DPI, progress, |page_num, _, image| {
                    let path = page_path(output, page_num);
                    written.save(&image, &path)?;
                    if let Some(cb) = progress {
                        cb.on_image_written(&path);
                    }
                    Ok(())
                })?
            }
            None => {
                let mut pages = Vec::new();
                let count = render::rasterise_pages(
                    pdf.path(),
                    self.unpaged_dpi,
                    progress,
                    |_, _, image| {
                        pages.push(image);
                        Ok(())
                    },
                )?;

                // ── Step 3: Stitch and crop ──────────────────────────────
                let long = postprocess::stitch_vertical(&pages);
                drop(pages);
                let long = postprocess::crop_image(&long).unwrap_or(long);
                written.save(&long, output)?;
                if let Some(cb) = progress {
                    cb.on_image_written(output);
                }
                count
            }
        };

        // Close (and delete) the intermediate PDF before reporting success.
        pdf.close().map_err(|e| Md2ImgError::OutputWriteFailed {
            path: std::env::temp_dir(),
            source: e,
        })?;

        Ok(BackendOutput {
            images: written.keep(),
            page_count,
            layout_duration_ms,
            raster_duration_ms: raster_start.elapsed().as_millis() as u64,
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::pipeline::backend::test_support::fake_program;
    use std::fs;

    fn backend(program: PathBuf, base_url: Option<PathBuf>) -> WeasyPrintBackend {
        WeasyPrintBackend {
            program,
            base_url,
            unpaged_dpi: 150,
        }
    }

    #[test]
    fn passes_html_on_stdin_and_pdf_path_last() {
        let dir = tempfile::TempDir::new().unwrap();
        let args_log = dir.path().join("args.log");
        let stdin_log = dir.path().join("stdin.html");
        let pdf_log = dir.path().join("pdf.path");
        let script = format!(
            r#"echo "$@" > "{args}"
cat > "{stdin}"
for last; do :; done
echo "$last" > "{pdf}"
echo "not a pdf" > "$last"
exit 3
"#,
            args = args_log.display(),
            stdin = stdin_log.display(),
            pdf = pdf_log.display(),
        );
        let program = fake_program(dir.path(), "weasyprint", &script);
        let out = dir.path().join("card.png");

        let err = backend(program, Some(PathBuf::from("/srv/notes")))
            .render("<p>body</p>", &out, None, None)
            .unwrap_err();
        assert!(matches!(err, Md2ImgError::RendererFailed { exit_code: Some(3), .. }));

        let args = fs::read_to_string(&args_log).unwrap();
        assert!(args.starts_with("--encoding utf-8 --base-url /srv/notes - "), "args: {args}");
        assert!(args.trim_end().ends_with(".pdf"), "args: {args}");
        assert_eq!(fs::read_to_string(&stdin_log).unwrap(), "<p>body</p>");

        // The intermediate PDF is gone even though rendering failed.
        let pdf_path = fs::read_to_string(&pdf_log).unwrap();
        assert!(!Path::new(pdf_path.trim()).exists());
        assert!(!out.exists());
    }

    #[test]
    fn garbage_pdf_is_rejected_and_cleaned_up() {
        let dir = tempfile::TempDir::new().unwrap();
        let pdf_log = dir.path().join("pdf.path");
        let script = format!(
            r#"cat > /dev/null
for last; do :; done
echo "$last" > "{pdf}"
echo "definitely not a pdf" > "$last"
"#,
            pdf = pdf_log.display(),
        );
        let program = fake_program(dir.path(), "weasyprint", &script);
        let out = dir.path().join("card.png");

        let err = backend(program, None)
            .render("<p>x</p>", &out, Some(PageSize::SQUARE_1_1), None)
            .unwrap_err();
        assert!(
            matches!(
                err,
                Md2ImgError::CorruptPdf { .. } | Md2ImgError::PdfiumBindingFailed(_)
            ),
            "got: {err:?}"
        );

        let pdf_path = fs::read_to_string(&pdf_log).unwrap();
        assert!(!Path::new(pdf_path.trim()).exists());
        assert!(!dir.path().join("card_1.png").exists());
    }

    #[test]
    fn base_url_is_optional() {
        let b = backend(PathBuf::from("weasyprint"), None);
        let command = b.command(Path::new("/tmp/x.pdf"));
        let args: Vec<_> = command.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(args, ["--encoding", "utf-8", "-", "/tmp/x.pdf"]);
    }
}
