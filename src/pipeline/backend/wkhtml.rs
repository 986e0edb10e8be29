//! `wkhtmltoimage` backend: HTML straight to one image file.

use super::{run_renderer, BackendOutput, RenderBackend};
use crate::config::{PageSize, JPEG_QUALITY};
use crate::error::Md2ImgError;
use crate::pipeline::encode::OutputFormat;
use crate::progress::ProgressCallback;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct WkhtmlBackend {
    /// `wkhtmltoimage` executable.
    pub program: PathBuf,
}

impl WkhtmlBackend {
    pub(crate) fn command(&self, output: &Path, page_size: Option<PageSize>) -> Command {
        let mut command = Command::new(&self.program);
        command
            .arg("--format")
            .arg(OutputFormat::for_path(output).wkhtml_name())
            .arg("--quality")
            .arg(JPEG_QUALITY.to_string())
            .arg("--enable-local-file-access");
        if let Some(size) = page_size {
            command.arg("--width").arg(size.width().to_string());
        }
        command.arg("-").arg(output);
        command
    }
}

impl RenderBackend for WkhtmlBackend {
    fn name(&self) -> &'static str {
        "wkhtmltoimage"
    }

    fn render(
        &self,
        html: &str,
        output: &Path,
        page_size: Option<PageSize>,
        progress: Option<&ProgressCallback>,
    ) -> Result<BackendOutput, Md2ImgError> {
        if let Some(size) = page_size {
            warn!(
                "wkhtmltoimage cannot paginate; using width {} and ignoring height {}",
                size.width(),
                size.height()
            );
        }
        if let Some(cb) = progress {
            cb.on_conversion_start(1);
            cb.on_page_start(1, 1);
        }

        let elapsed =
            match run_renderer(self.command(output, page_size), &self.program, html.as_bytes()) {
                Ok(elapsed) => elapsed,
                Err(e) => {
                    if let Some(cb) = progress {
                        cb.on_page_error(1, 1, &e.to_string());
                    }
                    return Err(e);
                }
            };

        if !output.is_file() {
            return Err(Md2ImgError::RendererFailed {
                program: self.program.display().to_string(),
                exit_code: Some(0),
                stderr: format!("no image written to {}", output.display()),
            });
        }
        info!("wkhtmltoimage rendered {} in {}ms", output.display(), elapsed);

        if let Some(cb) = progress {
            cb.on_page_complete(1, 1);
            cb.on_image_written(output);
        }

        Ok(BackendOutput {
            images: vec![output.to_path_buf()],
            page_count: 1,
            layout_duration_ms: elapsed,
            raster_duration_ms: 0,
        })
    }
}
