//! Image encoding: pick the format from the output extension and write.
//!
//! `.jpg` / `.jpeg` get JPEG at a fixed quality; everything else is written
//! as lossless PNG regardless of its extension.

use crate::config::JPEG_QUALITY;
use crate::error::Md2ImgError;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::debug;

/// Raster encoding chosen for an output path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Jpeg,
}

impl OutputFormat {
    pub fn for_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("jpg") | Some("jpeg") => OutputFormat::Jpeg,
            _ => OutputFormat::Png,
        }
    }

    /// The `--format` value `wkhtmltoimage` understands.
    pub fn wkhtml_name(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
        }
    }
}

/// Encode `img` to `path`, choosing the format from the extension.
pub fn save_image(img: &DynamicImage, path: &Path) -> Result<(), Md2ImgError> {
    let format = OutputFormat::for_path(path);
    let write_err = |source| Md2ImgError::ImageWrite {
        path: path.to_path_buf(),
        source,
    };

    match format {
        OutputFormat::Jpeg => {
            let file = File::create(path).map_err(|e| Md2ImgError::OutputWriteFailed {
                path: path.to_path_buf(),
                source: e,
            })?;
            let mut encoder = JpegEncoder::new_with_quality(BufWriter::new(file), JPEG_QUALITY);
            encoder.encode_image(&img.to_rgb8()).map_err(write_err)?;
        }
        OutputFormat::Png => {
            img.save_with_format(path, ImageFormat::Png).map_err(write_err)?;
        }
    }

    debug!(
        "Wrote {:?} {}x{} → {}",
        format,
        img.width(),
        img.height(),
        path.display()
    );
    Ok(())
}
