//! PDF rasterisation: turn each laid-out page into a `DynamicImage` via pdfium.
//!
//! The target bitmap size is derived from the page's size in PDF points and
//! the requested DPI (`pixels = points × dpi / 72`). At 96 DPI a page laid out
//! as `1242px × 1656px` therefore comes back as exactly 1242 × 1656 pixels.
//!
//! Pages are handed to a callback one at a time so callers can encode and
//! drop each bitmap before the next is rendered.

use crate::error::Md2ImgError;
use crate::progress::ProgressCallback;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Pixel length of `points` at `dpi`.
pub fn points_to_pixels(points: f32, dpi: u32) -> i32 {
    (points * dpi as f32 / 72.0).round().max(1.0) as i32
}

/// Rasterise every page of `pdf_path` at `dpi`, in document order.
///
/// `on_page` receives `(page_num, total_pages, image)` with a 1-indexed
/// page number. Returns the number of pages rendered.
///
/// # Errors
/// - [`Md2ImgError::PdfiumBindingFailed`] when no pdfium library can be bound
/// - [`Md2ImgError::CorruptPdf`] when pdfium cannot open the file
/// - [`Md2ImgError::EmptyDocument`] when the PDF has no pages
/// - [`Md2ImgError::RasterisationFailed`] when a page fails to render
pub fn rasterise_pages<F>(
    pdf_path: &Path,
    dpi: u32,
    progress: Option<&ProgressCallback>,
    mut on_page: F,
) -> Result<usize, Md2ImgError>
where
    F: FnMut(usize, usize, DynamicImage) -> Result<(), Md2ImgError>,
{
    let pdfium = md2img_pdfium::bind_pdfium()?;

    let document = pdfium
        .load_pdf_from_file(pdf_path, None)
        .map_err(|e| Md2ImgError::CorruptPdf {
            path: pdf_path.to_path_buf(),
            detail: format!("{:?}", e),
        })?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    if total_pages == 0 {
        return Err(Md2ImgError::EmptyDocument);
    }
    info!("Layout produced {} page(s); rasterising at {} DPI", total_pages, dpi);

    if let Some(cb) = progress {
        cb.on_conversion_start(total_pages);
    }

    for (idx, page) in pages.iter().enumerate() {
        let page_num = idx + 1;
        if let Some(cb) = progress {
            cb.on_page_start(page_num, total_pages);
        }

        let width = points_to_pixels(page.width().value, dpi);
        let height = points_to_pixels(page.height().value, dpi);
        let render_config = PdfRenderConfig::new()
            .set_target_size(width, height)
            .set_clear_color(PdfColor::WHITE);

        let bitmap = match page.render_with_config(&render_config) {
            Ok(bitmap) => bitmap,
            Err(e) => {
                let err = Md2ImgError::RasterisationFailed {
                    page: page_num,
                    detail: format!("{:?}", e),
                };
                if let Some(cb) = progress {
                    cb.on_page_error(page_num, total_pages, &err.to_string());
                }
                return Err(err);
            }
        };

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            page_num,
            image.width(),
            image.height()
        );

        on_page(page_num, total_pages, image)?;

        if let Some(cb) = progress {
            cb.on_page_complete(page_num, total_pages);
        }
    }

    Ok(total_pages)
}
