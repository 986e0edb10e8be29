//! Post-processing of rasterised output: whitespace crop and page stitching.
//!
//! ## Crop
//!
//! A pixel counts as content when its 8-bit luminance is below
//! [`CROP_THRESHOLD`]. The tight bounding box of all content pixels is grown
//! by [`CROP_MARGIN`] on every side (clamped to the image) and the file is
//! rewritten with just that region.
//!
//! Re-running the crop on its own output is a no-op: content then already
//! sits exactly one margin from every edge (or touches a clamped edge), so the
//! grown box covers the whole image and nothing is rewritten. A fully blank
//! image has no content box and is left alone.

use crate::error::Md2ImgError;
use crate::pipeline::encode;
use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use std::path::Path;
use tracing::{debug, info};

/// Luminance at or above which a pixel is background.
pub const CROP_THRESHOLD: u8 = 254;

/// Pixels kept around the content on each side.
pub const CROP_MARGIN: u32 = 4;

/// A rectangle in pixel coordinates; `right` and `bottom` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropBox {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl CropBox {
    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }

    fn covers(&self, width: u32, height: u32) -> bool {
        self.left == 0 && self.top == 0 && self.right == width && self.bottom == height
    }
}

/// Tight bounding box of all content pixels, or `None` for a blank image.
pub fn content_bounds(img: &DynamicImage) -> Option<CropBox> {
    let luma = img.to_luma8();
    let mut bounds: Option<CropBox> = None;

    for (x, y, pixel) in luma.enumerate_pixels() {
        if pixel.0[0] >= CROP_THRESHOLD {
            continue;
        }
        let b = bounds.get_or_insert(CropBox {
            left: x,
            top: y,
            right: x + 1,
            bottom: y + 1,
        });
        b.left = b.left.min(x);
        b.top = b.top.min(y);
        b.right = b.right.max(x + 1);
        b.bottom = b.bottom.max(y + 1);
    }

    bounds
}

/// The region a crop keeps: content bounds grown by the margin and clamped.
pub fn crop_box(img: &DynamicImage) -> Option<CropBox> {
    let (width, height) = img.dimensions();
    content_bounds(img).map(|b| CropBox {
        left: b.left.saturating_sub(CROP_MARGIN),
        top: b.top.saturating_sub(CROP_MARGIN),
        right: (b.right + CROP_MARGIN).min(width),
        bottom: (b.bottom + CROP_MARGIN).min(height),
    })
}

/// Crop `img` in memory. Returns `None` when it would not change.
pub fn crop_image(img: &DynamicImage) -> Option<DynamicImage> {
    let (width, height) = img.dimensions();
    let region = crop_box(img)?;
    if region.covers(width, height) {
        return None;
    }
    Some(img.crop_imm(region.left, region.top, region.width(), region.height()))
}

/// Crop the image file at `path` in place.
///
/// Returns `true` when the file was rewritten.
pub fn crop_to_content(path: &Path) -> Result<bool, Md2ImgError> {
    let img = image::open(path).map_err(|e| Md2ImgError::ImageRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let Some(cropped) = crop_image(&img) else {
        debug!(
            "Crop skipped for {}: blank or already tight ({}x{})",
            path.display(),
            img.width(),
            img.height()
        );
        return Ok(false);
    };

    encode::save_image(&cropped, path)?;
    info!(
        "Cropped {}: {}x{} → {}x{}",
        path.display(),
        img.width(),
        img.height(),
        cropped.width(),
        cropped.height()
    );
    Ok(true)
}

/// Stack `pages` top to bottom on a white canvas as wide as the widest page.
pub fn stitch_vertical(pages: &[DynamicImage]) -> DynamicImage {
    let width = pages.iter().map(|p| p.width()).max().unwrap_or(0);
    let height = pages.iter().map(|p| p.height()).sum();
    let mut canvas = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));

    let mut y = 0i64;
    for page in pages {
        image::imageops::overlay(&mut canvas, &page.to_rgb8(), 0, y);
        y += i64::from(page.height());
    }

    debug!("Stitched {} pages into {}x{}", pages.len(), width, height);
    DynamicImage::ImageRgb8(canvas)
}
