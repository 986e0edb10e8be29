//! Progress-callback trait for conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to hear about
//! each laid-out page as it is rasterised and each image as it lands on disk.
//!
//! The number of pages is only known once the layout engine has finished, so
//! [`ConversionProgressCallback::on_conversion_start`] fires after layout,
//! not when the call begins. The `wkhtmltoimage` backend has no page concept
//! and reports a single page.
//!
//! # Example
//!
//! ```rust
//! use md2img::{ConversionProgressCallback, ConversionConfig};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! struct Printer;
//!
//! impl ConversionProgressCallback for Printer {
//!     fn on_image_written(&self, path: &Path) {
//!         eprintln!("wrote {}", path.display());
//!     }
//! }
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(Arc::new(Printer) as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::path::Path;
use std::sync::Arc;

/// Called by the conversion pipeline as it works through the laid-out pages.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once layout is done and the page count is known.
    fn on_conversion_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called before a page is rasterised.
    ///
    /// # Arguments
    /// * `page_num`   : 1-indexed page number
    /// * `total_pages`: total pages in the laid-out document
    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called when a page has been rasterised.
    fn on_page_complete(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called when a page fails. The conversion aborts right after.
    fn on_page_error(&self, page_num: usize, total_pages: usize, error: &str) {
        let _ = (page_num, total_pages, error);
    }

    /// Called each time a finished image is written to disk.
    fn on_image_written(&self, path: &Path) {
        let _ = path;
    }

    /// Called once after every image has been written.
    ///
    /// # Arguments
    /// * `total_pages` : laid-out pages
    /// * `image_count` : images produced (equal to `total_pages` in paged mode, 1 otherwise)
    fn on_conversion_complete(&self, total_pages: usize, image_count: usize) {
        let _ = (total_pages, image_count);
    }
}

/// A no-op implementation, used when no callback is configured.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
