//! Result types returned by the conversion entry points.

use crate::config::{Backend, PageSize};
use crate::style::Style;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The images a conversion wrote, plus timing and layout statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// Written image paths in page order. Never empty.
    pub images: Vec<PathBuf>,
    pub stats: ConversionStats,
}

impl ConversionOutput {
    /// The path when exactly one image was produced.
    pub fn single(&self) -> Option<&Path> {
        match self.images.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }

    pub fn into_images(self) -> Vec<PathBuf> {
        self.images
    }
}

/// Statistics for one conversion call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Pages laid out by the backend (1 for `wkhtmltoimage`).
    pub page_count: usize,
    pub backend: Backend,
    pub style: Style,
    /// Fixed page size, if one was requested.
    pub page_size: Option<PageSize>,
    /// Wall-clock time for the whole call.
    pub total_duration_ms: u64,
    /// Time spent in the external layout program.
    pub layout_duration_ms: u64,
    /// Time spent rasterising, stitching, cropping and encoding.
    pub raster_duration_ms: u64,
}
