//! Error type for the md2img library.
//!
//! Every failure is fatal: a conversion either writes all of its images or
//! returns an [`Md2ImgError`]. There is no partial result and no retry; the
//! caller re-runs the whole call if it wants another attempt.
//!
//! An unrecognised style name is deliberately *not* an error; see
//! [`crate::style::Style::from_name`].

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the md2img library.
#[derive(Debug, Error)]
pub enum Md2ImgError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Markdown source file was not found at the given path.
    #[error("Markdown file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file bytes are not valid in the requested text encoding.
    #[error("Cannot decode '{path}' as {encoding}: {detail}\nPass a different --encoding.")]
    Decode {
        path: PathBuf,
        encoding: String,
        detail: String,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Backend identifier is not one of the supported renderers.
    #[error(
        "Unsupported backend '{name}'.\nUse \"weasyprint\" (primary) or \"wkhtmltoimage\" (alternative)."
    )]
    UnsupportedBackend { name: String },

    /// Page width or height is zero.
    #[error("Invalid page size {width}x{height}: width and height must be positive")]
    InvalidPageSize { width: u32, height: u32 },

    /// Builder validation or option parsing failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Renderer errors ───────────────────────────────────────────────────
    /// The external renderer executable could not be started.
    #[error(
        "Renderer '{program}' not found.\n\
Install it (e.g. `pip install weasyprint` or your package manager's wkhtmltopdf) \
or point md2img at it with --weasyprint / --wkhtmltoimage."
    )]
    RendererNotFound { program: String },

    /// The external renderer ran but exited unsuccessfully.
    #[error("Renderer '{program}' failed (exit {exit_code:?}): {stderr}")]
    RendererFailed {
        program: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    /// The laid-out PDF could not be opened by pdfium.
    #[error("Intermediate PDF '{path}' is unreadable: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// The layout engine produced a document with no pages.
    #[error("Layout produced no pages")]
    EmptyDocument,

    /// pdfium-render returned an error for a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
md2img needs PDFium to turn laid-out pages into images. You can:\n\
  • Download a build from https://github.com/bblanchon/pdfium-binaries/releases\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium, or\n\
  • Copy the library into the md2img cache directory (override with MD2IMG_PDFIUM_DIR).\n"
    )]
    PdfiumBindingFailed(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not read back an image (crop post-processing).
    #[error("Failed to read image '{path}': {source}")]
    ImageRead {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Could not encode or write an output image.
    #[error("Failed to write image '{path}': {source}")]
    ImageWrite {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Could not create an output directory or temporary file.
    #[error("Failed to write output '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<md2img_pdfium::PdfiumLocateError> for Md2ImgError {
    fn from(e: md2img_pdfium::PdfiumLocateError) -> Self {
        Md2ImgError::PdfiumBindingFailed(e.to_string())
    }
}
