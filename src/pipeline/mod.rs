//! Pipeline stages for Markdown-to-image conversion.
//!
//! Each submodule implements one transformation step and is testable on its
//! own.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ markdown ──▶ document ──▶ backend ──▶ render ──▶ postprocess ──▶ encode
//! (read)    (comrak)     (CSS shell)  (CLI)       (pdfium)   (stitch/crop)    (png/jpeg)
//! ```
//!
//! 1. [`input`]   : read the source in its declared encoding; prepare output dirs
//! 2. [`markdown`]: Markdown → HTML fragment with the chosen extensions
//! 3. [`document`]: wrap the fragment with the style, extra CSS and `@page` rule
//! 4. [`backend`] : run `weasyprint` or `wkhtmltoimage` on the document
//! 5. [`render`]  : rasterise laid-out PDF pages (WeasyPrint only)
//! 6. [`postprocess`]: stitch unpaged pages and crop surrounding whitespace
//! 7. [`encode`]  : write PNG or JPEG depending on the output extension

pub mod backend;
pub mod document;
pub mod encode;
pub mod input;
pub mod markdown;
pub mod postprocess;
pub mod render;
