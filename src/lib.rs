//! # md2img
//!
//! Render Markdown into styled PNG/JPEG image cards.
//!
//! Markdown is turned into an HTML document carrying one of the bundled CSS
//! themes, laid out by an external HTML engine and rasterised. Without a
//! page size the result is a single long image trimmed to its content; with
//! one, long documents become a numbered series of fixed-size cards, which is
//! what social-media posts usually want.
//!
//! ## Pipeline Overview
//!
//! ```text
//! Markdown
//!  │
//!  ├─ 1. Input     read the file in its declared encoding
//!  ├─ 2. Markdown  comrak + TOC anchors + syntect highlighting
//!  ├─ 3. Document  HTML shell, theme CSS, extra CSS, @page rule
//!  ├─ 4. Backend   weasyprint → PDF   |   wkhtmltoimage → image
//!  ├─ 5. Render    rasterise PDF pages via pdfium
//!  ├─ 6. Post      stitch pages and crop whitespace (unpaged only)
//!  └─ 7. Encode    PNG, or JPEG at quality 95 for .jpg/.jpeg
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use md2img::{convert, ConversionConfig, PageSize, Style};
//!
//! fn main() -> Result<(), md2img::Md2ImgError> {
//!     let config = ConversionConfig::builder()
//!         .style(Style::Parchment)
//!         .page_size(PageSize::PORTRAIT_3_4)
//!         .build()?;
//!     let output = convert("# Hello\n\nWorld", "cards/hello.png", &config)?;
//!     for path in &output.images {
//!         println!("{}", path.display());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `md2img` binary (clap + indicatif + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! md2img = { version = "0.1", default-features = false }
//! ```
//!
//! ## Runtime Requirements
//!
//! | Backend | Needs |
//! |---------|-------|
//! | [`Backend::WeasyPrint`] | `weasyprint` on `PATH` and a PDFium shared library |
//! | [`Backend::Wkhtmltoimage`] | `wkhtmltoimage` on `PATH` |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod style;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    Backend, ConversionConfig, ConversionConfigBuilder, MarkdownExtension, PageSize,
    TextEncoding, DEFAULT_EXTENSIONS,
};
pub use convert::{convert, convert_file, md_to_images, OutputTarget};
pub use error::Md2ImgError;
pub use output::{ConversionOutput, ConversionStats};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use style::Style;
