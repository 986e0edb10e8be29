//! # md2img-pdfium
//!
//! Locate a [PDFium](https://pdfium.googlesource.com/pdfium/) shared library
//! on the host and bind it through `pdfium-render`.
//!
//! `pdfium-render` only loads the library; it does not know where a user put
//! it. This crate owns that lookup so every caller searches the same places
//! in the same order and, when nothing is found, reports every location it
//! tried.
//!
//! ## Search order
//!
//! 1. `PDFIUM_LIB_PATH`: a library file, or a directory containing one.
//! 2. [`library_dir`]: `MD2IMG_PDFIUM_DIR`, else the per-user cache
//!    directory (`~/.cache/md2img/pdfium` on Linux).
//! 3. The directory holding the running executable.
//! 4. The system library search path (`LD_LIBRARY_PATH`, `DYLD_LIBRARY_PATH`,
//!    `PATH`).
//!
//! ## Usage
//!
//! ```rust,no_run
//! let pdfium = md2img_pdfium::bind_pdfium().expect("PDFium unavailable");
//! ```
//!
//! ## Platform support
//!
//! | OS      | Library               |
//! |---------|-----------------------|
//! | macOS   | `libpdfium.dylib`     |
//! | Linux   | `libpdfium.so`        |
//! | Windows | `pdfium.dll`          |

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use pdfium_render::prelude::Pdfium;
use thiserror::Error;

// ── Error type ───────────────────────────────────────────────────────────────

/// Errors returned while locating or binding PDFium.
#[derive(Error, Debug)]
pub enum PdfiumLocateError {
    /// The current OS has no known PDFium library name.
    #[error("Unsupported platform: {os}/{arch}")]
    UnsupportedPlatform { os: String, arch: String },

    /// A library file was found but `pdfium-render` could not load it.
    #[error("Failed to bind PDFium from '{path}': {reason}")]
    Bind { path: PathBuf, reason: String },

    /// No candidate existed and the system lookup failed too.
    #[error(
        "PDFium library not found.\nSearched: {}\nSystem lookup: {reason}",
        format_searched(.searched)
    )]
    NotFound {
        searched: Vec<PathBuf>,
        reason: String,
    },
}

fn format_searched(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "(no candidate locations)".to_string();
    }
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

// ── Platform metadata ────────────────────────────────────────────────────────

/// The file name of the PDFium shared library on this platform.
pub fn library_name() -> Result<&'static str, PdfiumLocateError> {
    match std::env::consts::OS {
        "macos" => Ok("libpdfium.dylib"),
        "linux" | "freebsd" | "openbsd" | "netbsd" => Ok("libpdfium.so"),
        "windows" => Ok("pdfium.dll"),
        os => Err(PdfiumLocateError::UnsupportedPlatform {
            os: os.to_string(),
            arch: std::env::consts::ARCH.to_string(),
        }),
    }
}

/// Returns the per-user directory md2img looks in for a PDFium library.
///
/// Default locations:
/// - **macOS**: `~/Library/Caches/md2img/pdfium/`
/// - **Linux**: `~/.cache/md2img/pdfium/`
/// - **Windows**: `%LOCALAPPDATA%\md2img\pdfium\`
///
/// Override by setting `MD2IMG_PDFIUM_DIR`.
pub fn library_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("MD2IMG_PDFIUM_DIR") {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }

    let base = dirs::cache_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".cache")))
        .unwrap_or_else(std::env::temp_dir);

    base.join("md2img").join("pdfium")
}

/// Every file location checked before falling back to the system lookup,
/// in search order.
pub fn candidate_paths() -> Result<Vec<PathBuf>, PdfiumLocateError> {
    let name = library_name()?;
    let mut candidates = Vec::with_capacity(3);

    if let Ok(env_path) = std::env::var("PDFIUM_LIB_PATH") {
        if !env_path.is_empty() {
            let p = PathBuf::from(env_path);
            if p.is_dir() {
                candidates.push(p.join(name));
            } else {
                candidates.push(p);
            }
        }
    }

    candidates.push(library_dir().join(name));

    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        candidates.push(exe_dir.join(name));
    }

    Ok(candidates)
}

/// The first candidate location that holds a library file, if any.
pub fn locate_pdfium_library() -> Option<PathBuf> {
    candidate_paths()
        .ok()?
        .into_iter()
        .find(|p| p.is_file())
}

// ── Binding ──────────────────────────────────────────────────────────────────

static RESOLVED_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Binds to PDFium using the search order described in the crate docs.
///
/// The file location that bound successfully is remembered for the rest of
/// the process so later calls skip the search.
pub fn bind_pdfium() -> Result<Pdfium, PdfiumLocateError> {
    if let Some(path) = RESOLVED_PATH.get() {
        return bind_pdfium_from_path(path);
    }

    if let Some(path) = locate_pdfium_library() {
        let pdfium = bind_pdfium_from_path(&path)?;
        let _ = RESOLVED_PATH.set(path);
        return Ok(pdfium);
    }

    Pdfium::bind_to_system_library()
        .map(Pdfium::new)
        .map_err(|e| PdfiumLocateError::NotFound {
            searched: candidate_paths().unwrap_or_default(),
            reason: e.to_string(),
        })
}

/// Binds to a PDFium library at an explicit `path`.
pub fn bind_pdfium_from_path(path: &Path) -> Result<Pdfium, PdfiumLocateError> {
    Pdfium::bind_to_library(path)
        .map(Pdfium::new)
        .map_err(|e| PdfiumLocateError::Bind {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
