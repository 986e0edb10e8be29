//! Input and output path handling: read Markdown sources, derive and prepare
//! output locations.

use crate::config::TextEncoding;
use crate::error::Md2ImgError;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Read and decode a Markdown source file.
pub fn read_markdown(path: &Path, encoding: TextEncoding) -> Result<String, Md2ImgError> {
    if !path.exists() {
        return Err(Md2ImgError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let mut bytes = Vec::new();
    match std::fs::File::open(path) {
        Ok(mut f) => {
            f.read_to_end(&mut bytes)
                .map_err(|e| map_read_error(path, e))?;
        }
        Err(e) => return Err(map_read_error(path, e)),
    }

    let text = encoding.decode(bytes).map_err(|detail| Md2ImgError::Decode {
        path: path.to_path_buf(),
        encoding: encoding.name().to_string(),
        detail,
    })?;
    debug!(
        "Read {} ({} chars, {})",
        path.display(),
        text.chars().count(),
        encoding
    );
    Ok(text)
}

fn map_read_error(path: &Path, e: std::io::Error) -> Md2ImgError {
    match e.kind() {
        ErrorKind::PermissionDenied => Md2ImgError::PermissionDenied {
            path: path.to_path_buf(),
        },
        ErrorKind::NotFound => Md2ImgError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => Md2ImgError::Decode {
            path: path.to_path_buf(),
            encoding: "bytes".to_string(),
            detail: e.to_string(),
        },
    }
}

/// The source path with its extension replaced by `.png`.
pub fn default_output_path(source: &Path) -> PathBuf {
    source.with_extension("png")
}

/// Create the parent directory of `path` if it has one.
pub fn ensure_parent_dir(path: &Path) -> Result<(), Md2ImgError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir(parent),
        _ => Ok(()),
    }
}

/// Create `dir` and all its ancestors.
pub fn ensure_dir(dir: &Path) -> Result<(), Md2ImgError> {
    std::fs::create_dir_all(dir).map_err(|e| Md2ImgError::OutputWriteFailed {
        path: dir.to_path_buf(),
        source: e,
    })
}

/// Make `path` absolute against the current directory without touching
/// the filesystem.
pub fn absolute(path: &Path) -> Result<PathBuf, Md2ImgError> {
    std::path::absolute(path).map_err(|e| Md2ImgError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    })
}
