//! Typed errors for loading a gallery.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("gallery directory not found: {0}")]
    MissingDirectory(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}:{line}: {message}")]
    Manifest {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("no images found in {0}")]
    Empty(PathBuf),
}
