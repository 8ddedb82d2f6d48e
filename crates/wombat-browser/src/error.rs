//! Errors of the rendering front end.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by a render session or its layout driver.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A font file could not be read.
    #[error("failed to read font {path}")]
    FontIo {
        /// The file.
        path: PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// A font file was read but is not a usable font.
    #[error("invalid font {path}: {reason}")]
    InvalidFont {
        /// The file.
        path: PathBuf,
        /// What fontdue rejected.
        reason: String,
    },

    /// The layout driver task has stopped and no longer accepts events.
    #[error("layout driver has shut down")]
    DriverClosed,

    /// The layout driver task panicked or was cancelled.
    #[error("layout driver task failed: {0}")]
    DriverTask(String),
}
