//! Error types for the encode pipeline.

use crate::resolution::Resolution;
use std::path::PathBuf;

/// Result type alias using our error type.
pub type Result<T> = std::result::Result<T, EncodeError>;

/// Failures that abort an encode job.
///
/// Every variant is reported to the UI as a single message; nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// ffprobe failed or produced output we could not use.
    #[error("probe failed: {0}")]
    Probe(String),

    /// The requested size is more than twice the source in some dimension.
    #[error("excessive upscaling (source: {source_size}, requested: {requested})")]
    ExcessiveUpscale {
        source_size: Resolution,
        requested: Resolution,
    },

    /// ffmpeg failed while producing the raw intermediate.
    #[error("conversion failed: {0}")]
    Conversion(String),

    /// The encoder binary is not next to the executable.
    #[error("{binary} not found in directory: {}", dir.display())]
    EncoderNotFound { binary: String, dir: PathBuf },

    /// The encoder could not be started or exited with an error.
    #[error("encoding failed: {0}")]
    Encode(String),

    /// Another job is still running.
    #[error("an encode is already running for {}", .0.display())]
    Busy(PathBuf),
}
