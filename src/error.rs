use std::path::PathBuf;

use thiserror::Error;

use crate::config::SUPPORTED_HEIGHTS;

/// Every way a run can fail. None of them are recoverable mid-run; a failed
/// run has to be restarted from frame 0.
#[derive(Debug, Error)]
pub enum StreamgenError {
    #[error("unsupported height {0}, expected one of {:?}", SUPPORTED_HEIGHTS)]
    UnsupportedHeight(u32),

    #[error("failed to load font {}: {reason}", .path.display())]
    Font { path: PathBuf, reason: String },

    #[error("frame {index} is outside 0..={total}")]
    FrameOutOfRange { index: u32, total: u32 },

    #[error("failed to write frame {index}")]
    Output {
        index: u32,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to write audio samples")]
    Audio(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StreamgenError>;
