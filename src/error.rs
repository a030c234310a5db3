use alloc::string::String;
use enough::StopReason;

/// Errors from device pixel encoding and the display pipeline.
///
/// The layered-cache mutators themselves are infallible (allocation
/// exhaustion aborts); these errors surface only at the encoder boundary
/// and mark configuration problems callers should treat as fatal.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum StageError {
    #[error("unsupported pixel format: {0}")]
    UnsupportedFormat(String),

    #[error("dimensions too large: {width}x{height}")]
    DimensionsTooLarge { width: u32, height: u32 },

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("buffer too small: need {needed} bytes, got {actual}")]
    BufferTooSmall { needed: usize, actual: usize },

    #[error("indexed operation requires a palette")]
    MissingPalette,

    #[error("indexed target requires a resolved color table")]
    MissingColorTable,

    #[error("operation cancelled")]
    Cancelled(StopReason),
}

impl From<StopReason> for StageError {
    fn from(r: StopReason) -> Self {
        StageError::Cancelled(r)
    }
}
