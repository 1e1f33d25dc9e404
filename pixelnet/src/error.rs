use thiserror::Error;

/// The error type for `PixelNet-Burn` operations.
///
/// Every failure mode is a shape or configuration mismatch surfaced at
/// construction time or on the first forward pass; nothing is retried or
/// recovered internally.
#[derive(Error, Debug)]
pub enum PixelNetError {
    /// Error for when an invalid model configuration is provided.
    #[error("Invalid model configuration: {reason}")]
    InvalidConfiguration {
        /// The reason why the configuration is invalid.
        reason: String,
    },

    /// Error for when an input tensor has an invalid shape.
    #[error("Invalid input tensor shape: expected {expected}, got {actual}")]
    InvalidTensorShape {
        /// The expected tensor shape.
        expected: String,
        /// The actual tensor shape.
        actual: String,
    },

    /// Error for when loading pretrained backbone weights fails.
    #[error("Failed to load weights: {reason}")]
    WeightLoadingFailed {
        /// The reason for the weight loading failure.
        reason: String,
    },
}

/// A specialized `Result` type for `PixelNet-Burn` operations.
pub type PixelNetResult<T> = Result<T, PixelNetError>;
