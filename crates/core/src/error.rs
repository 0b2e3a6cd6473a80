/// Result alias that carries the custom [`FxError`] type.
pub type Result<T> = std::result::Result<T, FxError>;

/// Common error type for the core crate.
///
/// Only the edges of the crate are fallible: building buffers from caller
/// supplied pixel data and loading configuration. Per-frame processing never
/// returns an error.
#[derive(Debug, thiserror::Error)]
pub enum FxError {
    /// Pixel data does not match the requested dimensions.
    #[error("pixel data of length {len} does not fit a {width}x{height} frame")]
    Dimensions { width: usize, height: usize, len: usize },
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Malformed configuration document.
    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_errors_describe_the_mismatch() {
        let err = FxError::Dimensions {
            width: 4,
            height: 2,
            len: 7,
        };
        let text = format!("{err}");
        assert!(text.contains("4x2"));
        assert!(text.contains('7'));
    }
}
