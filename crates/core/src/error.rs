//! Error types for the topography core.

use thiserror::Error;

/// Errors produced by engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Width or height was zero (or not finite) when sizing a grid or surface.
    #[error("invalid dimensions: width and height must be non-zero")]
    InvalidDimensions,

    /// A configuration value was present but outside its accepted range.
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// A (col, row) coordinate was outside the grid bounds.
    #[error("index ({x}, {y}) out of bounds for field of size ({width}, {height})")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    /// Two buffers had incompatible dimensions.
    #[error("dimension mismatch: ({lhs_w}, {lhs_h}) vs ({rhs_w}, {rhs_h})")]
    DimensionMismatch {
        lhs_w: usize,
        lhs_h: usize,
        rhs_w: usize,
        rhs_h: usize,
    },

    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// A size query callback could not produce a usable size.
    #[error("surface size unavailable: {0}")]
    SizeUnavailable(String),

    /// No engine is registered under the given name.
    #[error("unknown engine: {0}")]
    UnknownEngine(String),

    /// Snapshot or file I/O failed.
    #[error("i/o error: {0}")]
    Io(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_dimensions_displays_readable_message() {
        let msg = EngineError::InvalidDimensions.to_string();
        assert!(
            msg.contains("width") && msg.contains("height"),
            "expected message mentioning width and height, got: {msg}"
        );
    }

    #[test]
    fn invalid_parameter_includes_name_and_reason() {
        let err = EngineError::InvalidParameter {
            name: "decay".into(),
            reason: "must be in (0, 1]".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("decay"), "missing name in: {msg}");
        assert!(msg.contains("(0, 1]"), "missing reason in: {msg}");
    }

    #[test]
    fn out_of_bounds_includes_coordinates_and_dimensions() {
        let err = EngineError::OutOfBounds {
            x: 10,
            y: 20,
            width: 8,
            height: 8,
        };
        let msg = err.to_string();
        assert!(msg.contains("10"), "missing x in: {msg}");
        assert!(msg.contains("20"), "missing y in: {msg}");
        assert!(msg.contains("8"), "missing dimension in: {msg}");
    }

    #[test]
    fn size_unavailable_includes_message() {
        let msg = EngineError::SizeUnavailable("callback failed".into()).to_string();
        assert!(msg.contains("callback failed"), "missing message in: {msg}");
    }

    #[test]
    fn unknown_engine_includes_name() {
        let msg = EngineError::UnknownEngine("ripple".into()).to_string();
        assert!(msg.contains("ripple"), "missing name in: {msg}");
    }

    #[test]
    fn engine_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EngineError>();
    }

    #[test]
    fn engine_error_implements_std_error() {
        fn assert_std_error<T: std::error::Error>() {}
        assert_std_error::<EngineError>();
    }
}
