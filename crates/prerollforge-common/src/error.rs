//! Unified error type for prerollforge.
//!
//! Validation failures are raised before the encoding engine is touched;
//! engine failures abort the remaining operation sequence. Every variant
//! renders a human-readable reason suitable for showing to the caller.

/// Unified error type covering all failure modes in prerollforge.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The frame rate is not a finite positive number.
    #[error("Invalid frame rate: {0:?}")]
    InvalidFrameRate(String),

    /// The resolution is not `<width>x<height>` with positive integers.
    #[error("Invalid resolution: {0:?}")]
    InvalidResolution(String),

    /// The derived tail segment would have a negative duration.
    #[error("Invalid timing: tail duration {tail:.6}s is negative (frame rate {frame_rate} is below 0.5)")]
    InvalidTiming {
        /// The frame rate that produced the negative tail.
        frame_rate: f64,
        /// The derived tail duration in seconds.
        tail: f64,
    },

    /// Request data failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// An engine operation was invoked before the engine finished initializing.
    #[error("Encoding engine is not ready; call initialize() first")]
    EngineNotReady,

    /// An engine operation signalled failure.
    #[error("Operation failed [{operation}]: {message}")]
    OperationFailed {
        /// Label of the operation that failed.
        operation: String,
        /// Human-readable error description.
        message: String,
    },

    /// The final output file was missing after all operations completed.
    #[error("Artifact retrieval failed: {name} was not produced")]
    ArtifactRetrieval {
        /// Name of the expected output file in engine storage.
        name: String,
    },

    /// A file was not present in engine working storage.
    #[error("File not found in working storage: {name}")]
    FileNotFound {
        /// The name that was looked up.
        name: String,
    },

    /// An external tool (ffmpeg) could not be found, spawned, or exited non-zero.
    #[error("Tool error [{tool}]: {message}")]
    Tool {
        /// Name of the tool that failed.
        tool: String,
        /// Human-readable error description.
        message: String,
    },

    /// Working storage could not be created or used.
    #[error("Workspace error: {0}")]
    Workspace(String),

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Convenience constructor for [`Error::Tool`].
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::OperationFailed`].
    pub fn operation_failed(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Error::OperationFailed {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::FileNotFound`].
    pub fn file_not_found(name: impl Into<String>) -> Self {
        Error::FileNotFound { name: name.into() }
    }

    /// Whether this error was raised while validating user input, i.e. before
    /// any engine operation was issued.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::InvalidFrameRate(_)
                | Error::InvalidResolution(_)
                | Error::InvalidTiming { .. }
                | Error::Validation(_)
        )
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
