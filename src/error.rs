use thiserror::Error as ThisError;

/// Errors that can occur in the logging facade
#[derive(ThisError, Debug)]
pub enum Error {
    /// I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(String),
    /// The output pipeline could not be assembled.
    #[error("Initialization error: {0}")]
    Init(String),
    /// A sink failed to drain buffered output.
    #[error("Flush error on {sink}: {source}")]
    Flush {
        /// Description of the sink that failed.
        sink: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Time error: {0}")]
    Time(#[from] time::error::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
