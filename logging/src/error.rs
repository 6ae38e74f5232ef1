use thiserror::Error;

/// Errors surfaced while building logging configuration.
///
/// Every variant is a construction-time failure. Malformed sink URIs, bad
/// level directives, and registry conflicts are reported to the caller
/// before a logger is handed out; nothing is deferred to the first write.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("no output path specified: {0}")]
    NoOutputPath(String),

    #[error("invalid maxsize: {0}")]
    InvalidMaxSize(String),

    #[error("invalid maxage: {0}")]
    InvalidMaxAge(String),

    #[error("invalid maxbackups: {0}")]
    InvalidMaxBackups(String),

    #[error("output path can not be empty")]
    EmptyPath,

    #[error("file name can not be empty")]
    EmptyFileName,

    #[error("invalid log level {level:?}: {message}")]
    InvalidLevel { level: String, message: String },

    #[error("sink already registered for scheme {0:?}")]
    SchemeConflict(String),

    #[error("no sink registered for scheme {0:?}")]
    UnknownScheme(String),

    #[error("failed to open rotating writer for {path:?}")]
    RotationOpen {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("failed to open log file {path:?}")]
    FileOpen {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
