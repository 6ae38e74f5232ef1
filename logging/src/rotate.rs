//! Rotating file sink addressed by `lumberjack:` URIs.
//!
//! A sink URI carries the destination path plus the rotation policy in its
//! query string:
//!
//! ```text
//! lumberjack:app.log?max_size=10&max_backups=5&compress=true
//! lumberjack:/var/log/app.log
//! lumberjack://localhost/var/log/app.log
//! ```
//!
//! The opaque form (`lumberjack:app.log`) takes the text after the scheme
//! verbatim; the hierarchical forms resolve to the slash-leading path, with
//! any authority accepted and ignored. Query keys match case-insensitively,
//! unrecognized keys are ignored, and the path is never URL-decoded.

use std::io::{self, Write};

use logroller::{Compression, LogRoller, LogRollerBuilder, Rotation, RotationSize, TimeZone};
use url::Url;

use crate::error::LoggingError;
use crate::sink::Sink;

/// URI scheme the rotating sink is registered under.
pub const LUMBERJACK_SCHEME: &str = "lumberjack";

/// Query key for the rotation size threshold in megabytes.
pub const MAX_SIZE_KEY: &str = "MAX_SIZE";
/// Query key for the retention age of rotated files in days.
pub const MAX_AGE_KEY: &str = "MAX_AGE";
/// Query key for the number of rotated files to keep.
pub const MAX_BACKUPS_KEY: &str = "MAX_BACKUPS";
/// Query key stamping rotated filenames with local time instead of UTC.
pub const LOCAL_TIME_KEY: &str = "LOCAL_TIME";
/// Query key enabling gzip compression of rotated files.
pub const COMPRESS_KEY: &str = "COMPRESS";

/// Desired behavior of the rotating writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationPolicy {
    /// Destination file path. Never empty.
    pub path: String,
    /// Size threshold in megabytes before the file rotates. `None` or a
    /// non-positive value defers to the writer's default.
    pub max_size_mb: Option<i64>,
    /// Retention age of rotated files in days.
    pub max_age_days: Option<i64>,
    /// Number of rotated files to keep.
    pub max_backups: Option<i64>,
    /// Stamp rotated filenames with local time instead of UTC.
    pub local_time: bool,
    /// Gzip-compress rotated files.
    pub compress: bool,
}

impl RotationPolicy {
    /// Policy for `path` with every optional field at its default.
    pub fn new(path: impl Into<String>) -> Result<Self, LoggingError> {
        let path = path.into();
        if path.is_empty() {
            return Err(LoggingError::EmptyPath);
        }
        Ok(Self {
            path,
            max_size_mb: None,
            max_age_days: None,
            max_backups: None,
            local_time: false,
            compress: false,
        })
    }

    /// Extract the policy encoded in a sink URI.
    ///
    /// The path is the opaque component when the scheme-specific part does
    /// not start with a slash, otherwise the hierarchical path; an absent
    /// path is a configuration error. `max_size`, `max_age` and
    /// `max_backups` take integer values; `local_time` and `compress` are
    /// presence flags whose value is ignored.
    pub fn from_uri(uri: &Url) -> Result<Self, LoggingError> {
        // Opaque and hierarchical URIs both surface the scheme-specific
        // text through path(); the authority, if any, is not part of it.
        let path = uri.path();
        if path.is_empty() {
            return Err(LoggingError::NoOutputPath(format!("{uri:?}")));
        }

        let mut policy = Self {
            path: path.to_string(),
            max_size_mb: None,
            max_age_days: None,
            max_backups: None,
            local_time: false,
            compress: false,
        };
        for (key, value) in uri.query_pairs() {
            match key.to_ascii_uppercase().as_str() {
                MAX_SIZE_KEY => {
                    policy.max_size_mb = Some(value.parse().map_err(|_| {
                        LoggingError::InvalidMaxSize(uri.to_string())
                    })?);
                }
                MAX_AGE_KEY => {
                    policy.max_age_days = Some(value.parse().map_err(|_| {
                        LoggingError::InvalidMaxAge(uri.to_string())
                    })?);
                }
                MAX_BACKUPS_KEY => {
                    policy.max_backups = Some(value.parse().map_err(|_| {
                        LoggingError::InvalidMaxBackups(uri.to_string())
                    })?);
                }
                LOCAL_TIME_KEY => policy.local_time = true,
                COMPRESS_KEY => policy.compress = true,
                _ => {}
            }
        }
        Ok(policy)
    }

    /// Hand the policy to the rotation writer.
    ///
    /// `max_size` maps to the size-based rotation threshold, `max_backups`
    /// to the retained-file cap, `local_time` to local-time stamping and
    /// `compress` to gzip compression. Absent or non-positive values fall
    /// back to the writer's defaults; `max_age` rides along in the policy
    /// while pruning is governed by the retained-file cap.
    fn open(&self) -> Result<LogRoller, LoggingError> {
        let (directory, file_name) = split_file_path(&self.path)?;
        let mut builder = LogRollerBuilder::new(directory, file_name);
        if let Some(megabytes) = positive(self.max_size_mb) {
            builder = builder.rotation(Rotation::SizeBased(RotationSize::MB(megabytes)));
        }
        if let Some(count) = positive(self.max_backups) {
            builder = builder.max_keep_files(count);
        }
        if self.local_time {
            builder = builder.time_zone(TimeZone::Local);
        }
        if self.compress {
            builder = builder.compression(Compression::Gzip);
        }
        builder.build().map_err(|source| LoggingError::RotationOpen {
            path: self.path.clone(),
            source: Box::new(source),
        })
    }
}

/// Sink constructor dispatched for `lumberjack:` URIs.
pub(crate) fn new_rotating_sink(uri: &Url) -> Result<Box<dyn Sink>, LoggingError> {
    let policy = RotationPolicy::from_uri(uri)?;
    let roller = policy.open()?;
    Ok(Box::new(RotatingSink { roller }))
}

fn positive(value: Option<i64>) -> Option<u64> {
    value.filter(|v| *v > 0).map(|v| v as u64)
}

// Lexical split of the destination into (directory, file name). Sink URI
// paths are slash-separated.
fn split_file_path(path: &str) -> Result<(&str, &str), LoggingError> {
    let (directory, file_name) = match path.rfind('/') {
        Some(0) => ("/", &path[1..]),
        Some(idx) => (&path[..idx], &path[idx + 1..]),
        None => (".", path),
    };
    if file_name.is_empty() {
        return Err(LoggingError::EmptyFileName);
    }
    Ok((directory, file_name))
}

/// Rotation happens inside the writer, so `sync` keeps the no-op default.
struct RotatingSink {
    roller: LogRoller,
}

impl Write for RotatingSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.roller.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.roller.flush()
    }
}

impl Sink for RotatingSink {}
