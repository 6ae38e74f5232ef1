//! URI-addressable output sinks.
//!
//! Output path tokens resolve to boxed [`Sink`]s: `stdout` and `stderr`
//! name the standard streams, `file:` URIs and bare paths open append-mode
//! files, and any other scheme is dispatched through a process-wide
//! registry. The `lumberjack` rotation scheme is seeded into the registry
//! at first use.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::sync::RwLock;

use once_cell::sync::Lazy;
use url::Url;

use crate::error::LoggingError;
use crate::rotate;

/// A writable log destination addressed by an output path token.
pub trait Sink: Write + Send {
    /// Flush buffered state to the backing store. Destinations with nothing
    /// to flush keep the no-op default.
    fn sync(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl std::fmt::Debug for dyn Sink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Sink")
    }
}

/// Factory invoked with the parsed URI when its scheme matches.
pub type SinkConstructor =
    Box<dyn Fn(&Url) -> Result<Box<dyn Sink>, LoggingError> + Send + Sync>;

static REGISTRY: Lazy<RwLock<HashMap<String, SinkConstructor>>> = Lazy::new(|| {
    let mut schemes: HashMap<String, SinkConstructor> = HashMap::new();
    schemes.insert(
        rotate::LUMBERJACK_SCHEME.to_string(),
        Box::new(rotate::new_rotating_sink),
    );
    RwLock::new(schemes)
});

/// Register a sink constructor for a URI scheme.
///
/// Registration happens once, during process initialization, before any
/// logger is built. A scheme that is already present (including the
/// built-in `lumberjack` scheme) is a registration conflict.
pub fn register_sink(
    scheme: &str,
    constructor: SinkConstructor,
) -> Result<(), LoggingError> {
    let mut registry = REGISTRY.write().unwrap();
    if registry.contains_key(scheme) {
        return Err(LoggingError::SchemeConflict(scheme.to_string()));
    }
    registry.insert(scheme.to_string(), constructor);
    Ok(())
}

/// Resolve one output path token into a writable sink.
pub fn open_sink(path: &str) -> Result<Box<dyn Sink>, LoggingError> {
    match path {
        "stdout" => Ok(Box::new(StdoutSink)),
        "stderr" => Ok(Box::new(StderrSink)),
        _ => match Url::parse(path) {
            Ok(uri) if uri.scheme() == "file" => open_file(uri.path()),
            Ok(uri) => {
                let registry = REGISTRY.read().unwrap();
                let constructor = registry.get(uri.scheme()).ok_or_else(|| {
                    LoggingError::UnknownScheme(uri.scheme().to_string())
                })?;
                constructor(&uri)
            }
            // Not a URI at all: a plain filesystem path.
            Err(_) => open_file(path),
        },
    }
}

fn open_file(path: &str) -> Result<Box<dyn Sink>, LoggingError> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LoggingError::FileOpen {
            path: path.to_string(),
            source,
        })?;
    Ok(Box::new(FileSink(file)))
}

struct StdoutSink;

impl Write for StdoutSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stdout().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()
    }
}

impl Sink for StdoutSink {}

struct StderrSink;

impl Write for StderrSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

impl Sink for StderrSink {}

struct FileSink(File);

impl Write for FileSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

impl Sink for FileSink {
    fn sync(&mut self) -> io::Result<()> {
        self.0.sync_all()
    }
}

/// Fan-out writer over every sink opened for a configuration.
///
/// A write must reach every destination. The engine serializes access
/// behind a mutex, so a sequential broadcast is enough.
pub(crate) struct MultiSink {
    sinks: Vec<Box<dyn Sink>>,
}

impl MultiSink {
    pub(crate) fn new(sinks: Vec<Box<dyn Sink>>) -> Self {
        Self { sinks }
    }
}

impl Write for MultiSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for sink in &mut self.sinks {
            sink.write_all(buf)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        for sink in &mut self.sinks {
            sink.flush()?;
        }
        Ok(())
    }
}
