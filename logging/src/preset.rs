//! Environment presets and logger construction.
//!
//! The two stock configurations operators reach for: a chatty console setup
//! for development and a JSON setup for production. Passing a filename
//! wires a rotating file sink into the output path list.

use std::sync::Mutex;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::{Deserialize, Serialize};
use tracing::Dispatch;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

use crate::error::LoggingError;
use crate::global::Logger;
use crate::rotate::LUMBERJACK_SCHEME;
use crate::sink::{open_sink, MultiSink};

// Characters escaped when a filename is embedded in a sink URI. The path
// separator stays verbatim so the URI resolves back to the same path.
const FILENAME_ESCAPE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'#')
    .add(b'?')
    .add(b'%');

/// Record encoding applied by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// Human-oriented single-line output.
    Console,
    /// One JSON object per record.
    Json,
}

/// Logger configuration: level directive, record encoding, and the list of
/// output destinations resolved through [`open_sink`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub level: String,
    pub encoding: Encoding,
    pub output_paths: Vec<String>,
}

impl Config {
    /// Development preset: debug level, console encoding, stderr output.
    /// A non-empty `filename` appends a rotating file sink.
    pub fn development(filename: Option<&str>) -> Self {
        let mut config = Self {
            level: "debug".to_string(),
            encoding: Encoding::Console,
            output_paths: vec!["stderr".to_string()],
        };
        config.push_rotating_file(filename);
        config
    }

    /// Production preset: info level, JSON encoding, stderr output.
    /// A non-empty `filename` appends a rotating file sink.
    pub fn production(filename: Option<&str>) -> Self {
        let mut config = Self {
            level: "info".to_string(),
            encoding: Encoding::Json,
            output_paths: vec!["stderr".to_string()],
        };
        config.push_rotating_file(filename);
        config
    }

    fn push_rotating_file(&mut self, filename: Option<&str>) {
        if let Some(name) = filename.filter(|n| !n.is_empty()) {
            self.output_paths.push(rotating_uri(name));
        }
    }

    /// Open every output path and build a ready-to-install logger.
    ///
    /// `RUST_LOG` overrides the configured level when set. Every
    /// configuration error (malformed sink URI, unknown scheme, unopenable
    /// file, bad level directive) surfaces here, before the logger is
    /// handed out.
    pub fn build(&self) -> Result<Logger, LoggingError> {
        let mut sinks = Vec::with_capacity(self.output_paths.len());
        for path in &self.output_paths {
            sinks.push(open_sink(path)?);
        }
        let writer = Mutex::new(MultiSink::new(sinks));

        let filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::try_new(&self.level).map_err(|source| {
                LoggingError::InvalidLevel {
                    level: self.level.clone(),
                    message: source.to_string(),
                }
            })?,
        };

        let dispatch = match self.encoding {
            Encoding::Console => {
                let layer = fmt::layer().with_writer(writer).with_ansi(false);
                Dispatch::new(tracing_subscriber::registry().with(filter).with(layer))
            }
            Encoding::Json => {
                let layer = fmt::layer().json().with_writer(writer).with_ansi(false);
                Dispatch::new(tracing_subscriber::registry().with(filter).with(layer))
            }
        };
        Ok(Logger::new(dispatch))
    }
}

/// Sink URI for a rotating log file, with the filename normalized to a
/// canonical slash form first.
///
/// Fails on an empty filename; the presets filter that case out and leave
/// the output list untouched instead.
pub fn rotating_file_uri(filename: &str) -> Result<String, LoggingError> {
    if filename.is_empty() {
        return Err(LoggingError::EmptyFileName);
    }
    Ok(rotating_uri(filename))
}

fn rotating_uri(filename: &str) -> String {
    let cleaned = clean_path(filename);
    format!(
        "{}:{}",
        LUMBERJACK_SCHEME,
        utf8_percent_encode(&cleaned, FILENAME_ESCAPE)
    )
}

/// Lexically normalize a filename: platform separators become `/`,
/// duplicate separators collapse, and `.`/`..` segments resolve without
/// touching the filesystem.
fn clean_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    let rooted = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.last().is_some_and(|s| *s != "..") {
                    segments.pop();
                } else if !rooted {
                    segments.push("..");
                }
            }
            other => segments.push(other),
        }
    }
    let joined = segments.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rotate::RotationPolicy;
    use std::io::Read;
    use url::Url;

    #[test]
    fn test_development_defaults() {
        let config = Config::development(None);
        assert_eq!(config.level, "debug");
        assert_eq!(config.encoding, Encoding::Console);
        assert_eq!(config.output_paths, vec!["stderr".to_string()]);
    }

    #[test]
    fn test_production_appends_rotating_sink_uri() {
        let config = Config::production(Some("app.log"));
        assert_eq!(config.level, "info");
        assert_eq!(config.encoding, Encoding::Json);
        assert_eq!(
            config.output_paths,
            vec!["stderr".to_string(), "lumberjack:app.log".to_string()]
        );
    }

    #[test]
    fn test_empty_filename_leaves_outputs_at_default() {
        assert_eq!(
            Config::production(Some("")).output_paths,
            vec!["stderr".to_string()]
        );
        assert_eq!(
            Config::development(None).output_paths,
            vec!["stderr".to_string()]
        );
    }

    #[test]
    fn test_rotating_file_uri_rejects_empty_name() {
        let err = rotating_file_uri("").unwrap_err();
        assert_eq!(err.to_string(), "file name can not be empty");
    }

    #[test]
    fn test_windows_separators_normalize_and_round_trip() {
        let uri = rotating_file_uri("C:\\logs\\a.log").unwrap();
        assert_eq!(uri, "lumberjack:C:/logs/a.log");
        let policy = RotationPolicy::from_uri(&Url::parse(&uri).unwrap()).unwrap();
        assert_eq!(policy.path, "C:/logs/a.log");
    }

    #[test]
    fn test_duplicate_separators_collapse() {
        let uri = rotating_file_uri("//var/log/foo.log").unwrap();
        assert_eq!(uri, "lumberjack:/var/log/foo.log");
        let policy = RotationPolicy::from_uri(&Url::parse(&uri).unwrap()).unwrap();
        assert_eq!(policy.path, "/var/log/foo.log");
    }

    #[test]
    fn test_clean_path_resolves_dot_segments() {
        assert_eq!(clean_path("logs/./a/../app.log"), "logs/app.log");
        assert_eq!(clean_path("../app.log"), "../app.log");
        assert_eq!(clean_path("/../app.log"), "/app.log");
        assert_eq!(clean_path("."), ".");
    }

    #[test]
    fn test_preset_uri_resolves_to_default_policy() {
        let config = Config::production(Some("app.log"));
        let uri = Url::parse(&config.output_paths[1]).unwrap();
        let policy = RotationPolicy::from_uri(&uri).unwrap();
        assert_eq!(policy, RotationPolicy::new("app.log").unwrap());
    }

    #[test]
    fn test_build_writes_json_records_through_file_sink() {
        std::env::remove_var("RUST_LOG");
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("build.log");
        let config = Config {
            level: "info".to_string(),
            encoding: Encoding::Json,
            output_paths: vec![path.to_str().unwrap().to_string()],
        };

        let logger = config.build().unwrap();
        logger.in_scope(|| tracing::info!(answer = 42, "wired through"));

        let mut contents = String::new();
        std::fs::File::open(&path)
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert!(contents.contains("wired through"));
        assert!(contents.contains("\"answer\":42"));
    }

    #[test]
    fn test_unknown_output_scheme_fails_at_build() {
        let config = Config {
            level: "info".to_string(),
            encoding: Encoding::Json,
            output_paths: vec!["bogus:where".to_string()],
        };
        assert!(matches!(
            config.build().unwrap_err(),
            LoggingError::UnknownScheme(_)
        ));
    }

    #[test]
    fn test_invalid_level_directive_fails_at_build() {
        std::env::remove_var("RUST_LOG");
        let config = Config {
            level: "shouty!!".to_string(),
            encoding: Encoding::Console,
            output_paths: vec!["stderr".to_string()],
        };
        assert!(matches!(
            config.build().unwrap_err(),
            LoggingError::InvalidLevel { .. }
        ));
    }

    #[test]
    fn test_config_deserializes_from_json() {
        let config: Config = serde_json::from_str(
            r#"{"level":"warn","encoding":"json","output_paths":["stdout","lumberjack:app.log"]}"#,
        )
        .unwrap();
        assert_eq!(config.level, "warn");
        assert_eq!(config.encoding, Encoding::Json);
        assert_eq!(config.output_paths.len(), 2);
    }
}
