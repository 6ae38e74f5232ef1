//! Process-wide structured logging with URI-addressable rotating file sinks.
//!
//! Three pieces:
//! - a global logger slot ([`set_logger`] / [`logger`]) holding the active
//!   [`Logger`] behind a lock-free atomic cell, seeded with a no-op logger;
//! - a sink layer resolving output path tokens (`stdout`, `stderr`, plain
//!   paths, `file:` URIs, or registered schemes) into writable sinks, with
//!   a built-in `lumberjack:` scheme that carries a [`RotationPolicy`] in
//!   its query string;
//! - environment presets ([`Config::development`] / [`Config::production`])
//!   that wire a rotating file sink into the output path list and build a
//!   ready-to-install logger on top of `tracing`.
//!
//! ```no_run
//! use timberline_logging::{logger, set_logger, Config};
//!
//! # fn main() -> Result<(), timberline_logging::LoggingError> {
//! let config = Config::production(Some("logs/app.log"));
//! set_logger(config.build()?);
//! logger().in_scope(|| tracing::info!(port = 8080, "listening"));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod global;
pub mod preset;
pub mod rotate;
pub mod sink;

pub use error::LoggingError;
pub use global::{logger, set_logger, Logger};
pub use preset::{rotating_file_uri, Config, Encoding};
pub use rotate::{RotationPolicy, LUMBERJACK_SCHEME};
pub use sink::{open_sink, register_sink, Sink, SinkConstructor};
