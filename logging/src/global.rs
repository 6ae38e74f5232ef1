//! Process-wide logger slot.
//!
//! Holds "the current logger" behind a lock-free atomic cell. The slot is
//! seeded with a no-op logger before any caller can observe it, lives for
//! the process lifetime, and is replaced wholesale by [`set_logger`].

use std::sync::Arc;

use arc_swap::ArcSwap;
use once_cell::sync::Lazy;
use tracing::dispatcher;
use tracing::Dispatch;

static INSTANCE: Lazy<ArcSwap<Logger>> =
    Lazy::new(|| ArcSwap::from_pointee(Logger::noop()));

/// Handle to a fully built logging pipeline.
///
/// Wraps the engine dispatcher; clones are cheap and share the same
/// underlying subscriber.
#[derive(Debug, Clone)]
pub struct Logger {
    dispatch: Dispatch,
}

impl Logger {
    /// Logger that accepts every record and discards it.
    pub fn noop() -> Self {
        Self {
            dispatch: Dispatch::none(),
        }
    }

    pub fn new(dispatch: Dispatch) -> Self {
        Self { dispatch }
    }

    /// The underlying engine dispatcher.
    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// Run `f` with this logger as the thread's default dispatcher, so
    /// records emitted inside the closure are routed through it.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        dispatcher::with_default(&self.dispatch, f)
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::noop()
    }
}

impl From<Dispatch> for Logger {
    fn from(dispatch: Dispatch) -> Self {
        Self::new(dispatch)
    }
}

/// Atomically replace the process-wide logger, returning the instance that
/// was installed before. Safe under unbounded concurrent callers; the last
/// writer wins. Ownership of the previous logger transfers to the caller.
pub fn set_logger(logger: impl Into<Arc<Logger>>) -> Arc<Logger> {
    INSTANCE.swap(logger.into())
}

/// The currently installed process-wide logger. Never blocks.
pub fn logger() -> Arc<Logger> {
    INSTANCE.load_full()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test so slot mutations never interleave with another test's
    // assertions.
    #[test]
    fn test_swap_returns_previous_and_survives_concurrent_writers() {
        let first = Arc::new(Logger::noop());
        let initial = set_logger(first.clone());
        initial.in_scope(|| tracing::info!("discarded by the seed logger"));

        let second = Arc::new(Logger::noop());
        let previous = set_logger(second.clone());
        assert!(Arc::ptr_eq(&previous, &first));
        assert!(Arc::ptr_eq(&logger(), &second));

        let candidates: Vec<Arc<Logger>> =
            (0..8).map(|_| Arc::new(Logger::noop())).collect();
        let writers: Vec<_> = candidates
            .iter()
            .cloned()
            .map(|candidate| {
                std::thread::spawn(move || {
                    set_logger(candidate);
                    logger().in_scope(|| tracing::info!("still usable mid-race"));
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        let current = logger();
        assert!(candidates.iter().any(|c| Arc::ptr_eq(c, &current)));
    }
}
