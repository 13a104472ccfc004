//! Structured logging with `tracing`.
//!
//! One-shot subscriber initialization: env-filtered fmt output with thread
//! names, so the demo's worker threads are distinguishable in the log.

use tracing_subscriber::{fmt, EnvFilter};

#[derive(Clone)]
pub struct EventLogger;

impl EventLogger {
    /// Installs the global subscriber. Call once at process start; the
    /// `RUST_LOG` environment variable overrides the `info` default.
    pub fn init() {
        Self::init_with_default("info")
    }

    /// Like [`EventLogger::init`] with a configured fallback level used
    /// when `RUST_LOG` is unset.
    pub fn init_with_default(level: &str) {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
            )
            .with_thread_names(true)
            .init()
    }

    /// Logs one habit operation with its subject.
    #[inline]
    pub fn log_operation(operation: &str, habit: &str) {
        tracing::info!(operation, habit, "habit operation");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[traced_test]
    #[test]
    fn test_logging() {
        EventLogger::log_operation("insert", "träning");
        assert!(logs_contain("habit operation"));
    }
}
