use thiserror::Error;

/// Errors surfaced by the driver binary.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] vana_core::HabitError),

    #[error(transparent)]
    Config(#[from] vana_config::ConfigError),

    #[error("metrics encoding failed: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("a demo worker panicked")]
    WorkerPanic,
}
