//! Logging setup for simulation runs.

mod logging;

pub use logging::{log_file_name, setup_logging, WorkerGuard};
