//! # listrev core
//!
//! Plumbing shared by the listrev DAQ modules: the error and issue types,
//! named bounded queues, the worker thread helper and the module contract.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod issues;
pub mod module;
pub mod queue;
pub mod thread;

// Re-exports for convenience
pub use error::{Error, Result};
pub use issues::Issue;
pub use module::{Command, DaqModule, ModuleStats};
pub use queue::{DaqSink, DaqSource, PopError, PushError, Queue, QueueRegistry};
pub use thread::{RunningFlag, ThreadHelper};

/// Version of the listrev core crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging system
pub fn init_logging(log_level: log::LevelFilter) -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_millis()
        .try_init()
        .map_err(|e| Error::Internal(format!("logger already initialized: {}", e)))?;

    log::info!("listrev core v{} initialized", VERSION);
    Ok(())
}
