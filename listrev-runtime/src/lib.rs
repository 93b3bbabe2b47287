//! # listrev runtime
//!
//! Actor-based host for the listrev modules. Each module runs behind a
//! [`ModuleActor`]; an [`Application`] builds the queues and actors from an
//! [`AppConfig`] and broadcasts lifecycle commands.

#![warn(missing_docs)]

pub mod actor;
pub mod app;

// Re-exports for convenience
pub use actor::{ExecuteCommand, GetStats, GetStatus, Init, ModuleActor, ModuleStatus};
pub use app::{AppConfig, Application, ModuleConfig, QueueConfig};
