//! Reportable conditions raised by DAQ modules
//!
//! An [`Issue`] is not returned to the caller: it is formatted and handed to
//! the `log` facade at the level the condition calls for. Keeping the
//! wording in one place gives every module the same log lines.

use thiserror::Error;

/// Named conditions shared by the DAQ modules
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Issue {
    /// Free-form progress report
    #[error("{name}: {message}")]
    ProgressUpdate {
        /// Module instance name
        name: String,
        /// Progress text
        message: String,
    },

    /// A queue handle was missing when the worker started
    #[error("{name}: The {queue_type} queue was not successfully created.")]
    InvalidQueue {
        /// Module instance name
        name: String,
        /// Which queue, e.g. "input" or "reversed data"
        queue_type: String,
    },

    /// A queue operation did not complete in time
    #[error("{name}: Unable to {operation} within timeout period (timeout period was {timeout_ms} milliseconds)")]
    QueueTimeoutExpired {
        /// Module instance name
        name: String,
        /// What was attempted, e.g. `push to output queue "reversed"`
        operation: String,
        /// Timeout that expired
        timeout_ms: u64,
    },

    /// Generator has nowhere to send its lists
    #[error("{name}: No output queues were available, so the generated list of integers will be dropped. Has initialization been successfully completed?")]
    NoOutputQueuesAvailable {
        /// Module instance name
        name: String,
    },

    /// Doubly-reversed list differs from the original
    #[error("{name}: Data mismatch when validating lists: doubly-reversed list contents = {reversed}, original list contents = {original}")]
    DataMismatch {
        /// Module instance name
        name: String,
        /// Formatted doubly-reversed list
        reversed: String,
        /// Formatted original list
        original: String,
    },
}

impl Issue {
    /// Progress report for `name`
    pub fn progress(name: &str, message: impl Into<String>) -> Self {
        Issue::ProgressUpdate {
            name: name.to_string(),
            message: message.into(),
        }
    }

    /// Timeout report for `name`
    pub fn queue_timeout(name: &str, operation: impl Into<String>, timeout_ms: u64) -> Self {
        Issue::QueueTimeoutExpired {
            name: name.to_string(),
            operation: operation.into(),
            timeout_ms,
        }
    }

    /// Missing-queue report for `name`
    pub fn invalid_queue(name: &str, queue_type: &str) -> Self {
        Issue::InvalidQueue {
            name: name.to_string(),
            queue_type: queue_type.to_string(),
        }
    }
}
