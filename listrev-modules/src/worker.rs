//! Queue retry loops shared by the module workers

use std::time::Duration;

use listrev_core::{DaqSink, DaqSource, Issue, PopError, PushError, RunningFlag};
use log::{error, trace, warn};

pub(crate) fn timeout_ms(timeout: Duration) -> u64 {
    u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX)
}

/// Push `value` onto `sink`, retrying on timeout while `running` holds.
///
/// Returns `true` once the value was accepted.
pub(crate) fn push_with_retry<T>(
    module: &str,
    sink: &DaqSink<T>,
    mut value: T,
    timeout: Duration,
    running: &RunningFlag,
) -> bool {
    while running.is_running() {
        trace!("{}: Pushing the list onto queue {}", module, sink.name());
        match sink.push(value, timeout) {
            Ok(()) => return true,
            Err(PushError::Timeout(rejected)) => {
                let operation = format!("push to output queue \"{}\"", sink.name());
                warn!("{}", Issue::queue_timeout(module, operation, timeout_ms(timeout)));
                value = rejected;
            }
            Err(PushError::Disconnected(_)) => {
                error!("{}: output queue \"{}\" is disconnected", module, sink.name());
                return false;
            }
        }
    }
    false
}

/// Pop from `source`, warning and retrying on timeout while `running` holds
pub(crate) fn pop_with_retry<T>(
    module: &str,
    source: &DaqSource<T>,
    operation: &str,
    timeout: Duration,
    running: &RunningFlag,
) -> Option<T> {
    while running.is_running() {
        trace!("{}: Popping the next element off queue {}", module, source.name());
        match source.pop(timeout) {
            Ok(value) => return Some(value),
            Err(PopError::Timeout) => {
                warn!("{}", Issue::queue_timeout(module, operation, timeout_ms(timeout)));
            }
            Err(PopError::Disconnected) => {
                error!("{}: input queue \"{}\" is disconnected", module, source.name());
                return None;
            }
        }
    }
    None
}
