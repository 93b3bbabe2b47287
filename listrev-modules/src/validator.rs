//! ReversedListValidator
//!
//! Reads lists of integers from two queues and checks that each list from
//! the reversed-data queue holds the same elements as the matching list from
//! the original-data queue, in opposite order.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use listrev_core::config::{default_queue_timeout_ms, parse_module_config, queue_timeout};
use listrev_core::{
    DaqModule, DaqSource, Issue, ModuleStats, PopError, QueueRegistry, Result, RunningFlag,
    ThreadHelper,
};
use log::{debug, error, info, trace, warn};
use serde::Deserialize;
use serde_json::Value;

use crate::list::{self, IntList, ListDisplay};
use crate::worker::pop_with_retry;

/// Name under which the module is registered
pub const PLUGIN_NAME: &str = "ReversedListValidator";

/// Validator configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ValidatorConfig {
    /// Queue carrying lists that went through the reverser
    pub reversed_data_input: String,

    /// Queue carrying the lists as generated
    pub original_data_input: String,

    /// Timeout of a single pop attempt
    #[serde(default = "default_queue_timeout_ms", rename = "queueTimeoutMsec")]
    pub queue_timeout_msec: u64,
}

#[derive(Debug, Default)]
struct ValidatorCounters {
    received: AtomicU64,
    compared: AtomicU64,
    mismatches: AtomicU64,
}

/// Outcome of validating one pair of lists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    /// Reversing the reversed list gives back the original
    Match,
    /// It does not
    Mismatch,
}

/// Compare a list that went through the reverser with its original
pub fn validate(reversed: &[i32], original: &[i32]) -> Validation {
    if list::is_reversal_of(reversed, original) {
        Validation::Match
    } else {
        Validation::Mismatch
    }
}

/// Checks the reverser's output against the generator's original lists
pub struct ReversedListValidator {
    name: String,
    thread: ThreadHelper,
    reversed_data_queue: Option<DaqSource<IntList>>,
    original_data_queue: Option<DaqSource<IntList>>,
    queue_timeout: Duration,
    counters: Arc<ValidatorCounters>,
}

impl ReversedListValidator {
    /// Create an uninitialised validator named `name`
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            thread: ThreadHelper::new(name.clone()),
            name,
            reversed_data_queue: None,
            original_data_queue: None,
            queue_timeout: queue_timeout(default_queue_timeout_ms()),
            counters: Arc::new(ValidatorCounters::default()),
        }
    }

    /// Whether the worker thread is running
    pub fn is_running(&self) -> bool {
        self.thread.thread_running()
    }
}

impl DaqModule for ReversedListValidator {
    fn name(&self) -> &str {
        &self.name
    }

    fn init(&mut self, config: &Value, queues: &QueueRegistry) -> Result<()> {
        trace!("{}: Entering init() method", self.name);
        let config: ValidatorConfig = parse_module_config(&self.name, config)?;
        self.reversed_data_queue = Some(queues.source::<IntList>(&config.reversed_data_input)?);
        self.original_data_queue = Some(queues.source::<IntList>(&config.original_data_input)?);
        self.queue_timeout = queue_timeout(config.queue_timeout_msec);
        trace!("{}: Exiting init() method", self.name);
        Ok(())
    }

    fn start(&mut self, _args: &[String]) -> Result<()> {
        trace!("{}: Entering start() method", self.name);
        self.counters.received.store(0, Ordering::Relaxed);
        self.counters.compared.store(0, Ordering::Relaxed);
        self.counters.mismatches.store(0, Ordering::Relaxed);

        let worker = ValidatorWorker {
            name: self.name.clone(),
            reversed_data_queue: self.reversed_data_queue.clone(),
            original_data_queue: self.original_data_queue.clone(),
            queue_timeout: self.queue_timeout,
            counters: Arc::clone(&self.counters),
        };
        self.thread.start_working_thread(move |running| worker.run(running))?;
        info!("{} successfully started", self.name);
        trace!("{}: Exiting start() method", self.name);
        Ok(())
    }

    fn stop(&mut self, _args: &[String]) -> Result<()> {
        trace!("{}: Entering stop() method", self.name);
        self.thread.stop_working_thread()?;
        info!("{} successfully stopped", self.name);
        trace!("{}: Exiting stop() method", self.name);
        Ok(())
    }

    fn stats(&self) -> ModuleStats {
        ModuleStats::new()
            .with("received", self.counters.received.load(Ordering::Relaxed))
            .with("compared", self.counters.compared.load(Ordering::Relaxed))
            .with("mismatches", self.counters.mismatches.load(Ordering::Relaxed))
    }
}

struct ValidatorWorker {
    name: String,
    reversed_data_queue: Option<DaqSource<IntList>>,
    original_data_queue: Option<DaqSource<IntList>>,
    queue_timeout: Duration,
    counters: Arc<ValidatorCounters>,
}

impl ValidatorWorker {
    fn run(self, running: RunningFlag) {
        trace!("{}: Entering work loop", self.name);

        if self.reversed_data_queue.is_none() {
            error!("{}", Issue::invalid_queue(&self.name, "reversed data"));
        }
        if self.original_data_queue.is_none() {
            error!("{}", Issue::invalid_queue(&self.name, "original data"));
        }

        if let (Some(reversed_queue), Some(original_queue)) =
            (&self.reversed_data_queue, &self.original_data_queue)
        {
            while running.is_running() {
                trace!("{}: Going to receive data from the reversed list queue", self.name);
                let reversed = match reversed_queue.pop(self.queue_timeout) {
                    Ok(list) => list,
                    Err(PopError::Timeout) => continue,
                    Err(PopError::Disconnected) => {
                        error!(
                            "{}: reversed data queue \"{}\" is disconnected",
                            self.name,
                            reversed_queue.name()
                        );
                        break;
                    }
                };
                let received = self.counters.received.fetch_add(1, Ordering::Relaxed) + 1;
                trace!(
                    "{}: Received reversed list #{}. It has size {}. Now going to receive data from the original data queue.",
                    self.name,
                    received,
                    reversed.len()
                );

                let original = match pop_with_retry(
                    &self.name,
                    original_queue,
                    "pop from original data queue",
                    self.queue_timeout,
                    &running,
                ) {
                    Some(list) => list,
                    None => continue,
                };
                self.counters.compared.fetch_add(1, Ordering::Relaxed);

                let message = format!(
                    "Validating list #{}, original contents {} and reversed contents {}.",
                    received,
                    ListDisplay(&original),
                    ListDisplay(&reversed)
                );
                debug!("{}", Issue::progress(&self.name, message));

                trace!("{}: Comparing the doubly-reversed list with the original", self.name);
                if validate(&reversed, &original) == Validation::Mismatch {
                    self.counters.mismatches.fetch_add(1, Ordering::Relaxed);
                    let doubly_reversed = list::reverse(&reversed);
                    warn!(
                        "{}",
                        Issue::DataMismatch {
                            name: self.name.clone(),
                            reversed: ListDisplay(&doubly_reversed).to_string(),
                            original: ListDisplay(&original).to_string(),
                        }
                    );
                }
                trace!("{}: End of work loop iteration", self.name);
            }
        }

        info!(
            "{}",
            Issue::progress(
                &self.name,
                format!(
                    "Exiting work loop, received {} reversed lists, compared {} of them to their original data, and found {} mismatches.",
                    self.counters.received.load(Ordering::Relaxed),
                    self.counters.compared.load(Ordering::Relaxed),
                    self.counters.mismatches.load(Ordering::Relaxed)
                )
            )
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use listrev_core::DaqSink;
    use serde_json::json;
    use std::thread;

    const WAIT: Duration = Duration::from_secs(2);

    fn setup(name: &str) -> (QueueRegistry, ReversedListValidator) {
        let mut queues = QueueRegistry::new();
        queues.create::<IntList>("reversed", 8).unwrap();
        queues.create::<IntList>("original", 8).unwrap();
        let mut validator = ReversedListValidator::new(name);
        validator
            .init(
                &json!({
                    "reversed_data_input": "reversed",
                    "original_data_input": "original",
                    "queueTimeoutMsec": 10
                }),
                &queues,
            )
            .unwrap();
        (queues, validator)
    }

    fn wait_for_compared(validator: &ReversedListValidator, expected: u64) {
        let deadline = std::time::Instant::now() + WAIT;
        while validator.stats().get("compared") < expected && std::time::Instant::now() < deadline {
            thread::sleep(Duration::from_millis(2));
        }
    }

    #[test]
    fn test_validate() {
        assert_eq!(validate(&[3, 2, 1], &[1, 2, 3]), Validation::Match);
        assert_eq!(validate(&[1, 2, 3], &[1, 2, 3]), Validation::Mismatch);
        assert_eq!(validate(&[], &[]), Validation::Match);
        assert_eq!(validate(&[1], &[1, 1]), Validation::Mismatch);
    }

    #[test]
    fn test_counts_matches_and_mismatches() {
        let (queues, mut validator) = setup("rlv");
        validator.start(&[]).unwrap();

        let reversed: DaqSink<IntList> = queues.sink("reversed").unwrap();
        let original: DaqSink<IntList> = queues.sink("original").unwrap();

        original.push(vec![1, 2, 3], WAIT).unwrap();
        reversed.push(vec![3, 2, 1], WAIT).unwrap();
        original.push(vec![4, 5], WAIT).unwrap();
        reversed.push(vec![4, 5], WAIT).unwrap();
        original.push(vec![9], WAIT).unwrap();
        reversed.push(vec![9], WAIT).unwrap();

        wait_for_compared(&validator, 3);
        validator.stop(&[]).unwrap();

        let stats = validator.stats();
        assert_eq!(stats.get("received"), 3);
        assert_eq!(stats.get("compared"), 3);
        assert_eq!(stats.get("mismatches"), 1);
    }

    #[test]
    fn test_missing_original_is_not_compared() {
        let (queues, mut validator) = setup("lonely");
        validator.start(&[]).unwrap();

        let reversed: DaqSink<IntList> = queues.sink("reversed").unwrap();
        reversed.push(vec![1, 2], WAIT).unwrap();
        thread::sleep(Duration::from_millis(50));
        validator.stop(&[]).unwrap();

        let stats = validator.stats();
        assert_eq!(stats.get("received"), 1);
        assert_eq!(stats.get("compared"), 0);
        assert_eq!(stats.get("mismatches"), 0);
    }

    #[test]
    fn test_config_keys() {
        let config: ValidatorConfig = serde_json::from_value(json!({
            "reversed_data_input": "r",
            "original_data_input": "o"
        }))
        .unwrap();
        assert_eq!(config.reversed_data_input, "r");
        assert_eq!(config.original_data_input, "o");
        assert_eq!(config.queue_timeout_msec, 100);
    }

    #[test]
    fn test_start_without_init_exits_worker() {
        let mut validator = ReversedListValidator::new("uninit");
        validator.start(&[]).unwrap();
        thread::sleep(Duration::from_millis(20));
        validator.stop(&[]).unwrap();
        assert_eq!(validator.stats().get("received"), 0);
    }
}
