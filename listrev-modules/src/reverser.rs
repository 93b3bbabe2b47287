//! ListReverser
//!
//! Reads lists of integers from one queue, reverses their order and pushes
//! the reversed list onto another queue.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use listrev_core::config::{default_queue_timeout_ms, parse_module_config, queue_timeout};
use listrev_core::{
    DaqModule, DaqSink, DaqSource, Issue, ModuleStats, PopError, QueueRegistry, Result, RunningFlag,
    ThreadHelper,
};
use log::{debug, error, info, trace};
use serde::Deserialize;
use serde_json::Value;

use crate::list::{IntList, ListDisplay};
use crate::worker::push_with_retry;

/// Name under which the module is registered
pub const PLUGIN_NAME: &str = "ListReverser";

/// Reverser configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReverserConfig {
    /// Queue the lists are read from
    pub input: String,

    /// Queue the reversed lists are written to
    pub output: String,

    /// Timeout of a single pop or push attempt
    #[serde(default = "default_queue_timeout_ms")]
    pub queue_timeout_msec: u64,
}

#[derive(Debug, Default)]
struct ReverserCounters {
    received: AtomicU64,
    sent: AtomicU64,
}

/// Reverses every list passing from its input to its output queue
pub struct ListReverser {
    name: String,
    thread: ThreadHelper,
    input_queue: Option<DaqSource<IntList>>,
    output_queue: Option<DaqSink<IntList>>,
    queue_timeout: Duration,
    counters: Arc<ReverserCounters>,
}

impl ListReverser {
    /// Create an uninitialised reverser named `name`
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            thread: ThreadHelper::new(name.clone()),
            name,
            input_queue: None,
            output_queue: None,
            queue_timeout: queue_timeout(default_queue_timeout_ms()),
            counters: Arc::new(ReverserCounters::default()),
        }
    }

    /// Whether the worker thread is running
    pub fn is_running(&self) -> bool {
        self.thread.thread_running()
    }
}

impl DaqModule for ListReverser {
    fn name(&self) -> &str {
        &self.name
    }

    fn init(&mut self, config: &Value, queues: &QueueRegistry) -> Result<()> {
        trace!("{}: Entering init() method", self.name);
        let config: ReverserConfig = parse_module_config(&self.name, config)?;
        self.input_queue = Some(queues.source::<IntList>(&config.input)?);
        self.output_queue = Some(queues.sink::<IntList>(&config.output)?);
        self.queue_timeout = queue_timeout(config.queue_timeout_msec);
        trace!("{}: Exiting init() method", self.name);
        Ok(())
    }

    fn start(&mut self, _args: &[String]) -> Result<()> {
        trace!("{}: Entering start() method", self.name);
        self.counters.received.store(0, Ordering::Relaxed);
        self.counters.sent.store(0, Ordering::Relaxed);

        let worker = ReverserWorker {
            name: self.name.clone(),
            input_queue: self.input_queue.clone(),
            output_queue: self.output_queue.clone(),
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
            .with("sent", self.counters.sent.load(Ordering::Relaxed))
    }
}

struct ReverserWorker {
    name: String,
    input_queue: Option<DaqSource<IntList>>,
    output_queue: Option<DaqSink<IntList>>,
    queue_timeout: Duration,
    counters: Arc<ReverserCounters>,
}

impl ReverserWorker {
    fn run(self, running: RunningFlag) {
        trace!("{}: Entering work loop", self.name);

        if self.input_queue.is_none() {
            error!("{}", Issue::invalid_queue(&self.name, "input"));
        }
        if self.output_queue.is_none() {
            error!("{}", Issue::invalid_queue(&self.name, "output"));
        }

        if let (Some(input), Some(output)) = (&self.input_queue, &self.output_queue) {
            while running.is_running() {
                trace!("{}: Going to receive data from input queue", self.name);
                let mut working = match input.pop(self.queue_timeout) {
                    Ok(list) => list,
                    Err(PopError::Timeout) => continue,
                    Err(PopError::Disconnected) => {
                        error!("{}: input queue \"{}\" is disconnected", self.name, input.name());
                        break;
                    }
                };

                let received = self.counters.received.fetch_add(1, Ordering::Relaxed) + 1;
                trace!(
                    "{}: Received list #{}. It has size {}. Reversing its contents",
                    self.name,
                    received,
                    working.len()
                );
                working.reverse();

                let message = format!(
                    "Reversed list #{}, new contents {} and size {}.",
                    received,
                    ListDisplay(&working),
                    working.len()
                );
                debug!("{}", Issue::progress(&self.name, message));

                if push_with_retry(&self.name, output, working, self.queue_timeout, &running) {
                    self.counters.sent.fetch_add(1, Ordering::Relaxed);
                }
                trace!("{}: End of work loop iteration", self.name);
            }
        }

        info!(
            "{}",
            Issue::progress(
                &self.name,
                format!(
                    "Exiting work loop, received {} lists, and successfully sent {}.",
                    self.counters.received.load(Ordering::Relaxed),
                    self.counters.sent.load(Ordering::Relaxed)
                )
            )
        );
    }
}
