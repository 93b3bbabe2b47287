//! RandomDataListGenerator
//!
//! Periodically generates a list of random integers and pushes a copy onto
//! every configured output queue.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use listrev_core::config::{default_queue_timeout_ms, parse_module_config, queue_timeout};
use listrev_core::{
    DaqModule, DaqSink, Issue, ModuleStats, QueueRegistry, Result, RunningFlag, ThreadHelper,
};
use log::{debug, info, trace, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use serde_json::Value;

use crate::list::{self, IntList, ListDisplay};
use crate::worker::push_with_retry;

/// Name under which the module is registered
pub const PLUGIN_NAME: &str = "RandomDataListGenerator";

/// Default number of integers per list
pub const DEFAULT_INTS_PER_LIST: usize = 4;

/// Default pause between two generated lists, in milliseconds
pub const DEFAULT_WAIT_BETWEEN_SENDS_MS: u64 = 1000;

fn default_ints_per_list() -> usize {
    DEFAULT_INTS_PER_LIST
}

fn default_wait_between_sends_ms() -> u64 {
    DEFAULT_WAIT_BETWEEN_SENDS_MS
}

/// Generator configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorConfig {
    /// Output queue names, pushed to in this order
    #[serde(default)]
    pub outputs: Vec<String>,

    /// Length of every generated list
    #[serde(default = "default_ints_per_list")]
    pub n_ints_per_list: usize,

    /// Pause between two generated lists
    #[serde(default = "default_wait_between_sends_ms")]
    pub wait_between_sends_msec: u64,

    /// Timeout of a single push attempt
    #[serde(default = "default_queue_timeout_ms")]
    pub queue_timeout_msec: u64,

    /// Fixed RNG seed; entropy-seeded when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            outputs: Vec::new(),
            n_ints_per_list: DEFAULT_INTS_PER_LIST,
            wait_between_sends_msec: DEFAULT_WAIT_BETWEEN_SENDS_MS,
            queue_timeout_msec: default_queue_timeout_ms(),
            seed: None,
        }
    }
}

#[derive(Debug, Default)]
struct GeneratorCounters {
    generated: AtomicU64,
    sent: AtomicU64,
}

/// Creates lists of random integers and writes them to the output queues
pub struct RandomDataListGenerator {
    name: String,
    thread: ThreadHelper,
    config: GeneratorConfig,
    output_queues: Vec<DaqSink<IntList>>,
    queue_timeout: Duration,
    n_ints_per_list: usize,
    wait_between_sends: Duration,
    counters: Arc<GeneratorCounters>,
}

impl RandomDataListGenerator {
    /// Create an uninitialised generator named `name`
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            thread: ThreadHelper::new(name.clone()),
            name,
            config: GeneratorConfig::default(),
            output_queues: Vec::new(),
            queue_timeout: queue_timeout(default_queue_timeout_ms()),
            n_ints_per_list: DEFAULT_INTS_PER_LIST,
            wait_between_sends: Duration::from_millis(DEFAULT_WAIT_BETWEEN_SENDS_MS),
            counters: Arc::new(GeneratorCounters::default()),
        }
    }

    /// Length of the lists the next run will generate
    pub fn n_ints_per_list(&self) -> usize {
        self.n_ints_per_list
    }

    /// Pause the next run will take between lists
    pub fn wait_between_sends(&self) -> Duration {
        self.wait_between_sends
    }

    /// Whether the worker thread is running
    pub fn is_running(&self) -> bool {
        self.thread.thread_running()
    }
}

impl DaqModule for RandomDataListGenerator {
    fn name(&self) -> &str {
        &self.name
    }

    fn init(&mut self, config: &Value, queues: &QueueRegistry) -> Result<()> {
        trace!("{}: Entering init() method", self.name);
        let config: GeneratorConfig = parse_module_config(&self.name, config)?;
        self.output_queues = config
            .outputs
            .iter()
            .map(|output| queues.sink::<IntList>(output))
            .collect::<Result<Vec<_>>>()?;
        self.queue_timeout = queue_timeout(config.queue_timeout_msec);
        self.config = config;
        trace!("{}: Exiting init() method", self.name);
        Ok(())
    }

    fn configure(&mut self, _args: &[String]) -> Result<()> {
        trace!("{}: Entering configure() method", self.name);
        self.n_ints_per_list = self.config.n_ints_per_list;
        self.wait_between_sends = Duration::from_millis(self.config.wait_between_sends_msec);
        debug!(
            "{}: configured for {} ints per list, {:?} between sends",
            self.name, self.n_ints_per_list, self.wait_between_sends
        );
        trace!("{}: Exiting configure() method", self.name);
        Ok(())
    }

    fn start(&mut self, _args: &[String]) -> Result<()> {
        trace!("{}: Entering start() method", self.name);
        self.counters.generated.store(0, Ordering::Relaxed);
        self.counters.sent.store(0, Ordering::Relaxed);

        let rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let worker = GeneratorWorker {
            name: self.name.clone(),
            output_queues: self.output_queues.clone(),
            queue_timeout: self.queue_timeout,
            n_ints_per_list: self.n_ints_per_list,
            wait_between_sends: self.wait_between_sends,
            counters: Arc::clone(&self.counters),
            rng,
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
            .with("generated", self.counters.generated.load(Ordering::Relaxed))
            .with("sent", self.counters.sent.load(Ordering::Relaxed))
    }
}

struct GeneratorWorker {
    name: String,
    output_queues: Vec<DaqSink<IntList>>,
    queue_timeout: Duration,
    n_ints_per_list: usize,
    wait_between_sends: Duration,
    counters: Arc<GeneratorCounters>,
    rng: StdRng,
}

impl GeneratorWorker {
    fn run(mut self, running: RunningFlag) {
        trace!("{}: Entering work loop", self.name);

        while running.is_running() {
            trace!("{}: Creating list of length {}", self.name, self.n_ints_per_list);
            let the_list = list::generate(self.n_ints_per_list, &mut self.rng);
            let generated = self.counters.generated.fetch_add(1, Ordering::Relaxed) + 1;
            let message = format!(
                "Generated list #{} with contents {} and size {}.",
                generated,
                ListDisplay(&the_list),
                the_list.len()
            );
            debug!("{}", Issue::progress(&self.name, message));

            trace!("{}: Pushing list onto {} output queues", self.name, self.output_queues.len());
            for sink in &self.output_queues {
                let list = the_list.clone();
                if push_with_retry(&self.name, sink, list, self.queue_timeout, &running) {
                    self.counters.sent.fetch_add(1, Ordering::Relaxed);
                }
            }
            if self.output_queues.is_empty() {
                warn!("{}", Issue::NoOutputQueuesAvailable { name: self.name.clone() });
            }

            trace!("{}: Start of sleep between sends", self.name);
            running.wait(self.wait_between_sends);
        }

        info!(
            "{}",
            Issue::progress(
                &self.name,
                format!(
                    "Exiting work loop, generated {} lists, and successfully sent {} copies.",
                    self.counters.generated.load(Ordering::Relaxed),
                    self.counters.sent.load(Ordering::Relaxed)
                )
            )
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::thread;

    fn registry(names: &[&str], capacity: usize) -> QueueRegistry {
        let mut queues = QueueRegistry::new();
        for name in names {
            queues.create::<IntList>(name, capacity).unwrap();
        }
        queues
    }

    #[test]
    fn test_config_defaults() {
        let config: GeneratorConfig = serde_json::from_value(json!({})).unwrap();
        assert_eq!(config, GeneratorConfig::default());
        assert_eq!(config.n_ints_per_list, 4);
        assert_eq!(config.wait_between_sends_msec, 1000);
        assert_eq!(config.queue_timeout_msec, 100);
    }

    #[test]
    fn test_configure_applies_parameters() {
        let queues = registry(&[], 1);
        let mut generator = RandomDataListGenerator::new("rdlg");
        generator
            .init(&json!({"nIntsPerList": 9, "waitBetweenSendsMsec": 5}), &queues)
            .unwrap();

        // Parameters only take effect on configure.
        assert_eq!(generator.n_ints_per_list(), DEFAULT_INTS_PER_LIST);
        generator.configure(&[]).unwrap();
        assert_eq!(generator.n_ints_per_list(), 9);
        assert_eq!(generator.wait_between_sends(), Duration::from_millis(5));
    }

    #[test]
    fn test_init_rejects_unknown_queue() {
        let queues = registry(&["a"], 1);
        let mut generator = RandomDataListGenerator::new("rdlg");
        let err = generator.init(&json!({"outputs": ["a", "b"]}), &queues).unwrap_err();
        assert!(matches!(err, listrev_core::Error::QueueNotFound(name) if name == "b"));
    }

    #[test]
    fn test_generates_to_every_output() {
        let queues = registry(&["first", "second"], 16);
        let mut generator = RandomDataListGenerator::new("rdlg");
        generator
            .init(
                &json!({
                    "outputs": ["first", "second"],
                    "nIntsPerList": 6,
                    "waitBetweenSendsMsec": 1,
                    "seed": 3
                }),
                &queues,
            )
            .unwrap();
        generator.configure(&[]).unwrap();
        generator.start(&[]).unwrap();

        let first = queues.source::<IntList>("first").unwrap();
        let second = queues.source::<IntList>("second").unwrap();
        for _ in 0..3 {
            let a = first.pop(Duration::from_secs(2)).unwrap();
            let b = second.pop(Duration::from_secs(2)).unwrap();
            assert_eq!(a, b);
            assert_eq!(a.len(), 6);
            assert!(a.iter().all(|v| (list::MIN_VALUE..=list::MAX_VALUE).contains(v)));
        }

        generator.stop(&[]).unwrap();
        let stats = generator.stats();
        assert!(stats.get("generated") >= 3);
        assert!(stats.get("sent") >= 6);
    }

    #[test]
    fn test_runs_without_outputs() {
        let queues = registry(&[], 1);
        let mut generator = RandomDataListGenerator::new("lonely");
        generator.init(&json!({"waitBetweenSendsMsec": 1}), &queues).unwrap();
        generator.configure(&[]).unwrap();
        generator.start(&[]).unwrap();
        thread::sleep(Duration::from_millis(30));
        generator.stop(&[]).unwrap();

        let stats = generator.stats();
        assert!(stats.get("generated") > 0);
        assert_eq!(stats.get("sent"), 0);
    }

    #[test]
    fn test_stop_interrupts_long_wait() {
        let queues = registry(&["out"], 4);
        let mut generator = RandomDataListGenerator::new("slow");
        generator
            .init(&json!({"outputs": ["out"], "waitBetweenSendsMsec": 60000}), &queues)
            .unwrap();
        generator.configure(&[]).unwrap();
        generator.start(&[]).unwrap();
        assert!(generator.is_running());

        let out = queues.source::<IntList>("out").unwrap();
        out.pop(Duration::from_secs(2)).unwrap();

        let started = std::time::Instant::now();
        generator.stop(&[]).unwrap();
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(!generator.is_running());
        assert_eq!(generator.stats().get("sent"), 1);
    }
}
