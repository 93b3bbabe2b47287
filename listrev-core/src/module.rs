//! The DAQ module contract
//!
//! A host creates a module by name, initialises it once with its JSON
//! configuration and the queue registry, and then drives it with
//! `configure`, `start` and `stop` commands.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::queue::QueueRegistry;

/// Lifecycle command dispatched by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    /// Apply configuration parameters
    Configure,
    /// Start the worker thread
    Start,
    /// Stop the worker thread
    Stop,
}

impl Command {
    /// Wire name of the command
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Configure => "configure",
            Command::Start => "start",
            Command::Stop => "stop",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "configure" => Ok(Command::Configure),
            "start" => Ok(Command::Start),
            "stop" => Ok(Command::Stop),
            other => Err(Error::UnknownCommand(other.to_string())),
        }
    }
}

/// Snapshot of a module's counters, keyed by counter name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ModuleStats(BTreeMap<String, u64>);

impl ModuleStats {
    /// Empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a counter
    pub fn with(mut self, counter: &str, value: u64) -> Self {
        self.0.insert(counter.to_string(), value);
        self
    }

    /// Value of `counter`, zero if absent
    pub fn get(&self, counter: &str) -> u64 {
        self.0.get(counter).copied().unwrap_or(0)
    }

    /// Iterate over `(counter, value)` pairs in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl fmt::Display for ModuleStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (counter, value) in self.iter() {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            write!(f, "{}={}", counter, value)?;
        }
        Ok(())
    }
}

/// A host-loaded processing unit with a single worker thread
pub trait DaqModule: Send {
    /// Instance name
    fn name(&self) -> &str;

    /// Read the configuration and resolve queue handles
    fn init(&mut self, config: &Value, queues: &QueueRegistry) -> Result<()>;

    /// Apply configuration parameters read at init
    fn configure(&mut self, _args: &[String]) -> Result<()> {
        Ok(())
    }

    /// Start the worker thread
    fn start(&mut self, args: &[String]) -> Result<()>;

    /// Stop the worker thread and wait for it
    fn stop(&mut self, args: &[String]) -> Result<()>;

    /// Current counters
    fn stats(&self) -> ModuleStats;

    /// Dispatch a parsed command
    fn execute_command(&mut self, command: Command, args: &[String]) -> Result<()> {
        match command {
            Command::Configure => self.configure(args),
            Command::Start => self.start(args),
            Command::Stop => self.stop(args),
        }
    }

    /// Dispatch a command by its wire name
    fn execute(&mut self, command: &str, args: &[String]) -> Result<()> {
        let command: Command = command.parse()?;
        self.execute_command(command, args)
    }
}
