//! Application wiring
//!
//! An application description lists the queues to create and the modules
//! to load. [`Application`] builds both, puts every module behind a
//! [`ModuleActor`] and broadcasts lifecycle commands to them.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use actix::prelude::*;
use listrev_core::queue::DEFAULT_QUEUE_CAPACITY;
use listrev_core::{Command, Error, ModuleStats, QueueRegistry, Result};
use listrev_modules::{IntList, ModuleRegistry};
use log::{error, info};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::actor::{
    mailbox_error, ExecuteCommand, GetStats, GetStatus, Init, ModuleActor, ModuleStatus,
};

fn default_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

fn default_module_config() -> Value {
    Value::Object(Default::default())
}

/// A queue to create
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Queue name
    pub name: String,

    /// Maximum number of lists the queue holds
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

/// A module to load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleConfig {
    /// Instance name
    pub name: String,

    /// Registered plugin name
    pub plugin: String,

    /// Configuration handed to the module's init
    #[serde(default = "default_module_config")]
    pub config: Value,
}

/// Application description
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Queues, created before any module
    #[serde(default)]
    pub queues: Vec<QueueConfig>,

    /// Modules in declaration order
    #[serde(default)]
    pub modules: Vec<ModuleConfig>,
}

impl AppConfig {
    /// Create an empty description
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a queue
    pub fn with_queue(mut self, name: impl Into<String>, capacity: usize) -> Self {
        self.queues.push(QueueConfig {
            name: name.into(),
            capacity,
        });
        self
    }

    /// Add a module
    pub fn with_module(
        mut self,
        name: impl Into<String>,
        plugin: impl Into<String>,
        config: Value,
    ) -> Self {
        self.modules.push(ModuleConfig {
            name: name.into(),
            plugin: plugin.into(),
            config,
        });
        self
    }

    /// Generator feeding the validator directly and through a reverser
    pub fn reference() -> Self {
        Self::new()
            .with_queue("original", DEFAULT_QUEUE_CAPACITY)
            .with_queue("to_reverser", DEFAULT_QUEUE_CAPACITY)
            .with_queue("reversed", DEFAULT_QUEUE_CAPACITY)
            .with_module(
                "rdlg",
                "RandomDataListGenerator",
                json!({
                    "outputs": ["original", "to_reverser"],
                    "nIntsPerList": 4,
                    "waitBetweenSendsMsec": 1000
                }),
            )
            .with_module(
                "lr",
                "ListReverser",
                json!({"input": "to_reverser", "output": "reversed"}),
            )
            .with_module(
                "rlv",
                "ReversedListValidator",
                json!({"reversed_data_input": "reversed", "original_data_input": "original"}),
            )
    }

    /// Parse a JSON description
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON description from `path`
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::IO(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    /// Reject duplicate queue or module names
    pub fn validate(&self) -> Result<()> {
        let mut queues = HashSet::new();
        for queue in &self.queues {
            if !queues.insert(queue.name.as_str()) {
                return Err(Error::Config(format!("queue {} declared twice", queue.name)));
            }
        }
        let mut modules = HashSet::new();
        for module in &self.modules {
            if !modules.insert(module.name.as_str()) {
                return Err(Error::Config(format!("module {} declared twice", module.name)));
            }
        }
        Ok(())
    }
}

struct ModuleHandle {
    name: String,
    config: Value,
    addr: Addr<ModuleActor>,
}

/// Running set of module actors sharing one queue registry
pub struct Application {
    queues: Arc<QueueRegistry>,
    modules: Vec<ModuleHandle>,
}

impl Application {
    /// Create the queues and one started actor per module.
    ///
    /// Must be called from within a running actix system.
    pub fn build(config: &AppConfig, registry: &ModuleRegistry) -> Result<Self> {
        config.validate()?;

        let mut queues = QueueRegistry::new();
        for queue in &config.queues {
            queues.create::<IntList>(&queue.name, queue.capacity)?;
        }

        let mut modules = Vec::with_capacity(config.modules.len());
        for module in &config.modules {
            let instance = registry.create(&module.plugin, &module.name)?;
            info!("Created module {} ({})", module.name, module.plugin);
            modules.push(ModuleHandle {
                name: module.name.clone(),
                config: module.config.clone(),
                addr: ModuleActor::new(instance).start(),
            });
        }

        Ok(Self {
            queues: Arc::new(queues),
            modules,
        })
    }

    /// Module names in declaration order
    pub fn module_names(&self) -> Vec<&str> {
        self.modules.iter().map(|m| m.name.as_str()).collect()
    }

    /// Queue names, sorted
    pub fn queue_names(&self) -> Vec<String> {
        self.queues.names()
    }

    /// Initialise every module with its configuration
    pub async fn init(&self) -> Result<()> {
        for module in &self.modules {
            module
                .addr
                .send(Init {
                    config: module.config.clone(),
                    queues: Arc::clone(&self.queues),
                })
                .await
                .map_err(|e| mailbox_error(&module.name, e))?
                .map_err(|e| {
                    error!("Failed to initialize module {}: {}", module.name, e);
                    e
                })?;
        }
        Ok(())
    }

    /// Send `command` to every module.
    ///
    /// `stop` runs in reverse declaration order, the other commands in
    /// declaration order. A `start` with no module running first discards
    /// the lists left queued by the previous run.
    pub async fn command(&self, command: Command) -> Result<()> {
        if command == Command::Start {
            let statuses = self.status().await?;
            if statuses.iter().all(|(_, status)| *status != ModuleStatus::Running) {
                self.drain_queues()?;
            }
        }

        info!("Sending {} to {} modules", command, self.modules.len());
        let ordered: Vec<&ModuleHandle> = match command {
            Command::Stop => self.modules.iter().rev().collect(),
            Command::Configure | Command::Start => self.modules.iter().collect(),
        };
        for module in ordered {
            module
                .addr
                .send(ExecuteCommand::new(command))
                .await
                .map_err(|e| mailbox_error(&module.name, e))?
                .map_err(|e| {
                    error!("{} failed on module {}: {}", command, module.name, e);
                    e
                })?;
        }
        Ok(())
    }

    fn drain_queues(&self) -> Result<()> {
        for name in self.queues.names() {
            let dropped = self.queues.queue::<IntList>(&name)?.drain();
            if dropped > 0 {
                info!("Discarded {} stale lists from queue {}", dropped, name);
            }
        }
        Ok(())
    }

    /// Configure, start, wait for `duration`, then stop
    pub async fn run_for(&self, duration: Duration) -> Result<()> {
        self.command(Command::Configure).await?;
        self.command(Command::Start).await?;
        actix_rt::time::sleep(duration).await;
        self.command(Command::Stop).await
    }

    /// Counters of every module in declaration order
    pub async fn stats(&self) -> Result<Vec<(String, ModuleStats)>> {
        let mut stats = Vec::with_capacity(self.modules.len());
        for module in &self.modules {
            let snapshot = module
                .addr
                .send(GetStats)
                .await
                .map_err(|e| mailbox_error(&module.name, e))??;
            stats.push((module.name.clone(), snapshot));
        }
        Ok(stats)
    }

    /// Lifecycle state of every module in declaration order
    pub async fn status(&self) -> Result<Vec<(String, ModuleStatus)>> {
        let mut statuses = Vec::with_capacity(self.modules.len());
        for module in &self.modules {
            let status = module
                .addr
                .send(GetStatus)
                .await
                .map_err(|e| mailbox_error(&module.name, e))??;
            statuses.push((module.name.clone(), status));
        }
        Ok(statuses)
    }
}
