//! Module actor
//!
//! Wraps one DAQ module in an actix actor so the host can drive it with
//! messages. The actor tracks the module's lifecycle and refuses commands
//! that arrive out of order.

use std::fmt;
use std::sync::Arc;

use actix::prelude::*;
use listrev_core::{Command, DaqModule, Error, ModuleStats, QueueRegistry, Result};
use log::{debug, info, warn};
use serde::Serialize;
use serde_json::Value;

/// Lifecycle state of a module actor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ModuleStatus {
    /// Module created but not initialised
    Created,
    /// Configuration read and queues resolved
    Initialized,
    /// `configure` applied
    Configured,
    /// Worker thread running
    Running,
    /// Worker thread stopped
    Stopped,
}

impl fmt::Display for ModuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Message to initialise the module
#[derive(Message)]
#[rtype(result = "Result<()>")]
pub struct Init {
    /// Module configuration
    pub config: Value,
    /// Queues the module may connect to
    pub queues: Arc<QueueRegistry>,
}

/// Message to run a lifecycle command
#[derive(Message)]
#[rtype(result = "Result<()>")]
pub struct ExecuteCommand {
    /// Command to run
    pub command: Command,
    /// Command arguments
    pub args: Vec<String>,
}

impl ExecuteCommand {
    /// Command without arguments
    pub fn new(command: Command) -> Self {
        Self {
            command,
            args: Vec::new(),
        }
    }
}

/// Message to get the actor's lifecycle state
#[derive(Message)]
#[rtype(result = "Result<ModuleStatus>")]
pub struct GetStatus;

/// Message to get the module's counters
#[derive(Message)]
#[rtype(result = "Result<ModuleStats>")]
pub struct GetStats;

/// Actor owning a single DAQ module
pub struct ModuleActor {
    module: Box<dyn DaqModule>,
    status: ModuleStatus,
}

impl ModuleActor {
    /// Wrap `module`
    pub fn new(module: Box<dyn DaqModule>) -> Self {
        Self {
            module,
            status: ModuleStatus::Created,
        }
    }

    /// Instance name of the wrapped module
    pub fn name(&self) -> &str {
        self.module.name()
    }

    fn invalid_state(&self, command: &str) -> Error {
        Error::InvalidState(format!(
            "{}: cannot {} while {}",
            self.module.name(),
            command,
            self.status
        ))
    }

    fn check_command(&self, command: Command) -> Result<()> {
        let idle = !matches!(self.status, ModuleStatus::Created | ModuleStatus::Running);
        let allowed = match command {
            Command::Configure | Command::Start => idle,
            Command::Stop => self.status == ModuleStatus::Running,
        };
        if allowed {
            Ok(())
        } else {
            Err(self.invalid_state(command.as_str()))
        }
    }
}

impl Actor for ModuleActor {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        debug!("ModuleActor {} started", self.module.name());
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        if self.status == ModuleStatus::Running {
            warn!("ModuleActor {} stopped with its worker still running", self.module.name());
            if let Err(e) = self.module.stop(&[]) {
                warn!("{}: stop on shutdown failed: {}", self.module.name(), e);
            }
        }
        debug!("ModuleActor {} stopped", self.module.name());
    }
}

impl Handler<Init> for ModuleActor {
    type Result = Result<()>;

    fn handle(&mut self, msg: Init, _ctx: &mut Self::Context) -> Self::Result {
        if self.status != ModuleStatus::Created {
            return Err(self.invalid_state("init"));
        }
        info!("Initializing module {}", self.module.name());
        self.module.init(&msg.config, &msg.queues)?;
        self.status = ModuleStatus::Initialized;
        Ok(())
    }
}

impl Handler<ExecuteCommand> for ModuleActor {
    type Result = Result<()>;

    fn handle(&mut self, msg: ExecuteCommand, _ctx: &mut Self::Context) -> Self::Result {
        self.check_command(msg.command)?;
        debug!("{}: executing {}", self.module.name(), msg.command);
        self.module.execute_command(msg.command, &msg.args)?;
        self.status = match msg.command {
            Command::Configure => ModuleStatus::Configured,
            Command::Start => ModuleStatus::Running,
            Command::Stop => ModuleStatus::Stopped,
        };
        Ok(())
    }
}

impl Handler<GetStatus> for ModuleActor {
    type Result = Result<ModuleStatus>;

    fn handle(&mut self, _msg: GetStatus, _ctx: &mut Self::Context) -> Self::Result {
        Ok(self.status)
    }
}

impl Handler<GetStats> for ModuleActor {
    type Result = Result<ModuleStats>;

    fn handle(&mut self, _msg: GetStats, _ctx: &mut Self::Context) -> Self::Result {
        Ok(self.module.stats())
    }
}

/// Convert a mailbox failure into the crate error
pub fn mailbox_error(module: &str, e: MailboxError) -> Error {
    Error::Actor(format!("{}: {}", module, e))
}
