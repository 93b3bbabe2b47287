//! Worker thread helper
//!
//! Each DAQ module owns one [`ThreadHelper`]. `start` spawns the work
//! function on a named OS thread and hands it a [`RunningFlag`]; `stop`
//! clears the flag and joins. The work function is expected to poll the
//! flag between bounded, timeout-limited queue operations.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{trace, warn};

use crate::error::{Error, Result};

/// Granularity of [`RunningFlag::wait`]
const WAIT_SLICE: Duration = Duration::from_millis(10);

/// Read side of a worker's running flag
#[derive(Debug, Clone)]
pub struct RunningFlag(Arc<AtomicBool>);

impl RunningFlag {
    /// Whether the worker should keep going
    pub fn is_running(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Sleep for `duration`, returning early once the flag is cleared.
    ///
    /// Returns `true` if the full duration elapsed while running.
    pub fn wait(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        while self.is_running() {
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            thread::sleep((deadline - now).min(WAIT_SLICE));
        }
        false
    }
}

/// Owner of a single worker thread
#[derive(Debug)]
pub struct ThreadHelper {
    name: String,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ThreadHelper {
    /// Create a helper whose thread will carry `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    /// Spawn `work` on a fresh thread
    pub fn start_working_thread<F>(&mut self, work: F) -> Result<()>
    where
        F: FnOnce(RunningFlag) + Send + 'static,
    {
        if self.handle.is_some() {
            return Err(Error::ThreadAlreadyRunning(self.name.clone()));
        }

        self.running.store(true, Ordering::Release);
        let flag = RunningFlag(Arc::clone(&self.running));
        let spawned = thread::Builder::new()
            .name(self.name.clone())
            .spawn(move || work(flag));

        match spawned {
            Ok(handle) => {
                trace!("{}: worker thread spawned", self.name);
                self.handle = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.running.store(false, Ordering::Release);
                Err(Error::Thread(format!("failed to spawn worker thread of {}: {}", self.name, e)))
            }
        }
    }

    /// Clear the running flag and wait for the thread to finish
    pub fn stop_working_thread(&mut self) -> Result<()> {
        let handle = self
            .handle
            .take()
            .ok_or_else(|| Error::ThreadNotRunning(self.name.clone()))?;

        self.running.store(false, Ordering::Release);
        handle
            .join()
            .map_err(|_| Error::Thread(format!("worker thread of {} panicked", self.name)))?;
        trace!("{}: worker thread joined", self.name);
        Ok(())
    }

    /// Whether the worker has been started and not yet stopped
    pub fn thread_running(&self) -> bool {
        self.handle.is_some() && self.running.load(Ordering::Acquire)
    }

    /// Thread name
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for ThreadHelper {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.running.store(false, Ordering::Release);
            if handle.join().is_err() {
                warn!("worker thread of {} panicked", self.name);
            }
        }
    }
}
