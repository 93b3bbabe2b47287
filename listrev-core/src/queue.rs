//! Named bounded queues connecting DAQ modules
//!
//! A [`Queue`] is a bounded FIFO with blocking, timeout-limited push and
//! pop. Modules never own a queue; they hold a [`DaqSink`] or
//! [`DaqSource`] handle obtained by name from the [`QueueRegistry`].

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, SendTimeoutError, Sender};
use log::debug;
use thiserror::Error;

use crate::error::{Error, Result};

/// Default timeout for queue operations, in milliseconds
pub const DEFAULT_QUEUE_TIMEOUT_MS: u64 = 100;

/// Default queue capacity used by application descriptions
pub const DEFAULT_QUEUE_CAPACITY: usize = 10;

/// Failure to push; the rejected value is handed back for a retry
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PushError<T> {
    /// The queue stayed full for the whole timeout
    #[error("push timed out")]
    Timeout(T),

    /// The receiving side is gone
    #[error("queue disconnected")]
    Disconnected(T),
}

impl<T> PushError<T> {
    /// Recover the value that could not be pushed
    pub fn into_inner(self) -> T {
        match self {
            PushError::Timeout(value) | PushError::Disconnected(value) => value,
        }
    }
}

/// Failure to pop
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum PopError {
    /// The queue stayed empty for the whole timeout
    #[error("pop timed out")]
    Timeout,

    /// The sending side is gone and the queue is drained
    #[error("queue disconnected")]
    Disconnected,
}

/// Bounded FIFO queue
pub struct Queue<T> {
    name: String,
    capacity: usize,
    sender: Sender<T>,
    receiver: Receiver<T>,
}

impl<T: Send + 'static> Queue<T> {
    /// Create a queue holding at most `capacity` elements
    pub fn new(name: impl Into<String>, capacity: usize) -> Result<Self> {
        let name = name.into();
        if capacity == 0 {
            return Err(Error::Config(format!("queue {} must have a capacity of at least 1", name)));
        }
        let (sender, receiver) = crossbeam_channel::bounded(capacity);
        Ok(Self {
            name,
            capacity,
            sender,
            receiver,
        })
    }

    /// Queue name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Maximum number of queued elements
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of queued elements
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Whether the queue holds no elements
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// Discard every queued element, returning how many were dropped
    pub fn drain(&self) -> usize {
        self.receiver.try_iter().count()
    }

    /// Handle for pushing onto this queue
    pub fn sink(&self) -> DaqSink<T> {
        DaqSink {
            name: self.name.clone(),
            sender: self.sender.clone(),
        }
    }

    /// Handle for popping from this queue
    pub fn source(&self) -> DaqSource<T> {
        DaqSource {
            name: self.name.clone(),
            receiver: self.receiver.clone(),
        }
    }
}

impl<T> fmt::Debug for Queue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Queue")
            .field("name", &self.name)
            .field("capacity", &self.capacity)
            .field("len", &self.receiver.len())
            .finish()
    }
}

/// Push side of a queue
pub struct DaqSink<T> {
    name: String,
    sender: Sender<T>,
}

impl<T> DaqSink<T> {
    /// Name of the underlying queue
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Push `value`, waiting at most `timeout` for room
    pub fn push(&self, value: T, timeout: Duration) -> std::result::Result<(), PushError<T>> {
        self.sender.send_timeout(value, timeout).map_err(|e| match e {
            SendTimeoutError::Timeout(value) => PushError::Timeout(value),
            SendTimeoutError::Disconnected(value) => PushError::Disconnected(value),
        })
    }
}

impl<T> Clone for DaqSink<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            sender: self.sender.clone(),
        }
    }
}

impl<T> fmt::Debug for DaqSink<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DaqSink").field("name", &self.name).finish()
    }
}

/// Pop side of a queue
pub struct DaqSource<T> {
    name: String,
    receiver: Receiver<T>,
}

impl<T> DaqSource<T> {
    /// Name of the underlying queue
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pop the oldest element, waiting at most `timeout` for one to arrive
    pub fn pop(&self, timeout: Duration) -> std::result::Result<T, PopError> {
        self.receiver.recv_timeout(timeout).map_err(|e| match e {
            RecvTimeoutError::Timeout => PopError::Timeout,
            RecvTimeoutError::Disconnected => PopError::Disconnected,
        })
    }
}

impl<T> Clone for DaqSource<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            receiver: self.receiver.clone(),
        }
    }
}

impl<T> fmt::Debug for DaqSource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DaqSource").field("name", &self.name).finish()
    }
}

/// Registry of named queues of any element type
#[derive(Default)]
pub struct QueueRegistry {
    queues: HashMap<String, Box<dyn Any + Send + Sync>>,
}

impl QueueRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            queues: HashMap::new(),
        }
    }

    /// Create and register a queue of `T` under `name`
    pub fn create<T: Send + 'static>(&mut self, name: &str, capacity: usize) -> Result<()> {
        if self.queues.contains_key(name) {
            return Err(Error::QueueAlreadyExists(name.to_string()));
        }
        let queue = Queue::<T>::new(name, capacity)?;
        debug!("Created queue {} with capacity {}", name, capacity);
        self.queues.insert(name.to_string(), Box::new(queue));
        Ok(())
    }

    /// Look up the queue registered under `name`
    pub fn queue<T: Send + 'static>(&self, name: &str) -> Result<&Queue<T>> {
        let entry = self
            .queues
            .get(name)
            .ok_or_else(|| Error::QueueNotFound(name.to_string()))?;
        (**entry)
            .downcast_ref::<Queue<T>>()
            .ok_or_else(|| Error::QueueTypeMismatch(name.to_string()))
    }

    /// Push handle for the queue registered under `name`
    pub fn sink<T: Send + 'static>(&self, name: &str) -> Result<DaqSink<T>> {
        self.queue::<T>(name).map(Queue::<T>::sink)
    }

    /// Pop handle for the queue registered under `name`
    pub fn source<T: Send + 'static>(&self, name: &str) -> Result<DaqSource<T>> {
        self.queue::<T>(name).map(Queue::<T>::source)
    }

    /// Whether a queue is registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.queues.contains_key(name)
    }

    /// Sorted names of all registered queues
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.queues.keys().cloned().collect();
        names.sort();
        names
    }
}

impl fmt::Debug for QueueRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueRegistry")
            .field("queues", &self.names())
            .finish()
    }
}
