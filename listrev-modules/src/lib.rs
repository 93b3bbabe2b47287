//! # listrev modules
//!
//! Three DAQ modules that exercise a chain of bounded queues:
//!
//! - [`RandomDataListGenerator`] produces lists of random integers
//! - [`ListReverser`] reverses each list it receives
//! - [`ReversedListValidator`] checks reversed lists against the originals

#![warn(missing_docs)]

pub mod generator;
pub mod list;
pub mod registry;
pub mod reverser;
pub mod validator;

mod worker;

// Re-exports for convenience
pub use generator::{GeneratorConfig, RandomDataListGenerator};
pub use list::{IntList, ListDisplay};
pub use registry::{create_module, module_names, register_module, ModuleFactory, ModuleRegistry};
pub use reverser::{ListReverser, ReverserConfig};
pub use validator::{validate, ReversedListValidator, Validation, ValidatorConfig};
