//! Module registry
//!
//! Maps plugin names to module constructors so a host can create modules
//! from an application description.

use std::collections::HashMap;
use std::sync::RwLock;

use listrev_core::{DaqModule, Error, Result};
use log::debug;

use crate::{generator, reverser, validator};
use crate::{ListReverser, RandomDataListGenerator, ReversedListValidator};

/// Constructor taking the instance name
pub type ModuleFactory = Box<dyn Fn(&str) -> Box<dyn DaqModule> + Send + Sync>;

/// Registry of module factories
#[derive(Default)]
pub struct ModuleRegistry {
    factories: HashMap<String, ModuleFactory>,
}

impl ModuleRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry holding the three list modules
    pub fn with_builtin_modules() -> Self {
        let mut registry = Self::new();
        registry.register(
            generator::PLUGIN_NAME,
            Box::new(|name: &str| {
                Box::new(RandomDataListGenerator::new(name)) as Box<dyn DaqModule>
            }),
        );
        registry.register(
            reverser::PLUGIN_NAME,
            Box::new(|name: &str| Box::new(ListReverser::new(name)) as Box<dyn DaqModule>),
        );
        registry.register(
            validator::PLUGIN_NAME,
            Box::new(|name: &str| Box::new(ReversedListValidator::new(name)) as Box<dyn DaqModule>),
        );
        registry
    }

    /// Register a factory, replacing any previous one for `plugin`
    pub fn register(&mut self, plugin: &str, factory: ModuleFactory) {
        debug!("Registering module plugin {}", plugin);
        self.factories.insert(plugin.to_string(), factory);
    }

    /// Whether `plugin` has a factory
    pub fn contains(&self, plugin: &str) -> bool {
        self.factories.contains_key(plugin)
    }

    /// Create a module instance of `plugin` named `name`
    pub fn create(&self, plugin: &str, name: &str) -> Result<Box<dyn DaqModule>> {
        let factory = self
            .factories
            .get(plugin)
            .ok_or_else(|| Error::UnknownPlugin(plugin.to_string()))?;
        Ok(factory(name))
    }

    /// Sorted names of all registered plugins
    pub fn plugin_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }
}

lazy_static::lazy_static! {
    static ref REGISTRY: RwLock<ModuleRegistry> =
        RwLock::new(ModuleRegistry::with_builtin_modules());
}

fn poisoned() -> Error {
    Error::Internal("module registry lock poisoned".to_string())
}

/// Register a factory in the global registry
pub fn register_module(plugin: &str, factory: ModuleFactory) -> Result<()> {
    let mut registry = REGISTRY.write().map_err(|_| poisoned())?;
    registry.register(plugin, factory);
    Ok(())
}

/// Create a module from the global registry
pub fn create_module(plugin: &str, name: &str) -> Result<Box<dyn DaqModule>> {
    let registry = REGISTRY.read().map_err(|_| poisoned())?;
    registry.create(plugin, name)
}

/// Plugin names known to the global registry
pub fn module_names() -> Result<Vec<String>> {
    let registry = REGISTRY.read().map_err(|_| poisoned())?;
    Ok(registry.plugin_names())
}
