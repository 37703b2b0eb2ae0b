//! Device registry.
//!
//! Maps device names to factories. Constructed at startup and passed to
//! whoever needs to create devices; there is no global registry.

use haptic_common::device::{DeviceFactory, HapticDevice};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::drivers;

/// Registry lookup errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// No device registered under this name.
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// A device with this name is already registered.
    #[error("Device '{0}' is already registered")]
    AlreadyRegistered(&'static str),
}

/// Registry of available haptic devices.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    factories: BTreeMap<&'static str, DeviceFactory>,
}

impl DeviceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every built-in device.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        drivers::register_all(&mut registry);
        registry
    }

    /// Register a device factory.
    ///
    /// # Errors
    /// Returns `RegistryError::AlreadyRegistered` if the name is taken.
    pub fn register(
        &mut self,
        name: &'static str,
        factory: DeviceFactory,
    ) -> Result<(), RegistryError> {
        if self.factories.contains_key(name) {
            return Err(RegistryError::AlreadyRegistered(name));
        }
        self.factories.insert(name, factory);
        Ok(())
    }

    /// Get a device factory by name.
    pub fn get_factory(&self, name: &str) -> Option<DeviceFactory> {
        self.factories.get(name).copied()
    }

    /// Create a device instance by name.
    ///
    /// # Errors
    /// Returns `RegistryError::DeviceNotFound` if nothing is registered under `name`.
    pub fn create_device(&self, name: &str) -> Result<Box<dyn HapticDevice>, RegistryError> {
        let factory = self
            .get_factory(name)
            .ok_or_else(|| RegistryError::DeviceNotFound(name.to_string()))?;
        Ok(factory())
    }

    /// Registered device names, sorted.
    pub fn list_devices(&self) -> Vec<&'static str> {
        self.factories.keys().copied().collect()
    }
}
