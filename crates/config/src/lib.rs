//! Configuration for the interception engine.
//!
//! ```toml
//! [registry]
//! cache_resolutions = true
//!
//! [dispatch]
//! trace_calls = false
//! preregister_continuations = true
//! ```
//!
//! Every key is optional. Unknown keys are rejected.

use std::path::Path;

use serde::{Deserialize, Serialize};

mod error;

pub use error::{ConfigError, Result};

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InterceptionConfig {
	pub registry: RegistryConfig,
	pub dispatch: DispatchConfig,
}

/// Advice registry settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
	/// Cache resolved chains per `(method, receiver type, binding)` while no dynamic
	/// advice is registered.
	pub cache_resolutions: bool,
}

impl Default for RegistryConfig {
	fn default() -> Self {
		Self { cache_resolutions: true }
	}
}

/// Dispatch bridge settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DispatchConfig {
	/// Emit a debug event for every dispatched call, not only failures.
	pub trace_calls: bool,
	/// Register continuations for unit, bool, integers and `String` up front.
	pub preregister_continuations: bool,
}

impl Default for DispatchConfig {
	fn default() -> Self {
		Self {
			trace_calls: false,
			preregister_continuations: true,
		}
	}
}

impl InterceptionConfig {
	pub fn from_toml_str(input: &str) -> Result<Self> {
		Ok(toml::from_str(input)?)
	}

	/// Reads and parses a configuration file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let input = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::from_toml_str(&input)
	}
}
