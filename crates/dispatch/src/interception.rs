use std::path::Path;
use std::sync::Arc;

use intercede_config::{ConfigError, InterceptionConfig};
use intercede_injection::{BodyInjectorFactory, InjectorCache, InjectorFactory};
use intercede_invocation::BindingContext;
use intercede_primitives::Target;
use intercede_registry::AdviceRegistry;

use crate::{ContinuationTable, Wrapper};

/// Builds proxies for container-produced instances.
///
/// Implemented by the code generation backend. The backend decides per binding
/// whether to proxy at all by consulting `should_intercept`, and forwards every
/// call on a proxy it creates to `dispatch`.
pub trait ProxyBackend {
	fn create_proxy(
		&self,
		context: &BindingContext,
		target: &Target,
		should_intercept: &dyn Fn(&BindingContext) -> bool,
		dispatch: Wrapper,
	) -> Option<Target>;
}

/// The interception engine: advice registry, injector cache and async
/// continuations under one configuration.
pub struct Interception {
	registry: AdviceRegistry,
	injectors: InjectorCache,
	continuations: ContinuationTable,
	config: InterceptionConfig,
}

impl Interception {
	pub fn new() -> Self {
		Self::with_config(InterceptionConfig::default())
	}

	pub fn with_config(config: InterceptionConfig) -> Self {
		Self::with_injector_factory(config, Arc::new(BodyInjectorFactory))
	}

	pub fn with_injector_factory(config: InterceptionConfig, factory: Arc<dyn InjectorFactory>) -> Self {
		let continuations = if config.dispatch.preregister_continuations {
			ContinuationTable::with_common()
		} else {
			ContinuationTable::new()
		};
		tracing::debug!(
			cache_resolutions = config.registry.cache_resolutions,
			trace_calls = config.dispatch.trace_calls,
			continuations = continuations.len(),
			"interception.config"
		);
		Self {
			registry: AdviceRegistry::with_caching(config.registry.cache_resolutions),
			injectors: InjectorCache::with_factory(factory),
			continuations,
			config,
		}
	}

	/// Builds the engine from a TOML configuration file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		Ok(Self::with_config(InterceptionConfig::load(path)?))
	}

	pub fn registry(&self) -> &AdviceRegistry {
		&self.registry
	}

	pub fn injectors(&self) -> &InjectorCache {
		&self.injectors
	}

	pub fn continuations(&self) -> &ContinuationTable {
		&self.continuations
	}

	pub fn config(&self) -> &InterceptionConfig {
		&self.config
	}

	/// Returns true if instances from this binding need a proxy.
	pub fn should_proxy(&self, context: &BindingContext) -> bool {
		self.registry.has_advice(context) || self.registry.has_static_advice(context.implementation())
	}

	/// Dispatch bridge for calls on `target`.
	pub fn wrap(self: &Arc<Self>, context: Arc<BindingContext>, target: Target) -> Wrapper {
		Wrapper::new(self.clone(), context, target)
	}

	/// Asks `backend` for a proxy around `target`, returning the target itself
	/// when the backend declines.
	pub fn proxy(self: &Arc<Self>, backend: &dyn ProxyBackend, context: Arc<BindingContext>, target: Target) -> Target {
		let dispatch = self.wrap(context.clone(), target.clone());
		let should_intercept = |ctx: &BindingContext| self.should_proxy(ctx);
		backend
			.create_proxy(&context, &target, &should_intercept, dispatch)
			.unwrap_or(target)
	}
}

impl Default for Interception {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Debug for Interception {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Interception")
			.field("registry", &self.registry)
			.field("injectors", &self.injectors)
			.field("continuations", &self.continuations)
			.field("config", &self.config)
			.finish()
	}
}
