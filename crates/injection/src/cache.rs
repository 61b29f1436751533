use std::sync::Arc;

use dashmap::DashMap;
use intercede_invocation::{InjectorError, MethodId, MethodInfo, MethodInjector};
use rustc_hash::FxBuildHasher;

use crate::{BodyInjectorFactory, InjectorFactory};

/// Memoizes one call primitive per closed method.
///
/// Primitives are built outside the map's shard lock. When two callers miss
/// concurrently both may build one, but only the first insert is kept and both
/// callers receive that same primitive.
pub struct InjectorCache {
	injectors: DashMap<MethodId, Arc<dyn MethodInjector>, FxBuildHasher>,
	factory: Arc<dyn InjectorFactory>,
}

impl InjectorCache {
	pub fn new() -> Self {
		Self::with_factory(Arc::new(BodyInjectorFactory))
	}

	pub fn with_factory(factory: Arc<dyn InjectorFactory>) -> Self {
		Self {
			injectors: DashMap::with_hasher(FxBuildHasher),
			factory,
		}
	}

	/// Returns the call primitive for `method`.
	///
	/// # Errors
	///
	/// Returns [`InjectorError::OpenGenericMethod`] if `method` is a generic
	/// definition with no type arguments bound.
	pub fn get_injector(&self, method: &Arc<MethodInfo>) -> Result<Arc<dyn MethodInjector>, InjectorError> {
		if method.is_generic_definition() {
			return Err(InjectorError::OpenGenericMethod {
				method: method.id().to_string(),
			});
		}

		if let Some(existing) = self.injectors.get(method.id()) {
			return Ok(existing.value().clone());
		}

		let created = self.factory.create_injector(method);
		tracing::trace!(method = %method.id(), "injector.create");
		let stored = self.injectors.entry(method.id().clone()).or_insert(created).value().clone();
		Ok(stored)
	}

	/// Number of memoized primitives.
	pub fn len(&self) -> usize {
		self.injectors.len()
	}

	pub fn is_empty(&self) -> bool {
		self.injectors.is_empty()
	}
}

impl Default for InjectorCache {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Debug for InjectorCache {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("InjectorCache")
			.field("len", &self.injectors.len())
			.finish_non_exhaustive()
	}
}
