use std::sync::atomic::{AtomicU64, Ordering};

use intercede_primitives::TypeKey;

/// Identity of one binding configuration in the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingId(u64);

impl BindingId {
	/// Allocates a process-unique binding id.
	pub fn fresh() -> Self {
		static NEXT: AtomicU64 = AtomicU64::new(1);
		Self(NEXT.fetch_add(1, Ordering::Relaxed))
	}

	/// Wraps an id allocated by the container.
	pub const fn from_raw(raw: u64) -> Self {
		Self(raw)
	}

	pub const fn as_u64(self) -> u64 {
		self.0
	}
}

/// What the container knows about the binding that produced an instance.
///
/// Advice conditions are evaluated against this context.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BindingContext {
	binding: BindingId,
	service: TypeKey,
	implementation: TypeKey,
}

impl BindingContext {
	pub fn new(binding: BindingId, service: TypeKey, implementation: TypeKey) -> Self {
		Self {
			binding,
			service,
			implementation,
		}
	}

	/// Context for a binding of service `S` to implementation `I`.
	pub fn of<S: ?Sized + 'static, I: 'static>(binding: BindingId) -> Self {
		Self::new(binding, TypeKey::of::<S>(), TypeKey::of::<I>())
	}

	pub fn binding(&self) -> BindingId {
		self.binding
	}

	/// The requested service type.
	pub fn service(&self) -> TypeKey {
		self.service
	}

	/// The concrete type the binding resolves to.
	pub fn implementation(&self) -> TypeKey {
		self.implementation
	}
}
