use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::TypeKey;

/// Boxed failure raised by a target method or an interceptor.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// One call argument. Shared so a chain can re-invoke the target.
pub type Arg = Arc<dyn Any + Send + Sync>;

/// A method's return value.
pub type Value = Box<dyn Any + Send>;

/// Wraps a value as a call argument.
pub fn arg<T: Any + Send + Sync>(value: T) -> Arg {
	Arc::new(value)
}

/// A live instance together with its concrete type identity.
///
/// Cloning shares the instance.
#[derive(Clone)]
pub struct Target {
	instance: Arc<dyn Any + Send + Sync>,
	type_key: TypeKey,
}

impl Target {
	/// Wraps an owned instance.
	pub fn new<T: Any + Send + Sync>(instance: T) -> Self {
		Self::from_arc(Arc::new(instance))
	}

	/// Wraps an already shared instance.
	pub fn from_arc<T: Any + Send + Sync>(instance: Arc<T>) -> Self {
		Self {
			instance,
			type_key: TypeKey::of::<T>(),
		}
	}

	/// Concrete type of the instance.
	pub fn type_key(&self) -> TypeKey {
		self.type_key
	}

	/// Borrows the instance as `T` if it is one.
	pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
		self.instance.downcast_ref::<T>()
	}

	/// Returns a shared handle to the instance as `T` if it is one.
	pub fn downcast_arc<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
		self.instance.clone().downcast::<T>().ok()
	}

	/// Returns true if both handles share the same instance.
	pub fn ptr_eq(&self, other: &Target) -> bool {
		Arc::ptr_eq(&self.instance, &other.instance)
	}
}

impl fmt::Debug for Target {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Target")
			.field("type", &self.type_key)
			.finish_non_exhaustive()
	}
}
