use std::any::Any;

use dashmap::DashMap;
use intercede_invocation::{Continuation, continue_with};
use intercede_primitives::TypeKey;
use rustc_hash::FxBuildHasher;

/// Continuations for future-returning methods, keyed by the future's value type.
///
/// Each entry is a function monomorphized for its value type, either when
/// registered here or when the method was described with
/// [`MethodInfo::future_of`](intercede_invocation::MethodInfo::future_of).
/// Dispatch never needs to look anything up by name.
pub struct ContinuationTable {
	entries: DashMap<TypeKey, Continuation, FxBuildHasher>,
}

impl ContinuationTable {
	pub fn new() -> Self {
		Self {
			entries: DashMap::with_hasher(FxBuildHasher),
		}
	}

	/// A table with unit, `bool`, the integer and float primitives and
	/// `String` registered.
	pub fn with_common() -> Self {
		let table = Self::new();
		table.register::<()>();
		table.register::<bool>();
		table.register::<i8>();
		table.register::<i16>();
		table.register::<i32>();
		table.register::<i64>();
		table.register::<isize>();
		table.register::<u8>();
		table.register::<u16>();
		table.register::<u32>();
		table.register::<u64>();
		table.register::<usize>();
		table.register::<f32>();
		table.register::<f64>();
		table.register::<String>();
		table
	}

	/// Registers the continuation for futures of `T`. Idempotent.
	pub fn register<T: Any + Send>(&self) {
		self.entries.entry(TypeKey::of::<T>()).or_insert(continue_with::<T>);
	}

	/// Returns the continuation cached for `ty`, caching `continuation` first if
	/// there is none.
	pub fn get_or_insert(&self, ty: TypeKey, continuation: Continuation) -> Continuation {
		*self.entries.entry(ty).or_insert(continuation).value()
	}

	pub fn get(&self, ty: TypeKey) -> Option<Continuation> {
		self.entries.get(&ty).map(|entry| *entry.value())
	}

	pub fn contains(&self, ty: TypeKey) -> bool {
		self.entries.contains_key(&ty)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

impl Default for ContinuationTable {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Debug for ContinuationTable {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ContinuationTable")
			.field("len", &self.entries.len())
			.finish()
	}
}
