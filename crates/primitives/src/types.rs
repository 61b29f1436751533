use std::any::{TypeId, type_name};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Marker for the universal base object type.
///
/// Methods every instance answers (`hash_code`, `equals`, `to_string`) are
/// described as declared on `Object` unless a concrete type overrides them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Object;

/// Stable, hashable identity of a concrete type.
///
/// Equality, ordering and hashing only consider the [`TypeId`]; the name is
/// carried for diagnostics.
#[derive(Clone, Copy)]
pub struct TypeKey {
	id: TypeId,
	name: &'static str,
}

impl TypeKey {
	/// Returns the identity of `T`.
	pub fn of<T: ?Sized + 'static>() -> Self {
		Self {
			id: TypeId::of::<T>(),
			name: type_name::<T>(),
		}
	}

	/// Identity of the universal base object type.
	pub fn object() -> Self {
		Self::of::<Object>()
	}

	/// Returns the underlying [`TypeId`].
	pub const fn id(&self) -> TypeId {
		self.id
	}

	/// Full type path, for diagnostics only.
	pub const fn name(&self) -> &'static str {
		self.name
	}

	/// Last path segment of the type name, keeping generic arguments.
	pub fn short_name(&self) -> &'static str {
		let head = self.name.split('<').next().unwrap_or(self.name);
		match head.rfind("::") {
			Some(idx) => &self.name[idx + 2..],
			None => self.name,
		}
	}

	/// Returns true if this is the identity of [`Object`].
	pub fn is_object(&self) -> bool {
		self.id == TypeId::of::<Object>()
	}
}

impl PartialEq for TypeKey {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id
	}
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.id.hash(state);
	}
}

impl PartialOrd for TypeKey {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for TypeKey {
	fn cmp(&self, other: &Self) -> Ordering {
		self.id.cmp(&other.id)
	}
}

impl fmt::Debug for TypeKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "TypeKey({})", self.name)
	}
}

impl fmt::Display for TypeKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.short_name())
	}
}
