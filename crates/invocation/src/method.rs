//! Method descriptions supplied by the proxy backend.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use intercede_primitives::{Arg, BoxError, BoxFutureStatic, Target, TypeKey, Value};

use crate::{CallError, Continuation, continue_with};

/// Stable identity of one method slot, including bound type arguments.
///
/// An open generic definition has no type arguments; each closed
/// instantiation gets its own identity.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodId {
	declaring_type: TypeKey,
	name: Arc<str>,
	slot: u32,
	type_args: Arc<[TypeKey]>,
}

impl MethodId {
	pub fn new(declaring_type: TypeKey, name: impl Into<Arc<str>>, slot: u32) -> Self {
		Self {
			declaring_type,
			name: name.into(),
			slot,
			type_args: Arc::from([]),
		}
	}

	/// Type that declares the slot (not the runtime receiver type).
	pub fn declaring_type(&self) -> TypeKey {
		self.declaring_type
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// Overload index within the declaring type.
	pub fn slot(&self) -> u32 {
		self.slot
	}

	pub fn type_args(&self) -> &[TypeKey] {
		&self.type_args
	}

	fn with_type_args(&self, type_args: &[TypeKey]) -> Self {
		Self {
			type_args: Arc::from(type_args),
			..self.clone()
		}
	}
}

impl fmt::Display for MethodId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}::{}", self.declaring_type, self.name)?;
		if !self.type_args.is_empty() {
			f.write_str("<")?;
			for (i, ty) in self.type_args.iter().enumerate() {
				if i > 0 {
					f.write_str(", ")?;
				}
				write!(f, "{ty}")?;
			}
			f.write_str(">")?;
		}
		Ok(())
	}
}

impl fmt::Debug for MethodId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "MethodId({self}#{})", self.slot)
	}
}

/// Declared return shape of a method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReturnShape {
	/// Returns a value (or nothing) synchronously.
	Value,
	/// Returns a future that carries no value.
	Future,
	/// Returns a future carrying a value of the given type.
	FutureOf(TypeKey),
}

impl ReturnShape {
	pub fn is_future(&self) -> bool {
		!matches!(self, Self::Value)
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Value => "value",
			Self::Future => "future",
			Self::FutureOf(_) => "future_of",
		}
	}
}

/// Borrowed view of one call handed to a [`MethodBody`].
#[derive(Clone, Copy)]
pub struct MethodCall<'a> {
	pub target: &'a Target,
	pub arguments: &'a [Arg],
	pub type_arguments: &'a [TypeKey],
}

impl<'a> MethodCall<'a> {
	/// The receiver as `T`.
	pub fn receiver<T: 'static>(&self) -> Option<&'a T> {
		self.target.downcast_ref::<T>()
	}

	/// Argument `index` as `T`.
	pub fn arg<T: 'static>(&self, index: usize) -> Option<&'a T> {
		self.arguments.get(index)?.downcast_ref::<T>()
	}
}

pub type SyncBody = Arc<dyn Fn(MethodCall<'_>) -> Result<Value, BoxError> + Send + Sync>;
pub type AsyncBody = Arc<dyn Fn(MethodCall<'_>) -> BoxFutureStatic<Result<Value, BoxError>> + Send + Sync>;

/// The real implementation behind a method slot.
#[derive(Clone)]
pub enum MethodBody {
	Sync(SyncBody),
	/// Returns a future without awaiting it. The future must own what it needs.
	Async(AsyncBody),
}

impl fmt::Debug for MethodBody {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Sync(_) => f.write_str("MethodBody::Sync"),
			Self::Async(_) => f.write_str("MethodBody::Async"),
		}
	}
}

/// Description of an interceptable method.
#[derive(Debug, Clone)]
pub struct MethodInfo {
	id: MethodId,
	generic_arity: u8,
	return_shape: ReturnShape,
	body: MethodBody,
	continuation: Option<Continuation>,
}

impl MethodInfo {
	pub fn new(id: MethodId, return_shape: ReturnShape, body: MethodBody) -> Self {
		Self {
			id,
			generic_arity: 0,
			return_shape,
			body,
			continuation: None,
		}
	}

	/// A synchronous method declared on `declaring_type`.
	pub fn sync<F>(declaring_type: TypeKey, name: &str, body: F) -> Self
	where
		F: Fn(MethodCall<'_>) -> Result<Value, BoxError> + Send + Sync + 'static,
	{
		Self::new(
			MethodId::new(declaring_type, name, 0),
			ReturnShape::Value,
			MethodBody::Sync(Arc::new(body)),
		)
	}

	/// A method returning a future that carries no value.
	pub fn future<F, Fut>(declaring_type: TypeKey, name: &str, body: F) -> Self
	where
		F: Fn(MethodCall<'_>) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
	{
		let body: AsyncBody = Arc::new(move |call: MethodCall<'_>| -> BoxFutureStatic<Result<Value, BoxError>> {
			let fut = body(call);
			Box::pin(async move {
				fut.await?;
				Ok::<Value, BoxError>(Box::new(()))
			})
		});
		Self::new(
			MethodId::new(declaring_type, name, 0),
			ReturnShape::Future,
			MethodBody::Async(body),
		)
	}

	/// A method returning a future carrying a `T`.
	pub fn future_of<T, F, Fut>(declaring_type: TypeKey, name: &str, body: F) -> Self
	where
		T: Send + 'static,
		F: Fn(MethodCall<'_>) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<T, BoxError>> + Send + 'static,
	{
		let body: AsyncBody = Arc::new(move |call: MethodCall<'_>| -> BoxFutureStatic<Result<Value, BoxError>> {
			let fut = body(call);
			Box::pin(async move { Ok::<Value, BoxError>(Box::new(fut.await?)) })
		});
		Self::new(
			MethodId::new(declaring_type, name, 0),
			ReturnShape::FutureOf(TypeKey::of::<T>()),
			MethodBody::Async(body),
		)
		.with_continuation(continue_with::<T>)
	}

	/// Attaches the continuation used to await this method's future.
	///
	/// Only meaningful for [`ReturnShape::FutureOf`] methods.
	pub fn with_continuation(mut self, continuation: Continuation) -> Self {
		self.continuation = Some(continuation);
		self
	}

	/// Overload index within the declaring type.
	pub fn with_slot(mut self, slot: u32) -> Self {
		self.id.slot = slot;
		self
	}

	/// Marks this method as a generic definition with `arity` type parameters.
	pub fn generic(mut self, arity: u8) -> Self {
		self.generic_arity = arity;
		self
	}

	pub fn id(&self) -> &MethodId {
		&self.id
	}

	pub fn name(&self) -> &str {
		self.id.name()
	}

	pub fn declaring_type(&self) -> TypeKey {
		self.id.declaring_type
	}

	pub fn generic_arity(&self) -> u8 {
		self.generic_arity
	}

	pub fn return_shape(&self) -> ReturnShape {
		self.return_shape
	}

	pub fn body(&self) -> &MethodBody {
		&self.body
	}

	/// Continuation for the value type of a [`ReturnShape::FutureOf`] method,
	/// when the method was described with its value type known.
	pub fn continuation(&self) -> Option<Continuation> {
		self.continuation
	}

	/// Returns true for a generic method with no type arguments bound.
	pub fn is_generic_definition(&self) -> bool {
		self.generic_arity > 0 && self.id.type_args.is_empty()
	}

	/// Binds the type arguments of a generic method definition.
	pub fn make_generic(&self, type_args: &[TypeKey]) -> Result<MethodInfo, CallError> {
		if !self.is_generic_definition() {
			return Err(CallError::NotGenericDefinition {
				method: self.id.to_string(),
			});
		}
		if type_args.len() != usize::from(self.generic_arity) {
			return Err(CallError::GenericArity {
				method: self.id.to_string(),
				expected: usize::from(self.generic_arity),
				found: type_args.len(),
			});
		}
		Ok(Self {
			id: self.id.with_type_args(type_args),
			..self.clone()
		})
	}
}
