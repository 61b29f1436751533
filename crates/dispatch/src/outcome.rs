use std::any::Any;
use std::sync::Arc;

use intercede_invocation::{CallError, MethodInfo, ReturnShape};
use intercede_primitives::{Arg, BoxFutureStatic, TypeKey, Value};

/// A call against a proxied instance, as reported by the proxy backend.
#[derive(Debug, Clone)]
pub struct RawCall {
	pub method: Arc<MethodInfo>,
	pub arguments: Vec<Arg>,
	/// Type arguments for a generic method definition.
	pub type_arguments: Vec<TypeKey>,
}

impl RawCall {
	pub fn new(method: Arc<MethodInfo>, arguments: Vec<Arg>) -> Self {
		Self {
			method,
			arguments,
			type_arguments: Vec::new(),
		}
	}

	pub fn with_type_arguments(mut self, type_arguments: impl Into<Vec<TypeKey>>) -> Self {
		self.type_arguments = type_arguments.into();
		self
	}
}

/// Result of dispatching one call, shaped like the method's return.
pub enum CallOutcome {
	/// The method returns a plain value.
	Value(Result<Value, CallError>),
	/// The method returns a future carrying no value.
	Future(BoxFutureStatic<Result<(), CallError>>),
	/// The method returns a future carrying a value of a known type.
	FutureOf(BoxFutureStatic<Result<Value, CallError>>),
}

impl CallOutcome {
	/// A failed outcome shaped like `shape`.
	pub fn failed(shape: ReturnShape, err: CallError) -> Self {
		match shape {
			ReturnShape::Value => Self::Value(Err(err)),
			ReturnShape::Future => Self::Future(Box::pin(std::future::ready(Err(err)))),
			ReturnShape::FutureOf(_) => Self::FutureOf(Box::pin(std::future::ready(Err(err)))),
		}
	}

	/// The value the proxy hands back to its caller.
	///
	/// Future outcomes become the boxed future itself.
	pub fn into_value(self) -> Result<Value, CallError> {
		match self {
			Self::Value(result) => result,
			Self::Future(fut) => Ok(Box::new(fut)),
			Self::FutureOf(fut) => Ok(Box::new(fut)),
		}
	}

	/// Awaits the outcome, discarding any value.
	pub fn into_unit_future(self) -> BoxFutureStatic<Result<(), CallError>> {
		match self {
			Self::Value(result) => Box::pin(std::future::ready(result.map(drop))),
			Self::Future(fut) => fut,
			Self::FutureOf(fut) => Box::pin(async move { fut.await.map(drop) }),
		}
	}

	/// Awaits the outcome and takes its value as `T`.
	pub fn into_typed_future<T: Any + Send>(self, method: String) -> BoxFutureStatic<Result<T, CallError>> {
		match self {
			Self::Value(result) => Box::pin(std::future::ready(result.and_then(|v| downcast_value(v, &method)))),
			Self::Future(fut) => Box::pin(async move {
				fut.await?;
				downcast_value(Box::new(()), &method)
			}),
			Self::FutureOf(fut) => Box::pin(async move { downcast_value(fut.await?, &method) }),
		}
	}

	pub fn is_future(&self) -> bool {
		!matches!(self, Self::Value(_))
	}
}

impl std::fmt::Debug for CallOutcome {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Value(Ok(_)) => f.write_str("CallOutcome::Value(Ok(..))"),
			Self::Value(Err(err)) => write!(f, "CallOutcome::Value(Err({err:?}))"),
			Self::Future(_) => f.write_str("CallOutcome::Future(..)"),
			Self::FutureOf(_) => f.write_str("CallOutcome::FutureOf(..)"),
		}
	}
}

pub(crate) fn downcast_value<T: Any>(value: Value, method: &str) -> Result<T, CallError> {
	value
		.downcast::<T>()
		.map(|boxed| *boxed)
		.map_err(|_| CallError::ReturnTypeMismatch {
			method: method.to_owned(),
			expected: TypeKey::of::<T>(),
		})
}
