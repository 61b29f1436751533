//! Error types for intercepted calls.

use intercede_primitives::{BoxError, TypeKey};
use thiserror::Error;

use crate::InjectorError;

/// Failure of an intercepted call.
///
/// [`CallError::Failed`] carries failures raised by the target method or by an
/// interceptor, untouched. The remaining variants are defects in advice or
/// proxy setup.
#[derive(Debug, Error)]
pub enum CallError {
	/// The target method or an interceptor failed.
	#[error(transparent)]
	Failed(BoxError),

	/// No call primitive could be built for the method.
	#[error(transparent)]
	Injector(#[from] InjectorError),

	/// An asynchronous-only interceptor was reached from a synchronous call.
	#[error("interceptor `{interceptor}` cannot intercept synchronous call to `{method}`")]
	AsyncOnlyInterceptor {
		/// Interceptor name.
		interceptor: String,
		/// Method being called.
		method: String,
	},

	/// An interceptor declared neither capability.
	#[error("interceptor `{interceptor}` declares no interception capability")]
	NoCapability {
		/// Interceptor name.
		interceptor: String,
	},

	/// No asynchronous continuation exists for the method's value type.
	#[error("no asynchronous continuation registered for `{ty}`")]
	NoContinuation {
		/// The future's value type.
		ty: TypeKey,
	},

	/// The chain produced a value of the wrong type.
	#[error("`{method}` produced a value that is not a `{expected}`")]
	ReturnTypeMismatch {
		/// Method being called.
		method: String,
		/// Declared value type.
		expected: TypeKey,
	},

	/// The chain completed without producing a return value.
	#[error("`{method}` completed without a return value")]
	MissingReturnValue {
		/// Method being called.
		method: String,
	},

	/// A generic method definition was closed with the wrong number of type arguments.
	#[error("`{method}` expects {expected} type arguments, got {found}")]
	GenericArity {
		/// Method being closed.
		method: String,
		/// Declared generic arity.
		expected: usize,
		/// Supplied type arguments.
		found: usize,
	},

	/// Type arguments were supplied for a method that is not a generic definition.
	#[error("`{method}` is not a generic method definition")]
	NotGenericDefinition {
		/// Method being closed.
		method: String,
	},
}

impl CallError {
	/// Wraps a target or interceptor failure.
	///
	/// A failure that already is a [`CallError`] is returned as is, so bridged
	/// failures never nest inside an envelope.
	pub fn failed(err: impl Into<BoxError>) -> Self {
		let err: BoxError = err.into();
		match err.downcast::<CallError>() {
			Ok(inner) => *inner,
			Err(err) => Self::Failed(err),
		}
	}

	/// Borrows the original failure as `E`, if this is one.
	pub fn downcast_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
		match self {
			Self::Failed(err) => err.downcast_ref::<E>(),
			_ => None,
		}
	}

	/// Returns true for errors caused by advice or proxy setup rather than by
	/// the called code.
	pub fn is_configuration(&self) -> bool {
		!matches!(self, Self::Failed(_))
	}
}

/// Result type for intercepted calls.
pub type Result<T> = std::result::Result<T, CallError>;
