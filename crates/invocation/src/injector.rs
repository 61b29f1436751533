use intercede_primitives::{Arg, Target};
use thiserror::Error;

use crate::{CallError, MethodId, ReturnValue};

/// Failure to build a call primitive for a method.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InjectorError {
	/// The method is an open generic definition with no type arguments bound.
	#[error("cannot create an injector for open generic method definition `{method}`")]
	OpenGenericMethod {
		/// The offending method.
		method: String,
	},
}

/// Invokes one concrete method on a target instance.
pub trait MethodInjector: Send + Sync {
	/// The method this injector calls.
	fn method(&self) -> &MethodId;

	/// Calls the method.
	///
	/// Asynchronous methods return [`ReturnValue::Pending`] without polling the
	/// future.
	fn invoke(&self, target: &Target, arguments: &[Arg]) -> Result<ReturnValue, CallError>;
}
